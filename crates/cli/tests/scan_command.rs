use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const USER: &str = r#"
#[Prefix("/users")]
#[Middleware("auth")]
pub struct User;

impl User {
    #[Route("GET", "/")]
    pub fn index(&self) {}

    #[Route("POST", "/", name = "create_user")]
    #[Middleware("throttle")]
    pub fn create(&self) {}
}
"#;

fn setup_project(root: &Path) {
    fs::create_dir_all(root.join("src/controller")).unwrap();
    fs::write(
        root.join("composer.json"),
        r#"{"autoload": {"psr-4": {"App\\": "src/"}}}"#,
    )
    .unwrap();
    fs::write(root.join("src/controller/user.rs"), USER).unwrap();
}

#[allow(deprecated)]
fn attrwire() -> Command {
    Command::cargo_bin("attrwire").expect("binary")
}

#[test]
fn scan_json_reports_routes() {
    let temp = tempdir().unwrap();
    setup_project(temp.path());

    let output = attrwire()
        .arg("scan")
        .arg(temp.path())
        .arg("--json")
        .output()
        .expect("command run");
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let user = &report["entities"][0];
    assert_eq!(user["class"], "App\\Controller\\User");
    assert_eq!(user["context"]["prefix"], "/users");
    assert_eq!(user["context"]["middleware"], serde_json::json!(["auth"]));

    let create = &user["operations"][1];
    assert_eq!(create["name"], "create");
    assert_eq!(create["context"]["route"]["path"], "/users/");
    assert_eq!(create["context"]["route"]["name"], "create_user");
    assert_eq!(
        create["context"]["middleware"],
        serde_json::json!(["auth", "throttle"])
    );

    // middleware added to one operation stays with it
    let index = &user["operations"][0];
    assert_eq!(index["context"]["middleware"], serde_json::json!(["auth"]));
}

#[test]
fn scan_text_output() {
    let temp = tempdir().unwrap();
    setup_project(temp.path());

    attrwire()
        .arg("scan")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("App\\Controller\\User"))
        .stdout(predicate::str::contains("GET /users/ -> index"))
        .stdout(predicate::str::contains("1 entities from 1 source files"));
}

#[test]
fn config_changes_builtin_namespace() {
    let temp = tempdir().unwrap();
    setup_project(temp.path());
    let config = temp.path().join("attrwire.toml");
    fs::write(&config, "[annotator]\nbuiltin_namespace = \"Acme\\\\Web\"\n").unwrap();

    let output = attrwire()
        .arg("scan")
        .arg(temp.path())
        .arg("--json")
        .arg("--config")
        .arg(&config)
        .output()
        .expect("command run");
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let route = &report["entities"][0]["operations"][0]["context"]["route"];
    assert_eq!(route["method"], "GET");
}

#[test]
fn missing_path_fails() {
    let temp = tempdir().unwrap();

    attrwire()
        .arg("scan")
        .arg(temp.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid scan path"));
}

#[test]
fn invalid_config_fails() {
    let temp = tempdir().unwrap();
    setup_project(temp.path());
    let config = temp.path().join("bad.toml");
    fs::write(&config, "[scan]\nsource_extension = \".rs\"\n").unwrap();

    attrwire()
        .arg("scan")
        .arg(temp.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("source_extension"));
}
