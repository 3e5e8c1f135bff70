use anyhow::{Context as AnyhowContext, Result};
use attrwire_annotation::{Annotator, Context, EntityReport, Registry};
use attrwire_scanner::{ScanReport, Scanner};
use attrwire_source::SourceReflector;
use clap::{Args, Parser, Subcommand};
use config::CliConfig;
use serde_json::Value;
use std::path::PathBuf;

mod builtins;
mod config;

#[derive(Parser)]
#[command(name = "attrwire")]
#[command(about = "Resolve and dispatch annotations declared in Rust sources", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Settings file with [annotator] and [scan] tables (TOML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project tree and process every annotated entity
    Scan(ScanArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// Project directory or single source file
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Output the full report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    let json_output = match &cli.command {
        Commands::Scan(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    match cli.command {
        Commands::Scan(args) => run_scan(args, &config),
    }
}

fn run_scan(args: ScanArgs, config: &CliConfig) -> Result<()> {
    let mut registry = Registry::new();
    builtins::register(&mut registry, &config.annotator.builtin_namespace);

    let reflector = SourceReflector::new().context("Failed to initialise source parser")?;
    let annotator = Annotator::new(&config.annotator, &reflector, &registry, &registry)?;
    let scanner = Scanner::new(&annotator, config.scan.clone())?;

    let report = scanner
        .scan(&args.path, &Context::new())
        .with_context(|| format!("Scan of {} failed", args.path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ScanReport) {
    for entity in &report.entities {
        print_entity(entity);
    }
    println!(
        "{} entities from {} source files ({} skipped)",
        report.entities.len(),
        report.files,
        report.skipped.len()
    );
}

fn print_entity(entity: &EntityReport) {
    println!("{}", entity.class);
    for (key, value) in entity.context.values() {
        println!("  {key}: {value}");
    }

    for operation in &entity.operations {
        match operation.context.get("route") {
            Some(Value::Object(route)) => {
                let method = route.get("method").and_then(Value::as_str).unwrap_or("?");
                let path = route.get("path").and_then(Value::as_str).unwrap_or("?");
                println!("  {method} {path} -> {}", operation.name);
            }
            _ => println!("  {}", operation.name),
        }
    }

    if !entity.unhandled.is_empty() {
        println!("  unhandled: {}", entity.unhandled.join(", "));
    }
}
