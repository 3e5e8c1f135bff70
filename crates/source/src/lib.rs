//! # Attrwire Source
//!
//! Reads entity declarations straight from Rust source with tree-sitter, so that
//! attributes written as `#[Route("GET", "/")]` become annotations.
//!
//! ## Mapping
//!
//! ```text
//! Rust file
//!     │
//!     ├──> top-level struct / enum  → entity (outer attributes = entity metadata)
//!     ├──> inherent impl, `pub fn`  → public operation (outer attributes = metadata)
//!     └──> use declarations         → name qualification
//!            ├─> imported:   attrwire::annotations::Route → attrwire\annotations\Route
//!            └─> otherwise:  Route in App\Controller      → App\Controller\Route
//! ```
//!
//! ## Example
//!
//! ```rust
//! use attrwire_annotation::{Reflector, TargetRef};
//! use attrwire_source::SourceReflector;
//! use std::path::Path;
//!
//! let reflector = SourceReflector::new().unwrap();
//! reflector
//!     .insert_source(
//!         "src/User.rs",
//!         r#"
//! #[Prefix("/users")]
//! pub struct User;
//!
//! impl User {
//!     #[Route("GET", "/")]
//!     pub fn index(&self) {}
//! }
//! "#,
//!     )
//!     .unwrap();
//!
//! assert!(reflector.load("App\\User", Some(Path::new("src/User.rs"))));
//! let entries = reflector.declared_metadata(TargetRef::Entity("App\\User")).unwrap();
//! assert_eq!(entries[0].name, "App\\Prefix");
//! assert_eq!(reflector.public_operations("App\\User").unwrap(), vec!["index"]);
//! ```

mod analyzer;
mod attribute;
mod error;
mod reflector;
mod uses;

pub use analyzer::{ParsedEntity, ParsedOperation, ParsedSource, SourceAnalyzer};
pub use attribute::RawAttribute;
pub use error::{Result, SourceError};
pub use reflector::SourceReflector;
