//! # Attrwire Scanner
//!
//! Maps a project tree onto entity names and runs the annotator over each one.
//!
//! ```text
//! scan(path)
//!     │
//!     ├──> directory with manifest    → one walk per psr-4 namespace directory
//!     ├──> directory without manifest → children in name order
//!     │                                 (hidden entries and excluded dirs skipped)
//!     └──> source file                → App\Controller\User → Annotator::parse
//! ```

mod error;
mod manifest;
mod options;
mod scanner;

pub use error::{Result, ScanError};
pub use manifest::Manifest;
pub use options::ScanOptions;
pub use scanner::{entity_name, ScanReport, Scanner};
