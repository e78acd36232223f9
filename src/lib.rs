//! Autoref - Generate Sphinx reference stubs from a module namespace
//!
//! Loads the exported namespace of an extension module, classifies every
//! public name, and writes one autodoc stub page per class or function plus
//! an aggregate quick-reference index.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod namespace;
pub mod output;

// Re-export main types
pub use classify::{Bucket, Buckets, Classifier};
pub use config::Config;
pub use error::{Error, Result};
pub use namespace::{Entry, Kind, Namespace, Traits};
pub use output::{GenerationReport, IndexWriter, PageEmitter, PageKind, TemplateEngine};
