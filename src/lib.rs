//! Schema binding for the `log` content collection of a static site: where the documents live,
//! and what their front matter must look like.

pub mod r#async;
pub mod collection;
pub mod config;
pub mod date;
pub mod error;
pub mod fields;
pub mod front_matter;
pub mod fs;
pub mod loader;
pub mod metadata;
pub mod scaffold;

pub use crate::collection::{Collection, Collections, Entry, LOG, LogEntries, Loaded};
pub use crate::config::Config;
pub use crate::error::{FieldIssue, LogErr, ValidationError};
pub use crate::metadata::{LogEntryMetadata, Schema, UnknownFields, validate};
