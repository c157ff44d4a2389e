//! Persistence and validation engine for per-project config documents.
//!
//! Documents live under a reserved directory of the project root, either as
//! comment-tolerant structured text (repaired and rewritten as needed) or as
//! a read-only script module. [`ConfigStore`] is the entry point; the
//! building blocks are public for hosts that need finer control.

pub mod atomic;
pub mod defaults;
pub mod detect;
pub mod document;
mod error;
pub mod merge;
pub mod migrate;
pub mod multi;
pub mod parse;
pub mod paths;
pub mod reader;
pub mod render;
pub mod schema;
pub mod settings;
pub mod source;
mod store;
pub mod write;

pub use defaults::{default_document, generate_default_document};
pub use document::{ConfigDocument, ConfigVariant};
pub use error::{ConfigError, Error};
pub use migrate::{MigrationReport, MIGRATABLE_FIELDS};
pub use multi::MultiConfigEntry;
pub use paths::{ResolvedConfigPath, VariantPrompt};
pub use reader::{ReadMode, ReadOutcome};
pub use schema::{json_schema, validate, ValidationError, ValidationErrors};
pub use settings::{EngineSettings, SettingsError, SettingsLoader};
pub use store::{ConfigStore, ConfigStoreBuilder};
pub use write::UpdateOutcome;
