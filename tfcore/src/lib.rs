//! tfcore - core types and traits for building Terraform providers in Rust.
//!
//! Provides the dynamic value system, schema builders, diagnostics, and the
//! async `Provider`/`Resource` traits. The plugin wire protocol is out of
//! scope here; these traits are the seam a protocol server attaches to.

pub mod context;
pub mod error;
pub mod schema;
pub mod types;

pub mod import;
pub mod provider;
pub mod resource;

pub use context::Context;
pub use error::{Result, TfcoreError};
pub use import::import_state_passthrough_id;
pub use provider::{Provider, ResourceFactory};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithImportState};
pub use schema::{
    AttributeBuilder, AttributeType, NestedBlockBuilder, NestingMode, Schema, SchemaBuilder,
};
pub use types::{AttributePath, Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue};
