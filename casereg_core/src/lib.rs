#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Case-tracking registry model.
//!
//! Records live in a [`Registry`] and are addressed by a [`RecordId`] that is
//! issued once at append time and never reused. Everything derived from the
//! registry (filter views, highlight sets, match results) refers to records
//! through these ids.

pub mod dates;
pub mod error;
pub mod normalize;
pub mod registry;
pub mod tokens;
pub mod value;

pub use error::{Error, Result, ValidationError};
pub use normalize::{MappedText, normalize};
pub use registry::{
    ARCHIVED_FIELD, DELETED_FIELD, Flag, Record, RecordId, Registry, RegistryEvent, RegistryView,
    Schema, is_service_field,
};
pub use value::{ColumnKind, Value};
