//! coursegate-core — assessment and progression engine.
//!
//! Quiz authoring validation, submission grading, sibling sequencing and the
//! per-learner progression state machine, plus the storage boundary traits
//! and file loaders the CLI builds on.

pub mod config;
pub mod error;
pub mod grading;
pub mod ids;
pub mod model;
pub mod parser;
pub mod progression;
pub mod sequencing;
pub mod service;
pub mod store;
pub mod traits;
pub mod validation;
