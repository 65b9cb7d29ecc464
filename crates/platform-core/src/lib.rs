//! Platform Core - schema and state plumbing for provider resources
//!
//! This crate provides the host-facing building blocks shared by every
//! resource:
//! - `Value`: the host's value tree (null vs unknown, lists vs sets)
//! - `Schema`: attribute types, modes, defaults, plan modifiers, validators
//! - `bridge`: conversion between values and typed serde records
//! - `plan`: planned state and create / update / replace decisions
//! - `Diagnostics`: attribute-scoped errors and warnings
//! - `VersionGate`: minimum remote version checks

pub mod bridge;
pub mod diagnostics;
pub mod error;
pub mod path;
pub mod plan;
pub mod schema;
pub mod validators;
pub mod value;
pub mod version;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{BridgeError, Result};
pub use path::{AttributePath, PathStep};
pub use plan::{PlannedAction, PlannedChange, plan};
pub use schema::{AttrType, Attribute, Mode, PlanModifier, Schema};
pub use validators::Validator;
pub use value::Value;
pub use version::{Component, GateResult, VersionGate};
