//! Platform Resources - lifecycle and lifecycle-stage resources
//!
//! This crate turns host operations (validate, plan, create, read, update,
//! delete, import) into calls against the platform's Access API:
//!
//! - [`RestAdapter`]: shared create/read/update/delete status handling
//! - [`Resource`]: typed resource operations over serde records
//! - [`HostResource`]: the same operations over host value trees
//! - [`Provider`]: the registry of resource types
//!
//! ## Example
//!
//! ```rust,no_run
//! use platform_client::{PlatformClient, ProviderMeta};
//! use platform_core::Value;
//! use platform_resources::Provider;
//!
//! # async fn example() -> miette::Result<()> {
//! let client = PlatformClient::with_bearer_token("https://acme.example.com", "token")
//!     .map_err(|e| miette::miette!("{e}"))?;
//! let provider = Provider::new(ProviderMeta::new(client).with_access_version("7.125.0"));
//!
//! let stage = provider.resource("platform_lifecycle_stage")?;
//! let config = Value::Object(
//!     [("name".to_string(), Value::string("deploy"))].into_iter().collect(),
//! );
//! let plan = stage.plan(None, Some(&config))?;
//! let applied = stage.apply(&plan.change).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod error;
pub mod provider;
pub mod resource;
pub mod resources;

pub use adapter::{Expect, RestAdapter, Verb};
pub use error::{ErrorKind, Operation, ResourceError, Result};
pub use provider::Provider;
pub use resource::{Applied, Erased, HostResource, Resource, ResourcePlan};
pub use resources::{
    LIFECYCLE_TYPE, LifecycleResource, LifecycleState, STAGE_TYPE, StageResource, StageState,
};
