//! Resource trait and its host-facing, type-erased form
//!
//! Resources are written against typed serde records ([`Resource`]). The host
//! only deals in [`Value`] trees, so every resource is wrapped in [`Erased`],
//! which runs validation, planning and the state bridge around the typed
//! operations.

use async_trait::async_trait;
use platform_client::ProviderMeta;
use platform_core::bridge::{decode_plan, decode_state, encode};
use platform_core::{
    Component, Diagnostics, PlannedAction, PlannedChange, Schema, Value, VersionGate,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{ResourceError, Result};

/// A resource implemented against typed records
#[async_trait]
pub trait Resource: Send + Sync {
    /// State record; computed attributes are `Option`s
    type State: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Host type name (e.g. `platform_lifecycle`)
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn meta(&self) -> &ProviderMeta;

    /// Oldest remote version the endpoints exist on
    fn version_gate(&self) -> Option<VersionGate> {
        None
    }

    /// Cross-attribute checks that the schema cannot express
    ///
    /// Only called when every attribute the record needs is known.
    fn validate_config(&self, _config: &Self::State, _diags: &mut Diagnostics) {}

    async fn create(&self, plan: Self::State) -> Result<Self::State>;

    /// Refresh from the platform; `None` removes the resource from state
    async fn read(&self, state: Self::State) -> Result<Option<Self::State>>;

    async fn update(&self, prior: Self::State, plan: Self::State) -> Result<Self::State>;

    /// Delete remotely; returned warnings are shown to the user
    async fn delete(&self, state: Self::State) -> Result<Diagnostics>;

    /// Turn an import identifier into a minimal state to read
    fn parse_import_id(&self, id: &str) -> Result<Self::State>;
}

/// Plan plus any warnings raised while validating the configuration
#[derive(Debug, Clone)]
pub struct ResourcePlan {
    pub change: PlannedChange,
    pub diagnostics: Diagnostics,
}

/// Result of applying a planned change
#[derive(Debug, Clone, Default)]
pub struct Applied {
    /// New state; `None` when the resource is gone
    pub state: Option<Value>,
    pub diagnostics: Diagnostics,
}

/// Host-facing operations over value trees
#[async_trait]
pub trait HostResource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Schema validators, version gate and resource-level checks
    fn validate(&self, config: &Value) -> Diagnostics;

    /// Validate `config` (when present) and compute the planned change
    fn plan(&self, prior: Option<&Value>, config: Option<&Value>) -> Result<ResourcePlan>;

    async fn apply(&self, change: &PlannedChange) -> Result<Applied>;

    async fn read(&self, state: &Value) -> Result<Option<Value>>;

    async fn import(&self, id: &str) -> Result<Option<Value>>;
}

/// Wraps a typed [`Resource`] as a [`HostResource`]
pub struct Erased<R>(pub R);

impl<R: Resource> Erased<R> {
    fn decode_state(&self, value: &Value) -> Result<R::State> {
        decode_state(value).map_err(|e| ResourceError::bridge(self.0.type_name(), e))
    }

    fn decode_plan(&self, value: &Value) -> Result<R::State> {
        decode_plan(value).map_err(|e| ResourceError::bridge(self.0.type_name(), e))
    }

    fn encode(&self, record: &R::State) -> Result<Value> {
        encode(record, &self.0.schema()).map_err(|e| ResourceError::bridge(self.0.type_name(), e))
    }

    fn reported_version(&self, gate: &VersionGate) -> &str {
        let meta = self.0.meta();
        match gate.component {
            Component::Access => &meta.access_version,
            Component::Platform => &meta.platform_version,
        }
    }

    /// Refuse a planned value that would not pass validation
    ///
    /// Computed attributes are blanked first; they are not configuration.
    fn ensure_valid(&self, planned: &Value) -> Result<()> {
        let schema = self.0.schema();
        let config = Value::Object(
            schema
                .attributes()
                .map(|(name, attr)| {
                    let value = if attr.is_configurable() {
                        planned.get(name).clone()
                    } else {
                        Value::Null
                    };
                    (name.clone(), value)
                })
                .collect(),
        );

        let diags = self.validate(&config);
        if diags.has_errors() {
            return Err(ResourceError::config(self.0.type_name(), diags));
        }
        Ok(())
    }

    async fn create(&self, planned: &Value) -> Result<Value> {
        self.ensure_valid(planned)?;
        let record = self.decode_plan(planned)?;
        let created = self.0.create(record).await?;
        info!(resource = self.0.type_name(), "created");
        self.encode(&created)
    }
}

#[async_trait]
impl<R: Resource> HostResource for Erased<R> {
    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    fn schema(&self) -> Schema {
        self.0.schema()
    }

    fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = self.0.schema().validate(config);

        if let Some(gate) = self.0.version_gate() {
            if let Some(diag) = gate.diagnose(self.0.type_name(), self.reported_version(&gate)) {
                diags.push(diag);
            }
        }

        if !diags.has_errors() && config.is_fully_known() {
            if let Ok(record) = decode_plan::<R::State>(config) {
                self.0.validate_config(&record, &mut diags);
            }
        }

        diags
    }

    fn plan(&self, prior: Option<&Value>, config: Option<&Value>) -> Result<ResourcePlan> {
        let diagnostics = match config {
            Some(config) => self.validate(config),
            None => Diagnostics::new(),
        };
        if diagnostics.has_errors() {
            return Err(ResourceError::config(self.0.type_name(), diagnostics));
        }

        let change = platform_core::plan(&self.0.schema(), prior, config);
        debug!(
            resource = self.0.type_name(),
            action = %change.action(),
            "planned"
        );
        Ok(ResourcePlan {
            change,
            diagnostics,
        })
    }

    async fn apply(&self, change: &PlannedChange) -> Result<Applied> {
        let type_name = self.0.type_name();

        match (change.action(), &change.prior, &change.planned) {
            (PlannedAction::Create, _, Some(planned)) => Ok(Applied {
                state: Some(self.create(planned).await?),
                diagnostics: Diagnostics::new(),
            }),
            (PlannedAction::Update, Some(prior), Some(planned)) => {
                self.ensure_valid(planned)?;
                let prior = self.decode_state(prior)?;
                let plan = self.decode_plan(planned)?;
                let updated = self.0.update(prior, plan).await?;
                info!(resource = type_name, "updated");
                Ok(Applied {
                    state: Some(self.encode(&updated)?),
                    diagnostics: Diagnostics::new(),
                })
            }
            (PlannedAction::Replace, Some(prior), Some(planned)) => {
                debug!(
                    resource = type_name,
                    attributes = ?change.requires_replace.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "replacing"
                );
                let diagnostics = self.0.delete(self.decode_state(prior)?).await?;
                let state = self.create(planned).await?;
                Ok(Applied {
                    state: Some(state),
                    diagnostics,
                })
            }
            (PlannedAction::Delete, Some(prior), _) => {
                let diagnostics = self.0.delete(self.decode_state(prior)?).await?;
                info!(resource = type_name, "deleted");
                Ok(Applied {
                    state: None,
                    diagnostics,
                })
            }
            _ => Ok(Applied {
                state: change.planned.clone().or_else(|| change.prior.clone()),
                diagnostics: Diagnostics::new(),
            }),
        }
    }

    async fn read(&self, state: &Value) -> Result<Option<Value>> {
        let record = self.decode_state(state)?;
        match self.0.read(record).await? {
            Some(fresh) => self.encode(&fresh).map(Some),
            None => Ok(None),
        }
    }

    async fn import(&self, id: &str) -> Result<Option<Value>> {
        let record = self.0.parse_import_id(id)?;
        debug!(resource = self.0.type_name(), id, "importing");
        match self.0.read(record).await? {
            Some(fresh) => self.encode(&fresh).map(Some),
            None => Ok(None),
        }
    }
}
