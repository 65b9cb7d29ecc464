//! Plan computation
//!
//! Given the prior state and the configuration, work out the planned state
//! and which action the host has to take:
//!
//! - null attributes with a default take the default
//! - null computed attributes keep the prior value when nothing else changes,
//!   otherwise become unknown (unless `UseStateForUnknown` pins the prior value)
//! - a `RequiresReplace` attribute whose value differs from prior forces
//!   destroy-and-recreate

use indexmap::IndexMap;

use crate::path::AttributePath;
use crate::schema::{PlanModifier, Schema};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    Create,
    Update,
    Replace,
    Delete,
    NoOp,
}

impl PlannedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlannedAction::Create => "create",
            PlannedAction::Update => "update",
            PlannedAction::Replace => "replace",
            PlannedAction::Delete => "delete",
            PlannedAction::NoOp => "no-op",
        }
    }
}

impl std::fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of planning one resource
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange {
    pub prior: Option<Value>,
    pub planned: Option<Value>,
    pub requires_replace: Vec<AttributePath>,
}

impl PlannedChange {
    pub fn action(&self) -> PlannedAction {
        match (&self.prior, &self.planned) {
            (None, None) => PlannedAction::NoOp,
            (None, Some(_)) => PlannedAction::Create,
            (Some(_), None) => PlannedAction::Delete,
            (Some(_), Some(_)) if !self.requires_replace.is_empty() => PlannedAction::Replace,
            (Some(prior), Some(planned)) if prior == planned => PlannedAction::NoOp,
            (Some(_), Some(_)) => PlannedAction::Update,
        }
    }
}

/// Plan a resource change; `config == None` means the resource is being destroyed
pub fn plan(schema: &Schema, prior: Option<&Value>, config: Option<&Value>) -> PlannedChange {
    let Some(config) = config else {
        return PlannedChange {
            prior: prior.cloned(),
            planned: None,
            requires_replace: Vec::new(),
        };
    };

    let mut planned: IndexMap<String, Value> = IndexMap::new();
    let mut requires_replace = Vec::new();

    // First pass: configured values and defaults; computed-null values keep prior
    for (name, attr) in schema.attributes() {
        let configured = config.get(name);
        let prior_value = prior.map(|p| p.get(name));

        let value = if !configured.is_null() && attr.is_configurable() {
            configured.clone()
        } else if let Some(default) = &attr.default {
            default.clone()
        } else if attr.is_computed() {
            match prior_value {
                Some(v) if !v.is_null() => v.clone(),
                _ => Value::Unknown,
            }
        } else {
            Value::Null
        };

        if attr.has_modifier(PlanModifier::RequiresReplace) {
            if let Some(prior_value) = prior_value {
                if value.is_fully_known() && &value != prior_value {
                    requires_replace.push(AttributePath::attr(name.clone()));
                }
            }
        }

        planned.insert(name.clone(), value);
    }

    // Second pass: any change invalidates computed values not pinned to state
    if let Some(prior) = prior {
        let replacing = !requires_replace.is_empty();
        let changed = schema
            .attributes()
            .filter(|(_, attr)| attr.is_configurable())
            .any(|(name, _)| planned.get(name) != Some(prior.get(name)));

        if changed {
            for (name, attr) in schema.attributes() {
                let pinned = attr.has_modifier(PlanModifier::UseStateForUnknown) && !replacing;
                let configured = config.get(name);
                if attr.is_computed() && configured.is_null() && attr.default.is_none() && !pinned {
                    planned.insert(name.clone(), Value::Unknown);
                }
            }
        }
    }

    PlannedChange {
        prior: prior.cloned(),
        planned: Some(Value::Object(planned)),
        requires_replace,
    }
}
