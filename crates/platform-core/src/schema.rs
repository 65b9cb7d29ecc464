//! Resource schemas
//!
//! A schema lists a resource's attributes with their type, whether the user
//! sets them (required / optional) or the platform does (computed), defaults,
//! plan modifiers and validators.

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Value as JsonValue, json};

use crate::diagnostics::Diagnostics;
use crate::path::AttributePath;
use crate::validators::Validator;
use crate::value::Value;

/// Attribute type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrType {
    String,
    Int64,
    Bool,
    List(Box<AttrType>),
    Set(Box<AttrType>),
    Map(Box<AttrType>),
    Object(IndexMap<String, AttrType>),
}

impl AttrType {
    pub fn list(elem: AttrType) -> Self {
        AttrType::List(Box::new(elem))
    }

    pub fn set(elem: AttrType) -> Self {
        AttrType::Set(Box::new(elem))
    }

    pub fn map(elem: AttrType) -> Self {
        AttrType::Map(Box::new(elem))
    }

    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, AttrType)>,
        S: Into<String>,
    {
        AttrType::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrType::String => write!(f, "string"),
            AttrType::Int64 => write!(f, "number"),
            AttrType::Bool => write!(f, "bool"),
            AttrType::List(elem) => write!(f, "list({})", elem),
            AttrType::Set(elem) => write!(f, "set({})", elem),
            AttrType::Map(elem) => write!(f, "map({})", elem),
            AttrType::Object(fields) => {
                let inner: Vec<String> = fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                write!(f, "object({{{}}})", inner.join(", "))
            }
        }
    }
}

/// Adjustments applied to an attribute while planning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanModifier {
    /// A change to this attribute destroys and recreates the resource
    RequiresReplace,
    /// Keep the prior state value instead of marking a computed value unknown
    UseStateForUnknown,
}

/// Who sets an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Required,
    Optional,
    /// Optional, filled in by the provider when omitted
    OptionalComputed,
    Computed,
}

/// Schema attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub ty: AttrType,
    pub mode: Mode,
    pub default: Option<Value>,
    pub sensitive: bool,
    pub description: String,
    pub plan_modifiers: Vec<PlanModifier>,
    pub validators: Vec<Validator>,
}

impl Attribute {
    fn new(ty: AttrType, mode: Mode) -> Self {
        Self {
            ty,
            mode,
            default: None,
            sensitive: false,
            description: String::new(),
            plan_modifiers: Vec::new(),
            validators: Vec::new(),
        }
    }

    pub fn required(ty: AttrType) -> Self {
        Self::new(ty, Mode::Required)
    }

    pub fn optional(ty: AttrType) -> Self {
        Self::new(ty, Mode::Optional)
    }

    pub fn optional_computed(ty: AttrType) -> Self {
        Self::new(ty, Mode::OptionalComputed)
    }

    pub fn computed(ty: AttrType) -> Self {
        Self::new(ty, Mode::Computed)
    }

    /// Default applied when the configuration leaves the attribute null
    ///
    /// An attribute with a default is always optional + computed.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self.mode = Mode::OptionalComputed;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::RequiresReplace);
        self
    }

    pub fn use_state_for_unknown(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::UseStateForUnknown);
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn is_computed(&self) -> bool {
        matches!(self.mode, Mode::Computed | Mode::OptionalComputed)
    }

    /// Whether the user may set this attribute
    pub fn is_configurable(&self) -> bool {
        !matches!(self.mode, Mode::Computed)
    }

    pub fn has_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }
}

/// Resource schema
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub version: u64,
    pub description: String,
    attributes: IndexMap<String, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&String, &Attribute)> {
        self.attributes.iter()
    }

    /// Object type covering every attribute
    pub fn object_type(&self) -> AttrType {
        AttrType::Object(
            self.attributes
                .iter()
                .map(|(name, attr)| (name.clone(), attr.ty.clone()))
                .collect(),
        )
    }

    /// Static checks of a configuration value
    ///
    /// Reports missing required attributes, values set on computed-only
    /// attributes, and every attribute validator failure. Unknown values are
    /// skipped; they are checked again once known.
    pub fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();

        for (name, attr) in &self.attributes {
            let path = AttributePath::attr(name.clone());
            let value = config.get(name);

            match attr.mode {
                Mode::Required if value.is_null() => diags.attribute_error(
                    path,
                    "Missing required argument",
                    format!("The argument \"{}\" is required, but no definition was found.", name),
                ),
                Mode::Computed if !value.is_null() && !value.is_unknown() => diags.attribute_error(
                    path,
                    "Invalid configuration for read-only attribute",
                    format!("\"{}\" is computed by the platform and cannot be set.", name),
                ),
                _ => {
                    for validator in &attr.validators {
                        validator.validate(&path, value, &mut diags);
                    }
                }
            }
        }

        diags
    }

    /// JSON description used by tooling
    pub fn to_json(&self) -> JsonValue {
        let attributes: serde_json::Map<String, JsonValue> = self
            .attributes
            .iter()
            .map(|(name, attr)| {
                let mut doc = json!({
                    "type": attr.ty.to_string(),
                    "required": attr.mode == Mode::Required,
                    "optional": matches!(attr.mode, Mode::Optional | Mode::OptionalComputed),
                    "computed": attr.is_computed(),
                });
                if let Some(default) = &attr.default {
                    doc["default"] = default.to_json();
                }
                if !attr.description.is_empty() {
                    doc["description"] = JsonValue::String(attr.description.clone());
                }
                if attr.sensitive {
                    doc["sensitive"] = JsonValue::Bool(true);
                }
                if attr.has_modifier(PlanModifier::RequiresReplace) {
                    doc["requires_replace"] = JsonValue::Bool(true);
                }
                if !attr.validators.is_empty() {
                    doc["validators"] = attr
                        .validators
                        .iter()
                        .map(Validator::description)
                        .collect::<Vec<_>>()
                        .into();
                }
                (name.clone(), doc)
            })
            .collect();

        json!({
            "version": self.version,
            "description": self.description,
            "attributes": attributes,
        })
    }
}
