//! Lifecycle stage resource (`platform_lifecycle_stage`)
//!
//! Stages live either in the global scope or inside a project. Project
//! stages are addressed by name plus the `project_key` query parameter, and
//! their names carry the project key as a prefix.

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use platform_client::{ClientError, ProviderMeta, RequestBuilder};
use platform_core::{
    AttrType, Attribute, AttributePath, Diagnostics, Schema, Validator, Value, VersionGate,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ACCESS_GATE, non_empty, project_key_validator};
use crate::adapter::{Expect, RestAdapter, Verb, split_import_id};
use crate::error::{Operation, ResourceError, Result};
use crate::resource::Resource;

pub const STAGE_TYPE: &str = "platform_lifecycle_stage";

const STAGES_PATH: &str = "access/api/v2/stages";
const STAGE_PATH: &str = "access/api/v2/stages/{name}";

pub const DEFAULT_CATEGORY: &str = "promote";
pub const CATEGORIES: [&str; 3] = ["none", "code", "promote"];

/// Stage scope, derived from the presence of a project key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Project,
}

impl Scope {
    pub fn for_project_key(project_key: Option<&str>) -> Self {
        match non_empty(project_key) {
            Some(_) => Scope::Project,
            None => Scope::Global,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Global => "GLOBAL",
            Scope::Project => "PROJECT",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted stage state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageState {
    pub name: String,
    #[serde(default)]
    pub project_key: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub repositories: Option<BTreeSet<String>>,
    #[serde(default)]
    pub used_in_lifecycles: Option<Vec<String>>,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub modified: Option<i64>,
    #[serde(default)]
    pub total_repository_count: Option<i64>,
}

impl StageState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_project_key(mut self, project_key: impl Into<String>) -> Self {
        self.project_key = Some(project_key.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Project key, treating an empty key as global
    pub fn project_key(&self) -> Option<&str> {
        non_empty(self.project_key.as_deref())
    }

    /// Category with the default applied
    pub fn effective_category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn expected_scope(&self) -> Scope {
        Scope::for_project_key(self.project_key())
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.and_then(DateTime::from_timestamp_millis)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified.and_then(DateTime::from_timestamp_millis)
    }

    /// Fill computed attributes still missing from `fresh`
    fn with_computed_from(mut self, fresh: StageState) -> Self {
        self.category = self.category.or(fresh.category);
        self.scope = self.scope.or(fresh.scope);
        self.repositories = self.repositories.or(fresh.repositories);
        self.used_in_lifecycles = self.used_in_lifecycles.or(fresh.used_in_lifecycles);
        self.created = self.created.or(fresh.created);
        self.modified = self.modified.or(fresh.modified);
        self.total_repository_count = self.total_repository_count.or(fresh.total_repository_count);
        self
    }
}

/// Stage document as returned by the platform
#[derive(Debug, Clone, Deserialize)]
pub struct StageDocument {
    pub name: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub project_key: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub repositories: Option<Vec<String>>,
    #[serde(default)]
    pub used_in_lifecycles: Option<Vec<String>>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub modified: Option<i64>,
    #[serde(default)]
    pub total_repository_count: Option<i64>,
}

impl StageDocument {
    /// Convert to state; `project_key` is the key the stage was addressed with
    pub fn into_state(self, project_key: Option<&str>) -> StageState {
        let project_key = non_empty(self.project_key.as_deref())
            .or(non_empty(project_key))
            .map(str::to_string);

        let scope = match self.scope.as_deref().map(str::trim) {
            Some(scope) if !scope.is_empty() => scope.to_uppercase(),
            _ => Scope::for_project_key(project_key.as_deref()).to_string(),
        };

        StageState {
            name: self.name,
            project_key,
            category: Some(self.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string())),
            scope: Some(scope),
            repositories: Some(self.repositories.unwrap_or_default().into_iter().collect()),
            used_in_lifecycles: Some(self.used_in_lifecycles.unwrap_or_default()),
            created: Some(self.created.unwrap_or_default()),
            modified: Some(self.modified.unwrap_or_default()),
            total_repository_count: Some(self.total_repository_count.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateStageRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_key: Option<&'a str>,
    category: &'a str,
}

/// PATCH body carrying only the fields that changed
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
struct StagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

impl StagePatch {
    fn diff(prior: &StageState, plan: &StageState) -> Self {
        let mut patch = StagePatch::default();
        if prior.name != plan.name {
            patch.name = Some(plan.name.clone());
        }
        if prior.effective_category() != plan.effective_category() {
            patch.category = Some(plan.effective_category().to_string());
        }
        patch
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none()
    }
}

pub struct StageResource {
    meta: ProviderMeta,
    adapter: RestAdapter,
}

impl StageResource {
    pub fn new(meta: &ProviderMeta) -> Self {
        Self {
            meta: meta.clone(),
            adapter: RestAdapter::new(meta, STAGE_TYPE),
        }
    }

    fn document(&self, name: &str, project_key: Option<&str>) -> RequestBuilder<'_> {
        self.adapter
            .request(STAGE_PATH)
            .path_param("name", name)
            .query_param_opt("project_key", project_key)
    }

    /// GET the stage in the planned scope before touching it
    async fn verify_scope(&self, plan: &StageState) -> Result<StageDocument> {
        let failed = |e: ClientError| ResourceError::failed(Operation::Update, STAGE_TYPE, e);

        let response = self
            .document(&plan.name, plan.project_key())
            .get()
            .await
            .map_err(failed)?;

        if response.is_not_found() {
            return Err(ResourceError::MissingInScope {
                kind: "stage",
                name: plan.name.clone(),
                scope: plan.expected_scope().to_string(),
            });
        }

        response.error_for_status().map_err(failed)?.json().map_err(failed)
    }
}

#[async_trait]
impl Resource for StageResource {
    type State = StageState;

    fn type_name(&self) -> &'static str {
        STAGE_TYPE
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .with_description("A lifecycle stage in the global scope or scoped to a project.")
            .with_attribute(
                "name",
                Attribute::required(AttrType::String)
                    .with_description("Stage name; must start with '<project_key>-' for project stages.")
                    .requires_replace()
                    .validate(Validator::LengthAtLeast(1)),
            )
            .with_attribute(
                "project_key",
                Attribute::optional(AttrType::String)
                    .with_description("Project the stage belongs to; omit for a global stage.")
                    .requires_replace()
                    .validate(project_key_validator()),
            )
            .with_attribute(
                "category",
                Attribute::optional(AttrType::String)
                    .with_default(Value::string(DEFAULT_CATEGORY))
                    .with_description("Stage category.")
                    .validate(Validator::one_of(CATEGORIES)),
            )
            .with_attribute(
                "scope",
                Attribute::computed(AttrType::String)
                    .with_description("GLOBAL or PROJECT.")
                    .use_state_for_unknown(),
            )
            .with_attribute(
                "repositories",
                Attribute::computed(AttrType::set(AttrType::String)).use_state_for_unknown(),
            )
            .with_attribute(
                "used_in_lifecycles",
                Attribute::computed(AttrType::list(AttrType::String)).use_state_for_unknown(),
            )
            .with_attribute(
                "created",
                Attribute::computed(AttrType::Int64)
                    .with_description("Creation time in milliseconds since the epoch.")
                    .use_state_for_unknown(),
            )
            .with_attribute(
                "modified",
                Attribute::computed(AttrType::Int64)
                    .with_description("Last modification time in milliseconds since the epoch."),
            )
            .with_attribute(
                "total_repository_count",
                Attribute::computed(AttrType::Int64).use_state_for_unknown(),
            )
    }

    fn meta(&self) -> &ProviderMeta {
        &self.meta
    }

    fn version_gate(&self) -> Option<VersionGate> {
        Some(ACCESS_GATE)
    }

    fn validate_config(&self, config: &StageState, diags: &mut Diagnostics) {
        let Some(project_key) = config.project_key() else {
            return;
        };

        // Case-sensitive, unlike the reserved-name check on lifecycles
        let prefix = format!("{}-", project_key);
        if !config.name.starts_with(&prefix) {
            let example: &str = if config.name.is_empty() { "qa" } else { &config.name };
            diags.attribute_error(
                AttributePath::attr("name"),
                "Invalid stage name",
                format!(
                    "stage name must start with the project key prefix '{}' when project_key is set (for example '{}{}'), got: {:?}",
                    prefix, prefix, example, config.name
                ),
            );
        }
    }

    async fn create(&self, plan: StageState) -> Result<StageState> {
        let project_key = plan.project_key();
        let body = CreateStageRequest {
            name: &plan.name,
            project_key,
            category: plan.effective_category(),
        };

        let document: StageDocument = self
            .adapter
            .create(self.adapter.request(STAGES_PATH).body(&body), Verb::Post)
            .await?;

        info!(stage = %plan.name, scope = %plan.expected_scope(), "stage created");
        Ok(document.into_state(project_key))
    }

    async fn read(&self, state: StageState) -> Result<Option<StageState>> {
        let project_key = state.project_key();
        let document: Option<StageDocument> = self
            .adapter
            .read(self.document(&state.name, project_key))
            .await?;

        Ok(document.map(|d| d.into_state(project_key)))
    }

    async fn update(&self, prior: StageState, plan: StageState) -> Result<StageState> {
        let current = self.verify_scope(&plan).await?;

        let patch = StagePatch::diff(&prior, &plan);
        if patch.is_empty() {
            debug!(stage = %plan.name, "no effective changes; skipping PATCH");
            let fresh = current.into_state(plan.project_key());
            return Ok(plan.with_computed_from(fresh));
        }

        let document: StageDocument = self
            .adapter
            .update(
                self.document(&plan.name, plan.project_key()).body(&patch),
                Verb::Patch,
                Expect::AnySuccess,
            )
            .await?;

        info!(stage = %plan.name, scope = %plan.expected_scope(), "stage updated");
        Ok(document.into_state(plan.project_key()))
    }

    async fn delete(&self, state: StageState) -> Result<Diagnostics> {
        self.adapter
            .delete(self.document(&state.name, state.project_key()))
            .await?;

        info!(stage = %state.name, scope = %state.expected_scope(), "stage deleted");
        Ok(Diagnostics::new())
    }

    fn parse_import_id(&self, id: &str) -> Result<StageState> {
        let (name, project_key) = split_import_id(id.trim());
        if name.is_empty() || project_key.is_some_and(|pk| pk.contains(':')) {
            return Err(ResourceError::InvalidImportId {
                resource: STAGE_TYPE.to_string(),
                id: id.to_string(),
                expected: "'name' or 'name:project_key'",
            });
        }

        Ok(StageState {
            name: name.to_string(),
            project_key: project_key.map(str::to_string),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_client::PlatformClient;

    fn resource() -> StageResource {
        let client = PlatformClient::new("https://platform.example.com").unwrap();
        StageResource::new(&ProviderMeta::new(client).with_access_version("7.125.0"))
    }

    fn document(json: serde_json::Value) -> StageDocument {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_into_state_normalizes_scope_and_collections() {
        let state = document(serde_json::json!({
            "name": "proj-qa",
            "scope": "project",
            "project_key": "proj",
            "category": "code",
            "repositories": null,
            "created": 1700000000000_i64,
        }))
        .into_state(Some("proj"));

        assert_eq!(state.scope.as_deref(), Some("PROJECT"));
        assert_eq!(state.repositories, Some(BTreeSet::new()));
        assert_eq!(state.used_in_lifecycles, Some(vec![]));
        assert_eq!(state.category.as_deref(), Some("code"));
        assert_eq!(
            state.created_at().map(|t| t.to_rfc3339()),
            Some("2023-11-14T22:13:20+00:00".to_string())
        );
    }

    #[test]
    fn test_into_state_derives_missing_scope() {
        let global = document(serde_json::json!({"name": "deploy"})).into_state(None);
        assert_eq!(global.scope.as_deref(), Some("GLOBAL"));
        assert_eq!(global.project_key, None);
        assert_eq!(global.category.as_deref(), Some(DEFAULT_CATEGORY));

        let project = document(serde_json::json!({"name": "proj-qa"})).into_state(Some("proj"));
        assert_eq!(project.scope.as_deref(), Some("PROJECT"));
        assert_eq!(project.project_key.as_deref(), Some("proj"));
    }

    #[test]
    fn test_patch_diff_uses_effective_category() {
        let prior = StageState::new("proj-s").with_project_key("proj");
        let same = StageState::new("proj-s")
            .with_project_key("proj")
            .with_category("promote");
        assert!(StagePatch::diff(&prior, &same).is_empty());

        let changed = same.clone().with_category("code");
        let patch = StagePatch::diff(&prior, &changed);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"category": "code"})
        );
    }

    #[test]
    fn test_prefix_validation() {
        let resource = resource();

        let mut diags = Diagnostics::new();
        resource.validate_config(
            &StageState::new("bookverse-deploy").with_project_key("bookverse"),
            &mut diags,
        );
        assert!(diags.is_empty());

        let mut diags = Diagnostics::new();
        resource.validate_config(
            &StageState::new("deploy").with_project_key("bookverse"),
            &mut diags,
        );
        insta::assert_snapshot!(diags.to_string(), @r#"name: Invalid stage name: stage name must start with the project key prefix 'bookverse-' when project_key is set (for example 'bookverse-deploy'), got: "deploy""#);

        // Prefix match is case-sensitive
        let mut diags = Diagnostics::new();
        resource.validate_config(
            &StageState::new("Bookverse-deploy").with_project_key("bookverse"),
            &mut diags,
        );
        assert!(diags.has_errors());

        let mut diags = Diagnostics::new();
        resource.validate_config(&StageState::new("deploy"), &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_parse_import_id() {
        let resource = resource();

        let global = resource.parse_import_id("deploy").unwrap();
        assert_eq!(global.name, "deploy");
        assert_eq!(global.project_key, None);

        let project = resource.parse_import_id("proj-qa:proj").unwrap();
        assert_eq!(project.name, "proj-qa");
        assert_eq!(project.project_key.as_deref(), Some("proj"));

        assert!(matches!(
            resource.parse_import_id(":proj"),
            Err(ResourceError::InvalidImportId { .. })
        ));
        assert!(resource.parse_import_id("a:b:c").is_err());
    }

    #[test]
    fn test_schema_shape() {
        let schema = resource().schema();
        assert_eq!(
            schema.attribute("category").unwrap().default,
            Some(Value::string("promote"))
        );
        assert!(schema.attribute("scope").unwrap().is_computed());
        assert!(!schema.attribute("name").unwrap().is_computed());
    }
}
