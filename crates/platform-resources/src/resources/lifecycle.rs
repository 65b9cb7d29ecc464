//! Lifecycle resource (`platform_lifecycle`)
//!
//! The platform keeps exactly one lifecycle per scope (global, or one per
//! project). It always exists, so "create" and "update" are the same PATCH of
//! the ordered `promote_stages`, followed by a read to capture the computed
//! `release_stage` and `categories` view. There is no delete endpoint.

use async_trait::async_trait;
use platform_client::{ClientError, ProviderMeta, RequestBuilder, StatusCode};
use platform_core::{AttrType, Attribute, Diagnostics, Schema, Validator, VersionGate};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use super::{ACCESS_GATE, is_project_key, non_empty, project_key_validator};
use crate::adapter::{Expect, RestAdapter, Verb};
use crate::error::{Operation, ResourceError, Result};
use crate::resource::Resource;

pub const LIFECYCLE_TYPE: &str = "platform_lifecycle";

const LIFECYCLE_PATH: &str = "access/api/v2/lifecycle";

/// Global stages managed by the platform itself
pub const RESERVED_STAGES: [&str; 3] = ["PR", "COMMIT", "PROD"];

const PROMOTE_CATEGORY: &str = "promote";

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stage reference inside a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStage {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleCategory {
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stages: Vec<CategoryStage>,
}

/// Persisted lifecycle state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleState {
    #[serde(default)]
    pub project_key: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub promote_stages: Vec<String>,
    #[serde(default)]
    pub release_stage: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<LifecycleCategory>>,
}

impl LifecycleState {
    pub fn new<I, S>(promote_stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            promote_stages: promote_stages.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_project_key(mut self, project_key: impl Into<String>) -> Self {
        self.project_key = Some(project_key.into());
        self
    }

    pub fn project_key(&self) -> Option<&str> {
        non_empty(self.project_key.as_deref())
    }

    fn scope_label(&self) -> String {
        match self.project_key() {
            Some(project_key) => format!("project '{}'", project_key),
            None => "the global scope".to_string(),
        }
    }
}

/// Lifecycle document as returned by the platform
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LifecycleDocument {
    #[serde(default)]
    pub project_key: Option<String>,
    #[serde(default)]
    pub promote_stages: Option<Vec<String>>,
    #[serde(default)]
    pub release_stage: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<LifecycleCategory>>,
}

impl LifecycleDocument {
    /// Stage names of the first `promote` category, in server order
    pub fn reconstructed_promote_stages(&self) -> Vec<String> {
        self.categories
            .iter()
            .flatten()
            .find(|c| c.category == PROMOTE_CATEGORY)
            .map(|c| c.stages.iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Explicit `promote_stages` when present, otherwise the reconstruction
    pub fn promote_stages(&self) -> Vec<String> {
        let reconstructed = self.reconstructed_promote_stages();
        match &self.promote_stages {
            Some(explicit) => {
                if self.categories.is_some() && explicit != &reconstructed {
                    warn!(
                        explicit = ?explicit,
                        reconstructed = ?reconstructed,
                        "lifecycle promote_stages disagrees with its promote category"
                    );
                }
                explicit.clone()
            }
            None => reconstructed,
        }
    }

    pub fn into_state(self, project_key: Option<&str>) -> LifecycleState {
        let promote_stages = self.promote_stages();
        let project_key = non_empty(self.project_key.as_deref())
            .or(non_empty(project_key))
            .map(str::to_string);

        LifecycleState {
            project_key,
            promote_stages,
            release_stage: self.release_stage,
            categories: Some(self.categories.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Serialize)]
struct LifecyclePatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    project_key: Option<&'a str>,
    promote_stages: &'a [String],
}

pub struct LifecycleResource {
    meta: ProviderMeta,
    adapter: RestAdapter,
}

impl LifecycleResource {
    pub fn new(meta: &ProviderMeta) -> Self {
        Self {
            meta: meta.clone(),
            adapter: RestAdapter::new(meta, LIFECYCLE_TYPE),
        }
    }

    fn lifecycle(&self, project_key: Option<&str>) -> RequestBuilder<'_> {
        self.adapter
            .request(LIFECYCLE_PATH)
            .query_param_opt("project_key", project_key)
    }

    /// GET the lifecycle; it always exists, so a 404 is an error
    async fn fetch(&self, project_key: Option<&str>, op: Operation) -> Result<LifecycleState> {
        let failed = |e: ClientError| ResourceError::failed(op, LIFECYCLE_TYPE, e);

        let document: LifecycleDocument = self
            .lifecycle(project_key)
            .get()
            .await
            .map_err(failed)?
            .error_for_status()
            .map_err(failed)?
            .json()
            .map_err(failed)?;

        Ok(document.into_state(project_key))
    }

    /// PATCH the ordered stages, then read back the computed view
    async fn write(&self, plan: LifecycleState, op: Operation) -> Result<LifecycleState> {
        let project_key = plan.project_key();
        let body = LifecyclePatch {
            project_key,
            promote_stages: &plan.promote_stages,
        };

        self.adapter
            .send(
                self.lifecycle(project_key).body(&body),
                Verb::Patch,
                Expect::Status(StatusCode::OK),
                op,
            )
            .await?;

        let fresh = self.fetch(project_key, op).await?;
        if fresh.promote_stages != plan.promote_stages {
            warn!(
                sent = ?plan.promote_stages,
                observed = ?fresh.promote_stages,
                "lifecycle read back different promote_stages"
            );
        }

        info!(
            scope = %plan.scope_label(),
            stages = plan.promote_stages.len(),
            "lifecycle written"
        );

        Ok(LifecycleState {
            release_stage: fresh.release_stage,
            categories: fresh.categories,
            ..plan
        })
    }
}

#[async_trait]
impl Resource for LifecycleResource {
    type State = LifecycleState;

    fn type_name(&self) -> &'static str {
        LIFECYCLE_TYPE
    }

    fn schema(&self) -> Schema {
        let stage_ref = AttrType::object([("name", AttrType::String), ("scope", AttrType::String)]);
        let category = AttrType::object([
            ("category", AttrType::String),
            ("stages", AttrType::list(stage_ref)),
        ]);

        Schema::new()
            .with_description(
                "The ordered promotion stages of the global lifecycle or a project lifecycle. \
                 Lifecycles cannot be deleted; destroying this resource only removes it from state.",
            )
            .with_attribute(
                "project_key",
                Attribute::optional(AttrType::String)
                    .with_description("Project whose lifecycle is managed; omit for the global lifecycle.")
                    .requires_replace()
                    .validate(project_key_validator()),
            )
            .with_attribute(
                "promote_stages",
                Attribute::required(AttrType::list(AttrType::String))
                    .with_description("Ordered stage names of the promote category; may be empty.")
                    .validate(Validator::each(Validator::LengthAtLeast(1)))
                    .validate(Validator::each(Validator::none_of_case_insensitive(
                        RESERVED_STAGES,
                        "is a reserved global stage managed by the platform and cannot be listed in promote_stages",
                    ))),
            )
            .with_attribute(
                "release_stage",
                Attribute::computed(AttrType::String)
                    .with_description("Server-managed release stage (PROD).")
                    .use_state_for_unknown(),
            )
            .with_attribute(
                "categories",
                Attribute::computed(AttrType::list(category))
                    .with_description("Full server view of the lifecycle, grouped by category."),
            )
    }

    fn meta(&self) -> &ProviderMeta {
        &self.meta
    }

    fn version_gate(&self) -> Option<VersionGate> {
        Some(ACCESS_GATE)
    }

    async fn create(&self, plan: LifecycleState) -> Result<LifecycleState> {
        self.write(plan, Operation::Create).await
    }

    async fn read(&self, state: LifecycleState) -> Result<Option<LifecycleState>> {
        self.fetch(state.project_key(), Operation::Read).await.map(Some)
    }

    async fn update(&self, _prior: LifecycleState, plan: LifecycleState) -> Result<LifecycleState> {
        self.write(plan, Operation::Update).await
    }

    async fn delete(&self, state: LifecycleState) -> Result<Diagnostics> {
        let warning = self.adapter.delete_unsupported(format!(
            "The platform has no API to delete a lifecycle; the lifecycle of {} was removed from \
             state only and its promote_stages remain on the server. Apply promote_stages = [] \
             before destroying to release the referenced stages.",
            state.scope_label()
        ));
        Ok(Diagnostics::from(warning))
    }

    fn parse_import_id(&self, id: &str) -> Result<LifecycleState> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(LifecycleState::default());
        }
        if !is_project_key(id) {
            return Err(ResourceError::InvalidImportId {
                resource: LIFECYCLE_TYPE.to_string(),
                id: id.to_string(),
                expected: "a project key, or an empty identifier for the global lifecycle",
            });
        }
        Ok(LifecycleState {
            project_key: Some(id.to_string()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_client::PlatformClient;
    use platform_core::Value;

    fn resource() -> LifecycleResource {
        let client = PlatformClient::new("https://platform.example.com").unwrap();
        LifecycleResource::new(&ProviderMeta::new(client))
    }

    fn document(json: serde_json::Value) -> LifecycleDocument {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_reconstruction_uses_first_promote_category() {
        let doc = document(serde_json::json!({
            "release_stage": "PROD",
            "categories": [
                {"category": "code", "stages": [{"name": "PR", "scope": "GLOBAL"}]},
                {"category": "promote", "stages": [
                    {"name": "g1", "scope": "GLOBAL"},
                    {"name": "g2", "scope": "GLOBAL"}
                ]},
                {"category": "promote", "stages": [{"name": "ignored", "scope": "GLOBAL"}]},
                {"category": "release", "stages": [{"name": "PROD", "scope": "GLOBAL"}]}
            ]
        }));

        assert_eq!(doc.reconstructed_promote_stages(), vec!["g1", "g2"]);
        assert_eq!(doc.promote_stages(), vec!["g1", "g2"]);
    }

    #[test]
    fn test_explicit_promote_stages_win() {
        let doc = document(serde_json::json!({
            "promote_stages": ["b", "a"],
            "categories": [{"category": "promote", "stages": [{"name": "a"}, {"name": "b"}]}]
        }));
        assert_eq!(doc.promote_stages(), vec!["b", "a"]);
    }

    #[test]
    fn test_null_stage_scope_is_tolerated() {
        let state = document(serde_json::json!({
            "release_stage": "PROD",
            "categories": [{"category": "promote", "stages": [{"name": "g1", "scope": null}]}]
        }))
        .into_state(None);

        assert_eq!(state.promote_stages, vec!["g1"]);
        let categories = state.categories.unwrap();
        assert_eq!(categories[0].stages[0].scope, "");
    }

    #[test]
    fn test_empty_reconstruction_is_empty_not_null() {
        let state = document(serde_json::json!({
            "release_stage": "PROD",
            "categories": [{"category": "promote", "stages": null}]
        }))
        .into_state(None);

        assert!(state.promote_stages.is_empty());
        assert_eq!(state.categories.as_ref().map(Vec::len), Some(1));

        let bare = LifecycleDocument::default().into_state(Some("proj"));
        assert_eq!(bare.categories, Some(vec![]));
        assert_eq!(bare.project_key.as_deref(), Some("proj"));
    }

    #[test]
    fn test_reserved_names_rejected_case_insensitively() {
        let schema = resource().schema();
        let config = Value::Object(
            [("promote_stages".to_string(), Value::string_list(["QA", "prod"]))]
                .into_iter()
                .collect(),
        );

        let diags = schema.validate(&config);
        assert_eq!(diags.errors().count(), 1);
        insta::assert_snapshot!(diags.to_string(), @"promote_stages[1]: Invalid attribute value: 'prod' is a reserved global stage managed by the platform and cannot be listed in promote_stages");
    }

    #[test]
    fn test_parse_import_id() {
        let resource = resource();
        assert_eq!(resource.parse_import_id("").unwrap().project_key, None);
        assert_eq!(
            resource.parse_import_id("bookverse").unwrap().project_key.as_deref(),
            Some("bookverse")
        );
        assert!(matches!(
            resource.parse_import_id("Not A Key"),
            Err(ResourceError::InvalidImportId { .. })
        ));
    }

    #[test]
    fn test_state_accepts_null_promote_stages() {
        let state: LifecycleState =
            serde_json::from_value(serde_json::json!({"promote_stages": null})).unwrap();
        assert!(state.promote_stages.is_empty());
    }
}
