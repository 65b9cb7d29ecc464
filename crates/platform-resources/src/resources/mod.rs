//! Resource implementations

pub mod lifecycle;
pub mod stage;

use once_cell::sync::Lazy;
use platform_core::{Validator, VersionGate};
use regex::Regex;

pub use lifecycle::{LIFECYCLE_TYPE, LifecycleResource, LifecycleState};
pub use stage::{STAGE_TYPE, StageResource, StageState};

/// Both resources need the v2 stage and lifecycle endpoints
pub const ACCESS_GATE: VersionGate = VersionGate::access("7.125.0");

static PROJECT_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9\-]{1,31}$").expect("project key pattern is valid"));

/// Project keys: lowercase, starting with a letter, 2 to 32 characters
pub(crate) fn project_key_validator() -> Validator {
    Validator::regex(
        PROJECT_KEY.clone(),
        "must be 2 - 32 lowercase alphanumeric or hyphen characters beginning with a letter",
    )
}

pub(crate) fn is_project_key(value: &str) -> bool {
    PROJECT_KEY.is_match(value)
}

/// Empty project keys select the global scope
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_key_pattern() {
        assert!(PROJECT_KEY.is_match("bookverse"));
        assert!(PROJECT_KEY.is_match("proj-1"));
        assert!(!PROJECT_KEY.is_match("p"));
        assert!(!PROJECT_KEY.is_match("Proj"));
        assert!(!PROJECT_KEY.is_match("1proj"));
        assert!(!PROJECT_KEY.is_match(&"a".repeat(33)));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("proj")), Some("proj"));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
    }
}
