//! Attribute paths used to scope diagnostics

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step into a value tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStep {
    Attribute(String),
    Index(usize),
    Key(String),
}

/// Location of an attribute, e.g. `promote_stages[1]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributePath(Vec<PathStep>);

impl AttributePath {
    /// The resource root
    pub fn root() -> Self {
        Self::default()
    }

    /// Path to a top-level attribute
    pub fn attr(name: impl Into<String>) -> Self {
        Self(vec![PathStep::Attribute(name.into())])
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        self.with(PathStep::Attribute(name.into()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.with(PathStep::Index(index))
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        self.with(PathStep::Key(key.into()))
    }

    fn with(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Name of the top-level attribute this path starts at
    pub fn attribute_name(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathStep::Attribute(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            match step {
                PathStep::Attribute(name) if i == 0 => write!(f, "{}", name)?,
                PathStep::Attribute(name) => write!(f, ".{}", name)?,
                PathStep::Index(idx) => write!(f, "[{}]", idx)?,
                PathStep::Key(key) => write!(f, "[{:?}]", key)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path = AttributePath::attr("categories").index(0).child("stages").index(2);
        assert_eq!(path.to_string(), "categories[0].stages[2]");

        let keyed = AttributePath::attr("labels").key("team");
        assert_eq!(keyed.to_string(), "labels[\"team\"]");

        assert_eq!(AttributePath::root().to_string(), "");
    }

    #[test]
    fn test_attribute_name() {
        let path = AttributePath::attr("promote_stages").index(1);
        assert_eq!(path.attribute_name(), Some("promote_stages"));
        assert!(AttributePath::root().attribute_name().is_none());
        assert!(AttributePath::root().is_root());
    }
}
