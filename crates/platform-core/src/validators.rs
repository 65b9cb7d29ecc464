//! Attribute validators
//!
//! Validators skip null and unknown values. Failures are pushed as
//! attribute-scoped error diagnostics.

use regex::Regex;

use crate::diagnostics::Diagnostics;
use crate::path::AttributePath;
use crate::value::Value;

/// Maximum Levenshtein distance to consider for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

const INVALID_VALUE: &str = "Invalid attribute value";

#[derive(Debug, Clone)]
pub enum Validator {
    /// String must equal one of the listed values (case-sensitive)
    OneOf(Vec<String>),

    /// String must have at least this many characters
    LengthAtLeast(usize),

    /// String must match the pattern
    RegexMatches { regex: Regex, message: String },

    /// String must not equal any of the listed values, ignoring ASCII case
    NoneOfCaseInsensitive { values: Vec<String>, message: String },

    /// Apply the inner validator to every list or set element
    Each(Box<Validator>),
}

impl Validator {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn regex(regex: Regex, message: impl Into<String>) -> Self {
        Validator::RegexMatches {
            regex,
            message: message.into(),
        }
    }

    pub fn none_of_case_insensitive<I, S>(values: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator::NoneOfCaseInsensitive {
            values: values.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    pub fn each(inner: Validator) -> Self {
        Validator::Each(Box::new(inner))
    }

    /// Human-readable description, used in schema listings
    pub fn description(&self) -> String {
        match self {
            Validator::OneOf(values) => format!("one of [{}]", values.join(", ")),
            Validator::LengthAtLeast(n) => format!("length >= {}", n),
            Validator::RegexMatches { regex, .. } => format!("matches {}", regex.as_str()),
            Validator::NoneOfCaseInsensitive { values, .. } => {
                format!("none of [{}] (case-insensitive)", values.join(", "))
            }
            Validator::Each(inner) => format!("each element: {}", inner.description()),
        }
    }

    pub fn validate(&self, path: &AttributePath, value: &Value, diags: &mut Diagnostics) {
        if value.is_null() || value.is_unknown() {
            return;
        }

        if let Validator::Each(inner) = self {
            if let Some(items) = value.as_elements() {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(&path.index(i), item, diags);
                }
            }
            return;
        }

        let Some(s) = value.as_str() else {
            return;
        };

        match self {
            Validator::OneOf(allowed) => {
                if !allowed.iter().any(|a| a == s) {
                    let quoted: Vec<String> = allowed.iter().map(|a| format!("{:?}", a)).collect();
                    let mut detail =
                        format!("value must be one of: [{}], got: {:?}", quoted.join(" "), s);
                    if let Some(suggestion) = closest(s, allowed) {
                        detail.push_str(&format!("; did you mean '{}'?", suggestion));
                    }
                    diags.attribute_error(path.clone(), INVALID_VALUE, detail);
                }
            }
            Validator::LengthAtLeast(min) => {
                let len = s.chars().count();
                if len < *min {
                    diags.attribute_error(
                        path.clone(),
                        "Invalid attribute value length",
                        format!("string length must be at least {}, got: {}", min, len),
                    );
                }
            }
            Validator::RegexMatches { regex, message } => {
                if !regex.is_match(s) {
                    diags.attribute_error(
                        path.clone(),
                        INVALID_VALUE,
                        format!("{}, got: {:?}", message, s),
                    );
                }
            }
            Validator::NoneOfCaseInsensitive { values, message } => {
                if values.iter().any(|v| v.eq_ignore_ascii_case(s)) {
                    diags.attribute_error(
                        path.clone(),
                        INVALID_VALUE,
                        format!("'{}' {}", s, message),
                    );
                }
            }
            Validator::Each(_) => {}
        }
    }
}

/// Closest allowed value within the suggestion distance
fn closest<'a>(input: &str, allowed: &'a [String]) -> Option<&'a str> {
    allowed
        .iter()
        .map(|candidate| (candidate, strsim::levenshtein(input, candidate)))
        .filter(|(_, distance)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate.as_str())
}
