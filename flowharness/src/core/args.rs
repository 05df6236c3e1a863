//! Optional argument bundles attached to a flow identity.

use crate::errors::ParameterError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Maximum length of a single argument value in bytes.
pub const MAX_ARG_VALUE_LEN: usize = 1024;

#[allow(clippy::expect_used)]
static ARG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("argument name pattern is valid"));

/// A validated, ordered, string-keyed argument map.
///
/// Ordering is stable so two bundles with the same entries compare and hash
/// equal regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowArgs(BTreeMap<String, String>);

impl FlowArgs {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bundle from name/value pairs, validating each.
    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Result<Self, ParameterError>
    where
        N: Into<String>,
        V: Into<String>,
    {
        let mut args = Self::new();
        for (name, value) in pairs {
            args.insert(name, value)?;
        }
        Ok(args)
    }

    /// Inserts one argument after validating its name and value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ParameterError> {
        let name = name.into();
        let value = value.into();

        if !ARG_NAME.is_match(&name) {
            return Err(ParameterError::argument(
                name,
                "names must be lowercase identifiers",
            ));
        }
        if value.trim().is_empty() {
            return Err(ParameterError::argument(name, "value must not be empty"));
        }
        if value.len() > MAX_ARG_VALUE_LEN {
            return Err(ParameterError::argument(
                name,
                format!("value exceeds {MAX_ARG_VALUE_LEN} bytes"),
            ));
        }

        self.0.insert(name, value);
        Ok(())
    }

    /// Gets an argument value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns true if the bundle has no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the arguments in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_args() {
        let args = FlowArgs::from_pairs([("label", "Pump"), ("scale_x", "2")]).unwrap();
        assert_eq!(args.get("label"), Some("Pump"));
        assert_eq!(args.iter().count(), 2);
    }

    #[test]
    fn test_order_independent_equality() {
        let a = FlowArgs::from_pairs([("a", "1"), ("b", "2")]).unwrap();
        let b = FlowArgs::from_pairs([("b", "2"), ("a", "1")]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_bad_names() {
        for name in ["Label", "1st", "with-dash", "", "a.b"] {
            assert!(
                matches!(
                    FlowArgs::from_pairs([(name, "x")]),
                    Err(ParameterError::InvalidArgument { .. })
                ),
                "name {name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(FlowArgs::from_pairs([("label", "  ")]).is_err());
        let long = "x".repeat(MAX_ARG_VALUE_LEN + 1);
        assert!(FlowArgs::from_pairs([("label", long)]).is_err());
    }
}
