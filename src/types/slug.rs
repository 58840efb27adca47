use crate::types::value_object::ValueObjectable;
use regex::Regex;
use serde::Serialize;
use std::fmt::Display;
use std::sync::LazyLock;

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("static regex is valid"));

/// A tenant's globally-unique URL slug (§3.1).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slug(pub String);

impl ValueObjectable for Slug {
    type DataType = String;

    fn validate(&self) -> Result<(), String> {
        if self.0.is_empty() {
            return Err("slug is required".to_string());
        }
        if self.0.len() > 63 {
            return Err("slug must be at most 63 characters".to_string());
        }
        if !SLUG_PATTERN.is_match(&self.0) {
            return Err(
                "slug must contain only lowercase letters, digits, and hyphens".to_string(),
            );
        }
        Ok(())
    }

    fn get_value(&self) -> &Self::DataType {
        &self.0
    }
}

impl Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_slug() {
        assert!(Slug("acme-corp".to_string()).validate().is_ok());
    }

    #[test]
    fn rejects_uppercase() {
        assert!(Slug("Acme".to_string()).validate().is_err());
    }

    #[test]
    fn rejects_empty() {
        assert!(Slug(String::new()).validate().is_err());
    }

    #[test]
    fn rejects_double_hyphen() {
        assert!(Slug("acme--corp".to_string()).validate().is_err());
    }
}
