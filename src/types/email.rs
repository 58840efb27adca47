use crate::types::value_object::{ValueObject, ValueObjectable};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex is valid")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email(pub String);

impl ValueObjectable for Email {
    type DataType = String;

    fn validate(&self) -> Result<(), String> {
        if self.0.trim().is_empty() {
            return Err("email is required".to_string());
        }
        if !EMAIL_PATTERN.is_match(self.0.trim()) {
            return Err("invalid email format".to_string());
        }
        Ok(())
    }

    fn get_value(&self) -> &Self::DataType {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for ValueObject<Email> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ValueObject::new(Email(s)).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_email() {
        assert!(Email("user@example.com".to_string()).validate().is_ok());
    }

    #[test]
    fn rejects_missing_at() {
        assert!(Email("userexample.com".to_string()).validate().is_err());
    }

    #[test]
    fn rejects_empty() {
        assert!(Email(String::new()).validate().is_err());
    }
}
