//! Self-validating newtype wrapper, the same shape the teacher crate uses
//! throughout `common::types` (`Quantity`, `Order`, `Email`, ...). A
//! `ValueObject<T>` can only be constructed through `new`, which runs
//! `T::validate` once and rejects malformed values before they ever reach a
//! repository or the wire.

use serde::Serialize;
use std::fmt::Display;

pub trait ValueObjectable {
    type DataType;

    fn validate(&self) -> Result<(), String>;
    fn get_value(&self) -> &Self::DataType;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueObject<T: ValueObjectable>(T);

impl<T: ValueObjectable> ValueObject<T> {
    pub fn new(value: T) -> Result<Self, String> {
        value.validate()?;
        Ok(Self(value))
    }

    pub fn extract(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: ValueObjectable + Display> Display for ValueObject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct NonEmpty(String);

    impl ValueObjectable for NonEmpty {
        type DataType = String;

        fn validate(&self) -> Result<(), String> {
            if self.0.trim().is_empty() {
                Err("value is required".to_string())
            } else {
                Ok(())
            }
        }

        fn get_value(&self) -> &Self::DataType {
            &self.0
        }
    }

    #[test]
    fn rejects_invalid_value() {
        assert!(ValueObject::new(NonEmpty(String::new())).is_err());
    }

    #[test]
    fn accepts_valid_value() {
        let vo = ValueObject::new(NonEmpty("ok".to_string())).unwrap();
        assert_eq!(vo.extract().get_value(), "ok");
    }
}
