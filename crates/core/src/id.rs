//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a product (caller-chosen, e.g. `"P1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

/// Identifier of a location (caller-chosen, e.g. `"WH-1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

/// Identifier of a movement, assigned by the store in creation order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(i64);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Parse an identifier from user input.
            ///
            /// Surrounding whitespace is trimmed; an empty result is rejected.
            pub fn parse(raw: &str) -> Result<Self, DomainError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::validation(concat!($name, " cannot be empty")));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_newtype!(ProductId, "product_id");
impl_string_newtype!(LocationId, "location_id");

impl MovementId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for MovementId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for MovementId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for MovementId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::invalid_id(format!("movement_id: {e}")))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_ids_are_trimmed() {
        let id = ProductId::parse("  P1 ").unwrap();
        assert_eq!(id.as_str(), "P1");
        assert_eq!(id.to_string(), "P1");
    }

    #[test]
    fn blank_string_ids_are_rejected() {
        match LocationId::parse("   ").unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("location_id")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn movement_id_parses_integers_only() {
        assert_eq!("42".parse::<MovementId>().unwrap(), MovementId::new(42));
        assert!(matches!(
            "abc".parse::<MovementId>(),
            Err(DomainError::InvalidId(_))
        ));
    }

    #[test]
    fn serde_is_transparent() {
        let id = ProductId::parse("P1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"P1\"");

        let back: MovementId = serde_json::from_str("7").unwrap();
        assert_eq!(back.value(), 7);
    }
}
