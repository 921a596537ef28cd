use serde::{Deserialize, Serialize};

use stockflow_core::{DomainResult, Entity, LocationId};

/// Entity: Location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    location_id: LocationId,
    name: String,
}

impl Location {
    pub fn new(location_id: LocationId, name: impl Into<String>) -> Self {
        Self {
            location_id,
            name: name.into(),
        }
    }

    pub fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&mut self, patch: &LocationPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.location_id
    }
}

/// Input: add a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    pub location_id: LocationId,
    pub name: String,
}

impl NewLocation {
    pub fn parse(location_id: &str, name: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            location_id: LocationId::parse(location_id)?,
            name: name.into(),
        })
    }

    pub fn into_location(self) -> Location {
        Location::new(self.location_id, self.name)
    }
}

/// Input: partial update of a location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPatch {
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockflow_core::DomainError;

    #[test]
    fn parse_and_rename() {
        let mut loc = NewLocation::parse("L1", "Warehouse").unwrap().into_location();
        assert_eq!(loc.location_id().as_str(), "L1");

        loc.apply(&LocationPatch {
            name: Some("Main Warehouse".to_string()),
        });
        assert_eq!(loc.name(), "Main Warehouse");
        assert_eq!(loc.id().as_str(), "L1");
    }

    #[test]
    fn blank_identifier_is_rejected() {
        assert!(matches!(
            NewLocation::parse(" ", "Nowhere"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn empty_name_is_allowed() {
        let loc = NewLocation::parse("L2", "").unwrap().into_location();
        assert_eq!(loc.name(), "");
    }
}
