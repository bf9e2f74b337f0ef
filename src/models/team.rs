//! Team model.

use serde::{Deserialize, Serialize};

use super::{EntityId, TeamId};

/// A team registered in the tournament.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier (derived from name + abbreviation)
    pub id: TeamId,

    /// Display name
    pub name: String,

    /// Short abbreviation (e.g., "FAL")
    pub abbreviation: String,
}

impl Team {
    /// Create a new Team with auto-generated ID.
    pub fn new(name: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        let name = name.into();
        let abbreviation = abbreviation.into();
        let id = EntityId::generate(&[&name, &abbreviation]);

        Self {
            id,
            name,
            abbreviation,
        }
    }

    /// Create a Team with an explicit id (e.g., loaded from a fixture).
    pub fn with_id(id: TeamId, name: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            abbreviation: abbreviation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_id_deterministic() {
        let t1 = Team::new("Falcons", "FAL");
        let t2 = Team::new("Falcons", "FAL");
        assert_eq!(t1.id, t2.id);
    }

    #[test]
    fn test_team_with_id() {
        let team = Team::with_id(EntityId::from("t-1"), "Falcons", "FAL");
        assert_eq!(team.id.as_str(), "t-1");
        assert_eq!(team.name, "Falcons");
    }

    #[test]
    fn test_team_serialization() {
        let team = Team::new("Falcons", "FAL");
        let json = serde_json::to_string(&team).unwrap();
        let deserialized: Team = serde_json::from_str(&json).unwrap();
        assert_eq!(team.id, deserialized.id);
        assert_eq!(team.abbreviation, deserialized.abbreviation);
    }
}
