//! ScenarioType - Which agent script a call runs

use serde::{Deserialize, Serialize};

/// Agent scenario, one configuration per variant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioType {
    /// Routine driver check-in
    #[default]
    Checkin,
    /// Emergency escalation
    Emergency,
}

impl ScenarioType {
    pub const ALL: [ScenarioType; 2] = [ScenarioType::Checkin, ScenarioType::Emergency];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioType::Checkin => "checkin",
            ScenarioType::Emergency => "emergency",
        }
    }
}

impl std::fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScenarioType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "checkin" | "check-in" => Ok(ScenarioType::Checkin),
            "emergency" => Ok(ScenarioType::Emergency),
            _ => Err(format!("Unknown scenario type: {}", s)),
        }
    }
}
