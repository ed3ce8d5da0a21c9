//! Scenario objectives as declared by the campaign

use serde::{Deserialize, Serialize};

use super::scenario::MapEdge;
use crate::core::types::Round;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    Destroy,
    /// Resolved exactly like `Destroy`
    Capture,
    Preserve,
    ReachMapEdge,
    ForceWithdraw,
    PreventReachMapEdge,
    Custom,
}

/// How much of the objective must be achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// An absolute number of units
    Fixed(u32),
    /// A share of the units involved, 0..=100
    Percentage(u32),
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Percentage(100)
    }
}

impl Threshold {
    /// Percentage thresholds of 100 or more
    pub fn is_total(&self) -> bool {
        matches!(self, Threshold::Percentage(p) if *p >= 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioObjective {
    pub kind: ObjectiveKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub threshold: Threshold,
    /// Names of the top-level forces this objective tracks
    #[serde(default)]
    pub associated_forces: Vec<String>,
    /// External ids of the units this objective tracks
    #[serde(default)]
    pub associated_units: Vec<String>,
    #[serde(default)]
    pub destination_edge: Option<MapEdge>,
    #[serde(default)]
    pub time_limit: Option<Round>,
    /// The time limit is a deadline ("at most") rather than a minimum
    #[serde(default)]
    pub time_limit_at_most: bool,
}

impl ScenarioObjective {
    pub fn new(kind: ObjectiveKind) -> Self {
        Self {
            kind,
            description: String::new(),
            threshold: Threshold::default(),
            associated_forces: Vec::new(),
            associated_units: Vec::new(),
            destination_edge: None,
            time_limit: None,
            time_limit_at_most: false,
        }
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_force(mut self, name: impl Into<String>) -> Self {
        self.associated_forces.push(name.into());
        self
    }

    pub fn with_unit(mut self, external_id: impl Into<String>) -> Self {
        self.associated_units.push(external_id.into());
        self
    }

    pub fn with_destination(mut self, edge: MapEdge) -> Self {
        self.destination_edge = Some(edge);
        self
    }

    pub fn with_time_limit(mut self, round: Round, at_most: bool) -> Self {
        self.time_limit = Some(round);
        self.time_limit_at_most = at_most;
        self
    }

    /// Deadline round, only when the limit is an "at most" limit
    pub fn deadline(&self) -> Option<Round> {
        self.time_limit.filter(|_| self.time_limit_at_most)
    }
}
