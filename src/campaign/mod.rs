//! Campaign-side inputs to an autoresolve: roster snapshot and scenario

pub mod objectives;
pub mod roster;
pub mod scenario;

pub use objectives::{ObjectiveKind, ScenarioObjective, Threshold};
pub use roster::{CampaignSnapshot, CampaignUnit, CrewMember, CrewRole, Movement, UnitKind};
pub use scenario::{
    BotForce, Camouflage, ConsolidationPolicy, DeploymentZone, MapEdge, RandomRoster, Scenario,
    StartPosition,
};
