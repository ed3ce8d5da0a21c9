//! Core type definitions used throughout the codebase

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Simulation round counter (one full Initiative..End cycle)
pub type Round = u32;

/// Team number; sides sharing a team are allies
pub type TeamId = u32;

/// Team of the human (campaign) side
pub const HUMAN_TEAM: TeamId = 1;

/// Identifier of a unit in the persistent campaign roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignUnitId(pub Uuid);

impl CampaignUnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CampaignUnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CampaignUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Side identifier inside a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Simulation entity identifier. Projected units and formations share this space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimEntityId(pub u32);

/// Force identifier inside a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ForceId(pub u32);

/// Crew skill rating
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    UltraGreen,
    Green,
    #[default]
    Regular,
    Veteran,
    Elite,
    Heroic,
    Legendary,
}

impl SkillLevel {
    /// Gunnery target number (lower is better)
    pub fn gunnery(&self) -> u8 {
        match self {
            SkillLevel::UltraGreen => 6,
            SkillLevel::Green => 5,
            SkillLevel::Regular => 4,
            SkillLevel::Veteran => 3,
            SkillLevel::Elite => 2,
            SkillLevel::Heroic => 1,
            SkillLevel::Legendary => 0,
        }
    }

    /// Piloting target number (lower is better)
    pub fn piloting(&self) -> u8 {
        self.gunnery() + 1
    }
}

/// Hands out fresh simulation ids for one resolution.
///
/// Passed explicitly into setup; never shared between resolutions.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_entity: u32,
    next_force: u32,
    claimed_entities: AHashSet<u32>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unclaimed entity id
    pub fn next_entity_id(&mut self) -> SimEntityId {
        loop {
            let candidate = self.next_entity;
            self.next_entity += 1;
            if self.claimed_entities.insert(candidate) {
                return SimEntityId(candidate);
            }
        }
    }

    /// Claim an entity id assigned by an earlier simulation.
    ///
    /// Returns false if the id is already in use.
    pub fn claim_entity_id(&mut self, id: SimEntityId) -> bool {
        self.claimed_entities.insert(id.0)
    }

    pub fn next_force_id(&mut self) -> ForceId {
        let id = ForceId(self.next_force);
        self.next_force += 1;
        id
    }
}
