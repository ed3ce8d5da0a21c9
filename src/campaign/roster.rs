//! Campaign unit roster snapshot
//!
//! Units here belong to the persistent campaign. A resolution reads them once
//! at scenario start and never writes them back.

use serde::{Deserialize, Serialize};

use super::scenario::Camouflage;
use crate::core::types::{CampaignUnitId, Round, SimEntityId, SkillLevel};

/// Broad unit classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Mek,
    Vehicle,
    Infantry,
    BattleArmor,
    Aerospace,
    LargeCraft,
}

/// Baseline combat values for a unit kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitBaseline {
    pub movement: Movement,
    pub armor: u32,
    pub structure: u32,
    pub damage: u32,
}

impl UnitKind {
    /// Conventional infantry and battle armor
    pub fn is_infantry(&self) -> bool {
        matches!(self, UnitKind::Infantry | UnitKind::BattleArmor)
    }

    /// Dropships, jumpships and other vessels with marines aboard
    pub fn is_large_craft(&self) -> bool {
        matches!(self, UnitKind::LargeCraft)
    }

    /// Units that move on the ground map
    pub fn is_ground(&self) -> bool {
        !matches!(self, UnitKind::Aerospace | UnitKind::LargeCraft)
    }

    pub fn baseline(&self) -> UnitBaseline {
        match self {
            UnitKind::Mek => UnitBaseline {
                movement: Movement::new(4, 0),
                armor: 12,
                structure: 6,
                damage: 4,
            },
            UnitKind::Vehicle => UnitBaseline {
                movement: Movement::new(5, 0),
                armor: 8,
                structure: 4,
                damage: 3,
            },
            UnitKind::Infantry => UnitBaseline {
                movement: Movement::new(1, 0),
                armor: 0,
                structure: 4,
                damage: 2,
            },
            UnitKind::BattleArmor => UnitBaseline {
                movement: Movement::new(1, 3),
                armor: 4,
                structure: 2,
                damage: 2,
            },
            UnitKind::Aerospace => UnitBaseline {
                movement: Movement::new(6, 0),
                armor: 7,
                structure: 4,
                damage: 4,
            },
            UnitKind::LargeCraft => UnitBaseline {
                movement: Movement::new(3, 0),
                armor: 30,
                structure: 15,
                damage: 8,
            },
        }
    }
}

/// Movement points per turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub walk: u32,
    #[serde(default)]
    pub jump: u32,
}

impl Movement {
    pub fn new(walk: u32, jump: u32) -> Self {
        Self { walk, jump }
    }
}

/// Role a crew member fills aboard a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewRole {
    Pilot,
    Gunner,
    Driver,
    VesselCrew,
    Marine,
}

impl CrewRole {
    /// Roles whose skill decides how well the unit shoots
    pub fn fires_weapons(&self) -> bool {
        matches!(self, CrewRole::Pilot | CrewRole::Gunner)
    }

    /// Roles whose skill decides how well the unit moves
    pub fn steers(&self) -> bool {
        matches!(self, CrewRole::Pilot | CrewRole::Driver)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub name: String,
    pub role: CrewRole,
    pub gunnery: u8,
    pub piloting: u8,
}

impl CrewMember {
    pub fn new(name: impl Into<String>, role: CrewRole, gunnery: u8, piloting: u8) -> Self {
        Self {
            name: name.into(),
            role,
            gunnery,
            piloting,
        }
    }

    /// Crew member with the target numbers of a skill level
    pub fn with_skill(name: impl Into<String>, role: CrewRole, skill: SkillLevel) -> Self {
        Self::new(name, role, skill.gunnery(), skill.piloting())
    }
}

/// A deployable unit in the campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignUnit {
    #[serde(default)]
    pub id: CampaignUnitId,
    pub name: String,
    pub kind: UnitKind,
    pub movement: Movement,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
    pub armor: u32,
    pub structure: u32,
    /// Damage dealt per firing phase by the undamaged unit
    pub damage: u32,
    #[serde(default)]
    pub quirks: Vec<String>,
    /// Mounts an external searchlight
    #[serde(default)]
    pub searchlight: bool,
    /// Persisted force membership, `Name|id||SubName|id` outermost first
    #[serde(default)]
    pub force_string: Option<String>,
    #[serde(default)]
    pub deploy_round: Round,
    /// Simulation id kept from an earlier simulation of this unit
    #[serde(default)]
    pub sim_entity_id: Option<SimEntityId>,
}

impl CampaignUnit {
    /// New uncrewed unit with the baseline values of its kind
    pub fn new(name: impl Into<String>, kind: UnitKind) -> Self {
        let baseline = kind.baseline();
        Self {
            id: CampaignUnitId::new(),
            name: name.into(),
            kind,
            movement: baseline.movement,
            crew: Vec::new(),
            armor: baseline.armor,
            structure: baseline.structure,
            damage: baseline.damage,
            quirks: Vec::new(),
            searchlight: false,
            force_string: None,
            deploy_round: 0,
            sim_entity_id: None,
        }
    }

    pub fn with_crew(mut self, member: CrewMember) -> Self {
        self.crew.push(member);
        self
    }

    pub fn with_movement(mut self, walk: u32, jump: u32) -> Self {
        self.movement = Movement::new(walk, jump);
        self
    }

    pub fn with_force_string(mut self, force_string: impl Into<String>) -> Self {
        self.force_string = Some(force_string.into());
        self
    }

    pub fn with_quirk(mut self, quirk: impl Into<String>) -> Self {
        self.quirks.push(quirk.into());
        self
    }

    pub fn has_quirk(&self, quirk: &str) -> bool {
        self.quirks.iter().any(|q| q.eq_ignore_ascii_case(quirk))
    }

    /// Identifier used to report this unit after the battle
    pub fn external_id(&self) -> String {
        self.id.to_string()
    }
}

/// The campaign state an autoresolve reads at scenario start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    pub player_name: String,
    #[serde(default)]
    pub camouflage: Camouflage,
    /// Aggregate skill of the campaign's combat personnel
    #[serde(default)]
    pub skill: SkillLevel,
    /// Units deployed to the scenario
    #[serde(default)]
    pub units: Vec<CampaignUnit>,
}

impl CampaignSnapshot {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            camouflage: Camouflage::default(),
            skill: SkillLevel::default(),
            units: Vec::new(),
        }
    }

    pub fn with_unit(mut self, unit: CampaignUnit) -> Self {
        self.units.push(unit);
        self
    }
}
