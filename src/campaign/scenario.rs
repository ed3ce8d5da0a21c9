//! Scenario definition: bot forces, deployment and objectives

use serde::{Deserialize, Serialize};

use super::objectives::ScenarioObjective;
use super::roster::{CampaignUnit, UnitKind};
use crate::core::types::{Round, TeamId};

/// Side colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Camouflage {
    #[default]
    Blue,
    Red,
    Green,
    Gold,
    Grey,
    Purple,
    Orange,
    Black,
}

impl Camouflage {
    pub const PALETTE: [Camouflage; 8] = [
        Camouflage::Blue,
        Camouflage::Red,
        Camouflage::Green,
        Camouflage::Gold,
        Camouflage::Grey,
        Camouflage::Purple,
        Camouflage::Orange,
        Camouflage::Black,
    ];

    /// Following palette colour, wrapping around
    pub fn next(self) -> Self {
        let index = Self::PALETTE
            .iter()
            .position(|c| *c == self)
            .unwrap_or(0);
        Self::PALETTE[(index + 1) % Self::PALETTE.len()]
    }
}

/// Map edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapEdge {
    North,
    East,
    South,
    West,
}

/// Board start position code.
///
/// 0 any, 1 NW, 2 N, 3 NE, 4 E, 5 SE, 6 S, 7 SW, 8 W, 9 edge, 10 centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StartPosition(pub u8);

impl StartPosition {
    pub const ANY: StartPosition = StartPosition(0);
    pub const NORTH: StartPosition = StartPosition(2);
    pub const SOUTH: StartPosition = StartPosition(6);
    pub const CENTER: StartPosition = StartPosition(10);

    /// Positions up to east count as the northern half of the board
    pub fn is_northern(&self) -> bool {
        self.0 <= 4
    }

    pub fn is_center(&self) -> bool {
        *self == Self::CENTER
    }
}

/// Where a side sets up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeploymentZone {
    #[serde(default)]
    pub start: StartPosition,
    /// Rows in from the home edge
    #[serde(default)]
    pub offset: u32,
    /// Depth of the deployment strip
    #[serde(default)]
    pub width: u32,
}

impl DeploymentZone {
    pub fn at(start: StartPosition) -> Self {
        Self {
            start,
            offset: 0,
            width: 0,
        }
    }
}

/// Request for a generated bot roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomRoster {
    pub count: u32,
    pub kind: UnitKind,
}

/// A bot-controlled side declared by the scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotForce {
    pub name: String,
    pub team: TeamId,
    #[serde(default)]
    pub camouflage: Camouflage,
    #[serde(default)]
    pub deployment: DeploymentZone,
    /// Round used for units that declare none
    #[serde(default)]
    pub deploy_round: Round,
    #[serde(default)]
    pub units: Vec<CampaignUnit>,
    #[serde(default)]
    pub random_roster: Option<RandomRoster>,
}

impl BotForce {
    pub fn new(name: impl Into<String>, team: TeamId) -> Self {
        Self {
            name: name.into(),
            team,
            camouflage: Camouflage::Red,
            deployment: DeploymentZone::at(StartPosition::SOUTH),
            deploy_round: 0,
            units: Vec::new(),
            random_roster: None,
        }
    }

    pub fn with_unit(mut self, unit: CampaignUnit) -> Self {
        self.units.push(unit);
        self
    }

    pub fn with_random_roster(mut self, count: u32, kind: UnitKind) -> Self {
        self.random_roster = Some(RandomRoster { count, kind });
        self
    }
}

/// How force trees are reshaped before formations are built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationPolicy {
    #[default]
    None,
    Flatten,
    LanceLevel,
    CompanyLevel,
}

/// A campaign scenario to be autoresolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Deployment of the human side
    #[serde(default)]
    pub deployment: DeploymentZone,
    /// Units arrive by dropship and ignore the speed-based deployment delay
    #[serde(default)]
    pub uses_dropship: bool,
    /// Allied units placed under the human side's command
    #[serde(default)]
    pub player_allies: Vec<CampaignUnit>,
    #[serde(default)]
    pub bot_forces: Vec<BotForce>,
    #[serde(default)]
    pub objectives: Vec<ScenarioObjective>,
    #[serde(default)]
    pub consolidation: ConsolidationPolicy,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deployment: DeploymentZone::at(StartPosition::NORTH),
            uses_dropship: false,
            player_allies: Vec::new(),
            bot_forces: Vec::new(),
            objectives: Vec::new(),
            consolidation: ConsolidationPolicy::None,
        }
    }

    pub fn with_bot(mut self, bot: BotForce) -> Self {
        self.bot_forces.push(bot);
        self
    }

    pub fn with_objective(mut self, objective: ScenarioObjective) -> Self {
        self.objectives.push(objective);
        self
    }

    /// Start position of the human side
    pub fn start_position(&self) -> StartPosition {
        self.deployment.start
    }
}
