//! The single event a resolution reports back to the campaign

use std::fmt;

use serde::Serialize;

use crate::battle::context::SimulationContext;
use crate::battle::entities::FormationStatus;
use crate::battle::victory::BattleOutcome;
use crate::core::types::{PlayerId, Round, TeamId, HUMAN_TEAM};

/// Fate of one side's units, by external id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideSummary {
    pub player: PlayerId,
    pub name: String,
    pub team: TeamId,
    pub is_bot: bool,
    pub surviving: Vec<String>,
    pub destroyed: Vec<String>,
    pub withdrawn: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoResolveConcluded {
    pub scenario: String,
    pub outcome: BattleOutcome,
    pub winning_team: Option<TeamId>,
    pub player_victory: bool,
    pub final_round: Round,
    pub sides: Vec<SideSummary>,
}

impl AutoResolveConcluded {
    pub fn from_context(context: &SimulationContext, outcome: BattleOutcome) -> Self {
        let sides = context
            .players()
            .map(|player| {
                let mut side = SideSummary {
                    player: player.id,
                    name: player.name.clone(),
                    team: player.team,
                    is_bot: player.is_bot,
                    surviving: Vec::new(),
                    destroyed: Vec::new(),
                    withdrawn: Vec::new(),
                };
                for formation in context.formations_of(player.id) {
                    for unit in &formation.units {
                        let bucket = if unit.is_destroyed() {
                            &mut side.destroyed
                        } else if formation.status == FormationStatus::Withdrawn {
                            &mut side.withdrawn
                        } else {
                            &mut side.surviving
                        };
                        bucket.push(unit.external_id.clone());
                    }
                }
                side
            })
            .collect();

        let winning_team = outcome.winning_team();
        Self {
            scenario: context.scenario_name().to_string(),
            outcome,
            winning_team,
            player_victory: winning_team == Some(HUMAN_TEAM),
            final_round: context.round(),
            sides,
        }
    }

    pub fn side(&self, player: PlayerId) -> Option<&SideSummary> {
        self.sides.iter().find(|s| s.player == player)
    }
}

impl fmt::Display for AutoResolveConcluded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} after {} round(s)",
            self.scenario, self.outcome, self.final_round
        )?;
        for side in &self.sides {
            writeln!(
                f,
                "  {} (team {}{}): {} surviving, {} withdrawn, {} destroyed",
                side.name,
                side.team,
                if side.is_bot { ", bot" } else { "" },
                side.surviving.len(),
                side.withdrawn.len(),
                side.destroyed.len()
            )?;
        }
        Ok(())
    }
}
