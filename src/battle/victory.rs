//! Battle end detection

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::battle::context::SimulationContext;
use crate::battle::engine::team_strength;
use crate::core::types::TeamId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BattleOutcome {
    Victory { team: TeamId },
    Draw,
}

impl BattleOutcome {
    pub fn winning_team(&self) -> Option<TeamId> {
        match self {
            BattleOutcome::Victory { team } => Some(*team),
            BattleOutcome::Draw => None,
        }
    }
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleOutcome::Victory { team } => write!(f, "victory for team {}", team),
            BattleOutcome::Draw => write!(f, "draw"),
        }
    }
}

/// Check whether the battle is over at the end of the current round
pub fn check_battle_end(context: &SimulationContext) -> Option<BattleOutcome> {
    let active = context.active_teams();

    match active.len() {
        0 => return Some(BattleOutcome::Draw),
        1 => {
            return active
                .iter()
                .next()
                .map(|team| BattleOutcome::Victory { team: *team })
        }
        _ => {}
    }

    if context.round() >= context.config().max_rounds {
        return Some(decide_on_strength(context, &active));
    }

    None
}

/// Round-limit verdict: the strongest team wins only by a decisive margin
fn decide_on_strength(context: &SimulationContext, teams: &BTreeSet<TeamId>) -> BattleOutcome {
    let mut strengths: Vec<(u32, TeamId)> = teams
        .iter()
        .map(|team| (team_strength(context, *team), *team))
        .collect();
    strengths.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let ratio = context.config().decisive_strength_ratio;
    match strengths.as_slice() {
        [(leader, team), (runner_up, _), ..] => {
            if *leader > 0 && *leader as f32 >= *runner_up as f32 * ratio {
                BattleOutcome::Victory { team: *team }
            } else {
                BattleOutcome::Draw
            }
        }
        [(_, team)] => BattleOutcome::Victory { team: *team },
        [] => BattleOutcome::Draw,
    }
}
