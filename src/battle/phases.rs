//! Phase handlers
//!
//! One handler per phase. Handlers do the bookkeeping this crate owns and hand
//! the tactical work to the combat engine.

use std::fmt;

use serde::Serialize;

use crate::battle::conclusion::AutoResolveConcluded;
use crate::battle::context::SimulationContext;
use crate::battle::engine::{CombatEngine, Directives};
use crate::battle::entities::FormationStatus;
use crate::battle::victory::{check_battle_end, BattleOutcome};
use crate::core::diagnostics::{Diagnostics, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Starting,
    Initiative,
    Deployment,
    Movement,
    Firing,
    End,
    Victory,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Starting,
        Phase::Initiative,
        Phase::Deployment,
        Phase::Movement,
        Phase::Firing,
        Phase::End,
        Phase::Victory,
    ];

    /// Phases repeated every round
    pub const ROUND: [Phase; 5] = [
        Phase::Initiative,
        Phase::Deployment,
        Phase::Movement,
        Phase::Firing,
        Phase::End,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Starting => "starting",
            Phase::Initiative => "initiative",
            Phase::Deployment => "deployment",
            Phase::Movement => "movement",
            Phase::Firing => "firing",
            Phase::End => "end",
            Phase::Victory => "victory",
        };
        f.write_str(name)
    }
}

pub trait PhaseHandler {
    fn phase(&self) -> Phase;

    fn execute(
        &self,
        context: &mut SimulationContext,
        engine: &mut dyn CombatEngine,
        diagnostics: &mut Diagnostics,
    );
}

/// Handlers for every phase, indexed by [`Phase::index`]
pub fn default_handlers() -> Vec<Box<dyn PhaseHandler>> {
    vec![
        Box::new(StartingPhase),
        Box::new(InitiativePhase),
        Box::new(DeploymentPhase),
        Box::new(MovementPhase),
        Box::new(FiringPhase),
        Box::new(EndPhase),
        Box::new(VictoryPhase),
    ]
}

/// Refresh order eligibility and reduce it to one directive per active formation
fn current_directives(context: &mut SimulationContext) -> Directives {
    context.refresh_order_eligibility();
    context
        .formations()
        .filter(|f| f.is_deployed())
        .map(|f| (f.id, context.orders().directive_for(f.owner)))
        .collect()
}

pub struct StartingPhase;

impl PhaseHandler for StartingPhase {
    fn phase(&self) -> Phase {
        Phase::Starting
    }

    fn execute(
        &self,
        context: &mut SimulationContext,
        _engine: &mut dyn CombatEngine,
        _diagnostics: &mut Diagnostics,
    ) {
        tracing::info!(
            scenario = %context.scenario_name(),
            teams = context.teams().len(),
            formations = context.formations().count(),
            "Autoresolve started"
        );
    }
}

pub struct InitiativePhase;

impl PhaseHandler for InitiativePhase {
    fn phase(&self) -> Phase {
        Phase::Initiative
    }

    fn execute(
        &self,
        context: &mut SimulationContext,
        engine: &mut dyn CombatEngine,
        _diagnostics: &mut Diagnostics,
    ) {
        let order = engine.roll_initiative(context);
        tracing::debug!(round = context.round(), order = ?order, "Initiative");
        context.set_initiative(order);
    }
}

pub struct DeploymentPhase;

impl PhaseHandler for DeploymentPhase {
    fn phase(&self) -> Phase {
        Phase::Deployment
    }

    fn execute(
        &self,
        context: &mut SimulationContext,
        engine: &mut dyn CombatEngine,
        _diagnostics: &mut Diagnostics,
    ) {
        let round = context.round();
        let arriving: Vec<_> = context
            .formations()
            .filter(|f| f.status == FormationStatus::Pending && f.deploy_round <= round)
            .map(|f| f.id)
            .collect();
        for id in arriving {
            engine.place_formation(context, id);
            tracing::debug!(round, formation = id.0, "Formation deployed");
        }
    }
}

pub struct MovementPhase;

impl PhaseHandler for MovementPhase {
    fn phase(&self) -> Phase {
        Phase::Movement
    }

    fn execute(
        &self,
        context: &mut SimulationContext,
        engine: &mut dyn CombatEngine,
        _diagnostics: &mut Diagnostics,
    ) {
        let directives = current_directives(context);
        engine.resolve_movement(context, &directives);
    }
}

pub struct FiringPhase;

impl PhaseHandler for FiringPhase {
    fn phase(&self) -> Phase {
        Phase::Firing
    }

    fn execute(
        &self,
        context: &mut SimulationContext,
        engine: &mut dyn CombatEngine,
        _diagnostics: &mut Diagnostics,
    ) {
        let directives = current_directives(context);
        let summary = engine.resolve_firing(context, &directives);
        tracing::debug!(
            round = context.round(),
            attacks = summary.attacks,
            hits = summary.hits,
            destroyed = summary.units_destroyed,
            "Firing resolved"
        );
    }
}

pub struct EndPhase;

impl PhaseHandler for EndPhase {
    fn phase(&self) -> Phase {
        Phase::End
    }

    fn execute(
        &self,
        context: &mut SimulationContext,
        engine: &mut dyn CombatEngine,
        diagnostics: &mut Diagnostics,
    ) {
        engine.end_of_round(context);
        match check_battle_end(context) {
            Some(outcome) => {
                diagnostics.record(
                    Severity::Info,
                    Some(context.round()),
                    format!("Battle decided: {}", outcome),
                );
                context.set_outcome(outcome);
            }
            None => context.advance_round(),
        }
    }
}

pub struct VictoryPhase;

impl PhaseHandler for VictoryPhase {
    fn phase(&self) -> Phase {
        Phase::Victory
    }

    fn execute(
        &self,
        context: &mut SimulationContext,
        _engine: &mut dyn CombatEngine,
        _diagnostics: &mut Diagnostics,
    ) {
        let outcome = context
            .outcome()
            .or_else(|| check_battle_end(context))
            .unwrap_or(BattleOutcome::Draw);
        let conclusion = AutoResolveConcluded::from_context(context, outcome);
        tracing::info!(
            scenario = %conclusion.scenario,
            outcome = %conclusion.outcome,
            rounds = conclusion.final_round,
            "Autoresolve concluded"
        );
        context.set_conclusion(conclusion);
    }
}
