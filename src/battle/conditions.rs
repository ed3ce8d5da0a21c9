//! Order conditions: pure predicates over live simulation state
//!
//! Each condition is a small immutable value. Evaluation never mutates the
//! context and may be repeated any number of times per round.

use std::fmt;

use ahash::AHashSet;

use crate::battle::context::SimulationContext;
use crate::campaign::objectives::Threshold;
use crate::core::types::{PlayerId, Round};

/// Trigger deciding whether an order currently applies
pub trait Condition: fmt::Debug + Send + Sync {
    fn is_met(&self, context: &SimulationContext) -> bool;
}

/// Constant-true condition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Always;

impl Condition for Always {
    fn is_met(&self, _context: &SimulationContext) -> bool {
        true
    }
}

/// Keep attacking while enough enemy formations survive to fall short of
/// the destroy threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemiesRemaining {
    pub owner: PlayerId,
    pub threshold: Threshold,
}

impl Condition for EnemiesRemaining {
    fn is_met(&self, context: &SimulationContext) -> bool {
        let mut total = 0;
        let mut current = 0;
        for enemy in context.enemies_of(self.owner) {
            // Starting count is formations, not entities, to match the active count
            total += enemy.initial_formation_count;
            current += context.active_formation_count(enemy.id);
        }
        destroy_eligible(total, current, self.threshold)
    }
}

/// Withdraw once too little of the named top-level forces survives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreserveForces {
    pub owner: PlayerId,
    pub forces: Vec<String>,
    pub threshold: Threshold,
    pub deadline: Option<Round>,
}

impl Condition for PreserveForces {
    fn is_met(&self, context: &SimulationContext) -> bool {
        let mut total = 0;
        let mut current = 0;
        for name in &self.forces {
            let Some(force) = context.forces().find_top_level(self.owner, name) else {
                continue;
            };
            if let Some(formation) = context.formation_for_force(force) {
                total += formation.units.len() as u32;
                current += formation.active_units() as u32;
            }
        }
        preserve_eligible(
            total,
            current,
            self.threshold,
            || context.orders().has_eligible_attack_order(self.owner, context),
            deadline_reached(self.deadline, context.round()),
        )
    }
}

/// Withdraw once too few of the tracked units survive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreserveUnits {
    pub owner: PlayerId,
    pub units: AHashSet<String>,
    pub threshold: Threshold,
    pub deadline: Option<Round>,
}

impl Condition for PreserveUnits {
    fn is_met(&self, context: &SimulationContext) -> bool {
        let mut total = 0;
        let mut current = 0;
        for formation in context.formations_of(self.owner) {
            for unit in &formation.units {
                if self.units.contains(&unit.external_id) {
                    total += 1;
                    if !unit.is_destroyed() {
                        current += 1;
                    }
                }
            }
        }
        preserve_eligible(
            total,
            current,
            self.threshold,
            || context.orders().has_eligible_attack_order(self.owner, context),
            deadline_reached(self.deadline, context.round()),
        )
    }
}

fn deadline_reached(deadline: Option<Round>, round: Round) -> bool {
    deadline.is_some_and(|limit| round >= limit)
}

/// Destroy arithmetic over starting and still-active enemy counts
pub fn destroy_eligible(total: u32, current: u32, threshold: Threshold) -> bool {
    if total == 0 {
        return true;
    }
    match threshold {
        Threshold::Fixed(amount) => total.saturating_sub(current) < amount,
        Threshold::Percentage(percent) => {
            let destroyed = 100 - (100 * current as u64 / total as u64).min(100) as i64;
            percent as i64 - destroyed > 0
        }
    }
}

/// Preserve arithmetic. `attacking` is only consulted when units are tracked.
pub fn preserve_eligible(
    total: u32,
    current: u32,
    threshold: Threshold,
    attacking: impl FnOnce() -> bool,
    time_limit_reached: bool,
) -> bool {
    if total == 0 {
        return true;
    }
    if attacking() {
        return time_limit_reached;
    }
    match threshold {
        Threshold::Fixed(amount) => current < amount || time_limit_reached,
        Threshold::Percentage(percent) => {
            if current == 0 {
                return true;
            }
            // total / current, not current / total. Kept as historically computed.
            let remaining = 100 * total as u64 / current as u64;
            remaining < percent as u64 || time_limit_reached
        }
    }
}
