//! Objective → order translation
//!
//! One call builds the whole order set for a scenario.

use ahash::AHashSet;

use crate::battle::conditions::{Always, EnemiesRemaining, PreserveForces, PreserveUnits};
use crate::battle::orders::{Order, OrderType};
use crate::campaign::objectives::{ObjectiveKind, ScenarioObjective};
use crate::campaign::scenario::{MapEdge, StartPosition};
use crate::core::types::PlayerId;

/// Builds orders for the side that owns the scenario's objectives
#[derive(Debug, Clone, Copy)]
pub struct OrderFactory {
    owner: PlayerId,
    start: StartPosition,
}

impl OrderFactory {
    pub fn new(owner: PlayerId, start: StartPosition) -> Self {
        Self { owner, start }
    }

    pub fn build(&self, objectives: &[ScenarioObjective]) -> Vec<Order> {
        objectives
            .iter()
            .flat_map(|objective| self.orders_for(objective))
            .collect()
    }

    pub fn orders_for(&self, objective: &ScenarioObjective) -> Vec<Order> {
        match objective.kind {
            ObjectiveKind::Destroy | ObjectiveKind::Capture => vec![self.destroy(objective)],
            ObjectiveKind::Preserve => self.preserve(objective),
            ObjectiveKind::ReachMapEdge => {
                vec![Order::new(self.owner, self.flee_direction(objective), Always)]
            }
            ObjectiveKind::ForceWithdraw => vec![Order::new(
                self.owner,
                OrderType::AttackTargetNotWithdrawing,
                Always,
            )],
            ObjectiveKind::PreventReachMapEdge => vec![Order::new(
                self.owner,
                OrderType::AttackTargetWithdrawing,
                Always,
            )],
            ObjectiveKind::Custom => {
                tracing::debug!(
                    description = %objective.description,
                    "Custom objective has no automated order"
                );
                Vec::new()
            }
        }
    }

    fn destroy(&self, objective: &ScenarioObjective) -> Order {
        if objective.threshold.is_total() {
            Order::new(self.owner, OrderType::AttackTarget, Always)
        } else {
            Order::new(
                self.owner,
                OrderType::AttackTarget,
                EnemiesRemaining {
                    owner: self.owner,
                    threshold: objective.threshold,
                },
            )
        }
    }

    fn preserve(&self, objective: &ScenarioObjective) -> Vec<Order> {
        let mut orders = Vec::new();
        if !objective.associated_forces.is_empty() {
            orders.push(Order::new(
                self.owner,
                OrderType::WithdrawIfConditionIsMet,
                PreserveForces {
                    owner: self.owner,
                    forces: objective.associated_forces.clone(),
                    threshold: objective.threshold,
                    deadline: objective.deadline(),
                },
            ));
        }
        if !objective.associated_units.is_empty() {
            orders.push(Order::new(
                self.owner,
                OrderType::WithdrawIfConditionIsMet,
                PreserveUnits {
                    owner: self.owner,
                    units: objective
                        .associated_units
                        .iter()
                        .cloned()
                        .collect::<AHashSet<_>>(),
                    threshold: objective.threshold,
                    deadline: objective.deadline(),
                },
            ));
        }
        orders
    }

    fn flee_direction(&self, objective: &ScenarioObjective) -> OrderType {
        match objective.destination_edge {
            Some(MapEdge::North | MapEdge::East) => OrderType::FleeNorth,
            Some(MapEdge::South | MapEdge::West) => OrderType::FleeSouth,
            None if self.start.0 > 4 => OrderType::FleeSouth,
            None => OrderType::FleeNorth,
        }
    }
}
