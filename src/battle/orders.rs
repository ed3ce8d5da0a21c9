//! Standing orders and the directives they reduce to
//!
//! An order is built once at scenario start and never changes. The order set
//! memoizes per-round eligibility so that movement and firing agree on what
//! each side is doing.

use serde::Serialize;

use crate::battle::conditions::Condition;
use crate::battle::context::SimulationContext;
use crate::campaign::scenario::MapEdge;
use crate::core::types::{PlayerId, Round};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    AttackTarget,
    AttackTargetNotWithdrawing,
    AttackTargetWithdrawing,
    WithdrawIfConditionIsMet,
    FleeNorth,
    FleeSouth,
}

impl OrderType {
    /// Attack-target variants
    pub fn is_attack(&self) -> bool {
        matches!(
            self,
            OrderType::AttackTarget
                | OrderType::AttackTargetNotWithdrawing
                | OrderType::AttackTargetWithdrawing
        )
    }

    pub fn directive(&self) -> Directive {
        match self {
            OrderType::AttackTarget => Directive::Engage(TargetPreference::Any),
            OrderType::AttackTargetNotWithdrawing => {
                Directive::Engage(TargetPreference::NotWithdrawing)
            }
            OrderType::AttackTargetWithdrawing => Directive::Engage(TargetPreference::Withdrawing),
            OrderType::WithdrawIfConditionIsMet => Directive::Withdraw,
            OrderType::FleeNorth => Directive::Flee(MapEdge::North),
            OrderType::FleeSouth => Directive::Flee(MapEdge::South),
        }
    }
}

/// Which enemy formations an engaging formation prefers to shoot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPreference {
    #[default]
    Any,
    NotWithdrawing,
    Withdrawing,
}

/// Behavior selected for a side for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    Engage(TargetPreference),
    /// Fall back to the home edge
    Withdraw,
    Flee(MapEdge),
}

impl Default for Directive {
    fn default() -> Self {
        Directive::Engage(TargetPreference::Any)
    }
}

impl Directive {
    fn priority(&self) -> u8 {
        match self {
            Directive::Flee(_) => 3,
            Directive::Withdraw => 2,
            Directive::Engage(TargetPreference::Any) => 0,
            Directive::Engage(_) => 1,
        }
    }
}

/// One standing directive: owner, type, trigger
#[derive(Debug)]
pub struct Order {
    pub owner: PlayerId,
    pub order_type: OrderType,
    condition: Box<dyn Condition>,
}

impl Order {
    pub fn new(owner: PlayerId, order_type: OrderType, condition: impl Condition + 'static) -> Self {
        Self {
            owner,
            order_type,
            condition: Box::new(condition),
        }
    }

    pub fn condition(&self) -> &dyn Condition {
        self.condition.as_ref()
    }

    /// Evaluate the condition against live state
    pub fn is_eligible(&self, context: &SimulationContext) -> bool {
        self.condition.is_met(context)
    }
}

/// The scenario's full order set
#[derive(Debug, Default)]
pub struct OrderSet {
    orders: Vec<Order>,
    eligibility: Vec<Option<bool>>,
    evaluated_round: Option<Round>,
}

impl OrderSet {
    pub fn new(orders: Vec<Order>) -> Self {
        let eligibility = vec![None; orders.len()];
        Self {
            orders,
            eligibility,
            evaluated_round: None,
        }
    }

    /// Forget every memoized eligibility result
    pub fn reset(&mut self) {
        self.eligibility = vec![None; self.orders.len()];
        self.evaluated_round = None;
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn for_owner(&self, owner: PlayerId) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(move |o| o.owner == owner)
    }

    pub fn evaluated_round(&self) -> Option<Round> {
        self.evaluated_round
    }

    /// Memoized eligibility of the order at `index`
    pub fn cached_eligibility(&self, index: usize) -> Option<bool> {
        self.eligibility.get(index).copied().flatten()
    }

    pub(crate) fn store_eligibility(&mut self, flags: Vec<bool>, round: Round) {
        self.eligibility = flags.into_iter().map(Some).collect();
        self.evaluated_round = Some(round);
    }

    /// Highest-priority directive among the owner's eligible orders.
    ///
    /// Uses memoized eligibility; orders not yet evaluated count as ineligible.
    pub fn directive_for(&self, owner: PlayerId) -> Directive {
        self.orders
            .iter()
            .enumerate()
            .filter(|(index, order)| {
                order.owner == owner && self.cached_eligibility(*index) == Some(true)
            })
            .map(|(_, order)| order.order_type.directive())
            .max_by_key(|directive| directive.priority())
            .unwrap_or_default()
    }

    /// Whether any of the owner's attack orders is eligible right now
    pub fn has_eligible_attack_order(&self, owner: PlayerId, context: &SimulationContext) -> bool {
        self.for_owner(owner)
            .filter(|order| order.order_type.is_attack())
            .any(|order| order.is_eligible(context))
    }
}
