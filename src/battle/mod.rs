//! Battle simulation - scenario setup, standing orders and the phase loop
//!
//! Data flows one way: campaign snapshot → setup → context, then phase to
//! phase inside the context until a single conclusion event comes out.

pub mod conclusion;
pub mod conditions;
pub mod consolidation;
pub mod context;
pub mod engine;
pub mod entities;
pub mod forces;
pub mod manager;
pub mod order_factory;
pub mod orders;
pub mod phases;
pub mod projection;
pub mod setup;
pub mod victory;

// Re-exports for convenient access
pub use conclusion::{AutoResolveConcluded, SideSummary};
pub use conditions::{Always, Condition, EnemiesRemaining, PreserveForces, PreserveUnits};
pub use consolidation::{policy_for, ForceConsolidation};
pub use context::SimulationContext;
pub use engine::{AbstractCombatEngine, CombatEngine, Directives, FiringSummary};
pub use entities::{Formation, FormationError, FormationStatus, FormationUnit, Player, SimEntity};
pub use forces::{format_force_string, parse_force_string, Force, ForcePathSegment, Forces};
pub use manager::{resolve_scenario, resolve_with_engine, SimulationManager};
pub use order_factory::OrderFactory;
pub use orders::{Directive, Order, OrderSet, OrderType, TargetPreference};
pub use phases::{Phase, PhaseHandler};
pub use projection::{deployment_round, project_unit, ProjectionError};
pub use setup::ScenarioForceSetup;
pub use victory::{check_battle_end, BattleOutcome};
