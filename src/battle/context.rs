//! Simulation Context: all mutable state of one resolution
//!
//! Created per scenario, owned by the running resolution, dropped when it
//! completes. Phase handlers and conditions read it; only setup, the engine and
//! the handlers write it.

use std::collections::{BTreeMap, BTreeSet};

use crate::battle::conclusion::AutoResolveConcluded;
use crate::battle::entities::{Formation, Player, SimEntity};
use crate::battle::forces::Forces;
use crate::battle::orders::OrderSet;
use crate::battle::phases::Phase;
use crate::battle::victory::BattleOutcome;
use crate::campaign::scenario::StartPosition;
use crate::core::config::AutoResolveConfig;
use crate::core::types::{ForceId, PlayerId, Round, SimEntityId, TeamId, HUMAN_TEAM};

/// Formations share the [`SimEntityId`] space with projected entities but are
/// stored apart from them: [`Self::entity`] resolves only projected units and
/// [`Self::formation`] only formations. After setup a top-level force's sole
/// member is its formation's id.
#[derive(Debug)]
pub struct SimulationContext {
    scenario_name: String,
    start_position: StartPosition,
    config: AutoResolveConfig,
    teams: BTreeSet<TeamId>,
    players: BTreeMap<PlayerId, Player>,
    entities: BTreeMap<SimEntityId, SimEntity>,
    formations: BTreeMap<SimEntityId, Formation>,
    forces: Forces,
    orders: OrderSet,
    round: Round,
    initiative: Vec<PlayerId>,
    phase_history: Vec<(Round, Phase)>,
    outcome: Option<BattleOutcome>,
    conclusion: Option<AutoResolveConcluded>,
}

impl SimulationContext {
    pub fn new(
        scenario_name: impl Into<String>,
        start_position: StartPosition,
        config: AutoResolveConfig,
    ) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            start_position,
            config,
            teams: BTreeSet::new(),
            players: BTreeMap::new(),
            entities: BTreeMap::new(),
            formations: BTreeMap::new(),
            forces: Forces::new(),
            orders: OrderSet::default(),
            round: 1,
            initiative: Vec::new(),
            phase_history: Vec::new(),
            outcome: None,
            conclusion: None,
        }
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    /// Start position of the human side
    pub fn start_position(&self) -> StartPosition {
        self.start_position
    }

    pub fn config(&self) -> &AutoResolveConfig {
        &self.config
    }

    // === ROUND ===

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn advance_round(&mut self) {
        self.round += 1;
    }

    pub fn initiative(&self) -> &[PlayerId] {
        &self.initiative
    }

    pub fn set_initiative(&mut self, order: Vec<PlayerId>) {
        self.initiative = order;
    }

    pub fn record_phase(&mut self, phase: Phase) {
        self.phase_history.push((self.round, phase));
    }

    /// Every phase visited so far with the round it ran in
    pub fn phase_history(&self) -> &[(Round, Phase)] {
        &self.phase_history
    }

    // === TEAMS AND PLAYERS ===

    pub fn register_team(&mut self, team: TeamId) {
        self.teams.insert(team);
    }

    pub fn teams(&self) -> &BTreeSet<TeamId> {
        &self.teams
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn max_player_id(&self) -> Option<PlayerId> {
        self.players.keys().next_back().copied()
    }

    /// The human side, if one was created
    pub fn human_player(&self) -> Option<&Player> {
        self.players
            .values()
            .find(|p| !p.is_bot && p.team == HUMAN_TEAM)
    }

    /// Players on a different team than `owner`
    pub fn enemies_of(&self, owner: PlayerId) -> impl Iterator<Item = &Player> {
        let team = self.players.get(&owner).map(|p| p.team);
        self.players
            .values()
            .filter(move |p| team.is_some_and(|t| p.team != t))
    }

    pub fn team_of(&self, owner: PlayerId) -> Option<TeamId> {
        self.players.get(&owner).map(|p| p.team)
    }

    // === ENTITIES AND FORMATIONS ===

    /// Register a projected entity. Entities without an id are ignored.
    pub fn add_entity(&mut self, entity: SimEntity) -> Option<SimEntityId> {
        let id = entity.id?;
        self.entities.insert(id, entity);
        Some(id)
    }

    pub fn entity(&self, id: SimEntityId) -> Option<&SimEntity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: SimEntityId) -> Option<&mut SimEntity> {
        self.entities.get_mut(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &SimEntity> {
        self.entities.values()
    }

    pub fn add_formation(&mut self, formation: Formation) {
        self.formations.insert(formation.id, formation);
    }

    pub fn formation(&self, id: SimEntityId) -> Option<&Formation> {
        self.formations.get(&id)
    }

    pub fn formation_mut(&mut self, id: SimEntityId) -> Option<&mut Formation> {
        self.formations.get_mut(&id)
    }

    pub fn formations(&self) -> impl Iterator<Item = &Formation> {
        self.formations.values()
    }

    pub fn formation_ids(&self) -> Vec<SimEntityId> {
        self.formations.keys().copied().collect()
    }

    pub fn formations_of(&self, owner: PlayerId) -> impl Iterator<Item = &Formation> {
        self.formations.values().filter(move |f| f.owner == owner)
    }

    pub fn formation_for_force(&self, force: ForceId) -> Option<&Formation> {
        self.formations.values().find(|f| f.force == force)
    }

    pub fn active_formation_count(&self, owner: PlayerId) -> u32 {
        self.formations_of(owner).filter(|f| f.is_active()).count() as u32
    }

    /// Teams that still have an active formation
    pub fn active_teams(&self) -> BTreeSet<TeamId> {
        self.formations
            .values()
            .filter(|f| f.is_active())
            .filter_map(|f| self.team_of(f.owner))
            .collect()
    }

    // === FORCES ===

    pub fn forces(&self) -> &Forces {
        &self.forces
    }

    pub fn forces_mut(&mut self) -> &mut Forces {
        &mut self.forces
    }

    // === ORDERS ===

    pub fn orders(&self) -> &OrderSet {
        &self.orders
    }

    pub fn install_orders(&mut self, orders: OrderSet) {
        self.orders = orders;
    }

    pub fn reset_orders(&mut self) {
        self.orders.reset();
    }

    /// Evaluate every order against the current state and memoize the result
    pub fn refresh_order_eligibility(&mut self) {
        let flags: Vec<bool> = self
            .orders
            .orders()
            .iter()
            .map(|order| order.is_eligible(self))
            .collect();
        let round = self.round;
        self.orders.store_eligibility(flags, round);
    }

    // === OUTCOME ===

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn set_outcome(&mut self, outcome: BattleOutcome) {
        self.outcome = Some(outcome);
    }

    pub fn conclusion(&self) -> Option<&AutoResolveConcluded> {
        self.conclusion.as_ref()
    }

    pub fn set_conclusion(&mut self, conclusion: AutoResolveConcluded) {
        self.conclusion = Some(conclusion);
    }

    pub fn take_conclusion(&mut self) -> Option<AutoResolveConcluded> {
        self.conclusion.take()
    }
}
