//! Scenario force setup
//!
//! Populates a fresh [`SimulationContext`] from the campaign snapshot and the
//! scenario: teams, players, projected entities, the force tree, formations
//! and the order set, in that order.

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Builder;

use crate::battle::consolidation::policy_for;
use crate::battle::context::SimulationContext;
use crate::battle::entities::{Formation, FormationError, Player, SimEntity};
use crate::battle::forces::parse_force_string;
use crate::battle::order_factory::OrderFactory;
use crate::battle::orders::OrderSet;
use crate::battle::projection::{deployment_round, project_unit, ProjectionError};
use crate::campaign::roster::{CampaignSnapshot, CampaignUnit};
use crate::campaign::scenario::{BotForce, RandomRoster, Scenario};
use crate::core::diagnostics::Diagnostics;
use crate::core::error::{AutoResolveError, Result};
use crate::core::types::{
    CampaignUnitId, ForceId, IdAllocator, PlayerId, SimEntityId, SkillLevel, HUMAN_TEAM,
};

/// Builds the simulation side of one scenario
pub struct ScenarioForceSetup<'a> {
    campaign: &'a CampaignSnapshot,
    scenario: &'a Scenario,
    rng: ChaCha8Rng,
}

impl<'a> ScenarioForceSetup<'a> {
    pub fn new(campaign: &'a CampaignSnapshot, scenario: &'a Scenario, seed: u64) -> Self {
        Self {
            campaign,
            scenario,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Run every setup step against `context`.
    ///
    /// A force that cannot become a formation aborts setup; individual units
    /// that fail to project are skipped with a warning.
    pub fn populate(
        &mut self,
        context: &mut SimulationContext,
        ids: &mut IdAllocator,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        tracing::info!(scenario = %self.scenario.name, "Setting up scenario forces");

        self.register_teams(context);
        let (human, mut projected) = self.setup_player(context, diagnostics);
        projected.extend(self.setup_bots(context, diagnostics));
        self.register_entities(context, ids, diagnostics, projected)?;

        policy_for(self.scenario.consolidation).consolidate(context);
        self.collapse_formations(context, ids, diagnostics)?;
        self.install_orders(context, human);

        tracing::info!(
            players = context.players().count(),
            formations = context.formations().count(),
            orders = context.orders().len(),
            "Scenario setup complete"
        );
        Ok(())
    }

    fn human_roster_size(&self) -> usize {
        self.campaign.units.len() + self.scenario.player_allies.len()
    }

    fn register_teams(&self, context: &mut SimulationContext) {
        if self.human_roster_size() > 0 {
            context.register_team(HUMAN_TEAM);
        }
        for bot in &self.scenario.bot_forces {
            context.register_team(bot.team);
        }
    }

    fn next_player_id(context: &SimulationContext) -> PlayerId {
        PlayerId(context.max_player_id().map_or(1, |id| id.0 + 1))
    }

    fn setup_player(
        &self,
        context: &mut SimulationContext,
        diagnostics: &mut Diagnostics,
    ) -> (PlayerId, Vec<SimEntity>) {
        let id = Self::next_player_id(context);
        context.add_player(Player::human(
            id,
            self.campaign.player_name.clone(),
            self.campaign.camouflage,
            self.campaign.skill,
            self.scenario.deployment,
        ));

        let config = context.config();
        let ally_skill = config.allied_skill.unwrap_or(config.default_bot_skill);

        let mut entities = Vec::new();
        let roster = self
            .campaign
            .units
            .iter()
            .map(|unit| (unit, self.campaign.skill))
            .chain(self.scenario.player_allies.iter().map(|unit| (unit, ally_skill)));
        for (unit, skill) in roster {
            match project_unit(unit, id, Some(skill)) {
                Ok(mut entity) => {
                    if !self.scenario.uses_dropship {
                        entity.deploy_round = deployment_round(&entity, entity.deploy_round);
                    }
                    entities.push(entity);
                }
                Err(err) => diagnostics.warn(format!(
                    "Skipping unit '{}' for {}: {}",
                    unit.name, self.campaign.player_name, err
                )),
            }
        }

        tracing::debug!(player = ?id, units = entities.len(), "Projected player roster");
        (id, entities)
    }

    fn setup_bots(
        &mut self,
        context: &mut SimulationContext,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SimEntity> {
        let scenario = self.scenario;
        let human_camouflage = context.human_player().map(|p| p.camouflage);
        let mut entities = Vec::new();

        for bot in &scenario.bot_forces {
            let id = Self::next_player_id(context);
            let name = unique_name(&bot.name, context);

            let mut camouflage = bot.camouflage;
            if Some(camouflage) == human_camouflage {
                camouflage = camouflage.next();
            }

            let config = context.config();
            let override_skill = if bot.team == HUMAN_TEAM {
                config.allied_skill
            } else {
                config.enemy_skill
            };
            let skill = override_skill.unwrap_or(config.default_bot_skill);

            context.add_player(Player::bot(
                id,
                name.clone(),
                bot.team,
                camouflage,
                skill,
                bot.deployment,
            ));

            let mut units = bot.units.clone();
            if let Some(roster) = bot.random_roster {
                units.extend(random_units(&mut self.rng, &name, roster));
            }

            let before = entities.len();
            for unit in &units {
                match project_bot_unit(unit, id, skill, bot) {
                    Ok(entity) => entities.push(entity),
                    Err(err) => diagnostics.warn(format!(
                        "Skipping unit '{}' for {}: {}",
                        unit.name, name, err
                    )),
                }
            }
            tracing::debug!(
                player = ?id,
                name = %name,
                team = bot.team,
                units = entities.len() - before,
                "Projected bot roster"
            );
        }
        entities
    }

    fn register_entities(
        &self,
        context: &mut SimulationContext,
        ids: &mut IdAllocator,
        diagnostics: &mut Diagnostics,
        mut projected: Vec<SimEntity>,
    ) -> Result<()> {
        // Ids kept from an earlier simulation are claimed before any fresh ones
        for entity in &mut projected {
            if let Some(previous) = entity.id {
                if !ids.claim_entity_id(previous) {
                    diagnostics.warn(format!(
                        "Entity id {} of '{}' already in use; assigning a fresh id",
                        previous.0, entity.name
                    ));
                    entity.id = None;
                }
            }
        }

        let mut restored: AHashMap<(PlayerId, u32), ForceId> = AHashMap::new();
        let mut defaults: AHashMap<PlayerId, ForceId> = AHashMap::new();

        for mut entity in projected {
            let id = match entity.id {
                Some(id) => id,
                None => ids.next_entity_id(),
            };
            entity.id = Some(id);

            let owner = entity.owner;
            let player = context
                .player_mut(owner)
                .ok_or(AutoResolveError::UnknownPlayer(owner))?;
            player.initial_entity_count += 1;
            let player_name = player.name.clone();

            if entity.has_quirk("searchlight") {
                entity.searchlight = true;
            }

            let force = match entity.force_string.take() {
                Some(path) => {
                    match restore_force_path(context, ids, &mut restored, owner, &path) {
                        Ok(force) => force,
                        Err(err) => {
                            diagnostics.warn(format!(
                                "Entity '{}' keeps default force: {}",
                                entity.name, err
                            ));
                            default_force(context, ids, &mut defaults, owner, &player_name)
                        }
                    }
                }
                None => default_force(context, ids, &mut defaults, owner, &player_name),
            };

            context.forces_mut().add_entity(force, id);
            entity.force = Some(force);
            tracing::debug!(entity = %entity.label(), force = ?force, "Registered entity");
            context.add_entity(entity);
        }
        Ok(())
    }

    fn collapse_formations(
        &self,
        context: &mut SimulationContext,
        ids: &mut IdAllocator,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        for force_id in context.forces().top_level() {
            let members = context.forces().full_entities(force_id);
            if members.is_empty() {
                continue;
            }
            let Some(force) = context.forces().get(force_id) else {
                continue;
            };
            let force_name = force.name.clone();
            let force_owner = force.owner;
            let formation_id = ids.next_entity_id();

            let built = {
                let resolved: Vec<Option<&SimEntity>> =
                    members.iter().map(|id| context.entity(*id)).collect();
                match resolved.iter().position(Option::is_none) {
                    Some(missing) => Err(FormationError::MissingMember(members[missing])),
                    None => {
                        let entities: Vec<&SimEntity> = resolved.into_iter().flatten().collect();
                        Formation::from_members(
                            formation_id,
                            &force_name,
                            force_id,
                            force_owner,
                            &entities,
                        )
                    }
                }
            };

            let formation = match built {
                Ok(formation) => formation,
                Err(err) => {
                    let names = member_labels(context, &members);
                    diagnostics.error(format!(
                        "Force '{}' could not become a formation ({}): [{}]",
                        force_name,
                        err,
                        names.join(", ")
                    ));
                    return Err(AutoResolveError::FormationConversion {
                        force: force_name,
                        owner: force_owner,
                        members: names,
                        reason: err.to_string(),
                    });
                }
            };

            let owner = formation.owner;
            context.forces_mut().collapse_into(force_id, formation_id);
            for member in &members {
                if let Some(entity) = context.entity_mut(*member) {
                    entity.force = Some(force_id);
                }
            }
            if let Some(player) = context.player_mut(owner) {
                player.initial_formation_count += 1;
            }
            tracing::debug!(
                formation = formation_id.0,
                force = %force_name,
                members = members.len(),
                "Collapsed force into formation"
            );
            context.add_formation(formation);
        }
        Ok(())
    }

    fn install_orders(&self, context: &mut SimulationContext, owner: PlayerId) {
        let orders = OrderFactory::new(owner, self.scenario.start_position())
            .build(&self.scenario.objectives);
        context.install_orders(OrderSet::new(orders));
        context.reset_orders();
    }
}

fn project_bot_unit(
    unit: &CampaignUnit,
    owner: PlayerId,
    skill: SkillLevel,
    bot: &BotForce,
) -> std::result::Result<SimEntity, ProjectionError> {
    let mut entity = project_unit(unit, owner, Some(skill))?;
    if entity.deploy_round == 0 {
        entity.deploy_round = bot.deploy_round;
    }
    Ok(entity)
}

/// `name`, or `name (n)` with the first free suffix
fn unique_name(name: &str, context: &SimulationContext) -> String {
    let taken = |candidate: &str| context.players().any(|p| p.name == candidate);
    if !taken(name) {
        return name.to_string();
    }
    (2..)
        .map(|n| format!("{} ({})", name, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

fn random_units(rng: &mut ChaCha8Rng, owner: &str, roster: RandomRoster) -> Vec<CampaignUnit> {
    let baseline = roster.kind.baseline();
    (0..roster.count)
        .map(|index| {
            let mut unit = CampaignUnit::new(
                format!("{} {:?} {}", owner, roster.kind, index + 1),
                roster.kind,
            );
            unit.id = CampaignUnitId(Builder::from_random_bytes(rng.gen()).into_uuid());
            unit.armor = baseline.armor * rng.gen_range(75..=125) / 100;
            unit.damage = (baseline.damage * rng.gen_range(75..=125) / 100).max(1);
            unit
        })
        .collect()
}

fn restore_force_path(
    context: &mut SimulationContext,
    ids: &mut IdAllocator,
    restored: &mut AHashMap<(PlayerId, u32), ForceId>,
    owner: PlayerId,
    path: &str,
) -> Result<ForceId> {
    let segments = parse_force_string(path)?;
    let mut parent: Option<ForceId> = None;
    for segment in segments {
        let key = (owner, segment.original_id);
        let force = match restored.get(&key) {
            Some(force) => *force,
            None => {
                let forces = context.forces_mut();
                let force = match parent {
                    None => forces.add_top_level(ids, segment.name, Some(owner)),
                    Some(parent) => forces
                        .add_sub_force(ids, segment.name, parent)
                        .ok_or_else(|| AutoResolveError::InvalidForceString(path.to_string()))?,
                };
                restored.insert(key, force);
                force
            }
        };
        parent = Some(force);
    }
    parent.ok_or_else(|| AutoResolveError::InvalidForceString(path.to_string()))
}

fn default_force(
    context: &mut SimulationContext,
    ids: &mut IdAllocator,
    defaults: &mut AHashMap<PlayerId, ForceId>,
    owner: PlayerId,
    name: &str,
) -> ForceId {
    *defaults
        .entry(owner)
        .or_insert_with(|| context.forces_mut().add_top_level(ids, name, Some(owner)))
}

fn member_labels(context: &SimulationContext, members: &[SimEntityId]) -> Vec<String> {
    members
        .iter()
        .map(|id| {
            context
                .entity(*id)
                .map(|e| e.label())
                .unwrap_or_else(|| format!("#{}", id.0))
        })
        .collect()
}
