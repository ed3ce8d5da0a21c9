//! Combat engine seam and the built-in abstract engine
//!
//! Phase handlers call into a [`CombatEngine`] for everything tactical. The
//! abstract engine plays formations on a single north-south axis: row 0 is the
//! north edge, `board_depth` the south edge.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::battle::context::SimulationContext;
use crate::battle::entities::{Formation, FormationStatus};
use crate::battle::orders::{Directive, TargetPreference};
use crate::campaign::scenario::{DeploymentZone, MapEdge};
use crate::core::config::AutoResolveConfig;
use crate::core::types::{PlayerId, SimEntityId, TeamId};

/// Directive per formation for the current round
pub type Directives = BTreeMap<SimEntityId, Directive>;

/// What happened in one firing phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FiringSummary {
    pub attacks: u32,
    pub hits: u32,
    pub damage: u32,
    pub units_destroyed: u32,
}

/// Tactical resolution invoked by the phase handlers
pub trait CombatEngine {
    /// Side order for the round, first to act first
    fn roll_initiative(&mut self, context: &SimulationContext) -> Vec<PlayerId>;

    /// Put a pending formation onto the field
    fn place_formation(&mut self, context: &mut SimulationContext, formation: SimEntityId);

    fn resolve_movement(&mut self, context: &mut SimulationContext, directives: &Directives);

    fn resolve_firing(
        &mut self,
        context: &mut SimulationContext,
        directives: &Directives,
    ) -> FiringSummary;

    fn end_of_round(&mut self, _context: &mut SimulationContext) {}
}

/// One-dimensional stand-in for a tactical engine
#[derive(Debug, Clone)]
pub struct AbstractCombatEngine {
    rng: ChaCha8Rng,
    board_depth: i32,
    engagement_range: i32,
}

impl AbstractCombatEngine {
    pub fn new(seed: u64, board_depth: i32, engagement_range: i32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            board_depth,
            engagement_range,
        }
    }

    pub fn from_config(config: &AutoResolveConfig) -> Self {
        Self::new(
            config.effective_seed(),
            config.board_depth,
            config.engagement_range,
        )
    }

    /// Row a side deploys on
    pub fn home_row(&self, deployment: &DeploymentZone) -> i32 {
        let offset = deployment.offset as i32;
        if deployment.start.is_center() {
            self.board_depth / 2
        } else if deployment.start.is_northern() {
            offset.min(self.board_depth)
        } else {
            (self.board_depth - offset).max(0)
        }
    }

    pub fn edge_row(&self, edge: MapEdge) -> i32 {
        match edge {
            MapEdge::North | MapEdge::East => 0,
            MapEdge::South | MapEdge::West => self.board_depth,
        }
    }

    fn home_edge(&self, deployment: &DeploymentZone) -> i32 {
        if self.home_row(deployment) <= self.board_depth / 2 {
            0
        } else {
            self.board_depth
        }
    }

    fn d6(&mut self) -> i32 {
        self.rng.gen_range(1..=6)
    }

    fn roll_2d6(&mut self) -> i32 {
        self.d6() + self.d6()
    }
}

/// Snapshot of a formation for target selection
#[derive(Debug, Clone, Copy)]
struct Marker {
    id: SimEntityId,
    team: TeamId,
    position: i32,
    withdrawing: bool,
}

fn deployed_markers(context: &SimulationContext) -> Vec<Marker> {
    context
        .formations()
        .filter(|f| f.is_deployed())
        .filter_map(|f| {
            Some(Marker {
                id: f.id,
                team: context.team_of(f.owner)?,
                position: f.position,
                withdrawing: f.withdrawing,
            })
        })
        .collect()
}

/// Formation ids ordered by their owner's initiative, then id
fn acting_order(context: &SimulationContext) -> Vec<SimEntityId> {
    let rank = |owner: PlayerId| {
        context
            .initiative()
            .iter()
            .position(|p| *p == owner)
            .unwrap_or(usize::MAX)
    };
    let mut ids: Vec<(usize, SimEntityId)> = context
        .formations()
        .filter(|f| f.is_deployed())
        .map(|f| (rank(f.owner), f.id))
        .collect();
    ids.sort();
    ids.into_iter().map(|(_, id)| id).collect()
}

fn step_toward(from: i32, to: i32, step: i32) -> i32 {
    if to > from {
        (from + step).min(to)
    } else {
        (from - step).max(to)
    }
}

fn pick_target(
    markers: &[Marker],
    shooter: &Marker,
    preference: TargetPreference,
    range: i32,
) -> Option<Marker> {
    let in_range: Vec<&Marker> = markers
        .iter()
        .filter(|m| m.team != shooter.team && (m.position - shooter.position).abs() <= range)
        .collect();
    let preferred: Vec<&Marker> = in_range
        .iter()
        .copied()
        .filter(|m| match preference {
            TargetPreference::Any => true,
            TargetPreference::NotWithdrawing => !m.withdrawing,
            TargetPreference::Withdrawing => m.withdrawing,
        })
        .collect();
    let pool = if preferred.is_empty() { in_range } else { preferred };
    pool.into_iter()
        .min_by_key(|m| ((m.position - shooter.position).abs(), m.id))
        .copied()
}

impl CombatEngine for AbstractCombatEngine {
    fn roll_initiative(&mut self, context: &SimulationContext) -> Vec<PlayerId> {
        let mut rolls: Vec<(i32, PlayerId)> = Vec::new();
        for player in context.players() {
            if context.active_formation_count(player.id) == 0 {
                continue;
            }
            let bonus = 4 - player.skill.gunnery() as i32;
            rolls.push((self.roll_2d6() + bonus, player.id));
        }
        rolls.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        rolls.into_iter().map(|(_, id)| id).collect()
    }

    fn place_formation(&mut self, context: &mut SimulationContext, formation: SimEntityId) {
        let Some(owner) = context.formation(formation).map(|f| f.owner) else {
            return;
        };
        let row = context
            .player(owner)
            .map(|p| self.home_row(&p.deployment))
            .unwrap_or(0);
        if let Some(f) = context.formation_mut(formation) {
            f.position = row;
            f.status = FormationStatus::Deployed;
        }
    }

    fn resolve_movement(&mut self, context: &mut SimulationContext, directives: &Directives) {
        for id in acting_order(context) {
            let markers = deployed_markers(context);
            let Some(formation) = context.formation(id) else {
                continue;
            };
            let Some(team) = context.team_of(formation.owner) else {
                continue;
            };
            let home_edge = context
                .player(formation.owner)
                .map(|p| self.home_edge(&p.deployment))
                .unwrap_or(0);
            let directive = directives.get(&id).copied().unwrap_or_default();
            let step = (formation.speed as i32 / 2).max(1);
            let position = formation.position;

            let (target, retreating) = match directive {
                Directive::Engage(_) => {
                    let nearest = markers
                        .iter()
                        .filter(|m| m.team != team)
                        .min_by_key(|m| ((m.position - position).abs(), m.id));
                    match nearest {
                        Some(enemy) => {
                            let distance = (enemy.position - position).abs();
                            if distance <= self.engagement_range {
                                (position, false)
                            } else {
                                let closing = (distance - self.engagement_range).min(step);
                                let direction = (enemy.position - position).signum();
                                (position + direction * closing, false)
                            }
                        }
                        None => (position, false),
                    }
                }
                Directive::Withdraw => (home_edge, true),
                Directive::Flee(edge) => (self.edge_row(edge), true),
            };

            let board_depth = self.board_depth;
            if let Some(f) = context.formation_mut(id) {
                f.movement_target = Some(target);
                f.position = step_toward(position, target, step);
                f.withdrawing = retreating;
                if retreating && (f.position == 0 || f.position == board_depth) {
                    f.status = FormationStatus::Withdrawn;
                    tracing::debug!(formation = id.0, "Formation left the field");
                }
            }
        }
    }

    fn resolve_firing(
        &mut self,
        context: &mut SimulationContext,
        directives: &Directives,
    ) -> FiringSummary {
        let markers = deployed_markers(context);
        let mut summary = FiringSummary::default();
        let mut incoming: BTreeMap<SimEntityId, u32> = BTreeMap::new();

        for shooter in &markers {
            let preference = match directives.get(&shooter.id).copied().unwrap_or_default() {
                Directive::Engage(preference) => preference,
                Directive::Withdraw | Directive::Flee(_) => TargetPreference::Any,
            };
            let Some(target) = pick_target(&markers, shooter, preference, self.engagement_range)
            else {
                continue;
            };
            let Some(formation) = context.formation(shooter.id) else {
                continue;
            };
            let distance = (target.position - shooter.position).abs();
            let shots: Vec<(u8, u32)> = formation
                .units
                .iter()
                .filter(|u| !u.is_destroyed())
                .map(|u| (u.gunnery, u.damage))
                .collect();

            for (gunnery, damage) in shots {
                summary.attacks += 1;
                if self.roll_2d6() >= gunnery as i32 + 2 + distance {
                    summary.hits += 1;
                    summary.damage = summary.damage.saturating_add(damage);
                    let landed = incoming.entry(target.id).or_default();
                    *landed = landed.saturating_add(damage);
                }
            }
        }

        // Fire is simultaneous; damage lands after every shot is rolled
        for (id, damage) in incoming {
            if let Some(formation) = context.formation_mut(id) {
                summary.units_destroyed += formation.apply_damage(damage) as u32;
            }
        }
        summary
    }
}

/// Total remaining strength of a team's active formations
pub fn team_strength(context: &SimulationContext, team: TeamId) -> u32 {
    context
        .formations()
        .filter(|f| f.is_active() && context.team_of(f.owner) == Some(team))
        .map(Formation::remaining_strength)
        .fold(0u32, u32::saturating_add)
}
