//! Force projection: campaign units → disposable simulation entities
//!
//! Projection is a structural copy. Every field of the entity is either copied
//! from the unit by value or reset, so nothing inside the simulation can reach
//! the campaign unit it came from.

use thiserror::Error;

use crate::battle::entities::SimEntity;
use crate::campaign::roster::{CampaignUnit, CrewMember, CrewRole};
use crate::core::types::{PlayerId, Round, SkillLevel};

/// Speed a unit needs to deploy on the first round without a dropship
pub const DEPLOYMENT_SPEED_BASE: u32 = 6;

/// Why a single unit was left out of the simulation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("unit has no name")]
    Unnamed,
    #[error("unit '{0}' has no crew able to operate it")]
    NoCrew(String),
    #[error("ground unit '{0}' has no movement")]
    Immobile(String),
}

/// Copy a campaign unit into a fresh entity owned by `owner`.
///
/// Crewless units take `fallback_skill` when one is given.
pub fn project_unit(
    unit: &CampaignUnit,
    owner: PlayerId,
    fallback_skill: Option<SkillLevel>,
) -> Result<SimEntity, ProjectionError> {
    let name = unit.name.trim();
    if name.is_empty() {
        return Err(ProjectionError::Unnamed);
    }
    if unit.kind.is_ground() && unit.movement.walk == 0 && unit.movement.jump == 0 {
        return Err(ProjectionError::Immobile(name.to_string()));
    }

    let crew = CrewSummary::of(unit, fallback_skill)
        .ok_or_else(|| ProjectionError::NoCrew(name.to_string()))?;

    Ok(SimEntity {
        id: unit.sim_entity_id,
        external_id: unit.external_id(),
        name: name.to_string(),
        owner,
        kind: unit.kind,
        movement: unit.movement,
        gunnery: crew.gunnery,
        piloting: crew.piloting,
        crew_size: crew.crew_size,
        marines: crew.marines,
        armor: unit.armor,
        structure: unit.structure,
        damage: unit.damage,
        quirks: unit.quirks.clone(),
        searchlight: unit.searchlight,
        deploy_round: unit.deploy_round,
        force_string: unit.force_string.clone(),
        force: None,
    })
}

/// Round an entity deploys when it walks onto the field
pub fn deployment_round(entity: &SimEntity, declared: Round) -> Round {
    declared.max(DEPLOYMENT_SPEED_BASE.saturating_sub(entity.effective_speed()))
}

struct CrewSummary {
    gunnery: u8,
    piloting: u8,
    crew_size: u32,
    marines: u32,
}

impl CrewSummary {
    fn of(unit: &CampaignUnit, fallback: Option<SkillLevel>) -> Option<Self> {
        let operators: Vec<&CrewMember> = unit
            .crew
            .iter()
            .filter(|c| c.role != CrewRole::Marine)
            .collect();
        let marines = if unit.kind.is_large_craft() {
            unit.crew.iter().filter(|c| c.role == CrewRole::Marine).count() as u32
        } else {
            0
        };
        let crew_size = if unit.kind.is_large_craft() {
            operators.len() as u32
        } else {
            unit.crew.len() as u32
        };

        if operators.is_empty() {
            let skill = fallback?;
            return Some(Self {
                gunnery: skill.gunnery(),
                piloting: skill.piloting(),
                crew_size: crew_size.max(1),
                marines,
            });
        }

        let gunnery = best(&operators, |c| c.role.fires_weapons(), |c| c.gunnery);
        let piloting = best(&operators, |c| c.role.steers(), |c| c.piloting);
        Some(Self {
            gunnery,
            piloting,
            crew_size,
            marines,
        })
    }
}

/// Best (lowest) rating among members in the preferred roles, else among all
fn best(
    crew: &[&CrewMember],
    preferred: impl Fn(&CrewMember) -> bool,
    rating: impl Fn(&CrewMember) -> u8,
) -> u8 {
    let from_role = crew.iter().filter(|c| preferred(c)).map(|c| rating(c)).min();
    from_role
        .or_else(|| crew.iter().map(|c| rating(c)).min())
        .unwrap_or(SkillLevel::UltraGreen.gunnery())
}
