//! Simulation-side players, projected entities and formations
//!
//! Entities are disposable copies of campaign units. Formations stand in for
//! every member of a top-level force once setup has collapsed the force.

use serde::Serialize;
use thiserror::Error;

use crate::campaign::roster::{Movement, UnitKind};
use crate::campaign::scenario::{Camouflage, DeploymentZone};
use crate::core::types::{ForceId, PlayerId, Round, SimEntityId, SkillLevel, TeamId, HUMAN_TEAM};

/// One side in the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: TeamId,
    pub is_bot: bool,
    pub camouflage: Camouflage,
    pub skill: SkillLevel,
    pub deployment: DeploymentZone,
    /// Entities registered for this side at setup
    pub initial_entity_count: u32,
    /// Formations built for this side at setup
    pub initial_formation_count: u32,
}

impl Player {
    /// The human side, always on [`HUMAN_TEAM`]
    pub fn human(
        id: PlayerId,
        name: impl Into<String>,
        camouflage: Camouflage,
        skill: SkillLevel,
        deployment: DeploymentZone,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            team: HUMAN_TEAM,
            is_bot: false,
            camouflage,
            skill,
            deployment,
            initial_entity_count: 0,
            initial_formation_count: 0,
        }
    }

    pub fn bot(
        id: PlayerId,
        name: impl Into<String>,
        team: TeamId,
        camouflage: Camouflage,
        skill: SkillLevel,
        deployment: DeploymentZone,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            is_bot: true,
            camouflage,
            skill,
            deployment,
            initial_entity_count: 0,
            initial_formation_count: 0,
        }
    }

    pub fn is_enemy_of(&self, other: &Player) -> bool {
        self.team != other.team
    }
}

/// A combat unit inside the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimEntity {
    pub id: Option<SimEntityId>,
    /// Campaign identity, used only for post-battle reporting
    pub external_id: String,
    pub name: String,
    pub owner: PlayerId,
    pub kind: UnitKind,
    pub movement: Movement,
    pub gunnery: u8,
    pub piloting: u8,
    pub crew_size: u32,
    pub marines: u32,
    pub armor: u32,
    pub structure: u32,
    pub damage: u32,
    pub quirks: Vec<String>,
    pub searchlight: bool,
    pub deploy_round: Round,
    /// Serialized force membership, cleared once the hierarchy is rebuilt
    pub force_string: Option<String>,
    pub force: Option<ForceId>,
}

impl SimEntity {
    /// Movement used for deployment timing.
    ///
    /// Jump-capable infantry use jump movement; other jump-capable units gain +1.
    pub fn effective_speed(&self) -> u32 {
        if self.movement.jump == 0 {
            self.movement.walk
        } else if self.kind.is_infantry() {
            self.movement.jump
        } else {
            self.movement.walk + 1
        }
    }

    pub fn has_quirk(&self, quirk: &str) -> bool {
        self.quirks.iter().any(|q| q.eq_ignore_ascii_case(quirk))
    }

    /// Display label for reports
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("{} (#{})", self.name, id.0),
            None => self.name.clone(),
        }
    }
}

/// A formation member and its damage state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormationUnit {
    pub entity: SimEntityId,
    pub external_id: String,
    pub name: String,
    pub armor: u32,
    pub structure: u32,
    pub damage: u32,
    pub gunnery: u8,
}

impl FormationUnit {
    pub fn is_destroyed(&self) -> bool {
        self.structure == 0
    }

    /// Armor plus structure, saturating
    pub fn strength(&self) -> u32 {
        self.armor.saturating_add(self.structure)
    }

    /// Absorb damage, armor first. Returns what is left over.
    fn absorb(&mut self, amount: u32) -> u32 {
        let to_armor = amount.min(self.armor);
        self.armor -= to_armor;
        let rest = amount - to_armor;
        let to_structure = rest.min(self.structure);
        self.structure -= to_structure;
        rest - to_structure
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationStatus {
    #[default]
    Pending,
    Deployed,
    Withdrawn,
    Destroyed,
}

/// Reasons a force cannot become a formation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormationError {
    #[error("force has no members")]
    EmptyForce,
    #[error("members belong to more than one owner")]
    MixedOwners,
    #[error("member {0:?} is not a registered entity")]
    MissingMember(SimEntityId),
    #[error("member {0:?} has not been assigned an id")]
    UnregisteredMember(String),
    #[error("members have no armor or structure")]
    NoCombatValue,
}

/// A single simulated unit standing in for a whole top-level force
#[derive(Debug, Clone, PartialEq)]
pub struct Formation {
    pub id: SimEntityId,
    pub name: String,
    pub owner: PlayerId,
    pub force: ForceId,
    pub units: Vec<FormationUnit>,
    /// Slowest member's effective speed
    pub speed: u32,
    /// Latest member deploy round; the formation enters as one
    pub deploy_round: Round,
    pub status: FormationStatus,
    /// Row on the abstract battlefield, 0 is the north edge
    pub position: i32,
    pub movement_target: Option<i32>,
    /// Set while the formation is moving off the field
    pub withdrawing: bool,
    pub starting_strength: u32,
}

impl Formation {
    /// Build a formation from the resolved members of a force
    pub fn from_members(
        id: SimEntityId,
        name: &str,
        force: ForceId,
        owner: Option<PlayerId>,
        members: &[&SimEntity],
    ) -> Result<Self, FormationError> {
        let first = members.first().ok_or(FormationError::EmptyForce)?;
        let owner = owner.unwrap_or(first.owner);
        if members.iter().any(|m| m.owner != owner) {
            return Err(FormationError::MixedOwners);
        }

        let mut units = Vec::with_capacity(members.len());
        for member in members {
            let entity = member
                .id
                .ok_or_else(|| FormationError::UnregisteredMember(member.name.clone()))?;
            units.push(FormationUnit {
                entity,
                external_id: member.external_id.clone(),
                name: member.name.clone(),
                armor: member.armor,
                structure: member.structure,
                damage: member.damage,
                gunnery: member.gunnery,
            });
        }

        if units.iter().all(|u| u.strength() == 0) {
            return Err(FormationError::NoCombatValue);
        }

        let speed = members
            .iter()
            .map(|m| m.effective_speed())
            .min()
            .unwrap_or(0);
        let deploy_round = members.iter().map(|m| m.deploy_round).max().unwrap_or(0);
        let starting_strength = units
            .iter()
            .fold(0u32, |total, u| total.saturating_add(u.strength()));
        // Members already at zero structure never take the field
        let status = if units.iter().all(FormationUnit::is_destroyed) {
            FormationStatus::Destroyed
        } else {
            FormationStatus::Pending
        };

        Ok(Self {
            id,
            name: name.to_string(),
            owner,
            force,
            units,
            speed,
            deploy_round,
            status,
            position: 0,
            movement_target: None,
            withdrawing: false,
            starting_strength,
        })
    }

    /// Still part of the battle: not destroyed and not withdrawn
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            FormationStatus::Pending | FormationStatus::Deployed
        )
    }

    pub fn is_deployed(&self) -> bool {
        self.status == FormationStatus::Deployed
    }

    pub fn active_units(&self) -> usize {
        self.units.iter().filter(|u| !u.is_destroyed()).count()
    }

    /// Armor plus structure of surviving members
    pub fn remaining_strength(&self) -> u32 {
        self.units
            .iter()
            .filter(|u| !u.is_destroyed())
            .fold(0u32, |total, u| total.saturating_add(u.strength()))
    }

    /// Damage output of surviving members
    pub fn attack_value(&self) -> u32 {
        self.units
            .iter()
            .filter(|u| !u.is_destroyed())
            .fold(0u32, |total, u| total.saturating_add(u.damage))
    }

    pub fn member_entities(&self) -> Vec<SimEntityId> {
        self.units.iter().map(|u| u.entity).collect()
    }

    /// Spread damage over surviving members in order.
    ///
    /// Returns the number of members destroyed. Marks the formation destroyed
    /// once no member survives.
    pub fn apply_damage(&mut self, amount: u32) -> usize {
        let mut remaining = amount;
        let mut destroyed = 0;
        for unit in self.units.iter_mut().filter(|u| !u.is_destroyed()) {
            if remaining == 0 {
                break;
            }
            remaining = unit.absorb(remaining);
            if unit.is_destroyed() {
                destroyed += 1;
            }
        }
        if self.active_units() == 0 {
            self.status = FormationStatus::Destroyed;
        }
        destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: u32, owner: u32, kind: UnitKind, walk: u32, jump: u32) -> SimEntity {
        SimEntity {
            id: Some(SimEntityId(id)),
            external_id: format!("ext-{}", id),
            name: format!("Unit {}", id),
            owner: PlayerId(owner),
            kind,
            movement: Movement::new(walk, jump),
            gunnery: 4,
            piloting: 5,
            crew_size: 1,
            marines: 0,
            armor: 10,
            structure: 5,
            damage: 3,
            quirks: Vec::new(),
            searchlight: false,
            deploy_round: 0,
            force_string: None,
            force: None,
        }
    }

    #[test]
    fn test_effective_speed_rules() {
        assert_eq!(entity(1, 1, UnitKind::Mek, 4, 0).effective_speed(), 4);
        assert_eq!(entity(1, 1, UnitKind::Mek, 4, 4).effective_speed(), 5);
        assert_eq!(entity(1, 1, UnitKind::Infantry, 1, 3).effective_speed(), 3);
        assert_eq!(entity(1, 1, UnitKind::BattleArmor, 1, 2).effective_speed(), 2);
    }

    #[test]
    fn test_formation_aggregates_members() {
        let a = entity(1, 1, UnitKind::Mek, 4, 0);
        let mut b = entity(2, 1, UnitKind::Mek, 3, 0);
        b.deploy_round = 2;
        let formation =
            Formation::from_members(SimEntityId(9), "Alpha", ForceId(0), None, &[&a, &b]).unwrap();

        assert_eq!(formation.owner, PlayerId(1));
        assert_eq!(formation.units.len(), 2);
        assert_eq!(formation.speed, 3);
        assert_eq!(formation.deploy_round, 2);
        assert_eq!(formation.starting_strength, 30);
        assert_eq!(formation.attack_value(), 6);
        assert_eq!(formation.status, FormationStatus::Pending);
        assert!(formation.movement_target.is_none());
    }

    #[test]
    fn test_formation_rejects_mixed_owners() {
        let a = entity(1, 1, UnitKind::Mek, 4, 0);
        let b = entity(2, 2, UnitKind::Mek, 4, 0);
        let err = Formation::from_members(SimEntityId(9), "Alpha", ForceId(0), None, &[&a, &b])
            .unwrap_err();
        assert_eq!(err, FormationError::MixedOwners);
    }

    #[test]
    fn test_formation_rejects_empty_force() {
        let err =
            Formation::from_members(SimEntityId(9), "Alpha", ForceId(0), None, &[]).unwrap_err();
        assert_eq!(err, FormationError::EmptyForce);
    }

    #[test]
    fn test_formation_rejects_unregistered_member() {
        let mut a = entity(1, 1, UnitKind::Mek, 4, 0);
        a.id = None;
        let err = Formation::from_members(SimEntityId(9), "Alpha", ForceId(0), None, &[&a])
            .unwrap_err();
        assert!(matches!(err, FormationError::UnregisteredMember(_)));
    }

    #[test]
    fn test_formation_rejects_paper_units() {
        let mut a = entity(1, 1, UnitKind::Mek, 4, 0);
        a.armor = 0;
        a.structure = 0;
        let err = Formation::from_members(SimEntityId(9), "Alpha", ForceId(0), None, &[&a])
            .unwrap_err();
        assert_eq!(err, FormationError::NoCombatValue);
    }

    #[test]
    fn test_extreme_armor_saturates_strength() {
        let mut a = entity(1, 1, UnitKind::Mek, 4, 0);
        a.armor = u32::MAX;
        a.damage = u32::MAX;
        let b = entity(2, 1, UnitKind::Mek, 4, 0);
        let formation =
            Formation::from_members(SimEntityId(9), "Alpha", ForceId(0), None, &[&a, &b]).unwrap();

        assert_eq!(formation.units[0].strength(), u32::MAX);
        assert_eq!(formation.starting_strength, u32::MAX);
        assert_eq!(formation.remaining_strength(), u32::MAX);
        assert_eq!(formation.attack_value(), u32::MAX);
    }

    #[test]
    fn test_formation_without_structure_starts_destroyed() {
        let mut a = entity(1, 1, UnitKind::Mek, 4, 0);
        a.structure = 0;
        let mut b = entity(2, 1, UnitKind::Mek, 4, 0);
        b.structure = 0;
        let formation =
            Formation::from_members(SimEntityId(9), "Hulks", ForceId(0), None, &[&a, &b]).unwrap();

        assert_eq!(formation.status, FormationStatus::Destroyed);
        assert!(!formation.is_active());
        assert_eq!(formation.active_units(), 0);
        assert_eq!(formation.remaining_strength(), 0);
    }

    #[test]
    fn test_formation_with_one_intact_member_is_pending() {
        let mut a = entity(1, 1, UnitKind::Mek, 4, 0);
        a.structure = 0;
        let b = entity(2, 1, UnitKind::Mek, 4, 0);
        let formation =
            Formation::from_members(SimEntityId(9), "Mixed", ForceId(0), None, &[&a, &b]).unwrap();

        assert_eq!(formation.status, FormationStatus::Pending);
        assert_eq!(formation.active_units(), 1);
    }

    #[test]
    fn test_damage_spills_armor_then_structure_then_next_unit() {
        let a = entity(1, 1, UnitKind::Mek, 4, 0);
        let b = entity(2, 1, UnitKind::Mek, 4, 0);
        let mut formation =
            Formation::from_members(SimEntityId(9), "Alpha", ForceId(0), None, &[&a, &b]).unwrap();

        assert_eq!(formation.apply_damage(12), 0);
        assert_eq!(formation.units[0].armor, 0);
        assert_eq!(formation.units[0].structure, 3);

        assert_eq!(formation.apply_damage(5), 1);
        assert!(formation.units[0].is_destroyed());
        assert_eq!(formation.units[1].armor, 8);
        assert_eq!(formation.active_units(), 1);
        assert!(formation.is_active());

        formation.apply_damage(100);
        assert_eq!(formation.status, FormationStatus::Destroyed);
        assert!(!formation.is_active());
        assert_eq!(formation.remaining_strength(), 0);
    }

    #[test]
    fn test_enemy_relationship_is_by_team() {
        let human = Player::human(
            PlayerId(1),
            "Player",
            Camouflage::Blue,
            SkillLevel::Regular,
            DeploymentZone::default(),
        );
        let ally = Player::bot(
            PlayerId(2),
            "Ally",
            HUMAN_TEAM,
            Camouflage::Green,
            SkillLevel::Regular,
            DeploymentZone::default(),
        );
        let enemy = Player::bot(
            PlayerId(3),
            "OpFor",
            2,
            Camouflage::Red,
            SkillLevel::Regular,
            DeploymentZone::default(),
        );
        assert!(!human.is_enemy_of(&ally));
        assert!(human.is_enemy_of(&enemy));
    }
}
