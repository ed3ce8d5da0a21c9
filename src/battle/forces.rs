//! Force tree: named groupings of entities inside one simulation
//!
//! Persisted membership travels as a force string, `Name|id||SubName|id`,
//! outermost force first.

use std::collections::BTreeMap;

use crate::core::error::{AutoResolveError, Result};
use crate::core::types::{ForceId, IdAllocator, PlayerId, SimEntityId};

/// A named grouping of entities and sub-forces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Force {
    pub id: ForceId,
    pub name: String,
    pub owner: Option<PlayerId>,
    pub parent: Option<ForceId>,
    pub sub_forces: Vec<ForceId>,
    pub entities: Vec<SimEntityId>,
}

impl Force {
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }
}

/// All forces of one simulation, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Forces {
    forces: BTreeMap<ForceId, Force>,
}

impl Forces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_top_level(
        &mut self,
        ids: &mut IdAllocator,
        name: impl Into<String>,
        owner: Option<PlayerId>,
    ) -> ForceId {
        let id = ids.next_force_id();
        self.forces.insert(
            id,
            Force {
                id,
                name: name.into(),
                owner,
                parent: None,
                sub_forces: Vec::new(),
                entities: Vec::new(),
            },
        );
        id
    }

    /// Nest a new force under `parent`. Inherits the parent's owner.
    pub fn add_sub_force(
        &mut self,
        ids: &mut IdAllocator,
        name: impl Into<String>,
        parent: ForceId,
    ) -> Option<ForceId> {
        let owner = self.forces.get(&parent)?.owner;
        let id = ids.next_force_id();
        self.forces.insert(
            id,
            Force {
                id,
                name: name.into(),
                owner,
                parent: Some(parent),
                sub_forces: Vec::new(),
                entities: Vec::new(),
            },
        );
        if let Some(parent_force) = self.forces.get_mut(&parent) {
            parent_force.sub_forces.push(id);
        }
        Some(id)
    }

    /// Add an entity directly to a force. Returns false for unknown forces.
    pub fn add_entity(&mut self, force: ForceId, entity: SimEntityId) -> bool {
        match self.forces.get_mut(&force) {
            Some(f) => {
                if !f.entities.contains(&entity) {
                    f.entities.push(entity);
                }
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: ForceId) -> Option<&Force> {
        self.forces.get(&id)
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Force> {
        self.forces.values()
    }

    /// Top-level force ids in id order
    pub fn top_level(&self) -> Vec<ForceId> {
        self.forces
            .values()
            .filter(|f| f.is_top_level())
            .map(|f| f.id)
            .collect()
    }

    /// Top-level force of an owner with the given name
    pub fn find_top_level(&self, owner: PlayerId, name: &str) -> Option<ForceId> {
        self.forces
            .values()
            .find(|f| f.is_top_level() && f.owner == Some(owner) && f.name == name)
            .map(|f| f.id)
    }

    /// Every entity in the force and its descendants, depth first
    pub fn full_entities(&self, id: ForceId) -> Vec<SimEntityId> {
        let mut out = Vec::new();
        self.collect_entities(id, &mut out);
        out
    }

    fn collect_entities(&self, id: ForceId, out: &mut Vec<SimEntityId>) {
        if let Some(force) = self.forces.get(&id) {
            out.extend(force.entities.iter().copied());
            for sub in &force.sub_forces {
                self.collect_entities(*sub, out);
            }
        }
    }

    /// All descendants of a force, parents before children
    pub fn descendants(&self, id: ForceId) -> Vec<ForceId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(force) = self.forces.get(&current) {
                for sub in force.sub_forces.iter().rev() {
                    out.push(*sub);
                    stack.push(*sub);
                }
            }
        }
        out
    }

    /// Detach a force from its parent, making it top-level
    pub fn promote(&mut self, id: ForceId) {
        let parent = match self.forces.get_mut(&id) {
            Some(force) => force.parent.take(),
            None => return,
        };
        if let Some(parent) = parent.and_then(|p| self.forces.get_mut(&p)) {
            parent.sub_forces.retain(|sub| *sub != id);
        }
    }

    /// Pull every nested entity up into this force and drop its sub-forces
    pub fn flatten(&mut self, id: ForceId) {
        let entities = self.full_entities(id);
        for sub in self.descendants(id) {
            self.forces.remove(&sub);
        }
        if let Some(force) = self.forces.get_mut(&id) {
            force.sub_forces.clear();
            force.entities = entities;
        }
    }

    /// Replace the whole subtree's membership with a single formation entity.
    ///
    /// Returns the entities the formation now stands in for.
    pub fn collapse_into(&mut self, id: ForceId, formation: SimEntityId) -> Vec<SimEntityId> {
        let members = self.full_entities(id);
        for sub in self.descendants(id) {
            self.forces.remove(&sub);
        }
        if let Some(force) = self.forces.get_mut(&id) {
            force.sub_forces.clear();
            force.entities = vec![formation];
        }
        members
    }

    /// Remove a force and its descendants
    pub fn remove(&mut self, id: ForceId) -> Option<Force> {
        for sub in self.descendants(id) {
            self.forces.remove(&sub);
        }
        let removed = self.forces.remove(&id)?;
        if let Some(parent) = removed.parent.and_then(|p| self.forces.get_mut(&p)) {
            parent.sub_forces.retain(|sub| *sub != id);
        }
        Some(removed)
    }
}

/// One level of a persisted force path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcePathSegment {
    pub name: String,
    /// Force id in the campaign that wrote the string
    pub original_id: u32,
}

/// Parse `Name|id||SubName|id` into its segments, outermost first
pub fn parse_force_string(value: &str) -> Result<Vec<ForcePathSegment>> {
    let invalid = || AutoResolveError::InvalidForceString(value.to_string());
    if value.trim().is_empty() {
        return Err(invalid());
    }

    value
        .split("||")
        .map(|segment| {
            let (name, id) = segment.rsplit_once('|').ok_or_else(invalid)?;
            let name = name.trim();
            if name.is_empty() {
                return Err(invalid());
            }
            let original_id = id.trim().parse::<u32>().map_err(|_| invalid())?;
            Ok(ForcePathSegment {
                name: name.to_string(),
                original_id,
            })
        })
        .collect()
}

pub fn format_force_string(path: &[ForcePathSegment]) -> String {
    path.iter()
        .map(|segment| format!("{}|{}", segment.name, segment.original_id))
        .collect::<Vec<_>>()
        .join("||")
}
