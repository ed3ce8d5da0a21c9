//! Force consolidation policies applied before formations are built

use crate::battle::context::SimulationContext;
use crate::campaign::scenario::ConsolidationPolicy;

/// Reshapes the force tree of a context
pub trait ForceConsolidation {
    fn consolidate(&self, context: &mut SimulationContext);
}

/// Leaves the tree untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepForces;

impl ForceConsolidation for KeepForces {
    fn consolidate(&self, _context: &mut SimulationContext) {}
}

/// Hoists every nested entity into its top-level force
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenForces;

impl ForceConsolidation for FlattenForces {
    fn consolidate(&self, context: &mut SimulationContext) {
        let forces = context.forces_mut();
        for id in forces.top_level() {
            forces.flatten(id);
        }
    }
}

/// Every nested force that directly holds entities fights on its own
#[derive(Debug, Clone, Copy, Default)]
pub struct LanceLevel;

impl ForceConsolidation for LanceLevel {
    fn consolidate(&self, context: &mut SimulationContext) {
        let forces = context.forces_mut();
        let holders: Vec<_> = forces
            .top_level()
            .into_iter()
            .flat_map(|top| forces.descendants(top))
            .filter(|id| forces.get(*id).is_some_and(|f| !f.entities.is_empty()))
            .collect();
        for id in holders {
            forces.promote(id);
        }
    }
}

/// Second-level forces become top-level and are flattened
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyLevel;

impl ForceConsolidation for CompanyLevel {
    fn consolidate(&self, context: &mut SimulationContext) {
        let forces = context.forces_mut();
        for top in forces.top_level() {
            let children = forces
                .get(top)
                .map(|f| f.sub_forces.clone())
                .unwrap_or_default();
            for child in children {
                forces.promote(child);
                forces.flatten(child);
            }
            forces.flatten(top);
        }
    }
}

pub fn policy_for(policy: ConsolidationPolicy) -> Box<dyn ForceConsolidation> {
    match policy {
        ConsolidationPolicy::None => Box::new(KeepForces),
        ConsolidationPolicy::Flatten => Box::new(FlattenForces),
        ConsolidationPolicy::LanceLevel => Box::new(LanceLevel),
        ConsolidationPolicy::CompanyLevel => Box::new(CompanyLevel),
    }
}
