//! Property tests over order conditions, projection and formation collapse

use std::collections::BTreeSet;

use ahash::AHashSet;
use autoresolve::battle::conditions::{destroy_eligible, preserve_eligible};
use autoresolve::battle::*;
use autoresolve::campaign::*;
use autoresolve::core::types::{IdAllocator, PlayerId, SimEntityId};
use autoresolve::core::{AutoResolveConfig, Diagnostics};
use proptest::prelude::*;

fn mek(name: String) -> CampaignUnit {
    CampaignUnit::new(name, UnitKind::Mek).with_crew(CrewMember::new(
        "Pilot",
        CrewRole::Pilot,
        4,
        5,
    ))
}

/// Human side in `lances` lances under one company, against `enemies` bot formations
fn build(
    lances: &[usize],
    enemies: u32,
    policy: ConsolidationPolicy,
    objectives: Vec<ScenarioObjective>,
) -> SimulationContext {
    let mut campaign = CampaignSnapshot::new("Legion");
    for (lance, size) in lances.iter().enumerate() {
        for slot in 0..*size {
            campaign = campaign.with_unit(
                mek(format!("Mek {}-{}", lance, slot))
                    .with_force_string(format!("Company|0||Lance {}|{}", lance, lance + 1)),
            );
        }
    }
    let mut bot = BotForce::new("OpFor", 2);
    for i in 0..enemies {
        bot = bot.with_unit(
            CampaignUnit::new(format!("Tank {}", i), UnitKind::Vehicle)
                .with_force_string(format!("Platoon {}|{}", i, i)),
        );
    }
    let mut scenario = Scenario::new("Property").with_bot(bot);
    scenario.consolidation = policy;
    scenario.objectives = objectives;

    let mut context = SimulationContext::new(
        &scenario.name,
        scenario.start_position(),
        AutoResolveConfig::default(),
    );
    ScenarioForceSetup::new(&campaign, &scenario, 5)
        .populate(&mut context, &mut IdAllocator::new(), &mut Diagnostics::new())
        .unwrap();
    context
}

fn policy() -> impl Strategy<Value = ConsolidationPolicy> {
    prop_oneof![
        Just(ConsolidationPolicy::None),
        Just(ConsolidationPolicy::Flatten),
        Just(ConsolidationPolicy::LanceLevel),
        Just(ConsolidationPolicy::CompanyLevel),
    ]
}

fn threshold() -> impl Strategy<Value = Threshold> {
    prop_oneof![
        (0u32..20).prop_map(Threshold::Fixed),
        (0u32..300).prop_map(Threshold::Percentage),
    ]
}

proptest! {
    #[test]
    fn prop_total_destroy_is_always_eligible(
        percent in 100u32..1000,
        enemies in 1u32..6,
        kills in 0usize..6,
        rounds in 0u32..10,
    ) {
        let mut context = build(
            &[2],
            enemies,
            ConsolidationPolicy::None,
            vec![ScenarioObjective::new(ObjectiveKind::Destroy)
                .with_threshold(Threshold::Percentage(percent))],
        );
        let targets: Vec<SimEntityId> = context
            .formations()
            .filter(|f| f.owner != PlayerId(1))
            .map(|f| f.id)
            .take(kills)
            .collect();
        for id in targets {
            if let Some(f) = context.formation_mut(id) {
                f.apply_damage(u32::MAX / 2);
            }
        }
        for _ in 0..rounds {
            context.advance_round();
        }
        prop_assert!(context.orders().orders()[0].is_eligible(&context));
    }

    #[test]
    fn prop_preserve_with_nothing_tracked_is_eligible(
        threshold in threshold(),
        deadline in proptest::option::of(0u32..20),
        rounds in 0u32..20,
        attacking in any::<bool>(),
    ) {
        let mut objectives = vec![ScenarioObjective::new(ObjectiveKind::Preserve)
            .with_force("No Such Force")
            .with_unit("no-such-unit")
            .with_threshold(threshold)];
        if let Some(limit) = deadline {
            objectives[0] = objectives[0].clone().with_time_limit(limit, true);
        }
        if attacking {
            objectives.push(ScenarioObjective::new(ObjectiveKind::ForceWithdraw));
        }
        let mut context = build(&[1, 1], 2, ConsolidationPolicy::None, objectives);
        for _ in 0..rounds {
            context.advance_round();
        }
        let withdrawals: Vec<_> = context
            .orders()
            .orders()
            .iter()
            .filter(|o| o.order_type == OrderType::WithdrawIfConditionIsMet)
            .collect();
        prop_assert_eq!(withdrawals.len(), 2);
        for order in withdrawals {
            prop_assert!(order.is_eligible(&context));
        }
    }

    #[test]
    fn prop_zero_total_short_circuits(
        threshold in threshold(),
        current in 0u32..10,
        attacking in any::<bool>(),
        time_up in any::<bool>(),
    ) {
        prop_assert!(preserve_eligible(0, current, threshold, || attacking, time_up));
        prop_assert!(destroy_eligible(0, current, threshold));
    }

    #[test]
    fn prop_projection_never_touches_the_campaign_unit(
        name in "[A-Za-z][A-Za-z0-9 -]{0,20}",
        walk in 1u32..10,
        jump in 0u32..6,
        armor in 0u32..60,
        structure in 1u32..30,
        damage in 0u32..20,
        quirks in proptest::collection::vec("[a-z_]{1,12}", 0..4),
        owner in 1u32..8,
    ) {
        let mut unit = mek(name).with_movement(walk, jump).with_force_string("Company|1");
        unit.armor = armor;
        unit.structure = structure;
        unit.damage = damage;
        unit.quirks = quirks;
        let before = unit.clone();

        let mut entity = project_unit(&unit, PlayerId(owner), None).unwrap();
        entity.armor = entity.armor.wrapping_add(7);
        entity.name.clear();
        entity.quirks.push("mutated".into());
        entity.force_string = None;
        entity.movement.walk = 0;
        drop(entity);

        prop_assert_eq!(unit, before);
    }

    #[test]
    fn prop_collapse_preserves_entity_set(
        lances in proptest::collection::vec(1usize..5, 1..5),
        enemies in 1u32..4,
        policy in policy(),
    ) {
        let context = build(&lances, enemies, policy, Vec::new());

        let registered: BTreeSet<SimEntityId> = context.entities().filter_map(|e| e.id).collect();
        let mut represented: Vec<SimEntityId> = Vec::new();
        for formation in context.formations() {
            let members: BTreeSet<SimEntityId> = formation.member_entities().into_iter().collect();
            let in_force: BTreeSet<SimEntityId> = context
                .entities()
                .filter(|e| e.force == Some(formation.force))
                .filter_map(|e| e.id)
                .collect();
            prop_assert_eq!(&members, &in_force);
            prop_assert_eq!(context.forces().full_entities(formation.force), vec![formation.id]);
            represented.extend(members);
        }

        // No entity lost, none represented twice
        let unique: AHashSet<SimEntityId> = represented.iter().copied().collect();
        prop_assert_eq!(unique.len(), represented.len());
        prop_assert_eq!(represented.into_iter().collect::<BTreeSet<_>>(), registered);
    }
}
