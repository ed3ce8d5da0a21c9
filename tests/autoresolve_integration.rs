//! Whole-resolution integration tests

use autoresolve::battle::*;
use autoresolve::campaign::*;
use autoresolve::core::types::{IdAllocator, PlayerId, HUMAN_TEAM};
use autoresolve::core::{AutoResolveConfig, AutoResolveError, Diagnostics};

const SAMPLE_CAMPAIGN: &str = include_str!("../data/sample_campaign.json");
const SAMPLE_SCENARIO: &str = include_str!("../data/sample_scenario.json");
const SAMPLE_CONFIG: &str = include_str!("../data/autoresolve.toml");

fn pilot() -> CrewMember {
    CrewMember::new("Pilot", CrewRole::Pilot, 4, 5)
}

fn mek(name: &str) -> CampaignUnit {
    CampaignUnit::new(name, UnitKind::Mek).with_crew(pilot())
}

fn setup(
    campaign: &CampaignSnapshot,
    scenario: &Scenario,
    config: AutoResolveConfig,
) -> (SimulationContext, Diagnostics) {
    let mut context = SimulationContext::new(&scenario.name, scenario.start_position(), config);
    let mut diagnostics = Diagnostics::new();
    ScenarioForceSetup::new(campaign, scenario, 11)
        .populate(&mut context, &mut IdAllocator::new(), &mut diagnostics)
        .unwrap();
    (context, diagnostics)
}

/// A bot side whose units each sit in their own lance
fn bot_with_lances(name: &str, units: u32) -> BotForce {
    (0..units).fold(BotForce::new(name, 2), |bot, i| {
        bot.with_unit(
            CampaignUnit::new(format!("{} {}", name, i), UnitKind::Vehicle)
                .with_force_string(format!("Lance {}|{}", i, i)),
        )
    })
}

#[test]
fn test_sample_files_resolve_deterministically() {
    let campaign: CampaignSnapshot = serde_json::from_str(SAMPLE_CAMPAIGN).unwrap();
    let scenario: Scenario = serde_json::from_str(SAMPLE_SCENARIO).unwrap();
    let config = AutoResolveConfig::from_toml_str(SAMPLE_CONFIG).unwrap();

    let first = resolve_scenario(&campaign, &scenario, &config, &mut Diagnostics::new()).unwrap();
    let second = resolve_scenario(&campaign, &scenario, &config, &mut Diagnostics::new()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.scenario, "Hold the Pass at Verthandi");
    assert!(first.final_round >= 1 && first.final_round <= config.max_rounds);
    assert_eq!(first.sides.len(), 3);

    let human = first.side(PlayerId(1)).unwrap();
    let reported = human.surviving.len() + human.destroyed.len() + human.withdrawn.len();
    assert_eq!(reported, campaign.units.len());
    assert_eq!(first.player_victory, first.winning_team == Some(HUMAN_TEAM));
}

#[test]
fn test_sample_scenario_setup_shape() {
    let campaign: CampaignSnapshot = serde_json::from_str(SAMPLE_CAMPAIGN).unwrap();
    let scenario: Scenario = serde_json::from_str(SAMPLE_SCENARIO).unwrap();
    let config = AutoResolveConfig::from_toml_str(SAMPLE_CONFIG).unwrap();
    let (context, diagnostics) = setup(&campaign, &scenario, config);

    // Lance-level consolidation splits the legion into its two lances
    let human = context.human_player().unwrap();
    assert_eq!(human.initial_entity_count, 3);
    assert_eq!(human.initial_formation_count, 2);
    assert!(context
        .forces()
        .find_top_level(human.id, "Command Lance")
        .is_some());

    // Second garrison is renamed and recoloured away from the player's grey
    let bots: Vec<_> = context.players().filter(|p| p.is_bot).collect();
    assert_eq!(bots[1].name, "Kurita Garrison (2)");
    assert_eq!(bots[1].camouflage, Camouflage::Grey.next());
    assert_eq!(bots[0].skill, autoresolve::core::types::SkillLevel::Veteran);

    assert_eq!(context.orders().len(), 2);
    assert_eq!(diagnostics.warnings().count(), 0);
    assert!(context
        .entities()
        .any(|e| e.name == "Locust LCT-1V" && e.searchlight));
}

#[test]
fn test_player_only_scenario_registers_single_team() {
    let campaign = CampaignSnapshot::new("Legion")
        .with_unit(mek("Atlas"))
        .with_unit(mek("Archer"));
    let (context, _) = setup(
        &campaign,
        &Scenario::new("Training"),
        AutoResolveConfig::default(),
    );

    assert_eq!(context.teams().len(), 1);
    assert!(context.teams().contains(&HUMAN_TEAM));
    assert_eq!(context.players().count(), 1);
    assert!(!context.players().next().unwrap().is_bot);
}

#[test]
fn test_resolution_leaves_campaign_untouched() {
    let campaign = CampaignSnapshot::new("Legion")
        .with_unit(mek("Atlas").with_force_string("Legion|1||Assault|2"))
        .with_unit(mek("Wasp"));
    let scenario = Scenario::new("Clash")
        .with_bot(BotForce::new("OpFor", 2).with_random_roster(4, UnitKind::Mek))
        .with_objective(ScenarioObjective::new(ObjectiveKind::Destroy));
    let campaign_before = campaign.clone();
    let scenario_before = serde_json::to_string(&scenario).unwrap();

    resolve_scenario(
        &campaign,
        &scenario,
        &AutoResolveConfig::default(),
        &mut Diagnostics::new(),
    )
    .unwrap();

    assert_eq!(campaign.units, campaign_before.units);
    assert_eq!(serde_json::to_string(&scenario).unwrap(), scenario_before);
}

#[test]
fn test_destroy_fixed_amount_needs_two_kills() {
    let campaign = CampaignSnapshot::new("Legion").with_unit(mek("Atlas"));
    let scenario = Scenario::new("Clear the Field")
        .with_bot(bot_with_lances("Alpha", 3))
        .with_bot(bot_with_lances("Bravo", 3))
        .with_objective(
            ScenarioObjective::new(ObjectiveKind::Destroy).with_threshold(Threshold::Fixed(2)),
        );
    let (mut context, _) = setup(&campaign, &scenario, AutoResolveConfig::default());

    let starting: u32 = context
        .players()
        .filter(|p| p.is_bot)
        .map(|p| p.initial_formation_count)
        .sum();
    assert_eq!(starting, 6);

    let enemy_formations: Vec<_> = context
        .formations()
        .filter(|f| f.owner != PlayerId(1))
        .map(|f| f.id)
        .collect();
    let eligible = |context: &SimulationContext| context.orders().orders()[0].is_eligible(context);

    // 6 active, then 5: fewer than two destroyed
    assert!(eligible(&context));
    context.formation_mut(enemy_formations[0]).unwrap().apply_damage(1000);
    assert!(eligible(&context));

    // 4 active: two destroyed, objective met
    context.formation_mut(enemy_formations[1]).unwrap().apply_damage(1000);
    assert!(!eligible(&context));

    // 3 active: (6 - 3) = 3 < 2 is false
    context.formation_mut(enemy_formations[2]).unwrap().apply_damage(1000);
    assert!(!eligible(&context));
}

#[test]
fn test_reach_edge_from_south_start_flees_south() {
    let campaign = CampaignSnapshot::new("Legion").with_unit(mek("Atlas"));
    let mut scenario = Scenario::new("Breakout")
        .with_bot(BotForce::new("OpFor", 2).with_random_roster(2, UnitKind::Mek))
        .with_objective(ScenarioObjective::new(ObjectiveKind::ReachMapEdge));
    scenario.deployment = DeploymentZone::at(StartPosition(6));

    let (context, _) = setup(&campaign, &scenario, AutoResolveConfig::default());
    let order = &context.orders().orders()[0];
    assert_eq!(order.order_type, OrderType::FleeSouth);
    assert!(order.is_eligible(&context));

    // Deployed on the south edge, the whole side walks straight off it
    let concluded = resolve_scenario(
        &campaign,
        &scenario,
        &AutoResolveConfig::default(),
        &mut Diagnostics::new(),
    )
    .unwrap();
    let human = concluded.side(PlayerId(1)).unwrap();
    assert_eq!(human.withdrawn.len(), 1);
    assert!(human.destroyed.is_empty());
    assert_eq!(concluded.outcome, BattleOutcome::Victory { team: 2 });
    assert!(!concluded.player_victory);
}

#[test]
fn test_phase_trace_is_fixed_sequence() {
    let campaign = CampaignSnapshot::new("Legion").with_unit(mek("Atlas"));
    let scenario =
        Scenario::new("Duel").with_bot(BotForce::new("OpFor", 2).with_random_roster(1, UnitKind::Mek));
    let config = AutoResolveConfig {
        seed: Some(99),
        ..AutoResolveConfig::default()
    };

    let traces: Vec<Vec<(u32, Phase)>> = (0..2)
        .map(|_| {
            let (context, _) = setup(&campaign, &scenario, config.clone());
            let mut manager =
                SimulationManager::new(context, AbstractCombatEngine::from_config(&config));
            manager.run(&mut Diagnostics::new());
            manager.context().phase_history().to_vec()
        })
        .collect();
    assert_eq!(traces[0], traces[1]);

    let phases: Vec<Phase> = traces[0].iter().map(|(_, p)| *p).collect();
    assert_eq!(phases.first(), Some(&Phase::Starting));
    assert_eq!(phases.last(), Some(&Phase::Victory));
    let rounds = &phases[1..phases.len() - 1];
    assert_eq!(rounds.len() % Phase::ROUND.len(), 0);
    for chunk in rounds.chunks(Phase::ROUND.len()) {
        assert_eq!(chunk, &Phase::ROUND);
    }
}

#[test]
fn test_preserve_withdraws_when_lance_is_lost() {
    let campaign = CampaignSnapshot::new("Legion")
        .with_unit(mek("Atlas").with_force_string("Command|1"))
        .with_unit(mek("Wasp").with_force_string("Scouts|2"));
    let scenario = Scenario::new("Escort")
        .with_bot(BotForce::new("OpFor", 2).with_random_roster(1, UnitKind::Mek))
        .with_objective(
            ScenarioObjective::new(ObjectiveKind::Preserve)
                .with_force("Command")
                .with_threshold(Threshold::Fixed(1)),
        );
    let (mut context, _) = setup(&campaign, &scenario, AutoResolveConfig::default());

    context.refresh_order_eligibility();
    assert_eq!(
        context.orders().directive_for(PlayerId(1)),
        Directive::default()
    );

    let command = context
        .forces()
        .find_top_level(PlayerId(1), "Command")
        .and_then(|force| context.formation_for_force(force))
        .map(|f| f.id)
        .unwrap();
    context.formation_mut(command).unwrap().apply_damage(1000);

    context.refresh_order_eligibility();
    assert_eq!(context.orders().directive_for(PlayerId(1)), Directive::Withdraw);
}

#[test]
fn test_paper_force_is_fatal_before_any_phase() {
    let mut ghost = mek("Ghost");
    ghost.armor = 0;
    ghost.structure = 0;
    let campaign = CampaignSnapshot::new("Legion")
        .with_unit(ghost.with_force_string("Phantoms|7"))
        .with_unit(mek("Atlas"));
    let scenario =
        Scenario::new("Haunt").with_bot(BotForce::new("OpFor", 2).with_random_roster(1, UnitKind::Mek));

    let mut diagnostics = Diagnostics::new();
    let err = resolve_scenario(
        &campaign,
        &scenario,
        &AutoResolveConfig::default(),
        &mut diagnostics,
    )
    .unwrap_err();

    match err {
        AutoResolveError::FormationConversion { force, members, .. } => {
            assert_eq!(force, "Phantoms");
            assert_eq!(members.len(), 1);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!diagnostics
        .entries()
        .iter()
        .any(|d| d.message.starts_with("Battle decided")));
}

#[test]
fn test_extreme_armor_resolves_without_overflow() {
    let mut fortress = mek("Fortress");
    fortress.armor = u32::MAX;
    fortress.structure = 1;
    let campaign = CampaignSnapshot::new("Legion").with_unit(fortress);
    let scenario = Scenario::new("Siege")
        .with_bot(BotForce::new("OpFor", 2).with_random_roster(2, UnitKind::Mek));

    let concluded = resolve_scenario(
        &campaign,
        &scenario,
        &AutoResolveConfig::default(),
        &mut Diagnostics::new(),
    )
    .unwrap();

    assert!(concluded.final_round <= AutoResolveConfig::default().max_rounds);
    let human = concluded.side(PlayerId(1)).unwrap();
    assert!(human.destroyed.is_empty());
}

#[test]
fn test_structureless_side_does_not_win() {
    let mut hulk = mek("Hulk");
    hulk.structure = 0;
    let hulk_id = hulk.external_id();
    let campaign = CampaignSnapshot::new("Legion").with_unit(hulk);

    let concluded = resolve_scenario(
        &campaign,
        &Scenario::new("Scrapyard"),
        &AutoResolveConfig::default(),
        &mut Diagnostics::new(),
    )
    .unwrap();

    assert_eq!(concluded.outcome, BattleOutcome::Draw);
    assert!(!concluded.player_victory);
    let human = concluded.side(PlayerId(1)).unwrap();
    assert!(human.surviving.is_empty());
    assert_eq!(human.destroyed, vec![hulk_id]);
}

/// Zero the structure of one human unit, wherever its formation is
fn destroy_unit(context: &mut SimulationContext, external_id: &str) {
    let formation = context
        .formations_of(PlayerId(1))
        .find(|f| f.units.iter().any(|u| u.external_id == external_id))
        .map(|f| f.id)
        .unwrap();
    let formation = context.formation_mut(formation).unwrap();
    let unit = formation
        .units
        .iter_mut()
        .find(|u| u.external_id == external_id)
        .unwrap();
    unit.structure = 0;
}

#[test]
fn test_preserve_tracked_units_withdraws_below_fixed_amount() {
    let (atlas, wasp) = (mek("Atlas"), mek("Wasp"));
    let (atlas_id, wasp_id) = (atlas.external_id(), wasp.external_id());
    let campaign = CampaignSnapshot::new("Legion")
        .with_unit(atlas)
        .with_unit(wasp)
        .with_unit(mek("Griffin"));
    let scenario = Scenario::new("Escort")
        .with_bot(BotForce::new("OpFor", 2).with_random_roster(2, UnitKind::Mek))
        .with_objective(
            ScenarioObjective::new(ObjectiveKind::Preserve)
                .with_unit(atlas_id.clone())
                .with_unit(wasp_id)
                .with_threshold(Threshold::Fixed(2)),
        );
    let (mut context, _) = setup(&campaign, &scenario, AutoResolveConfig::default());
    assert_eq!(context.orders().len(), 1);

    // Both tracked units alive: 2 < 2 is false
    context.refresh_order_eligibility();
    assert!(!context.orders().orders()[0].is_eligible(&context));
    assert_eq!(context.orders().directive_for(PlayerId(1)), Directive::default());

    destroy_unit(&mut context, &atlas_id);
    context.refresh_order_eligibility();
    assert!(context.orders().orders()[0].is_eligible(&context));
    assert_eq!(context.orders().directive_for(PlayerId(1)), Directive::Withdraw);
}

#[test]
fn test_eligible_attack_holds_withdrawal_until_deadline() {
    let (atlas, wasp) = (mek("Atlas"), mek("Wasp"));
    let (atlas_id, wasp_id) = (atlas.external_id(), wasp.external_id());
    let campaign = CampaignSnapshot::new("Legion").with_unit(atlas).with_unit(wasp);
    let scenario = Scenario::new("Rearguard")
        .with_bot(BotForce::new("OpFor", 2).with_random_roster(2, UnitKind::Mek))
        .with_objective(ScenarioObjective::new(ObjectiveKind::Destroy))
        .with_objective(
            ScenarioObjective::new(ObjectiveKind::Preserve)
                .with_unit(atlas_id.clone())
                .with_unit(wasp_id)
                .with_threshold(Threshold::Fixed(2))
                .with_time_limit(3, true),
        );
    let (mut context, _) = setup(&campaign, &scenario, AutoResolveConfig::default());

    let withdraw_index = context
        .orders()
        .orders()
        .iter()
        .position(|o| o.order_type == OrderType::WithdrawIfConditionIsMet)
        .unwrap();
    assert!(context.orders().has_eligible_attack_order(PlayerId(1), &context));

    // Below the fixed amount, but the destroy order is still live
    destroy_unit(&mut context, &atlas_id);
    context.refresh_order_eligibility();
    assert!(!context.orders().orders()[withdraw_index].is_eligible(&context));
    assert_eq!(
        context.orders().directive_for(PlayerId(1)),
        Directive::Engage(TargetPreference::Any)
    );

    context.advance_round();
    context.refresh_order_eligibility();
    assert!(!context.orders().orders()[withdraw_index].is_eligible(&context));

    context.advance_round();
    assert_eq!(context.round(), 3);
    context.refresh_order_eligibility();
    assert!(context.orders().orders()[withdraw_index].is_eligible(&context));
    assert_eq!(context.orders().directive_for(PlayerId(1)), Directive::Withdraw);
}
