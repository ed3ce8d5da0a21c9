//! Simulation manager: drives the phase sequence to a conclusion

use crate::battle::conclusion::AutoResolveConcluded;
use crate::battle::context::SimulationContext;
use crate::battle::engine::{AbstractCombatEngine, CombatEngine};
use crate::battle::phases::{default_handlers, Phase, PhaseHandler};
use crate::battle::setup::ScenarioForceSetup;
use crate::battle::victory::BattleOutcome;
use crate::campaign::roster::CampaignSnapshot;
use crate::campaign::scenario::Scenario;
use crate::core::config::AutoResolveConfig;
use crate::core::diagnostics::Diagnostics;
use crate::core::error::{AutoResolveError, Result};
use crate::core::types::IdAllocator;

/// Runs Starting once, Initiative..End every round until decided, then Victory
pub struct SimulationManager<E: CombatEngine> {
    context: SimulationContext,
    engine: E,
    handlers: Vec<Box<dyn PhaseHandler>>,
}

impl<E: CombatEngine> SimulationManager<E> {
    pub fn new(context: SimulationContext, engine: E) -> Self {
        Self {
            context,
            engine,
            handlers: default_handlers(),
        }
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    pub fn into_context(self) -> SimulationContext {
        self.context
    }

    fn run_phase(&mut self, phase: Phase, diagnostics: &mut Diagnostics) {
        self.context.record_phase(phase);
        let handler = &self.handlers[phase.index()];
        handler.execute(&mut self.context, &mut self.engine, diagnostics);
    }

    /// Play the battle out and return its conclusion event
    pub fn run(&mut self, diagnostics: &mut Diagnostics) -> AutoResolveConcluded {
        self.run_phase(Phase::Starting, diagnostics);
        while self.context.outcome().is_none() {
            for phase in Phase::ROUND {
                self.run_phase(phase, diagnostics);
            }
        }
        self.run_phase(Phase::Victory, diagnostics);

        match self.context.take_conclusion() {
            Some(conclusion) => conclusion,
            None => {
                let outcome = self.context.outcome().unwrap_or(BattleOutcome::Draw);
                AutoResolveConcluded::from_context(&self.context, outcome)
            }
        }
    }
}

/// Set up a scenario and resolve it with the given engine
pub fn resolve_with_engine<E: CombatEngine>(
    campaign: &CampaignSnapshot,
    scenario: &Scenario,
    config: &AutoResolveConfig,
    engine: E,
    diagnostics: &mut Diagnostics,
) -> Result<AutoResolveConcluded> {
    config.validate().map_err(AutoResolveError::InvalidConfig)?;

    let mut context =
        SimulationContext::new(&scenario.name, scenario.start_position(), config.clone());
    let mut ids = IdAllocator::new();
    ScenarioForceSetup::new(campaign, scenario, config.effective_seed()).populate(
        &mut context,
        &mut ids,
        diagnostics,
    )?;

    let mut manager = SimulationManager::new(context, engine);
    Ok(manager.run(diagnostics))
}

/// Resolve a scenario with the built-in abstract engine
pub fn resolve_scenario(
    campaign: &CampaignSnapshot,
    scenario: &Scenario,
    config: &AutoResolveConfig,
    diagnostics: &mut Diagnostics,
) -> Result<AutoResolveConcluded> {
    let engine = AbstractCombatEngine::from_config(config);
    resolve_with_engine(campaign, scenario, config, engine, diagnostics)
}
