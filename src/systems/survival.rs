use anyhow::Result;
use tracing::trace;

use crate::{
    config::SurvivalConfig,
    engine::{System, SystemContext},
    rng::SystemRng,
    session::Session,
    stats::apply_survival_tick,
};

/// Cold exposure and stamina recovery. A run ends here, and only here,
/// once health is gone.
pub struct SurvivalSystem {
    config: SurvivalConfig,
}

impl SurvivalSystem {
    pub fn new(config: SurvivalConfig) -> Self {
        Self { config }
    }
}

impl Default for SurvivalSystem {
    fn default() -> Self {
        Self::new(SurvivalConfig::default())
    }
}

impl System for SurvivalSystem {
    fn name(&self) -> &str {
        "survival"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        session: &mut Session,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if !session.is_playing() {
            return Ok(());
        }
        let outcome = apply_survival_tick(
            &mut session.stats,
            session.weather,
            session.keys.sprint(),
            &self.config,
        );
        trace!(
            tick = ctx.tick,
            warmth = session.stats.warmth,
            health = session.stats.health,
            stamina = session.stats.stamina,
            "survival tick"
        );
        if outcome.depleted {
            session.game_over();
        }
        Ok(())
    }
}
