use anyhow::Result;

use crate::{
    config::MovementConfig,
    engine::{System, SystemContext},
    input::movement_step,
    rng::SystemRng,
    session::Session,
};

/// Applies held keys to the player once per frame. Steps are fixed per
/// frame, not scaled by frame time.
pub struct MovementSystem {
    config: MovementConfig,
}

impl MovementSystem {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new(MovementConfig::default())
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        session: &mut Session,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if !session.is_playing() {
            return Ok(());
        }
        let Some(player) = session.player.as_mut() else {
            return Ok(());
        };

        let step = movement_step(
            &session.keys,
            player.speed,
            session.stats.stamina,
            &self.config,
        );
        if step.sprinting {
            session.stats.drain_stamina(step.stamina_cost);
        }
        player.position.x += step.delta.x;
        player.position.y += step.delta.y;
        Ok(())
    }
}
