use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    session::Session,
};

pub struct ClockSystem;

impl ClockSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClockSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ClockSystem {
    fn name(&self) -> &str {
        "clock"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        session: &mut Session,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if session.is_playing() {
            session.stats.survival_time += 1;
        }
        Ok(())
    }
}
