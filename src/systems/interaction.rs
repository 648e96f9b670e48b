use anyhow::Result;
use tracing::debug;

use crate::{
    config::InteractionConfig,
    engine::{System, SystemContext},
    events::{AudioCue, SessionEvent},
    rng::SystemRng,
    session::Session,
    world::ItemId,
};

/// Proximity checks between the player and the world, run every frame
/// after movement.
pub struct InteractionSystem {
    config: InteractionConfig,
    item_floor: usize,
}

impl InteractionSystem {
    pub fn new(config: InteractionConfig, item_floor: usize) -> Self {
        Self { config, item_floor }
    }
}

impl System for InteractionSystem {
    fn name(&self) -> &str {
        "interaction"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        session: &mut Session,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if !session.is_playing() {
            return Ok(());
        }
        let Some(player) = session.player.as_ref() else {
            return Ok(());
        };
        let position = player.position;
        let pickup_radius = player.size + self.config.pickup_margin;
        let shelter_radius = player.size + self.config.shelter_margin;

        let in_reach: Vec<ItemId> = session
            .world
            .items()
            .iter()
            .filter(|item| position.distance(item.position) < pickup_radius)
            .map(|item| item.id)
            .collect();

        for id in in_reach {
            let Some(item) = session.world.remove_item(id) else {
                continue;
            };
            session.stats.add_research(item.value);
            session.stats.heal(self.config.pickup_health);
            session.stats.warm(self.config.pickup_warmth);
            debug!(
                frame = ctx.frame,
                id = item.id.raw(),
                kind = ?item.kind,
                value = item.value,
                research = session.stats.research,
                "research item collected"
            );
            let research = session.stats.research;
            session.push_event(SessionEvent::ItemCollected {
                id: item.id,
                kind: item.kind,
                value: item.value,
                research,
            });
            session.push_event(SessionEvent::Audio {
                cue: AudioCue::Collect,
            });

            // The rest of `in_reach` refers to the discarded set.
            if session.world.item_count() < self.item_floor {
                session.regenerate_items(rng);
                break;
            }
        }

        // Overlapping shelters each contribute.
        let sheltering = session
            .world
            .shelters()
            .iter()
            .filter(|shelter| position.distance(shelter.position) < shelter_radius)
            .count();
        for _ in 0..sheltering {
            session.stats.warm(self.config.shelter_warmth);
        }
        Ok(())
    }
}
