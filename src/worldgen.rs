use rand::Rng;
use tracing::debug;

use crate::{
    config::WorldConfig,
    world::{IdGenerator, ItemKind, ResearchItem, Shelter, ShelterKind, Vec2, World},
};

/// Scatters shelters and research items uniformly over square regions
/// centred on the origin.
#[derive(Debug, Clone)]
pub struct WorldGenerator {
    config: WorldConfig,
}

impl WorldGenerator {
    pub fn new(config: WorldConfig) -> Self {
        Self { config }
    }

    pub fn generate_shelters<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Shelter> {
        (0..count)
            .map(|_| Shelter {
                position: scatter(rng, self.config.shelter_extent),
                kind: ShelterKind::ResearchStation,
            })
            .collect()
    }

    pub fn generate_items<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
        ids: &mut dyn IdGenerator,
    ) -> Vec<ResearchItem> {
        (0..count)
            .map(|_| {
                let kind = ItemKind::ALL[rng.gen_range(0..ItemKind::ALL.len())];
                let position = scatter(rng, self.config.item_extent);
                ResearchItem::new(ids.next_id(), kind, position)
            })
            .collect()
    }

    /// Initial world: shelters plus a first item set.
    pub fn populate<R: Rng + ?Sized>(&self, world: &mut World, rng: &mut R) {
        let shelters = self.generate_shelters(self.config.shelter_count, rng);
        world.set_shelters(shelters);
        self.regenerate_items(world, rng);
    }

    /// Throws away every live item and installs a fresh set.
    pub fn regenerate_items<R: Rng + ?Sized>(&self, world: &mut World, rng: &mut R) {
        let items = self.generate_items(self.config.item_count, rng, world.ids_mut());
        debug!(count = items.len(), "regenerated research items");
        world.replace_items(items);
    }
}

fn scatter<R: Rng + ?Sized>(rng: &mut R, extent: f64) -> Vec2 {
    Vec2::new(
        rng.gen::<f64>() * extent * 2.0 - extent,
        rng.gen::<f64>() * extent * 2.0 - extent,
    )
}
