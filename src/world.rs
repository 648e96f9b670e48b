use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(u64);

impl ItemId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Source of item identities. Collision and removal only compare ids, so
/// the scheme behind them is free to change.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> ItemId;
}

/// Monotonic ids starting at zero; never reused within a process.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> ItemId {
        let id = ItemId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    IceCore,
    Meteorite,
    Fossil,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::IceCore, ItemKind::Meteorite, ItemKind::Fossil];

    pub fn color(self) -> &'static str {
        match self {
            ItemKind::IceCore => "#4facfe",
            ItemKind::Meteorite => "#ff6b6b",
            ItemKind::Fossil => "#51cf66",
        }
    }

    pub fn value(self) -> u32 {
        match self {
            ItemKind::IceCore => 10,
            ItemKind::Meteorite => 25,
            ItemKind::Fossil => 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchItem {
    pub id: ItemId,
    pub position: Vec2,
    pub kind: ItemKind,
    pub color: &'static str,
    pub value: u32,
}

impl ResearchItem {
    pub fn new(id: ItemId, kind: ItemKind, position: Vec2) -> Self {
        Self {
            id,
            position,
            kind,
            color: kind.color(),
            value: kind.value(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelterKind {
    ResearchStation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelter {
    pub position: Vec2,
    pub kind: ShelterKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec2,
    pub speed: f64,
    pub size: f64,
    pub color: String,
    pub name: String,
}

impl Player {
    pub fn spawn(config: &PlayerConfig) -> Self {
        Self {
            position: Vec2::ZERO,
            speed: config.speed,
            size: config.size,
            color: config.color.clone(),
            name: config.name.clone(),
        }
    }
}

/// Shelters and the live research items. Shelters are written once; the
/// item set is replaced wholesale or shrunk one collection at a time.
pub struct World {
    shelters: Vec<Shelter>,
    items: Vec<ResearchItem>,
    ids: Box<dyn IdGenerator>,
}

impl World {
    pub fn new(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            shelters: Vec::new(),
            items: Vec::new(),
            ids,
        }
    }

    pub fn shelters(&self) -> &[Shelter] {
        &self.shelters
    }

    pub fn items(&self) -> &[ResearchItem] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn ids_mut(&mut self) -> &mut dyn IdGenerator {
        self.ids.as_mut()
    }

    pub fn set_shelters(&mut self, shelters: Vec<Shelter>) {
        self.shelters = shelters;
    }

    pub fn replace_items(&mut self, items: Vec<ResearchItem>) {
        self.items = items;
    }

    pub fn remove_item(&mut self, id: ItemId) -> Option<ResearchItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.swap_remove(index))
    }
}
