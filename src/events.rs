use serde::Serialize;

use crate::{
    session::GameState,
    stats::FinalReport,
    world::{ItemId, ItemKind},
};

/// Cues for whoever owns audio playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    BackgroundStart,
    BackgroundStop,
    Collect,
}

/// Something the session did that collaborators may want to react to.
/// Queued on the session and drained once per rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    StateChanged { from: GameState, to: GameState },
    ItemCollected {
        id: ItemId,
        kind: ItemKind,
        value: u32,
        research: u64,
    },
    ItemsRegenerated { count: usize },
    Audio { cue: AudioCue },
    GameOver { report: FinalReport },
}
