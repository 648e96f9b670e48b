use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::{GameConfig, PlayerConfig},
    events::{AudioCue, SessionEvent},
    input::{Camera, HeldKeys, Key, Viewport},
    stats::{FinalReport, Stats, Weather},
    world::{IdGenerator, Player, SequentialIds, World},
    worldgen::WorldGenerator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Menu,
    Lobby,
    HowToPlay,
    Playing,
    GameOver,
}

/// Everything one player's run touches. Systems receive it by `&mut`;
/// nothing else holds it.
pub struct Session {
    pub(crate) state: GameState,
    pub(crate) player: Option<Player>,
    pub(crate) stats: Stats,
    pub(crate) world: World,
    pub(crate) weather: Weather,
    pub(crate) keys: HeldKeys,
    pub(crate) viewport: Viewport,
    pub(crate) final_report: Option<FinalReport>,
    pub(crate) generator: WorldGenerator,
    events: Vec<SessionEvent>,
    player_config: PlayerConfig,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        Self::with_ids(config, Box::new(SequentialIds::new()), rng)
    }

    /// Builds the menu-state session and generates its world.
    pub fn with_ids<R: Rng + ?Sized>(
        config: &GameConfig,
        ids: Box<dyn IdGenerator>,
        rng: &mut R,
    ) -> Self {
        let generator = WorldGenerator::new(config.world.clone());
        let mut world = World::new(ids);
        generator.populate(&mut world, rng);
        info!(
            shelters = world.shelters().len(),
            items = world.item_count(),
            weather = ?config.weather,
            "world generated"
        );
        Self {
            state: GameState::Menu,
            player: None,
            stats: Stats::default(),
            world,
            weather: config.weather,
            keys: HeldKeys::new(),
            viewport: Viewport::new(config.viewport.width, config.viewport.height),
            final_report: None,
            generator,
            events: Vec::new(),
            player_config: config.player.clone(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn set_weather(&mut self, weather: Weather) {
        self.weather = weather;
    }

    pub fn keys(&self) -> &HeldKeys {
        &self.keys
    }

    pub fn set_key(&mut self, key: Key, pressed: bool) {
        self.keys.set(key, pressed);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn camera(&self) -> Option<Camera> {
        self.player
            .as_ref()
            .map(|player| Camera::follow(player, self.viewport))
    }

    pub fn final_report(&self) -> Option<&FinalReport> {
        self.final_report.as_ref()
    }

    pub fn push_event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn pending_events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Menu "start" and game-over "play again". Shelters survive; the
    /// player, stats and item set start fresh.
    pub fn start_single_player<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !matches!(self.state, GameState::Menu | GameState::GameOver) {
            debug!(state = ?self.state, "start ignored");
            return false;
        }
        self.player = Some(Player::spawn(&self.player_config));
        self.stats.reset();
        self.final_report = None;
        self.generator.regenerate_items(&mut self.world, rng);
        self.transition(GameState::Playing);
        self.push_event(SessionEvent::Audio {
            cue: AudioCue::BackgroundStart,
        });
        info!(player = %self.player_config.name, "expedition started");
        true
    }

    /// Back to the main menu from anywhere; drops the run's state.
    pub fn show_menu(&mut self) {
        if self.state == GameState::Menu {
            return;
        }
        if self.state == GameState::Playing {
            self.push_event(SessionEvent::Audio {
                cue: AudioCue::BackgroundStop,
            });
        }
        self.player = None;
        self.stats.reset();
        self.keys.clear();
        self.final_report = None;
        self.transition(GameState::Menu);
    }

    pub fn show_lobby(&mut self) -> bool {
        self.side_menu(GameState::Lobby)
    }

    pub fn show_how_to_play(&mut self) -> bool {
        self.side_menu(GameState::HowToPlay)
    }

    /// Ends the run. Only the first call while playing has any effect.
    pub fn game_over(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let report = self.stats.final_report();
        info!(
            time = %report.time,
            research = report.research,
            score = report.score,
            "expedition lost"
        );
        self.final_report = Some(report.clone());
        self.transition(GameState::GameOver);
        self.push_event(SessionEvent::Audio {
            cue: AudioCue::BackgroundStop,
        });
        self.push_event(SessionEvent::GameOver { report });
        true
    }

    pub(crate) fn regenerate_items<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.generator.regenerate_items(&mut self.world, rng);
        let count = self.world.item_count();
        self.push_event(SessionEvent::ItemsRegenerated { count });
    }

    fn side_menu(&mut self, to: GameState) -> bool {
        if self.state != GameState::Menu {
            debug!(state = ?self.state, target = ?to, "side menu ignored");
            return false;
        }
        self.transition(to);
        true
    }

    fn transition(&mut self, to: GameState) {
        let from = self.state;
        self.state = to;
        debug!(?from, ?to, "session state changed");
        self.push_event(SessionEvent::StateChanged { from, to });
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn session() -> (Session, ChaCha8Rng) {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let session = Session::new(&GameConfig::default(), &mut rng);
        (session, rng)
    }

    #[test]
    fn starts_in_menu_with_a_generated_world() {
        let (session, _) = session();
        assert_eq!(session.state(), GameState::Menu);
        assert!(session.player().is_none());
        assert_eq!(session.world().shelters().len(), 5);
        assert_eq!(session.world().item_count(), 50);
    }

    #[test]
    fn side_menus_only_open_from_menu() {
        let (mut session, mut rng) = session();
        assert!(session.show_lobby());
        assert_eq!(session.state(), GameState::Lobby);
        assert!(!session.show_how_to_play());
        assert!(!session.start_single_player(&mut rng));
        session.show_menu();
        assert!(session.show_how_to_play());
        session.show_menu();
        assert_eq!(session.state(), GameState::Menu);
    }

    #[test]
    fn start_spawns_player_at_origin_and_cues_music() {
        let (mut session, mut rng) = session();
        session.drain_events();
        assert!(session.start_single_player(&mut rng));
        let player = session.player().expect("player spawned");
        assert_eq!(player.position.x, 0.0);
        assert_eq!(player.size, 20.0);
        assert_eq!(player.name, "Explorer");
        assert!(session.drain_events().contains(&SessionEvent::Audio {
            cue: AudioCue::BackgroundStart
        }));
    }

    #[test]
    fn game_over_fires_once() {
        let (mut session, mut rng) = session();
        session.start_single_player(&mut rng);
        session.stats_mut().research = 3;
        session.stats_mut().survival_time = 7;
        assert!(session.game_over());
        assert!(!session.game_over());
        let overs = session
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, SessionEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
        assert_eq!(session.final_report().map(|r| r.score), Some(37));
    }

    #[test]
    fn game_over_requires_playing() {
        let (mut session, _) = session();
        assert!(!session.game_over());
        assert_eq!(session.state(), GameState::Menu);
    }

    #[test]
    fn menu_resets_run_but_keeps_shelters() {
        let (mut session, mut rng) = session();
        let shelters = session.world().shelters().to_vec();
        session.start_single_player(&mut rng);
        session.stats_mut().warmth = 12.0;
        session.set_key(Key::W, true);
        session.show_menu();
        assert!(session.player().is_none());
        assert_eq!(session.stats(), &Stats::default());
        assert!(!session.keys().up());
        assert_eq!(session.world().shelters(), shelters.as_slice());
    }
}
