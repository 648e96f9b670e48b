//! Keyboard state and the per-frame movement step.
//!
//! Keys are tracked per physical key so that `w` and `ArrowUp` are
//! independent: releasing one leaves the other held.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    config::MovementConfig,
    world::{Player, Vec2},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Shift,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value; anything unrecognized is `None`.
    pub fn from_dom(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "w" => Key::W,
            "a" => Key::A,
            "s" => Key::S,
            "d" => Key::D,
            "arrowup" => Key::ArrowUp,
            "arrowdown" => Key::ArrowDown,
            "arrowleft" => Key::ArrowLeft,
            "arrowright" => Key::ArrowRight,
            "shift" => Key::Shift,
            _ => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    held: HashSet<Key>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn set(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn up(&self) -> bool {
        self.is_held(Key::W) || self.is_held(Key::ArrowUp)
    }

    pub fn down(&self) -> bool {
        self.is_held(Key::S) || self.is_held(Key::ArrowDown)
    }

    pub fn left(&self) -> bool {
        self.is_held(Key::A) || self.is_held(Key::ArrowLeft)
    }

    pub fn right(&self) -> bool {
        self.is_held(Key::D) || self.is_held(Key::ArrowRight)
    }

    pub fn sprint(&self) -> bool {
        self.is_held(Key::Shift)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementStep {
    pub delta: Vec2,
    pub sprinting: bool,
    /// Stamina to drain this frame; non-zero whenever sprinting, moving or not.
    pub stamina_cost: f64,
}

/// Axis contributions are summed independently, so a diagonal covers
/// `speed * sqrt(2)` per frame.
pub fn movement_step(
    keys: &HeldKeys,
    base_speed: f64,
    stamina: f64,
    config: &MovementConfig,
) -> MovementStep {
    let sprinting = keys.sprint() && stamina > 0.0;
    let speed = if sprinting {
        base_speed * config.sprint_multiplier
    } else {
        base_speed
    };

    let mut delta = Vec2::ZERO;
    if keys.up() {
        delta.y -= speed;
    }
    if keys.down() {
        delta.y += speed;
    }
    if keys.left() {
        delta.x -= speed;
    }
    if keys.right() {
        delta.x += speed;
    }

    MovementStep {
        delta,
        sprinting,
        stamina_cost: if sprinting { config.sprint_drain } else { 0.0 },
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Largest width or height accepted from a config or a resize.
    pub const MAX_EXTENT: f64 = 16_384.0;

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides positive and no larger than `MAX_EXTENT`. Rejects NaN.
    pub fn accepts(width: f64, height: f64) -> bool {
        let in_range = |side: f64| side > 0.0 && side <= Self::MAX_EXTENT;
        in_range(width) && in_range(height)
    }
}

/// Top-left world coordinate of the viewport, centred on the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
}

impl Camera {
    pub fn follow(player: &Player, viewport: Viewport) -> Self {
        Self {
            x: player.position.x - viewport.width / 2.0,
            y: player.position.y - viewport.height / 2.0,
        }
    }

    pub fn to_screen(self, world: Vec2) -> Vec2 {
        Vec2::new(world.x - self.x, world.y - self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;

    fn held(keys: &[Key]) -> HeldKeys {
        let mut held = HeldKeys::new();
        for key in keys {
            held.press(*key);
        }
        held
    }

    #[test]
    fn dom_names_map_case_insensitively() {
        assert_eq!(Key::from_dom("W"), Some(Key::W));
        assert_eq!(Key::from_dom("ArrowLeft"), Some(Key::ArrowLeft));
        assert_eq!(Key::from_dom("Shift"), Some(Key::Shift));
        assert_eq!(Key::from_dom("q"), None);
        assert_eq!(Key::from_dom(" "), None);
    }

    #[test]
    fn aliases_stay_independent() {
        let mut keys = held(&[Key::W, Key::ArrowUp]);
        keys.release(Key::W);
        assert!(keys.up());
        keys.release(Key::ArrowUp);
        assert!(!keys.up());
    }

    #[test]
    fn axis_move_uses_base_speed_with_up_negative() {
        let step = movement_step(&held(&[Key::W]), 3.0, 100.0, &MovementConfig::default());
        assert_eq!(step.delta, Vec2::new(0.0, -3.0));
        assert!(!step.sprinting);
        assert_eq!(step.stamina_cost, 0.0);
    }

    #[test]
    fn diagonal_is_not_normalized() {
        let step = movement_step(
            &held(&[Key::S, Key::ArrowRight]),
            3.0,
            100.0,
            &MovementConfig::default(),
        );
        assert_eq!(step.delta, Vec2::new(3.0, 3.0));
        let magnitude = Vec2::ZERO.distance(step.delta);
        assert!((magnitude - 3.0 * 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn opposite_keys_cancel() {
        let step = movement_step(
            &held(&[Key::A, Key::D]),
            3.0,
            100.0,
            &MovementConfig::default(),
        );
        assert_eq!(step.delta, Vec2::ZERO);
    }

    #[test]
    fn sprint_needs_stamina() {
        let config = MovementConfig::default();
        let step = movement_step(&held(&[Key::Shift, Key::D]), 3.0, 10.0, &config);
        assert!(step.sprinting);
        assert_eq!(step.delta.x, 4.5);
        assert_eq!(step.stamina_cost, 0.5);

        let exhausted = movement_step(&held(&[Key::Shift, Key::D]), 3.0, 0.0, &config);
        assert!(!exhausted.sprinting);
        assert_eq!(exhausted.delta.x, 3.0);
        assert_eq!(exhausted.stamina_cost, 0.0);
    }

    #[test]
    fn sprinting_in_place_still_costs_stamina() {
        let step = movement_step(&held(&[Key::Shift]), 3.0, 50.0, &MovementConfig::default());
        assert_eq!(step.delta, Vec2::ZERO);
        assert_eq!(step.stamina_cost, 0.5);
    }

    #[test]
    fn viewport_bounds() {
        assert!(Viewport::accepts(1280.0, 720.0));
        assert!(Viewport::accepts(Viewport::MAX_EXTENT, 1.0));
        assert!(!Viewport::accepts(Viewport::MAX_EXTENT + 1.0, 720.0));
        assert!(!Viewport::accepts(0.0, 720.0));
        assert!(!Viewport::accepts(f64::NAN, 720.0));
    }

    #[test]
    fn camera_centres_player() {
        let mut player = Player::spawn(&PlayerConfig::default());
        player.position = Vec2::new(100.0, -40.0);
        let camera = Camera::follow(&player, Viewport::new(800.0, 600.0));
        assert_eq!(camera, Camera { x: -300.0, y: -340.0 });
        assert_eq!(camera.to_screen(player.position), Vec2::new(400.0, 300.0));
    }
}
