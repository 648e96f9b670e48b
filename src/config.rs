use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::{input::Viewport, stats::Weather};

/// Finest grid spacing, in world units, a config may ask for.
pub const MIN_GRID_SIZE: f64 = 10.0;

fn default_name() -> String {
    "antarctica".to_string()
}

fn default_tick_seconds() -> f64 {
    1.0
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    720.0
}

fn default_player_speed() -> f64 {
    3.0
}

fn default_player_size() -> f64 {
    20.0
}

fn default_player_color() -> String {
    "#667eea".to_string()
}

fn default_player_name() -> String {
    "Explorer".to_string()
}

fn default_shelter_count() -> usize {
    5
}

fn default_shelter_extent() -> f64 {
    1000.0
}

fn default_item_count() -> usize {
    50
}

fn default_item_extent() -> f64 {
    2000.0
}

fn default_item_floor() -> usize {
    30
}

fn default_clear_loss() -> f64 {
    0.5
}

fn default_snow_loss() -> f64 {
    1.0
}

fn default_blizzard_loss() -> f64 {
    1.5
}

fn default_cold_threshold() -> f64 {
    30.0
}

fn default_cold_damage() -> f64 {
    0.5
}

fn default_stamina_regen() -> f64 {
    0.2
}

fn default_sprint_multiplier() -> f64 {
    1.5
}

fn default_sprint_drain() -> f64 {
    0.5
}

fn default_pickup_margin() -> f64 {
    10.0
}

fn default_shelter_margin() -> f64 {
    50.0
}

fn default_shelter_warmth() -> f64 {
    1.0
}

fn default_pickup_health() -> f64 {
    5.0
}

fn default_pickup_warmth() -> f64 {
    10.0
}

fn default_cull_margin() -> f64 {
    50.0
}

fn default_minimap_size() -> f64 {
    200.0
}

fn default_minimap_scale() -> f64 {
    0.05
}

fn default_grid_size() -> f64 {
    100.0
}

fn default_snow_particles() -> usize {
    100
}

/// Top-level game configuration. Every field has a default, so an empty
/// YAML document yields the stock Antarctic expedition.
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Fixed seed for reproducible worlds; drawn from entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub weather: Weather,
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub survival: SurvivalConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f64,
    #[serde(default = "default_viewport_height")]
    pub height: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_speed")]
    pub speed: f64,
    #[serde(default = "default_player_size")]
    pub size: f64,
    #[serde(default = "default_player_color")]
    pub color: String,
    #[serde(default = "default_player_name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_shelter_count")]
    pub shelter_count: usize,
    /// Shelters are scattered over `[-extent, extent]` on both axes.
    #[serde(default = "default_shelter_extent")]
    pub shelter_extent: f64,
    #[serde(default = "default_item_count")]
    pub item_count: usize,
    #[serde(default = "default_item_extent")]
    pub item_extent: f64,
    /// Collecting below this many live items regenerates the whole set.
    #[serde(default = "default_item_floor")]
    pub item_floor: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WarmthLoss {
    #[serde(default = "default_clear_loss")]
    pub clear: f64,
    #[serde(default = "default_snow_loss")]
    pub snow: f64,
    #[serde(default = "default_blizzard_loss")]
    pub blizzard: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurvivalConfig {
    #[serde(default)]
    pub warmth_loss: WarmthLoss,
    #[serde(default = "default_cold_threshold")]
    pub cold_threshold: f64,
    #[serde(default = "default_cold_damage")]
    pub cold_damage: f64,
    #[serde(default = "default_stamina_regen")]
    pub stamina_regen: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovementConfig {
    #[serde(default = "default_sprint_multiplier")]
    pub sprint_multiplier: f64,
    #[serde(default = "default_sprint_drain")]
    pub sprint_drain: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionConfig {
    #[serde(default = "default_pickup_margin")]
    pub pickup_margin: f64,
    #[serde(default = "default_shelter_margin")]
    pub shelter_margin: f64,
    #[serde(default = "default_shelter_warmth")]
    pub shelter_warmth: f64,
    #[serde(default = "default_pickup_health")]
    pub pickup_health: f64,
    #[serde(default = "default_pickup_warmth")]
    pub pickup_warmth: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_cull_margin")]
    pub cull_margin: f64,
    #[serde(default = "default_minimap_size")]
    pub minimap_size: f64,
    #[serde(default = "default_minimap_scale")]
    pub minimap_scale: f64,
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    #[serde(default = "default_snow_particles")]
    pub snow_particles: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: None,
            weather: Weather::default(),
            tick_seconds: default_tick_seconds(),
            viewport: ViewportConfig::default(),
            player: PlayerConfig::default(),
            world: WorldConfig::default(),
            survival: SurvivalConfig::default(),
            movement: MovementConfig::default(),
            interaction: InteractionConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: default_player_speed(),
            size: default_player_size(),
            color: default_player_color(),
            name: default_player_name(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            shelter_count: default_shelter_count(),
            shelter_extent: default_shelter_extent(),
            item_count: default_item_count(),
            item_extent: default_item_extent(),
            item_floor: default_item_floor(),
        }
    }
}

impl Default for WarmthLoss {
    fn default() -> Self {
        Self {
            clear: default_clear_loss(),
            snow: default_snow_loss(),
            blizzard: default_blizzard_loss(),
        }
    }
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            warmth_loss: WarmthLoss::default(),
            cold_threshold: default_cold_threshold(),
            cold_damage: default_cold_damage(),
            stamina_regen: default_stamina_regen(),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            sprint_multiplier: default_sprint_multiplier(),
            sprint_drain: default_sprint_drain(),
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            pickup_margin: default_pickup_margin(),
            shelter_margin: default_shelter_margin(),
            shelter_warmth: default_shelter_warmth(),
            pickup_health: default_pickup_health(),
            pickup_warmth: default_pickup_warmth(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cull_margin: default_cull_margin(),
            minimap_size: default_minimap_size(),
            minimap_scale: default_minimap_scale(),
            grid_size: default_grid_size(),
            snow_particles: default_snow_particles(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tick_seconds must be positive, got {0}")]
    TickPeriod(f64),
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must not exceed {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: f64,
        max: f64,
    },
    #[error("render.grid_size must be at least {min}, got {value}")]
    GridTooFine { value: f64, min: f64 },
    #[error("item_floor ({floor}) must not exceed item_count ({count})")]
    ItemFloor { floor: usize, count: usize },
    #[error("warmth loss must not decrease with severity (clear {clear}, snow {snow}, blizzard {blizzard})")]
    WeatherOrdering { clear: f64, snow: f64, blizzard: f64 },
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_seconds > 0.0) {
            return Err(ConfigError::TickPeriod(self.tick_seconds));
        }

        let positive = [
            ("viewport.width", self.viewport.width),
            ("viewport.height", self.viewport.height),
            ("player.size", self.player.size),
            ("world.shelter_extent", self.world.shelter_extent),
            ("world.item_extent", self.world.item_extent),
            ("render.minimap_size", self.render.minimap_size),
            ("render.minimap_scale", self.render.minimap_scale),
            ("render.grid_size", self.render.grid_size),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let non_negative = [
            ("player.speed", self.player.speed),
            ("survival.cold_damage", self.survival.cold_damage),
            ("survival.stamina_regen", self.survival.stamina_regen),
            ("movement.sprint_drain", self.movement.sprint_drain),
            ("movement.sprint_multiplier", self.movement.sprint_multiplier),
            ("interaction.pickup_margin", self.interaction.pickup_margin),
            ("interaction.shelter_margin", self.interaction.shelter_margin),
            ("interaction.shelter_warmth", self.interaction.shelter_warmth),
            ("interaction.pickup_health", self.interaction.pickup_health),
            ("interaction.pickup_warmth", self.interaction.pickup_warmth),
            ("render.cull_margin", self.render.cull_margin),
            ("survival.cold_threshold", self.survival.cold_threshold),
            ("survival.warmth_loss.clear", self.survival.warmth_loss.clear),
            ("survival.warmth_loss.snow", self.survival.warmth_loss.snow),
            ("survival.warmth_loss.blizzard", self.survival.warmth_loss.blizzard),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        for (field, value) in [
            ("viewport.width", self.viewport.width),
            ("viewport.height", self.viewport.height),
        ] {
            if value > Viewport::MAX_EXTENT {
                return Err(ConfigError::TooLarge {
                    field,
                    value,
                    max: Viewport::MAX_EXTENT,
                });
            }
        }

        if self.render.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooFine {
                value: self.render.grid_size,
                min: MIN_GRID_SIZE,
            });
        }

        if self.world.item_floor > self.world.item_count {
            return Err(ConfigError::ItemFloor {
                floor: self.world.item_floor,
                count: self.world.item_count,
            });
        }

        let loss = &self.survival.warmth_loss;
        if loss.snow < loss.clear || loss.blizzard < loss.snow {
            return Err(ConfigError::WeatherOrdering {
                clear: loss.clear,
                snow: loss.snow,
                blizzard: loss.blizzard,
            });
        }

        Ok(())
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<GameConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GameConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_expedition() {
        let config = GameConfig::default();
        assert_eq!(config.weather, Weather::Clear);
        assert_eq!(config.player.speed, 3.0);
        assert_eq!(config.player.size, 20.0);
        assert_eq!(config.world.shelter_count, 5);
        assert_eq!(config.world.item_count, 50);
        assert_eq!(config.world.item_floor, 30);
        assert_eq!(config.survival.warmth_loss.blizzard, 1.5);
        assert_eq!(config.render.minimap_scale, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config: GameConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.name, "antarctica");
        assert_eq!(config.tick_seconds, 1.0);
        assert_eq!(config.interaction.shelter_margin, 50.0);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let yaml = "weather: blizzard\nseed: 11\nplayer:\n  speed: 4.5\n";
        let config: GameConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.weather, Weather::Blizzard);
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.player.speed, 4.5);
        assert_eq!(config.player.size, 20.0);
    }

    #[test]
    fn floor_above_count_is_rejected() {
        let mut config = GameConfig::default();
        config.world.item_floor = 60;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ItemFloor {
                floor: 60,
                count: 50
            })
        );
    }

    #[test]
    fn zero_tick_period_is_rejected() {
        let mut config = GameConfig::default();
        config.tick_seconds = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::TickPeriod(0.0)));
    }

    #[test]
    fn oversized_viewport_is_rejected() {
        let mut config = GameConfig::default();
        config.viewport.width = 1e9;
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooLarge {
                field: "viewport.width",
                value: 1e9,
                max: Viewport::MAX_EXTENT,
            })
        );
    }

    #[test]
    fn fine_grid_is_rejected() {
        let mut config = GameConfig::default();
        config.render.grid_size = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooFine { .. })
        ));
    }

    #[test]
    fn nan_rates_and_negative_threshold_are_rejected() {
        let mut config = GameConfig::default();
        config.survival.warmth_loss.blizzard = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "survival.warmth_loss.blizzard",
                ..
            })
        ));

        let mut config = GameConfig::default();
        config.survival.warmth_loss.snow = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "survival.warmth_loss.snow",
                ..
            })
        ));

        let mut config = GameConfig::default();
        config.survival.cold_threshold = -5.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "survival.cold_threshold",
                value: -5.0
            })
        );
    }

    #[test]
    fn milder_blizzard_is_rejected() {
        let mut config = GameConfig::default();
        config.survival.warmth_loss.blizzard = 0.7;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeatherOrdering { .. })
        ));
    }
}
