use serde::{Deserialize, Serialize};

use crate::config::{SurvivalConfig, WarmthLoss};

pub const STAT_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Clear,
    Snow,
    Blizzard,
}

impl Weather {
    pub fn warmth_loss(self, rates: &WarmthLoss) -> f64 {
        match self {
            Weather::Clear => rates.clear,
            Weather::Snow => rates.snow,
            Weather::Blizzard => rates.blizzard,
        }
    }

    pub fn has_snowfall(self) -> bool {
        matches!(self, Weather::Snow | Weather::Blizzard)
    }
}

impl std::str::FromStr for Weather {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(Weather::Clear),
            "snow" => Ok(Weather::Snow),
            "blizzard" => Ok(Weather::Blizzard),
            other => Err(format!("unknown weather '{other}'")),
        }
    }
}

/// Per-session survival stats. Health, warmth and stamina live in
/// `[0, STAT_MAX]`; every mutator clamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub health: f64,
    pub warmth: f64,
    pub stamina: f64,
    pub research: u64,
    pub survival_time: u64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            health: STAT_MAX,
            warmth: STAT_MAX,
            stamina: STAT_MAX,
            research: 0,
            survival_time: 0,
        }
    }
}

fn clamp_stat(value: f64) -> f64 {
    value.clamp(0.0, STAT_MAX)
}

impl Stats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn heal(&mut self, amount: f64) {
        self.health = clamp_stat(self.health + amount);
    }

    pub fn damage(&mut self, amount: f64) {
        self.health = clamp_stat(self.health - amount);
    }

    pub fn warm(&mut self, amount: f64) {
        self.warmth = clamp_stat(self.warmth + amount);
    }

    pub fn chill(&mut self, amount: f64) {
        self.warmth = clamp_stat(self.warmth - amount);
    }

    pub fn regen_stamina(&mut self, amount: f64) {
        self.stamina = clamp_stat(self.stamina + amount);
    }

    pub fn drain_stamina(&mut self, amount: f64) {
        self.stamina = clamp_stat(self.stamina - amount);
    }

    pub fn add_research(&mut self, value: u32) {
        self.research = self.research.saturating_add(u64::from(value));
    }

    pub fn is_depleted(&self) -> bool {
        self.health <= 0.0
    }

    pub fn score(&self) -> u64 {
        self.research
            .saturating_mul(10)
            .saturating_add(self.survival_time)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            health: self.health.floor() as u32,
            warmth: self.warmth.floor() as u32,
            stamina: self.stamina.floor() as u32,
            health_bar: self.health,
            warmth_bar: self.warmth,
            stamina_bar: self.stamina,
            research_text: format!("Research: {}", self.research),
            time_text: format!("Time: {}", format_clock(self.survival_time)),
        }
    }

    pub fn final_report(&self) -> FinalReport {
        FinalReport {
            time: format_clock(self.survival_time),
            survival_time: self.survival_time,
            research: self.research,
            score: self.score(),
        }
    }
}

/// Outcome of one survival tick, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurvivalOutcome {
    pub warmth_lost: f64,
    pub health_lost: f64,
    pub stamina_gained: f64,
    pub depleted: bool,
}

/// Warmth decay, then cold damage, then stamina regen. The caller decides
/// what a depleted result means for the session.
pub fn apply_survival_tick(
    stats: &mut Stats,
    weather: Weather,
    sprint_held: bool,
    config: &SurvivalConfig,
) -> SurvivalOutcome {
    let before = stats.clone();

    stats.chill(weather.warmth_loss(&config.warmth_loss));
    if stats.warmth < config.cold_threshold {
        stats.damage(config.cold_damage);
    }
    if !sprint_held {
        stats.regen_stamina(config.stamina_regen);
    }

    SurvivalOutcome {
        warmth_lost: before.warmth - stats.warmth,
        health_lost: before.health - stats.health,
        stamina_gained: stats.stamina - before.stamina,
        depleted: stats.is_depleted(),
    }
}

/// `MM:SS`, minutes unbounded.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Values a presentation layer shows while playing: floored text values and
/// raw percentages for bar widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub health: u32,
    pub warmth: u32,
    pub stamina: u32,
    pub health_bar: f64,
    pub warmth_bar: f64,
    pub stamina_bar: f64,
    pub research_text: String,
    pub time_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    pub time: String,
    pub survival_time: u64,
    pub research: u64,
    pub score: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survival() -> SurvivalConfig {
        SurvivalConfig::default()
    }

    #[test]
    fn blizzard_from_forty_warmth_spares_health() {
        let mut stats = Stats {
            warmth: 40.0,
            ..Stats::default()
        };
        let outcome = apply_survival_tick(&mut stats, Weather::Blizzard, false, &survival());
        assert_eq!(stats.warmth, 38.5);
        assert_eq!(stats.health, 100.0);
        assert_eq!(outcome.health_lost, 0.0);
    }

    #[test]
    fn cold_costs_half_a_point_of_health_in_any_weather() {
        for weather in [Weather::Clear, Weather::Snow, Weather::Blizzard] {
            let mut stats = Stats {
                warmth: 25.0,
                health: 80.0,
                ..Stats::default()
            };
            apply_survival_tick(&mut stats, weather, false, &survival());
            assert_eq!(stats.health, 79.5, "weather {weather:?}");
        }
    }

    #[test]
    fn warmth_loss_increases_with_severity() {
        let rates = WarmthLoss::default();
        let clear = Weather::Clear.warmth_loss(&rates);
        let snow = Weather::Snow.warmth_loss(&rates);
        let blizzard = Weather::Blizzard.warmth_loss(&rates);
        assert!(clear < snow && snow < blizzard);
        assert_eq!((clear, snow, blizzard), (0.5, 1.0, 1.5));
    }

    #[test]
    fn sprint_held_blocks_stamina_regen() {
        let mut stats = Stats {
            stamina: 50.0,
            ..Stats::default()
        };
        apply_survival_tick(&mut stats, Weather::Clear, true, &survival());
        assert_eq!(stats.stamina, 50.0);
        apply_survival_tick(&mut stats, Weather::Clear, false, &survival());
        assert!((stats.stamina - 50.2).abs() < 1e-9);
    }

    #[test]
    fn decay_clamps_at_zero() {
        let mut stats = Stats {
            warmth: 0.3,
            health: 0.2,
            ..Stats::default()
        };
        let outcome = apply_survival_tick(&mut stats, Weather::Blizzard, false, &survival());
        assert_eq!(stats.warmth, 0.0);
        assert_eq!(stats.health, 0.0);
        assert!(outcome.depleted);
    }

    #[test]
    fn regen_clamps_at_max() {
        let mut stats = Stats {
            stamina: 99.9,
            ..Stats::default()
        };
        stats.regen_stamina(0.2);
        stats.heal(5.0);
        stats.warm(10.0);
        assert_eq!(stats.stamina, 100.0);
        assert_eq!(stats.health, 100.0);
        assert_eq!(stats.warmth, 100.0);
    }

    #[test]
    fn clock_pads_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(6001), "100:01");
    }

    #[test]
    fn hud_floors_values_and_formats_text() {
        let stats = Stats {
            health: 99.5,
            warmth: 38.5,
            stamina: 0.9,
            research: 35,
            survival_time: 125,
        };
        let hud = stats.hud();
        assert_eq!((hud.health, hud.warmth, hud.stamina), (99, 38, 0));
        assert_eq!(hud.warmth_bar, 38.5);
        assert_eq!(hud.research_text, "Research: 35");
        assert_eq!(hud.time_text, "Time: 02:05");
    }

    #[test]
    fn score_weights_research_by_ten() {
        let stats = Stats {
            research: 50,
            survival_time: 42,
            ..Stats::default()
        };
        let report = stats.final_report();
        assert_eq!(report.score, 542);
        assert_eq!(report.time, "00:42");
    }

    #[test]
    fn weather_parses_case_insensitively() {
        assert_eq!("Blizzard".parse::<Weather>(), Ok(Weather::Blizzard));
        assert!("hail".parse::<Weather>().is_err());
    }
}
