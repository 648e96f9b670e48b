use expedition::{
    config::SurvivalConfig,
    stats::{apply_survival_tick, Stats, Weather, STAT_MAX},
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Change {
    Heal(f64),
    Damage(f64),
    Warm(f64),
    Chill(f64),
    Regen(f64),
    Drain(f64),
    Tick(Weather, bool),
}

fn weather() -> impl Strategy<Value = Weather> {
    prop_oneof![
        Just(Weather::Clear),
        Just(Weather::Snow),
        Just(Weather::Blizzard)
    ]
}

fn change() -> impl Strategy<Value = Change> {
    let amount = 0.0..250.0f64;
    prop_oneof![
        amount.clone().prop_map(Change::Heal),
        amount.clone().prop_map(Change::Damage),
        amount.clone().prop_map(Change::Warm),
        amount.clone().prop_map(Change::Chill),
        amount.clone().prop_map(Change::Regen),
        amount.prop_map(Change::Drain),
        (weather(), any::<bool>()).prop_map(|(w, sprint)| Change::Tick(w, sprint)),
    ]
}

fn in_range(value: f64) -> bool {
    (0.0..=STAT_MAX).contains(&value)
}

proptest! {
    #[test]
    fn stats_stay_clamped(changes in prop::collection::vec(change(), 0..200)) {
        let config = SurvivalConfig::default();
        let mut stats = Stats::default();
        for change in changes {
            match change {
                Change::Heal(v) => stats.heal(v),
                Change::Damage(v) => stats.damage(v),
                Change::Warm(v) => stats.warm(v),
                Change::Chill(v) => stats.chill(v),
                Change::Regen(v) => stats.regen_stamina(v),
                Change::Drain(v) => stats.drain_stamina(v),
                Change::Tick(weather, sprint) => {
                    apply_survival_tick(&mut stats, weather, sprint, &config);
                }
            }
            prop_assert!(in_range(stats.health));
            prop_assert!(in_range(stats.warmth));
            prop_assert!(in_range(stats.stamina));
        }
    }

    #[test]
    fn tick_never_raises_warmth_or_health(
        health in 0.0..=100.0f64,
        warmth in 0.0..=100.0f64,
        stamina in 0.0..=100.0f64,
        weather in weather(),
        sprint in any::<bool>(),
    ) {
        let mut stats = Stats { health, warmth, stamina, ..Stats::default() };
        let outcome = apply_survival_tick(&mut stats, weather, sprint, &SurvivalConfig::default());
        prop_assert!(stats.warmth <= warmth);
        prop_assert!(stats.health <= health);
        prop_assert!(outcome.warmth_lost >= 0.0);
        prop_assert_eq!(outcome.depleted, stats.health <= 0.0);
        if sprint {
            prop_assert_eq!(stats.stamina, stamina);
        }
    }

    #[test]
    fn score_is_ten_per_research_plus_seconds(research in 0u64..100_000, time in 0u64..1_000_000) {
        let stats = Stats { research, survival_time: time, ..Stats::default() };
        prop_assert_eq!(stats.score(), research * 10 + time);
        prop_assert_eq!(stats.final_report().score, stats.score());
    }
}
