use serde::Serialize;

use tirages_core::{DrawFilter, DrawSequence, GameProfile, Pool, Result};

use crate::config::TrendConfig;
use crate::frequency::{compute_frequencies, count_numbers, hottest, FrequencyEntry};

/// Évolution d'un numéro entre la fenêtre récente et les tirages plus anciens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Rising => write!(f, "EN HAUSSE"),
            Trend::Falling => write!(f, "EN BAISSE"),
            Trend::Stable => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendEntry {
    pub number: u8,
    pub recent_count: u32,
    pub older_count: u32,
    /// Sorties par tirage dans la fenêtre récente.
    pub recent_rate: f64,
    /// Sorties par tirage avant la fenêtre.
    pub older_rate: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trends {
    pub recent_draws: usize,
    pub older_draws: usize,
    pub main: Vec<TrendEntry>,
    pub secondary: Vec<TrendEntry>,
}

impl Trends {
    pub fn rising(entries: &[TrendEntry]) -> Vec<u8> {
        with_trend(entries, Trend::Rising)
    }

    pub fn falling(entries: &[TrendEntry]) -> Vec<u8> {
        with_trend(entries, Trend::Falling)
    }
}

fn with_trend(entries: &[TrendEntry], trend: Trend) -> Vec<u8> {
    entries.iter().filter(|e| e.trend == trend).map(|e| e.number).collect()
}

/// Compare les `recent_window` derniers tirages au reste de l'historique.
///
/// Un numéro est en hausse quand son taux récent dépasse `hot_ratio` fois son
/// taux ancien, en baisse sous `cold_ratio` fois. Sans tirage ancien le taux
/// ancien vaut 0 : tout numéro sorti récemment est alors en hausse.
pub fn compute_trends(sequence: &DrawSequence, profile: &GameProfile, config: &TrendConfig) -> Result<Trends> {
    sequence.check_profile(profile)?;

    let draws = sequence.draws();
    let recent = config.recent_window.min(draws.len());
    let (older_draws, recent_draws) = draws.split_at(draws.len() - recent);
    log::debug!(
        "tendances : {} tirages récents contre {} ({})",
        recent,
        older_draws.len(),
        profile.name()
    );

    let pool_trends = |pool: Pool| -> Vec<TrendEntry> {
        let size = profile.range(pool);
        let recent_counts = count_numbers(recent_draws, pool, size);
        let older_counts = count_numbers(older_draws, pool, size);

        recent_counts
            .into_iter()
            .zip(older_counts)
            .enumerate()
            .map(|(idx, (recent_count, older_count))| {
                let recent_rate = recent_count as f64 / recent.max(1) as f64;
                let older_rate = older_count as f64 / older_draws.len().max(1) as f64;
                let trend = if recent_rate > older_rate * config.hot_ratio {
                    Trend::Rising
                } else if recent_rate < older_rate * config.cold_ratio {
                    Trend::Falling
                } else {
                    Trend::Stable
                };
                TrendEntry {
                    number: (idx + 1) as u8,
                    recent_count,
                    older_count,
                    recent_rate,
                    older_rate,
                    trend,
                }
            })
            .collect()
    };

    Ok(Trends {
        recent_draws: recent,
        older_draws: older_draws.len(),
        main: pool_trends(Pool::Main),
        secondary: pool_trends(Pool::Secondary),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearStats {
    pub year: i32,
    pub total_draws: usize,
    /// (numéro, sorties) les plus fréquents de l'année, numéros jamais sortis exclus.
    pub top_main: Vec<(u8, u32)>,
    pub top_secondary: Vec<(u8, u32)>,
    pub average_main_sum: Option<f64>,
}

fn top_counts(entries: &[FrequencyEntry], k: usize) -> Vec<(u8, u32)> {
    hottest(entries, k)
        .into_iter()
        .filter_map(|n| entries.get((n - 1) as usize))
        .filter(|e| e.count > 0)
        .map(|e| (e.number, e.count))
        .collect()
}

/// Un bilan par année présente dans la suite, par année croissante.
pub fn yearly_stats(sequence: &DrawSequence, profile: &GameProfile, config: &TrendConfig) -> Result<Vec<YearStats>> {
    sequence.check_profile(profile)?;

    sequence
        .years()
        .into_iter()
        .map(|year| {
            let year_draws = sequence.filter(&DrawFilter {
                year: Some(year),
                month: None,
            });
            let frequencies = compute_frequencies(&year_draws, profile)?;
            Ok(YearStats {
                year,
                total_draws: year_draws.len(),
                top_main: top_counts(&frequencies.main, config.yearly_top_main),
                top_secondary: top_counts(&frequencies.secondary, config.yearly_top_secondary),
                average_main_sum: year_draws.average_main_sum(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tirages_core::chrono::{Days, NaiveDate};
    use tirages_core::models::make_test_sequence;
    use tirages_core::{Draw, EngineError};

    fn em_seq(start: NaiveDate, draws: Vec<Vec<u8>>) -> DrawSequence {
        let draws = draws
            .into_iter()
            .enumerate()
            .map(|(i, m)| Draw::new(format!("{:03}", i), start + Days::new(3 * i as u64), m, vec![1, 2]))
            .collect();
        DrawSequence::new(draws, &GameProfile::euromillions()).unwrap()
    }

    fn window(n: usize) -> TrendConfig {
        TrendConfig {
            recent_window: n,
            ..TrendConfig::default()
        }
    }

    #[test]
    fn test_rising_and_falling() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // 1 sort dans les 4 anciens tirages et jamais ensuite ; 40 l'inverse
        let seq = em_seq(
            start,
            vec![
                vec![1, 2, 3, 4, 5],
                vec![1, 6, 7, 8, 9],
                vec![1, 10, 11, 12, 13],
                vec![1, 14, 15, 16, 17],
                vec![40, 2, 3, 4, 5],
                vec![40, 6, 7, 8, 9],
            ],
        );
        let trends = compute_trends(&seq, &GameProfile::euromillions(), &window(2)).unwrap();
        assert_eq!(trends.recent_draws, 2);
        assert_eq!(trends.older_draws, 4);

        let one = &trends.main[0];
        assert_eq!((one.recent_count, one.older_count), (0, 4));
        assert_eq!(one.trend, Trend::Falling);

        let forty = &trends.main[39];
        assert_eq!(forty.recent_rate, 1.0);
        assert_eq!(forty.older_rate, 0.0);
        assert_eq!(forty.trend, Trend::Rising);

        // 2 : 1 sur 2 récents contre 1 sur 4 anciens, ratio 2 > 1.5
        assert_eq!(trends.main[1].trend, Trend::Rising);
        // étoiles 1 et 2 à chaque tirage
        assert_eq!(trends.secondary[0].trend, Trend::Stable);
        assert_eq!(trends.main[49].trend, Trend::Stable);

        assert!(Trends::rising(&trends.main).contains(&40));
        assert_eq!(Trends::falling(&trends.main), vec![1, 10, 11, 12, 13, 14, 15, 16, 17]);
    }

    #[test]
    fn test_window_larger_than_history() {
        let p = GameProfile::loto();
        let seq = make_test_sequence(10, &p);
        let trends = compute_trends(&seq, &p, &window(50)).unwrap();
        assert_eq!(trends.recent_draws, 10);
        assert_eq!(trends.older_draws, 0);
        for entry in &trends.main {
            let expected = if entry.recent_count > 0 { Trend::Rising } else { Trend::Stable };
            assert_eq!(entry.trend, expected, "numéro {}", entry.number);
        }
    }

    #[test]
    fn test_empty_sequence_is_stable() {
        let p = GameProfile::euromillions();
        let trends = compute_trends(&DrawSequence::default(), &p, &TrendConfig::default()).unwrap();
        assert_eq!(trends.main.len(), 50);
        assert_eq!(trends.secondary.len(), 12);
        assert!(trends.main.iter().all(|e| e.trend == Trend::Stable));
    }

    #[test]
    fn test_counts_cover_every_draw() {
        let p = GameProfile::euromillions();
        let seq = make_test_sequence(45, &p);
        let trends = compute_trends(&seq, &p, &window(20)).unwrap();
        let recent: u32 = trends.main.iter().map(|e| e.recent_count).sum();
        let older: u32 = trends.main.iter().map(|e| e.older_count).sum();
        assert_eq!(recent, 20 * 5);
        assert_eq!(older, 25 * 5);
    }

    #[test]
    fn test_yearly_stats() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 26).unwrap();
        // tirages aux 26/12, 29/12, 01/01, 04/01
        let seq = em_seq(
            start,
            vec![
                vec![7, 1, 2, 3, 4],
                vec![7, 1, 5, 6, 8],
                vec![9, 10, 11, 12, 13],
                vec![9, 20, 21, 22, 23],
            ],
        );
        let config = TrendConfig {
            yearly_top_main: 2,
            yearly_top_secondary: 1,
            ..TrendConfig::default()
        };
        let years = yearly_stats(&seq, &GameProfile::euromillions(), &config).unwrap();
        assert_eq!(years.len(), 2);

        assert_eq!(years[0].year, 2023);
        assert_eq!(years[0].total_draws, 2);
        assert_eq!(years[0].top_main, vec![(1, 2), (7, 2)]);
        assert_eq!(years[0].top_secondary, vec![(1, 2)]);
        assert_eq!(years[0].average_main_sum, Some((17.0 + 27.0) / 2.0));

        assert_eq!(years[1].year, 2024);
        assert_eq!(years[1].top_main[0], (9, 2));
        let total: usize = years.iter().map(|y| y.total_draws).sum();
        assert_eq!(total, seq.len());
    }

    #[test]
    fn test_yearly_top_skips_unseen() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let seq = em_seq(start, vec![vec![1, 2, 3, 4, 5]]);
        let config = TrendConfig {
            yearly_top_main: 8,
            ..TrendConfig::default()
        };
        let years = yearly_stats(&seq, &GameProfile::euromillions(), &config).unwrap();
        assert_eq!(years[0].top_main.len(), 5);
        assert!(yearly_stats(&DrawSequence::default(), &GameProfile::loto(), &config)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_other_profile_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let seq = em_seq(start, vec![vec![1, 2, 3, 4, 50]]);
        let loto = GameProfile::loto();
        assert!(matches!(
            compute_trends(&seq, &loto, &TrendConfig::default()),
            Err(EngineError::Configuration(_))
        ));
        assert!(yearly_stats(&seq, &loto, &TrendConfig::default()).is_err());
    }
}
