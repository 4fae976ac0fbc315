use serde::Serialize;

use tirages_core::{CandidateGrid, DrawSequence, GameProfile, Pool, Result};

use crate::config::PatternConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternBucket {
    pub key: String,
    pub count: u32,
    pub probability: f64,
}

/// Une collection par dimension ; dans chaque dimension les seaux sont
/// exclusifs et couvrent tout le domaine, y compris les seaux jamais observés.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternBuckets {
    pub total_draws: usize,
    pub parity: Vec<PatternBucket>,
    pub high_low: Vec<PatternBucket>,
    pub sum_range: Vec<PatternBucket>,
    /// Vide quand le jeu tire au plus un numéro secondaire.
    pub secondary_parity: Vec<PatternBucket>,
    pub consecutive: Vec<PatternBucket>,
}

/// Domaine énumérable d'une dimension : libellés ordonnés et compteurs associés.
struct Dimension {
    labels: Vec<String>,
    counts: Vec<u32>,
}

impl Dimension {
    fn new(labels: Vec<String>) -> Self {
        let counts = vec![0; labels.len()];
        Self { labels, counts }
    }

    fn hit(&mut self, idx: usize) {
        if let Some(c) = self.counts.get_mut(idx) {
            *c += 1;
        }
    }

    fn into_buckets(self, total: usize) -> Vec<PatternBucket> {
        self.labels
            .into_iter()
            .zip(self.counts)
            .map(|(key, count)| PatternBucket {
                key,
                count,
                probability: if total > 0 { count as f64 / total as f64 } else { 0.0 },
            })
            .collect()
    }
}

/// Répartition "a/b" entre deux classes de tailles `left_avail` et `right_avail`
/// pour `k` numéros : bornes valides du nombre de numéros dans la classe de gauche.
fn split_bounds(k: usize, left_avail: usize, right_avail: usize) -> (usize, usize) {
    (k.saturating_sub(right_avail), k.min(left_avail))
}

fn split_labels(k: usize, left_avail: usize, right_avail: usize) -> Vec<String> {
    let (lo, hi) = split_bounds(k, left_avail, right_avail);
    (lo..=hi).map(|left| format!("{}/{}", left, k - left)).collect()
}

fn evens_in(range: u8) -> usize {
    range as usize / 2
}

pub fn even_count(numbers: &[u8]) -> usize {
    numbers.iter().filter(|&&n| n % 2 == 0).count()
}

pub fn high_count(numbers: &[u8], threshold: u8) -> usize {
    numbers.iter().filter(|&&n| n > threshold).count()
}

/// Paires (n, n+1) présentes dans l'ensemble.
pub fn consecutive_count(numbers: &[u8]) -> usize {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).filter(|w| w[1] == w[0] + 1).count()
}

/// Tranche `[lo, hi]` contenant `sum`, tranches alignées sur la somme minimale théorique.
pub fn sum_bucket(sum: u32, profile: &GameProfile, width: u32) -> (u32, u32) {
    let width = width.max(1);
    let min = profile.min_main_sum();
    let max = profile.max_main_sum();
    let idx = sum.saturating_sub(min) / width;
    let lo = min + idx * width;
    (lo, (lo + width - 1).min(max))
}

fn sum_labels(profile: &GameProfile, width: u32) -> Vec<String> {
    let width = width.max(1);
    let min = profile.min_main_sum();
    let max = profile.max_main_sum();
    (min..=max)
        .step_by(width as usize)
        .map(|lo| format!("{}-{}", lo, (lo + width - 1).min(max)))
        .collect()
}

pub fn compute_patterns(
    sequence: &DrawSequence,
    profile: &GameProfile,
    config: &PatternConfig,
) -> Result<PatternBuckets> {
    sequence.check_profile(profile)?;
    let k = profile.main_count();
    let range = profile.main_range();
    let threshold = profile.high_threshold();
    let width = config.sum_bucket_width.max(1);

    let evens = evens_in(range);
    let odds = range as usize - evens;
    let highs = (range - threshold) as usize;
    let lows = threshold as usize;

    let (parity_lo, _) = split_bounds(k, evens, odds);
    let (high_lo, _) = split_bounds(k, highs, lows);
    let mut parity = Dimension::new(split_labels(k, evens, odds));
    let mut high_low = Dimension::new(split_labels(k, highs, lows));
    let mut sum_range = Dimension::new(sum_labels(profile, width));
    let mut consecutive = Dimension::new((0..k).map(|c| c.to_string()).collect());

    let sk = profile.secondary_count();
    let s_range = profile.secondary_range();
    let s_evens = evens_in(s_range);
    let s_odds = s_range as usize - s_evens;
    let (s_parity_lo, _) = split_bounds(sk, s_evens, s_odds);
    let mut secondary_parity = if sk > 1 {
        Dimension::new(split_labels(sk, s_evens, s_odds))
    } else {
        Dimension::new(Vec::new())
    };

    let min_sum = profile.min_main_sum();
    for draw in sequence {
        let main = Pool::Main.numbers_from(draw);
        parity.hit(even_count(main) - parity_lo);
        high_low.hit(high_count(main, threshold) - high_lo);
        sum_range.hit((draw.main_sum().saturating_sub(min_sum) / width) as usize);
        consecutive.hit(consecutive_count(main));
        if sk > 1 {
            secondary_parity.hit(even_count(Pool::Secondary.numbers_from(draw)) - s_parity_lo);
        }
    }

    let total = sequence.len();
    Ok(PatternBuckets {
        total_draws: total,
        parity: parity.into_buckets(total),
        high_low: high_low.into_buckets(total),
        sum_range: sum_range.into_buckets(total),
        secondary_parity: secondary_parity.into_buckets(total),
        consecutive: consecutive.into_buckets(total),
    })
}

/// Profil descriptif d'une grille, dans les mêmes dimensions que les seaux.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridShape {
    pub sum: u32,
    pub parity: String,
    pub high_low: String,
    pub sum_range: String,
    pub consecutive: usize,
    /// Écart moyen entre numéros principaux triés consécutifs.
    pub mean_spacing: f64,
}

pub fn describe_grid(grid: &CandidateGrid, profile: &GameProfile, config: &PatternConfig) -> GridShape {
    let main = grid.main_numbers();
    let k = main.len();
    let evens = even_count(main);
    let highs = high_count(main, profile.high_threshold());
    let sum = grid.main_sum();
    let (lo, hi) = sum_bucket(sum, profile, config.sum_bucket_width);

    // main est trié à la construction de la grille
    let mean_spacing = if k > 1 {
        main.windows(2).map(|w| (w[1] - w[0]) as f64).sum::<f64>() / (k - 1) as f64
    } else {
        0.0
    };

    GridShape {
        sum,
        parity: format!("{}/{}", evens, k - evens),
        high_low: format!("{}/{}", highs, k - highs),
        sum_range: format!("{}-{}", lo, hi),
        consecutive: consecutive_count(main),
        mean_spacing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tirages_core::chrono::{Days, NaiveDate};
    use tirages_core::models::make_test_sequence;
    use tirages_core::Draw;

    fn em_seq(draws: Vec<(Vec<u8>, Vec<u8>)>) -> DrawSequence {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let draws = draws
            .into_iter()
            .enumerate()
            .map(|(i, (m, s))| Draw::new(format!("{:03}", i), start + Days::new(i as u64), m, s))
            .collect();
        DrawSequence::new(draws, &GameProfile::euromillions()).unwrap()
    }

    fn bucket<'a>(buckets: &'a [PatternBucket], key: &str) -> &'a PatternBucket {
        buckets.iter().find(|b| b.key == key).unwrap()
    }

    #[test]
    fn test_domains_euromillions() {
        let p = GameProfile::euromillions();
        let patterns = compute_patterns(&DrawSequence::default(), &p, &PatternConfig::default()).unwrap();
        let keys: Vec<&str> = patterns.parity.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["0/5", "1/4", "2/3", "3/2", "4/1", "5/0"]);
        assert_eq!(patterns.high_low.len(), 6);
        assert_eq!(patterns.secondary_parity.len(), 3);
        assert_eq!(patterns.consecutive.len(), 5);
        // 15..=240 par tranches de 25
        assert_eq!(patterns.sum_range.len(), 10);
        assert_eq!(patterns.sum_range[0].key, "15-39");
        assert_eq!(patterns.sum_range[9].key, "240-240");
        assert!(patterns.parity.iter().all(|b| b.count == 0 && b.probability == 0.0));
    }

    #[test]
    fn test_loto_has_no_secondary_pattern() {
        let p = GameProfile::loto();
        let patterns = compute_patterns(&make_test_sequence(10, &p), &p, &PatternConfig::default()).unwrap();
        assert!(patterns.secondary_parity.is_empty());
        assert_eq!(patterns.parity.len(), 7);
    }

    #[test]
    fn test_classification() {
        let seq = em_seq(vec![
            (vec![2, 4, 6, 31, 33], vec![2, 4]),
            (vec![1, 2, 3, 26, 50], vec![1, 2]),
        ]);
        let p = GameProfile::euromillions();
        let patterns = compute_patterns(&seq, &p, &PatternConfig::default()).unwrap();

        assert_eq!(bucket(&patterns.parity, "3/2").count, 2);
        assert_eq!(bucket(&patterns.parity, "2/3").count, 0);
        assert_eq!(bucket(&patterns.high_low, "2/3").count, 2);
        // sommes 76 et 82 -> tranche 65-89
        assert_eq!(bucket(&patterns.sum_range, "65-89").count, 2);
        assert!((bucket(&patterns.sum_range, "65-89").probability - 1.0).abs() < 1e-12);
        assert_eq!(bucket(&patterns.secondary_parity, "2/0").count, 1);
        assert_eq!(bucket(&patterns.secondary_parity, "1/1").count, 1);
        assert_eq!(bucket(&patterns.consecutive, "0").count, 1);
        assert_eq!(bucket(&patterns.consecutive, "2").count, 1);
    }

    #[test]
    fn test_one_increment_per_dimension() {
        for p in [GameProfile::euromillions(), GameProfile::loto()] {
            let seq = make_test_sequence(83, &p);
            let patterns = compute_patterns(&seq, &p, &PatternConfig { sum_bucket_width: 17 }).unwrap();
            let dims = [
                &patterns.parity,
                &patterns.high_low,
                &patterns.sum_range,
                &patterns.consecutive,
            ];
            for dim in dims {
                assert_eq!(dim.iter().map(|b| b.count).sum::<u32>(), 83);
                let prob: f64 = dim.iter().map(|b| b.probability).sum();
                assert!((prob - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_other_profile_rejected() {
        let seq = em_seq(vec![(vec![2, 4, 6, 8, 10], vec![2, 4])]);
        assert!(compute_patterns(&seq, &GameProfile::loto(), &PatternConfig::default()).is_err());
    }

    #[test]
    fn test_split_bounds_small_range() {
        // 3 numéros parmi 1..=3 : un seul pair disponible
        assert_eq!(split_labels(3, 1, 2), vec!["1/2".to_string()]);
        assert_eq!(split_labels(2, 1, 2), vec!["0/2".to_string(), "1/1".to_string()]);
    }

    #[test]
    fn test_sum_bucket() {
        let p = GameProfile::euromillions();
        assert_eq!(sum_bucket(15, &p, 25), (15, 39));
        assert_eq!(sum_bucket(127, &p, 25), (115, 139));
        assert_eq!(sum_bucket(240, &p, 25), (240, 240));
    }

    #[test]
    fn test_describe_grid() {
        let p = GameProfile::euromillions();
        let grid = CandidateGrid::new(vec![1, 2, 3, 26, 50], vec![1, 2], &p).unwrap();
        let shape = describe_grid(&grid, &p, &PatternConfig::default());
        assert_eq!(shape.sum, 82);
        assert_eq!(shape.parity, "3/2");
        assert_eq!(shape.high_low, "2/3");
        assert_eq!(shape.sum_range, "65-89");
        assert_eq!(shape.consecutive, 2);
        assert!((shape.mean_spacing - 49.0 / 4.0).abs() < 1e-12);
    }
}
