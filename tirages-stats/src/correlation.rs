use serde::Serialize;

use tirages_core::{DrawSequence, GameProfile, Result};

pub const DEFAULT_TOP_K: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrelationPair {
    /// Toujours `first < second`.
    pub first: u8,
    pub second: u8,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correlations {
    /// Toutes les paires (C(plage, 2) entrées), en ordre lexicographique.
    pub pairs: Vec<CorrelationPair>,
    /// Les `top_k` paires les plus fréquentes (départage lexicographique).
    pub strongest: Vec<CorrelationPair>,
}

pub fn compute_correlations(
    sequence: &DrawSequence,
    profile: &GameProfile,
    top_k: Option<usize>,
) -> Result<Correlations> {
    sequence.check_profile(profile)?;
    let size = profile.main_range() as usize;
    let mut joint = vec![vec![0u32; size]; size];

    for draw in sequence {
        let numbers = &draw.main_numbers;
        for i in 0..numbers.len() {
            for j in (i + 1)..numbers.len() {
                let (a, b) = if numbers[i] < numbers[j] {
                    (numbers[i], numbers[j])
                } else {
                    (numbers[j], numbers[i])
                };
                joint[(a - 1) as usize][(b - 1) as usize] += 1;
            }
        }
    }

    let mut pairs = Vec::with_capacity(size * size.saturating_sub(1) / 2);
    for a in 0..size {
        for b in (a + 1)..size {
            pairs.push(CorrelationPair {
                first: (a + 1) as u8,
                second: (b + 1) as u8,
                count: joint[a][b],
            });
        }
    }

    let mut strongest = pairs.clone();
    // tri stable : l'ordre lexicographique départage les égalités
    strongest.sort_by(|x, y| y.count.cmp(&x.count));
    strongest.truncate(top_k.unwrap_or(DEFAULT_TOP_K));

    log::debug!(
        "corrélations : {} paires sur {} tirages",
        pairs.len(),
        sequence.len()
    );

    Ok(Correlations { pairs, strongest })
}

impl Correlations {
    pub fn count(&self, a: u8, b: u8) -> Option<u32> {
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        self.pairs
            .iter()
            .find(|p| p.first == first && p.second == second)
            .map(|p| p.count)
    }

    /// Les `k` numéros sortis le plus souvent avec `number`, avec leur compteur.
    pub fn partners(&self, number: u8, k: usize) -> Vec<(u8, u32)> {
        let mut partners: Vec<(u8, u32)> = self
            .pairs
            .iter()
            .filter_map(|p| {
                if p.first == number {
                    Some((p.second, p.count))
                } else if p.second == number {
                    Some((p.first, p.count))
                } else {
                    None
                }
            })
            .collect();
        partners.sort_by(|x, y| y.1.cmp(&x.1).then(x.0.cmp(&y.0)));
        partners.truncate(k);
        partners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::compute_frequencies;
    use tirages_core::chrono::{Days, NaiveDate};
    use tirages_core::models::make_test_sequence;
    use tirages_core::Draw;

    fn em_seq(draws: Vec<Vec<u8>>) -> DrawSequence {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let draws = draws
            .into_iter()
            .enumerate()
            .map(|(i, m)| Draw::new(format!("{:03}", i), start + Days::new(i as u64), m, vec![1, 2]))
            .collect();
        DrawSequence::new(draws, &GameProfile::euromillions()).unwrap()
    }

    #[test]
    fn test_full_table_size() {
        let p = GameProfile::euromillions();
        let corr = compute_correlations(&DrawSequence::default(), &p, None).unwrap();
        assert_eq!(corr.pairs.len(), 50 * 49 / 2);
        assert_eq!(corr.strongest.len(), DEFAULT_TOP_K);
        assert!(corr.pairs.iter().all(|pair| pair.first < pair.second && pair.count == 0));

        let loto = GameProfile::loto();
        assert_eq!(compute_correlations(&DrawSequence::default(), &loto, Some(3)).unwrap().pairs.len(), 49 * 48 / 2);
    }

    #[test]
    fn test_co_occurrence_counts() {
        let seq = em_seq(vec![
            vec![10, 3, 25, 40, 1],
            vec![3, 10, 11, 12, 13],
            vec![3, 20, 21, 22, 23],
        ]);
        let corr = compute_correlations(&seq, &GameProfile::euromillions(), Some(3)).unwrap();
        assert_eq!(corr.count(3, 10), Some(2));
        assert_eq!(corr.count(10, 3), Some(2));
        assert_eq!(corr.count(1, 40), Some(1));
        assert_eq!(corr.count(20, 40), Some(0));

        assert_eq!(corr.strongest[0], CorrelationPair { first: 3, second: 10, count: 2 });
        assert_eq!(corr.strongest.len(), 3);
        // égalités à 1 : ordre lexicographique
        assert_eq!((corr.strongest[1].first, corr.strongest[1].second), (1, 3));
    }

    #[test]
    fn test_total_pairs_per_draw() {
        let p = GameProfile::loto();
        let seq = make_test_sequence(30, &p);
        let corr = compute_correlations(&seq, &p, None).unwrap();
        let total: u32 = corr.pairs.iter().map(|pair| pair.count).sum();
        assert_eq!(total, 30 * 15);
    }

    #[test]
    fn test_bounded_by_frequencies() {
        let p = GameProfile::euromillions();
        let seq = make_test_sequence(70, &p);
        let corr = compute_correlations(&seq, &p, None).unwrap();
        let freqs = compute_frequencies(&seq, &p).unwrap();
        for pair in &corr.pairs {
            let fa = freqs.main[(pair.first - 1) as usize].count;
            let fb = freqs.main[(pair.second - 1) as usize].count;
            assert!(pair.count <= fa.min(fb));
        }
    }

    #[test]
    fn test_other_profile_rejected() {
        // 50 n'existe pas au Loto : la table 49x49 ne doit jamais être indexée avec
        let seq = em_seq(vec![vec![1, 2, 3, 4, 50]]);
        let err = compute_correlations(&seq, &GameProfile::loto(), None).unwrap_err();
        assert!(matches!(err, tirages_core::EngineError::Configuration(_)));
    }

    #[test]
    fn test_partners() {
        let seq = em_seq(vec![
            vec![3, 10, 25, 40, 1],
            vec![3, 10, 11, 12, 13],
            vec![3, 11, 21, 22, 23],
        ]);
        let corr = compute_correlations(&seq, &GameProfile::euromillions(), None).unwrap();
        assert_eq!(corr.partners(3, 2), vec![(10, 2), (11, 2)]);
    }
}
