use serde::Serialize;

use tirages_core::{CandidateGrid, DrawSequence, GameProfile, Result};

/// Libellé du seau implicite regroupant les combinaisons absentes de la table des rangs.
pub const NO_TIER_LABEL: &str = "Aucun gain";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierStat {
    pub label: String,
    pub count: u32,
    pub percentage: f64,
    /// `total / count`, absent quand le rang n'a jamais été atteint.
    pub one_in: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCount {
    pub main_matches: usize,
    pub secondary_matches: usize,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierReport {
    pub total_draws: usize,
    /// Un élément par libellé distinct, dans l'ordre de la table du profil.
    pub tiers: Vec<TierStat>,
    pub no_tier: TierStat,
    /// Répartition brute par (bons numéros, bons secondaires), combinaisons non nulles.
    pub breakdown: Vec<MatchCount>,
}

impl TierReport {
    pub fn total_count(&self) -> u32 {
        self.tiers.iter().map(|t| t.count).sum::<u32>() + self.no_tier.count
    }

    pub fn get(&self, label: &str) -> Option<&TierStat> {
        if label == NO_TIER_LABEL {
            return Some(&self.no_tier);
        }
        self.tiers.iter().find(|t| t.label == label)
    }

    /// Nombre de tirages où la grille aurait atteint un rang.
    pub fn winning_draws(&self) -> u32 {
        self.tiers.iter().map(|t| t.count).sum()
    }
}

fn tier_stat(label: &str, count: u32, total: usize) -> TierStat {
    let (percentage, one_in) = if total > 0 && count > 0 {
        (
            count as f64 / total as f64 * 100.0,
            Some(total as f64 / count as f64),
        )
    } else {
        (0.0, None)
    };
    TierStat {
        label: label.to_string(),
        count,
        percentage,
        one_in,
    }
}

/// Confronte une grille à chaque tirage historique et compte les rangs atteints.
/// La grille et la suite sont validées contre le profil avant tout parcours.
pub fn evaluate_grid(
    candidate: &CandidateGrid,
    sequence: &DrawSequence,
    profile: &GameProfile,
) -> Result<TierReport> {
    candidate.validate_against(profile)?;
    sequence.check_profile(profile)?;

    let labels = profile.tier_labels();
    let main_dim = profile.main_count() + 1;
    let sec_dim = profile.secondary_count() + 1;

    // (bons numéros, bons secondaires) -> index du libellé
    let mut lookup: Vec<Vec<Option<usize>>> = vec![vec![None; sec_dim]; main_dim];
    for (m, row) in lookup.iter_mut().enumerate() {
        for (s, cell) in row.iter_mut().enumerate() {
            *cell = profile
                .tier_for(m, s)
                .and_then(|label| labels.iter().position(|l| *l == label));
        }
    }

    let mut joint = vec![vec![0u32; sec_dim]; main_dim];
    let mut tier_counts = vec![0u32; labels.len()];
    let mut no_tier = 0u32;

    for draw in sequence {
        let (m, s) = candidate.matches(draw);
        joint[m][s] += 1;
        match lookup[m][s] {
            Some(idx) => tier_counts[idx] += 1,
            None => no_tier += 1,
        }
    }

    let total = sequence.len();
    let tiers = labels
        .iter()
        .zip(&tier_counts)
        .map(|(label, &count)| tier_stat(label, count, total))
        .collect();

    let mut breakdown = Vec::new();
    for m in (0..main_dim).rev() {
        for s in (0..sec_dim).rev() {
            if joint[m][s] > 0 {
                breakdown.push(MatchCount {
                    main_matches: m,
                    secondary_matches: s,
                    count: joint[m][s],
                });
            }
        }
    }

    log::debug!(
        "évaluation {} : {} tirages, {} avec gain",
        candidate,
        total,
        total as u32 - no_tier
    );

    Ok(TierReport {
        total_draws: total,
        tiers,
        no_tier: tier_stat(NO_TIER_LABEL, no_tier, total),
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tirages_core::chrono::NaiveDate;
    use tirages_core::models::make_test_sequence;
    use tirages_core::{Draw, EngineError};

    fn single_draw(main: Vec<u8>, secondary: Vec<u8>) -> DrawSequence {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        DrawSequence::new(
            vec![Draw::new("001".to_string(), date, main, secondary)],
            &GameProfile::euromillions(),
        )
        .unwrap()
    }

    #[test]
    fn test_three_plus_one() {
        let p = GameProfile::euromillions();
        let grid = CandidateGrid::new(vec![1, 2, 3, 4, 5], vec![1, 2], &p).unwrap();
        let seq = single_draw(vec![1, 2, 3, 9, 10], vec![1, 5]);

        let report = evaluate_grid(&grid, &seq, &p).unwrap();
        assert_eq!(report.total_draws, 1);
        assert_eq!(report.get("Rang 9").unwrap().count, 1);
        assert_eq!(report.winning_draws(), 1);
        assert_eq!(report.no_tier.count, 0);
        assert_eq!(
            report.breakdown,
            vec![MatchCount { main_matches: 3, secondary_matches: 1, count: 1 }]
        );
        let stat = report.get("Rang 9").unwrap();
        assert!((stat.percentage - 100.0).abs() < 1e-10);
        assert_eq!(stat.one_in, Some(1.0));
    }

    #[test]
    fn test_no_tier_bucket() {
        let p = GameProfile::euromillions();
        let grid = CandidateGrid::new(vec![1, 2, 3, 4, 5], vec![1, 2], &p).unwrap();
        let seq = single_draw(vec![1, 20, 30, 40, 50], vec![1, 12]);

        let report = evaluate_grid(&grid, &seq, &p).unwrap();
        assert_eq!(report.no_tier.count, 1);
        assert_eq!(report.get(NO_TIER_LABEL).unwrap().count, 1);
        assert!(report.tiers.iter().all(|t| t.count == 0 && t.one_in.is_none()));
    }

    #[test]
    fn test_counts_sum_to_total() {
        for p in [GameProfile::euromillions(), GameProfile::loto()] {
            let seq = make_test_sequence(80, &p);
            let main: Vec<u8> = (1..=p.main_count() as u8).map(|n| n * 3).collect();
            let secondary: Vec<u8> = (1..=p.secondary_count() as u8).collect();
            let grid = CandidateGrid::new(main, secondary, &p).unwrap();

            let report = evaluate_grid(&grid, &seq, &p).unwrap();
            assert_eq!(report.total_count(), 80);
            let breakdown: u32 = report.breakdown.iter().map(|b| b.count).sum();
            assert_eq!(breakdown, 80);
            assert_eq!(report.tiers.len(), p.tier_labels().len());
        }
    }

    #[test]
    fn test_empty_sequence() {
        let p = GameProfile::loto();
        let grid = CandidateGrid::new(vec![1, 2, 3, 4, 5, 6], vec![7], &p).unwrap();
        let report = evaluate_grid(&grid, &DrawSequence::default(), &p).unwrap();
        assert_eq!(report.total_count(), 0);
        assert_eq!(report.tiers.len(), 5);
        assert!(report.breakdown.is_empty());
    }

    #[test]
    fn test_grid_invalid_for_profile() {
        let em = GameProfile::euromillions();
        let grid = CandidateGrid::new(vec![1, 2, 3, 4, 50], vec![1, 2], &em).unwrap();
        let seq = make_test_sequence(5, &GameProfile::loto());

        let err = evaluate_grid(&grid, &seq, &GameProfile::loto()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidGrid(_)));
    }

    #[test]
    fn test_sequence_for_other_profile() {
        let loto = GameProfile::loto();
        let grid = CandidateGrid::new(vec![1, 2, 3, 4, 5, 6], vec![7], &loto).unwrap();
        let seq = single_draw(vec![1, 2, 3, 4, 50], vec![1, 2]);

        let err = evaluate_grid(&grid, &seq, &loto).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn test_loto_shared_label() {
        let p = GameProfile::loto();
        let grid = CandidateGrid::new(vec![1, 2, 3, 4, 5, 6], vec![7], &p).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let seq = DrawSequence::new(
            vec![
                Draw::new("a".to_string(), date, vec![1, 2, 3, 4, 5, 6], vec![7]),
                Draw::new("b".to_string(), date, vec![1, 2, 3, 4, 5, 6], vec![9]),
            ],
            &p,
        )
        .unwrap();

        let report = evaluate_grid(&grid, &seq, &p).unwrap();
        let first = report.get("Rang 1").unwrap();
        assert_eq!(first.count, 2);
        assert_eq!(first.one_in, Some(1.0));
        assert_eq!(report.breakdown.len(), 2);
    }
}
