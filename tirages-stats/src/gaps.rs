use serde::Serialize;

use tirages_core::{Draw, DrawSequence, GameProfile, Pool, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapRecord {
    pub number: u8,
    pub appearances: u32,
    /// Nombre de tirages strictement entre deux sorties consécutives, dans l'ordre.
    pub gaps: Vec<u32>,
    pub average_gap: Option<f64>,
    pub min_gap: Option<u32>,
    pub max_gap: Option<u32>,
    /// Tirages écoulés depuis la dernière sortie (0 = sorti au dernier tirage).
    pub current_gap: u32,
    /// `current_gap / average_gap` quand une moyenne existe.
    pub overdue_factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gaps {
    pub total_draws: usize,
    pub main: Vec<GapRecord>,
    pub secondary: Vec<GapRecord>,
}

pub fn compute_gaps(sequence: &DrawSequence, profile: &GameProfile) -> Result<Gaps> {
    sequence.check_profile(profile)?;
    log::debug!("écarts : {} tirages ({})", sequence.len(), profile.name());
    Ok(Gaps {
        total_draws: sequence.len(),
        main: pool_gaps(sequence, profile, Pool::Main),
        secondary: pool_gaps(sequence, profile, Pool::Secondary),
    })
}

fn pool_gaps(sequence: &DrawSequence, profile: &GameProfile, pool: Pool) -> Vec<GapRecord> {
    let size = profile.range(pool) as usize;
    let mut last_seen: Vec<Option<usize>> = vec![None; size];
    let mut gap_lists: Vec<Vec<u32>> = vec![Vec::new(); size];
    let mut appearances = vec![0u32; size];

    for (t, draw) in sequence.iter().enumerate() {
        for &n in pool.numbers_from(draw) {
            let idx = (n - 1) as usize;
            if idx >= size {
                continue;
            }
            if let Some(prev) = last_seen[idx] {
                gap_lists[idx].push((t - prev - 1) as u32);
            }
            last_seen[idx] = Some(t);
            appearances[idx] += 1;
        }
    }

    let total = sequence.len();
    gap_lists
        .into_iter()
        .enumerate()
        .map(|(idx, gaps)| {
            // L'écart encore ouvert n'entre pas dans la moyenne/min/max.
            let current_gap = match last_seen[idx] {
                Some(last) => (total - 1 - last) as u32,
                None => total as u32,
            };
            let average_gap = if gaps.is_empty() {
                None
            } else {
                Some(gaps.iter().map(|&g| g as f64).sum::<f64>() / gaps.len() as f64)
            };
            let overdue_factor = average_gap
                .filter(|&avg| avg > 0.0)
                .map(|avg| current_gap as f64 / avg);

            GapRecord {
                number: (idx + 1) as u8,
                appearances: appearances[idx],
                min_gap: gaps.iter().copied().min(),
                max_gap: gaps.iter().copied().max(),
                average_gap,
                current_gap,
                overdue_factor,
                gaps,
            }
        })
        .collect()
}

/// Classement des retards : écart courant décroissant, puis écart moyen décroissant,
/// puis numéro croissant.
pub fn overdue_ranking(records: &[GapRecord]) -> Vec<&GapRecord> {
    let mut ranked: Vec<&GapRecord> = records.iter().collect();
    ranked.sort_by(|a, b| {
        b.current_gap
            .cmp(&a.current_gap)
            .then_with(|| {
                b.average_gap
                    .partial_cmp(&a.average_gap)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then(a.number.cmp(&b.number))
    });
    ranked
}

pub fn most_overdue(records: &[GapRecord], k: usize) -> Vec<u8> {
    overdue_ranking(records)
        .into_iter()
        .take(k)
        .map(|r| r.number)
        .collect()
}

/// Tirages contenant `number` dans le pool donné, du plus ancien au plus récent.
pub fn number_history<'a>(sequence: &'a DrawSequence, pool: Pool, number: u8) -> Vec<&'a Draw> {
    sequence
        .iter()
        .filter(|d| pool.numbers_from(d).contains(&number))
        .collect()
}
