use serde::Serialize;

use tirages_core::{Draw, DrawSequence, GameProfile, Pool, Result};

/// Écart relatif à l'espérance uniforme au-delà duquel un numéro est chaud ou froid.
const TAG_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrequencyTag {
    Hot,
    Cold,
    Normal,
}

impl std::fmt::Display for FrequencyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrequencyTag::Hot => write!(f, "CHAUD"),
            FrequencyTag::Cold => write!(f, "FROID"),
            FrequencyTag::Normal => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyEntry {
    pub number: u8,
    pub count: u32,
    /// Part des tirages contenant ce numéro, en pourcentage.
    pub percentage: f64,
    pub tag: FrequencyTag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frequencies {
    pub total_draws: usize,
    pub main: Vec<FrequencyEntry>,
    pub secondary: Vec<FrequencyEntry>,
}

pub fn compute_frequencies(sequence: &DrawSequence, profile: &GameProfile) -> Result<Frequencies> {
    sequence.check_profile(profile)?;
    log::debug!("fréquences : {} tirages ({})", sequence.len(), profile.name());
    Ok(Frequencies {
        total_draws: sequence.len(),
        main: pool_frequencies(sequence, profile, Pool::Main),
        secondary: pool_frequencies(sequence, profile, Pool::Secondary),
    })
}

/// Sorties de chaque numéro `1..=size` du pool sur une tranche de tirages.
pub(crate) fn count_numbers(draws: &[Draw], pool: Pool, size: u8) -> Vec<u32> {
    let mut counts = vec![0u32; size as usize];
    for draw in draws {
        for &n in pool.numbers_from(draw) {
            if let Some(c) = counts.get_mut((n as usize).wrapping_sub(1)) {
                *c += 1;
            }
        }
    }
    counts
}

/// Une entrée par numéro de la plage, y compris ceux jamais sortis.
fn pool_frequencies(sequence: &DrawSequence, profile: &GameProfile, pool: Pool) -> Vec<FrequencyEntry> {
    let size = profile.range(pool);
    let counts = count_numbers(sequence.draws(), pool, size);

    let total = sequence.len();
    let mut entries: Vec<FrequencyEntry> = (1..=size)
        .map(|n| {
            let count = counts[(n - 1) as usize];
            let percentage = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            FrequencyEntry {
                number: n,
                count,
                percentage,
                tag: FrequencyTag::Normal,
            }
        })
        .collect();

    tag_frequencies(&mut entries, total, profile.count(pool), size);
    entries
}

pub fn tag_frequencies(entries: &mut [FrequencyEntry], total_draws: usize, pick_count: usize, pool_size: u8) {
    if total_draws == 0 || pool_size == 0 {
        return;
    }
    let expected = total_draws as f64 * pick_count as f64 / pool_size as f64;

    for e in entries.iter_mut() {
        let deviation = (e.count as f64 - expected) / expected;
        e.tag = if deviation > TAG_THRESHOLD {
            FrequencyTag::Hot
        } else if deviation < -TAG_THRESHOLD {
            FrequencyTag::Cold
        } else {
            FrequencyTag::Normal
        };
    }
}

/// Les `k` numéros les plus fréquents (départage par numéro croissant).
pub fn hottest(entries: &[FrequencyEntry], k: usize) -> Vec<u8> {
    let mut sorted: Vec<&FrequencyEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));
    sorted.into_iter().take(k).map(|e| e.number).collect()
}

/// Les `k` numéros les moins fréquents (départage par numéro croissant).
pub fn coldest(entries: &[FrequencyEntry], k: usize) -> Vec<u8> {
    let mut sorted: Vec<&FrequencyEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.count.cmp(&b.count).then(a.number.cmp(&b.number)));
    sorted.into_iter().take(k).map(|e| e.number).collect()
}
