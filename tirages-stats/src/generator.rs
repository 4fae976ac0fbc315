use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use tirages_core::{CandidateGrid, DrawSequence, EngineError, GameProfile, Pool, Result};

use crate::config::GeneratorConfig;
use crate::frequency::{coldest, compute_frequencies, hottest, Frequencies, FrequencyEntry};
use crate::gaps::{compute_gaps, most_overdue, Gaps};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Tirage uniforme sans remise
    Uniform,
    /// Parmi les numéros les plus fréquents
    Hot,
    /// Parmi les numéros les moins fréquents
    Cold,
    /// Somme des numéros proche de la moyenne historique
    SumTarget,
    /// Écarts réguliers entre numéros successifs
    GapSpaced,
    /// Minimum par quadrant pair/impair x bas/haut
    Balanced,
    /// Parmi les numéros en plus long retard
    Overdue,
}

impl Strategy {
    pub const ALL: [Strategy; 7] = [
        Strategy::Uniform,
        Strategy::Hot,
        Strategy::Cold,
        Strategy::SumTarget,
        Strategy::GapSpaced,
        Strategy::Balanced,
        Strategy::Overdue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Uniform => "uniforme",
            Strategy::Hot => "chauds",
            Strategy::Cold => "froids",
            Strategy::SumTarget => "somme-cible",
            Strategy::GapSpaced => "écarts",
            Strategy::Balanced => "équilibrée",
            Strategy::Overdue => "retards",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Résultats d'analyse consommés par les stratégies qui en dépendent.
#[derive(Debug, Clone, Default)]
pub struct Signals {
    pub frequencies: Option<Frequencies>,
    pub gaps: Option<Gaps>,
    pub average_main_sum: Option<f64>,
}

impl Signals {
    pub fn from_sequence(sequence: &DrawSequence, profile: &GameProfile) -> Result<Self> {
        Ok(Self {
            frequencies: Some(compute_frequencies(sequence, profile)?),
            gaps: Some(compute_gaps(sequence, profile)?),
            average_main_sum: sequence.average_main_sum(),
        })
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

pub fn generate_grid(
    profile: &GameProfile,
    strategy: Strategy,
    signals: Option<&Signals>,
    seed: Option<u64>,
    config: &GeneratorConfig,
) -> Result<CandidateGrid> {
    let mut rng = make_rng(seed);
    build_grid(profile, strategy, signals, config, &mut rng)
}

/// Génère `count` grilles distinctes : `count * oversample` candidates, puis sélection
/// gloutonne de grilles différant d'au moins `min_main_diff` numéros principaux.
pub fn generate_grids(
    profile: &GameProfile,
    strategy: Strategy,
    signals: Option<&Signals>,
    count: usize,
    seed: Option<u64>,
    config: &GeneratorConfig,
) -> Result<Vec<CandidateGrid>> {
    let mut rng = make_rng(seed);
    let n_candidates = count * config.oversample.max(1);
    let mut candidates = Vec::with_capacity(n_candidates);
    for _ in 0..n_candidates {
        candidates.push(build_grid(profile, strategy, signals, config, &mut rng)?);
    }

    let grids = select_diverse(&candidates, count, config.min_main_diff);
    log::debug!(
        "{} grille(s) {} retenue(s) sur {} candidates",
        grids.len(),
        strategy,
        n_candidates
    );
    Ok(grids)
}

fn select_diverse(candidates: &[CandidateGrid], count: usize, min_main_diff: usize) -> Vec<CandidateGrid> {
    let mut selected: Vec<CandidateGrid> = Vec::with_capacity(count);

    for candidate in candidates {
        if selected.len() >= count {
            break;
        }
        let too_close = selected
            .iter()
            .any(|s| candidate.main_distance(s) < min_main_diff);
        if !too_close {
            selected.push(candidate.clone());
        }
    }

    // Pas assez de candidates diversifiées : compléter avec les grilles distinctes restantes
    if selected.len() < count {
        for candidate in candidates {
            if selected.len() >= count {
                break;
            }
            if !selected.contains(candidate) {
                selected.push(candidate.clone());
            }
        }
    }

    selected
}

fn build_grid(
    profile: &GameProfile,
    strategy: Strategy,
    signals: Option<&Signals>,
    config: &GeneratorConfig,
    rng: &mut StdRng,
) -> Result<CandidateGrid> {
    let (main, secondary) = match strategy {
        Strategy::Uniform => (
            uniform(profile, Pool::Main, rng),
            uniform(profile, Pool::Secondary, rng),
        ),
        Strategy::Hot | Strategy::Cold => {
            let freqs = signals
                .and_then(|s| s.frequencies.as_ref())
                .ok_or_else(|| missing(strategy, "fréquences"))?;
            let pick: fn(&[FrequencyEntry], usize) -> Vec<u8> =
                if strategy == Strategy::Hot { hottest } else { coldest };
            let main_k = clamp_k(profile, Pool::Main, config.hot_cold_main_k, strategy)?;
            let sec_k = clamp_k(profile, Pool::Secondary, config.hot_cold_secondary_k, strategy)?;
            (
                sample_from(&pick(&freqs.main, main_k), profile.main_count(), rng),
                sample_from(&pick(&freqs.secondary, sec_k), profile.secondary_count(), rng),
            )
        }
        Strategy::Overdue => {
            let gaps = signals
                .and_then(|s| s.gaps.as_ref())
                .ok_or_else(|| missing(strategy, "écarts"))?;
            let main_k = clamp_k(profile, Pool::Main, config.overdue_main_k, strategy)?;
            let sec_k = clamp_k(profile, Pool::Secondary, config.overdue_secondary_k, strategy)?;
            (
                sample_from(&most_overdue(&gaps.main, main_k), profile.main_count(), rng),
                sample_from(&most_overdue(&gaps.secondary, sec_k), profile.secondary_count(), rng),
            )
        }
        Strategy::SumTarget => {
            let target = signals
                .and_then(|s| s.average_main_sum)
                .unwrap_or_else(|| theoretical_mean_sum(profile));
            (
                sum_target(profile, target, config, rng)?,
                uniform(profile, Pool::Secondary, rng),
            )
        }
        Strategy::GapSpaced => {
            if config.good_gap_min > config.good_gap_max {
                return Err(EngineError::Configuration(format!(
                    "bande d'écart vide : {} > {}",
                    config.good_gap_min, config.good_gap_max
                )));
            }
            (
                spaced_numbers(
                    profile.main_range(),
                    profile.main_count(),
                    config.good_gap_min,
                    config.good_gap_max,
                    rng,
                ),
                uniform(profile, Pool::Secondary, rng),
            )
        }
        Strategy::Balanced => (
            balanced(profile, config.balanced_min_per_quadrant, rng)?,
            uniform(profile, Pool::Secondary, rng),
        ),
    };

    CandidateGrid::new(main, secondary, profile)
}

fn missing(strategy: Strategy, what: &'static str) -> EngineError {
    EngineError::MissingSignals {
        strategy: strategy.name().to_string(),
        missing: what,
    }
}

/// Taille du vivier : bornée par la plage et strictement supérieure au nombre à tirer,
/// sauf quand la plage entière n'offre pas davantage.
fn clamp_k(profile: &GameProfile, pool: Pool, k: usize, strategy: Strategy) -> Result<usize> {
    let range = profile.range(pool) as usize;
    let count = profile.count(pool);
    let k = k.min(range);
    if k < count || (k == count && range > count) {
        return Err(EngineError::Configuration(format!(
            "stratégie {} : vivier de {} {} pour {} à tirer",
            strategy,
            k,
            pool,
            profile.count(pool)
        )));
    }
    Ok(k)
}

/// `count` éléments distincts de `pool`, uniformément. Suppose `count <= pool.len()`.
fn sample_from(pool: &[u8], count: usize, rng: &mut StdRng) -> Vec<u8> {
    index::sample(rng, pool.len(), count)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

fn uniform(profile: &GameProfile, pool: Pool, rng: &mut StdRng) -> Vec<u8> {
    let all: Vec<u8> = (1..=profile.range(pool)).collect();
    sample_from(&all, profile.count(pool), rng)
}

fn theoretical_mean_sum(profile: &GameProfile) -> f64 {
    profile.main_count() as f64 * (profile.main_range() as f64 + 1.0) / 2.0
}

fn sum_target(
    profile: &GameProfile,
    target: f64,
    config: &GeneratorConfig,
    rng: &mut StdRng,
) -> Result<Vec<u8>> {
    let exhausted = || {
        log::warn!(
            "somme-cible : aucune grille à ±{:?} de {:.1} en {} tentative(s)",
            config.sum_tolerance,
            target,
            config.sum_attempts
        );
        EngineError::ConstraintExhaustion {
            strategy: Strategy::SumTarget.name().to_string(),
            attempts: config.sum_attempts,
        }
    };

    let mut best: Option<(f64, Vec<u8>)> = None;
    for _ in 0..config.sum_attempts {
        let main = uniform(profile, Pool::Main, rng);
        let sum: u32 = main.iter().map(|&n| n as u32).sum();
        let diff = (sum as f64 - target).abs();
        if best.as_ref().map_or(true, |(d, _)| diff < *d) {
            best = Some((diff, main));
        }
    }

    match best {
        Some((diff, main)) if config.sum_tolerance.map_or(true, |t| diff <= t as f64) => Ok(main),
        _ => Err(exhausted()),
    }
}

/// Construction gloutonne dans l'ordre de tirage : chaque numéro est pris de préférence
/// à une distance [min_gap, max_gap] du précédent, sinon au hasard parmi les restants.
fn spaced_numbers(range: u8, count: usize, min_gap: u8, max_gap: u8, rng: &mut StdRng) -> Vec<u8> {
    let mut remaining: Vec<u8> = (1..=range).collect();
    let mut chosen = Vec::with_capacity(count);
    if count == 0 || remaining.is_empty() {
        return chosen;
    }

    let first = rng.random_range(0..remaining.len());
    let mut last = remaining.remove(first);
    chosen.push(last);

    while chosen.len() < count && !remaining.is_empty() {
        let band: Vec<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, n)| (min_gap..=max_gap).contains(&n.abs_diff(last)))
            .map(|(i, _)| i)
            .collect();
        let idx = if band.is_empty() {
            rng.random_range(0..remaining.len())
        } else {
            band[rng.random_range(0..band.len())]
        };
        last = remaining.remove(idx);
        chosen.push(last);
    }

    chosen
}

/// Les quatre quadrants pair/impair x bas/haut de la plage principale.
pub fn quadrants(profile: &GameProfile) -> [Vec<u8>; 4] {
    let threshold = profile.high_threshold();
    let mut quads: [Vec<u8>; 4] = Default::default();
    for n in 1..=profile.main_range() {
        let idx = (n % 2) as usize * 2 + usize::from(n > threshold);
        quads[idx].push(n);
    }
    quads
}

fn balanced(profile: &GameProfile, min_per_quadrant: usize, rng: &mut StdRng) -> Result<Vec<u8>> {
    let quads = quadrants(profile);
    let feasible = min_per_quadrant * quads.len() <= profile.main_count()
        && quads.iter().all(|q| q.len() >= min_per_quadrant);
    if !feasible {
        log::warn!(
            "équilibrée : {} par quadrant impossible pour {} numéros",
            min_per_quadrant,
            profile.main_count()
        );
        return Err(EngineError::ConstraintExhaustion {
            strategy: Strategy::Balanced.name().to_string(),
            attempts: 0,
        });
    }

    let mut main = Vec::with_capacity(profile.main_count());
    for quad in &quads {
        main.extend(sample_from(quad, min_per_quadrant, rng));
    }
    let rest: Vec<u8> = (1..=profile.main_range())
        .filter(|n| !main.contains(n))
        .collect();
    main.extend(sample_from(&rest, profile.main_count() - main.len(), rng));
    Ok(main)
}
