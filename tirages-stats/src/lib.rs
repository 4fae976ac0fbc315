pub mod config;
pub mod correlation;
pub mod evaluation;
pub mod frequency;
pub mod gaps;
pub mod generator;
pub mod patterns;
pub mod trends;

use serde::Serialize;

use tirages_core::{DrawSequence, GameProfile, Result};

pub use config::{
    load_config, save_config, CorrelationConfig, EngineConfig, GeneratorConfig, PatternConfig, TrendConfig,
};
pub use correlation::{compute_correlations, CorrelationPair, Correlations};
pub use evaluation::{evaluate_grid, TierReport, TierStat, NO_TIER_LABEL};
pub use frequency::{compute_frequencies, Frequencies, FrequencyEntry, FrequencyTag};
pub use gaps::{compute_gaps, GapRecord, Gaps};
pub use generator::{generate_grid, generate_grids, Signals, Strategy};
pub use patterns::{compute_patterns, describe_grid, GridShape, PatternBucket, PatternBuckets};
pub use trends::{compute_trends, yearly_stats, Trend, TrendEntry, Trends, YearStats};

/// Toutes les analyses descriptives d'un même instantané.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub frequencies: Frequencies,
    pub gaps: Gaps,
    pub patterns: PatternBuckets,
    pub correlations: Correlations,
}

/// Lance les quatre passes en parallèle ; le résultat est celui des appels séquentiels.
pub fn analyze(sequence: &DrawSequence, profile: &GameProfile, config: &EngineConfig) -> Result<Analysis> {
    sequence.check_profile(profile)?;
    let ((frequencies, gaps), (patterns, correlations)) = rayon::join(
        || {
            rayon::join(
                || compute_frequencies(sequence, profile),
                || compute_gaps(sequence, profile),
            )
        },
        || {
            rayon::join(
                || compute_patterns(sequence, profile, &config.patterns),
                || compute_correlations(sequence, profile, Some(config.correlation.top_k)),
            )
        },
    );

    Ok(Analysis {
        frequencies: frequencies?,
        gaps: gaps?,
        patterns: patterns?,
        correlations: correlations?,
    })
}

impl Analysis {
    /// Réutilise les passes déjà faites comme signaux du générateur.
    pub fn signals(&self, sequence: &DrawSequence) -> Signals {
        Signals {
            frequencies: Some(self.frequencies.clone()),
            gaps: Some(self.gaps.clone()),
            average_main_sum: sequence.average_main_sum(),
        }
    }
}
