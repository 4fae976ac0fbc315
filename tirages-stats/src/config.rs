use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Largeur fixe des tranches de somme, indépendante des données.
    pub sum_bucket_width: u32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self { sum_bucket_width: 25 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    pub top_k: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self { top_k: 15 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Nombre de tirages les plus récents comparés au reste de l'historique.
    pub recent_window: usize,
    pub hot_ratio: f64,
    pub cold_ratio: f64,
    pub yearly_top_main: usize,
    pub yearly_top_secondary: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            recent_window: 50,
            hot_ratio: 1.5,
            cold_ratio: 0.5,
            yearly_top_main: 5,
            yearly_top_secondary: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub hot_cold_main_k: usize,
    pub hot_cold_secondary_k: usize,
    pub overdue_main_k: usize,
    pub overdue_secondary_k: usize,
    pub sum_attempts: u32,
    /// Écart maximal accepté entre la somme retenue et la cible ; `None` accepte la meilleure.
    pub sum_tolerance: Option<u32>,
    pub good_gap_min: u8,
    pub good_gap_max: u8,
    pub balanced_min_per_quadrant: usize,
    pub oversample: usize,
    pub min_main_diff: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            hot_cold_main_k: 20,
            hot_cold_secondary_k: 5,
            overdue_main_k: 15,
            overdue_secondary_k: 4,
            sum_attempts: 100,
            sum_tolerance: None,
            good_gap_min: 3,
            good_gap_max: 8,
            balanced_min_per_quadrant: 1,
            oversample: 20,
            min_main_diff: 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub patterns: PatternConfig,
    pub correlation: CorrelationConfig,
    pub trends: TrendConfig,
    pub generator: GeneratorConfig,
}

pub fn save_config(config: &EngineConfig, path: &std::path::Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_config(path: &std::path::Path) -> anyhow::Result<EngineConfig> {
    let json = std::fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&json)?;
    Ok(config)
}
