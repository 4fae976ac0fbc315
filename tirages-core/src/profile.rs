use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::Pool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    EuroMillions,
    Loto,
}

impl GameType {
    pub fn profile(&self) -> GameProfile {
        match self {
            GameType::EuroMillions => GameProfile::euromillions(),
            GameType::Loto => GameProfile::loto(),
        }
    }
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameType::EuroMillions => write!(f, "EuroMillions"),
            GameType::Loto => write!(f, "Loto"),
        }
    }
}

/// Une combinaison (bons numéros, bons secondaires) rattachée à un rang de gain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRule {
    pub main_matches: usize,
    pub secondary_matches: usize,
    pub label: String,
}

impl TierRule {
    pub fn new(main_matches: usize, secondary_matches: usize, label: impl Into<String>) -> Self {
        Self {
            main_matches,
            secondary_matches,
            label: label.into(),
        }
    }
}

/// Configuration immuable d'une variante de jeu.
///
/// Les champs sont privés : un profil obtenu par [`GameProfile::new`] a déjà une
/// table des rangs exhaustive, l'évaluation ne peut donc pas échouer sur la
/// configuration en cours de calcul.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameProfile {
    name: String,
    main_count: usize,
    main_range: u8,
    secondary_count: usize,
    secondary_range: u8,
    tiers: Vec<TierRule>,
}

impl GameProfile {
    pub fn new(
        name: impl Into<String>,
        main_count: usize,
        main_range: u8,
        secondary_count: usize,
        secondary_range: u8,
        tiers: Vec<TierRule>,
    ) -> Result<Self> {
        let profile = Self {
            name: name.into(),
            main_count,
            main_range,
            secondary_count,
            secondary_range,
            tiers,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// 5 numéros parmi 50, 2 étoiles parmi 12, 13 rangs.
    pub fn euromillions() -> Self {
        let tiers = [
            (5, 2), (5, 1), (5, 0), (4, 2), (4, 1), (3, 2), (4, 0),
            (2, 2), (3, 1), (3, 0), (1, 2), (2, 1), (2, 0),
        ]
        .iter()
        .enumerate()
        .map(|(i, &(m, s))| TierRule::new(m, s, format!("Rang {}", i + 1)))
        .collect();

        Self {
            name: "EuroMillions".to_string(),
            main_count: 5,
            main_range: 50,
            secondary_count: 2,
            secondary_range: 12,
            tiers,
        }
    }

    /// 6 numéros parmi 49 et un numéro complémentaire parmi 45.
    /// Le complémentaire ne départage que le rang 2 ; 6 bons numéros donnent le rang 1
    /// avec ou sans complémentaire.
    pub fn loto() -> Self {
        let tiers = vec![
            TierRule::new(6, 1, "Rang 1"),
            TierRule::new(6, 0, "Rang 1"),
            TierRule::new(5, 1, "Rang 2"),
            TierRule::new(5, 0, "Rang 3"),
            TierRule::new(4, 1, "Rang 4"),
            TierRule::new(4, 0, "Rang 4"),
            TierRule::new(3, 1, "Rang 5"),
            TierRule::new(3, 0, "Rang 5"),
        ];

        Self {
            name: "Loto".to_string(),
            main_count: 6,
            main_range: 49,
            secondary_count: 1,
            secondary_range: 45,
            tiers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self, pool: Pool) -> usize {
        match pool {
            Pool::Main => self.main_count,
            Pool::Secondary => self.secondary_count,
        }
    }

    pub fn range(&self, pool: Pool) -> u8 {
        match pool {
            Pool::Main => self.main_range,
            Pool::Secondary => self.secondary_range,
        }
    }

    pub fn main_count(&self) -> usize {
        self.main_count
    }

    pub fn main_range(&self) -> u8 {
        self.main_range
    }

    pub fn secondary_count(&self) -> usize {
        self.secondary_count
    }

    pub fn secondary_range(&self) -> u8 {
        self.secondary_range
    }

    pub fn tiers(&self) -> &[TierRule] {
        &self.tiers
    }

    /// Libellés distincts des rangs, dans l'ordre de la table.
    pub fn tier_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for rule in &self.tiers {
            if !labels.contains(&rule.label.as_str()) {
                labels.push(&rule.label);
            }
        }
        labels
    }

    pub fn tier_for(&self, main_matches: usize, secondary_matches: usize) -> Option<&str> {
        self.tiers
            .iter()
            .find(|r| r.main_matches == main_matches && r.secondary_matches == secondary_matches)
            .map(|r| r.label.as_str())
    }

    /// Seuil haut/bas : un numéro strictement supérieur est "haut".
    pub fn high_threshold(&self) -> u8 {
        self.main_range.div_ceil(2)
    }

    /// Somme minimale théorique des numéros principaux.
    pub fn min_main_sum(&self) -> u32 {
        let k = self.main_count as u32;
        k * (k + 1) / 2
    }

    /// Somme maximale théorique des numéros principaux.
    pub fn max_main_sum(&self) -> u32 {
        let k = self.main_count as u32;
        let n = self.main_range as u32;
        (n - k + 1..=n).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.main_count == 0 {
            return Err(EngineError::Configuration(format!(
                "{} : au moins un numéro principal requis",
                self.name
            )));
        }
        for pool in [Pool::Main, Pool::Secondary] {
            if self.count(pool) > self.range(pool) as usize {
                return Err(EngineError::Configuration(format!(
                    "{} : {} numéros ({}) pour une plage de {}",
                    self.name,
                    pool,
                    self.count(pool),
                    self.range(pool)
                )));
            }
        }
        validate_tiers(&self.name, self.main_count, self.secondary_count, &self.tiers)
    }
}

/// Vérifie qu'une table des rangs est exhaustive : chaque entrée est atteignable,
/// aucune combinaison n'apparaît deux fois, et l'ensemble des combinaisons
/// gagnantes est clos vers le haut (plus de bons numéros ne fait jamais perdre
/// un rang). Toute combinaison restante tombe dans le seau implicite "sans gain".
fn validate_tiers(
    name: &str,
    main_count: usize,
    secondary_count: usize,
    tiers: &[TierRule],
) -> Result<()> {
    if tiers.is_empty() {
        return Err(EngineError::Configuration(format!("{name} : table des rangs vide")));
    }

    let mut paying = vec![vec![false; secondary_count + 1]; main_count + 1];
    for rule in tiers {
        if rule.label.trim().is_empty() {
            return Err(EngineError::Configuration(format!(
                "{name} : rang sans libellé pour {}+{}",
                rule.main_matches, rule.secondary_matches
            )));
        }
        if rule.main_matches > main_count || rule.secondary_matches > secondary_count {
            return Err(EngineError::Configuration(format!(
                "{name} : combinaison {}+{} inatteignable",
                rule.main_matches, rule.secondary_matches
            )));
        }
        let cell = &mut paying[rule.main_matches][rule.secondary_matches];
        if *cell {
            return Err(EngineError::Configuration(format!(
                "{name} : combinaison {}+{} définie deux fois",
                rule.main_matches, rule.secondary_matches
            )));
        }
        *cell = true;
    }

    for m in 0..=main_count {
        for s in 0..=secondary_count {
            if !paying[m][s] {
                continue;
            }
            let missing = if m < main_count && !paying[m + 1][s] {
                Some((m + 1, s))
            } else if s < secondary_count && !paying[m][s + 1] {
                Some((m, s + 1))
            } else {
                None
            };
            if let Some((mm, ss)) = missing {
                return Err(EngineError::Configuration(format!(
                    "{name} : {m}+{s} est gagnant mais {mm}+{ss} n'a pas de rang"
                )));
            }
        }
    }

    Ok(())
}
