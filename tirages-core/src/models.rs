use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, NumberSetError, Result};
use crate::profile::GameProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub id: String,
    pub date: NaiveDate,
    pub main_numbers: Vec<u8>,
    pub secondary_numbers: Vec<u8>,
}

impl Draw {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        main_numbers: Vec<u8>,
        secondary_numbers: Vec<u8>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            main_numbers,
            secondary_numbers,
        }
    }

    pub fn main_sum(&self) -> u32 {
        self.main_numbers.iter().map(|&n| n as u32).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pool {
    Main,
    Secondary,
}

impl Pool {
    pub fn numbers_from<'a>(&self, draw: &'a Draw) -> &'a [u8] {
        match self {
            Pool::Main => &draw.main_numbers,
            Pool::Secondary => &draw.secondary_numbers,
        }
    }
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pool::Main => write!(f, "numéros"),
            Pool::Secondary => write!(f, "secondaires"),
        }
    }
}

/// Vérifie cardinalité, plage [1, max] et unicité d'un ensemble de numéros.
pub fn validate_numbers(
    pool: Pool,
    numbers: &[u8],
    expected: usize,
    max: u8,
) -> std::result::Result<(), NumberSetError> {
    if numbers.len() != expected {
        return Err(NumberSetError::WrongCount {
            pool,
            expected,
            got: numbers.len(),
        });
    }
    let mut seen = [false; 256];
    for &n in numbers {
        if n < 1 || n > max {
            return Err(NumberSetError::OutOfRange { pool, number: n, max });
        }
        if seen[n as usize] {
            return Err(NumberSetError::Duplicate { pool, number: n });
        }
        seen[n as usize] = true;
    }
    Ok(())
}

pub fn validate_draw(
    profile: &GameProfile,
    main_numbers: &[u8],
    secondary_numbers: &[u8],
) -> std::result::Result<(), NumberSetError> {
    validate_numbers(Pool::Main, main_numbers, profile.main_count(), profile.main_range())?;
    validate_numbers(
        Pool::Secondary,
        secondary_numbers,
        profile.secondary_count(),
        profile.secondary_range(),
    )
}

/// Restriction d'un instantané par année et/ou mois.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl DrawFilter {
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.year.map_or(true, |y| date.year() == y) && self.month.map_or(true, |m| date.month() == m)
    }
}

/// Cardinalités et plages des deux pools d'un profil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolLayout {
    pub main_count: usize,
    pub main_range: u8,
    pub secondary_count: usize,
    pub secondary_range: u8,
}

impl PoolLayout {
    pub fn of(profile: &GameProfile) -> Self {
        Self {
            main_count: profile.main_count(),
            main_range: profile.main_range(),
            secondary_count: profile.secondary_count(),
            secondary_range: profile.secondary_range(),
        }
    }
}

impl std::fmt::Display for PoolLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} + {}/{}",
            self.main_count, self.main_range, self.secondary_count, self.secondary_range
        )
    }
}

/// Suite chronologique (le plus ancien d'abord) de tirages validés.
///
/// La suite retient la disposition du profil qui l'a validée ; une suite vide
/// construite par `Default` n'en a pas et s'accorde avec tout profil.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrawSequence {
    draws: Vec<Draw>,
    #[serde(skip)]
    layout: Option<PoolLayout>,
}

impl DrawSequence {
    /// Valide chaque tirage contre le profil puis trie par date (identifiant en départage).
    pub fn new(mut draws: Vec<Draw>, profile: &GameProfile) -> Result<Self> {
        for draw in &draws {
            validate_draw(profile, &draw.main_numbers, &draw.secondary_numbers).map_err(
                |source| EngineError::InvalidDraw {
                    id: draw.id.clone(),
                    source,
                },
            )?;
        }
        draws.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(Self {
            draws,
            layout: Some(PoolLayout::of(profile)),
        })
    }

    pub fn layout(&self) -> Option<PoolLayout> {
        self.layout
    }

    /// Refuse un profil dont les pools diffèrent de ceux qui ont validé la suite.
    pub fn check_profile(&self, profile: &GameProfile) -> Result<()> {
        match self.layout {
            Some(layout) if layout != PoolLayout::of(profile) => Err(EngineError::Configuration(format!(
                "tirages validés en {}, profil {} en {}",
                layout,
                profile.name(),
                PoolLayout::of(profile)
            ))),
            _ => Ok(()),
        }
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Draw> {
        self.draws.iter()
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn latest(&self) -> Option<&Draw> {
        self.draws.last()
    }

    pub fn filter(&self, filter: &DrawFilter) -> DrawSequence {
        DrawSequence {
            draws: self
                .draws
                .iter()
                .filter(|d| filter.matches(d.date))
                .cloned()
                .collect(),
            layout: self.layout,
        }
    }

    /// Somme moyenne des numéros principaux, absente sur une suite vide.
    pub fn average_main_sum(&self) -> Option<f64> {
        if self.draws.is_empty() {
            return None;
        }
        let total: u64 = self.draws.iter().map(|d| d.main_sum() as u64).sum();
        Some(total as f64 / self.draws.len() as f64)
    }

    /// Années présentes dans l'instantané, croissantes.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.draws.iter().map(|d| d.date.year()).collect();
        years.dedup();
        years
    }
}

impl<'a> IntoIterator for &'a DrawSequence {
    type Item = &'a Draw;
    type IntoIter = std::slice::Iter<'a, Draw>;

    fn into_iter(self) -> Self::IntoIter {
        self.draws.iter()
    }
}

/// Suite déterministe de `n` tirages valides pour le profil, un tous les 3 jours à
/// partir du 1er janvier 2024.
pub fn make_test_sequence(n: usize, profile: &GameProfile) -> DrawSequence {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let spread = |i: usize, count: usize, range: u8| -> Vec<u8> {
        if count == 0 {
            return Vec::new();
        }
        let range = range as usize;
        let step = range / count;
        (0..count)
            .map(|j| ((i * 3 + j * step) % range + 1) as u8)
            .collect()
    };

    let draws = (0..n)
        .map(|i| Draw {
            id: format!("{:04}", i),
            date: start
                .checked_add_days(chrono::Days::new(3 * i as u64))
                .unwrap_or(start),
            main_numbers: spread(i, profile.main_count(), profile.main_range()),
            secondary_numbers: spread(i, profile.secondary_count(), profile.secondary_range()),
        })
        .collect();

    DrawSequence {
        draws,
        layout: Some(PoolLayout::of(profile)),
    }
}
