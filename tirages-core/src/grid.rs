use serde::Serialize;

use crate::error::Result;
use crate::models::{validate_draw, Draw, Pool};
use crate::profile::GameProfile;

/// Grille candidate validée : cardinalités, plages et unicité respectées.
/// Les numéros sont conservés triés.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CandidateGrid {
    main_numbers: Vec<u8>,
    secondary_numbers: Vec<u8>,
}

impl CandidateGrid {
    pub fn new(
        mut main_numbers: Vec<u8>,
        mut secondary_numbers: Vec<u8>,
        profile: &GameProfile,
    ) -> Result<Self> {
        validate_draw(profile, &main_numbers, &secondary_numbers)?;
        main_numbers.sort_unstable();
        secondary_numbers.sort_unstable();
        Ok(Self {
            main_numbers,
            secondary_numbers,
        })
    }

    /// Revalide la grille contre un profil, éventuellement différent de celui de construction.
    pub fn validate_against(&self, profile: &GameProfile) -> Result<()> {
        validate_draw(profile, &self.main_numbers, &self.secondary_numbers)?;
        Ok(())
    }

    pub fn main_numbers(&self) -> &[u8] {
        &self.main_numbers
    }

    pub fn secondary_numbers(&self) -> &[u8] {
        &self.secondary_numbers
    }

    pub fn numbers(&self, pool: Pool) -> &[u8] {
        match pool {
            Pool::Main => &self.main_numbers,
            Pool::Secondary => &self.secondary_numbers,
        }
    }

    pub fn main_sum(&self) -> u32 {
        self.main_numbers.iter().map(|&n| n as u32).sum()
    }

    /// Nombre de bons numéros principaux et secondaires face à un tirage.
    pub fn matches(&self, draw: &Draw) -> (usize, usize) {
        let main = self
            .main_numbers
            .iter()
            .filter(|n| draw.main_numbers.contains(n))
            .count();
        let secondary = self
            .secondary_numbers
            .iter()
            .filter(|n| draw.secondary_numbers.contains(n))
            .count();
        (main, secondary)
    }

    /// Nombre de numéros principaux de `self` absents de `other`.
    pub fn main_distance(&self, other: &CandidateGrid) -> usize {
        self.main_numbers
            .iter()
            .filter(|n| !other.main_numbers.contains(n))
            .count()
    }
}

impl std::fmt::Display for CandidateGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let join = |numbers: &[u8]| {
            numbers
                .iter()
                .map(|n| format!("{:2}", n))
                .collect::<Vec<_>>()
                .join(" - ")
        };
        if self.secondary_numbers.is_empty() {
            write!(f, "{}", join(&self.main_numbers))
        } else {
            write!(f, "{} | {}", join(&self.main_numbers), join(&self.secondary_numbers))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EngineError, NumberSetError};
    use chrono::NaiveDate;

    #[test]
    fn test_grid_sorted_on_construction() {
        let p = GameProfile::euromillions();
        let grid = CandidateGrid::new(vec![42, 7, 19, 3, 28], vec![11, 2], &p).unwrap();
        assert_eq!(grid.main_numbers(), &[3, 7, 19, 28, 42]);
        assert_eq!(grid.secondary_numbers(), &[2, 11]);
        assert_eq!(grid.main_sum(), 99);
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let p = GameProfile::euromillions();
        assert!(matches!(
            CandidateGrid::new(vec![1, 2, 3, 4], vec![1, 2], &p),
            Err(EngineError::InvalidGrid(NumberSetError::WrongCount { .. }))
        ));
        assert!(matches!(
            CandidateGrid::new(vec![1, 2, 3, 4, 5], vec![1, 13], &p),
            Err(EngineError::InvalidGrid(NumberSetError::OutOfRange { .. }))
        ));
        assert!(matches!(
            CandidateGrid::new(vec![1, 2, 3, 4, 4], vec![1, 2], &p),
            Err(EngineError::InvalidGrid(NumberSetError::Duplicate { .. }))
        ));
    }

    #[test]
    fn test_validate_against_other_profile() {
        let em = GameProfile::euromillions();
        let grid = CandidateGrid::new(vec![1, 2, 3, 4, 50], vec![1, 2], &em).unwrap();
        assert!(grid.validate_against(&em).is_ok());
        assert!(grid.validate_against(&GameProfile::loto()).is_err());
    }

    #[test]
    fn test_matches() {
        let p = GameProfile::euromillions();
        let grid = CandidateGrid::new(vec![1, 2, 3, 4, 5], vec![1, 2], &p).unwrap();
        let draw = Draw::new(
            "001",
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            vec![1, 2, 3, 9, 10],
            vec![1, 5],
        );
        assert_eq!(grid.matches(&draw), (3, 1));
    }

    #[test]
    fn test_display() {
        let p = GameProfile::euromillions();
        let grid = CandidateGrid::new(vec![1, 2, 3, 4, 50], vec![7, 1], &p).unwrap();
        assert_eq!(grid.to_string(), " 1 -  2 -  3 -  4 - 50 |  1 -  7");
    }

    #[test]
    fn test_main_distance() {
        let p = GameProfile::euromillions();
        let a = CandidateGrid::new(vec![1, 2, 3, 4, 5], vec![1, 2], &p).unwrap();
        let b = CandidateGrid::new(vec![1, 2, 3, 40, 50], vec![1, 2], &p).unwrap();
        assert_eq!(a.main_distance(&b), 2);
        assert_eq!(a.main_distance(&a), 0);
    }
}
