use thiserror::Error;

use crate::models::Pool;

/// Violation des invariants d'un ensemble de numéros (tirage ou grille).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberSetError {
    #[error("{pool} : {got} numéros fournis, {expected} attendus")]
    WrongCount {
        pool: Pool,
        expected: usize,
        got: usize,
    },

    #[error("{pool} : numéro {number} hors limites (1-{max})")]
    OutOfRange { pool: Pool, number: u8, max: u8 },

    #[error("{pool} : numéro en double {number}")]
    Duplicate { pool: Pool, number: u8 },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("grille invalide : {0}")]
    InvalidGrid(#[from] NumberSetError),

    #[error("tirage {id} invalide : {source}")]
    InvalidDraw {
        id: String,
        #[source]
        source: NumberSetError,
    },

    #[error("stratégie {strategy} : contraintes non satisfaites après {attempts} tentative(s)")]
    ConstraintExhaustion { strategy: String, attempts: u32 },

    #[error("configuration invalide : {0}")]
    Configuration(String),

    #[error("stratégie {strategy} : signal manquant ({missing})")]
    MissingSignals {
        strategy: String,
        missing: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
