use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::Path;

use tirages_core::models::validate_draw;
use tirages_core::{Draw, DrawSequence, GameProfile};

/// Accepte `JJ/MM/AAAA` (export FDJ) ou `AAAA-MM-JJ`.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .with_context(|| format!("Format de date invalide: '{}'", raw))
}

/// Colonnes : identifiant, date, numéros principaux, puis numéros secondaires.
fn parse_record(record: &csv::StringRecord, profile: &GameProfile) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let id = get(0)?;
    if id.is_empty() {
        bail!("Identifiant de tirage vide");
    }
    let date = parse_date(&get(1)?)?;

    let main_end = 2 + profile.main_count();
    let main_numbers = (2..main_end).map(&get_u8).collect::<Result<Vec<u8>>>()?;
    let secondary_numbers = (main_end..main_end + profile.secondary_count())
        .map(&get_u8)
        .collect::<Result<Vec<u8>>>()?;

    validate_draw(profile, &main_numbers, &secondary_numbers)
        .with_context(|| format!("Tirage {} invalide", id))?;

    Ok(Draw::new(id, date, main_numbers, secondary_numbers))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_records: u32,
    pub loaded: u32,
    pub duplicates: u32,
    pub errors: u32,
}

/// Charge un instantané CSV (séparateur `;`, ligne d'en-tête). Les lignes illisibles ou
/// invalides sont ignorées et comptées ; seul l'échec d'ouverture est fatal.
pub fn load_csv(path: &Path, profile: &GameProfile) -> Result<(DrawSequence, LoadReport)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let mut report = LoadReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut draws = Vec::new();

    for record_result in reader.records() {
        report.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record, profile) {
                Ok(draw) => {
                    if seen.insert(draw.id.clone()) {
                        draws.push(draw);
                        report.loaded += 1;
                    } else {
                        log::warn!("Tirage {} en double, ignoré", draw.id);
                        report.duplicates += 1;
                    }
                }
                Err(e) => {
                    log::warn!("Erreur parsing ligne {}: {:#}", report.total_records, e);
                    report.errors += 1;
                }
            },
            Err(e) => {
                log::warn!("Erreur lecture ligne {}: {}", report.total_records, e);
                report.errors += 1;
            }
        }
    }

    let sequence = DrawSequence::new(draws, profile)?;
    log::info!(
        "{} : {} tirages chargés depuis {:?}",
        profile.name(),
        sequence.len(),
        path
    );
    Ok((sequence, report))
}
