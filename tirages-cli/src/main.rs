mod display;
mod import;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use tirages_core::{CandidateGrid, DrawFilter, DrawSequence, GameProfile, GameType, Pool};
use tirages_stats::gaps::number_history;
use tirages_stats::{
    analyze, compute_correlations, compute_frequencies, compute_gaps, compute_patterns, compute_trends,
    evaluate_grid, generate_grids, load_config, save_config, yearly_stats, EngineConfig, Signals, Strategy,
};

use crate::display::{
    display_correlations, display_frequencies, display_gaps, display_grids, display_load_summary,
    display_partners, display_patterns, display_tier_report, display_trends, display_yearly,
};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Game {
    #[default]
    Euromillions,
    Loto,
}

impl From<Game> for GameType {
    fn from(game: Game) -> Self {
        match game {
            Game::Euromillions => GameType::EuroMillions,
            Game::Loto => GameType::Loto,
        }
    }
}

#[derive(Parser)]
#[command(name = "tirages", about = "Statistiques de tirages EuroMillions et Loto")]
struct Cli {
    /// Fichier CSV des tirages (séparateur ';')
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Jeu
    #[arg(short, long, global = true, default_value = "euromillions")]
    game: Game,

    /// Restreindre à une année
    #[arg(long, global = true)]
    year: Option<i32>,

    /// Restreindre à un mois (1-12)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Configuration JSON du moteur
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sortie JSON au lieu des tableaux
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fréquences d'apparition des numéros
    Stats,

    /// Retards et écarts entre apparitions
    Gaps {
        /// Nombre de numéros à afficher
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Historique des tirages contenant un numéro
    History {
        number: u8,

        /// Chercher parmi les numéros secondaires
        #[arg(long)]
        secondary: bool,
    },

    /// Répartition pairs/impairs, hauts/bas, sommes, consécutifs
    Patterns,

    /// Paires de numéros sorties ensemble
    Correlations {
        /// Nombre de paires à afficher
        #[arg(short, long)]
        top: Option<usize>,

        /// Afficher les partenaires d'un numéro
        #[arg(short, long)]
        number: Option<u8>,
    },

    /// Tendance des derniers tirages face à l'historique
    Trends {
        /// Taille de la fenêtre récente
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Bilan par année
    Years,

    /// Analyse complète (fréquences, retards, motifs, paires)
    Analyze,

    /// Confronter une grille à l'historique
    Evaluate {
        /// Numéros principaux, séparés par des virgules
        #[arg(short, long, value_delimiter = ',', required = true)]
        main: Vec<u8>,

        /// Numéros secondaires, séparés par des virgules
        #[arg(short, long, value_delimiter = ',')]
        secondary: Vec<u8>,
    },

    /// Générer des grilles
    Generate {
        /// Stratégie de génération
        #[arg(short, long, default_value = "uniform")]
        strategy: Strategy,

        /// Nombre de grilles
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Écrire la configuration par défaut
    DefaultConfig {
        /// Fichier de sortie (stdout si absent)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    sensible_env_logger::init!();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Configuration illisible : {:?}", path))?,
        None => EngineConfig::default(),
    };
    let profile = GameType::from(cli.game).profile();

    if let Command::DefaultConfig { output } = &cli.command {
        return cmd_default_config(output.as_deref());
    }

    let sequence = load_sequence(&cli, &profile)?;

    match cli.command {
        Command::Stats => cmd_stats(&sequence, &profile, cli.json),
        Command::Gaps { top } => cmd_gaps(&sequence, &profile, top, cli.json),
        Command::History { number, secondary } => cmd_history(&sequence, number, secondary, cli.json),
        Command::Patterns => cmd_patterns(&sequence, &profile, &config, cli.json),
        Command::Correlations { top, number } => {
            cmd_correlations(&sequence, &profile, &config, top, number, cli.json)
        }
        Command::Trends { window } => cmd_trends(&sequence, &profile, &config, window, cli.json),
        Command::Years => cmd_years(&sequence, &profile, &config, cli.json),
        Command::Analyze => cmd_analyze(&sequence, &profile, &config, cli.json),
        Command::Evaluate { main, secondary } => cmd_evaluate(&sequence, &profile, main, secondary, cli.json),
        Command::Generate {
            strategy,
            count,
            seed,
        } => cmd_generate(&sequence, &profile, &config, strategy, count, seed, cli.json),
        Command::DefaultConfig { .. } => Ok(()),
    }
}

fn load_sequence(cli: &Cli, profile: &GameProfile) -> Result<DrawSequence> {
    let Some(file) = &cli.file else {
        bail!("Aucun fichier de tirages. Utilisez --file <tirages.csv>");
    };
    let (sequence, report) = import::load_csv(file, profile)?;
    if !cli.json {
        display_load_summary(&report);
    }

    let filter = DrawFilter {
        year: cli.year,
        month: cli.month,
    };
    let filtered = sequence.filter(&filter);
    if filtered.len() < sequence.len() {
        log::info!("Filtre {:?} : {} tirages sur {}", filter, filtered.len(), sequence.len());
    }
    log::debug!("Années couvertes : {:?}", filtered.years());
    if !cli.json {
        if let Some(last) = filtered.latest() {
            println!("Dernier tirage : {} du {}", last.id, last.date.format("%d/%m/%Y"));
        }
    }
    Ok(filtered)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_stats(sequence: &DrawSequence, profile: &GameProfile, json: bool) -> Result<()> {
    let frequencies = compute_frequencies(sequence, profile)?;
    if json {
        return print_json(&frequencies);
    }
    if sequence.is_empty() {
        println!("Aucun tirage pour ces critères.");
    }
    display_frequencies(&frequencies.main, &frequencies.secondary, frequencies.total_draws);
    Ok(())
}

fn cmd_gaps(sequence: &DrawSequence, profile: &GameProfile, top: usize, json: bool) -> Result<()> {
    let gaps = compute_gaps(sequence, profile)?;
    if json {
        return print_json(&gaps);
    }
    display_gaps(&gaps.main, &gaps.secondary, top);
    Ok(())
}

fn cmd_history(sequence: &DrawSequence, number: u8, secondary: bool, json: bool) -> Result<()> {
    let pool = if secondary { Pool::Secondary } else { Pool::Main };
    let history = number_history(sequence, pool, number);
    if json {
        return print_json(&history);
    }
    println!("{} : {} sortie(s)", number, history.len());
    for draw in history {
        println!("  {}  {}", draw.date.format("%d/%m/%Y"), draw.id);
    }
    Ok(())
}

fn cmd_patterns(sequence: &DrawSequence, profile: &GameProfile, config: &EngineConfig, json: bool) -> Result<()> {
    let patterns = compute_patterns(sequence, profile, &config.patterns)?;
    if json {
        return print_json(&patterns);
    }
    display_patterns(&patterns);
    Ok(())
}

fn cmd_correlations(
    sequence: &DrawSequence,
    profile: &GameProfile,
    config: &EngineConfig,
    top: Option<usize>,
    number: Option<u8>,
    json: bool,
) -> Result<()> {
    let top = top.unwrap_or(config.correlation.top_k);
    let correlations = compute_correlations(sequence, profile, Some(top))?;

    if let Some(number) = number {
        if number == 0 || number > profile.main_range() {
            bail!("Numéro {} hors limites (1-{})", number, profile.main_range());
        }
        let partners = correlations.partners(number, top);
        if json {
            return print_json(&partners);
        }
        display_partners(number, &partners);
        return Ok(());
    }

    if json {
        return print_json(&correlations.strongest);
    }
    display_correlations(&correlations);
    Ok(())
}

fn cmd_trends(
    sequence: &DrawSequence,
    profile: &GameProfile,
    config: &EngineConfig,
    window: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut trend_config = config.trends.clone();
    if let Some(window) = window {
        if window == 0 {
            bail!("La fenêtre récente doit contenir au moins un tirage");
        }
        trend_config.recent_window = window;
    }
    let trends = compute_trends(sequence, profile, &trend_config)?;
    if json {
        return print_json(&trends);
    }
    display_trends(&trends);
    Ok(())
}

fn cmd_years(sequence: &DrawSequence, profile: &GameProfile, config: &EngineConfig, json: bool) -> Result<()> {
    let years = yearly_stats(sequence, profile, &config.trends)?;
    if json {
        return print_json(&years);
    }
    if years.is_empty() {
        println!("Aucun tirage pour ces critères.");
        return Ok(());
    }
    display_yearly(&years);
    Ok(())
}

fn cmd_analyze(sequence: &DrawSequence, profile: &GameProfile, config: &EngineConfig, json: bool) -> Result<()> {
    let analysis = analyze(sequence, profile, config)?;
    if json {
        return print_json(&analysis);
    }
    display_frequencies(
        &analysis.frequencies.main,
        &analysis.frequencies.secondary,
        analysis.frequencies.total_draws,
    );
    display_gaps(&analysis.gaps.main, &analysis.gaps.secondary, 10);
    display_patterns(&analysis.patterns);
    display_correlations(&analysis.correlations);
    Ok(())
}

fn cmd_evaluate(
    sequence: &DrawSequence,
    profile: &GameProfile,
    main: Vec<u8>,
    secondary: Vec<u8>,
    json: bool,
) -> Result<()> {
    let grid = CandidateGrid::new(main, secondary, profile).context("Grille refusée")?;
    let report = evaluate_grid(&grid, sequence, profile)?;
    if json {
        return print_json(&report);
    }
    display_tier_report(&grid, &report);
    Ok(())
}

fn cmd_generate(
    sequence: &DrawSequence,
    profile: &GameProfile,
    config: &EngineConfig,
    strategy: Strategy,
    count: usize,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    if count == 0 {
        bail!("Le nombre de grilles doit être positif");
    }
    let signals = Signals::from_sequence(sequence, profile)?;
    let grids = generate_grids(profile, strategy, Some(&signals), count, seed, &config.generator)
        .with_context(|| format!("Génération {} impossible", strategy))?;
    if json {
        return print_json(&grids);
    }
    display_grids(&grids, profile, &config.patterns);
    Ok(())
}

fn cmd_default_config(output: Option<&Path>) -> Result<()> {
    let config = EngineConfig::default();
    match output {
        Some(path) => {
            save_config(&config, path)?;
            println!("Configuration écrite dans {}", path.display());
        }
        None => print_json(&config)?,
    }
    Ok(())
}
