use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::LoadReport;
use tirages_core::{CandidateGrid, GameProfile};
use tirages_stats::gaps::overdue_ranking;
use tirages_stats::{
    describe_grid, Correlations, FrequencyEntry, FrequencyTag, GapRecord, PatternBucket, PatternBuckets,
    PatternConfig, TierReport, TierStat, Trend, TrendEntry, Trends, YearStats,
};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_load_summary(report: &LoadReport) {
    println!("Chargement terminé :");
    println!("  Total lignes lues : {}", report.total_records);
    println!("  Chargés           : {}", report.loaded);
    if report.duplicates > 0 {
        println!("  Doublons ignorés  : {}", report.duplicates);
    }
    if report.errors > 0 {
        println!("  Erreurs           : {}", report.errors);
    }
}

pub fn display_frequencies(main: &[FrequencyEntry], secondary: &[FrequencyEntry], total_draws: usize) {
    println!("\n📊 Fréquences sur {} tirages\n", total_draws);

    println!("── Numéros ──");
    display_frequency_table(main);

    if !secondary.is_empty() {
        println!("\n── Secondaires ──");
        display_frequency_table(secondary);
    }
}

fn display_frequency_table(entries: &[FrequencyEntry]) {
    let mut table = new_table(vec!["Numéro", "Sorties", "%", "Tag"]);

    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));

    for entry in &sorted {
        let color = match entry.tag {
            FrequencyTag::Hot => Color::Green,
            FrequencyTag::Cold => Color::Red,
            FrequencyTag::Normal => Color::White,
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", entry.number)),
            Cell::new(entry.count),
            Cell::new(format!("{:.1}", entry.percentage)),
            Cell::new(entry.tag.to_string()).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_gaps(main: &[GapRecord], secondary: &[GapRecord], top: usize) {
    println!("\n⏳ Retards (top {})\n", top);

    println!("── Numéros ──");
    display_gap_table(main, top);

    if !secondary.is_empty() {
        println!("\n── Secondaires ──");
        display_gap_table(secondary, top);
    }
}

fn display_gap_table(records: &[GapRecord], top: usize) {
    let mut table = new_table(vec![
        "Numéro", "Retard", "Écart moyen", "Min", "Max", "Facteur", "Sorties",
    ]);
    let opt = |v: Option<String>| v.unwrap_or_else(|| "—".to_string());

    for record in overdue_ranking(records).into_iter().take(top) {
        table.add_row(vec![
            format!("{:2}", record.number),
            record.current_gap.to_string(),
            opt(record.average_gap.map(|a| format!("{:.1}", a))),
            opt(record.min_gap.map(|g| g.to_string())),
            opt(record.max_gap.map(|g| g.to_string())),
            opt(record.overdue_factor.map(|f| format!("{:.2}", f))),
            record.appearances.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_patterns(buckets: &PatternBuckets) {
    println!("\n🔢 Motifs sur {} tirages", buckets.total_draws);

    let dimensions: [(&str, &[PatternBucket]); 5] = [
        ("Pairs/Impairs", buckets.parity.as_slice()),
        ("Hauts/Bas", buckets.high_low.as_slice()),
        ("Somme", buckets.sum_range.as_slice()),
        ("Secondaires pairs/impairs", buckets.secondary_parity.as_slice()),
        ("Consécutifs", buckets.consecutive.as_slice()),
    ];

    for (title, dimension) in dimensions {
        if dimension.is_empty() {
            continue;
        }
        println!("\n── {} ──", title);
        let mut table = new_table(vec!["Motif", "Tirages", "Probabilité"]);
        for bucket in dimension {
            table.add_row(vec![
                bucket.key.clone(),
                bucket.count.to_string(),
                format!("{:.3}", bucket.probability),
            ]);
        }
        println!("{table}");
    }
}

pub fn display_trends(trends: &Trends) {
    println!(
        "\n📈 Tendances : {} derniers tirages contre {} précédents\n",
        trends.recent_draws, trends.older_draws
    );

    println!("── Numéros ──");
    display_trend_table(&trends.main);

    if !trends.secondary.is_empty() {
        println!("\n── Secondaires ──");
        display_trend_table(&trends.secondary);
    }
}

fn display_trend_table(entries: &[TrendEntry]) {
    let mut table = new_table(vec!["Numéro", "Récents", "Anciens", "Taux récent", "Taux ancien", "Tendance"]);

    // les numéros stables n'apportent rien au tableau
    for entry in entries.iter().filter(|e| e.trend != Trend::Stable) {
        let color = match entry.trend {
            Trend::Rising => Color::Green,
            Trend::Falling => Color::Red,
            Trend::Stable => Color::White,
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", entry.number)),
            Cell::new(entry.recent_count),
            Cell::new(entry.older_count),
            Cell::new(format!("{:.3}", entry.recent_rate)),
            Cell::new(format!("{:.3}", entry.older_rate)),
            Cell::new(entry.trend.to_string()).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_yearly(years: &[YearStats]) {
    println!("\n📅 Bilan par année\n");
    let join = |top: &[(u8, u32)]| {
        top.iter()
            .map(|(n, c)| format!("{} ({})", n, c))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut table = new_table(vec!["Année", "Tirages", "Numéros fréquents", "Secondaires fréquents", "Somme moy."]);
    for year in years {
        table.add_row(vec![
            year.year.to_string(),
            year.total_draws.to_string(),
            join(&year.top_main),
            join(&year.top_secondary),
            year.average_main_sum
                .map(|s| format!("{:.1}", s))
                .unwrap_or_else(|| "—".to_string()),
        ]);
    }
    println!("{table}");
}

pub fn display_correlations(correlations: &Correlations) {
    println!("\n🔗 Paires les plus fréquentes\n");
    let mut table = new_table(vec!["Paire", "Sorties communes"]);
    for pair in &correlations.strongest {
        table.add_row(vec![
            format!("{:2} - {:2}", pair.first, pair.second),
            pair.count.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_partners(number: u8, partners: &[(u8, u32)]) {
    println!("\n🔗 Numéros sortis avec le {}\n", number);
    let mut table = new_table(vec!["Numéro", "Sorties communes"]);
    for (partner, count) in partners {
        table.add_row(vec![format!("{:2}", partner), count.to_string()]);
    }
    println!("{table}");
}

pub fn display_tier_report(grid: &CandidateGrid, report: &TierReport) {
    println!("\n🎯 Grille {} sur {} tirages\n", grid, report.total_draws);

    let mut table = new_table(vec!["Rang", "Fois", "%", "1 sur"]);
    let row = |stat: &TierStat| {
        vec![
            stat.label.clone(),
            stat.count.to_string(),
            format!("{:.2}", stat.percentage),
            stat.one_in
                .map(|n| format!("{:.1}", n))
                .unwrap_or_else(|| "∞".to_string()),
        ]
    };
    for stat in &report.tiers {
        table.add_row(row(stat));
    }
    table.add_row(row(&report.no_tier));
    println!("{table}");

    println!("\n── Détail des correspondances ──");
    let mut table = new_table(vec!["Bons numéros", "Bons secondaires", "Fois"]);
    for m in &report.breakdown {
        table.add_row(vec![
            m.main_matches.to_string(),
            m.secondary_matches.to_string(),
            m.count.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_grids(grids: &[CandidateGrid], profile: &GameProfile, config: &PatternConfig) {
    println!("\n🎲 Grilles générées\n");

    let mut table = new_table(vec![
        "#", "Numéros", "Somme", "Pairs/Impairs", "Hauts/Bas", "Tranche", "Consécutifs", "Écart moyen",
    ]);

    for (i, grid) in grids.iter().enumerate() {
        let shape = describe_grid(grid, profile, config);
        table.add_row(vec![
            (i + 1).to_string(),
            grid.to_string(),
            shape.sum.to_string(),
            shape.parity,
            shape.high_low,
            shape.sum_range,
            shape.consecutive.to_string(),
            format!("{:.1}", shape.mean_spacing),
        ]);
    }
    println!("{table}");
}
