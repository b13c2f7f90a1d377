use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::fs;
use std::path::Path;
use std::process;

use relocation_radar::{
    analyze, cluster_movers, high_risk_movers, ingest_files, AnalysisError, EncodingTable,
    SourceFile,
};

/// Risk-score threshold for the high-risk listing.
const RISK_THRESHOLD: u8 = 70;

/// Cluster count and mover windows used by the standard analysis.
const CLUSTER_COUNT: usize = 4;
const MOVER_WINDOWS: [u32; 2] = [8, 3];

fn main() -> Result<()> {
    env_logger::init();

    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: relocation-radar <extract.csv>...");
        eprintln!("Each filename must contain the 4-digit year it describes.");
        process::exit(1);
    }

    let table = EncodingTable::registry_default();
    let mut files = Vec::new();
    for path in &paths {
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path))?;
        let filename = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path)
            .to_string();
        files.push(SourceFile::new(filename, bytes));
    }

    let registry = ingest_files(&files, &table).context("analysis could not run")?;
    let analysis = analyze(registry);

    let stats = analysis.statistics();
    println!("Relocation Radar v{}", relocation_radar::VERSION);
    println!("=====================================");
    println!("Companies:            {}", stats.total_companies);
    println!("Address changes:      {}", stats.total_address_changes);
    println!("Growing companies:    {}", stats.companies_with_growth);
    println!("Shrinking companies:  {}", stats.companies_with_reduction);
    println!("Employees gained:     {}", stats.total_employee_increase);
    println!("Employees lost:       {}", stats.total_employee_decrease);
    println!("Extreme changes:      {}", stats.extreme_changes);
    if let Some((min, max)) = stats.year_range {
        println!("Year range:           {}-{}", min, max);
    }
    if let Some(year) = stats.target_year_8_years_ago {
        println!("Moved 8 years ago:    {} (in {})", stats.movers_8_years_ago, year);
    }
    if let Some(year) = stats.target_year_3_years_ago {
        println!("Moved 3 years ago:    {} (in {})", stats.movers_3_years_ago, year);
    }

    let mut rng = StdRng::from_entropy();
    match cluster_movers(&analysis, CLUSTER_COUNT, &MOVER_WINDOWS, &mut rng) {
        Ok(clusters) => {
            println!();
            println!("Risk clusters ({} movers analyzed)", clusters.iter().map(|c| c.size).sum::<usize>());
            println!("=====================================");
            for cluster in &clusters {
                println!(
                    "[{}] {} - {} companies (avg {:.1} years since move, avg change {:+.1})",
                    cluster.id,
                    cluster.label.title,
                    cluster.size,
                    cluster.stats.avg_years_since_move,
                    cluster.stats.avg_change,
                );
            }

            let high_risk = high_risk_movers(&clusters, RISK_THRESHOLD);
            if !high_risk.is_empty() {
                println!();
                println!("High-risk companies (score >= {})", RISK_THRESHOLD);
                println!("=====================================");
                for scored in &high_risk {
                    println!(
                        "{:>3}  {}  {}",
                        scored.score,
                        scored.mover.orgnr(),
                        scored.mover.name()
                    );
                }
            }
        }
        Err(AnalysisError::NotEnoughData {
            available,
            required,
        }) => {
            println!();
            println!(
                "Not enough movers for clustering ({} qualifying, need {})",
                available, required
            );
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
