//! Évaluation de segments d'arbres à partir d'un nuage de points étiqueté.
//!
//! Usage :
//!   cargo run --release -- points.csv
//!   cargo run --release -- points.csv --k 8 --min-score 0.5 --crown
//!
//! Entrée : points.csv — x, y, z, id, cluster (sortie de la segmentation amont)
//!
//! Produit :
//!   couronnes.csv — id, cluster, x, y, h, n_points, area, scores [, crown_wkt]
//!   (option) un CSV id → segment pour chaque point

use ptrees::{
    io::{read_labeled_points, write_crowns_csv, write_point_ids_csv},
    params::load_params,
    segment_trees, DetectedCrown, PtreesError, TreeScoringParams,
};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use log::info;

// ==========================================================================
// CLI (clap)
// ==========================================================================

#[derive(Parser, Debug)]
#[command(
    name = "ptrees",
    about = "Score de plausibilité des couronnes d'arbres sur un nuage LiDAR segmenté",
    after_help = "Produit : couronnes.csv — id, cluster, x, y, h, n_points, area, scores [, crown_wkt]"
)]
struct Cli {
    /// Nuage de points étiqueté (CSV : x,y,z,id,cluster)
    #[arg(value_name = "points.csv")]
    points: PathBuf,

    /// Fichier JSON de paramètres (les options ci-dessous le surchargent)
    #[arg(long, value_name = "params.json")]
    config: Option<PathBuf>,

    /// Nombre de voisins k (seuil de densité du score de taille)
    #[arg(long)]
    k: Option<u32>,

    /// Nombre minimal de points par segment
    #[arg(long)]
    min_points: Option<usize>,

    /// Score agrégé minimal pour accepter un segment
    #[arg(long)]
    min_score: Option<f64>,

    /// Exporter les polygones couronne en WKT dans le CSV
    #[arg(long)]
    crown: bool,

    /// Fichier CSV de sortie
    #[arg(long, short, default_value = "couronnes.csv")]
    output: PathBuf,

    /// CSV optionnel id de point → id de segment
    #[arg(long, value_name = "ids.csv")]
    point_ids: Option<PathBuf>,
}

impl Cli {
    fn params(&self) -> Result<TreeScoringParams, PtreesError> {
        let mut params = match &self.config {
            Some(path) => load_params(path)?,
            None => TreeScoringParams::default(),
        };
        if let Some(k) = self.k {
            params.k = k;
        }
        if let Some(n) = self.min_points {
            params.min_points = n;
        }
        if let Some(s) = self.min_score {
            params.min_score = s;
        }
        params.compute_crown |= self.crown;
        params.validate()?;
        Ok(params)
    }
}

// ==========================================================================
// Main
// ==========================================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("Erreur : {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), PtreesError> {
    println!("══════════════════════════════════════════════════════════");
    println!("  ptrees — Évaluation des segments d'arbres");
    println!("══════════════════════════════════════════════════════════\n");

    let params = cli.params()?;
    println!("1. Chargement de '{}'...", cli.points.display());
    let points = read_labeled_points(&cli.points)?;
    println!("   {} points", points.len());

    println!("2. Paramètres :");
    println!(
        "   k={}  min_points={}  min_score={:.2}  couronne={}",
        params.k,
        params.min_points,
        params.min_score,
        if params.compute_crown { "oui" } else { "non" }
    );
    println!();

    println!("3. Évaluation en cours...");
    let abort = AtomicBool::new(false);
    let t0 = std::time::Instant::now();
    let result = segment_trees(&points, &params, &abort)?;
    let dt = t0.elapsed();
    println!(
        "   ✓ {} couronnes acceptées, {} segments rejetés en {:.2}s\n",
        result.crowns.len(),
        result.rejected,
        dt.as_secs_f64()
    );
    info!("scoring took {:?}", dt);

    print_statistics(&result.crowns);

    println!("\n5. Export → '{}'", cli.output.display());
    write_crowns_csv(&cli.output, &result.crowns, params.compute_crown)?;
    println!("   {} lignes écrites.", result.crowns.len());

    if let Some(path) = &cli.point_ids {
        write_point_ids_csv(path, &result.point_ids)?;
        let claimed = result.point_ids.iter().filter(|s| s.is_some()).count();
        println!(
            "   {} / {} points affectés → '{}'",
            claimed,
            result.point_ids.len(),
            path.display()
        );
    }

    println!("\n══════════════════════════════════════════════════════════");
    println!("  ✓ Terminé — {} couronnes", result.crowns.len());
    println!("══════════════════════════════════════════════════════════");
    Ok(())
}

fn print_statistics(crowns: &[DetectedCrown]) {
    if crowns.is_empty() {
        return;
    }
    let n = crowns.len() as f64;
    let h_min = crowns.iter().map(|c| c.h).fold(f64::INFINITY, f64::min);
    let h_max = crowns.iter().map(|c| c.h).fold(f64::NEG_INFINITY, f64::max);
    let h_mean = crowns.iter().map(|c| c.h).sum::<f64>() / n;
    let s_mean = crowns.iter().map(|c| c.area).sum::<f64>() / n;
    let score_mean = crowns.iter().map(|c| c.scores.aggregate).sum::<f64>() / n;

    println!("4. Statistiques :");
    println!(
        "   Hauteurs    : min={:.1}  moy={:.1}  max={:.1} m",
        h_min, h_mean, h_max
    );
    println!("   Surf. moy.  : {:.1} m²/couronne", s_mean);
    println!("   Score moyen : {:.3}", score_mean);

    let mut sorted: Vec<&DetectedCrown> = crowns.iter().collect();
    sorted.sort_by(|a, b| b.scores.aggregate.total_cmp(&a.scores.aggregate));
    println!("\n   Top 10 couronnes (score) :");
    println!(
        "   {:>4}  {:>12}  {:>12}  {:>6}  {:>6}  {:>7}",
        "ID", "X", "Y", "H (m)", "N", "Score"
    );
    println!("   {}", "─".repeat(58));
    for c in sorted.iter().take(10) {
        println!(
            "   {:>4}  {:>12.2}  {:>12.2}  {:>6.1}  {:>6}  {:>7.3}",
            c.id, c.x, c.y, c.h, c.n_points, c.scores.aggregate
        );
    }
}
