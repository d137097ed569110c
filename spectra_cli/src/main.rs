//! # Spectra CLI Application
//!
//! Batch runner for spectrum fatigue analyses. Loads a spectrum, a material
//! library and a batch from JSON, runs every analysis on bounded worker
//! pools and prints (or saves) the report.
//!
//! ```text
//! spectra_cli run   --spectrum s.json --materials m.json --batch b.json [--settings engine.toml] [--output report.json]
//! spectra_cli check --spectrum s.json --materials m.json --batch b.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spectra_core::analysis::{AnalysisContext, AnalysisItem, AnalysisOutcome};
use spectra_core::batch::{AnalysisBatch, BatchReport};
use spectra_core::dispatch::Dispatcher;
use spectra_core::errors::FatigueResult;
use spectra_core::file_io::{load_batch, load_material_library, load_spectrum, save_json_atomic};
use spectra_core::materials::InMemoryMaterialLibrary;
use spectra_core::settings::EngineSettings;
use spectra_core::spectrum::Spectrum;

/// Spectrum fatigue analysis runner
#[derive(Parser, Debug)]
#[command(name = "spectra_cli", version)]
#[command(about = "Run flight-spectrum fatigue analyses from JSON batches")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every analysis of a batch
    Run {
        #[command(flatten)]
        inputs: Inputs,

        /// Engine settings (TOML)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Write the JSON report here instead of printing a summary
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the full JSON report to stdout
        #[arg(long)]
        json: bool,
    },
    /// Validate the inputs without computing anything
    Check {
        #[command(flatten)]
        inputs: Inputs,
    },
}

#[derive(Args, Debug)]
struct Inputs {
    /// Pre-loaded spectrum (JSON)
    #[arg(long)]
    spectrum: PathBuf,

    /// Material library (JSON list of materials)
    #[arg(long)]
    materials: PathBuf,

    /// Analysis batch (JSON)
    #[arg(long)]
    batch: PathBuf,
}

struct Loaded {
    spectrum: Spectrum,
    materials: InMemoryMaterialLibrary,
    batch: AnalysisBatch,
}

impl Inputs {
    fn load(&self) -> FatigueResult<Loaded> {
        Ok(Loaded {
            spectrum: load_spectrum(&self.spectrum)?,
            materials: load_material_library(&self.materials)?,
            batch: load_batch(&self.batch)?,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.command {
        Command::Run {
            settings: Some(path), ..
        } => match EngineSettings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        _ => EngineSettings::default(),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let outcome = match &cli.command {
        Command::Run {
            inputs, output, json, ..
        } => run(inputs, &settings, output.as_deref(), *json),
        Command::Check { inputs } => check(inputs),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(inputs: &Inputs, settings: &EngineSettings, output: Option<&Path>, json: bool) -> FatigueResult<ExitCode> {
    let loaded = inputs.load()?;
    let dispatcher = Dispatcher::new(settings)?;
    let context = AnalysisContext::new(&loaded.materials, &settings.requested_by);

    tracing::info!(
        analyses = loaded.batch.item_count(),
        parallel = settings.max_parallel_analyses,
        "starting batch"
    );
    let report = dispatcher.run_batch(&loaded.batch, &loaded.spectrum, &context);

    if let Some(path) = output {
        save_json_atomic(&report, path)?;
        println!("Report written to {}", path.display());
    } else if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    if !json {
        print_summary(&report);
    }

    Ok(if report.failed_count() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn check(inputs: &Inputs) -> FatigueResult<ExitCode> {
    let loaded = inputs.load()?;
    loaded.spectrum.validate()?;

    let failures = check_items(&loaded);
    println!();
    println!(
        "{} flights, {} peaks, {} analyses, {} problems",
        loaded.spectrum.flights.len(),
        loaded.spectrum.peak_count(),
        loaded.batch.item_count(),
        failures
    );
    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Configuration and material checks of every item; returns the problem count
fn check_items(loaded: &Loaded) -> usize {
    let mut failures = 0;
    for (id, item) in loaded.batch.ordered_items() {
        match check_item(item, loaded) {
            Ok(()) => println!("  ok    {:<32} {}", item.label(), item.analysis_kind()),
            Err(e) => {
                failures += 1;
                println!("  FAIL  {:<32} {} ({})", item.label(), e, id);
            }
        }
    }
    failures
}

fn check_item(item: &AnalysisItem, loaded: &Loaded) -> FatigueResult<()> {
    item.validate(&loaded.spectrum)?;
    item.material().resolve(&loaded.materials)?;
    Ok(())
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v))
}

fn print_summary(report: &BatchReport) {
    println!("═══════════════════════════════════════");
    println!("  SPECTRUM: {}", report.spectrum);
    println!("═══════════════════════════════════════");
    for entry in &report.entries {
        println!();
        println!("{} [{}]", entry.label, entry.kind);
        if let Some(error) = &entry.failure {
            println!("  FAILED: {}", error);
            continue;
        }
        match &entry.outcome {
            Some(AnalysisOutcome::EquivalentStress(r)) => {
                println!("  Damage:            {:.6e}", r.damage);
                println!("  Equivalent stress: {}", format_optional(r.equivalent_stress));
                println!("  Cycles:            {:.1}", r.cycle_count);
            }
            Some(AnalysisOutcome::LoadcaseDamageContribution(r)) => {
                println!("  Baseline damage:   {:.6e}", r.baseline.damage);
                if let Some(gag) = &r.gag {
                    println!(
                        "  GAG cycle:         {:.2} / {:.2} (range {:.2})",
                        gag.min.stress,
                        gag.max.stress,
                        gag.range()
                    );
                }
                for c in &r.contributions {
                    match &c.failure {
                        Some(error) => println!("  {:<20} FAILED: {}", c.name, error),
                        None => println!(
                            "  {:<20} damage {:>12}  ratio {:>8}",
                            c.name,
                            c.damage.map_or_else(|| "-".to_string(), |d| format!("{:.4e}", d)),
                            format_optional(c.damage_ratio)
                        ),
                    }
                }
            }
            Some(AnalysisOutcome::DamageAngle(r)) => {
                println!("  Angles evaluated:  {}", r.points.len());
                match (r.critical_angle(), r.critical()) {
                    (Some(angle), Some(point)) => println!(
                        "  Critical angle:    {} (damage {:.6e})",
                        angle,
                        point.damage.unwrap_or(0.0)
                    ),
                    _ => println!("  Critical angle:    -"),
                }
            }
            None => {}
        }
    }
    println!();
    println!("{} analyses, {} failed", report.entries.len(), report.failed_count());
}
