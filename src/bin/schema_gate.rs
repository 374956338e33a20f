//! Schema Gate CLI
//!
//! Checks the schema against its accepted baseline, records the new baseline,
//! and regenerates language bindings.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ctc_protocol::config::ProtocolConfig;
use ctc_protocol::gate::{GateMode, GateOutcome, SchemaGate};
use ctc_protocol::logging::init_tracing;
use ctc_protocol::{extract, FileBaselineStore, FlatcInvoker, ProtocolError};

#[derive(Parser)]
#[command(name = "schema-gate")]
#[command(about = "Append-only schema evolution gate and binding generator")]
struct Cli {
    /// Config file layered over ctc.toml and the environment
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Schema source (overrides schema.source)
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    /// Baseline file (overrides schema.baseline)
    #[arg(long, global = true)]
    baseline: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the schema with the baseline; writes nothing
    Check,

    /// Compare, then record the schema as the new baseline
    Baseline,

    /// Compare, record the baseline, regenerate all bindings
    Generate {
        /// Schema compiler (overrides codegen.compiler)
        #[arg(long)]
        compiler: Option<PathBuf>,
    },

    /// Print the structural snapshot of the schema as JSON
    Extract,

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ProtocolError>() {
                Some(ProtocolError::Incompatible(report)) => {
                    eprintln!("❌ Schema compatibility check failed ({} violations):", report.len());
                    eprintln!("{}", report);
                }
                _ => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config =
        ProtocolConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(config.logging.json)?;

    if let Some(schema) = cli.schema {
        config.schema.source = schema;
    }
    if let Some(baseline) = cli.baseline {
        config.schema.baseline = baseline;
    }

    let store = FileBaselineStore::new(&config.schema.baseline);

    match cli.command {
        Commands::Check => {
            let outcome = SchemaGate::new(&config.schema.source, &store).run(GateMode::Check)?;
            report(&outcome);
            println!("✅ Schema compatibility OK");
        }

        Commands::Baseline => {
            let outcome =
                SchemaGate::new(&config.schema.source, &store).run(GateMode::BaselineOnly)?;
            report(&outcome);
            println!(
                "✅ Baseline updated at {} (codegen skipped)",
                config.schema.baseline.display()
            );
        }

        Commands::Generate { compiler } => {
            let compiler = compiler.unwrap_or(config.codegen.compiler);
            let invoker = FlatcInvoker::new(compiler, config.codegen.targets);
            let outcome = SchemaGate::new(&config.schema.source, &store)
                .with_codegen(&invoker)
                .run(GateMode::Generate)?;
            report(&outcome);
            for target in &outcome.generated {
                println!("  └─ {} → {}", target.language.name(), target.out_dir.display());
            }
            println!("✅ Protocol codegen complete");
        }

        Commands::Extract => {
            let source = std::fs::read_to_string(&config.schema.source)
                .with_context(|| format!("reading {}", config.schema.source.display()))?;
            let extraction = extract(&source);
            for item in extraction.diagnostics.items() {
                eprintln!("⚠️  {}", item);
            }
            print!("{}", extraction.snapshot.to_pretty_json()?);
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn report(outcome: &GateOutcome) {
    println!(
        "🔍 {} ({} enums, {} records, {} unions) sha256:{}",
        outcome.mode.label(),
        outcome.snapshot.enums.len(),
        outcome.snapshot.records.len(),
        outcome.snapshot.unions.len(),
        outcome.schema_digest.short()
    );
    if outcome.baseline_was_absent {
        println!("  (no baseline found; compatibility check skipped)");
    }
    for item in outcome.diagnostics.items() {
        println!("  ⚠️  {}", item);
    }
}
