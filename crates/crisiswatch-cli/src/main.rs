//! CrisisWatch CLI
//!
//! The `crisiswatch` command runs the crisis risk pipeline over a source
//! payload file and prints JSON documents on stdout.
//!
//! ## Commands
//!
//! - `assess`: Build a crisis assessment for a region
//! - `analyze`: Assessment plus AI analysis
//! - `plan`: Assessment, analysis and a costed response plan
//! - `run`: Full pipeline, persisted as a digest-verified run artifact
//! - `verify`: Re-verify a stored run artifact
//! - `config`: Show the effective configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use crisiswatch_core::{
    read_run_artifact, write_run_artifact, CrisisMonitor, HttpTransport, PipelineConfig, PlanRequest,
    PlanType, SourcePayloads, StaticSourceFetcher, METRICS,
};

#[derive(Parser)]
#[command(name = "crisiswatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Crisis risk aggregation and AI-augmented response planning", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// TOML configuration file (environment variables still override it)
    #[arg(long, global = true, env = "CRISISWATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by every pipeline command.
#[derive(clap::Args)]
struct SourceArgs {
    /// Source payload file: {"conflict": ..., "economic": ..., "climate": ..., "news": ...}
    #[arg(short, long)]
    input: PathBuf,

    /// ISO 3166-1 alpha-3 region code
    #[arg(short, long)]
    region: String,
}

#[derive(clap::Args)]
struct PlanArgs {
    /// Target population (default: the AI displacement estimate)
    #[arg(short, long, allow_negative_numbers = true)]
    population: Option<i64>,

    /// comprehensive, emergency-only or recovery
    #[arg(long, default_value = "comprehensive")]
    plan_type: PlanType,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and print a crisis assessment
    Assess {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Assess, then run the AI model chain
    Analyze {
        #[command(flatten)]
        source: SourceArgs,

        /// Skip model calls and use the heuristic analysis
        #[arg(long)]
        offline: bool,
    },

    /// Assess, analyze and print a costed response plan
    Plan {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        plan: PlanArgs,

        /// Skip model calls and use the heuristic analysis
        #[arg(long)]
        offline: bool,
    },

    /// Full pipeline, written to <out-dir>/<run-id>/report.json
    Run {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        plan: PlanArgs,

        /// Root directory for run artifacts
        #[arg(long, default_value = ".crisiswatch/runs")]
        out_dir: PathBuf,

        /// Skip model calls and use the heuristic analysis
        #[arg(long)]
        offline: bool,
    },

    /// Verify a stored run artifact against its digest
    Verify {
        /// Run ID to verify
        #[arg(long)]
        run_id: String,

        /// Root directory containing run artifacts
        #[arg(long, default_value = ".crisiswatch/runs")]
        dir: PathBuf,
    },

    /// Print the effective configuration (API key redacted)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    crisiswatch_core::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Assess { source } => cmd_assess(config, &source).await,
        Commands::Analyze { source, offline } => cmd_analyze(config, &source, offline).await,
        Commands::Plan {
            source,
            plan,
            offline,
        } => cmd_plan(config, &source, &plan, offline).await,
        Commands::Run {
            source,
            plan,
            out_dir,
            offline,
        } => cmd_run(config, &source, &plan, &out_dir, offline).await,
        Commands::Verify { run_id, dir } => cmd_verify(&run_id, &dir),
        Commands::Config => print_json(&config.redacted()),
    };

    METRICS.flush();
    result
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config file: {:?}", path))?,
        None => PipelineConfig::default(),
    };
    config
        .apply_env(|key| std::env::var(key).ok())
        .context("Invalid CRISISWATCH_* environment configuration")?;
    Ok(config)
}

fn build_monitor(mut config: PipelineConfig, source: &SourceArgs, offline: bool) -> Result<CrisisMonitor> {
    if offline {
        config.ai.models.clear();
    }
    let payloads: SourcePayloads = read_json_file(&source.input)?;
    let transport = HttpTransport::new(config.ai.endpoint.clone(), config.ai.api_key.clone())
        .context("Failed to build model HTTP client")?;
    CrisisMonitor::new(
        config,
        Arc::new(StaticSourceFetcher::new(payloads)),
        Arc::new(transport),
    )
    .context("Invalid pipeline configuration")
}

fn plan_request(args: &PlanArgs) -> PlanRequest {
    PlanRequest {
        plan_type: args.plan_type,
        population: args.population,
    }
}

async fn cmd_assess(config: PipelineConfig, source: &SourceArgs) -> Result<()> {
    let monitor = build_monitor(config, source, true)?;
    let assessment = monitor
        .assess(&source.region)
        .await
        .context("Assessment failed")?;
    print_json(&assessment)
}

async fn cmd_analyze(config: PipelineConfig, source: &SourceArgs, offline: bool) -> Result<()> {
    let monitor = build_monitor(config, source, offline)?;
    let assessment = monitor
        .assess(&source.region)
        .await
        .context("Assessment failed")?;
    let analysis = monitor.analyze(&assessment).await;
    print_json(&analysis)
}

async fn cmd_plan(
    config: PipelineConfig,
    source: &SourceArgs,
    plan: &PlanArgs,
    offline: bool,
) -> Result<()> {
    let monitor = build_monitor(config, source, offline)?;
    let assessment = monitor
        .assess(&source.region)
        .await
        .context("Assessment failed")?;
    let analysis = monitor.analyze(&assessment).await;
    let plan = monitor
        .plan(&analysis, &plan_request(plan))
        .context("Plan generation failed")?;
    print_json(&plan)
}

async fn cmd_run(
    config: PipelineConfig,
    source: &SourceArgs,
    plan: &PlanArgs,
    out_dir: &Path,
    offline: bool,
) -> Result<()> {
    let monitor = build_monitor(config, source, offline)?;
    let report = monitor
        .run(&source.region, &plan_request(plan))
        .await
        .context("Pipeline run failed")?;
    let path = write_run_artifact(&report, out_dir)
        .with_context(|| format!("Failed to write run artifact under {:?}", out_dir))?;
    info!(run_id = %report.run_id, path = %path.display(), "run complete");
    print_json(&report)
}

fn cmd_verify(run_id: &str, dir: &Path) -> Result<()> {
    let report = read_run_artifact(run_id, dir)
        .with_context(|| format!("Run artifact {run_id} failed verification"))?;
    println!(
        "✓ {} verified ({} risk, {} sources available)",
        report.run_id,
        report.assessment.overall_risk,
        report.assessment.available_sources()
    );
    Ok(())
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}
