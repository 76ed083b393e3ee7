//! Metastage CLI
//!
//! Thin front end over `metastage-core`:
//! - `mutate`: print the URN an entity gets in an environment
//! - `stage`: assemble submitted entities and replace their staged batches
//! - `show`: print the current staged batch of one environment/category

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use metastage_core::config::DEFAULT_STAGING_ROOT;
use metastage_core::{
    ConfigSource, EntityCategory, EntityReference, EntitySubmission, JsonFileConfigSource,
    StagingArea, StagingRun,
};

#[derive(Parser)]
#[command(name = "metastage")]
#[command(author, version, about = "Stage environment-scoped DataHub change proposals")]
struct Cli {
    /// Log at DEBUG level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the URN an entity gets in an environment
    Mutate {
        #[command(flatten)]
        target: TargetArgs,
        /// Entity category token (tag, glossaryTerm, glossaryNode, structuredProperty, domain, dataProduct)
        #[arg(short, long)]
        category: String,
        /// Original URN
        urn: String,
    },

    /// Assemble entities from a JSON file and replace their staged batches
    Stage {
        #[command(flatten)]
        target: TargetArgs,
        /// JSON array of entity submissions
        #[arg(short, long)]
        input: PathBuf,
        /// Staging root directory
        #[arg(long, default_value = DEFAULT_STAGING_ROOT)]
        root: PathBuf,
        /// Assemble and print, but do not write any batch
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the current staged batch of one environment/category
    Show {
        /// Target environment
        #[arg(short, long)]
        env: String,
        /// Entity category token
        #[arg(short, long)]
        category: String,
        /// Staging root directory
        #[arg(long, default_value = DEFAULT_STAGING_ROOT)]
        root: PathBuf,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Target environment
    #[arg(short, long)]
    env: String,
    /// Mutation config file (`{"environments": [...]}`); missing means pass-through
    #[arg(long, default_value = "mutations.json")]
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Mutate {
            target,
            category,
            urn,
        } => cmd_mutate(&target, &category, &urn),
        Commands::Stage {
            target,
            input,
            root,
            dry_run,
        } => cmd_stage(&target, &input, &root, dry_run),
        Commands::Show {
            env,
            category,
            root,
        } => cmd_show(&env, &category, &root),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_category(token: &str) -> Result<EntityCategory> {
    token.parse().map_err(|_| {
        let known: Vec<&str> = EntityCategory::ALL.iter().map(|c| c.urn_token()).collect();
        anyhow!("unknown category `{token}` (expected one of: {})", known.join(", "))
    })
}

fn cmd_mutate(target: &TargetArgs, category: &str, urn: &str) -> Result<()> {
    let category = parse_category(category)?;
    let source = JsonFileConfigSource::new(&target.config);
    let config = source.get_config(&target.env)?;
    let entity = EntityReference::new(category, urn);
    println!(
        "{}",
        metastage_core::resolve_entity_urn(&entity, &target.env, config.as_ref())
    );
    Ok(())
}

fn cmd_stage(target: &TargetArgs, input: &Path, root: &Path, dry_run: bool) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let submissions: Vec<EntitySubmission> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse submissions in {}", input.display()))?;
    tracing::debug!(input = %input.display(), submissions = submissions.len(), "loaded submissions");

    let source = JsonFileConfigSource::new(&target.config);
    let run = StagingRun::begin(&source, target.env.as_str(), StagingArea::at(root))?;
    if run.config().is_none() {
        eprintln!(
            "{} no mutation config for `{}`; URNs pass through unchanged",
            "info:".yellow().bold(),
            target.env
        );
    }

    if dry_run {
        let batches = run.assemble_all(&submissions)?;
        let proposals: Vec<_> = batches.into_values().flatten().collect();
        println!("{}", serde_json::to_string_pretty(&proposals)?);
        return Ok(());
    }

    let report = run.stage(&submissions)?;
    for batch in &report.batches {
        eprintln!(
            "{} {} ({} proposals)",
            "wrote".green().bold(),
            batch.path.display().to_string().bold(),
            batch.proposals
        );
    }
    eprintln!(
        "{} staged {} proposals for `{}`",
        "ok".green().bold(),
        report.total_proposals(),
        report.environment_name
    );
    Ok(())
}

fn cmd_show(env: &str, category: &str, root: &Path) -> Result<()> {
    let category = parse_category(category)?;
    let area = StagingArea::at(root);
    match area.read_batch(env, category)? {
        Some(proposals) => println!("{}", serde_json::to_string_pretty(&proposals)?),
        None => eprintln!(
            "{} nothing staged at {}",
            "info:".yellow().bold(),
            area.batch_path(env, category)?.display()
        ),
    }
    Ok(())
}
