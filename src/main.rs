use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tellme::record::NumericPolicy;
use tellme::{run_evaluation, Config, MatchMode};

/// Report precision errors (non-relevant documents a run ranks highly) and
/// recall errors (relevant documents a run misses) against a qrels file.
#[derive(Parser, Debug)]
#[command(name = "tellme", version, allow_negative_numbers = true)]
struct Args {
    /// Run file: `<query> Q0 <doc> <rank> <score> [<tag>]` per line
    run: PathBuf,

    /// Qrels file: `<query> 0 <doc> <relevance>` per line
    qrels: PathBuf,

    /// Minimum score of run entries checked for precision errors (default 9)
    rank_threshold: Option<f64>,

    /// Minimum relevance of judgments checked for recall errors (default 1)
    relevance_threshold: Option<i32>,

    /// Print query and document text under every error
    #[arg(short, long)]
    verbose: bool,

    /// How pairs are matched between run and qrels
    #[arg(long, value_enum)]
    match_mode: Option<MatchMode>,

    /// How non-numeric scores and relevance values are handled
    #[arg(long, value_enum)]
    numeric_policy: Option<NumericPolicy>,

    /// Config file (overrides TELLME_CONFIG and ./tellme.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    /// Command-line values take precedence over the config file.
    fn apply(&self, config: &mut Config) {
        if let Some(rank) = self.rank_threshold {
            config.thresholds.rank = rank;
        }
        if let Some(relevance) = self.relevance_threshold {
            config.thresholds.relevance = relevance;
        }
        if self.verbose {
            config.verbose.enabled = true;
        }
        if let Some(mode) = self.match_mode {
            config.matching.mode = mode;
        }
        if let Some(policy) = self.numeric_policy {
            config.parsing.numeric_policy = policy;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    args.apply(&mut config);
    config.validate()?;

    log::info!(
        "Evaluating {} against {}",
        args.run.display(),
        args.qrels.display()
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let evaluation = run_evaluation(&config, &args.run, &args.qrels, &mut out)
        .context("Evaluation aborted")?;

    log::info!("{} errors reported", evaluation.error_count());
    Ok(())
}
