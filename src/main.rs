//! Table Search Eval CLI
//!
//! Scores semantic table search output against graded ground truth.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::path::PathBuf;
use std::time::Instant;
use table_search_eval::{
    CandidateUniverse, Config, Evaluator, GroundTruthSource, PredictedScores, RelevanceMap,
    TableId,
    alignment::prepare,
    metrics::{AucPolicy, MetricOptions, evaluate_with},
    persistence::{DEFAULT_REPORT_FILENAME, load_report, report_exists, save_report},
    sources::{self, ScoreLookup},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Table Search Eval - ranking metrics for semantic table search
#[derive(Parser)]
#[command(name = "table-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every configured engine variant over all queries
    Run {
        /// Config file (defaults to the platform config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where to write the report (.json or .yaml)
        #[arg(short, long, default_value = DEFAULT_REPORT_FILENAME)]
        output: PathBuf,

        /// Number of concurrent evaluation tasks
        #[arg(short, long)]
        workers: Option<usize>,

        /// Cutoffs to evaluate, overriding the config
        #[arg(short, num_args = 1..)]
        k: Vec<usize>,
    },

    /// Score a single engine output against a flat judgment file
    Query {
        /// JSON object mapping table ids to relevance
        #[arg(short, long)]
        ground_truth: PathBuf,

        /// The engine's filenameToScore.json
        #[arg(short, long)]
        scores: PathBuf,

        /// Cutoffs to evaluate
        #[arg(short, num_args = 1.., default_values_t = [10])]
        k: Vec<usize>,

        /// Directory of corpus tables; defaults to the judged and scored tables
        #[arg(short, long)]
        tables: Option<PathBuf>,

        /// Tables to remove before scoring
        #[arg(long)]
        exclude: Vec<String>,

        /// Report AUC as absent instead of failing when it is undefined
        #[arg(long)]
        omit_auc: bool,
    },

    /// Print the summary table of a saved report
    Summary {
        /// Path to the report file
        #[arg(default_value = DEFAULT_REPORT_FILENAME)]
        report: PathBuf,
    },

    /// Show the resolved configuration
    Config {
        /// Config file (defaults to the platform config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            workers,
            k,
        } => cmd_run(config, output, workers, k).await,
        Commands::Query {
            ground_truth,
            scores,
            k,
            tables,
            exclude,
            omit_auc,
        } => cmd_query(ground_truth, scores, k, tables, exclude, omit_auc),
        Commands::Summary { report } => cmd_summary(report),
        Commands::Config { config } => cmd_config(config),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TABLE_EVAL_LOG")
        .unwrap_or_else(|_| EnvFilter::new("table_search_eval=info,warn"));

    let format = env::var("TABLE_EVAL_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout is reserved for tables and reports
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

async fn cmd_run(
    config_path: Option<PathBuf>,
    output: PathBuf,
    workers: Option<usize>,
    k: Vec<usize>,
) -> Result<()> {
    let mut config = Config::load(config_path.as_deref()).context("Failed to load configuration")?;
    if let Some(workers) = workers {
        config.evaluation.workers = workers;
    }
    if !k.is_empty() {
        config.evaluation.k_values = k;
    }

    let start = Instant::now();
    let evaluator = Evaluator::new(config).context("Failed to prepare evaluation")?;
    let queries = evaluator.load_queries().context("Failed to load queries")?;

    println!(
        "Evaluating {} configurations over {} queries ({} tables in corpus)...",
        evaluator.config().configurations.len(),
        queries.len(),
        evaluator.corpus().len()
    );

    let report = evaluator.run(&queries).await.context("Evaluation failed")?;
    let totals = report.totals();

    println!();
    print!("{}", report.format_table());
    println!("{}", "─".repeat(118));
    println!(
        "Evaluated {} query results, skipped {}, failed {} in {:.2?}",
        totals.evaluated,
        totals.skipped,
        totals.failed,
        start.elapsed()
    );

    save_report(&report, &output).context("Failed to save report")?;
    println!("Report saved to: {}", output.display());

    Ok(())
}

fn cmd_query(
    ground_truth: PathBuf,
    scores: PathBuf,
    k_values: Vec<usize>,
    tables: Option<PathBuf>,
    exclude: Vec<String>,
    omit_auc: bool,
) -> Result<()> {
    let judgments =
        sources::load_flat_relevance(&ground_truth).context("Failed to load ground truth")?;
    let predicted = match sources::load_json_scores(&scores).context("Failed to load scores")? {
        ScoreLookup::Found(predicted) => predicted,
        ScoreLookup::Missing => anyhow::bail!("No engine output at '{}'", scores.display()),
    };

    let universe = match tables {
        Some(dir) => CandidateUniverse::scan_dir(&dir).context("Failed to scan tables")?,
        None => judged_and_scored(&judgments, &predicted),
    };

    let source = judgments
        .iter()
        .fold(GroundTruthSource::new(), |source, (table, score)| {
            source.with_key(table.clone(), *score, [TableId::from(table.as_str())])
        });
    let relevance = RelevanceMap::build(&universe, &[source]);
    let excluded: HashSet<TableId> = exclude.into_iter().map(TableId::from).collect();
    let pair = prepare(&universe, &relevance, &predicted, &excluded)?;

    let options = MetricOptions {
        auc: if omit_auc {
            AucPolicy::Omit
        } else {
            AucPolicy::Strict
        },
        ..Default::default()
    };

    println!(
        "Candidates: {} ({} relevant, {} scored)",
        pair.tables.len(),
        pair.relevance.iter().filter(|r| **r > 0.0).count(),
        pair.scores.scored_count()
    );
    println!("{}", "─".repeat(60));
    for k in k_values {
        let record = evaluate_with(&pair.relevance, &pair.scores, k, &options)
            .with_context(|| format!("Failed to compute metrics at k={k}"))?;
        let auc = record
            .auc
            .map(|a| format!("{a:.4}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "k={:<5} ndcg={:.4}  P@k={:.4}  R@k={:.4}  auc={}  relevant@k={}",
            record.k,
            record.ndcg,
            record.precision_at_k,
            record.recall_at_k,
            auc,
            record.num_relevant_at_k
        );
    }

    Ok(())
}

/// Universe of every judged table followed by every scored one.
fn judged_and_scored(
    judgments: &BTreeMap<String, f64>,
    predicted: &PredictedScores,
) -> CandidateUniverse {
    CandidateUniverse::from_items(
        judgments
            .keys()
            .map(|t| TableId::from(t.as_str()))
            .chain(predicted.iter().map(|(t, _)| t.clone())),
    )
}

fn cmd_summary(report_path: PathBuf) -> Result<()> {
    if !report_exists(&report_path) {
        anyhow::bail!(
            "Report not found at '{}'. Run 'run' command first.",
            report_path.display()
        );
    }

    let report = load_report(&report_path).context("Failed to load report")?;
    let totals = report.totals();

    print!("{}", report.format_table());
    println!("{}", "─".repeat(118));
    println!(
        "{} keys, {} evaluated, {} skipped, {} failed",
        report.entries.len(),
        totals.evaluated,
        totals.skipped,
        totals.failed
    );

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path.as_deref()).context("Failed to load configuration")?;

    let source = config_path.or_else(Config::config_file_path);
    match source.as_deref() {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not found, using defaults)", path.display()),
        None => println!("Config file: none (using defaults)"),
    }
    println!("{}", "─".repeat(60));
    print!(
        "{}",
        serde_yaml::to_string(&config).context("Failed to serialize configuration")?
    );
    println!("{}", "─".repeat(60));

    match config.validate() {
        Ok(()) => println!("Configuration is valid."),
        Err(e) => println!("Configuration error: {e}"),
    }

    Ok(())
}
