//! tabrix command-line interface
//!
//! Subcommands for training, prediction, and artifact inspection.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::artifact::Artifact;
use crate::data::CsvRowSource;
use crate::encoding::{EncoderConfig, ScalingMode};
use crate::model::MlpConfig;
use crate::pipeline::{
    write_predictions, InferencePipeline, TrainConfig, TrainPipeline, ARTIFACT_FILE,
};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}

fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}

fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tabrix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Streaming tabular feature encoder and binary classifier")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a classifier on a CSV file
    Train {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Label column name
        #[arg(short, long)]
        label: String,

        /// Id column name (excluded from features)
        #[arg(long)]
        id: Option<String>,

        /// Output directory for artifact and model
        #[arg(short, long, default_value = "tabrix_model")]
        output: PathBuf,

        /// Number of training epochs
        #[arg(long, default_value = "30")]
        epochs: usize,

        /// Rows per training batch
        #[arg(long, default_value = "64")]
        batch_size: usize,

        /// Numeric scaling (standard, mean-only)
        #[arg(long, default_value = "standard")]
        scaling: String,

        /// Rows sampled for schema inference
        #[arg(long, default_value = "64")]
        sample_rows: usize,

        /// Fail on mixed-type columns instead of coercing to categorical
        #[arg(long)]
        strict_schema: bool,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Predict labels for a CSV file using a trained model
    Predict {
        /// Model directory produced by `train`
        #[arg(short, long)]
        model: PathBuf,

        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Output predictions file
        #[arg(short, long, default_value = "predictions.csv")]
        output: PathBuf,

        /// Id column echoed into the output
        #[arg(long)]
        id: Option<String>,
    },

    /// Show a persisted artifact
    Info {
        /// Model directory produced by `train`
        #[arg(short, long)]
        model: PathBuf,
    },
}

fn parse_scaling(name: &str) -> anyhow::Result<ScalingMode> {
    match name {
        "standard" => Ok(ScalingMode::Standard),
        "mean-only" | "mean_only" => Ok(ScalingMode::MeanOnly),
        _ => anyhow::bail!("Invalid scaling mode: {} (standard, mean-only)", name),
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn cmd_train(
    data: &PathBuf,
    label: &str,
    id: Option<&str>,
    output: &PathBuf,
    epochs: usize,
    batch_size: usize,
    scaling: &str,
    sample_rows: usize,
    strict_schema: bool,
    seed: u64,
) -> anyhow::Result<()> {
    section("Train");

    let encoder = EncoderConfig::new()
        .with_scaling(parse_scaling(scaling)?)
        .with_sample_rows(sample_rows)
        .with_strict_schema(strict_schema);

    let mut config = TrainConfig::new(label)
        .with_epochs(epochs)
        .with_batch_size(batch_size)
        .with_encoder(encoder)
        .with_model(MlpConfig::default().with_seed(seed));
    if let Some(id) = id {
        config = config.with_id_column(id);
    }

    let source = CsvRowSource::new(data);

    step_run(&format!("Training on {}", data.display()));
    let start = Instant::now();
    let report = TrainPipeline::new(config).run(&source, output)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!("  {:<16} {}", muted("Rows"), report.rows);
    println!(
        "  {:<16} {} numeric · {} categorical",
        muted("Features"),
        report.numeric_features,
        report.categorical_features
    );
    println!("  {:<16} {}", muted("Encoded width"), report.total_dim);
    println!("  {:<16} {}", muted("Epochs"), report.epochs);
    println!("  {:<16} {}", muted("Saved to"), output.display());
    println!();

    Ok(())
}

pub fn cmd_predict(
    model_dir: &PathBuf,
    data: &PathBuf,
    output: &PathBuf,
    id: Option<&str>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading model");
    let mut pipeline = InferencePipeline::load(model_dir)?;
    if let Some(id) = id {
        pipeline = pipeline.with_id_column(id);
    }
    step_done(&format!("width {}", pipeline.artifact().total_dim()));

    let source = CsvRowSource::new(data);

    step_run(&format!("Scoring {}", data.display()));
    let start = Instant::now();
    let predictions = pipeline.run(&source)?;
    step_done(&format!("{} rows in {:?}", predictions.len(), start.elapsed()));

    write_predictions(output, &predictions)?;
    println!();
    println!("  {:<16} {}", muted("Predictions"), output.display());
    println!();

    Ok(())
}

pub fn cmd_info(model_dir: &PathBuf) -> anyhow::Result<()> {
    section("Artifact");

    let artifact = Artifact::load(&model_dir.join(ARTIFACT_FILE))?;

    println!("  {:<16} {}", muted("Version"), artifact.version);
    println!("  {:<16} {}", muted("Created"), artifact.created_at);
    println!("  {:<16} {:?}", muted("Scaling"), artifact.scaling);
    println!("  {:<16} {}", muted("Encoded width"), artifact.total_dim());
    println!(
        "  {:<16} {} numeric · {} categorical",
        muted("Features"),
        artifact.numeric_feature_names.len(),
        artifact.categorical_feature_names.len()
    );

    println!();
    println!(
        "  {:<20} {:<12} {:>8} {:>8}",
        muted("Column"),
        muted("Kind"),
        muted("Offset"),
        muted("Width")
    );
    println!("  {}", dim(&"─".repeat(52)));

    for (slot, name) in artifact.numeric_feature_names.iter().enumerate() {
        println!("  {:<20} {:<12} {:>8} {:>8}", name, "numeric", slot, 1);
    }
    for name in &artifact.categorical_feature_names {
        if let Some(block) = artifact.layout.block(name) {
            println!(
                "  {:<20} {:<12} {:>8} {:>8}",
                name, "categorical", block.offset, block.size
            );
        }
    }

    println!();
    Ok(())
}
