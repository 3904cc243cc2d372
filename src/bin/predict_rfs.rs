//! Headless one-shot prediction.
//!
//! Reads a JSON object of raw patient fields, predicts with the artifact named
//! by `GASTRIC_RFS_MODEL_PATH` and prints the headline followed by the
//! 37-point curve.
//!
//! # Usage
//!
//! ```bash
//! predict_rfs [--json] <patient.json>
//! ```
//!
//! Output is tab-separated `month\tsurvival` lines unless `--json` is given.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zeroize::Zeroize;

use gastric_rfs::adapters::load_ensemble;
use gastric_rfs::config::RuntimeConfig;
use gastric_rfs::{PredictionService, RawPatientInput, RfsPrediction};

#[derive(Debug, Serialize)]
struct Report<'a> {
    headline: String,
    three_year_rfs_percent: f64,
    artifact_version: &'a str,
    created_at: DateTime<Utc>,
    curve: Vec<MonthPoint>,
}

#[derive(Debug, Serialize)]
struct MonthPoint {
    month: u32,
    survival: f64,
}

impl<'a> Report<'a> {
    fn new(prediction: &'a RfsPrediction) -> Self {
        Self {
            headline: prediction.headline(),
            three_year_rfs_percent: prediction.rfs_percent(),
            artifact_version: &prediction.artifact_version,
            created_at: prediction.created_at,
            curve: prediction
                .curve
                .survival()
                .iter()
                .zip(0u32..)
                .map(|(&survival, month)| MonthPoint { month, survival })
                .collect(),
        }
    }
}

fn usage() -> anyhow::Error {
    anyhow!("Usage: predict_rfs [--json] <patient.json>")
}

fn parse_args() -> Result<(PathBuf, bool)> {
    let mut input: Option<PathBuf> = None;
    let mut json = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => return Err(usage()),
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => return Err(usage()),
        }
    }

    Ok((input.ok_or_else(usage)?, json))
}

fn main() -> Result<()> {
    let (input, json) = parse_args()?;
    let config = RuntimeConfig::from_env();

    // Stdout carries the result; logs go to stderr.
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    let ensemble = load_ensemble(&config.model_path)
        .with_context(|| format!("Failed to load model artifact from {:?}", config.model_path))?;
    let service = PredictionService::new(Arc::new(ensemble));

    let mut text =
        fs::read_to_string(&input).with_context(|| format!("Failed to read {input:?}"))?;
    let parsed: Result<RawPatientInput, _> = serde_json::from_str(&text);
    text.zeroize();
    let mut raw = parsed.with_context(|| format!("{input:?} is not a patient JSON object"))?;

    let outcome = service.predict(&raw);
    raw.zeroize();
    let prediction = outcome?;

    if json {
        println!("{}", serde_json::to_string_pretty(&Report::new(&prediction))?);
    } else {
        println!("{}", prediction.headline());
        for (month, survival) in prediction.curve.survival().iter().enumerate() {
            println!("{month}\t{survival:.6}");
        }
    }

    Ok(())
}
