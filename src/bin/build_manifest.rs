//! Artifact manifest builder.
//!
//! Hashes exported model files and writes `manifest.json` bound to this
//! build's feature contract, then loads the result to prove it is usable.
//!
//! # Usage
//!
//! ```bash
//! build_manifest <artifact_dir> --version <artifact_version> <model.json>...
//! ```
//!
//! Model files are listed relative to `<artifact_dir>`, in ensemble order.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use gastric_rfs::adapters::artifact::{
    sha256_hex, ArtifactManifest, ModelEntry, MANIFEST_FILE, SUPPORTED_FORMAT_VERSION,
};
use gastric_rfs::adapters::load_ensemble;
use gastric_rfs::domain::FEATURE_CONTRACT;

fn usage() -> anyhow::Error {
    anyhow!("Usage: build_manifest <artifact_dir> --version <artifact_version> <model.json>...")
}

fn parse_args() -> Result<(PathBuf, String, Vec<String>)> {
    let mut args = env::args().skip(1);
    let mut artifact_dir: Option<PathBuf> = None;
    let mut version: Option<String> = None;
    let mut files = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" => version = Some(args.next().ok_or_else(usage)?),
            "-h" | "--help" => return Err(usage()),
            _ if artifact_dir.is_none() => artifact_dir = Some(PathBuf::from(arg)),
            _ => files.push(arg),
        }
    }

    let artifact_dir = artifact_dir.ok_or_else(usage)?;
    let version = version.ok_or_else(usage)?;
    if files.is_empty() {
        return Err(usage());
    }
    Ok((artifact_dir, version, files))
}

fn main() -> Result<()> {
    let (artifact_dir, artifact_version, files) = parse_args()?;

    let mut models = Vec::with_capacity(files.len());
    for file in files {
        let path = artifact_dir.join(&file);
        let bytes = fs::read(&path).with_context(|| format!("Failed to read {path:?}"))?;
        let sha256 = sha256_hex(&bytes);
        println!("{sha256}  {file}");
        models.push(ModelEntry { file, sha256 });
    }

    let manifest = ArtifactManifest {
        format_version: SUPPORTED_FORMAT_VERSION,
        artifact_version,
        feature_contract: FEATURE_CONTRACT.version.to_string(),
        feature_names: FEATURE_CONTRACT
            .training_columns()
            .map(String::from)
            .collect(),
        models,
    };

    let manifest_path = artifact_dir.join(MANIFEST_FILE);
    let mut body = serde_json::to_string_pretty(&manifest)?;
    body.push('\n');
    fs::write(&manifest_path, body)
        .with_context(|| format!("Failed to write {manifest_path:?}"))?;

    let ensemble = load_ensemble(&artifact_dir)
        .with_context(|| format!("Written artifact at {artifact_dir:?} does not load"))?;
    println!(
        "Wrote {:?}: {} model(s), artifact {}",
        manifest_path,
        ensemble.len(),
        ensemble.version()
    );

    Ok(())
}
