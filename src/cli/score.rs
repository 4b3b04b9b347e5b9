//! Score command - predict the low-quality probability of derived samples.
//!
//! A random forest is trained on the bundled reference samples of the
//! requested assembly, assay and run type, then applied to every feature
//! table in the input directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use crate::classify::dataset::{load_reference_files, ReferenceFilter};
use crate::classify::forest::{ForestParams, RandomForest};
use crate::classify::samples::{list_feature_files, load_samples};
use crate::cli::OutputFormat;
use crate::core::types::{Assay, Assembly, MappingMode, RunType};
use crate::resources::ResourceLayout;
use crate::utils::validation::is_tab_separated;

/// Arguments for the score command
#[derive(Args)]
pub struct ScoreArgs {
    /// Directory of feature tables produced by `derive`
    #[arg(short, long, required = true)]
    pub indir: PathBuf,

    /// Genome assembly
    #[arg(long)]
    pub assembly: Assembly,

    /// Assay the reference samples are restricted to
    #[arg(long)]
    pub assay: Assay,

    /// Sequencing run type
    #[arg(short, long)]
    pub runtype: RunType,

    /// How the samples were mapped: against the blocklist (bl) or the whole genome (wg)
    #[arg(short, long, default_value = "bl")]
    pub mapping: MappingMode,

    /// Write probabilities to this file (tab-separated for .tsv/.txt, comma-separated otherwise)
    #[arg(long)]
    pub prob_out: Option<PathBuf>,

    /// Write the parsed sample feature matrix to this file (TSV)
    #[arg(long)]
    pub input_out: Option<PathBuf>,

    /// Only score the sample with this ID
    #[arg(long)]
    pub sample_id: Option<String>,
}

/// Low-quality probability of one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
struct SampleScore {
    #[serde(rename = "Filename_sample_ID")]
    sample_id: String,
    #[serde(rename = "lowQ_Probability")]
    low_q_probability: f64,
}

/// Execute the score command
///
/// # Errors
///
/// Returns an error if the input directory is invalid, the reference data
/// cannot be loaded, the classifier cannot be trained, or an output file
/// cannot be written. The input directory is checked first.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: ScoreArgs,
    resources: &ResourceLayout,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let files = list_feature_files(&args.indir)?;
    debug!(files = files.len(), indir = %args.indir.display(), "Found feature files");

    let filter = ReferenceFilter {
        assembly: args.assembly,
        assay: args.assay,
        runtype: args.runtype,
    };
    let meta_path = resources.meta_table();
    let features_path = resources.reference_features(args.mapping, args.assembly);
    let dataset = load_reference_files(&meta_path, &features_path, &filter).with_context(|| {
        format!(
            "Failed to load reference data from {} and {}",
            meta_path.display(),
            features_path.display()
        )
    })?;

    info!(
        samples = dataset.len(),
        features = dataset.feature_names.len(),
        "Training classifier"
    );
    let forest = RandomForest::fit(&dataset.rows, &dataset.targets(), &ForestParams::default())?;
    debug!(trees = forest.n_trees(), "Classifier trained");

    let samples = load_samples(&files, &dataset.feature_names, args.sample_id.as_deref())?;
    info!(samples = samples.len(), indir = %args.indir.display(), "Loaded samples");

    if let Some(path) = &args.input_out {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        samples
            .write_tsv(file)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "Wrote sample matrix");
    }

    let probabilities = forest.predict_proba_all(&samples.rows)?;
    let scores: Vec<SampleScore> = samples
        .sample_ids
        .iter()
        .zip(probabilities)
        .map(|(id, p)| SampleScore {
            sample_id: id.clone(),
            low_q_probability: p,
        })
        .collect();

    if let Some(path) = &args.prob_out {
        write_probabilities_file(path, &scores)?;
        info!(path = %path.display(), "Wrote probabilities");
    }

    match format {
        OutputFormat::Text => print_text_results(&scores, &args, dataset.len(), verbose),
        OutputFormat::Json => print_json_results(&scores, &args, dataset.len())?,
        OutputFormat::Tsv => print_tsv_results(&scores),
    }

    Ok(())
}

fn write_probabilities_file(path: &Path, scores: &[SampleScore]) -> anyhow::Result<()> {
    let delimiter = if is_tab_separated(path) { b'\t' } else { b',' };
    let file =
        std::fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_probabilities(file, delimiter, scores)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn write_probabilities<W: Write>(
    writer: W,
    delimiter: u8,
    scores: &[SampleScore],
) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    for score in scores {
        wtr.serialize(score)?;
    }
    wtr.flush()?;
    Ok(())
}

fn print_text_results(scores: &[SampleScore], args: &ScoreArgs, training: usize, verbose: bool) {
    println!(
        "\nLow-quality probability ({} {} {}, {} mapping)",
        args.assembly,
        args.assay,
        args.runtype,
        args.mapping.table_prefix()
    );
    if verbose {
        println!("   Trained on {training} reference samples");
    }
    println!();

    let width = scores
        .iter()
        .map(|s| s.sample_id.len())
        .max()
        .unwrap_or(0)
        .max("sample".len());
    println!("   {:<width$}  lowQ_probability", "sample");
    for score in scores {
        println!(
            "   {:<width$}  {:.4}",
            score.sample_id, score.low_q_probability
        );
    }
}

fn print_json_results(
    scores: &[SampleScore],
    args: &ScoreArgs,
    training: usize,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "assembly": args.assembly,
        "assay": args.assay,
        "runtype": args.runtype,
        "mapping": args.mapping.table_prefix(),
        "training_samples": training,
        "samples": scores
            .iter()
            .map(|s| serde_json::json!({
                "sample_id": s.sample_id,
                "low_quality_probability": s.low_q_probability,
            }))
            .collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(scores: &[SampleScore]) {
    println!("sample_id\tlowQ_probability");
    for score in scores {
        println!("{}\t{}", score.sample_id, score.low_q_probability);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> Vec<SampleScore> {
        vec![
            SampleScore {
                sample_id: "S1".to_string(),
                low_q_probability: 0.25,
            },
            SampleScore {
                sample_id: "S2".to_string(),
                low_q_probability: 0.9,
            },
        ]
    }

    #[test]
    fn test_write_probabilities_comma() {
        let mut out = Vec::new();
        write_probabilities(&mut out, b',', &scores()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Filename_sample_ID,lowQ_Probability\nS1,0.25\nS2,0.9\n"
        );
    }

    #[test]
    fn test_write_probabilities_file_separator_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let tsv = dir.path().join("probs.tsv");
        write_probabilities_file(&tsv, &scores()).unwrap();
        let content = std::fs::read_to_string(&tsv).unwrap();
        assert!(content.starts_with("Filename_sample_ID\tlowQ_Probability\n"));

        let txt = dir.path().join("probs.txt");
        write_probabilities_file(&txt, &scores()).unwrap();
        assert!(std::fs::read_to_string(&txt).unwrap().contains("S1\t0.25"));

        let csv = dir.path().join("probs.csv");
        write_probabilities_file(&csv, &scores()).unwrap();
        assert!(std::fs::read_to_string(&csv).unwrap().contains("S2,0.9"));
    }
}
