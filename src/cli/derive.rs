//! Derive command - map a FASTQ file and count reads in blocklist regions.
//!
//! Intermediate files live in `<outdir>/mapping_data/` and are reused when
//! present, so an interrupted run can be resumed and the counting step can be
//! repeated without remapping.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::align::{AlignmentJob, Tools};
use crate::cli::OutputFormat;
use crate::core::region::Blocklist;
use crate::core::summits::KeyDomain;
use crate::core::types::{Assembly, MappingMode};
use crate::counting::count_regions;
use crate::parsing::bam::bam_to_coords_file;
use crate::parsing::blocklist::parse_blocklist_file;
use crate::parsing::bowtie_stats::{parse_bowtie_stats_file, MappingStats};
use crate::parsing::chrom_sizes::{parse_chrom_sizes_file, ChromSizes};
use crate::parsing::coords::read_summits_file;
use crate::resources::ResourceLayout;
use crate::utils::validation::sample_name_from_fastq;

/// Arguments for the derive command
#[derive(Args)]
pub struct DeriveArgs {
    /// Input reads (FASTQ, optionally gzipped)
    #[arg(short = 'i', long, required = true)]
    pub fastq: PathBuf,

    /// Genome assembly
    #[arg(short, long)]
    pub assembly: Assembly,

    /// Bowtie2 index prefix of the whole genome.
    /// Reads are mapped against the bundled blocklist-restricted index when omitted.
    #[arg(short = 'x', long)]
    pub btidx: Option<PathBuf>,

    /// Output directory for the feature table and mapping data
    #[arg(short, long, default_value = "./features_BL/")]
    pub outdir: PathBuf,

    /// Threads passed to bowtie2 and samtools
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..))]
    pub cores: u16,

    /// Sample name (default: FASTQ file name without extensions)
    #[arg(short, long)]
    pub name: Option<String>,

    /// bowtie2 executable
    #[arg(long, default_value = "bowtie2")]
    pub bowtie2: PathBuf,

    /// samtools executable
    #[arg(long, default_value = "samtools")]
    pub samtools: PathBuf,
}

impl DeriveArgs {
    fn mapping_mode(&self) -> MappingMode {
        if self.btidx.is_some() {
            MappingMode::WholeGenome
        } else {
            MappingMode::Blocklist
        }
    }
}

/// What one derive run produced
#[derive(Debug, Serialize)]
struct DeriveSummary {
    sample: String,
    assembly: Assembly,
    mapping: MappingMode,
    features: PathBuf,
    regions: usize,
    reads_in_regions: u64,
    records: usize,
    skipped_records: usize,
    mapping_stats: Option<MappingStats>,
}

/// Execute the derive command
///
/// # Errors
///
/// Returns an error if the resources cannot be read, mapping or BAM
/// conversion fails, or the feature table cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: DeriveArgs,
    resources: &ResourceLayout,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| sample_name_from_fastq(&args.fastq));
    anyhow::ensure!(!name.is_empty(), "Cannot derive a sample name from {}", args.fastq.display());

    let mode = args.mapping_mode();
    info!(sample = %name, assembly = %args.assembly, mapping = mode.table_prefix(), "Deriving blocklist features");

    let mapping_dir = args.outdir.join("mapping_data");
    std::fs::create_dir_all(&mapping_dir)
        .with_context(|| format!("Failed to create {}", mapping_dir.display()))?;

    let (chroms, blocklist) = load_regions(resources, args.assembly)?;

    let job = AlignmentJob {
        fastq: args.fastq.clone(),
        index: args
            .btidx
            .clone()
            .unwrap_or_else(|| resources.restricted_index(args.assembly)),
        cores: usize::from(args.cores),
        stats: mapping_dir.join(format!("{name}_stats.txt")),
        bam: mapping_dir.join(format!("{name}.bam")),
    };
    if job.is_complete() {
        info!(bam = %job.bam.display(), "Mapping output exists, skipping alignment");
    } else {
        anyhow::ensure!(
            args.fastq.is_file(),
            "Input reads not found: {}",
            args.fastq.display()
        );
        let tools = Tools {
            bowtie2: args.bowtie2.clone(),
            samtools: args.samtools.clone(),
        };
        info!(index = %job.index.display(), cores = job.cores, "Mapping reads");
        job.run(&tools)?;
    }

    let mapping_stats = read_mapping_stats(&job.stats);

    let coords = job.bam.with_extension("bed");
    if coords.exists() {
        info!(path = %coords.display(), "Coordinate table exists, skipping conversion");
    } else {
        let written = bam_to_coords_file(&job.bam, &coords)
            .with_context(|| format!("Failed to convert {}", job.bam.display()))?;
        debug!(records = written, path = %coords.display(), "Wrote coordinate table");
    }

    let domain = KeyDomain::from(mode);
    let keys: HashSet<String> = match domain {
        KeyDomain::Region => blocklist.region_ids(),
        KeyDomain::Chromosome => chroms.names().into_iter().collect(),
    };
    let report = read_summits_file(&coords, domain, &keys)
        .with_context(|| format!("Failed to read {}", coords.display()))?;
    if report.skipped > 0 {
        debug!(
            skipped = report.skipped,
            "Skipped records outside the blocklist chromosomes"
        );
    }

    let table = count_regions(&report.index, &blocklist)?;

    let features = args.outdir.join(format!("{name}.csv"));
    table
        .write_csv_file(&features)
        .with_context(|| format!("Failed to write {}", features.display()))?;
    info!(
        path = %features.display(),
        regions = table.len(),
        reads = table.total_count(),
        "Wrote feature table"
    );

    let summary = DeriveSummary {
        sample: name,
        assembly: args.assembly,
        mapping: mode,
        features,
        regions: table.len(),
        reads_in_regions: table.total_count(),
        records: report.records,
        skipped_records: report.skipped,
        mapping_stats,
    };

    match format {
        OutputFormat::Text => print_text_summary(&summary, verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Tsv => print_tsv_summary(&summary),
    }

    Ok(())
}

/// Chromosome table without sex chromosomes, and the blocklist restricted to it
fn load_regions(
    resources: &ResourceLayout,
    assembly: Assembly,
) -> anyhow::Result<(ChromSizes, Blocklist)> {
    let sizes_path = resources.chrom_sizes(assembly);
    let chroms = parse_chrom_sizes_file(&sizes_path)
        .with_context(|| format!("Failed to read chromosome sizes {}", sizes_path.display()))?
        .without_sex_chromosomes();

    let blocklist_path = resources.blocklist(assembly);
    let blocklist = parse_blocklist_file(&blocklist_path)
        .with_context(|| format!("Failed to read blocklist {}", blocklist_path.display()))?
        .restrict_to(&chroms.names());
    anyhow::ensure!(
        !blocklist.is_empty(),
        "No blocklist regions on the chromosomes of {}",
        sizes_path.display()
    );

    debug!(
        chromosomes = chroms.len(),
        regions = blocklist.len(),
        "Loaded blocklist"
    );
    Ok((chroms, blocklist))
}

fn read_mapping_stats(path: &Path) -> Option<MappingStats> {
    match parse_bowtie_stats_file(path) {
        Ok(stats) => {
            info!(
                reads = stats.total,
                aligned = stats.aligned(),
                "{:.2}% overall alignment rate",
                stats.overall_rate()
            );
            Some(stats)
        }
        Err(e) => {
            warn!(path = %path.display(), "Could not parse mapping statistics: {e}");
            None
        }
    }
}

fn print_text_summary(summary: &DeriveSummary, verbose: bool) {
    println!("Sample:   {}", summary.sample);
    println!("Features: {}", summary.features.display());
    println!(
        "   {} regions with reads, {} reads in regions",
        summary.regions, summary.reads_in_regions
    );

    if let Some(stats) = &summary.mapping_stats {
        println!(
            "   Mapping: {} reads, {:.2}% overall alignment rate",
            stats.total,
            stats.overall_rate()
        );
        if verbose {
            println!(
                "      {} ({:.2}%) aligned 0 times",
                stats.aligned_zero,
                stats.percent(stats.aligned_zero)
            );
            println!(
                "      {} ({:.2}%) aligned exactly 1 time",
                stats.aligned_once,
                stats.percent(stats.aligned_once)
            );
            println!(
                "      {} ({:.2}%) aligned >1 times",
                stats.aligned_multi,
                stats.percent(stats.aligned_multi)
            );
        }
    }

    if verbose {
        println!(
            "   Coordinates: {} records, {} outside the blocklist chromosomes",
            summary.records, summary.skipped_records
        );
    }
}

fn print_tsv_summary(summary: &DeriveSummary) {
    println!("sample\tassembly\tmapping\tfeatures\tregions\treads_in_regions\trecords\tskipped_records\toverall_alignment_rate");
    let rate = summary
        .mapping_stats
        .map(|s| format!("{:.2}", s.overall_rate()))
        .unwrap_or_default();
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        summary.sample,
        summary.assembly,
        summary.mapping.table_prefix(),
        summary.features.display(),
        summary.regions,
        summary.reads_in_regions,
        summary.records,
        summary.skipped_records,
        rate,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(btidx: Option<&str>) -> DeriveArgs {
        DeriveArgs {
            fastq: PathBuf::from("reads.fastq.gz"),
            assembly: Assembly::Hg38,
            btidx: btidx.map(PathBuf::from),
            outdir: PathBuf::from("out"),
            cores: 1,
            name: None,
            bowtie2: PathBuf::from("bowtie2"),
            samtools: PathBuf::from("samtools"),
        }
    }

    #[test]
    fn test_mapping_mode_follows_index() {
        assert_eq!(args(None).mapping_mode(), MappingMode::Blocklist);
        assert_eq!(
            args(Some("/idx/hg38")).mapping_mode(),
            MappingMode::WholeGenome
        );
    }

    #[test]
    fn test_load_regions_drops_sex_chromosomes() {
        let dir = tempfile::tempdir().unwrap();
        let resources = ResourceLayout::new(dir.path());
        std::fs::create_dir_all(dir.path().join("chromosome_sizes")).unwrap();
        std::fs::create_dir_all(dir.path().join("blocklists")).unwrap();
        std::fs::write(
            resources.chrom_sizes(Assembly::Hg38),
            "chr1\t1000\nchr2\t800\nchrX\t500\nchrY\t300\n",
        )
        .unwrap();
        std::fs::write(
            resources.blocklist(Assembly::Hg38),
            "chr2\t10\t20\tBLHSR_1\nchrX\t10\t20\tBLLM_2\nchr1\t5\t9\tBLLM_3\n",
        )
        .unwrap();

        let (chroms, blocklist) = load_regions(&resources, Assembly::Hg38).unwrap();
        assert_eq!(chroms.names(), vec!["chr1", "chr2"]);
        let ids: Vec<_> = blocklist.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["BLLM_3", "BLHSR_1"]);
    }

    #[test]
    fn test_load_regions_missing_resources() {
        let dir = tempfile::tempdir().unwrap();
        let resources = ResourceLayout::new(dir.path());
        assert!(load_regions(&resources, Assembly::Mm10).is_err());
    }

    #[test]
    fn test_unparseable_stats_are_not_fatal() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "Warning: something odd\n").unwrap();
        assert!(read_mapping_stats(file.path()).is_none());
    }
}
