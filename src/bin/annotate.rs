use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use clarus_annotate::annotate::{AnnotatedTranscript, Annotator};
use clarus_annotate::cli::{self, RunCounts};
use clarus_annotate::config::AnnotationConfig;
use clarus_annotate::consequence::ConsequenceTerm;
use clarus_annotate::fasta::ReferenceGenome;
use clarus_annotate::sequence::ReferenceSequence;
use clarus_annotate::transcript::TranscriptSet;
use clarus_annotate::variant::SimpleVariant;

#[derive(Parser)]
#[command(name = "clarus-annotate", about = "Annotate variants with consequences and HGVS nomenclature")]
struct Cli {
    /// Transcript models (JSON, optionally gzipped)
    #[arg(short = 't', long = "transcripts")]
    transcripts: PathBuf,

    /// Reference genome (FASTA, optionally gzipped)
    #[arg(short = 'r', long = "reference")]
    reference: PathBuf,

    /// Tab-delimited variants: chromosome, position, ref, alt
    #[arg(short = 'v', long = "variants")]
    variants: PathBuf,

    /// Annotation settings (JSON)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Output JSON lines file [default: stdout]
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Log filter, e.g. `warn` or `clarus_annotate=debug`
    #[arg(long = "log-level", default_value = "warn")]
    log_level: String,
}

/// One output line: the input variant plus its annotation on one transcript.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptLine<'a> {
    variant: &'a VariantFields<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gene: Option<&'a str>,
    #[serde(flatten)]
    annotation: &'a AnnotatedTranscript,
}

/// Output line for a variant with no transcript within the flanking window.
#[derive(Serialize)]
struct IntergenicLine<'a> {
    variant: &'a VariantFields<'a>,
    consequence: [ConsequenceTerm; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VariantFields<'a> {
    chromosome: &'a str,
    position: i32,
    ref_allele: &'a str,
    alt_allele: &'a str,
}

impl<'a> VariantFields<'a> {
    fn new(variant: &'a SimpleVariant) -> Self {
        Self {
            chromosome: &variant.chromosome,
            position: variant.start,
            ref_allele: &variant.ref_allele,
            alt_allele: &variant.alt_allele,
        }
    }
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();
    init_tracing(&cli_args.log_level)?;

    cli::banner("Annotate");

    // ── Configuration ────────────────────────────────────
    cli::section("Configuration");

    let config = match &cli_args.config {
        Some(path) => {
            cli::kv("Config", &path.display().to_string());
            AnnotationConfig::from_file(path)?
        }
        None => AnnotationConfig::default(),
    };
    cli::kv("Flanking", &format!("{} bp", config.flanking_length));
    cli::kv(
        "Splice region",
        &format!(
            "{} bp intron / {} bp exon",
            config.splice_region_intron_length, config.splice_region_exon_length
        ),
    );

    eprintln!();

    // ── Inputs ───────────────────────────────────────────
    cli::section("Inputs");

    let transcripts = TranscriptSet::from_path(&cli_args.transcripts)
        .with_context(|| format!("failed to load transcripts: {}", cli_args.transcripts.display()))?;
    cli::kv("Transcripts", &transcripts.len().to_string());
    cli::kv("Genes", &transcripts.genes.len().to_string());

    let genome = ReferenceGenome::from_path(&cli_args.reference)
        .with_context(|| format!("failed to load reference: {}", cli_args.reference.display()))?;
    if genome.is_empty() {
        bail!("reference contains no sequences: {}", cli_args.reference.display());
    }
    cli::kv("Chromosomes", &genome.len().to_string());

    eprintln!();

    // ── Annotation ───────────────────────────────────────
    cli::section("Annotation");

    let variants = File::open(&cli_args.variants)
        .with_context(|| format!("failed to open variants: {}", cli_args.variants.display()))?;

    let output: Box<dyn Write> = match &cli_args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create output: {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = BufWriter::new(output);

    let annotator = Annotator::new(config);
    let mut counts = RunCounts::default();

    for (index, line) in BufReader::new(variants).lines().enumerate() {
        let line = line.context("failed to read variants")?;
        let line_number = index + 1;

        let variant = match parse_variant_line(&line) {
            Ok(Some(variant)) => variant,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = line_number, "skipping variant: {e:#}");
                counts.skipped += 1;
                continue;
            }
        };

        let Some(reference) = genome.get(&variant.chromosome) else {
            warn!(line = line_number, chromosome = %variant.chromosome, "skipping variant on unknown chromosome");
            counts.skipped += 1;
            continue;
        };

        if !variant.ref_allele.is_empty() && !reference.validate(variant.start, variant.end, &variant.ref_allele)
        {
            warn!(line = line_number, variant = %variant, "skipping variant whose reference allele does not match");
            counts.skipped += 1;
            continue;
        }

        let variant = annotator
            .normalize(&variant, reference)
            .with_context(|| format!("failed to normalize line {line_number}"))?;

        counts.variants += 1;
        counts.annotated_transcripts +=
            annotate_variant(&annotator, &transcripts, reference, &variant, &mut writer)?;
    }

    writer.flush().context("failed to write annotations")?;

    cli::success(&format!("{} variants annotated", counts.variants));
    if let Some(path) = &cli_args.output {
        cli::kv("Output", &path.display().to_string());
    }

    cli::print_summary(start, counts);
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

/// Writes one line per transcript within the flanking window, or a single intergenic line.
/// Returns the number of transcript annotations written.
fn annotate_variant<S: ReferenceSequence + ?Sized, W: Write>(
    annotator: &Annotator,
    transcripts: &TranscriptSet,
    reference: &S,
    variant: &SimpleVariant,
    writer: &mut W,
) -> Result<usize> {
    let fields = VariantFields::new(variant);
    let flanking = annotator.config().flanking_length;
    let mut written = 0;

    for transcript in transcripts.overlapping(&variant.chromosome, variant.start, variant.end, flanking) {
        let annotation = match annotator.annotate(variant, transcript, reference) {
            Ok(annotation) => annotation,
            Err(e) => {
                warn!(transcript = %transcript.id, variant = %variant, "annotation failed: {e}");
                continue;
            }
        };

        let line = TranscriptLine {
            variant: &fields,
            gene: transcripts.gene(transcript).map(|g| g.symbol.as_str()),
            annotation: &annotation,
        };
        serde_json::to_writer(&mut *writer, &line)?;
        writeln!(writer)?;
        written += 1;
    }

    if written == 0 {
        debug!(variant = %variant, "no transcripts within flanking window");
        let line = IntergenicLine {
            variant: &fields,
            consequence: [ConsequenceTerm::IntergenicVariant],
        };
        serde_json::to_writer(&mut *writer, &line)?;
        writeln!(writer)?;
    }

    Ok(written)
}

/// Parses `chromosome  position  ref  alt`. Comment and blank lines yield `None`.
/// `-` and `.` denote an empty allele; shared padding bases are trimmed later by normalization.
fn parse_variant_line(line: &str) -> Result<Option<SimpleVariant>> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 4 {
        bail!("expected 4 tab-delimited columns, found {}", fields.len());
    }

    let chromosome = fields[0].trim();
    let position: i32 = fields[1]
        .trim()
        .parse()
        .with_context(|| format!("invalid position '{}'", fields[1]))?;
    if position < 1 {
        bail!("position must be positive, got {position}");
    }

    let ref_allele = parse_allele(fields[2])?;
    let alt_allele = parse_allele(fields[3])?;
    if ref_allele.is_empty() && alt_allele.is_empty() {
        bail!("both alleles are empty");
    }

    Ok(Some(SimpleVariant::new(chromosome, position, ref_allele, alt_allele)))
}

fn parse_allele(field: &str) -> Result<&str> {
    let allele = field.trim();
    if allele == "-" || allele == "." {
        return Ok("");
    }
    if !allele.bytes().all(|b| matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N')) {
        bail!("unsupported allele '{allele}'");
    }
    Ok(allele)
}
