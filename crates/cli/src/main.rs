//! CLI tool for extracting narration-ready slide units from Beamer decks.

use anyhow::{Context, Result};
use beamer_core::{SlideDeck, SlideListingFormatter, SourceFormat};
use beamer_pdf::{PdfInfoProbe, PdfTextParser, PdfToText, ToolOptions};
use beamer_tex::{AlignmentPolicy, ProportionalPolicy, TexParser, TruncatePolicy};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Output encoding of an extracted deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `--- Slide N: Title ---` blocks
    Text,
    /// The whole deck, notices included, as JSON
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "slides.txt",
            OutputFormat::Json => "slides.json",
        }
    }
}

/// How content frames are spread over rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// A frame rendered on several pages owns several slides
    Proportional,
    /// One frame per page; surplus frames dropped, missing ones padded
    Truncate,
}

impl Policy {
    fn build(self) -> Box<dyn AlignmentPolicy> {
        match self {
            Policy::Proportional => Box::new(ProportionalPolicy),
            Policy::Truncate => Box::new(TruncatePolicy),
        }
    }
}

/// Extract slide units from Beamer sources (.tex) or rendered decks (.pdf).
#[derive(Parser, Debug)]
#[command(name = "beamer-extract")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s) (.tex or .pdf)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Alignment policy for .tex sources
    #[arg(long, value_enum, default_value_t = Policy::Proportional)]
    policy: Policy,

    /// Directory holding rendered PDFs, searched after the source's own directory
    #[arg(short, long)]
    render_dir: Option<PathBuf>,

    /// Timeout in seconds for each external tool call
    #[arg(short, long, default_value = "60")]
    timeout: u64,

    /// Path to the pdfinfo executable
    #[arg(long, default_value = "pdfinfo")]
    pdfinfo: PathBuf,

    /// Path to the pdftotext executable
    #[arg(long, default_value = "pdftotext")]
    pdftotext: PathBuf,

    /// Draw a rule under each slide in text output
    #[arg(long)]
    rule: bool,

    /// For .pdf input, add an Outline slide when page 2 is not one
    #[arg(long)]
    synthesize_outline: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn tool_options(&self) -> ToolOptions {
        ToolOptions::default()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_pdfinfo(&self.pdfinfo)
            .with_pdftotext(&self.pdftotext)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let formatter = SlideListingFormatter::new().with_rule(args.rule);
    let mut failures = 0;

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &args, &formatter) {
            Ok(output) => {
                if args.print {
                    print!("{}", output);
                } else {
                    let output_path = get_output_path(input_path, args.output.as_ref(), args.format)?;
                    write_output(&output_path, &output)?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} file(s) failed", failures, args.input.len());
    }
    Ok(())
}

/// Process a single source file.
fn process_file(input_path: &Path, args: &Args, formatter: &SlideListingFormatter) -> Result<String> {
    let format = detect_format(input_path)?;
    let deck = parse_deck(input_path, format, args)?;

    if args.verbose {
        eprintln!(
            "  {} slides ({} page count), {} notice(s)",
            deck.len(),
            if deck.page_count.is_authoritative() { "rendered" } else { "estimated" },
            deck.notices.len()
        );
    }

    match args.format {
        OutputFormat::Text => Ok(formatter.format_with_newline(&deck.slides)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&deck)
                .with_context(|| format!("Failed to serialize {}", deck.filename))?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Detect the source format from magic bytes, then the extension.
fn detect_format(input_path: &Path) -> Result<SourceFormat> {
    let file = File::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;
    let mut reader = BufReader::new(file);

    // Short files are fine; a .tex may be smaller than the header.
    let mut magic = Vec::with_capacity(8);
    reader
        .by_ref()
        .take(8)
        .read_to_end(&mut magic)
        .with_context(|| "Failed to read file header")?;

    SourceFormat::from_magic(&magic)
        .or_else(|| {
            input_path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(SourceFormat::from_extension)
        })
        .ok_or_else(|| anyhow::anyhow!("Could not detect file format"))
}

fn parse_deck(input_path: &Path, format: SourceFormat, args: &Args) -> Result<SlideDeck> {
    let deck = match format {
        SourceFormat::Latex => {
            log::debug!("Parsing as Beamer source");
            let mut parser = TexParser::new()
                .with_probe(Box::new(PdfInfoProbe::new(args.tool_options())))
                .with_policy(args.policy.build());
            if let Some(dir) = &args.render_dir {
                parser = parser.with_render_dir(dir);
            }
            parser.parse_file(input_path)?
        }
        SourceFormat::Pdf => {
            log::debug!("Parsing as rendered PDF");
            PdfTextParser::new(Box::new(PdfToText::new(args.tool_options())))
                .with_synthesized_outline(args.synthesize_outline)
                .parse(input_path)?
        }
    };
    Ok(deck)
}

/// Determine the output path for a processed file.
fn get_output_path(
    input_path: &Path,
    output_dir: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.{}", stem, format.extension());

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => match input_path.parent() {
            Some(parent) => parent.join(output_filename),
            None => PathBuf::from(output_filename),
        },
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
