//! etax CLI
//!
//! Thin adapter over `etax-core`.
//!
//! # Commands
//!
//! - `genpdf <xmlFile>`: render a tax statement into a barcode PDF
//! - `validate <pdfFile>`: recover the statement from a PDF and validate it
//!
//! Exit codes: 0 success, 2 file not found, 3 processing error or invalid
//! document, 4 required field missing.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{info, warn, LevelFilter};

use etax_core::constants::DEFAULT_SCHEMA_FILE;
use etax_core::io::write_all;
use etax_core::prelude::*;

mod exit;

use exit::{exit_code_for_error, issue_kind_of, CliExitCode};

/// eCH-0196 barcode PDF generator and validator
#[derive(Parser)]
#[command(name = "etax")]
#[command(version)]
#[command(about = "Render and validate eCH-0196 tax statement barcode PDFs")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an eCH-0196 XML statement into a barcode PDF
    Genpdf {
        /// Statement XML
        xml_file: PathBuf,

        /// Output PDF; defaults to `<stem>.pdf` next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Produce the chunked/gzip generation
        #[arg(long)]
        legacy: bool,

        /// Fail with exit code 4 when the statement has no clientNumber
        #[arg(long)]
        require_client: bool,

        /// Wire variant (direct | chunked); ignored with --legacy
        #[arg(long)]
        variant: Option<WireVariant>,

        /// Compressed bytes per direct-variant symbol; rejected for chunked, ignored with --legacy
        #[arg(long)]
        capacity: Option<usize>,

        /// Compression scheme (zlib | gzip); ignored with --legacy
        #[arg(long)]
        compression: Option<CompressionScheme>,
    },
    /// Extract and validate the statement carried by a barcode PDF
    Validate {
        pdf_file: PathBuf,

        /// XSD to validate against; auto-detected when omitted
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Read symbols as-is, without the contrast/upscale/binarize retries
        #[arg(long)]
        no_transforms: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Genpdf {
            xml_file,
            output,
            legacy,
            require_client,
            variant,
            capacity,
            compression,
        } => {
            let profile = genpdf_profile(legacy, variant, capacity, compression);
            genpdf(&xml_file, output, &profile, require_client)
        }
        Commands::Validate { pdf_file, schema, json, no_transforms } => {
            let profile = if no_transforms {
                CodecProfile::default().with_transforms(Vec::new())
            } else {
                CodecProfile::default()
            };
            validate(&pdf_file, schema, json, &profile)
        }
    };

    let code = match outcome {
        Ok(code) => code,
        Err(err) => {
            match issue_kind_of(&err) {
                Some(kind) => eprintln!("Error [{}]: {:#}", kind, err),
                None => eprintln!("Error: {:#}", err),
            }
            exit_code_for_error(&err)
        }
    };
    code.into()
}

/// `--legacy` wins over single-field overrides, which are then logged as dropped.
fn genpdf_profile(
    legacy: bool,
    variant: Option<WireVariant>,
    capacity: Option<usize>,
    compression: Option<CompressionScheme>,
) -> CodecProfile {
    if !legacy {
        return CodecProfile::new(variant, capacity, compression);
    }
    if variant.is_some() || capacity.is_some() || compression.is_some() {
        warn!("--variant, --capacity and --compression are ignored with --legacy");
    }
    CodecProfile::legacy()
}

fn ensure_exists(path: &Path) -> Result<(), CliExitCode> {
    if path.is_file() {
        Ok(())
    } else {
        eprintln!("Error: file not found: {}", path.display());
        Err(CliExitCode::NotFound)
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("statement");
    path.with_file_name(format!("{}{}", stem, suffix))
}

fn genpdf(
    xml_file: &Path,
    output: Option<PathBuf>,
    profile: &CodecProfile,
    require_client: bool,
) -> anyhow::Result<CliExitCode> {
    if let Err(code) = ensure_exists(xml_file) {
        return Ok(code);
    }

    let payload =
        std::fs::read_to_string(xml_file).with_context(|| format!("reading {}", xml_file.display()))?;
    let params = EncodeParams { require_client, ..EncodeParams::default() };

    let encoded = encode_document(&payload, profile, &params)
        .with_context(|| format!("encoding {}", xml_file.display()))?;

    let output = output.unwrap_or_else(|| sibling(xml_file, ".pdf"));
    write_all(OutputSink::File(output.clone()), &encoded.pdf)
        .with_context(|| format!("writing {}", output.display()))?;

    info!("stages: {}", encoded.telemetry.stage_times);
    println!(
        "Wrote {} ({} pages, {} symbols, document {})",
        output.display(),
        encoded.page_count,
        encoded.segment_count,
        encoded.document_id
    );
    Ok(CliExitCode::Success)
}

/// Explicit path, else the default schema in the working directory, else
/// next to the PDF.
fn resolve_schema(explicit: Option<PathBuf>, pdf_file: &Path) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    let in_cwd = PathBuf::from(DEFAULT_SCHEMA_FILE);
    if in_cwd.is_file() {
        return Some(in_cwd);
    }
    let beside = pdf_file.with_file_name(DEFAULT_SCHEMA_FILE);
    beside.is_file().then_some(beside)
}

fn validate(
    pdf_file: &Path,
    schema: Option<PathBuf>,
    json: bool,
    profile: &CodecProfile,
) -> anyhow::Result<CliExitCode> {
    if let Err(code) = ensure_exists(pdf_file) {
        return Ok(code);
    }

    let mut params = DecodeParams::default();
    if let Some(schema) = resolve_schema(schema, pdf_file) {
        info!("validating against {}", schema.display());
        params = params.with_schema(schema);
    }

    let result = decode_document(InputSource::File(pdf_file.to_path_buf()), profile, &params)
        .with_context(|| format!("decoding {}", pdf_file.display()))?;

    if json {
        println!("{}", result.to_json()?);
    } else {
        print!("{}", result.summary());
    }

    if let Some(payload) = &result.extracted_payload {
        let out = sibling(pdf_file, "-extracted.xml");
        write_all(OutputSink::File(out.clone()), payload.as_bytes())
            .with_context(|| format!("writing {}", out.display()))?;
        if !json {
            println!("Extracted payload written to {}", out.display());
        }
    }

    Ok(if result.is_valid { CliExitCode::Success } else { CliExitCode::Invalid })
}
