//! # CLI Module
//!
//! Command-line interface for the barcode scanning core.
//!
//! ## Usage
//! ```bash
//! # Scan images or directories
//! lumiscan scan ~/Pictures/receipts
//!
//! # Only look for QR and EAN-13 codes
//! lumiscan scan ticket.jpg --formats qr,ean13
//!
//! # JSON output with geometry as fractions of the image size
//! lumiscan scan ~/Pictures --output json --normalized
//!
//! # Classify a payload without an image
//! lumiscan classify "geo:37.7,-122.4"
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use lumiscan::core::barcode::{CoordinateSpace, DetectionPayload};
use lumiscan::core::classifier::classify;
use lumiscan::core::discovery::{DiscoveryConfig, WalkDirDiscovery};
use lumiscan::core::format::BarcodeFormat;
use lumiscan::core::imaging::ImageSource;
use lumiscan::core::pipeline::StaticScanner;
use lumiscan::core::recognizer::QrRecognizer;
use lumiscan::error::{LumiscanError, Result};
use lumiscan::events::{Event, EventChannel, StaticScanEvent};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

/// lumiscan - Find and classify barcodes in images
#[derive(Parser, Debug)]
#[command(name = "lumiscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan image files or directories for barcodes
    Scan {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Comma separated formats to look for (e.g. qr,ean13); default all
        #[arg(short, long)]
        formats: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Report geometry as fractions of the image size
        #[arg(long)]
        normalized: bool,

        /// Ignore the EXIF orientation tag
        #[arg(long)]
        no_orientation: bool,

        /// Include hidden files
        #[arg(long)]
        include_hidden: bool,

        /// Verbose output and debug logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Classify a decoded payload and print its value type
    Classify {
        /// Payload text, e.g. a URL or WIFI:... string
        text: String,
    },

    /// List canonical format flags
    Formats,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (path and value per code)
    Minimal,
}

/// Outcome for one scanned file
#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    /// None when every scale was tried without a detection
    barcodes: Option<Vec<DetectionPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Options for the scan subcommand
struct ScanOptions {
    paths: Vec<PathBuf>,
    formats: BarcodeFormat,
    output: OutputFormat,
    coordinate_space: CoordinateSpace,
    apply_orientation: bool,
    include_hidden: bool,
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            paths,
            formats,
            output,
            normalized,
            no_orientation,
            include_hidden,
            verbose,
        } => {
            let formats = match formats {
                Some(names) => names
                    .parse::<BarcodeFormat>()
                    .map_err(|e| LumiscanError::Config(e.to_string()))?,
                None => BarcodeFormat::ALL,
            };
            run_scan(ScanOptions {
                paths,
                formats,
                output,
                coordinate_space: if normalized {
                    CoordinateSpace::Normalized
                } else {
                    CoordinateSpace::Pixel
                },
                apply_orientation: !no_orientation,
                include_hidden,
                verbose,
            })
        }
        Commands::Classify { text } => {
            println!("{}", serde_json::to_string_pretty(&classify(Some(&text)))?);
            Ok(())
        }
        Commands::Formats => {
            print_formats(&Term::stdout());
            Ok(())
        }
    }
}

fn run_scan(options: ScanOptions) -> Result<()> {
    if options.verbose {
        lumiscan::init_tracing();
    }

    let term = Term::stderr();
    let pretty = matches!(options.output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("lumiscan").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let start_time = Instant::now();

    let discovery = WalkDirDiscovery::new(DiscoveryConfig {
        include_hidden: options.include_hidden,
        ..Default::default()
    });
    let found = discovery.discover(&options.paths);

    for error in &found.errors {
        term.write_line(&format!("{} {}", style("!").yellow().bold(), error))
            .ok();
    }

    let scanner = StaticScanner::builder(QrRecognizer::new())
        .formats(options.formats)
        .coordinate_space(options.coordinate_space)
        .apply_orientation(options.apply_orientation)
        .build();

    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if pretty {
        let pb = ProgressBar::new(found.images.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = options.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Static(StaticScanEvent::Started { source, .. }) if verbose => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(display_path(Path::new(&source)));
                    }
                }
                Event::Static(StaticScanEvent::StepFailed { ordinal, message, .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.println(format!("  step {} failed: {}", ordinal, message));
                    }
                }
                _ => {}
            }
        }
    });

    // Files in parallel; each cascade stays sequential
    let reports: Vec<FileReport> = found
        .images
        .par_iter()
        .map(|path| {
            let result = scanner.scan_with_events(&ImageSource::Path(path.clone()), &sender);
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
            match result {
                Ok(barcodes) => FileReport {
                    path: path.clone(),
                    barcodes: barcodes
                        .map(|codes| codes.iter().map(|code| code.to_payload()).collect()),
                    error: None,
                },
                Err(e) => FileReport {
                    path: path.clone(),
                    barcodes: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    match options.output {
        OutputFormat::Pretty => print_pretty_results(&term, &reports, start_time, options.verbose),
        OutputFormat::Json => print_json_results(&reports)?,
        OutputFormat::Minimal => print_minimal_results(&reports),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, reports: &[FileReport], start_time: Instant, verbose: bool) {
    let with_codes = reports.iter().filter(|r| r.barcodes.is_some()).count();
    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    let total_codes: usize = reports
        .iter()
        .filter_map(|r| r.barcodes.as_ref())
        .map(Vec::len)
        .sum();

    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(reports.len()).cyan(),
        start_time.elapsed().as_secs_f64()
    ))
    .ok();
    term.write_line(&format!(
        "  {} codes found in {} images",
        style(total_codes).cyan(),
        style(with_codes).cyan()
    ))
    .ok();
    if failed > 0 {
        term.write_line(&format!("  {} images could not be read", style(failed).red()))
            .ok();
    }
    term.write_line("").ok();

    for report in reports {
        match (&report.barcodes, &report.error) {
            (_, Some(error)) => {
                term.write_line(&format!(
                    "  {} {}",
                    style("✗").red(),
                    display_path(&report.path)
                ))
                .ok();
                term.write_line(&format!("    {}", style(error).dim())).ok();
            }
            (Some(codes), None) => {
                term.write_line(&format!(
                    "  {} {}",
                    style("★").green(),
                    style(display_path(&report.path)).bold()
                ))
                .ok();
                for code in codes {
                    term.write_line(&format!(
                        "    {} {} {}",
                        style(format!("[{}]", code.format)).yellow(),
                        style(code.value_type.label()).cyan(),
                        code.raw_value.as_deref().unwrap_or("<unreadable>")
                    ))
                    .ok();
                    if verbose {
                        if let Some(rect) = code.bounding_box {
                            term.write_line(&format!(
                                "      {}",
                                style(format!(
                                    "box ({:.1}, {:.1}) - ({:.1}, {:.1})",
                                    rect.left, rect.top, rect.right, rect.bottom
                                ))
                                .dim()
                            ))
                            .ok();
                        }
                    }
                }
            }
            (None, None) if verbose => {
                term.write_line(&format!(
                    "  {} {}",
                    style("○").dim(),
                    style(display_path(&report.path)).dim()
                ))
                .ok();
            }
            (None, None) => {}
        }
    }
}

fn print_json_results(reports: &[FileReport]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(reports)?);
    Ok(())
}

fn print_minimal_results(reports: &[FileReport]) {
    for report in reports {
        for code in report.barcodes.iter().flatten() {
            if let Some(value) = &code.raw_value {
                println!("{}\t{}", report.path.display(), value);
            }
        }
    }
}

fn print_formats(term: &Term) {
    for flag in BarcodeFormat::FLAGS {
        term.write_line(&format!(
            "{:>6}  {}",
            style(flag.bits()).cyan(),
            flag.name().unwrap_or_default()
        ))
        .ok();
    }
    term.write_line(&format!(
        "{:>6}  {}",
        style(BarcodeFormat::ALL.bits()).cyan(),
        style("all").dim()
    ))
    .ok();
}

/// Shorten paths under the home directory to `~/...`
fn display_path(path: &Path) -> String {
    dirs::home_dir()
        .and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf))
        .map(|rest| format!("~/{}", rest.display()))
        .unwrap_or_else(|| path.display().to_string())
}
