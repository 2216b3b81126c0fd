//! zeichen - count the characters of documents, including text inside images.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeichen::core::mime::LEGACY_EXTENSIONS;
use zeichen::{
    AnalysisConfig, Analyzer, ChannelProgressSink, DocumentAnalysis, DocumentFormat, PreprocessingStage, ProgressScope,
    QualityTier, RecognitionLanguages,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable table
    Text,
    /// The full analysis as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "zeichen", version)]
#[command(about = "Count native and OCR-recognized characters in documents", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count the characters of a document
    Count {
        /// Document to analyze (.pptx, .docx, .xlsx, .pdf, .txt or an image)
        file: PathBuf,

        /// Configuration file (.toml, .yaml or .json); zeichen.toml is discovered otherwise
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Recognition languages, e.g. kor+eng
        #[arg(short, long)]
        languages: Option<String>,

        /// Recognition quality: fast, balanced or accurate
        #[arg(short, long)]
        quality: Option<String>,

        /// Preprocessing stages (comma-separated): grayscale, denoise, binarize, morphology, deskew
        #[arg(short, long, value_delimiter = ',')]
        preprocess: Vec<String>,

        /// Count whitespace as characters
        #[arg(long)]
        include_whitespace: bool,

        /// Skip recognition of embedded images
        #[arg(long)]
        no_ocr: bool,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Print recognized text under each unit, verbatim (markup is not escaped
        /// on a terminal; use recognized_text_html() when embedding it in HTML)
        #[arg(long)]
        show_text: bool,

        /// Do not print progress to stderr
        #[arg(long)]
        quiet: bool,
    },

    /// Print the effective configuration as JSON
    Config {
        /// Configuration file; zeichen.toml is discovered otherwise
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List supported and rejected file formats
    Formats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Count {
            file,
            config,
            languages,
            quality,
            preprocess,
            include_whitespace,
            no_ocr,
            format,
            show_text,
            quiet,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(languages) = languages {
                config.ocr.languages = languages.parse::<RecognitionLanguages>()?;
            }
            if let Some(quality) = quality {
                config.ocr.quality = quality.parse::<QualityTier>()?;
            }
            for stage in &preprocess {
                config.preprocessing.stages.insert(stage.parse::<PreprocessingStage>()?);
            }
            if include_whitespace {
                config.include_whitespace_in_totals = true;
            }
            if no_ocr {
                config.ocr.enabled = false;
            }

            let analysis = count(&file, config, !quiet && std::io::stderr().is_terminal()).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
                OutputFormat::Text => print_analysis(&analysis, show_text),
            }
            Ok(())
        }

        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }

        Commands::Formats => {
            println!("Supported:");
            for format in DocumentFormat::ALL {
                let extensions: Vec<String> = format.extensions().iter().map(|e| format!(".{}", e)).collect();
                println!("  {:<6} {}", format.as_str(), extensions.join(" "));
            }
            println!("Rejected (convert first):");
            for (legacy, modern) in LEGACY_EXTENSIONS {
                println!("  .{:<5} -> .{}", legacy, modern);
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "zeichen=debug" } else { "zeichen=warn" };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            AnalysisConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
        }
        None => {
            let discovered = AnalysisConfig::discover()?;
            if discovered.is_none() {
                tracing::debug!("No zeichen.toml found, using defaults");
            }
            Ok(discovered.unwrap_or_default())
        }
    }
}

async fn count(file: &Path, config: AnalysisConfig, show_progress: bool) -> Result<DocumentAnalysis> {
    let analyzer = Analyzer::new(config)?;

    if !show_progress {
        return Ok(analyzer.analyze_file(file, &ProgressScope::noop()).await?);
    }

    let (sink, mut rx) = ChannelProgressSink::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            eprint!("\r\x1b[2K[{:>3.0}%] {}", event.percent, event.message);
        }
        eprintln!();
    });

    let progress = ProgressScope::root(Arc::new(sink));
    let result = analyzer.analyze_file(file, &progress).await;
    drop(progress);
    printer.await.context("progress printer failed")?;

    Ok(result?)
}

fn print_analysis(analysis: &DocumentAnalysis, show_text: bool) {
    println!("{} ({})", analysis.file_name, analysis.format);
    println!();

    let width = analysis.units.iter().map(|u| u.label.chars().count()).max().unwrap_or(0).max(4);
    println!(
        "{:<width$}  {:>8}  {:>10}  {:>6}  {:>8}",
        "Unit",
        "Native",
        "Recognized",
        "Images",
        "Total",
        width = width
    );
    for unit in &analysis.units {
        println!(
            "{:<width$}  {:>8}  {:>10}  {:>6}  {:>8}",
            unit.label,
            unit.native_text_char_count,
            unit.recognized_char_count,
            unit.image_count,
            unit.total_char_count(),
            width = width
        );
        if show_text && !unit.recognized_text.is_empty() {
            for line in unit.recognized_text.lines() {
                println!("    | {}", line);
            }
        }
    }

    println!();
    println!("Native text:      {}", analysis.total_native_text_chars);
    println!("Recognized text:  {}", analysis.total_recognized_chars);
    println!("Total characters: {}", analysis.total_chars);
    println!("Whitespace:       {}", analysis.total_whitespace);
    println!(
        "Images:           {} ({} recognized, {} cache hits)",
        analysis.total_images(),
        analysis.cache_stats.misses,
        analysis.cache_stats.hits
    );
}
