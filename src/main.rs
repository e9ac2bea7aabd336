//! # Audit PDF CLI
//!
//! Usage:
//!   audit-pdf results.json -o reports/
//!   cat results.json | audit-pdf --locale fr_FR --translations i18n/
//!   audit-pdf results.json --config report.json --logo logo.png

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use audit_pdf::{parse_result_tree, DirectorySink, ReportConfig, ReportError};

#[derive(Parser, Debug)]
#[command(name = "audit-pdf", version, about = "Render audit results as a paginated PDF report")]
struct Cli {
    /// Result tree as JSON. Read from stdin when omitted.
    input: Option<PathBuf>,
    #[arg(long, default_value = "en_US", help = "Requested locale, e.g. fr_FR")]
    locale: String,
    #[arg(long, help = "Report config JSON (title, logo, outputName, ...)")]
    config: Option<PathBuf>,
    #[arg(short, long = "output-dir", default_value = ".", help = "Directory the PDF is written to")]
    output_dir: PathBuf,
    #[arg(long, help = "Directory of <locale>.csv translation catalogs")]
    translations: Option<PathBuf>,
    #[arg(long, help = "Header logo: image path or data URI")]
    logo: Option<String>,
    #[arg(long, help = "Report title, overrides the config file")]
    title: Option<String>,
    #[arg(long, default_value_t = false, help = "Skip the summary page")]
    no_cover: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("audit_pdf=info")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(path) => {
            eprintln!("✓ Written {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<PathBuf, ReportError> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    if let Some(title) = cli.title {
        config.title = title;
    }
    if cli.logo.is_some() {
        config.logo = cli.logo;
    }
    if cli.translations.is_some() {
        config.translations = cli.translations;
    }
    if cli.no_cover {
        config.cover_page = false;
    }

    let input = match &cli.input {
        Some(path) => fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| ReportError::Io {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            buf
        }
    };

    let tree = parse_result_tree(&input)?;
    audit_pdf::generate(&tree, &cli.locale, &config, &DirectorySink::new(cli.output_dir))
}
