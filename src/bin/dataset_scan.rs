use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use url::Url;

use dataset_scraper::navigation::plan_next_step;
use dataset_scraper::{ExportFormat, Page, PageScanner, ScanConfig};

#[derive(Parser)]
#[command(name = "dataset-scan")]
#[command(about = "Find tables, lists and card grids in an HTML page")]
#[command(version)]
struct Cli {
    /// TOML file overriding scanner defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every dataset found in the page
    Scan {
        file: PathBuf,
    },
    /// Print one dataset as CSV or JSON
    Export {
        file: PathBuf,
        /// 1-based position in the scan listing
        #[arg(short, long, default_value_t = 1)]
        dataset: usize,
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// Comma-separated replacement headers
        #[arg(long)]
        headers: Option<String>,
    },
    /// Show the control that would advance pagination
    Next {
        file: PathBuf,
        /// Page URL used to resolve relative links
        #[arg(long)]
        url: Option<Url>,
    },
    /// Print the page's visible text
    Snapshot {
        file: PathBuf,
        #[arg(long)]
        max_chars: Option<usize>,
    },
}

fn read_page(file: &Path) -> Result<Page> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    Ok(Page::new(html))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    let mut scanner = PageScanner::new(config);

    match cli.command {
        Commands::Scan { file } => {
            let page = read_page(&file)?;
            let report = scanner.scan(&page.parse());
            let limit = scanner.config().preview_rows;
            let previews: Vec<_> = report.datasets.iter().map(|d| d.preview(limit)).collect();
            println!("{}", serde_json::to_string_pretty(&previews)?);
        }
        Commands::Export {
            file,
            dataset,
            format,
            headers,
        } => {
            let format: ExportFormat = format.parse()?;
            let page = read_page(&file)?;
            let report = scanner.scan(&page.parse());
            let Some(target) = dataset.checked_sub(1).and_then(|i| report.datasets.get(i)) else {
                bail!("no dataset #{} ({} found)", dataset, report.datasets.len());
            };
            let id = target.id.clone();
            info!(%id, %format, "exporting");

            if let Some(headers) = headers {
                let headers: Vec<String> = headers.split(',').map(String::from).collect();
                scanner.update_headers(&id, &headers, Some(report.scan))?;
            }
            println!("{}", scanner.export(&id, format, Some(report.scan))?);
        }
        Commands::Next { file, url } => {
            let page = read_page(&file)?;
            match plan_next_step(&page.parse(), url.as_ref()) {
                Some(step) => println!("{}", serde_json::to_string_pretty(&step)?),
                None => bail!("No next or load more button found."),
            }
        }
        Commands::Snapshot { file, max_chars } => {
            let page = read_page(&file)?;
            println!("{}", scanner.context_snapshot(&page.parse(), max_chars));
        }
    }

    Ok(())
}
