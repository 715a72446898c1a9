//! pdfyard CLI - PDF margin, image and print tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfyard::extract::{upload_base_name, write_images};
use pdfyard::print::{print_url, Paper, PrintOptions, PrintOutcome};
use pdfyard::{
    DocumentInfo, ExtractOptions, ImageExtractor, MarginInserter, MarginOptions, PageSelection,
};

#[derive(Parser)]
#[command(name = "pdfyard")]
#[command(version)]
#[command(about = "Add margins to PDFs, extract their images, print web pages to PDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enlarge every page by a margin, keeping the content unscaled
    Margin {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to <name>_margin.pdf next to the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Margin on each side, in pixels (1px = 0.75pt)
        #[arg(short, long, default_value = "15")]
        margin: f32,

        /// Process pages one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Extract embedded images as PNG
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Fail on the first image that cannot be decoded
        #[arg(long)]
        strict: bool,
    },

    /// Print a web page to PDF with headless Chromium
    Print {
        /// Page URL
        #[arg(value_name = "URL")]
        url: String,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Add margins to the printed PDF
        #[arg(long)]
        add_margin: bool,

        /// Margin on each side, in pixels
        #[arg(long, default_value = "15")]
        margin_px: f32,

        /// Load the page without producing a PDF
        #[arg(long)]
        no_print: bool,

        /// Paper size
        #[arg(long, value_enum, default_value = "a5")]
        paper: PaperSize,

        /// Navigation timeout in seconds
        #[arg(long, default_value = "1200")]
        timeout_secs: u64,

        /// Chromium executable
        #[arg(long, value_name = "PATH", env = "PDFYARD_CHROME")]
        chrome: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PaperSize {
    A4,
    A5,
    Letter,
}

impl From<PaperSize> for Paper {
    fn from(size: PaperSize) -> Self {
        match size {
            PaperSize::A4 => Paper::A4,
            PaperSize::A5 => Paper::A5,
            PaperSize::Letter => Paper::Letter,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Margin {
            input,
            output,
            margin,
            sequential,
        } => cmd_margin(&input, output.as_deref(), margin, sequential),
        Commands::Extract {
            input,
            output,
            pages,
            strict,
        } => cmd_extract(&input, output.as_deref(), pages.as_deref(), strict),
        Commands::Print {
            url,
            output,
            add_margin,
            margin_px,
            no_print,
            paper,
            timeout_secs,
            chrome,
        } => {
            let mut options = PrintOptions::new()
                .with_print(!no_print)
                .with_add_margin(add_margin)
                .with_paper(paper.into())
                .with_navigation_timeout(Duration::from_secs(timeout_secs));
            options.margin_px = margin_px;
            if let Some(dir) = output {
                options = options.with_output_dir(dir);
            }
            if let Some(path) = chrome {
                options = options.with_chrome_executable(path);
            }
            cmd_print(&url, &options)
        }
        Commands::Info { input, json } => cmd_info(&input, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// `<dir>/<stem>_margin.pdf` for an input `<dir>/<stem>.pdf`.
fn default_margin_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{}_margin.pdf", stem))
}

fn spinner(message: &'static str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn cmd_margin(
    input: &Path,
    output: Option<&Path>,
    margin: f32,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_margin_output(input));

    let options = MarginOptions::new()
        .with_margin_px(margin)
        .with_parallel(!sequential);

    let pb = spinner("Adding margins...")?;
    let report = MarginInserter::new(options).insert_file(input, &output);
    pb.finish_and_clear();
    let report = report?;

    println!(
        "{} {} pages, {}pt margin",
        "Done!".green().bold(),
        report.page_count(),
        report.margin_pt
    );
    for page in &report.pages {
        println!(
            "  {} page {}: {}x{} -> {}x{}",
            "├─".dimmed(),
            page.index + 1,
            page.original_width,
            page.original_height,
            page.width,
            page.height
        );
    }
    println!("{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    pages: Option<&str>,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
    } else {
        PageSelection::All
    };

    let mut options = ExtractOptions::new().with_pages(page_selection);
    if strict {
        options = options.strict();
    }

    let data = fs::read(input)?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base_name = upload_base_name(&file_name, &data);

    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));

    let pb = spinner("Extracting images...")?;
    let images = ImageExtractor::new(options).extract_bytes(&data);
    pb.finish_and_clear();
    let images = images?;

    let names = write_images(&images, &output_dir, &base_name)?;
    for name in &names {
        println!("{} {}", "Extracted".green(), name);
    }

    println!("\n{} {} images extracted", "Done!".green().bold(), names.len());

    Ok(())
}

fn cmd_print(url: &str, options: &PrintOptions) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    let pb = spinner("Printing page...")?;
    let outcome = rt.block_on(print_url(url, options));
    pb.finish_and_clear();

    match outcome? {
        PrintOutcome::Saved { filename, path } => {
            println!("{} {}", "Printed".green().bold(), filename);
            println!("{} {}", "Saved to".green(), path.display());
        }
        PrintOutcome::Skipped => {
            println!("{}", "Page loaded, printing disabled".yellow());
        }
    }

    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let info = DocumentInfo::from_file(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), info.version);
    println!("{}: {}", "Pages".bold(), info.page_count);
    println!("{}: {}", "Images".bold(), info.image_count);

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for page in &info.pages {
        let rotation = if page.rotation == 0 {
            String::new()
        } else {
            format!(" (rotated {})", page.rotation)
        };
        println!(
            "  {} {}x{}pt{}",
            format!("{:>4}", page.index + 1).bold(),
            page.width,
            page.height,
            rotation
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfyard".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF margin, image and print tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_margin_output() {
        assert_eq!(
            default_margin_output(Path::new("docs/report.pdf")),
            PathBuf::from("docs/report_margin.pdf")
        );
        assert_eq!(
            default_margin_output(Path::new("scan")),
            PathBuf::from("scan_margin.pdf")
        );
    }

    #[test]
    fn test_cli_parses_margin() {
        let cli = Cli::try_parse_from(["pdfyard", "margin", "in.pdf", "-m", "20"]).unwrap();
        match cli.command {
            Commands::Margin { margin, output, .. } => {
                assert_eq!(margin, 20.0);
                assert!(output.is_none());
            }
            _ => panic!("expected margin command"),
        }
    }

    #[test]
    fn test_cli_print_defaults() {
        let cli = Cli::try_parse_from(["pdfyard", "print", "https://example.com"]).unwrap();
        match cli.command {
            Commands::Print {
                add_margin,
                no_print,
                timeout_secs,
                paper,
                ..
            } => {
                assert!(!add_margin);
                assert!(!no_print);
                assert_eq!(timeout_secs, 1200);
                assert!(paper == PaperSize::A5);
            }
            _ => panic!("expected print command"),
        }
    }
}
