//! paperfig CLI - figure, caption and section extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use paperfig::model::{Document, GraphicsRegion};
use paperfig::{
    load_pages_file, DiagnosticLogger, FigureExtractor, JsonFormat, LogDiagnostics, Page,
    PageSelection, ParseOptions, RenderOptions,
};

#[derive(Parser)]
#[command(name = "paperfig")]
#[command(version)]
#[command(about = "Extract figures, tables and sections from paper page layouts", long_about = None)]
struct Cli {
    /// Input page JSON file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Flags shared by every command that runs the pipeline.
#[derive(Args, Clone, Default)]
struct ParseArgs {
    /// Accept pages whose text is only invisible OCR text
    #[arg(
        long,
        env = "PAPERFIG_ALLOW_OCR",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    allow_ocr: bool,

    /// Treat near-white fills as graphics
    #[arg(long)]
    keep_white_graphics: bool,

    /// Detect section titles before captions
    #[arg(long)]
    titles_first: bool,

    /// Do not join paragraphs split across columns and pages
    #[arg(long)]
    no_rebuild: bool,

    /// Pages to search for figures, 0-indexed (e.g., "0-9", "0,2,4")
    #[arg(long)]
    pages: Option<String>,

    /// Process pages one at a time
    #[arg(long)]
    sequential: bool,

    /// Log per-page intermediate results (use with RUST_LOG=debug)
    #[arg(long)]
    diagnostics: bool,
}

impl ParseArgs {
    fn to_options(&self) -> Result<ParseOptions, Box<dyn std::error::Error>> {
        let pages = match self.pages.as_deref() {
            Some(p) => PageSelection::parse(p)
                .map_err(|e| paperfig::Error::InvalidPageRange(e.to_string()))?,
            None => PageSelection::All,
        };

        Ok(ParseOptions::new()
            .with_allow_ocr(self.allow_ocr)
            .with_ignore_white_graphics(!self.keep_white_graphics)
            .with_section_titles_first(self.titles_first)
            .with_rebuild_paragraphs(!self.no_rebuild)
            .with_parallel(!self.sequential)
            .with_pages(pages))
    }

    fn extractor(&self) -> Result<FigureExtractor, Box<dyn std::error::Error>> {
        let extractor = FigureExtractor::new(self.to_options()?);
        Ok(if self.diagnostics {
            extractor.with_diagnostics(Arc::new(LogDiagnostics))
        } else {
            extractor
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write figures, Markdown, text and JSON to a directory
    Convert {
        /// Input page JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// List detected figures and tables
    #[command(alias = "fig")]
    Figures {
        /// Input page JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Also report captions that matched no figure
        #[arg(long)]
        failed: bool,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Render the document as Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input page JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Maximum heading level (1-6)
        #[arg(long, default_value = "6")]
        max_heading: u8,

        /// List captions that matched no figure
        #[arg(long)]
        failed: bool,

        /// Omit the figure list
        #[arg(long)]
        no_figures: bool,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Render the document as plain text
    Text {
        /// Input page JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Prefix paragraphs with their page number
        #[arg(long)]
        page_markers: bool,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Render the document as JSON
    Json {
        /// Input page JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Show document information
    Info {
        /// Input page JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            parse,
        }) => cmd_convert(&input, output.as_deref(), &parse),
        Some(Commands::Figures {
            input,
            output,
            json,
            compact,
            failed,
            parse,
        }) => cmd_figures(&input, output.as_deref(), json, compact, failed, &parse),
        Some(Commands::Markdown {
            input,
            output,
            max_heading,
            failed,
            no_figures,
            parse,
        }) => {
            let options = RenderOptions::new()
                .with_max_heading(max_heading)
                .with_failed_captions(failed)
                .with_figures(!no_figures);
            cmd_markdown(&input, output.as_deref(), &options, &parse)
        }
        Some(Commands::Text {
            input,
            output,
            page_markers,
            parse,
        }) => cmd_text(&input, output.as_deref(), page_markers, &parse),
        Some(Commands::Json {
            input,
            output,
            compact,
            parse,
        }) => cmd_json(&input, output.as_deref(), compact, &parse),
        Some(Commands::Info { input, json, parse }) => cmd_info(&input, json, &parse),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &ParseArgs::default())
            } else {
                println!("{}", "Usage: paperfig <FILE> [OUTPUT]".yellow());
                println!("       paperfig --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Advances a progress bar once per page that reaches graphics extraction.
struct PageProgress {
    bar: ProgressBar,
}

impl DiagnosticLogger for PageProgress {
    fn log_graphics(&self, page: u32, _regions: &[GraphicsRegion]) {
        self.bar.set_message(format!("page {}", page));
        self.bar.inc(1);
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    parse: &ParseArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });

    fs::create_dir_all(&output_dir)?;

    let pages = load_pages_file(input)?;
    let options = parse.to_options()?;
    let selected = pages
        .iter()
        .filter(|p| options.pages.includes(p.number))
        .count();

    let pb = ProgressBar::new(selected as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let progress = Arc::new(PageProgress { bar: pb.clone() });
    let doc = FigureExtractor::new(options)
        .with_diagnostics(progress)
        .extract_document(pages)?;
    pb.finish_with_message("Done!");

    let render_options = RenderOptions::new().with_failed_captions(true);
    fs::write(
        output_dir.join("figures.json"),
        paperfig::render::figures_to_json(&doc.figures, JsonFormat::Pretty)?,
    )?;
    fs::write(
        output_dir.join("extract.md"),
        paperfig::render::to_markdown(&doc, &render_options)?,
    )?;
    fs::write(
        output_dir.join("extract.txt"),
        paperfig::render::to_text(&doc, &render_options)?,
    )?;
    fs::write(
        output_dir.join("document.json"),
        paperfig::render::to_json(&doc, JsonFormat::Pretty)?,
    )?;

    println!("\n{}", "Output files:".green().bold());
    println!("  {} figures.json", "├─".dimmed());
    println!("  {} extract.md", "├─".dimmed());
    println!("  {} extract.txt", "├─".dimmed());
    println!("  {} document.json", "└─".dimmed());

    Ok(())
}

fn cmd_figures(
    input: &Path,
    output: Option<&Path>,
    json: bool,
    compact: bool,
    failed: bool,
    parse: &ParseArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let pages = load_pages_file(input)?;
    let results = parse.extractor()?.extract_figures_with_failures(pages)?;

    if json || output.is_some() {
        let value = if failed {
            serde_json::to_value(&results)?
        } else {
            serde_json::to_value(&results.figures)?
        };
        let rendered = if compact {
            serde_json::to_string(&value)?
        } else {
            serde_json::to_string_pretty(&value)?
        };
        return write_output(output, &rendered);
    }

    for figure in &results.figures {
        println!(
            "{} {} ({:.0}, {:.0}, {:.0}, {:.0})",
            format!("[page {}]", figure.page).dimmed(),
            figure.name().cyan().bold(),
            figure.bbox.x1,
            figure.bbox.y1,
            figure.bbox.x2,
            figure.bbox.y2
        );
        println!("    {}", figure.caption);
    }

    if failed {
        for caption in &results.failed_captions {
            println!(
                "{} {} {:?}",
                format!("[page {}]", caption.page).dimmed(),
                caption.label.yellow(),
                caption.reason
            );
        }
    }

    println!(
        "\n{} {} figure(s), {} unmatched caption(s)",
        "Done!".green().bold(),
        results.figures.len(),
        results.failed_captions.len()
    );

    Ok(())
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    render_options: &RenderOptions,
    parse: &ParseArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = extract(input, parse)?;
    let markdown = paperfig::render::to_markdown(&doc, render_options)?;
    write_output(output, &markdown)
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    page_markers: bool,
    parse: &ParseArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = extract(input, parse)?;
    let render_options = RenderOptions::new().with_page_markers(page_markers);
    let text = paperfig::render::to_text(&doc, &render_options)?;
    write_output(output, &text)
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    parse: &ParseArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = extract(input, parse)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = paperfig::render::to_json(&doc, format)?;
    write_output(output, &json)
}

fn cmd_info(input: &Path, json: bool, parse: &ParseArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pages = load_pages_file(input)?;
    let stats = InputStats::collect(&pages);
    let doc = parse.extractor()?.extract_document(pages)?;

    let figures = doc.figures.iter().filter(|f| f.kind == paperfig::FigureKind::Figure).count();
    let tables = doc.figures.len() - figures;
    let words = doc.plain_text().split_whitespace().count();

    if json {
        let summary = serde_json::json!({
            "file": input.display().to_string(),
            "pages": doc.page_count,
            "text_lines": stats.lines,
            "primitives": stats.primitives,
            "columns": doc.layout.as_ref().map(|l| l.columns.len()),
            "line_spacing": doc.layout.as_ref().map(|l| l.median_line_spacing),
            "figures": figures,
            "tables": tables,
            "failed_captions": doc.failed_captions.len(),
            "sections": doc.sections.len(),
            "words": words,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.page_count);
    println!("{}: {}", "Text lines".bold(), stats.lines);
    println!("{}: {}", "Primitives".bold(), stats.primitives);
    print_layout(&doc);

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Figures".bold(), figures);
    println!("{}: {}", "Tables".bold(), tables);
    println!("{}: {}", "Unmatched captions".bold(), doc.failed_captions.len());
    println!("{}: {}", "Sections".bold(), doc.sections.len());
    println!("{}: {}", "Words".bold(), words);
    if doc.abstract_text.is_some() {
        println!("{}: {}", "Abstract".bold(), "Yes");
    }

    Ok(())
}

fn print_layout(doc: &Document) {
    match doc.layout {
        Some(ref layout) => {
            println!("{}: {}", "Columns".bold(), layout.columns.len());
            println!(
                "{}: {:.2}pt",
                "Line spacing".bold(),
                layout.median_line_spacing
            );
        }
        None => println!(
            "{}: {}",
            "Layout".bold(),
            "not calibrated (figure detection skipped)".yellow()
        ),
    }
}

/// Counts taken from the raw input pages.
struct InputStats {
    lines: usize,
    primitives: usize,
}

impl InputStats {
    fn collect(pages: &[Page]) -> Self {
        Self {
            lines: pages.iter().map(|p| p.line_count()).sum(),
            primitives: pages.iter().map(|p| p.primitives.len()).sum(),
        }
    }
}

fn extract(input: &Path, parse: &ParseArgs) -> Result<Document, Box<dyn std::error::Error>> {
    let pages = load_pages_file(input)?;
    Ok(parse.extractor()?.extract_document(pages)?)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "paperfig".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Figure, table and section extraction for scientific papers");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "paperfig",
            "figures",
            "paper.json",
            "--keep-white-graphics",
            "--titles-first",
            "--no-rebuild",
            "--sequential",
            "--pages",
            "0-3",
        ])
        .unwrap();

        let Some(Commands::Figures { parse, .. }) = cli.command else {
            panic!("expected the figures command");
        };
        let options = parse.to_options().unwrap();
        assert!(!options.ignore_white_graphics);
        assert!(options.detect_section_titles_first);
        assert!(!options.rebuild_paragraphs);
        assert!(!options.parallel);
        assert!(options.pages.includes(3));
        assert!(!options.pages.includes(4));
    }

    #[test]
    fn test_invalid_page_range() {
        let parse = ParseArgs {
            pages: Some("5-2".to_string()),
            ..Default::default()
        };
        assert!(parse.to_options().is_err());
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        write_output(Some(&path), "# Title").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Title");
    }
}
