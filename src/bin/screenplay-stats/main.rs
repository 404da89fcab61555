//! CLI tool to paginate an exported screenplay and print its statistics.
//!
//! Usage:
//!   screenplay-stats --input script.json [--lines-per-page 55] [--format letter] [--scenes] [--json] [-v]

mod input;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;

use input::InputDocument;
use screenplay_core::{
    ContinuationKind, ElementSpacing, NumberFormat, ScreenplayManager, ScreenplaySettings,
};

#[derive(Parser, Debug)]
#[command(
    name = "screenplay-stats",
    about = "Paginate a screenplay exported as {type, text} JSON and report its statistics",
    version
)]
struct Args {
    /// Input JSON file path ("-" reads stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Override lines per page
    #[arg(long, env = "SCREENPLAY_LINES_PER_PAGE")]
    lines_per_page: Option<u32>,

    /// Scene number format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Count a blank line between elements
    #[arg(long, default_value = "false")]
    standard_spacing: bool,

    /// List every scene with its number and page
    #[arg(long, default_value = "false")]
    scenes: bool,

    /// Print the report as JSON
    #[arg(long, default_value = "false")]
    json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Numeric,
    Letter,
    Dotted,
}

impl From<FormatArg> for NumberFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Numeric => NumberFormat::Numeric,
            FormatArg::Letter => NumberFormat::Letter,
            FormatArg::Dotted => NumberFormat::Dotted,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    elements: usize,
    pages: usize,
    scenes: usize,
    words: usize,
    more_marks: usize,
    continued_marks: usize,
    scene_list: Vec<SceneLine>,
}

#[derive(Debug, Serialize)]
struct SceneLine {
    label: String,
    page: usize,
    heading: String,
    omitted: bool,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        return Ok(buffer);
    }
    if !path.exists() {
        anyhow::bail!("Input file does not exist: {}", path.display());
    }
    std::fs::read_to_string(path).context("Failed to read input file")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // 1. Read and parse
    let json = read_input(&args.input)?;
    let document: InputDocument = serde_json::from_str(&json).context("Failed to parse JSON")?;
    let (settings, inputs) = document.into_parts();

    // 2. Apply command-line overrides
    let mut settings = settings.unwrap_or_else(ScreenplaySettings::new);
    if let Some(lines) = args.lines_per_page {
        settings.layout.lines_per_page = lines;
    }
    if let Some(format) = args.format {
        settings.numbering.format = format.into();
    }
    if args.standard_spacing {
        settings.layout.spacing = ElementSpacing::Standard;
    }

    // 3. Build the document
    let elements = inputs
        .into_iter()
        .enumerate()
        .map(|(position, input)| input.into_element(position))
        .collect::<Result<Vec<_>>>()?;
    info!(elements = elements.len(), "parsed screenplay");

    let mut manager = ScreenplayManager::from_elements(elements);
    manager
        .set_settings(settings)
        .context("Invalid screenplay settings")?;

    // 4. Report
    let report = build_report(&manager);
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_report(&report, args.scenes);
    }
    Ok(())
}

fn build_report(manager: &ScreenplayManager) -> Report {
    let pagination = manager.get_pagination_result();
    let numbering = manager.get_scene_numbering();
    let marks = manager.get_continuation_marks();

    let scene_list = manager
        .elements()
        .iter()
        .enumerate()
        .filter_map(|(index, element)| {
            let label = numbering.label_of(&element.id)?;
            Some(SceneLine {
                label: label.to_string(),
                page: pagination.page_of(index),
                heading: element.text().into_owned(),
                omitted: element.omitted,
            })
        })
        .collect();

    Report {
        elements: manager.len(),
        pages: pagination.page_count,
        scenes: pagination.scene_count,
        words: pagination.word_count,
        more_marks: marks
            .iter()
            .filter(|m| m.kind == ContinuationKind::More)
            .count(),
        continued_marks: marks
            .iter()
            .filter(|m| m.kind == ContinuationKind::Continued)
            .count(),
        scene_list,
    }
}

fn print_report(report: &Report, scenes: bool) {
    println!("Elements:  {}", report.elements);
    println!("Pages:     {}", report.pages);
    println!("Scenes:    {}", report.scenes);
    println!("Words:     {}", report.words);
    println!("(MORE):    {}", report.more_marks);
    println!("CONTINUED: {}", report.continued_marks);

    if scenes {
        println!();
        for scene in &report.scene_list {
            let heading = if scene.omitted { "OMITTED" } else { scene.heading.as_str() };
            println!("{:>5}  p.{:<4} {}", scene.label, scene.page, heading);
        }
    }
}
