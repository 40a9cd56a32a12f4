// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sudoscan command-line tool.
//
// Entry point. Initialises logging, parses the subcommand and maps pipeline
// failures to plain-English messages and exit codes:
//
//   0  success
//   1  any other failure
//   2  no grid found in the photo (retry with another frame)

use std::fs;
use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sudoscan_core::config::DetectionConfig;
use sudoscan_core::error::SudoscanError;
use sudoscan_core::human_errors::humanize_error;
use sudoscan_core::types::Board;
use sudoscan_solver::{BacktrackingSolver, SolveStats};
use sudoscan_vision::grid::overlay::draw_lines;
use sudoscan_vision::{GridDetection, GridFinder, RectifiedGrid, extract_glyphs};
use tracing::info;

#[derive(Parser)]
#[command(name = "sudoscan")]
#[command(about = "Find a printed sudoku grid in a photo, straighten it, read it and solve it")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the grid and write a top-down square image of it.
    Rectify(RectifyArgs),

    /// Rectify, then write one normalised glyph image per non-empty cell.
    Cells(CellsArgs),

    /// Rectify and read the board with the OCR digit classifier.
    #[cfg(feature = "ocr")]
    Read(ReadArgs),

    /// Solve a board given as 81 cells (`0` or `.` for blanks, `-` for stdin).
    Solve(SolveArgs),
}

#[derive(Debug, Args)]
struct DetectArgs {
    /// Path to the input photo.
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// JSON file overriding detection parameters.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RectifyArgs {
    #[command(flatten)]
    detect: DetectArgs,

    /// Where to write the rectified image.
    #[arg(short, long, value_name = "OUT", default_value = "rectified.png")]
    output: PathBuf,

    /// Save the border mask and a line overlay to this directory.
    #[arg(long, value_name = "DIR")]
    debug_dir: Option<PathBuf>,

    /// Print the detection as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct CellsArgs {
    #[command(flatten)]
    detect: DetectArgs,

    /// Directory for the glyph images (created if missing).
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,
}

#[cfg(feature = "ocr")]
#[derive(Debug, Args)]
struct ReadArgs {
    #[command(flatten)]
    detect: DetectArgs,

    /// Directory holding text-detection.rten and text-recognition.rten.
    #[arg(long, value_name = "DIR")]
    models: Option<PathBuf>,

    /// Also solve the board that was read.
    #[arg(long)]
    solve: bool,

    /// Print the result as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct SolveArgs {
    #[arg(value_name = "BOARD")]
    board: String,

    /// Print the result as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RectifyReport<'a> {
    output: &'a Path,
    side: u32,
    detection: &'a GridDetection,
}

#[derive(Serialize)]
struct SolveReport {
    board: Board,
    solution: Board,
    stats: SolveStats,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Rectify(args) => rectify(args),
        Commands::Cells(args) => cells(args),
        #[cfg(feature = "ocr")]
        Commands::Read(args) => read(args),
        Commands::Solve(args) => solve(args),
    }
}

/// Print a failure for a person and pick the exit code.
fn report(err: &anyhow::Error) -> ExitCode {
    let Some(sudoscan_err) = err.downcast_ref::<SudoscanError>() else {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    };

    let human = humanize_error(sudoscan_err);
    eprintln!("error: {}", human.message);
    eprintln!("  {}", human.suggestion);
    eprintln!("  ({sudoscan_err})");
    if sudoscan_err.is_not_found() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DetectionConfig> {
    let Some(path) = path else {
        return Ok(DetectionConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    Ok(DetectionConfig::from_json(&json)?)
}

fn detect(args: &DetectArgs) -> anyhow::Result<(DetectionConfig, RectifiedGrid)> {
    let config = load_config(args.config.as_deref())?;
    let grid = GridFinder::new(config.clone()).rectify_path(&args.image)?;
    Ok((config, grid))
}

fn rectify(args: RectifyArgs) -> anyhow::Result<()> {
    let (_, grid) = detect(&args.detect)?;

    grid.image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(output = %args.output.display(), side = grid.side(), "Rectified grid written");

    if let Some(dir) = &args.debug_dir {
        write_debug_images(dir, &grid.detection)?;
    }

    if args.json {
        let report = RectifyReport {
            output: &args.output,
            side: grid.side(),
            detection: &grid.detection,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn write_debug_images(dir: &Path, detection: &GridDetection) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mask_path = dir.join("mask.png");
    detection
        .mask
        .save(&mask_path)
        .with_context(|| format!("failed to write {}", mask_path.display()))?;

    let overlay_path = dir.join("lines.png");
    draw_lines(&detection.mask, &detection.lines, Some(&detection.edges))
        .save(&overlay_path)
        .with_context(|| format!("failed to write {}", overlay_path.display()))?;

    info!(dir = %dir.display(), "Debug images written");
    Ok(())
}

fn cells(args: CellsArgs) -> anyhow::Result<()> {
    let (config, grid) = detect(&args.detect)?;
    let glyphs = extract_glyphs(&grid.image, &config.cells)?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    for glyph in &glyphs {
        let path = args
            .output
            .join(format!("r{}c{}.png", glyph.row + 1, glyph.col + 1));
        glyph
            .image
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    info!(count = glyphs.len(), dir = %args.output.display(), "Cell glyphs written");
    println!("{} glyphs written to {}", glyphs.len(), args.output.display());
    Ok(())
}

#[cfg(feature = "ocr")]
fn read(args: ReadArgs) -> anyhow::Result<()> {
    use sudoscan_core::traits::PuzzleSolver as _;
    use sudoscan_vision::{OcrDigitClassifier, read_board};

    let (config, grid) = detect(&args.detect)?;
    let classifier = match &args.models {
        Some(dir) => OcrDigitClassifier::from_model_dir(dir)?,
        None => OcrDigitClassifier::with_defaults()?,
    };
    let reading = read_board(&grid.image, &classifier, &config.cells)?;
    let solution = if args.solve {
        Some(BacktrackingSolver::new().solve(&reading.board)?)
    } else {
        None
    };

    if args.json {
        #[derive(Serialize)]
        struct ReadReport<'a> {
            reading: &'a sudoscan_vision::BoardReading,
            solution: Option<Board>,
        }
        let report = ReadReport {
            reading: &reading,
            solution,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", reading.board);
    for (row, col) in &reading.uncertain {
        eprintln!("unreadable digit at row {}, column {}", row + 1, col + 1);
    }
    if let Some(solution) = solution {
        println!();
        println!("{solution}");
    }
    Ok(())
}

fn solve(args: SolveArgs) -> anyhow::Result<()> {
    let text = if args.board == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read board from stdin")?;
        buf
    } else {
        args.board
    };

    let board: Board = text.parse()?;
    let (solution, stats) = BacktrackingSolver::new().solve_with_stats(&board)?;

    if args.json {
        let report = SolveReport {
            board,
            solution,
            stats,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{solution}");
    }
    Ok(())
}
