//! refboard: headless board maintenance.
//!
//! Creates boards, adds images to them and consolidates their assets
//! without a user interface.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use refboard::board_file::images_dir_for;
use refboard::{AssetPolicy, BoardSettings, DropPayload, InteractionController, Point, SaveOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Time allowed for background decodes to finish before giving up.
const DECODE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Parser, Debug)]
#[command(name = "refboard")]
#[command(about = "Create and maintain reference image boards", version)]
struct Args {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty board file
    New {
        path: PathBuf,
        /// Board name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Add images to a board, placed below the existing items
    Add {
        board: PathBuf,
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Reference the image files instead of embedding them
        #[arg(long)]
        referenced: bool,
    },
    /// Print a summary of a board
    Info { board: PathBuf },
    /// Copy every referenced image next to the board and point at the copies
    Consolidate { board: PathBuf },
}

fn main() -> Result<()> {
    refboard::logging::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => BoardSettings::load_from(path),
        None => BoardSettings::load(),
    };
    let mut controller = InteractionController::new(settings);

    match args.command {
        Command::New { path, name } => new_board(&mut controller, &path, name),
        Command::Add {
            board,
            images,
            referenced,
        } => add_images(&mut controller, &board, images, referenced),
        Command::Info { board } => info(&mut controller, &board),
        Command::Consolidate { board } => consolidate(&mut controller, &board),
    }
}

fn new_board(controller: &mut InteractionController, path: &Path, name: Option<String>) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    let name = name.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    controller.new_board(name);
    let report = controller
        .save_as(path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Created {}", report.path.display());
    Ok(())
}

fn open(controller: &mut InteractionController, board: &Path) -> Result<()> {
    let missing = controller
        .load_board(board)
        .with_context(|| format!("loading {}", board.display()))?;
    for asset in &missing {
        eprintln!(
            "warning: missing {} ({}), used by {} item(s)",
            asset.path.display(),
            asset.reason,
            asset.items.len()
        );
    }
    Ok(())
}

fn add_images(
    controller: &mut InteractionController,
    board: &Path,
    images: Vec<PathBuf>,
    referenced: bool,
) -> Result<()> {
    open(controller, board)?;
    let drop_at = controller
        .document()
        .bounds()
        .map(|b| Point::new(b.min.x, b.max.y))
        .unwrap_or(Point::ZERO);
    let screen = refboard::input::coords::CoordinateConverter::canvas_to_screen(
        drop_at,
        controller.document().viewport(),
    );

    let payloads = images.into_iter().map(DropPayload::file).collect();
    let mut report = controller.handle_drop(screen, payloads);
    report.merge(controller.finish_imports(DECODE_TIMEOUT));
    println!("{}", report.summary());
    if report.added.is_empty() {
        bail!("no images added");
    }

    let policy = if referenced {
        AssetPolicy::Referenced
    } else {
        controller.settings().asset_policy
    };
    let options = SaveOptions {
        policy,
        consolidate: false,
    };
    controller
        .save_with(board, &options)
        .with_context(|| format!("writing {}", board.display()))?;
    Ok(())
}

fn info(controller: &mut InteractionController, board: &Path) -> Result<()> {
    open(controller, board)?;
    let doc = controller.document();
    let assets = doc.assets();
    let missing = assets.iter().filter(|a| a.is_missing()).count();
    println!("Board:   {}", doc.name());
    println!("Id:      {}", doc.id());
    println!("Items:   {}", doc.len());
    println!("Assets:  {} ({} missing)", assets.len(), missing);
    if let Some(bounds) = doc.bounds() {
        println!(
            "Bounds:  {:.0}x{:.0} at ({:.0}, {:.0})",
            bounds.width(),
            bounds.height(),
            bounds.min.x,
            bounds.min.y
        );
    }
    let viewport = doc.viewport();
    println!(
        "View:    {:.0}% at ({:.0}, {:.0})",
        viewport.zoom * 100.0,
        viewport.pan_x,
        viewport.pan_y
    );
    for item in doc.items() {
        let p = item.position();
        println!(
            "  {} z={} ({:.1}, {:.1}) x{:.2} {:.0}deg {}",
            item.id(),
            item.z_order(),
            p.x,
            p.y,
            item.scale(),
            item.rotation(),
            item.asset().display_name()
        );
    }
    Ok(())
}

fn consolidate(controller: &mut InteractionController, board: &Path) -> Result<()> {
    open(controller, board)?;
    let report = controller
        .consolidate()
        .with_context(|| format!("consolidating {}", board.display()))?;
    println!(
        "Consolidated {} asset(s) into {} ({} file(s) written)",
        report.assets,
        images_dir_for(&report.path).display(),
        report.files_written
    );
    Ok(())
}
