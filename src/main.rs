//! MiGfx command-line tool.
//!
//! Works on saved entity trees, either XML (`.xml`) or the binary format
//! (any other extension):
//!
//! - `inspect <file> [--json]` prints the tree of entities and components
//! - `convert <in> <out>` rewrites a tree in the format implied by `<out>`
//! - `simulate <file> --seconds S` runs fixed-step updates and draws into a
//!   recording target, then logs playback and draw statistics
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug migfx --config config.ini simulate hero.xml --seconds 2
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{error, info, warn};

use migfx::components::spriteanimator::SpriteAnimator;
use migfx::entity::{Entity, EntitySummary};
use migfx::error::{SerializeError, SerializeResult};
use migfx::resources::assets::Assets;
use migfx::resources::gameconfig::MiGfxConfig;
use migfx::resources::rendertarget::{DrawCommand, RecordingTarget};
use migfx::serialization::{BinarySerializable, XmlSerializable};

#[derive(Parser)]
#[command(version, about = "Inspect, convert and simulate MiGfx entity files")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "config.ini")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the entity tree stored in a file.
    Inspect {
        file: PathBuf,
        /// Print as JSON instead of an indented outline.
        #[arg(long)]
        json: bool,
    },
    /// Convert between XML and binary, chosen by file extension.
    Convert { input: PathBuf, output: PathBuf },
    /// Update and draw an entity tree for a while.
    Simulate {
        file: PathBuf,
        #[arg(long, default_value_t = 1.0)]
        seconds: f32,
    },
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

fn load_entity(path: &Path) -> SerializeResult<Entity> {
    let entity = if is_xml(path) {
        Entity::from_xml_str(&fs::read_to_string(path)?)?
    } else {
        Entity::from_stream(&mut BufReader::new(File::open(path)?))?
    };
    info!(
        "Loaded '{}' from {} ({} entities)",
        entity.id(),
        path.display(),
        entity.tree_size()
    );
    Ok(entity)
}

fn save_entity(entity: &Entity, path: &Path) -> SerializeResult<()> {
    if is_xml(path) {
        fs::write(path, entity.to_element().to_document())?;
    } else {
        entity.save_to_stream(&mut BufWriter::new(File::create(path)?))?;
    }
    info!("Saved '{}' to {}", entity.id(), path.display());
    Ok(())
}

fn print_outline(summary: &EntitySummary, depth: usize) {
    println!(
        "{:indent$}{} [{}]",
        "",
        summary.id,
        summary.components.join(", "),
        indent = depth * 2
    );
    for child in &summary.children {
        print_outline(child, depth + 1);
    }
}

fn apply_multiplier(entity: &mut Entity, multiplier: f32) {
    if let Some(animator) = entity.get_component_mut::<SpriteAnimator>() {
        animator.animator.set_multiplier(multiplier);
    }
    for child in entity.children_mut() {
        apply_multiplier(child, multiplier);
    }
}

fn log_animators(entity: &Entity) {
    if let Some(animator) = entity.get_component::<SpriteAnimator>() {
        info!(
            "{}: animation '{}' frame {} ({:?})",
            entity.id(),
            animator.animator.selected(),
            animator.animator.frame_index(),
            animator.animator.state()
        );
    }
    for child in entity.children() {
        log_animators(child);
    }
}

fn simulate(config: &MiGfxConfig, path: &Path, seconds: f32) -> SerializeResult<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(SerializeError::invalid(format!("invalid duration {seconds}s")));
    }
    let mut entity = load_entity(path)?;
    apply_multiplier(&mut entity, config.animation_multiplier);

    let mut assets = Assets::from_root(&config.asset_root);
    let (width, height) = config.view_size();
    let mut target = RecordingTarget::new(width, height);

    let step = config.frame_step();
    let total = Duration::from_secs_f32(seconds);
    let mut elapsed = Duration::ZERO;
    let mut frames = 0u64;
    let (mut quads, mut texts, mut rectangles) = (0usize, 0usize, 0usize);
    while elapsed < total {
        entity.update(step);
        target.clear();
        entity.draw(&mut target, &mut assets);
        for command in &target.commands {
            match command {
                DrawCommand::Quad { .. } => quads += 1,
                DrawCommand::Text { .. } => texts += 1,
                DrawCommand::Rectangle { .. } => rectangles += 1,
            }
        }
        elapsed += step;
        frames += 1;
    }

    info!(
        "Simulated {frames} frames ({:.3}s): {quads} quads, {texts} texts, {rectangles} rectangles",
        elapsed.as_secs_f32()
    );
    log_animators(&entity);
    Ok(())
}

fn run(cli: Cli) -> SerializeResult<()> {
    let mut config = MiGfxConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("Using default configuration: {e}");
    }

    match cli.command {
        Command::Inspect { file, json } => {
            let summary = load_entity(&file)?.summary();
            if json {
                let text = serde_json::to_string_pretty(&summary)
                    .map_err(|e| SerializeError::invalid(e.to_string()))?;
                println!("{text}");
            } else {
                print_outline(&summary, 0);
            }
            Ok(())
        }
        Command::Convert { input, output } => save_entity(&load_entity(&input)?, &output),
        Command::Simulate { file, seconds } => simulate(&config, &file, seconds),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
