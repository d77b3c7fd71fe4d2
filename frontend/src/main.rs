use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, anyhow};
use clap::Parser;
use lantern_core::display::DisplayScale;
use lantern_core::machine::LoadOptions;
use lantern_core::refresh::FrameQueue;
use lantern_core::session::{Session, SessionConfig};
use lantern_machines::registry;

use crate::config::{Config, Overrides};
use crate::store::FileStore;

mod config;
mod emulator;
mod headless;
mod input;
mod rom_file;
mod store;
mod video;

pub(crate) type HostSession = Session<FileStore, FrameQueue>;

#[derive(Parser, Debug)]
#[command(
    name = "lantern",
    about = "Host a cartridge machine: frame pacing, input, display scaling and battery saves."
)]
struct Args {
    /// ROM image, or a .zip holding one. Without it the window waits for a
    /// dropped file.
    rom: Option<PathBuf>,

    /// Machine to host.
    #[arg(long, default_value = "testcard")]
    machine: String,

    /// Integer display scale (1 to 16).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=DisplayScale::MAX as i64))]
    scale: Option<u32>,

    /// Run colour-capable cartridges on base hardware.
    #[arg(long)]
    force_base: bool,

    /// Reject ROM files larger than this many bytes.
    #[arg(long, value_name = "BYTES")]
    max_rom_size: Option<usize>,

    /// Save store file.
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Config file (default: platform config dir/lantern/config.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run this many frames without a window, then exit.
    #[arg(long, value_name = "N", requires = "rom")]
    headless_frames: Option<u64>,

    /// With --headless-frames, write the last frame to this PNG file.
    #[arg(long, value_name = "PNG", requires = "headless_frames")]
    screenshot: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_overrides(&Overrides {
        scale: args.scale,
        force_base_mode: args.force_base,
        max_rom_size: args.max_rom_size,
        store_path: args.store.clone(),
    });

    let entry = registry::find(&args.machine)
        .ok_or_else(|| anyhow!("unknown machine: {}\n{}", args.machine, machine_list()))?;

    let store_path = config.store_path();
    let store = FileStore::open(&store_path)
        .with_context(|| format!("opening save store {}", store_path.display()))?;
    log::debug!("save store at {}", store.path().display());

    let mut session = Session::new(
        (entry.create)(),
        store,
        FrameQueue::new(),
        SessionConfig {
            max_rom_size: config.max_rom_size,
        },
        config.display_scale(),
    );
    let options = LoadOptions {
        force_base_mode: config.force_base_mode,
    };

    if let Some(path) = &args.rom {
        let rom =
            rom_file::read_rom(path).with_context(|| format!("reading {}", path.display()))?;
        session
            .load(&rom, options)
            .with_context(|| format!("loading {}", path.display()))?;
    }

    if let Some(frames) = args.headless_frames {
        let ran = headless::run(&mut session, frames)?;
        log::info!(
            "ran {ran} frames of \"{}\"",
            session.title().unwrap_or_default()
        );
        if let Some(path) = &args.screenshot {
            headless::write_png(session.surface(), path)?;
            log::info!("wrote {}", path.display());
        }
        return Ok(());
    }

    emulator::run(&mut session, options)
}

/// One `name: description` line per registered machine.
fn machine_list() -> String {
    let lines: Vec<_> = registry::all()
        .iter()
        .map(|e| format!("  {}: {}", e.name, e.description))
        .collect();
    format!("available machines:\n{}", lines.join("\n"))
}
