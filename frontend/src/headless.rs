//! Window-less host loop for scripting and CI.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use lantern_core::display::Surface;
use lantern_core::machine::MachineError;
use lantern_core::persistence::KeyValueStore;
use lantern_core::refresh::FrameQueue;
use lantern_core::session::Session;

/// Run up to `frames` refresh cycles. Stops early if the session goes idle.
/// Returns the number of frames composited.
pub fn run<S: KeyValueStore>(
    session: &mut Session<S, FrameQueue>,
    frames: u64,
) -> Result<u64, MachineError> {
    let mut composited = 0;
    while composited < frames && session.is_running() {
        composited += session.pump()? as u64;
    }
    Ok(composited)
}

/// Write the surface as an 8-bit RGB PNG.
pub fn write_png(surface: &Surface, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), surface.width(), surface.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(surface.pixels())?;
    Ok(())
}
