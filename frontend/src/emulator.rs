use std::path::Path;

use anyhow::Context;
use lantern_core::machine::LoadOptions;
use sdl2::event::Event;

use crate::HostSession;
use crate::input::{self, HostAction};
use crate::rom_file;
use crate::video::Video;

const WINDOW_TITLE: &str = "Lantern";

pub fn run(session: &mut HostSession, options: LoadOptions) -> anyhow::Result<()> {
    let sdl_context = sdl2::init().map_err(anyhow::Error::msg)?;
    let sdl_video = sdl_context.video().map_err(anyhow::Error::msg)?;

    let (width, height) = session.surface().size();
    let title = session.title().unwrap_or(WINDOW_TITLE).to_string();
    let mut video = Video::new(&sdl_video, &title, width, height)?;
    let mut event_pump = sdl_context.event_pump().map_err(anyhow::Error::msg)?;

    'main: loop {
        // Input and file drops land between refresh callbacks.
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'main,

                Event::KeyDown {
                    scancode: Some(sc),
                    repeat: false,
                    ..
                } => match input::host_action(sc) {
                    Some(HostAction::Quit) => break 'main,
                    Some(HostAction::ScaleUp) => session.set_scale(session.scale().increase()),
                    Some(HostAction::ScaleDown) => session.set_scale(session.scale().decrease()),
                    None => session.key_down(input::key_code(sc)),
                },

                Event::KeyUp {
                    scancode: Some(sc), ..
                } => {
                    if input::host_action(sc).is_none() {
                        session.key_up(input::key_code(sc));
                    }
                }

                Event::DropFile { filename, .. } => {
                    load_dropped(session, &mut video, Path::new(&filename), options);
                }

                _ => {}
            }
        }

        // Fire the refresh callback requested last time round
        if let Err(e) = session.pump() {
            video.set_title(&format!("{WINDOW_TITLE} (stopped: {e})"));
        }

        // Blocks until vsync
        video.present(session.surface())?;
    }

    Ok(())
}

/// Loader entry point for drag-and-drop. A failure is shown in the window
/// title and the current session carries on.
fn load_dropped(session: &mut HostSession, video: &mut Video, path: &Path, options: LoadOptions) {
    match load_file(session, path, options) {
        Ok(title) => video.set_title(&title),
        Err(e) => {
            log::warn!("{e:#}");
            video.set_title(&failure_title(session, &e));
        }
    }
}

fn load_file(
    session: &mut HostSession,
    path: &Path,
    options: LoadOptions,
) -> anyhow::Result<String> {
    let rom =
        rom_file::read_rom(path).with_context(|| format!("cannot read {}", path.display()))?;
    let title = session
        .load(&rom, options)
        .with_context(|| format!("cannot load {}", path.display()))?;
    Ok(title)
}

/// Keeps the running cartridge's name in front of the error.
fn failure_title(session: &HostSession, error: &anyhow::Error) -> String {
    let current = session.title().unwrap_or(WINDOW_TITLE);
    format!("{current} ({error:#})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_core::display::DisplayScale;
    use lantern_core::refresh::FrameQueue;
    use lantern_core::session::{Session, SessionConfig};
    use lantern_machines::TestCard;
    use std::path::PathBuf;

    use crate::store::FileStore;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn rom(title: &[u8; 16]) -> Vec<u8> {
        let mut rom = vec![0; 0x8000];
        rom[0x134..0x144].copy_from_slice(title);
        rom
    }

    fn session(dir: &Path, max_rom_size: Option<usize>) -> HostSession {
        Session::new(
            Box::new(TestCard::new()),
            FileStore::open(&dir.join("saves.json")).unwrap(),
            FrameQueue::new(),
            SessionConfig { max_rom_size },
            DisplayScale::ONE,
        )
    }

    #[test]
    fn empty_drop_is_reported_and_keeps_running_cartridge() {
        let dir = scratch("lantern_emulator_test_empty");
        let mut session = session(&dir, None);
        let good = dir.join("good.gb");
        std::fs::write(&good, rom(b"DROP TEST\0\0\0\0\0\0\0")).unwrap();
        load_file(&mut session, &good, LoadOptions::default()).unwrap();

        let empty = dir.join("empty.gb");
        std::fs::write(&empty, b"").unwrap();
        let err = load_file(&mut session, &empty, LoadOptions::default()).unwrap_err();

        let title = failure_title(&session, &err);
        assert!(title.starts_with("DROP TEST ("), "{title}");
        assert!(title.contains("empty.gb"), "{title}");
        assert!(session.is_running());
        assert_eq!(session.title(), Some("DROP TEST"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn oversized_drop_is_reported_when_idle() {
        let dir = scratch("lantern_emulator_test_oversized");
        let mut session = session(&dir, Some(0x4000));
        let big = dir.join("big.gb");
        std::fs::write(&big, rom(b"TOO BIG\0\0\0\0\0\0\0\0\0")).unwrap();

        let err = load_file(&mut session, &big, LoadOptions::default()).unwrap_err();

        let title = failure_title(&session, &err);
        assert!(title.starts_with("Lantern ("), "{title}");
        assert!(title.contains("big.gb"), "{title}");
        assert!(!session.is_running());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unreadable_drop_is_reported() {
        let dir = scratch("lantern_emulator_test_missing");
        let mut session = session(&dir, None);

        let err = load_file(&mut session, &dir.join("gone.gb"), LoadOptions::default())
            .unwrap_err();

        assert!(failure_title(&session, &err).contains("cannot read"));
        assert!(!session.is_running());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
