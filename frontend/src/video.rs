use anyhow::Context;
use lantern_core::display::Surface;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};

pub struct Video {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    width: u32,
    height: u32,
}

impl Video {
    /// Create an SDL window sized to the compositor's surface.
    ///
    /// The surface is already upscaled, so it is always copied 1:1; texture
    /// filtering is still forced to nearest in case the window manager
    /// stretches the window.
    pub fn new(
        sdl_video: &sdl2::VideoSubsystem,
        title: &str,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        sdl2::hint::set("SDL_RENDER_SCALE_QUALITY", "0");

        let window = sdl_video
            .window(title, width, height)
            .position_centered()
            .build()
            .context("failed to create window")?;

        // Present waits for vsync: this paces the host loop at the display
        // refresh rate.
        let canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .context("failed to create canvas")?;

        let texture_creator = canvas.texture_creator();

        Ok(Self {
            canvas,
            texture_creator,
            width,
            height,
        })
    }

    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self.canvas.window_mut().set_title(title) {
            log::warn!("cannot set window title: {e}");
        }
    }

    /// Upload the surface and present it, resizing the window first if the
    /// surface size changed.
    pub fn present(&mut self, surface: &Surface) -> anyhow::Result<()> {
        let (width, height) = surface.size();
        if (width, height) != (self.width, self.height) {
            self.canvas
                .window_mut()
                .set_size(width, height)
                .context("failed to resize window")?;
            self.width = width;
            self.height = height;
        }

        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB24, width, height)
            .context("failed to create texture")?;

        texture
            .update(None, surface.pixels(), surface.pitch())
            .context("failed to update texture")?;

        self.canvas.clear();
        self.canvas
            .copy(&texture, None, None)
            .map_err(anyhow::Error::msg)?;
        self.canvas.present();
        Ok(())
    }
}
