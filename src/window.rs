//! SDL2 host layer: window, input events and raster presentation.
//!
//! The renderer knows nothing about windowing; this module owns the SDL
//! context and uploads the renderer's RGBA byte buffer into a streaming
//! texture each frame. The raster uses a bottom-left origin while SDL
//! textures are top-left, so presentation blits with a vertical flip.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;
pub const FPS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
    Resize(u32, u32),
    KeyPress(Keycode),
}

/// Sleeps out the remainder of each frame to hold a fixed frame rate.
pub struct FrameLimiter {
    frame: std::time::Duration,
    previous: std::time::Instant,
}

impl FrameLimiter {
    pub fn new(fps: u64) -> Self {
        Self {
            frame: std::time::Duration::from_micros(1_000_000 / fps),
            previous: std::time::Instant::now(),
        }
    }

    /// Waits if necessary and returns the elapsed time since the previous
    /// call, in seconds.
    pub fn wait_and_get_delta(&mut self) -> f32 {
        let elapsed = self.previous.elapsed();
        if elapsed < self.frame {
            std::thread::sleep(self.frame - elapsed);
        }
        let now = std::time::Instant::now();
        let delta = now - self.previous;
        self.previous = now;
        delta.as_secs_f32()
    }
}

pub struct Window {
    // Field order matters: the texture must drop before its creator.
    texture: sdl2::render::Texture<'static>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    event_pump: sdl2::EventPump,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        // SAFETY: texture_creator is heap-allocated and lives as long as
        // Window; struct field order drops texture before texture_creator.
        let creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = creator_ref
            .create_texture_streaming(PixelFormatEnum::RGBA32, width, height)
            .map_err(|e| e.to_string())?;

        log::info!("window created at {width}x{height}");
        Ok(Self {
            texture,
            texture_creator,
            canvas,
            event_pump,
            width,
            height,
        })
    }

    pub fn poll_events(&mut self) -> WindowEvent {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => return WindowEvent::Quit,
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } => return WindowEvent::Resize(w as u32, h as u32),
                Event::KeyDown {
                    keycode: Some(key), ..
                } => return WindowEvent::KeyPress(key),
                _ => {}
            }
        }
        WindowEvent::None
    }

    /// Uploads an RGBA8 buffer of the window's extent and presents it,
    /// flipped vertically to account for the raster's bottom-left origin.
    pub fn present(&mut self, pixels: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, pixels, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas.copy_ex(
            &self.texture,
            None,
            Some(Rect::new(0, 0, self.width, self.height)),
            0.0,
            None,
            false,
            true,
        )?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.width = width;
        self.height = height;
        // SAFETY: same as in new(); texture_creator outlives texture.
        let creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(self.texture_creator.as_ref() as *const _) };
        self.texture = creator_ref
            .create_texture_streaming(PixelFormatEnum::RGBA32, width, height)
            .map_err(|e| e.to_string())?;
        log::debug!("window resized to {width}x{height}");
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) {
        self.canvas.window_mut().set_title(title).ok();
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
