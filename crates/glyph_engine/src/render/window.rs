//! Window management using GLFW
//!
//! Creates a window with an OpenGL 3.3 core, forward-compatible context and
//! loads a [`glow::Context`] from it.

#![allow(unsafe_code)]

use glfw::Context as _;
use thiserror::Error;

use crate::core::config::{ConfigError, WindowConfig};

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// The window or its context could not be created
    #[error("Window creation failed")]
    CreationFailed,

    /// The window configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window owning the current OpenGL context
pub struct GlWindow {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl GlWindow {
    /// Create the window and make its context current on this thread
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        config.validate()?;

        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| WindowError::InitializationFailed(e.to_string()))?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.make_current();
        window.set_key_polling(true);
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_content_scale_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_mouse_button_polling(true);

        let interval = if config.vsync { glfw::SwapInterval::Sync(1) } else { glfw::SwapInterval::None };
        glfw.set_swap_interval(interval);

        log::info!(
            "Created {}x{} window '{}' (framebuffer {:?})",
            config.width,
            config.height,
            config.title,
            window.get_framebuffer_size()
        );
        Ok(Self { glfw, window, events })
    }

    /// Load OpenGL function pointers for this window's context
    pub fn load_gl(&mut self) -> glow::Context {
        // SAFETY: the context was made current on this thread in `new`, and
        // the returned pointers are only used while the window lives.
        unsafe { glow::Context::from_loader_function(|name| self.window.get_proc_address(name) as *const _) }
    }

    /// Whether the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Set whether the window should close
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Process pending window system events
    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
    }

    /// Drain events received since the last call
    pub fn flush_events(&self) -> Vec<glfw::WindowEvent> {
        glfw::flush_messages(&self.events).map(|(_, event)| event).collect()
    }

    /// Present the back buffer
    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    /// Window size in screen coordinates
    pub fn size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Framebuffer size in pixels
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Framebuffer pixels per screen coordinate on each axis
    pub fn pixel_scale(&self) -> (f32, f32) {
        let (width, height) = self.size();
        let (fb_width, fb_height) = self.framebuffer_size();
        if width == 0 || height == 0 {
            return (1.0, 1.0);
        }
        (fb_width as f32 / width as f32, fb_height as f32 / height as f32)
    }

    /// Monitor content scale, used as the font DPI factor
    pub fn content_scale(&self) -> f32 {
        let (x, y) = self.window.get_content_scale();
        x.max(y)
    }

    /// Cursor position in screen coordinates
    pub fn cursor_pos(&self) -> (f64, f64) {
        self.window.get_cursor_pos()
    }

    /// Whether the left mouse button is held
    pub fn left_button_down(&self) -> bool {
        self.window.get_mouse_button(glfw::MouseButton::Button1) != glfw::Action::Release
    }
}
