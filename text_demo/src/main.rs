//! Text rendering demo
//!
//! Opens a window, draws text through the glyph cache (printable ASCII is
//! warmed up, everything else loads on first use) and a clickable widget.
//! Settings come from the TOML or RON file named on the command line, or
//! `text_demo.toml`, falling back to defaults.

use std::rc::Rc;
use std::sync::Arc;

use glfw::{Action, Key, WindowEvent};
use glyph_engine::foundation::logging;
use glyph_engine::prelude::*;
use thiserror::Error;

const LINES: &[&str] = &[
    "The quick brown fox jumps over the lazy dog.",
    "Ελληνικά, кириллица and ÀÉÎÕÜ load in batches of 32.",
    "Characters the font lacks are skipped: [\u{E000}]",
];

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Text(#[from] TextError),
    #[error(transparent)]
    Gl(#[from] GlError),
}

struct TextDemo {
    // Field order matters: GL objects go before the window that owns the context.
    text: FontContext<glow::Context>,
    button: Widget<glow::Context>,
    gl: Rc<glow::Context>,
    window: GlWindow,
    clear_color: Color,
    clicks: u32,
    frames: u64,
}

impl TextDemo {
    fn new(config: &ApplicationConfig) -> Result<Self, DemoError> {
        log::info!("Creating window...");
        let mut window = GlWindow::new(&config.window)?;
        let gl = Rc::new(window.load_gl());

        let info = OpenGlInfo::query(&*gl);
        log::info!("OpenGL context:\n{}", info);
        if !info.supports_version(3, 3) {
            log::warn!("OpenGL 3.3 not reported, rendering may fail");
        }

        let (width, height) = window.framebuffer_size();
        init_render_state(&*gl);
        resize_viewport(&*gl, width, height);

        let content_scale = window.content_scale();
        let text_config = config.text.clone().with_dpi_scale(config.text.dpi_scale * content_scale);
        let font = text_config.load_font()?;
        let text = FontContext::new(&gl, Arc::new(font), &text_config, &ShaderSources::glyph(), (width, height))?;

        let (scale_x, scale_y) = window.pixel_scale();
        let mut button = Widget::new(&gl, &ShaderSources::widget())?;
        button.set_window(width, height, scale_x, scale_y);
        button.set_position(-0.9, 0.4, 260.0 * scale_x, 64.0 * scale_y);
        button.set_color(Color::new(0.2, 0.35, 0.6, 1.0));

        Ok(Self {
            text,
            button,
            gl,
            window,
            clear_color: config.window.clear_color,
            clicks: 0,
            frames: 0,
        })
    }

    fn run(&mut self) {
        log::info!("Entering main loop");
        while !self.window.should_close() {
            self.window.poll_events();
            for event in self.window.flush_events() {
                self.handle_event(event);
            }
            self.render_frame();
            self.window.swap_buffers();
            self.frames += 1;
        }

        let stats = self.text.cache().stats();
        log::info!(
            "Exiting after {} frames: {} glyphs cached, {} hits, {} misses, {} batches",
            self.frames,
            self.text.cache().len(),
            stats.hits,
            stats.misses,
            stats.batches
        );
    }

    fn handle_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::Key(Key::Escape, _, Action::Press, _) | WindowEvent::Close => {
                self.window.set_should_close(true);
            }
            WindowEvent::FramebufferSize(width, height) => {
                self.resize(width.max(1) as u32, height.max(1) as u32);
            }
            WindowEvent::CursorPos(..) | WindowEvent::MouseButton(..) => {
                let (x, y) = self.window.cursor_pos();
                let down = self.window.left_button_down();
                for transition in self.button.set_mouse(x, y, down) {
                    if transition == MouseTransition::Released {
                        self.clicks += 1;
                        log::info!("Button clicked ({} total)", self.clicks);
                    }
                }
            }
            _ => {}
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        resize_viewport(&*self.gl, width, height);
        self.text.set_resolution(width, height);
        let (scale_x, scale_y) = self.window.pixel_scale();
        self.button.set_window(width, height, scale_x, scale_y);
    }

    fn render_frame(&mut self) {
        clear(&*self.gl, self.clear_color);
        let (width, height) = self.text.resolution();
        let line_height = self.text.line_height();

        self.text.set_color(Color::WHITE);
        let title = self.text.draw_text_normalized(-0.9, -0.8, 1.0, "glyph_engine");

        self.text.set_color(Color::new(0.75, 0.75, 0.75, 1.0));
        let mut y = title.end.y + line_height;
        for line in LINES {
            self.text.draw_text(line, (title_x(width), y), 0.75);
            y += line_height * 0.75;
        }

        self.button.draw();
        let origin = self.button.state().pixel_origin();
        let label = format!("Clicked {} times", self.clicks);
        self.text.set_color(Color::WHITE);
        self.text.draw_text(&label, (origin.0 + 16.0, origin.1 + line_height * 0.6), 0.6);

        let stats = self.text.cache().stats();
        let status = format!(
            "{} glyphs, {} batches, {} unavailable",
            self.text.cache().len(),
            stats.batches,
            stats.failures
        );
        let status_width = self.text.measure_width(0.5, &status);
        self.text.set_color(Color::new(0.5, 0.8, 0.5, 1.0));
        self.text.draw_text(&status, ((width as f32 - status_width) / 2.0, height as f32 - line_height * 0.5), 0.5);
    }
}

fn title_x(width: u32) -> f32 {
    width as f32 * 0.05
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "text_demo.toml".to_string());
    let config = ApplicationConfig::load_or_default(&config_path)?;
    logging::init_with_level(&config.engine.log_level);
    config.validate()?;

    log::info!("Starting text demo with {}", config_path);
    let mut demo = TextDemo::new(&config)?;
    demo.run();
    Ok(())
}
