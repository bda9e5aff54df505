//! Font context: cached glyphs plus the program and buffer that draw them
//!
//! Each draw binds the glyph program and quad vertex array inside a
//! [`BindingScope`], uploads one quad per glyph and issues a 4-vertex
//! triangle strip. Whatever was bound before the call is bound after it.

use std::rc::Rc;
use std::sync::Arc;

use super::font::GlyphSource;
use super::glyph_cache::GlyphCache;
use super::layout::{layout, GlyphQuad, LayoutSummary, RenderCursor};
use super::rasterizer::{GlyphRasterizer, RasterSettings};
use super::TextResult;
use crate::core::config::TextConfig;
use crate::foundation::math::{normalized_to_pixels, Color};
use crate::render::gl::{
    report_state_error, BindingScope, GlDevice, Primitive, ShaderProgram, ShaderSources, VertexArray,
    VertexAttribute,
};

/// Texture unit glyphs are sampled from
const GLYPH_TEXTURE_UNIT: u32 = 0;

/// Renders strings with one font at one size
pub struct FontContext<D: GlDevice> {
    device: Rc<D>,
    cache: GlyphCache<D>,
    program: ShaderProgram<D>,
    quad: VertexArray<D>,
    color: Color,
    resolution: (u32, u32),
    line_height: f32,
}

impl<D: GlDevice> FontContext<D> {
    /// Build a font context
    ///
    /// Compiles `shaders`, creates the quad vertex array, warms the glyph
    /// cache with `config.warm_up_range` and sets the resolution to
    /// `resolution` and the color to white.
    ///
    /// # Arguments
    /// * `device` - Device owning the current context
    /// * `source` - Font to rasterize from, shareable between contexts
    /// * `config` - Size, filter and cache settings
    /// * `shaders` - Glyph program, usually [`ShaderSources::glyph`]
    /// * `resolution` - Framebuffer size in pixels
    pub fn new(
        device: &Rc<D>,
        source: Arc<dyn GlyphSource>,
        config: &TextConfig,
        shaders: &ShaderSources,
        resolution: (u32, u32),
    ) -> TextResult<Self> {
        config.validate()?;

        let program = ShaderProgram::from_sources(device, shaders)?;
        let attributes = [
            VertexAttribute::new(program.attrib_location("vert")?, 2),
            VertexAttribute::new(program.attrib_location("vertTexCoord")?, 2),
        ];
        let quad = VertexArray::new(device, &attributes)?.with_verification(config.verify_uploads);
        program.set_uniform_1i("tex", GLYPH_TEXTURE_UNIT as i32)?;

        let rasterizer = GlyphRasterizer::new(source, RasterSettings::new(config.pixel_size, config.dpi_scale))?;
        let line_height = rasterizer
            .line_metrics()
            .map_or(config.pixel_size * config.dpi_scale, |m| m.line_height().round());
        let mut cache =
            GlyphCache::new(device, rasterizer, config.filter).with_remember_missing(config.remember_missing);
        if let Some(range) = &config.warm_up_range {
            cache.warm_up(range.clone());
        }

        let context = Self {
            device: Rc::clone(device),
            cache,
            program,
            quad,
            color: Color::WHITE,
            resolution,
            line_height,
        };
        context.program.set_uniform_2f("u_resolution", resolution_uniform(resolution))?;
        context.program.set_uniform_4f("textColor", Color::WHITE.to_array())?;

        log::info!(
            "Font context ready: {}px at {}x scale, {} glyphs cached",
            config.pixel_size,
            config.dpi_scale,
            context.cache.len()
        );
        Ok(context)
    }

    /// Draw `text` with its first baseline point at `origin` (pixels, y-down)
    ///
    /// Characters the font cannot render are skipped without advancing.
    pub fn draw_text(&mut self, text: &str, origin: impl Into<RenderCursor>, scale: f32) -> LayoutSummary {
        let origin = origin.into();
        if text.is_empty() {
            return LayoutSummary { placed: 0, skipped: 0, end: origin };
        }

        let device = &*self.device;
        let quad = &self.quad;
        let _scope = BindingScope::capture(device, GLYPH_TEXTURE_UNIT);
        let _program = self.program.bind();
        let _vertex_array = quad.bind();

        layout(&mut self.cache, text, origin, scale, |entry, glyph_quad: &GlyphQuad| {
            device.bind_texture_2d(Some(entry.texture));
            if let Err(err) = quad.buffer_data(glyph_quad.as_floats()) {
                report_state_error(&err);
            }
            device.draw_arrays(Primitive::TriangleStrip, 0, GlyphQuad::VERTEX_COUNT);
        })
    }

    /// Draw `text` at a normalized position in `[-1, 1]`
    ///
    /// `(-1, -1)` is the top-left corner of the framebuffer, `(1, 1)` the
    /// bottom-right.
    pub fn draw_text_normalized(&mut self, x_norm: f32, y_norm: f32, scale: f32, text: &str) -> LayoutSummary {
        let (width, height) = self.resolution;
        let origin = RenderCursor::new(normalized_to_pixels(x_norm, width), normalized_to_pixels(y_norm, height));
        self.draw_text(text, origin, scale)
    }

    /// Width of `text` in pixels, exactly as [`Self::draw_text`] would advance
    pub fn measure_width(&mut self, scale: f32, text: &str) -> f32 {
        layout(&mut self.cache, text, RenderCursor::default(), scale, |_, _| {}).end.x
    }

    /// Set the text color for subsequent draws
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        if let Err(err) = self.program.set_uniform_4f("textColor", color.to_array()) {
            report_state_error(&err);
        }
    }

    /// Set the framebuffer size used to map pixels to clip space
    ///
    /// Cached glyphs are unaffected.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = (width, height);
        if let Err(err) = self.program.set_uniform_2f("u_resolution", resolution_uniform(self.resolution)) {
            report_state_error(&err);
        }
    }

    /// Current text color
    pub fn color(&self) -> Color {
        self.color
    }

    /// Current framebuffer size
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    /// The glyph cache
    pub fn cache(&self) -> &GlyphCache<D> {
        &self.cache
    }

    /// Baseline-to-baseline distance in pixels at scale 1
    pub fn line_height(&self) -> f32 {
        self.line_height
    }
}

fn resolution_uniform((width, height): (u32, u32)) -> [f32; 2] {
    [width.max(1) as f32, height.max(1) as f32]
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::render::gl::recording::UniformValue;
    use crate::render::gl::{GlError, RecordingDevice};
    use crate::render::text::font::testing::SyntheticFont;
    use crate::render::text::TextError;

    fn config() -> TextConfig {
        let mut config = TextConfig::new("unused.ttf");
        config.verify_uploads = true;
        config
    }

    fn context_with(config: &TextConfig) -> (Rc<RecordingDevice>, Arc<SyntheticFont>, FontContext<RecordingDevice>) {
        let device = Rc::new(RecordingDevice::new());
        let font = Arc::new(SyntheticFont::ascii());
        let context = FontContext::new(
            &device,
            Arc::clone(&font) as Arc<dyn GlyphSource>,
            config,
            &ShaderSources::glyph(),
            (800, 600),
        )
        .unwrap();
        (device, font, context)
    }

    fn first_x(vertices: &[f32]) -> f32 {
        vertices[0]
    }

    #[test]
    fn test_draw_ab() {
        let (device, _font, mut context) = context_with(&config());
        let advance_a = context.cache().get('A').unwrap().metrics.advance as f32;

        let summary = context.draw_text("AB", (40.0, 100.0), 1.0);

        let draws = device.draw_calls();
        assert_eq!(draws.len(), 2);
        for draw in &draws {
            assert_eq!(draw.primitive, Primitive::TriangleStrip);
            assert_eq!(draw.count, 4);
            assert_eq!(draw.vertices.len(), 16);
        }
        assert_relative_eq!(first_x(&draws[1].vertices), first_x(&draws[0].vertices) + advance_a);
        assert_eq!(draws[0].texture, Some(context.cache().get('A').unwrap().texture));
        assert_eq!(draws[1].texture, Some(context.cache().get('B').unwrap().texture));
        assert_eq!(summary.placed, 2);
    }

    #[test]
    fn test_draw_restores_bindings() {
        let (device, _font, mut context) = context_with(&config());
        let foreign_texture = device.create_texture().unwrap();
        let foreign_vao = device.create_vertex_array().unwrap();
        device.bind_texture_2d(Some(foreign_texture));
        device.bind_vertex_array(Some(foreign_vao));

        context.draw_text("Hi!", (0.0, 32.0), 1.0);

        assert_eq!(device.current_texture_2d(), Some(foreign_texture));
        assert_eq!(device.current_vertex_array(), Some(foreign_vao));
        assert_eq!(device.current_program(), None);
        assert_eq!(device.current_array_buffer(), None);
        // The program was installed while drawing.
        assert!(device.draw_calls().iter().all(|d| d.program.is_some()));
    }

    #[test]
    fn test_measure_matches_draw() {
        let (_device, _font, mut context) = context_with(&config());
        let text = "Quartz glyph, vex'd jocks!";

        let width = context.measure_width(1.5, text);
        let summary = context.draw_text(text, (10.0, 50.0), 1.5);

        let expected: f32 = text
            .chars()
            .filter_map(|ch| context.cache().get(ch))
            .map(|entry| entry.metrics.advance as f32 * 1.5)
            .sum();
        assert_relative_eq!(width, expected);
        assert_relative_eq!(summary.end.x - 10.0, width, epsilon = 1e-3);
    }

    #[test]
    fn test_unavailable_glyph_skipped_in_draw() {
        let (device, _font, mut context) = context_with(&config());

        context.draw_text("AB", (0.0, 40.0), 1.0);
        let plain = device.draw_calls();
        device.clear_draw_calls();
        let summary = context.draw_text("A\u{4E2D}B", (0.0, 40.0), 1.0);

        assert_eq!(summary.skipped, 1);
        assert_eq!(device.draw_calls(), plain);
        assert_eq!(context.measure_width(1.0, "A\u{4E2D}B"), context.measure_width(1.0, "AB"));
    }

    #[test]
    fn test_resolution_does_not_touch_glyphs() {
        let (device, font, mut context) = context_with(&config());
        let before = *context.cache().get('W').unwrap();
        let textures = device.textures_created();
        let calls = font.rasterize_calls();

        context.set_resolution(1920, 1080);

        assert_eq!(*context.cache().get('W').unwrap(), before);
        assert_eq!(device.textures_created(), textures);
        assert_eq!(font.rasterize_calls(), calls);
        assert_eq!(context.resolution(), (1920, 1080));
        assert_eq!(
            device.uniform(context.program.handle(), "u_resolution"),
            Some(UniformValue::Vec2([1920.0, 1080.0]))
        );
    }

    #[test]
    fn test_initial_uniforms_and_color() {
        let (device, _font, mut context) = context_with(&config());
        let program = context.program.handle();
        assert_eq!(device.uniform(program, "tex"), Some(UniformValue::Int(0)));
        assert_eq!(device.uniform(program, "textColor"), Some(UniformValue::Vec4([1.0; 4])));
        assert_eq!(context.color(), Color::WHITE);

        let red = Color::new(1.0, 0.0, 0.0, 0.5);
        context.set_color(red);
        assert_eq!(context.color(), red);
        assert_eq!(device.uniform(program, "textColor"), Some(UniformValue::Vec4(red.to_array())));
    }

    #[test]
    fn test_normalized_position() {
        let (device, _font, mut context) = context_with(&config());
        let glyph = *context.cache().get('A').unwrap();

        context.draw_text_normalized(0.0, 0.0, 1.0, "A");

        let vertices = &device.draw_calls()[0].vertices;
        let expected = GlyphQuad::new(RenderCursor::new(400.0, 300.0), &glyph.metrics, 1.0);
        assert_eq!(vertices.as_slice(), expected.as_floats());
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let (device, _font, mut context) = context_with(&config());
        let summary = context.draw_text("", (5.0, 5.0), 1.0);
        assert_eq!(summary.end, RenderCursor::new(5.0, 5.0));
        assert!(device.draw_calls().is_empty());
        assert_eq!(context.measure_width(1.0, ""), 0.0);
    }

    #[test]
    fn test_warm_up_and_line_height() {
        let (_device, font, context) = context_with(&config());
        assert_eq!(context.cache().len(), 95);
        assert_eq!(font.rasterize_calls(), 95);
        // ascent 24 + descent 8 + gap 4
        assert_eq!(context.line_height(), 36.0);

        let lazy = config().with_warm_up(None);
        let (_device, font, context) = context_with(&lazy);
        assert!(context.cache().is_empty());
        assert_eq!(font.rasterize_calls(), 0);
    }

    #[test]
    fn test_setup_errors() {
        let device = Rc::new(RecordingDevice::new());
        let source: Arc<dyn GlyphSource> = Arc::new(SyntheticFont::ascii());

        let broken = ShaderSources::new("#version 330 core\n#error broken\n", "void main() {}");
        let result = FontContext::new(&device, Arc::clone(&source), &config(), &broken, (640, 480));
        assert!(matches!(result, Err(TextError::Gl(GlError::ShaderCompile { .. }))));

        let no_coords = ShaderSources::new("in vec2 vert;\nvoid main() {}", "void main() {}");
        let result = FontContext::new(&device, Arc::clone(&source), &config(), &no_coords, (640, 480));
        assert!(matches!(result, Err(TextError::Gl(GlError::UnknownAttribute(name))) if name == "vertTexCoord"));

        let bad_size = config().with_pixel_size(-3.0);
        let result = FontContext::new(&device, source, &bad_size, &ShaderSources::glyph(), (640, 480));
        assert!(matches!(result, Err(TextError::Config(_))));

        assert_eq!(device.live_objects(), 0);
    }

    #[test]
    fn test_drop_releases_gpu_objects() {
        let (device, _font, context) = context_with(&config());
        assert!(device.live_textures() > 0);
        drop(context);
        assert_eq!(device.live_textures(), 0);
        assert_eq!(device.live_objects(), 0);
    }
}
