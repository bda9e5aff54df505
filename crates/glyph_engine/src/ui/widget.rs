//! Rectangular interactive widget
//!
//! A widget is one triangle-strip quad whose fragment shader reacts to the
//! mouse. Placement uses a normalized top-left corner in `[-1, 1]` (y-down,
//! matching [`crate::render::text::FontContext::draw_text_normalized`]) and a
//! size in framebuffer pixels.

use std::rc::Rc;

use crate::foundation::math::{normalized_to_pixels, Color};
use crate::render::gl::{
    report_state_error, BindingScope, GlDevice, GlResult, Primitive, ShaderProgram, ShaderSources,
    VertexArray, VertexAttribute,
};

const WIDGET_VERTEX: &str = r"#version 330 core

in vec2 vert;

void main() {
    gl_Position = vec4(vert, 0.0, 1.0);
}
";

const WIDGET_FRAGMENT: &str = r"#version 330 core

uniform vec4 u_color;
uniform vec2 u_resolution;
uniform vec2 u_mouse;
uniform int u_mouse_down;
uniform int u_mouse_over;

out vec4 outputColor;

void main() {
    vec4 color = u_color;
    if (u_mouse_over == 1) {
        float d = distance(gl_FragCoord.xy, u_mouse) / length(u_resolution);
        color.rgb += 0.25 * (1.0 - smoothstep(0.0, 0.25, d));
        if (u_mouse_down == 1) {
            color.rgb *= 0.8;
        }
    }
    outputColor = color;
}
";

impl ShaderSources {
    /// Widget program
    ///
    /// Attribute `vert` (clip space); uniforms `u_color`, `u_resolution`,
    /// `u_mouse`, `u_mouse_down` and `u_mouse_over`.
    pub fn widget() -> Self {
        Self::new(WIDGET_VERTEX, WIDGET_FRAGMENT)
    }
}

/// Change in mouse state relative to the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseTransition {
    /// The cursor moved onto the widget
    Entered,
    /// The cursor moved off the widget
    Left,
    /// The button went down over the widget
    Pressed,
    /// The button went up over the widget
    Released,
}

/// Geometry and mouse state of a widget, independent of the GPU
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetState {
    /// Normalized left edge
    pub x: f32,
    /// Normalized top edge
    pub y: f32,
    /// Width in framebuffer pixels
    pub width: f32,
    /// Height in framebuffer pixels
    pub height: f32,
    /// Framebuffer size in pixels
    pub window: (u32, u32),
    /// Framebuffer pixels per screen coordinate
    pub scale: (f32, f32),
    /// Cursor in framebuffer pixels, y-down
    pub mouse: (f32, f32),
    /// Whether the button is held
    pub mouse_down: bool,
    /// Whether the cursor is over the widget
    pub mouse_over: bool,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            x: -1.0,
            y: -1.0,
            width: 0.0,
            height: 0.0,
            window: (1, 1),
            scale: (1.0, 1.0),
            mouse: (0.0, 0.0),
            mouse_down: false,
            mouse_over: false,
        }
    }
}

impl WidgetState {
    /// Top-left corner in framebuffer pixels
    pub fn pixel_origin(&self) -> (f32, f32) {
        (normalized_to_pixels(self.x, self.window.0), normalized_to_pixels(self.y, self.window.1))
    }

    /// Whether a framebuffer pixel lies strictly inside the widget
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (left, top) = self.pixel_origin();
        x > left && x < left + self.width && y > top && y < top + self.height
    }

    /// Record a cursor position in screen coordinates and the button state
    pub fn update_mouse(&mut self, x: f64, y: f64, down: bool) -> Vec<MouseTransition> {
        let was_over = self.mouse_over;
        let was_down = self.mouse_down;

        self.mouse = ((x as f32) * self.scale.0, (y as f32) * self.scale.1);
        self.mouse_down = down;
        self.mouse_over = self.contains(self.mouse.0, self.mouse.1);

        let mut transitions = Vec::new();
        match (was_over, self.mouse_over) {
            (false, true) => transitions.push(MouseTransition::Entered),
            (true, false) => transitions.push(MouseTransition::Left),
            _ => {}
        }
        if self.mouse_over {
            match (was_down, down) {
                (false, true) => transitions.push(MouseTransition::Pressed),
                (true, false) => transitions.push(MouseTransition::Released),
                _ => {}
            }
        }
        transitions
    }

    /// Cursor for `gl_FragCoord` comparisons (y-up)
    pub fn mouse_frag_coord(&self) -> [f32; 2] {
        [self.mouse.0, self.window.1 as f32 - self.mouse.1]
    }

    /// Clip-space triangle strip covering the widget
    pub fn vertices(&self) -> [f32; 8] {
        let xn = (self.x + 1.0) / 2.0;
        let yn = (self.y + 1.0) / 2.0;
        let wn = self.width / self.window.0.max(1) as f32;
        let hn = self.height / self.window.1.max(1) as f32;
        let t = |v: f32| (v - 0.5) * 2.0;

        [
            t(xn), -t(yn),
            t(xn), -t(yn + hn),
            t(xn + wn), -t(yn),
            t(xn + wn), -t(yn + hn),
        ]
    }
}

/// A drawable, mouse-aware rectangle
pub struct Widget<D: GlDevice> {
    device: Rc<D>,
    program: ShaderProgram<D>,
    quad: VertexArray<D>,
    state: WidgetState,
    color: Color,
    positioned: bool,
}

impl<D: GlDevice> Widget<D> {
    /// Compile the widget program and create its quad; the color starts white
    pub fn new(device: &Rc<D>, shaders: &ShaderSources) -> GlResult<Self> {
        let program = ShaderProgram::from_sources(device, shaders)?;
        let quad = VertexArray::new(device, &[VertexAttribute::new(program.attrib_location("vert")?, 2)])?;
        program.set_uniform_4f("u_color", Color::WHITE.to_array())?;

        Ok(Self {
            device: Rc::clone(device),
            program,
            quad,
            state: WidgetState::default(),
            color: Color::WHITE,
            positioned: false,
        })
    }

    /// Set the fill color
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        if let Err(err) = self.program.set_uniform_4f("u_color", color.to_array()) {
            report_state_error(&err);
        }
    }

    /// Set the framebuffer size and the framebuffer-per-screen scale
    pub fn set_window(&mut self, width: u32, height: u32, scale_x: f32, scale_y: f32) {
        self.state.window = (width, height);
        self.state.scale = (scale_x, scale_y);
        if let Err(err) = self.program.set_uniform_2f("u_resolution", [width as f32, height as f32]) {
            report_state_error(&err);
        }
        if self.positioned {
            self.upload_quad();
        }
    }

    /// Place the widget
    ///
    /// `x` and `y` are the normalized top-left corner; `width` and `height`
    /// are framebuffer pixels.
    pub fn set_position(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.state.x = x;
        self.state.y = y;
        self.state.width = width;
        self.state.height = height;
        self.positioned = true;
        self.upload_quad();
    }

    /// Feed the cursor position (screen coordinates) and button state
    pub fn set_mouse(&mut self, x: f64, y: f64, down: bool) -> Vec<MouseTransition> {
        let transitions = self.state.update_mouse(x, y, down);
        for transition in &transitions {
            log::trace!("Widget mouse transition: {:?}", transition);
        }

        let uniforms = self
            .program
            .set_uniform_2f("u_mouse", self.state.mouse_frag_coord())
            .and_then(|()| self.program.set_uniform_1i("u_mouse_down", i32::from(down)))
            .and_then(|()| self.program.set_uniform_1i("u_mouse_over", i32::from(self.state.mouse_over)));
        if let Err(err) = uniforms {
            report_state_error(&err);
        }
        transitions
    }

    /// Draw the quad; does nothing until the widget has a position
    pub fn draw(&self) {
        if !self.positioned {
            log::debug!("Skipping draw of unpositioned widget");
            return;
        }
        let _scope = BindingScope::capture(&*self.device, 0);
        let _program = self.program.bind();
        let _vertex_array = self.quad.bind();
        self.device.draw_arrays(Primitive::TriangleStrip, 0, 4);
    }

    /// Geometry and mouse state
    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    /// Fill color
    pub fn color(&self) -> Color {
        self.color
    }

    fn upload_quad(&self) {
        if let Err(err) = self.quad.buffer_data(&self.state.vertices()) {
            report_state_error(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::render::gl::recording::UniformValue;
    use crate::render::gl::RecordingDevice;

    fn state() -> WidgetState {
        // 200x100 px widget at pixel (400, 150) in an 800x600 framebuffer.
        WidgetState {
            x: 0.0,
            y: -0.5,
            width: 200.0,
            height: 100.0,
            window: (800, 600),
            scale: (2.0, 2.0),
            ..WidgetState::default()
        }
    }

    #[test]
    fn test_contains_is_strict() {
        let state = state();
        assert_eq!(state.pixel_origin(), (400.0, 150.0));
        assert!(state.contains(500.0, 200.0));
        assert!(!state.contains(400.0, 200.0));
        assert!(!state.contains(600.0, 200.0));
        assert!(!state.contains(500.0, 250.0));
        assert!(!state.contains(10.0, 10.0));
    }

    #[test]
    fn test_mouse_transitions() {
        let mut state = state();
        // Screen coordinates are half the framebuffer pixels.
        assert!(state.update_mouse(10.0, 10.0, false).is_empty());
        assert_eq!(state.update_mouse(250.0, 100.0, false), vec![MouseTransition::Entered]);
        assert_eq!(state.update_mouse(250.0, 100.0, true), vec![MouseTransition::Pressed]);
        assert!(state.update_mouse(251.0, 101.0, true).is_empty());
        assert_eq!(state.update_mouse(251.0, 101.0, false), vec![MouseTransition::Released]);
        assert_eq!(state.update_mouse(0.0, 0.0, true), vec![MouseTransition::Left]);
        assert_eq!(state.update_mouse(250.0, 100.0, true), vec![MouseTransition::Entered]);
    }

    #[test]
    fn test_vertices_cover_rect() {
        let v = state().vertices();
        // Left edge at x = 0 in clip space, top edge at pixel 150 of 600.
        assert_relative_eq!(v[0], 0.0);
        assert_relative_eq!(v[1], 0.5);
        assert_relative_eq!(v[3], 0.5 - 100.0 / 300.0);
        assert_relative_eq!(v[4], 0.5);
        assert_relative_eq!(v[7], v[3]);
    }

    #[test]
    fn test_widget_uniforms_and_draw() {
        let device = Rc::new(RecordingDevice::new());
        let mut widget = Widget::new(&device, &ShaderSources::widget()).unwrap();
        let program = widget.program.handle();

        widget.draw();
        assert!(device.draw_calls().is_empty());

        widget.set_window(800, 600, 2.0, 2.0);
        widget.set_position(0.0, -0.5, 200.0, 100.0);
        widget.set_color(Color::new(0.2, 0.4, 0.6, 1.0));
        let transitions = widget.set_mouse(250.0, 100.0, true);

        assert_eq!(transitions, vec![MouseTransition::Entered, MouseTransition::Pressed]);
        assert_eq!(device.uniform(program, "u_resolution"), Some(UniformValue::Vec2([800.0, 600.0])));
        assert_eq!(device.uniform(program, "u_mouse"), Some(UniformValue::Vec2([500.0, 400.0])));
        assert_eq!(device.uniform(program, "u_mouse_down"), Some(UniformValue::Int(1)));
        assert_eq!(device.uniform(program, "u_mouse_over"), Some(UniformValue::Int(1)));
        assert_eq!(device.uniform(program, "u_color"), Some(UniformValue::Vec4([0.2, 0.4, 0.6, 1.0])));

        widget.draw();
        let draws = device.draw_calls();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].count, 4);
        assert_eq!(draws[0].vertices, widget.state().vertices().to_vec());
        assert_eq!(device.current_program(), None);
        assert_eq!(device.current_vertex_array(), None);
    }
}
