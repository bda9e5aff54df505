//! Built-in GLSL for glyph quads

use crate::render::gl::ShaderSources;

const GLYPH_VERTEX: &str = r"#version 330 core

in vec2 vert;
in vec2 vertTexCoord;

uniform vec2 u_resolution;

out vec2 fragTexCoord;

void main() {
    fragTexCoord = vertTexCoord;
    // Pixel space is y-down.
    vec2 ndc = vert / u_resolution * 2.0 - 1.0;
    gl_Position = vec4(ndc.x, -ndc.y, 0.0, 1.0);
}
";

const GLYPH_FRAGMENT: &str = r"#version 330 core

in vec2 fragTexCoord;

uniform sampler2D tex;
uniform vec4 textColor;

out vec4 outputColor;

void main() {
    vec4 sampled = vec4(1.0, 1.0, 1.0, texture(tex, fragTexCoord).a);
    outputColor = textColor * sampled;
}
";

impl ShaderSources {
    /// Glyph quad program
    ///
    /// Attributes `vert` (pixels) and `vertTexCoord`; uniforms
    /// `u_resolution`, `tex` and `textColor`.
    pub fn glyph() -> Self {
        Self::new(GLYPH_VERTEX, GLYPH_FRAGMENT)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::render::gl::{RecordingDevice, ShaderProgram};

    #[test]
    fn test_glyph_program_interface() {
        let device = Rc::new(RecordingDevice::new());
        let program = ShaderProgram::from_sources(&device, &ShaderSources::glyph()).unwrap();

        assert_eq!(program.attrib_location("vert").unwrap(), 0);
        assert_eq!(program.attrib_location("vertTexCoord").unwrap(), 1);
        let uniforms: Vec<_> = program.active_uniforms().into_iter().map(|u| u.name).collect();
        assert_eq!(uniforms, vec!["u_resolution", "tex", "textColor"]);
    }
}
