//! Driver and context capability report

use std::fmt;

use super::device::{GlDevice, IntegerQuery, StringQuery};

/// Vendor, version and extension information of the current context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenGlInfo {
    /// `GL_VENDOR`
    pub vendor: String,
    /// `GL_RENDERER`
    pub renderer: String,
    /// `GL_VERSION`
    pub version_string: String,
    /// Context major version
    pub version_major: i32,
    /// Context minor version
    pub version_minor: i32,
    /// `GL_SHADING_LANGUAGE_VERSION`
    pub shader_version: String,
    /// Supported extensions
    pub extensions: Vec<String>,
}

impl OpenGlInfo {
    /// Query the device
    pub fn query<D: GlDevice>(device: &D) -> Self {
        let count = device.get_integer(IntegerQuery::NumExtensions).max(0) as u32;
        Self {
            vendor: device.get_string(StringQuery::Vendor),
            renderer: device.get_string(StringQuery::Renderer),
            version_string: device.get_string(StringQuery::Version),
            version_major: device.get_integer(IntegerQuery::MajorVersion),
            version_minor: device.get_integer(IntegerQuery::MinorVersion),
            shader_version: device.get_string(StringQuery::ShadingLanguageVersion),
            extensions: (0..count).map(|i| device.extension(i)).collect(),
        }
    }

    /// Whether `extension` is advertised
    pub fn supports_extension(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }

    /// Whether the context version is at least `major.minor`
    pub fn supports_version(&self, major: i32, minor: i32) -> bool {
        self.version_major > major || (self.version_major == major && self.version_minor >= minor)
    }
}

impl fmt::Display for OpenGlInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vendor: {}", self.vendor)?;
        writeln!(f, "Renderer: {}", self.renderer)?;
        writeln!(f, "Version: {}", self.version_string)?;
        write!(f, "Shader Version: {}", self.shader_version)?;
        if !self.extensions.is_empty() {
            write!(f, "\nExtensions:")?;
            for ext in &self.extensions {
                write!(f, "\n  {ext}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gl::RecordingDevice;

    #[test]
    fn test_query_and_version_checks() {
        let device = RecordingDevice::new().with_extensions(vec!["GL_EXT_a".into(), "GL_EXT_b".into()]);
        let info = OpenGlInfo::query(&device);

        assert_eq!(info.extensions, vec!["GL_EXT_a", "GL_EXT_b"]);
        assert!(info.supports_extension("GL_EXT_b"));
        assert!(!info.supports_extension("GL_EXT_c"));
        assert!(info.supports_version(3, 3));
        assert!(info.supports_version(2, 1));
        assert!(!info.supports_version(4, 0));

        let text = info.to_string();
        assert!(text.starts_with("Vendor: glyph_engine\n"));
        assert!(text.ends_with("Extensions:\n  GL_EXT_a\n  GL_EXT_b"));
    }
}
