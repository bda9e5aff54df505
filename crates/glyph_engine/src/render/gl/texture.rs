//! Glyph texture upload

use super::device::{GlDevice, TextureFilter};
use super::{GlError, GlResult};

/// Uploads glyph bitmaps as standalone 2D textures
pub struct GlyphTexture;

impl GlyphTexture {
    /// Allocate one RGBA8 texture holding `rgba`
    ///
    /// Wrapping is clamp-to-edge on both axes and `filter` is used for
    /// minification and magnification. The `TEXTURE_2D` binding of the active
    /// unit is left as it was found.
    ///
    /// # Arguments
    /// * `device` - Device owning the current context
    /// * `width`, `height` - Bitmap size in pixels, both non-zero
    /// * `rgba` - Tightly packed pixels, `width * height * 4` bytes
    /// * `filter` - Sampling filter
    pub fn upload<D: GlDevice>(
        device: &D,
        width: u32,
        height: u32,
        rgba: &[u8],
        filter: TextureFilter,
    ) -> GlResult<D::Texture> {
        if width == 0 || height == 0 || rgba.len() != width as usize * height as usize * 4 {
            return Err(GlError::InvalidTextureSize { width, height, len: rgba.len() });
        }

        let texture = device
            .create_texture()
            .map_err(|reason| GlError::ObjectCreation { object: "texture", reason })?;
        let previous = device.current_texture_2d();

        device.bind_texture_2d(Some(texture));
        device.texture_2d_parameters(filter);
        device.texture_2d_rgba(width, height, rgba);
        device.bind_texture_2d(previous);

        log::trace!("Uploaded {}x{} glyph texture {:?}", width, height, texture);
        Ok(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gl::RecordingDevice;

    #[test]
    fn test_upload_sets_parameters_and_restores_binding() {
        let device = RecordingDevice::new();
        let pixels = vec![255u8; 3 * 2 * 4];

        let texture = GlyphTexture::upload(&device, 3, 2, &pixels, TextureFilter::Nearest).unwrap();

        let record = device.texture(texture).unwrap();
        assert_eq!((record.width, record.height), (3, 2));
        assert_eq!(record.filter, Some(TextureFilter::Nearest));
        assert!(record.clamped);
        assert_eq!(record.pixels, pixels);
        assert_eq!(device.current_texture_2d(), None);
    }

    #[test]
    fn test_upload_rejects_bad_sizes() {
        let device = RecordingDevice::new();
        assert!(matches!(
            GlyphTexture::upload(&device, 0, 1, &[], TextureFilter::Linear),
            Err(GlError::InvalidTextureSize { .. })
        ));
        assert!(matches!(
            GlyphTexture::upload(&device, 2, 2, &[0; 4], TextureFilter::Linear),
            Err(GlError::InvalidTextureSize { .. })
        ));
        assert_eq!(device.textures_created(), 0);
    }
}
