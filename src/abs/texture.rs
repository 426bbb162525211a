//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which is a CPU representation of a GPU texture.

use std::{path::Path, sync::Arc};

use glow::HasContext;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Represents a texture stored on the GPU side.
pub struct Texture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
}

impl Texture {
    /// Creates a new texture from the given [`image::DynamicImage`].
    ///
    /// The image is flipped on upload so that `v = 0` samples its bottom row,
    /// the way Wavefront texture coordinates expect.
    pub fn new(gl: &Arc<glow::Context>, image: &DynamicImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        let data = bottom_row_first(image).into_raw();
        Self::new_from_data(gl, width, height, &data)
    }

    /// Decodes an image file and uploads it.
    pub fn from_path(gl: &Arc<glow::Context>, path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|e| decode_error(path, e))?;
        log::info!(
            "Loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Self::new(gl, &image)
    }

    /// Builds a two-tone checkerboard used when no texture file is available.
    pub fn checkerboard(gl: &Arc<glow::Context>, size: u32, cells: u32) -> Result<Self> {
        let image = checkerboard_image(size, cells);
        Self::new(gl, &DynamicImage::ImageRgba8(image))
    }

    /// Creates a new texture from the given raw RGBA data.
    pub fn new_from_data(
        gl: &Arc<glow::Context>,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<Self> {
        unsafe {
            let texture = gl.create_texture().map_err(Error::Gl)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(data)),
            );
            gl.generate_mipmap(glow::TEXTURE_2D);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
            })
        }
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind_to_unit(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

fn decode_error(path: &Path, error: image::ImageError) -> Error {
    match error {
        image::ImageError::IoError(source) => Error::io(path, source),
        other => Error::Decode {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

/// GL reads rows bottom-up while `image` stores them top-down.
fn bottom_row_first(image: &DynamicImage) -> RgbaImage {
    image.flipv().to_rgba8()
}

fn checkerboard_image(size: u32, cells: u32) -> RgbaImage {
    let cell = (size / cells.max(1)).max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba([230, 230, 230, 255])
        } else {
            Rgba([60, 110, 200, 255])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_alternates_cells() {
        let image = checkerboard_image(64, 8);
        assert_eq!(image.dimensions(), (64, 64));
        assert_eq!(image.get_pixel(0, 0), image.get_pixel(7, 7));
        assert_ne!(image.get_pixel(0, 0), image.get_pixel(8, 0));
        assert_eq!(image.get_pixel(0, 0), image.get_pixel(8, 8));
    }

    #[test]
    fn test_upload_rows_start_at_the_bottom() {
        let top = Rgba([255, 0, 0, 255]);
        let bottom = Rgba([0, 0, 255, 255]);
        let image = RgbaImage::from_fn(1, 2, |_, y| if y == 0 { top } else { bottom });

        let rows = bottom_row_first(&DynamicImage::ImageRgba8(image));
        assert_eq!(rows.dimensions(), (1, 2));
        assert_eq!(&rows.as_raw()[0..4], &bottom.0);
        assert_eq!(&rows.as_raw()[4..8], &top.0);
    }

    #[test]
    fn test_undecodable_file_is_a_decode_error() {
        let path =
            std::env::temp_dir().join(format!("meshfly-texture-{}.png", std::process::id()));
        std::fs::write(&path, b"not a png").unwrap();
        let err = image::open(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        let err = decode_error(&path, err);
        assert!(matches!(err, Error::Decode { .. }), "{err}");
        assert!(err.to_string().contains("meshfly-texture-"), "{err}");
    }

    #[test]
    fn test_checkerboard_with_zero_cells() {
        let image = checkerboard_image(4, 0);
        assert_eq!(image.dimensions(), (4, 4));
    }
}
