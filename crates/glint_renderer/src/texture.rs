//! Textures feeding material albedo and emission.
//!
//! Textures live in a [`TexturePool`] owned by the world and are addressed
//! by [`TextureId`]. Ids are only handed out by the pool, and a checker can
//! only reference textures that already exist, so texture graphs are
//! acyclic by construction.

use std::path::Path;

use glint_math::{Point3, Vec3};

use crate::{Color, RenderError, RenderResult};

/// Returned when a texture has no pixel data.
pub const MISSING_TEXTURE_COLOR: Color = Vec3::new(1.0, 0.0, 1.0);

/// Albedo of the default texture and the fallback for unknown ids.
pub const DEFAULT_ALBEDO: Color = Vec3::new(0.5, 0.5, 0.5);

/// Handle to a texture in a [`TexturePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

impl TextureId {
    /// The pool's built-in mid-grey solid texture.
    pub const DEFAULT: TextureId = TextureId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// An 8-bit RGB image sampled with nearest-pixel lookup.
#[derive(Clone, Debug, Default)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    /// Packed RGB bytes, row-major, origin top-left
    data: Vec<u8>,
}

impl ImageTexture {
    /// Load an image file, converting it to RGB8.
    pub fn open(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| RenderError::TextureLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        log::debug!("Loaded image texture {} ({}x{})", path.display(), width, height);

        Ok(Self {
            width,
            height,
            data: rgb.into_raw(),
        })
    }

    /// Wrap raw RGB8 bytes. Mismatched sizes yield an empty texture.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> Self {
        if data.len() != width as usize * height as usize * 3 {
            log::warn!(
                "Image texture data is {} bytes, expected {}x{}x3; texture left empty",
                data.len(),
                width,
                height
            );
            return Self::default();
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample at UV coordinates, (0, 0) bottom-left. Coordinates are
    /// clamped to [0, 1], no wrapping.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.data.is_empty() {
            return MISSING_TEXTURE_COLOR;
        }

        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        let i = ((u * self.width as f32) as u32).min(self.width - 1) as usize;
        let j = ((v * self.height as f32) as u32).min(self.height - 1) as usize;

        let offset = (j * self.width as usize + i) * 3;
        let scale = 1.0 / 255.0;
        Color::new(
            self.data[offset] as f32 * scale,
            self.data[offset + 1] as f32 * scale,
            self.data[offset + 2] as f32 * scale,
        )
    }
}

/// Colour source for materials.
#[derive(Clone, Debug)]
pub enum Texture {
    /// A constant colour.
    Solid(Color),
    /// A 3-D checkerboard alternating between two other textures.
    Checker {
        odd: TextureId,
        even: TextureId,
        /// Spatial frequency of the pattern
        scale: f32,
    },
    /// An image looked up by UV.
    Image(ImageTexture),
}

/// Storage for every texture in a scene.
#[derive(Clone, Debug)]
pub struct TexturePool {
    textures: Vec<Texture>,
}

impl TexturePool {
    /// Create a pool holding only the default grey texture.
    pub fn new() -> Self {
        Self {
            textures: vec![Texture::Solid(DEFAULT_ALBEDO)],
        }
    }

    pub fn add(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn add_solid(&mut self, color: Color) -> TextureId {
        self.add(Texture::Solid(color))
    }

    /// Add a checker alternating between two existing textures.
    pub fn add_checker(&mut self, odd: TextureId, even: TextureId) -> TextureId {
        self.add(Texture::Checker {
            odd,
            even,
            scale: 10.0,
        })
    }

    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0)
    }

    pub fn get_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Colour of texture `id` at the given UV and world point.
    ///
    /// Unknown ids resolve to the default grey.
    pub fn value_at(&self, id: TextureId, u: f32, v: f32, p: Point3) -> Color {
        let Some(texture) = self.get(id) else {
            return DEFAULT_ALBEDO;
        };

        match texture {
            Texture::Solid(color) => *color,
            Texture::Checker { odd, even, scale } => {
                let sines = (scale * p.x).sin() * (scale * p.y).sin() * (scale * p.z).sin();
                // Children always precede the checker in the pool
                let child = if sines < 0.0 { *odd } else { *even };
                if child.0 >= id.0 {
                    return MISSING_TEXTURE_COLOR;
                }
                self.value_at(child, u, v, p)
            }
            Texture::Image(image) => image.sample(u, v),
        }
    }
}

impl Default for TexturePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_texture_is_grey() {
        let pool = TexturePool::new();
        let c = pool.value_at(TextureId::DEFAULT, 0.3, 0.7, Vec3::ONE);
        assert_eq!(c, Vec3::splat(0.5));
    }

    #[test]
    fn test_unknown_id_falls_back() {
        let pool = TexturePool::new();
        let c = pool.value_at(TextureId(42), 0.0, 0.0, Vec3::ZERO);
        assert_eq!(c, Vec3::splat(0.5));
    }

    #[test]
    fn test_checker_alternates() {
        let mut pool = TexturePool::new();
        let black = pool.add_solid(Color::ZERO);
        let white = pool.add_solid(Color::ONE);
        let checker = pool.add_checker(black, white);

        // sin(10 * 0.1)^3 > 0 -> even
        let even = pool.value_at(checker, 0.0, 0.0, Vec3::splat(0.1));
        // flip the sign of one factor -> odd
        let odd = pool.value_at(checker, 0.0, 0.0, Vec3::new(-0.1, 0.1, 0.1));
        assert_eq!(even, Color::ONE);
        assert_eq!(odd, Color::ZERO);
    }

    #[test]
    fn test_checker_rejects_forward_reference() {
        let mut pool = TexturePool::new();
        let checker = pool.add(Texture::Checker {
            odd: TextureId(5),
            even: TextureId(5),
            scale: 10.0,
        });
        let c = pool.value_at(checker, 0.0, 0.0, Vec3::splat(0.1));
        assert_eq!(c, MISSING_TEXTURE_COLOR);
    }

    #[test]
    fn test_image_nearest_and_clamped() {
        // 2x1 image: red on the left, blue on the right
        let image = ImageTexture::from_rgb8(2, 1, vec![255, 0, 0, 0, 0, 255]);
        assert_eq!(image.sample(0.1, 0.5), Color::new(1.0, 0.0, 0.0));
        assert_eq!(image.sample(0.9, 0.5), Color::new(0.0, 0.0, 1.0));
        // u = 1 and beyond clamp onto the last column
        assert_eq!(image.sample(1.0, 0.5), Color::new(0.0, 0.0, 1.0));
        assert_eq!(image.sample(7.0, -3.0), Color::new(0.0, 0.0, 1.0));
        assert_eq!(image.sample(-2.0, 0.5), Color::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_image_v_is_flipped() {
        // 1x2 image: top row green, bottom row white
        let image = ImageTexture::from_rgb8(1, 2, vec![0, 255, 0, 255, 255, 255]);
        assert_eq!(image.sample(0.5, 0.9), Color::new(0.0, 1.0, 0.0));
        assert_eq!(image.sample(0.5, 0.1), Color::ONE);
    }

    #[test]
    fn test_empty_image_is_magenta() {
        let image = ImageTexture::from_rgb8(4, 4, vec![0; 3]);
        assert_eq!(image.sample(0.5, 0.5), MISSING_TEXTURE_COLOR);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ImageTexture::open("does/not/exist.png").unwrap_err();
        assert!(matches!(err, RenderError::TextureLoad { .. }));
    }
}
