//! Data layouts shared with the GPU sprite shaders.
//!
//! Everything here is `#[repr(C)]` (or `#[repr(u32)]` for the enums) and laid
//! out the way the shader side declares it, so a slice of these can be handed
//! to [`bytemuck::cast_slice`] and uploaded as-is.
//!
//! The enums are only [`NoUninit`](bytemuck::NoUninit), not `Pod`, because
//! not every `u32` is a valid mode. Going the other way, from bytes or from a
//! raw `u32`, is checked.

use bytemuck::{CheckedBitPattern, NoUninit, Pod, Zeroable};

use crate::pixel_formats::RGBA8;

/// Error for a raw `u32` that isn't one of an enum's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{0} is not a valid shader enum value")]
pub struct InvalidShaderValue(pub u32);

macro_rules! shader_enum {
  (
    $(#[$meta:meta])*
    pub enum $name:ident {
      $( $(#[$vmeta:meta])* $variant:ident = $value:tt, )+
    }
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[derive(NoUninit, CheckedBitPattern)]
    #[repr(u32)]
    pub enum $name {
      $( $(#[$vmeta])* $variant = $value, )+
    }
    impl TryFrom<u32> for $name {
      type Error = InvalidShaderValue;
      #[inline]
      fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
          $( $value => Ok(Self::$variant), )+
          other => Err(InvalidShaderValue(other)),
        }
      }
    }
    impl From<$name> for u32 {
      #[inline]
      fn from(value: $name) -> u32 {
        value as u32
      }
    }
  };
}

shader_enum! {
  /// How a fragment combines with what's already in the target.
  pub enum ShaderBlendMode {
    /// Source-over alpha blending.
    Normal = 0,
    /// The source alpha removes coverage from the target.
    Erase = 1,
    /// The source overwrites the target.
    Replace = 2,
  }
}

shader_enum! {
  /// How the sprite texture is sampled.
  pub enum ShaderSampleMode {
    /// Nearest texel.
    Nearest = 0,
    /// Bilinear filtering, clamped to the edge texels.
    Linear = 1,
    /// Bilinear filtering, with transparent black outside the texture.
    LinearClampEdgeToBlack = 2,
  }
}

shader_enum! {
  /// How the vertex color is applied to the sampled texel.
  pub enum ShaderColorMode {
    /// The vertex color is ignored.
    None = 0,
    /// The texel is multiplied by the vertex color.
    Multiply = 1,
    /// The vertex color is used, with the texel only giving coverage.
    Brush = 2,
  }
}

shader_enum! {
  /// Buffer slots of the sprite vertex function.
  pub enum SpriteVertexBufferIndex {
    /// The [`SpriteVertex`] array.
    Vertices = 0,
    /// The [`SpriteVertexUniforms`].
    Uniforms = 1,
  }
}

shader_enum! {
  /// Buffer slots of the sprite fragment function.
  pub enum SpriteFragmentBufferIndex {
    /// The [`SpriteFragmentUniforms`].
    Uniforms = 0,
  }
}

/// Per-draw uniforms of the sprite vertex function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SpriteVertexUniforms {
  /// The render target size in pixels.
  pub viewport_size: [f32; 2],
}

/// Per-draw uniforms of the sprite fragment function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct SpriteFragmentUniforms {
  #[allow(missing_docs)]
  pub blend_mode: ShaderBlendMode,
  #[allow(missing_docs)]
  pub sample_mode: ShaderSampleMode,
  #[allow(missing_docs)]
  pub color_mode: ShaderColorMode,
}
impl Default for SpriteFragmentUniforms {
  /// Normal blending, linear sampling, no color.
  #[inline]
  fn default() -> Self {
    Self {
      blend_mode: ShaderBlendMode::Normal,
      sample_mode: ShaderSampleMode::Linear,
      color_mode: ShaderColorMode::None,
    }
  }
}

/// One vertex of a sprite.
///
/// The shader side puts `color` on a 16 byte boundary and rounds the whole
/// struct up to 48 bytes, so the padding here is spelled out. Always fill it
/// with zeros (the constructors do).
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SpriteVertex {
  /// Position in pixels, within the viewport.
  pub position: [f32; 2],
  /// Texture coordinates, `0.0 ..= 1.0` over the sprite texture.
  pub tex_coord: [f32; 2],
  /// Color, used according to the [`ShaderColorMode`].
  pub color: [f32; 4],
  /// Overall opacity of the sprite.
  pub alpha: f32,
  #[doc(hidden)]
  pub _padding: [f32; 3],
}
impl SpriteVertex {
  /// The distance between consecutive vertices in a vertex buffer.
  pub const STRIDE: usize = 48;

  /// Makes a vertex, converting the color to normalized floats.
  #[inline]
  #[must_use]
  pub fn new(position: [f32; 2], tex_coord: [f32; 2], color: RGBA8, alpha: f32) -> Self {
    Self { position, tex_coord, color: color.to_unorm_f32(), alpha, _padding: [0.0; 3] }
  }
}

/// Builds the four corners of a sprite, in triangle strip order.
///
/// The unit square corners `(0,0) (1,0) (0,1) (1,1)` are centered on the
/// origin, scaled to `size`, scaled again by `scale`, rotated, and then moved
/// to `position`. Each corner's texture coordinate is the untransformed
/// corner.
///
/// `rotation` is `[cos(angle), sin(angle)]`, with `[1.0, 0.0]` being no
/// rotation.
#[must_use]
pub fn sprite_quad(
  position: [f32; 2], size: [f32; 2], scale: f32, rotation: [f32; 2], color: RGBA8, alpha: f32,
) -> [SpriteVertex; 4] {
  let [cos, sin] = rotation;
  let corner = |u: f32, v: f32| {
    let x = (u - 0.5) * size[0] * scale;
    let y = (v - 0.5) * size[1] * scale;
    let p = [x * cos - y * sin + position[0], x * sin + y * cos + position[1]];
    SpriteVertex::new(p, [u, v], color, alpha)
  };
  [corner(0.0, 0.0), corner(1.0, 0.0), corner(0.0, 1.0), corner(1.0, 1.0)]
}

/// Reorders a [`sprite_quad`] into two independent triangles, for pipelines
/// that draw triangle lists.
#[inline]
#[must_use]
pub const fn quad_triangles(quad: [SpriteVertex; 4]) -> [SpriteVertex; 6] {
  let [a, b, c, d] = quad;
  [a, b, d, a, d, c]
}
