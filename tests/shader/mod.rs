use pixelfeed::{
  codec::{decode, encode, EncodeOptions},
  shader::{
    quad_triangles, sprite_quad, ShaderBlendMode, ShaderColorMode, ShaderSampleMode,
    SpriteFragmentUniforms, SpriteVertex, SpriteVertexUniforms,
  },
  RGBA8,
};

#[test]
fn test_vertex_buffer_upload_bytes() {
  let tint = RGBA8 { r: 255, g: 0, b: 0, a: 255 };
  let mut vertices: Vec<SpriteVertex> = Vec::new();
  for i in 0..3 {
    let quad = sprite_quad([i as f32 * 10.0, 0.0], [4.0, 4.0], 1.0, [1.0, 0.0], tint, 1.0);
    vertices.extend_from_slice(&quad_triangles(quad));
  }
  let bytes: &[u8] = bytemuck::cast_slice(&vertices);
  assert_eq!(bytes.len(), 3 * 6 * SpriteVertex::STRIDE);
  // the second vertex of the second sprite, its x position is the first f32.
  let x = f32::from_ne_bytes(bytes[7 * 48..][..4].try_into().unwrap());
  assert_eq!(x, 12.0);
  // color starts 16 bytes in, red is 1.0.
  let r = f32::from_ne_bytes(bytes[16..20].try_into().unwrap());
  assert_eq!(r, 1.0);
}

#[test]
fn test_uniform_bytes_and_modes() {
  let v = SpriteVertexUniforms { viewport_size: [800.0, 600.0] };
  assert_eq!(bytemuck::bytes_of(&v).len(), 8);

  let f = SpriteFragmentUniforms {
    blend_mode: ShaderBlendMode::Replace,
    sample_mode: ShaderSampleMode::LinearClampEdgeToBlack,
    color_mode: ShaderColorMode::Multiply,
  };
  let raw: [u32; 3] = bytemuck::cast(f);
  assert_eq!(raw, [2, 2, 1]);
  assert_eq!(ShaderBlendMode::try_from(raw[0]), Ok(ShaderBlendMode::Replace));
  assert_eq!(SpriteFragmentUniforms::default().sample_mode, ShaderSampleMode::Linear);
}

#[test]
fn test_decoded_pixels_as_sprite_colors() {
  let pixels = [0, 128, 255, 255];
  let png = encode(&pixels, 1, 1, &EncodeOptions::default()).unwrap();
  let out = decode(&png).unwrap();
  let color = out.get(0, 0).unwrap();
  let v = SpriteVertex::new([0.0, 0.0], [0.0, 0.0], color, 1.0);
  assert_eq!(v.color[0], 0.0);
  assert!((v.color[1] - 128.0 / 255.0).abs() < 1e-6);
  assert_eq!(v.color[2], 1.0);
}
