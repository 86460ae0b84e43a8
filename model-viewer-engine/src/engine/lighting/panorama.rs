use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{
    Extent3d, TextureDimension, TextureFormat, TextureViewDescriptor, TextureViewDimension,
};
use std::f32::consts::{PI, TAU};

const RGBA32F_TEXEL_BYTES: usize = 16;
const CUBE_FACES: usize = 6;

/// Unit direction through texel (u, v) of a cube face, both in [-1, 1] with v
/// pointing down. Faces follow the layer order +X, -X, +Y, -Y, +Z, -Z.
fn face_direction(face: usize, u: f32, v: f32) -> Vec3 {
    match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        _ => Vec3::new(-u, -v, -1.0),
    }
    .normalize()
}

/// Half-float bits for a non-negative radiance value. Negative and NaN input
/// map to zero, anything above the half range saturates.
pub fn f16_bits(value: f32) -> u16 {
    let value = value.max(0.0).min(65504.0);
    let bits = value.to_bits();
    let exponent = ((bits >> 23) & 0xff) as i32 - 127 + 15;
    let mantissa = bits & 0x007f_ffff;

    if exponent <= 0 {
        let shift = 14 - exponent;
        if shift > 24 {
            return 0;
        }
        return ((mantissa | 0x0080_0000) >> shift as u32) as u16;
    }
    ((exponent as u32) << 10 | mantissa >> 13) as u16
}

/// Resample an equirectangular panorama into a cubemap that
/// `EnvironmentMapLight` can sample.
///
/// Only the `Rgba32Float` layout the HDR loader produces is accepted.
pub fn equirect_to_cubemap(panorama: &Image, face_size: u32) -> Option<Image> {
    if panorama.texture_descriptor.format != TextureFormat::Rgba32Float || face_size == 0 {
        return None;
    }
    let data = panorama.data.as_ref()?;
    let width = panorama.width() as usize;
    let height = panorama.height() as usize;
    if width == 0 || height == 0 || data.len() < width * height * RGBA32F_TEXEL_BYTES {
        return None;
    }

    let texel = |x: usize, y: usize| -> [f32; 4] {
        let offset = (y * width + x) * RGBA32F_TEXEL_BYTES;
        let mut rgba = [0.0; 4];
        for (channel, bytes) in data[offset..offset + RGBA32F_TEXEL_BYTES]
            .chunks_exact(4)
            .enumerate()
        {
            rgba[channel] = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        rgba
    };

    let size = face_size as usize;
    let mut cube = Vec::with_capacity(CUBE_FACES * size * size * 8);
    for face in 0..CUBE_FACES {
        for y in 0..size {
            for x in 0..size {
                let u = 2.0 * (x as f32 + 0.5) / size as f32 - 1.0;
                let v = 2.0 * (y as f32 + 0.5) / size as f32 - 1.0;
                let direction = face_direction(face, u, v);

                let longitude = direction.x.atan2(-direction.z);
                let colatitude = direction.y.clamp(-1.0, 1.0).acos();
                let source_x = (((longitude / TAU + 0.5) * width as f32) as usize).min(width - 1);
                let source_y = ((colatitude / PI * height as f32) as usize).min(height - 1);

                for channel in texel(source_x, source_y) {
                    cube.extend_from_slice(&f16_bits(channel).to_le_bytes());
                }
            }
        }
    }

    let mut cubemap = Image::new(
        Extent3d {
            width: face_size,
            height: face_size,
            depth_or_array_layers: CUBE_FACES as u32,
        },
        TextureDimension::D2,
        cube,
        TextureFormat::Rgba16Float,
        RenderAssetUsages::RENDER_WORLD,
    );
    cubemap.texture_view_descriptor = Some(TextureViewDescriptor {
        dimension: Some(TextureViewDimension::Cube),
        ..default()
    });
    Some(cubemap)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bright upper half, black lower half.
    fn horizon_panorama() -> Image {
        let (width, height) = (8usize, 4usize);
        let mut data = Vec::with_capacity(width * height * RGBA32F_TEXEL_BYTES);
        for y in 0..height {
            let value: f32 = if y < height / 2 { 1.0 } else { 0.0 };
            for _ in 0..width {
                for _ in 0..4 {
                    data.extend_from_slice(&value.to_le_bytes());
                }
            }
        }
        Image::new(
            Extent3d {
                width: width as u32,
                height: height as u32,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            data,
            TextureFormat::Rgba32Float,
            RenderAssetUsages::default(),
        )
    }

    fn red_bits(cubemap: &Image, face: usize, x: usize, y: usize, size: usize) -> u16 {
        let data = cubemap.data.as_ref().expect("cubemap data");
        let offset = ((face * size + y) * size + x) * 8;
        u16::from_le_bytes([data[offset], data[offset + 1]])
    }

    #[test]
    fn half_float_encoding() {
        assert_eq!(f16_bits(1.0), 0x3c00);
        assert_eq!(f16_bits(0.5), 0x3800);
        assert_eq!(f16_bits(0.0), 0);
        assert_eq!(f16_bits(-3.0), 0);
        assert_eq!(f16_bits(f32::NAN), 0);
        assert_eq!(f16_bits(1.0e9), 0x7bff);
    }

    #[test]
    fn cubemap_has_six_square_faces() {
        let cubemap = equirect_to_cubemap(&horizon_panorama(), 4).expect("cubemap");
        assert_eq!(cubemap.texture_descriptor.size.depth_or_array_layers, 6);
        assert_eq!(cubemap.width(), 4);
        assert_eq!(cubemap.texture_descriptor.format, TextureFormat::Rgba16Float);
        assert_eq!(
            cubemap
                .texture_view_descriptor
                .as_ref()
                .and_then(|view| view.dimension),
            Some(TextureViewDimension::Cube)
        );
    }

    #[test]
    fn up_face_samples_the_sky_and_down_face_the_ground() {
        let cubemap = equirect_to_cubemap(&horizon_panorama(), 4).expect("cubemap");
        assert_eq!(red_bits(&cubemap, 2, 1, 1, 4), 0x3c00);
        assert_eq!(red_bits(&cubemap, 3, 1, 1, 4), 0);
    }

    #[test]
    fn non_float_panoramas_are_rejected() {
        let image = Image::new(
            Extent3d {
                width: 2,
                height: 1,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            vec![255; 8],
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        );
        assert!(equirect_to_cubemap(&image, 4).is_none());
    }
}
