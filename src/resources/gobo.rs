//! Gobo image set.
//!
//! Layer 0 is always the procedural "Open" disc; the remaining layers come
//! from the fixture's gobo wheels. Every layer is normalized to
//! [`IMAGE_SIZE`](crate::config::gobo::IMAGE_SIZE) square RGBA so the set can
//! be uploaded as one 2D array texture.

use image::{Rgba, RgbaImage, imageops};

use crate::config::gobo::{IMAGE_SIZE, OPEN_RADIUS, OPEN_SOFTNESS};

/// Ordered gobo layers, ready for upload.
#[derive(Debug, Clone)]
pub struct GoboSet {
    layers: Vec<RgbaImage>,
}

impl GoboSet {
    /// Open disc followed by the given wheel images.
    #[must_use]
    pub fn from_wheel_images(images: Vec<RgbaImage>) -> Self {
        let mut layers = Vec::with_capacity(images.len() + 1);
        layers.push(open_gobo(IMAGE_SIZE));
        layers.extend(images.into_iter().map(normalize));
        Self { layers }
    }

    /// A single-layer set from one image.
    #[must_use]
    pub fn single(image: RgbaImage) -> Self {
        Self {
            layers: vec![normalize(image)],
        }
    }

    #[must_use]
    pub fn layers(&self) -> &[RgbaImage] {
        &self.layers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Clamps a requested slot into the available layers.
    #[must_use]
    pub fn clamp_index(&self, index: u32) -> u32 {
        index.min(self.layers.len().saturating_sub(1) as u32)
    }
}

fn normalize(image: RgbaImage) -> RgbaImage {
    if image.width() == IMAGE_SIZE && image.height() == IMAGE_SIZE {
        image
    } else {
        imageops::resize(&image, IMAGE_SIZE, IMAGE_SIZE, imageops::FilterType::Triangle)
    }
}

/// Radial disc: 100% at the center easing to 90% at the rim, then a soft edge
/// fading to black across `OPEN_SOFTNESS` of the radius on either side.
#[must_use]
pub fn open_gobo(size: u32) -> RgbaImage {
    let center = size as f32 / 2.0;
    let radius = center * OPEN_RADIUS;
    let edge = radius * OPEN_SOFTNESS;

    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        let dist = (dx * dx + dy * dy).sqrt();

        let brightness = if dist < radius - edge {
            let t = dist / radius;
            1.0 - t * t * 0.1
        } else if dist < radius + edge {
            let t = (dist - (radius - edge)) / (2.0 * edge);
            0.9 * (1.0 - t)
        } else {
            0.0
        };

        let v = (brightness.clamp(0.0, 1.0) * 255.0) as u8;
        Rgba([v, v, v, 255])
    })
}

/// Procedural "breakup" pattern used when no gobo media exists at all.
///
/// Six round holes on a ring inside the open aperture.
#[must_use]
pub fn breakup_gobo(size: u32) -> RgbaImage {
    let center = size as f32 / 2.0;
    let aperture = center * OPEN_RADIUS;
    let ring = aperture * 0.55;
    let hole = aperture * 0.28;

    let holes: Vec<(f32, f32)> = (0..6)
        .map(|i| {
            let a = i as f32 * std::f32::consts::TAU / 6.0;
            (center + ring * a.cos(), center + ring * a.sin())
        })
        .chain(std::iter::once((center, center)))
        .collect();

    RgbaImage::from_fn(size, size, |x, y| {
        let (px, py) = (x as f32, y as f32);
        let lit = holes
            .iter()
            .any(|(hx, hy)| (px - hx).powi(2) + (py - hy).powi(2) < hole * hole);
        let v = if lit { 255 } else { 0 };
        Rgba([v, v, v, 255])
    })
}
