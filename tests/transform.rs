//! Single-frame distortion transform behavior.

use image::{DynamicImage, Rgb, RgbImage};
use meltdown::{DistortError, distort_frame};

/// A small gradient so seam carving has distinct energies to work with.
fn gradient_frame(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 20 % 256) as u8, (y * 30 % 256) as u8, ((x + y) * 10 % 256) as u8])
    }))
}

#[test]
fn strength_one_doubles_the_frame() {
    let frame = gradient_frame(10, 8);
    let distorted = distort_frame(&frame, 1.0).unwrap();
    assert_eq!((distorted.width(), distorted.height()), (20, 16));
}

#[test]
fn strength_two_restores_the_original_size() {
    // floor(10/2)=5, floor(8/2)=4, then 200% -> back to 10x8.
    let frame = gradient_frame(10, 8);
    let distorted = distort_frame(&frame, 2.0).unwrap();
    assert_eq!((distorted.width(), distorted.height()), (10, 8));
}

#[test]
fn output_is_twice_the_floored_shrink_target() {
    let frame = gradient_frame(10, 8);
    let distorted = distort_frame(&frame, 1.5).unwrap();
    // floor(10/1.5)=6, floor(8/1.5)=5.
    assert_eq!((distorted.width(), distorted.height()), (12, 10));
}

#[test]
fn tiny_frames_survive_heavy_strength() {
    // Shrink targets clamp to one pixel instead of vanishing.
    let frame = gradient_frame(2, 2);
    let distorted = distort_frame(&frame, 100.0).unwrap();
    assert_eq!((distorted.width(), distorted.height()), (2, 2));
}

#[test]
fn strength_below_one_is_rejected() {
    let frame = gradient_frame(4, 4);
    let result = distort_frame(&frame, 0.9);
    assert!(matches!(
        result,
        Err(DistortError::InvalidStrength { value }) if value == 0.9
    ));
}

#[test]
fn nan_strength_is_rejected() {
    let frame = gradient_frame(4, 4);
    assert!(matches!(
        distort_frame(&frame, f64::NAN),
        Err(DistortError::InvalidStrength { .. })
    ));
}

#[test]
fn constant_color_is_preserved_through_the_transform() {
    let frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 12, Rgb([90, 120, 30])));
    let distorted = distort_frame(&frame, 2.0).unwrap();
    for pixel in distorted.to_rgb8().pixels() {
        assert_eq!(*pixel, Rgb([90, 120, 30]));
    }
}
