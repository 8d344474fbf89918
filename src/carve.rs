//! Content-aware (seam-carving) shrink primitive.
//!
//! Seam carving removes meandering paths of low-energy pixels ("seams")
//! instead of scaling uniformly, so salient content survives while the
//! canvas shrinks. The pipeline uses it deliberately for its visible
//! warping artifact: every removed seam bends the image a little more.
//!
//! Only shrinking is implemented; the distortion transform never inserts
//! seams. Energy is the classic dual-gradient measure on luma; seams are
//! found with the usual dynamic program over cumulative energy. Horizontal
//! seams are handled by rotating the image a quarter turn and removing
//! vertical seams.

use image::{RgbImage, imageops};

/// Shrink `image` to `target_width × target_height` by repeated seam
/// removal.
///
/// Targets are clamped to at least one pixel in each dimension; targets at
/// or above the current size leave that dimension untouched. Width seams
/// are removed first, then height seams.
pub fn shrink(image: &RgbImage, target_width: u32, target_height: u32) -> RgbImage {
    let target_width = target_width.max(1);
    let target_height = target_height.max(1);

    let mut canvas = image.clone();
    while canvas.width() > target_width {
        canvas = remove_vertical_seam(&canvas);
    }

    if canvas.height() > target_height {
        // Horizontal seams via the transpose trick.
        let mut rotated = imageops::rotate90(&canvas);
        while rotated.width() > target_height {
            rotated = remove_vertical_seam(&rotated);
        }
        canvas = imageops::rotate270(&rotated);
    }

    canvas
}

/// Remove the minimum-energy vertical seam, producing an image one column
/// narrower.
fn remove_vertical_seam(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    if width <= 1 {
        return image.clone();
    }

    let seam = find_vertical_seam(image);

    let mut carved = RgbImage::new(width - 1, height);
    for y in 0..height {
        let seam_x = seam[y as usize];
        let mut out_x = 0;
        for x in 0..width {
            if x == seam_x {
                continue;
            }
            carved.put_pixel(out_x, y, *image.get_pixel(x, y));
            out_x += 1;
        }
    }
    carved
}

/// Find the vertical seam with minimal cumulative energy.
///
/// Returns the seam's column index for each row, top to bottom.
fn find_vertical_seam(image: &RgbImage) -> Vec<u32> {
    let (width, height) = image.dimensions();
    let w = width as usize;
    let h = height as usize;

    let energy = energy_map(image);

    // Cumulative minimal energy, row by row.
    let mut cost = vec![0u64; w * h];
    for x in 0..w {
        cost[x] = energy[x] as u64;
    }
    for y in 1..h {
        for x in 0..w {
            let mut best = cost[(y - 1) * w + x];
            if x > 0 {
                best = best.min(cost[(y - 1) * w + x - 1]);
            }
            if x + 1 < w {
                best = best.min(cost[(y - 1) * w + x + 1]);
            }
            cost[y * w + x] = best + energy[y * w + x] as u64;
        }
    }

    // Backtrack from the cheapest bottom-row pixel.
    let mut seam = vec![0u32; h];
    let mut x = (0..w)
        .min_by_key(|&x| cost[(h - 1) * w + x])
        .unwrap_or(0);
    seam[h - 1] = x as u32;

    for y in (0..h - 1).rev() {
        let mut next = x;
        let mut best = cost[y * w + x];
        if x > 0 && cost[y * w + x - 1] < best {
            best = cost[y * w + x - 1];
            next = x - 1;
        }
        if x + 1 < w && cost[y * w + x + 1] < best {
            next = x + 1;
        }
        x = next;
        seam[y] = x as u32;
    }

    seam
}

/// Dual-gradient energy on luma, with edge pixels clamped to themselves.
fn energy_map(image: &RgbImage) -> Vec<u32> {
    let (width, height) = image.dimensions();
    let w = width as usize;
    let h = height as usize;

    let luma: Vec<i32> = image
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (299 * r as i32 + 587 * g as i32 + 114 * b as i32) / 1000
        })
        .collect();

    let mut energy = vec![0u32; w * h];
    for y in 0..h {
        for x in 0..w {
            let left = luma[y * w + x.saturating_sub(1)];
            let right = luma[y * w + (x + 1).min(w - 1)];
            let up = luma[y.saturating_sub(1) * w + x];
            let down = luma[(y + 1).min(h - 1) * w + x];
            energy[y * w + x] = (left - right).unsigned_abs() + (up - down).unsigned_abs();
        }
    }
    energy
}
