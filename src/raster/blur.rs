//! Multi-pass box blur
//!
//! Repeated box blurs approximate a gaussian. Pixels are premultiplied RGBA
//! floats and everything outside the buffer counts as transparent, so a
//! blurred layer fades out at its edges instead of smearing edge pixels.

/// Box passes used to approximate a gaussian
pub const DEFAULT_PASSES: usize = 3;

/// Box radius giving `passes` boxes a combined standard deviation of `sigma`
///
/// Each box of width `w` has variance `(w² - 1) / 12`.
pub fn box_radius(sigma: f32, passes: usize) -> usize {
    if sigma.is_nan() || sigma <= 0.0 || passes == 0 {
        return 0;
    }
    let width = (12.0 * sigma * sigma / passes as f32 + 1.0).sqrt();
    ((width - 1.0) / 2.0).round().max(0.0) as usize
}

/// Pixels a blur of `sigma` spreads content by
pub fn extent(sigma: f32, passes: usize) -> usize {
    box_radius(sigma, passes) * passes
}

/// Blur premultiplied pixels in place with a gaussian-like kernel
pub fn blur(pixels: &mut [[f32; 4]], width: usize, height: usize, sigma: f32, passes: usize) {
    let radius = box_radius(sigma, passes);
    if radius == 0 || width == 0 || height == 0 {
        return;
    }
    debug_assert_eq!(pixels.len(), width * height);

    let mut scratch = vec![[0.0f32; 4]; pixels.len()];
    for _ in 0..passes {
        // Horizontal into scratch
        for y in 0..height {
            let row = y * width;
            box_pass(
                |i| pixels[row + i],
                |i, v| scratch[row + i] = v,
                width,
                radius,
            );
        }
        // Vertical back into pixels
        for x in 0..width {
            box_pass(
                |i| scratch[i * width + x],
                |i, v| pixels[i * width + x] = v,
                height,
                radius,
            );
        }
    }
}

/// Sliding-window average over one row or column
fn box_pass(
    read: impl Fn(usize) -> [f32; 4],
    mut write: impl FnMut(usize, [f32; 4]),
    len: usize,
    radius: usize,
) {
    let inv = 1.0 / (radius * 2 + 1) as f32;
    let mut sum = [0.0f32; 4];

    // Window for index 0 is [-radius, radius]
    for i in 0..=radius.min(len - 1) {
        add(&mut sum, read(i), 1.0);
    }

    for i in 0..len {
        write(i, sum.map(|c| c * inv));
        if i + radius + 1 < len {
            add(&mut sum, read(i + radius + 1), 1.0);
        }
        if i >= radius {
            add(&mut sum, read(i - radius), -1.0);
        }
    }
}

fn add(sum: &mut [f32; 4], px: [f32; 4], sign: f32) {
    for (s, c) in sum.iter_mut().zip(px) {
        *s += c * sign;
    }
}
