//! Line scan conversion.
//!
//! Integer Bresenham stepping along the major axis, with depth interpolated
//! linearly by the fraction of major-axis steps taken. The line drawer does
//! no depth testing itself; `plot` decides what to do with each pixel.

/// A line endpoint in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePoint {
    pub x: i32,
    pub y: i32,
    pub depth: f32,
}

impl LinePoint {
    pub fn new(x: i32, y: i32, depth: f32) -> Self {
        Self { x, y, depth }
    }
}

/// Draws a line between two points using Bresenham's algorithm.
///
/// Both endpoints are included. The major axis is the one with the larger
/// absolute delta; each iteration advances it by exactly one pixel.
pub fn draw_line<F>(start: LinePoint, end: LinePoint, plot: &mut F)
where
    F: FnMut(i32, i32, f32),
{
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let (adx, ady) = (dx.abs(), dy.abs());
    let (sx, sy) = (dx.signum(), dy.signum());

    let x_major = adx >= ady;
    let (major_len, minor_len) = if x_major { (adx, ady) } else { (ady, adx) };

    let mut x = start.x;
    let mut y = start.y;
    // Error term scaled by 2 to stay in integers
    let mut err = 2 * minor_len - major_len;

    for step in 0..=major_len {
        let t = if major_len == 0 {
            0.0
        } else {
            step as f32 / major_len as f32
        };
        plot(x, y, start.depth + (end.depth - start.depth) * t);

        if err > 0 {
            if x_major {
                y += sy;
            } else {
                x += sx;
            }
            err -= 2 * major_len;
        }
        err += 2 * minor_len;

        if x_major {
            x += sx;
        } else {
            y += sy;
        }
    }
}

/// Draws `width` parallel copies of the line, offset along its perpendicular
/// and centered on it. Coincident endpoints draw a filled disc of diameter
/// `width` instead.
///
/// Copies are not coverage-accumulated, so steep lines can show gaps between
/// adjacent copies.
pub fn draw_thick_line<F>(start: LinePoint, end: LinePoint, width: u32, plot: &mut F)
where
    F: FnMut(i32, i32, f32),
{
    if width <= 1 {
        draw_line(start, end, plot);
        return;
    }

    if start.x == end.x && start.y == end.y {
        draw_disc(start, width as f32 * 0.5, plot);
        return;
    }

    let dx = (end.x - start.x) as f32;
    let dy = (end.y - start.y) as f32;
    let length = (dx * dx + dy * dy).sqrt();
    let (px, py) = (-dy / length, dx / length);
    // 偏移取整数，偶数宽度多出的一条放在正方向
    let center = (width as i32 - 1) / 2;

    for copy in 0..width as i32 {
        let offset = (copy - center) as f32;
        let ox = (px * offset).round() as i32;
        let oy = (py * offset).round() as i32;
        draw_line(
            LinePoint::new(start.x + ox, start.y + oy, start.depth),
            LinePoint::new(end.x + ox, end.y + oy, end.depth),
            plot,
        );
    }
}

fn draw_disc<F>(center: LinePoint, radius: f32, plot: &mut F)
where
    F: FnMut(i32, i32, f32),
{
    let r = radius.ceil() as i32;
    let radius_squared = radius * radius;
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 <= radius_squared {
                plot(center.x + dx, center.y + dy, center.depth);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn collect(start: LinePoint, end: LinePoint) -> Vec<(i32, i32, f32)> {
        let mut pixels = Vec::new();
        draw_line(start, end, &mut |x, y, z| pixels.push((x, y, z)));
        pixels
    }

    #[test]
    fn horizontal_line_has_five_pixels() {
        let pixels = collect(LinePoint::new(0, 0, 0.0), LinePoint::new(4, 0, 1.0));
        assert_eq!(pixels.len(), 5);
        assert_eq!((pixels[0].0, pixels[0].1), (0, 0));
        assert_eq!((pixels[4].0, pixels[4].1), (4, 0));
        for (i, &(_, y, z)) in pixels.iter().enumerate() {
            assert_eq!(y, 0);
            assert_relative_eq!(z, i as f32 * 0.25);
        }
    }

    #[test]
    fn steep_line_reaches_endpoint() {
        let pixels = collect(LinePoint::new(3, 10, 0.2), LinePoint::new(0, 0, 0.8));
        assert_eq!(pixels.len(), 11);
        let last = pixels.last().unwrap();
        assert_eq!((last.0, last.1), (0, 0));
        assert_relative_eq!(last.2, 0.8);
        // 每一步主轴（y）恰好前进一格
        for pair in pixels.windows(2) {
            assert_eq!(pair[0].1 - pair[1].1, 1);
            assert!((pair[0].0 - pair[1].0).abs() <= 1);
        }
    }

    #[test]
    fn diagonal_line() {
        let pixels = collect(LinePoint::new(0, 0, 0.0), LinePoint::new(-3, 3, 0.0));
        let coords: Vec<(i32, i32)> = pixels.iter().map(|p| (p.0, p.1)).collect();
        assert_eq!(coords, vec![(0, 0), (-1, 1), (-2, 2), (-3, 3)]);
    }

    #[test]
    fn single_point_line() {
        let pixels = collect(LinePoint::new(2, 2, 0.5), LinePoint::new(2, 2, 0.9));
        assert_eq!(pixels, vec![(2, 2, 0.5)]);
    }

    #[test]
    fn thick_line_draws_parallel_copies() {
        let mut pixels = Vec::new();
        draw_thick_line(
            LinePoint::new(0, 5, 0.0),
            LinePoint::new(4, 5, 0.0),
            3,
            &mut |x, y, _| pixels.push((x, y)),
        );
        assert_eq!(pixels.len(), 15);
        for y in 4..=6 {
            assert_eq!(pixels.iter().filter(|p| p.1 == y).count(), 5);
        }
    }

    #[test]
    fn even_width_rows_are_contiguous_and_include_the_line() {
        for (width, expected) in [(2u32, vec![5, 6]), (4, vec![4, 5, 6, 7])] {
            let mut rows = Vec::new();
            draw_thick_line(
                LinePoint::new(0, 5, 0.0),
                LinePoint::new(4, 5, 0.0),
                width,
                &mut |_, y, _| rows.push(y),
            );
            assert_eq!(rows.len(), 5 * width as usize);
            rows.sort_unstable();
            rows.dedup();
            assert_eq!(rows, expected, "width = {}", width);
        }
    }

    #[test]
    fn coincident_endpoints_draw_disc() {
        let mut pixels = Vec::new();
        draw_thick_line(
            LinePoint::new(10, 10, 0.3),
            LinePoint::new(10, 10, 0.3),
            4,
            &mut |x, y, z| pixels.push((x, y, z)),
        );
        // 半径 2 的圆盘：13 个像素
        assert_eq!(pixels.len(), 13);
        assert!(pixels.contains(&(10, 12, 0.3)));
        assert!(!pixels.contains(&(12, 12, 0.3)));
    }
}
