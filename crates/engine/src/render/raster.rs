//! Software replay of a [`DisplayList`] into an RGBA image.
//!
//! No font is bundled, so text commands only paint their label plate.

use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

use super::background::Background;
use super::{DisplayList, DrawCmd, Rgba, TextAlign};
use crate::error::{EngineError, Result};

/// Largest surface we are willing to allocate.
const MAX_SIDE: u32 = 8192;

pub fn rasterize(list: &DisplayList, background: &Background) -> Result<RgbaImage> {
    if list.width == 0 || list.height == 0 || list.width > MAX_SIDE || list.height > MAX_SIDE {
        return Err(EngineError::InvalidCanvas {
            width: list.width as f64,
            height: list.height as f64,
        });
    }
    let mut img = RgbaImage::new(list.width, list.height);
    for cmd in list.commands() {
        match cmd {
            DrawCmd::Clear { color } => {
                let px = image::Rgba([color.0, color.1, color.2, color.3]);
                img.pixels_mut().for_each(|p| *p = px);
            }
            DrawCmd::Image { id, x, y, w, h } => {
                match background.image().and_then(|m| (m.id == *id).then_some(m)) {
                    Some(map) => {
                        if let Some(src) = &map.pixels {
                            blit_scaled(&mut img, src, *x, *y, *w, *h);
                        }
                    }
                    None => tracing::debug!(%id, "image not resident, skipped"),
                }
            }
            DrawCmd::FillRect { x, y, w, h, color } => fill_rect(&mut img, *x, *y, *w, *h, *color),
            DrawCmd::StrokeRect {
                x,
                y,
                w,
                h,
                color,
                width,
            } => {
                let pts = [[*x, *y], [x + w, *y], [x + w, y + h], [*x, y + h], [*x, *y]];
                stroke_polyline(&mut img, &pts, *color, *width, None);
            }
            DrawCmd::Line {
                from,
                to,
                color,
                width,
            } => stroke_polyline(&mut img, &[*from, *to], *color, *width, None),
            DrawCmd::Polyline {
                points,
                color,
                width,
                dash,
            } => stroke_polyline(&mut img, points, *color, *width, *dash),
            DrawCmd::FillCircle {
                center,
                radius,
                color,
            } => fill_disc(&mut img, *center, *radius, *color),
            DrawCmd::StrokeCircle {
                center,
                radius,
                color,
                width,
            } => stroke_ring(&mut img, *center, *radius, *width, *color),
            DrawCmd::Text {
                at,
                text,
                size,
                align,
                plate,
                ..
            } => {
                if let Some(plate) = plate {
                    let w = text.chars().count() as f64 * size * 0.6 + size * 0.8;
                    let h = size * 1.4;
                    let x = match align {
                        TextAlign::Left => at[0] - size * 0.4,
                        TextAlign::Center => at[0] - w * 0.5,
                    };
                    fill_rect(&mut img, x, at[1] - size * 1.05, w, h, *plate);
                }
            }
        }
    }
    Ok(img)
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .map_err(|e| EngineError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

fn blend(img: &mut RgbaImage, x: i64, y: i64, c: Rgba, coverage: f64) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let a = (c.3 as f64 / 255.0) * coverage.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let dst = img.get_pixel_mut(x as u32, y as u32);
    let da = dst.0[3] as f64 / 255.0;
    let out_a = a + da * (1.0 - a);
    if out_a <= 0.0 {
        return;
    }
    let src = [c.0, c.1, c.2];
    for (i, s) in src.iter().enumerate() {
        let v = (*s as f64 * a + dst.0[i] as f64 * da * (1.0 - a)) / out_a;
        dst.0[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}

fn pixel_span(start: f64, len: f64, limit: u32) -> (i64, i64) {
    let (lo, hi) = if len >= 0.0 {
        (start, start + len)
    } else {
        (start + len, start)
    };
    let lo = lo.floor().max(0.0) as i64;
    let hi = (hi.ceil() as i64).min(limit as i64);
    (lo, hi)
}

fn fill_rect(img: &mut RgbaImage, x: f64, y: f64, w: f64, h: f64, c: Rgba) {
    if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite()) {
        return;
    }
    let (x0, x1) = pixel_span(x, w, img.width());
    let (y0, y1) = pixel_span(y, h, img.height());
    for py in y0..y1 {
        for px in x0..x1 {
            blend(img, px, py, c, 1.0);
        }
    }
}

fn fill_disc(img: &mut RgbaImage, center: [f64; 2], r: f64, c: Rgba) {
    cover_ring(img, center, 0.0, r, c);
}

fn stroke_ring(img: &mut RgbaImage, center: [f64; 2], r: f64, width: f64, c: Rgba) {
    let half = (width * 0.5).max(0.5);
    cover_ring(img, center, (r - half).max(0.0), r + half, c);
}

/// Paints pixels whose centers lie between `inner` and `outer` from `center`,
/// with a one-pixel soft edge.
fn cover_ring(img: &mut RgbaImage, center: [f64; 2], inner: f64, outer: f64, c: Rgba) {
    if !(center[0].is_finite() && center[1].is_finite() && outer.is_finite()) || outer <= 0.0 {
        return;
    }
    let x0 = (center[0] - outer - 1.0).floor().max(0.0) as i64;
    let x1 = ((center[0] + outer + 1.0).ceil() as i64).min(img.width() as i64);
    let y0 = (center[1] - outer - 1.0).floor().max(0.0) as i64;
    let y1 = ((center[1] + outer + 1.0).ceil() as i64).min(img.height() as i64);
    for py in y0..y1 {
        for px in x0..x1 {
            let d = (px as f64 + 0.5 - center[0]).hypot(py as f64 + 0.5 - center[1]);
            let outside = (d - outer + 0.5).clamp(0.0, 1.0);
            let inside = if inner > 0.0 {
                (inner - d + 0.5).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let coverage = 1.0 - outside - inside;
            if coverage > 0.0 {
                blend(img, px, py, c, coverage);
            }
        }
    }
}

/// Strokes a polyline by stamping square pens along each segment. Dash phase
/// carries across vertices.
fn stroke_polyline(
    img: &mut RgbaImage,
    points: &[[f64; 2]],
    c: Rgba,
    width: f64,
    dash: Option<[f64; 2]>,
) {
    let half = (width * 0.5).max(0.5);
    let pattern = dash.filter(|[on, off]| *on > 0.0 && *off >= 0.0);
    let mut travelled = 0.0;
    let mut stamped = std::collections::HashSet::new();
    let (w, h) = (img.width() as f64, img.height() as f64);

    for seg in points.windows(2) {
        let [a, b] = [seg[0], seg[1]];
        let len = (b[0] - a[0]).hypot(b[1] - a[1]);
        if !(a.iter().chain(b.iter()).all(|v| v.is_finite()) && len.is_finite()) {
            continue;
        }
        // Only the part of the segment that can touch the surface is stamped;
        // `along` keeps the dash phase of the unclipped segment.
        let Some((t0, t1)) = clip_segment(a, b, [-half, -half], [w + half, h + half]) else {
            travelled += len;
            continue;
        };
        let steps = (len * (t1 - t0) / 0.5).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = t0 + (t1 - t0) * (i as f64 / steps as f64);
            let along = travelled + len * t;
            if let Some([on, off]) = pattern {
                if along % (on + off) >= on {
                    continue;
                }
            }
            let x = a[0] + (b[0] - a[0]) * t;
            let y = a[1] + (b[1] - a[1]) * t;
            let (x0, x1) = pixel_span(x - half, half * 2.0, img.width());
            let (y0, y1) = pixel_span(y - half, half * 2.0, img.height());
            for py in y0..y1 {
                for px in x0..x1 {
                    // Each pixel is painted once per stroke so translucent
                    // strokes do not darken where stamps overlap.
                    if stamped.insert((px, py)) {
                        blend(img, px, py, c, 1.0);
                    }
                }
            }
        }
        travelled += len;
    }
}

/// Liang-Barsky: the parameter range of `a`->`b` that lies inside the box
/// `lo..=hi`, or `None` when the segment misses it.
fn clip_segment(a: [f64; 2], b: [f64; 2], lo: [f64; 2], hi: [f64; 2]) -> Option<(f64, f64)> {
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for axis in 0..2 {
        let d = b[axis] - a[axis];
        if d == 0.0 {
            if a[axis] < lo[axis] || a[axis] > hi[axis] {
                return None;
            }
            continue;
        }
        let (mut enter, mut exit) = ((lo[axis] - a[axis]) / d, (hi[axis] - a[axis]) / d);
        if enter > exit {
            std::mem::swap(&mut enter, &mut exit);
        }
        t0 = t0.max(enter);
        t1 = t1.min(exit);
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

fn blit_scaled(dst: &mut RgbaImage, src: &RgbaImage, x: f64, y: f64, w: f64, h: f64) {
    if w.abs() < 1.0 || h.abs() < 1.0 || src.width() == 0 || src.height() == 0 {
        return;
    }
    let (x0, x1) = pixel_span(x, w, dst.width());
    let (y0, y1) = pixel_span(y, h, dst.height());
    for py in y0..y1 {
        let v = ((py as f64 + 0.5 - y) / h).clamp(0.0, 1.0);
        let sy = ((v * src.height() as f64) as u32).min(src.height() - 1);
        for px in x0..x1 {
            let u = ((px as f64 + 0.5 - x) / w).clamp(0.0, 1.0);
            let sx = ((u * src.width() as f64) as u32).min(src.width() - 1);
            let s = src.get_pixel(sx, sy).0;
            blend(dst, px, py, Rgba(s[0], s[1], s[2], s[3]), 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Layer, LayerBatch};

    fn list(commands: Vec<DrawCmd>) -> DisplayList {
        DisplayList {
            width: 40,
            height: 30,
            layers: vec![LayerBatch {
                layer: Layer::Background,
                commands,
            }],
        }
    }

    #[test]
    fn clear_then_rect_paints_inside_only() {
        let img = rasterize(
            &list(vec![
                DrawCmd::Clear {
                    color: Rgba::rgb(0, 0, 0),
                },
                DrawCmd::FillRect {
                    x: 10.0,
                    y: 10.0,
                    w: 5.0,
                    h: 5.0,
                    color: Rgba::rgb(255, 0, 0),
                },
            ]),
            &Background::Procedural,
        )
        .unwrap();
        assert_eq!(img.get_pixel(12, 12).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(2, 2).0, [0, 0, 0, 255]);
    }

    #[test]
    fn disc_covers_center() {
        let img = rasterize(
            &list(vec![DrawCmd::FillCircle {
                center: [20.0, 15.0],
                radius: 5.0,
                color: Rgba::rgb(0, 255, 0),
            }]),
            &Background::Procedural,
        )
        .unwrap();
        assert_eq!(img.get_pixel(20, 15).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn dashed_line_leaves_gaps() {
        let img = rasterize(
            &list(vec![DrawCmd::Polyline {
                points: vec![[0.0, 5.0], [40.0, 5.0]],
                color: Rgba::rgb(255, 255, 255),
                width: 1.0,
                dash: Some([4.0, 4.0]),
            }]),
            &Background::Procedural,
        )
        .unwrap();
        let painted = (0..40).filter(|x| img.get_pixel(*x, 5).0[3] > 0).count();
        assert!(painted > 10 && painted < 35, "painted {painted}");
    }

    #[test]
    fn huge_segment_is_clipped_to_the_surface() {
        let started = std::time::Instant::now();
        let img = rasterize(
            &list(vec![DrawCmd::Polyline {
                points: vec![[-1e8, 15.0], [1e8, 15.0]],
                color: Rgba::rgb(255, 0, 0),
                width: 1.5,
                dash: Some([5.0, 5.0]),
            }]),
            &Background::Procedural,
        )
        .unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        // Dash phase is measured from the unclipped start, 1e8 px to the left.
        assert_eq!(img.get_pixel(2, 15).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(7, 15).0[3], 0);
        assert_eq!(img.get_pixel(12, 15).0, [255, 0, 0, 255]);
    }

    #[test]
    fn clip_segment_bounds() {
        let lo = [0.0, 0.0];
        let hi = [10.0, 10.0];
        assert_eq!(clip_segment([-10.0, 5.0], [20.0, 5.0], lo, hi), Some((1.0 / 3.0, 2.0 / 3.0)));
        assert_eq!(clip_segment([2.0, 2.0], [3.0, 3.0], lo, hi), Some((0.0, 1.0)));
        assert_eq!(clip_segment([-5.0, 20.0], [20.0, 20.0], lo, hi), None);
        assert_eq!(clip_segment([-5.0, -1.0], [-1.0, -5.0], lo, hi), None);
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        let mut l = list(Vec::new());
        l.width = 0;
        assert!(matches!(
            rasterize(&l, &Background::Procedural),
            Err(EngineError::InvalidCanvas { .. })
        ));
    }

    #[test]
    fn png_has_signature() {
        let img = RgbaImage::new(2, 2);
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
