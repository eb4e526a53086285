//! 3D散布図・座標軸・カラーバーの描画

use super::camera::TurntableCamera;
use super::canvas::{Canvas, Pixel};
use super::colormap::{Colormap, Normalize};
use super::colors::{Rgb, Rgba};
use super::constants::{
    AXIS_COLOR, COLORBAR_BAR_WIDTH, COLORBAR_TICKS, DEFAULT_POINT_SIZE, TEXT_COLOR,
};
use super::font::{draw_text, format_tick, GLYPH_HEIGHT};
use glam::Vec3;
use rayon::prelude::*;

/// 点の描画設定
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterStyle {
    /// 直径（ピクセル）
    pub point_size: f32,
    pub alpha: f32,
}

impl Default for ScatterStyle {
    fn default() -> Self {
        Self {
            point_size: DEFAULT_POINT_SIZE,
            alpha: 1.0,
        }
    }
}

pub fn rgb_pixels(colors: &[Rgb], alpha: f32) -> Vec<Pixel> {
    colors
        .iter()
        .map(|c| [c[0] as f32, c[1] as f32, c[2] as f32, alpha])
        .collect()
}

pub fn rgba_pixels(colors: &[Rgba], alpha: f32) -> Vec<Pixel> {
    colors
        .iter()
        .map(|c| [c[0] as f32, c[1] as f32, c[2] as f32, c[3] as f32 * alpha])
        .collect()
}

/// 点群を奥から手前の順に描く
///
/// `colors` は `positions` と同じ長さであること（短い方に合わせる）。
/// 戻り値は実際に描いた点の数。
pub fn draw_scatter(
    canvas: &mut Canvas,
    camera: &TurntableCamera,
    positions: &[Vec3],
    colors: &[Pixel],
    style: ScatterStyle,
) -> usize {
    if positions.len() != colors.len() {
        log::warn!(
            "点の数 ({}) と色の数 ({}) が一致しません",
            positions.len(),
            colors.len()
        );
    }
    let (w, h) = (canvas.width(), canvas.height());
    let view_proj = camera.view_proj(w as f32 / h.max(1) as f32);

    let mut sprites: Vec<_> = positions
        .par_iter()
        .zip(colors.par_iter())
        .filter_map(|(&p, &c)| {
            camera
                .project(&view_proj, p, w, h)
                .map(|pr| (pr, [c[0], c[1], c[2], c[3] * style.alpha]))
        })
        .collect();

    sprites.par_sort_unstable_by(|a, b| b.0.depth.total_cmp(&a.0.depth));

    let radius = style.point_size * 0.5;
    for (p, color) in &sprites {
        canvas.fill_disc(p.x, p.y, radius, *color);
    }
    sprites.len()
}

/// 原点から伸びる XYZ 軸（赤・緑・青）と軸名
pub fn draw_axes(canvas: &mut Canvas, camera: &TurntableCamera, origin: Vec3, length: f32) {
    let (w, h) = (canvas.width(), canvas.height());
    let view_proj = camera.view_proj(w as f32 / h.max(1) as f32);
    let Some(o) = camera.project(&view_proj, origin, w, h) else {
        return;
    };

    let axes = [
        (Vec3::X, [1.0, 0.2, 0.2, 1.0], "X"),
        (Vec3::Y, [0.2, 1.0, 0.2, 1.0], "Y"),
        (Vec3::Z, [0.3, 0.5, 1.0, 1.0], "Z"),
    ];
    for (dir, color, label) in axes {
        if let Some(tip) = camera.project(&view_proj, origin + dir * length, w, h) {
            canvas.draw_line(o.x, o.y, tip.x, tip.y, color);
            draw_text(canvas, tip.x as i64 + 3, tip.y as i64 - 3, label, TEXT_COLOR);
        }
    }
}

/// バウンディングボックスの12辺
pub fn draw_box(canvas: &mut Canvas, camera: &TurntableCamera, min: Vec3, max: Vec3) {
    let (w, h) = (canvas.width(), canvas.height());
    let view_proj = camera.view_proj(w as f32 / h.max(1) as f32);
    let corner = |i: usize| {
        Vec3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        )
    };
    for a in 0..8usize {
        for bit in [1usize, 2, 4] {
            let b = a | bit;
            if b == a {
                continue;
            }
            let pa = camera.project(&view_proj, corner(a), w, h);
            let pb = camera.project(&view_proj, corner(b), w, h);
            if let (Some(pa), Some(pb)) = (pa, pb) {
                let mut color = AXIS_COLOR;
                color[3] = 0.35;
                canvas.draw_line(pa.x, pa.y, pb.x, pb.y, color);
            }
        }
    }
}

/// 縦型カラーバー（上端が vmax）と目盛りラベル
pub fn draw_colorbar(
    canvas: &mut Canvas,
    x: i64,
    y: i64,
    height: usize,
    cmap: Colormap,
    norm: Normalize,
) {
    if height < 2 {
        return;
    }
    let bar_x_end = x + COLORBAR_BAR_WIDTH as i64;
    let bar_y_end = y + height as i64;

    // カラーバー本体
    for row in 0..height {
        let t = 1.0 - row as f64 / (height - 1) as f64;
        let c = cmap.sample(t);
        let color = [c[0] as f32, c[1] as f32, c[2] as f32, 1.0];
        canvas.fill_rect(x, y + row as i64, COLORBAR_BAR_WIDTH, 1, color);
    }

    // 枠線
    for xx in x - 1..=bar_x_end {
        canvas.set(xx, y - 1, TEXT_COLOR);
        canvas.set(xx, bar_y_end, TEXT_COLOR);
    }
    for yy in y - 1..=bar_y_end {
        canvas.set(x - 1, yy, TEXT_COLOR);
        canvas.set(bar_x_end, yy, TEXT_COLOR);
    }

    // 目盛りとラベル
    for i in 0..COLORBAR_TICKS {
        let t = i as f64 / (COLORBAR_TICKS - 1) as f64;
        let ty = bar_y_end - 1 - (t * (height - 1) as f64) as i64;

        for xx in bar_x_end..bar_x_end + 5 {
            canvas.set(xx, ty, TEXT_COLOR);
        }
        let label = format_tick(norm.inverse(t));
        draw_text(
            canvas,
            bar_x_end + 7,
            ty - (GLYPH_HEIGHT as i64) / 2,
            &label,
            TEXT_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque_count(canvas: &Canvas) -> usize {
        canvas.to_image().pixels().filter(|p| p.0[3] > 0).count()
    }

    #[test]
    fn test_scatter_draws_visible_points() {
        let mut canvas = Canvas::new(64, 64);
        let camera = TurntableCamera::default();
        let positions = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)];
        let colors = [[1.0, 0.0, 0.0, 1.0]; 2];

        let drawn = draw_scatter(&mut canvas, &camera, &positions, &colors, ScatterStyle::default());
        assert_eq!(drawn, 2);
        assert_eq!(canvas.pixel(32, 32), Some([1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_nearer_point_wins() {
        let mut canvas = Canvas::new(64, 64);
        let camera = TurntableCamera::default();
        let toward_eye = (camera.eye() - camera.center).normalize();
        // 同じ画素に重なる2点: 手前が緑、奥が赤
        let positions = [toward_eye * 2.0, Vec3::ZERO];
        let colors = [[0.0, 1.0, 0.0, 1.0], [1.0, 0.0, 0.0, 1.0]];

        draw_scatter(&mut canvas, &camera, &positions, &colors, ScatterStyle::default());
        assert_eq!(canvas.pixel(32, 32), Some([0.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn test_style_alpha_applies() {
        let mut canvas = Canvas::new(16, 16);
        let camera = TurntableCamera::default();
        let style = ScatterStyle {
            point_size: 3.0,
            alpha: 0.4,
        };
        draw_scatter(&mut canvas, &camera, &[Vec3::ZERO], &[[1.0; 4]], style);
        let p = canvas.pixel(8, 8).unwrap();
        assert!((p[3] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_conversions() {
        assert_eq!(rgb_pixels(&[[1.0, 0.5, 0.0]], 0.8), vec![[1.0, 0.5, 0.0, 0.8]]);
        assert_eq!(
            rgba_pixels(&[[0.0, 0.0, 1.0, 0.5]], 0.5),
            vec![[0.0, 0.0, 1.0, 0.25]]
        );
    }

    #[test]
    fn test_axes_box_and_colorbar_draw_something() {
        let camera = TurntableCamera::default();

        let mut canvas = Canvas::new(128, 128);
        draw_axes(&mut canvas, &camera, Vec3::ZERO, 3.0);
        assert!(opaque_count(&canvas) > 0);

        let mut canvas = Canvas::new(128, 128);
        draw_box(&mut canvas, &camera, Vec3::splat(-2.0), Vec3::splat(2.0));
        assert!(opaque_count(&canvas) > 0);

        let mut canvas = Canvas::new(128, 128);
        draw_colorbar(&mut canvas, 10, 10, 100, Colormap::Magma, Normalize::new(0.0, 1.0));
        // 上端は vmax 側の色
        let top = canvas.pixel(12, 10).unwrap();
        let c = Colormap::Magma.sample(1.0);
        assert!((top[0] - c[0] as f32).abs() < 1e-5);
        let bottom = canvas.pixel(12, 109).unwrap();
        let c = Colormap::Magma.sample(0.0);
        assert!((bottom[0] - c[0] as f32).abs() < 1e-5);
    }
}
