//! RGBA フレームバッファ
//!
//! 透過背景のまま PNG に保存でき、ウィンドウ表示用には 0xRRGGBB の
//! バッファへ背景色と合成して書き出す。

use super::error::Result;
use image::{ImageBuffer, Rgba};
use std::path::Path;

/// 1ピクセル (r, g, b, a)、各成分 0.0-1.0、非乗算アルファ
pub type Pixel = [f32; 4];

pub const TRANSPARENT: Pixel = [0.0, 0.0, 0.0, 0.0];

/// 線分の端点座標の上限（ピクセル）
const LINE_COORD_LIMIT: f32 = 1.0e9;

#[derive(Clone, Debug)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    pub fn filled(width: usize, height: usize, color: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn clear(&mut self, color: Pixel) {
        self.pixels.fill(color);
    }

    /// 上書き（合成しない）
    pub fn set(&mut self, x: i64, y: i64, color: Pixel) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// アルファ合成で描く
    pub fn blend(&mut self, x: i64, y: i64, color: Pixel) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = over(color, self.pixels[i]);
        }
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// 塗りつぶし円（中心・半径はピクセル単位）
    pub fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, color: Pixel) {
        let r = radius.max(0.5);
        let x0 = (cx - r).floor() as i64;
        let x1 = (cx + r).ceil() as i64;
        let y0 = (cy - r).floor() as i64;
        let y1 = (cy + r).ceil() as i64;
        let r2 = r * r;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend(x, y, color);
                }
            }
        }
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: usize, h: usize, color: Pixel) {
        for yy in y..y + h as i64 {
            for xx in x..x + w as i64 {
                self.set(xx, yy, color);
            }
        }
    }

    /// 線分（Bresenham）
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Pixel) {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return;
        }
        // 座標は i64 の差分や 2 倍が溢れない範囲に丸める
        let snap = |v: f32| v.round().clamp(-LINE_COORD_LIMIT, LINE_COORD_LIMIT) as i64;
        let (mut x, mut y) = (snap(x0), snap(y0));
        let (xe, ye) = (snap(x1), snap(y1));
        let dx = (xe - x).abs();
        let dy = -(ye - y).abs();
        let sx = if x < xe { 1 } else { -1 };
        let sy = if y < ye { 1 } else { -1 };
        let mut err = dx + dy;

        // 画面外に極端に伸びた線で回り続けないよう上限を設ける
        let limit = 4 * (self.width + self.height) as i64;
        for _ in 0..=limit {
            self.blend(x, y, color);
            if x == xe && y == ye {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// 別キャンバスを (x, y) に合成
    pub fn blit(&mut self, src: &Canvas, x: i64, y: i64) {
        for sy in 0..src.height {
            for sx in 0..src.width {
                let p = src.pixels[sy * src.width + sx];
                if p[3] > 0.0 {
                    self.blend(x + sx as i64, y + sy as i64, p);
                }
            }
        }
    }

    /// 背景色と合成して 0xRRGGBB のバッファにする（minifb 用）
    pub fn to_u32_buffer(&self, background: u32) -> Vec<u32> {
        let bg = [
            ((background >> 16) & 0xFF) as f32 / 255.0,
            ((background >> 8) & 0xFF) as f32 / 255.0,
            (background & 0xFF) as f32 / 255.0,
            1.0,
        ];
        self.pixels
            .iter()
            .map(|&p| {
                let c = over(p, bg);
                (to_u8(c[0]) as u32) << 16 | (to_u8(c[1]) as u32) << 8 | to_u8(c[2]) as u32
            })
            .collect()
    }

    pub fn to_image(&self) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            let p = self.pixels[y as usize * self.width + x as usize];
            Rgba([to_u8(p[0]), to_u8(p[1]), to_u8(p[2]), to_u8(p[3])])
        })
    }

    /// 透過 PNG として保存
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_image().save(path)?;
        log::info!("画像を保存しました: {}", path.display());
        Ok(())
    }
}

/// src を dst の上に重ねる
fn over(src: Pixel, dst: Pixel) -> Pixel {
    let sa = src[3].clamp(0.0, 1.0);
    let da = dst[3] * (1.0 - sa);
    let a = sa + da;
    if a <= 0.0 {
        return TRANSPARENT;
    }
    [
        (src[0] * sa + dst[0] * da) / a,
        (src[1] * sa + dst[1] * da) / a,
        (src[2] * sa + dst[2] * da) / a,
        a,
    ]
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
