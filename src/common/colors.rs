//! キーから色への変換関数
//!
//! 空間ソートキー（モートンキー等）を色に写す2種類の純関数を提供する。
//!   - ハッシュ着色: 乗算ハッシュでビットを攪拌し、キーごとに散らばった色を得る
//!   - パレット着色: レインボーパレットを直接参照し、周期オフセット位置の色と合成する

use super::constants::{
    DIRECT_WEIGHT, HASH_MUL_B, HASH_MUL_G, HASH_MUL_R, OFFSET_WEIGHT,
};
use super::error::{Error, Result};
use rayon::prelude::*;

/// RGB (各成分 0.0-1.0)
pub type Rgb = [f64; 3];

/// RGBA (各成分 0.0-1.0)
pub type Rgba = [f64; 4];

// ===== ハッシュ着色 =====

/// 任意の整数キーを 2^32 で剰余を取って u32 に落とす
#[inline]
pub fn wrap_key(key: i64) -> u32 {
    key as u32
}

/// 1キー分のハッシュ色を計算（アルファは常に 1.0）
#[inline]
pub fn hash_color(key: u32) -> Rgba {
    let r = (key.wrapping_mul(HASH_MUL_R) >> 16) & 0xFF;
    let g = (key.wrapping_mul(HASH_MUL_G) >> 8) & 0xFF;
    let b = key.wrapping_mul(HASH_MUL_B) & 0xFF;

    [r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, 1.0]
}

/// キー列をハッシュ色に変換する
pub fn colorize_by_hash(keys: &[u32]) -> Vec<Rgba> {
    keys.par_iter().map(|&k| hash_color(k)).collect()
}

// ===== パレット =====

/// 色相が一周するパレットを生成する機能
pub trait CyclicPalette {
    fn generate_cyclic_palette(&self, n: usize) -> Vec<Rgb>;
}

/// matplotlib の `rainbow` と同じ色ランプ
#[derive(Clone, Copy, Debug, Default)]
pub struct Rainbow;

impl Rainbow {
    /// x (0.0-1.0) における色
    pub fn at(x: f64) -> Rgb {
        let r = (2.0 * x - 0.5).abs();
        let g = (std::f64::consts::PI * x).sin();
        let b = (std::f64::consts::FRAC_PI_2 * x).cos();
        [r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0)]
    }
}

impl CyclicPalette for Rainbow {
    fn generate_cyclic_palette(&self, n: usize) -> Vec<Rgb> {
        // n 段を 0.0 から 1.0 まで等間隔に取る（両端を含む）
        let denom = n.saturating_sub(1).max(1) as f64;
        (0..n).map(|i| Rainbow::at(i as f64 / denom)).collect()
    }
}

/// HSV の色相環を等分したパレット
#[derive(Clone, Copy, Debug)]
pub struct HueWheel {
    pub saturation: f64,
    pub value: f64,
}

impl Default for HueWheel {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            value: 1.0,
        }
    }
}

impl CyclicPalette for HueWheel {
    fn generate_cyclic_palette(&self, n: usize) -> Vec<Rgb> {
        (0..n)
            .map(|i| hsv_to_rgb(i as f64 / n as f64, self.saturation, self.value))
            .collect()
    }
}

/// HSV から RGB への変換（h は 0.0-1.0 で一周）
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let h = h.rem_euclid(1.0);

    let i = (h * 6.0).floor() as i32;
    let f = h * 6.0 - i as f64;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    match i % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

// ===== パレット着色 =====

/// パレット参照とランレングス周期のオフセット参照を合成する着色器
///
/// パレットは `max_key + 1` 色。`run_length` 個の連続キーごとに
/// オフセット側の色が一巡するため、近いキー同士でも色が分かれる。
#[derive(Clone, Debug)]
pub struct PaletteColorizer {
    palette: Vec<Rgb>,
    max_key: u64,
    run_length: u64,
    run_offset: u64,
}

impl PaletteColorizer {
    /// レインボーパレットで構築する
    pub fn new(max_key: u64, run_length: u64) -> Result<Self> {
        Self::with_palette(&Rainbow, max_key, run_length)
    }

    /// 任意のパレット生成器で構築する
    pub fn with_palette<P: CyclicPalette + ?Sized>(
        source: &P,
        max_key: u64,
        run_length: u64,
    ) -> Result<Self> {
        if run_length == 0 {
            return Err(Error::InvalidRunLength);
        }
        let n = max_key
            .checked_add(1)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(Error::PaletteTooLarge(max_key))?;

        let palette = source.generate_cyclic_palette(n);
        if palette.len() != n {
            return Err(Error::Malformed(format!(
                "パレット生成器が {} 色を返しました (期待値 {})",
                palette.len(),
                n
            )));
        }

        Ok(Self {
            palette,
            max_key,
            run_length,
            run_offset: n as u64 / run_length,
        })
    }

    /// データ中の最大キーからパレットを構築する（空なら 1 色）
    pub fn for_keys(keys: &[u64], run_length: u64) -> Result<Self> {
        let max_key = keys.iter().copied().max().unwrap_or(0);
        Self::new(max_key, run_length)
    }

    pub fn max_key(&self) -> u64 {
        self.max_key
    }

    pub fn run_length(&self) -> u64 {
        self.run_length
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    /// 周期オフセット側のパレット位置
    pub fn offset_index(&self, key: u64) -> usize {
        let idx = self.run_offset.saturating_mul(key % self.run_length);
        idx.min(self.max_key) as usize
    }

    /// 1キー分の合成色
    pub fn color(&self, key: u64) -> Result<Rgb> {
        if key > self.max_key {
            return Err(Error::OutOfRange {
                key,
                max_key: self.max_key,
            });
        }
        let direct = self.palette[key as usize];
        let offset = self.palette[self.offset_index(key)];

        Ok([
            OFFSET_WEIGHT * offset[0] + DIRECT_WEIGHT * direct[0],
            OFFSET_WEIGHT * offset[1] + DIRECT_WEIGHT * direct[1],
            OFFSET_WEIGHT * offset[2] + DIRECT_WEIGHT * direct[2],
        ])
    }

    /// キー列をまとめて変換する（範囲外のキーがあれば失敗）
    pub fn colorize(&self, keys: &[u64]) -> Result<Vec<Rgb>> {
        keys.par_iter().map(|&k| self.color(k)).collect()
    }
}

/// `max_key` と `run_length` からキー→色の関数を作る
pub fn build_palette_colorizer(
    max_key: u64,
    run_length: u64,
) -> Result<impl Fn(u64) -> Result<Rgb>> {
    let colorizer = PaletteColorizer::new(max_key, run_length)?;
    Ok(move |key| colorizer.color(key))
}

/// 0xRRGGBB 形式へ変換
pub fn rgb_to_u32(c: Rgb) -> u32 {
    let r = (c[0].clamp(0.0, 1.0) * 255.0).round() as u32;
    let g = (c[1].clamp(0.0, 1.0) * 255.0).round() as u32;
    let b = (c[2].clamp(0.0, 1.0) * 255.0).round() as u32;
    (r << 16) | (g << 8) | b
}
