//! スカラー場用カラーマップ

use super::colors::{hash_color, Rainbow, Rgb, Rgba};
use super::constants::{DIRECT_WEIGHT, OFFSET_WEIGHT};

/// viridis の制御点（t = i/8）
const VIRIDIS: [Rgb; 9] = [
    [0.267004, 0.004874, 0.329415],
    [0.282623, 0.140926, 0.457517],
    [0.229739, 0.322361, 0.545706],
    [0.172719, 0.448791, 0.557885],
    [0.127568, 0.566949, 0.550556],
    [0.157851, 0.683765, 0.501686],
    [0.369214, 0.788888, 0.382914],
    [0.678489, 0.863742, 0.189503],
    [0.993248, 0.906157, 0.143936],
];

/// magma の制御点（t = i/8）
const MAGMA: [Rgb; 9] = [
    [0.001462, 0.000466, 0.013866],
    [0.113094, 0.065492, 0.276784],
    [0.316654, 0.071690, 0.485380],
    [0.511822, 0.144926, 0.508743],
    [0.716387, 0.214982, 0.475290],
    [0.900946, 0.320508, 0.386248],
    [0.985631, 0.533824, 0.387040],
    [0.996446, 0.766908, 0.531667],
    [0.987053, 0.991438, 0.749504],
];

/// plasma の制御点（t = i/8）
const PLASMA: [Rgb; 9] = [
    [0.050383, 0.029803, 0.527975],
    [0.287076, 0.010855, 0.627295],
    [0.494877, 0.011990, 0.657865],
    [0.665129, 0.138566, 0.585582],
    [0.798216, 0.280197, 0.469538],
    [0.902323, 0.418126, 0.367632],
    [0.973416, 0.585761, 0.251540],
    [0.991209, 0.771153, 0.159447],
    [0.940015, 0.975158, 0.131326],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Colormap {
    Viridis,
    Magma,
    Plasma,
    Rainbow,
}

impl Colormap {
    /// t (0.0-1.0、範囲外は端に丸める) の色
    pub fn sample(self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Colormap::Viridis => interpolate(&VIRIDIS, t),
            Colormap::Magma => interpolate(&MAGMA, t),
            Colormap::Plasma => interpolate(&PLASMA, t),
            Colormap::Rainbow => Rainbow::at(t),
        }
    }
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colormap::Viridis => write!(f, "viridis"),
            Colormap::Magma => write!(f, "magma"),
            Colormap::Plasma => write!(f, "plasma"),
            Colormap::Rainbow => write!(f, "rainbow"),
        }
    }
}

/// 等間隔の制御点を線形補間
fn interpolate(stops: &[Rgb], t: f64) -> Rgb {
    let scaled = t * (stops.len() - 1) as f64;
    let idx = (scaled as usize).min(stops.len() - 2);
    let frac = scaled - idx as f64;

    let c1 = stops[idx];
    let c2 = stops[idx + 1];
    [
        c1[0] + (c2[0] - c1[0]) * frac,
        c1[1] + (c2[1] - c1[1]) * frac,
        c1[2] + (c2[2] - c1[2]) * frac,
    ]
}

/// 値域 [vmin, vmax] を [0, 1] に写す
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// データの最小値・最大値から作る（NaN は無視、空なら [0, 1]）
    pub fn from_values(values: &[f64]) -> Self {
        let (vmin, vmax) = values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if vmin > vmax {
            Self::new(0.0, 1.0)
        } else {
            Self::new(vmin, vmax)
        }
    }

    /// 幅ゼロの値域はすべて 0.0 に写す
    pub fn apply(&self, v: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if span <= 0.0 {
            0.0
        } else {
            (v - self.vmin) / span
        }
    }

    /// 正規化後の t に対応する元の値
    pub fn inverse(&self, t: f64) -> f64 {
        self.vmin + t * (self.vmax - self.vmin)
    }
}

/// 値列を正規化してカラーマップに通す
pub fn map_scalars(values: &[f64], norm: Normalize, cmap: Colormap) -> Vec<Rgb> {
    values.iter().map(|&v| cmap.sample(norm.apply(v))).collect()
}

/// 監視モード用のキー着色: viridis のなめらかな帯とハッシュ色を合成
///
/// `key_bits` は1軸あたりのビット数で、最大キーは `2^(3*key_bits) - 1`。
pub fn blend_key_colors(keys: &[u64], key_bits: u32) -> Vec<Rgba> {
    let max_key = ((1u64 << (3 * key_bits.min(21))) - 1) as f64;

    keys.iter()
        .map(|&k| {
            let band = Colormap::Viridis.sample(k as f64 / (max_key + 1e-9));
            let hashed = hash_color(k as u32);
            [
                OFFSET_WEIGHT * band[0] + DIRECT_WEIGHT * hashed[0],
                OFFSET_WEIGHT * band[1] + DIRECT_WEIGHT * hashed[1],
                OFFSET_WEIGHT * band[2] + DIRECT_WEIGHT * hashed[2],
                OFFSET_WEIGHT + DIRECT_WEIGHT * hashed[3],
            ]
        })
        .collect()
}
