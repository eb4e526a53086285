//! バッチ描画用の 2x2 図
//!
//!   左上: モートンキー（パレット着色）   右上: 密度 (magma)
//!   左下: 圧力 (viridis)                 右下: 外力の大きさ（正規化, plasma）

use super::camera::TurntableCamera;
use super::canvas::Canvas;
use super::colormap::{map_scalars, Colormap, Normalize};
use super::colors::PaletteColorizer;
use super::constants::{
    COLORBAR_MARGIN, COLORBAR_WIDTH, DEFAULT_POINT_SIZE, DEFAULT_RUN_LENGTH, FIGURE_HEIGHT,
    FIGURE_WIDTH,
};
use super::error::Result;
use super::scatter::{draw_box, draw_colorbar, draw_scatter, rgb_pixels, ScatterStyle};
use super::snapshot::Snapshot;

/// 図の各パネル
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelKind {
    MortonKeys,
    Density,
    Pressure,
    ForceMagnitude,
}

impl PanelKind {
    /// 左上から行優先の並び
    pub const ALL: [PanelKind; 4] = [
        PanelKind::MortonKeys,
        PanelKind::Density,
        PanelKind::Pressure,
        PanelKind::ForceMagnitude,
    ];

    pub fn alpha(self) -> f32 {
        match self {
            PanelKind::ForceMagnitude => 0.4,
            _ => 0.8,
        }
    }

    /// スカラーパネルのカラーマップ（キーパネルは None）
    pub fn colormap(self) -> Option<Colormap> {
        match self {
            PanelKind::MortonKeys => None,
            PanelKind::Density => Some(Colormap::Magma),
            PanelKind::Pressure => Some(Colormap::Viridis),
            PanelKind::ForceMagnitude => Some(Colormap::Plasma),
        }
    }
}

impl std::fmt::Display for PanelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelKind::MortonKeys => write!(f, "Particles colored by Morton keys"),
            PanelKind::Density => write!(f, "Particle densities"),
            PanelKind::Pressure => write!(f, "Particle pressures"),
            PanelKind::ForceMagnitude => write!(f, "Force magnitude (normalized)"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FigureOptions {
    pub width: usize,
    pub height: usize,
    pub run_length: u64,
    pub point_size: f32,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            width: FIGURE_WIDTH,
            height: FIGURE_HEIGHT,
            run_length: DEFAULT_RUN_LENGTH,
            point_size: DEFAULT_POINT_SIZE,
        }
    }
}

/// 2x2 図を描く（背景は透過）
///
/// 該当フィールドのないパネルは空のまま残す。
pub fn render_figure(snapshot: &Snapshot, options: &FigureOptions) -> Result<Canvas> {
    let mut figure = Canvas::new(options.width, options.height);
    let panel_w = options.width / 2;
    let panel_h = options.height / 2;

    let mut camera = TurntableCamera::default();
    let bounds = snapshot.bounds();
    if let Some((lo, hi)) = bounds {
        camera.fit_bounds(lo, hi);
    }

    for (i, kind) in PanelKind::ALL.into_iter().enumerate() {
        let Some(panel) = render_panel(snapshot, kind, &camera, panel_w, panel_h, options)? else {
            log::warn!("パネル「{}」に必要なデータがないため省略します", kind);
            continue;
        };
        let x = (i % 2 * panel_w) as i64;
        let y = (i / 2 * panel_h) as i64;
        figure.blit(&panel, x, y);
        log::debug!("パネル「{}」を描画しました", kind);
    }

    Ok(figure)
}

/// 1パネル分（データがなければ None）
pub fn render_panel(
    snapshot: &Snapshot,
    kind: PanelKind,
    camera: &TurntableCamera,
    width: usize,
    height: usize,
    options: &FigureOptions,
) -> Result<Option<Canvas>> {
    let scatter_w = width.saturating_sub(COLORBAR_WIDTH).max(1);
    let style = ScatterStyle {
        point_size: options.point_size,
        alpha: kind.alpha(),
    };

    let (colors, colorbar) = match kind {
        PanelKind::MortonKeys => {
            let Some(keys) = snapshot.keys.as_deref() else {
                return Ok(None);
            };
            let colorizer = PaletteColorizer::for_keys(keys, options.run_length)?;
            (colorizer.colorize(keys)?, None)
        }
        PanelKind::Density | PanelKind::Pressure | PanelKind::ForceMagnitude => {
            let values = match kind {
                PanelKind::Density => snapshot.density.clone(),
                PanelKind::Pressure => snapshot.pressure.clone(),
                _ => snapshot.force_magnitude(),
            };
            let Some(values) = values else {
                return Ok(None);
            };
            let cmap = kind.colormap().unwrap_or(Colormap::Viridis);
            let (values, norm) = if kind == PanelKind::ForceMagnitude {
                // 外力は [0, 1] に正規化してから固定範囲で着色する
                let data_norm = Normalize::from_values(&values);
                let scaled: Vec<f64> = values.iter().map(|&v| data_norm.apply(v)).collect();
                (scaled, Normalize::new(0.0, 1.0))
            } else {
                let norm = Normalize::from_values(&values);
                (values, norm)
            };
            (map_scalars(&values, norm, cmap), Some((cmap, norm)))
        }
    };

    let mut panel = Canvas::new(width, height);
    let mut plot = Canvas::new(scatter_w, height);
    if let Some((lo, hi)) = snapshot.bounds() {
        draw_box(&mut plot, camera, lo, hi);
    }
    draw_scatter(
        &mut plot,
        camera,
        &snapshot.positions,
        &rgb_pixels(&colors, 1.0),
        style,
    );
    panel.blit(&plot, 0, 0);

    if let Some((cmap, norm)) = colorbar {
        let bar_h = height * 6 / 10;
        let bar_y = ((height - bar_h) / 2) as i64;
        draw_colorbar(
            &mut panel,
            (scatter_w + COLORBAR_MARGIN) as i64,
            bar_y,
            bar_h,
            cmap,
            norm,
        );
    }

    Ok(Some(panel))
}
