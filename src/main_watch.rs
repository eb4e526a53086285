//! シミュレーション出力の監視ビューア（アニメーション版）
//!
//! `<prefix>.<反復>.<ext>` 形式のスナップショットを一定間隔で探し、
//! 新しいファイルが現れるたびに散布図を更新する。
//! モートンキーがあればハッシュ色と viridis を合成して色付けする。
//!
//! 操作方法:
//!   - 矢印キー: カメラ回転
//!   - + / - キー: 拡大/縮小
//!   - F キー: 点群全体が収まるように合わせる
//!   - R キー: カメラを初期状態にリセット
//!   - S キー: 現在の表示を画像として保存
//!   - Q / Escape キー: 終了

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use particle_viz::common::{
    camera::TurntableCamera,
    canvas::{Canvas, Pixel, TRANSPARENT},
    colormap::blend_key_colors,
    constants::{
        DEFAULT_KEY_BITS, DEFAULT_POINT_SIZE, DEFAULT_POLL_INTERVAL_SECS, ORBIT_STEP_DEG,
        WINDOW_HEIGHT, WINDOW_WIDTH, ZOOM_FACTOR_IN, ZOOM_FACTOR_OUT,
    },
    poller::{PollOutcome, SnapshotPoller},
    scatter::{draw_axes, draw_scatter, rgba_pixels, ScatterStyle},
    snapshot::Snapshot,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// キーがないときの点の色
const ORANGE: Pixel = [1.0, 0.647, 0.0, 1.0];

/// ポーリング間隔の下限（秒）
const MIN_POLL_INTERVAL_SECS: f64 = 0.01;

#[derive(Parser, Debug)]
#[command(name = "particle-watch")]
#[command(version, about = "連番スナップショットを監視して3D散布図をアニメーション表示する")]
struct Cli {
    /// ファイル名の接頭辞（例: out/out → out/out.<反復>.h5）
    prefix: PathBuf,

    /// ポーリング間隔（秒、正の有限値）
    #[arg(default_value_t = DEFAULT_POLL_INTERVAL_SECS, value_parser = parse_interval)]
    interval: f64,

    /// スナップショットの拡張子
    #[arg(long, default_value = "h5")]
    ext: String,

    /// モートンキーの1軸あたりのビット数
    #[arg(long, default_value_t = DEFAULT_KEY_BITS)]
    key_bits: u32,

    /// 点の直径（ピクセル）
    #[arg(long, default_value_t = DEFAULT_POINT_SIZE)]
    point_size: f32,
}

/// ビューアの状態
struct ViewerState {
    camera: TurntableCamera,
    canvas: Canvas,
    buffer: Vec<u32>,
    positions: Vec<Vec3>,
    colors: Vec<Pixel>,
    bounds: Option<(Vec3, Vec3)>,
    style: ScatterStyle,
    key_bits: u32,
    needs_redraw: bool,
    save_counter: u32,
}

impl ViewerState {
    fn new(point_size: f32, key_bits: u32) -> Self {
        Self {
            camera: TurntableCamera::default(),
            canvas: Canvas::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            buffer: vec![0; WINDOW_WIDTH * WINDOW_HEIGHT],
            // 最初のファイルが届くまでは原点に1点だけ置く
            positions: vec![Vec3::ZERO],
            colors: vec![ORANGE],
            bounds: None,
            style: ScatterStyle {
                point_size,
                alpha: 1.0,
            },
            key_bits,
            needs_redraw: true,
            save_counter: 0,
        }
    }

    fn set_snapshot(&mut self, snapshot: Snapshot) {
        self.colors = match snapshot.keys.as_deref() {
            Some(keys) => rgba_pixels(&blend_key_colors(keys, self.key_bits), 1.0),
            None => vec![ORANGE; snapshot.len()],
        };
        self.bounds = snapshot.bounds();
        self.positions = snapshot.positions;
        self.needs_redraw = true;
    }

    fn fit(&mut self) {
        if let Some((lo, hi)) = self.bounds {
            self.camera.fit_bounds(lo, hi);
            self.needs_redraw = true;
        }
    }

    fn render(&mut self) {
        self.canvas.clear(TRANSPARENT);
        draw_axes(&mut self.canvas, &self.camera, Vec3::ZERO, 1.0);
        let drawn = draw_scatter(
            &mut self.canvas,
            &self.camera,
            &self.positions,
            &self.colors,
            self.style,
        );
        self.buffer = self.canvas.to_u32_buffer(0x000000);
        self.needs_redraw = false;
        log::debug!("再描画: {} / {} 点", drawn, self.positions.len());
    }

    fn save_image(&mut self) {
        self.save_counter += 1;
        let filename = PathBuf::from(format!("particles_{:03}.png", self.save_counter));
        if let Err(e) = self.canvas.save_png(&filename) {
            log::warn!("画像の保存に失敗しました: {e}");
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    check_extension(&cli.ext)?;
    let interval = Duration::try_from_secs_f64(cli.interval.max(MIN_POLL_INTERVAL_SECS))
        .context("ポーリング間隔が不正です")?;

    println!("操作方法:");
    println!("  - 矢印キー: カメラ回転");
    println!("  - + / - キー: 拡大/縮小");
    println!("  - F キー: 全体表示");
    println!("  - R キー: カメラをリセット");
    println!("  - S キー: 現在の表示を画像として保存");
    println!("  - Q / Escape キー: 終了");
    println!();

    let mut window = Window::new(
        "粒子ビューア",
        WINDOW_WIDTH,
        WINDOW_HEIGHT,
        WindowOptions {
            resize: false,
            ..WindowOptions::default()
        },
    )
    .context("ウィンドウの作成に失敗しました")?;
    window.set_target_fps(60);

    let mut poller = SnapshotPoller::new(&cli.prefix, &cli.ext);
    let mut state = ViewerState::new(cli.point_size, cli.key_bits);
    let mut last_poll: Option<Instant> = None;

    while window.is_open() && !window.is_key_down(Key::Escape) && !window.is_key_down(Key::Q) {
        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            state.camera.reset();
            state.needs_redraw = true;
        }
        if window.is_key_pressed(Key::F, KeyRepeat::No) {
            state.fit();
        }
        if window.is_key_pressed(Key::S, KeyRepeat::No) {
            state.save_image();
        }

        let d_az = key_axis(&window, Key::Right, Key::Left) * ORBIT_STEP_DEG;
        let d_el = key_axis(&window, Key::Up, Key::Down) * ORBIT_STEP_DEG;
        if d_az != 0.0 || d_el != 0.0 {
            state.camera.orbit(d_az, d_el);
            state.needs_redraw = true;
        }
        if window.is_key_down(Key::Equal) || window.is_key_down(Key::NumPadPlus) {
            state.camera.zoom(ZOOM_FACTOR_IN);
            state.needs_redraw = true;
        }
        if window.is_key_down(Key::Minus) || window.is_key_down(Key::NumPadMinus) {
            state.camera.zoom(ZOOM_FACTOR_OUT);
            state.needs_redraw = true;
        }

        if last_poll.map_or(true, |t| t.elapsed() >= interval) {
            last_poll = Some(Instant::now());
            match poller.poll() {
                Ok(PollOutcome::NewData {
                    path,
                    iteration,
                    snapshot,
                }) => {
                    print!("\r{} を表示中 (反復 {})          ", path.display(), iteration);
                    std::io::stdout().flush().ok();
                    window.set_title(&format!("粒子ビューア [反復 {}]", iteration));
                    state.set_snapshot(snapshot);
                }
                Ok(PollOutcome::NoNewData) => {
                    if poller.last_seen().is_none() {
                        print!("\r新しいスナップショットを待っています...");
                        std::io::stdout().flush().ok();
                    }
                }
                Err(e) => log::warn!("スナップショットを読み込めませんでした: {e}"),
            }
        }

        if state.needs_redraw {
            state.render();
        }

        window
            .update_with_buffer(&state.buffer, WINDOW_WIDTH, WINDOW_HEIGHT)
            .context("バッファの更新に失敗しました")?;
    }

    println!();
    println!("終了しました");
    Ok(())
}

/// ポーリング間隔の引数を解釈する（inf / NaN / 0 以下は拒否）
fn parse_interval(s: &str) -> std::result::Result<f64, String> {
    let v: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("数値ではありません: {e}"))?;
    if !v.is_finite() || v <= 0.0 {
        return Err(format!("正の有限値を指定してください: {s}"));
    }
    if Duration::try_from_secs_f64(v).is_err() {
        return Err(format!("間隔が大きすぎます: {s}"));
    }
    Ok(v)
}

/// このビルドで読めない拡張子なら起動時に止める
fn check_extension(ext: &str) -> Result<()> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Ok(()),
        "h5" | "hdf5" if cfg!(feature = "hdf5") => Ok(()),
        "h5" | "hdf5" => anyhow::bail!(
            "拡張子 .{ext} を読むには HDF5 対応が必要です: `cargo build --features hdf5` でビルドし直すか、--ext csv を指定してください"
        ),
        _ => anyhow::bail!("未対応の拡張子です: .{ext}（csv または h5）"),
    }
}

/// 押されているキーの組を -1.0 / 0.0 / 1.0 に
fn key_axis(window: &Window, plus: Key, minus: Key) -> f32 {
    let mut v = 0.0;
    if window.is_key_down(plus) {
        v += 1.0;
    }
    if window.is_key_down(minus) {
        v -= 1.0;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_positional_interval() {
        let cli = Cli::parse_from(["particle-watch", "out/out", "0.25", "--ext", "csv"]);
        assert_eq!(cli.prefix, PathBuf::from("out/out"));
        assert_eq!(cli.interval, 0.25);
        assert_eq!(cli.ext, "csv");
        assert_eq!(cli.key_bits, 4);
    }

    #[test]
    fn test_cli_rejects_bad_interval() {
        for bad in ["inf", "-inf", "NaN", "0", "-1", "1e300", "abc"] {
            assert!(
                Cli::try_parse_from(["particle-watch", "out/out", bad]).is_err(),
                "{bad} should be rejected"
            );
        }
        let cli = Cli::try_parse_from(["particle-watch", "out/out", "0.001"]).unwrap();
        assert_eq!(cli.interval, 0.001);
    }

    #[test]
    fn test_check_extension() {
        assert!(check_extension("csv").is_ok());
        assert!(check_extension(".CSV").is_ok());
        assert!(check_extension("txt").is_err());
        assert_eq!(check_extension("h5").is_ok(), cfg!(feature = "hdf5"));
        assert_eq!(check_extension("hdf5").is_ok(), cfg!(feature = "hdf5"));
        if !cfg!(feature = "hdf5") {
            let msg = check_extension("h5").unwrap_err().to_string();
            assert!(msg.contains("--features hdf5"));
        }
    }

    #[test]
    fn test_state_colors_follow_keys() {
        let mut state = ViewerState::new(5.0, 4);
        assert_eq!(state.colors, vec![ORANGE]);

        let snapshot = Snapshot {
            positions: vec![Vec3::ZERO, Vec3::ONE],
            keys: Some(vec![0, 1]),
            ..Snapshot::default()
        };
        state.set_snapshot(snapshot);
        assert_eq!(state.positions.len(), 2);
        assert_eq!(state.colors.len(), 2);
        assert_ne!(state.colors[0], ORANGE);

        state.set_snapshot(Snapshot {
            positions: vec![Vec3::ZERO; 3],
            ..Snapshot::default()
        });
        assert_eq!(state.colors, vec![ORANGE; 3]);
        assert!(state.needs_redraw);

        state.render();
        assert!(!state.needs_redraw);
        assert_eq!(state.buffer.len(), WINDOW_WIDTH * WINDOW_HEIGHT);
    }
}
