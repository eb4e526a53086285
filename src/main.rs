//! 粒子スナップショットの 2x2 図を描画するツール（バッチ版）
//!
//! CSV ダンプ（x, y, z, morton_key, density, pressure, fpx, fpy, fpz）を読み込み、
//! モートンキー・密度・圧力・外力の大きさで色分けした3D散布図を
//! 透過 PNG として保存し、ウィンドウに表示する。
//!
//! 操作方法:
//!   - S キー: 表示中の図を連番付きで再保存
//!   - Q / Escape キー: 終了

use anyhow::{Context, Result};
use clap::Parser;
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};
use particle_viz::common::{
    canvas::Canvas,
    constants::{
        DEFAULT_POINT_SIZE, DEFAULT_RUN_LENGTH, FIGURE_HEIGHT, FIGURE_WIDTH,
    },
    figure::{render_figure, FigureOptions},
    snapshot::Snapshot,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// 表示時の背景色（透過部分）
const BACKGROUND: u32 = 0x202020;

#[derive(Parser, Debug)]
#[command(name = "particle-plot")]
#[command(version, about = "粒子スナップショットを 2x2 の3D散布図として描画する")]
struct Cli {
    /// 入力 CSV ファイル
    input: PathBuf,

    /// 出力 PNG ファイル
    #[arg(short, long, default_value = "particle_2x2_force_mag.png")]
    output: PathBuf,

    /// モートンキー着色のランレングス
    #[arg(long, default_value_t = DEFAULT_RUN_LENGTH)]
    run_length: u64,

    /// 図の幅（ピクセル）
    #[arg(long, default_value_t = FIGURE_WIDTH)]
    width: usize,

    /// 図の高さ（ピクセル）
    #[arg(long, default_value_t = FIGURE_HEIGHT)]
    height: usize,

    /// 点の直径（ピクセル）
    #[arg(long, default_value_t = DEFAULT_POINT_SIZE)]
    point_size: f32,

    /// 保存のみ行いウィンドウを開かない
    #[arg(long)]
    no_show: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let start = Instant::now();
    let snapshot = Snapshot::load(&cli.input)
        .with_context(|| format!("{} を読み込めませんでした", cli.input.display()))?;
    log::info!(
        "{} 粒子を読み込みました: {:.2?}",
        snapshot.len(),
        start.elapsed()
    );

    let options = FigureOptions {
        width: cli.width,
        height: cli.height,
        run_length: cli.run_length,
        point_size: cli.point_size,
    };

    let start = Instant::now();
    let figure = render_figure(&snapshot, &options).context("描画に失敗しました")?;
    log::info!("描画完了: {:.2?}", start.elapsed());

    figure
        .save_png(&cli.output)
        .with_context(|| format!("{} に保存できませんでした", cli.output.display()))?;

    if !cli.no_show {
        show(&figure, &cli.output)?;
    }
    Ok(())
}

/// 図をウィンドウに表示し、閉じられるまで待つ
fn show(figure: &Canvas, output: &Path) -> Result<()> {
    println!("操作方法:");
    println!("  - S キー: 図を連番付きで保存");
    println!("  - Q / Escape キー: 終了");

    let (width, height) = (figure.width(), figure.height());
    let mut window = Window::new(
        "粒子スナップショット",
        width,
        height,
        WindowOptions {
            resize: false,
            scale: Scale::FitScreen,
            ..WindowOptions::default()
        },
    )
    .context("ウィンドウの作成に失敗しました")?;
    window.set_target_fps(30);

    let buffer = figure.to_u32_buffer(BACKGROUND);
    let mut save_counter = 0u32;

    while window.is_open() && !window.is_key_down(Key::Escape) && !window.is_key_down(Key::Q) {
        if window.is_key_pressed(Key::S, KeyRepeat::No) {
            save_counter += 1;
            let path = numbered_path(output, save_counter);
            if let Err(e) = figure.save_png(&path) {
                log::warn!("保存に失敗しました: {e}");
            }
        }

        window
            .update_with_buffer(&buffer, width, height)
            .context("バッファの更新に失敗しました")?;
    }
    Ok(())
}

/// `out.png` → `out_001.png`
fn numbered_path(output: &Path, n: u32) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "particles".to_string());
    output.with_file_name(format!("{}_{:03}.png", stem, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_path() {
        assert_eq!(
            numbered_path(Path::new("out/fig.png"), 7),
            PathBuf::from("out/fig_007.png")
        );
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["particle-plot", "dump.csv"]);
        assert_eq!(cli.input, PathBuf::from("dump.csv"));
        assert_eq!(cli.output, PathBuf::from("particle_2x2_force_mag.png"));
        assert_eq!(cli.run_length, 20);
        assert!(!cli.no_show);
    }
}
