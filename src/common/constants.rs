//! 共通定数

/// ハッシュ着色の乗数（赤・緑・青チャネル用、いずれも奇数）
pub const HASH_MUL_R: u32 = 0x85eb_ca6b;
pub const HASH_MUL_G: u32 = 0xc2b2_ae35;
pub const HASH_MUL_B: u32 = 0x27d4_eb2d;

/// パレット着色の既定ランレングス
pub const DEFAULT_RUN_LENGTH: u64 = 20;

/// パレット着色の合成比率（オフセット色 : 直接色）
pub const OFFSET_WEIGHT: f64 = 0.3;
pub const DIRECT_WEIGHT: f64 = 0.7;

/// 監視モードのキー着色で使うビット数（1軸あたり）
pub const DEFAULT_KEY_BITS: u32 = 4;

/// バッチ描画（2x2 図）の既定サイズ
pub const FIGURE_WIDTH: usize = 1600;
pub const FIGURE_HEIGHT: usize = 1280;

/// 監視ビューアのウィンドウサイズ
pub const WINDOW_WIDTH: usize = 960;
pub const WINDOW_HEIGHT: usize = 720;

/// カラーバーの設定
pub const COLORBAR_WIDTH: usize = 90;
pub const COLORBAR_MARGIN: usize = 14;
pub const COLORBAR_BAR_WIDTH: usize = 16;
pub const COLORBAR_TICKS: usize = 5;

/// 点の既定サイズ（直径ピクセル）
pub const DEFAULT_POINT_SIZE: f32 = 5.0;

/// カメラ初期値
pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_AZIMUTH_DEG: f32 = 30.0;
pub const CAMERA_ELEVATION_DEG: f32 = 30.0;
pub const CAMERA_DISTANCE: f32 = 20.0;

/// 矢印キー1フレームあたりの回転角（度）
pub const ORBIT_STEP_DEG: f32 = 2.0;

/// ズーム倍率
pub const ZOOM_FACTOR_OUT: f32 = 1.05;
pub const ZOOM_FACTOR_IN: f32 = 0.95;

/// 監視モードの既定ポーリング間隔（秒）
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 0.5;

/// 文字色・軸色
pub const TEXT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const AXIS_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
