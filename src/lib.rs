//! 粒子シミュレーション出力の可視化ライブラリ
//!
//! スナップショット（CSV / HDF5）を読み込み、空間ソートキーやスカラー場で
//! 色付けした3D散布図を描画する。

pub mod common;
