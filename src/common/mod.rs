//! 共通モジュール

pub mod camera;
pub mod canvas;
pub mod colormap;
pub mod colors;
pub mod constants;
pub mod error;
pub mod figure;
pub mod font;
pub mod poller;
pub mod scatter;
pub mod snapshot;
