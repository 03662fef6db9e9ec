/// カメラキャプチャ機能モジュール
///
/// 領収書撮影のセッション管理とキャプチャ画像の変換を提供します。
pub mod commands;
pub mod models;
pub mod service;

pub use models::*;
pub use service::{CameraManager, CameraSession};
