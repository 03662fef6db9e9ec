/// アクティビティログ機能モジュール
///
/// 経費の作成・更新・削除の履歴閲覧を提供します（読み取り専用）。
pub mod api_commands;
pub mod models;

pub use api_commands::*;
pub use models::*;
