/// 設定モジュール
///
/// 環境変数・実行環境の判定・アプリケーション初期化を提供します。
pub mod environment;
pub mod initialization;

pub use environment::{
    get_environment, initialize_logging_system, load_environment_variables, ApiConfig,
    Environment, EnvironmentConfig,
};
pub use initialization::{initialize_application, InitializationResult};

/// 環境に応じたセッションファイル名を取得する
///
/// # 引数
/// * `environment` - 実行環境
///
/// # 戻り値
/// セッションファイル名
///
/// 開発環境と本番環境でファイルを分けることで、開発中のログイン状態が
/// 本番データと混ざらないようにする。
pub fn get_session_filename(environment: Environment) -> &'static str {
    match environment {
        Environment::Development => "session.dev.json",
        Environment::Production => "session.json",
    }
}
