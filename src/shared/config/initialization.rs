use crate::shared::config::{get_environment, get_session_filename, Environment};
use crate::shared::errors::{AppError, AppResult};
use std::fs;
use std::path::PathBuf;
use tauri::{AppHandle, Manager};

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 初回起動かどうか
    pub is_first_run: bool,
    /// アプリケーションデータディレクトリのパス
    pub app_data_dir: PathBuf,
    /// セッションファイルのパス
    pub session_path: PathBuf,
    /// 実行環境
    pub environment: Environment,
}

/// アプリケーションの初期化を実行する
///
/// # 引数
/// * `app_handle` - Tauriアプリケーションハンドル
///
/// # 戻り値
/// 初期化結果、または失敗時はエラー
///
/// # 処理内容
/// 1. アプリケーションデータディレクトリの作成
/// 2. 初回起動の判定
/// 3. セッションファイルパスの決定
/// 4. 環境に応じた設定の適用
pub fn initialize_application(app_handle: &AppHandle) -> AppResult<InitializationResult> {
    // 現在の実行環境を取得
    let environment = get_environment();

    // アプリケーションデータディレクトリを取得・作成
    let app_data_dir = ensure_app_data_directory(app_handle)?;

    // セッションファイルパスを構築
    let session_filename = get_session_filename(environment.clone());
    let session_path = app_data_dir.join(session_filename);

    // 初回起動かどうかを判定（セッションファイルの存在で判定）
    let is_first_run = !session_path.exists();

    // 初回起動の場合、初期化ログを出力
    if is_first_run {
        log_first_run_initialization(&environment, &app_data_dir, &session_path);
    }

    Ok(InitializationResult {
        is_first_run,
        app_data_dir,
        session_path,
        environment,
    })
}

/// アプリケーションデータディレクトリを確実に作成する
///
/// # 引数
/// * `app_handle` - Tauriアプリケーションハンドル
///
/// # 戻り値
/// アプリケーションデータディレクトリのパス、または失敗時はエラー
fn ensure_app_data_directory(app_handle: &AppHandle) -> AppResult<PathBuf> {
    let app_data_dir = app_handle.path().app_data_dir().map_err(|e| {
        AppError::configuration(format!("アプリデータディレクトリの取得に失敗: {e}"))
    })?;

    // ディレクトリが存在しない場合は作成
    if !app_data_dir.exists() {
        fs::create_dir_all(&app_data_dir).map_err(|e| {
            AppError::configuration(format!("アプリデータディレクトリの作成に失敗: {e}"))
        })?;

        log::info!("アプリケーションデータディレクトリを作成しました: {app_data_dir:?}");
    }

    Ok(app_data_dir)
}

/// 初回起動時の初期化ログを出力する
///
/// # 引数
/// * `environment` - 実行環境
/// * `app_data_dir` - アプリケーションデータディレクトリ
/// * `session_path` - セッションファイルパス
fn log_first_run_initialization(
    environment: &Environment,
    app_data_dir: &PathBuf,
    session_path: &PathBuf,
) {
    log::info!("=== アプリケーション初回起動 ===");
    log::info!("実行環境: {environment:?}");
    log::info!("アプリデータディレクトリ: {app_data_dir:?}");
    log::info!("セッションファイル: {session_path:?}");
    log::info!("初期化を開始します...");
}
