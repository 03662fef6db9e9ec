// 機能モジュール構造
pub mod features;
pub mod shared;

use features::auth::service::AuthService;
use features::auth::session_store::{JsonFileStorage, SessionStore};
use features::camera::service::CameraManager;
use features::{
    activity::api_commands as activity_commands, auth::commands as auth_commands,
    camera::commands as camera_commands, categories::api_commands as category_commands,
    expenses::api_commands as expense_commands, export::commands as export_commands,
};
use log::info;
use shared::api_client::ApiClient;
use shared::config::environment::{
    initialize_logging_system, load_environment_variables, ApiConfig,
};
use shared::config::initialization::initialize_application;
use std::sync::Arc;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_store::Builder::default().build())
        .setup(|app| {
            eprintln!("=== アプリケーション初期化開始 ===");

            // 環境に応じた.envファイルを読み込み（ログシステム初期化前に実行）
            eprintln!("環境変数を読み込み中...");
            load_environment_variables();
            eprintln!("環境変数の読み込み完了");

            // ログシステムを初期化（.envファイル読み込み後）
            eprintln!("ログシステムを初期化中...");
            initialize_logging_system();
            eprintln!("ログシステムの初期化完了");

            info!("アプリケーション初期化を開始します...");

            // アプリケーションデータディレクトリとセッションファイルパスを準備
            eprintln!("アプリケーションを初期化中...");
            let init_result = match initialize_application(app.handle()) {
                Ok(result) => {
                    eprintln!("アプリケーション初期化完了");
                    result
                }
                Err(e) => {
                    eprintln!("アプリケーション初期化失敗: {e}");
                    return Err(format!("アプリケーション初期化失敗: {e}").into());
                }
            };

            // セッションストアを作成（保存済みセッションを復元）
            eprintln!("セッションストアを初期化中...");
            let storage = Arc::new(JsonFileStorage::new(init_result.session_path.clone()));
            let session = Arc::new(SessionStore::new(storage));
            eprintln!("セッションストアの初期化完了");

            // API設定を読み込み
            let api_config = ApiConfig::from_env();
            if let Err(e) = api_config.validate() {
                eprintln!("API設定の検証に失敗: {e}");
                return Err(format!("API設定の検証に失敗: {e}").into());
            }

            // APIクライアントを作成（セッション失効通知のためアプリハンドルを渡す）
            eprintln!("APIクライアントを初期化中...");
            let api_client = match ApiClient::new(Arc::clone(&session)) {
                Ok(client) => client.with_app_handle(app.handle().clone()),
                Err(e) => {
                    eprintln!("APIクライアント初期化失敗: {e}");
                    return Err(format!("APIクライアント初期化失敗: {e}").into());
                }
            };
            eprintln!("APIクライアントの初期化完了");

            // 認証サービスを初期化
            eprintln!("認証サービスを初期化中...");
            let auth_service = match AuthService::new(&api_config, Arc::clone(&session)) {
                Ok(service) => {
                    eprintln!("認証サービスの初期化完了");
                    service
                }
                Err(e) => {
                    eprintln!("認証サービス初期化失敗: {e}");
                    return Err(format!("認証サービス初期化失敗: {e}").into());
                }
            };

            // 管理状態として登録
            app.manage(session);
            app.manage(api_client);
            app.manage(auth_service);
            app.manage(CameraManager::new());

            eprintln!("=== アプリケーション初期化完了 ===");
            info!("アプリケーション初期化が完了しました");

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // 認証コマンド
            auth_commands::sign_in,
            auth_commands::sign_up,
            auth_commands::sign_out,
            auth_commands::get_auth_state,
            auth_commands::check_authenticated,
            // 経費コマンド
            expense_commands::create_expense,
            expense_commands::get_expenses,
            expense_commands::get_expense_summary,
            expense_commands::update_expense,
            expense_commands::delete_expense,
            expense_commands::remove_expense_receipt,
            // カテゴリーコマンド
            category_commands::get_categories,
            category_commands::create_category,
            category_commands::update_category,
            category_commands::delete_category,
            // アクティビティコマンド
            activity_commands::get_activities,
            // エクスポートコマンド
            export_commands::export_expenses,
            export_commands::suggest_export_filename,
            // カメラコマンド
            camera_commands::open_camera_session,
            camera_commands::camera_stream_started,
            camera_commands::capture_frame,
            camera_commands::retake_capture,
            camera_commands::accept_capture,
            camera_commands::camera_failed,
            camera_commands::get_camera_session_state,
            camera_commands::close_camera_session,
        ])
        .run(tauri::generate_context!())
        .expect("Tauriアプリケーションの実行中にエラーが発生しました");
}
