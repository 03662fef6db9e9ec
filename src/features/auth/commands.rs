use crate::features::auth::models::{AuthState, RegistrationForm, SignInCredentials};
use crate::features::auth::service::AuthService;
use tauri::State;

/// サインインする
///
/// # 引数
/// * `credentials` - ユーザー名とパスワード
/// * `auth_service` - 認証サービス
///
/// # 戻り値
/// 認証状態、または失敗時はエラーメッセージ
#[tauri::command]
pub async fn sign_in(
    credentials: SignInCredentials,
    auth_service: State<'_, AuthService>,
) -> Result<AuthState, String> {
    log::info!("サインインコマンドを実行");

    let state = auth_service.sign_in(credentials).await.map_err(|e| {
        log::error!("サインインエラー: {e}");
        e.to_string()
    })?;

    Ok(state)
}

/// ユーザー登録する
///
/// # 引数
/// * `form` - 登録フォーム
/// * `auth_service` - 認証サービス
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラーメッセージ
#[tauri::command]
pub async fn sign_up(
    form: RegistrationForm,
    auth_service: State<'_, AuthService>,
) -> Result<(), String> {
    log::info!("ユーザー登録コマンドを実行");

    auth_service.sign_up(form).await.map_err(|e| {
        log::error!("ユーザー登録エラー: {e}");
        e.to_string()
    })
}

/// サインアウトする
///
/// # 引数
/// * `auth_service` - 認証サービス
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラーメッセージ
#[tauri::command]
pub async fn sign_out(auth_service: State<'_, AuthService>) -> Result<(), String> {
    log::info!("サインアウトコマンドを実行");

    auth_service.sign_out().await.map_err(|e| {
        log::error!("サインアウトエラー: {e}");
        e.to_string()
    })
}

/// 現在の認証状態を取得する
///
/// # 引数
/// * `auth_service` - 認証サービス
///
/// # 戻り値
/// 認証状態（未認証の場合フロントエンドはサインイン画面へ遷移する）
#[tauri::command]
pub async fn get_auth_state(auth_service: State<'_, AuthService>) -> Result<AuthState, String> {
    Ok(auth_service.auth_state())
}

/// 認証済みかどうかを判定する
///
/// # 引数
/// * `auth_service` - 認証サービス
///
/// # 戻り値
/// 認証済みの場合はtrue
#[tauri::command]
pub async fn check_authenticated(auth_service: State<'_, AuthService>) -> Result<bool, String> {
    Ok(auth_service.is_authenticated())
}
