use crate::features::auth::models::{AuthError, RefreshResponse};
use crate::features::auth::session_store::SessionStore;
/// 認証付きAPIクライアント
///
/// APIサーバーとの通信を行う汎用的なクライアント。
/// 保存されているアクセストークンをすべてのリクエストに付与し、
/// 401受信時は一度だけトークンをリフレッシュして再送します。
use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info, warn};
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tauri::Emitter;

/// APIクライアント設定
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ApiClientConfig {
    /// 環境設定からAPIクライアント設定を作成
    pub fn from_env() -> Self {
        let api_config = ApiConfig::from_env();
        Self {
            base_url: api_config.base_url,
            timeout_seconds: api_config.timeout_seconds,
        }
    }
}

/// APIサーバーからのエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// マルチパートリクエストで送信するファイル
///
/// `reqwest::multipart::Form` は再送時にクローンできないため、
/// フォームはこの構造体から毎回組み立て直す。
#[derive(Debug, Clone)]
pub struct FilePart {
    /// フォームフィールド名
    pub name: String,
    /// ファイル名
    pub filename: String,
    /// MIMEタイプ
    pub content_type: String,
    /// ファイルデータ
    pub data: Vec<u8>,
}

/// 認証付きAPIクライアント
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
    session: Arc<SessionStore>,
    app_handle: Option<tauri::AppHandle>,
}

impl ApiClient {
    /// 新しいAPIクライアントを作成
    ///
    /// # 引数
    /// * `session` - セッションストア
    pub fn new(session: Arc<SessionStore>) -> Result<Self, AppError> {
        Self::new_with_config(ApiClientConfig::from_env(), session)
    }

    /// 設定を指定してAPIクライアントを作成
    ///
    /// # 引数
    /// * `config` - APIクライアント設定
    /// * `session` - セッションストア
    pub fn new_with_config(
        config: ApiClientConfig,
        session: Arc<SessionStore>,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self {
            client,
            config,
            session,
            app_handle: None,
        })
    }

    /// セッション失効イベントの通知先となるアプリハンドルを設定する
    pub fn with_app_handle(mut self, app_handle: tauri::AppHandle) -> Self {
        self.app_handle = Some(app_handle);
        self
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let response = self
            .dispatch(|token| Ok(apply_auth(self.client.get(&url), token)), "GET", endpoint)
            .await?;

        self.decode_response(response, "GET", endpoint).await
    }

    /// POSTリクエストを送信
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("POSTリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let response = self
            .dispatch(
                |token| Ok(apply_auth(self.client.post(&url).json(body), token)),
                "POST",
                endpoint,
            )
            .await?;

        self.decode_response(response, "POST", endpoint).await
    }

    /// PUTリクエストを送信
    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("PUTリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let response = self
            .dispatch(
                |token| Ok(apply_auth(self.client.put(&url).json(body), token)),
                "PUT",
                endpoint,
            )
            .await?;

        self.decode_response(response, "PUT", endpoint).await
    }

    /// PATCHリクエストを送信
    pub async fn patch<B, T>(&self, endpoint: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("PATCHリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let response = self
            .dispatch(
                |token| Ok(apply_auth(self.client.patch(&url).json(body), token)),
                "PATCH",
                endpoint,
            )
            .await?;

        self.decode_response(response, "PATCH", endpoint).await
    }

    /// DELETEリクエストを送信
    ///
    /// DELETEリクエストは通常レスポンスボディがないため、成功ステータスのみチェック
    pub async fn delete(&self, endpoint: &str) -> Result<(), AppError> {
        let url = format!("{}{endpoint}", self.config.base_url);
        info!("DELETEリクエスト送信: endpoint={endpoint}, url={url}");

        let response = self
            .dispatch(
                |token| Ok(apply_auth(self.client.delete(&url), token)),
                "DELETE",
                endpoint,
            )
            .await?;

        if response.status().is_success() {
            info!("DELETEリクエスト成功: endpoint={endpoint}");
            return Ok(());
        }

        Err(self.error_from_response(response).await)
    }

    /// マルチパートPOSTリクエストを送信
    ///
    /// # 引数
    /// * `endpoint` - エンドポイント
    /// * `fields` - テキストフィールド
    /// * `files` - ファイルパート
    pub async fn post_multipart<T>(
        &self,
        endpoint: &str,
        fields: &[(String, String)],
        files: &[FilePart],
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        info!(
            "マルチパートPOSTリクエスト送信: endpoint={endpoint}, files={}",
            files.len()
        );

        let url = format!("{}{endpoint}", self.config.base_url);
        let response = self
            .dispatch(
                |token| {
                    let form = build_multipart_form(fields, files)?;
                    Ok(apply_auth(self.client.post(&url).multipart(form), token))
                },
                "POST",
                endpoint,
            )
            .await?;

        self.decode_response(response, "POST", endpoint).await
    }

    /// マルチパートPATCHリクエストを送信
    ///
    /// # 引数
    /// * `endpoint` - エンドポイント
    /// * `fields` - テキストフィールド
    /// * `files` - ファイルパート
    pub async fn patch_multipart<T>(
        &self,
        endpoint: &str,
        fields: &[(String, String)],
        files: &[FilePart],
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        info!(
            "マルチパートPATCHリクエスト送信: endpoint={endpoint}, files={}",
            files.len()
        );

        let url = format!("{}{endpoint}", self.config.base_url);
        let response = self
            .dispatch(
                |token| {
                    let form = build_multipart_form(fields, files)?;
                    Ok(apply_auth(self.client.patch(&url).multipart(form), token))
                },
                "PATCH",
                endpoint,
            )
            .await?;

        self.decode_response(response, "PATCH", endpoint).await
    }

    /// リクエストを送信し、401の場合は一度だけリフレッシュして再送する
    ///
    /// # 引数
    /// * `build` - トークンを受け取ってリクエストを組み立てる関数
    /// * `method` - HTTPメソッド名（ログ用）
    /// * `endpoint` - エンドポイント（ログ用）
    ///
    /// # 戻り値
    /// 最終的なレスポンス（再送後の401はそのまま返され、再々送はしない）
    ///
    /// # 状態遷移
    /// fresh -> (401受信) -> retried の一方向のみ。retried状態のリクエストが
    /// 再び401を受けても再送しないため、リトライループは発生しない。
    async fn dispatch<F>(&self, build: F, method: &str, endpoint: &str) -> AppResult<Response>
    where
        F: Fn(Option<String>) -> AppResult<RequestBuilder>,
    {
        // fresh状態のリクエストを送信
        let request = build(self.session.access_token())?;
        let response = request.send().await.map_err(|e| {
            AppError::ExternalService(format!("APIサーバーへの接続に失敗しました: {e}"))
        })?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // 401受信: トークンをリフレッシュして一度だけ再送する
        warn!("認証エラーを受信しました。トークンをリフレッシュして再送します: {method} {endpoint}");
        let new_token = self.refresh_access_token().await?;

        let retried_request = build(Some(new_token))?;
        let retried_response = retried_request.send().await.map_err(|e| {
            AppError::ExternalService(format!("APIサーバーへの接続に失敗しました: {e}"))
        })?;

        // retried状態のレスポンスはそのまま返す（再度の401でも再送しない）
        Ok(retried_response)
    }

    /// アクセストークンをリフレッシュする
    ///
    /// セッションストアのシングルフライトガードを経由するため、
    /// 同時多発の401でもリフレッシュ呼び出しは一度だけ実行される。
    ///
    /// # 戻り値
    /// 新しいアクセストークン、または失敗時はエラー
    ///
    /// リフレッシュ失敗時は認証情報が破棄され、`session-expired`イベントで
    /// フロントエンドにサインイン画面への遷移を指示する。
    async fn refresh_access_token(&self) -> AppResult<String> {
        let client = self.client.clone();
        let refresh_url = format!("{}/api/token/refresh/", self.config.base_url);

        let result = self
            .session
            .refresh_access_token(move |refresh| async move {
                debug!("トークンリフレッシュリクエストを送信します");

                let response = client
                    .post(&refresh_url)
                    .json(&serde_json::json!({ "refresh": refresh }))
                    .send()
                    .await
                    .map_err(|e| {
                        AuthError::NetworkError(format!("トークンリフレッシュリクエストエラー: {e}"))
                    })?;

                if !response.status().is_success() {
                    return Err(AuthError::SessionExpired);
                }

                let body: RefreshResponse = response.json().await.map_err(|e| {
                    AuthError::InvalidResponse(format!("リフレッシュレスポンスの解析エラー: {e}"))
                })?;

                Ok(body.access)
            })
            .await;

        match result {
            Ok(access) => Ok(access),
            Err(e) => {
                self.notify_session_expired();
                Err(AppError::Authentication(format!(
                    "セッションの更新に失敗しました: {e}"
                )))
            }
        }
    }

    /// セッション失効をフロントエンドに通知する
    fn notify_session_expired(&self) {
        if let Some(handle) = &self.app_handle {
            if let Err(e) = handle.emit("session-expired", ()) {
                warn!("セッション失効イベントの送信に失敗しました: {e}");
            }
        }
    }

    /// レスポンスを解析して結果を返す
    async fn decode_response<T>(
        &self,
        response: Response,
        method: &str,
        endpoint: &str,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        if response.status().is_success() {
            let result: T = response
                .json()
                .await
                .map_err(|e| AppError::ExternalService(format!("レスポンス解析エラー: {e}")))?;

            info!("{method}リクエスト成功: endpoint={endpoint}");
            return Ok(result);
        }

        Err(self.error_from_response(response).await)
    }

    /// エラーレスポンスをAppErrorに変換する
    ///
    /// 401は認証エラー、400はバリデーションエラー（サーバー側のフィールドエラーを
    /// そのままユーザーに提示する）、それ以外は外部サービスエラーとして扱う。
    async fn error_from_response(&self, response: Response) -> AppError {
        let status = response.status();
        let error_response = self.handle_error_response(response).await;

        match status {
            StatusCode::UNAUTHORIZED => {
                AppError::Authentication("認証に失敗しました".to_string())
            }
            StatusCode::BAD_REQUEST => AppError::Validation(error_response.error.message),
            _ => AppError::ExternalService(format!(
                "APIサーバーエラー: {} - {}",
                error_response.error.code, error_response.error.message
            )),
        }
    }

    /// エラーレスポンスを処理し、詳細なエラー情報を提供
    async fn handle_error_response(&self, response: Response) -> ErrorResponse {
        let status_code = response.status().as_u16();

        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "レスポンス読み取り失敗".to_string());

        // JSONエラーレスポンスの解析を試行
        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
            // APIサーバーからの構造化エラーレスポンス
            debug!(
                "APIサーバーから構造化エラーレスポンスを受信: code={}, message={}",
                error_response.error.code, error_response.error.message
            );
            return error_response;
        }

        // Django REST Framework形式の {"detail": "..."} も受け付ける
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&response_text) {
            if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
                return ErrorResponse {
                    error: ErrorDetail {
                        code: format!("HTTP_{status_code}"),
                        message: detail.to_string(),
                        details: Some(value.clone()),
                    },
                };
            }
        }

        // JSONでない場合は汎用エラーレスポンスを作成
        let (error_code, user_message) = fallback_error_for_status(status_code);

        warn!("APIサーバーから非構造化エラーレスポンス: status={status_code}, body={response_text}");

        ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message: user_message.to_string(),
                details: Some(serde_json::json!({
                    "http_status": status_code,
                    "raw_response": response_text,
                })),
            },
        }
    }
}

/// 認証トークンをリクエストに付与する
///
/// トークンがない場合は未認証のままリクエストを送信する（この層ではエラーにしない）
fn apply_auth(request: RequestBuilder, token: Option<String>) -> RequestBuilder {
    match token {
        Some(token) => request.header("Authorization", format!("Bearer {token}")),
        None => request,
    }
}

/// マルチパートフォームを組み立てる
///
/// 再送時にも呼び出されるため、所有データから毎回新しいフォームを構築する
fn build_multipart_form(
    fields: &[(String, String)],
    files: &[FilePart],
) -> AppResult<multipart::Form> {
    let mut form = multipart::Form::new();

    for (name, value) in fields {
        form = form.text(name.clone(), value.clone());
    }

    for file in files {
        let part = multipart::Part::bytes(file.data.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.content_type)
            .map_err(|e| AppError::Validation(format!("MIMEタイプ設定エラー: {e}")))?;
        form = form.part(file.name.clone(), part);
    }

    Ok(form)
}

/// ステータスコードに応じた汎用エラーコードとメッセージを返す
fn fallback_error_for_status(status_code: u16) -> (&'static str, &'static str) {
    match status_code {
        400 => ("BAD_REQUEST", "リクエストの形式が正しくありません"),
        401 => (
            "UNAUTHORIZED",
            "認証に失敗しました。再度ログインしてください",
        ),
        403 => ("FORBIDDEN", "この操作を実行する権限がありません"),
        404 => ("NOT_FOUND", "指定されたリソースが見つかりません"),
        413 => ("PAYLOAD_TOO_LARGE", "データサイズが制限を超えています"),
        415 => (
            "UNSUPPORTED_MEDIA_TYPE",
            "サポートされていないデータ形式です",
        ),
        429 => (
            "TOO_MANY_REQUESTS",
            "リクエストが多すぎます。しばらく待ってから再試行してください",
        ),
        500 => ("INTERNAL_SERVER_ERROR", "サーバー内部エラーが発生しました"),
        502 => ("BAD_GATEWAY", "APIサーバーとの通信でエラーが発生しました"),
        503 => ("SERVICE_UNAVAILABLE", "APIサーバーが一時的に利用できません"),
        504 => (
            "GATEWAY_TIMEOUT",
            "APIサーバーからの応答がタイムアウトしました",
        ),
        _ => ("UNKNOWN_ERROR", "不明なエラーが発生しました"),
    }
}
