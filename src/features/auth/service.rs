/// 認証サービス
///
/// トークン発行エンドポイントに対するサインイン・サインアップ・サインアウトを
/// 提供します。取得したトークンペアとユーザープロフィールはセッションストアに
/// 永続化され、以降のAPIリクエストで使用されます。
use crate::features::auth::models::{
    AuthError, AuthState, RegistrationForm, SignInCredentials, SignInResponse, StoredSession,
    TokenPair,
};
use crate::features::auth::session_store::SessionStore;
use crate::shared::config::environment::ApiConfig;
use std::sync::Arc;

/// 認証サービス
#[derive(Clone)]
pub struct AuthService {
    /// APIサーバーのベースURL
    api_base_url: String,
    /// HTTPクライアント
    http_client: reqwest::Client,
    /// セッションストア
    session: Arc<SessionStore>,
}

impl AuthService {
    /// 新しいAuthServiceを作成する
    ///
    /// # 引数
    /// * `config` - API設定
    /// * `session` - セッションストア
    ///
    /// # 戻り値
    /// AuthServiceインスタンス
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self, AuthError> {
        // HTTPクライアントを作成
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AuthError::NetworkError(format!("HTTPクライアント作成エラー: {e}")))?;

        log::info!(
            "AuthServiceを初期化しました: api_base_url={}",
            config.base_url
        );

        Ok(Self {
            api_base_url: config.base_url.clone(),
            http_client,
            session,
        })
    }

    /// サインインする
    ///
    /// # 引数
    /// * `credentials` - ユーザー名とパスワード
    ///
    /// # 戻り値
    /// 認証状態、または失敗時はエラー
    ///
    /// # 処理内容
    /// 1. トークン発行エンドポイントに認証情報を送信
    /// 2. access/refresh/userのすべてを含むレスポンスを検証
    /// 3. セッションストアに永続化
    pub async fn sign_in(&self, credentials: SignInCredentials) -> Result<AuthState, AuthError> {
        let token_url = format!("{}/api/token/", self.api_base_url);

        log::debug!("トークン発行リクエストを送信: url={token_url}");

        let response = self
            .http_client
            .post(&token_url)
            .json(&credentials)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("トークン発行リクエストエラー: {e}")))?;

        if !response.status().is_success() {
            let detail = extract_error_detail(response).await;
            return Err(AuthError::InvalidCredentials(detail));
        }

        // access/refresh/userのいずれかが欠けたレスポンスは解析エラーとして拒否される
        let sign_in_response: SignInResponse = response.json().await.map_err(|e| {
            AuthError::InvalidResponse(format!("トークン発行レスポンスの解析エラー: {e}"))
        })?;

        let session = StoredSession {
            tokens: TokenPair {
                access: sign_in_response.access,
                refresh: sign_in_response.refresh,
            },
            user: sign_in_response.user,
            signed_in_at: chrono::Utc::now().to_rfc3339(),
        };

        let username = session.user.username.clone();

        self.session
            .store_session(session)
            .map_err(|e| AuthError::StorageError(e.details()))?;

        log::info!("サインインが完了しました: username={username}");

        Ok(self.auth_state())
    }

    /// ユーザー登録する
    ///
    /// # 引数
    /// * `form` - 登録フォーム
    ///
    /// # 戻り値
    /// 処理結果（登録のみでサインインは行わない）
    pub async fn sign_up(&self, form: RegistrationForm) -> Result<(), AuthError> {
        let register_url = format!("{}/api/register/", self.api_base_url);

        log::debug!("ユーザー登録リクエストを送信: url={register_url}");

        let response = self
            .http_client
            .post(&register_url)
            .json(&form)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("ユーザー登録リクエストエラー: {e}")))?;

        if !response.status().is_success() {
            let detail = extract_error_detail(response).await;
            return Err(AuthError::RegistrationError(detail));
        }

        log::info!("ユーザー登録が完了しました: username={}", form.username);
        Ok(())
    }

    /// サインアウトする
    ///
    /// # 戻り値
    /// 処理結果
    ///
    /// # 処理内容
    /// 1. リフレッシュトークンをブラックリスト化するようサーバーに依頼（ベストエフォート）
    /// 2. 保存されている認証情報を必ず破棄する
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(refresh) = self.session.refresh_token() {
            let logout_url = format!("{}/api/logout/", self.api_base_url);

            let result = self
                .http_client
                .post(&logout_url)
                .json(&serde_json::json!({ "refresh_token": refresh }))
                .send()
                .await;

            // ブラックリスト化の失敗はサインアウトを妨げない
            if let Err(e) = result {
                log::warn!("ログアウトリクエストに失敗しました: {e}");
            }
        }

        self.session
            .clear()
            .map_err(|e| AuthError::StorageError(e.details()))?;

        log::info!("サインアウトが完了しました");
        Ok(())
    }

    /// 現在の認証状態を取得する
    ///
    /// # 戻り値
    /// 認証状態（ルートガードでの判定に使用）
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            user: self.session.current_user(),
            is_authenticated: self.session.is_authenticated(),
        }
    }

    /// 認証済みかどうかを判定する
    ///
    /// # 戻り値
    /// アクセストークンが保存されている場合はtrue
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}

/// エラーレスポンスから表示用メッセージを取り出す
///
/// Django REST Framework形式の `{"detail": "..."}` を優先し、
/// 解析できない場合は生のレスポンス本文を返す
async fn extract_error_detail(response: reqwest::Response) -> String {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "不明なエラー".to_string());

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }

    if body.is_empty() {
        "不明なエラー".to_string()
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::models::UserProfile;
    use crate::features::auth::session_store::MemoryStorage;

    fn service_with_session(session: Arc<SessionStore>) -> AuthService {
        let config = ApiConfig {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 5,
        };
        AuthService::new(&config, session).unwrap()
    }

    #[test]
    fn test_auth_state_unauthenticated() {
        // セッションがない場合の認証状態
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        let service = service_with_session(session);

        let state = service.auth_state();
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(!service.is_authenticated());
    }

    #[test]
    fn test_auth_state_authenticated() {
        // セッションがある場合の認証状態
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        session
            .store_session(StoredSession {
                tokens: TokenPair {
                    access: "a".to_string(),
                    refresh: "r".to_string(),
                },
                user: UserProfile {
                    id: 1,
                    username: "taro".to_string(),
                    email: "taro@example.com".to_string(),
                },
                signed_in_at: chrono::Utc::now().to_rfc3339(),
            })
            .unwrap();

        let service = service_with_session(session);
        let state = service.auth_state();
        assert!(state.is_authenticated);
        assert_eq!(state.user.unwrap().username, "taro");
    }
}
