use serde::{Deserialize, Serialize};

/// アクセストークンとリフレッシュトークンのペア
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// アクセストークン（短命）
    pub access: String,
    /// リフレッシュトークン（長命）
    pub refresh: String,
}

/// ユーザープロフィール（最小限の情報のみ保持）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// ユーザーID
    pub id: i64,
    /// ユーザー名
    pub username: String,
    /// メールアドレス
    pub email: String,
}

/// 永続化されるセッション情報
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// トークンペア
    pub tokens: TokenPair,
    /// ユーザープロフィール
    pub user: UserProfile,
    /// サインイン日時（RFC3339形式）
    pub signed_in_at: String,
}

/// 認証状態を表す構造体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthState {
    /// ユーザー情報
    pub user: Option<UserProfile>,
    /// 認証済みフラグ
    pub is_authenticated: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
        }
    }
}

/// サインイン認証情報
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInCredentials {
    /// ユーザー名
    pub username: String,
    /// パスワード
    pub password: String,
}

/// ユーザー登録フォーム
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationForm {
    /// ユーザー名
    pub username: String,
    /// メールアドレス
    pub email: String,
    /// パスワード
    pub password: String,
}

/// トークン発行エンドポイントのレスポンス
#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    /// アクセストークン
    pub access: String,
    /// リフレッシュトークン
    pub refresh: String,
    /// ユーザー情報
    pub user: UserProfile,
}

/// トークンリフレッシュエンドポイントのレスポンス
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    /// 新しいアクセストークン
    pub access: String,
}

/// 認証エラーの種類
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// ネットワークエラー
    #[error("ネットワークエラー: {0}")]
    NetworkError(String),

    /// 認証情報が不正
    #[error("認証に失敗しました: {0}")]
    InvalidCredentials(String),

    /// サーバーレスポンスが不正
    #[error("サーバーレスポンスが不正です: {0}")]
    InvalidResponse(String),

    /// セッションの有効期限切れ（リフレッシュ不能）
    #[error("セッションの有効期限が切れました。再度ログインしてください")]
    SessionExpired,

    /// ユーザー登録エラー
    #[error("ユーザー登録に失敗しました: {0}")]
    RegistrationError(String),

    /// ストレージエラー
    #[error("認証情報の保存に失敗しました: {0}")]
    StorageError(String),
}

/// AuthErrorからStringへの変換（Tauriコマンドでの使用のため）
impl From<AuthError> for String {
    fn from(error: AuthError) -> Self {
        error.to_string()
    }
}
