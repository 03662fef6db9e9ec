/// セッションストアモジュール
///
/// トークンペアとユーザープロフィールを保持する明示的なセッションオブジェクト。
/// 永続化バックエンドは注入可能で、本番ではJSONファイル、テストではメモリを使用します。
/// トークンのリフレッシュはこのストアを経由することで、同時多発の401に対しても
/// リフレッシュ呼び出しが一度しか飛ばないことを保証します（シングルフライト）。
use crate::features::auth::models::{AuthError, StoredSession, UserProfile};
use crate::shared::errors::{AppError, AppResult};
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

/// 認証情報の永続化バックエンド
pub trait CredentialStorage: Send + Sync {
    /// 保存されているセッションを読み込む
    fn load(&self) -> AppResult<Option<StoredSession>>;

    /// セッションを保存する
    fn save(&self, session: &StoredSession) -> AppResult<()>;

    /// 保存されているセッションを削除する
    fn clear(&self) -> AppResult<()>;
}

/// JSONファイルによる永続化バックエンド（本番用）
pub struct JsonFileStorage {
    /// セッションファイルのパス
    path: PathBuf,
}

impl JsonFileStorage {
    /// 新しいJsonFileStorageを作成する
    ///
    /// # 引数
    /// * `path` - セッションファイルのパス
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialStorage for JsonFileStorage {
    fn load(&self) -> AppResult<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<StoredSession>(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // 破損したセッションファイルは未サインイン扱いにする
                log::warn!("セッションファイルの解析に失敗しました: {e}");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &StoredSession) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, contents)?;
        log::debug!("セッションを保存しました: {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            log::info!("セッションファイルを削除しました: {:?}", self.path);
        }
        Ok(())
    }
}

/// メモリ上の永続化バックエンド（テスト用）
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<Option<StoredSession>>,
}

impl MemoryStorage {
    /// 新しいMemoryStorageを作成する
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStorage for MemoryStorage {
    fn load(&self) -> AppResult<Option<StoredSession>> {
        Ok(self.inner.lock().expect("MemoryStorageのロック取得に失敗").clone())
    }

    fn save(&self, session: &StoredSession) -> AppResult<()> {
        *self.inner.lock().expect("MemoryStorageのロック取得に失敗") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *self.inner.lock().expect("MemoryStorageのロック取得に失敗") = None;
        Ok(())
    }
}

/// セッションストア
///
/// 認証情報の唯一の書き込み窓口。読み取りはメモリキャッシュから行い、
/// 書き込みはキャッシュと永続化バックエンドの両方に反映します。
pub struct SessionStore {
    /// 永続化バックエンド
    storage: Arc<dyn CredentialStorage>,
    /// メモリキャッシュ
    cached: RwLock<Option<StoredSession>>,
    /// リフレッシュのシングルフライトガード
    refresh_guard: tokio::sync::Mutex<()>,
}

impl SessionStore {
    /// 新しいSessionStoreを作成する
    ///
    /// # 引数
    /// * `storage` - 永続化バックエンド
    ///
    /// # 戻り値
    /// 保存済みセッションを読み込んだ状態のSessionStore
    pub fn new(storage: Arc<dyn CredentialStorage>) -> Self {
        let initial = match storage.load() {
            Ok(session) => session,
            Err(e) => {
                log::warn!("セッションの読み込みに失敗しました: {e}");
                None
            }
        };

        if initial.is_some() {
            log::info!("保存済みセッションを復元しました");
        }

        Self {
            storage,
            cached: RwLock::new(initial),
            refresh_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// 保存されているアクセストークンを取得する
    ///
    /// # 戻り値
    /// アクセストークン（存在しない場合はNone）
    pub fn access_token(&self) -> Option<String> {
        self.cached
            .read()
            .expect("セッションキャッシュのロック取得に失敗")
            .as_ref()
            .map(|s| s.tokens.access.clone())
    }

    /// 保存されているリフレッシュトークンを取得する
    ///
    /// # 戻り値
    /// リフレッシュトークン（存在しない場合はNone）
    pub fn refresh_token(&self) -> Option<String> {
        self.cached
            .read()
            .expect("セッションキャッシュのロック取得に失敗")
            .as_ref()
            .map(|s| s.tokens.refresh.clone())
    }

    /// 保存されているユーザープロフィールを取得する
    ///
    /// # 戻り値
    /// ユーザープロフィール（存在しない場合はNone）
    pub fn current_user(&self) -> Option<UserProfile> {
        self.cached
            .read()
            .expect("セッションキャッシュのロック取得に失敗")
            .as_ref()
            .map(|s| s.user.clone())
    }

    /// 認証済みかどうかを判定する
    ///
    /// # 戻り値
    /// アクセストークンが保存されている場合はtrue
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// セッションを保存する
    ///
    /// # 引数
    /// * `session` - 保存するセッション
    pub fn store_session(&self, session: StoredSession) -> AppResult<()> {
        self.storage.save(&session)?;
        *self
            .cached
            .write()
            .expect("セッションキャッシュのロック取得に失敗") = Some(session);
        Ok(())
    }

    /// アクセストークンのみを更新する（リフレッシュ成功時）
    ///
    /// # 引数
    /// * `access` - 新しいアクセストークン
    pub fn update_access_token(&self, access: &str) -> AppResult<()> {
        let mut guard = self
            .cached
            .write()
            .expect("セッションキャッシュのロック取得に失敗");

        let session = guard
            .as_mut()
            .ok_or_else(|| AppError::authentication("更新対象のセッションがありません"))?;

        session.tokens.access = access.to_string();
        self.storage.save(session)?;
        Ok(())
    }

    /// すべての認証情報を破棄する
    pub fn clear(&self) -> AppResult<()> {
        self.storage.clear()?;
        *self
            .cached
            .write()
            .expect("セッションキャッシュのロック取得に失敗") = None;
        log::info!("認証情報を破棄しました");
        Ok(())
    }

    /// アクセストークンをリフレッシュする（シングルフライト）
    ///
    /// # 引数
    /// * `exchange` - リフレッシュトークンを新しいアクセストークンに交換する処理
    ///
    /// # 戻り値
    /// 新しいアクセストークン、または失敗時はエラー
    ///
    /// # 動作
    /// - 同時に複数のタスクが呼び出した場合、交換処理は一度だけ実行され、
    ///   後続のタスクは先行タスクが取得したトークンをそのまま受け取る
    /// - 交換処理が失敗した場合（リフレッシュトークンも無効）、
    ///   保存されている認証情報はすべて破棄される
    pub async fn refresh_access_token<F, Fut>(&self, exchange: F) -> Result<String, AuthError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<String, AuthError>>,
    {
        // ガード取得前のアクセストークンを記録
        let before = self.access_token();

        let _guard = self.refresh_guard.lock().await;

        // 先行タスクがすでにトークンを更新していればそれを返す
        let current = self.access_token();
        if current != before {
            if let Some(token) = current {
                log::debug!("先行タスクがトークンを更新済みのためリフレッシュをスキップします");
                return Ok(token);
            }
            // 先行タスクがリフレッシュに失敗して破棄済み
            return Err(AuthError::SessionExpired);
        }

        let refresh = match self.refresh_token() {
            Some(token) => token,
            None => {
                if let Err(e) = self.clear() {
                    log::warn!("認証情報の破棄に失敗しました: {e}");
                }
                return Err(AuthError::SessionExpired);
            }
        };

        match exchange(refresh).await {
            Ok(access) => {
                self.update_access_token(&access)
                    .map_err(|e| AuthError::StorageError(e.details()))?;
                log::info!("アクセストークンをリフレッシュしました");
                Ok(access)
            }
            Err(e) => {
                // リフレッシュトークンも無効: 認証情報をすべて破棄する
                log::warn!("トークンリフレッシュに失敗しました: {e}");
                if let Err(clear_err) = self.clear() {
                    log::warn!("認証情報の破棄に失敗しました: {clear_err}");
                }
                Err(e)
            }
        }
    }
}
