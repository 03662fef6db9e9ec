/// カメラキャプチャセッション管理
///
/// 実際のカメラストリームはWebView側（getUserMedia）が保持し、こちらは
/// セッションの状態遷移を管理します。各操作のレスポンスに「停止すべき
/// ストリームID」を含めることで、以下の不変条件を成立させます。
///
/// - 1セッションにつき同時に存在するライブストリームは最大1本
/// - キャプチャ確定・キャンセル・画面破棄のすべての経路でストリームが解放される
use crate::features::camera::models::{
    CameraFailureReason, CameraPhase, CapturedFrame, FacingMode,
};
use crate::features::expenses::models::ReceiptAttachment;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::nanoid::{generate_receipt_filename, generate_session_id};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::collections::HashMap;
use std::sync::Mutex;

/// 1つのカメラキャプチャセッション
#[derive(Debug)]
pub struct CameraSession {
    /// セッションID
    pub id: String,
    /// 現在の状態
    phase: CameraPhase,
}

impl CameraSession {
    /// 新しいセッションを作成する
    pub fn new() -> Self {
        Self {
            id: generate_session_id(),
            phase: CameraPhase::AwaitingStream,
        }
    }

    /// 現在の状態を取得する
    pub fn phase(&self) -> &CameraPhase {
        &self.phase
    }

    /// 現在ライブなストリームIDを取得する
    ///
    /// プレビュー中（Captured）もストリームは背後で維持されているため対象に含む
    pub fn live_stream_id(&self) -> Option<&str> {
        match &self.phase {
            CameraPhase::Streaming { stream_id, .. } => Some(stream_id),
            CameraPhase::Captured { stream_id, .. } => Some(stream_id),
            _ => None,
        }
    }

    /// ストリーム開始を登録する
    ///
    /// # 引数
    /// * `stream_id` - WebView側で取得したストリームのID
    /// * `facing` - 実際に取得できたカメラの向き
    ///
    /// # 戻り値
    /// 停止すべき直前のストリームID（存在する場合）
    ///
    /// ライブストリームがすでに存在する状態で新しいストリームが登録された場合、
    /// 直前のストリームは暗黙に停止扱いとなり、呼び出し元に停止を指示する。
    /// 台帳が同時に2本のライブストリームを保持することはない。
    pub fn stream_started(
        &mut self,
        stream_id: String,
        facing: FacingMode,
    ) -> AppResult<Option<String>> {
        match &self.phase {
            CameraPhase::Captured { .. } => Err(AppError::camera(
                "静止画プレビュー中はストリームを開始できません。先に撮り直しを行ってください",
            )),
            _ => {
                let previous = self.live_stream_id().map(|s| s.to_string());
                self.phase = CameraPhase::Streaming { stream_id, facing };
                Ok(previous)
            }
        }
    }

    /// 現在のフレームを静止画として確定する
    ///
    /// # 引数
    /// * `data_url` - キャプチャしたフレームのデータURL（data:image/jpeg;base64,...）
    pub fn capture(&mut self, data_url: &str) -> AppResult<()> {
        match &self.phase {
            CameraPhase::Streaming { stream_id, facing } => {
                let frame = decode_data_url(data_url)?;
                self.phase = CameraPhase::Captured {
                    stream_id: stream_id.clone(),
                    facing: *facing,
                    frame,
                };
                Ok(())
            }
            _ => Err(AppError::camera(
                "ライブプレビュー中のみキャプチャできます",
            )),
        }
    }

    /// 静止画を破棄して撮り直す
    ///
    /// # 戻り値
    /// 停止すべきストリームID
    ///
    /// 新しいストリームの開始前に既存のストリームを必ず停止させるため、
    /// 状態はストリーム開始待ちに戻り、既存のストリームIDを返す
    pub fn retake(&mut self) -> AppResult<Option<String>> {
        match &self.phase {
            CameraPhase::Captured { stream_id, .. } => {
                let stop = Some(stream_id.clone());
                self.phase = CameraPhase::AwaitingStream;
                Ok(stop)
            }
            _ => Err(AppError::camera("撮り直せる静止画がありません")),
        }
    }

    /// 静止画をアップロード用ファイルとして確定する
    ///
    /// # 戻り値
    /// 領収書ファイルと停止すべきストリームID
    ///
    /// 画像としてデコードできないデータはエラーになる
    pub fn accept(&mut self) -> AppResult<(ReceiptAttachment, Option<String>)> {
        match &self.phase {
            CameraPhase::Captured {
                stream_id, frame, ..
            } => {
                // 画像として解釈できることを検証する
                image::load_from_memory(&frame.data)
                    .map_err(|e| AppError::camera(format!("画像の解析に失敗しました: {e}")))?;

                let extension = if frame.content_type == "image/png" {
                    "png"
                } else {
                    "jpg"
                };

                let attachment = ReceiptAttachment {
                    filename: generate_receipt_filename(extension),
                    content_type: frame.content_type.clone(),
                    data: frame.data.clone(),
                };

                let stop = Some(stream_id.clone());
                self.phase = CameraPhase::AwaitingStream;
                Ok((attachment, stop))
            }
            _ => Err(AppError::camera("確定できる静止画がありません")),
        }
    }

    /// カメラ取得失敗を記録する
    ///
    /// # 引数
    /// * `reason` - 失敗理由
    ///
    /// # 戻り値
    /// 停止すべきストリームID（ストリーミング中の失敗の場合）
    ///
    /// 自動リトライは行わない。UIは失敗理由を表示し、再試行はユーザー操作に委ねる
    pub fn fail(&mut self, reason: CameraFailureReason) -> Option<String> {
        let stop = self.live_stream_id().map(|s| s.to_string());
        self.phase = CameraPhase::Failed { reason };
        stop
    }

    /// セッションを終了する
    ///
    /// # 戻り値
    /// 解放すべきストリームID（存在する場合）
    ///
    /// どの状態からでも呼び出せる。キャプチャ確定・キャンセル・画面破棄の
    /// すべての終了経路がここを通ることで、ストリームの解放漏れを防ぐ
    pub fn close(&mut self) -> Option<String> {
        let stop = self.live_stream_id().map(|s| s.to_string());
        self.phase = CameraPhase::AwaitingStream;
        stop
    }
}

impl Default for CameraSession {
    fn default() -> Self {
        Self::new()
    }
}

/// データURLをデコードして静止画フレームに変換する
///
/// # 引数
/// * `data_url` - data:image/jpeg;base64,... 形式のデータURL
///
/// # 戻り値
/// デコード済みフレーム、または形式不正の場合はエラー
fn decode_data_url(data_url: &str) -> AppResult<CapturedFrame> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| AppError::camera("データURLの形式が正しくありません"))?;

    let (content_type, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| AppError::camera("データURLの形式が正しくありません"))?;

    if content_type != "image/jpeg" && content_type != "image/png" {
        return Err(AppError::camera(format!(
            "サポートされていない画像形式です: {content_type}"
        )));
    }

    let data = BASE64
        .decode(payload)
        .map_err(|e| AppError::camera(format!("画像データのデコードに失敗しました: {e}")))?;

    if data.is_empty() {
        return Err(AppError::camera("画像データが空です"));
    }

    Ok(CapturedFrame {
        content_type: content_type.to_string(),
        data,
    })
}

/// カメラセッションの管理台帳
///
/// ウィンドウごとのキャプチャセッションを保持し、IDで引き当てる
#[derive(Default)]
pub struct CameraManager {
    sessions: Mutex<HashMap<String, CameraSession>>,
}

impl CameraManager {
    /// 新しいCameraManagerを作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しいセッションを開始する
    ///
    /// # 戻り値
    /// セッションID
    pub fn open_session(&self) -> String {
        let session = CameraSession::new();
        let id = session.id.clone();
        self.lock_sessions().insert(id.clone(), session);
        log::info!("カメラセッションを開始しました: session_id={id}");
        id
    }

    /// セッションに対して操作を実行する
    ///
    /// # 引数
    /// * `session_id` - セッションID
    /// * `operation` - セッションへの操作
    pub fn with_session<T>(
        &self,
        session_id: &str,
        operation: impl FnOnce(&mut CameraSession) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut sessions = self.lock_sessions();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| AppError::not_found("カメラセッション"))?;
        operation(session)
    }

    /// 静止画を確定し、セッションを終了する
    ///
    /// # 引数
    /// * `session_id` - セッションID
    ///
    /// # 戻り値
    /// 領収書ファイルと解放すべきストリームID
    ///
    /// 確定に成功したセッションは台帳から取り除かれる
    pub fn accept_capture(
        &self,
        session_id: &str,
    ) -> AppResult<(ReceiptAttachment, Option<String>)> {
        let mut sessions = self.lock_sessions();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| AppError::not_found("カメラセッション"))?;

        let result = session.accept()?;
        sessions.remove(session_id);
        log::info!("キャプチャを確定しセッションを終了しました: session_id={session_id}");
        Ok(result)
    }

    /// セッションを終了して台帳から取り除く
    ///
    /// # 引数
    /// * `session_id` - セッションID
    ///
    /// # 戻り値
    /// 解放すべきストリームID（存在する場合）
    ///
    /// 既に終了済みのセッションIDに対しても冪等に動作する
    /// （画面破棄時の二重呼び出しを許容するため）
    pub fn close_session(&self, session_id: &str) -> Option<String> {
        let mut sessions = self.lock_sessions();
        match sessions.remove(session_id) {
            Some(mut session) => {
                let stop = session.close();
                log::info!("カメラセッションを終了しました: session_id={session_id}");
                stop
            }
            None => {
                log::debug!("終了済みのカメラセッションです: session_id={session_id}");
                None
            }
        }
    }

    /// セッション数を取得する
    pub fn session_count(&self) -> usize {
        self.lock_sessions().len()
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, CameraSession>> {
        self.sessions
            .lock()
            .expect("カメラセッション台帳のロック取得に失敗")
    }
}
