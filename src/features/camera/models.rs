use crate::features::expenses::models::ReceiptAttachment;
use serde::{Deserialize, Serialize};

/// カメラの向きの指定
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// 背面カメラ（領収書撮影に優先）
    Environment,
    /// 利用可能な任意のカメラ（フォールバック）
    Any,
}

/// カメラ取得失敗の理由
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CameraFailureReason {
    /// カメラ権限が拒否された
    PermissionDenied,
    /// カメラデバイスが見つからない
    NotFound,
    /// その他のエラー
    Unknown,
}

impl CameraFailureReason {
    /// ユーザーに表示するメッセージを取得する
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraFailureReason::PermissionDenied => {
                "カメラへのアクセスが許可されていません。ブラウザの設定を確認してください"
            }
            CameraFailureReason::NotFound => "利用可能なカメラが見つかりません",
            CameraFailureReason::Unknown => "カメラの起動に失敗しました",
        }
    }
}

/// キャプチャされた静止画フレーム
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// MIMEタイプ（image/jpeg または image/png）
    pub content_type: String,
    /// デコード済みの画像データ
    pub data: Vec<u8>,
}

/// カメラセッションの状態
#[derive(Debug, Clone)]
pub enum CameraPhase {
    /// ストリーム開始待ち（権限要求中を含む）
    AwaitingStream,
    /// ライブプレビュー中
    Streaming {
        stream_id: String,
        facing: FacingMode,
    },
    /// 静止画プレビュー中（ストリームは背後で維持される）
    Captured {
        stream_id: String,
        facing: FacingMode,
        frame: CapturedFrame,
    },
    /// カメラ取得失敗（自動リトライはしない）
    Failed { reason: CameraFailureReason },
}

/// セッション開始のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenSessionResponse {
    /// セッションID
    pub session_id: String,
    /// カメラ制約の優先順位（背面カメラ優先、失敗時は任意のカメラ）
    pub constraint_preference: Vec<FacingMode>,
}

/// ストリーム開始登録のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct StreamStartedResponse {
    /// 停止すべき直前のストリームID（存在する場合）
    pub stop_stream_id: Option<String>,
}

/// 撮り直しのレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct RetakeResponse {
    /// 停止すべきストリームID（新しいストリームの開始前に必ず停止する）
    pub stop_stream_id: Option<String>,
}

/// キャプチャ確定のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptCaptureResponse {
    /// アップロード用の領収書ファイル
    pub attachment: ReceiptAttachment,
    /// 解放すべきストリームID
    pub stop_stream_id: Option<String>,
}

/// セッション終了のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct CloseSessionResponse {
    /// 解放すべきストリームID（存在する場合）
    pub stop_stream_id: Option<String>,
}

/// セッション状態の問い合わせレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct CameraSessionState {
    /// 状態名（awaiting-stream / streaming / captured / failed）
    pub phase: String,
    /// 失敗理由（失敗時のみ）
    pub failure_reason: Option<CameraFailureReason>,
    /// 失敗メッセージ（失敗時のみ、UIにそのまま表示する）
    pub failure_message: Option<String>,
}
