/// カメラキャプチャ操作コマンド
///
/// WebView側のカメラUIとセッション台帳を橋渡しします。各レスポンスの
/// `stop_stream_id`に従ってWebView側がストリームを停止することで、
/// ハードウェアの解放漏れを防ぎます。
use crate::features::camera::models::{
    AcceptCaptureResponse, CameraFailureReason, CameraPhase, CameraSessionState,
    CloseSessionResponse, FacingMode, OpenSessionResponse, RetakeResponse, StreamStartedResponse,
};
use crate::features::camera::service::CameraManager;
use log::info;
use tauri::State;

/// カメラセッションを開始する
///
/// # 引数
/// * `camera_manager` - カメラセッション管理
///
/// # 戻り値
/// セッションIDとカメラ制約の優先順位（背面カメラ優先、失敗時は任意のカメラ）
#[tauri::command]
pub async fn open_camera_session(
    camera_manager: State<'_, CameraManager>,
) -> Result<OpenSessionResponse, String> {
    let session_id = camera_manager.open_session();

    Ok(OpenSessionResponse {
        session_id,
        constraint_preference: vec![FacingMode::Environment, FacingMode::Any],
    })
}

/// ストリーム開始を登録する
///
/// # 引数
/// * `session_id` - セッションID
/// * `stream_id` - WebView側で取得したストリームのID
/// * `facing` - 実際に取得できたカメラの向き
/// * `camera_manager` - カメラセッション管理
///
/// # 戻り値
/// 停止すべき直前のストリームID（存在する場合）
#[tauri::command]
pub async fn camera_stream_started(
    session_id: String,
    stream_id: String,
    facing: FacingMode,
    camera_manager: State<'_, CameraManager>,
) -> Result<StreamStartedResponse, String> {
    let stop_stream_id = camera_manager
        .with_session(&session_id, |session| {
            session.stream_started(stream_id, facing)
        })
        .map_err(|e| e.user_message().to_string())?;

    info!("カメラストリーム開始: session_id={session_id}, facing={facing:?}");
    Ok(StreamStartedResponse { stop_stream_id })
}

/// 現在のフレームを静止画として確定する
///
/// # 引数
/// * `session_id` - セッションID
/// * `data_url` - キャプチャしたフレームのデータURL
/// * `camera_manager` - カメラセッション管理
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラーメッセージ
#[tauri::command]
pub async fn capture_frame(
    session_id: String,
    data_url: String,
    camera_manager: State<'_, CameraManager>,
) -> Result<(), String> {
    camera_manager
        .with_session(&session_id, |session| session.capture(&data_url))
        .map_err(|e| e.user_message().to_string())?;

    info!("フレームをキャプチャしました: session_id={session_id}");
    Ok(())
}

/// 静止画を破棄して撮り直す
///
/// # 引数
/// * `session_id` - セッションID
/// * `camera_manager` - カメラセッション管理
///
/// # 戻り値
/// 停止すべきストリームID（新しいストリームの開始前に必ず停止する）
#[tauri::command]
pub async fn retake_capture(
    session_id: String,
    camera_manager: State<'_, CameraManager>,
) -> Result<RetakeResponse, String> {
    let stop_stream_id = camera_manager
        .with_session(&session_id, |session| session.retake())
        .map_err(|e| e.user_message().to_string())?;

    info!("撮り直しを開始します: session_id={session_id}");
    Ok(RetakeResponse { stop_stream_id })
}

/// 静止画をアップロード用ファイルとして確定する
///
/// # 引数
/// * `session_id` - セッションID
/// * `camera_manager` - カメラセッション管理
///
/// # 戻り値
/// 領収書ファイルと解放すべきストリームID
#[tauri::command]
pub async fn accept_capture(
    session_id: String,
    camera_manager: State<'_, CameraManager>,
) -> Result<AcceptCaptureResponse, String> {
    let (attachment, stop_stream_id) = camera_manager
        .accept_capture(&session_id)
        .map_err(|e| e.user_message().to_string())?;

    info!(
        "キャプチャを確定しました: session_id={session_id}, filename={}",
        attachment.filename
    );
    Ok(AcceptCaptureResponse {
        attachment,
        stop_stream_id,
    })
}

/// カメラ取得失敗を記録する
///
/// # 引数
/// * `session_id` - セッションID
/// * `reason` - 失敗理由
/// * `camera_manager` - カメラセッション管理
///
/// # 戻り値
/// UIに表示するエラーメッセージ
///
/// 自動リトライは行わない。UIはこのメッセージを表示したままユーザー操作を待つ
#[tauri::command]
pub async fn camera_failed(
    session_id: String,
    reason: CameraFailureReason,
    camera_manager: State<'_, CameraManager>,
) -> Result<CameraSessionState, String> {
    let stop_stream_id = camera_manager
        .with_session(&session_id, |session| Ok(session.fail(reason)))
        .map_err(|e| e.user_message().to_string())?;

    if let Some(stream_id) = stop_stream_id {
        log::warn!(
            "カメラ失敗によりストリームを停止します: session_id={session_id}, stream_id={stream_id}"
        );
    }

    log::warn!("カメラ取得に失敗しました: session_id={session_id}, reason={reason:?}");

    Ok(CameraSessionState {
        phase: "failed".to_string(),
        failure_reason: Some(reason),
        failure_message: Some(reason.user_message().to_string()),
    })
}

/// セッション状態を取得する
///
/// # 引数
/// * `session_id` - セッションID
/// * `camera_manager` - カメラセッション管理
///
/// # 戻り値
/// セッションの現在状態
#[tauri::command]
pub async fn get_camera_session_state(
    session_id: String,
    camera_manager: State<'_, CameraManager>,
) -> Result<CameraSessionState, String> {
    camera_manager
        .with_session(&session_id, |session| {
            Ok(match session.phase() {
                CameraPhase::AwaitingStream => CameraSessionState {
                    phase: "awaiting-stream".to_string(),
                    failure_reason: None,
                    failure_message: None,
                },
                CameraPhase::Streaming { .. } => CameraSessionState {
                    phase: "streaming".to_string(),
                    failure_reason: None,
                    failure_message: None,
                },
                CameraPhase::Captured { .. } => CameraSessionState {
                    phase: "captured".to_string(),
                    failure_reason: None,
                    failure_message: None,
                },
                CameraPhase::Failed { reason } => CameraSessionState {
                    phase: "failed".to_string(),
                    failure_reason: Some(*reason),
                    failure_message: Some(reason.user_message().to_string()),
                },
            })
        })
        .map_err(|e| e.user_message().to_string())
}

/// カメラセッションを終了する
///
/// # 引数
/// * `session_id` - セッションID
/// * `camera_manager` - カメラセッション管理
///
/// # 戻り値
/// 解放すべきストリームID（存在する場合）
///
/// キャンセル・画面破棄を含むすべての終了経路から呼び出される。
/// 既に終了済みのセッションに対しても冪等に動作する
#[tauri::command]
pub async fn close_camera_session(
    session_id: String,
    camera_manager: State<'_, CameraManager>,
) -> Result<CloseSessionResponse, String> {
    let stop_stream_id = camera_manager.close_session(&session_id);
    Ok(CloseSessionResponse { stop_stream_id })
}
