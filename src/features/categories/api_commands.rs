/// API Server経由でのカテゴリー操作コマンド
///
/// カテゴリーデータはAPI Serverが所有し、このモジュールは取得・作成・更新・
/// 削除のリクエストを仲介します。
use crate::features::categories::models::{Category, CreateCategoryDto, UpdateCategoryDto};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use crate::shared::utils::{validate_category_name, validate_description};
use log::info;
use tauri::State;

/// カテゴリー一覧を取得する（API Server経由）
///
/// # 引数
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// カテゴリー一覧、または失敗時はエラーメッセージ
#[tauri::command]
pub async fn get_categories(api_client: State<'_, ApiClient>) -> Result<Vec<Category>, String> {
    let categories = fetch_categories(&api_client).await?;

    info!("カテゴリー一覧取得成功: count={}", categories.len());
    Ok(categories)
}

/// カテゴリーを作成する（API Server経由）
///
/// # 引数
/// * `dto` - カテゴリー作成用DTO
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// 作成されたカテゴリー、または失敗時はエラーメッセージ
#[tauri::command]
pub async fn create_category(
    dto: CreateCategoryDto,
    api_client: State<'_, ApiClient>,
) -> Result<Category, String> {
    // 送信前のバリデーション
    validate_category_name(&dto.name)?;
    validate_description(&dto.description)?;

    let category: Category = api_client
        .post("/api/categories/", &dto)
        .await
        .map_err(|e| format!("カテゴリー作成APIエラー: {e}"))?;

    info!("カテゴリー作成成功: category_id={}", category.id);
    Ok(category)
}

/// カテゴリーを更新する（API Server経由）
///
/// # 引数
/// * `id` - カテゴリーID
/// * `dto` - カテゴリー更新用DTO
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// 更新されたカテゴリー、または失敗時はエラーメッセージ
#[tauri::command]
pub async fn update_category(
    id: i64,
    dto: UpdateCategoryDto,
    api_client: State<'_, ApiClient>,
) -> Result<Category, String> {
    if let Some(name) = &dto.name {
        validate_category_name(name)?;
    }
    validate_description(&dto.description)?;

    let endpoint = format!("/api/categories/{id}/");
    let category: Category = api_client
        .patch(&endpoint, &dto)
        .await
        .map_err(|e| format!("カテゴリー更新APIエラー: {e}"))?;

    info!("カテゴリー更新成功: category_id={id}");
    Ok(category)
}

/// カテゴリーを削除する（API Server経由）
///
/// # 引数
/// * `id` - カテゴリーID
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラーメッセージ
#[tauri::command]
pub async fn delete_category(id: i64, api_client: State<'_, ApiClient>) -> Result<(), String> {
    info!("カテゴリー削除処理開始: category_id={id}");

    let endpoint = format!("/api/categories/{id}/");
    api_client
        .delete(&endpoint)
        .await
        .map_err(|e| format!("カテゴリー削除APIエラー: {e}"))?;

    info!("カテゴリー削除成功: category_id={id}");
    Ok(())
}

/// カテゴリー一覧をAPI Serverから取得する
pub(crate) async fn fetch_categories(api_client: &ApiClient) -> AppResult<Vec<Category>> {
    api_client.get("/api/categories/").await
}
