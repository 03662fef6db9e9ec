/// API Server経由での経費操作コマンド
///
/// 経費データはすべてAPI Serverが所有し、このモジュールは取得・作成・更新・
/// 削除のリクエストを仲介します。領収書画像はマルチパートフォームで送信します。
use crate::features::expenses::models::{
    CreateExpenseDto, Expense, ExpenseFilter, ReceiptAttachment, SummaryStats, UpdateExpenseDto,
    MAX_RECEIPTS,
};
use crate::features::expenses::stats::{compute_stats, filter_expenses};
use crate::shared::api_client::{ApiClient, FilePart};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{
    today, validate_amount, validate_date, validate_description, validate_required_field,
};
use log::info;
use tauri::State;

/// 領収書スロットのフィールド名（送信順）
const RECEIPT_SLOTS: [&str; MAX_RECEIPTS] = ["receipt", "receipt2", "receipt3", "receipt4"];

/// 経費を作成する（API Server経由）
///
/// # 引数
/// * `dto` - 経費作成用DTO
/// * `receipts` - 添付する領収書画像（最大4枚、スロット順に割り当て）
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// 作成された経費、または失敗時はエラーメッセージ
#[tauri::command]
pub async fn create_expense(
    dto: CreateExpenseDto,
    receipts: Vec<ReceiptAttachment>,
    api_client: State<'_, ApiClient>,
) -> Result<Expense, String> {
    // 送信前のバリデーション
    validate_create_dto(&dto)?;
    validate_receipt_count(receipts.len())?;

    let fields = create_dto_fields(&dto);
    let files = receipt_file_parts(&receipts);

    // API Serverに経費作成リクエストを送信
    let expense: Expense = api_client
        .post_multipart("/api/expenses/", &fields, &files)
        .await
        .map_err(|e| format!("経費作成APIエラー: {e}"))?;

    info!(
        "経費作成成功: expense_id={}, receipts={}",
        expense.id,
        receipts.len()
    );
    Ok(expense)
}

/// 経費一覧を取得する（API Server経由）
///
/// # 引数
/// * `filter` - フィルター条件（オプション）
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// 経費一覧、または失敗時はエラーメッセージ
#[tauri::command]
pub async fn get_expenses(
    filter: Option<ExpenseFilter>,
    api_client: State<'_, ApiClient>,
) -> Result<Vec<Expense>, String> {
    let expenses = fetch_expenses(&api_client).await?;

    // 絞り込みはクライアント側の共通ロジックで行う
    let filtered = match filter {
        Some(filter) => filter_expenses(&expenses, &filter),
        None => expenses,
    };

    info!("経費一覧取得成功: count={}", filtered.len());
    Ok(filtered)
}

/// 経費サマリー統計を取得する
///
/// # 引数
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// 今週・今月・今年の合計とカテゴリ別合計、または失敗時はエラーメッセージ
///
/// 統計は全経費をメモリに取得してクライアント側で計算する
#[tauri::command]
pub async fn get_expense_summary(
    api_client: State<'_, ApiClient>,
) -> Result<SummaryStats, String> {
    let expenses = fetch_expenses(&api_client).await?;

    let stats = compute_stats(&expenses, today());

    info!(
        "経費サマリー計算成功: week={}, month={}, year={}",
        stats.week, stats.month, stats.year
    );
    Ok(stats)
}

/// 経費を更新する（API Server経由）
///
/// # 引数
/// * `id` - 経費ID
/// * `dto` - 経費更新用DTO（部分更新）
/// * `receipts` - 新たに添付する領収書画像（スロット順に割り当て）
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// 更新された経費、または失敗時はエラーメッセージ
#[tauri::command]
pub async fn update_expense(
    id: i64,
    dto: UpdateExpenseDto,
    receipts: Vec<ReceiptAttachment>,
    api_client: State<'_, ApiClient>,
) -> Result<Expense, String> {
    info!("経費更新処理開始: expense_id={id}");

    validate_update_dto(&dto)?;
    validate_receipt_count(receipts.len())?;

    let endpoint = format!("/api/expenses/{id}/");

    // 新しい領収書がない場合はJSONの部分更新、ある場合はマルチパート
    let expense: Expense = if receipts.is_empty() {
        api_client
            .patch(&endpoint, &dto)
            .await
            .map_err(|e| format!("経費更新APIエラー: {e}"))?
    } else {
        let fields = update_dto_fields(&dto);
        let files = receipt_file_parts(&receipts);
        api_client
            .patch_multipart(&endpoint, &fields, &files)
            .await
            .map_err(|e| format!("経費更新APIエラー: {e}"))?
    };

    info!("経費更新成功: expense_id={id}");
    Ok(expense)
}

/// 経費を削除する（API Server経由）
///
/// # 引数
/// * `id` - 経費ID
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラーメッセージ
#[tauri::command]
pub async fn delete_expense(id: i64, api_client: State<'_, ApiClient>) -> Result<(), String> {
    info!("経費削除処理開始: expense_id={id}");

    let endpoint = format!("/api/expenses/{id}/");
    api_client
        .delete(&endpoint)
        .await
        .map_err(|e| format!("経費削除APIエラー: {e}"))?;

    info!("経費削除成功: expense_id={id}");
    Ok(())
}

/// 経費の領収書を1枚削除する（API Server経由）
///
/// # 引数
/// * `id` - 経費ID
/// * `slot` - 領収書スロット番号（1〜4）
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// 更新された経費、または失敗時はエラーメッセージ
#[tauri::command]
pub async fn remove_expense_receipt(
    id: i64,
    slot: usize,
    api_client: State<'_, ApiClient>,
) -> Result<Expense, String> {
    info!("領収書削除処理開始: expense_id={id}, slot={slot}");

    if !(1..=MAX_RECEIPTS).contains(&slot) {
        return Err(format!(
            "領収書スロットは1〜{MAX_RECEIPTS}の範囲で指定してください"
        ));
    }

    // 対象スロットを空文字列にする更新リクエストを送信
    // APIサーバー側で空文字列をNULLに変換する
    let mut dto = UpdateExpenseDto::empty();
    match slot {
        1 => dto.receipt = Some(String::new()),
        2 => dto.receipt2 = Some(String::new()),
        3 => dto.receipt3 = Some(String::new()),
        _ => dto.receipt4 = Some(String::new()),
    }

    let endpoint = format!("/api/expenses/{id}/");
    let expense: Expense = api_client
        .patch(&endpoint, &dto)
        .await
        .map_err(|e| format!("領収書削除APIエラー: {e}"))?;

    info!("領収書削除成功: expense_id={id}, slot={slot}");
    Ok(expense)
}

/// 経費一覧をAPI Serverから取得する
pub(crate) async fn fetch_expenses(api_client: &ApiClient) -> AppResult<Vec<Expense>> {
    api_client.get("/api/expenses/").await
}

/// 経費作成DTOのバリデーション
fn validate_create_dto(dto: &CreateExpenseDto) -> AppResult<()> {
    validate_required_field(&dto.title, "タイトル")?;
    validate_amount(dto.amount)?;
    validate_date(&dto.expense_date)?;
    validate_description(&dto.description)?;
    if let Some(hst) = dto.hst {
        if !hst.is_finite() || hst < 0.0 {
            return Err(AppError::validation("税額は0以上の数値で入力してください"));
        }
    }
    Ok(())
}

/// 経費更新DTOのバリデーション（指定されたフィールドのみ検証）
fn validate_update_dto(dto: &UpdateExpenseDto) -> AppResult<()> {
    if let Some(title) = &dto.title {
        validate_required_field(title, "タイトル")?;
    }
    if let Some(amount) = dto.amount {
        validate_amount(amount)?;
    }
    if let Some(date) = &dto.expense_date {
        validate_date(date)?;
    }
    validate_description(&dto.description)?;
    Ok(())
}

/// 領収書の枚数制限を検証する
fn validate_receipt_count(count: usize) -> AppResult<()> {
    if count > MAX_RECEIPTS {
        return Err(AppError::validation(format!(
            "領収書画像は最大{MAX_RECEIPTS}枚まで添付できます"
        )));
    }
    Ok(())
}

/// 経費作成DTOをマルチパートのテキストフィールドに変換する
fn create_dto_fields(dto: &CreateExpenseDto) -> Vec<(String, String)> {
    let mut fields = vec![
        ("title".to_string(), dto.title.clone()),
        ("amount".to_string(), dto.amount.to_string()),
        ("category".to_string(), dto.category.to_string()),
        ("expense_date".to_string(), dto.expense_date.clone()),
    ];

    if let Some(description) = &dto.description {
        fields.push(("description".to_string(), description.clone()));
    }
    if let Some(hst) = dto.hst {
        fields.push(("hst".to_string(), hst.to_string()));
    }

    fields
}

/// 経費更新DTOをマルチパートのテキストフィールドに変換する（指定フィールドのみ）
fn update_dto_fields(dto: &UpdateExpenseDto) -> Vec<(String, String)> {
    let mut fields = Vec::new();

    if let Some(title) = &dto.title {
        fields.push(("title".to_string(), title.clone()));
    }
    if let Some(amount) = dto.amount {
        fields.push(("amount".to_string(), amount.to_string()));
    }
    if let Some(category) = dto.category {
        fields.push(("category".to_string(), category.to_string()));
    }
    if let Some(description) = &dto.description {
        fields.push(("description".to_string(), description.clone()));
    }
    if let Some(date) = &dto.expense_date {
        fields.push(("expense_date".to_string(), date.clone()));
    }
    if let Some(hst) = dto.hst {
        fields.push(("hst".to_string(), hst.to_string()));
    }

    fields
}

/// 領収書画像をスロット順のファイルパートに変換する
fn receipt_file_parts(receipts: &[ReceiptAttachment]) -> Vec<FilePart> {
    receipts
        .iter()
        .zip(RECEIPT_SLOTS.iter())
        .map(|(attachment, slot)| FilePart {
            name: slot.to_string(),
            filename: attachment.filename.clone(),
            content_type: attachment.content_type.clone(),
            data: attachment.data.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_create_dto() -> CreateExpenseDto {
        CreateExpenseDto {
            title: "昼食".to_string(),
            amount: 1500.0,
            category: 2,
            description: Some("取引先との打ち合わせ".to_string()),
            expense_date: "2024-01-15".to_string(),
            hst: Some(195.0),
        }
    }

    fn attachment(name: &str) -> ReceiptAttachment {
        ReceiptAttachment {
            filename: name.to_string(),
            content_type: "image/jpeg".to_string(),
            data: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[test]
    fn test_validate_create_dto() {
        // 経費作成DTOのバリデーションテスト
        assert!(validate_create_dto(&sample_create_dto()).is_ok());

        let mut invalid = sample_create_dto();
        invalid.title = "".to_string();
        assert!(validate_create_dto(&invalid).is_err());

        let mut invalid = sample_create_dto();
        invalid.amount = -1.0;
        assert!(validate_create_dto(&invalid).is_err());

        let mut invalid = sample_create_dto();
        invalid.expense_date = "2024/01/15".to_string();
        assert!(validate_create_dto(&invalid).is_err());

        let mut invalid = sample_create_dto();
        invalid.hst = Some(-10.0);
        assert!(validate_create_dto(&invalid).is_err());
    }

    #[test]
    fn test_validate_receipt_count() {
        // 領収書の枚数制限テスト
        assert!(validate_receipt_count(0).is_ok());
        assert!(validate_receipt_count(4).is_ok());
        assert!(validate_receipt_count(5).is_err());
    }

    #[test]
    fn test_create_dto_fields() {
        // マルチパートフィールド変換のテスト
        let fields = create_dto_fields(&sample_create_dto());
        assert!(fields.contains(&("title".to_string(), "昼食".to_string())));
        assert!(fields.contains(&("amount".to_string(), "1500".to_string())));
        assert!(fields.contains(&("category".to_string(), "2".to_string())));
        assert!(fields.contains(&("expense_date".to_string(), "2024-01-15".to_string())));
        assert!(fields.contains(&("hst".to_string(), "195".to_string())));
    }

    #[test]
    fn test_update_dto_fields_only_set() {
        // 部分更新では指定フィールドのみ送信される
        let mut dto = UpdateExpenseDto::empty();
        dto.amount = Some(2000.0);

        let fields = update_dto_fields(&dto);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0], ("amount".to_string(), "2000".to_string()));
    }

    #[test]
    fn test_receipt_file_parts_slot_order() {
        // 領収書がスロット順に割り当てられることのテスト
        let receipts = vec![
            attachment("r1.jpg"),
            attachment("r2.jpg"),
            attachment("r3.jpg"),
        ];

        let parts = receipt_file_parts(&receipts);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].name, "receipt");
        assert_eq!(parts[1].name, "receipt2");
        assert_eq!(parts[2].name, "receipt3");
    }
}
