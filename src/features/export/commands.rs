/// 経費エクスポートコマンド
///
/// 経費リストとカテゴリ一覧をAPI Serverから取得し、整形してExcelワークブックを
/// 指定されたパスに書き出します。保存先はフロントエンドがダイアログで選択します。
use crate::features::categories::api_commands::fetch_categories;
use crate::features::expenses::api_commands::fetch_expenses;
use crate::features::export::models::{detailed_rows, monthly_summary, DateRange};
use crate::features::export::workbook::{write_detailed_workbook, write_monthly_workbook};
use crate::shared::api_client::ApiClient;
use crate::shared::utils::today;
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tauri::State;

/// エクスポートの種類
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// 1経費につき1行の詳細エクスポート
    Detailed,
    /// カテゴリ×月のピボット
    Monthly,
}

/// エクスポート結果
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportResult {
    /// 書き出したファイルのパス
    pub path: String,
    /// データ行数（ヘッダー・合計行を除く）
    pub rows: usize,
}

/// 経費をExcelファイルにエクスポートする
///
/// # 引数
/// * `mode` - エクスポートの種類
/// * `date_from` - 期間の開始日（詳細エクスポートのみ、YYYY-MM-DD形式）
/// * `date_to` - 期間の終了日（詳細エクスポートのみ、YYYY-MM-DD形式）
/// * `output_path` - 出力先パス（保存ダイアログで選択されたもの）
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// エクスポート結果、または失敗時はエラーメッセージ
///
/// 期間は開始日と終了日の両方を指定した場合のみ有効。片側だけの指定は拒否される。
#[tauri::command]
pub async fn export_expenses(
    mode: ExportMode,
    date_from: Option<String>,
    date_to: Option<String>,
    output_path: String,
    api_client: State<'_, ApiClient>,
) -> Result<ExportResult, String> {
    info!("エクスポート処理開始: mode={mode:?}, output_path={output_path}");

    let path = Path::new(&output_path);

    let result = match mode {
        ExportMode::Detailed => {
            let range = DateRange::from_strings(date_from.as_deref(), date_to.as_deref())?;

            let expenses = fetch_expenses(&api_client)
                .await
                .map_err(|e| format!("経費一覧取得APIエラー: {e}"))?;

            let rows = detailed_rows(&expenses, &range)?;
            write_detailed_workbook(path, &rows)?;

            ExportResult {
                path: output_path.clone(),
                rows: rows.len(),
            }
        }
        ExportMode::Monthly => {
            // 経費とカテゴリを並行して取得する
            let (expenses, categories) =
                futures::try_join!(fetch_expenses(&api_client), fetch_categories(&api_client))
                    .map_err(|e| format!("エクスポート用データ取得APIエラー: {e}"))?;

            let summary = monthly_summary(&expenses, &categories)?;
            write_monthly_workbook(path, &summary)?;

            ExportResult {
                path: output_path.clone(),
                rows: summary.rows.len(),
            }
        }
    };

    info!(
        "エクスポート完了: mode={mode:?}, rows={}, path={output_path}",
        result.rows
    );
    Ok(result)
}

/// エクスポートファイル名の候補を取得する
///
/// # 引数
/// * `mode` - エクスポートの種類
/// * `date_from` - 期間の開始日（オプション）
/// * `date_to` - 期間の終了日（オプション）
///
/// # 戻り値
/// 保存ダイアログの初期ファイル名、または失敗時はエラーメッセージ
#[tauri::command]
pub async fn suggest_export_filename(
    mode: ExportMode,
    date_from: Option<String>,
    date_to: Option<String>,
) -> Result<String, String> {
    let range = DateRange::from_strings(date_from.as_deref(), date_to.as_deref())?;
    Ok(default_filename(mode, &range, today()))
}

/// エクスポートファイル名を組み立てる
///
/// 詳細エクスポートで期間が指定されている場合は期間を、
/// それ以外は当日の日付をファイル名に含める
fn default_filename(mode: ExportMode, range: &DateRange, today: NaiveDate) -> String {
    match mode {
        ExportMode::Detailed => match (range.from, range.to) {
            (Some(from), Some(to)) => format!(
                "expenses_{}_to_{}.xlsx",
                from.format("%Y-%m-%d"),
                to.format("%Y-%m-%d")
            ),
            _ => format!("expenses_{}.xlsx", today.format("%Y-%m-%d")),
        },
        ExportMode::Monthly => format!("expense_summary_{}.xlsx", today.format("%Y-%m-%d")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_default_filename_detailed_without_range() {
        // 期間未指定の詳細エクスポートは当日の日付を含む
        let name = default_filename(ExportMode::Detailed, &DateRange::default(), date("2024-03-01"));
        assert_eq!(name, "expenses_2024-03-01.xlsx");
    }

    #[test]
    fn test_default_filename_detailed_with_range() {
        // 期間指定の詳細エクスポートは期間をファイル名に含む
        let range = DateRange {
            from: Some(date("2024-01-01")),
            to: Some(date("2024-01-31")),
        };
        let name = default_filename(ExportMode::Detailed, &range, date("2024-03-01"));
        assert_eq!(name, "expenses_2024-01-01_to_2024-01-31.xlsx");
    }

    #[test]
    fn test_default_filename_monthly() {
        // 月次サマリーは常に当日の日付を含む
        let name = default_filename(ExportMode::Monthly, &DateRange::default(), date("2024-03-01"));
        assert_eq!(name, "expense_summary_2024-03-01.xlsx");
    }

    #[test]
    fn test_export_mode_deserialization() {
        // フロントエンドからの文字列指定を受け付ける
        assert_eq!(
            serde_json::from_str::<ExportMode>("\"detailed\"").unwrap(),
            ExportMode::Detailed
        );
        assert_eq!(
            serde_json::from_str::<ExportMode>("\"monthly\"").unwrap(),
            ExportMode::Monthly
        );
    }
}
