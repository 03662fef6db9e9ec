/// エクスポートのデータ整形モジュール
///
/// 経費リストをスプレッドシートに書き出すための行データを構築する純粋関数群。
/// ワークブックへの描画は`workbook`モジュールが担当します。
use crate::features::categories::models::Category;
use crate::features::expenses::models::Expense;
use crate::features::expenses::stats::filter_by_date_range;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{month_key, month_label, parse_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// エクスポート対象の期間
///
/// 両端とも未指定（全期間）または両端とも指定のいずれかのみ有効。
/// 片側だけの指定は不正な入力として拒否される。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// 文字列の組からDateRangeを構築する
    ///
    /// # 引数
    /// * `from` - 開始日（YYYY-MM-DD形式、オプション）
    /// * `to` - 終了日（YYYY-MM-DD形式、オプション）
    pub fn from_strings(from: Option<&str>, to: Option<&str>) -> AppResult<Self> {
        let range = Self {
            from: from.map(parse_date).transpose()?,
            to: to.map(parse_date).transpose()?,
        };
        range.validate()?;
        Ok(range)
    }

    /// 期間指定の妥当性を検証する
    ///
    /// # 戻り値
    /// 有効な場合はOk(())、片側のみ指定されている場合はエラー
    pub fn validate(&self) -> AppResult<()> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => {
                if from > to {
                    return Err(AppError::validation(
                        "開始日は終了日以前の日付を指定してください",
                    ));
                }
                Ok(())
            }
            (None, None) => Ok(()),
            _ => Err(AppError::validation(
                "期間は開始日と終了日の両方を指定してください",
            )),
        }
    }

    /// 期間が指定されているかどうか
    pub fn is_bounded(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }
}

/// 詳細エクスポートの1行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailedRow {
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    /// 領収書の有無（"Yes" / "No"）
    pub receipt: String,
}

/// 月次サマリーの1行（カテゴリ×月の金額）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyRow {
    pub category: String,
    pub amounts: Vec<f64>,
}

/// 月次サマリーのピボット結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// YYYY-MM形式の月キー（昇順）
    pub month_keys: Vec<String>,
    /// ヘッダー行（"Expense categories" + 月ラベル）
    pub headers: Vec<String>,
    /// カテゴリごとの行（カテゴリ一覧の順、未知カテゴリは末尾）
    pub rows: Vec<MonthlyRow>,
    /// 列ごとの合計
    pub totals: Vec<f64>,
}

/// 詳細エクスポートの行データを構築する
///
/// # 引数
/// * `expenses` - 経費リスト
/// * `range` - 期間（両端指定時のみ閉区間で絞り込み）
///
/// # 戻り値
/// 1経費につき1行の行データ（入力順を維持）
///
/// 期間未指定の場合、行数は入力件数と一致する
pub fn detailed_rows(expenses: &[Expense], range: &DateRange) -> AppResult<Vec<DetailedRow>> {
    range.validate()?;

    let filtered;
    let target: &[Expense] = if let (Some(from), Some(to)) = (range.from, range.to) {
        filtered = filter_by_date_range(expenses, from, to);
        &filtered
    } else {
        expenses
    };

    Ok(target
        .iter()
        .map(|expense| DetailedRow {
            date: expense.expense_date.clone(),
            description: expense.title.clone(),
            amount: expense.amount,
            category: expense.category_name().to_string(),
            receipt: if expense.has_receipt() {
                "Yes".to_string()
            } else {
                "No".to_string()
            },
        })
        .collect())
}

/// 月次サマリーのピボットを構築する
///
/// # 引数
/// * `expenses` - 経費リスト（全件）
/// * `categories` - カテゴリ一覧（全件）
///
/// # 戻り値
/// カテゴリ×月の金額マトリクスと列合計
///
/// # 動作
/// - 月の列は経費に現れるYYYY-MMキーの昇順
/// - 行はカテゴリ一覧の全カテゴリ（経費ゼロのカテゴリは0埋め）
/// - カテゴリ一覧に存在しないカテゴリ名の経費は追加行として末尾に並ぶ
pub fn monthly_summary(expenses: &[Expense], categories: &[Category]) -> AppResult<MonthlySummary> {
    // 経費に現れる月キーを収集（昇順）
    let mut months: BTreeSet<String> = BTreeSet::new();
    // カテゴリ名 -> 月キー -> 合計金額
    let mut categorized: HashMap<String, HashMap<String, f64>> = HashMap::new();

    for expense in expenses {
        let date = match parse_date(&expense.expense_date) {
            Ok(date) => date,
            Err(_) => {
                log::warn!(
                    "日付を解析できない経費をエクスポートから除外します: id={}, expense_date={}",
                    expense.id,
                    expense.expense_date
                );
                continue;
            }
        };

        let key = month_key(date);
        months.insert(key.clone());

        *categorized
            .entry(expense.category_name().to_string())
            .or_default()
            .entry(key)
            .or_insert(0.0) += expense.amount;
    }

    let month_keys: Vec<String> = months.into_iter().collect();

    // ヘッダー行を構築
    let mut headers = vec!["Expense categories".to_string()];
    for key in &month_keys {
        headers.push(month_label(key)?);
    }

    // カテゴリ一覧の順で行を構築（経費ゼロのカテゴリも0埋めで出力）
    let mut rows: Vec<MonthlyRow> = Vec::new();
    let mut listed: BTreeSet<&str> = BTreeSet::new();
    for category in categories {
        listed.insert(category.name.as_str());
        rows.push(build_row(&category.name, &month_keys, &categorized));
    }

    // カテゴリ一覧にない名前（未分類など）は追加行として末尾へ
    let mut extra_names: Vec<&String> = categorized
        .keys()
        .filter(|name| !listed.contains(name.as_str()))
        .collect();
    extra_names.sort();
    for name in extra_names {
        rows.push(build_row(name, &month_keys, &categorized));
    }

    // 列ごとの合計を計算
    let totals = (0..month_keys.len())
        .map(|i| rows.iter().map(|row| row.amounts[i]).sum())
        .collect();

    Ok(MonthlySummary {
        month_keys,
        headers,
        rows,
        totals,
    })
}

/// 1カテゴリ分の行を構築する（存在しない月は0埋め）
fn build_row(
    name: &str,
    month_keys: &[String],
    categorized: &HashMap<String, HashMap<String, f64>>,
) -> MonthlyRow {
    let amounts = month_keys
        .iter()
        .map(|key| {
            categorized
                .get(name)
                .and_then(|by_month| by_month.get(key))
                .copied()
                .unwrap_or(0.0)
        })
        .collect();

    MonthlyRow {
        category: name.to_string(),
        amounts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expenses::models::CategoryDetails;
    use quickcheck_macros::quickcheck;

    fn expense(id: i64, amount: f64, category: &str, date: &str) -> Expense {
        Expense {
            id,
            title: format!("経費{id}"),
            amount,
            category: 1,
            category_details: Some(CategoryDetails {
                id: 1,
                name: category.to_string(),
            }),
            description: None,
            expense_date: date.to_string(),
            receipt: None,
            receipt2: None,
            receipt3: None,
            receipt4: None,
            hst: None,
            created_at: format!("{date}T00:00:00Z"),
            updated_at: format!("{date}T00:00:00Z"),
        }
    }

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            description: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_date_range_validation() {
        // 期間指定のバリデーションテスト
        assert!(DateRange::default().validate().is_ok());
        assert!(DateRange {
            from: Some(date("2024-01-01")),
            to: Some(date("2024-01-31")),
        }
        .validate()
        .is_ok());

        // 片側のみの指定は拒否される
        assert!(DateRange {
            from: Some(date("2024-01-01")),
            to: None,
        }
        .validate()
        .is_err());
        assert!(DateRange {
            from: None,
            to: Some(date("2024-01-31")),
        }
        .validate()
        .is_err());

        // 開始日が終了日より後の場合も拒否される
        assert!(DateRange {
            from: Some(date("2024-02-01")),
            to: Some(date("2024-01-01")),
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_date_range_from_strings() {
        // 文字列からの構築テスト
        let range = DateRange::from_strings(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        assert!(range.is_bounded());

        assert!(DateRange::from_strings(None, None).is_ok());
        assert!(DateRange::from_strings(Some("2024-01-01"), None).is_err());
        assert!(DateRange::from_strings(Some("bad"), Some("2024-01-31")).is_err());
    }

    #[test]
    fn test_detailed_rows_without_range() {
        // 期間未指定の場合は行数が入力件数と一致する
        let expenses = vec![
            expense(1, 10.0, "Food", "2024-01-05"),
            expense(2, 20.0, "Travel", "2024-02-10"),
        ];

        let rows = detailed_rows(&expenses, &DateRange::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Food");
        assert_eq!(rows[0].receipt, "No");
        assert_eq!(rows[1].amount, 20.0);
    }

    #[test]
    fn test_detailed_rows_with_range_inclusive() {
        // 両端指定の場合は閉区間で絞り込まれる
        let expenses = vec![
            expense(1, 10.0, "Food", "2024-01-01"),
            expense(2, 20.0, "Food", "2024-01-31"),
            expense(3, 30.0, "Food", "2024-02-01"),
        ];

        let range = DateRange {
            from: Some(date("2024-01-01")),
            to: Some(date("2024-01-31")),
        };
        let rows = detailed_rows(&expenses, &range).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_detailed_rows_receipt_flag() {
        // 領収書の有無フラグのテスト
        let mut with_receipt = expense(1, 10.0, "Food", "2024-01-05");
        with_receipt.receipt2 = Some("https://example.com/r.jpg".to_string());
        let expenses = vec![with_receipt, expense(2, 20.0, "Food", "2024-01-06")];

        let rows = detailed_rows(&expenses, &DateRange::default()).unwrap();
        assert_eq!(rows[0].receipt, "Yes");
        assert_eq!(rows[1].receipt, "No");
    }

    #[test]
    fn test_detailed_rows_rejects_half_open_range() {
        // 片側のみの期間指定はエラー
        let range = DateRange {
            from: Some(date("2024-01-01")),
            to: None,
        };
        assert!(detailed_rows(&[], &range).is_err());
    }

    #[test]
    fn test_monthly_summary_reference_scenario() {
        // 代表シナリオ: Food 2件（1月・2月）、Travelは経費なし
        let expenses = vec![
            expense(1, 10.0, "Food", "2024-01-05"),
            expense(2, 5.0, "Food", "2024-02-10"),
        ];
        let categories = vec![category(1, "Food"), category(2, "Travel")];

        let summary = monthly_summary(&expenses, &categories).unwrap();

        assert_eq!(
            summary.headers,
            vec!["Expense categories", "Jan 2024", "Feb 2024"]
        );
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[0].category, "Food");
        assert_eq!(summary.rows[0].amounts, vec![10.0, 5.0]);
        assert_eq!(summary.rows[1].category, "Travel");
        assert_eq!(summary.rows[1].amounts, vec![0.0, 0.0]);
        assert_eq!(summary.totals, vec![10.0, 5.0]);
    }

    #[test]
    fn test_monthly_summary_months_sorted() {
        // 月の列が昇順に並ぶことのテスト（入力順に依存しない）
        let expenses = vec![
            expense(1, 10.0, "Food", "2024-03-05"),
            expense(2, 20.0, "Food", "2023-12-10"),
            expense(3, 30.0, "Food", "2024-01-20"),
        ];
        let categories = vec![category(1, "Food")];

        let summary = monthly_summary(&expenses, &categories).unwrap();
        assert_eq!(summary.month_keys, vec!["2023-12", "2024-01", "2024-03"]);
        assert_eq!(summary.rows[0].amounts, vec![20.0, 30.0, 10.0]);
    }

    #[test]
    fn test_monthly_summary_unknown_category_extra_row() {
        // カテゴリ一覧にないカテゴリの経費は追加行として末尾に出力される
        let mut uncategorized = expense(2, 7.0, "Food", "2024-01-10");
        uncategorized.category_details = None;
        let expenses = vec![expense(1, 10.0, "Food", "2024-01-05"), uncategorized];
        let categories = vec![category(1, "Food"), category(2, "Travel")];

        let summary = monthly_summary(&expenses, &categories).unwrap();
        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.rows[2].category, "Uncategorized");
        assert_eq!(summary.rows[2].amounts, vec![7.0]);
        // 合計には追加行の金額も含まれる
        assert_eq!(summary.totals, vec![17.0]);
    }

    #[test]
    fn test_monthly_summary_empty_expenses() {
        // 経費ゼロの場合は月の列がなく、カテゴリ行は空の金額リストを持つ
        let categories = vec![category(1, "Food"), category(2, "Travel")];
        let summary = monthly_summary(&[], &categories).unwrap();

        assert_eq!(summary.headers, vec!["Expense categories"]);
        assert!(summary.month_keys.is_empty());
        assert_eq!(summary.rows.len(), 2);
        assert!(summary.rows[0].amounts.is_empty());
        assert!(summary.totals.is_empty());
    }

    #[quickcheck]
    fn prop_detailed_rows_count_without_range(count: u8) -> bool {
        // 期間未指定の詳細エクスポートの行数は入力件数と常に一致する
        let expenses: Vec<Expense> = (0..count)
            .map(|i| expense(i as i64, 1.0, "Food", "2024-01-15"))
            .collect();

        detailed_rows(&expenses, &DateRange::default()).unwrap().len() == expenses.len()
    }

    #[quickcheck]
    fn prop_monthly_totals_match_row_sums(amounts: Vec<u32>) -> bool {
        // 合計行は常に各列の行合計と一致する
        let expenses: Vec<Expense> = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                let month = (i % 12) + 1;
                let cat = if i % 2 == 0 { "Food" } else { "Travel" };
                expense(
                    i as i64,
                    (*amount % 10_000) as f64,
                    cat,
                    &format!("2024-{month:02}-05"),
                )
            })
            .collect();
        let categories = vec![category(1, "Food"), category(2, "Travel")];

        let summary = monthly_summary(&expenses, &categories).unwrap();
        summary
            .totals
            .iter()
            .enumerate()
            .all(|(i, total)| {
                let column_sum: f64 = summary.rows.iter().map(|row| row.amounts[i]).sum();
                (total - column_sum).abs() < 1e-9
            })
    }
}
