/// 経費データの集計・絞り込みモジュール
///
/// 一覧画面・サマリー表示・エクスポートで共通に使う純粋関数群。
/// UIの状態には依存せず、メモリ上の経費リストのみを入力とします。
use crate::features::expenses::models::{CategoryTotal, Expense, ExpenseFilter, SummaryStats};
use crate::shared::utils::parse_date;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashMap;

/// 経費を日付の閉区間で絞り込む
///
/// # 引数
/// * `expenses` - 経費リスト
/// * `from` - 開始日（含む）
/// * `to` - 終了日（含む）
///
/// # 戻り値
/// 区間内の経費のみを含むリスト（入力順を維持）
///
/// 日付が解析できない経費は区間外として扱う
pub fn filter_by_date_range(expenses: &[Expense], from: NaiveDate, to: NaiveDate) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|expense| match parse_date(&expense.expense_date) {
            Ok(date) => from <= date && date <= to,
            Err(_) => false,
        })
        .cloned()
        .collect()
}

/// 経費をフィルター条件で絞り込む
///
/// # 引数
/// * `expenses` - 経費リスト
/// * `filter` - フィルター条件（カテゴリ・期間・検索文字列）
///
/// # 戻り値
/// 条件に合致する経費のみを含むリスト（入力順を維持）
pub fn filter_expenses(expenses: &[Expense], filter: &ExpenseFilter) -> Vec<Expense> {
    let from = filter.date_from.as_deref().and_then(|d| parse_date(d).ok());
    let to = filter.date_to.as_deref().and_then(|d| parse_date(d).ok());
    let search = filter.search.as_deref().map(|s| s.to_lowercase());

    expenses
        .iter()
        .filter(|expense| {
            // カテゴリの一致
            if let Some(category) = filter.category {
                if expense.category != category {
                    return false;
                }
            }

            // 期間の一致（指定された境界のみ適用）
            if from.is_some() || to.is_some() {
                let date = match parse_date(&expense.expense_date) {
                    Ok(date) => date,
                    Err(_) => return false,
                };
                if let Some(from) = from {
                    if date < from {
                        return false;
                    }
                }
                if let Some(to) = to {
                    if date > to {
                        return false;
                    }
                }
            }

            // 検索文字列の一致（タイトル・説明の部分一致、大文字小文字無視）
            if let Some(search) = &search {
                let title_hit = expense.title.to_lowercase().contains(search);
                let description_hit = expense
                    .description
                    .as_deref()
                    .map(|d| d.to_lowercase().contains(search))
                    .unwrap_or(false);
                if !title_hit && !description_hit {
                    return false;
                }
            }

            true
        })
        .cloned()
        .collect()
}

/// サマリー統計を計算する
///
/// # 引数
/// * `expenses` - 経費リスト（全件）
/// * `today` - 基準日
///
/// # 戻り値
/// 今週（月曜始まり）・今月・今年の合計とカテゴリ別合計
///
/// 統計は常にメモリ上の経費リストから計算する。サーバー側の集計エンドポイントには
/// 依存しない。
pub fn compute_stats(expenses: &[Expense], today: NaiveDate) -> SummaryStats {
    let week = today.week(Weekday::Mon);
    let week_start = week.first_day();
    let week_end = week.last_day();

    let mut week_total = 0.0;
    let mut month_total = 0.0;
    let mut year_total = 0.0;
    let mut category_totals: HashMap<String, f64> = HashMap::new();

    for expense in expenses {
        let date = match parse_date(&expense.expense_date) {
            Ok(date) => date,
            Err(_) => {
                log::warn!(
                    "日付を解析できない経費を集計から除外します: id={}, expense_date={}",
                    expense.id,
                    expense.expense_date
                );
                continue;
            }
        };

        if week_start <= date && date <= week_end {
            week_total += expense.amount;
        }

        if date.year() == today.year() && date.month() == today.month() {
            month_total += expense.amount;
        }

        if date.year() == today.year() {
            year_total += expense.amount;
        }

        *category_totals
            .entry(expense.category_name().to_string())
            .or_insert(0.0) += expense.amount;
    }

    // カテゴリ別合計は金額の降順（同額の場合は名前順で安定化）
    let mut by_category: Vec<CategoryTotal> = category_totals
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    by_category.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    SummaryStats {
        week: week_total,
        month: month_total,
        year: year_total,
        by_category,
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

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_filter_by_date_range_inclusive() {
        // 閉区間フィルターのテスト（境界を含む）
        let expenses = vec![
            expense(1, 10.0, "Food", "2024-01-01"),
            expense(2, 20.0, "Food", "2024-01-15"),
            expense(3, 30.0, "Food", "2024-01-31"),
            expense(4, 40.0, "Food", "2024-02-01"),
        ];

        let filtered = filter_by_date_range(&expenses, date("2024-01-01"), date("2024-01-31"));
        let ids: Vec<i64> = filtered.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_by_date_range_invalid_date_excluded() {
        // 解析できない日付は区間外扱い
        let mut broken = expense(1, 10.0, "Food", "2024-01-15");
        broken.expense_date = "not-a-date".to_string();
        let expenses = vec![broken, expense(2, 20.0, "Food", "2024-01-15")];

        let filtered = filter_by_date_range(&expenses, date("2024-01-01"), date("2024-01-31"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn test_filter_expenses_by_category() {
        // カテゴリIDによる絞り込みテスト
        let mut other = expense(2, 20.0, "Travel", "2024-01-15");
        other.category = 2;
        let expenses = vec![expense(1, 10.0, "Food", "2024-01-15"), other];

        let filter = ExpenseFilter {
            category: Some(2),
            ..Default::default()
        };
        let filtered = filter_expenses(&expenses, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn test_filter_expenses_half_open_range() {
        // 片側のみ指定された期間は指定された境界のみ適用される
        let expenses = vec![
            expense(1, 10.0, "Food", "2024-01-01"),
            expense(2, 20.0, "Food", "2024-02-15"),
        ];

        let filter = ExpenseFilter {
            date_from: Some("2024-02-01".to_string()),
            ..Default::default()
        };
        let filtered = filter_expenses(&expenses, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn test_filter_expenses_search() {
        // 検索文字列による絞り込みテスト（大文字小文字無視）
        let mut lunch = expense(1, 10.0, "Food", "2024-01-15");
        lunch.title = "Team Lunch".to_string();
        let mut taxi = expense(2, 20.0, "Travel", "2024-01-16");
        taxi.title = "Taxi".to_string();
        taxi.description = Some("Airport transfer".to_string());

        let expenses = vec![lunch, taxi];

        let filter = ExpenseFilter {
            search: Some("lunch".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_expenses(&expenses, &filter).len(), 1);

        // 説明文にもヒットする
        let filter = ExpenseFilter {
            search: Some("AIRPORT".to_string()),
            ..Default::default()
        };
        let filtered = filter_expenses(&expenses, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn test_compute_stats_buckets() {
        // 週・月・年の集計テスト
        // 基準日: 2024-01-17（水曜日）、週は 2024-01-15（月）〜 2024-01-21（日）
        let today = date("2024-01-17");
        let expenses = vec![
            expense(1, 10.0, "Food", "2024-01-15"),   // 週・月・年
            expense(2, 20.0, "Food", "2024-01-21"),   // 週・月・年
            expense(3, 40.0, "Travel", "2024-01-05"), // 月・年
            expense(4, 80.0, "Travel", "2024-03-01"), // 年のみ
            expense(5, 160.0, "Food", "2023-12-31"),  // 前年（集計外）
        ];

        let stats = compute_stats(&expenses, today);
        assert_eq!(stats.week, 30.0);
        assert_eq!(stats.month, 70.0);
        assert_eq!(stats.year, 150.0);
    }

    #[test]
    fn test_compute_stats_week_starts_monday() {
        // 週の開始が月曜日であることのテスト
        // 基準日: 2024-01-21（日曜日）、週は 2024-01-15（月）〜 2024-01-21（日）
        let today = date("2024-01-21");
        let expenses = vec![
            expense(1, 10.0, "Food", "2024-01-14"), // 前週の日曜日
            expense(2, 20.0, "Food", "2024-01-15"), // 今週の月曜日
        ];

        let stats = compute_stats(&expenses, today);
        assert_eq!(stats.week, 20.0);
    }

    #[test]
    fn test_compute_stats_by_category() {
        // カテゴリ別合計のテスト（金額の降順）
        let today = date("2024-01-17");
        let mut uncategorized = expense(4, 5.0, "Food", "2024-01-10");
        uncategorized.category_details = None;

        let expenses = vec![
            expense(1, 10.0, "Food", "2024-01-15"),
            expense(2, 30.0, "Travel", "2024-01-16"),
            expense(3, 15.0, "Food", "2024-01-16"),
            uncategorized,
        ];

        let stats = compute_stats(&expenses, today);
        assert_eq!(stats.by_category.len(), 3);
        assert_eq!(stats.by_category[0].category, "Travel");
        assert_eq!(stats.by_category[0].total, 30.0);
        assert_eq!(stats.by_category[1].category, "Food");
        assert_eq!(stats.by_category[1].total, 25.0);
        assert_eq!(stats.by_category[2].category, "Uncategorized");
        assert_eq!(stats.by_category[2].total, 5.0);
    }

    #[test]
    fn test_compute_stats_empty() {
        // 空の経費リストの集計テスト
        let stats = compute_stats(&[], date("2024-01-17"));
        assert_eq!(stats.week, 0.0);
        assert_eq!(stats.month, 0.0);
        assert_eq!(stats.year, 0.0);
        assert!(stats.by_category.is_empty());
    }

    #[quickcheck]
    fn prop_filter_by_date_range_subset(day_offsets: Vec<u16>) -> bool {
        // 区間フィルターの結果は常に入力の部分集合であり、区間内の件数と一致する
        let base = date("2024-01-01");
        let expenses: Vec<Expense> = day_offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| {
                let d = base + chrono::Duration::days((*offset % 365) as i64);
                expense(i as i64, 1.0, "Food", &d.format("%Y-%m-%d").to_string())
            })
            .collect();

        let from = date("2024-03-01");
        let to = date("2024-06-30");
        let filtered = filter_by_date_range(&expenses, from, to);

        let expected = expenses
            .iter()
            .filter(|e| {
                let d = parse_date(&e.expense_date).unwrap();
                from <= d && d <= to
            })
            .count();

        filtered.len() == expected
            && filtered
                .iter()
                .all(|e| {
                    let d = parse_date(&e.expense_date).unwrap();
                    from <= d && d <= to
                })
    }

    #[quickcheck]
    fn prop_empty_filter_keeps_everything(count: u8) -> bool {
        // 空のフィルターはすべての経費を残す
        let expenses: Vec<Expense> = (0..count)
            .map(|i| expense(i as i64, 1.0, "Food", "2024-01-15"))
            .collect();

        filter_expenses(&expenses, &ExpenseFilter::default()).len() == expenses.len()
    }
}
