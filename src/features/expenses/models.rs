use serde::{Deserialize, Serialize};

/// 1件の経費に添付できる領収書画像の上限
pub const MAX_RECEIPTS: usize = 4;

/// 経費に埋め込まれるカテゴリ情報
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CategoryDetails {
    pub id: i64,
    pub name: String,
}

/// 経費データモデル
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Expense {
    pub id: i64,
    pub title: String,
    pub amount: f64,
    /// カテゴリID（外部参照）
    pub category: i64,
    pub category_details: Option<CategoryDetails>,
    pub description: Option<String>,
    /// 経費発生日（YYYY-MM-DD形式）
    pub expense_date: String,
    /// 領収書画像URL（最大4枚）
    pub receipt: Option<String>,
    pub receipt2: Option<String>,
    pub receipt3: Option<String>,
    pub receipt4: Option<String>,
    /// 税額（HST）
    pub hst: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl Expense {
    /// カテゴリ名を取得する（未分類の場合はフォールバック値）
    pub fn category_name(&self) -> &str {
        self.category_details
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Uncategorized")
    }

    /// 領収書が1枚でも添付されているかどうか
    pub fn has_receipt(&self) -> bool {
        self.receipt.is_some()
            || self.receipt2.is_some()
            || self.receipt3.is_some()
            || self.receipt4.is_some()
    }

    /// 添付されている領収書の枚数
    pub fn receipt_count(&self) -> usize {
        [&self.receipt, &self.receipt2, &self.receipt3, &self.receipt4]
            .iter()
            .filter(|r| r.is_some())
            .count()
    }
}

/// 経費作成用DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateExpenseDto {
    pub title: String,
    pub amount: f64,
    pub category: i64,
    pub description: Option<String>,
    pub expense_date: String,
    pub hst: Option<f64>,
}

/// 経費更新用DTO（部分更新）
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateExpenseDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hst: Option<f64>,
    /// 領収書スロットのクリア用（空文字列をサーバー側でNULLに変換する）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt4: Option<String>,
}

impl UpdateExpenseDto {
    /// すべてのフィールドが未指定のDTOを作成する
    pub fn empty() -> Self {
        Self {
            title: None,
            amount: None,
            category: None,
            description: None,
            expense_date: None,
            hst: None,
            receipt: None,
            receipt2: None,
            receipt3: None,
            receipt4: None,
        }
    }
}

/// 経費一覧のフィルター条件
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct ExpenseFilter {
    /// カテゴリID
    pub category: Option<i64>,
    /// 期間の開始日（YYYY-MM-DD形式、含む）
    pub date_from: Option<String>,
    /// 期間の終了日（YYYY-MM-DD形式、含む）
    pub date_to: Option<String>,
    /// タイトル・説明に対する検索文字列
    pub search: Option<String>,
}

/// アップロードする領収書画像
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptAttachment {
    /// ファイル名
    pub filename: String,
    /// MIMEタイプ
    pub content_type: String,
    /// 画像データ
    pub data: Vec<u8>,
}

/// 経費サマリー統計
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SummaryStats {
    /// 今週の合計（月曜始まり）
    pub week: f64,
    /// 今月の合計
    pub month: f64,
    /// 今年の合計
    pub year: f64,
    /// カテゴリ別の合計（金額の降順）
    pub by_category: Vec<CategoryTotal>,
}

/// カテゴリ別の合計金額
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}
