use serde::{Deserialize, Serialize};

/// アクティビティの種類
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    /// 経費の作成
    Create,
    /// 経費の更新
    Update,
    /// 経費の削除
    Delete,
}

/// アクティビティログの1エントリ
///
/// クライアントからは読み取り専用。記録はAPIサーバー側で行われる。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityEntry {
    pub id: i64,
    pub action: ActivityAction,
    /// 対象となった経費のタイトル
    pub title: String,
    pub amount: Option<f64>,
    pub category: Option<String>,
    /// 発生日時（RFC3339形式）
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_action_serialization() {
        // アクションが小文字でシリアライズされることを確認
        assert_eq!(
            serde_json::to_string(&ActivityAction::Create).unwrap(),
            "\"create\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityAction::Update).unwrap(),
            "\"update\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityAction::Delete).unwrap(),
            "\"delete\""
        );
    }

    #[test]
    fn test_activity_entry_deserialization() {
        // アクティビティエントリの解析テスト
        let json = r#"{
            "id": 1,
            "action": "create",
            "title": "昼食",
            "amount": 1500.0,
            "category": "Food",
            "timestamp": "2024-01-15T12:30:00Z"
        }"#;

        let entry: ActivityEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.action, ActivityAction::Create);
        assert_eq!(entry.title, "昼食");
        assert_eq!(entry.amount, Some(1500.0));
        assert_eq!(entry.category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_activity_entry_delete_without_amount() {
        // 削除エントリは金額・カテゴリを持たない場合がある
        let json = r#"{
            "id": 2,
            "action": "delete",
            "title": "タクシー",
            "amount": null,
            "category": null,
            "timestamp": "2024-01-16T09:00:00Z"
        }"#;

        let entry: ActivityEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.action, ActivityAction::Delete);
        assert!(entry.amount.is_none());
        assert!(entry.category.is_none());
    }
}
