/// API Server経由でのアクティビティログ取得コマンド
///
/// アクティビティの記録はAPIサーバー側で行われ、クライアントは閲覧のみ行います。
use crate::features::activity::models::ActivityEntry;
use crate::shared::api_client::ApiClient;
use log::info;
use tauri::State;

/// クライアント側で保持するアクティビティの最大件数
const ACTIVITY_LIMIT: usize = 50;

/// アクティビティログを取得する（API Server経由）
///
/// # 引数
/// * `api_client` - APIクライアント
///
/// # 戻り値
/// 新しい順に最大50件のアクティビティ、または失敗時はエラーメッセージ
#[tauri::command]
pub async fn get_activities(
    api_client: State<'_, ApiClient>,
) -> Result<Vec<ActivityEntry>, String> {
    let entries: Vec<ActivityEntry> = api_client
        .get("/api/activities/")
        .await
        .map_err(|e| format!("アクティビティ取得APIエラー: {e}"))?;

    let entries = newest_first(entries);

    info!("アクティビティ取得成功: count={}", entries.len());
    Ok(entries)
}

/// アクティビティを新しい順に並べ、上限件数に切り詰める
///
/// サーバーが新しい順で返す契約だが、クライアント側でも並び順と件数を保証する
fn newest_first(mut entries: Vec<ActivityEntry>) -> Vec<ActivityEntry> {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(ACTIVITY_LIMIT);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::activity::models::ActivityAction;

    fn entry(id: i64, timestamp: &str) -> ActivityEntry {
        ActivityEntry {
            id,
            action: ActivityAction::Create,
            title: format!("経費{id}"),
            amount: Some(100.0),
            category: Some("Food".to_string()),
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn test_newest_first_sorts_descending() {
        // 新しい順に並び替えられることのテスト
        let entries = vec![
            entry(1, "2024-01-15T09:00:00Z"),
            entry(2, "2024-01-16T09:00:00Z"),
            entry(3, "2024-01-14T09:00:00Z"),
        ];

        let sorted = newest_first(entries);
        let ids: Vec<i64> = sorted.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_newest_first_truncates_to_limit() {
        // 50件を超えるエントリが切り詰められることのテスト
        let entries: Vec<ActivityEntry> = (0..80)
            .map(|i| entry(i, &format!("2024-01-01T{:02}:{:02}:00Z", i / 60, i % 60)))
            .collect();

        let truncated = newest_first(entries);
        assert_eq!(truncated.len(), ACTIVITY_LIMIT);
        // 最も新しいエントリが先頭に残る
        assert_eq!(truncated[0].id, 79);
    }
}
