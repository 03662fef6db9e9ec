use nanoid::nanoid;

/// カメラセッションID用のnanoIdを生成する
///
/// # 戻り値
/// 21文字のURL-safeなnanoId
///
/// # 特性
/// - 文字セット: A-Za-z0-9_- (64文字)
/// - 長さ: 21文字
/// - 衝突確率: 1兆個のIDで1%未満
pub fn generate_session_id() -> String {
    nanoid!()
}

/// 領収書ファイル名を生成する
///
/// # 引数
/// * `extension` - 拡張子（"jpg" または "png"）
///
/// # 戻り値
/// `receipt_<nanoid10>.<extension>` 形式のファイル名
pub fn generate_receipt_filename(extension: &str) -> String {
    format!("receipt_{}.{extension}", nanoid!(10))
}

/// nanoIdが有効な形式かどうかを検証する
///
/// # 引数
/// * `id` - 検証するID文字列
///
/// # 戻り値
/// 有効な場合はtrue、無効な場合はfalse
///
/// # 検証条件
/// - 長さが21文字
/// - URL-safe文字（A-Za-z0-9_-）のみを含む
pub fn is_valid_session_id(id: &str) -> bool {
    id.len() == 21
        && id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_session_id_length() {
        // セッションIDの長さテスト
        let id = generate_session_id();
        assert_eq!(id.len(), 21);
    }

    #[test]
    fn test_generate_session_id_uniqueness() {
        // 生成されるIDが重複しないことを確認
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            assert!(ids.insert(generate_session_id()));
        }
    }

    #[test]
    fn test_generate_receipt_filename() {
        // 領収書ファイル名の形式テスト
        let filename = generate_receipt_filename("jpg");
        assert!(filename.starts_with("receipt_"));
        assert!(filename.ends_with(".jpg"));

        let filename = generate_receipt_filename("png");
        assert!(filename.ends_with(".png"));
    }

    #[test]
    fn test_is_valid_session_id() {
        // セッションID検証のテスト
        let id = generate_session_id();
        assert!(is_valid_session_id(&id));

        assert!(!is_valid_session_id("short"));
        assert!(!is_valid_session_id(&"a".repeat(22)));
        assert!(!is_valid_session_id("!@#$%^&*()!@#$%^&*()!"));
    }
}
