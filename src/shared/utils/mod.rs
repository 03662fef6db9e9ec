use crate::shared::errors::{AppError, AppResult};
use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

pub mod nanoid;

/// YYYY-MM-DD形式の日付文字列パターン
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("日付パターンのコンパイルに失敗"));

/// 日付文字列のバリデーション
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 有効な日付の場合はOk(())、無効な場合はエラー
///
/// # バリデーション規則
/// - YYYY-MM-DD形式であること
/// - 実在する日付であること
/// - 1900年以降、2100年以前であること
pub fn validate_date(date_str: &str) -> AppResult<()> {
    // 基本的な形式チェック
    if !DATE_PATTERN.is_match(date_str) {
        return Err(AppError::validation(
            "日付はYYYY-MM-DD形式で入力してください",
        ));
    }

    // 日付として解析可能かチェック
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::validation("無効な日付です"))?;

    // 年の範囲チェック
    let year = date.year();
    if !(1900..=2100).contains(&year) {
        return Err(AppError::validation(
            "日付は1900年から2100年の間で入力してください",
        ));
    }

    Ok(())
}

/// 日付文字列をNaiveDateに変換する
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 変換された日付、または変換失敗時はエラー
pub fn parse_date(date_str: &str) -> AppResult<NaiveDate> {
    validate_date(date_str)?;
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::validation("日付の形式が正しくありません"))
}

/// 金額のバリデーション
///
/// # 引数
/// * `amount` - 金額
///
/// # 戻り値
/// 有効な金額の場合はOk(())、無効な場合はエラー
///
/// # バリデーション規則
/// - 正の数値であること
/// - 10桁以内であること
/// - 小数点以下は2桁まで
pub fn validate_amount(amount: f64) -> AppResult<()> {
    // 無限大・NaNチェック
    if !amount.is_finite() {
        return Err(AppError::validation("無効な金額です"));
    }

    // 正の数値チェック
    if amount <= 0.0 {
        return Err(AppError::validation("金額は正の数値で入力してください"));
    }

    // 上限チェック（10桁以内）
    if amount >= 10_000_000_000.0 {
        return Err(AppError::validation("金額は10桁以内で入力してください"));
    }

    // 小数点以下の桁数チェック（2桁まで）
    let amount_str = format!("{amount:.10}"); // 十分な精度で文字列化
    if let Some(decimal_pos) = amount_str.find('.') {
        let decimal_part = &amount_str[decimal_pos + 1..];
        let significant_decimals = decimal_part.trim_end_matches('0');
        if significant_decimals.len() > 2 {
            return Err(AppError::validation(
                "金額は小数点以下2桁まで入力してください",
            ));
        }
    }

    Ok(())
}

/// 文字列の長さバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `max_length` - 最大文字数
/// * `field_name` - フィールド名（エラーメッセージ用）
///
/// # 戻り値
/// 有効な長さの場合はOk(())、無効な場合はエラー
pub fn validate_text_length(text: &str, max_length: usize, field_name: &str) -> AppResult<()> {
    let char_count = text.chars().count();
    if char_count > max_length {
        return Err(AppError::validation(format!(
            "{field_name}は{max_length}文字以内で入力してください（現在: {char_count}文字）"
        )));
    }
    Ok(())
}

/// 必須フィールドのバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `field_name` - フィールド名（エラーメッセージ用）
///
/// # 戻り値
/// 空でない場合はOk(())、空の場合はエラー
pub fn validate_required_field(text: &str, field_name: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::validation(format!("{field_name}は必須項目です")));
    }
    Ok(())
}

/// カテゴリ名のバリデーション
///
/// # 引数
/// * `name` - カテゴリ名
///
/// # 戻り値
/// 有効なカテゴリ名の場合はOk(())、無効な場合はエラー
///
/// # バリデーション規則
/// - 必須項目であること
/// - 50文字以内であること
/// - 空白のみでないこと
pub fn validate_category_name(name: &str) -> AppResult<()> {
    validate_required_field(name, "カテゴリ")?;
    validate_text_length(name, 50, "カテゴリ")?;
    Ok(())
}

/// 説明文のバリデーション
///
/// # 引数
/// * `description` - 説明文（Option）
///
/// # 戻り値
/// 有効な説明文の場合はOk(())、無効な場合はエラー
///
/// # バリデーション規則
/// - 500文字以内であること（Noneの場合は有効）
pub fn validate_description(description: &Option<String>) -> AppResult<()> {
    if let Some(desc) = description {
        validate_text_length(desc, 500, "説明")?;
    }
    Ok(())
}

/// 日付からYYYY-MM形式の月キーを生成する
///
/// # 引数
/// * `date` - 対象の日付
///
/// # 戻り値
/// YYYY-MM形式の月キー
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// YYYY-MM形式の月キーを表示用ラベルに変換する
///
/// # 引数
/// * `key` - YYYY-MM形式の月キー
///
/// # 戻り値
/// "Jan 2024" のような英語表記の月ラベル、または解析失敗時はエラー
pub fn month_label(key: &str) -> AppResult<String> {
    let first_day = NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("無効な月キーです: {key}")))?;
    Ok(first_day.format("%b %Y").to_string())
}

/// 今日の日付をローカルタイムゾーンで取得する
///
/// # 戻り値
/// 今日の日付
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
