/// Excelワークブックの描画モジュール
///
/// 整形済みの行データをrust_xlsxwriterでワークブックに書き出します。
use crate::features::export::models::{DetailedRow, MonthlySummary};
use crate::shared::errors::{AppError, AppResult};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use std::path::Path;

/// ヘッダー・合計行の背景色（薄い緑）
const HEADER_FILL: Color = Color::RGB(0xE2EFDA);
/// 偶数行の背景色（薄いグレー）
const STRIPE_FILL: Color = Color::RGB(0xF2F2F2);

/// 詳細エクスポートのワークブックを書き出す
///
/// # 引数
/// * `path` - 出力先パス
/// * `rows` - 行データ
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
///
/// 経費ゼロの場合はヘッダー行のみのワークブックになる
pub fn write_detailed_workbook(path: &Path, rows: &[DetailedRow]) -> AppResult<()> {
    render_detailed(path, rows).map_err(|e| {
        AppError::export(format!("ワークブックの書き込みに失敗しました: {e}"))
    })
}

/// 月次サマリーのワークブックを書き出す
///
/// # 引数
/// * `path` - 出力先パス
/// * `summary` - ピボット結果
///
/// # 戻り値
/// 成功時はOk(())、失敗時はエラー
pub fn write_monthly_workbook(path: &Path, summary: &MonthlySummary) -> AppResult<()> {
    render_monthly(path, summary).map_err(|e| {
        AppError::export(format!("ワークブックの書き込みに失敗しました: {e}"))
    })
}

fn render_detailed(path: &Path, rows: &[DetailedRow]) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Expenses")?;

    // 列幅: Date / Description / Amount / Category / Receipt
    worksheet.set_column_width(0, 12)?;
    worksheet.set_column_width(1, 40)?;
    worksheet.set_column_width(2, 10)?;
    worksheet.set_column_width(3, 15)?;
    worksheet.set_column_width(4, 8)?;

    let header_format = Format::new().set_bold().set_font_name("Arial");
    let amount_format = Format::new().set_num_format("#,##0.00");

    let headers = ["Date", "Description", "Amount", "Category", "Receipt"];
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, &row.date)?;
        worksheet.write_string(r, 1, &row.description)?;
        worksheet.write_number_with_format(r, 2, row.amount, &amount_format)?;
        worksheet.write_string(r, 3, &row.category)?;
        worksheet.write_string(r, 4, &row.receipt)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn render_monthly(path: &Path, summary: &MonthlySummary) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Monthly Summary")?;

    // 列幅: カテゴリ列は広め、月の列は固定幅
    worksheet.set_column_width(0, 20)?;
    for col in 1..=summary.month_keys.len() {
        worksheet.set_column_width(col as u16, 12)?;
    }

    // ヘッダー行: 太字・薄緑背景・中央揃え
    let header_format = Format::new()
        .set_bold()
        .set_font_name("Arial")
        .set_background_color(HEADER_FILL)
        .set_align(FormatAlign::Center);

    for (col, header) in summary.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    // データ行: カテゴリ名は太字・左揃え、金額は右揃え、交互の縞模様
    for (i, row) in summary.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let stripe = if r % 2 == 0 {
            STRIPE_FILL
        } else {
            Color::White
        };

        let category_format = Format::new()
            .set_bold()
            .set_font_name("Arial")
            .set_background_color(stripe)
            .set_align(FormatAlign::Left);
        let amount_format = Format::new()
            .set_font_name("Arial")
            .set_background_color(stripe)
            .set_align(FormatAlign::Right)
            .set_num_format("#,##0");

        worksheet.write_string_with_format(r, 0, &row.category, &category_format)?;
        for (col, amount) in row.amounts.iter().enumerate() {
            worksheet.write_number_with_format(r, (col + 1) as u16, *amount, &amount_format)?;
        }
    }

    // 合計行: ヘッダーと同じ薄緑背景に上罫線
    let total_row = (summary.rows.len() + 1) as u32;
    let total_label_format = Format::new()
        .set_bold()
        .set_font_name("Arial")
        .set_background_color(HEADER_FILL)
        .set_align(FormatAlign::Left)
        .set_border_top(FormatBorder::Thin);
    let total_amount_format = Format::new()
        .set_bold()
        .set_font_name("Arial")
        .set_background_color(HEADER_FILL)
        .set_align(FormatAlign::Right)
        .set_num_format("#,##0")
        .set_border_top(FormatBorder::Thin);

    worksheet.write_string_with_format(total_row, 0, "Total", &total_label_format)?;
    for (col, total) in summary.totals.iter().enumerate() {
        worksheet.write_number_with_format(
            total_row,
            (col + 1) as u16,
            *total,
            &total_amount_format,
        )?;
    }

    workbook.save(path)?;
    Ok(())
}
