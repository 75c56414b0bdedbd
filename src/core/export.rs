//! Spreadsheet export of the ledger.
//!
//! The export is split into a pure step and a write step. [`build_report`]
//! turns the record list into the rows of both sheets plus the running totals;
//! [`write_workbook`] lays those rows out with `rust_xlsxwriter`. The
//! [`export_ledger`] entry point ties them together and names the file.

use crate::{
    core::record,
    entities::{Category, record as record_entity},
    errors::{Error, ExportFailure, Result},
};
use chrono::{Local, NaiveDateTime};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};
use sea_orm::ConnectionTrait;
use std::fs;
use std::path::{Path, PathBuf};
use std::io::ErrorKind;
use tracing::{error, info, warn};

/// Name of the sheet listing every record.
pub const LEDGER_SHEET: &str = "Full Ledger";
/// Name of the sheet with totals and the per-category breakdown.
pub const SUMMARY_SHEET: &str = "Summary Report";
/// Header row of the ledger sheet.
pub const LEDGER_HEADERS: [&str; 8] = [
    "No",
    "ID",
    "Name",
    "Amount",
    "Meal",
    "Category",
    "Note",
    "CreatedAt",
];
/// Header row of the summary sheet.
pub const SUMMARY_HEADERS: [&str; 3] = ["Category", "Count", "Total Amount"];

const GRAND_TOTAL_LABEL: &str = "Grand Total";
const MEAL_TOTAL_LABEL: &str = "Total Meal Tickets";
const CATEGORY_SECTION_LABEL: &str = "[By Category]";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Text value
    Text(String),
    /// Integer value, written as a number
    Number(i64),
    /// Nothing written
    Empty,
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Character count used for column sizing.
    fn display_width(&self) -> usize {
        match self {
            Self::Text(text) => text.chars().count(),
            Self::Number(number) => number.to_string().len(),
            Self::Empty => 0,
        }
    }
}

/// Count and amount accumulated for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTotals {
    /// The category
    pub category: Category,
    /// Records in this category
    pub count: i64,
    /// Sum of their amounts
    pub amount: i64,
}

/// Everything needed to write the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReport {
    /// Ledger sheet rows, header first
    pub ledger_rows: Vec<Vec<Cell>>,
    /// Number of records
    pub total_count: i64,
    /// Sum of all amounts
    pub total_amount: i64,
    /// Sum of all meal tickets
    pub total_meal_tickets: i64,
    /// Per-category totals in the order each category was first seen
    pub categories: Vec<CategoryTotals>,
}

impl LedgerReport {
    /// Summary sheet rows, header first.
    #[must_use]
    pub fn summary_rows(&self) -> Vec<Vec<Cell>> {
        let mut rows = vec![
            SUMMARY_HEADERS.iter().map(|h| Cell::text(*h)).collect(),
            vec![
                Cell::text(GRAND_TOTAL_LABEL),
                Cell::Number(self.total_count),
                Cell::Number(self.total_amount),
            ],
            vec![
                Cell::text(MEAL_TOTAL_LABEL),
                Cell::Number(self.total_meal_tickets),
                Cell::text("-"),
            ],
            vec![Cell::Empty, Cell::Empty, Cell::Empty],
            vec![Cell::text(CATEGORY_SECTION_LABEL), Cell::Empty, Cell::Empty],
        ];
        rows.extend(self.categories.iter().map(|totals| {
            vec![
                Cell::text(totals.category.label()),
                Cell::Number(totals.count),
                Cell::Number(totals.amount),
            ]
        }));
        rows
    }
}

/// Builds the report from records ordered newest first.
///
/// The `No` column counts down so the oldest record is 1 and the newest
/// equals the record count.
#[must_use]
pub fn build_report(records: &[record_entity::Model]) -> LedgerReport {
    let mut ledger_rows: Vec<Vec<Cell>> =
        vec![LEDGER_HEADERS.iter().map(|h| Cell::text(*h)).collect()];
    let mut total_count = 0;
    let mut total_amount: i64 = 0;
    let mut total_meal_tickets: i64 = 0;
    let mut categories: Vec<CategoryTotals> = Vec::new();

    let record_count = i64::try_from(records.len()).unwrap_or(i64::MAX);
    for (number, record) in (1..=record_count).rev().zip(records) {
        ledger_rows.push(vec![
            Cell::Number(number),
            Cell::Number(record.id),
            Cell::text(record.name.clone()),
            Cell::Number(record.amount),
            Cell::Number(record.meal_ticket),
            Cell::text(record.category.label()),
            Cell::text(record.note.clone()),
            Cell::text(record.created_at.format(TIMESTAMP_FORMAT).to_string()),
        ]);

        total_count += 1;
        total_amount = total_amount.saturating_add(record.amount);
        total_meal_tickets = total_meal_tickets.saturating_add(record.meal_ticket);

        if let Some(totals) = categories
            .iter_mut()
            .find(|totals| totals.category == record.category)
        {
            totals.count += 1;
            totals.amount = totals.amount.saturating_add(record.amount);
        } else {
            categories.push(CategoryTotals {
                category: record.category,
                count: 1,
                amount: record.amount,
            });
        }
    }

    LedgerReport {
        ledger_rows,
        total_count,
        total_amount,
        total_meal_tickets,
        categories,
    }
}

/// Column widths of `(longest cell + 2) * 1.2` character units.
#[must_use]
pub fn column_widths(rows: &[Vec<Cell>]) -> Vec<f64> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    (0..columns)
        .map(|col| {
            let longest = rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(Cell::display_width)
                .max()
                .unwrap_or(0);
            #[allow(clippy::cast_precision_loss)]
            let width = (longest + 2) as f64 * 1.2;
            width
        })
        .collect()
}

/// File name for an export taken at `now`, to minute precision.
#[must_use]
pub fn export_file_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{prefix}_{}.xlsx", now.format("%Y%m%d_%H%M"))
}

fn write_rows(
    worksheet: &mut Worksheet,
    rows: &[Vec<Cell>],
    header_format: &Format,
) -> std::result::Result<(), XlsxError> {
    for (row, cells) in (0_u32..).zip(rows) {
        for (col, cell) in (0_u16..).zip(cells) {
            match (cell, row) {
                (Cell::Text(text), 0) => {
                    worksheet.write_string_with_format(row, col, text, header_format)?;
                }
                (Cell::Text(text), _) => {
                    worksheet.write_string(row, col, text)?;
                }
                (Cell::Number(number), _) => {
                    // Amounts stay far below 2^53
                    #[allow(clippy::cast_precision_loss)]
                    let value = *number as f64;
                    worksheet.write_number(row, col, value)?;
                }
                (Cell::Empty, _) => {}
            }
        }
    }
    Ok(())
}

/// Writes both sheets of `report` to `path`.
pub fn write_workbook(report: &LedgerReport, path: &Path) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let ledger_header = Format::new().set_bold().set_align(FormatAlign::Center);
    let summary_header = Format::new().set_bold();

    let ledger = workbook.add_worksheet();
    ledger.set_name(LEDGER_SHEET)?;
    write_rows(ledger, &report.ledger_rows, &ledger_header)?;
    for (col, width) in (0_u16..).zip(column_widths(&report.ledger_rows)) {
        ledger.set_column_width(col, width)?;
    }

    let summary = workbook.add_worksheet();
    summary.set_name(SUMMARY_SHEET)?;
    write_rows(summary, &report.summary_rows(), &summary_header)?;

    workbook.save(path)
}

/// Exports every record to a new workbook in `dir` and returns its path.
///
/// The workbook is first written beside the target as `.partial` and renamed
/// once complete; on failure the partial file is removed.
///
/// # Errors
/// * [`Error::NoData`] if the ledger is empty. No file is created.
/// * [`Error::Export`] if writing or renaming fails.
pub async fn export_ledger<C>(db: &C, dir: &Path, prefix: &str) -> Result<PathBuf>
where
    C: ConnectionTrait,
{
    let records = record::list_all_records(db).await?;
    if records.is_empty() {
        info!("Export skipped: ledger is empty");
        return Err(Error::NoData);
    }

    let report = build_report(&records);
    let path = dir.join(export_file_name(prefix, Local::now().naive_local()));
    let partial = path.with_extension("xlsx.partial");

    let written = write_workbook(&report, &partial)
        .map_err(ExportFailure::from)
        .and_then(|()| fs::rename(&partial, &path).map_err(ExportFailure::from));

    if let Err(source) = written {
        error!("Export to {:?} failed: {}", path, source);
        match fs::remove_file(&partial) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                warn!("Could not remove partial export {:?}: {}", partial, e);
            }
            _ => {}
        }
        return Err(Error::Export { path, source });
    }

    info!("Exported {} records to {:?}", report.total_count, path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::record::{RecordFields, insert_record};
    use crate::test_utils::*;
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use chrono::NaiveDate;

    fn sample_record(
        id: i64,
        name: &str,
        amount: i64,
        meal: i64,
        category: Category,
    ) -> record_entity::Model {
        record_entity::Model {
            id,
            name: name.to_string(),
            amount,
            meal_ticket: meal,
            category,
            note: String::new(),
            created_at: NaiveDate::from_ymd_opt(2024, 5, 18)
                .unwrap()
                .and_hms_opt(11, 30, 0)
                .unwrap(),
        }
    }

    fn sample_records() -> Vec<record_entity::Model> {
        // Newest first, as the store returns them
        vec![
            sample_record(4, "Choi", 30_000, 0, Category::Friend),
            sample_record(3, "Park", 100_000, 2, Category::Workplace),
            sample_record(2, "Lee", 50_000, 1, Category::Relative),
            sample_record(1, "Kim", 50_000, 2, Category::Friend),
        ]
    }

    #[test]
    fn test_build_report_numbers_rows_descending() {
        let report = build_report(&sample_records());

        assert_eq!(report.ledger_rows.len(), 5);
        assert_eq!(report.ledger_rows[0][0], Cell::text("No"));
        let numbers: Vec<&Cell> = report.ledger_rows[1..].iter().map(|r| &r[0]).collect();
        assert_eq!(
            numbers,
            vec![
                &Cell::Number(4),
                &Cell::Number(3),
                &Cell::Number(2),
                &Cell::Number(1)
            ]
        );
        assert_eq!(
            report.ledger_rows[1],
            vec![
                Cell::Number(4),
                Cell::Number(4),
                Cell::text("Choi"),
                Cell::Number(30_000),
                Cell::Number(0),
                Cell::text("Friend"),
                Cell::text(""),
                Cell::text("2024-05-18 11:30:00"),
            ]
        );
    }

    #[test]
    fn test_build_report_totals_and_categories() {
        let report = build_report(&sample_records());

        assert_eq!(report.total_count, 4);
        assert_eq!(report.total_amount, 230_000);
        assert_eq!(report.total_meal_tickets, 5);

        // First-seen order while walking newest to oldest
        assert_eq!(
            report.categories,
            vec![
                CategoryTotals {
                    category: Category::Friend,
                    count: 2,
                    amount: 80_000
                },
                CategoryTotals {
                    category: Category::Workplace,
                    count: 1,
                    amount: 100_000
                },
                CategoryTotals {
                    category: Category::Relative,
                    count: 1,
                    amount: 50_000
                },
            ]
        );

        let category_sum: i64 = report.categories.iter().map(|c| c.amount).sum();
        assert_eq!(category_sum, report.total_amount);
        assert_eq!(report.total_count as usize, report.ledger_rows.len() - 1);
    }

    #[test]
    fn test_build_report_saturates_huge_totals() {
        let records = vec![
            sample_record(2, "Lee", 5_000_000_000_000_000_000, i64::MAX, Category::Friend),
            sample_record(1, "Kim", 5_000_000_000_000_000_000, 1, Category::Friend),
        ];

        let report = build_report(&records);

        assert_eq!(report.total_count, 2);
        assert_eq!(report.total_amount, i64::MAX);
        assert_eq!(report.total_meal_tickets, i64::MAX);
        assert_eq!(report.categories[0].amount, i64::MAX);
    }

    #[test]
    fn test_summary_rows_layout() {
        let rows = build_report(&sample_records()).summary_rows();

        assert_eq!(rows.len(), 8);
        assert_eq!(
            rows[0],
            vec![
                Cell::text("Category"),
                Cell::text("Count"),
                Cell::text("Total Amount")
            ]
        );
        assert_eq!(
            rows[1],
            vec![
                Cell::text("Grand Total"),
                Cell::Number(4),
                Cell::Number(230_000)
            ]
        );
        assert_eq!(
            rows[2],
            vec![
                Cell::text("Total Meal Tickets"),
                Cell::Number(5),
                Cell::text("-")
            ]
        );
        assert_eq!(rows[3], vec![Cell::Empty, Cell::Empty, Cell::Empty]);
        assert_eq!(rows[4][0], Cell::text("[By Category]"));
        assert_eq!(rows[5][0], Cell::text("Friend"));
    }

    #[test]
    fn test_column_widths() {
        let rows = vec![
            vec![Cell::text("No"), Cell::text("Name")],
            vec![Cell::Number(12_345), Cell::text("Kim")],
        ];

        let widths = column_widths(&rows);
        assert_eq!(widths, vec![(5.0 + 2.0) * 1.2, (4.0 + 2.0) * 1.2]);
    }

    #[test]
    fn test_export_file_name() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 18)
            .unwrap()
            .and_hms_opt(9, 5, 59)
            .unwrap();
        assert_eq!(export_file_name("ledger", now), "ledger_20240518_0905.xlsx");
    }

    #[tokio::test]
    async fn test_export_empty_ledger_creates_no_file() -> Result<()> {
        let db = setup_test_db().await?;
        let dir = tempfile::TempDir::new()?;

        let result = export_ledger(&db, dir.path(), "ledger").await;
        assert!(matches!(result, Err(Error::NoData)));
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_export_writes_both_sheets() -> Result<()> {
        let db = setup_test_db().await?;
        let dir = tempfile::TempDir::new()?;

        insert_record(&db, test_fields("Kim", 50_000)).await?;
        insert_record(
            &db,
            RecordFields {
                category: Category::Workplace,
                meal_ticket: 2,
                ..test_fields("Park", 100_000)
            },
        )
        .await?;
        insert_record(&db, test_fields("Lee", 30_000)).await?;

        let path = export_ledger(&db, dir.path(), "ledger").await?;
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "xlsx");
        assert!(!path.with_extension("xlsx.partial").exists());

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec![LEDGER_SHEET.to_string(), SUMMARY_SHEET.to_string()]
        );

        let ledger = workbook.worksheet_range(LEDGER_SHEET).unwrap();
        assert_eq!(ledger.height(), 4);
        assert_eq!(
            ledger.get_value((0, 2)),
            Some(&Data::String("Name".to_string()))
        );
        // Newest record first, numbered 3
        assert_eq!(ledger.get_value((1, 0)), Some(&Data::Float(3.0)));
        assert_eq!(
            ledger.get_value((1, 2)),
            Some(&Data::String("Lee".to_string()))
        );

        let summary = workbook.worksheet_range(SUMMARY_SHEET).unwrap();
        assert_eq!(summary.get_value((1, 1)), Some(&Data::Float(3.0)));
        assert_eq!(summary.get_value((1, 2)), Some(&Data::Float(180_000.0)));
        // Meal tickets: Kim 1 + Park 2 + Lee 1
        assert_eq!(summary.get_value((2, 1)), Some(&Data::Float(4.0)));

        let category_total: f64 = (5..summary.height() as u32)
            .filter_map(|row| match summary.get_value((row, 2)) {
                Some(Data::Float(amount)) => Some(*amount),
                _ => None,
            })
            .sum();
        assert_eq!(category_total, 180_000.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_export_into_missing_directory_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let dir = tempfile::TempDir::new()?;
        insert_record(&db, test_fields("Kim", 50_000)).await?;

        let missing = dir.path().join("does").join("not").join("exist");
        let result = export_ledger(&db, &missing, "ledger").await;
        assert!(matches!(result, Err(Error::Export { .. })));
        assert!(!missing.exists());

        Ok(())
    }
}
