//! Timeline scanner.
//!
//! Sweeps the check-mark band: for every configured timeline row that has a
//! document name, every marked column becomes one [`TimelineEntry`] dated by
//! the day-number header above it. The scanner reads the same [`SheetLayout`]
//! as the hierarchy extractor but walks `timeline_rows`, not the document-row
//! ranges, because the historical sheet keeps the two maps separately.

use dokutrack_core::{ExtractionWarning, SheetLayout, TimelineEntry, WarningKind};

use crate::dates::normalize_date;
use crate::grid::{column_index, CellGrid, CellRef};
use crate::status::has_check_mark;

/// Scan the mark band for every configured package and sub-document.
///
/// `document_index` on each entry is the row's position in the configured
/// row list. Rows with a blank name cell produce no entries but still hold
/// their position, so the indices of later rows never shift; consumers that
/// join against the compacted hierarchy must match on names or dates, not
/// on index.
///
/// Entries come back sorted by date; entries sharing a date keep scan order
/// (row-major through the configuration, then column order within a row).
pub fn extract_timeline(
    grid: &CellGrid,
    layout: &SheetLayout,
) -> (Vec<TimelineEntry>, Vec<ExtractionWarning>) {
    let mut entries = Vec::new();
    let mut warnings = Vec::new();
    let name_col = column_index(&layout.name_column);

    for package in &layout.packages {
        for (sub_index, sub) in package.sub_documents.iter().enumerate() {
            let sub_document_id = package.sub_document_id(sub_index);

            for (document_index, &row) in sub.timeline_rows.iter().enumerate() {
                let document_name = match name_col {
                    Some(col) => grid.get(CellRef::at_sheet_row(row, col)),
                    None => "",
                };
                if document_name.is_empty() {
                    continue;
                }

                for band in &layout.months {
                    for col in band.columns() {
                        let mark_cell = CellRef::at_sheet_row(row, col);
                        if !has_check_mark(grid.get(mark_cell)) {
                            continue;
                        }

                        let day_cell = CellRef::at_sheet_row(layout.day_header_row, col);
                        let day_raw = grid.get(day_cell);
                        if day_raw.is_empty() {
                            tracing::warn!(
                                cell = %day_cell,
                                mark = %mark_cell,
                                "marked column has a blank day header"
                            );
                            warnings.push(ExtractionWarning::new(
                                day_cell.label(),
                                WarningKind::BlankDayHeader,
                                format!("mark at {mark_cell}"),
                            ));
                            continue;
                        }

                        match normalize_date(day_raw, Some((band.year, band.month))) {
                            Some(date) => entries.push(TimelineEntry {
                                date,
                                month_label: band.label.clone(),
                                document_name: document_name.to_string(),
                                package_id: package.id.clone(),
                                sub_document_id: sub_document_id.clone(),
                                document_index,
                                has_mark: true,
                            }),
                            None => {
                                tracing::warn!(
                                    cell = %day_cell,
                                    raw = day_raw,
                                    "marked column has an unreadable day header"
                                );
                                warnings.push(ExtractionWarning::new(
                                    day_cell.label(),
                                    WarningKind::InvalidDate,
                                    day_raw,
                                ));
                            }
                        }
                    }
                }
            }
        }
    }

    entries.sort_by_key(|entry| entry.date);
    tracing::debug!(
        entries = entries.len(),
        warnings = warnings.len(),
        "scanned timeline band"
    );
    (entries, warnings)
}

// ============================================================================
// Tests
// ============================================================================
