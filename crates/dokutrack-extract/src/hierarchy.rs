//! Hierarchy extractor.
//!
//! Walks the package anchors of a [`SheetLayout`] over a [`CellGrid`] and
//! builds the package / sub-document / document tree. Structure comes from
//! the layout, content from the grid: a blank anchor skips its whole
//! package, a blank title skips its sub-document, and a blank name cell
//! skips that one row. Unreadable date cells are recorded as warnings and
//! read as "no date", so one bad cell never takes down the extraction.

use chrono::NaiveDate;
use dokutrack_core::{
    Document, ExtractionWarning, Package, PackageLayout, SheetLayout, SubDocument, WarningKind,
};

use crate::dates::normalize_date;
use crate::grid::{column_index, CellGrid, CellRef};
use crate::status::classify_status;

/// Extract every configured package from the grid.
///
/// Packages whose anchor cell is blank are omitted entirely; the remaining
/// packages keep their configured ids, so a missing first package never
/// renumbers the others.
pub fn extract_packages(
    grid: &CellGrid,
    layout: &SheetLayout,
) -> (Vec<Package>, Vec<ExtractionWarning>) {
    let mut packages = Vec::new();
    let mut warnings = Vec::new();

    for package_layout in &layout.packages {
        if let Some(package) = extract_package(grid, layout, package_layout, &mut warnings) {
            tracing::debug!(
                id = %package.id,
                name = %package.name,
                sub_documents = package.sub_documents.len(),
                documents = package.total_documents,
                "extracted package"
            );
            packages.push(package);
        }
    }

    (packages, warnings)
}

fn extract_package(
    grid: &CellGrid,
    layout: &SheetLayout,
    package_layout: &PackageLayout,
    warnings: &mut Vec<ExtractionWarning>,
) -> Option<Package> {
    let name = grid.get_a1(&package_layout.name_cell);
    if name.is_empty() {
        tracing::debug!(
            id = %package_layout.id,
            anchor = %package_layout.name_cell,
            "package anchor is blank, skipping"
        );
        return None;
    }

    let mut sub_documents = Vec::new();
    for (index, sub_layout) in package_layout.sub_documents.iter().enumerate() {
        let title = grid.get_a1(&sub_layout.title_cell);
        if title.is_empty() {
            continue;
        }

        let mut documents = Vec::new();
        for row in sub_layout.doc_rows() {
            let doc_name = read_column(grid, &layout.name_column, row);
            if doc_name.is_empty() {
                continue;
            }

            let checklist = read_column(grid, &layout.columns.checklist, row);
            let attachment = read_column(grid, &layout.columns.attachment, row);
            documents.push(Document {
                name: doc_name.to_string(),
                checklist: checklist.to_string(),
                status: classify_status(checklist),
                received: read_date(grid, &layout.columns.received, row, warnings),
                completed: read_date(grid, &layout.columns.completed, row, warnings),
                follow_up: read_column(grid, &layout.columns.follow_up, row).to_string(),
                remarks: read_column(grid, &layout.columns.remarks, row).to_string(),
                attachment: (!attachment.is_empty()).then(|| attachment.to_string()),
            });
        }

        sub_documents.push(SubDocument::new(
            package_layout.sub_document_id(index),
            title,
            documents,
        ));
    }

    Some(Package::new(
        package_layout.id.clone(),
        name,
        sub_documents,
    ))
}

/// Cell text at a column letter and 1-based sheet row. A letter that does
/// not resolve reads as an absent column.
fn read_column<'g>(grid: &'g CellGrid, letter: &str, sheet_row: u32) -> &'g str {
    match column_index(letter) {
        Some(col) => grid.get(CellRef::at_sheet_row(sheet_row, col)),
        None => "",
    }
}

fn read_date(
    grid: &CellGrid,
    letter: &str,
    sheet_row: u32,
    warnings: &mut Vec<ExtractionWarning>,
) -> Option<NaiveDate> {
    let raw = read_column(grid, letter, sheet_row);
    if raw.is_empty() {
        return None;
    }
    let parsed = normalize_date(raw, None);
    if parsed.is_none() {
        let cell = format!("{letter}{sheet_row}");
        tracing::warn!(cell = %cell, raw, "unreadable date cell");
        warnings.push(ExtractionWarning::new(cell, WarningKind::InvalidDate, raw));
    }
    parsed
}

// ============================================================================
// Tests
// ============================================================================
