//! # dokutrack-extract
//!
//! Spreadsheet-to-domain-model extraction engine for the dokutrack
//! document-progress dashboard.
//!
//! This crate provides:
//! - [`CellGrid`]: one sparse coordinate space over interchangeable sources
//!   (workbook bytes, CSV text, or a published sheet fetched over HTTP)
//! - [`normalize_date`] / [`display_date`]: tolerant date reading, serial
//!   numbers included
//! - [`classify_status`] / [`has_check_mark`]: checklist-cell heuristics
//! - [`extract_packages`] / [`extract_timeline`]: the hierarchy and the
//!   check-mark schedule
//! - [`extract_all`]: the whole sheet in one call
//!
//! ## Example
//!
//! ```rust
//! use dokutrack_core::SheetLayout;
//! use dokutrack_extract::{extract_all, CellGrid};
//!
//! // Sheet rows 1-8 are banner rows; the first package anchors at C9.
//! let csv = "\n\n\n\n\n\n\n\n,,Paket A,Balai\n,,,,Dok 1,v\n,,,,Dok 2\n";
//! let grid = CellGrid::from_csv_text(csv).unwrap();
//!
//! let extraction = extract_all(&grid, &SheetLayout::default());
//! assert_eq!(extraction.packages.len(), 1);
//! assert_eq!(extraction.packages[0].total_documents, 2);
//! assert_eq!(extraction.packages[0].progress_percentage, 50);
//! ```

use std::collections::BTreeMap;

use dokutrack_core::{Extraction, MonthlyMarks, SheetInfo, SheetLayout, TimelineEntry};

pub mod dates;
pub mod grid;
pub mod hierarchy;
pub mod remote;
pub mod status;
pub mod timeline;

pub use dates::{display_date, normalize_date};
pub use grid::{column_index, column_letter, CellGrid, CellRef, GridError};
pub use hierarchy::extract_packages;
pub use remote::{FetchError, RemoteSheet};
pub use status::{classify_status, has_check_mark};
pub use timeline::extract_timeline;

/// Read the fixed header cells.
pub fn sheet_info(grid: &CellGrid, layout: &SheetLayout) -> SheetInfo {
    SheetInfo {
        project_name: grid.get_a1(&layout.info.project_name_cell).to_string(),
        fiscal_year: grid.get_a1(&layout.info.fiscal_year_cell).to_string(),
    }
}

/// Extract everything the sheet holds: header info, the package hierarchy,
/// the timeline, and the merged warnings from both extractors.
pub fn extract_all(grid: &CellGrid, layout: &SheetLayout) -> Extraction {
    let info = sheet_info(grid, layout);
    let (packages, mut warnings) = extract_packages(grid, layout);
    let (timeline, timeline_warnings) = extract_timeline(grid, layout);
    warnings.extend(timeline_warnings);

    tracing::debug!(
        packages = packages.len(),
        timeline = timeline.len(),
        warnings = warnings.len(),
        "extraction complete"
    );
    Extraction {
        info,
        packages,
        timeline,
        warnings,
    }
}

/// Calendar view of one sub-document: one [`MonthlyMarks`] per configured
/// month band, holding the dates of that sub-document's timeline entries.
///
/// Every band is present in the output even when it has no marks, so a
/// month-per-column rendering stays aligned across sub-documents.
pub fn monthly_marks(
    timeline: &[TimelineEntry],
    layout: &SheetLayout,
    package_id: &str,
    sub_document_id: &str,
) -> Vec<MonthlyMarks> {
    layout
        .months
        .iter()
        .map(|band| {
            let mut dates = BTreeMap::new();
            for entry in timeline {
                if entry.month_label == band.label
                    && entry.package_id == package_id
                    && entry.sub_document_id == sub_document_id
                {
                    dates.insert(entry.date, entry.has_mark);
                }
            }
            MonthlyMarks {
                label: band.label.clone(),
                year: band.year,
                month: band.month,
                dates,
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
