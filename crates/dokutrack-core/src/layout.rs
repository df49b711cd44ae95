//! Sheet coordinate configuration.
//!
//! The tracking sheet has a fixed but idiosyncratic shape: package names at
//! known anchor cells, sub-document titles at known cells, document rows in
//! known ranges, and a three-month check-mark band with a day-number header
//! row. [`SheetLayout`] captures all of it in one structure consumed by both
//! the hierarchy extractor and the timeline scanner, so the two can never
//! drift apart silently. The shipped [`Default`] reproduces the historical
//! sheet exactly, including sub-documents whose document rows and timeline
//! rows disagree; [`SheetLayout::validate`] reports those divergences instead
//! of reconciling them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

use crate::{PackageId, SubDocumentId};

// ============================================================================
// Structure
// ============================================================================

/// Header info cell addresses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoCells {
    /// Cell holding the overall project name
    pub project_name_cell: String,
    /// Cell holding the fiscal year label
    pub fiscal_year_cell: String,
}

/// Column letters for the per-document detail cells, shared by every row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocColumns {
    /// Status-marker text
    pub checklist: String,
    /// Received date
    pub received: String,
    /// Completed date
    pub completed: String,
    /// Follow-up note
    pub follow_up: String,
    /// Remarks
    pub remarks: String,
    /// Attachment link
    pub attachment: String,
}

/// One sub-document block: a title anchor plus two row maps.
///
/// `first_doc_row..=last_doc_row` feeds the hierarchy extractor;
/// `timeline_rows` feeds the timeline scanner. They usually agree but are
/// allowed to diverge because the historical sheet maintained them
/// separately.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubDocumentLayout {
    /// Cell holding the sub-document title (creation gate)
    pub title_cell: String,
    /// First document row (1-based, inclusive)
    pub first_doc_row: u32,
    /// Last document row (1-based, inclusive)
    pub last_doc_row: u32,
    /// Absolute rows scanned for timeline marks (1-based)
    pub timeline_rows: Vec<u32>,
}

impl SubDocumentLayout {
    /// Create a sub-document block
    pub fn new(
        title_cell: impl Into<String>,
        first_doc_row: u32,
        last_doc_row: u32,
        timeline_rows: Vec<u32>,
    ) -> Self {
        Self {
            title_cell: title_cell.into(),
            first_doc_row,
            last_doc_row,
            timeline_rows,
        }
    }

    /// Document rows as an inclusive range
    pub fn doc_rows(&self) -> RangeInclusive<u32> {
        self.first_doc_row..=self.last_doc_row
    }
}

/// One package block: a name anchor and its sub-documents in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageLayout {
    /// Stable package id ("1", "2", "3")
    pub id: PackageId,
    /// Cell holding the package name (skip gate for the whole package)
    pub name_cell: String,
    /// Sub-document blocks in sheet order
    pub sub_documents: Vec<SubDocumentLayout>,
}

impl PackageLayout {
    /// Composite id of the sub-document at `index`: `{package}-{ordinal}`
    pub fn sub_document_id(&self, index: usize) -> SubDocumentId {
        format!("{}-{}", self.id, index + 1)
    }
}

/// One calendar month of the check-mark band.
///
/// Column indices are 0-based and inclusive; the year/month pair supplies
/// the context for bare day-number headers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBand {
    /// Human label used on timeline entries ("September 2025")
    pub label: String,
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: u32,
    /// First column of the band (0-based)
    pub first_col: u32,
    /// Last column of the band (0-based, inclusive)
    pub last_col: u32,
}

impl MonthBand {
    /// Create a month band
    pub fn new(label: impl Into<String>, year: i32, month: u32, first_col: u32, last_col: u32) -> Self {
        Self {
            label: label.into(),
            year,
            month,
            first_col,
            last_col,
        }
    }

    /// Band columns as an inclusive range
    pub fn columns(&self) -> RangeInclusive<u32> {
        self.first_col..=self.last_col
    }
}

/// The full coordinate map for one sheet family.
///
/// Loadable from TOML so a re-mapped sheet only needs a config change, not a
/// recompile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Column letter of the document-name cells (row validity gate)
    pub name_column: String,
    /// 1-based row holding the day-of-month numbers above the mark band
    pub day_header_row: u32,
    /// Header info cells
    pub info: InfoCells,
    /// Detail columns shared by every document row
    pub columns: DocColumns,
    /// Package blocks in anchor order
    pub packages: Vec<PackageLayout>,
    /// Month bands in column order
    pub months: Vec<MonthBand>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            name_column: "E".into(),
            day_header_row: 9,
            info: InfoCells {
                project_name_cell: "D2".into(),
                fiscal_year_cell: "D3".into(),
            },
            columns: DocColumns {
                checklist: "F".into(),
                received: "G".into(),
                completed: "H".into(),
                follow_up: "I".into(),
                remarks: "J".into(),
                attachment: "K".into(),
            },
            packages: vec![
                PackageLayout {
                    id: "1".into(),
                    name_cell: "C9".into(),
                    sub_documents: vec![
                        SubDocumentLayout::new("D9", 10, 18, (10..=18).collect()),
                        SubDocumentLayout::new("D21", 22, 28, (22..=28).collect()),
                        SubDocumentLayout::new("D31", 32, 33, vec![31, 32]),
                    ],
                },
                PackageLayout {
                    id: "2".into(),
                    name_cell: "C38".into(),
                    sub_documents: vec![
                        SubDocumentLayout::new("D38", 39, 47, (36..=44).collect()),
                        SubDocumentLayout::new("D50", 51, 57, (48..=54).collect()),
                        SubDocumentLayout::new("D60", 61, 62, vec![57, 58]),
                    ],
                },
                PackageLayout {
                    id: "3".into(),
                    name_cell: "C67".into(),
                    sub_documents: vec![
                        SubDocumentLayout::new("D67", 68, 76, (62..=70).collect()),
                        SubDocumentLayout::new("D79", 80, 86, (74..=80).collect()),
                        SubDocumentLayout::new("D89", 90, 91, vec![83, 84]),
                    ],
                },
            ],
            months: vec![
                MonthBand::new("September 2025", 2025, 9, 11, 33),
                MonthBand::new("Oktober 2025", 2025, 10, 34, 64),
                MonthBand::new("November 2025", 2025, 11, 65, 94),
            ],
        }
    }
}

impl SheetLayout {
    /// Parse a layout from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, LayoutError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a layout from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check the layout for internal problems.
    ///
    /// Intended to run once at startup. Returns every issue found; an empty
    /// list means the layout is clean. Divergent row maps are reported, never
    /// auto-reconciled, because existing sheets may depend on either side.
    pub fn validate(&self) -> Vec<LayoutIssue> {
        let mut issues = Vec::new();

        let mut seen_ids = HashSet::new();
        for package in &self.packages {
            if !seen_ids.insert(package.id.clone()) {
                issues.push(LayoutIssue::DuplicatePackageId {
                    id: package.id.clone(),
                });
            }

            for (index, sub) in package.sub_documents.iter().enumerate() {
                let sub_document_id = package.sub_document_id(index);

                if sub.timeline_rows.is_empty() || sub.first_doc_row > sub.last_doc_row {
                    issues.push(LayoutIssue::EmptyRows {
                        package_id: package.id.clone(),
                        sub_document_id: sub_document_id.clone(),
                    });
                }

                let doc_rows: Vec<u32> = sub.doc_rows().collect();
                let mut timeline_sorted = sub.timeline_rows.clone();
                timeline_sorted.sort_unstable();
                timeline_sorted.dedup();
                if doc_rows != timeline_sorted {
                    issues.push(LayoutIssue::RowMapDivergence {
                        package_id: package.id.clone(),
                        sub_document_id,
                        doc_rows,
                        timeline_rows: sub.timeline_rows.clone(),
                    });
                }
            }
        }

        for (i, a) in self.months.iter().enumerate() {
            for b in &self.months[i + 1..] {
                if a.first_col <= b.last_col && b.first_col <= a.last_col {
                    issues.push(LayoutIssue::OverlappingBands {
                        first: a.label.clone(),
                        second: b.label.clone(),
                    });
                }
            }
        }

        issues
    }
}

// ============================================================================
// Validation Issues
// ============================================================================

/// One problem found by [`SheetLayout::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutIssue {
    /// Two package blocks share an id
    DuplicatePackageId { id: PackageId },
    /// A sub-document has no usable rows on one of its maps
    EmptyRows {
        package_id: PackageId,
        sub_document_id: SubDocumentId,
    },
    /// A sub-document's document rows and timeline rows disagree
    RowMapDivergence {
        package_id: PackageId,
        sub_document_id: SubDocumentId,
        doc_rows: Vec<u32>,
        timeline_rows: Vec<u32>,
    },
    /// Two month bands claim the same columns
    OverlappingBands { first: String, second: String },
}

impl std::fmt::Display for LayoutIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutIssue::DuplicatePackageId { id } => {
                write!(f, "duplicate package id {id}")
            }
            LayoutIssue::EmptyRows {
                package_id,
                sub_document_id,
            } => {
                write!(
                    f,
                    "package {package_id} sub-document {sub_document_id} has no usable rows"
                )
            }
            LayoutIssue::RowMapDivergence {
                package_id,
                sub_document_id,
                doc_rows,
                timeline_rows,
            } => {
                write!(
                    f,
                    "package {package_id} sub-document {sub_document_id}: document rows {doc_rows:?} differ from timeline rows {timeline_rows:?}"
                )
            }
            LayoutIssue::OverlappingBands { first, second } => {
                write!(f, "month bands {first:?} and {second:?} overlap")
            }
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Layout loading error
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("cannot read layout file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse layout: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Tests
// ============================================================================
