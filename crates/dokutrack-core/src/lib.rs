//! # dokutrack-core
//!
//! Core domain model and shared configuration for the dokutrack extraction
//! engine.
//!
//! This crate provides:
//! - Domain types: `Package`, `SubDocument`, `Document`, `TimelineEntry`
//! - Status and progress aggregation: `DocStatus`, `Progress`
//! - The extraction result: `Extraction`, `ExtractionWarning`
//! - Sheet coordinate configuration: `SheetLayout` (see [`layout`])
//!
//! ## Example
//!
//! ```rust
//! use dokutrack_core::{Document, DocStatus, Package, SubDocument};
//!
//! let docs = vec![
//!     Document::new("Kerangka Acuan Kerja").status(DocStatus::Completed),
//!     Document::new("Surat Permohonan"),
//! ];
//! let sub = SubDocument::new("1-1", "Balai", docs);
//! let package = Package::new("1", "Paket Pengadaan A", vec![sub]);
//!
//! assert_eq!(package.total_documents, 2);
//! assert_eq!(package.completed_documents, 1);
//! assert_eq!(package.progress_percentage, 50);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod layout;

pub use layout::{
    DocColumns, InfoCells, LayoutError, LayoutIssue, MonthBand, PackageLayout, SheetLayout,
    SubDocumentLayout,
};

// ============================================================================
// Type Aliases
// ============================================================================

/// Stable identifier for a package ("1", "2", "3", ...)
pub type PackageId = String;

/// Composite identifier for a sub-document (`{package}-{ordinal}`, e.g. "1-2")
pub type SubDocumentId = String;

// ============================================================================
// Status
// ============================================================================

/// Tracking status of a single document, derived from its checklist cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocStatus {
    /// The deliverable is done
    Completed,
    /// Work has started but is not finished
    InProgress,
    /// No evidence of work yet (also the default for empty cells)
    #[default]
    NotStarted,
}

impl DocStatus {
    /// Get the display string for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            DocStatus::Completed => "Completed",
            DocStatus::InProgress => "In Progress",
            DocStatus::NotStarted => "Not Started",
        }
    }
}

impl std::fmt::Display for DocStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Document
// ============================================================================

/// A single tracked deliverable (one spreadsheet row).
///
/// Rows with an empty name cell are never materialized as `Document`s, so
/// `name` is non-empty by construction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Deliverable name (row validity gate: blank-name rows are dropped)
    pub name: String,
    /// Raw checklist cell text the status was derived from
    pub checklist: String,
    /// Derived status, never empty
    pub status: DocStatus,
    /// Date the document was received, if the cell held a readable date
    pub received: Option<NaiveDate>,
    /// Date the document was completed, if the cell held a readable date
    pub completed: Option<NaiveDate>,
    /// Follow-up note (free text, may be empty)
    pub follow_up: String,
    /// Remarks (free text, may be empty)
    pub remarks: String,
    /// Attachment link or opaque reference, when present
    pub attachment: Option<String>,
}

impl Document {
    /// Create a new document with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the raw checklist text
    pub fn checklist(mut self, raw: impl Into<String>) -> Self {
        self.checklist = raw.into();
        self
    }

    /// Set the derived status
    pub fn status(mut self, status: DocStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the received date
    pub fn received(mut self, date: NaiveDate) -> Self {
        self.received = Some(date);
        self
    }

    /// Set the completed date
    pub fn completed(mut self, date: NaiveDate) -> Self {
        self.completed = Some(date);
        self
    }

    /// Set the follow-up note
    pub fn follow_up(mut self, text: impl Into<String>) -> Self {
        self.follow_up = text.into();
        self
    }

    /// Set the remarks text
    pub fn remarks(mut self, text: impl Into<String>) -> Self {
        self.remarks = text.into();
        self
    }

    /// Set the attachment link
    pub fn attachment(mut self, link: impl Into<String>) -> Self {
        self.attachment = Some(link.into());
        self
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Aggregate completion counters for a group of documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Number of documents in the group
    pub total: usize,
    /// Documents with status `Completed`
    pub completed: usize,
    /// Documents with status `InProgress`
    pub in_progress: usize,
    /// `round(completed / total * 100)`, or 0 when the group is empty
    pub percentage: u8,
}

impl Progress {
    /// Count statuses across a document list.
    ///
    /// An empty list yields all-zero progress; the percentage never divides
    /// by zero.
    pub fn from_documents(documents: &[Document]) -> Self {
        let total = documents.len();
        let completed = documents
            .iter()
            .filter(|d| d.status == DocStatus::Completed)
            .count();
        let in_progress = documents
            .iter()
            .filter(|d| d.status == DocStatus::InProgress)
            .count();

        Self {
            total,
            completed,
            in_progress,
            percentage: percentage(completed, total),
        }
    }
}

/// Shared percentage rule: `round(part / whole * 100)`, 0 for an empty whole.
fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u8
    }
}

// ============================================================================
// SubDocument
// ============================================================================

/// A named group of documents within one package.
///
/// Created only when its title cell is non-empty; document order is strictly
/// row order in the source sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubDocument {
    /// Composite key `{package}-{ordinal}`
    pub id: SubDocumentId,
    /// Group title from the sheet (non-empty)
    pub title: String,
    /// Documents in row order
    pub documents: Vec<Document>,
    /// Aggregate over `documents`
    pub progress: Progress,
}

impl SubDocument {
    /// Create a sub-document, computing its progress from the document list
    pub fn new(
        id: impl Into<SubDocumentId>,
        title: impl Into<String>,
        documents: Vec<Document>,
    ) -> Self {
        let progress = Progress::from_documents(&documents);
        Self {
            id: id.into(),
            title: title.into(),
            documents,
            progress,
        }
    }
}

// ============================================================================
// Package
// ============================================================================

/// A top-level procurement grouping.
///
/// Package ids come from fixed positions in the sheet layout, not from a
/// discovered count; a sheet may hold fewer packages than the layout maps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Stable small-integer-like id ("1", "2", "3")
    pub id: PackageId,
    /// Package name from its anchor cell (non-empty)
    pub name: String,
    /// Sub-documents in configuration order
    pub sub_documents: Vec<SubDocument>,
    /// Documents across all sub-documents
    pub total_documents: usize,
    /// Completed documents across all sub-documents
    pub completed_documents: usize,
    /// Same rounding and divide-by-zero rule as [`Progress`]
    pub progress_percentage: u8,
}

impl Package {
    /// Create a package, aggregating counters across its sub-documents
    pub fn new(
        id: impl Into<PackageId>,
        name: impl Into<String>,
        sub_documents: Vec<SubDocument>,
    ) -> Self {
        let total_documents: usize = sub_documents.iter().map(|s| s.progress.total).sum();
        let completed_documents: usize = sub_documents.iter().map(|s| s.progress.completed).sum();

        Self {
            id: id.into(),
            name: name.into(),
            sub_documents,
            total_documents,
            completed_documents,
            progress_percentage: percentage(completed_documents, total_documents),
        }
    }

    /// Get a sub-document by its composite id
    pub fn sub_document(&self, id: &str) -> Option<&SubDocument> {
        self.sub_documents.iter().find(|s| s.id == id)
    }
}

// ============================================================================
// Timeline
// ============================================================================

/// One detected check-mark event in the day-column band.
///
/// An entry exists only when a recognized mark was found *and* the day header
/// in the same column parsed to a valid date; absence of a mark produces no
/// entry at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Calendar date of the mark
    pub date: NaiveDate,
    /// Human label of the month band the column fell in ("September 2025")
    pub month_label: String,
    /// Document row text at scan time (denormalized, not a foreign key)
    pub document_name: String,
    /// Owning package
    pub package_id: PackageId,
    /// Owning sub-document
    pub sub_document_id: SubDocumentId,
    /// Zero-based position within the *configured* timeline row list.
    /// Blank rows are skipped without re-indexing, so this stays aligned with
    /// the layout even when rows in between carry no document.
    pub document_index: usize,
    /// Always true for entries that exist
    pub has_mark: bool,
}

// ============================================================================
// Sheet Info
// ============================================================================

/// Header fields read from fixed info cells (project name, fiscal year).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetInfo {
    /// Overall project / procurement name
    pub project_name: String,
    /// Fiscal year label
    pub fiscal_year: String,
}

// ============================================================================
// Monthly Marks
// ============================================================================

/// Calendar view of one month band for a single sub-document.
///
/// `dates` maps each marked date to `true`; unmarked days are simply absent.
/// The ordered map keeps rendering deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyMarks {
    /// Band label ("September 2025")
    pub label: String,
    /// Calendar year of the band
    pub year: i32,
    /// Calendar month of the band (1-12)
    pub month: u32,
    /// Marked dates within the band
    pub dates: BTreeMap<NaiveDate, bool>,
}

impl MonthlyMarks {
    /// Dates that carry a mark, in calendar order
    pub fn marked_dates(&self) -> Vec<NaiveDate> {
        self.dates
            .iter()
            .filter(|(_, marked)| **marked)
            .map(|(date, _)| *date)
            .collect()
    }
}

// ============================================================================
// Warnings
// ============================================================================

/// Category of a recoverable extraction anomaly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A date cell held text no recognized format could parse
    InvalidDate,
    /// A marked column's day-header cell was blank
    BlankDayHeader,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::InvalidDate => write!(f, "invalid date"),
            WarningKind::BlankDayHeader => write!(f, "blank day header"),
        }
    }
}

/// A recoverable data-quality gap recorded during extraction.
///
/// The affected row or mark is omitted from the model; the warning preserves
/// where and why so callers and tests can assert on data quality instead of
/// scraping logs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    /// A1-style label of the offending cell
    pub cell: String,
    /// Anomaly category
    pub kind: WarningKind,
    /// The raw text that could not be used, or nearby context
    pub detail: String,
}

impl ExtractionWarning {
    /// Create a warning for the given cell
    pub fn new(cell: impl Into<String>, kind: WarningKind, detail: impl Into<String>) -> Self {
        Self {
            cell: cell.into(),
            kind,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}: {:?}", self.kind, self.cell, self.detail)
    }
}

// ============================================================================
// Extraction Result
// ============================================================================

/// The complete result of one extraction run over a grid.
///
/// Produced fresh per run; nothing is mutated in place afterwards and no
/// entity holds a back-reference to its parent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Header info cells
    pub info: SheetInfo,
    /// Packages in anchor order
    pub packages: Vec<Package>,
    /// Timeline entries ordered by date (discovery order within a date)
    pub timeline: Vec<TimelineEntry>,
    /// Recoverable anomalies encountered along the way
    pub warnings: Vec<ExtractionWarning>,
}

impl Extraction {
    /// Get a package by id
    pub fn package(&self, id: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.id == id)
    }

    /// Get a sub-document by package id and composite sub-document id
    pub fn sub_document(&self, package_id: &str, sub_document_id: &str) -> Option<&SubDocument> {
        self.package(package_id)
            .and_then(|p| p.sub_document(sub_document_id))
    }

    /// Timeline entries belonging to one sub-document
    pub fn timeline_for(&self, package_id: &str, sub_document_id: &str) -> Vec<&TimelineEntry> {
        self.timeline
            .iter()
            .filter(|e| e.package_id == package_id && e.sub_document_id == sub_document_id)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn status_display() {
        assert_eq!(DocStatus::Completed.as_str(), "Completed");
        assert_eq!(DocStatus::InProgress.as_str(), "In Progress");
        assert_eq!(DocStatus::NotStarted.as_str(), "Not Started");
        assert_eq!(format!("{}", DocStatus::InProgress), "In Progress");
    }

    #[test]
    fn status_defaults_to_not_started() {
        assert_eq!(DocStatus::default(), DocStatus::NotStarted);
        assert_eq!(Document::new("Dok").status, DocStatus::NotStarted);
    }

    #[test]
    fn document_builder() {
        let doc = Document::new("Kerangka Acuan Kerja")
            .checklist("v")
            .status(DocStatus::Completed)
            .received(date(2025, 9, 1))
            .completed(date(2025, 9, 5))
            .follow_up("kirim ke balai")
            .remarks("rev 2")
            .attachment("https://drive.example/kak");

        assert_eq!(doc.name, "Kerangka Acuan Kerja");
        assert_eq!(doc.checklist, "v");
        assert_eq!(doc.status, DocStatus::Completed);
        assert_eq!(doc.received, Some(date(2025, 9, 1)));
        assert_eq!(doc.completed, Some(date(2025, 9, 5)));
        assert_eq!(doc.follow_up, "kirim ke balai");
        assert_eq!(doc.remarks, "rev 2");
        assert_eq!(doc.attachment.as_deref(), Some("https://drive.example/kak"));
    }

    #[test]
    fn progress_counts_statuses() {
        let docs = vec![
            Document::new("a").status(DocStatus::Completed),
            Document::new("b").status(DocStatus::InProgress),
            Document::new("c"),
            Document::new("d").status(DocStatus::Completed),
        ];

        let progress = Progress::from_documents(&docs);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.in_progress, 1);
        assert_eq!(progress.percentage, 50);
    }

    #[test]
    fn progress_empty_group_has_zero_percentage() {
        let progress = Progress::from_documents(&[]);
        assert_eq!(progress.total, 0);
        assert_eq!(progress.percentage, 0);
    }

    #[test]
    fn progress_percentage_rounds() {
        // 1 of 3 -> 33, 2 of 3 -> 67
        let one_of_three = vec![
            Document::new("a").status(DocStatus::Completed),
            Document::new("b"),
            Document::new("c"),
        ];
        assert_eq!(Progress::from_documents(&one_of_three).percentage, 33);

        let two_of_three = vec![
            Document::new("a").status(DocStatus::Completed),
            Document::new("b").status(DocStatus::Completed),
            Document::new("c"),
        ];
        assert_eq!(Progress::from_documents(&two_of_three).percentage, 67);
    }

    #[test]
    fn sub_document_computes_progress_on_creation() {
        let sub = SubDocument::new(
            "1-1",
            "Balai",
            vec![
                Document::new("Dok 1").status(DocStatus::Completed),
                Document::new("Dok 2"),
            ],
        );

        assert_eq!(sub.id, "1-1");
        assert_eq!(sub.title, "Balai");
        assert_eq!(sub.progress.total, 2);
        assert_eq!(sub.progress.percentage, 50);
    }

    #[test]
    fn package_aggregates_across_sub_documents() {
        let package = Package::new(
            "1",
            "Paket A",
            vec![
                SubDocument::new(
                    "1-1",
                    "Balai",
                    vec![
                        Document::new("Dok 1").status(DocStatus::Completed),
                        Document::new("Dok 2").status(DocStatus::Completed),
                    ],
                ),
                SubDocument::new(
                    "1-2",
                    "Irigasi",
                    vec![
                        Document::new("Dok 3"),
                        Document::new("Dok 4").status(DocStatus::InProgress),
                    ],
                ),
            ],
        );

        assert_eq!(package.total_documents, 4);
        assert_eq!(package.completed_documents, 2);
        assert_eq!(package.progress_percentage, 50);
        assert_eq!(package.sub_document("1-2").map(|s| s.title.as_str()), Some("Irigasi"));
        assert!(package.sub_document("1-9").is_none());
    }

    #[test]
    fn package_with_no_documents_has_zero_percentage() {
        let package = Package::new("2", "Paket Kosong", Vec::new());
        assert_eq!(package.total_documents, 0);
        assert_eq!(package.progress_percentage, 0);
    }

    #[test]
    fn extraction_lookups() {
        let extraction = Extraction {
            info: SheetInfo::default(),
            packages: vec![Package::new(
                "1",
                "Paket A",
                vec![SubDocument::new("1-1", "Balai", vec![Document::new("Dok")])],
            )],
            timeline: vec![TimelineEntry {
                date: date(2025, 9, 1),
                month_label: "September 2025".into(),
                document_name: "Dok".into(),
                package_id: "1".into(),
                sub_document_id: "1-1".into(),
                document_index: 0,
                has_mark: true,
            }],
            warnings: Vec::new(),
        };

        assert!(extraction.package("1").is_some());
        assert!(extraction.package("2").is_none());
        assert!(extraction.sub_document("1", "1-1").is_some());
        assert!(extraction.sub_document("1", "1-2").is_none());
        assert_eq!(extraction.timeline_for("1", "1-1").len(), 1);
        assert_eq!(extraction.timeline_for("1", "1-2").len(), 0);
    }

    #[test]
    fn monthly_marks_lists_marked_dates_in_order() {
        let mut dates = BTreeMap::new();
        dates.insert(date(2025, 9, 15), true);
        dates.insert(date(2025, 9, 2), true);
        dates.insert(date(2025, 9, 20), false);

        let marks = MonthlyMarks {
            label: "September 2025".into(),
            year: 2025,
            month: 9,
            dates,
        };

        assert_eq!(marks.marked_dates(), vec![date(2025, 9, 2), date(2025, 9, 15)]);
    }

    #[test]
    fn warning_display() {
        let warning = ExtractionWarning::new("G12", WarningKind::InvalidDate, "besok");
        assert_eq!(format!("{}", warning), "invalid date at G12: \"besok\"");
    }

    #[test]
    fn domain_types_round_trip_as_json() {
        let package = Package::new(
            "1",
            "Paket A",
            vec![SubDocument::new(
                "1-1",
                "Balai",
                vec![Document::new("Dok 1")
                    .checklist("50%")
                    .status(DocStatus::InProgress)],
            )],
        );

        let json = serde_json::to_string(&package).unwrap();
        let back: Package = serde_json::from_str(&json).unwrap();
        assert_eq!(back, package);
    }
}
