//! # dokutrack-store
//!
//! User-annotation persistence for the dokutrack dashboard: attachment links
//! and manually scheduled timeline dates, the two record kinds the dashboard
//! lets users write back. Extracted sheet data never lands here; annotations
//! are keyed against it and joined by the presentation layer.
//!
//! This crate provides:
//! - Record types: [`DocumentLink`], [`TimelineSchedule`]
//! - The [`AnnotationStore`] trait over both kinds
//! - [`MemoryStore`]: deterministic in-process store for tests and offline use
//! - [`RestStore`]: PostgREST-style HTTP client
//!
//! ## Example
//!
//! ```rust
//! use dokutrack_store::{AnnotationStore, DocumentLink, LinkFilter, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let link = DocumentLink::new("1", "1-1-0", "Kerangka Acuan Kerja", "https://drive.example/kak");
//! let stored = store.add_link(link).unwrap();
//! assert!(stored.id.is_some());
//!
//! let links = store.links(&LinkFilter::package("1")).unwrap();
//! assert_eq!(links.len(), 1);
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dokutrack_core::{PackageId, SubDocumentId};

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

/// Opaque per-document key chosen by the caller; the store never parses it.
pub type DocumentKey = String;

// ============================================================================
// Records
// ============================================================================

/// An attachment link a user pinned to one document.
///
/// At most one link exists per `(package_id, document_id)`; adding another
/// replaces it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLink {
    /// Store-assigned row id; `None` until the record is persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub package_id: PackageId,
    pub document_id: DocumentKey,
    /// Display name captured at link time; survives later renames in the sheet
    pub document_name: String,
    pub link_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DocumentLink {
    /// Create an unpersisted link record
    pub fn new(
        package_id: impl Into<PackageId>,
        document_id: impl Into<DocumentKey>,
        document_name: impl Into<String>,
        link_url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            package_id: package_id.into(),
            document_id: document_id.into(),
            document_name: document_name.into(),
            link_url: link_url.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// A manually scheduled timeline date for one document.
///
/// At most one row exists per
/// `(package_id, sub_document_id, document_id, scheduled_date)`; adding the
/// same combination again replaces it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSchedule {
    /// Store-assigned row id; `None` until the record is persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub package_id: PackageId,
    pub sub_document_id: SubDocumentId,
    pub document_id: DocumentKey,
    /// Display name captured at scheduling time
    pub document_name: String,
    pub scheduled_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TimelineSchedule {
    /// Create an unpersisted schedule record
    pub fn new(
        package_id: impl Into<PackageId>,
        sub_document_id: impl Into<SubDocumentId>,
        document_id: impl Into<DocumentKey>,
        document_name: impl Into<String>,
        scheduled_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            package_id: package_id.into(),
            sub_document_id: sub_document_id.into(),
            document_id: document_id.into(),
            document_name: document_name.into(),
            scheduled_date,
            created_at: None,
            updated_at: None,
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Query filter for links: a package, optionally narrowed to one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkFilter {
    pub package_id: PackageId,
    pub document_id: Option<DocumentKey>,
}

impl LinkFilter {
    /// All links of one package
    pub fn package(package_id: impl Into<PackageId>) -> Self {
        Self {
            package_id: package_id.into(),
            document_id: None,
        }
    }

    /// Narrow to one document
    pub fn document(mut self, document_id: impl Into<DocumentKey>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }
}

/// Query filter for schedules: a package, optionally narrowed further.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleFilter {
    pub package_id: PackageId,
    pub sub_document_id: Option<SubDocumentId>,
    pub document_id: Option<DocumentKey>,
}

impl ScheduleFilter {
    /// All schedules of one package
    pub fn package(package_id: impl Into<PackageId>) -> Self {
        Self {
            package_id: package_id.into(),
            sub_document_id: None,
            document_id: None,
        }
    }

    /// Narrow to one sub-document
    pub fn sub_document(mut self, sub_document_id: impl Into<SubDocumentId>) -> Self {
        self.sub_document_id = Some(sub_document_id.into());
        self
    }

    /// Narrow to one document
    pub fn document(mut self, document_id: impl Into<DocumentKey>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }
}

// ============================================================================
// Store Trait
// ============================================================================

/// Persistence operations for both annotation kinds.
///
/// Implementations replace on add (per the record keys above), return links
/// newest-updated first and schedules by scheduled date descending, and treat
/// deleting an unknown id as a no-op.
pub trait AnnotationStore {
    /// Persist a link, replacing any existing link for the same
    /// `(package_id, document_id)`. Returns the stored record with its id.
    fn add_link(&self, link: DocumentLink) -> Result<DocumentLink, StoreError>;

    /// Links matching the filter, newest-updated first
    fn links(&self, filter: &LinkFilter) -> Result<Vec<DocumentLink>, StoreError>;

    /// The link for one exact `(package_id, document_id)`, if any
    fn link(&self, package_id: &str, document_id: &str)
        -> Result<Option<DocumentLink>, StoreError>;

    /// Delete a link by store id
    fn delete_link(&self, id: i64) -> Result<(), StoreError>;

    /// Persist a schedule, replacing any row with the same
    /// `(package_id, sub_document_id, document_id, scheduled_date)`.
    fn add_schedule(&self, schedule: TimelineSchedule) -> Result<TimelineSchedule, StoreError>;

    /// Schedules matching the filter, scheduled date descending
    fn schedules(&self, filter: &ScheduleFilter) -> Result<Vec<TimelineSchedule>, StoreError>;

    /// Delete a schedule by store id
    fn delete_schedule(&self, id: i64) -> Result<(), StoreError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Annotation store error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store answered HTTP {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("cannot decode store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("store returned no representation for the inserted row")]
    EmptyReply,

    #[error("store state poisoned by a panicking writer")]
    Poisoned,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn filters_build_up() {
        let links = LinkFilter::package("1").document("1-1-0");
        assert_eq!(links.package_id, "1");
        assert_eq!(links.document_id.as_deref(), Some("1-1-0"));

        let schedules = ScheduleFilter::package("2").sub_document("2-1").document("2-1-3");
        assert_eq!(schedules.package_id, "2");
        assert_eq!(schedules.sub_document_id.as_deref(), Some("2-1"));
        assert_eq!(schedules.document_id.as_deref(), Some("2-1-3"));
    }

    #[test]
    fn unpersisted_records_serialize_without_server_fields() {
        let link = DocumentLink::new("1", "1-1-0", "KAK", "https://drive.example/kak");
        let json = serde_json::to_value(&link).unwrap();

        assert_eq!(json["package_id"], "1");
        assert_eq!(json["link_url"], "https://drive.example/kak");
        assert!(json.get("id").is_none());
        assert!(json.get("created_at").is_none());
        assert!(json.get("updated_at").is_none());
    }

    #[test]
    fn stored_rows_round_trip_from_api_json() {
        let json = r#"{
            "id": 7,
            "package_id": "1",
            "sub_document_id": "1-1",
            "document_id": "1-1-0",
            "document_name": "KAK",
            "scheduled_date": "2025-09-05",
            "created_at": "2025-09-01T03:00:00+00:00",
            "updated_at": "2025-09-02T03:00:00+00:00"
        }"#;

        let schedule: TimelineSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.id, Some(7));
        assert_eq!(
            schedule.scheduled_date,
            NaiveDate::from_ymd_opt(2025, 9, 5).unwrap()
        );
        assert!(schedule.created_at.is_some());
    }
}
