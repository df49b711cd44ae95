//! In-process annotation store.
//!
//! Reference implementation of [`AnnotationStore`] over `Mutex`-guarded
//! vectors: monotonic ids, replace-on-add, the same orderings the REST
//! backend serves. Used by tests and by offline runs where no backend is
//! configured.

use std::cmp::Reverse;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::{
    AnnotationStore, DocumentLink, LinkFilter, ScheduleFilter, StoreError, TimelineSchedule,
};

/// Deterministic in-memory [`AnnotationStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    links: Vec<DocumentLink>,
    schedules: Vec<TimelineSchedule>,
    last_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl AnnotationStore for MemoryStore {
    fn add_link(&self, mut link: DocumentLink) -> Result<DocumentLink, StoreError> {
        let mut inner = self.lock()?;
        inner.links.retain(|existing| {
            existing.package_id != link.package_id || existing.document_id != link.document_id
        });

        let now = Utc::now();
        link.id = Some(inner.next_id());
        link.created_at = Some(now);
        link.updated_at = Some(now);
        inner.links.push(link.clone());

        tracing::debug!(
            package = %link.package_id,
            document = %link.document_id,
            "stored document link"
        );
        Ok(link)
    }

    fn links(&self, filter: &LinkFilter) -> Result<Vec<DocumentLink>, StoreError> {
        let inner = self.lock()?;
        let mut rows: Vec<DocumentLink> = inner
            .links
            .iter()
            .filter(|l| {
                l.package_id == filter.package_id
                    && filter
                        .document_id
                        .as_ref()
                        .map_or(true, |d| &l.document_id == d)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|l| Reverse((l.updated_at, l.id)));
        Ok(rows)
    }

    fn link(
        &self,
        package_id: &str,
        document_id: &str,
    ) -> Result<Option<DocumentLink>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .links
            .iter()
            .find(|l| l.package_id == package_id && l.document_id == document_id)
            .cloned())
    }

    fn delete_link(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.links.retain(|l| l.id != Some(id));
        Ok(())
    }

    fn add_schedule(
        &self,
        mut schedule: TimelineSchedule,
    ) -> Result<TimelineSchedule, StoreError> {
        let mut inner = self.lock()?;
        inner.schedules.retain(|existing| {
            existing.package_id != schedule.package_id
                || existing.sub_document_id != schedule.sub_document_id
                || existing.document_id != schedule.document_id
                || existing.scheduled_date != schedule.scheduled_date
        });

        let now = Utc::now();
        schedule.id = Some(inner.next_id());
        schedule.created_at = Some(now);
        schedule.updated_at = Some(now);
        inner.schedules.push(schedule.clone());

        tracing::debug!(
            package = %schedule.package_id,
            sub_document = %schedule.sub_document_id,
            date = %schedule.scheduled_date,
            "stored timeline schedule"
        );
        Ok(schedule)
    }

    fn schedules(&self, filter: &ScheduleFilter) -> Result<Vec<TimelineSchedule>, StoreError> {
        let inner = self.lock()?;
        let mut rows: Vec<TimelineSchedule> = inner
            .schedules
            .iter()
            .filter(|s| {
                s.package_id == filter.package_id
                    && filter
                        .sub_document_id
                        .as_ref()
                        .map_or(true, |sub| &s.sub_document_id == sub)
                    && filter
                        .document_id
                        .as_ref()
                        .map_or(true, |d| &s.document_id == d)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|s| Reverse((s.scheduled_date, s.id)));
        Ok(rows)
    }

    fn delete_schedule(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.schedules.retain(|s| s.id != Some(id));
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
