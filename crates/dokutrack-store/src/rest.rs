//! PostgREST-backed annotation store.
//!
//! Speaks the stock PostgREST dialect: table endpoints under `/rest/v1/`,
//! `eq.` query filters, `order=` for sorting, `Prefer: return=representation`
//! to get the inserted row back. The replacement contract is client-driven
//! (delete the slot, then insert) because the backing tables carry no unique
//! constraint on the logical keys.

use std::time::Duration;

use reqwest::blocking::{RequestBuilder, Response};
use reqwest::Method;

use crate::{
    AnnotationStore, DocumentLink, LinkFilter, ScheduleFilter, StoreError, TimelineSchedule,
};

const LINKS_TABLE: &str = "document_links";
const SCHEDULES_TABLE: &str = "timeline_schedules";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`AnnotationStore`] over a PostgREST-style HTTP API.
///
/// One failure is one `StoreError`; there are no retries. Callers that need
/// resilience wrap this store themselves.
#[derive(Debug)]
pub struct RestStore {
    base_url: String,
    key: String,
    client: reqwest::blocking::Client,
}

impl RestStore {
    /// Connect to a PostgREST endpoint.
    ///
    /// `base_url` is the project root (the client appends `/rest/v1/...`);
    /// `key` is sent as both `apikey` and bearer token.
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Result<Self, StoreError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url,
            key: key.into(),
            client,
        })
    }

    /// Check the API without touching any rows.
    pub fn is_reachable(&self) -> bool {
        self.request(Method::HEAD, &self.table_url(LINKS_TABLE))
            .query(&[("limit", "1")])
            .send()
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    fn delete_where(&self, table: &str, filters: &[(&str, String)]) -> Result<(), StoreError> {
        let response = self
            .request(Method::DELETE, &self.table_url(table))
            .query(filters)
            .send()?;
        ensure_success(response)?;
        Ok(())
    }

    fn insert_returning<T>(&self, table: &str, row: &T) -> Result<T, StoreError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
    {
        let response = self
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row)
            .send()?;
        let body = ensure_success(response)?.text()?;
        let rows: Vec<T> = serde_json::from_str(&body)?;
        rows.into_iter().next().ok_or(StoreError::EmptyReply)
    }

    fn select<T>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>, StoreError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .request(Method::GET, &self.table_url(table))
            .query(query)
            .send()?;
        let body = ensure_success(response)?.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl AnnotationStore for RestStore {
    fn add_link(&self, link: DocumentLink) -> Result<DocumentLink, StoreError> {
        tracing::debug!(
            package = %link.package_id,
            document = %link.document_id,
            "replacing document link"
        );
        self.delete_where(
            LINKS_TABLE,
            &[
                ("package_id", format!("eq.{}", link.package_id)),
                ("document_id", format!("eq.{}", link.document_id)),
            ],
        )?;
        self.insert_returning(LINKS_TABLE, &link)
    }

    fn links(&self, filter: &LinkFilter) -> Result<Vec<DocumentLink>, StoreError> {
        let mut query = vec![
            ("package_id", format!("eq.{}", filter.package_id)),
            ("order", "updated_at.desc".to_string()),
        ];
        if let Some(document_id) = &filter.document_id {
            query.push(("document_id", format!("eq.{document_id}")));
        }
        self.select(LINKS_TABLE, &query)
    }

    fn link(
        &self,
        package_id: &str,
        document_id: &str,
    ) -> Result<Option<DocumentLink>, StoreError> {
        let rows: Vec<DocumentLink> = self.select(
            LINKS_TABLE,
            &[
                ("package_id", format!("eq.{package_id}")),
                ("document_id", format!("eq.{document_id}")),
                ("limit", "1".to_string()),
            ],
        )?;
        Ok(rows.into_iter().next())
    }

    fn delete_link(&self, id: i64) -> Result<(), StoreError> {
        self.delete_where(LINKS_TABLE, &[("id", format!("eq.{id}"))])
    }

    fn add_schedule(&self, schedule: TimelineSchedule) -> Result<TimelineSchedule, StoreError> {
        tracing::debug!(
            package = %schedule.package_id,
            sub_document = %schedule.sub_document_id,
            date = %schedule.scheduled_date,
            "replacing timeline schedule"
        );
        self.delete_where(
            SCHEDULES_TABLE,
            &[
                ("package_id", format!("eq.{}", schedule.package_id)),
                ("sub_document_id", format!("eq.{}", schedule.sub_document_id)),
                ("document_id", format!("eq.{}", schedule.document_id)),
                ("scheduled_date", format!("eq.{}", schedule.scheduled_date)),
            ],
        )?;
        self.insert_returning(SCHEDULES_TABLE, &schedule)
    }

    fn schedules(&self, filter: &ScheduleFilter) -> Result<Vec<TimelineSchedule>, StoreError> {
        let mut query = vec![
            ("package_id", format!("eq.{}", filter.package_id)),
            ("order", "scheduled_date.desc".to_string()),
        ];
        if let Some(sub_document_id) = &filter.sub_document_id {
            query.push(("sub_document_id", format!("eq.{sub_document_id}")));
        }
        if let Some(document_id) = &filter.document_id {
            query.push(("document_id", format!("eq.{document_id}")));
        }
        self.select(SCHEDULES_TABLE, &query)
    }

    fn delete_schedule(&self, id: i64) -> Result<(), StoreError> {
        self.delete_where(SCHEDULES_TABLE, &[("id", format!("eq.{id}"))])
    }
}

fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(StoreError::Api {
            status,
            body: response.text().unwrap_or_default(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
