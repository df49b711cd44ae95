//! Published-sheet fetch.
//!
//! A sheet published to the web exposes a CSV export endpoint; this module
//! fetches that CSV and hands it to [`CellGrid::from_csv_text`]. Access
//! control is the awkward part: a sheet that is *not* published answers 200
//! with a short HTML login stub instead of data, so body length is the only
//! reliable signal.

use std::time::Duration;

use thiserror::Error;

use crate::grid::{CellGrid, GridError};

/// Bodies shorter than this are the login stub, not sheet data. Even a
/// header-only export of the tracking sheet is far longer.
const MIN_CSV_LEN: usize = 100;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Address of one published sheet tab.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteSheet {
    /// Spreadsheet document id
    pub sheet_id: String,
    /// Tab id within the document ("0" for the first tab)
    pub gid: String,
}

impl RemoteSheet {
    /// Point at one tab of a published spreadsheet
    pub fn new(sheet_id: impl Into<String>, gid: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            gid: gid.into(),
        }
    }

    /// CSV export URL for this tab
    pub fn csv_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
            self.sheet_id, self.gid
        )
    }

    /// Fetch the published CSV text.
    pub fn fetch_csv(&self) -> Result<String, FetchError> {
        let url = self.csv_url();
        tracing::debug!(%url, "fetching published csv");

        let response = client()?.get(&url).send()?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text()?;
        if body.trim().len() < MIN_CSV_LEN {
            tracing::warn!(length = body.len(), "fetched body too short to be sheet data");
            return Err(FetchError::Restricted { length: body.len() });
        }
        Ok(body)
    }

    /// Fetch the published CSV and build a grid from it.
    pub fn fetch_grid(&self) -> Result<CellGrid, FetchError> {
        Ok(CellGrid::from_csv_text(&self.fetch_csv()?)?)
    }

    /// Check the export endpoint without downloading the body.
    pub fn is_reachable(&self) -> bool {
        client()
            .and_then(|c| c.head(self.csv_url()).send().map_err(FetchError::from))
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }
}

fn client() -> Result<reqwest::blocking::Client, FetchError> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?)
}

// ============================================================================
// Errors
// ============================================================================

/// Published-sheet fetch error
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sheet answered HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("sheet looks unpublished or access-restricted ({length}-byte body)")]
    Restricted { length: usize },

    #[error(transparent)]
    Grid(#[from] GridError),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn csv_url_shape() {
        let sheet = RemoteSheet::new("1AbCdEf", "0");
        assert_eq!(
            sheet.csv_url(),
            "https://docs.google.com/spreadsheets/d/1AbCdEf/export?format=csv&gid=0"
        );
    }

    #[test]
    fn restricted_error_names_the_cause() {
        let error = FetchError::Restricted { length: 42 };
        assert_eq!(
            error.to_string(),
            "sheet looks unpublished or access-restricted (42-byte body)"
        );
    }
}
