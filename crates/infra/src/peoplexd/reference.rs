//! Reference-type lookups (`DEPT`, `POSTTL`)
//!
//! Codes taken from appointment records arrive HTML-encoded; they are decoded
//! before being placed in the URL. Descriptions are decoded before being
//! returned.

use async_trait::async_trait;
use peoplexd_core::ReferenceLookup;
use peoplexd_domain::constants::{DEPARTMENT_ENDPOINT, POSITION_TITLE_ENDPOINT};
use peoplexd_domain::{ItemsEnvelope, PeopleXdError, ReferenceItem, Result};
use tracing::{debug, error};

use crate::http::HttpClient;

/// Resolves department and position codes through the reference API.
#[derive(Clone)]
pub struct ReferenceService {
    http: HttpClient,
}

impl ReferenceService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// First description for `code` under a reference-type endpoint.
    async fn describe(&self, endpoint: &str, code: &str, kind: &str) -> Result<String> {
        let decoded = html_escape::decode_html_entities(code);
        let path = format!("{endpoint}/{}", urlencoding::encode(&decoded));
        debug!(%path, code = %decoded, kind, "looking up reference description");

        let envelope: ItemsEnvelope<ReferenceItem> = self.http.get(&path).await?.json()?;

        let Some(item) = envelope.items.into_iter().next() else {
            let message = format!("No full {kind} found for code: {decoded}");
            error!(code = %decoded, kind, "{message}");
            return Err(PeopleXdError::DataNotFound(message));
        };

        Ok(html_escape::decode_html_entities(&item.description).into_owned())
    }
}

#[async_trait]
impl ReferenceLookup for ReferenceService {
    async fn full_department(&self, code: &str) -> Result<String> {
        self.describe(DEPARTMENT_ENDPOINT, code, "department").await
    }

    async fn full_job_title(&self, code: &str) -> Result<String> {
        self.describe(POSITION_TITLE_ENDPOINT, code, "job title").await
    }
}
