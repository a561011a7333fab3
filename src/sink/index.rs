//! Search-index sink (Elasticsearch-compatible document API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, instrument, warn};
use url::Url;

use super::{Record, Sink, SinkError};
use crate::transport::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::user_agent;

/// Longest error body kept in [`SinkError::IndexStatus`].
const MAX_ERROR_BODY: usize = 512;

/// Upserts each record as one document, visible to search immediately.
#[derive(Debug, Clone)]
pub struct IndexSink {
    client: Client,
    host: Url,
    index: String,
    credentials: Option<(String, String)>,
}

impl IndexSink {
    /// Creates an index sink for `index` on `host`.
    ///
    /// Empty `login` disables basic authentication.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Setup`] for an unparseable host or empty index
    /// name, or if the HTTP client cannot be built.
    pub fn new(host: &str, index: &str, login: &str, pwd: &str) -> Result<Self, SinkError> {
        let host = Url::parse(host)
            .map_err(|e| SinkError::setup("index", format!("invalid host '{host}': {e}")))?;
        if index.trim().is_empty() {
            return Err(SinkError::setup("index", "index name is empty"));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|e| SinkError::setup("index", format!("failed to build HTTP client: {e}")))?;

        let credentials = (!login.is_empty()).then(|| (login.to_string(), pwd.to_string()));

        Ok(Self {
            client,
            host,
            index: index.to_string(),
            credentials,
        })
    }

    /// Target index name.
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Document URL for `doc_id`: `{host}/{index}/_doc/{doc_id}?refresh=true`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Setup`] if the host cannot carry path segments.
    pub fn document_url(&self, doc_id: &str) -> Result<Url, SinkError> {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|()| SinkError::setup("index", format!("host '{}' cannot be a base", self.host)))?
            .pop_if_empty()
            .extend([self.index.as_str(), "_doc", doc_id]);
        url.query_pairs_mut().append_pair("refresh", "true");
        Ok(url)
    }

    /// Logs the server's info document. Failures are logged, never returned.
    #[instrument(skip(self), fields(host = %self.host))]
    pub async fn log_server_info(&self) {
        let request = self.authorize(self.client.get(self.host.clone()));
        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                info!(status, info = %truncate(&body), "search index reachable");
            }
            Err(error) => warn!(error = %error, "search index info request failed"),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some((login, pwd)) => request.basic_auth(login, Some(pwd)),
            None => request,
        }
    }
}

#[async_trait]
impl Sink for IndexSink {
    fn name(&self) -> &str {
        "index"
    }

    #[instrument(skip(self, record), fields(doc_id = %record.formatted_id, index = %self.index))]
    async fn write(&mut self, record: &Record) -> Result<(), SinkError> {
        let url = self.document_url(&record.formatted_id)?;
        let request = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(record.body.clone());

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|source| SinkError::IndexNetwork {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(SinkError::IndexStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        info!("Record with id \"{}\" send to ES.", record.formatted_id);
        Ok(())
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_url_shape() {
        let sink = IndexSink::new("http://localhost:9200", "records", "", "").unwrap();
        let url = sink.document_url("A_B").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9200/records/_doc/A_B?refresh=true"
        );
    }

    #[test]
    fn test_document_url_escapes_id() {
        let sink = IndexSink::new("http://localhost:9200/", "records", "", "").unwrap();
        let url = sink.document_url("a/b c").unwrap();
        assert_eq!(url.path(), "/records/_doc/a%2Fb%20c");
    }

    #[test]
    fn test_empty_index_name_rejected() {
        let result = IndexSink::new("http://localhost:9200", " ", "", "");
        assert!(matches!(result, Err(SinkError::Setup { sink: "index", .. })));
    }

    #[test]
    fn test_bad_host_rejected() {
        let result = IndexSink::new("localhost 9200", "records", "", "");
        assert!(matches!(result, Err(SinkError::Setup { .. })));
    }

    #[test]
    fn test_credentials_only_when_login_set() {
        let anon = IndexSink::new("http://localhost:9200", "r", "", "pw").unwrap();
        assert!(anon.credentials.is_none());
        let auth = IndexSink::new("http://localhost:9200", "r", "elastic", "pw").unwrap();
        assert_eq!(
            auth.credentials,
            Some(("elastic".to_string(), "pw".to_string()))
        );
    }
}
