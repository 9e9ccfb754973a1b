use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;
use url::Url;

use crate::error::{Result, SyncError};

/// One document headed for the bulk endpoint
#[derive(Debug, Clone)]
pub struct BulkOp {
    pub index: String,
    pub id: String,
    pub document: Value,
}

/// Decoded `_bulk` response. Only the top-level error flag decides success;
/// items are kept raw so a failure reason can be scraped for the message.
#[derive(Debug, Deserialize)]
pub struct BulkResponse {
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<Value>,
}

/// Thin client for the Elasticsearch REST API, shared across all collections
pub struct ElasticClient {
    http: Client,
    base_url: Url,
}

impl ElasticClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Verify the cluster is reachable before any destructive work starts
    pub async fn ping(&self) -> Result<()> {
        self.http
            .get(self.base_url.clone())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self.http.head(self.url(index)?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        response.error_for_status()?;
        Ok(true)
    }

    pub async fn delete_index(&self, index: &str) -> Result<()> {
        debug!("deleting index '{}'", index);
        let response = self.http.delete(self.url(index)?).send().await?;
        check_reset(index, response).await
    }

    pub async fn create_index(&self, index: &str) -> Result<()> {
        debug!("creating index '{}'", index);
        let response = self.http.put(self.url(index)?).send().await?;
        check_reset(index, response).await
    }

    pub async fn put_mapping(&self, index: &str, properties: &Map<String, Value>) -> Result<()> {
        debug!("applying mapping to '{}'", index);
        let response = self
            .http
            .put(self.url(&format!("{}/_mapping", index))?)
            .json(&json!({ "properties": properties }))
            .send()
            .await?;
        check_reset(index, response).await
    }

    /// Submit one interleaved action/document bulk request, flushing so the
    /// documents are visible immediately
    pub async fn bulk(&self, index: &str, ops: &[BulkOp]) -> Result<BulkResponse> {
        let mut body = String::new();
        for op in ops {
            body.push_str(&serde_json::to_string(&json!({
                "index": { "_index": op.index, "_id": op.id }
            }))?);
            body.push('\n');
            body.push_str(&serde_json::to_string(&op.document)?);
            body.push('\n');
        }

        let response = self
            .http
            .post(self.url("_bulk?refresh=true")?)
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SyncError::BulkRejected {
                index: index.to_string(),
                reason: format!("{}: {}", status, text),
            });
        }

        let decoded: BulkResponse = response.json().await?;
        if decoded.errors {
            let reason = first_item_error(&decoded)
                .unwrap_or_else(|| "bulk response flagged errors".to_string());
            return Err(SyncError::BulkRejected {
                index: index.to_string(),
                reason,
            });
        }
        Ok(decoded)
    }
}

async fn check_reset(index: &str, response: reqwest::Response) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Err(SyncError::IndexReset {
        index: index.to_string(),
        reason: format!("{}: {}", status, text),
    })
}

fn first_item_error(response: &BulkResponse) -> Option<String> {
    response.items.iter().find_map(|item| {
        let error = item.get("index")?.get("error")?;
        let reason = error
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("unknown reason");
        Some(reason.to_string())
    })
}
