use std::{marker::PhantomData, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url, header};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    records::{RecordKind, StoredRecord},
    store::{
        error::{StoreError, not_found, rejected, transport, transport_status},
        ports::{RecordStore, validate_draft},
        types::{StoreConfig, StoreOperation},
    },
};

const ERROR_BODY_PREVIEW_CHARS: usize = 240;

/// Record store backed by the `/api/{kind}` HTTP endpoints.
pub struct HttpRecordStore<R> {
    client: Client,
    base_url: Url,
    timeout: Duration,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for HttpRecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            _record: PhantomData,
        }
    }
}

impl<R: StoredRecord> HttpRecordStore<R> {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| transport(R::KIND, format!("failed to build http client: {err}")))?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: &StoreConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.base_url).map_err(|err| {
            transport(
                R::KIND,
                format!("invalid store base_url '{}': {err}", config.base_url),
            )
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(transport(
                R::KIND,
                format!("unsupported store scheme '{}'", base_url.scheme()),
            ));
        }

        Ok(Self {
            client,
            base_url,
            timeout: Duration::from_millis(config.request_timeout_ms.max(1)),
            _record: PhantomData,
        })
    }

    fn endpoint(&self, id: Option<&str>) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| transport(R::KIND, "store base_url cannot carry a path"))?;
            segments.pop_if_empty().push("api").push(R::KIND.path_segment());
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        operation: StoreOperation,
        id: Option<&str>,
        request: RequestBuilder,
    ) -> Result<Response, StoreError> {
        let response = request
            .timeout(self.timeout)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| {
                let message = if err.is_timeout() {
                    format!("{} timed out after {}ms", operation.as_str(), self.timeout.as_millis())
                } else {
                    format!("{} failed: {err}", operation.as_str())
                };
                tracing::warn!(
                    target: "store",
                    kind = %R::KIND,
                    operation = operation.as_str(),
                    error = %message,
                    "store_request_unreachable"
                );
                transport(R::KIND, message)
            })?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            tracing::debug!(
                target: "store",
                kind = %R::KIND,
                operation = operation.as_str(),
                status = status,
                "store_request_succeeded"
            );
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = map_status(R::KIND, operation, id, status, &body);
        tracing::warn!(
            target: "store",
            kind = %R::KIND,
            operation = operation.as_str(),
            status = status,
            error = %err,
            "store_request_rejected"
        );
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        operation: StoreOperation,
        response: Response,
    ) -> Result<T, StoreError> {
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|err| {
            transport_status(
                R::KIND,
                status,
                format!("{} body read failed: {err}", operation.as_str()),
            )
        })?;
        serde_json::from_slice(&bytes).map_err(|err| {
            transport_status(
                R::KIND,
                status,
                format!("{} returned an undecodable body: {err}", operation.as_str()),
            )
        })
    }
}

#[async_trait]
impl<R: StoredRecord> RecordStore<R> for HttpRecordStore<R> {
    #[tracing::instrument(name = "store_fetch_all", target = "store", skip(self), fields(kind = %R::KIND))]
    async fn fetch_all(&self) -> Result<Vec<R>, StoreError> {
        let url = self.endpoint(None)?;
        let response = self
            .send(StoreOperation::FetchAll, None, self.client.get(url))
            .await?;
        self.decode(StoreOperation::FetchAll, response).await
    }

    #[tracing::instrument(name = "store_create", target = "store", skip(self, draft), fields(kind = %R::KIND))]
    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        validate_draft::<R>(&draft)?;
        let url = self.endpoint(None)?;
        let response = self
            .send(StoreOperation::Create, None, self.client.post(url).json(&draft))
            .await?;
        self.decode(StoreOperation::Create, response).await
    }

    #[tracing::instrument(name = "store_update", target = "store", skip(self, patch), fields(kind = %R::KIND))]
    async fn update(&self, id: &str, patch: R::Draft) -> Result<R, StoreError> {
        validate_draft::<R>(&patch)?;
        let url = self.endpoint(Some(id))?;
        let response = self
            .send(StoreOperation::Update, Some(id), self.client.put(url).json(&patch))
            .await?;
        self.decode(StoreOperation::Update, response).await
    }

    #[tracing::instrument(name = "store_delete", target = "store", skip(self), fields(kind = %R::KIND))]
    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let url = self.endpoint(Some(id))?;
        self.send(StoreOperation::Delete, Some(id), self.client.delete(url))
            .await?;
        Ok(())
    }
}

pub(crate) fn map_status(
    kind: RecordKind,
    operation: StoreOperation,
    id: Option<&str>,
    status: u16,
    body: &str,
) -> StoreError {
    match (status, operation, id) {
        (400, StoreOperation::Create | StoreOperation::Update, _) => {
            rejected(kind, body_message(body).unwrap_or_else(|| "bad request".to_string()))
        }
        (404, StoreOperation::Update | StoreOperation::Delete, Some(id)) => not_found(kind, id),
        _ => {
            let preview = body_preview(body);
            let message = if preview.is_empty() {
                format!("{} returned status {status}", operation.as_str())
            } else {
                format!("{} returned status {status}: {preview}", operation.as_str())
            };
            transport_status(kind, status, message)
        }
    }
}

fn body_message(body: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(Value::String(text)) = map.get(key) {
                return Some(text.chars().take(ERROR_BODY_PREVIEW_CHARS).collect());
            }
        }
    }

    let preview = body_preview(body);
    (!preview.is_empty()).then_some(preview)
}

fn body_preview(body: &str) -> String {
    body.trim().chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
}
