use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::envelope::Envelope;
use crate::{ClientError, Order, OrderClient, OrderDraft, OrderId};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// `OrderClient` backed by the pedidos REST API.
#[derive(Debug, Clone)]
pub struct HttpOrderClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpOrderClient {
    /// Builds a client for `base_url` (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(json_headers())
            .build()?;

        Ok(Self { client, base_url })
    }

    fn collection_url(&self) -> String {
        format!("{}/pedidos", self.base_url.as_str().trim_end_matches('/'))
    }

    fn item_url(&self, id: OrderId) -> String {
        format!("{}/{id}", self.collection_url())
    }

    /// Reads the response body as an envelope.
    ///
    /// Non-2xx answers only count as application failures when they carry a
    /// `success: false` envelope; anything else is reported with the status.
    async fn read_envelope<T: DeserializeOwned>(
        action: &'static str,
        response: reqwest::Response,
    ) -> Result<Envelope<T>, ClientError> {
        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<Envelope<T>>(&body);

        if status.is_success() {
            return Ok(parsed?);
        }

        match parsed {
            Ok(envelope) if !envelope.success => Ok(envelope),
            _ => Err(ClientError::UnexpectedStatus {
                action,
                status,
                body,
            }),
        }
    }

    async fn mutation(
        action: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<String>, ClientError> {
        let result = async {
            let response = request.send().await?;
            Self::read_envelope::<serde::de::IgnoredAny>(action, response)
                .await?
                .into_message()
        }
        .await;

        if let Err(ref e) = result {
            warn!("{action} failed: {e}");
        }

        result
    }
}

/// Every call accepts JSON; create and update set their content type through
/// `RequestBuilder::json`.
fn json_headers() -> HeaderMap {
    [(header::ACCEPT, HeaderValue::from_static("application/json"))]
        .into_iter()
        .collect()
}

#[async_trait]
impl OrderClient for HttpOrderClient {
    async fn list(&self) -> Result<Vec<Order>, ClientError> {
        let url = self.collection_url();
        debug!("GET {url}");

        let result = async {
            let response = self.client.get(&url).send().await?;
            Self::read_envelope::<Vec<Order>>("list pedidos", response)
                .await?
                .into_data()
        }
        .await;

        match &result {
            Ok(orders) => debug!("Fetched {} pedidos", orders.len()),
            Err(e) => warn!("list pedidos failed: {e}"),
        }

        result
    }

    async fn create(&self, draft: &OrderDraft) -> Result<Option<String>, ClientError> {
        let url = self.collection_url();
        debug!("POST {url}: cliente={}", draft.nome_cliente);

        Self::mutation("create pedido", self.client.post(url).json(draft)).await
    }

    async fn update(&self, id: OrderId, draft: &OrderDraft) -> Result<Option<String>, ClientError> {
        let url = self.item_url(id);
        debug!("PUT {url}: cliente={}", draft.nome_cliente);

        Self::mutation("update pedido", self.client.put(url).json(draft)).await
    }

    async fn delete(&self, id: OrderId) -> Result<Option<String>, ClientError> {
        let url = self.item_url(id);
        debug!("DELETE {url}");

        Self::mutation("delete pedido", self.client.delete(url)).await
    }
}
