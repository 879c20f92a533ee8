use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::Word,
    error::ApiError,
    protocol::{UpsertOutcome, UpsertWordRequest, WORDS_ROUTE},
};
use url::Url;

use crate::error::StoreError;

/// Remote word service. The store only ever talks to the backend through this.
#[async_trait]
pub trait WordApi: Send + Sync {
    async fn list_words(&self) -> Result<Vec<Word>, StoreError>;
    async fn upsert_word(&self, request: &UpsertWordRequest) -> Result<UpsertOutcome, StoreError>;
    async fn delete_word(&self, word: &str) -> Result<(), StoreError>;
}

pub struct HttpWordApi {
    http: Client,
    base_url: Url,
}

impl HttpWordApi {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, StoreError> {
        let base_url =
            Url::parse(base_url).map_err(|_| StoreError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn words_url(&self) -> Result<Url, StoreError> {
        self.url_with_segments(&[])
    }

    /// The word becomes a single percent-encoded path segment.
    pub fn word_url(&self, word: &str) -> Result<Url, StoreError> {
        self.url_with_segments(&[word])
    }

    fn url_with_segments(&self, extra: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(WORDS_ROUTE.split('/').filter(|segment| !segment.is_empty()))
            .extend(extra);
        Ok(url)
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    Err(StoreError::Status {
        status,
        api_error: serde_json::from_slice::<ApiError>(&body).ok(),
    })
}

#[async_trait]
impl WordApi for HttpWordApi {
    async fn list_words(&self) -> Result<Vec<Word>, StoreError> {
        let response = self.http.get(self.words_url()?).send().await?;
        let body = ensure_success(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn upsert_word(&self, request: &UpsertWordRequest) -> Result<UpsertOutcome, StoreError> {
        let response = self
            .http
            .post(self.words_url()?)
            .json(request)
            .send()
            .await?;
        let body = ensure_success(response).await?.bytes().await?;
        Ok(UpsertOutcome::from_body(request, &body))
    }

    async fn delete_word(&self, word: &str) -> Result<(), StoreError> {
        let response = self.http.delete(self.word_url(word)?).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
