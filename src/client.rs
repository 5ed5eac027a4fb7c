//! Typed HTTP client for the product API.
//!
//! The grid controller talks to the backend only through the [`ProductApi`]
//! trait, so tests can substitute a recording double. The real implementation
//! is [`RemoteProductClient`], the only code aware of paths, methods, and the
//! JSON wire shape. No retries: every failure is surfaced to the caller.

use crate::error::{ClientError, ErrorBody};
use crate::model::{NewProduct, Product};
use async_trait::async_trait;
use reqwest::Response;

#[async_trait]
pub trait ProductApi: Send + Sync {
    /// Fetch the full catalog.
    async fn fetch_all(&self) -> Result<Vec<Product>, ClientError>;
    /// Create a product. The candidate carries no committed id.
    async fn create(&self, candidate: &NewProduct) -> Result<Product, ClientError>;
    /// Update an existing product, keyed by its id.
    async fn update(&self, product: &Product) -> Result<Product, ClientError>;
    /// Delete by id. Deleting an unknown id succeeds.
    async fn delete(&self, id: i64) -> Result<(), ClientError>;
}

pub struct RemoteProductClient {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteProductClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn products_url(&self) -> String {
        format!("{}/products", self.base_url)
    }

    fn product_url(&self, id: i64) -> String {
        format!("{}/products/{id}", self.base_url)
    }

    /// Turn a non-2xx response into a typed error, pulling the message out of
    /// a `{"message": …}` body when the server sent one.
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|body| body.message);
        Err(ClientError::Status { status, message })
    }
}

#[async_trait]
impl ProductApi for RemoteProductClient {
    async fn fetch_all(&self) -> Result<Vec<Product>, ClientError> {
        let response = self.http.get(self.products_url()).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, candidate: &NewProduct) -> Result<Product, ClientError> {
        let response = self
            .http
            .post(self.products_url())
            .json(candidate)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, product: &Product) -> Result<Product, ClientError> {
        let response = self
            .http
            .put(self.product_url(product.id))
            .json(product)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let response = self.http.delete(self.product_url(id)).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
