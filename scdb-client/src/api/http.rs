//! reqwest implementation of the catalog backend traits

use super::types::{
    AdminPaperPage, AdminPaperQuery, BatchDeleteRequest, BatchReviewRequest,
    ChartVisibilityRequest, CombinationSearchRequest, CompoundInfo, ErrorBody, MutationAck,
    PaperImage, PaperImageList, PaperUpdate, ReviewRequest, SearchMode,
};
use super::{AdminApi, CatalogApi};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::services::paper_fetcher::PaperFilters;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use scdb_common::models::{ElementCombination, PaperRecord};
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!("scdb-client/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the catalog REST backend
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.bearer_auth(token)
    }

    /// Send and return the response if its status is a success
    async fn send(&self, request: RequestBuilder, endpoint: &str) -> ClientResult<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(endpoint = %endpoint, error = %e, "Request failed before a response");
            ClientError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message())
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

        tracing::warn!(
            endpoint = %endpoint,
            status = status.as_u16(),
            message = %message,
            "Backend returned an error"
        );

        Err(ClientError::fetch_failed(Some(status.as_u16()), message))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> ClientResult<T> {
        let response = self.send(request, endpoint).await?;
        let status = response.status().as_u16();
        response.json::<T>().await.map_err(|e| {
            ClientError::fetch_failed(Some(status), format!("invalid response body: {}", e))
        })
    }

    /// Mutation endpoints may answer with an empty body
    async fn send_ack(&self, request: RequestBuilder, endpoint: &str) -> ClientResult<MutationAck> {
        let response = self.send(request, endpoint).await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::fetch_failed(Some(status), e.to_string()))?;

        if body.trim().is_empty() {
            return Ok(MutationAck::default());
        }
        serde_json::from_str(&body).map_err(|e| {
            ClientError::fetch_failed(Some(status), format!("invalid response body: {}", e))
        })
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn compound_info(&self, symbols: &str) -> ClientResult<CompoundInfo> {
        let request = self
            .http_client
            .get(self.url(&format!("/api/compounds/{}", symbols)));
        self.send_json(request, "compound_info").await
    }

    async fn search_combinations(
        &self,
        elements: &[String],
        mode: SearchMode,
    ) -> ClientResult<Vec<ElementCombination>> {
        let body = CombinationSearchRequest {
            elements: elements.to_vec(),
            mode,
        };

        tracing::debug!(elements = ?elements, mode = mode.as_str(), "Searching combinations");

        let request = self
            .http_client
            .post(self.url("/api/compounds/search"))
            .json(&body);
        self.send_json(request, "search_combinations").await
    }

    async fn papers_for_combination(
        &self,
        symbols: &str,
        filters: &PaperFilters,
    ) -> ClientResult<Vec<PaperRecord>> {
        let request = self
            .http_client
            .get(self.url(&format!("/api/papers/compound/{}", symbols)))
            .query(&filters.to_query_pairs());
        self.send_json(request, "papers_for_combination").await
    }
}

#[async_trait]
impl AdminApi for HttpCatalogClient {
    async fn list_papers(
        &self,
        token: &str,
        query: &AdminPaperQuery,
    ) -> ClientResult<AdminPaperPage> {
        let request = self
            .http_client
            .get(self.url("/api/admin/papers/all"))
            .query(&query.to_query_pairs());
        self.send_json(self.authed(request, token), "list_papers").await
    }

    async fn get_paper(&self, token: &str, paper_id: i64) -> ClientResult<PaperRecord> {
        let request = self
            .http_client
            .get(self.url(&format!("/api/admin/papers/{}", paper_id)));
        self.send_json(self.authed(request, token), "get_paper").await
    }

    async fn update_paper(
        &self,
        token: &str,
        paper_id: i64,
        update: &PaperUpdate,
    ) -> ClientResult<MutationAck> {
        let request = self
            .http_client
            .put(self.url(&format!("/api/admin/papers/{}", paper_id)))
            .json(update);
        self.send_ack(self.authed(request, token), "update_paper").await
    }

    async fn review_paper(
        &self,
        token: &str,
        paper_id: i64,
        review: &ReviewRequest,
    ) -> ClientResult<MutationAck> {
        let request = self
            .http_client
            .post(self.url(&format!("/api/admin/papers/{}/review", paper_id)))
            .json(review);
        self.send_ack(self.authed(request, token), "review_paper").await
    }

    async fn batch_review(
        &self,
        token: &str,
        request: &BatchReviewRequest,
    ) -> ClientResult<MutationAck> {
        let http = self
            .http_client
            .post(self.url("/api/admin/papers/batch-review"))
            .json(request);
        self.send_ack(self.authed(http, token), "batch_review").await
    }

    async fn batch_chart_visibility(
        &self,
        token: &str,
        request: &ChartVisibilityRequest,
    ) -> ClientResult<MutationAck> {
        let http = self
            .http_client
            .post(self.url("/api/admin/papers/batch-chart-visibility"))
            .json(request);
        self.send_ack(self.authed(http, token), "batch_chart_visibility")
            .await
    }

    async fn batch_delete(
        &self,
        token: &str,
        request: &BatchDeleteRequest,
    ) -> ClientResult<MutationAck> {
        let http = self
            .http_client
            .post(self.url("/api/admin/papers/batch-delete"))
            .json(request);
        self.send_ack(self.authed(http, token), "batch_delete").await
    }

    async fn delete_paper(&self, token: &str, paper_id: i64) -> ClientResult<MutationAck> {
        let request = self
            .http_client
            .delete(self.url(&format!("/api/admin/papers/{}", paper_id)));
        self.send_ack(self.authed(request, token), "delete_paper").await
    }

    async fn list_images(&self, token: &str, paper_id: i64) -> ClientResult<Vec<PaperImage>> {
        let request = self
            .http_client
            .get(self.url(&format!("/api/admin/papers/{}/images", paper_id)));
        let list: PaperImageList = self
            .send_json(self.authed(request, token), "list_images")
            .await?;
        Ok(list.images)
    }

    async fn delete_image(
        &self,
        token: &str,
        paper_id: i64,
        image_id: i64,
    ) -> ClientResult<MutationAck> {
        let request = self.http_client.delete(self.url(&format!(
            "/api/admin/papers/{}/images/{}",
            paper_id, image_id
        )));
        self.send_ack(self.authed(request, token), "delete_image").await
    }
}
