//! reqwest implementation of [`MetadataClient`].
//!
//! Model, record, link and proxy endpoints live under
//! `{api_host}/models/datasets/{dataset}`; the integration lookup lives on
//! `api2_host`. Every request carries the session token as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};

use metadata_types::{
    DatasetId, InstanceId, ModelCreateParams, PropertyCreateParams, RecordValues, SchemaId,
};

use crate::wire::{
    ApiResponse, BulkDeleteResponse, CreateLinkInstanceBody, CreateLinkSchemaBody,
    CreateProxyInstanceBody, CreateProxyRelationshipSchemaBody, DeleteProxyInstancesBody,
    Integration,
};
use crate::{ClientError, MetadataClient, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub api_host: String,
    pub api2_host: String,
    pub session_token: String,
    pub timeout: Duration,
}

impl HttpClientConfig {
    pub fn new(
        api_host: impl Into<String>,
        api2_host: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            api_host: api_host.into(),
            api2_host: api2_host.into(),
            session_token: session_token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    api_host: String,
    api2_host: String,
    session_token: String,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("api_host", &self.api_host)
            .field("api2_host", &self.api2_host)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            api_host: config.api_host.trim_end_matches('/').to_string(),
            api2_host: config.api2_host.trim_end_matches('/').to_string(),
            session_token: config.session_token,
        })
    }

    fn dataset_url(&self, dataset_id: &DatasetId, path: &str) -> String {
        format!("{}/models/datasets/{}{}", self.api_host, dataset_id, path)
    }

    fn concepts_url(&self, dataset_id: &DatasetId, path: &str) -> String {
        self.dataset_url(dataset_id, &format!("/concepts{path}"))
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<String> {
        tracing::debug!(%method, %url, "calling metadata service");

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(&self.session_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ClientError::Transport {
            method: method.clone(),
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ClientError::Transport {
            method: method.clone(),
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(ClientError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    async fn send_json<B, T>(&self, method: Method, url: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.send(method.clone(), url, body).await?;
        serde_json::from_str(&text).map_err(|source| ClientError::Decode {
            method,
            url: url.to_string(),
            source,
        })
    }

    /// POSTs a create and returns the id the service assigned.
    async fn create<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        let response: ApiResponse = self.send_json(Method::POST, url, Some(body)).await?;
        if response.id.is_empty() {
            return Err(ClientError::MissingId {
                method: Method::POST,
                url: url.to_string(),
            });
        }
        Ok(response.id)
    }
}

#[async_trait]
impl MetadataClient for HttpClient {
    async fn get_integration(&self, integration_id: &str) -> Result<Integration> {
        let url = format!("{}/integrations/{}", self.api2_host, integration_id);
        self.send_json::<(), _>(Method::GET, &url, None).await
    }

    async fn create_model(
        &self,
        dataset_id: &DatasetId,
        model: &ModelCreateParams,
    ) -> Result<SchemaId> {
        let url = self.concepts_url(dataset_id, "");
        self.create(&url, model).await.map(SchemaId::from)
    }

    async fn create_properties(
        &self,
        dataset_id: &DatasetId,
        model_id: &SchemaId,
        properties: &[PropertyCreateParams],
    ) -> Result<Vec<String>> {
        let url = self.concepts_url(dataset_id, &format!("/{model_id}/properties"));
        let response: Vec<ApiResponse> =
            self.send_json(Method::PUT, &url, Some(properties)).await?;
        Ok(response.into_iter().map(|p| p.id).collect())
    }

    async fn create_record(
        &self,
        dataset_id: &DatasetId,
        model_id: &SchemaId,
        values: &RecordValues,
    ) -> Result<InstanceId> {
        let url = self.concepts_url(dataset_id, &format!("/{model_id}/instances"));
        self.create(&url, values).await.map(InstanceId::from)
    }

    async fn update_record(
        &self,
        dataset_id: &DatasetId,
        model_id: &SchemaId,
        record_id: &InstanceId,
        values: &RecordValues,
    ) -> Result<InstanceId> {
        let url = self.concepts_url(dataset_id, &format!("/{model_id}/instances/{record_id}"));
        let response: ApiResponse = self.send_json(Method::PUT, &url, Some(values)).await?;
        Ok(InstanceId::from(response.id))
    }

    async fn delete_records(
        &self,
        dataset_id: &DatasetId,
        model_id: &SchemaId,
        record_ids: &[InstanceId],
    ) -> Result<BulkDeleteResponse> {
        let url = self.concepts_url(dataset_id, &format!("/{model_id}/instances"));
        self.send_json(Method::DELETE, &url, Some(record_ids)).await
    }

    async fn delete_model(&self, dataset_id: &DatasetId, model_id: &SchemaId) -> Result<()> {
        let url = self.concepts_url(dataset_id, &format!("/{model_id}"));
        self.send::<()>(Method::DELETE, &url, None).await?;
        Ok(())
    }

    async fn create_link_schema(
        &self,
        dataset_id: &DatasetId,
        from_model_id: &SchemaId,
        body: &CreateLinkSchemaBody,
    ) -> Result<SchemaId> {
        let url = self.concepts_url(dataset_id, &format!("/{from_model_id}/linked"));
        self.create(&url, body).await.map(SchemaId::from)
    }

    async fn create_link_instance(
        &self,
        dataset_id: &DatasetId,
        from_model_id: &SchemaId,
        from_record_id: &InstanceId,
        body: &CreateLinkInstanceBody,
    ) -> Result<InstanceId> {
        let url = self.concepts_url(
            dataset_id,
            &format!("/{from_model_id}/instances/{from_record_id}/linked"),
        );
        let response: ApiResponse = self.send_json(Method::POST, &url, Some(body)).await?;
        Ok(InstanceId::from(response.id))
    }

    async fn delete_link_instance(
        &self,
        dataset_id: &DatasetId,
        model_id: &SchemaId,
        from_record_id: &InstanceId,
        link_instance_id: &InstanceId,
    ) -> Result<()> {
        let url = self.concepts_url(
            dataset_id,
            &format!("/{model_id}/instances/{from_record_id}/linked/{link_instance_id}"),
        );
        self.send::<()>(Method::DELETE, &url, None).await?;
        Ok(())
    }

    async fn create_proxy_relationship_schema(&self, dataset_id: &DatasetId) -> Result<SchemaId> {
        let url = self.dataset_url(dataset_id, "/relationships");
        let body = CreateProxyRelationshipSchemaBody::default();
        self.create(&url, &body).await.map(SchemaId::from)
    }

    async fn create_proxy_instance(
        &self,
        dataset_id: &DatasetId,
        body: &CreateProxyInstanceBody,
    ) -> Result<()> {
        let url = self.dataset_url(dataset_id, "/proxy/package/instances");
        self.send(Method::POST, &url, Some(body)).await?;
        Ok(())
    }

    async fn delete_proxy_instances(
        &self,
        dataset_id: &DatasetId,
        body: &DeleteProxyInstancesBody,
    ) -> Result<()> {
        let url = self.dataset_url(dataset_id, "/proxy/package/instances/bulk");
        self.send(Method::DELETE, &url, Some(body)).await?;
        Ok(())
    }
}
