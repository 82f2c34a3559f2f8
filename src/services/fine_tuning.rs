//! Fine-tuning service for the Lumino SDK
//!
//! This module provides functionality for creating and managing
//! fine-tuning jobs.

use crate::error::Result;
use crate::http::HttpClient;
use crate::types::{
    FineTuningJob, FineTuningJobCreate, FineTuningJobDetail, FineTuningJobStatus, ListOptions,
    ListResponse,
};
use serde::Serialize;
use tracing::{info, instrument};

/// Query for listing jobs
#[derive(Debug, Serialize)]
struct ListJobsQuery {
    #[serde(flatten)]
    list: ListOptions,

    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<FineTuningJobStatus>,
}

/// Service for managing fine-tuning jobs
#[derive(Clone)]
pub struct FineTuningService {
    http_client: HttpClient,
}

impl FineTuningService {
    /// Create a new fine-tuning service
    pub(crate) fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    /// Create a fine-tuning job
    ///
    /// The request is sent as given. Parameter combinations the service does
    /// not support come back as a validation error from the server.
    #[instrument(skip(self, request), fields(name = %request.name), level = "debug")]
    pub async fn create(&self, request: &FineTuningJobCreate) -> Result<FineTuningJob> {
        info!("Creating fine-tuning job: {}", request.name);
        self.http_client.post(&["fine-tuning"], request).await
    }

    /// List fine-tuning jobs, optionally filtered by status
    #[instrument(skip(self), level = "debug")]
    pub async fn list(
        &self,
        options: ListOptions,
        status: Option<FineTuningJobStatus>,
    ) -> Result<ListResponse<FineTuningJob>> {
        info!("Listing fine-tuning jobs (page {})", options.page);
        let query = ListJobsQuery {
            list: options,
            status,
        };
        self.http_client
            .get_with_query(&["fine-tuning"], &query)
            .await
    }

    /// Get a job with its parameters, metrics and checkpoints
    #[instrument(skip(self), level = "debug")]
    pub async fn get(&self, name: &str) -> Result<FineTuningJobDetail> {
        info!("Getting fine-tuning job: {}", name);
        self.http_client.get(&["fine-tuning", name]).await
    }

    /// Cancel a running or queued job
    #[instrument(skip(self), level = "debug")]
    pub async fn cancel(&self, name: &str) -> Result<FineTuningJobDetail> {
        info!("Cancelling fine-tuning job: {}", name);
        self.http_client
            .post_empty(&["fine-tuning", name, "cancel"])
            .await
    }

    /// Delete a job
    #[instrument(skip(self), level = "debug")]
    pub async fn delete(&self, name: &str) -> Result<()> {
        info!("Deleting fine-tuning job: {}", name);
        self.http_client
            .delete_no_content(&["fine-tuning", name])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::services::test_http_client;
    use crate::types::{ComputeProvider, FineTuningJobParameters, FineTuningJobType};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn job_json(status: &str) -> serde_json::Value {
        json!({
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "base_model_name": "test-base-model",
            "dataset_name": "test-dataset",
            "status": status,
            "name": "test-job",
            "type": "LORA",
            "provider": "GCP",
            "current_step": null,
            "total_steps": null,
            "current_epoch": null,
            "total_epochs": null,
            "num_tokens": null
        })
    }

    fn detail_json(status: &str) -> serde_json::Value {
        let mut job = job_json(status);
        job["parameters"] = json!({"batch_size": 2, "shuffle": true, "num_epochs": 1});
        job["metrics"] = json!({"loss": 0.5});
        job
    }

    #[tokio::test]
    async fn test_create_job() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/fine-tuning")
            .match_body(Matcher::PartialJson(json!({
                "base_model_name": "test-base-model",
                "dataset_name": "test-dataset",
                "name": "test-job",
                "type": "LORA",
                "provider": "GCP",
                "parameters": {"batch_size": 2, "shuffle": true, "num_epochs": 1}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(job_json("NEW").to_string())
            .expect(1)
            .create_async()
            .await;

        let service = FineTuningService::new(test_http_client(server.url()));
        let request = FineTuningJobCreate::new("test-base-model", "test-dataset", "test-job")
            .with_type(FineTuningJobType::Lora)
            .with_provider(ComputeProvider::Gcp);
        let job = service.create(&request).await.unwrap();

        assert_eq!(job.name, "test-job");
        assert_eq!(job.status, FineTuningJobStatus::New);
        assert_eq!(job.job_type, FineTuningJobType::Lora);
        assert_eq!(job.provider, ComputeProvider::Gcp);

        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_lora_and_qlora_forwarded_and_rejection_surfaced() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/fine-tuning")
            .match_body(Matcher::PartialJson(json!({
                "parameters": {"use_lora": true, "use_qlora": true}
            })))
            .with_status(422)
            .with_body(
                json!({
                    "message": "use_lora and use_qlora cannot both be set",
                    "details": {"field": "parameters"}
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let service = FineTuningService::new(test_http_client(server.url()));
        let request = FineTuningJobCreate::new("base", "d1", "job").with_parameters(
            FineTuningJobParameters {
                use_lora: true,
                use_qlora: true,
                ..FineTuningJobParameters::default()
            },
        );
        let result = service.create(&request).await;

        match result {
            Err(Error::Validation {
                status_code,
                message,
                details,
                ..
            }) => {
                assert_eq!(status_code, Some(422));
                assert_eq!(message, "use_lora and use_qlora cannot both be set");
                assert_eq!(details.unwrap()["field"], "parameters");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_jobs_with_status_filter() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/fine-tuning")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("items_per_page".into(), "20".into()),
                Matcher::UrlEncoded("status".into(), "RUNNING".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": [job_json("RUNNING")],
                    "pagination": {"total_pages": 1, "current_page": 1, "items_per_page": 20}
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let service = FineTuningService::new(test_http_client(server.url()));
        let page = service
            .list(ListOptions::default(), Some(FineTuningJobStatus::Running))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].status, FineTuningJobStatus::Running);

        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_and_cancel_job() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", "/fine-tuning/test-job")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(detail_json("RUNNING").to_string())
            .create_async()
            .await;
        let cancel = server
            .mock("POST", "/fine-tuning/test-job/cancel")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(detail_json("STOPPING").to_string())
            .expect(1)
            .create_async()
            .await;

        let service = FineTuningService::new(test_http_client(server.url()));
        let detail = service.get("test-job").await.unwrap();
        assert_eq!(detail.job.status, FineTuningJobStatus::Running);
        assert_eq!(detail.parameters["batch_size"], 2);
        assert!(detail.checkpoints.is_empty());

        let cancelled = service.cancel("test-job").await.unwrap();
        assert_eq!(cancelled.job.status, FineTuningJobStatus::Stopping);
        cancel.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_job() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("DELETE", "/fine-tuning/test-job")
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let service = FineTuningService::new(test_http_client(server.url()));
        service.delete("test-job").await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_unknown_status_is_unknown_response() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/fine-tuning/test-job")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(detail_json("PAUSED").to_string())
            .create_async()
            .await;

        let service = FineTuningService::new(test_http_client(server.url()));
        let result = service.get("test-job").await;
        assert!(matches!(result, Err(Error::UnknownResponse(_))));
    }
}
