//! Models service for the Lumino SDK
//!
//! Read access to the base model catalog and management of the models
//! produced by fine-tuning jobs.

use crate::error::Result;
use crate::http::HttpClient;
use crate::types::{BaseModel, FineTunedModel, JsonObject, ListOptions, ListResponse};
use serde::Serialize;
use tracing::{info, instrument};

/// Body of a model comparison request
#[derive(Debug, Serialize)]
struct CompareModelsRequest<'a> {
    models: &'a [&'a str],
}

/// Service for base and fine-tuned models
#[derive(Clone)]
pub struct ModelsService {
    http_client: HttpClient,
}

impl ModelsService {
    /// Create a new models service
    pub(crate) fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    /// List base models available for fine-tuning
    #[instrument(skip(self), level = "debug")]
    pub async fn list_base_models(&self, options: ListOptions) -> Result<ListResponse<BaseModel>> {
        info!("Listing base models (page {})", options.page);
        self.http_client
            .get_with_query(&["models", "base"], &options)
            .await
    }

    /// Get a base model by name
    #[instrument(skip(self), level = "debug")]
    pub async fn get_base_model(&self, name: &str) -> Result<BaseModel> {
        info!("Getting base model: {}", name);
        self.http_client.get(&["models", "base", name]).await
    }

    /// List models produced by fine-tuning jobs
    #[instrument(skip(self), level = "debug")]
    pub async fn list_fine_tuned_models(
        &self,
        options: ListOptions,
    ) -> Result<ListResponse<FineTunedModel>> {
        info!("Listing fine-tuned models (page {})", options.page);
        self.http_client
            .get_with_query(&["models", "fine-tuned"], &options)
            .await
    }

    /// Get a fine-tuned model by name
    #[instrument(skip(self), level = "debug")]
    pub async fn get_fine_tuned_model(&self, name: &str) -> Result<FineTunedModel> {
        info!("Getting fine-tuned model: {}", name);
        self.http_client
            .get(&["models", "fine-tuned", name])
            .await
    }

    /// Delete a fine-tuned model
    #[instrument(skip(self), level = "debug")]
    pub async fn delete_fine_tuned_model(&self, name: &str) -> Result<()> {
        info!("Deleting fine-tuned model: {}", name);
        self.http_client
            .delete_no_content(&["models", "fine-tuned", name])
            .await
    }

    /// Performance metrics of a base or fine-tuned model
    #[instrument(skip(self), level = "debug")]
    pub async fn get_model_performance(&self, name: &str) -> Result<JsonObject> {
        info!("Getting performance metrics for model: {}", name);
        self.http_client
            .get(&["models", name, "performance"])
            .await
    }

    /// Compare performance metrics across several models
    #[instrument(skip(self), level = "debug")]
    pub async fn compare_models(&self, model_names: &[&str]) -> Result<JsonObject> {
        info!("Comparing models: {}", model_names.join(", "));
        let request = CompareModelsRequest {
            models: model_names,
        };
        self.http_client
            .post(&["models", "compare"], &request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_http_client;
    use crate::types::{BaseModelStatus, FineTunedModelStatus};
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_and_get_base_models() {
        let mut server = Server::new_async().await;
        let model = json!({
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "description": "Llama 3.1 8B",
            "hf_url": "https://huggingface.co/meta-llama/Meta-Llama-3.1-8B",
            "status": "ACTIVE",
            "name": "llm_llama3_1_8b",
            "meta": {"context_length": 8192}
        });
        let list = server
            .mock("GET", "/models/base")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": [model.clone()],
                    "pagination": {"total_pages": 1, "current_page": 1, "items_per_page": 20}
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/models/base/llm_llama3_1_8b")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(model.to_string())
            .expect(1)
            .create_async()
            .await;

        let service = ModelsService::new(test_http_client(server.url()));
        let page = service.list_base_models(ListOptions::default()).await.unwrap();
        assert_eq!(page.data[0].status, BaseModelStatus::Active);

        let base = service.get_base_model("llm_llama3_1_8b").await.unwrap();
        assert_eq!(base.meta.unwrap()["context_length"], 8192);

        list.assert_async().await;
        get.assert_async().await;
    }

    #[tokio::test]
    async fn test_fine_tuned_models() {
        let mut server = Server::new_async().await;
        let model = json!({
            "id": "123e4567-e89b-12d3-a456-426614174001",
            "created_at": "2024-01-02T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z",
            "fine_tuning_job_name": "test-job",
            "status": "ACTIVE",
            "name": "test-job-model",
            "artifacts": {"weights": "gs://bucket/weights"}
        });
        let _list = server
            .mock("GET", "/models/fine-tuned")
            .match_query(Matcher::UrlEncoded("page".into(), "3".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": [],
                    "pagination": {"total_pages": 2, "current_page": 3, "items_per_page": 20}
                })
                .to_string(),
            )
            .create_async()
            .await;
        let _get = server
            .mock("GET", "/models/fine-tuned/test-job-model")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(model.to_string())
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/models/fine-tuned/test-job-model")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let service = ModelsService::new(test_http_client(server.url()));
        let page = service
            .list_fine_tuned_models(ListOptions::page(3))
            .await
            .unwrap();
        assert!(page.is_empty());
        assert!(!page.has_next_page());

        let model = service.get_fine_tuned_model("test-job-model").await.unwrap();
        assert_eq!(model.status, FineTunedModelStatus::Active);
        assert_eq!(model.fine_tuning_job_name, "test-job");

        service
            .delete_fine_tuned_model("test-job-model")
            .await
            .unwrap();
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_model_performance() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/models/test-job-model/performance")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"accuracy": 0.91, "perplexity": 3.2}"#)
            .expect(1)
            .create_async()
            .await;

        let service = ModelsService::new(test_http_client(server.url()));
        let metrics = service.get_model_performance("test-job-model").await.unwrap();
        assert_eq!(metrics["accuracy"], 0.91);

        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_compare_models_sends_names() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/models/compare")
            .match_body(Matcher::Json(json!({
                "models": ["llm_llama3_1_8b", "test-job-model"]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "llm_llama3_1_8b": {"accuracy": 0.85},
                    "test-job-model": {"accuracy": 0.91}
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let service = ModelsService::new(test_http_client(server.url()));
        let comparison = service
            .compare_models(&["llm_llama3_1_8b", "test-job-model"])
            .await
            .unwrap();
        assert_eq!(comparison["test-job-model"]["accuracy"], 0.91);

        m.assert_async().await;
    }
}
