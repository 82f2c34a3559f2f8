//! Type definitions for the Lumino SDK
//!
//! Request and response bodies exchanged with the Lumino API. Responses are
//! snapshots of server state; nothing here is cached or mutated locally.
//!
//! Response types tolerate extra fields but reject missing required fields,
//! mistyped values and unknown enum variants.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Free-form JSON object returned for metadata, metrics and similar fields
pub type JsonObject = HashMap<String, Value>;

/// Status of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// Status of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiKeyStatus {
    Active,
    Expired,
    Revoked,
}

/// Processing status of an uploaded dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetStatus {
    Uploaded,
    Validated,
    Error,
    Deleted,
}

/// Lifecycle status of a fine-tuning job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FineTuningJobStatus {
    New,
    Queued,
    Running,
    Stopping,
    /// Stopped by the user or the system
    #[serde(alias = "CANCELLED")]
    Stopped,
    /// Finished successfully
    #[serde(alias = "SUCCEEDED")]
    Completed,
    Failed,
    Deleted,
}

impl FineTuningJobStatus {
    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Stopped => "STOPPED",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Deleted => "DELETED",
        }
    }

    /// Whether the job can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Stopped | Self::Completed | Self::Failed | Self::Deleted
        )
    }
}

impl std::fmt::Display for FineTuningJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of fine-tuning performed by a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FineTuningJobType {
    Full,
    Lora,
    Qlora,
}

/// Compute provider a job runs on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComputeProvider {
    #[default]
    Gcp,
    Lum,
}

/// Availability of a base model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaseModelStatus {
    Active,
    Inactive,
    Deprecated,
}

/// Status of a fine-tuned model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FineTunedModelStatus {
    Active,
    Deleted,
}

/// Unit usage is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageUnit {
    Token,
}

/// Billable service a usage record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceName {
    FineTuningJob,
}

/// Kind of credit transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingTransactionType {
    ManualAdjustment,
    NewUserCredit,
    FineTuningJob,
    StripeCheckout,
}

/// Date-times in request bodies are sent as `YYYY-MM-DDTHH:MM:SSZ`
mod utc_seconds {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub mod option {
        use super::FORMAT;
        use chrono::{DateTime, Utc};
        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.collect_str(&value.format(FORMAT)),
                None => serializer.serialize_none(),
            }
        }
    }
}

/// Page and page size for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListOptions {
    /// 1-based page number
    pub page: u32,

    /// Number of items per page
    pub items_per_page: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            items_per_page: 20,
        }
    }
}

impl ListOptions {
    /// Options for a specific page with the default page size
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Set the page size
    pub fn with_items_per_page(mut self, items_per_page: u32) -> Self {
        self.items_per_page = items_per_page;
        self
    }
}

/// Pagination information returned with list responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_pages: u32,
    pub current_page: u32,
    pub items_per_page: u32,
}

/// One page of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Items on this page
    pub data: Vec<T>,

    /// Pagination information
    pub pagination: Pagination,
}

impl<T> ListResponse<T> {
    /// Whether more pages follow this one
    pub fn has_next_page(&self) -> bool {
        self.pagination.current_page < self.pagination.total_pages
    }

    /// Whether the page holds no items
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> IntoIterator for ListResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

/// The authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: UserStatus,
    pub name: String,
    pub email: String,
    pub credits_balance: f64,
}

/// Changes to the authenticated user
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An API key, without its secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub status: ApiKeyStatus,
    pub name: String,

    /// First few characters of the key
    pub prefix: String,
}

/// A newly created API key; the secret is only ever returned here
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyWithSecret {
    #[serde(flatten)]
    pub key: ApiKey,

    /// The full key value
    pub secret: String,
}

/// Request to create an API key
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyCreate {
    pub name: String,

    /// Must be in the future
    #[serde(serialize_with = "utc_seconds::serialize")]
    pub expires_at: DateTime<Utc>,
}

impl ApiKeyCreate {
    pub fn new(name: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            expires_at,
        }
    }
}

/// Changes to an existing API key
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiKeyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "utc_seconds::option::serialize"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

/// An uploaded dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: DatasetStatus,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,

    /// Name of the stored file
    pub file_name: String,

    /// Size of the stored file in bytes
    pub file_size: u64,

    /// Errors found while validating the dataset
    #[serde(default)]
    pub errors: Option<JsonObject>,
}

/// Metadata sent with a dataset upload
#[derive(Debug, Clone)]
pub struct DatasetCreate {
    pub name: String,
    pub description: Option<String>,
}

impl DatasetCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Changes to an existing dataset
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Hyperparameters for a fine-tuning job
///
/// Every field is sent exactly as set; combinations such as `use_lora` and
/// `use_qlora` together are left for the server to accept or reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineTuningJobParameters {
    pub batch_size: u32,
    pub shuffle: bool,
    pub num_epochs: u32,
    pub use_lora: bool,
    pub use_qlora: bool,

    /// Learning rate
    pub lr: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for FineTuningJobParameters {
    fn default() -> Self {
        Self {
            batch_size: 2,
            shuffle: true,
            num_epochs: 1,
            use_lora: false,
            use_qlora: false,
            lr: 3e-4,
            seed: None,
        }
    }
}

/// Request to create a fine-tuning job
#[derive(Debug, Clone, Serialize)]
pub struct FineTuningJobCreate {
    pub base_model_name: String,
    pub dataset_name: String,
    pub name: String,

    /// Left to the server's default when unset
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<FineTuningJobType>,

    pub provider: ComputeProvider,
    pub parameters: FineTuningJobParameters,
}

impl FineTuningJobCreate {
    pub fn new(
        base_model_name: impl Into<String>,
        dataset_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            base_model_name: base_model_name.into(),
            dataset_name: dataset_name.into(),
            name: name.into(),
            job_type: None,
            provider: ComputeProvider::default(),
            parameters: FineTuningJobParameters::default(),
        }
    }

    pub fn with_type(mut self, job_type: FineTuningJobType) -> Self {
        self.job_type = Some(job_type);
        self
    }

    pub fn with_provider(mut self, provider: ComputeProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_parameters(mut self, parameters: FineTuningJobParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// A fine-tuning job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTuningJob {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub base_model_name: String,
    pub dataset_name: String,
    pub status: FineTuningJobStatus,
    pub name: String,
    #[serde(rename = "type")]
    pub job_type: FineTuningJobType,
    pub provider: ComputeProvider,
    #[serde(default)]
    pub current_step: Option<u64>,
    #[serde(default)]
    pub total_steps: Option<u64>,
    #[serde(default)]
    pub current_epoch: Option<u32>,
    #[serde(default)]
    pub total_epochs: Option<u32>,
    #[serde(default)]
    pub num_tokens: Option<u64>,
}

/// A saved intermediate state of a fine-tuning job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default)]
    pub epoch: Option<u32>,
    #[serde(default)]
    pub step: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Remaining server-supplied fields
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A fine-tuning job with its parameters, metrics and checkpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTuningJobDetail {
    #[serde(flatten)]
    pub job: FineTuningJob,

    /// Parameters the job was created with
    pub parameters: JsonObject,

    #[serde(default)]
    pub metrics: Option<JsonObject>,

    #[serde(default)]
    pub timestamps: Option<JsonObject>,

    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
}

/// A base model available for fine-tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseModel {
    pub id: Uuid,
    #[serde(default)]
    pub description: Option<String>,

    /// Hugging Face URL of the model
    pub hf_url: String,
    pub status: BaseModelStatus,
    pub name: String,
    #[serde(default)]
    pub meta: Option<JsonObject>,
}

/// A model produced by a fine-tuning job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTunedModel {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fine_tuning_job_name: String,
    pub status: FineTunedModelStatus,
    pub name: String,
    #[serde(default)]
    pub artifacts: Option<JsonObject>,
}

/// A billable usage entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub service_name: ServiceName,
    pub usage_amount: f64,
    pub usage_unit: UsageUnit,
    pub cost: f64,
    pub fine_tuning_job_name: String,
}

/// Total cost over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalCost {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: f64,
}

/// A credit added to or deducted from the account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditHistoryEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub credits: f64,
    pub transaction_id: String,
    pub transaction_type: BillingTransactionType,
}

/// Date range query shared by usage and billing endpoints
#[derive(Debug, Serialize)]
pub(crate) struct DateRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub list: Option<ListOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<ServiceName>,
}
