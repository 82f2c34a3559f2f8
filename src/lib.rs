//! # Lumino - Rust client for the Lumino fine-tuning API
//!
//! This crate provides an idiomatic async Rust interface to the Lumino API,
//! a hosted service for fine-tuning large language models. It covers the
//! full workflow: uploading training datasets, launching and monitoring
//! fine-tuning jobs, and inspecting the resulting models, usage and credits.
//!
//! ## Features
//!
//! - One [`Client`] with grouped services:
//!   - `user`: the authenticated account
//!   - `api_keys`: create, rename, extend and revoke keys
//!   - `datasets`: upload, list, download and delete training data
//!   - `fine_tuning`: create, monitor, cancel and delete jobs
//!   - `models`: base model catalog and fine-tuned models
//!   - `usage` and `billing`: costs and credit history
//! - Typed requests and responses with serde
//! - Status-based error classification through [`Error`]
//! - Scoped HTTP sessions that release their connections on every exit path
//! - Structured logging with `tracing`
//!
//! ## Example
//!
//! ```rust,no_run
//! use lumino::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> lumino::Result<()> {
//!     let client = Client::from_env()?;
//!
//!     let job = client
//!         .with_session(|client| async move {
//!             let dataset = client
//!                 .datasets()
//!                 .upload("train.jsonl", &DatasetCreate::new("train-data"))
//!                 .await?;
//!
//!             let request = FineTuningJobCreate::new("llm_llama3_1_8b", dataset.name, "my-job")
//!                 .with_type(FineTuningJobType::Lora);
//!             client.fine_tuning().create(&request).await
//!         })
//!         .await?;
//!
//!     println!("{} is {}", job.name, job.status);
//!     Ok(())
//! }
//! ```

mod client;
mod error;

pub mod config;
pub mod http;
pub mod services;
pub mod types;

pub use client::{Client, SessionGuard};
pub use config::ClientConfig;
pub use error::{Error, Result};

/// Commonly used types
pub mod prelude {
    pub use crate::client::{Client, SessionGuard};
    pub use crate::config::ClientConfig;
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        ApiKeyCreate, ApiKeyUpdate, ComputeProvider, DatasetCreate, DatasetUpdate,
        FineTuningJobCreate, FineTuningJobParameters, FineTuningJobStatus, FineTuningJobType,
        ListOptions, ListResponse, UserUpdate,
    };
}
