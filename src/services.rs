//! Endpoint services
//!
//! Each service groups the operations of one area of the Lumino API and
//! shares the client's HTTP session.

pub mod api_keys;
pub mod billing;
pub mod datasets;
pub mod fine_tuning;
pub mod models;
pub mod usage;
pub mod user;

pub use api_keys::ApiKeysService;
pub use billing::BillingService;
pub use datasets::DatasetsService;
pub use fine_tuning::FineTuningService;
pub use models::ModelsService;
pub use usage::UsageService;
pub use user::UserService;

use crate::error::{Error, Result};
use chrono::NaiveDate;

/// Reject ranges whose end falls before their start
pub(crate) fn check_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<()> {
    if end_date < start_date {
        return Err(Error::invalid_field(
            "end_date",
            "end_date must be equal to or after start_date",
        ));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_http_client(url: String) -> crate::http::HttpClient {
    let config = crate::config::ClientConfig::builder()
        .api_key("test-key")
        .base_url(url)
        .build()
        .unwrap();
    crate::http::HttpClient::new(config).unwrap()
}
