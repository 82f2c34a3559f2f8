//! Usage service for the Lumino SDK
//!
//! Cost and resource consumption reporting over a date range.

use crate::error::Result;
use crate::http::HttpClient;
use crate::services::check_date_range;
use crate::types::{DateRangeQuery, ListOptions, ListResponse, ServiceName, TotalCost, UsageRecord};
use chrono::NaiveDate;
use tracing::{info, instrument};

/// Service for usage and cost reporting
#[derive(Clone)]
pub struct UsageService {
    http_client: HttpClient,
}

impl UsageService {
    /// Create a new usage service
    pub(crate) fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    /// Total cost between two dates, inclusive
    ///
    /// A range whose end precedes its start fails with a validation error
    /// without contacting the server.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_total_cost(&self, start_date: NaiveDate, end_date: NaiveDate) -> Result<TotalCost> {
        check_date_range(start_date, end_date)?;
        info!("Getting total cost from {} to {}", start_date, end_date);

        let query = DateRangeQuery {
            start_date,
            end_date,
            list: None,
            service_name: None,
        };
        self.http_client
            .get_with_query(&["usage", "total-cost"], &query)
            .await
    }

    /// List usage records between two dates, optionally for one service
    #[instrument(skip(self), level = "debug")]
    pub async fn list_usage_records(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        options: ListOptions,
        service_name: Option<ServiceName>,
    ) -> Result<ListResponse<UsageRecord>> {
        check_date_range(start_date, end_date)?;
        info!(
            "Listing usage records from {} to {} (page {})",
            start_date, end_date, options.page
        );

        let query = DateRangeQuery {
            start_date,
            end_date,
            list: Some(options),
            service_name,
        };
        self.http_client
            .get_with_query(&["usage", "records"], &query)
            .await
    }
}
