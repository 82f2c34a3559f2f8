//! Billing service for the Lumino SDK

use crate::error::Result;
use crate::http::HttpClient;
use crate::services::check_date_range;
use crate::types::{CreditHistoryEntry, DateRangeQuery, ListOptions, ListResponse};
use chrono::NaiveDate;
use tracing::{info, instrument};

/// Service for account credits
#[derive(Clone)]
pub struct BillingService {
    http_client: HttpClient,
}

impl BillingService {
    /// Create a new billing service
    pub(crate) fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    /// Credits added to or deducted from the account between two dates
    #[instrument(skip(self), level = "debug")]
    pub async fn get_credit_history(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        options: ListOptions,
    ) -> Result<ListResponse<CreditHistoryEntry>> {
        check_date_range(start_date, end_date)?;
        info!(
            "Getting credit history from {} to {} (page {})",
            start_date, end_date, options.page
        );

        let query = DateRangeQuery {
            start_date,
            end_date,
            list: Some(options),
            service_name: None,
        };
        self.http_client
            .get_with_query(&["billing", "credit-history"], &query)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::services::test_http_client;
    use crate::types::BillingTransactionType;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_get_credit_history() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/billing/credit-history")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start_date".into(), "2024-01-01".into()),
                Matcher::UrlEncoded("end_date".into(), "2024-12-31".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": [{
                        "id": "123e4567-e89b-12d3-a456-426614174000",
                        "created_at": "2024-01-01T00:00:00Z",
                        "credits": 50.0,
                        "transaction_id": "tx_123",
                        "transaction_type": "NEW_USER_CREDIT"
                    }],
                    "pagination": {"total_pages": 1, "current_page": 1, "items_per_page": 20}
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let service = BillingService::new(test_http_client(server.url()));
        let page = service
            .get_credit_history(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                ListOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(page.data[0].transaction_type, BillingTransactionType::NewUserCredit);
        assert_eq!(page.data[0].credits, 50.0);

        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let service = BillingService::new(test_http_client("http://127.0.0.1:1".to_string()));
        let result = service
            .get_credit_history(
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                ListOptions::default(),
            )
            .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
    }
}
