use super::client::{degrade, ApiClient, RequestOptions};
use crate::models::{DashboardData, StatsPeriod};

impl ApiClient {
    /// Dashboard figures; zeroed when the backend is unreachable.
    pub async fn fetch_dashboard_stats(&self, period: Option<StatsPeriod>) -> DashboardData {
        let endpoint = match period {
            Some(p) => format!("/stats?period={}", p.code()),
            None => "/stats".to_string(),
        };
        let result = self
            .request_enveloped::<DashboardData>(&endpoint, RequestOptions::get())
            .await;
        degrade("dashboard stats", result, DashboardData::default())
    }
}
