use serde::Deserialize;

use super::{de, BatchSummary, Id};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_batches: u64,
    #[serde(default)]
    pub qr_scans: u64,
    #[serde(default)]
    pub verification_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PieSlice {
    pub name: String,
    pub value: u64,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    #[serde(default)]
    pub batches: u64,
    #[serde(default)]
    pub scans: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivityItem {
    pub id: Id,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub message: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub time: String,
}

/// Everything the dashboard home shows. Missing sections stay `None` and the
/// page hides them.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    #[serde(default, deserialize_with = "de::null_default")]
    pub stats: DashboardStats,
    #[serde(default, deserialize_with = "de::null_default")]
    pub recent_batches: Vec<BatchSummary>,
    #[serde(default)]
    pub pie_data: Option<Vec<PieSlice>>,
    #[serde(default)]
    pub chart_data: Option<Vec<ChartPoint>>,
    #[serde(default)]
    pub recent_activity: Option<Vec<ActivityItem>>,
}

impl DashboardData {
    /// Largest bar in the chart, used to scale bar widths.
    pub fn chart_peak(&self) -> u64 {
        self.chart_data
            .iter()
            .flatten()
            .map(|p| p.batches.max(p.scans))
            .max()
            .unwrap_or(0)
    }
}

/// Reporting windows accepted by `GET /stats?period=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsPeriod {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl StatsPeriod {
    pub const ALL: [StatsPeriod; 4] = [
        StatsPeriod::Week,
        StatsPeriod::Month,
        StatsPeriod::Quarter,
        StatsPeriod::Year,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            StatsPeriod::Week => "7d",
            StatsPeriod::Month => "30d",
            StatsPeriod::Quarter => "90d",
            StatsPeriod::Year => "1y",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatsPeriod::Week => "Last 7 days",
            StatsPeriod::Month => "Last 30 days",
            StatsPeriod::Quarter => "Last 90 days",
            StatsPeriod::Year => "Last year",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_default() {
        let data: DashboardData =
            serde_json::from_str(r#"{"success":true,"stats":null,"recentBatches":[]}"#).unwrap();
        assert_eq!(data.stats, DashboardStats::default());
        assert!(data.chart_data.is_none());
        assert_eq!(data.chart_peak(), 0);
    }

    #[test]
    fn period_codes_round_trip() {
        for period in StatsPeriod::ALL {
            assert_eq!(StatsPeriod::parse(period.code()), Some(period));
        }
        assert_eq!(StatsPeriod::parse("2w"), None);
    }
}
