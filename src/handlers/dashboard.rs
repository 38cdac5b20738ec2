use axum::extract::{Query, State};
use askama::Template;
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{render, signed_in, PageResult};
use crate::{
    filters,
    models::{ActivityItem, BatchSummary, DashboardData, DashboardStats, PieSlice, StatsPeriod, User},
    AppState,
};

/// One row of the batches/scans bar chart, scaled to the busiest row.
pub struct ChartBar {
    pub name: String,
    pub batches: u64,
    pub scans: u64,
    pub batches_pct: u64,
    pub scans_pct: u64,
}

fn chart_bars(data: &DashboardData) -> Vec<ChartBar> {
    let peak = data.chart_peak().max(1);
    data.chart_data
        .iter()
        .flatten()
        .map(|p| ChartBar {
            name: p.name.clone(),
            batches: p.batches,
            scans: p.scans,
            batches_pct: p.batches * 100 / peak,
            scans_pct: p.scans * 100 / peak,
        })
        .collect()
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    user: User,
    stats: DashboardStats,
    periods: Vec<StatsPeriod>,
    period: StatsPeriod,
    bars: Vec<ChartBar>,
    slices: Vec<PieSlice>,
    activity: Vec<ActivityItem>,
    recent_batches: Vec<BatchSummary>,
}

#[derive(Deserialize)]
pub struct DashboardQuery {
    period: Option<String>,
}

pub async fn dashboard(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> PageResult {
    let page = signed_in(cookies, &state)?;
    let period = query.period.as_deref().and_then(StatsPeriod::parse);

    let data = page.api.fetch_dashboard_stats(period).await;
    let bars = chart_bars(&data);

    let template = DashboardTemplate {
        user: page.user,
        stats: data.stats,
        periods: StatsPeriod::ALL.to_vec(),
        period: period.unwrap_or_default(),
        bars,
        slices: data.pie_data.unwrap_or_default(),
        activity: data.recent_activity.unwrap_or_default(),
        recent_batches: data.recent_batches,
    };
    render(&template)
}
