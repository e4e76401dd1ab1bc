//! Report API endpoints.

use api_types::report::{
    ChartPoint, Charts, RangeMode as ApiRangeMode, TagReportRequest, TagReportResponse,
    TagReportRow as ApiRow, ReportSummary,
};
use axum::{Json, extract::State};
use engine::{RangeMode, RangeQuery, TagReportParams};

use crate::{ServerError, server::ServerState};

fn map_range_mode(mode: ApiRangeMode) -> RangeMode {
    match mode {
        ApiRangeMode::Today => RangeMode::Today,
        ApiRangeMode::Day => RangeMode::Day,
        ApiRangeMode::SevenDays => RangeMode::SevenDays,
        ApiRangeMode::Month => RangeMode::Month,
        ApiRangeMode::Year => RangeMode::Year,
        ApiRangeMode::Range => RangeMode::Range,
    }
}

pub async fn tags(
    State(state): State<ServerState>,
    Json(payload): Json<TagReportRequest>,
) -> Result<Json<TagReportResponse>, ServerError> {
    let params = TagReportParams {
        line_id: payload.line_id,
        range: RangeQuery {
            mode: payload.range.mode.map(map_range_mode),
            date: payload.range.date,
            month: payload.range.month,
            year: payload.range.year,
            start_date: payload.range.start_date,
            end_date: payload.range.end_date,
        },
        top_n_enabled: payload.top_n_enabled.unwrap_or(true),
        top_n: payload.top_n.unwrap_or(5),
        include_others: payload.include_others.unwrap_or(true),
    };

    let report = state.engine.tag_report(&params).await?;

    let tags: Vec<ApiRow> = report
        .rows
        .iter()
        .map(|row| ApiRow {
            tag_id: row.tag_id,
            tag_name: row.tag_name.clone(),
            income_minor: row.income_minor,
            expense_minor: row.expense_minor,
            net_minor: row.net_minor,
            percent_of_expense: row.percent_of_expense,
            color_index: row.color_index,
        })
        .collect();

    let points: Vec<ChartPoint> = report
        .rows
        .iter()
        .map(|row| ChartPoint {
            x: row.tag_name.clone(),
            y: row.expense_minor,
        })
        .collect();

    Ok(Json(TagReportResponse {
        start: report.start.fixed_offset(),
        end: report.end.fixed_offset(),
        summary: ReportSummary {
            income_minor: report.totals.income_minor,
            expense_minor: report.totals.expense_minor,
            net_minor: report.totals.net_minor,
        },
        tags,
        charts: Charts {
            bar: points.clone(),
            donut: points,
        },
    }))
}
