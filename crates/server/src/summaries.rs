//! Period-summary API endpoints.

use api_types::summary::{SummaryReportRequest, SummaryReportResponse, SummaryType};
use axum::{Json, extract::State};
use engine::SummaryWindow;

use crate::{ServerError, server::ServerState};

pub async fn report(
    State(state): State<ServerState>,
    Json(payload): Json<SummaryReportRequest>,
) -> Result<Json<SummaryReportResponse>, ServerError> {
    let window = match payload.summary_type {
        SummaryType::Daily => {
            let (Some(start), Some(end)) = (payload.start_date, payload.end_date) else {
                return Err(ServerError::Generic(
                    "daily requires start_date and end_date".to_string(),
                ));
            };
            SummaryWindow::Daily { start, end }
        }
        SummaryType::Monthly => {
            let (Some(month), Some(year)) = (payload.month, payload.year) else {
                return Err(ServerError::Generic(
                    "monthly requires month and year".to_string(),
                ));
            };
            SummaryWindow::Monthly { month, year }
        }
        SummaryType::Yearly => {
            let Some(year) = payload.year else {
                return Err(ServerError::Generic("yearly requires year".to_string()));
            };
            SummaryWindow::Yearly { year }
        }
    };

    let totals = state.engine.summary_report(&payload.line_id, window).await?;

    Ok(Json(SummaryReportResponse {
        line_id: payload.line_id,
        total_income_minor: totals.total_income_minor,
        total_expense_minor: totals.total_expense_minor,
        total_balance_minor: totals.total_balance_minor,
    }))
}
