//! Economic events endpoint

use axum::{extract::State, Json};

use super::error::ApiError;
use crate::{calendar::EconomicEvent, state::AppState};

/// GET /api/economic-events - This week's economic calendar.
pub async fn list_economic_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EconomicEvent>>, ApiError> {
    let events = state.calendar.get_events().await?;
    Ok(Json(events))
}
