use axum::extract::State;
use axum::response::Json;

use rehearse_db::PracticeStats;

use super::{ApiError, AppState};

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<PracticeStats>, ApiError> {
    let stats = state.db.practice().stats().map_err(ApiError::database)?;
    Ok(Json(stats))
}
