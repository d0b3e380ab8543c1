use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;

use crate::{
    DbPool,
    model::{ActiveHoliday, Review},
    scheduler::{self, StreakStatus},
    store::{CardStore, HolidayStore, ReviewStore},
    utils,
};

#[derive(Serialize)]
pub struct Dashboard {
    pub history: Vec<Review>,
    pub mastered: i64,
    pub streak: u32,
    pub streak_status: StreakStatus,
    pub holiday: Option<ActiveHoliday>,
}

pub async fn get_history(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
) -> Result<Json<Vec<Review>>, (StatusCode, String)> {
    let user_id = match utils::get_current_user_id(&session).await {
        Some(id) => id,
        None => return Err((StatusCode::UNAUTHORIZED, "Not logged in".to_string())),
    };

    let mut conn = pool.get().map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;

    let history = ReviewStore::history(&mut conn, user_id).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;

    Ok(Json(history))
}

pub async fn get_dashboard(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
) -> Result<Json<Dashboard>, (StatusCode, String)> {
    let user_id = match utils::get_current_user_id(&session).await {
        Some(id) => id,
        None => return Err((StatusCode::UNAUTHORIZED, "Not logged in".to_string())),
    };

    let mut conn = pool.get().map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;

    let today = Utc::now().date_naive();

    let history = ReviewStore::history(&mut conn, user_id).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;
    let mastered = CardStore::mastered_count(&mut conn, user_id).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;
    let holiday = HolidayStore::active(&mut conn, user_id, today).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;

    let (streak, streak_status) = scheduler::streak_with_status(&history, holiday.is_some());

    Ok(Json(Dashboard {
        history,
        mastered,
        streak,
        streak_status,
        holiday: holiday.map(|h| ActiveHoliday::new(h, today)),
    }))
}
