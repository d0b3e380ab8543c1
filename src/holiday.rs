use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::{DbPool, model::Holiday, store::HolidayStore, utils};

#[derive(Error, Debug)]
pub enum HolidayError {
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("No active holiday")]
    NoActiveHoliday,
    #[error("Holiday start date must not be after its end date")]
    InvalidRange,
    #[error("Database error")]
    DatabaseError(#[from] diesel::result::Error),
    #[error("Connection pool error")]
    PoolError(#[from] r2d2::Error),
}

impl IntoResponse for HolidayError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HolidayError::NotLoggedIn => (StatusCode::UNAUTHORIZED, self.to_string()),
            HolidayError::NoActiveHoliday => (StatusCode::NOT_FOUND, self.to_string()),
            HolidayError::InvalidRange => (StatusCode::BAD_REQUEST, self.to_string()),
            HolidayError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
            HolidayError::PoolError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
        };

        let body = json!({
            "error": message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

#[derive(Deserialize)]
pub struct HolidayRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct ExtendRequest {
    pub extra_days: i64,
}

#[derive(Deserialize)]
pub struct SkipRequest {
    pub skip: bool,
}

#[derive(Serialize)]
pub struct HolidayStatus {
    pub on_holiday: bool,
}

async fn current_user(session: &tower_sessions::Session) -> Result<i32, HolidayError> {
    utils::get_current_user_id(session)
        .await
        .ok_or(HolidayError::NotLoggedIn)
}

/// Opens a holiday. The scheduling core assumes `start <= end`, so the
/// boundary rejects inverted ranges here.
pub async fn create_holiday(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Json(payload): Json<HolidayRequest>,
) -> Result<Json<Holiday>, HolidayError> {
    let user_id = current_user(&session).await?;

    if payload.start_date > payload.end_date {
        return Err(HolidayError::InvalidRange);
    }

    let mut conn = pool.get()?;
    let holiday = HolidayStore::create(&mut conn, user_id, payload.start_date, payload.end_date)?;

    log::info!(
        "User {} on holiday {} - {}",
        user_id,
        holiday.start_date,
        holiday.end_date
    );
    Ok(Json(holiday))
}

pub async fn holiday_status(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
) -> Result<Json<HolidayStatus>, HolidayError> {
    let user_id = current_user(&session).await?;

    let mut conn = pool.get()?;
    let today = Utc::now().date_naive();
    let active = HolidayStore::active(&mut conn, user_id, today)?;

    Ok(Json(HolidayStatus {
        on_holiday: active.is_some(),
    }))
}

pub async fn extend_holiday(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Json(payload): Json<ExtendRequest>,
) -> Result<Json<Holiday>, HolidayError> {
    let user_id = current_user(&session).await?;

    let mut conn = pool.get()?;
    let today = Utc::now().date_naive();
    let holiday = HolidayStore::extend(&mut conn, user_id, payload.extra_days, today)?
        .ok_or(HolidayError::NoActiveHoliday)?;

    Ok(Json(holiday))
}

pub async fn set_skip_catchup(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Json(payload): Json<SkipRequest>,
) -> Result<Json<Holiday>, HolidayError> {
    let user_id = current_user(&session).await?;

    let mut conn = pool.get()?;
    let today = Utc::now().date_naive();
    let holiday = HolidayStore::set_skip_catchup(&mut conn, user_id, payload.skip, today)?
        .ok_or(HolidayError::NoActiveHoliday)?;

    Ok(Json(holiday))
}
