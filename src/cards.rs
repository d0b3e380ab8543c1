use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    DbPool,
    model::{Flashcard, Review},
    store::{CardStore, ReviewStore},
    utils,
};

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub card_id: i32,
    pub correct: bool,
}

pub async fn list_cards(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
) -> Result<Json<Vec<Flashcard>>, (StatusCode, String)> {
    let user_id = match utils::get_current_user_id(&session).await {
        Some(id) => id,
        None => return Err((StatusCode::UNAUTHORIZED, "Not logged in".to_string())),
    };

    let mut conn = pool.get().map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;

    let cards = CardStore::list_by_user(&mut conn, user_id).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;

    Ok(Json(cards))
}

/// Records an answer. The card moves up a box when correct (capped at 3)
/// and drops back to box 1 when wrong; the review row itself is
/// append-only history.
pub async fn submit_review(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<Review>, (StatusCode, String)> {
    let user_id = match utils::get_current_user_id(&session).await {
        Some(id) => id,
        None => return Err((StatusCode::UNAUTHORIZED, "Not logged in".to_string())),
    };

    let mut conn = pool.get().map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;

    let now = Utc::now().naive_utc();
    let review = ReviewStore::record(&mut conn, user_id, payload.card_id, payload.correct, now)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => {
                (StatusCode::NOT_FOUND, "Card not found".to_string())
            }
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", other),
            ),
        })?;

    Ok(Json(review))
}
