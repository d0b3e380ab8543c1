use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::{
    DbPool,
    model::Flashcard,
    scheduler,
    store::{CardStore, HolidayStore, ReviewStore},
    utils,
};

#[derive(Serialize)]
pub struct DailyReview {
    pub today: Vec<Flashcard>,
    pub catchup: Vec<Flashcard>,
    pub missed_days: bool,
}

/// Today's review set plus the reconstructed set for the most recent
/// missed day. `missed_days` is true exactly when the catch-up set is
/// non-empty.
pub async fn get_daily(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
) -> Result<Json<DailyReview>, (StatusCode, String)> {
    let user_id = match utils::get_current_user_id(&session).await {
        Some(id) => id,
        None => return Err((StatusCode::UNAUTHORIZED, "Not logged in".to_string())),
    };

    let mut conn = pool.get().map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;

    // The date is pinned once here; everything below is a pure function
    // of the snapshot.
    let today = Utc::now().date_naive();

    let cards = CardStore::list_by_user(&mut conn, user_id).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;
    let last_study = ReviewStore::last_study_date(&mut conn, user_id).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;
    let holiday = HolidayStore::active(&mut conn, user_id, today).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;

    let mut rng = StdRng::from_entropy();
    let today_cards =
        scheduler::select_daily(cards.clone(), today, scheduler::DAILY_LIMIT, &mut rng);
    let catchup = scheduler::select_catchup(
        cards,
        last_study,
        holiday.as_ref(),
        today,
        scheduler::DAILY_LIMIT,
        &mut rng,
    );

    Ok(Json(DailyReview {
        missed_days: !catchup.is_empty(),
        today: today_cards,
        catchup,
    }))
}
