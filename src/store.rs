use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::model::{Flashcard, Holiday, NewFlashcard, NewHoliday, NewReview, NewUser, Review, User};
use crate::schema::{flashcards, holidays, reviews, users};

fn last_insert_rowid(conn: &mut SqliteConnection) -> QueryResult<i32> {
    diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()")).get_result(conn)
}

pub struct UserStore;

impl UserStore {
    pub fn find_by_email(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> QueryResult<Option<User>> {
        users::table
            .filter(users::email.eq(email))
            .first::<User>(conn)
            .optional()
    }

    pub fn email_exists(conn: &mut SqliteConnection, email: &str) -> QueryResult<bool> {
        use diesel::dsl::exists;

        diesel::select(exists(users::table.filter(users::email.eq(email)))).get_result(conn)
    }

    pub fn create(
        conn: &mut SqliteConnection,
        email: &str,
        password: &str,
    ) -> Result<User, crate::auth::RegisterError> {
        let hashed_password = hash(password, DEFAULT_COST)?;

        diesel::insert_into(users::table)
            .values(&NewUser {
                email,
                password: &hashed_password,
            })
            .execute(conn)?;

        let user = users::table.filter(users::email.eq(email)).first(conn)?;
        Ok(user)
    }

    pub fn verify_password(stored_hash: &str, input_password: &str) -> Result<bool, bcrypt::BcryptError> {
        verify(input_password, stored_hash)
    }
}

pub struct CardStore;

impl CardStore {
    pub fn list_by_user(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> QueryResult<Vec<Flashcard>> {
        flashcards::table
            .filter(flashcards::user_id.eq(user_id))
            .order(flashcards::card_id.asc())
            .load(conn)
    }

    pub fn insert(conn: &mut SqliteConnection, card: &NewFlashcard) -> QueryResult<Flashcard> {
        diesel::insert_into(flashcards::table)
            .values(card)
            .execute(conn)?;

        let card_id = last_insert_rowid(conn)?;
        flashcards::table.find(card_id).first(conn)
    }

    /// Cards the user has pushed all the way to box 3.
    pub fn mastered_count(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<i64> {
        flashcards::table
            .filter(flashcards::user_id.eq(user_id))
            .filter(flashcards::box_level.eq(3))
            .count()
            .get_result(conn)
    }
}

pub struct ReviewStore;

impl ReviewStore {
    pub fn history(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Vec<Review>> {
        reviews::table
            .filter(reviews::user_id.eq(user_id))
            .order(reviews::timestamp.asc())
            .load(conn)
    }

    /// Calendar date of the user's most recent review, if any.
    pub fn last_study_date(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> QueryResult<Option<NaiveDate>> {
        let last: Option<Review> = reviews::table
            .filter(reviews::user_id.eq(user_id))
            .order(reviews::timestamp.desc())
            .first(conn)
            .optional()?;

        Ok(last.map(|review| review.timestamp.date()))
    }

    /// Appends a review and moves the card between boxes: up one on a
    /// correct answer (capped at 3), back to box 1 on a wrong one. Fails
    /// with `NotFound` when the card does not belong to the user.
    pub fn record(
        conn: &mut SqliteConnection,
        user_id: i32,
        card_id: i32,
        correct: bool,
        now: NaiveDateTime,
    ) -> QueryResult<Review> {
        let card: Flashcard = flashcards::table
            .find(card_id)
            .filter(flashcards::user_id.eq(user_id))
            .first(conn)?;

        let next_box = if correct { (card.box_level + 1).min(3) } else { 1 };

        diesel::update(flashcards::table.find(card_id))
            .set((
                flashcards::box_level.eq(next_box),
                flashcards::last_reviewed.eq(now.date()),
            ))
            .execute(conn)?;

        diesel::insert_into(reviews::table)
            .values(&NewReview {
                user_id,
                card_id,
                correct,
                timestamp: now,
            })
            .execute(conn)?;

        let review_id = last_insert_rowid(conn)?;
        reviews::table.find(review_id).first(conn)
    }
}

pub struct HolidayStore;

impl HolidayStore {
    /// Inserts a new holiday record. Callers validate `start <= end`.
    pub fn create(
        conn: &mut SqliteConnection,
        user_id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> QueryResult<Holiday> {
        diesel::insert_into(holidays::table)
            .values(&NewHoliday {
                user_id,
                start_date,
                end_date,
                skip_catchup: false,
            })
            .execute(conn)?;

        let holiday_id = last_insert_rowid(conn)?;
        holidays::table.find(holiday_id).first(conn)
    }

    /// The holiday whose inclusive range contains `today`. Overlapping
    /// records are not prevented; the lowest id wins.
    pub fn active(
        conn: &mut SqliteConnection,
        user_id: i32,
        today: NaiveDate,
    ) -> QueryResult<Option<Holiday>> {
        holidays::table
            .filter(holidays::user_id.eq(user_id))
            .filter(holidays::start_date.le(today))
            .filter(holidays::end_date.ge(today))
            .order(holidays::holiday_id.asc())
            .first(conn)
            .optional()
    }

    /// Pushes the active holiday's end date forward. `None` when no
    /// holiday is active today.
    pub fn extend(
        conn: &mut SqliteConnection,
        user_id: i32,
        extra_days: i64,
        today: NaiveDate,
    ) -> QueryResult<Option<Holiday>> {
        let Some(holiday) = Self::active(conn, user_id, today)? else {
            return Ok(None);
        };

        let new_end = holiday.end_date + Duration::days(extra_days);
        diesel::update(holidays::table.find(holiday.holiday_id))
            .set(holidays::end_date.eq(new_end))
            .execute(conn)?;

        holidays::table.find(holiday.holiday_id).first(conn).map(Some)
    }

    /// Toggles catch-up skipping on the active holiday. `None` when no
    /// holiday is active today.
    pub fn set_skip_catchup(
        conn: &mut SqliteConnection,
        user_id: i32,
        skip: bool,
        today: NaiveDate,
    ) -> QueryResult<Option<Holiday>> {
        let Some(holiday) = Self::active(conn, user_id, today)? else {
            return Ok(None);
        };

        diesel::update(holidays::table.find(holiday.holiday_id))
            .set(holidays::skip_catchup.eq(skip))
            .execute(conn)?;

        holidays::table.find(holiday.holiday_id).first(conn).map(Some)
    }
}
