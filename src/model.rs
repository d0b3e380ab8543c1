use chrono::{NaiveDate, NaiveDateTime};
use diesel::{Insertable, Queryable, Selectable};
use serde::Serialize;

use crate::schema::{flashcards, holidays, reviews, users};

#[derive(Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub user_id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// A study card in one of the three Leitner boxes.
#[derive(Queryable, Selectable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = flashcards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Flashcard {
    pub card_id: i32,
    pub user_id: i32,
    pub question: String,
    pub answer: String,
    #[serde(rename = "box")]
    pub box_level: i32, // 1..=3, reset to 1 on a wrong answer
    pub created_at: NaiveDateTime,
    pub last_reviewed: Option<NaiveDate>,
}

#[derive(Insertable)]
#[diesel(table_name = flashcards)]
pub struct NewFlashcard<'a> {
    pub user_id: i32,
    pub question: &'a str,
    pub answer: &'a str,
    pub box_level: i32,
    pub created_at: NaiveDateTime,
}

/// One answered card. Append-only; the review history is the source of
/// truth for last-study-date and streak reconstruction.
#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Review {
    pub review_id: i32,
    pub user_id: i32,
    pub card_id: i32,
    pub correct: bool,
    pub timestamp: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReview {
    pub user_id: i32,
    pub card_id: i32,
    pub correct: bool,
    pub timestamp: NaiveDateTime,
}

/// A study pause with an inclusive date range.
#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = holidays)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Holiday {
    pub holiday_id: i32,
    pub user_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub skip_catchup: bool,
}

#[derive(Insertable)]
#[diesel(table_name = holidays)]
pub struct NewHoliday {
    pub user_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub skip_catchup: bool,
}

/// Wire form of an active holiday. `days_left` is derived from the end
/// date at read time and never stored.
#[derive(Serialize, Debug)]
pub struct ActiveHoliday {
    pub holiday_id: i32,
    pub user_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub skip_catchup: bool,
    pub days_left: i64,
}

impl ActiveHoliday {
    pub fn new(holiday: Holiday, today: NaiveDate) -> Self {
        let days_left = holiday.end_date.signed_duration_since(today).num_days() + 1;
        ActiveHoliday {
            holiday_id: holiday.holiday_id,
            user_id: holiday.user_id,
            start_date: holiday.start_date,
            end_date: holiday.end_date,
            skip_catchup: holiday.skip_catchup,
            days_left,
        }
    }
}
