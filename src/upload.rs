use axum::{
    extract::{Json, Multipart, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;

use crate::{
    DbPool,
    generator::{self, GeneratorClient},
    model::{Flashcard, NewFlashcard},
    store::CardStore,
    utils,
};

#[derive(Serialize)]
pub struct UploadResponse {
    pub flashcards: Vec<Flashcard>,
}

/// Accepts a study document, turns its text into question/answer pairs
/// and stores them as fresh box-1 cards. A document that produces no
/// pairs is not an error.
pub async fn upload_file(
    State((pool, generator)): State<(DbPool, GeneratorClient)>,
    session: tower_sessions::Session,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let user_id = match utils::get_current_user_id(&session).await {
        Some(id) => id,
        None => return Err((StatusCode::UNAUTHORIZED, "Not logged in".to_string())),
    };

    let mut text = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (StatusCode::BAD_REQUEST, format!("Invalid upload: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.txt").to_string();
        let bytes = field.bytes().await.map_err(|e| {
            (StatusCode::BAD_REQUEST, format!("Invalid upload: {}", e))
        })?;

        text = Some(extract_text(&filename, &bytes)?);
    }

    let Some(text) = text else {
        return Err((StatusCode::BAD_REQUEST, "Missing file field".to_string()));
    };

    let mut conn = pool.get().map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
    })?;

    let now = Utc::now().naive_utc();
    let mut created = Vec::new();

    for chunk in generator::chunk_text(&text, generator::MAX_CHUNK_CHARS) {
        for pair in generator.flashcards_for_chunk(&chunk).await {
            let card = CardStore::insert(
                &mut conn,
                &NewFlashcard {
                    user_id,
                    question: &pair.question,
                    answer: &pair.answer,
                    box_level: 1,
                    created_at: now,
                },
            )
            .map_err(|e| {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
            })?;
            created.push(card);
        }
    }

    log::info!("Generated {} flashcards for user {}", created.len(), user_id);
    Ok(Json(UploadResponse { flashcards: created }))
}

/// Plain-text extraction. Office and PDF documents need their own
/// extractors, which live outside this service.
fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, (StatusCode, String)> {
    let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    match extension.as_str() {
        "pdf" | "docx" | "pptx" => Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Unsupported file type: .{}", extension),
        )),
        _ => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_files_are_decoded() {
        let text = extract_text("notes.txt", b"The mitochondria is the powerhouse.").unwrap();
        assert_eq!(text, "The mitochondria is the powerhouse.");
    }

    #[test]
    fn unknown_extensions_fall_back_to_utf8() {
        assert!(extract_text("notes.md", b"# Heading").is_ok());
        assert!(extract_text("no-extension", b"raw").is_ok());
    }

    #[test]
    fn binary_document_formats_are_rejected() {
        for name in ["slides.pptx", "doc.docx", "book.PDF"] {
            let result = extract_text(name, b"%PDF-1.4");
            assert!(matches!(result, Err((StatusCode::UNSUPPORTED_MEDIA_TYPE, _))));
        }
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let text = extract_text("notes.txt", &[0x66, 0xFF, 0x6F]).unwrap();
        assert!(text.contains('\u{FFFD}'));
    }
}
