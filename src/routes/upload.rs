use axum::extract::Multipart;
use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;

use crate::error::AppError;
use crate::pipeline::parse;
use crate::pipeline::process::TrackSummary;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}

#[derive(Serialize)]
struct UploadResponse {
    tracks: Vec<TrackSummary>,
    failures: Vec<FileFailure>,
}

#[derive(Serialize)]
struct FileFailure {
    filename: String,
    error: String,
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .ok_or_else(|| AppError::BadRequest("No filename provided".to_string()))?;
            let bytes = field.bytes().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read file bytes: {}", e))
            })?;
            files.push((filename, bytes.to_vec()));
        }
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No file provided".to_string()));
    }

    let total_files = files.len();
    tracing::info!("Parsing {} uploaded file(s)", total_files);

    let outcomes = tokio::task::spawn_blocking(move || parse::extract_batch(&files))
        .await
        .map_err(|e| AppError::Internal(format!("Parsing task failed: {}", e)))?;

    let mut tracks = Vec::new();
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome.result {
            Ok(parsed) => {
                for track in parsed {
                    let stored = state.insert(track);
                    tracing::info!(
                        "Stored track '{}' from {} with ID {} ({} points)",
                        stored.track.name,
                        outcome.filename,
                        stored.id,
                        stored.track.points.len()
                    );
                    tracks.push(TrackSummary::new(stored.id, &stored.track));
                }
            }
            Err(err) => {
                tracing::warn!("Skipping {}: {}", outcome.filename, err);
                failures.push((outcome.filename, err));
            }
        }
    }

    if failures.len() == total_files {
        if total_files == 1 {
            if let Some((_, err)) = failures.pop() {
                return Err(err.into());
            }
        }
        return Err(AppError::BadRequest(format!(
            "None of the {} files could be parsed",
            total_files
        )));
    }

    Ok(Json(UploadResponse {
        tracks,
        failures: failures
            .into_iter()
            .map(|(filename, err)| FileFailure {
                filename,
                error: err.to_string(),
            })
            .collect(),
    }))
}
