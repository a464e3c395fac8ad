use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use cinema_core::{Movie, Showtime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct MovieShowtimesResponse {
    pub movie: Movie,
    pub showtimes: Vec<Showtime>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/movies/{id}/showtimes", get(movie_showtimes))
}

/// GET /v1/movies/{id}/showtimes
async fn movie_showtimes(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<MovieShowtimesResponse>, AppError> {
    let movie = state
        .repo
        .get_movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Movie not found: {}", movie_id)))?;
    let showtimes = state.repo.list_showtimes(movie_id).await?;

    Ok(Json(MovieShowtimesResponse { movie, showtimes }))
}
