use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cinema_core::BookingError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    AuthenticationError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ConflictError(String),
    #[error("{0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SeatUnavailable(label) => {
                AppError::ConflictError(format!("These seats are unavailable: {}", label))
            }
            BookingError::NoSeatsSelected => AppError::ValidationError("No seat selected".to_string()),
            BookingError::NoActiveReservation => {
                AppError::NotFoundError("No booking found for this reservation".to_string())
            }
            BookingError::ShowtimeNotFound(id) => AppError::NotFoundError(format!("Showtime not found: {}", id)),
            BookingError::Store(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl From<cinema_core::StoreError> for AppError {
    fn from(err: cinema_core::StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_errors_map_to_status() {
        let cases = [
            (BookingError::SeatUnavailable("A1".into()), StatusCode::CONFLICT),
            (BookingError::NoSeatsSelected, StatusCode::BAD_REQUEST),
            (BookingError::NoActiveReservation, StatusCode::NOT_FOUND),
            (BookingError::ShowtimeNotFound(uuid::Uuid::new_v4()), StatusCode::NOT_FOUND),
            (
                BookingError::Store(anyhow::anyhow!("connection reset").into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }
}
