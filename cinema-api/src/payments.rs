use axum::{extract::State, routing::post, Json, Router};
use cinema_booking::PaymentResolution;
use cinema_core::{PaymentOutcome, ReservationToken};
use serde::Deserialize;
use crate::error::AppError;
use crate::identity::ActingUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentCallback {
    pub status: PaymentOutcome,
    pub reservation: ReservationToken,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/payments/callback", post(payment_callback))
}

/// POST /v1/payments/callback
/// Payment provider result for a previously returned reservation token
async fn payment_callback(
    State(state): State<AppState>,
    ActingUser(user): ActingUser,
    Json(callback): Json<PaymentCallback>,
) -> Result<Json<PaymentResolution>, AppError> {
    tracing::info!(
        "Payment {:?} for showtime {} from {}",
        callback.status,
        callback.reservation.showtime_id,
        user
    );

    let resolution = state
        .finalizer
        .on_payment(
            callback.reservation.showtime_id,
            &callback.reservation.seats,
            &user,
            callback.status,
            state.clock.now(),
        )
        .await?;

    Ok(Json(resolution))
}
