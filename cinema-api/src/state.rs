use std::sync::Arc;
use cinema_booking::{BookingFinalizer, ExpirySweeper, ReservationService};
use cinema_core::{BookingNotifier, Clock, SeatRepository};
use cinema_store::app_config::BusinessRules;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn SeatRepository>,
    pub clock: Arc<dyn Clock>,
    pub sweeper: ExpirySweeper,
    pub reservations: ReservationService,
    pub finalizer: Arc<BookingFinalizer>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn SeatRepository>,
        notifier: Arc<dyn BookingNotifier>,
        clock: Arc<dyn Clock>,
        business_rules: BusinessRules,
    ) -> Self {
        Self {
            sweeper: ExpirySweeper::new(repo.clone()),
            reservations: ReservationService::new(repo.clone(), business_rules.hold_duration()),
            finalizer: Arc::new(BookingFinalizer::new(repo.clone(), notifier)),
            repo,
            clock,
        }
    }
}
