use crate::bookings::BookingService;
use crate::config::AppConfig;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub bookings: Arc<BookingService>,
}
