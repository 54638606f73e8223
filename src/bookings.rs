use crate::ports::Clock;
use crate::store::{Store, StoreError};
use crate::types::booking::{Booking, BookingId};

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tokio::sync::RwLock;
use tracing::info;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("invalid payload")]
    InvalidPayload,
    #[error("id not specified")]
    MissingId,
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("no booking id left above {0}")]
    IdsExhausted(BookingId),
}

/// Create, list and delete over the booking store.
///
/// Every operation loads the whole collection and mutating operations write it
/// back in full. The store sits behind a read/write lock so that load, mutate
/// and save happen as one step relative to every other operation: `create` and
/// `delete` take the write guard, `list` shares the read guard.
pub struct BookingService {
    store: RwLock<Store>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: RwLock::new(store),
            clock,
        }
    }

    /// Returns the assigned id with the stored record.
    pub async fn create(&self, input: Value) -> Result<(BookingId, Booking), BookingError> {
        let Value::Object(fields) = input else {
            return Err(BookingError::InvalidPayload);
        };

        let store = self.store.write().await;
        let mut bookings = store.load()?;
        let now = self.clock.now();
        let id = next_id(&bookings, now)?;
        let timestamp = now.format(TIMESTAMP_FORMAT)?;
        let booking = Booking::new(fields, id, timestamp);
        bookings.push(booking.clone());
        store.save(&bookings)?;

        info!(id, total = bookings.len(), "booking created");
        Ok((id, booking))
    }

    pub async fn list(&self) -> Result<Vec<Booking>, BookingError> {
        let store = self.store.read().await;
        Ok(store.load()?)
    }

    /// Returns how many records were removed. Storage is left untouched when
    /// nothing matches.
    pub async fn delete(&self, id: Option<BookingId>) -> Result<usize, BookingError> {
        let id = id.ok_or(BookingError::MissingId)?;

        let store = self.store.write().await;
        let mut bookings = store.load()?;
        let before = bookings.len();
        bookings.retain(|booking| booking.id() != Some(id));
        let removed = before - bookings.len();
        if removed == 0 {
            return Err(BookingError::NotFound);
        }
        store.save(&bookings)?;

        info!(id, removed, total = bookings.len(), "booking deleted");
        Ok(removed)
    }
}

/// Wall-clock milliseconds, bumped past the largest id already stored so that
/// creations within one millisecond (or after the clock steps back) stay unique.
fn next_id(bookings: &[Booking], now: OffsetDateTime) -> Result<BookingId, BookingError> {
    let millis = BookingId::try_from(now.unix_timestamp_nanos() / 1_000_000)
        .unwrap_or(BookingId::MAX);
    match bookings.iter().filter_map(Booking::id).max() {
        Some(last) if last >= millis => last
            .checked_add(1)
            .ok_or(BookingError::IdsExhausted(last)),
        _ => Ok(millis),
    }
}
