use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::models::{AdminContext, Booking, Event, NewBooking, SeatSummary};
use crate::services::ServiceError;
use crate::store::BookingStore;

/// Seat reservations for events that were already resolved through the gate.
#[derive(Clone)]
pub struct BookingDesk {
    store: Arc<dyn BookingStore>,
}

impl BookingDesk {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub async fn book(&self, event: &Event, request: NewBooking) -> Result<Booking, ServiceError> {
        let request = normalize(request)?;
        if request.seats > event.capacity {
            return Err(ServiceError::Validation(format!(
                "The seats may not be greater than {}.",
                event.capacity
            )));
        }

        let booking = self
            .store
            .insert_booking(event.id, request)
            .await?
            .ok_or_else(ServiceError::event_not_found)?;
        info!(event_id = %event.id, booking_id = %booking.id, seats = booking.seats, "Booking created");
        Ok(booking)
    }

    pub async fn seats(&self, event: &Event) -> Result<SeatSummary, ServiceError> {
        let booked = self.store.booked_seats(event.id).await?;
        Ok(SeatSummary::new(event.capacity, booked))
    }

    pub async fn list(
        &self,
        _admin: &AdminContext,
        event: &Event,
    ) -> Result<Vec<Booking>, ServiceError> {
        Ok(self.store.bookings_for(event.id).await?)
    }
}

/// Trims the free-text fields, then applies the `NewBooking` rules.
fn normalize(request: NewBooking) -> Result<NewBooking, ServiceError> {
    let request = NewBooking {
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        phone: request
            .phone
            .map(|phone| phone.trim().to_string())
            .filter(|phone| !phone.is_empty()),
        seats: request.seats,
    };
    request.validate()?;
    Ok(request)
}
