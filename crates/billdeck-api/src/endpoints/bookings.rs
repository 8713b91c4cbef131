// Booking endpoints
//
// Cancellation is a dedicated action rather than a DELETE: the backend
// keeps cancelled bookings for reporting.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{BookingRequest, BookingResponse, CancelBookingRequest};

impl ApiClient {
    /// `GET bookings`
    pub async fn list_bookings(&self) -> Result<Vec<BookingResponse>, Error> {
        self.get("bookings").await
    }

    /// `POST bookings`
    pub async fn create_booking(&self, body: &BookingRequest) -> Result<BookingResponse, Error> {
        debug!(site = %body.site_code, client = %body.client, "creating booking");
        self.post("bookings", body).await
    }

    /// `PUT bookings/{id}`
    pub async fn update_booking(
        &self,
        id: &str,
        body: &BookingRequest,
    ) -> Result<BookingResponse, Error> {
        debug!(id, "updating booking");
        self.put(&format!("bookings/{id}"), body).await
    }

    /// `POST bookings/{id}/cancel`
    pub async fn cancel_booking(&self, id: &str, reason: Option<&str>) -> Result<(), Error> {
        debug!(id, ?reason, "cancelling booking");
        self.post_no_response(
            &format!("bookings/{id}/cancel"),
            &CancelBookingRequest { reason },
        )
        .await
    }
}
