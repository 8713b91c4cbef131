// Endpoint groups, each an `impl ApiClient` block.

mod auth;
mod bookings;
mod clients;
mod reference;
mod reports;
mod sites;
