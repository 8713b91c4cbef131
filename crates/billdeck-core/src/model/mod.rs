// ── Domain model ──
//
// Canonical types consumed by the CLI. Built from `billdeck_api::types`
// in `convert.rs`; nothing here knows about wire field spellings.

pub mod booking;
pub mod client;
pub mod report;
pub mod site;

pub use booking::{Booking, BookingDraft, BookingStatus};
pub use client::{Client, ClientDraft, Company, Medium, Setting, User};
pub use report::{Report, ReportDraft, week_start};
pub use site::Site;
