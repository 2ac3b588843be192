//! # Wire
//!
//! JSON payloads exchanged between the portfolio site and its backend.
//!
//! Field names follow the browser side (`projectId`, `firstViewed`, ...), so
//! every struct here is the exact shape that travels over HTTP.
//!
//! The `client` feature adds [`remote::PortfolioClient`], the Rust rendition of
//! the site's fetch helpers.
pub mod models;

#[cfg(feature = "client")]
pub mod remote;

pub use models::{
    AnalyticsList, ContactAccepted, ContactForm, ContactSubmission, ErrorBody, Health,
    ProjectAnalytics, ProjectView, SubmissionList, ViewRecorded,
};

pub const CONTACT_PATH: &str = "/contact";
pub const TRACK_VIEW_PATH: &str = "/track-project-view";
pub const ADMIN_CONTACTS_PATH: &str = "/admin/contacts";
pub const ADMIN_ANALYTICS_PATH: &str = "/admin/analytics";
pub const HEALTH_PATH: &str = "/health";
