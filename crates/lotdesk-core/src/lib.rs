//! lotdesk-core library.
//!
//! The listing view-model ([`view::ListingViewModel`]) derives what a review
//! page renders from a raw listing collection, always in the order
//! filter → sort → paginate, and tracks row selection independently of the
//! page being shown. Everything that talks to the backend sits behind the
//! [`source::ListingSource`] trait and is orchestrated by [`desk::ListingDesk`].
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums per layer, each mapped to an
//!   [`error::ErrorCode`]; `anyhow::Result` only at the config/CLI edge.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod desk;
pub mod error;
pub mod model;
pub mod source;
pub mod summary;
pub mod view;

pub use desk::{BackendStatus, ListingDesk};
pub use model::listing::{Decision, Listing};
pub use view::ListingViewModel;
