//! Listing data and action payloads exchanged with the backend.

pub mod actions;
pub mod listing;
pub mod seed;

pub use actions::{
    ExportKind, ExportRequest, ExportRequestError, ExportedFile, NotifyAck, NotifyRequest,
    Rescore, RescoreMap, ScoreRequest, ScoreResult, rescore_map,
};
pub use listing::{Decision, Listing};
