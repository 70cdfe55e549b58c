//! `lotdesk seed`: push the demo listings to the backend.

use std::io::Write;

use clap::Args;
use lotdesk_core::BackendStatus;
use lotdesk_core::model::seed::demo_listings;
use serde::Serialize;

use super::{Session, fail};
use crate::output::{OutputMode, render};

#[derive(Args, Debug, Default)]
pub struct SeedArgs {}

#[derive(Debug, Serialize)]
struct SeedOutput {
    source: &'static str,
    status: BackendStatus,
    sent: usize,
    stored: usize,
}

pub fn run_seed(_args: &SeedArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    let mut desk = session.open_desk();
    let listings = demo_listings();
    let stored = match desk.seed(&listings) {
        Ok(stored) => stored,
        Err(err) => return fail(output, err),
    };

    let payload = SeedOutput {
        source: desk.source().name(),
        status: desk.status(),
        sent: listings.len(),
        stored,
    };
    render(output, &payload, |report, w| {
        writeln!(
            w,
            "seeded {} listings into {} ({} stored)",
            report.sent, report.source, report.stored
        )
    })
}
