//! `lotdesk health`: probe the backend.

use std::io::Write;

use clap::Args;
use lotdesk_core::BackendStatus;
use lotdesk_core::error::ErrorCode;
use serde::Serialize;

use super::Session;
use crate::output::{CliError, OutputMode, render, render_error};

#[derive(Args, Debug, Default)]
pub struct HealthArgs {}

#[derive(Debug, Serialize)]
struct HealthOutput<'a> {
    source: &'static str,
    backend: Option<&'a str>,
    status: BackendStatus,
}

pub fn run_health(_args: &HealthArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    let desk = session.open_desk();
    let status = if desk.source().check_health() {
        BackendStatus::Reachable
    } else {
        BackendStatus::Unreachable
    };

    let backend = (!session.offline).then(|| session.backend_url());
    if status == BackendStatus::Unreachable {
        let message = format!("backend at {} is not reachable", session.backend_url());
        render_error(output, &CliError::coded(ErrorCode::BackendUnreachable, &message))?;
        anyhow::bail!(message);
    }

    let payload = HealthOutput {
        source: desk.source().name(),
        backend,
        status,
    };
    render(output, &payload, |report, w| match report.backend {
        Some(url) => writeln!(w, "{} {url}: {}", report.source, report.status),
        None => writeln!(w, "{}: {}", report.source, report.status),
    })
}
