//! `lotdesk notify`: send a buyer notification for one listing.

use std::io::Write;

use clap::Args;
use lotdesk_core::model::NotifyAck;
use serde::Serialize;

use super::{Session, fail};
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct NotifyArgs {
    /// VIN of the listing to notify on.
    pub vin: String,
}

#[derive(Debug, Serialize)]
struct NotifyOutput {
    vin: String,
    acks: Vec<NotifyAck>,
}

pub fn run_notify(args: &NotifyArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    let mut desk = session.load_desk(output)?;
    let acks = match desk.notify(args.vin.trim()) {
        Ok(acks) => acks,
        Err(err) => return fail(output, err),
    };

    let payload = NotifyOutput {
        vin: args.vin.trim().to_string(),
        acks,
    };
    render(output, &payload, |report, w| {
        if report.acks.is_empty() {
            return writeln!(w, "{}: no acknowledgement", report.vin);
        }
        for ack in &report.acks {
            let state = if ack.notified { "notified" } else { "not notified" };
            writeln!(w, "{} ({}): {state} via {}", ack.vin, ack.vehicle_key, ack.channel)?;
        }
        Ok(())
    })
}
