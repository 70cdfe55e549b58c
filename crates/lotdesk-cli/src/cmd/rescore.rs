//! `lotdesk rescore`: rescore every filtered listing that has a VIN.

use std::io::Write;

use clap::Args;
use lotdesk_core::model::{Listing, ScoreRequest};
use serde::Serialize;

use super::list::opt_num;
use super::{Session, ViewArgs, fail};
use crate::output::{OutputMode, render};

#[derive(Args, Debug, Default)]
pub struct RescoreArgs {
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Serialize)]
struct RescoreOutput<'a> {
    filtered: usize,
    sent: usize,
    received: usize,
    listings: Vec<&'a Listing>,
}

pub fn run_rescore(args: &RescoreArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    let mut desk = session.load_desk(output)?;
    if let Err(err) = args.view.apply(desk.view_mut()) {
        return fail(output, err);
    }

    let sent = desk
        .view()
        .visible_rows()
        .filter(|l| ScoreRequest::from_listing(l).is_some())
        .count();
    let received = match desk.rescore_visible() {
        Ok(received) => received,
        Err(err) => return fail(output, err),
    };

    let view = desk.view();
    let payload = RescoreOutput {
        filtered: view.filtered_count(),
        sent,
        received,
        listings: view.visible_rows().collect(),
    };
    render(output, &payload, |report, w| {
        writeln!(
            w,
            "rescored {} of {} listings ({} results)",
            report.sent, report.filtered, report.received
        )?;
        for listing in &report.listings {
            writeln!(
                w,
                "{}\t{}\t{}\t{}",
                listing.id,
                listing.vin.as_deref().unwrap_or("-"),
                opt_num(listing.score),
                opt_num(listing.buy_max),
            )?;
        }
        Ok(())
    })
}
