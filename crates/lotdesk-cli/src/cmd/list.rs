//! `lotdesk list`: one page of the filtered and sorted listing view.

use std::io::{self, Write};

use clap::Args;
use lotdesk_core::model::Listing;
use lotdesk_core::view::{FilterCriteria, PageMarker, SortConfig};
use serde::Serialize;

use super::{ScopeArgs, Session, ViewArgs, fail};
use crate::output::{OutputMode, pretty_rule, render_mode};

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Page to show (1-based, clamped to the last page).
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (defaults to `[view] rows_per_page`).
    #[arg(short = 'n', long)]
    pub rows: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ListOutput<'a> {
    total: usize,
    filtered: usize,
    page: usize,
    total_pages: usize,
    rows_per_page: usize,
    first_row: usize,
    last_row: usize,
    sort: SortConfig,
    criteria: &'a FilterCriteria,
    pages: Vec<PageMarker>,
    listings: Vec<&'a Listing>,
}

pub fn run_list(args: &ListArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    let mut desk = session.load_scoped(output, &args.scope)?;
    let view = desk.view_mut();
    if let Err(err) = args.view.apply(view) {
        return fail(output, err);
    }
    if let Some(rows) = args.rows {
        if let Err(err) = view.set_rows_per_page(rows) {
            return fail(output, err);
        }
    }
    view.set_page(args.page);

    let view = desk.view();
    let (first_row, last_row) = view.row_range();
    let payload = ListOutput {
        total: view.raw().len(),
        filtered: view.filtered_count(),
        page: view.current_page(),
        total_pages: view.total_pages(),
        rows_per_page: view.rows_per_page().get(),
        first_row,
        last_row,
        sort: view.sort(),
        criteria: view.criteria(),
        pages: view.page_window(),
        listings: view.page_rows(),
    };

    render_mode(output, &payload, render_list_text, render_list_pretty)
}

pub fn opt_num(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.0}"))
}

fn status_label(listing: &Listing) -> &str {
    listing.decision_status().unwrap_or("-")
}

fn render_list_text(page: &ListOutput<'_>, w: &mut dyn Write) -> io::Result<()> {
    for listing in &page.listings {
        writeln!(
            w,
            "{}\t{}\t{} {}\t{}\t{}",
            listing.id,
            listing.vin.as_deref().unwrap_or("-"),
            listing.make,
            listing.model,
            opt_num(listing.score),
            status_label(listing),
        )?;
    }
    Ok(())
}

fn pager_line(pages: &[PageMarker], current: usize) -> String {
    pages
        .iter()
        .map(|marker| match marker {
            PageMarker::Page(p) if *p == current => format!("[{p}]"),
            PageMarker::Page(p) => p.to_string(),
            PageMarker::Gap => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_list_pretty(page: &ListOutput<'_>, w: &mut dyn Write) -> io::Result<()> {
    if page.filtered == 0 {
        if page.total == 0 {
            writeln!(w, "No listings loaded")?;
        } else {
            writeln!(w, "No listings match the current filters ({} total)", page.total)?;
        }
        return Ok(());
    }

    writeln!(
        w,
        "{:<8} {:<18} {:<22} {:>8} {:>6} {:<10}",
        "ID", "VIN", "VEHICLE", "PRICE", "SCORE", "DECISION"
    )?;
    pretty_rule(w)?;
    for listing in &page.listings {
        let vehicle = match listing.year {
            Some(year) => format!("{year} {} {}", listing.make, listing.model),
            None => format!("{} {}", listing.make, listing.model),
        };
        writeln!(
            w,
            "{:<8} {:<18} {:<22} {:>8} {:>6} {:<10}",
            listing.id,
            listing.vin.as_deref().unwrap_or("-"),
            vehicle,
            opt_num(listing.price),
            opt_num(listing.score),
            status_label(listing),
        )?;
    }
    pretty_rule(w)?;
    writeln!(
        w,
        "Rows {}-{} of {} ({} total) | sort {} {} | page {}",
        page.first_row,
        page.last_row,
        page.filtered,
        page.total,
        page.sort.key,
        page.sort.direction,
        pager_line(&page.pages, page.page),
    )
}
