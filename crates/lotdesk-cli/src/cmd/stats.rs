//! `lotdesk stats`: headline counters, KPI figures and the make list.

use std::io::{self, Write};

use clap::Args;
use lotdesk_core::BackendStatus;
use chrono::Utc;
use lotdesk_core::summary::{KpiMetrics, ListingSummary, unique_makes};
use serde::Serialize;

use super::{ScopeArgs, Session};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct StatsArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
}

#[derive(Debug, Serialize)]
struct StatsOutput {
    source: &'static str,
    status: BackendStatus,
    #[serde(flatten)]
    summary: ListingSummary,
    makes: Vec<String>,
    kpi: KpiMetrics,
}

pub fn run_stats(args: &StatsArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    let desk = session.load_scoped(output, &args.scope)?;
    let raw = desk.view().raw();
    let payload = StatsOutput {
        source: desk.source().name(),
        status: desk.status(),
        summary: ListingSummary::from_listings(raw),
        makes: unique_makes(raw),
        kpi: KpiMetrics::from_listings(raw, Utc::now()),
    };

    render_mode(output, &payload, render_stats_text, render_stats_pretty)
}

fn render_stats_text(stats: &StatsOutput, w: &mut dyn Write) -> io::Result<()> {
    let s = stats.summary;
    writeln!(
        w,
        "total={} scored={} pending={} decided={} undecided={}",
        s.total, s.scored, s.pending, s.decided, s.undecided
    )?;
    writeln!(w, "makes={}", stats.makes.join(","))?;
    let k = stats.kpi;
    writeln!(
        w,
        "total_value={:.2} average_price={:.2} active_buyers={} scoring_rate={:.1} average_score={:.1}",
        k.total_value, k.average_price, k.active_buyers, k.scoring_rate, k.average_score
    )?;
    writeln!(
        w,
        "aged_inventory={} conversion_rate={:.1} average_profit_per_unit={:.2} lead_to_purchase_days={:.1}",
        k.aged_inventory, k.conversion_rate, k.average_profit_per_unit, k.lead_to_purchase_days
    )
}

fn render_stats_pretty(stats: &StatsOutput, w: &mut dyn Write) -> io::Result<()> {
    let s = stats.summary;
    pretty_section(w, "Listings")?;
    pretty_kv(w, "Source", format!("{} ({})", stats.source, stats.status))?;
    pretty_kv(w, "Total", s.total.to_string())?;
    pretty_kv(w, "Scored", s.scored.to_string())?;
    pretty_kv(w, "Pending", s.pending.to_string())?;
    pretty_kv(w, "Decided", s.decided.to_string())?;
    pretty_kv(w, "Undecided", s.undecided.to_string())?;
    writeln!(w)?;
    let k = stats.kpi;
    pretty_section(w, "KPIs")?;
    pretty_kv(w, "Value", format!("{:.0} total, {:.0} average", k.total_value, k.average_price))?;
    pretty_kv(w, "Buyers", k.active_buyers.to_string())?;
    pretty_kv(w, "Scoring", format!("{:.1}% scored, average {:.1}", k.scoring_rate, k.average_score))?;
    pretty_kv(w, "Conversion", format!("{:.1}%", k.conversion_rate))?;
    pretty_kv(w, "Profit/unit", format!("{:.0}", k.average_profit_per_unit))?;
    pretty_kv(w, "Aged", format!("{} over 30 days", k.aged_inventory))?;
    pretty_kv(w, "Lead time", format!("{:.1} days", k.lead_to_purchase_days))?;
    writeln!(w)?;
    pretty_section(w, "Makes")?;
    if stats.makes.is_empty() {
        writeln!(w, "(none)")
    } else {
        writeln!(w, "{}", stats.makes.join(", "))
    }
}
