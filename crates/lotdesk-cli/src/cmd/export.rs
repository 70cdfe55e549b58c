//! `lotdesk export`: download listings as CSV.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use lotdesk_core::model::ExportKind;
use serde::Serialize;

use super::{Session, ViewArgs, fail};
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export type: all, daily, range, selected.
    #[arg(short = 't', long = "type", default_value = "all")]
    pub kind: String,

    /// First day of a range export (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of a range export (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Write the CSV here instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Filters choosing the rows of a `selected` export.
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Serialize)]
struct ExportOutput {
    export_type: ExportKind,
    filename: String,
    records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    csv: Option<String>,
}

pub fn run_export(args: &ExportArgs, output: OutputMode, session: &Session) -> anyhow::Result<()> {
    let kind = match args.kind.parse::<ExportKind>() {
        Ok(kind) => kind,
        Err(err) => return fail(output, err),
    };

    // Only a selected export needs the collection; the others are server-side.
    let mut desk = if kind == ExportKind::Selected {
        let mut desk = session.load_desk(output)?;
        if let Err(err) = args.view.apply(desk.view_mut()) {
            return fail(output, err);
        }
        desk.view_mut().select_all(true);
        desk
    } else {
        session.open_desk()
    };

    let file = match desk.export(kind, args.start, args.end) {
        Ok(file) => file,
        Err(err) => return fail(output, err),
    };
    let records = file.record_count();

    if let Some(path) = &args.out {
        std::fs::write(path, &file.csv)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        let payload = ExportOutput {
            export_type: kind,
            filename: file.filename,
            records,
            path: Some(path.clone()),
            csv: None,
        };
        return render(output, &payload, |report, w| {
            writeln!(
                w,
                "wrote {} records to {} ({})",
                report.records,
                path.display(),
                report.filename
            )
        });
    }

    if output.is_json() {
        let payload = ExportOutput {
            export_type: kind,
            filename: file.filename,
            records,
            path: None,
            csv: Some(file.csv),
        };
        return render(output, &payload, |_, _| Ok(()));
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(file.csv.as_bytes())?;
    if !file.csv.ends_with('\n') {
        writeln!(stdout)?;
    }
    Ok(())
}
