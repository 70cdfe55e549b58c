pub mod export;
pub mod health;
pub mod list;
pub mod notify;
pub mod rescore;
pub mod seed;
pub mod stats;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Args;
use lotdesk_core::ListingDesk;
use lotdesk_core::config::EffectiveConfig;
use lotdesk_core::desk::DeskError;
use lotdesk_core::source::{HttpListingSource, ListingSource, SeedSource};
use lotdesk_core::view::{
    FilterCriteria, ListingViewModel, SortConfig, SortDirection, SortKey, StatusFilter, ViewError,
};
use tracing::debug;

use crate::output::{CliError, OutputMode, render_error};

/// A desk over whichever source the global flags selected.
pub type Desk = ListingDesk<Box<dyn ListingSource>>;

/// Everything a command needs to reach listing data.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: EffectiveConfig,
    /// Serve the built-in demo listings instead of calling the backend.
    pub offline: bool,
    /// Backend URL from `--backend`, overriding config and environment.
    pub backend: Option<String>,
}

impl Session {
    pub fn backend_url(&self) -> &str {
        self.backend
            .as_deref()
            .unwrap_or(&self.config.backend.url)
    }

    /// A desk with an empty view configured from `[view]`.
    pub fn open_desk(&self) -> Desk {
        let source: Box<dyn ListingSource> = if self.offline {
            Box::new(SeedSource::default())
        } else {
            Box::new(HttpListingSource::new(
                self.backend_url(),
                self.config.backend.token.clone(),
                self.config.backend.timeout(),
            ))
        };
        debug!(source = source.name(), "opening desk");
        let view = ListingViewModel::with_settings(
            Vec::new(),
            self.config.project.view.sort(),
            self.config.project.view.rows_per_page,
        );
        ListingDesk::with_view(source, view)
    }

    /// Open a desk and load the full collection.
    pub fn load_desk(&self, output: OutputMode) -> anyhow::Result<Desk> {
        let mut desk = self.open_desk();
        if let Err(err) = desk.refresh() {
            return fail(output, err);
        }
        Ok(desk)
    }

    /// Like [`Session::load_desk`], limited to one buyer when `--buyer` is set.
    pub fn load_scoped(&self, output: OutputMode, scope: &ScopeArgs) -> anyhow::Result<Desk> {
        let Some(buyer) = scope.buyer.as_deref() else {
            return self.load_desk(output);
        };
        let mut desk = self.open_desk();
        if let Err(err) = desk.refresh_buyer(buyer, scope.start(), scope.end()) {
            return fail(output, err);
        }
        Ok(desk)
    }
}

/// Which listings to load.
#[derive(Args, Debug, Default, Clone)]
pub struct ScopeArgs {
    /// Only load listings owned by this buyer.
    #[arg(long)]
    pub buyer: Option<String>,

    /// With --buyer: listings created on or after this date (YYYY-MM-DD).
    #[arg(long, requires = "buyer")]
    pub since: Option<NaiveDate>,

    /// With --buyer: listings created on or before this date (YYYY-MM-DD).
    #[arg(long, requires = "buyer")]
    pub until: Option<NaiveDate>,
}

impl ScopeArgs {
    fn start(&self) -> Option<DateTime<Utc>> {
        self.since.map(|day| day.and_time(NaiveTime::MIN).and_utc())
    }

    fn end(&self) -> Option<DateTime<Utc>> {
        self.until
            .and_then(|day| day.and_hms_opt(23, 59, 59))
            .map(|at| at.and_utc())
    }
}

/// Filter and sort flags shared by the commands that act on the view.
#[derive(Args, Debug, Default, Clone)]
pub struct ViewArgs {
    /// Case-insensitive substring of make, model, VIN or location.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter by status: scored, pending, decided, undecided.
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by make (case-insensitive exact match).
    #[arg(long)]
    pub make: Option<String>,

    /// Sort column, e.g. score, price, make, decision_status.
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending.
    #[arg(long, conflicts_with = "asc")]
    pub desc: bool,

    /// Sort ascending.
    #[arg(long)]
    pub asc: bool,
}

impl ViewArgs {
    /// Parse the flags into criteria and, when any sort flag is given, a sort.
    ///
    /// A `--sort` without a direction flag sorts ascending.
    pub fn parse(&self, current: SortConfig) -> Result<(FilterCriteria, SortConfig), ViewError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<StatusFilter>)
            .transpose()?
            .unwrap_or_default();
        let criteria = FilterCriteria {
            search_term: self.search.clone().unwrap_or_default(),
            status,
            make: self.make.clone().unwrap_or_default(),
        };

        let key = self
            .sort
            .as_deref()
            .map(str::parse::<SortKey>)
            .transpose()?;
        let direction = if self.desc {
            Some(SortDirection::Desc)
        } else if self.asc {
            Some(SortDirection::Asc)
        } else {
            None
        };
        let sort = match (key, direction) {
            (Some(key), direction) => SortConfig::new(key, direction.unwrap_or_default()),
            (None, Some(direction)) => SortConfig::new(current.key, direction),
            (None, None) => current,
        };
        Ok((criteria, sort))
    }

    /// Apply the flags to `view`.
    pub fn apply(&self, view: &mut ListingViewModel) -> Result<(), ViewError> {
        let (criteria, sort) = self.parse(view.sort())?;
        view.set_sort_config(sort);
        view.set_criteria(criteria);
        Ok(())
    }
}

/// Report `err` in the requested format and fail the command.
pub fn fail<T>(output: OutputMode, err: impl Into<DeskError>) -> anyhow::Result<T> {
    let err = err.into();
    render_error(output, &CliError::from(&err))?;
    anyhow::bail!("{err}")
}
