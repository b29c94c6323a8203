//! CLI subcommand implementations.

pub mod candidates;
pub mod committees;
pub mod contributions;
pub mod contributors;
pub mod import;
pub mod metadata;
pub mod races;
pub mod search;
pub mod states;

use anyhow::{Context as _, Result};
use clap::Args;
use fundlens_lib::fundlens_query::query::SortField;
use fundlens_lib::{Criteria, Db, PageRequest, Paginator, SearchQuery, Settings, Sort};

/// Resolved settings shared by every subcommand.
pub struct Context {
    pub settings: Settings,
}

impl Context {
    /// Each invocation (and each concurrent search category) gets its own connection.
    pub fn open_db(&self) -> Result<Db> {
        Db::open(&self.settings.database_path).with_context(|| {
            format!(
                "failed to open database {}",
                self.settings.database_path.display()
            )
        })
    }

    pub fn paginator(&self) -> Paginator {
        Paginator::new(self.settings.pagination())
    }
}

/// Paging and sorting flags common to every listing.
#[derive(Args, Debug, Clone)]
pub struct PagingArgs {
    /// Page number
    #[arg(long, default_value = "1")]
    pub page: i64,

    /// Results per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<i64>,

    /// Sort field
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort direction: asc or desc
    #[arg(long)]
    pub sort_dir: Option<String>,
}

impl PagingArgs {
    pub fn request(&self) -> Result<PageRequest> {
        Ok(PageRequest::new(self.page, self.page_size)?)
    }

    pub fn sort<B: SortField>(&self) -> Result<Sort<B>> {
        Ok(Sort::parse(
            self.sort_by.as_deref(),
            self.sort_dir.as_deref(),
        )?)
    }
}

/// Collect raw filter values into criteria. Validation happens when the
/// criteria are converted into a typed filter.
pub fn criteria(flags: &[(&str, Option<&String>)], extra: &[String]) -> Result<Criteria> {
    let mut criteria = Criteria::parse_args(extra)?;
    for (key, value) in flags {
        if let Some(value) = value {
            criteria.insert(*key, value.as_str())?;
        }
    }
    Ok(criteria)
}

pub fn search_query(raw: &str) -> Result<SearchQuery> {
    Ok(SearchQuery::parse(raw)?)
}
