//! Page/size resolution and the count-plus-slice pagination contract.

use fundlens_query::query::QueryPlan;
use fundlens_query::types::{Page, PageMeta};
use fundlens_query::validation;
use fundlens_query::ValidationError;

use crate::db::DbError;
use crate::store::{DataStore, FromRow, Window};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// A validated page request. `page_size` is `None` when the caller omitted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: Option<u32>,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::first()
    }
}

impl PageRequest {
    pub fn new(page: i64, page_size: Option<i64>) -> Result<Self, ValidationError> {
        Ok(PageRequest {
            page: validation::validate_page(page)?,
            page_size: page_size.map(validation::validate_page_size).transpose()?,
        })
    }

    /// Page 1 at the default size.
    pub fn first() -> Self {
        PageRequest {
            page: 1,
            page_size: None,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    config: PaginationConfig,
}

impl Paginator {
    pub fn new(config: PaginationConfig) -> Self {
        Paginator { config }
    }

    pub fn config(&self) -> PaginationConfig {
        self.config
    }

    /// Effective page size: the default when omitted, clamped to the maximum.
    pub fn page_size(&self, request: PageRequest) -> u32 {
        request
            .page_size
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size.max(1))
    }

    /// Page metadata for `request` over `total` items.
    pub fn meta(&self, request: PageRequest, total: u64) -> PageMeta {
        PageMeta::new(request.page, self.page_size(request), total)
    }

    /// Count and slice `plan` inside one snapshot.
    pub fn paginate<S, R>(
        &self,
        store: &S,
        plan: &QueryPlan,
        request: PageRequest,
    ) -> Result<Page<R>, DbError>
    where
        S: DataStore,
        R: FromRow,
    {
        store.snapshot(|s| self.paginate_in(s, plan, request))
    }

    /// Like [`Paginator::paginate`] but assumes the caller already holds a snapshot.
    pub fn paginate_in<S, R>(
        &self,
        store: &S,
        plan: &QueryPlan,
        request: PageRequest,
    ) -> Result<Page<R>, DbError>
    where
        S: DataStore,
        R: FromRow,
    {
        let total = store.count(plan)?;
        let meta = self.meta(request, total);
        let items = if meta.is_past_end() {
            Vec::new()
        } else {
            store.fetch(
                plan,
                Window {
                    limit: u64::from(meta.page_size),
                    offset: meta.offset(),
                },
            )?
        };
        Ok(Page { items, meta })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_rejects_zero_page() {
        assert_eq!(PageRequest::new(0, None).unwrap_err().field(), "page");
        assert_eq!(PageRequest::new(1, Some(0)).unwrap_err().field(), "page_size");
    }

    #[test]
    fn omitted_size_uses_default() {
        let p = Paginator::new(PaginationConfig::default());
        assert_eq!(p.page_size(PageRequest::first()), 50);
    }

    #[test]
    fn oversize_is_clamped_not_rejected() {
        let p = Paginator::new(PaginationConfig {
            default_page_size: 20,
            max_page_size: 100,
        });
        let req = PageRequest::new(1, Some(5000)).unwrap();
        assert_eq!(p.page_size(req), 100);
        assert_eq!(p.page_size(PageRequest::new(3, Some(7)).unwrap()), 7);
    }
}
