//! Page-by-page collection of a category listing under an item cap.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use trailerforge_common::{Category, MovieSummary, Result};

use crate::cancel::cancellable;
use crate::catalog::{CatalogClient, LanguageContext, REMOTE_PAGE_SIZE};

/// Remote page size; fixed by the catalog.
pub const PAGE_SIZE: usize = REMOTE_PAGE_SIZE;

/// Zero-based remote page holding the item at `start_index`.
pub fn page_for_index(start_index: usize) -> u32 {
    u32::try_from(start_index / PAGE_SIZE).unwrap_or(u32::MAX)
}

/// Walks remote pages of one category until the cap is met or the listing
/// runs dry.
pub struct PaginationAggregator {
    catalog: Arc<dyn CatalogClient>,
    context: LanguageContext,
}

impl PaginationAggregator {
    pub fn new(catalog: Arc<dyn CatalogClient>, context: LanguageContext) -> Self {
        Self { catalog, context }
    }

    /// Collect at most `limit` movies of `category`, starting at `start_page`.
    ///
    /// Pages are requested in order and their movies appended in response
    /// order. Collection stops once `limit` movies are held or a page comes
    /// back empty, and the result is truncated to `limit`. Remote failures
    /// propagate without retry.
    pub async fn fetch_category(
        &self,
        category: Category,
        start_page: u32,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<MovieSummary>> {
        let mut movies = Vec::with_capacity(limit.min(4 * PAGE_SIZE));
        if limit == 0 {
            return Ok(movies);
        }

        let mut page = start_page;
        loop {
            let fetched = cancellable(
                cancel,
                self.catalog.list_by_category(category, &self.context, page),
            )
            .await?;

            if fetched.results.is_empty() {
                debug!(category = %category, page, "Listing exhausted");
                break;
            }

            movies.extend(fetched.results);
            if movies.len() >= limit {
                break;
            }
            page = page.saturating_add(1);
        }

        movies.truncate(limit);
        debug!(
            category = %category,
            start_page,
            count = movies.len(),
            "Category aggregated"
        );
        Ok(movies)
    }
}
