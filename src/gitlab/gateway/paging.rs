//! Walks every page of one collection.

use std::future::Future;

use crate::gitlab::error::IntakeError;

use super::types::{Page, PageRequest};

/// Every record of a collection plus the number of requests spent on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected<T> {
    /// Records in upstream order.
    pub items: Vec<T>,
    /// Pages requested, including the final short page.
    pub requests: u32,
}

/// Requests pages from the first onwards until one ends the collection.
///
/// The first failing page aborts the walk; records already gathered are
/// discarded so a gap can never pass for a complete collection.
///
/// # Errors
///
/// Propagates the first error returned by `fetch`.
pub async fn collect_all<T, F, Fut>(
    page_size: u8,
    mut fetch: F,
) -> Result<Collected<T>, IntakeError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, IntakeError>>,
{
    let mut request = PageRequest::first(page_size);
    let mut items = Vec::new();
    let mut requests: u32 = 0;

    loop {
        let page = fetch(request).await?;
        requests = requests.saturating_add(1);
        let is_last = page.is_last();
        items.extend(page.items);
        if is_last {
            return Ok(Collected { items, requests });
        }
        request = request.next();
    }
}
