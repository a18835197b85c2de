//! List page controller
//!
//! Owns the query (page, page size, search text, filters) for one list view
//! and the rows currently shown. Fetches are sequenced: every request takes a
//! ticket and a response is applied only if its ticket is still the newest,
//! so a slow response for an old search never overwrites a newer one.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use td_common::{ListQuery, Page};
use tracing::debug;

use crate::config::ClientConfig;
use crate::debounce::Debouncer;
use crate::error::{ApiError, ApiResult};
use crate::notify::Notifier;
use crate::resource::{Resource, ResourceService};

/// Where a list gets its rows from.
#[async_trait]
pub trait ListSource<T>: Send + Sync {
    fn label(&self) -> &'static str;

    async fn fetch(&self, query: &ListQuery) -> ApiResult<Page<T>>;

    async fn remove(&self, id: &str) -> ApiResult<()>;
}

#[async_trait]
impl<R: Resource> ListSource<R::Entity> for ResourceService<R> {
    fn label(&self) -> &'static str {
        R::LABEL
    }

    async fn fetch(&self, query: &ListQuery) -> ApiResult<Page<R::Entity>> {
        self.list(query).await
    }

    async fn remove(&self, id: &str) -> ApiResult<()> {
        self.delete(id).await
    }
}

/// What the view should render
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Idle,
    Loading,
    Loaded(Page<T>),
    Failed(ApiError),
}

/// Pagination footer; absent for an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub first_row: u64,
    pub last_row: u64,
}

impl Pagination {
    fn of<T>(page: &Page<T>) -> Option<Self> {
        if page.total == 0 {
            return None;
        }
        let first_row = u64::from(page.page.saturating_sub(1)) * u64::from(page.limit) + 1;
        let last_row = (first_row + page.data.len() as u64).saturating_sub(1).max(first_row);
        Some(Self {
            page: page.page,
            total_pages: page.total_pages.max(1),
            total: page.total,
            first_row,
            last_row: last_row.min(page.total),
        })
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn summary(&self) -> String {
        format!(
            "Showing {}-{} of {} (page {} of {})",
            self.first_row, self.last_row, self.total, self.page, self.total_pages
        )
    }
}

struct Inner<T> {
    query: ListQuery,
    page: Option<Page<T>>,
    error: Option<ApiError>,
    loading: bool,
    /// Ticket of the newest request issued
    seq: u64,
    /// Parameters of the request currently outstanding
    in_flight: Option<ListQuery>,
    /// Parameters the shown rows were fetched with
    loaded: Option<ListQuery>,
}

/// Controller for one paginated, searchable list
pub struct ListController<T> {
    source: Arc<dyn ListSource<T>>,
    notifier: Arc<dyn Notifier>,
    debouncer: Debouncer,
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for ListController<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            notifier: Arc::clone(&self.notifier),
            debouncer: self.debouncer.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ListController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ListController")
            .field("source", &self.source.label())
            .field("query", &inner.query)
            .field("loading", &inner.loading)
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> ListController<T> {
    pub fn new(
        source: Arc<dyn ListSource<T>>,
        notifier: Arc<dyn Notifier>,
        page_size: u32,
        debounce: Duration,
    ) -> Self {
        Self {
            source,
            notifier,
            debouncer: Debouncer::new(debounce),
            inner: Arc::new(Mutex::new(Inner {
                query: ListQuery::new(1, page_size),
                page: None,
                error: None,
                loading: false,
                seq: 0,
                in_flight: None,
                loaded: None,
            })),
        }
    }

    /// Controller over a resource service, sized from the client config.
    pub fn for_service<R>(service: ResourceService<R>, notifier: Arc<dyn Notifier>) -> Self
    where
        R: Resource<Entity = T>,
    {
        let config: ClientConfig = service.client().config().clone();
        Self::new(Arc::new(service), notifier, config.page_size, config.debounce)
    }

    pub fn query(&self) -> ListQuery {
        self.inner.lock().query.clone()
    }

    pub fn state(&self) -> ListState<T> {
        let inner = self.inner.lock();
        if inner.loading {
            ListState::Loading
        } else if let Some(err) = &inner.error {
            ListState::Failed(err.clone())
        } else if let Some(page) = &inner.page {
            ListState::Loaded(page.clone())
        } else {
            ListState::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().loading
    }

    /// Rows from the last applied response.
    pub fn rows(&self) -> Vec<T> {
        self.inner
            .lock()
            .page
            .as_ref()
            .map(|p| p.data.clone())
            .unwrap_or_default()
    }

    pub fn current_page(&self) -> Option<Page<T>> {
        self.inner.lock().page.clone()
    }

    /// True once a response has been applied and it had no rows.
    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .page
            .as_ref()
            .is_some_and(|p| p.total == 0 || p.data.is_empty())
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.inner.lock().page.as_ref().and_then(Pagination::of)
    }

    pub fn last_error(&self) -> Option<ApiError> {
        self.inner.lock().error.clone()
    }

    /// Fetch unless the shown rows already match the current query.
    pub async fn load(&self) -> ApiResult<()> {
        self.fetch(false).await
    }

    /// Fetch again with the current query.
    pub async fn refresh(&self) -> ApiResult<()> {
        self.fetch(true).await
    }

    /// Retry after a failed load.
    pub async fn retry(&self) -> ApiResult<()> {
        self.fetch(true).await
    }

    pub async fn set_page(&self, page: u32) -> ApiResult<()> {
        self.inner.lock().query.page = page.max(1);
        self.fetch(false).await
    }

    pub async fn next_page(&self) -> ApiResult<()> {
        let next = {
            let inner = self.inner.lock();
            match inner.page.as_ref().and_then(Pagination::of) {
                Some(p) if p.has_next() => p.page + 1,
                _ => return Ok(()),
            }
        };
        self.set_page(next).await
    }

    pub async fn previous_page(&self) -> ApiResult<()> {
        let page = self.inner.lock().query.page;
        if page <= 1 {
            return Ok(());
        }
        self.set_page(page - 1).await
    }

    pub async fn set_page_size(&self, limit: u32) -> ApiResult<()> {
        {
            let mut inner = self.inner.lock();
            inner.query.limit = limit.max(1);
            inner.query.page = 1;
        }
        self.fetch(false).await
    }

    /// Replace search, filters and page in one go, then fetch once.
    pub async fn open(&self, query: ListQuery) -> ApiResult<()> {
        {
            let mut inner = self.inner.lock();
            inner.query = ListQuery {
                page: query.page.max(1),
                limit: query.limit.max(1),
                ..query
            };
        }
        self.fetch(false).await
    }

    /// Change a filter; the list goes back to page 1.
    pub async fn set_filter(&self, key: &str, value: Option<&str>) -> ApiResult<()> {
        {
            let mut inner = self.inner.lock();
            inner.query.set_filter(key, value.unwrap_or_default());
            inner.query.page = 1;
        }
        self.fetch(false).await
    }

    /// Record search input. Only the last input within the debounce window
    /// triggers a fetch; returns whether this call fetched.
    pub async fn search(&self, text: &str) -> ApiResult<bool> {
        {
            let mut inner = self.inner.lock();
            inner.query.set_search(text);
            inner.query.page = 1;
        }
        if !self.debouncer.settle().await {
            return Ok(false);
        }
        self.fetch(false).await?;
        Ok(true)
    }

    /// Delete a row and reload. A row that is already gone still triggers a
    /// reload so the view drops it.
    pub async fn delete_row(&self, id: &str) -> ApiResult<()> {
        match self.source.remove(id).await {
            Ok(()) => {
                self.notifier
                    .success(&format!("{} deleted successfully", self.source.label()));
                self.refresh().await
            }
            Err(err) if err.is_not_found() => {
                self.notifier.report(&err);
                // the refresh outcome is reported on its own
                let _ = self.refresh().await;
                Err(err)
            }
            Err(err) => {
                self.notifier.report(&err);
                Err(err)
            }
        }
    }

    async fn fetch(&self, force: bool) -> ApiResult<()> {
        let mut force = force;
        loop {
            let (ticket, query) = {
                let mut inner = self.inner.lock();
                let query = inner.query.clone();
                if inner.in_flight.as_ref() == Some(&query) {
                    debug!(source = self.source.label(), "Identical request already in flight");
                    return Ok(());
                }
                if !force && inner.error.is_none() && inner.loaded.as_ref() == Some(&query) {
                    return Ok(());
                }
                inner.seq += 1;
                inner.in_flight = Some(query.clone());
                inner.loading = true;
                (inner.seq, query)
            };

            let result = self.source.fetch(&query).await;

            let mut inner = self.inner.lock();
            if inner.seq != ticket {
                debug!(source = self.source.label(), ticket, "Discarding stale list response");
                return Ok(());
            }
            inner.in_flight = None;
            inner.loading = false;

            match result {
                Ok(page) => {
                    if page.total_pages > 0 && query.page > page.total_pages {
                        debug!(
                            source = self.source.label(),
                            page = query.page,
                            total_pages = page.total_pages,
                            "Page out of range, going back to page 1"
                        );
                        inner.query.page = 1;
                        force = true;
                        continue;
                    }
                    inner.error = None;
                    inner.page = Some(page);
                    inner.loaded = Some(query);
                    return Ok(());
                }
                Err(err) => {
                    inner.error = Some(err.clone());
                    drop(inner);
                    self.notifier.report(&err);
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::notify::{RecordingNotifier, ToastLevel};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Numbers {
        total: u64,
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ListSource<u64> for Numbers {
        fn label(&self) -> &'static str {
            "Number"
        }

        async fn fetch(&self, query: &ListQuery) -> ApiResult<Page<u64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::new(ErrorKind::Server, "boom"));
            }
            let start = u64::from(query.page - 1) * u64::from(query.limit);
            let data: Vec<u64> = (start..self.total.min(start + u64::from(query.limit))).collect();
            Ok(Page::new(data, query.page, query.limit, self.total))
        }

        async fn remove(&self, _id: &str) -> ApiResult<()> {
            Err(ApiError::from_status(404, None))
        }
    }

    fn controller(source: Numbers) -> (ListController<u64>, Arc<Numbers>, Arc<RecordingNotifier>) {
        let source = Arc::new(source);
        let notifier = Arc::new(RecordingNotifier::new());
        let list = ListController::new(source.clone(), notifier.clone(), 10, Duration::ZERO);
        (list, source, notifier)
    }

    #[tokio::test]
    async fn test_out_of_range_page_resets_to_first() {
        let (list, source, _) = controller(Numbers { total: 12, ..Default::default() });
        list.set_page(5).await.unwrap();

        assert_eq!(list.query().page, 1);
        assert_eq!(list.rows().len(), 10);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_result_keeps_requested_page() {
        let (list, source, _) = controller(Numbers::default());
        list.set_page(3).await.unwrap();

        assert_eq!(list.query().page, 3);
        assert!(list.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_result_has_no_pagination() {
        let (list, _, _) = controller(Numbers::default());
        list.load().await.unwrap();

        assert!(list.is_empty());
        assert!(list.pagination().is_none());
    }

    #[tokio::test]
    async fn test_pagination_summary() {
        let (list, _, _) = controller(Numbers { total: 42, ..Default::default() });
        list.set_page(5).await.unwrap();

        let pagination = list.pagination().unwrap();
        assert_eq!(pagination.summary(), "Showing 41-42 of 42 (page 5 of 5)");
        assert!(!pagination.has_next());
        assert!(pagination.has_previous());
    }

    #[tokio::test]
    async fn test_open_applies_whole_query_with_one_fetch() {
        let (list, source, _) = controller(Numbers { total: 25, ..Default::default() });
        let query = ListQuery::new(3, 10)
            .with_search("x")
            .with_filter("regionId", "2");
        list.open(query.clone()).await.unwrap();

        assert_eq!(list.query(), query);
        assert_eq!(list.rows(), vec![20, 21, 22, 23, 24]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_same_query_is_not_refetched() {
        let (list, source, _) = controller(Numbers { total: 3, ..Default::default() });
        list.load().await.unwrap();
        list.load().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        list.refresh().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_toasted_and_retryable() {
        let (list, source, notifier) = controller(Numbers { fail: true, ..Default::default() });
        assert!(list.load().await.is_err());
        assert!(matches!(list.state(), ListState::Failed(_)));
        assert_eq!(notifier.messages(ToastLevel::Error), vec!["boom"]);

        assert!(list.retry().await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_row_refreshes() {
        let (list, source, _) = controller(Numbers { total: 3, ..Default::default() });
        list.load().await.unwrap();

        let err = list.delete_row("9").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
