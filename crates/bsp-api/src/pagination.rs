// Page-numbered list traversal.
//
// BSP list endpoints take a `pageNumber` query parameter (zero-based) and
// answer with `{ pageContent, lastPage }`. A `Paginator` owns the cursor;
// `into_stream` flattens pages into items for consumers that only care
// about the elements and may stop early.

use std::marker::PhantomData;

use futures_util::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{BspClient, Method, with_query};
use crate::error::Error;
use crate::models::Page;

/// Pull-based cursor over a paginated BSP list endpoint.
///
/// Not restartable: once the last page has been returned the paginator is
/// exhausted. Build a new one to traverse again from page 0.
pub struct Paginator<T> {
    client: BspClient,
    method: Method,
    path: String,
    params: Vec<(String, String)>,
    body: Option<Value>,
    next_page: u32,
    exhausted: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Paginator<T> {
    pub(crate) fn new(client: BspClient, method: Method, path: impl Into<String>) -> Self {
        Self {
            client,
            method,
            path: path.into(),
            params: Vec::new(),
            body: None,
            next_page: 0,
            exhausted: false,
            _item: PhantomData,
        }
    }

    /// Add a fixed query parameter sent with every page request.
    pub(crate) fn param(mut self, key: &str, value: &str) -> Self {
        self.params.push((key.to_owned(), value.to_owned()));
        self
    }

    /// JSON body sent with every page request (POST search endpoints).
    pub(crate) fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// `true` until a page flagged as last has been returned.
    pub fn has_next(&self) -> bool {
        !self.exhausted
    }

    /// Page number the next call to [`next_page`](Self::next_page) will request.
    pub fn current_page(&self) -> u32 {
        self.next_page
    }

    fn resource(&self) -> String {
        let page = self.next_page.to_string();
        let mut params: Vec<(&str, &str)> = vec![("pageNumber", page.as_str())];
        params.extend(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        with_query(&self.path, &params)
    }

    /// Fetch the next page's items, or `None` once exhausted.
    ///
    /// On error the cursor is left where it was.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>, Error> {
        if self.exhausted {
            return Ok(None);
        }

        let resource = self.resource();
        let page: Page<T> = self
            .client
            .request(self.method, &resource, self.body.as_ref())
            .await?;

        self.exhausted = page.last_page;
        self.next_page += 1;
        Ok(Some(page.page_content))
    }

    /// Flatten into a lazy stream of items.
    ///
    /// Pages are requested only as the stream is polled, so dropping it early
    /// skips the remaining requests.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<T, Error>> {
        async_stream::try_stream! {
            while let Some(items) = self.next_page().await? {
                for item in items {
                    yield item;
                }
            }
        }
    }

    /// Drain every remaining page into a `Vec`.
    pub async fn collect_all(mut self) -> Result<Vec<T>, Error> {
        let mut all = Vec::new();
        while let Some(items) = self.next_page().await? {
            all.extend(items);
        }
        Ok(all)
    }
}
