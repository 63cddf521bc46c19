// Cursor pagination
//
// Upstream list endpoints return `{ data, nextPageCursor }`. Pages are
// fetched strictly in sequence since each cursor comes from the previous
// response.

use std::future::Future;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::Error;

/// Default cap on pages fetched for one collection.
pub const DEFAULT_MAX_PAGES: usize = 500;

/// One page of a cursor-paginated collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub next_page_cursor: Option<String>,
}

impl<T> Page<T> {
    /// The cursor for the following page, `None` when this page is the last.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page_cursor
            .as_deref()
            .filter(|cursor| !cursor.is_empty())
    }
}

/// Collects every page of a collection into one ordered `Vec`.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    max_pages: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl Paginator {
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages }
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Walk the cursor chain starting from the empty cursor.
    ///
    /// `fetch` receives the cursor for the page to load. Items keep page
    /// order. A chain that has not ended after `max_pages` fetches fails
    /// with [`Error::CrawlOverrun`].
    pub async fn crawl<T, F, Fut>(&self, mut fetch: F) -> Result<Vec<T>, Error>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<Page<T>, Error>>,
    {
        let mut all = Vec::new();
        let mut cursor = String::new();
        let mut pages: usize = 0;

        loop {
            if pages >= self.max_pages {
                debug!(pages, "cursor chain exceeded page cap");
                return Err(Error::CrawlOverrun { pages });
            }

            let page = fetch(cursor).await?;
            pages += 1;
            trace!(page = pages, items = page.data.len(), "fetched page");

            let next = page.next_cursor().map(String::from);
            all.extend(page.data);

            match next {
                Some(next) => cursor = next,
                None => break,
            }
        }

        Ok(all)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Serve pages of the given sizes, numbering items globally.
    fn paged(sizes: &[usize]) -> Vec<Page<usize>> {
        let mut next_item = 0;
        sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let data = (next_item..next_item + size).collect();
                next_item += size;
                let next_page_cursor = (i + 1 < sizes.len()).then(|| format!("c{}", i + 1));
                Page {
                    data,
                    next_page_cursor,
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn collects_all_pages_in_order() {
        let pages = paged(&[3, 2, 4]);
        let seen = Mutex::new(Vec::new());

        let items = Paginator::default()
            .crawl(|cursor| {
                let index = seen.lock().unwrap().len();
                seen.lock().unwrap().push(cursor);
                let page = pages[index].clone();
                async move { Ok(page) }
            })
            .await
            .unwrap();

        assert_eq!(items, (0..9).collect::<Vec<_>>());
        assert_eq!(*seen.lock().unwrap(), vec!["", "c1", "c2"]);
    }

    #[tokio::test]
    async fn single_empty_page() {
        let mut calls = 0;
        let items: Vec<u32> = Paginator::default()
            .crawl(|_| {
                calls += 1;
                async {
                    Ok(Page {
                        data: Vec::new(),
                        next_page_cursor: None,
                    })
                }
            })
            .await
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn empty_string_cursor_terminates() {
        let items = Paginator::default()
            .crawl(|_| async {
                Ok(Page {
                    data: vec![1, 2],
                    next_page_cursor: Some(String::new()),
                })
            })
            .await
            .unwrap();

        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn repeating_cursor_hits_page_cap() {
        let mut calls = 0;
        let result: Result<Vec<u8>, Error> = Paginator::new(4)
            .crawl(|_| {
                calls += 1;
                async {
                    Ok(Page {
                        data: vec![0],
                        next_page_cursor: Some("same".into()),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(Error::CrawlOverrun { pages: 4 })));
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn page_error_aborts_crawl() {
        let mut calls = 0;
        let result: Result<Vec<u8>, Error> = Paginator::default()
            .crawl(|cursor| {
                calls += 1;
                async move {
                    if cursor.is_empty() {
                        Ok(Page {
                            data: vec![1],
                            next_page_cursor: Some("c1".into()),
                        })
                    } else {
                        Err(Error::Client {
                            status: 400,
                            message: "bad cursor".into(),
                        })
                    }
                }
            })
            .await;

        assert!(matches!(result, Err(Error::Client { status: 400, .. })));
        assert_eq!(calls, 2);
    }

    #[test]
    fn page_deserializes_null_cursor() {
        let page: Page<u32> =
            serde_json::from_str(r#"{"previousPageCursor":null,"nextPageCursor":null,"data":[7]}"#)
                .unwrap();
        assert_eq!(page.data, vec![7]);
        assert_eq!(page.next_cursor(), None);
    }
}
