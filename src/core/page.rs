//! Paginated results

use serde::Serialize;

/// One page of records with its position in the full result set
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// The records of this page
    pub data: Vec<T>,

    /// Navigation links
    pub links: PageLinks,

    /// Pagination metadata
    pub meta: PageMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMeta {
    /// Current page number (starts at 1)
    pub current_page: u64,

    /// 1-based index of the first item on this page, `None` when empty
    pub from: Option<u64>,

    /// 1-based index of the last item on this page, `None` when empty
    pub to: Option<u64>,

    /// Number of the last page, at least 1
    pub last_page: u64,

    /// Base path the links are built from
    pub path: String,

    /// Number of items per page
    pub per_page: u64,

    /// Total number of items (after filters and search)
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl PageMeta {
    /// Create pagination metadata from calculation
    pub fn new(path: impl Into<String>, page: u64, per_page: u64, total: u64, len: usize) -> Self {
        // Ensure per_page is at least 1 to avoid division by zero
        let per_page = per_page.max(1);
        let page = page.max(1);
        let last_page = total.div_ceil(per_page).max(1);
        let start = (page - 1).saturating_mul(per_page);
        let (from, to) = if len == 0 {
            (None, None)
        } else {
            (Some(start + 1), Some(start + len as u64))
        };

        Self {
            current_page: page,
            from,
            to,
            last_page,
            path: path.into(),
            per_page,
            total,
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Link to `page`, carrying the page size
    pub fn url(&self, page: u64) -> String {
        format!(
            "{}?page[number]={}&page[size]={}",
            self.path, page, self.per_page
        )
    }

    pub fn links(&self) -> PageLinks {
        PageLinks {
            first: self.url(1),
            last: self.url(self.last_page),
            prev: self.has_prev().then(|| self.url(self.current_page - 1)),
            next: self.has_next().then(|| self.url(self.current_page + 1)),
        }
    }
}

impl<T> Page<T> {
    /// Assemble a page from its records and the total match count
    pub fn new(data: Vec<T>, path: impl Into<String>, page: u64, per_page: u64, total: u64) -> Self {
        let meta = PageMeta::new(path, page, per_page, total, data.len());
        Self {
            links: meta.links(),
            data,
            meta,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            links: self.links,
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_meta() {
        let meta = PageMeta::new("/api/categories", 1, 15, 145, 15);
        assert_eq!(meta.total, 145);
        assert_eq!(meta.last_page, 10);
        assert_eq!((meta.from, meta.to), (Some(1), Some(15)));
        assert!(!meta.has_prev());
        assert!(meta.has_next());
    }

    #[test]
    fn test_last_partial_page() {
        let meta = PageMeta::new("/p", 3, 10, 25, 5);
        assert_eq!((meta.from, meta.to), (Some(21), Some(25)));
        assert!(!meta.has_next());
        assert!(meta.has_prev());
    }

    #[test]
    fn test_empty_result_still_has_one_page() {
        let meta = PageMeta::new("/p", 1, 15, 0, 0);
        assert_eq!(meta.last_page, 1);
        assert_eq!((meta.from, meta.to), (None, None));
        let links = meta.links();
        assert_eq!(links.first, "/p?page[number]=1&page[size]=15");
        assert_eq!(links.last, "/p?page[number]=1&page[size]=15");
        assert_eq!(links.prev, None);
        assert_eq!(links.next, None);
    }

    #[test]
    fn test_page_past_the_end() {
        let page: Page<u8> = Page::new(vec![], "/p", 9, 10, 25);
        assert_eq!(page.meta.current_page, 9);
        assert_eq!(page.meta.from, None);
        assert_eq!(page.links.prev.as_deref(), Some("/p?page[number]=8&page[size]=10"));
        assert_eq!(page.links.next, None);
    }

    #[test]
    fn test_middle_page_links() {
        let page = Page::new(vec![1, 2], "/p", 2, 2, 6);
        assert_eq!(page.links.prev.as_deref(), Some("/p?page[number]=1&page[size]=2"));
        assert_eq!(page.links.next.as_deref(), Some("/p?page[number]=3&page[size]=2"));
        assert_eq!(page.links.last, "/p?page[number]=3&page[size]=2");
    }

    #[test]
    fn test_map_keeps_meta() {
        let page = Page::new(vec![1, 2], "/p", 1, 2, 2).map(|n| n * 10);
        assert_eq!(page.data, vec![10, 20]);
        assert_eq!(page.meta.total, 2);
    }
}
