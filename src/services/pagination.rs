use serde::Serialize;

/// Page size for activity listings.
pub const ACTIVITY_PAGE_SIZE: u64 = 9;

/// One resolved page of a listing, numbered from 1.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub page_size: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, total: u64, page_size: u64) -> Self {
        let num_pages = num_pages(total, page_size);
        Self {
            items,
            number,
            num_pages,
            total,
            page_size,
            has_previous: number > 1,
            has_next: number < num_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            page_size: self.page_size,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }
}

/// Always at least one page, even for an empty listing.
pub fn num_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// Missing or non-numeric pages resolve to 1; pages below 1 or past the end
/// resolve to the last page.
pub fn resolve_page(raw: Option<&str>, total: u64, page_size: u64) -> u64 {
    let last = num_pages(total, page_size);
    match raw.map(str::trim).and_then(|value| value.parse::<i64>().ok()) {
        None => 1,
        Some(page) if page < 1 => last,
        Some(page) => (page as u64).min(last),
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, num_pages, resolve_page};

    #[test]
    fn empty_listing_still_has_one_page() {
        assert_eq!(num_pages(0, 9), 1);
        assert_eq!(num_pages(9, 9), 1);
        assert_eq!(num_pages(10, 9), 2);
    }

    #[test]
    fn resolves_lenient_page_numbers() {
        assert_eq!(resolve_page(None, 10, 9), 1);
        assert_eq!(resolve_page(Some("abc"), 10, 9), 1);
        assert_eq!(resolve_page(Some("2"), 10, 9), 2);
        assert_eq!(resolve_page(Some("99"), 10, 9), 2);
        assert_eq!(resolve_page(Some("5"), 0, 9), 1);
    }

    #[test]
    fn pages_below_one_resolve_to_the_last_page() {
        assert_eq!(resolve_page(Some("0"), 10, 9), 2);
        assert_eq!(resolve_page(Some("-3"), 10, 9), 2);
        assert_eq!(resolve_page(Some("0"), 30, 9), 4);
        assert_eq!(resolve_page(Some("-1"), 0, 9), 1);
    }

    #[test]
    fn page_reports_neighbours() {
        let page = Page::new(vec![1], 2, 10, 9);
        assert_eq!(page.num_pages, 2);
        assert!(page.has_previous);
        assert!(!page.has_next);

        let first = Page::new(vec![1; 9], 1, 10, 9).map(|value| value * 2);
        assert!(!first.has_previous);
        assert!(first.has_next);
        assert_eq!(first.items[0], 2);
    }
}
