//! In-process pagination over a fully fetched result set.

pub const PER_PAGE: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice `all` to `page` (1-based). `total_pages` is `ceil(n / per_page)`, at least 1.
/// Pages below 1 are treated as 1; pages past the end are empty.
pub fn paginate<T>(all: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let current_page = page.max(1);
    let total_items = all.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let offset = (current_page - 1).saturating_mul(per_page);
    let items = all.into_iter().skip(offset).take(per_page).collect();
    Page {
        items,
        current_page,
        total_pages,
        total_items,
    }
}

/// Parse a `page` query value leniently; anything unparsable means page 1.
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_is_ceiling_of_nine() {
        for (n, pages) in [(0, 1), (1, 1), (9, 1), (10, 2), (18, 2), (19, 3), (27, 3)] {
            let page = paginate((0..n).collect::<Vec<_>>(), 1, PER_PAGE);
            assert_eq!(page.total_pages, pages, "n = {}", n);
            assert_eq!(page.total_items, n);
        }
    }

    #[test]
    fn slices_the_requested_page() {
        let page = paginate((1..=20).collect::<Vec<_>>(), 3, PER_PAGE);
        assert_eq!(page.items, vec![19, 20]);
        assert_eq!(page.current_page, 3);
    }

    #[test]
    fn out_of_range_pages() {
        let past_end = paginate((1..=5).collect::<Vec<_>>(), 4, PER_PAGE);
        assert!(past_end.items.is_empty());
        let zero = paginate((1..=5).collect::<Vec<_>>(), 0, PER_PAGE);
        assert_eq!(zero.current_page, 1);
        assert_eq!(zero.items.len(), 5);
    }

    #[test]
    fn lenient_page_parsing() {
        assert_eq!(parse_page(Some("2")), 2);
        assert_eq!(parse_page(Some("-3")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(None), 1);
    }
}
