//! Offset/limit pagination over a materialized collection

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_items: usize,
    pub(crate) total_pages: usize,
    pub(crate) current_page: usize,
    pub(crate) per_page: usize,
}

/// Slice out `page` (1-based). Pages past the end are empty, not errors.
pub(crate) fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Result<Page<T>, AppError> {
    if page == 0 || per_page == 0 {
        return Err(AppError::InvalidPage { page, per_page });
    }
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let offset = (page - 1).saturating_mul(per_page);
    let items = items.into_iter().skip(offset).take(per_page).collect();
    Ok(Page {
        items,
        total_items,
        total_pages,
        current_page: page,
        per_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_requested_page() {
        let page = paginate((1..=25).collect::<Vec<_>>(), 2, 10).unwrap();
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total_items, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn last_page_is_partial() {
        let page = paginate((1..=25).collect::<Vec<_>>(), 3, 10).unwrap();
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn page_past_end_is_empty() {
        let page = paginate(vec![1, 2, 3], 5, 2).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn zero_page_or_size_is_rejected() {
        assert!(matches!(
            paginate(vec![1], 0, 10),
            Err(AppError::InvalidPage { page: 0, .. })
        ));
        assert!(paginate(vec![1], 1, 0).is_err());
    }

    #[test]
    fn empty_collection_has_no_pages() {
        let page = paginate(Vec::<u8>::new(), 1, 10).unwrap();
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }
}
