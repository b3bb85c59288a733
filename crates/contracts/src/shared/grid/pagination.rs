/// Slice `[index * size, index * size + size)` clamped to `items`.
/// Out-of-range pages and a zero page size give an empty page.
pub fn paginate<T>(items: &[T], page_index: usize, page_size: usize) -> &[T] {
    let start = page_index.saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `total` items; zero for an empty set.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_slices() {
        let items: Vec<u32> = (0..7).collect();
        assert_eq!(paginate(&items, 0, 3), &[0, 1, 2]);
        assert_eq!(paginate(&items, 2, 3), &[6]);
        assert!(paginate(&items, 3, 3).is_empty());
        assert!(paginate(&items, usize::MAX, 3).is_empty());
        assert!(paginate(&items, 0, 0).is_empty());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(5, 0), 0);
    }
}
