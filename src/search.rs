//! In-memory search and pagination over the loaded user list.
//!
//! Everything here is pure: the app recomputes from these on every change
//! to the list, the search term, or the page position.
use crate::sys::UserRecord;

/// Keep the users whose name contains `query`, ignoring case.
///
/// A blank query keeps everyone. Relative order is preserved.
pub fn filter_users(users: &[UserRecord], query: &str) -> Vec<UserRecord> {
    if query.trim().is_empty() {
        return users.to_vec();
    }
    let q = query.to_lowercase();
    users
        .iter()
        .filter(|u| u.name.to_lowercase().contains(&q))
        .cloned()
        .collect()
}

/// The `page`-th run of `size` items, clipped to what is available.
///
/// Out-of-range pages (and a zero `size`) yield an empty slice.
pub fn paginate<T>(items: &[T], page: usize, size: usize) -> &[T] {
    let Some(start) = page.checked_mul(size) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// Number of pages needed to show `len` items, `size` at a time.
pub fn page_count(len: usize, size: usize) -> usize {
    if size == 0 { 0 } else { len.div_ceil(size) }
}
