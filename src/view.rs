//! The derived view shown by the catalog: filter, then sort, then paginate.
//!
//! Everything here is pure and synchronous. Callers are expected to clamp the
//! page number themselves; out-of-range pages simply produce an empty slice.

use std::cmp::Ordering;
use std::ops::Range;

use crate::models::{Book, SortKey};

pub const PAGE_SIZE: usize = 12;

/// The result of running the pipeline over one set of inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView<'a> {
    pub filtered: Vec<&'a Book>,
    pub sorted: Vec<&'a Book>,
    pub page: usize,
    pub total_pages: usize,
    page_range: Range<usize>,
}

impl<'a> DerivedView<'a> {
    pub fn page_items(&self) -> &[&'a Book] {
        &self.sorted[self.page_range.clone()]
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

pub fn derive_view<'a>(
    books: &'a [Book],
    query: &str,
    sort: &SortKey,
    page: usize,
) -> DerivedView<'a> {
    let filtered = filter_books(books, query);
    let sorted = sort_books(&filtered, sort);
    let page_range = page_range(sorted.len(), page, PAGE_SIZE);
    let total_pages = total_pages(filtered.len(), PAGE_SIZE);

    DerivedView {
        filtered,
        sorted,
        page,
        total_pages,
        page_range,
    }
}

/// Case-insensitive substring match on title, author and genre.
pub fn filter_books<'a>(books: &'a [Book], query: &str) -> Vec<&'a Book> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return books.iter().collect();
    }

    books
        .iter()
        .filter(|book| {
            [&book.title, &book.author, &book.genre]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

type Comparator = fn(&Book, &Book, &str) -> Ordering;

fn comparator_for(key: &SortKey) -> Comparator {
    match key {
        SortKey::Rating => by_rating_desc,
        SortKey::PublishedYear => by_year_desc,
        SortKey::Title | SortKey::Author | SortKey::Other(_) => by_field_asc,
    }
}

fn by_rating_desc(a: &Book, b: &Book, _: &str) -> Ordering {
    let (a, b) = (a.rating.unwrap_or(0.0), b.rating.unwrap_or(0.0));
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn by_year_desc(a: &Book, b: &Book, _: &str) -> Ordering {
    b.published_year.unwrap_or(0).cmp(&a.published_year.unwrap_or(0))
}

fn by_field_asc(a: &Book, b: &Book, field: &str) -> Ordering {
    let a = a.text_field(field).unwrap_or_default().to_lowercase();
    let b = b.text_field(field).unwrap_or_default().to_lowercase();
    a.cmp(&b)
}

/// Returns a new, stably sorted sequence. The input is left untouched.
pub fn sort_books<'a>(books: &[&'a Book], key: &SortKey) -> Vec<&'a Book> {
    let compare = comparator_for(key);
    let field = key.as_str();

    let mut sorted = books.to_vec();
    sorted.sort_by(|a, b| compare(a, b, field));
    sorted
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size).max(1)
}

fn page_range(len: usize, page: usize, page_size: usize) -> Range<usize> {
    let Some(start) = page.checked_sub(1).and_then(|p| p.checked_mul(page_size)) else {
        return 0..0;
    };
    if start >= len {
        return 0..0;
    }
    start..start.saturating_add(page_size).min(len)
}

/// Slice of `items` shown on the 1-based `page`.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    &items[page_range(items.len(), page, page_size)]
}
