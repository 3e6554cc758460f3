//! Serializable page models. These only reshape controller state for the
//! client; every decision has already been made by the controllers.

use std::error::Error;

use serde::Serialize;

use crate::controller::{
    CatalogController, DetailController, ListedBook, LoadState, Notice, ReadingListsController,
    MAX_RATING, MIN_RATING,
};
use crate::models::{Book, Review, SortKey};
use crate::repo::{CatalogRepo, SessionSource};

pub const NO_MATCHES: &str = "No matches found";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub state: LoadState,
    pub query: String,
    pub sort: SortKey,
    pub books: Vec<Book>,
    pub total_matches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub notices: Vec<Notice>,
}

impl CatalogPage {
    pub fn render<E: Error, R: CatalogRepo<E>>(controller: &CatalogController<E, R>) -> Self {
        let view = controller.view();
        let (pagination, message) = if view.is_empty() {
            let message = (controller.state() == LoadState::Loaded).then_some(NO_MATCHES);
            (None, message)
        } else {
            let pagination = Pagination {
                page: view.page,
                total_pages: view.total_pages,
                has_previous: view.page > 1,
                has_next: view.page < view.total_pages,
            };
            (Some(pagination), None)
        };

        CatalogPage {
            state: controller.state(),
            query: controller.query().to_string(),
            sort: controller.sort().clone(),
            books: view.page_items().iter().map(|b| (*b).clone()).collect(),
            total_matches: view.filtered_count(),
            pagination,
            message,
            notices: controller.notices().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChoice {
    pub id: String,
    pub name: String,
    pub contains_book: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPage {
    pub book: Option<Book>,
    pub reviews: Vec<Review>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    pub reading_lists: Vec<ListChoice>,
    pub notices: Vec<Notice>,
}

impl DetailPage {
    pub fn render<E, R, S>(controller: &DetailController<E, R, S>) -> Self
    where
        E: Error,
        R: CatalogRepo<E>,
        S: SessionSource<E>,
    {
        let book = controller.book().cloned();
        let book_id = book.as_ref().map(|b| b.id.as_str()).unwrap_or_default();

        DetailPage {
            reading_lists: controller
                .reading_lists()
                .iter()
                .map(|list| ListChoice {
                    id: list.id.clone(),
                    name: list.name.clone(),
                    contains_book: list.book_ids.iter().any(|id| id == book_id),
                })
                .collect(),
            reviews: controller.reviews().to_vec(),
            average_rating: average_rating(controller.reviews()),
            notices: controller.notices().to_vec(),
            book,
        }
    }
}

pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    Some(f64::from(total) / reviews.len() as f64)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReviewPage {
    pub book_id: String,
    pub user_id: String,
    pub min_rating: u8,
    pub max_rating: u8,
}

impl WriteReviewPage {
    pub fn new(book_id: String, user_id: String) -> Self {
        WriteReviewPage {
            book_id,
            user_id,
            min_rating: MIN_RATING,
            max_rating: MAX_RATING,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedEntry {
    pub book_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub id: String,
    pub name: String,
    pub books: Vec<ListedEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListsPage {
    pub user_id: String,
    pub lists: Vec<ListSummary>,
    pub notices: Vec<Notice>,
}

impl ReadingListsPage {
    pub fn render<E, R, S>(controller: &ReadingListsController<E, R, S>) -> Self
    where
        E: Error,
        R: CatalogRepo<E>,
        S: SessionSource<E>,
    {
        let lists = controller
            .lists()
            .iter()
            .map(|list| ListSummary {
                id: list.id.clone(),
                name: list.name.clone(),
                books: controller
                    .entries(list)
                    .into_iter()
                    .map(|entry| match entry {
                        ListedBook::Known(book) => ListedEntry {
                            book_id: book.id,
                            title: Some(book.title),
                            author: Some(book.author),
                        },
                        ListedBook::Unknown(book_id) => ListedEntry {
                            book_id,
                            title: None,
                            author: None,
                        },
                    })
                    .collect(),
            })
            .collect();

        ReadingListsPage {
            user_id: controller
                .session()
                .map(|s| s.user_id.clone())
                .unwrap_or_default(),
            lists,
            notices: controller.notices().to_vec(),
        }
    }
}

/// Body for responses that only carry a message and notices.
#[derive(Debug, Serialize)]
pub struct MessagePage {
    pub message: String,
    pub notices: Vec<Notice>,
}

impl MessagePage {
    pub fn new(message: impl Into<String>, notices: &[Notice]) -> Self {
        MessagePage {
            message: message.into(),
            notices: notices.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::fake::{numbered_books, FakeBackend, FakeError};
    use crate::models::ReadingList;

    fn review(rating: u8) -> Review {
        Review {
            id: format!("r{rating}"),
            book_id: "b1".to_string(),
            user_id: "u1".to_string(),
            rating,
            comment: "ok".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn average_of_no_reviews_is_absent() {
        assert_eq!(None, average_rating(&[]));
        assert_eq!(Some(3.0), average_rating(&[review(2), review(4)]));
    }

    #[tokio::test]
    async fn empty_catalog_view_has_message_and_no_pagination() {
        let backend = FakeBackend::with_books(numbered_books(14));
        let mut controller = CatalogController::<FakeError, _>::new(backend);
        controller.mount().await;
        controller.set_query("tolkien");

        let page = CatalogPage::render(&controller);

        assert_eq!(Some(NO_MATCHES), page.message);
        assert!(page.pagination.is_none());
        assert!(page.books.is_empty());
        assert_eq!(0, page.total_matches);
    }

    #[tokio::test]
    async fn catalog_page_carries_pagination() {
        let backend = FakeBackend::with_books(numbered_books(14));
        let mut controller = CatalogController::<FakeError, _>::new(backend);
        controller.mount().await;
        controller.go_to_page(2);

        let page = CatalogPage::render(&controller);
        let pagination = page.pagination.unwrap();

        assert_eq!(2, page.books.len());
        assert_eq!(14, page.total_matches);
        assert_eq!(2, pagination.page);
        assert!(pagination.has_previous);
        assert!(!pagination.has_next);
        assert!(page.message.is_none());
    }

    #[tokio::test]
    async fn detail_page_marks_lists_holding_the_book() {
        let backend = FakeBackend::with_books(numbered_books(1))
            .with_reading_list(ReadingList {
                id: "l1".to_string(),
                name: "Done".to_string(),
                book_ids: vec!["b1".to_string()],
            })
            .with_reading_list(ReadingList {
                id: "l2".to_string(),
                name: "Next".to_string(),
                book_ids: vec![],
            });
        let mut controller = DetailController::<FakeError, _, _>::new(backend.clone(), backend);
        controller.load("b1").await;

        let page = DetailPage::render(&controller);

        assert!(page.reading_lists[0].contains_book);
        assert!(!page.reading_lists[1].contains_book);
        assert!(page.average_rating.is_none());
    }
}
