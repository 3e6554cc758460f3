//! In-memory stand-in for the managed backend, recording every call.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::models::{Book, NewReview, ReadingList, ReadingListUpdate, Review, Session};
use crate::repo::{Backend, CatalogRepo, SessionSource};

#[derive(Debug)]
pub struct FakeError;

impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fake backend failure")
    }
}

impl Error for FakeError {}

#[derive(Default)]
struct Inner {
    books: Vec<Book>,
    reading_lists: Vec<ReadingList>,
    reviews: Vec<Review>,
    session: Option<Session>,
    failing: Vec<&'static str>,
    delay: Option<Duration>,
    calls: HashMap<&'static str, usize>,
    updates: Vec<(String, ReadingListUpdate)>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<Inner>>,
}

pub fn numbered_books(count: usize) -> Vec<Book> {
    (1..=count)
        .map(|n| Book {
            id: format!("b{n}"),
            title: format!("Title {n:02}"),
            author: "Anon".to_string(),
            genre: "Misc".to_string(),
            ..Book::default()
        })
        .collect()
}

impl FakeBackend {
    pub fn with_books(books: Vec<Book>) -> Self {
        let backend = FakeBackend::default();
        backend.inner.lock().unwrap().books = books;
        backend
    }

    /// Every operation fails.
    pub fn failing() -> Self {
        let backend = FakeBackend::default();
        backend.inner.lock().unwrap().failing = vec![
            "get_books",
            "get_book",
            "get_reading_lists",
            "update_reading_list",
            "get_reviews",
            "create_review",
            "current_session",
        ];
        backend
    }

    pub fn failing_on(self, operation: &'static str) -> Self {
        self.inner.lock().unwrap().failing.push(operation);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.inner.lock().unwrap().delay = Some(delay);
        self
    }

    pub fn with_reading_list(self, list: ReadingList) -> Self {
        self.inner.lock().unwrap().reading_lists.push(list);
        self
    }

    pub fn with_review(self, review: Review) -> Self {
        self.inner.lock().unwrap().reviews.push(review);
        self
    }

    pub fn signed_in(self, user_id: &str) -> Self {
        self.inner.lock().unwrap().session = Some(Session {
            user_id: user_id.to_string(),
            email: None,
        });
        self
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn updates(&self) -> Vec<(String, ReadingListUpdate)> {
        self.inner.lock().unwrap().updates.clone()
    }

    pub fn reviews(&self) -> Vec<Review> {
        self.inner.lock().unwrap().reviews.clone()
    }

    async fn enter(&self, operation: &'static str) -> Result<(), FakeError> {
        let (delay, failing) = {
            let mut inner = self.inner.lock().unwrap();
            *inner.calls.entry(operation).or_default() += 1;
            (inner.delay, inner.failing.contains(&operation))
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            Err(FakeError)
        } else {
            Ok(())
        }
    }
}

impl CatalogRepo<FakeError> for FakeBackend {
    async fn get_books(&self) -> Result<Vec<Book>, FakeError> {
        self.enter("get_books").await?;
        Ok(self.inner.lock().unwrap().books.clone())
    }

    async fn get_book(&self, id: &str) -> Result<Option<Book>, FakeError> {
        self.enter("get_book").await?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.books.iter().find(|b| b.id == id).cloned())
    }

    async fn get_reading_lists(&self) -> Result<Vec<ReadingList>, FakeError> {
        self.enter("get_reading_lists").await?;
        Ok(self.inner.lock().unwrap().reading_lists.clone())
    }

    async fn update_reading_list(
        &self,
        id: &str,
        update: ReadingListUpdate,
    ) -> Result<(), FakeError> {
        self.enter("update_reading_list").await?;
        let mut inner = self.inner.lock().unwrap();
        if let Some(list) = inner.reading_lists.iter_mut().find(|l| l.id == id) {
            list.book_ids = update.book_ids.clone();
            list.name = update.name.clone();
        }
        inner.updates.push((id.to_string(), update));
        Ok(())
    }

    async fn get_reviews(&self, book_id: &str) -> Result<Vec<Review>, FakeError> {
        self.enter("get_reviews").await?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn create_review(&self, review: NewReview) -> Result<(), FakeError> {
        self.enter("create_review").await?;
        let mut inner = self.inner.lock().unwrap();
        let id = format!("r{}", inner.reviews.len() + 1);
        inner.reviews.push(Review {
            id,
            book_id: review.book_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: None,
        });
        Ok(())
    }
}

impl SessionSource<FakeError> for FakeBackend {
    async fn current_session(&self) -> Result<Option<Session>, FakeError> {
        self.enter("current_session").await?;
        Ok(self.inner.lock().unwrap().session.clone())
    }
}

impl Backend<FakeError> for FakeBackend {
    type Repo = FakeBackend;
    type Sessions = FakeBackend;

    fn bind(&self, _access_token: Option<String>) -> (Self::Repo, Self::Sessions) {
        (self.clone(), self.clone())
    }
}
