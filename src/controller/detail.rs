use std::error::Error;
use std::marker::PhantomData;

use tracing::{info, warn};

use super::{ActionError, LoadState, Notice, Scope, Teardown};
use crate::models::{Book, NewReview, ReadingList, ReadingListUpdate, Review, Session};
use crate::repo::{CatalogRepo, SessionSource};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOutcome {
    Loaded,
    NotFound,
    Failed,
    Cancelled,
}

/// Book detail page: the book itself, its reviews, and the signed-in user's
/// reading lists.
pub struct DetailController<E, R, S> {
    repo: R,
    sessions: S,
    scope: Scope,
    state: LoadState,
    book: Option<Book>,
    reviews: Vec<Review>,
    reading_lists: Vec<ReadingList>,
    notices: Vec<Notice>,
    _error: PhantomData<fn() -> E>,
}

impl<E, R, S> DetailController<E, R, S>
where
    E: Error,
    R: CatalogRepo<E>,
    S: SessionSource<E>,
{
    pub fn new(repo: R, sessions: S) -> Self {
        DetailController {
            repo,
            sessions,
            scope: Scope::new(),
            state: LoadState::Idle,
            book: None,
            reviews: Vec::new(),
            reading_lists: Vec::new(),
            notices: Vec::new(),
            _error: PhantomData,
        }
    }

    pub async fn load(&mut self, book_id: &str) -> DetailOutcome {
        self.state = LoadState::Loading;

        let Some(result) = self.scope.guard(self.repo.get_book(book_id)).await else {
            return DetailOutcome::Cancelled;
        };

        let book = match result {
            Ok(Some(book)) => book,
            Ok(None) => {
                info!("No book found with ID: {}", book_id);
                self.state = LoadState::Loaded;
                return DetailOutcome::NotFound;
            }
            Err(e) => {
                warn!("Failed to load book {}: {}", book_id, e);
                self.notices.push(Notice::error("Failed to load book details"));
                self.state = LoadState::Failed;
                return DetailOutcome::Failed;
            }
        };
        info!("Retrieved book: {:?}", book.title);
        self.book = Some(book);

        let repo = &self.repo;
        let related =
            async move { tokio::join!(repo.get_reviews(book_id), repo.get_reading_lists()) };
        let Some((reviews, lists)) = self.scope.guard(related).await else {
            return DetailOutcome::Cancelled;
        };

        match reviews {
            Ok(reviews) => {
                info!("Retrieved {} reviews for book {}", reviews.len(), book_id);
                self.reviews = reviews;
            }
            Err(e) => {
                warn!("Failed to load reviews for book {}: {}", book_id, e);
                self.notices.push(Notice::error("Failed to load reviews"));
            }
        }
        match lists {
            Ok(lists) => self.reading_lists = lists,
            Err(e) => {
                warn!("Failed to load reading lists: {}", e);
                self.notices.push(Notice::error("Failed to load reading lists"));
            }
        }

        self.state = LoadState::Loaded;
        DetailOutcome::Loaded
    }

    /// Appends the book to the selected list and stores the whole list.
    /// Books already on the list are appended again.
    pub async fn add_to_reading_list(
        &mut self,
        list_id: Option<&str>,
    ) -> Result<(), ActionError<E>> {
        let Some(list_id) = list_id.filter(|id| !id.trim().is_empty()) else {
            return Err(self.reject("Please select a reading list"));
        };
        let Some(book_id) = self.book.as_ref().map(|b| b.id.clone()) else {
            return Err(self.reject("No book loaded"));
        };
        let Some(index) = self.reading_lists.iter().position(|l| l.id == list_id) else {
            return Err(self.reject("Unknown reading list"));
        };

        let list = &self.reading_lists[index];
        let mut book_ids = list.book_ids.clone();
        book_ids.push(book_id.clone());
        let update = ReadingListUpdate {
            book_ids,
            name: list.name.clone(),
        };

        let stored = self
            .scope
            .guard(self.repo.update_reading_list(list_id, update.clone()))
            .await
            .ok_or(ActionError::Cancelled)?;

        match stored {
            Ok(()) => {
                info!("Added book {} to reading list {}", book_id, list_id);
                let list = &mut self.reading_lists[index];
                list.book_ids = update.book_ids;
                self.notices.push(Notice::info(format!("Added to {}", list.name)));
                Ok(())
            }
            Err(e) => {
                warn!("Failed to update reading list {}: {}", list_id, e);
                self.notices.push(Notice::error("Failed to add book to reading list"));
                Err(ActionError::Backend(e))
            }
        }
    }

    /// Ok with the session when a user may write a review, otherwise the
    /// caller is expected to send them to the login view.
    pub async fn require_session(&self) -> Result<Session, ActionError<E>> {
        let resolved = self
            .scope
            .guard(self.sessions.current_session())
            .await
            .ok_or(ActionError::Cancelled)?;

        match resolved {
            Ok(Some(session)) => Ok(session),
            Ok(None) => {
                info!("Write review blocked: no signed-in user");
                Err(ActionError::AuthRequired)
            }
            Err(e) => {
                warn!("Session check failed, treating as signed out: {}", e);
                Err(ActionError::AuthRequired)
            }
        }
    }

    /// Stores a new review and reloads the book's reviews. Input is checked
    /// before anything is sent.
    pub async fn submit_review(&mut self, rating: u8, comment: &str) -> Result<(), ActionError<E>> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(self.reject("Please write a comment"));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(self.reject("Rating must be between 1 and 5 stars"));
        }
        let Some(book_id) = self.book.as_ref().map(|b| b.id.clone()) else {
            return Err(self.reject("No book loaded"));
        };

        let session = self.require_session().await?;

        let review = NewReview {
            book_id: book_id.clone(),
            user_id: session.user_id,
            rating,
            comment: comment.to_string(),
        };
        let created = self
            .scope
            .guard(self.repo.create_review(review))
            .await
            .ok_or(ActionError::Cancelled)?;

        if let Err(e) = created {
            warn!("Failed to create review for book {}: {}", book_id, e);
            self.notices.push(Notice::error("Failed to submit review"));
            return Err(ActionError::Backend(e));
        }
        info!("Created review for book {}", book_id);
        self.notices.push(Notice::info("Review submitted"));

        self.reload_reviews().await;
        Ok(())
    }

    pub async fn reload_reviews(&mut self) {
        let Some(book_id) = self.book.as_ref().map(|b| b.id.clone()) else {
            return;
        };
        self.state = LoadState::Loading;

        let Some(result) = self.scope.guard(self.repo.get_reviews(&book_id)).await else {
            return;
        };

        match result {
            Ok(reviews) => {
                self.reviews = reviews;
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                warn!("Failed to reload reviews for book {}: {}", book_id, e);
                self.notices.push(Notice::error("Failed to load reviews"));
                self.state = LoadState::Failed;
            }
        }
    }

    fn reject(&mut self, message: &'static str) -> ActionError<E> {
        warn!("Action rejected: {}", message);
        self.notices.push(Notice::error(message));
        ActionError::Validation(message)
    }

    pub fn book(&self) -> Option<&Book> {
        self.book.as_ref()
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn reading_lists(&self) -> &[ReadingList] {
        &self.reading_lists
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn teardown(&self) {
        self.scope.close();
    }

    pub fn teardown_handle(&self) -> Teardown {
        self.scope.handle()
    }
}
