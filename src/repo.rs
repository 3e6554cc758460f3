use crate::models::{Book, NewReview, ReadingList, ReadingListUpdate, Review, Session};
use std::error::Error;
use std::future::Future;

/// Data access to the managed backend's books, reading lists and reviews.
pub trait CatalogRepo<E: Error> {
    fn get_books(&self) -> impl Future<Output = Result<Vec<Book>, E>> + Send;

    fn get_book(&self, id: &str) -> impl Future<Output = Result<Option<Book>, E>> + Send;

    /// Reading lists owned by the user the repo is bound to
    fn get_reading_lists(&self) -> impl Future<Output = Result<Vec<ReadingList>, E>> + Send;

    /// Replaces the list's whole identifier collection
    fn update_reading_list(
        &self,
        id: &str,
        update: ReadingListUpdate,
    ) -> impl Future<Output = Result<(), E>> + Send;

    fn get_reviews(&self, book_id: &str) -> impl Future<Output = Result<Vec<Review>, E>> + Send;

    fn create_review(&self, review: NewReview) -> impl Future<Output = Result<(), E>> + Send;
}

pub trait SessionSource<E: Error> {
    /// Returns `None` when nobody is signed in
    fn current_session(&self) -> impl Future<Output = Result<Option<Session>, E>> + Send;
}

/// Hands out collaborators bound to one caller's access token.
pub trait Backend<E: Error>: Clone + Send + Sync + 'static {
    type Repo: CatalogRepo<E> + Send + Sync;
    type Sessions: SessionSource<E> + Send + Sync;

    fn bind(&self, access_token: Option<String>) -> (Self::Repo, Self::Sessions);
}
