use std::collections::HashMap;
use std::error::Error;
use std::marker::PhantomData;

use tracing::{info, warn};

use super::{ActionError, LoadState, Notice, Scope};
use crate::models::{Book, ReadingList, Session};
use crate::repo::{CatalogRepo, SessionSource};

/// A reading list entry, resolved against the catalog when possible.
#[derive(Debug, Clone, PartialEq)]
pub enum ListedBook {
    Known(Book),
    Unknown(String),
}

/// The signed-in user's reading lists.
pub struct ReadingListsController<E, R, S> {
    repo: R,
    sessions: S,
    scope: Scope,
    state: LoadState,
    session: Option<Session>,
    lists: Vec<ReadingList>,
    books: HashMap<String, Book>,
    notices: Vec<Notice>,
    _error: PhantomData<fn() -> E>,
}

impl<E, R, S> ReadingListsController<E, R, S>
where
    E: Error,
    R: CatalogRepo<E>,
    S: SessionSource<E>,
{
    pub fn new(repo: R, sessions: S) -> Self {
        ReadingListsController {
            repo,
            sessions,
            scope: Scope::new(),
            state: LoadState::Idle,
            session: None,
            lists: Vec::new(),
            books: HashMap::new(),
            notices: Vec::new(),
            _error: PhantomData,
        }
    }

    pub async fn load(&mut self) -> Result<(), ActionError<E>> {
        let session = match self.scope.guard(self.sessions.current_session()).await {
            None => return Err(ActionError::Cancelled),
            Some(Ok(Some(session))) => session,
            Some(Ok(None)) => return Err(ActionError::AuthRequired),
            Some(Err(e)) => {
                warn!("Session check failed, treating as signed out: {}", e);
                return Err(ActionError::AuthRequired);
            }
        };
        self.session = Some(session);
        self.state = LoadState::Loading;

        let repo = &self.repo;
        let both = async move { tokio::join!(repo.get_reading_lists(), repo.get_books()) };
        let (lists, books) = self.scope.guard(both).await.ok_or(ActionError::Cancelled)?;

        let lists = match lists {
            Ok(lists) => lists,
            Err(e) => {
                warn!("Failed to load reading lists: {}", e);
                self.notices.push(Notice::error("Failed to load reading lists"));
                self.state = LoadState::Failed;
                return Err(ActionError::Backend(e));
            }
        };
        info!("Retrieved {} reading lists", lists.len());
        self.lists = lists;

        // Titles are a nicety; the lists are still shown without them.
        match books {
            Ok(books) => {
                self.books = books.into_iter().map(|b| (b.id.clone(), b)).collect();
            }
            Err(e) => {
                warn!("Failed to load books for reading lists: {}", e);
                self.notices.push(Notice::error("Failed to load book titles"));
            }
        }

        self.state = LoadState::Loaded;
        Ok(())
    }

    pub fn entries(&self, list: &ReadingList) -> Vec<ListedBook> {
        list.book_ids
            .iter()
            .map(|id| match self.books.get(id) {
                Some(book) => ListedBook::Known(book.clone()),
                None => ListedBook::Unknown(id.clone()),
            })
            .collect()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn lists(&self) -> &[ReadingList] {
        &self.lists
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::fake::{numbered_books, FakeBackend, FakeError};

    type Controller = ReadingListsController<FakeError, FakeBackend, FakeBackend>;

    fn list(book_ids: &[&str]) -> ReadingList {
        ReadingList {
            id: "l1".to_string(),
            name: "Winter".to_string(),
            book_ids: book_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn signed_out_users_are_turned_away() {
        let backend = FakeBackend::with_books(numbered_books(1));
        let mut controller = Controller::new(backend.clone(), backend.clone());

        assert!(matches!(controller.load().await, Err(ActionError::AuthRequired)));
        assert_eq!(0, backend.calls("get_reading_lists"));
    }

    #[tokio::test]
    async fn entries_resolve_titles_and_keep_unknown_ids() {
        let backend = FakeBackend::with_books(numbered_books(2))
            .with_reading_list(list(&["b2", "gone", "b2"]))
            .signed_in("u1");
        let mut controller = Controller::new(backend.clone(), backend.clone());

        controller.load().await.unwrap();

        assert_eq!("u1", controller.session().unwrap().user_id);
        let entries = controller.entries(&controller.lists()[0]);
        assert_eq!(3, entries.len());
        assert!(matches!(&entries[0], ListedBook::Known(book) if book.title == "Title 02"));
        assert_eq!(ListedBook::Unknown("gone".to_string()), entries[1]);
    }

    #[tokio::test]
    async fn missing_titles_still_show_lists() {
        let backend = FakeBackend::with_books(numbered_books(2))
            .with_reading_list(list(&["b1"]))
            .signed_in("u1")
            .failing_on("get_books");
        let mut controller = Controller::new(backend.clone(), backend.clone());

        controller.load().await.unwrap();

        assert_eq!(LoadState::Loaded, controller.state());
        assert_eq!(
            vec![ListedBook::Unknown("b1".to_string())],
            controller.entries(&controller.lists()[0])
        );
        assert_eq!(1, controller.notices().len());
    }
}
