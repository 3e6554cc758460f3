use std::error::Error;
use std::marker::PhantomData;

use tracing::{info, warn};

use super::{LoadState, Notice, Scope, Teardown};
use crate::models::{Book, SortKey};
use crate::repo::CatalogRepo;
use crate::view::{derive_view, DerivedView};

pub struct CatalogController<E, R> {
    repo: R,
    scope: Scope,
    state: LoadState,
    books: Vec<Book>,
    query: String,
    sort: SortKey,
    page: usize,
    notices: Vec<Notice>,
    _error: PhantomData<fn() -> E>,
}

impl<E, R> CatalogController<E, R>
where
    E: Error,
    R: CatalogRepo<E>,
{
    pub fn new(repo: R) -> Self {
        CatalogController {
            repo,
            scope: Scope::new(),
            state: LoadState::Idle,
            books: Vec::new(),
            query: String::new(),
            sort: SortKey::default(),
            page: 1,
            notices: Vec::new(),
            _error: PhantomData,
        }
    }

    /// Fetches the raw collection. Only the first call per controller hits
    /// the backend.
    pub async fn mount(&mut self) {
        if self.state != LoadState::Idle {
            return;
        }
        self.state = LoadState::Loading;

        let Some(result) = self.scope.guard(self.repo.get_books()).await else {
            return;
        };

        match result {
            Ok(books) => {
                info!("Retrieved {} books from the backend", books.len());
                self.books = books;
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                warn!("Failed to load books: {}", e);
                self.notices.push(Notice::error("Failed to load books"));
                self.state = LoadState::Failed;
            }
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.query {
            self.query = query;
            self.page = 1;
        }
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        if sort != self.sort {
            self.sort = sort;
            self.page = 1;
        }
    }

    /// Moves to `page`, clamped to the pages the current view has.
    pub fn go_to_page(&mut self, page: i64) {
        let last = self.view().total_pages;
        self.page = page.clamp(1, last as i64) as usize;
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page as i64 + 1);
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.page as i64 - 1);
    }

    pub fn view(&self) -> DerivedView<'_> {
        derive_view(&self.books, &self.query, &self.sort, self.page)
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> &SortKey {
        &self.sort
    }

    pub fn page(&self) -> usize {
        self.page
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
