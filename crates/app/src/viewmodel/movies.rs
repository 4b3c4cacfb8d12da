//! Movie catalogue view model

use std::sync::Arc;

use cinema_core::{CinemaBackend, Movie, MovieId, MovieRepository, Result};
use tracing::debug;

use crate::flow::FlowScope;

/// One row of the catalogue
#[derive(Debug, Clone, PartialEq)]
pub struct MovieItem {
    pub id: MovieId,
    pub title: String,
    pub director: String,
    pub actors: String,
    pub description: String,
    pub poster_src: String,
}

impl From<&Movie> for MovieItem {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.display_title().to_string(),
            director: movie.director.clone(),
            actors: movie.actors.join(", "),
            description: movie.description.clone(),
            poster_src: movie.poster_src(),
        }
    }
}

pub struct MoviesView {
    backend: Arc<dyn CinemaBackend>,
    scope: FlowScope,
}

impl MoviesView {
    pub fn new(backend: Arc<dyn CinemaBackend>) -> Self {
        Self {
            backend,
            scope: FlowScope::new(),
        }
    }

    pub fn scope(&self) -> &FlowScope {
        &self.scope
    }

    pub async fn load(&self) -> Result<Vec<MovieItem>> {
        let movies = self.scope.guard(self.backend.list_movies()).await?;
        debug!(count = movies.len(), "Movies loaded");
        Ok(movies.iter().map(MovieItem::from).collect())
    }
}

impl Drop for MoviesView {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}
