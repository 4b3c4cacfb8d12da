//! Screening list view model

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use cinema_core::{
    CinemaBackend, Movie, MovieId, MovieRepository, Result, Screening, ScreeningId,
    ScreeningRepository,
};
use tracing::{debug, warn};

use crate::flow::FlowScope;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningItem {
    pub screening_id: ScreeningId,
    pub movie_title: String,
    pub poster_src: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub free_seats: usize,
    pub total_seats: usize,
}

impl ScreeningItem {
    fn new(screening: &Screening, movie: &Movie) -> Self {
        Self {
            screening_id: screening.id,
            movie_title: movie.display_title().to_string(),
            poster_src: movie.poster_src(),
            start_time: screening.start_time,
            end_time: screening.end_time,
            free_seats: screening.free_seat_count(),
            total_seats: screening.seat_count(),
        }
    }
}

pub struct ScreeningsView {
    backend: Arc<dyn CinemaBackend>,
    scope: FlowScope,
}

impl ScreeningsView {
    pub fn new(backend: Arc<dyn CinemaBackend>) -> Self {
        Self {
            backend,
            scope: FlowScope::new(),
        }
    }

    pub fn scope(&self) -> &FlowScope {
        &self.scope
    }

    /// Screenings joined with their movies, in backend order.
    ///
    /// A screening whose movie is unknown is left out.
    pub async fn load(&self) -> Result<Vec<ScreeningItem>> {
        let (screenings, movies) = self
            .scope
            .guard(async {
                tokio::try_join!(self.backend.list_screenings(), self.backend.list_movies())
            })
            .await?;

        let movies: HashMap<MovieId, Movie> = movies.into_iter().map(|m| (m.id, m)).collect();
        let items: Vec<ScreeningItem> = screenings
            .iter()
            .filter_map(|screening| match movies.get(&screening.movie_id) {
                Some(movie) => Some(ScreeningItem::new(screening, movie)),
                None => {
                    warn!(
                        screening_id = %screening.id,
                        movie_id = %screening.movie_id,
                        "Movie not found for screening"
                    );
                    None
                }
            })
            .collect();

        debug!(count = items.len(), "Screenings loaded");
        Ok(items)
    }
}

impl Drop for ScreeningsView {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryBackend;

    #[tokio::test]
    async fn test_join_with_movies() {
        let backend = InMemoryBackend::new().shared();
        backend.add_movie(1, "Stalker");
        backend.add_screening(10, 1, &[true, false, true]);
        backend.add_screening(11, 99, &[true]);

        let items = ScreeningsView::new(backend).load().await.unwrap();
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item.screening_id, ScreeningId(10));
        assert_eq!(item.movie_title, "Stalker");
        assert_eq!(item.free_seats, 2);
        assert_eq!(item.total_seats, 3);
    }

    #[tokio::test]
    async fn test_cancelled_view_loads_nothing() {
        let backend = InMemoryBackend::new().shared();
        backend.add_movie(1, "Stalker");
        backend.add_screening(10, 1, &[true]);

        let view = ScreeningsView::new(backend);
        view.scope().cancel();
        assert!(matches!(
            view.load().await,
            Err(cinema_core::Error::Cancelled)
        ));
    }
}
