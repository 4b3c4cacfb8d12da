//! Movie model

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Shown when a movie has no poster
pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/150";

/// Backend identifier of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MovieId(pub i64);

impl std::fmt::Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A movie in the catalogue
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub director: String,
    pub actors: Vec<String>,
    pub description: String,
    /// Raw JPEG bytes
    pub poster: Option<Vec<u8>>,
}

impl Movie {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            director: String::new(),
            actors: Vec::new(),
            description: String::new(),
            poster: None,
        }
    }

    /// Image source for the poster: an inline data URL, or the placeholder
    pub fn poster_src(&self) -> String {
        match &self.poster {
            Some(bytes) if !bytes.is_empty() => {
                format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
            }
            _ => PLACEHOLDER_POSTER.to_string(),
        }
    }

    /// Title for display, falling back when the backend sent none
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Unknown Movie"
        } else {
            &self.title
        }
    }
}
