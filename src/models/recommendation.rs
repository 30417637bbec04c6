use serde::{Serialize, Serializer};

/// Rating reported by the metadata service.
/// Serializes as a number, or the string `"N/A"` when unavailable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rating {
    Score(f64),
    NotAvailable,
}

impl Rating {
    /// Rounds to one decimal place.
    ///
    /// Formatting rounds the exact binary value half-to-even, so `7.35` (stored as
    /// `7.3499...`) becomes `7.3` rather than the `7.4` that scaling would give.
    pub fn from_vote_average(vote_average: f64) -> Self {
        if !vote_average.is_finite() {
            return Rating::NotAvailable;
        }

        format!("{:.1}", vote_average)
            .parse()
            .map(Rating::Score)
            .unwrap_or(Rating::NotAvailable)
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Score(value) => serializer.serialize_f64(*value),
            Rating::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

/// Poster and rating for one movie
#[derive(Debug, Clone, PartialEq)]
pub struct MovieMetadata {
    pub poster_url: String,
    pub rating: Rating,
}

impl MovieMetadata {
    pub fn placeholder(poster_url: impl Into<String>) -> Self {
        Self {
            poster_url: poster_url.into(),
            rating: Rating::NotAvailable,
        }
    }
}

/// One enriched recommendation, in the shape the UI consumes
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub poster: String,
    pub rating: Rating,
}

impl Recommendation {
    pub fn new(title: impl Into<String>, metadata: MovieMetadata) -> Self {
        Self {
            title: title.into(),
            poster: metadata.poster_url,
            rating: metadata.rating,
        }
    }
}
