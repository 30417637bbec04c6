use crate::error::AppResult;

pub mod movie;
pub mod recommendation;
pub mod similarity;

pub use movie::{Catalog, Movie};
pub use recommendation::{MovieMetadata, Rating, Recommendation};
pub use similarity::SimilarityMatrix;

/// The two loaded artifacts. Only constructible when they agree in size,
/// so a half-loaded state cannot exist.
#[derive(Debug, Clone)]
pub struct MovieData {
    pub catalog: Catalog,
    pub similarity: SimilarityMatrix,
}

impl MovieData {
    pub fn new(catalog: Catalog, similarity: SimilarityMatrix) -> AppResult<Self> {
        similarity.validate(catalog.len())?;
        Ok(Self {
            catalog,
            similarity,
        })
    }

    pub fn total_movies(&self) -> usize {
        self.catalog.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_data_requires_matching_sizes() {
        let catalog = Catalog::from(vec![Movie::new(1, "Avatar"), Movie::new(2, "Titanic")]);
        let similarity = SimilarityMatrix::new(vec![vec![1.0]]).unwrap();
        assert!(MovieData::new(catalog, similarity).is_err());
    }

    #[test]
    fn test_movie_data_accepts_square_match() {
        let catalog = Catalog::from(vec![Movie::new(1, "Avatar"), Movie::new(2, "Titanic")]);
        let similarity = SimilarityMatrix::new(vec![vec![1.0, 0.1], vec![0.1, 1.0]]).unwrap();
        let data = MovieData::new(catalog, similarity).unwrap();
        assert_eq!(data.total_movies(), 2);
    }
}
