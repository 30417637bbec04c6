use serde::{Deserialize, Serialize};

/// A single catalog row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Stable identifier used for metadata lookups
    pub movie_id: i64,
    /// Display title
    pub title: String,
}

impl Movie {
    pub fn new(movie_id: i64, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: title.into(),
        }
    }
}

/// Ordered movie catalog. A movie's position is its row in the similarity matrix.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "Vec<Movie>")]
pub struct Catalog {
    movies: Vec<Movie>,
    /// Lowercased titles, index-aligned with `movies`
    normalized: Vec<String>,
}

impl From<Vec<Movie>> for Catalog {
    fn from(movies: Vec<Movie>) -> Self {
        let normalized = movies.iter().map(|m| m.title.to_lowercase()).collect();
        Self { movies, normalized }
    }
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Movie> {
        self.movies.get(index)
    }

    /// Indices of every row whose title contains `query`, case-insensitively, in catalog order
    pub fn matching_indices<'a>(&'a self, query: &str) -> impl Iterator<Item = usize> + 'a {
        let needle = query.to_lowercase();
        self.normalized
            .iter()
            .enumerate()
            .filter(move |(_, title)| title.contains(&needle))
            .map(|(index, _)| index)
    }

    /// First row in catalog order whose title contains `query`.
    ///
    /// This is deliberately the first occurrence, not the closest match: a query of
    /// "alien" resolves to whichever "Alien..." title comes first in the artifact.
    pub fn first_match(&self, query: &str) -> Option<usize> {
        self.matching_indices(query).next()
    }

    /// Up to `limit` titles containing `query`, case-insensitively
    pub fn search_titles(&self, query: &str, limit: usize) -> Vec<&str> {
        self.matching_indices(query)
            .take(limit)
            .map(|index| self.movies[index].title.as_str())
            .collect()
    }

    /// The first `limit` titles in catalog order
    pub fn titles(&self, limit: usize) -> Vec<&str> {
        self.movies
            .iter()
            .take(limit)
            .map(|m| m.title.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from(vec![
            Movie::new(19995, "Avatar"),
            Movie::new(597, "Titanic"),
            Movie::new(348, "Alien"),
            Movie::new(679, "Aliens"),
        ])
    }

    #[test]
    fn test_first_match_is_case_insensitive() {
        let catalog = catalog();
        assert_eq!(catalog.first_match("AVATAR"), Some(0));
        assert_eq!(catalog.first_match("tan"), Some(1));
    }

    #[test]
    fn test_first_match_takes_first_occurrence() {
        // "Aliens" is a closer match for "aliens" but "alien" hits row 2 first
        assert_eq!(catalog().first_match("alien"), Some(2));
        assert_eq!(catalog().first_match("aliens"), Some(3));
    }

    #[test]
    fn test_first_match_none() {
        assert_eq!(catalog().first_match("zardoz"), None);
    }

    #[test]
    fn test_search_titles_respects_limit() {
        let catalog = catalog();
        assert_eq!(catalog.search_titles("a", 2), vec!["Avatar", "Titanic"]);
        assert_eq!(catalog.search_titles("ALI", 20), vec!["Alien", "Aliens"]);
    }

    #[test]
    fn test_titles_in_catalog_order() {
        assert_eq!(catalog().titles(3), vec!["Avatar", "Titanic", "Alien"]);
        assert_eq!(catalog().titles(50).len(), 4);
    }

    #[test]
    fn test_deserialize_ignores_extra_fields() {
        let catalog: Catalog = serde_json::from_str(
            r#"[{"movie_id": 1, "title": "Avatar", "tags": "blue"}, {"movie_id": 2, "title": "Titanic"}]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).unwrap().movie_id, 2);
        assert_eq!(catalog.first_match("avatar"), Some(0));
    }
}
