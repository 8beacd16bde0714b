use serde::{Deserialize, Serialize};

use crate::columns;
use crate::dataset::Dataset;

/// Which shape an output file takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// Flattened MUBI fields under human-readable headers
    Native,
    /// Restricted field set with Letterboxd import headers
    Letterboxd,
}

impl SchemaKind {
    pub fn file_suffix(&self) -> &'static str {
        match self {
            SchemaKind::Native => "",
            SchemaKind::Letterboxd => "_letterboxd",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub source: String,
    pub output: String,
}

impl ColumnMapping {
    pub fn new(source: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
        }
    }
}

/// Ordered source → output column pairs describing one output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSchema {
    kind: SchemaKind,
    mappings: Vec<ColumnMapping>,
}

impl ExportSchema {
    pub fn new(kind: SchemaKind, mappings: Vec<ColumnMapping>) -> Self {
        Self { kind, mappings }
    }

    /// Built-in schema for a data set.
    ///
    /// MUBI scores are 1-5, which is the scale of Letterboxd's `Rating`
    /// column (`Rating10` expects 1-10).
    pub fn for_dataset(dataset: Dataset, kind: SchemaKind) -> Self {
        let pairs: Vec<(&str, &str)> = match (kind, dataset) {
            (SchemaKind::Native, Dataset::Watchlist) => {
                let mut pairs = native_film_pairs();
                pairs.push((columns::ADDED_DATE, "added_date"));
                pairs
            }
            (SchemaKind::Native, Dataset::Ratings) => {
                let mut pairs = native_film_pairs();
                pairs.extend([
                    (columns::OVERALL, "user_rating"),
                    (columns::RATED_DATE, "rating_date"),
                    (columns::BODY, "review"),
                ]);
                pairs
            }
            (SchemaKind::Letterboxd, Dataset::Watchlist) => letterboxd_film_pairs(),
            (SchemaKind::Letterboxd, Dataset::Ratings) => {
                let mut pairs = letterboxd_film_pairs();
                pairs.extend([
                    (columns::OVERALL, "Rating"),
                    (columns::RATED_DATE, "WatchedDate"),
                    (columns::BODY, "Review"),
                ]);
                pairs
            }
        };

        Self::new(
            kind,
            pairs
                .into_iter()
                .map(|(source, output)| ColumnMapping::new(source, output))
                .collect(),
        )
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        &self.mappings
    }

    /// Header row, in schema order
    pub fn output_columns(&self) -> Vec<&str> {
        self.mappings.iter().map(|m| m.output.as_str()).collect()
    }
}

fn native_film_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        (columns::FILM_ID, "id"),
        (columns::TITLE, "title"),
        (columns::ORIGINAL_TITLE, "original_title"),
        (columns::YEAR, "year"),
        (columns::DURATION, "duration"),
        (columns::POPULARITY, "popularity"),
        (columns::GENRES, "genres"),
        (columns::AVERAGE_RATING, "average_rating"),
        (columns::AVERAGE_RATING_OUT_OF_TEN, "average_rating_out_of_ten"),
        (columns::NUMBER_OF_RATINGS, "number_of_ratings"),
        (columns::CRITIC_REVIEW_RATING, "critic_review_rating"),
        (columns::HISTORIC_COUNTRIES, "historic_countries"),
        (columns::DEFAULT_EDITORIAL, "default_editorial"),
        (columns::DIRECTORS, "directors"),
        (columns::WEB_URL, "web_url"),
        (columns::SLUG, "slug"),
        (columns::ENTRY_ID, "entry_id"),
    ]
}

fn letterboxd_film_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        (columns::TITLE, "Title"),
        (columns::YEAR, "Year"),
        (columns::DIRECTORS, "Directors"),
    ]
}
