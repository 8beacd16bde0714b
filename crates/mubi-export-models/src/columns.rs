use crate::dataset::Dataset;

pub const FILM_ID: &str = "film_id";
pub const TITLE: &str = "title";
pub const ORIGINAL_TITLE: &str = "original_title";
pub const YEAR: &str = "year";
pub const DURATION: &str = "duration";
pub const POPULARITY: &str = "popularity";
pub const GENRES: &str = "genres";
pub const AVERAGE_RATING: &str = "average_rating";
pub const AVERAGE_RATING_OUT_OF_TEN: &str = "average_rating_out_of_ten";
pub const NUMBER_OF_RATINGS: &str = "number_of_ratings";
pub const CRITIC_REVIEW_RATING: &str = "critic_review_rating";
pub const HISTORIC_COUNTRIES: &str = "historic_countries";
pub const DEFAULT_EDITORIAL: &str = "default_editorial";
pub const DIRECTORS: &str = "directors";
pub const WEB_URL: &str = "web_url";
pub const SLUG: &str = "slug";
pub const ENTRY_ID: &str = "entry_id";

// Watchlist only
pub const ADDED_DATE: &str = "added_date";

// Ratings only
pub const OVERALL: &str = "overall";
pub const RATED_DATE: &str = "rated_date";
pub const BODY: &str = "body";

/// Film columns shared by both data sets
pub const FILM_COLUMNS: [&str; 17] = [
    FILM_ID,
    TITLE,
    ORIGINAL_TITLE,
    YEAR,
    DURATION,
    POPULARITY,
    GENRES,
    AVERAGE_RATING,
    AVERAGE_RATING_OUT_OF_TEN,
    NUMBER_OF_RATINGS,
    CRITIC_REVIEW_RATING,
    HISTORIC_COUNTRIES,
    DEFAULT_EDITORIAL,
    DIRECTORS,
    WEB_URL,
    SLUG,
    ENTRY_ID,
];

/// Full ordered column set of a flattened record for `dataset`. Every
/// record carries all of them, so CSV headers stay stable across rows.
pub fn flat_columns(dataset: Dataset) -> Vec<&'static str> {
    let mut columns = FILM_COLUMNS.to_vec();
    match dataset {
        Dataset::Watchlist => columns.push(ADDED_DATE),
        Dataset::Ratings => columns.extend([OVERALL, RATED_DATE, BODY]),
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_columns_watchlist() {
        let columns = flat_columns(Dataset::Watchlist);
        assert_eq!(columns.first(), Some(&FILM_ID));
        assert_eq!(columns.last(), Some(&ADDED_DATE));
        assert!(!columns.contains(&OVERALL));
    }

    #[test]
    fn test_flat_columns_ratings() {
        let columns = flat_columns(Dataset::Ratings);
        assert_eq!(&columns[columns.len() - 3..], &[OVERALL, RATED_DATE, BODY]);
        assert!(!columns.contains(&ADDED_DATE));
    }

    #[test]
    fn test_flat_columns_are_unique() {
        for dataset in Dataset::ALL {
            let columns = flat_columns(dataset);
            let unique: std::collections::HashSet<_> = columns.iter().collect();
            assert_eq!(unique.len(), columns.len());
        }
    }
}
