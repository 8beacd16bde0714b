use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mubi_export_models::columns::{self, flat_columns};
use mubi_export_models::{Dataset, FlatRecord};
use serde_json::Value;

const LIST_SEPARATOR: &str = ", ";

/// Flatten one watchlist or rating item.
///
/// Every column of [`flat_columns`] is present; anything missing, null or
/// unparseable becomes an empty string.
pub fn flatten(dataset: Dataset, item: &Value) -> FlatRecord {
    // Items wrap the film; bare film objects are accepted as-is
    let film = item.get("film").filter(|f| f.is_object()).unwrap_or(item);

    let mut record = FlatRecord::with_capacity(flat_columns(dataset).len());
    record.insert(columns::FILM_ID, text(film.get("id")));
    record.insert(columns::TITLE, text(film.get("title")));
    record.insert(columns::ORIGINAL_TITLE, text(film.get("original_title")));
    record.insert(columns::YEAR, text(film.get("year")));
    record.insert(columns::DURATION, text(film.get("duration")));
    record.insert(columns::POPULARITY, text(film.get("popularity")));
    record.insert(columns::GENRES, text(film.get("genres")));
    record.insert(columns::AVERAGE_RATING, text(film.get("average_rating")));
    record.insert(
        columns::AVERAGE_RATING_OUT_OF_TEN,
        text(film.get("average_rating_out_of_ten")),
    );
    record.insert(columns::NUMBER_OF_RATINGS, text(film.get("number_of_ratings")));
    record.insert(columns::CRITIC_REVIEW_RATING, text(film.get("critic_review_rating")));
    record.insert(columns::HISTORIC_COUNTRIES, text(film.get("historic_countries")));
    record.insert(columns::DEFAULT_EDITORIAL, text(film.get("default_editorial")));
    record.insert(columns::DIRECTORS, directors(film.get("directors")));
    record.insert(columns::WEB_URL, text(film.get("web_url")));
    record.insert(columns::SLUG, text(film.get("slug")));
    record.insert(columns::ENTRY_ID, text(item.get("id")));

    match dataset {
        Dataset::Watchlist => {
            record.insert(columns::ADDED_DATE, date_only(item.get("created_at")));
        }
        Dataset::Ratings => {
            let score = first_present(item, &["overall", "rating", "score"]);
            let rated_at = first_present(item, &["created_at", "rated_at"]);
            record.insert(columns::OVERALL, text(score));
            record.insert(columns::RATED_DATE, date_only(rated_at));
            record.insert(columns::BODY, text(item.get("body")));
        }
    }

    record
}

/// Director names joined with `", "`, in the order given
pub fn directors(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| text(Some(entry)))
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        Some(Value::Object(_)) | Some(Value::String(_)) => text(value),
        _ => String::new(),
    }
}

fn first_present<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find(|value| !value.is_null())
}

/// Render a JSON value as a single CSV cell
fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| text(Some(item)))
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        Some(Value::Object(map)) => text(map.get("name")),
    }
}

/// Reduce a timestamp to `YYYY-MM-DD`
fn date_only(value: Option<&Value>) -> String {
    let date = match value {
        Some(Value::String(s)) => parse_date(s.trim()),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive()),
        _ => None,
    };
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|dt| dt.date())
                .ok()
        })
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}
