use mubi_export_config::Config;
use mubi_export_core::{ExportOptions, Exporter};
use mubi_export_sources::{ClientOptions, MubiClient};
use serde_json::{json, Value};
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn film(id: u64, title: &str, year: u32, directors: &[&str]) -> Value {
    json!({
        "id": id,
        "title": title,
        "original_title": title,
        "year": year,
        "genres": ["Drama"],
        "directors": directors.iter().map(|d| json!({"name": d})).collect::<Vec<_>>()
    })
}

fn page_body(key: &str, items: Vec<Value>, has_more: bool) -> Value {
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), Value::Array(items));
    body.insert("has_more".to_string(), Value::Bool(has_more));
    Value::Object(body)
}

async fn mount_page(server: &MockServer, endpoint: &str, page: u32, key: &str, items: Vec<Value>, has_more: bool) {
    Mock::given(method("GET"))
        .and(path(format!("/users/1001/{}", endpoint)))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(key, items, has_more)))
        .mount(server)
        .await;
}

async fn fixture_server() -> MockServer {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "wishes",
        1,
        "wishes",
        vec![
            json!({"id": 1, "created_at": "2024-01-01T00:00:00Z", "film": film(11, "Taste of Cherry", 1997, &["Abbas Kiarostami"])}),
            json!({"id": 2, "created_at": "2024-01-02T00:00:00Z", "film": film(12, "Paris, Texas", 1984, &["Wim Wenders"])}),
        ],
        true,
    )
    .await;
    mount_page(
        &server,
        "wishes",
        2,
        "wishes",
        vec![json!({"id": 3, "film": film(13, "No Country for Old Men", 2007, &["Joel Coen", "Ethan Coen"])})],
        false,
    )
    .await;

    mount_page(
        &server,
        "ratings",
        1,
        "ratings",
        vec![
            json!({"id": 21, "overall": 5, "body": "Perfect.", "created_at": "2023-03-04T20:00:00Z", "film": film(31, "Cléo from 5 to 7", 1962, &["Agnès Varda"])}),
            json!({"id": 22, "overall": 3, "body": null, "created_at": "2023-03-05T20:00:00Z", "film": film(32, "Playtime", 1967, &["Jacques Tati"])}),
        ],
        true,
    )
    .await;
    mount_page(
        &server,
        "ratings",
        2,
        "ratings",
        vec![json!({"id": 23, "overall": 4, "body": "Long, \"hypnotic\"", "created_at": "2023-03-06T20:00:00Z", "film": film(33, "Sátántangó", 1994, &[])})],
        false,
    )
    .await;

    server
}

fn client_for(server: &MockServer) -> MubiClient {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.page_delay_ms = 0;
    MubiClient::new(ClientOptions::from_config(&config, "1001", None, false)).unwrap()
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (headers, rows)
}

fn csv_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn exports_four_files_with_letterboxd() {
    let server = fixture_server().await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&server);

    let options = ExportOptions::new("1001")
        .with_output_dir(dir.path())
        .with_letterboxd(true);
    let report = Exporter::new(&client, options).run().await;

    assert!(report.is_success());
    assert_eq!(
        csv_files(dir.path()),
        vec![
            "mubi_1001_ratings.csv",
            "mubi_1001_ratings_letterboxd.csv",
            "mubi_1001_watchlist.csv",
            "mubi_1001_watchlist_letterboxd.csv",
        ]
    );

    for name in csv_files(dir.path()) {
        let (_, rows) = read_csv(&dir.path().join(&name));
        assert_eq!(rows.len(), 3, "{}", name);
    }

    let (headers, rows) = read_csv(&dir.path().join("mubi_1001_watchlist_letterboxd.csv"));
    assert_eq!(headers, vec!["Title", "Year", "Directors"]);
    assert_eq!(rows[0], vec!["Taste of Cherry", "1997", "Abbas Kiarostami"]);
    assert_eq!(rows[1], vec!["Paris, Texas", "1984", "Wim Wenders"]);
    assert_eq!(rows[2], vec!["No Country for Old Men", "2007", "Joel Coen, Ethan Coen"]);

    let (headers, rows) = read_csv(&dir.path().join("mubi_1001_ratings_letterboxd.csv"));
    assert_eq!(headers, vec!["Title", "Year", "Directors", "Rating", "WatchedDate", "Review"]);
    assert_eq!(rows[0], vec!["Cléo from 5 to 7", "1962", "Agnès Varda", "5", "2023-03-04", "Perfect."]);
    assert_eq!(rows[1][5], "");
    assert_eq!(rows[2], vec!["Sátántangó", "1994", "", "4", "2023-03-06", "Long, \"hypnotic\""]);

    let (headers, rows) = read_csv(&dir.path().join("mubi_1001_ratings.csv"));
    assert_eq!(headers.first().map(String::as_str), Some("id"));
    assert_eq!(
        &headers[headers.len() - 3..],
        &["user_rating", "rating_date", "review"]
    );
    assert_eq!(rows[0][0], "31");
}

#[tokio::test]
async fn exports_two_files_without_letterboxd() {
    let server = fixture_server().await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&server);

    let report = Exporter::new(&client, ExportOptions::new("1001").with_output_dir(dir.path()))
        .run()
        .await;

    assert!(report.is_success());
    assert_eq!(
        csv_files(dir.path()),
        vec!["mubi_1001_ratings.csv", "mubi_1001_watchlist.csv"]
    );
    let (headers, rows) = read_csv(&dir.path().join("mubi_1001_watchlist.csv"));
    assert_eq!(rows.len(), 3);
    assert_eq!(&headers[headers.len() - 4..], &["web_url", "slug", "entry_id", "added_date"]);
    assert_eq!(&rows[0][rows[0].len() - 2..], &["1", "2024-01-01"]);
    assert_eq!(rows[2].last().map(String::as_str), Some(""));
}

#[tokio::test]
async fn ratings_failure_keeps_watchlist() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "wishes",
        1,
        "wishes",
        vec![json!({"id": 1, "film": film(11, "Ordet", 1955, &["Carl Theodor Dreyer"])})],
        false,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/users/1001/ratings"))
        .respond_with(ResponseTemplate::new(401).set_body_string("login required"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.page_delay_ms = 0;
    config.api.ratings_fallback_endpoints = Vec::new();
    let client = MubiClient::new(ClientOptions::from_config(&config, "1001", None, false)).unwrap();

    let report = Exporter::new(&client, ExportOptions::new("1001").with_output_dir(dir.path()))
        .run()
        .await;

    assert!(!report.is_success());
    assert_eq!(csv_files(dir.path()), vec!["mubi_1001_watchlist.csv"]);
    let (dataset, error) = report.failures().next().unwrap();
    assert_eq!(dataset.name(), "ratings");
    assert!(error.to_string().contains("401"));
}
