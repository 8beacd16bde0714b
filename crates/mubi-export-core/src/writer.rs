use csv::{Terminator, WriterBuilder};
use mubi_export_models::FlatRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::WriteError;

/// Write `records` under a header row of `columns`, replacing `path`.
///
/// Rows keep input order. The file is written next to the destination and
/// renamed into place once complete. Returns the number of data rows.
pub fn write_csv<P, S>(path: P, columns: &[S], records: &[FlatRecord]) -> Result<usize, WriteError>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let tmp_path = temp_path(path);

    let result = write_rows(&tmp_path, columns, records)
        .and_then(|rows| {
            fs::rename(&tmp_path, path).map_err(|source| WriteError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(rows)
        });

    match &result {
        Ok(rows) => info!("Wrote {} rows to {}", rows, path.display()),
        Err(_) => {
            if let Err(e) = fs::remove_file(&tmp_path) {
                debug!("Could not remove {}: {}", tmp_path.display(), e);
            }
        }
    }

    result
}

fn write_rows<S: AsRef<str>>(path: &Path, columns: &[S], records: &[FlatRecord]) -> Result<usize, WriteError> {
    let csv_error = |source| WriteError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(csv_error)?;

    writer
        .write_record(columns.iter().map(|c| c.as_ref()))
        .map_err(csv_error)?;

    for record in records {
        let row = columns
            .iter()
            .map(|column| record.get(column.as_ref()).unwrap_or(""));
        writer.write_record(row).map_err(csv_error)?;
    }

    writer.flush().map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(records.len())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::ReaderBuilder;
    use tempfile::tempdir;

    fn read_back(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = ReaderBuilder::new().from_path(path).unwrap();
        let headers = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        (headers, rows)
    }

    #[test]
    fn test_round_trip_with_special_characters() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let records = vec![
            [("Title", "Crouching Tiger, Hidden Dragon"), ("Review", "He said \"wow\"")]
                .into_iter()
                .collect::<FlatRecord>(),
            [("Title", "Amélie"), ("Review", "line one\nline two")]
                .into_iter()
                .collect::<FlatRecord>(),
        ];

        let rows = write_csv(&path, &["Title", "Review"], &records).unwrap();
        assert_eq!(rows, 2);

        let (headers, rows) = read_back(&path);
        assert_eq!(headers, vec!["Title", "Review"]);
        assert_eq!(
            rows,
            vec![
                vec!["Crouching Tiger, Hidden Dragon", "He said \"wow\""],
                vec!["Amélie", "line one\nline two"],
            ]
        );
    }

    #[test]
    fn test_column_order_comes_from_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let record: FlatRecord = [("b", "2"), ("a", "1")].into_iter().collect();

        write_csv(&path, &["a", "b"], &[record]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a,b\n1,2\n");
    }

    #[test]
    fn test_header_only_when_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let rows = write_csv(&path, &["Title", "Year"], &[]).unwrap();
        assert_eq!(rows, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Title,Year\n");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale,content\n1,2\n3,4\n").unwrap();

        let record: FlatRecord = [("Title", "Ran")].into_iter().collect();
        write_csv(&path, &["Title"], &[record]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Title\nRan\n");
        assert!(!dir.path().join("out.csv.tmp").exists());
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let error = write_csv(&path, &["Title"], &[]).unwrap_err();
        assert!(error.to_string().contains("out.csv"));
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("/x/mubi_1_ratings.csv")),
            PathBuf::from("/x/mubi_1_ratings.csv.tmp")
        );
    }
}
