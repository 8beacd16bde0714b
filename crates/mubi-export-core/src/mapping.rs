use mubi_export_models::{ExportSchema, FlatRecord};

use crate::error::SchemaError;

/// Select and rename `record`'s columns according to `schema`.
///
/// The result holds exactly the schema's output columns, in schema order.
pub fn map_record(record: &FlatRecord, schema: &ExportSchema) -> Result<FlatRecord, SchemaError> {
    let mut mapped = FlatRecord::with_capacity(schema.mappings().len());
    for mapping in schema.mappings() {
        let value = record
            .get(&mapping.source)
            .ok_or_else(|| SchemaError::MissingColumn {
                column: mapping.source.clone(),
            })?;
        mapped.insert(mapping.output.clone(), value);
    }
    Ok(mapped)
}

pub fn map_records(records: &[FlatRecord], schema: &ExportSchema) -> Result<Vec<FlatRecord>, SchemaError> {
    records.iter().map(|r| map_record(r, schema)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use mubi_export_models::{ColumnMapping, Dataset, SchemaKind};
    use serde_json::json;

    #[test]
    fn test_output_order_follows_schema() {
        // Input order deliberately differs from schema order
        let record: FlatRecord = [("year", "1979"), ("directors", "Andrei Tarkovsky"), ("title", "Stalker")]
            .into_iter()
            .collect();
        let schema = ExportSchema::new(
            SchemaKind::Letterboxd,
            vec![
                ColumnMapping::new("title", "Title"),
                ColumnMapping::new("year", "Year"),
                ColumnMapping::new("directors", "Directors"),
            ],
        );

        let mapped = map_record(&record, &schema).unwrap();
        let columns: Vec<&str> = mapped.columns().collect();
        let values: Vec<&str> = mapped.values().collect();
        assert_eq!(columns, vec!["Title", "Year", "Directors"]);
        assert_eq!(values, vec!["Stalker", "1979", "Andrei Tarkovsky"]);
    }

    #[test]
    fn test_missing_source_column() {
        let record: FlatRecord = [("title", "Stalker")].into_iter().collect();
        let schema = ExportSchema::new(SchemaKind::Native, vec![ColumnMapping::new("year", "year")]);
        assert_eq!(
            map_record(&record, &schema),
            Err(SchemaError::MissingColumn {
                column: "year".to_string()
            })
        );
    }

    #[test]
    fn test_letterboxd_rating_mapping() {
        let item = json!({
            "overall": 5,
            "created_at": "2024-03-09T10:00:00Z",
            "body": "",
            "film": {"title": "Close-Up", "year": 1990, "directors": [{"name": "Abbas Kiarostami"}]}
        });
        let record = flatten(Dataset::Ratings, &item);
        let schema = ExportSchema::for_dataset(Dataset::Ratings, SchemaKind::Letterboxd);

        let mapped = map_record(&record, &schema).unwrap();
        assert_eq!(mapped.get("Title"), Some("Close-Up"));
        assert_eq!(mapped.get("Year"), Some("1990"));
        assert_eq!(mapped.get("Directors"), Some("Abbas Kiarostami"));
        assert_eq!(mapped.get("Rating"), Some("5"));
        assert_eq!(mapped.get("WatchedDate"), Some("2024-03-09"));
        assert_eq!(mapped.get("Review"), Some(""));
    }

    #[test]
    fn test_builtin_schemas_accept_sparse_items() {
        for dataset in Dataset::ALL {
            let record = flatten(dataset, &json!({}));
            for kind in [SchemaKind::Native, SchemaKind::Letterboxd] {
                let schema = ExportSchema::for_dataset(dataset, kind);
                let mapped = map_records(&[record.clone()], &schema).unwrap();
                assert_eq!(mapped[0].len(), schema.mappings().len());
            }
        }
    }
}
