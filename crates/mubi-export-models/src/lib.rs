pub mod columns;
pub mod dataset;
pub mod record;
pub mod schema;

pub use dataset::Dataset;
pub use record::FlatRecord;
pub use schema::{ColumnMapping, ExportSchema, SchemaKind};
