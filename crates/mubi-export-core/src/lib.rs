pub mod error;
pub mod export;
pub mod flatten;
pub mod mapping;
pub mod writer;

pub use error::{ExportError, SchemaError, WriteError};
pub use export::{DatasetOutcome, ExportOptions, ExportProgress, ExportReport, Exporter, WrittenFile};
pub use flatten::flatten;
pub use mapping::map_record;
pub use writer::write_csv;
