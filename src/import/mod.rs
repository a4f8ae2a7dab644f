pub mod parser;

pub use parser::{BulkImport, ImportSummary, StreetRecord, import_into, parse_bulk_import};
