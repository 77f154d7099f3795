//! payrollctl-etl: getting the city's payroll files into Postgres
//!
//! - `download` fetches a year from the open data portal
//! - `decode`, `columns` and `parse` turn CSV/XLSX into clean records
//! - `load` upserts them in batches
//! - `archive`, `validate` and `migrate` are the maintenance jobs

pub mod archive;
pub mod columns;
pub mod decode;
pub mod download;
pub mod load;
pub mod migrate;
pub mod parse;
pub mod validate;

pub use archive::{archive_all, archive_year, ArchiveOutcome};
pub use download::{download_year, http_client, Download, SourceFormat};
pub use load::{load_all, load_file, load_year, upsert_records, LoadSummary};
pub use migrate::{migrate, MigrationSummary};
pub use parse::{parse_file, ParseReport};
pub use validate::{all_passed, run_all as run_validations, CheckOutcome};
