//! Reports Module
//!
//! Per-user screening reports: an image, a generated PDF and the diagnosis
//! metadata (label, confidence, risk level, advice).
//!
//! # Module Structure
//!
//! ```text
//! reports/
//! ├── mod.rs      - Module exports and documentation
//! ├── blob.rs     - Content-addressed blob storage (filesystem, memory)
//! ├── db.rs       - Report metadata store (PostgreSQL, memory)
//! ├── service.rs  - ReportService with ownership checks
//! └── handlers.rs - HTTP handlers for /api/reports
//! ```

pub mod blob;
pub mod db;
pub mod handlers;
pub mod service;

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use db::{MemoryReportStore, PgReportStore, Report, ReportStore, ReportSummary};
pub use service::{NewReport, ReportError, ReportService};
