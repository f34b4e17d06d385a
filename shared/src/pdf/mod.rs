//! A4 PDF report rendering.
//!
//! Split in three layers: [`layout`] paginates abstract draw commands,
//! [`report`] composes the analysis report out of those commands, and
//! [`writer`] serializes finished pages into PDF bytes. Pagination is
//! pure data and tested without touching the PDF encoder.

pub mod layout;
pub mod report;
pub mod writer;

pub use report::PdfReportData;
pub use writer::PdfError;
