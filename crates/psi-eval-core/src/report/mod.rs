// crates/psi-eval-core/src/report/mod.rs
// ============================================================================
// Module: PSI Eval Reports
// Description: Table specification, builders, and document rendering.
// Purpose: Present stored results as the evaluation report and text summaries.
// Dependencies: crate::core, crate::runtime, thiserror, tracing
// ============================================================================

//! ## Overview
//! Reporting is split in three layers: [`ReportTableBuilder`] maps results
//! onto declarative [`TableBlock`]s, [`latex`] renders any block as markup,
//! and [`ReportRenderer`] wraps the markup into a document and typesets it.
//! Numbers are rounded to two decimals here and nowhere else.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod builder;
pub mod document;
pub mod latex;
pub mod summary;
pub mod table;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builder::BREAKDOWN_LOG2_X_SIZES;
pub use builder::ReportTableBuilder;
pub use document::LatexDocument;
pub use document::ProcessTypesetter;
pub use document::ReportOutput;
pub use document::ReportRenderer;
pub use latex::format_value;
pub use latex::render_block;
pub use summary::render_summary;
pub use table::Align;
pub use table::Cell;
pub use table::CellContent;
pub use table::ColumnSpec;
pub use table::Row;
pub use table::Rule;
pub use table::TableBlock;
pub use table::TableError;
pub use table::Tabular;
