// crates/psi-eval-core/src/report/table.rs
// ============================================================================
// Module: Table Specification
// Description: Declarative description of report tables.
// Purpose: Separate table structure (rows, columns, merges) from markup.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! A [`TableBlock`] is one floating table: caption, label, and one or more
//! stacked [`Tabular`]s. A tabular is a column layout plus an ordered list of
//! [`Row`]s, where each row is either a list of [`Cell`]s or a horizontal
//! [`Rule`]. Merges are expressed as cell spans. Nothing here knows about a
//! particular markup language; [`crate::report::latex`] renders it.
//!
//! Invariants:
//! - In every cell row the column spans add up to the column count.
//! - Partial rules only name existing, 1-based columns.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CellKey;

// ============================================================================
// SECTION: Columns
// ============================================================================

/// Horizontal alignment of a column or merged cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Align {
    /// Left aligned.
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
    /// Centered in a fixed-width column, width in centimetres.
    FixedCenter(f64),
}

/// Layout of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Alignment.
    pub align: Align,
    /// Whether a vertical rule follows the column.
    pub rule_after: bool,
}

impl ColumnSpec {
    /// Creates a column spec.
    #[must_use]
    pub const fn new(align: Align, rule_after: bool) -> Self {
        Self {
            align,
            rule_after,
        }
    }
}

// ============================================================================
// SECTION: Cells
// ============================================================================

/// Content of one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Nothing; used for positions covered by a merge.
    Empty,
    /// Literal markup.
    Text(String),
    /// A number, rendered with two decimals.
    Value(f64),
    /// Text wrapped to a fixed width, in centimetres.
    Wrapped {
        /// Literal markup.
        text: String,
        /// Box width in centimetres.
        width_cm: f64,
    },
}

/// One cell, possibly merged across rows or columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Content.
    pub content: CellContent,
    /// Columns covered, at least 1.
    pub col_span: usize,
    /// Rows covered, at least 1. Covered rows carry [`CellContent::Empty`].
    pub row_span: usize,
    /// Layout override for this cell only.
    pub layout: Option<ColumnSpec>,
}

impl Cell {
    /// An empty placeholder cell.
    #[must_use]
    pub const fn empty() -> Self {
        Self::of(CellContent::Empty)
    }

    /// A literal text cell.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::of(CellContent::Text(text.into()))
    }

    /// A numeric cell.
    #[must_use]
    pub const fn value(value: f64) -> Self {
        Self::of(CellContent::Value(value))
    }

    /// A fixed-width wrapped text cell.
    #[must_use]
    pub fn wrapped(text: impl Into<String>, width_cm: f64) -> Self {
        Self::of(CellContent::Wrapped {
            text: text.into(),
            width_cm,
        })
    }

    /// A cell with default spans and layout.
    #[must_use]
    pub const fn of(content: CellContent) -> Self {
        Self {
            content,
            col_span: 1,
            row_span: 1,
            layout: None,
        }
    }

    /// An empty cell that suppresses the column's own rules.
    #[must_use]
    pub fn blank() -> Self {
        Self::empty().with_layout(ColumnSpec::new(Align::Center, false))
    }

    /// Merges the cell down across `rows` rows.
    #[must_use]
    pub fn rows(mut self, rows: usize) -> Self {
        self.row_span = rows;
        self
    }

    /// Merges the cell across `cols` columns with the given layout.
    #[must_use]
    pub fn cols(mut self, cols: usize, layout: ColumnSpec) -> Self {
        self.col_span = cols;
        self.layout = Some(layout);
        self
    }

    /// Overrides the cell's layout without merging.
    #[must_use]
    pub fn with_layout(mut self, layout: ColumnSpec) -> Self {
        self.layout = Some(layout);
        self
    }
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// A horizontal rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// One full-width rule.
    Full,
    /// Two full-width rules.
    Double,
    /// Rules under the given inclusive, 1-based column ranges.
    Partial(Vec<(usize, usize)>),
}

/// One row of a tabular.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// A row of cells.
    Cells(Vec<Cell>),
    /// A horizontal rule.
    Rule(Rule),
    /// Vertical whitespace between groups; no visual effect in the output.
    Gap,
}

// ============================================================================
// SECTION: Tables
// ============================================================================

/// One tabular environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Tabular {
    /// Column layouts.
    pub columns: Vec<ColumnSpec>,
    /// Whether a vertical rule precedes the first column.
    pub leading_rule: bool,
    /// Ordered rows.
    pub rows: Vec<Row>,
}

impl Tabular {
    /// Creates an empty tabular with the given columns.
    #[must_use]
    pub const fn new(columns: Vec<ColumnSpec>, leading_rule: bool) -> Self {
        Self {
            columns,
            leading_rule,
            rows: Vec::new(),
        }
    }

    /// Appends a cell row.
    pub fn push_cells(&mut self, cells: Vec<Cell>) {
        self.rows.push(Row::Cells(cells));
    }

    /// Appends a rule.
    pub fn push_rule(&mut self, rule: Rule) {
        self.rows.push(Row::Rule(rule));
    }

    /// Appends a gap.
    pub fn push_gap(&mut self) {
        self.rows.push(Row::Gap);
    }

    /// Checks spans and rule ranges against the column count.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] describing the first violation.
    pub fn validate(&self, label: &str) -> Result<(), TableError> {
        let width = self.columns.len();
        if width == 0 {
            return Err(TableError::NoColumns(label.to_string()));
        }
        for (index, row) in self.rows.iter().enumerate() {
            match row {
                Row::Cells(cells) => {
                    if cells.iter().any(|cell| cell.col_span == 0 || cell.row_span == 0) {
                        return Err(TableError::ZeroSpan {
                            label: label.to_string(),
                            row: index,
                        });
                    }
                    let found: usize = cells.iter().map(|cell| cell.col_span).sum();
                    if found != width {
                        return Err(TableError::ColumnMismatch {
                            label: label.to_string(),
                            row: index,
                            expected: width,
                            found,
                        });
                    }
                }
                Row::Rule(Rule::Partial(ranges)) => {
                    for &(start, end) in ranges {
                        if start == 0 || start > end || end > width {
                            return Err(TableError::RuleOutOfRange {
                                label: label.to_string(),
                                start,
                                end,
                            });
                        }
                    }
                }
                Row::Rule(Rule::Full | Rule::Double) | Row::Gap => {}
            }
        }
        Ok(())
    }
}

/// One floating table: stacked tabulars with a caption and label.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    /// Cross-reference label.
    pub label: String,
    /// Caption markup.
    pub caption: String,
    /// Float placement specifier.
    pub placement: String,
    /// Column separation applied before the table, in points.
    pub column_sep_pt: Option<f64>,
    /// Vertical offset applied at the top of the float, in centimetres.
    pub vertical_offset_cm: Option<f64>,
    /// Stacked tabulars.
    pub tabulars: Vec<Tabular>,
}

impl TableBlock {
    /// Checks every tabular in the block.
    ///
    /// # Errors
    ///
    /// Returns the first [`TableError`] found.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.tabulars.is_empty() {
            return Err(TableError::NoTabulars(self.label.clone()));
        }
        self.tabulars.iter().try_for_each(|tabular| tabular.validate(&self.label))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Table assembly errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A table needs a grid cell the result store does not hold.
    #[error("missing result for cell ({0})")]
    MissingCell(CellKey),
    /// A table block has no tabulars.
    #[error("table {0} has no tabulars")]
    NoTabulars(String),
    /// A tabular has no columns.
    #[error("table {0} has no columns")]
    NoColumns(String),
    /// A cell spans zero rows or columns.
    #[error("table {label}, row {row}: zero-width span")]
    ZeroSpan {
        /// Table label.
        label: String,
        /// Row index within the tabular.
        row: usize,
    },
    /// A row's spans do not cover the columns exactly.
    #[error("table {label}, row {row}: spans cover {found} columns, expected {expected}")]
    ColumnMismatch {
        /// Table label.
        label: String,
        /// Row index within the tabular.
        row: usize,
        /// Column count.
        expected: usize,
        /// Sum of spans.
        found: usize,
    },
    /// A partial rule names a column outside the table.
    #[error("table {label}: rule {start}-{end} is out of range")]
    RuleOutOfRange {
        /// Table label.
        label: String,
        /// First column.
        start: usize,
        /// Last column.
        end: usize,
    },
}

// ============================================================================
// SECTION: Tests
// ============================================================================
