// crates/psi-eval-core/src/report/latex.rs
// ============================================================================
// Module: LaTeX Table Renderer
// Description: Generic markup for declarative table blocks.
// Purpose: Render any valid TableBlock without table-specific knowledge.
// Dependencies: crate::report::table
// ============================================================================

//! ## Overview
//! Each [`TableBlock`] becomes a `table*` float. Row merges become
//! `\multirow`, column merges and layout overrides become `\multicolumn`,
//! and numbers are printed with exactly two decimals. Fixed-width columns use
//! the `C` column type declared in the document preamble.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use crate::report::table::Align;
use crate::report::table::Cell;
use crate::report::table::CellContent;
use crate::report::table::ColumnSpec;
use crate::report::table::Row;
use crate::report::table::Rule;
use crate::report::table::TableBlock;
use crate::report::table::TableError;
use crate::report::table::Tabular;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Indentation for environment bodies.
const INDENT: &str = "    ";
/// Indentation for tabular rows.
const ROW_INDENT: &str = "        ";

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a validated table block.
///
/// # Errors
///
/// Returns [`TableError`] when the block fails validation.
pub fn render_block(block: &TableBlock) -> Result<String, TableError> {
    block.validate()?;
    let mut out = String::new();
    if let Some(sep) = block.column_sep_pt {
        out.push_str(&format!("\\setlength{{\\tabcolsep}}{{{}pt}}\n\n", format_length(sep)));
    }
    out.push_str(&format!("\\begin{{table*}}[{}]\n", block.placement));
    if let Some(offset) = block.vertical_offset_cm {
        out.push_str(&format!("{INDENT}\\vspace{{{}cm}}\n", format_length(offset)));
    }
    out.push_str(&format!("{INDENT}\\fontsize{{10}}{{11}}\\selectfont\n"));
    out.push_str(&format!("{INDENT}\\centering\n"));
    for (index, tabular) in block.tabulars.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        render_tabular(&mut out, tabular);
    }
    out.push_str(&format!("{INDENT}\\caption{{{}}}\n", block.caption));
    out.push_str(&format!("{INDENT}\\label{{{}}}\n", block.label));
    out.push_str("\\end{table*}\n");
    Ok(out)
}

/// Renders one tabular environment into `out`.
fn render_tabular(out: &mut String, tabular: &Tabular) {
    let mut columns = String::new();
    if tabular.leading_rule {
        columns.push('|');
    }
    for column in &tabular.columns {
        columns.push_str(&column_spec(column));
    }
    out.push_str(&format!("{INDENT}\\begin{{tabular}}{{{columns}}}\n"));
    for row in &tabular.rows {
        match row {
            Row::Cells(cells) => {
                let rendered: Vec<String> = cells.iter().map(render_cell).collect();
                out.push_str(&format!("{ROW_INDENT}{} \\\\\n", rendered.join(" & ")));
            }
            Row::Rule(rule) => {
                out.push_str(&format!("{ROW_INDENT}{}\n", render_rule(rule)));
            }
            Row::Gap => out.push('\n'),
        }
    }
    out.push_str(&format!("{INDENT}\\end{{tabular}}\n"));
}

/// Returns the column specifier for one column.
fn column_spec(column: &ColumnSpec) -> String {
    let mut spec = match column.align {
        Align::Left => "l".to_string(),
        Align::Center => "c".to_string(),
        Align::Right => "r".to_string(),
        Align::FixedCenter(width) => format!("C{{{}cm}}", format_length(width)),
    };
    if column.rule_after {
        spec.push('|');
    }
    spec
}

/// Renders one cell, wrapping it in merge commands as needed.
fn render_cell(cell: &Cell) -> String {
    let mut body = render_content(&cell.content);
    if cell.row_span > 1 {
        body = format!("\\multirow{{{}}}*{{{body}}}", cell.row_span);
    }
    if let Some(layout) = &cell.layout {
        return format!("\\multicolumn{{{}}}{{{}}}{{{body}}}", cell.col_span, column_spec(layout));
    }
    if body.is_empty() { "{}".to_string() } else { body }
}

/// Renders cell content.
fn render_content(content: &CellContent) -> String {
    match content {
        CellContent::Empty => String::new(),
        CellContent::Text(text) => text.clone(),
        CellContent::Value(value) => format_value(*value),
        CellContent::Wrapped {
            text,
            width_cm,
        } => format!(
            "\\begin{{minipage}}{{{}cm}}\\centering{{{text}}}\\end{{minipage}}",
            format_length(*width_cm)
        ),
    }
}

/// Renders a horizontal rule.
fn render_rule(rule: &Rule) -> String {
    match rule {
        Rule::Full => "\\hline".to_string(),
        Rule::Double => "\\hline \\hline".to_string(),
        Rule::Partial(ranges) => ranges.iter().fold(String::new(), |mut acc, (start, end)| {
            let _ = write!(acc, "\\cline{{{start}-{end}}}");
            acc
        }),
    }
}

/// Formats a reported number with two decimals.
#[must_use]
pub fn format_value(value: f64) -> String {
    format!("{value:.2}")
}

/// Formats a length without trailing zeros.
fn format_length(value: f64) -> String {
    let mut text = format!("{value:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

// ============================================================================
// SECTION: Tests
// ============================================================================
