// crates/psi-eval-core/src/report/builder.rs
// ============================================================================
// Module: Report Table Builder
// Description: Builds the five fixed report tables from stored results.
// Purpose: Map grid results onto declarative table blocks.
// Dependencies: crate::core, crate::report::table, crate::runtime::store
// ============================================================================

//! ## Overview
//! The report consists of five blocks, in order:
//! 1. computation time per `|Y|` and `m` at `|X| = 2^20`;
//! 2. communication cost and time per `|Y|` and `m` at `|X| = 2^20`;
//! 3. to 5. one-time versus recurrent breakdowns at `|X| = 2^20`, `2^16` and
//!    `2^24`, always at `m = 1`.
//!
//! Only tables 1 and 2 vary `m`, and they are pinned to the one sender set
//! size the grid sweeps recurrences at. Every lookup goes through
//! [`ReportTableBuilder::metrics`], which refuses cells outside the grid.
//! Fast Setup columns and rows always precede Fast Intersection ones.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::CellKey;
use crate::core::DerivedMetrics;
use crate::core::MetricCategory;
use crate::core::Mode;
use crate::core::RECURRENCE_SWEEP_LOG2_X;
use crate::core::RECURRENCES;
use crate::core::Y_SIZES;
use crate::core::is_grid_cell;
use crate::report::table::Align;
use crate::report::table::Cell;
use crate::report::table::ColumnSpec;
use crate::report::table::Rule;
use crate::report::table::TableBlock;
use crate::report::table::TableError;
use crate::report::table::Tabular;
use crate::runtime::store::ResultStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sender set sizes that get a breakdown table, in report order.
pub const BREAKDOWN_LOG2_X_SIZES: [u32; 3] = [20, 16, 24];
/// Recurrence count used by the breakdown tables.
const BREAKDOWN_RECURRENCES: u32 = 1;
/// Column separation set before the breakdown tables, in points.
const BREAKDOWN_COLUMN_SEP_PT: f64 = 2.9;
/// Width of wrapped metric labels in the breakdown tables, in centimetres.
const BREAKDOWN_LABEL_WIDTH_CM: f64 = 1.76;

/// Caption of the computation table.
const RUNTIME_CAPTION: &str = "Computation time (s) for two configurations of our PSI protocol, \
\\textit{Fast Setup} and \\textit{Fast Intersection}, considering a target \\sender{}'s set size \
$|X| = \\mathscr{L} \\cdot 2^{20}$, several sizes of \\receiver{}'s set $|Y| = \\{4, 16, 64\\}$, \
and various numbers of recurrent set intersections $m = \\{1, 4, 16, 64\\}$.";

/// Caption of the communication table.
const COMMUNICATION_CAPTION: &str = "Communication cost (MiB) for two configurations of our PSI \
protocol, \\textit{Fast Setup} and \\textit{Fast Intersection}, considering a target \
\\sender{}'s set size $|X| = \\mathscr{L} \\cdot 2^{20}$ and several sizes of \\receiver{}'s set \
$|Y| = \\{4, 16, 64\\}$, where we vary the number of recurrent set intersections \
$m = \\{1, 4, 16, 64\\}$. We assume a Round-Trip Time (RTT) delay of 0.2ms and 80ms for 10 Gbps \
and 100 Mbps network speeds, respectively.";

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds report tables from a populated [`ResultStore`].
#[derive(Debug, Clone, Copy)]
pub struct ReportTableBuilder<'a> {
    /// Source of per-cell metrics.
    store: &'a ResultStore,
}

impl<'a> ReportTableBuilder<'a> {
    /// Creates a builder over `store`.
    #[must_use]
    pub const fn new(store: &'a ResultStore) -> Self {
        Self {
            store,
        }
    }

    /// Builds all five tables in report order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingCell`] when the store lacks a needed cell.
    pub fn build(&self) -> Result<Vec<TableBlock>, TableError> {
        let mut blocks = vec![self.runtime_table()?, self.communication_table()?];
        for log2_x_size in BREAKDOWN_LOG2_X_SIZES {
            blocks.push(self.breakdown_table(log2_x_size)?);
        }
        for block in &blocks {
            block.validate()?;
        }
        Ok(blocks)
    }

    /// Looks up one grid cell.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingCell`] when the cell is outside the grid
    /// or was never stored.
    pub fn metrics(
        &self,
        mode: Mode,
        log2_x_size: u32,
        y_size: u32,
        recurrences: u32,
    ) -> Result<&'a DerivedMetrics, TableError> {
        let key = CellKey::new(mode, log2_x_size, y_size, recurrences);
        if !is_grid_cell(log2_x_size, recurrences) {
            return Err(TableError::MissingCell(key));
        }
        self.store.get(key).ok_or(TableError::MissingCell(key))
    }

    /// Builds the computation-time table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingCell`] when the store lacks a needed cell.
    pub fn runtime_table(&self) -> Result<TableBlock, TableError> {
        let mut columns = vec![
            ColumnSpec::new(Align::Center, true),
            ColumnSpec::new(Align::Center, true),
            ColumnSpec::new(Align::Center, true),
        ];
        for mode in Mode::ALL {
            for index in 0 .. 3 {
                columns.push(ColumnSpec::new(Align::Center, index == 2 && mode != Mode::FastIntersection));
            }
        }
        let mut tabular = Tabular::new(columns, false);
        tabular.push_rule(Rule::Full);
        push_sweep_header(&mut tabular, 3, &[
            "\\sender{} pre",
            "\\sender{} online",
            "\\receiver{} online",
        ]);
        tabular.push_rule(Rule::Full);
        self.push_sweep_body(&mut tabular, |metrics| {
            let comp = &metrics.comp_time;
            vec![comp.sender.one_time, comp.sender.recurrent, comp.receiver.recurrent]
        })?;
        tabular.push_rule(Rule::Full);
        Ok(TableBlock {
            label: "tab:runtime".to_string(),
            caption: RUNTIME_CAPTION.to_string(),
            placement: "htbp".to_string(),
            column_sep_pt: None,
            vertical_offset_cm: Some(-1.5),
            tabulars: vec![tabular],
        })
    }

    /// Builds the stacked communication cost and time table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingCell`] when the store lacks a needed cell.
    pub fn communication_table(&self) -> Result<TableBlock, TableError> {
        let mut cost = Tabular::new(communication_columns(), false);
        cost.push_rule(Rule::Full);
        push_sweep_header(&mut cost, 2, &[
            "\\sender{}$\\rightarrow$\\receiver{}",
            "\\receiver{}$\\rightarrow$\\sender{}",
        ]);
        cost.push_rule(Rule::Full);
        self.push_sweep_body(&mut cost, |metrics| {
            let comm = &metrics.comm_cost;
            vec![comm.sender.one_time + comm.sender.recurrent, comm.receiver.recurrent]
        })?;
        cost.push_rule(Rule::Double);

        let mut time = Tabular::new(communication_columns(), false);
        push_sweep_header(&mut time, 2, &["10 Gbps", "100 Mbps"]);
        time.push_rule(Rule::Full);
        self.push_sweep_body(&mut time, |metrics| {
            let fast = &metrics.comm_time_10g;
            let slow = &metrics.comm_time_100m;
            vec![
                fast.sender.one_time + fast.total.recurrent,
                slow.sender.one_time + slow.total.recurrent,
            ]
        })?;
        time.push_rule(Rule::Full);

        Ok(TableBlock {
            label: "tab:communication".to_string(),
            caption: COMMUNICATION_CAPTION.to_string(),
            placement: "htbp".to_string(),
            column_sep_pt: None,
            vertical_offset_cm: None,
            tabulars: vec![cost, time],
        })
    }

    /// Builds the one-time versus recurrent breakdown for one sender set size.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingCell`] when the store lacks a needed cell.
    pub fn breakdown_table(&self, log2_x_size: u32) -> Result<TableBlock, TableError> {
        let columns = vec![
            ColumnSpec::new(Align::Center, true),
            ColumnSpec::new(Align::Center, true),
            ColumnSpec::new(Align::Right, true),
            ColumnSpec::new(Align::Center, true),
            ColumnSpec::new(Align::Center, true),
            ColumnSpec::new(Align::Center, true),
            ColumnSpec::new(Align::Center, true),
            ColumnSpec::new(Align::Right, true),
            ColumnSpec::new(Align::Center, false),
            ColumnSpec::new(Align::Center, false),
            ColumnSpec::new(Align::Center, true),
        ];
        let mut tabular = Tabular::new(columns, true);
        let y_count = Y_SIZES.len();
        let recurrent_first = 9;
        let recurrent_last = recurrent_first + y_count - 1;

        tabular.push_rule(Rule::Partial(vec![(4, 4), (recurrent_first, recurrent_last)]));
        let mut header = breakdown_header_lead();
        header[3] = Cell::text(format!("$|X| = \\mathscr{{L}} \\cdot 2^{{{log2_x_size}}}$")).rows(2);
        header.push(Cell::text("$|Y|$").cols(y_count, ColumnSpec::new(Align::Center, true)));
        tabular.push_cells(header);
        let mut sizes = breakdown_header_lead();
        sizes.extend(Y_SIZES.iter().map(|y_size| Cell::text(y_size.to_string())));
        tabular.push_cells(sizes);
        tabular.push_rule(Rule::Partial(vec![(1, 4), (6, recurrent_last)]));

        let groups = breakdown_groups();
        let group_rows = groups.len() * Mode::ALL.len();
        for (group_index, (category, label)) in groups.iter().enumerate() {
            if group_index > 0 {
                tabular.push_rule(Rule::Partial(vec![(2, 4), (7, recurrent_last)]));
                tabular.push_gap();
            }
            for (mode_index, mode) in Mode::ALL.into_iter().enumerate() {
                let leading = group_index == 0 && mode_index == 0;
                let first_of_group = mode_index == 0;
                let setup = self.metrics(mode, log2_x_size, Y_SIZES[0], BREAKDOWN_RECURRENCES)?;
                let mut row = vec![
                    span_or_empty(leading, "One-time", group_rows),
                    if first_of_group { label.clone().rows(Mode::ALL.len()) } else { Cell::empty() },
                    Cell::text(mode.label()),
                    Cell::value(setup.get(*category).total.one_time),
                    Cell::empty(),
                    span_or_empty(leading, "Recurrent", group_rows),
                    if first_of_group { label.clone().rows(Mode::ALL.len()) } else { Cell::empty() },
                    Cell::text(mode.label()),
                ];
                for y_size in Y_SIZES {
                    let metrics = self.metrics(mode, log2_x_size, y_size, BREAKDOWN_RECURRENCES)?;
                    row.push(Cell::value(metrics.get(*category).total.recurrent));
                }
                tabular.push_cells(row);
            }
        }
        tabular.push_rule(Rule::Partial(vec![(1, 4), (6, recurrent_last)]));

        Ok(TableBlock {
            label: format!("tab:round_trip{log2_x_size}"),
            caption: breakdown_caption(log2_x_size),
            placement: "t".to_string(),
            column_sep_pt: Some(BREAKDOWN_COLUMN_SEP_PT),
            vertical_offset_cm: None,
            tabulars: vec![tabular],
        })
    }

    /// Appends the `|Y| × m` body shared by the sweep tables. `values` yields
    /// the per-mode cells for one grid cell.
    fn push_sweep_body<F>(&self, tabular: &mut Tabular, values: F) -> Result<(), TableError>
    where
        F: Fn(&DerivedMetrics) -> Vec<f64>,
    {
        let x = RECURRENCE_SWEEP_LOG2_X;
        let width = tabular.columns.len();
        let block_rows = Y_SIZES.len() * RECURRENCES.len();
        for (y_index, y_size) in Y_SIZES.into_iter().enumerate() {
            if y_index > 0 {
                tabular.push_rule(Rule::Partial(vec![(2, width)]));
            }
            for (m_index, recurrences) in RECURRENCES.into_iter().enumerate() {
                let mut row = vec![
                    if y_index == 0 && m_index == 0 {
                        Cell::text(format!("$\\mathscr{{L}} \\cdot 2^{{{x}}}$")).rows(block_rows)
                    } else {
                        Cell::empty()
                    },
                    if m_index == 0 {
                        Cell::text(y_size.to_string()).rows(RECURRENCES.len())
                    } else {
                        Cell::empty()
                    },
                    Cell::text(recurrences.to_string()),
                ];
                for mode in Mode::ALL {
                    let metrics = self.metrics(mode, x, y_size, recurrences)?;
                    row.extend(values(metrics).into_iter().map(Cell::value));
                }
                tabular.push_cells(row);
            }
            tabular.push_gap();
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Columns of both communication sub-tables.
fn communication_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new(Align::FixedCenter(1.5), true),
        ColumnSpec::new(Align::FixedCenter(1.0), true),
        ColumnSpec::new(Align::FixedCenter(1.0), true),
        ColumnSpec::new(Align::FixedCenter(1.5), false),
        ColumnSpec::new(Align::FixedCenter(1.5), true),
        ColumnSpec::new(Align::FixedCenter(1.5), false),
        ColumnSpec::new(Align::FixedCenter(1.5), false),
    ]
}

/// Appends the two header rows of a sweep table: grouping labels merged over
/// two rows, then one mode heading per mode over `per_mode` sub-columns.
fn push_sweep_header(tabular: &mut Tabular, per_mode: usize, sub_headings: &[&str]) {
    let mut first = vec![
        Cell::text("$|X|$").rows(2),
        Cell::text("$|Y|$").rows(2),
        Cell::text("$m$").rows(2),
    ];
    let mut second = vec![Cell::empty(), Cell::empty(), Cell::empty()];
    for mode in Mode::ALL {
        let rule_after = mode != Mode::FastIntersection;
        first.push(Cell::text(mode.label()).cols(per_mode, ColumnSpec::new(Align::Center, rule_after)));
        second.extend(sub_headings.iter().map(|heading| Cell::text(*heading)));
    }
    tabular.push_cells(first);
    tabular.push_cells(second);
}

/// Leading eight header cells of a breakdown table, before the `|Y|` columns.
fn breakdown_header_lead() -> Vec<Cell> {
    vec![
        Cell::blank(),
        Cell::blank(),
        Cell::empty(),
        Cell::empty(),
        Cell::blank(),
        Cell::blank(),
        Cell::blank(),
        Cell::empty(),
    ]
}

/// Metric groups of a breakdown table with their row labels.
fn breakdown_groups() -> [(MetricCategory, Cell); 4] {
    [
        (MetricCategory::CompTime, Cell::text("Computation")),
        (MetricCategory::CommCost, Cell::text("Communication")),
        (
            MetricCategory::TotalTime10g,
            Cell::wrapped("Total time (10 Gbps)", BREAKDOWN_LABEL_WIDTH_CM),
        ),
        (
            MetricCategory::TotalTime100m,
            Cell::wrapped("Total time (100 Mbps)", BREAKDOWN_LABEL_WIDTH_CM),
        ),
    ]
}

/// Returns a merged text cell when `leading`, otherwise an empty one.
fn span_or_empty(leading: bool, text: &str, rows: usize) -> Cell {
    if leading { Cell::text(text).rows(rows) } else { Cell::empty() }
}

/// Caption of a breakdown table.
fn breakdown_caption(log2_x_size: u32) -> String {
    format!(
        "Total time (in seconds) for two configurations of our PSI protocol, \\textit{{Fast \
         Setup}} and \\textit{{Fast Intersection}}, considering a target \\sender{{}}'s set size \
         $|X| = \\mathscr{{L}} \\cdot 2^{{{log2_x_size}}}$ and several sizes of \\receiver{{}}'s \
         set $|Y| = \\{{4, 16, 64\\}}$, where we evaluate the one-time costs and recurrent costs \
         of performing set intersections."
    )
}
