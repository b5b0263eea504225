// crates/psi-eval-core/src/report/summary.rs
// ============================================================================
// Module: Cell Summary
// Description: Plain-text summary of one cell's derived metrics.
// Purpose: Print a human-readable breakdown for single-cell runs.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! One section per metric category, each with sender, receiver and total
//! rows and one-time and recurrent columns at two decimals.

use std::fmt::Write;

use crate::core::Actor;
use crate::core::DerivedMetrics;
use crate::core::MetricCategory;

/// Separator line between sections.
const SEPARATOR: &str = "-----------------------------------";

/// Renders the text summary for one cell.
#[must_use]
pub fn render_summary(metrics: &DerivedMetrics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{SEPARATOR}");
    for category in MetricCategory::ALL {
        let record = metrics.get(category);
        let _ = writeln!(out, "{}", category.title());
        let _ = writeln!(out, "From     One-time Recurrent");
        for actor in Actor::ALL {
            let split = record.actor(actor);
            let _ = writeln!(
                out,
                "{:<9}{:8.2}  {:8.2}",
                actor.label(),
                split.one_time,
                split.recurrent
            );
        }
        let _ = writeln!(out, "{SEPARATOR}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MetricRecord;
    use crate::core::Split;

    #[test]
    fn summary_lists_every_category_with_aligned_columns() {
        let mut metrics = DerivedMetrics::default();
        metrics.comp_time = MetricRecord {
            sender: Split::new(1.0, 0.5),
            receiver: Split::recurrent_only(1.0),
            total: Split::new(1.0, 1.5),
        };
        let text = render_summary(&metrics);
        for category in MetricCategory::ALL {
            assert!(text.contains(category.title()), "missing {category}");
        }
        assert!(text.contains("Sender       1.00      0.50\n"), "{text}");
        assert!(text.contains("Receiver     0.00      1.00\n"), "{text}");
        assert!(text.contains("Total        1.00      1.50\n"), "{text}");
        assert_eq!(text.matches(SEPARATOR).count(), MetricCategory::ALL.len() + 1);
    }
}
