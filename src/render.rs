//! Table rendering using comfy-table.
//!
//! Renders a result table as a bordered grid with bold headers and no row
//! index, followed by a row-count line.

use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::normalize::ResultTable;

/// Renders a result table plus its row-count line.
pub fn render_result(result: &ResultTable) -> String {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            result
                .table
                .column_names()
                .iter()
                .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );

    for idx in 0..result.table.n_rows() {
        let cells: Vec<String> = result
            .table
            .row(idx)
            .iter()
            .map(|v| v.to_display_string())
            .collect();
        table.add_row(cells);
    }

    format!("{table}\n\nFound {} rows", result.rows)
}
