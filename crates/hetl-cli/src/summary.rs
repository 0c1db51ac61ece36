//! Operator-facing run summary rendering.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use hetl_model::{RunStatus, RunSummary};

pub fn print_summary(summary: &RunSummary) {
    println!("Run: {}", summary.run_id);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Seen"),
        header_cell("Accepted"),
        header_cell("Rejected"),
        header_cell("Orphans"),
        header_cell("Load ms"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_seen = 0usize;
    let mut total_accepted = 0usize;
    let mut total_rejected = 0usize;
    for dataset in &summary.datasets {
        total_seen += dataset.records_seen;
        total_accepted += dataset.accepted;
        total_rejected += dataset.rejected;
        table.add_row(vec![
            Cell::new(dataset.dataset.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(dataset.records_seen),
            Cell::new(dataset.accepted),
            count_cell(dataset.rejected, Color::Yellow),
            match dataset.orphan_references {
                Some(count) => count_cell(count, Color::Yellow),
                None => dim_cell("-"),
            },
            match dataset.load_duration {
                Some(duration) => Cell::new(duration.as_millis()),
                None => dim_cell("-"),
            },
            status_cell(dataset.error.as_deref()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_seen).add_attribute(Attribute::Bold),
        Cell::new(total_accepted).add_attribute(Attribute::Bold),
        count_cell(total_rejected, Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        run_status_cell(summary.status()),
    ]);
    println!("{table}");
    print_reason_table(summary);
    for dataset in &summary.datasets {
        if let Some(error) = &dataset.error {
            eprintln!("- {}: {error}", dataset.dataset);
        }
    }
}

fn print_reason_table(summary: &RunSummary) {
    let mut rows = Vec::new();
    for dataset in &summary.datasets {
        for (code, count) in &dataset.rejected_by_reason {
            rows.push((dataset.dataset.as_str(), code.clone(), *count));
        }
    }
    if rows.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Reason"),
        header_cell("Count"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (dataset, code, count) in rows {
        table.add_row(vec![
            Cell::new(dataset),
            Cell::new(code).fg(Color::Yellow),
            Cell::new(count),
        ]);
    }
    println!();
    println!("Rejections:");
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(110);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn status_cell(error: Option<&str>) -> Cell {
    match error {
        None => Cell::new("OK")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        Some(_) => Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn run_status_cell(status: RunStatus) -> Cell {
    let color = match status {
        RunStatus::Success => Color::Green,
        RunStatus::Partial => Color::Yellow,
        RunStatus::Failure => Color::Red,
    };
    Cell::new(status.as_str())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
