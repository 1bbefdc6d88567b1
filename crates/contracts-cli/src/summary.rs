use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use contracts_cli::types::{BuildResult, StageSummary};

pub fn print_summary(result: &BuildResult) {
    println!("Run started: {}", result.started_at.format("%Y-%m-%d %H:%M:%S %Z"));
    println!("Output: {}", result.output_path.display());
    if let Some(fetched) = &result.fetched {
        println!("Workbook: {} ({} bytes)", fetched.path.display(), fetched.bytes);
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("ms"),
        header_cell("Detail"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let mut total_ms = 0u128;
    for stage in &result.stages {
        total_ms += stage.duration_ms;
        table.add_row(stage_row(stage));
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.published_rows).add_attribute(Attribute::Bold),
        Cell::new(result.published_columns).add_attribute(Attribute::Bold),
        Cell::new(total_ms).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
    print_join_table(result);
    print_enrichment(result);
}

fn stage_row(stage: &StageSummary) -> Vec<Cell> {
    vec![
        Cell::new(stage.stage)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        count_cell(stage.rows),
        count_cell(stage.columns),
        Cell::new(stage.duration_ms),
        if stage.detail.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(&stage.detail)
        },
    ]
}

fn print_join_table(result: &BuildResult) {
    if result.joins.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Joined"),
        header_cell("Base rows"),
        header_cell("Matched"),
        header_cell("Unmatched"),
        header_cell("Output rows"),
    ]);
    apply_table_style(&mut table);
    for column in 1..5 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for (entity, stats) in &result.joins {
        table.add_row(vec![
            Cell::new(entity.sheet_name()),
            Cell::new(stats.base_rows),
            Cell::new(stats.matched),
            warn_cell(stats.unmatched),
            Cell::new(stats.output_rows),
        ]);
    }
    println!();
    println!("Joins:");
    println!("{table}");
}

fn print_enrichment(result: &BuildResult) {
    let report = &result.enrichment;
    println!();
    println!(
        "Authorities: {} of {} buyer rows resolved, {} unresolved",
        report.matched, report.rows, report.unmatched
    );
    if report.ambiguous.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Buyer name"),
        header_cell("Rows"),
        header_cell("Chosen"),
        header_cell("Candidates"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for lookup in &report.ambiguous {
        table.add_row(vec![
            Cell::new(&lookup.name),
            Cell::new(lookup.rows),
            Cell::new(&lookup.chosen_code).fg(Color::Yellow),
            Cell::new(lookup.candidate_codes.join(", ")),
        ]);
    }
    println!("Ambiguous lookups:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::UpperBoundary(Width::Percentage(60)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: Option<usize>) -> Cell {
    match count {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn warn_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Yellow)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
