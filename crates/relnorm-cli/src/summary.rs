use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use crate::types::{CheckResult, NormalizeResult};

/// Prints the run summary. Goes to stderr when the report itself was
/// printed to stdout.
pub fn print_normalize_summary(result: &NormalizeResult) {
    let mut lines = Vec::new();
    lines.push(format!("Sheet: {}", result.sheet.display()));
    lines.push(format!("Relation: {} -> {}", result.source, result.target));
    if let Some(path) = &result.output {
        lines.push(format!("Report: {}", path.display()));
    }
    lines.push(levels_table(result).to_string());
    lines.push(relations_table(result).to_string());
    lines.push(format!("Finished in {} ms", result.duration_ms));

    let text = lines.join("\n");
    if result.printed.is_some() {
        eprintln!("{text}");
    } else {
        println!("{text}");
    }
}

pub fn print_check_summary(result: &CheckResult) {
    println!("Sheet: {}", result.sheet.display());
    println!("Relation: {}", result.relation);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Level"),
        header_cell("Holds"),
        header_cell("Through level"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Center);
    for check in &result.levels {
        let level = if check.level == result.requested {
            Cell::new(format!("{} (requested)", check.level)).add_attribute(Attribute::Bold)
        } else {
            Cell::new(check.level)
        };
        table.add_row(vec![level, flag_cell(check.satisfied), flag_cell(check.cumulative)]);
    }
    println!("{table}");
    match result.highest() {
        Some(level) => println!("Highest normal form: {level}"),
        None => println!("Highest normal form: none"),
    }
}

fn levels_table(result: &NormalizeResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Level"),
        header_cell("Passes"),
        header_cell("Decomposed"),
        header_cell("Relations"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for stats in &result.levels {
        table.add_row(vec![
            Cell::new(stats.level),
            Cell::new(stats.passes),
            count_cell(stats.decomposed, Color::Yellow),
            Cell::new(stats.relations),
        ]);
    }
    table
}

fn relations_table(result: &NormalizeResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Relation"),
        header_cell("Attributes"),
        header_cell("Primary Key"),
        header_cell("Foreign Keys"),
        header_cell("Rows"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    let mut total_rows = 0usize;
    for row in &result.relations {
        total_rows += row.rows;
        let foreign_keys = if row.foreign_keys.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(row.foreign_keys.join("\n"))
        };
        table.add_row(vec![
            Cell::new(&row.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(row.attributes),
            Cell::new(&row.primary_key),
            foreign_keys,
            Cell::new(row.rows),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.relations.len()).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
    ]);
    table
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
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn flag_cell(value: bool) -> Cell {
    if value {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("✗").fg(Color::Red)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
