//! Terminal tables for the fitted model, its evaluation and the exploration steps

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{CorrelatedPair, LogisticModel, ModelEvaluation};

/// Two-sided 5% critical value of the standard normal
const Z_CRITICAL: f64 = 1.96;

fn header(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
        .collect()
}

fn number(value: f64, decimals: usize) -> Cell {
    Cell::new(format!("{:.*}", decimals, value)).set_alignment(CellAlignment::Right)
}

/// Coefficients with standard errors and z-values
pub fn coefficient_table(model: &LogisticModel) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Term", "Estimate", "Std. error", "z"]));

    for coef in std::iter::once(&model.intercept).chain(&model.coefficients) {
        let significant = coef.z_value.is_finite() && coef.z_value.abs() >= Z_CRITICAL;
        table.add_row(vec![
            Cell::new(&coef.name),
            number(coef.estimate, 4),
            number(coef.std_error, 4),
            number(coef.z_value, 2).fg(if significant { Color::Green } else { Color::White }),
        ]);
    }

    table
}

/// Metrics for each named partition, one column per partition
pub fn evaluation_table(partitions: &[(&str, &ModelEvaluation)]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut head = vec![Cell::new("Metric").add_attribute(Attribute::Bold)];
    head.extend(
        partitions
            .iter()
            .map(|(name, _)| Cell::new(name).add_attribute(Attribute::Bold)),
    );
    table.set_header(head);

    let rows: [(&str, fn(&ModelEvaluation) -> Cell); 7] = [
        ("Shots", |e| Cell::new(e.n_shots)),
        ("Goals", |e| Cell::new(e.goals)),
        ("Expected goals", |e| number(e.expected_goals, 1)),
        ("AUC", |e| number(e.auc, 4)),
        ("Gini", |e| number(e.gini, 4).fg(gini_color(e.gini))),
        ("Log loss", |e| number(e.log_loss, 4)),
        ("Brier score", |e| number(e.brier_score, 4)),
    ];

    for (label, cell) in rows {
        let mut row = vec![Cell::new(label)];
        row.extend(partitions.iter().map(|(_, e)| cell(e)));
        table.add_row(row);
    }

    table
}

fn gini_color(gini: f64) -> Color {
    if gini >= 0.5 {
        Color::Green
    } else if gini >= 0.3 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Strongest correlated pairs
pub fn correlation_table(pairs: &[CorrelatedPair]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Feature", "Feature", "r"]));

    for pair in pairs {
        let color = if pair.correlation.abs() >= 0.7 {
            Color::Red
        } else if pair.correlation.abs() >= 0.4 {
            Color::Yellow
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(&pair.feature1),
            Cell::new(&pair.feature2),
            number(pair.correlation, 3).fg(color),
        ]);
    }

    table
}

/// Columns that had missing values before filling
pub fn missing_table(ratios: &[(String, f64)]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Column", "Missing"]));

    for (column, ratio) in ratios.iter().filter(|(_, r)| *r > 0.0) {
        table.add_row(vec![
            Cell::new(column),
            Cell::new(format!("{:.1}%", ratio * 100.0)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Print a titled table indented under the current step
pub fn display_table(icon: &str, title: &str, table: &Table) {
    println!();
    println!(
        "    {} {}",
        style(icon).cyan(),
        style(title).white().bold()
    );
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
