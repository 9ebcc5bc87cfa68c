//! Run summary report

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::utils::format_duration;

/// Summary of one xG run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub shots_loaded: usize,
    pub freeze_frame_rows: usize,
    /// Shots left after the freeze-frame join
    pub shots_modelled: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub goals: usize,
    pub plots_written: usize,
    pub team: Option<String>,
    stage_times: Vec<(String, Duration)>,
}

impl RunSummary {
    pub fn new(shots_loaded: usize, freeze_frame_rows: usize) -> Self {
        Self {
            shots_loaded,
            freeze_frame_rows,
            ..Default::default()
        }
    }

    pub fn record_stage(&mut self, stage: &str, elapsed: Duration) {
        self.stage_times.push((stage.to_string(), elapsed));
    }

    pub fn stage_times(&self) -> &[(String, Duration)] {
        &self.stage_times
    }

    pub fn total_time(&self) -> Duration {
        self.stage_times.iter().map(|(_, d)| *d).sum()
    }

    /// Shots that had no freeze frame and fell out of the join
    pub fn shots_dropped(&self) -> usize {
        self.shots_loaded.saturating_sub(self.shots_modelled)
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Shots loaded"), Cell::new(self.shots_loaded)]);
        table.add_row(vec![
            Cell::new("🧊 Freeze-frame rows"),
            Cell::new(self.freeze_frame_rows),
        ]);
        table.add_row(vec![
            Cell::new("🗑️  Shots without freeze frame"),
            Cell::new(self.shots_dropped()).fg(if self.shots_dropped() == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        table.add_row(vec![
            Cell::new("✅ Shots modelled"),
            Cell::new(self.shots_modelled)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("✂️  Train / test"),
            Cell::new(format!("{} / {}", self.train_rows, self.test_rows)),
        ]);
        table.add_row(vec![Cell::new("⚽ Goals"), Cell::new(self.goals)]);
        if let Some(team) = &self.team {
            table.add_row(vec![Cell::new("🎯 Comparison team"), Cell::new(team)]);
        }
        table.add_row(vec![
            Cell::new("🖼️  Plots written"),
            Cell::new(self.plots_written).fg(Color::Cyan),
        ]);

        for (stage, elapsed) in &self.stage_times {
            table.add_row(vec![
                Cell::new(format!("⏱️  {}", stage)),
                Cell::new(format_duration(*elapsed)).fg(Color::DarkGrey),
            ]);
        }
        table.add_row(vec![
            Cell::new("⏱️  Total"),
            Cell::new(format_duration(self.total_time())).add_attribute(Attribute::Bold),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        // Indent the table
        for line in self.to_table().to_string().lines() {
            println!("    {}", line);
        }
    }
}
