//! shotxg: Expected Goals CLI Tool
//!
//! Loads shots and freeze frames, engineers per-shot features, fits a
//! logistic xG model, evaluates it on held-out shots and renders plots.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use shotxg::cli::{confirm_overwrite, Cli};
use shotxg::pipeline::{
    add_goal_indicator, analyze_missing_values, compute_correlation_matrix, count_goals,
    engineer_features, evaluate_scored, expand_location_column, fill_missing_values,
    fit_xg_model, get_columns_with_missing, load_dataset_with_progress, require_columns,
    score_dataset, strongest_correlations, ColumnMap, FitOptions, TargetMapping,
    TrainTestSplit, GOAL_OUTCOME,
};
use shotxg::report::{
    coefficient_table, correlation_table, display_table, evaluation_table, missing_table,
    RunSummary,
};
use shotxg::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
    print_warning, ConfigCard,
};
use shotxg::visualize::{existing_plot_files, render_all, PlotOptions};

/// Correlated pairs listed in the terminal
const TOP_CORRELATIONS: usize = 10;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let columns = match &cli.columns {
        Some(path) => ColumnMap::from_json_file(path)?,
        None => ColumnMap::default(),
    };
    let output_dir = cli.output_dir();

    // Print styled banner
    print_banner(env!("CARGO_PKG_VERSION"));

    // Print configuration card
    print_config(&ConfigCard {
        shots: &cli.shots,
        freeze_frames: &cli.freeze_frames,
        output_dir: &output_dir,
        team: cli.team.as_deref(),
        seed: cli.seed,
        train_fraction: cli.train_fraction,
        xg_threshold: cli.xg_threshold,
    });

    // Step 1: Load both tables
    print_step_header(1, "Load Data");

    let step_start = Instant::now();
    let shot_cols = &columns.shots;
    let ff_cols = &columns.freeze_frames;

    let (mut shots, shot_rows, shot_width, shot_mb) =
        load_dataset_with_progress(&cli.shots, cli.infer_schema_length)?;
    let (mut freeze_frames, ff_rows, ff_width, ff_mb) =
        load_dataset_with_progress(&cli.freeze_frames, cli.infer_schema_length)?;

    expand_location_column(&mut shots, &shot_cols.location, &shot_cols.x, &shot_cols.y)?;
    expand_location_column(&mut freeze_frames, &ff_cols.location, &ff_cols.x, &ff_cols.y)?;

    require_columns(
        &shots,
        &[
            &shot_cols.id,
            &shot_cols.match_id,
            &shot_cols.team,
            &shot_cols.x,
            &shot_cols.y,
            &shot_cols.outcome,
            &shot_cols.reference_xg,
        ],
        "shots",
    )?;

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!(
        "      Shots:         {} rows × {} columns ({:.2} MB)",
        shot_rows, shot_width, shot_mb
    );
    println!(
        "      Freeze frames: {} rows × {} columns ({:.2} MB)",
        ff_rows, ff_width, ff_mb
    );

    let mut summary = RunSummary::new(shot_rows, ff_rows);
    let elapsed = step_start.elapsed();
    summary.record_stage("Load", elapsed);
    print_step_time(elapsed);

    // Step 2: Fill missing values and derive the goal indicator
    print_step_header(2, "Clean Shots");

    let step_start = Instant::now();
    let missing_ratios = analyze_missing_values(&shots)?;
    let with_missing = get_columns_with_missing(&missing_ratios);
    if with_missing.is_empty() {
        print_info("No missing values");
    } else {
        print_count("column(s) with missing values", with_missing.len(), Some("(filled)"));
        display_table("🕳️ ", "MISSING VALUES", &missing_table(&missing_ratios));
    }

    let shots = fill_missing_values(shots)?;
    let shots = add_goal_indicator(
        shots,
        &shot_cols.outcome,
        &TargetMapping::new(GOAL_OUTCOME.to_string()),
    )?;
    let (goals, non_goals) = count_goals(&shots)?;
    print_success(&format!("{} goals, {} other outcomes", goals, non_goals));

    let elapsed = step_start.elapsed();
    summary.record_stage("Clean", elapsed);
    print_step_time(elapsed);

    // Step 3: Feature engineering
    print_step_header(3, "Feature Engineering");

    let step_start = Instant::now();
    let spinner = create_spinner("Joining freeze frames...");
    let engineered = engineer_features(&shots, &freeze_frames, &columns, cli.goalkeeper_policy)?;
    finish_with_success(
        &spinner,
        &format!("Engineered {} shots", engineered.df.height()),
    );

    summary.shots_modelled = engineered.df.height();
    if summary.shots_dropped() > 0 {
        print_info(&format!(
            "{} shot(s) without a freeze frame were dropped",
            summary.shots_dropped()
        ));
    }
    if engineered.shots_without_keeper > 0 {
        print_warning(&format!(
            "{} shot(s) have no opposing goalkeeper; keeper distance set to 0",
            engineered.shots_without_keeper
        ));
    }
    if engineered.shots_with_multiple_keepers > 0 {
        print_warning(&format!(
            "{} shot(s) have several opposing goalkeepers; the first one was used",
            engineered.shots_with_multiple_keepers
        ));
    }

    let elapsed = step_start.elapsed();
    summary.record_stage("Features", elapsed);
    print_step_time(elapsed);

    // Step 4: Correlation analysis
    print_step_header(4, "Correlation Analysis");

    let step_start = Instant::now();
    let spinner = create_spinner("Calculating correlations...");
    let correlations = compute_correlation_matrix(&engineered.df)?;
    finish_with_success(
        &spinner,
        &format!("Correlation matrix over {} numeric columns", correlations.len()),
    );
    let strongest = strongest_correlations(&correlations, TOP_CORRELATIONS);
    if strongest.is_empty() {
        print_info("Fewer than two numeric columns to correlate");
    } else {
        display_table("🔗", "STRONGEST CORRELATIONS", &correlation_table(&strongest));
    }

    let elapsed = step_start.elapsed();
    summary.record_stage("Correlation", elapsed);
    print_step_time(elapsed);

    // Step 5: Fit, score and evaluate
    print_step_header(5, "Fit xG Model");

    let step_start = Instant::now();
    let split = TrainTestSplit::new(engineered.df.height(), cli.train_fraction, cli.seed);
    let (train, _) = split.apply(&engineered.df)?;
    summary.train_rows = split.train.len();
    summary.test_rows = split.test.len();
    summary.goals = count_goals(&engineered.df)?.0;

    let spinner = create_spinner("Fitting logistic regression...");
    let model = fit_xg_model(&train, FitOptions::default())
        .context("Failed to fit the xG model on the training partition")?;
    if model.converged {
        finish_with_success(
            &spinner,
            &format!("Converged after {} iterations", model.iterations),
        );
    } else {
        finish_with_warning(
            &spinner,
            &format!("Stopped after {} iterations", model.iterations),
        );
        print_warning("IRLS did not converge; coefficients may be unreliable");
    }
    display_table("📐", "COEFFICIENTS", &coefficient_table(&model));

    let scored = score_dataset(engineered.df, &model)?;
    let (scored_train, scored_test) = split.apply(&scored)?;
    let train_eval = evaluate_scored(&scored_train)?;
    if scored_test.height() == 0 {
        print_warning("Test partition is empty; showing training metrics only");
        display_table("📊", "EVALUATION", &evaluation_table(&[("Train", &train_eval)]));
    } else {
        let test_eval = evaluate_scored(&scored_test)?;
        display_table(
            "📊",
            "EVALUATION",
            &evaluation_table(&[("Train", &train_eval), ("Test", &test_eval)]),
        );
    }

    let elapsed = step_start.elapsed();
    summary.record_stage("Model", elapsed);
    print_step_time(elapsed);

    // Step 6: Plots
    print_step_header(6, "Render Plots");

    let step_start = Instant::now();
    let existing = existing_plot_files(&output_dir);
    let proceed = existing.is_empty() || cli.no_confirm || confirm_overwrite(&existing)?;

    if proceed {
        let spinner = create_spinner("Rendering plots...");
        let rendered = render_all(
            &scored,
            shot_cols,
            &correlations,
            &PlotOptions {
                output_dir: output_dir.clone(),
                team: cli.team.clone(),
                xg_threshold: cli.xg_threshold,
                histogram_bins: cli.histogram_bins,
                smoothing_frac: cli.smoothing_frac,
            },
        )
        .context("Failed to render plots")?;
        finish_with_success(
            &spinner,
            &format!(
                "Saved {} plots to {}",
                rendered.files.len(),
                output_dir.display()
            ),
        );
        summary.plots_written = rendered.files.len();
        summary.team = Some(rendered.team);
    } else {
        print_info("Kept existing plots; rendering skipped");
    }

    let elapsed = step_start.elapsed();
    summary.record_stage("Plots", elapsed);
    print_step_time(elapsed);

    // Display summary
    summary.display();

    // Final completion message
    print_completion();

    Ok(())
}
