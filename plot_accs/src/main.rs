mod figure;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use curves::{ConceptSampler, CurveSeries, SolveCriterion, WaveHistory};
use dclog::{split_log, Chunk, IterationStats, RESULTS_MARKER};
use figure::{ChartOptions, Figure, Marker, TextRotation};
use indicatif::{ProgressBar, ProgressStyle};
use plotters::style::colors::{BLACK, GREEN};
use rand::Rng;

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Reading log file {}", args.log_path.display());
    let text = fs::read_to_string(&args.log_path)
        .with_context(|| format!("Failed to read log file {}", args.log_path.display()))?;

    let chunks = split_log(&text)
        .with_context(|| format!("Failed to parse enumeration log {}", args.log_path.display()))?;
    if chunks.is_empty() {
        bail!(
            "No enumeration sections found in {} (expected the {:?} marker)",
            args.log_path.display(),
            RESULTS_MARKER
        );
    }

    let stats = collect_iteration_stats(&chunks)?;
    let waves = tracked_waves(&stats);
    if waves.is_empty() {
        bail!(
            "The first enumeration section of {} contains no test cases",
            args.log_path.display()
        );
    }
    print_summary(&stats, &waves);

    let figure = build_figure(&stats, &waves, ConceptSampler::new())?;

    println!("Saving learning curves to {}", args.image_path.display());
    figure.save(&args.image_path)?;

    Ok(())
}

/// Helper function to create a consistent progress bar style
fn create_progress_bar(total: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Failed to set progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Aggregates every chunk into per-iteration statistics
fn collect_iteration_stats(chunks: &[Chunk]) -> Result<Vec<IterationStats>> {
    let progress_bar = create_progress_bar(chunks.len() as u64)?;
    progress_bar.set_message("Collecting hit statistics");

    let stats = chunks
        .iter()
        .map(|chunk| {
            let iteration_stats = IterationStats::from_chunk(chunk);
            progress_bar.inc(1);
            iteration_stats
        })
        .collect();

    progress_bar.finish_with_message("Statistics collected");
    Ok(stats)
}

/// Waves tracked across the whole run: the sorted wave names of the first
/// iteration. Later iterations must contain every one of them.
fn tracked_waves(stats: &[IterationStats]) -> Vec<String> {
    stats
        .first()
        .map(|first| first.accuracies.waves().map(String::from).collect())
        .unwrap_or_default()
}

/// Prints what was read and, per wave, how many concepts scored a hit in
/// the final iteration.
fn print_summary(stats: &[IterationStats], waves: &[String]) {
    println!(
        "Parsed {} iteration(s) tracking waves: {}",
        stats.len(),
        waves.join(", ")
    );
    if let Some(last) = stats.last() {
        for wave in waves {
            if let Some(hit_concepts) = last.hits.get(wave) {
                println!(
                    "  {}: {} concept(s) hit in the final iteration",
                    wave,
                    hit_concepts.len()
                );
            }
        }
    }
}

/// Builds the complete figure: per wave, one line series per solve
/// criterion, plus sample-concept annotations along the partially-solved
/// curve.
fn build_figure<R: Rng>(
    stats: &[IterationStats],
    waves: &[String],
    mut sampler: ConceptSampler<R>,
) -> Result<Figure> {
    let mut figure = Figure::new(ChartOptions::default());
    figure.set_x_range(0.0..stats.len().saturating_sub(1).max(1) as f64);

    for wave in waves {
        let history = WaveHistory::collect(stats, wave)
            .with_context(|| format!("Failed to track wave {} across iterations", wave))?;
        let complete = history.solved_fractions(SolveCriterion::Completely)?;
        let partial = history.solved_fractions(SolveCriterion::Partially)?;

        figure.add_line_series(
            complete.points(),
            Marker::Dot,
            format!("{} tasks {}", wave, SolveCriterion::Completely),
        );
        figure.add_line_series(
            partial.points(),
            Marker::Cross,
            format!("{} tasks {}", wave, SolveCriterion::Partially),
        );

        annotate_samples(&mut figure, &history, &partial, &mut sampler);
    }

    figure.add_legend_marker("sample concepts cracked", GREEN);
    figure.add_legend_marker("sample concepts unsolved", BLACK);

    Ok(figure)
}

/// Marks one still-unsolved concept per iteration and one concept cracked
/// since the previous iteration, both placed along the partially-solved
/// curve. The unsolved label hangs just below its point, rotated; the
/// cracked label sits at the previous iteration's x position.
fn annotate_samples<R: Rng>(
    figure: &mut Figure,
    history: &WaveHistory<'_>,
    partial: &CurveSeries,
    sampler: &mut ConceptSampler<R>,
) {
    let maps = history.accuracies();
    for (iteration, (&accuracies, &fraction)) in
        maps.iter().zip(partial.values()).enumerate()
    {
        if let Some(concept) = sampler.pick_unsolved(accuracies) {
            figure.annotate(
                (iteration as f64, fraction - 0.01),
                concept,
                TextRotation::Clockwise,
                BLACK,
            );
        }
        if iteration == 0 {
            continue;
        }
        if let Some(concept) = sampler.pick_newly_solved(maps[iteration - 1], accuracies) {
            figure.annotate(
                (iteration as f64 - 1.0, fraction),
                concept,
                TextRotation::Horizontal,
                GREEN,
            );
        }
    }
}

#[derive(clap::Parser)]
#[command(name = "plot_accs", about = "DreamCoder learning-curve plotting", long_about = None)]
struct Args {
    /// Path of the enumeration log to read (e.g. a slurm .err capture)
    log_path: PathBuf,
    /// Path of the chart image to write; a .svg extension selects SVG output
    image_path: PathBuf,
}
