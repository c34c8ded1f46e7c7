//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the analysis pipeline
//! - prints the run summary
//! - writes charts and optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs, SampleArgs};
use crate::domain::{ExponentialWindow, FitCategory, FitConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `growth` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.result, &run.growth, &config)
    );

    let sigmoidal = run.result.fit.category == FitCategory::Sigmoidal;

    if config.plot {
        std::fs::create_dir_all(&config.out_dir).map_err(|e| {
            AppError::usage(format!(
                "Failed to create output directory '{}': {e}",
                config.out_dir.display()
            ))
        })?;

        let raw = config.out_dir.join("raw_curve.svg");
        crate::plot::render_raw_curve(&raw, &run.ingest.points, config.plot_width, config.plot_height)?;
        println!("Wrote {}", raw.display());

        if sigmoidal {
            let overlay = config.out_dir.join("sigmoid_fit.svg");
            crate::plot::render_sigmoid_overlay(
                &overlay,
                &run.ingest.points,
                &run.result,
                config.plot_width,
                config.plot_height,
            )?;
            println!("Wrote {}", overlay.display());
        } else {
            println!(
                "Skipping model overlay: fit category is {}.",
                run.result.fit.category.display_name()
            );
        }

        let log = config.out_dir.join("log_phase.svg");
        crate::plot::render_log_phase(
            &log,
            &run.log_points,
            &run.growth,
            &config.window,
            config.plot_width,
            config.plot_height,
        )?;
        println!("Wrote {}", log.display());
    }

    if let Some(path) = &config.export_results {
        match &run.residuals {
            Some(residuals) => {
                crate::io::export::write_results_csv(path, residuals)?;
                println!("Wrote {}", path.display());
            }
            None => println!(
                "Skipping results export: fit category is {}.",
                run.result.fit.category.display_name()
            ),
        }
    }

    if let Some(path) = &config.export_fit {
        if sigmoidal {
            crate::io::fitfile::write_fit_json(
                path,
                &run.result,
                Some(&run.growth),
                &config.window,
                run.ingest.stats.time_min,
                run.ingest.stats.time_max,
            )?;
            println!("Wrote {}", path.display());
        } else {
            println!(
                "Skipping fit export: fit category is {}.",
                run.result.fit.category.display_name()
            );
        }
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::fitfile::read_fit_json(&args.fit)?;
    crate::plot::render_fit_file(&args.out, &file, args.width, args.height)?;
    println!("Wrote {}", args.out.display());
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let spec = crate::data::SampleSpec {
        seed: args.seed,
        generations: args.generations,
        replicates: args.replicates,
        timepoints: args.timepoints,
        duration_h: args.duration,
        max_um: args.max,
        slope_per_h: args.slope,
        midpoint_h: args.midpoint,
        noise_fraction: args.noise,
    };
    let points = crate::data::generate_sample(&spec)?;
    crate::data::write_sample_csv(&args.out, &points)?;
    println!("Wrote {} ({} rows)", args.out.display(), points.len());
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        csv_path: args.csv.clone(),
        window: ExponentialWindow {
            start_h: args.window_start,
            end_h: args.window_end,
        },
        min_signal_fraction: args.min_signal_fraction,
        midpoint_tolerance: args.midpoint_tolerance,
        slope_min: args.slope_min,
        slope_max: args.slope_max,
        slope_steps: args.slope_steps,
        midpoint_steps: args.midpoint_steps,
        refine_iters: args.refine_iters,
        out_dir: args.out_dir.clone(),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_fit: args.export_fit.clone(),
    }
}
