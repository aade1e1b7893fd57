//! Replays recorded face detections through head pose tracking and the
//! neck exercise routine.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use physio_pose::{
    app::{AppConfig, PhysioPoseApp, Recording, ReplayEvent},
    config::{Config, EXAMPLE_CONFIG},
    exercise::{ExerciseSession, Feedback},
};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded detections to replay (YAML)
    #[arg(short, long, required_unless_present = "print_config")]
    input: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Run the exercise routine against the tracked poses
    #[arg(short, long)]
    exercises: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    let config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    let input = args.input.context("No input recording given")?;
    let recording = Recording::from_file(&input).with_context(|| format!("Failed to load recording {input}"))?;

    let mut app = PhysioPoseApp::new(AppConfig {
        config,
        run_exercises: args.exercises,
    })?;

    let hold = app.session().map_or(Duration::ZERO, ExerciseSession::hold_duration);
    let summary = app.replay(&recording, |event| match event {
        ReplayEvent::Pose { timestamp_ms, pose } => println!(
            "{:>8} ms  yaw {:>6.1}  pitch {:>6.1}  roll {:>6.1}  neck {:>6.1}  conf {:>5.1}%  {}",
            timestamp_ms,
            pose.yaw,
            pose.pitch,
            pose.roll,
            pose.neck_tilt,
            pose.confidence * 100.0,
            pose.direction()
        ),
        ReplayEvent::Feedback { timestamp_ms, feedback } => {
            println!("{:>8} ms  {}", timestamp_ms, describe(feedback, hold));
        }
    });

    println!(
        "frames {}  poses {}  rejected {}  no face {}",
        summary.frames, summary.poses_published, summary.frames_rejected, summary.frames_without_face
    );
    if args.exercises {
        println!(
            "exercises completed {}{}",
            summary.exercises_completed,
            if summary.session_complete { " (routine finished)" } else { "" }
        );
    }

    Ok(())
}

fn describe(feedback: &Feedback, hold: Duration) -> String {
    match feedback {
        Feedback::Idle => String::new(),
        Feedback::Good(message) | Feedback::Warning(message) => message.clone(),
        Feedback::Holding { remaining } => format!("holding, {:.1} s left", remaining.as_secs_f64()),
        Feedback::StepCompleted { completed, next } => {
            format!("completed {completed}; next: {}", next.instruction(hold))
        }
        Feedback::SessionCompleted => {
            "Excellent work! You've completed all the exercises.".to_string()
        }
    }
}
