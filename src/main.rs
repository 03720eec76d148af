use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

use emotion_cli::analysis::{
    aggregate, collect_samples, SamplerConfig, Strategy, ThresholdRule, Tier,
};
use emotion_cli::classify::{OnnxClassifier, OnnxConfig, ALL_LABELS};
use emotion_cli::config::Config;
use emotion_cli::frame::{FrameDirSource, FrameSource, StillImageSource};
use emotion_cli::hints;
use emotion_cli::history::{HistoryEntry, HistoryLog};

/// Headless CLI for offline facial emotion detection
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the emotion model file (.onnx)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Analyze a single still image
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Analyze a directory of frames (replayed in filename order)
    #[arg(short, long, conflicts_with = "image")]
    frames: Option<PathBuf>,

    /// Aggregation strategy: "single", "average", or "majority"
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Number of frames to sample per analysis
    #[arg(long)]
    samples: Option<usize>,

    /// Delay between samples (ms)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Confidence threshold (0.0 - 1.0)
    #[arg(long)]
    threshold: Option<f32>,

    /// Treat a score equal to the threshold as low confidence
    #[arg(long)]
    inclusive_threshold: bool,

    /// Number of threads for model inference
    #[arg(long, default_value = "1")]
    threads: usize,

    /// List the emotion labels and exit
    #[arg(long)]
    list_labels: bool,

    /// Show history insights and exit
    #[arg(long)]
    insights: bool,

    /// Do not record this result in the history
    #[arg(long)]
    no_history: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    // Handle --list-labels
    if args.list_labels {
        return list_labels_and_exit();
    }

    // Load config and apply CLI overrides
    let mut config = Config::load(&Config::default_config_path()?)?;
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(samples) = args.samples {
        config.sample_count = samples;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.sample_interval_ms = interval_ms;
    }
    if let Some(threshold) = args.threshold {
        config.confidence_threshold = threshold;
    }
    if args.inclusive_threshold {
        config.threshold_rule = ThresholdRule::Inclusive;
    }
    if args.model.is_some() {
        config.model_path = args.model.clone();
    }

    // Handle --insights
    if args.insights {
        let history = HistoryLog::load(&HistoryLog::default_path()?, config.history_limit)?;
        print_insights(&history);
        return Ok(());
    }

    let model_path = config.get_model_path()?;

    info!("Emotion CLI starting...");
    info!("Model: {:?}", model_path);
    info!("Strategy: {:?}", config.strategy);

    // Check if model exists
    if !model_path.exists() {
        error!("Model file not found: {:?}", model_path);
        eprintln!("\nModel file not found: {:?}", model_path);
        eprintln!("\nPlease download a 48x48 grayscale FER emotion model in ONNX format");
        eprintln!("(7 outputs: angry, disgust, fear, happy, sad, surprise, neutral).");
        eprintln!("\nPlace the model file at: {:?}", model_path);
        eprintln!("Or specify a custom path with: --model /path/to/model.onnx");
        return Ok(());
    }

    // Load the classifier
    info!("Loading emotion model...");
    let mut classifier = OnnxClassifier::new(OnnxConfig {
        model_path,
        n_threads: args.threads,
    })?;
    info!("Model loaded successfully");

    // Pick the frame source (--image and --frames are mutually exclusive,
    // enforced by clap)
    let mut available_frames = None;
    let mut source: Box<dyn FrameSource> = match (&args.frames, &args.image) {
        (Some(dir), None) => {
            let replay = FrameDirSource::open(dir)?;
            available_frames = Some(replay.remaining());
            Box::new(replay)
        }
        (None, Some(path)) => Box::new(StillImageSource::open(path)?),
        _ => bail!("Provide a frame source first: --image <file> or --frames <dir>"),
    };

    // Single-sample strategy needs exactly one frame; a replay directory
    // caps the count at however many frames it holds
    let mut sample_count = if config.strategy == Strategy::Single {
        1
    } else {
        config.sample_count
    };
    if let Some(available) = available_frames {
        if available < sample_count {
            info!(
                "Only {} frame(s) available, reducing sample count from {}",
                available, sample_count
            );
            sample_count = available;
        }
    }
    let sampler_config = SamplerConfig::from_ms(sample_count, config.sample_interval_ms);

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_ctrlc = stop_flag.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, stopping...");
        stop_flag_ctrlc.store(true, Ordering::SeqCst);
    });

    // Sample and aggregate
    let samples = collect_samples(&mut source, &mut classifier, &sampler_config, stop_flag).await?;
    if samples.is_empty() {
        bail!("Analysis cancelled before any sample was collected");
    }

    let result = aggregate(&samples, config.strategy, &config.thresholds())?;
    info!(
        "Aggregated {} sample(s): {:?} at {:.3} ({:?})",
        samples.len(),
        result.label,
        result.score,
        result.tier
    );

    // Print result
    println!();
    if result.tier == Tier::Low {
        println!("{}", hints::LOW_CONFIDENCE_MESSAGE);
        println!("{}", hints::LOW_CONFIDENCE_HINT);
    } else {
        println!("Emotion: {} {}", result.label, result.label.emoji());
        println!("Confidence: {:.1}% (High)", result.score * 100.0);
        println!("{}", hints::random_hint(result.label));
    }

    // Record confident results in the history
    if result.tier == Tier::High && !args.no_history {
        let history_path = HistoryLog::default_path()?;
        let mut history = HistoryLog::load(&history_path, config.history_limit)?;
        history.append(HistoryEntry::from_result(&result));
        history.save(&history_path)?;
        print_insights(&history);
    }

    Ok(())
}

fn list_labels_and_exit() -> Result<()> {
    println!("Emotion labels (model output order):\n");
    for label in ALL_LABELS {
        println!("  {} - {} {}", label.index(), label, label.emoji());
    }
    Ok(())
}

fn print_insights(history: &HistoryLog) {
    println!("\n--- Insights ---");
    if history.is_empty() {
        println!("No results recorded yet.");
        return;
    }

    let insights = history.insights();
    if let Some(label) = insights.most_frequent {
        println!("Most frequent: {} {}", label, label.emoji());
    }
    println!(
        "Morning: {}, Afternoon: {}, Evening: {}",
        insights.morning, insights.afternoon, insights.evening
    );

    println!("Recent:");
    for entry in history.recent(10) {
        println!(
            "  {} ({:.1}%) - {}",
            entry.label,
            entry.score * 100.0,
            entry.recorded_at.format("%Y-%m-%d %H:%M")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_and_frames_are_mutually_exclusive() {
        let result =
            Args::try_parse_from(["emotion-cli", "--image", "face.png", "--frames", "burst/"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_single_source_parses() {
        let args = Args::try_parse_from(["emotion-cli", "--image", "face.png"]).unwrap();
        assert_eq!(args.image, Some(PathBuf::from("face.png")));
        assert!(args.frames.is_none());
    }
}
