//! repcoach CLI
//!
//! Usage:
//!   repcoach --replay frames.jsonl --exercise squat   # Replay recorded pose frames
//!   repcoach --replay - < frames.jsonl                # Same, from stdin
//!   repcoach --demo --exercise bicep_curl             # Synthetic set
//!   repcoach --serve                                  # HTTP API server
//!   repcoach --replay frames.jsonl --json             # JSON output

use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use repcoach::core::synth::demo_sequence;
use repcoach::core::{run_server, save_summary, CoachSession, SpeechSink};
use repcoach::types::{AnalysisFrame, ExerciseKind, FeedbackMessage, PoseFrame, SessionSummary};
use repcoach::{EngineConfig, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "repcoach",
    version = VERSION,
    about = "repcoach - Count exercise reps and score form from pose landmarks",
    long_about = "repcoach consumes 33-point pose landmark frames, calibrates to the\n\
                  user's own range of motion, counts repetitions and scores posture.\n\n\
                  Modes:\n  \
                  --replay <file>  Replay JSON-lines PoseFrames ('-' for stdin)\n  \
                  --demo           Run a synthetic set\n  \
                  --serve          HTTP API server mode\n\n\
                  States:\n  \
                  UNSET - Calibrated, waiting for the first extended position\n  \
                  UP    - Extended\n  \
                  DOWN  - Contracted, rep counted on entry"
)]
struct Args {
    /// JSON-lines file of pose frames ('-' reads stdin)
    #[arg(short, long)]
    replay: Option<String>,

    /// Run a synthetic set for the chosen exercise
    #[arg(short, long)]
    demo: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Exercise identifier (squat, push_up, deadlift, lunge, shoulder_press, bicep_curl, lateral_raise)
    #[arg(short, long, default_value = "squat")]
    exercise: String,

    /// Output as JSON lines
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show joint angles and debug logs
    #[arg(long)]
    verbose: bool,

    /// Start with speech output disabled
    #[arg(long)]
    no_voice: bool,

    /// Directory for session summaries (default: ./summaries)
    #[arg(long, default_value = "./summaries")]
    summary_dir: String,

    /// Do not save a summary when the set ends
    #[arg(long)]
    no_summary: bool,

    /// Engine configuration (TOML)
    #[arg(long, env = "REPCOACH_CONFIG")]
    config: Option<String>,
}

/// Prints spoken cues to stderr in place of a TTS engine
struct ConsoleSink;

impl SpeechSink for ConsoleSink {
    fn say(&self, message: &FeedbackMessage) {
        eprintln!("{} {}", "say:".magenta(), message.text);
    }

    fn cancel_all(&self) {}
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(1);
        }
    };

    let result = if args.serve {
        run_serve(&args, config).await
    } else if args.demo {
        run_demo(&args, &config)
    } else {
        let source = args.replay.clone().unwrap_or_else(|| "-".to_string());
        run_replay(&source, &args, &config)
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs to stderr so stdout stays machine-readable
fn init_tracing(verbose: bool) {
    let default = if verbose { "repcoach=debug" } else { "repcoach=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

fn load_config(args: &Args) -> repcoach::Result<EngineConfig> {
    match &args.config {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

fn new_session(args: &Args, config: &EngineConfig) -> CoachSession {
    let exercise = ExerciseKind::parse_or_general(&args.exercise);
    let mut session = CoachSession::with_sink(exercise, config, Box::new(ConsoleSink));
    session.set_voice_enabled(!args.no_voice);
    session
}

/// Replay recorded frames; unparseable lines are logged and skipped
fn run_replay(source: &str, args: &Args, config: &EngineConfig) -> repcoach::Result<()> {
    let reader: Box<dyn BufRead> = if source == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(source)?))
    };

    let mut session = new_session(args, config);
    print_header(&format!("Replay ({})", session.profile().display_name), args);

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match PoseFrame::from_json_line(line) {
            Ok(frame) => {
                if let Some(analysis) = session.process_frame(&frame) {
                    print_frame(&analysis, args)?;
                }
            }
            Err(e) => warn!(line = index + 1, error = %e, "skipping unparseable frame"),
        }
    }

    finish(&mut session, args)
}

fn run_demo(args: &Args, config: &EngineConfig) -> repcoach::Result<()> {
    let mut session = new_session(args, config);
    print_header(&format!("Demo ({})", session.profile().display_name), args);

    for frame in demo_sequence(session.exercise(), 30, 12_000) {
        if let Some(analysis) = session.process_frame(&frame) {
            print_frame(&analysis, args)?;
        }
    }

    finish(&mut session, args)
}

fn finish(session: &mut CoachSession, args: &Args) -> repcoach::Result<()> {
    let summary = session.stop();

    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        print_summary(&summary);
    }

    if !args.no_summary {
        let path = save_summary(&summary, &args.summary_dir)?;
        if !args.json {
            println!("{} {}", "Summary saved:".cyan(), path);
        }
    }
    Ok(())
}

fn print_header(mode: &str, args: &Args) {
    if args.json {
        return;
    }
    let title = format!("repcoach v{} - {}", VERSION, mode);
    let bar = "═".repeat(title.chars().count() + 4);
    println!("{}", format!("╔{}╗", bar).bold());
    println!("{}", format!("║  {}  ║", title).bold());
    println!("{}", format!("╚{}╝", bar).bold());
    println!();
}

fn print_frame(analysis: &AnalysisFrame, args: &Args) -> repcoach::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string(analysis)?);
        return Ok(());
    }

    if args.no_color {
        println!("{}", analysis.to_parseable_string());
    } else {
        println!("{}", analysis.to_terminal_string());
    }

    if args.verbose {
        let angles: Vec<String> = analysis
            .joint_angles
            .iter()
            .map(|(joint, degrees)| format!("{}={:.1}", joint, degrees))
            .collect();
        println!("{}", format!("   angles: {}", angles.join(" ")).dimmed());
        println!("{}", format!("   reason: {}", analysis.reason.description()).dimmed());
        if let Some(thresholds) = analysis.thresholds {
            println!(
                "{}",
                format!("   thresholds: down={:.1} up={:.1}", thresholds.down, thresholds.up).dimmed()
            );
        }
    }

    if analysis.rep_completed {
        println!("{}", format!("  ✓ REP {}", analysis.rep_count).green().bold());
    }
    Ok(())
}

fn print_summary(summary: &SessionSummary) {
    println!();
    println!("{}", "┌─ Set summary ─────────────────────────".bold());
    println!("│ Exercise:  {}", summary.exercise_type);
    println!("│ Reps:      {}", summary.rep_count.to_string().green().bold());
    match summary.form_score_avg {
        Some(avg) => println!("│ Form:      {:.0}/100", avg),
        None => println!("│ Form:      -"),
    }
    if let Some(rom) = summary.range_of_motion {
        println!("│ Range:     {:.1}° - {:.1}° ({:.1}°)", rom.min, rom.max, rom.span());
    }
    println!(
        "│ Tempo:     {:?} (avg {:.0}°/s, max {:.0}°/s)",
        summary.tempo, summary.avg_velocity_deg_per_sec, summary.max_velocity_deg_per_sec
    );
    println!(
        "│ Frames:    {} analyzed, {} skipped over {:.1}s",
        summary.frames_processed,
        summary.frames_skipped,
        summary.duration_ms as f64 / 1000.0
    );
    println!("{}", "└───────────────────────────────────────".bold());
}

/// Run HTTP API server
async fn run_serve(args: &Args, config: EngineConfig) -> repcoach::Result<()> {
    println!();
    print_header("API Server", args);

    let summary_dir = (!args.no_summary).then(|| args.summary_dir.clone());
    run_server(&args.addr, config, summary_dir).await
}
