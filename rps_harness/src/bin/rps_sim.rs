use clap::Parser;
use rps_harness::{run_session, BotConfig, SessionConfig, TestMotions};
use shared::config_storage::ConfigStorage;
use shared::moves::Move;

/// Command line arguments for the session simulator
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Simulate rock-paper-scissors rounds against a synthetic player",
    long_about = "Runs the bot (motion estimator and game controller) against a synthetic \
        hand motion on a simulated clock and prints the resulting state transitions and \
        round results. Useful for:\n  \
        - Checking the shoot timing for different bob periods\n  \
        - Tuning estimator and controller parameters without hardware\n  \
        - Trying stored configurations before using them live"
)]
struct Args {
    #[arg(
        short,
        long,
        default_value = "chant",
        help = "Motion pattern type",
        long_help = "Synthetic hand motion. Available patterns:\n  \
            - chant: rest, raise, three and a half bobs, hold low at the shoot\n  \
            - steady: endless sinusoidal bobbing\n  \
            - still: hand held at mid height"
    )]
    motion: String,

    #[arg(short, long, default_value_t = 0.8, help = "Bob period in seconds")]
    period: f64,

    #[arg(short = 't', long, default_value_t = 10.0, help = "Simulation duration in seconds")]
    duration: f64,

    #[arg(long, default_value_t = 30.0, help = "Simulated frame rate in Hz")]
    fps: f64,

    #[arg(
        long,
        default_value = "rock",
        help = "Gesture the player shows after the shoot (rock, paper, scissors, none)"
    )]
    player: String,

    #[arg(long, default_value_t = 0.0, help = "Height noise standard deviation")]
    noise: f64,

    #[arg(long, default_value_t = 0.0, help = "Probability of a frame without a height")]
    dropout: f64,

    #[arg(long, default_value_t = 7, help = "Seed for noise and move choice")]
    seed: u64,

    #[arg(
        long,
        help = "Actuation lead time in seconds",
        long_help = "Overrides the controller's actuation lead: how long before the shoot \
            the move is commanded to hide the hand's mechanical latency."
    )]
    lead: Option<f64>,

    #[arg(
        long,
        help = "Load the named bot config from ~/.rps_config",
        long_help = "Name of a bot configuration stored in ~/.rps_config/. Defaults are used \
            when omitted. Command line overrides are applied on top."
    )]
    config: Option<String>,

    #[arg(long, help = "Save the effective bot config under this name")]
    save_config: Option<String>,

    #[arg(long, help = "Print the full report as JSON")]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let storage = ConfigStorage::default();
    let mut config = match &args.config {
        Some(name) => BotConfig::load(&storage, name)?
            .ok_or_else(|| format!("No stored config named {name:?}"))?,
        None => BotConfig::default(),
    };
    if let Some(lead) = args.lead {
        config.game.actuation_lead_secs = lead;
    }
    config.validate()?;

    if let Some(name) = &args.save_config {
        let path = config.save(&storage, name)?;
        println!("Config saved to {}", path.display());
    }

    let motion = TestMotions::get_motion(&args.motion, args.period).ok_or_else(|| {
        format!(
            "Unknown motion type: {} (expected one of {:?})",
            args.motion,
            TestMotions::NAMES
        )
    })?;

    let player_move = match Move::from_label(&args.player) {
        Move::Unknown => None,
        mv => Some(mv),
    };

    let session = SessionConfig {
        fps: args.fps,
        duration_secs: args.duration,
        player_move,
        noise_sigma: args.noise,
        dropout_rate: args.dropout,
        seed: args.seed,
        ..Default::default()
    };

    println!("RPS Session Simulation");
    println!("======================");
    println!("Motion type: {} (period {:.2}s)", args.motion, args.period);
    println!("Duration: {} seconds at {} Hz", args.duration, args.fps);

    let report = run_session(&config, motion, &session)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }

    Ok(())
}
