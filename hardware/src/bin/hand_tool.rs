//! Bring-up and debugging CLI for the robotic hand.
//!
//! Subcommands:
//! - `pose`: Throw a pose (rock, paper, scissors, bob, reset)
//! - `goal`: Queue a finger position and start moving
//! - `speed`: Set finger speed
//! - `zero`: Declare the current position fully open
//! - `get`: Ask the board to report a value
//! - `ports`: List serial ports
//! - `repl`: Send raw protocol lines interactively

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hardware::hand::{HandSerial, Query, RunState, DEFAULT_BAUD_RATE};
use serialport::SerialPort;
use shared::hand_interface::{Finger, HandActuator};
use shared::moves::Move;
use tracing::info;

const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Robotic hand control tool
#[derive(Parser, Debug)]
#[command(name = "hand_tool")]
#[command(about = "Drive the rock-paper-scissors hand over its serial link")]
#[command(version)]
struct Args {
    /// Serial device of the hand
    #[arg(long, global = true, default_value = DEFAULT_PORT)]
    port: String,

    #[arg(long, global = true, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Seconds to keep listening for status replies before exiting
    #[arg(long, global = true, default_value = "0.5")]
    linger: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Throw a pose
    Pose {
        #[arg(value_enum)]
        pose: PoseArg,
    },

    /// Queue a finger position and start moving
    Goal {
        /// Position from 0.0 (open) to 1.0 (curled)
        fraction: f64,

        /// Finger to move (index, middle, ring, pinky); all when omitted
        #[arg(short, long)]
        finger: Option<Finger>,

        /// Only queue the goal, do not start moving
        #[arg(long)]
        no_move: bool,
    },

    /// Set maximum finger speed
    Speed {
        /// Full open-to-curl travels per second
        travels_per_sec: f64,

        #[arg(short, long)]
        finger: Option<Finger>,
    },

    /// Declare the current position fully open
    Zero,

    /// Ask the board to report a value (pos, speed, goal, state)
    Get {
        query: Query,

        #[arg(short, long)]
        finger: Option<Finger>,
    },

    /// List available serial ports
    Ports,

    /// Interactive shell for raw protocol lines
    Repl,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PoseArg {
    Rock,
    Paper,
    Scissors,
    Bob,
    Reset,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    if args.linger < 0.0 {
        bail!("--linger must not be negative, got {}", args.linger);
    }

    if let Command::Ports = args.command {
        return cmd_ports();
    }

    let mut hand = HandSerial::open(&args.port, args.baud)?;

    match args.command {
        Command::Pose { pose } => cmd_pose(&mut hand, pose),
        Command::Goal {
            fraction,
            finger,
            no_move,
        } => {
            hand.set_goal(finger, fraction)?;
            if !no_move {
                hand.set_running(RunState::Move)?;
            }
            info!("Goal {:.2} queued", fraction);
        }
        Command::Speed {
            travels_per_sec,
            finger,
        } => hand.set_speed(finger, travels_per_sec)?,
        Command::Zero => hand.zero()?,
        Command::Get { query, finger } => hand.query(finger, query)?,
        Command::Repl => return cmd_repl(&mut hand),
        Command::Ports => unreachable!("handled before opening the port"),
    }

    // replies are logged by the status reader thread
    thread::sleep(Duration::from_secs_f64(args.linger));
    Ok(())
}

fn cmd_pose(hand: &mut HandSerial<Box<dyn SerialPort>>, pose: PoseArg) {
    match pose {
        PoseArg::Rock => hand.play(Move::Rock),
        PoseArg::Paper => hand.play(Move::Paper),
        PoseArg::Scissors => hand.play(Move::Scissors),
        PoseArg::Bob => hand.idle_bob(),
        PoseArg::Reset => hand.reset(),
    }
    info!("Sent pose {:?}", pose);
}

fn cmd_ports() -> Result<()> {
    let ports = serialport::available_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{}", port.port_name);
    }
    Ok(())
}

fn cmd_repl(hand: &mut HandSerial<Box<dyn SerialPort>>) -> Result<()> {
    println!("Hand REPL - enter protocol lines or a pose name, 'quit' to exit");
    println!("Examples: 1|GOAL: 2000, A|STATE: MOVE, A|GET: POS, rock, reset");
    println!();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }

        let cmd = input.trim();
        if cmd.is_empty() {
            continue;
        }

        if cmd.eq_ignore_ascii_case("quit") || cmd.eq_ignore_ascii_case("exit") {
            break;
        }

        if let Ok(pose) = PoseArg::from_str(cmd, true) {
            cmd_pose(hand, pose);
            continue;
        }

        if !cmd.contains('|') {
            println!("Error: expected <motor>|<HEADER>: <data> or a pose name");
            continue;
        }

        if let Err(e) = hand.send_raw(cmd) {
            println!("Error: {e}");
        }
    }

    Ok(())
}
