use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use intervals_core::session::{self, Session};
use intervals_core::{
    list_ports, select_port, ConfigManager, JsonFileStore, MidiModule, Player, RngSource,
    RoundController, ScoreLedger, Settings, TrainerCommand,
};

mod display;
mod keyboard;

/// Interval ear trainer: listen to two notes, play them back on your keyboard.
#[derive(Parser, Debug)]
#[command(name = "intervals")]
#[command(about = "Interval ear trainer over MIDI")]
struct Args {
    /// Path to the configuration file (default: ~/.intervals/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Substring of the MIDI input port to use, overriding the config file
    #[arg(long)]
    input: Option<String>,

    /// Substring of the MIDI output port to use, overriding the config file
    #[arg(long)]
    output: Option<String>,

    /// List MIDI ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Print per-interval statistics and exit
    #[arg(long)]
    stats: bool,

    /// Zero all statistics and exit
    #[arg(long)]
    reset_scores: bool,
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    // Raw mode needs explicit carriage returns
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}\r",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let mut config = ConfigManager::new(args.config.clone());
    let mut settings = config
        .load()
        .with_context(|| format!("loading {}", config.config_path().display()))?;
    if args.input.is_some() {
        settings.midi_input_port = args.input.clone();
    }
    if args.output.is_some() {
        settings.midi_output_port = args.output.clone();
    }

    if args.list_ports {
        return print_ports(&settings);
    }

    let store = match &settings.score_dir {
        Some(dir) => JsonFileStore::new(dir.clone()),
        None => JsonFileStore::default_location()?,
    };

    if args.reset_scores {
        let mut ledger = ScoreLedger::load(store);
        ledger.reset()?;
        println!("Scores reset");
        return Ok(());
    }

    if args.stats {
        let ledger = ScoreLedger::load(store);
        print!("{}", display::stats_table(ledger.scores()));
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(train(settings, store))
}

fn print_ports(settings: &Settings) -> Result<(), anyhow::Error> {
    let ports = list_ports()?;
    let chosen_in = select_port(&ports.inputs, &settings.input_selection());
    let chosen_out = select_port(&ports.outputs, &settings.output_selection());

    println!("MIDI inputs:");
    for (i, name) in ports.inputs.iter().enumerate() {
        let marker = if Some(i) == chosen_in { "*" } else { " " };
        println!(" {} {}: {}", marker, i, name);
    }
    println!("MIDI outputs:");
    for (i, name) in ports.outputs.iter().enumerate() {
        let marker = if Some(i) == chosen_out { "*" } else { " " };
        println!(" {} {}: {}", marker, i, name);
    }
    Ok(())
}

async fn train(settings: Settings, store: JsonFileStore) -> Result<(), anyhow::Error> {
    let (tx, rx) = session::channel();

    let mut midi = MidiModule::new(settings.input_selection(), settings.output_selection());
    let sink = midi.connect(tx.clone())?;

    let controller = RoundController::from_settings(&settings, RngSource::from_os(), store);
    let player = Player::from_settings(sink, &settings);
    let handle = Session::start(controller, player, tx.clone(), rx);

    println!("Space: new interval   r: replay   q: quit");
    println!(
        "Play note {} on your keyboard to hear the interval again",
        settings.replay_pitch
    );

    let keyboard = keyboard::KeyboardInput::start(tx)?;
    handle.send(TrainerCommand::NewProblem).await;

    let mut snapshots = handle.snapshots();
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        display::render_status(&snapshot)?;
    }

    drop(keyboard);
    println!();
    handle.stop().await;
    midi.disconnect();
    Ok(())
}
