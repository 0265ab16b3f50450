use std::{sync::Arc, time::Duration};

use autoplay_next_controls::{
    COMPONENT_NAME, Control,
    controls::Controls,
    memory::MemoryPlayer,
    models::MediaSource,
    notification::Notification,
    options::ControlOptions,
    player::MediaPlayer,
    rotation::rotate_queue,
};
use clap::{Parser, Subcommand, ValueEnum};
use snafu::prelude::*;
use tokio::sync::{broadcast::Receiver, mpsc::unbounded_channel};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

const SETTLE: Duration = Duration::from_millis(20);

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(short, long)]
    /// Log level (overrides RUST_LOG)
    verbosity: Option<tracing::Level>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach a control to an in-memory player and play through a list of steps
    Run {
        /// Sources in queue order.
        #[clap(required = true)]
        sources: Vec<String>,

        #[clap(short, long, value_enum, value_delimiter = ',')]
        /// Steps to perform, in order.
        steps: Vec<Step>,

        #[clap(long, env = "AUTOPLAY_NEXT_OPTIONS")]
        /// Control options as a JSON object, e.g. '{"replay": false}'.
        options: Option<String>,

        #[clap(long, default_value_t = false)]
        /// Hide the replay affordance once playback ends.
        no_replay: bool,

        #[clap(long, default_value_t = 0)]
        /// Milliseconds the player takes to load a source.
        load_delay_ms: u64,
    },
    /// Print a queue rotated left
    Rotate {
        #[clap(required = true)]
        sources: Vec<String>,

        #[clap(short, long, default_value_t = 1)]
        times: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Step {
    /// Click the toggle.
    Click,
    /// The current item plays to its end.
    Finish,
    Play,
    Pause,
    Seek,
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("{error}"))]
    ControlError { error: String },
    #[snafu(display("Invalid control options: {error}"))]
    OptionsError { error: String },
}

impl From<autoplay_next_controls::error::Error> for Error {
    fn from(error: autoplay_next_controls::error::Error) -> Self {
        Error::ControlError {
            error: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::OptionsError {
            error: error.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Self {
        Error::ControlError {
            error: error.to_string(),
        }
    }
}

pub async fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    let filter = match cli.verbosity {
        Some(level) => EnvFilter::default().add_directive(LevelFilter::from_level(level).into()),
        None => EnvFilter::from_default_env(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run {
            sources,
            steps,
            options,
            no_replay,
            load_delay_ms,
        } => {
            let mut options = match options {
                Some(json) => ControlOptions::from_value(serde_json::from_str(&json)?)?,
                None => ControlOptions::default(),
            };
            if no_replay {
                options.replay = false;
            }

            let queue = sources.iter().map(|s| MediaSource::from(s.as_str())).collect();
            let mut player = MemoryPlayer::new(queue);
            if load_delay_ms > 0 {
                player = player.with_load_delay(Duration::from_millis(load_delay_ms));
            }
            let player = Arc::new(player);

            let control = Arc::new(Control::new(player.clone(), options)?);
            let mut notifications = control.notify_receiver();

            let (tx, rx) = unbounded_channel();
            let controls = Controls::new(tx);
            let handle = tokio::spawn(control.clone().run(rx));

            for step in steps {
                println!("> {step:?}");

                match step {
                    Step::Click => controls.click(),
                    Step::Finish => player.finish(),
                    Step::Play => player.play().await?,
                    Step::Pause => player.pause().await?,
                    Step::Seek => player.seek(),
                }

                settle(&control).await;
                print_notifications(&mut notifications);
            }

            controls.quit();
            handle.await??;

            let visual = control.visual();
            println!("control:   {COMPONENT_NAME}");
            println!("replay:    {}", control.options().replay);
            println!("state:     {}", control.state());
            println!("classes:   {}", visual.classes().join(" "));
            println!("label:     {}", visual.control_text);
            println!("queue:     {}", join(&player.queue()));
            println!("transport:");
            for call in player.transport_log() {
                println!("  {call:?}");
            }

            Ok(())
        }
        Commands::Rotate { sources, times } => {
            let mut queue = sources;
            for _ in 0..times {
                rotate_queue(&mut queue);
            }
            println!("{}", queue.join(" "));
            Ok(())
        }
    }
}

/// Waits for the control loop to catch up with the last step.
async fn settle(control: &Control<MemoryPlayer>) {
    tokio::time::sleep(SETTLE).await;
    while control.is_advancing() {
        tokio::time::sleep(SETTLE).await;
    }
}

fn print_notifications(notifications: &mut Receiver<Notification>) {
    while let Ok(notification) = notifications.try_recv() {
        match notification {
            Notification::Error(error) => println!("  error: {error}"),
            Notification::Warning(error) => println!("  warning: {error}"),
            Notification::Toggled { state } => println!("  auto-advance {state}"),
            Notification::Advanced { source } => println!("  now playing {source}"),
            Notification::Visual { visual } => {
                println!("  [{}] {}", visual.classes().join(" "), visual.control_text)
            }
        }
    }
}

fn join(queue: &[MediaSource]) -> String {
    queue
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
