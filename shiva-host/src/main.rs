use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossbeam_channel::select;
use shiva_host::config::DEFAULT_PORT;
use shiva_host::{
    ports, ConnectionConfig, ConsoleListener, LinkEvent, NotificationHub, OutputFormat, Shiva,
};
use shiva_protocol::{sounds, Channel, Sound, DEFAULT_BAUD_RATE};

#[derive(Parser)]
#[command(name = "shiva", version, about = "Configure and monitor a Shiva trigger board")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List serial ports
    Ports,
    /// List drum sounds and their MIDI notes
    Sounds,
    /// Print channel feedback as it arrives
    Monitor {
        #[command(flatten)]
        link: LinkArgs,
        /// One JSON object per event
        #[arg(long)]
        json: bool,
        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Turn feedback streaming on or off
    Feedback {
        #[command(flatten)]
        link: LinkArgs,
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Set the sound played by a channel
    Sound {
        #[command(flatten)]
        link: LinkArgs,
        #[arg(short, long, default_value = "all", allow_hyphen_values = true)]
        channel: Channel,
        /// Drum name or MIDI note
        #[arg(default_value = sounds::DEFAULT_SOUND)]
        sound: Sound,
    },
    /// Set trigger and off thresholds
    Threshold {
        #[command(flatten)]
        link: LinkArgs,
        #[arg(short, long, default_value = "all", allow_hyphen_values = true)]
        channel: Channel,
        #[arg(long)]
        trigger: Option<i64>,
        #[arg(long)]
        off: Option<i64>,
    },
}

#[derive(Args)]
struct LinkArgs {
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,
}

impl LinkArgs {
    fn open(&self) -> Result<Shiva> {
        let config = ConnectionConfig::new(&self.port).with_baud_rate(self.baud);
        let mut shiva = Shiva::new();
        shiva
            .connect(&config)
            .with_context(|| format!("Failed to open {}", self.port))?;
        Ok(shiva)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Commands::Ports => {
            for port in ports::list_ports().context("Failed to list serial ports")? {
                println!("{}", port);
            }
        }
        Commands::Sounds => {
            for (name, code) in sounds::DRUMS {
                println!("{:>3}  {}", code, name);
            }
        }
        Commands::Monitor {
            link,
            json,
            duration,
        } => {
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Plain
            };
            monitor(&link, format, duration.map(Duration::from_secs))?;
        }
        Commands::Feedback { link, state } => {
            let shiva = link.open()?;
            match state {
                Toggle::On => shiva.enable_feedback()?,
                Toggle::Off => shiva.disable_feedback()?,
            }
        }
        Commands::Sound {
            link,
            channel,
            sound,
        } => {
            link.open()?.set_sound(channel, sound)?;
        }
        Commands::Threshold {
            link,
            channel,
            trigger,
            off,
        } => {
            if trigger.is_none() && off.is_none() {
                anyhow::bail!("Nothing to set: pass --trigger and/or --off");
            }
            link.open()?.set_thresholds(channel, trigger, off)?;
        }
    }

    Ok(())
}

fn monitor(link: &LinkArgs, format: OutputFormat, duration: Option<Duration>) -> Result<()> {
    let hub = Arc::new(NotificationHub::new());
    hub.register(Arc::new(ConsoleListener::new(format)));

    let mut shiva = link.open()?;
    let link_events = shiva.start_feedback(hub)?;

    // Set up signal handler for graceful shutdown
    let (interrupt_tx, interrupt_rx) = crossbeam_channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.try_send(());
    })?;

    let deadline = duration.map(|d| Instant::now() + d);
    let timeout = deadline.map_or_else(crossbeam_channel::never, crossbeam_channel::at);

    loop {
        select! {
            recv(link_events) -> event => match event {
                Ok(LinkEvent::Established) => log::info!("Feedback enabled"),
                Ok(LinkEvent::Lost(reason)) => {
                    if let Some(reason) = reason {
                        log::error!("Board disconnected: {}", reason);
                    }
                    break;
                }
                Err(_) => break,
            },
            recv(interrupt_rx) -> _ => {
                log::info!("Received interrupt signal, shutting down...");
                break;
            }
            recv(timeout) -> _ => break,
        }
    }

    if shiva.is_connected() {
        shiva.disable_feedback()?;
    }
    shiva.close();
    Ok(())
}
