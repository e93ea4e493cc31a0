use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::warn;

use siren_control::{ChannelEvent, ControlChannel, ControlConfig, TransportKind};
use siren_protocol::commands::Command;
use siren_protocol::frame::Frame;
use siren_protocol::machines::MachineId;

#[derive(Parser, Debug)]
#[command(name = "sirenctl", about = "Siren installation management CLI")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/control.toml", global = true)]
    config: PathBuf,

    /// Use the WebSocket tunnel transport instead of direct UDP
    #[arg(long, global = true)]
    tunnel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the machine registry
    Machines,
    /// Send a raw opcode with up to six argument bytes
    Send {
        /// Machine index (0-12)
        machine: u8,
        /// Opcode, decimal or 0x-prefixed hex
        opcode: String,
        /// Argument bytes
        args: Vec<u8>,
    },
    /// Ask a machine for its synchronization state
    Sync { machine: u8 },
    /// Load a playlist by index
    List { machine: u8, index: u8 },
    /// Start playback
    Start { machine: u8 },
    /// Stop playback
    Stop { machine: u8 },
    /// Reset the player
    Reset { machine: u8 },
    /// Enable or disable playlist looping
    Loop { machine: u8, enabled: bool },
    /// Enable or disable reverse playback
    Reverse { machine: u8, enabled: bool },
    /// Set playback speed
    Speed { machine: u8, speed: i8 },
    /// Set transposition in semitones
    Transpose { machine: u8, semitones: i8 },
    /// Set a machine's volume
    Volume { machine: u8, volume: u8 },
    /// Mute or unmute a machine
    Mute { machine: u8, muted: bool },
    /// Installation-wide volume (always addressed to the control host)
    GlobalVolume { volume: u8 },
    /// Print inbound datagrams as they arrive
    Listen {
        /// Stop after this many seconds (0 = run until interrupted)
        #[arg(long, default_value_t = 0)]
        seconds: u64,
    },
}

fn machine(index: u8) -> anyhow::Result<MachineId> {
    MachineId::from_u8(index)
        .with_context(|| format!("machine index {} out of range (0-12)", index))
}

fn parse_opcode(s: &str) -> anyhow::Result<Command> {
    let value = if let Some(hex) = s.strip_prefix("0x") {
        u8::from_str_radix(hex, 16)?
    } else {
        s.parse::<u8>()?
    };
    Command::from_u8(value).with_context(|| format!("unknown opcode 0x{:02X}", value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Commands::Machines = args.command {
        println!("Machines");
        println!("══════════════════════════════");
        for m in MachineId::ALL {
            println!(
                "  {:>2}  {:<16} {:<15} ssh:{} ftp:{}",
                m as u8,
                m.name(),
                m.address(),
                m.ssh_credentials().username,
                m.ftp_credentials().username,
            );
        }
        return Ok(());
    }

    let mut config = ControlConfig::load(&args.config).await?;
    if args.tunnel {
        config.network.transport = TransportKind::Tunnel;
    }

    let (mut channel, mut events) = ControlChannel::new(&config);
    channel.initialize().await;
    if !channel.is_connected() {
        // The start failure detail arrives as an Error event
        while let Ok(event) = events.try_recv() {
            if let ChannelEvent::Error(msg) = event {
                bail!("transport failed to start: {}", msg);
            }
        }
        bail!("transport failed to start");
    }

    match args.command {
        Commands::Machines => unreachable!(), // handled above
        Commands::Send {
            machine: index,
            opcode,
            args: data,
        } => {
            let cmd = parse_opcode(&opcode)?;
            channel
                .send_command_to_machine(machine(index)?, cmd, &data)
                .await;
        }
        Commands::Sync { machine: index } => channel.ask_synchro(machine(index)?).await,
        Commands::List {
            machine: index,
            index: list,
        } => channel.new_list(machine(index)?, list).await,
        Commands::Start { machine: index } => channel.start(machine(index)?).await,
        Commands::Stop { machine: index } => channel.stop(machine(index)?).await,
        Commands::Reset { machine: index } => channel.reset(machine(index)?).await,
        Commands::Loop {
            machine: index,
            enabled,
        } => channel.set_loop(machine(index)?, enabled).await,
        Commands::Reverse {
            machine: index,
            enabled,
        } => channel.set_reverse(machine(index)?, enabled).await,
        Commands::Speed {
            machine: index,
            speed,
        } => channel.set_speed(machine(index)?, speed).await,
        Commands::Transpose {
            machine: index,
            semitones,
        } => channel.set_transpose(machine(index)?, semitones).await,
        Commands::Volume {
            machine: index,
            volume,
        } => channel.set_volume(machine(index)?, volume).await,
        Commands::Mute {
            machine: index,
            muted,
        } => channel.set_mute(machine(index)?, muted).await,
        Commands::GlobalVolume { volume } => channel.set_global_volume(volume).await,
        Commands::Listen { seconds } => {
            listen(&mut events, seconds).await;
        }
    }

    // Surface anything the send raised before exiting
    while let Ok(event) = events.try_recv() {
        if let ChannelEvent::Error(msg) = event {
            warn!("{}", msg);
        }
    }

    channel.disconnect().await;
    Ok(())
}

async fn listen(events: &mut tokio::sync::mpsc::Receiver<ChannelEvent>, seconds: u64) {
    println!("Listening for inbound datagrams (Ctrl-C to stop)...");

    let deadline = (seconds > 0).then(|| tokio::time::Instant::now() + Duration::from_secs(seconds));

    loop {
        let event = if let Some(deadline) = deadline {
            match tokio::time::timeout_at(deadline, events.recv()).await {
                Ok(event) => event,
                Err(_) => return, // deadline passed
            }
        } else {
            tokio::select! {
                event = events.recv() => event,
                _ = tokio::signal::ctrl_c() => return,
            }
        };

        let Some(event) = event else { return };
        match event {
            ChannelEvent::DataReceived {
                data,
                from_address,
                from_port,
            } => {
                let decoded = Frame::parse(&data)
                    .map(|f| match f.command() {
                        Some(cmd) => format!("{:?} {:02X?}", cmd, f.args),
                        None => format!("opcode 0x{:02X} {:02X?}", f.opcode, f.args),
                    })
                    .unwrap_or_else(|| "not a frame".to_string());
                println!(
                    "  {}:{}  {}  [{}]",
                    from_address,
                    from_port,
                    hex::encode(&data),
                    decoded
                );
            }
            ChannelEvent::ConnectionChanged(up) => {
                println!("  connection: {}", if up { "up" } else { "down" });
                if !up {
                    return;
                }
            }
            ChannelEvent::Error(msg) => warn!("{}", msg),
            _ => {}
        }
    }
}
