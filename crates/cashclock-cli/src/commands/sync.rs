use std::io::Read;

use clap::{Subcommand, ValueEnum};
use cashclock_core::sync::{merged_event, Channel, WriterChannel};
use cashclock_core::{Calculator, Config, Database, PeerLink, SyncError};

use super::load_calculator;

#[derive(Subcommand)]
pub enum SyncAction {
    /// Write the peer message for the current state to stdout
    Send,
    /// Merge a peer message into the local clock
    Receive {
        /// JSON payload, e.g. '{"data":"1x40$x0s=0.00$ (init)"}' (read from stdin if omitted)
        payload: Option<String>,
        /// Delivery path the payload arrived on
        #[arg(long, value_enum, default_value_t = ChannelArg::Message)]
        channel: ChannelArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ChannelArg {
    Message,
    UserInfo,
    ApplicationContext,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Message => Channel::Message,
            ChannelArg::UserInfo => Channel::UserInfo,
            ChannelArg::ApplicationContext => Channel::ApplicationContext,
        }
    }
}

pub fn run(action: SyncAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut calc = load_calculator(&db, &config.clock, Calculator::new());

    match action {
        SyncAction::Send => {
            if !config.sync.enabled {
                return Err(SyncError::Disabled.into());
            }
            // Bring a running clock up to date before it is captured.
            calc.tick();
            let mut link = PeerLink::new(WriterChannel::new(std::io::stdout()));
            if !link.send_snapshot(&calc) {
                return Err(SyncError::ChannelClosed.into());
            }
        }
        SyncAction::Receive { payload, channel } => {
            let raw = match payload {
                Some(payload) => payload,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let value: serde_json::Value = serde_json::from_str(raw.trim())?;
            let link = PeerLink::new(WriterChannel::new(std::io::sink()));
            match link.receive_payload(channel.into(), &value, &mut calc)? {
                Some(decision) => {
                    println!("{}", serde_json::to_string_pretty(&merged_event(&calc, decision))?);
                }
                None => println!("{}", serde_json::to_string_pretty(&calc.status())?),
            }
        }
    }

    db.save_clock(&calc)?;
    Ok(())
}
