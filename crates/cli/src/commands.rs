pub mod assemble;
pub mod dimensions;
pub mod reconcile;
pub mod transition;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use courier_core::OrderId;
use courier_orders::OrderStatus;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Delivery order lifecycle tools.")]
pub struct CommandLine {
    /// Human-readable logs instead of JSON
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a new order from a creation request and a company pickup location
    #[command(alias = "a")]
    Assemble {
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        pickup: PathBuf,
    },
    /// Turn a sparse update request into the delta to persist
    #[command(alias = "r")]
    Reconcile {
        #[arg(long)]
        order_id: OrderId,
        #[arg(long)]
        request: PathBuf,
    },
    /// Move a persisted order to a new status
    #[command(alias = "t")]
    Transition {
        #[arg(long)]
        order: PathBuf,
        #[arg(long)]
        status: OrderStatus,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Encode or decode a package dimensions blob
    #[command(alias = "d")]
    #[command(subcommand)]
    Dimensions(DimensionsCommand),
}

#[derive(Subcommand)]
pub enum DimensionsCommand {
    /// Encode the given sides (centimeters)
    Encode {
        #[arg(long)]
        length: Option<f64>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        /// Treat missing sides as zero and always write all three
        #[arg(long)]
        complete: bool,
    },
    /// Decode a stored blob
    Decode { blob: String },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
