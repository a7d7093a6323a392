use bevy::prelude::Resource;
use clap::Parser;

#[derive(Parser, Debug, Resource, Clone)]
#[command(name = "shipyard-server")]
#[command(about = "Headless voxel ship simulation host", long_about = None)]
pub struct Args {
    /// Path to the TOML config; a missing file means defaults
    #[arg(long, default_value = "server.toml")]
    pub config: String,
    /// Exit after this many simulation ticks
    #[arg(long)]
    pub ticks: Option<u64>,
}
