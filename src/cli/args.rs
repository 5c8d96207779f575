use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ist-processor")]
#[command(about = "Daily ice surface temperature series from VIIRS netCDF granules")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: ist-processor.toml if present]"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Project root holding data/raw, data/interim and utils/"
    )]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the external download script in the staging directory
    Download,

    /// Move downloaded granules into the raw-data directory
    Stage,

    /// Compute the daily mean and variation series from the raw directory
    Aggregate {
        #[arg(long, help = "Report the number of values above the bound per day")]
        outliers: bool,

        #[arg(long, help = "Compute and print only; write no series files")]
        no_save: bool,

        #[arg(long, help = "Leave malformed granules out instead of stopping")]
        skip_malformed: bool,

        #[arg(long, help = "Print the result as JSON")]
        json: bool,
    },

    /// Download, stage and aggregate in one go
    Run {
        #[arg(long, help = "Use the granules already in the staging directory")]
        skip_download: bool,

        #[arg(long, help = "Report the number of values above the bound per day")]
        outliers: bool,

        #[arg(long, help = "Leave malformed granules out instead of stopping")]
        skip_malformed: bool,
    },

    /// Show which granule represents each day and which days are missing
    Inspect {
        #[arg(long, help = "Print the result as JSON")]
        json: bool,
    },

    /// Display information about a written series file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}
