//! CLI command definitions using clap.
//!
//! - plan: gather trip details and run the planning crew
//! - diagnose: check connectivity and API keys
//! - tools: list the registered tools
//! - invoke: run a single tool

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tripcrew - plan a trip with a crew of LLM agents backed by web search
#[derive(Parser, Debug)]
#[command(name = "tripcrew")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print each task's output as it completes
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (defaults to an interactive `plan`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan a trip; missing details are asked for interactively
    Plan(PlanArgs),

    /// Check internet access and both API keys
    Diagnose,

    /// List the available tools and their parameters
    Tools,

    /// Invoke one tool directly
    Invoke {
        /// Tool name (see `tripcrew tools`)
        tool: String,

        /// Arguments as key=value pairs
        #[arg(value_parser = parse_key_val)]
        args: Vec<(String, String)>,
    },
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct PlanArgs {
    /// Where you are traveling from (e.g. "New York")
    #[arg(long)]
    pub origin: Option<String>,

    /// Cities you are considering (e.g. "Paris, Tokyo")
    #[arg(long)]
    pub cities: Option<String>,

    /// When you are traveling (e.g. "June 2024")
    #[arg(long = "dates")]
    pub date_range: Option<String>,

    /// Your interests (e.g. "food, museums")
    #[arg(long)]
    pub interests: Option<String>,

    /// Only recommend a city instead of building the full itinerary
    #[arg(short, long)]
    pub quick: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
