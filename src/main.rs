use clap::Parser;
use colored::*;
use eyre::{Result, WrapErr};
use log::{LevelFilter, info};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod cli;

use cli::Cli;
use cli::commands::{Commands, PlanArgs};
use cli::hints::classify;
use cli::input::collect_trip;
use cli::interrupt::{ctrl_c, until_interrupted};
use tripcrew::config::Config;
use tripcrew::crew::{RenderedTask, SequentialEngine, TaskRunner, apply_overrides, quick_tasks, trip_tasks};
use tripcrew::diagnostics::Diagnostics;
use tripcrew::llm::GeminiClient;
use tripcrew::prompt::PromptLoader;
use tripcrew::search::{DisabledGateway, SearchGateway, SerperGateway};
use tripcrew::tools::{ToolRegistry, standard_registry};

const RULE_WIDTH: usize = 60;

fn setup_logging(config: &Config) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripcrew")
        .join("logs");

    fs::create_dir_all(&log_dir).wrap_err("Failed to create log directory")?;

    let log_file = log_dir.join("tripcrew.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .wrap_err("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    let default_level = config
        .log_level
        .as_deref()
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

async fn run_application(cli: &Cli, config: &Config) -> Result<ExitCode> {
    info!("Starting application");

    match &cli.command {
        None => handle_plan_command(&PlanArgs::default(), config).await,
        Some(Commands::Plan(args)) => handle_plan_command(args, config).await,
        Some(Commands::Diagnose) => handle_diagnose_command(config).await,
        Some(Commands::Tools) => handle_tools_command(config),
        Some(Commands::Invoke { tool, args }) => handle_invoke_command(tool, args, config).await,
    }
}

/// Search gateway from config, or one that fails every query when no key is set
fn search_gateway(config: &Config) -> Result<Arc<dyn SearchGateway>> {
    if config.secrets.serper_api_key.is_none() {
        return Ok(Arc::new(DisabledGateway));
    }
    let gateway = SerperGateway::from_config(config).wrap_err("Failed to create search gateway")?;
    Ok(Arc::new(gateway))
}

fn registry(config: &Config) -> Result<ToolRegistry> {
    standard_registry(search_gateway(config)?).wrap_err("Failed to register tools")
}

async fn handle_plan_command(args: &PlanArgs, config: &Config) -> Result<ExitCode> {
    println!("{}", rule());
    println!("{}", "AI Trip Planner".bold());
    println!("{}", rule());

    let stdin = io::stdin();
    let trip = collect_trip(args, &mut stdin.lock(), &mut io::stdout()).wrap_err("Failed to read trip details")?;
    if !trip.is_complete() {
        info!("Incomplete trip details: {:?}", trip.blank_fields());
        eprintln!("{}", "Please provide all required information".red());
        return Ok(ExitCode::FAILURE);
    }

    let missing = config.missing_secrets();
    if !missing.is_empty() {
        eprintln!("{} {}", "Missing API keys:".red(), missing.join(", "));
        eprintln!("Set them in your environment or a .env file, then run `tripcrew diagnose`");
        return Ok(ExitCode::FAILURE);
    }

    let registry = Arc::new(registry(config)?);
    let client = Arc::new(GeminiClient::from_config(config).wrap_err("Failed to create LLM client")?);

    let mut engine = SequentialEngine::new(client, registry.clone(), config);
    if config.crew.verbose {
        engine = engine.with_observer(Box::new(|task: &RenderedTask, output: &str| {
            println!("\n{} {}", "Finished:".green(), task.agent.role.bold());
            println!("{}", output);
        }));
    }
    let runner = TaskRunner::new(registry, Arc::new(engine));

    let tasks = if args.quick { quick_tasks() } else { trip_tasks() };
    let tasks = match &config.prompts.dir {
        Some(dir) => apply_overrides(tasks, &PromptLoader::new(dir)).wrap_err("Failed to load prompt overrides")?,
        None => tasks,
    };

    println!("\n{}", "Planning your trip...".cyan());
    info!("Planning trip: {:?} (quick: {})", trip, args.quick);

    let Some(outcome) = until_interrupted(runner.run(&tasks, &trip), ctrl_c()).await else {
        info!("Planning cancelled by user");
        eprintln!("\n{}", "Cancelled by user".yellow());
        return Ok(ExitCode::from(130));
    };

    match outcome {
        Ok(artifact) => {
            let title = if args.quick { "TRIP RECOMMENDATION" } else { "YOUR TRIP PLAN" };
            println!("\n{}", rule());
            println!("{}", title.green().bold());
            println!("Generated {}", chrono::Local::now().format("%Y-%m-%d %H:%M"));
            println!("{}", rule());
            println!("{}", artifact);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            log::error!("Planning failed: {:?}", e);
            let kind = classify(&e);
            eprintln!("\n{} {}", "Error during execution:".red(), e);
            eprintln!("{}", kind.headline().yellow());
            for (i, step) in kind.steps().iter().enumerate() {
                eprintln!("  {}. {}", i + 1, step);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn handle_diagnose_command(config: &Config) -> Result<ExitCode> {
    println!("{}", "API Connection Diagnostic Tool".bold());
    println!("{}", rule());

    let report = Diagnostics::new(config).run().await;

    for check in &report.checks {
        println!("\n{}", check.name.bold());
        for (i, detail) in check.details.iter().enumerate() {
            let last = i + 1 == check.details.len();
            let line = if last && !check.passed { detail.red() } else { detail.normal() };
            println!("  {}", line);
        }
    }

    println!("\n{}", rule());
    println!("{}", "DIAGNOSTIC SUMMARY".bold());
    println!("{}", rule());
    for check in &report.checks {
        let status = if check.passed { "PASS".green() } else { "FAIL".red() };
        println!("{}: {}", check.name, status);
    }

    if report.all_passed() {
        println!("\n{}", "All tests passed! Your setup should work.".green());
        return Ok(ExitCode::SUCCESS);
    }

    println!("\n{}", "Some tests failed. Fix the issues above before planning a trip.".yellow());
    for (name, steps) in report.hints() {
        println!("\n{} {}", "Fix:".cyan(), name);
        for (i, step) in steps.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
    }
    Ok(ExitCode::FAILURE)
}

fn handle_tools_command(config: &Config) -> Result<ExitCode> {
    let registry = registry(config)?;

    for spec in registry.specs() {
        println!("{}", spec.name.cyan().bold());
        println!("  {}", spec.description);
        for param in &spec.parameters {
            let requirement = match &param.default {
                _ if param.required => "required".to_string(),
                Some(default) => format!("default {}", default),
                None => "optional".to_string(),
            };
            println!(
                "    {} ({}, {}): {}",
                param.name.bold(),
                param.param_type,
                requirement,
                param.description
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_invoke_command(tool: &str, args: &[(String, String)], config: &Config) -> Result<ExitCode> {
    let registry = registry(config)?;
    let args: Map<String, Value> = args
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    match registry.invoke(tool, &args).await {
        Ok(result) => {
            println!("{}:", result.label.bold());
            if result.is_error() {
                println!("{}", result.body.red());
                return Ok(ExitCode::FAILURE);
            }
            println!("{}", result.body);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            if let Some(spec) = registry.spec(tool) {
                eprintln!("Usage: {}", spec.signature());
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_ref()).wrap_err("Failed to load configuration")?;
    if cli.is_verbose() {
        config.crew.verbose = true;
    }

    setup_logging(&config).wrap_err("Failed to setup logging")?;
    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.wrap_err("Application failed")
}
