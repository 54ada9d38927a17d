mod shell;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Parser, Subcommand};
use serde_json::json;
use shared_logging::LogLevel;
use titanic_analytics::{
    AgeInput, Dashboard, DashboardConfig, LifeboatCount, PassengerClass, PredictionInput, Sex,
    View, ViewRequest,
};

#[derive(Parser, Debug)]
#[command(
    name = "titanic-dash",
    version,
    about = "Titanic case dashboard: survival charts, route map, survival model \
             and lifeboat scenario"
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Passenger CSV, overrides `[dataset] path`.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    /// Output directory, overrides `[output] dir`.
    #[arg(long, global = true)]
    out: Option<PathBuf>,
    /// JSON-lines log file, overrides `[logging] path`.
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lists the available views.
    Views,
    /// Voyage map from Southampton to New York with the sinking point.
    RouteMap,
    /// Survival counts by class and sex plus the age box plot.
    Survival,
    /// Survival probability for one passenger description.
    Predict {
        /// Age in years.
        #[arg(long, default_value_t = 25, value_parser = value_parser!(u8).range(1..=80))]
        age: u8,
        /// `male` or `female`.
        #[arg(long, default_value = "male")]
        sex: Sex,
        /// Travel class.
        #[arg(long, default_value_t = 1, value_parser = value_parser!(u8).range(1..=3))]
        class: u8,
    },
    /// Estimated survival rate for a number of lifeboats.
    Scenario {
        /// Number of lifeboats.
        #[arg(long, default_value_t = 35, value_parser = value_parser!(u8).range(20..=60))]
        lifeboats: u8,
    },
    /// Survival percentage per age group.
    Heatmap,
    /// Renders every view with default widget values.
    All,
    /// Interactive session re-rendering on each command.
    Shell,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if matches!(cli.command, Commands::Views) {
        for view in View::ALL {
            println!("{:<10} {}", view.slug(), view.title());
        }
        return Ok(());
    }

    let dashboard = Dashboard::open(resolve_config(&cli)?)?;
    let out_dir = dashboard.config().output.dir.clone();
    dashboard.telemetry().log(
        LogLevel::Info,
        "cli.command",
        json!({ "command": format!("{:?}", cli.command), "out": out_dir.display().to_string() }),
    )?;

    let requests = match cli.command {
        Commands::Views => Vec::new(),
        Commands::RouteMap => vec![ViewRequest::RouteMap],
        Commands::Survival => vec![ViewRequest::SurvivalAnalysis],
        Commands::Predict { age, sex, class } => {
            vec![ViewRequest::SurvivalPrediction(PredictionInput {
                age: AgeInput::new(age)?,
                sex,
                class: PassengerClass::try_from(class)?,
            })]
        }
        Commands::Scenario { lifeboats } => vec![ViewRequest::ScenarioSimulation {
            lifeboats: LifeboatCount::new(lifeboats)?,
        }],
        Commands::Heatmap => vec![ViewRequest::AgeHeatmap],
        Commands::All => View::ALL.into_iter().map(ViewRequest::default_for).collect(),
        Commands::Shell => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            return shell::run(&dashboard, &out_dir, stdin.lock(), &mut stdout);
        }
    };

    for request in &requests {
        println!("{}\n", shell::render_and_write(&dashboard, request, &out_dir)?);
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(dataset) = &cli.dataset {
        config.dataset.path = dataset.clone();
    }
    if let Some(out) = &cli.out {
        config.output.dir = out.clone();
    }
    if let Some(log) = &cli.log {
        config.logging.path = Some(log.clone());
    }
    Ok(config)
}
