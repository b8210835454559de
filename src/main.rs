use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing_subscriber::EnvFilter;

use gardenkit::config::{self, StorageConfig};
use gardenkit::util::{days_since, format_date, generate_id};
use gardenkit::{ChatContext, ChatQueryArgs, FileStore, GenerateArgs, Plant, PlantStore, ReportClient};

#[derive(Parser)]
#[command(name = "gardenkit")]
#[command(about = "Track garden plants and request landscaping analysis reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the local plant list
    #[command(subcommand)]
    Plants(PlantCommand),
    /// Analyze before/after photos against a task list
    Analyze(AnalyzeArgs),
    /// Ask a follow-up question about a report
    Ask(AskArgs),
}

#[derive(Subcommand)]
enum PlantCommand {
    /// List stored plants
    List,
    /// Add a new plant
    Add(AddPlantArgs),
    /// Record a watering today
    Water { id: String },
    /// Record a fertilizing today
    Fertilize { id: String },
    /// Change a plant's name
    Rename { id: String, name: String },
    /// Remove a plant
    Remove { id: String },
}

#[derive(Args)]
struct AddPlantArgs {
    #[arg(short, long)]
    name: String,
    #[arg(short, long)]
    species: Option<String>,
    #[arg(short, long)]
    location: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    /// Planting date as YYYY-MM-DD
    #[arg(long)]
    planted: Option<String>,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Photo of the site before the work
    #[arg(long)]
    before: PathBuf,
    /// Photo of the site after the work
    #[arg(long)]
    after: Option<PathBuf>,
    /// File with one requested task per line
    #[arg(long)]
    tasks: PathBuf,
    /// File with the contractor's account of the work
    #[arg(long)]
    accomplishments: Option<PathBuf>,
}

#[derive(Args)]
struct AskArgs {
    question: String,
    /// Markdown report to use as context
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gardenkit=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Plants(command) => run_plants(command),
        Commands::Analyze(args) => run_analyze(args).await,
        Commands::Ask(args) => run_ask(args).await,
    }
}

fn run_plants(command: PlantCommand) -> Result<()> {
    let store = FileStore::from_config(&StorageConfig::from_env());
    tracing::debug!("plant storage at {}", store.root().display());
    let plants = PlantStore::new(store);

    match command {
        PlantCommand::List => {
            let list = plants.get_plants()?;
            if list.is_empty() {
                println!("No plants yet");
            }
            for plant in list {
                print_plant(&plant);
            }
        }
        PlantCommand::Add(args) => {
            let mut plant = Plant::new(generate_id(), args.name);
            plant.species = args.species;
            plant.location = args.location;
            plant.notes = args.notes;
            plant.planted_date = args.planted.as_deref().map(parse_day).transpose()?;
            let id = plant.id.clone();
            plants.add_plant(plant)?;
            println!("Added plant {id}");
        }
        PlantCommand::Water { id } => {
            let mut plant = require_plant(&plants, &id)?;
            plant.last_watered = Some(OffsetDateTime::now_utc());
            plants.update_plant(plant)?;
            println!("Watered {id}");
        }
        PlantCommand::Fertilize { id } => {
            let mut plant = require_plant(&plants, &id)?;
            plant.last_fertilized = Some(OffsetDateTime::now_utc());
            plants.update_plant(plant)?;
            println!("Fertilized {id}");
        }
        PlantCommand::Rename { id, name } => {
            let mut plant = require_plant(&plants, &id)?;
            plant.name = name;
            plants.update_plant(plant)?;
            println!("Renamed {id}");
        }
        PlantCommand::Remove { id } => {
            plants.delete_plant(&id)?;
            println!("Removed {id}");
        }
    }

    Ok(())
}

fn require_plant(plants: &PlantStore<FileStore>, id: &str) -> Result<Plant> {
    match plants.find_plant(id)? {
        Some(plant) => Ok(plant),
        None => bail!("No plant with id {id}"),
    }
}

fn print_plant(plant: &Plant) {
    println!("{}  {}", plant.id, plant.name);
    if let Some(species) = &plant.species {
        println!("  species:    {species}");
    }
    if let Some(location) = &plant.location {
        println!("  location:   {location}");
    }
    if let Some(planted) = plant.planted_date {
        println!("  planted:    {}", format_date(planted));
    }
    if let Some(watered) = plant.last_watered {
        println!(
            "  watered:    {} ({} days ago)",
            format_date(watered),
            days_since(watered)
        );
    }
    if let Some(fertilized) = plant.last_fertilized {
        println!(
            "  fertilized: {} ({} days ago)",
            format_date(fertilized),
            days_since(fertilized)
        );
    }
    if let Some(notes) = &plant.notes {
        println!("  notes:      {notes}");
    }
}

fn parse_day(input: &str) -> Result<OffsetDateTime> {
    let date = Date::parse(input, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date '{input}', expected YYYY-MM-DD"))?;
    Ok(date.midnight().assume_utc())
}

async fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let client = ReportClient::from_env()?;

    let before_image = encode_image(&args.before).await?;
    let after_image = match &args.after {
        Some(path) => Some(encode_image(path).await?),
        None => None,
    };
    let requested_tasks = tokio::fs::read_to_string(&args.tasks)
        .await
        .with_context(|| format!("failed to read {}", args.tasks.display()))?;
    let contractor_accomplishments = match &args.accomplishments {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?,
        ),
        None => None,
    };

    let response = client
        .submit_analysis(&GenerateArgs {
            before_image,
            after_image,
            requested_tasks,
            contractor_accomplishments,
        })
        .await?;

    if let Some(error) = response.error {
        tracing::warn!("backend reported: {error}");
    }
    println!("{}", response.report);
    Ok(())
}

async fn run_ask(args: AskArgs) -> Result<()> {
    let client = ReportClient::from_env()?;

    let mut context = ChatContext::default();
    if let Some(path) = &args.report {
        context.full_report = Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?,
        );
    }

    let response = client
        .submit_chat_query(&ChatQueryArgs {
            user_question: args.question,
            before_image: None,
            after_image: None,
            context,
        })
        .await?;

    if let Some(error) = response.error {
        tracing::warn!("backend reported: {error}");
    }
    println!("{}", response.response);
    Ok(())
}

/// Read an image file into a `data:` URL.
async fn encode_image(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(format!(
        "data:{};base64,{}",
        image_mime(path),
        STANDARD.encode(bytes)
    ))
}

fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
