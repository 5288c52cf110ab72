//! Toolgate operator CLI - main entry point.
//!
//! Inspects the tool record store, invokes and probes tools, and prints the
//! capability set an agent runtime would receive.

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;

use toolgate::tools::{ProbeResult, ToolDefinition};
use toolgate::{Config, ToolId, ToolRegistry};

#[derive(Parser)]
#[command(name = "toolgate")]
#[command(about = "Declarative HTTP tool registry", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "TOOLGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Tool store path (overrides config and TOOLGATE_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Output as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored tools
    List {
        /// Only active tools
        #[arg(long)]
        active: bool,
    },

    /// Show one tool record
    Show {
        /// Tool id
        id: String,
    },

    /// Print the exported capabilities
    Capabilities,

    /// Invoke a tool and print the rendered result
    Invoke {
        /// Tool id
        id: String,

        /// Call parameters as a JSON object
        #[arg(long, default_value = "{}")]
        params: String,
    },

    /// Probe connectivity and record the outcome
    Probe {
        /// Tool id
        #[arg(required_unless_present = "all")]
        id: Option<String>,

        /// Probe every stored tool
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },

    /// Mark a tool active
    Enable {
        /// Tool id
        id: String,
    },

    /// Mark a tool inactive
    Disable {
        /// Tool id
        id: String,
    },

    /// Print the JSON Schema of a tool record
    Schema,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .apply_env()?;
    if let Some(db) = &cli.db {
        config.store.path = db.clone();
    }

    // Initialize observability
    toolgate::observability::init_tracing(&config.observability);

    if let Commands::Schema = cli.command {
        println!("{}", serde_json::to_string_pretty(&ToolDefinition::json_schema())?);
        return Ok(());
    }

    let registry = ToolRegistry::open(&config)?;
    let outcome = run(&registry, cli.command, cli.json).await;
    registry.close()?;
    outcome
}

async fn run(
    registry: &ToolRegistry,
    command: Commands,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::List { active } => {
            let tools = if active {
                registry.store().list_active()?
            } else {
                registry.store().list_all()?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&tools)?);
            } else {
                for tool in &tools {
                    print_tool_line(tool);
                }
            }
        }

        Commands::Show { id } => {
            let tool = registry.store().get(&ToolId::from(id.as_str()))?;
            println!("{}", serde_json::to_string_pretty(&tool)?);
        }

        Commands::Capabilities => {
            let capabilities = registry.capabilities()?;
            if json {
                let listing: Vec<Value> = capabilities
                    .iter()
                    .map(|cap| {
                        serde_json::json!({
                            "name": cap.name(),
                            "description": cap.description(),
                            "input_schema": cap.input_schema(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                for cap in &capabilities {
                    println!("{}\n{}\n", cap.name(), cap.description());
                }
            }
        }

        Commands::Invoke { id, params } => {
            let params: Map<String, Value> = serde_json::from_str(&params)?;
            let text = registry.invoke(&ToolId::from(id.as_str()), params).await;
            println!("{}", text);
        }

        Commands::Probe { id, all } => {
            let results = if all {
                registry.probe_all().await?
            } else {
                let id = id.ok_or("a tool id or --all is required")?;
                vec![registry.probe(&ToolId::from(id.as_str())).await?]
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for result in &results {
                    print_probe_line(result);
                }
            }
        }

        Commands::Enable { id } => {
            registry.store().set_active(&ToolId::from(id.as_str()), true)?;
            println!("✓ {} enabled", id);
        }

        Commands::Disable { id } => {
            registry.store().set_active(&ToolId::from(id.as_str()), false)?;
            println!("✓ {} disabled", id);
        }

        Commands::Schema => {}
    }
    Ok(())
}

fn print_tool_line(tool: &ToolDefinition) {
    let state = if tool.is_active { "active" } else { "inactive" };
    let test = tool
        .test_status
        .map(|s| s.as_str())
        .unwrap_or("untested");
    println!(
        "{:<28} {:<8} {:<6} {:<8} {:<9} {}",
        tool.id.as_str(),
        tool.kind.as_str(),
        tool.method,
        state,
        test,
        tool.name
    );
}

fn print_probe_line(result: &ProbeResult) {
    let mark = if result.success { "✓" } else { "✗" };
    println!("{} {}: {}", mark, result.tool_id, result.message);
}
