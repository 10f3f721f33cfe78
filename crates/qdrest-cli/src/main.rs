//! Qdrest CLI - Command-line access to a Qdrant REST endpoint
//!
//! Usage:
//!   qdrest collections list
//!   qdrest collections create <name> --size 384 --distance Dot
//!   qdrest points insert <collection> --vector 0.1,0.2 --payload '{"k":"v"}'
//!   qdrest points search <collection> --vector 0.1,0.2 --limit 3
//!   qdrest config publish config/qdrant.toml
//!   qdrest smoke

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use qdrest_client::provider::publish_config;
use qdrest_client::{
    ClientConfig, JsonMap, PointId, QdrantClient, RawPointId, RecommendOptions, RetrieveOptions,
    ScrollOptions, SearchOptions,
};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qdrest")]
#[command(about = "Qdrant REST client CLI")]
#[command(version)]
struct Cli {
    /// Base URL of the Qdrant REST endpoint (overrides QDRANT_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// API key (overrides QDRANT_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Request timeout in seconds (overrides QDRANT_TIMEOUT)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// TOML config file, applied before environment variables
    #[arg(long = "config", global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage collections
    Collections {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Manage and query points
    Points {
        #[command(subcommand)]
        action: PointAction,
    },
    /// Manage payload indexes
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
    /// Client configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Run a create/insert/delete round trip against the server
    Smoke {
        /// Vector size of the temporary collection
        #[arg(long, default_value_t = 10)]
        size: usize,
    },
}

#[derive(Subcommand)]
enum CollectionAction {
    /// List all collections
    List,
    /// Show collection info
    Get { name: String },
    /// Create a collection
    Create {
        name: String,
        #[arg(long)]
        size: Option<u64>,
        #[arg(long)]
        distance: Option<String>,
        /// Extra collection options as a JSON object
        #[arg(long)]
        options: Option<String>,
    },
    /// Delete a collection
    Delete { name: String },
}

#[derive(Subcommand)]
enum PointAction {
    /// Insert one point
    Insert {
        collection: String,
        /// Integer or UUID; anything else is replaced by a generated UUID
        #[arg(long)]
        id: Option<String>,
        /// Comma-separated floats or a JSON array
        #[arg(long)]
        vector: String,
        /// Payload as a JSON object
        #[arg(long)]
        payload: Option<String>,
    },
    /// Fetch points by id
    Get {
        collection: String,
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        no_payload: bool,
        #[arg(long)]
        no_vector: bool,
    },
    /// Delete points by id
    Delete {
        collection: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Similarity search
    Search {
        collection: String,
        #[arg(long)]
        vector: String,
        #[arg(long, default_value_t = 5)]
        limit: u64,
        #[arg(long)]
        filter: Option<String>,
        /// Extra request fields as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
    /// Recommend from positive/negative examples
    Recommend {
        collection: String,
        #[arg(long, value_delimiter = ',', required = true)]
        positive: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        negative: Vec<String>,
        #[arg(long, default_value_t = 5)]
        limit: u64,
        #[arg(long)]
        filter: Option<String>,
    },
    /// Page through points
    Scroll {
        collection: String,
        #[arg(long, default_value_t = 10)]
        limit: u64,
        #[arg(long)]
        offset: Option<String>,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        with_vector: bool,
    },
    /// Count points
    Count {
        collection: String,
        #[arg(long)]
        filter: Option<String>,
    },
}

#[derive(Subcommand)]
enum IndexAction {
    /// Create a payload index
    Create {
        collection: String,
        field: String,
        /// Type name (keyword, integer, float, geo, text) or a JSON schema object
        schema: String,
    },
    /// Delete a payload index
    Delete { collection: String, field: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default config file
    Publish {
        #[arg(default_value = "config/qdrant.toml")]
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qdrest=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Publish { path, force } => {
                publish_config(&path, force)?;
                println!("Config published to {}", path.display());
            }
            ConfigAction::Show => println!("{config:#?}"),
        },
        Commands::Collections { action } => {
            let client = QdrantClient::new(config)?;
            print_json(&run_collection(&client, action).await?)?;
        }
        Commands::Points { action } => {
            let client = QdrantClient::new(config)?;
            print_json(&run_points(&client, action).await?)?;
        }
        Commands::Index { action } => {
            let client = QdrantClient::new(config)?;
            let result = match action {
                IndexAction::Create {
                    collection,
                    field,
                    schema,
                } => {
                    client
                        .create_field_index(&collection, &field, parse_schema(&schema))
                        .await?
                }
                IndexAction::Delete { collection, field } => {
                    client.delete_field_index(&collection, &field).await?
                }
            };
            print_json(&result)?;
        }
        Commands::Smoke { size } => {
            let client = QdrantClient::new(config)?;
            if !smoke(&client, size).await {
                bail!("smoke test finished with errors");
            }
        }
    }

    Ok(())
}

/// File (if given), then environment, then flags
fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let base = match &cli.config_file {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    let mut config = base.with_env_override()?;

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    tracing::debug!("Using {:?}", config);
    Ok(config)
}

async fn run_collection(client: &QdrantClient, action: CollectionAction) -> anyhow::Result<Value> {
    let result = match action {
        CollectionAction::List => client.list_collections().await?,
        CollectionAction::Get { name } => client.get_collection(&name).await?,
        CollectionAction::Create {
            name,
            size,
            distance,
            options,
        } => {
            let mut options = parse_map(options.as_deref(), "options")?;
            if let Some(size) = size {
                options.insert("size".to_string(), json!(size));
            }
            if let Some(distance) = distance {
                options.insert("distance".to_string(), json!(distance));
            }
            client.create_collection(&name, options).await?
        }
        CollectionAction::Delete { name } => client.delete_collection(&name).await?,
    };
    Ok(result)
}

async fn run_points(client: &QdrantClient, action: PointAction) -> anyhow::Result<Value> {
    let result = match action {
        PointAction::Insert {
            collection,
            id,
            vector,
            payload,
        } => {
            let id = id.map(|s| match s.parse::<u64>() {
                Ok(n) => RawPointId::Integer(n),
                Err(_) => RawPointId::Text(s),
            });
            let vector = parse_vector(&vector)?;
            let payload = parse_map(payload.as_deref(), "payload")?;
            client.insert(&collection, id, vector, payload).await?
        }
        PointAction::Get {
            collection,
            ids,
            no_payload,
            no_vector,
        } => {
            let options = RetrieveOptions {
                with_payload: !no_payload,
                with_vector: !no_vector,
            };
            client
                .get_points(&collection, &parse_ids(&ids)?, options)
                .await?
        }
        PointAction::Delete { collection, ids } => {
            client.delete_points(&collection, &parse_ids(&ids)?).await?
        }
        PointAction::Search {
            collection,
            vector,
            limit,
            filter,
            params,
        } => {
            let options = SearchOptions::default()
                .with_limit(limit)
                .with_filter(parse_map(filter.as_deref(), "filter")?)
                .with_params(parse_map(params.as_deref(), "params")?);
            client
                .search(&collection, &parse_vector(&vector)?, &options)
                .await?
        }
        PointAction::Recommend {
            collection,
            positive,
            negative,
            limit,
            filter,
        } => {
            let options = RecommendOptions::default()
                .with_negative(parse_ids(&negative)?)
                .with_limit(limit)
                .with_filter(parse_map(filter.as_deref(), "filter")?);
            client
                .recommend(&collection, &parse_ids(&positive)?, &options)
                .await?
        }
        PointAction::Scroll {
            collection,
            limit,
            offset,
            filter,
            with_vector,
        } => {
            let options = ScrollOptions {
                limit,
                offset: offset.as_deref().map(parse_id).transpose()?,
                filter: parse_map(filter.as_deref(), "filter")?,
                with_vector,
                ..ScrollOptions::default()
            };
            client.scroll(&collection, &options).await?
        }
        PointAction::Count { collection, filter } => {
            client
                .count(&collection, &parse_map(filter.as_deref(), "filter")?)
                .await?
        }
    };
    Ok(result)
}

/// List, create, get, insert, delete; returns false if any step failed
async fn smoke(client: &QdrantClient, size: usize) -> bool {
    let collection = format!("qdrest_smoke_{}", uuid::Uuid::new_v4().simple());
    let mut ok = true;

    ok &= report("list collections", client.list_collections().await);

    let mut options = JsonMap::new();
    options.insert("size".to_string(), json!(size));
    options.insert("distance".to_string(), json!("Cosine"));
    let created = report(
        &format!("create collection {collection}"),
        client.create_collection(&collection, options).await,
    );

    if !created {
        println!("Skipping further operations due to previous errors.");
        return false;
    }

    ok &= report(
        &format!("get collection {collection}"),
        client.get_collection(&collection).await,
    );

    let vector: Vec<f32> = (0..size).map(|i| (i + 1) as f32 / size as f32).collect();
    let mut payload = JsonMap::new();
    payload.insert("source".to_string(), json!("qdrest_smoke"));
    ok &= report(
        "insert point",
        client
            .insert(&collection, RawPointId::Missing, vector, payload)
            .await,
    );

    ok &= report(
        &format!("delete collection {collection}"),
        client.delete_collection(&collection).await,
    );

    println!(
        "Smoke test against {} finished {}",
        client.config().host,
        if ok { "without errors" } else { "with errors" }
    );
    ok
}

fn report(step: &str, result: qdrest_core::Result<Value>) -> bool {
    println!("{step}...");
    let ok = match result {
        Ok(value) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            );
            true
        }
        Err(e) => {
            println!("Error: {e}");
            false
        }
    };
    println!("{}", "-".repeat(50));
    ok
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_vector(s: &str) -> anyhow::Result<Vec<f32>> {
    let s = s.trim();
    if s.starts_with('[') {
        return serde_json::from_str(s).context("vector must be a JSON array of numbers");
    }

    s.split(',')
        .map(|v| {
            v.trim()
                .parse::<f32>()
                .with_context(|| format!("invalid vector component: {v}"))
        })
        .collect()
}

fn parse_map(s: Option<&str>, what: &str) -> anyhow::Result<JsonMap> {
    let Some(s) = s else {
        return Ok(JsonMap::new());
    };

    match serde_json::from_str::<Value>(s).with_context(|| format!("{what} is not valid JSON"))? {
        Value::Object(map) => Ok(map),
        _ => bail!("{what} must be a JSON object"),
    }
}

fn parse_id(s: &str) -> anyhow::Result<PointId> {
    s.parse::<PointId>().map_err(anyhow::Error::msg)
}

fn parse_ids(ids: &[String]) -> anyhow::Result<Vec<PointId>> {
    ids.iter().map(|s| parse_id(s)).collect()
}

/// JSON objects pass through, anything else is taken as a type name
fn parse_schema(s: &str) -> Value {
    match serde_json::from_str::<Value>(s) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::String(s.to_string()),
    }
}
