//! ShelfKV CLI
//!
//! Command-line interface for inspecting and editing a ShelfKV store.

use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shelfkv::{Blob, Config, EngineKind, OpenMode, Shelf, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// ShelfKV CLI
#[derive(Parser, Debug)]
#[command(name = "shelfkv-cli")]
#[command(about = "CLI for the ShelfKV persistent key-value store")]
#[command(version)]
struct Args {
    /// Store file path
    path: String,

    /// Engine flavour: tree, hash or auto
    #[arg(short, long, default_value = "auto")]
    engine: String,

    /// Open without write access
    #[arg(long)]
    read_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the value stored under a key
    Get {
        /// The key to get
        key: String,
    },

    /// Store a value under a key
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// Parse the value as JSON instead of storing it as text
        #[arg(long)]
        json: bool,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Delete a key and print its value
    Pop {
        /// The key to pop
        key: String,
    },

    /// List every key
    Keys,

    /// List every entry
    Items,

    /// Print the number of entries
    Len,

    /// Remove every entry
    Clear,

    /// Print the backing file path
    Path,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,shelfkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> shelfkv::Result<()> {
    let mode = if args.read_only {
        OpenMode::READ_ONLY
    } else {
        OpenMode::READ_WRITE
    };

    let config = Config::builder()
        .path(&args.path)
        .engine(EngineKind::parse(&args.engine)?)
        .mode(mode)
        .build();

    tracing::debug!("ShelfKV CLI v{}", shelfkv::VERSION);

    let mut shelf = Shelf::open(config)?;

    match args.command {
        Commands::Get { key } => println!("{}", shelf.get(key)?),
        Commands::Set { key, value, json } => {
            let value = if json {
                let parsed: serde_json::Value = serde_json::from_str(&value)
                    .map_err(|e| shelfkv::ShelfError::Encoding(e.to_string()))?;
                from_json(parsed)
            } else {
                Value::Text(value)
            };
            shelf.set(key, value)?;
        }
        Commands::Del { key } => shelf.delete(key)?,
        Commands::Pop { key } => println!("{}", shelf.pop(key)?),
        Commands::Keys => {
            for key in shelf.iter_keys()? {
                println!("{}", key?);
            }
        }
        Commands::Items => {
            for item in shelf.iter_items()? {
                let (key, value) = item?;
                println!("{}: {}", key, value);
            }
        }
        Commands::Len => println!("{}", shelf.len()?),
        Commands::Clear => shelf.clear()?,
        Commands::Path => println!("{}", shelf.path()?.display()),
    }

    shelf.close()
}

/// Map parsed JSON onto native values; anything without a native
/// counterpart is kept as a blob
fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(fields) => Value::Map(
            fields
                .into_iter()
                .map(|(k, v)| (Value::Text(k), from_json(v)))
                .collect::<BTreeMap<_, _>>(),
        ),
        other => Value::Blob(Blob::from_json(other)),
    }
}
