//! Developer CLI for inspecting and editing a well store file.
//!
//! # Responsibility
//! - Drive every well store operation from the shell.
//! - Print results as JSON so output can be piped into other tools.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use wellstore_core::{
    core_version, default_log_level, init_logging, ping, StorageLayout, WellData, WellId,
    WellStore, WellStoreConfig,
};

#[derive(Parser)]
#[command(name = "wellstore", version, about = "Inspect and edit a well store")]
struct Cli {
    /// SQLite file holding the store (defaults to WELLSTORE_DB_PATH or a temp file).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Preference namespace (defaults to WELLSTORE_NAMESPACE or `well_data_store`).
    #[arg(long, global = true)]
    namespace: Option<String>,

    #[arg(long, global = true, value_enum)]
    layout: Option<LayoutArg>,

    /// Absolute directory for log files; logging stays off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Mirrored,
    Canonical,
}

impl From<LayoutArg> for StorageLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Mirrored => StorageLayout::Mirrored,
            LayoutArg::Canonical => StorageLayout::Canonical,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print core linkage info.
    Ping,
    /// Insert or replace one record given as a JSON object.
    Put {
        #[arg(long)]
        id: Option<WellId>,
        record: String,
    },
    Get {
        id: WellId,
    },
    Delete {
        id: WellId,
    },
    /// Print the observed list.
    List,
    /// Overwrite the observed list with a JSON array.
    SaveList {
        records: String,
    },
    /// Remove all stored well data.
    Reset,
    /// Print the observed list on every change.
    Watch {
        /// Stop after this many values.
        #[arg(long)]
        count: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    if let Command::Ping = cli.command {
        println!("wellstore_core ping={}", ping());
        println!("wellstore_core version={}", core_version());
        return Ok(());
    }

    let mut config = WellStoreConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(namespace) = cli.namespace {
        config.namespace = namespace;
    }
    if let Some(layout) = cli.layout {
        config.layout = layout.into();
    }
    let store = WellStore::open(&config)?;

    match cli.command {
        Command::Ping => {}
        Command::Put { id, record } => {
            let record = WellData::from_json(&record)?;
            store.upsert(id.or(record.id), record).await?;
        }
        Command::Get { id } => match store.get_by_id(id).await? {
            Some(well) => println!("{}", well.to_json()?),
            None => println!("null"),
        },
        Command::Delete { id } => store.delete_by_id(id).await?,
        Command::List => println!("{}", serde_json::to_string(&store.list_snapshot()?)?),
        Command::SaveList { records } => {
            let records: Vec<WellData> = serde_json::from_str(&records)?;
            store.save_list(records).await?;
        }
        Command::Reset => store.reset().await?,
        Command::Watch { count } => {
            let mut watcher = store.observe_list();
            let mut seen = 0;
            while count.map_or(true, |limit| seen < limit) {
                let wells = watcher.next().await?;
                println!("{}", serde_json::to_string(&wells)?);
                seen += 1;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn put_accepts_optional_id_and_global_flags() {
        let cli = Cli::parse_from([
            "wellstore",
            "put",
            "--id",
            "3",
            r#"{"name":"A"}"#,
            "--layout",
            "canonical",
        ]);
        assert!(matches!(cli.command, Command::Put { id: Some(3), .. }));
        assert!(cli.layout.is_some());
    }
}
