//! CLI Tooling
//!
//! Command-line interface for the drive client. Each invocation builds one
//! [`Drive`] session; the item list is carried between invocations by the
//! session snapshot, which is loaded on start and re-exported after every
//! command that changes it.

use crate::config::{ConfigLoader, DriveConfig};
use crate::drive::{Drive, FileSelection, RetrievalOutcome};
use crate::error::{ApiError, StorageError};
use crate::format::{format_item_detail_text, format_item_list_text, format_keys_text};
use crate::keys::KeyPair;
use crate::logging::{LogFormat, LogOutput, LoggingConfig};
use crate::service::{HttpStorageService, StorageService};
use crate::store::Item;
use crate::views::{SortMode, ViewQuery};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Drive CLI - upload, retrieve and browse ledger-backed files
#[derive(Parser, Debug)]
#[command(name = "drive")]
#[command(about = "Upload, retrieve and browse files kept by a ledger-backed storage service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Display name for this session (overrides config and snapshot)
    #[arg(long)]
    pub owner: Option<String>,

    /// Log to stderr at debug level
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<LogOutput>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold the logging flags over the configured logging section.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if self.verbose {
            config.level = "debug".to_string();
            config.output = LogOutput::Stderr;
        }
        if let Some(ref level) = self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.format = format;
        }
        if let Some(output) = self.log_output {
            config.output = output;
        }
        if let Some(ref file) = self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Upload local files to the store-and-record service
    Upload {
        /// Files to upload; several files upload concurrently
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Retrieve a stored file by transaction id
    Retrieve {
        /// Transaction id (non-alphanumeric characters are dropped)
        id: String,
        /// Also save the content into the downloads directory
        #[arg(long)]
        save: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Save a file's content, retrieving it first when needed
    Download {
        /// Transaction id
        id: String,
        /// Target directory (default: configured downloads directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// List known items
    List {
        /// Case-insensitive name filter
        #[arg(long, default_value = "")]
        search: String,
        /// Sort mode (default, folders, files, recent)
        #[arg(long, default_value = "default")]
        sort: SortMode,
        /// Only files with this extension or subtype
        #[arg(long = "type")]
        type_filter: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one item by transaction id
    Show {
        /// Transaction id
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Export the item list to a snapshot file
    Export {
        /// Snapshot file to write
        path: PathBuf,
    },
    /// Replace the item list with a snapshot file
    Import {
        /// Snapshot file to read
        path: PathBuf,
    },
    /// Show or change the owner display name
    Owner {
        /// New display name (omit to show the current one)
        name: Option<String>,
    },
    /// Show the session key pair
    Keys {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Write a workspace drive.toml with the owner name and session keys
    Init {
        /// Owner display name (prompted for when omitted)
        #[arg(long)]
        owner: Option<String>,
        /// Overwrite an existing drive.toml
        #[arg(long)]
        force: bool,
    },
    /// Interactive shell keeping retrieved content in memory
    Shell,
}

/// Item fields reported by JSON output.
#[derive(Debug, Serialize)]
struct ItemSummary<'a> {
    name: &'a str,
    media_type: String,
    date: &'a str,
    owner: &'a str,
    transaction_id: &'a str,
    owner_public_key: &'a str,
    is_retrieved: bool,
    owned_locally: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blake3: Option<String>,
}

impl<'a> From<&'a Item> for ItemSummary<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            name: &item.name,
            media_type: item.media_type(),
            date: &item.date,
            owner: &item.owner,
            transaction_id: item.transaction_id.as_str(),
            owner_public_key: &item.owner_public_key,
            is_retrieved: item.is_retrieved,
            owned_locally: item.owned_locally(),
            size: item.content.as_ref().map(|blob| blob.len()),
            blake3: item.content.as_ref().map(|blob| blob.digest_hex()),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::from(StorageError::from(e)))
}

fn validate_format(format: &str) -> Result<(), ApiError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(ApiError::ConfigError(format!(
            "Invalid format: {}. Must be 'text' or 'json'",
            other
        ))),
    }
}

/// CLI context for executing commands
pub struct CliContext {
    drive: Drive,
    runtime: tokio::runtime::Runtime,
    workspace_root: PathBuf,
    config: DriveConfig,
    snapshot_path: PathBuf,
    downloads_dir: PathBuf,
    /// Cleared when the session snapshot could not be loaded, so it is never overwritten.
    persist: AtomicBool,
}

impl CliContext {
    /// Load configuration the way [`CliContext::new`] does.
    pub fn load_config(workspace_root: &Path, config_path: Option<&Path>) -> Result<DriveConfig, ApiError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(workspace_root)?,
        };
        config.validate().map_err(ApiError::ConfigError)?;
        Ok(config)
    }

    /// Create a new CLI context backed by the HTTP services.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = Self::load_config(&workspace_root, config_path.as_deref())?;
        Self::from_config(workspace_root, config, None)
    }

    /// Create a context from an already loaded configuration.
    pub fn from_config(
        workspace_root: PathBuf,
        config: DriveConfig,
        owner: Option<String>,
    ) -> Result<Self, ApiError> {
        let service = Arc::new(HttpStorageService::new(&config.service)?);
        Self::with_service(workspace_root, config, owner, service)
    }

    /// Create a context using the given storage backend.
    pub fn with_service(
        workspace_root: PathBuf,
        config: DriveConfig,
        owner: Option<String>,
        service: Arc<dyn StorageService>,
    ) -> Result<Self, ApiError> {
        let storage = config.storage.resolve_paths(&workspace_root)?;
        let keys = KeyPair::from_config_or_generate(
            config.keys.public_key.as_deref(),
            config.keys.private_key.as_deref(),
        );
        let drive = Drive::new(config.owner_name.clone(), keys, service);

        let persist = if storage.snapshot_path.exists() {
            match drive.import_snapshot(&storage.snapshot_path) {
                Ok(count) => {
                    info!(path = %storage.snapshot_path.display(), items = count, "Loaded session snapshot");
                    true
                }
                Err(e) => {
                    tracing::warn!(
                        path = %storage.snapshot_path.display(),
                        error = %e,
                        "Session snapshot could not be loaded; it will be left untouched"
                    );
                    false
                }
            }
        } else {
            true
        };

        if let Some(owner) = owner {
            drive.set_owner_name(owner);
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to start async runtime: {}", e)))?;

        Ok(Self {
            drive,
            runtime,
            workspace_root,
            config,
            snapshot_path: storage.snapshot_path,
            downloads_dir: storage.downloads_dir,
            persist: AtomicBool::new(persist),
        })
    }

    pub fn drive(&self) -> &Drive {
        &self.drive
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        match &result {
            Ok(_) => info!(
                command = command_name(command),
                duration_ms = started.elapsed().as_millis() as u64,
                "Command completed"
            ),
            Err(e) => tracing::error!(
                command = command_name(command),
                error = %e,
                "Command failed"
            ),
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Upload { paths, format } => self.handle_upload(paths, format),
            Commands::Retrieve { id, save, format } => self.handle_retrieve(id, *save, format),
            Commands::Download { id, dir } => {
                let dir = dir.clone().unwrap_or_else(|| self.downloads_dir.clone());
                let path = self.runtime.block_on(self.retrieve_and_save(id, &dir))?;
                self.save_session()?;
                Ok(format!("Saved {}", path.display()))
            }
            Commands::List {
                search,
                sort,
                type_filter,
                format,
            } => {
                validate_format(format)?;
                let query = ViewQuery::new(search.clone(), *sort, type_filter.clone());
                let items = self.drive.view(&query);
                if format == "json" {
                    let summaries: Vec<ItemSummary> = items.iter().map(ItemSummary::from).collect();
                    to_json(&json!({
                        "owner_name": self.drive.owner_name(),
                        "total": self.drive.len(),
                        "sort": sort.as_str(),
                        "items": summaries,
                    }))
                } else {
                    Ok(format_item_list_text(&items, self.drive.len()))
                }
            }
            Commands::Show { id, format } => {
                validate_format(format)?;
                let item = self
                    .drive
                    .find(id)?
                    .ok_or_else(|| ApiError::NotFound(id.clone()))?;
                if format == "json" {
                    to_json(&ItemSummary::from(&item))
                } else {
                    Ok(format_item_detail_text(&item))
                }
            }
            Commands::Export { path } => {
                let snapshot = self.drive.export_snapshot(path)?;
                Ok(format!(
                    "Exported {} items to {} (created_at {})",
                    snapshot.items.len(),
                    path.display(),
                    snapshot.created_at
                ))
            }
            Commands::Import { path } => {
                let count = self.drive.import_snapshot(path)?;
                self.persist.store(true, Ordering::SeqCst);
                self.save_session()?;
                Ok(format!("Imported {} items from {}", count, path.display()))
            }
            Commands::Owner { name } => match name {
                Some(name) if !name.trim().is_empty() => {
                    self.drive.set_owner_name(name.trim());
                    self.save_session()?;
                    Ok(format!("Owner set to {}", name.trim()))
                }
                Some(_) => Err(ApiError::ConfigError("Owner name cannot be empty".to_string())),
                None => Ok(self.drive.owner_name()),
            },
            Commands::Keys { format } => {
                validate_format(format)?;
                let keys = self.drive.keys();
                if format == "json" {
                    to_json(&json!({
                        "owner_name": self.drive.owner_name(),
                        "public_key": keys.public_key,
                    }))
                } else {
                    Ok(format_keys_text(&self.drive.owner_name(), keys))
                }
            }
            Commands::Init { owner, force } => self.handle_init(owner.as_deref(), *force),
            Commands::Shell => super::shell::run(self),
        }
    }

    fn handle_upload(&self, paths: &[PathBuf], format: &str) -> Result<String, ApiError> {
        validate_format(format)?;
        // Unreadable paths keep their slot so the report stays in argument order.
        let mut slots: Vec<(String, Option<Result<Item, ApiError>>)> = Vec::with_capacity(paths.len());
        let mut selections = Vec::new();
        for path in paths {
            match FileSelection::from_path(&self.workspace_root.join(path)) {
                Ok(selection) => {
                    slots.push((selection.name.clone(), None));
                    selections.push(selection);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot read file for upload");
                    slots.push((path.display().to_string(), Some(Err(e))));
                }
            }
        }

        let mut uploaded = self
            .runtime
            .block_on(self.drive.upload_all(selections))
            .into_iter();
        let results: Vec<(String, Result<Item, ApiError>)> = slots
            .into_iter()
            .map(|(name, read)| {
                let result = read.or_else(|| uploaded.next()).unwrap_or_else(|| {
                    Err(ApiError::ConfigError(format!("No upload result for {}", name)))
                });
                (name, result)
            })
            .collect();

        if !results.iter().any(|(_, result)| result.is_ok()) {
            // Nothing committed: surface the first failure as the command error.
            let first = results.into_iter().find_map(|(_, result)| result.err());
            return Err(first.unwrap_or_else(|| {
                ApiError::ConfigError("No files to upload".to_string())
            }));
        }
        self.save_session()?;

        if format == "json" {
            let rows: Vec<serde_json::Value> = results
                .iter()
                .map(|(name, result)| match result {
                    Ok(item) => json!({
                        "file": name,
                        "transaction_id": item.transaction_id.as_str(),
                    }),
                    Err(e) => json!({ "file": name, "error": e.to_string() }),
                })
                .collect();
            return to_json(&json!({ "uploads": rows }));
        }

        let mut out = String::new();
        for (name, result) in &results {
            match result {
                Ok(item) => out.push_str(&format!(
                    "Uploaded {} (transaction {})\n",
                    name, item.transaction_id
                )),
                Err(e) => out.push_str(&format!("Failed {}: {}\n", name, e)),
            }
        }
        Ok(out.trim_end().to_string())
    }

    fn handle_retrieve(&self, id: &str, save: bool, format: &str) -> Result<String, ApiError> {
        validate_format(format)?;
        let outcome = self.runtime.block_on(self.drive.retrieve(id))?;
        let saved = if save {
            Some(self.drive.download(id, &self.downloads_dir)?)
        } else {
            None
        };
        self.save_session()?;

        let item = outcome.item();
        if format == "json" {
            return to_json(&json!({
                "outcome": if outcome.is_reconciled() { "reconciled" } else { "added" },
                "index": outcome.index(),
                "item": ItemSummary::from(item),
                "saved_to": saved.as_ref().map(|p| p.display().to_string()),
            }));
        }

        let verb = match outcome {
            RetrievalOutcome::Reconciled { .. } => "Reconciled",
            RetrievalOutcome::Added { .. } => "Added",
        };
        let size = item.content.as_ref().map(|blob| blob.len()).unwrap_or(0);
        let mut out = format!(
            "{} {} (transaction {}, {} bytes)",
            verb, item.name, item.transaction_id, size
        );
        if let Some(path) = saved {
            out.push_str(&format!("\nSaved {}", path.display()));
        }
        Ok(out)
    }

    /// Save content already in memory, or retrieve it first.
    async fn retrieve_and_save(&self, id: &str, dir: &Path) -> Result<PathBuf, ApiError> {
        match self.drive.download(id, dir) {
            Err(ApiError::NotRetrieved(_)) | Err(ApiError::NotFound(_)) => {
                self.drive.retrieve(id).await?;
                self.drive.download(id, dir)
            }
            other => other,
        }
    }

    fn handle_init(&self, owner: Option<&str>, force: bool) -> Result<String, ApiError> {
        let path = ConfigLoader::workspace_config_path(&self.workspace_root);
        if path.exists() && !force {
            return Err(ApiError::ConfigError(format!(
                "{} already exists. Use --force to overwrite.",
                path.display()
            )));
        }

        let owner_name = match owner {
            Some(name) => name.trim().to_string(),
            None => dialoguer::Input::<String>::new()
                .with_prompt("Owner name")
                .default(self.drive.owner_name())
                .interact_text()
                .map_err(|e| ApiError::ConfigError(format!("Failed to read owner name: {}", e)))?,
        };
        if owner_name.is_empty() {
            return Err(ApiError::ConfigError("Owner name cannot be empty".to_string()));
        }

        let keys = self.drive.keys();
        let mut config = self.config.clone();
        config.owner_name = owner_name.clone();
        config.keys.public_key = Some(keys.public_key.clone());
        config.keys.private_key = Some(keys.private_key.clone());
        ConfigLoader::write(&path, &config)?;

        self.drive.set_owner_name(owner_name.clone());
        self.save_session()?;
        Ok(format!(
            "Wrote {} for owner {}",
            path.display(),
            owner_name
        ))
    }

    /// Re-export the session snapshot unless loading it failed.
    pub(crate) fn save_session(&self) -> Result<(), ApiError> {
        if !self.persist.load(Ordering::SeqCst) {
            tracing::debug!(path = %self.snapshot_path.display(), "Skipping session snapshot export");
            return Ok(());
        }
        self.drive.export_snapshot(&self.snapshot_path)?;
        Ok(())
    }
}

pub(crate) fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Upload { .. } => "upload",
        Commands::Retrieve { .. } => "retrieve",
        Commands::Download { .. } => "download",
        Commands::List { .. } => "list",
        Commands::Show { .. } => "show",
        Commands::Export { .. } => "export",
        Commands::Import { .. } => "import",
        Commands::Owner { .. } => "owner",
        Commands::Keys { .. } => "keys",
        Commands::Init { .. } => "init",
        Commands::Shell => "shell",
    }
}
