use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use dockswarm::config::{Config, OutputFormat};
use dockswarm::models::{
    ListFilters, NodeAvailability, NodeRole, SecretSpec, SwarmInitRequest, SwarmJoinRequest,
    SwarmSpec, SwarmUpdateOptions,
};
use dockswarm::EngineClient;
use futures::future::try_join_all;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command line client for Docker swarm clusters
#[derive(Parser, Debug)]
#[command(name = "dockswarm", version, about, long_about = None)]
struct Args {
    /// Engine address, e.g. tcp://127.0.0.1:2375
    #[arg(short = 'H', long, global = true)]
    host: Option<String>,

    /// Engine API version, e.g. 1.41
    #[arg(long, global = true)]
    api_version: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    output: Option<OutputFormat>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Default directive for the crate's own events; `None` disables logging
    fn directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("dockswarm=error"),
            LogLevel::Warn => Some("dockswarm=warn"),
            LogLevel::Info => Some("dockswarm=info"),
            LogLevel::Debug => Some("dockswarm=debug"),
            LogLevel::Trace => Some("dockswarm=trace"),
        }
    }
}

/// `RUST_LOG` refines the `--log-level` default, e.g. `reqwest=debug`
fn log_filter(level: LogLevel, rust_log: Option<&str>) -> Option<EnvFilter> {
    let directive = level.directive()?;
    let mut filter = EnvFilter::new(directive);
    let extras = rust_log
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty());
    for extra in extras {
        match extra.parse() {
            Ok(parsed) => filter = filter.add_directive(parsed),
            Err(err) => eprintln!("Ignoring RUST_LOG directive {extra:?}: {err}"),
        }
    }
    Some(filter)
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the swarm
    #[command(subcommand)]
    Swarm(SwarmCommand),
    /// Manage swarm nodes
    #[command(subcommand)]
    Node(NodeCommand),
    /// Manage swarm secrets
    #[command(subcommand)]
    Secret(SecretCommand),
    /// Show or change the saved configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum SwarmCommand {
    /// Display the swarm descriptor
    Inspect,
    /// Initialize a new swarm on the engine
    Init {
        #[arg(long, default_value = "0.0.0.0:2377")]
        listen_addr: String,
        #[arg(long)]
        advertise_addr: Option<String>,
        #[arg(long)]
        force_new_cluster: bool,
        /// Lock managers and require the unlock key after a restart
        #[arg(long)]
        autolock: bool,
    },
    /// Join a swarm as a worker or manager
    Join {
        /// Address of an existing manager
        remote_addr: Vec<String>,
        #[arg(long)]
        token: String,
        #[arg(long, default_value = "0.0.0.0:2377")]
        listen_addr: String,
        #[arg(long)]
        advertise_addr: Option<String>,
    },
    /// Leave the swarm
    Leave {
        #[arg(short, long)]
        force: bool,
    },
    /// Update the swarm configuration
    Update(SwarmUpdateArgs),
    /// Print the manager unlock key
    UnlockKey,
    /// Unlock a locked manager
    Unlock {
        key: String,
    },
}

#[derive(ClapArgs, Debug)]
struct SwarmUpdateArgs {
    /// Turn manager auto-lock on or off
    #[arg(long)]
    autolock: Option<bool>,
    #[arg(long)]
    rotate_worker_token: bool,
    #[arg(long)]
    rotate_manager_token: bool,
    #[arg(long)]
    rotate_unlock_key: bool,
}

#[derive(Subcommand, Debug)]
enum NodeCommand {
    /// List nodes
    Ls {
        /// Filter, e.g. role=manager
        #[arg(short, long, value_parser = parse_key_value)]
        filter: Vec<(String, String)>,
    },
    /// Display one or more nodes
    Inspect {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Update a node
    Update {
        id: String,
        #[arg(long, value_enum)]
        availability: Option<AvailabilityArg>,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
        /// Add or replace a label
        #[arg(long, value_parser = parse_key_value)]
        label: Vec<(String, String)>,
    },
    /// Remove a node from the swarm
    Rm {
        id: String,
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AvailabilityArg {
    Active,
    Pause,
    Drain,
}

impl From<AvailabilityArg> for NodeAvailability {
    fn from(arg: AvailabilityArg) -> Self {
        match arg {
            AvailabilityArg::Active => NodeAvailability::Active,
            AvailabilityArg::Pause => NodeAvailability::Pause,
            AvailabilityArg::Drain => NodeAvailability::Drain,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Worker,
    Manager,
}

impl From<RoleArg> for NodeRole {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Worker => NodeRole::Worker,
            RoleArg::Manager => NodeRole::Manager,
        }
    }
}

#[derive(Subcommand, Debug)]
enum SecretCommand {
    /// List secrets
    Ls {
        /// Filter, e.g. name=db_password
        #[arg(short, long, value_parser = parse_key_value)]
        filter: Vec<(String, String)>,
    },
    /// Display one or more secrets
    Inspect {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Create a secret from base64-encoded data
    Create {
        name: String,
        data: String,
        #[arg(long, value_parser = parse_key_value)]
        label: Vec<(String, String)>,
    },
    /// Remove a secret
    Rm {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the saved configuration and the effective engine address
    Show,
    /// Save the default engine address
    SetHost { host: String },
    /// Save the default API version
    SetApiVersion { version: String },
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

fn filters_from(pairs: &[(String, String)]) -> ListFilters {
    pairs
        .iter()
        .fold(ListFilters::new(), |filters, (key, value)| {
            filters.with(key, value.clone())
        })
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = log_filter(level, std::env::var("RUST_LOG").ok().as_deref())?;

    let log_path = get_log_path();
    let (dir, file_name) = match (log_path.parent(), log_path.file_name()) {
        (Some(dir), Some(name)) => (dir.to_path_buf(), name.to_os_string()),
        _ => (PathBuf::from("."), "dockswarm.log".into()),
    };

    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("Cannot create log directory {}: {err}", dir.display());
        return None;
    }

    // Single append-only file, no rotation
    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log = %log_path.display(),
        "dockswarm started at {:?}",
        level
    );

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("dockswarm").join("dockswarm.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".dockswarm").join("dockswarm.log");
    }
    PathBuf::from("dockswarm.log")
}

/// Prints command results in the selected format
struct Printer {
    format: OutputFormat,
}

impl Printer {
    fn print<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let rendered = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
        };
        println!("{}", rendered.trim_end());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut config = Config::load();
    let printer = Printer {
        format: args.output.or(config.output).unwrap_or_default(),
    };

    let command = match args.command {
        Command::Config(cmd) => return run_config(cmd, &mut config, &printer),
        other => other,
    };

    let host = args.host.clone().unwrap_or_else(|| config.effective_host());
    let mut builder = EngineClient::builder().host(host.clone());
    if let Some(version) = args.api_version.clone().or_else(|| config.effective_api_version()) {
        builder = builder.api_version(version);
    }
    let client = builder
        .build()
        .with_context(|| format!("Failed to create engine client for {host}"))?;
    tracing::debug!("Using {:?}", client);

    match command {
        Command::Swarm(cmd) => run_swarm(cmd, &client, &printer).await,
        Command::Node(cmd) => run_node(cmd, &client, &printer).await,
        Command::Secret(cmd) => run_secret(cmd, &client, &printer).await,
        Command::Config(_) => Ok(()),
    }
}

fn run_config(cmd: ConfigCommand, config: &mut Config, printer: &Printer) -> Result<()> {
    match cmd {
        ConfigCommand::Show => printer.print(&serde_json::json!({
            "path": Config::config_path(),
            "host": config.host,
            "api_version": config.api_version,
            "output": config.output,
            "effective_host": config.effective_host(),
        })),
        ConfigCommand::SetHost { host } => {
            config.set_host(&host).context("Failed to save configuration")?;
            println!("Default host set to {host}");
            Ok(())
        }
        ConfigCommand::SetApiVersion { version } => {
            config
                .set_api_version(&version)
                .context("Failed to save configuration")?;
            println!("Default API version set to {version}");
            Ok(())
        }
    }
}

async fn run_swarm(cmd: SwarmCommand, client: &EngineClient, printer: &Printer) -> Result<()> {
    let swarm = client.swarm();
    match cmd {
        SwarmCommand::Inspect => {
            let info = swarm.inspect().await.context("Failed to inspect swarm")?;
            printer.print(&info)
        }
        SwarmCommand::Init {
            listen_addr,
            advertise_addr,
            force_new_cluster,
            autolock,
        } => {
            let request = SwarmInitRequest {
                advertise_addr,
                force_new_cluster: force_new_cluster.then_some(true),
                spec: autolock.then(|| SwarmSpec::auto_lock(true)),
                ..SwarmInitRequest::new(listen_addr)
            };
            let node_id = swarm.init(&request).await.context("Failed to initialize swarm")?;
            println!("Swarm initialized: current node ({node_id}) is now a manager.");
            Ok(())
        }
        SwarmCommand::Join {
            remote_addr,
            token,
            listen_addr,
            advertise_addr,
        } => {
            if remote_addr.is_empty() {
                bail!("at least one manager address is required");
            }
            let request = SwarmJoinRequest {
                listen_addr,
                advertise_addr,
                remote_addrs: remote_addr,
                join_token: Some(token),
                ..Default::default()
            };
            match swarm.join(&request).await {
                Ok(()) => {
                    println!("This node joined a swarm.");
                    Ok(())
                }
                Err(err) if err.is_unavailable() => {
                    bail!("No active manager reachable: {err}")
                }
                Err(err) => Err(err).context("Failed to join swarm"),
            }
        }
        SwarmCommand::Leave { force } => {
            swarm.leave(force).await.context("Failed to leave swarm")?;
            println!("Node left the swarm.");
            Ok(())
        }
        SwarmCommand::Update(update) => {
            let current = swarm.inspect().await.context("Failed to inspect swarm")?;
            let mut spec = current.spec.clone();
            if let Some(enabled) = update.autolock {
                spec.encryption_config = SwarmSpec::auto_lock(enabled).encryption_config;
            }
            let options = SwarmUpdateOptions {
                rotate_worker_token: update.rotate_worker_token,
                rotate_manager_token: update.rotate_manager_token,
                rotate_manager_unlock_key: update.rotate_unlock_key,
                ..SwarmUpdateOptions::new(current.version.index)
            };
            swarm
                .update(&options, &spec)
                .await
                .context("Failed to update swarm")?;
            println!("Swarm updated.");
            Ok(())
        }
        SwarmCommand::UnlockKey => {
            let key = swarm.unlock_key().await.context("Failed to fetch unlock key")?;
            if key.is_empty() {
                println!("No unlock key is set.");
            } else {
                println!("{key}");
            }
            Ok(())
        }
        SwarmCommand::Unlock { key } => match swarm.unlock(&key).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_conflict() => bail!("Swarm is not locked: {err}"),
            Err(err) => Err(err).context("Failed to unlock swarm"),
        },
    }
}

async fn run_node(cmd: NodeCommand, client: &EngineClient, printer: &Printer) -> Result<()> {
    let nodes = client.nodes();
    match cmd {
        NodeCommand::Ls { filter } => {
            let list = nodes
                .list_with(&filters_from(&filter))
                .await
                .context("Failed to list nodes")?;
            let rows: Vec<Value> = list
                .iter()
                .map(|node| {
                    serde_json::json!({
                        "id": node.id(),
                        "hostname": node.hostname(),
                        "status": node.status.as_ref().map(|s| s.state),
                        "availability": node.spec().availability,
                        "role": node.spec().role,
                        "manager": node.is_manager(),
                    })
                })
                .collect();
            printer.print(&rows)
        }
        NodeCommand::Inspect { ids } => {
            let fetched = try_join_all(ids.iter().map(|id| nodes.get(id)))
                .await
                .context("Failed to inspect nodes")?;
            let raw: Vec<&Value> = fetched.iter().map(|node| node.raw()).collect();
            printer.print(&raw)
        }
        NodeCommand::Update {
            id,
            availability,
            role,
            label,
        } => {
            let node = nodes
                .get(&id)
                .await
                .with_context(|| format!("Failed to inspect node {id}"))?;
            let mut spec = node.spec().clone();
            if let Some(availability) = availability {
                spec.availability = Some(availability.into());
            }
            if let Some(role) = role {
                spec.role = Some(role.into());
            }
            if !label.is_empty() {
                spec.labels.get_or_insert_with(Default::default).extend(label);
            }
            match node.update(None, &spec).await {
                Ok(_) => {
                    println!("{id}");
                    Ok(())
                }
                Err(err) if err.is_conflict() => {
                    bail!("Node {id} changed since it was read, retry: {err}")
                }
                Err(err) => Err(err).with_context(|| format!("Failed to update node {id}")),
            }
        }
        NodeCommand::Rm { id, force } => {
            let result = if force {
                nodes.force_delete(&id).await
            } else {
                nodes.delete(&id).await
            };
            result.with_context(|| format!("Failed to remove node {id}"))?;
            println!("{id}");
            Ok(())
        }
    }
}

async fn run_secret(cmd: SecretCommand, client: &EngineClient, printer: &Printer) -> Result<()> {
    let secrets = client.secrets();
    match cmd {
        SecretCommand::Ls { filter } => {
            let list = secrets
                .list_with(&filters_from(&filter))
                .await
                .context("Failed to list secrets")?;
            let rows: Vec<Value> = list
                .iter()
                .map(|secret| {
                    serde_json::json!({
                        "id": secret.id(),
                        "name": secret.name(),
                        "created_at": secret.created_at,
                        "updated_at": secret.updated_at,
                    })
                })
                .collect();
            printer.print(&rows)
        }
        SecretCommand::Inspect { ids } => {
            let fetched = try_join_all(ids.iter().map(|id| secrets.get(id)))
                .await
                .context("Failed to inspect secrets")?;
            let raw: Vec<&Value> = fetched.iter().map(|secret| secret.raw()).collect();
            printer.print(&raw)
        }
        SecretCommand::Create { name, data, label } => {
            let mut spec = SecretSpec::new(name.clone(), data);
            if !label.is_empty() {
                spec.labels = Some(label.into_iter().collect());
            }
            let ack = secrets
                .create(&spec)
                .await
                .with_context(|| format!("Failed to create secret {name}"))?;
            println!("{}", ack.id);
            Ok(())
        }
        SecretCommand::Rm { id } => {
            secrets
                .delete(&id)
                .await
                .with_context(|| format!("Failed to remove secret {id}"))?;
            println!("{id}");
            Ok(())
        }
    }
}
