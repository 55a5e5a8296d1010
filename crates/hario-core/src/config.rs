use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::schema::DEFAULT_MAX_DEPTH;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Environment variable naming the program started for process-parallel workers.
pub const WORKER_ENV: &str = "HARIO_WORKER";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown processing strategy '{0}' (expected sequential, thread, process or async)")]
    UnknownStrategy(String),
    #[error("batch_size must be at least 1")]
    ZeroBatchSize,
    #[error("max_workers must be at least 1 for the {0} strategy")]
    ZeroWorkers(Strategy),
}

/// How batches are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One batch after another on the calling thread.
    #[default]
    Sequential,
    /// Bounded pool of OS threads in this process.
    Thread,
    /// Bounded pool of worker processes.
    Process,
    /// Batches as tasks on a single-threaded cooperative scheduler.
    Async,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Sequential,
        Strategy::Thread,
        Strategy::Process,
        Strategy::Async,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Thread => "thread",
            Strategy::Process => "process",
            Strategy::Async => "async",
        }
    }

    /// Whether `max_workers` applies.
    pub fn uses_workers(self) -> bool {
        matches!(self, Strategy::Thread | Strategy::Process)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}

/// Program (and arguments) that speaks the worker protocol on stdin/stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `$HARIO_WORKER worker` if set, otherwise the running executable with `worker`.
    pub fn from_env() -> std::io::Result<Self> {
        let program = match std::env::var_os(WORKER_ENV) {
            Some(program) if !program.is_empty() => PathBuf::from(program),
            _ => std::env::current_exe()?,
        };
        Ok(Self::new(program).arg("worker"))
    }

    pub fn to_command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for WorkerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Validated execution settings for one pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "PipelineSettings")]
pub struct PipelineConfig {
    batch_size: usize,
    strategy: Strategy,
    max_workers: Option<usize>,
    worker_command: Option<WorkerCommand>,
}

impl PipelineConfig {
    /// `max_workers` defaults to the available parallelism for the pooled
    /// strategies and is dropped for the others.
    pub fn new(batch_size: usize, strategy: Strategy, max_workers: Option<usize>) -> Result<Self, ConfigError> {
        if batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        let max_workers = if strategy.uses_workers() {
            match max_workers {
                Some(0) => return Err(ConfigError::ZeroWorkers(strategy)),
                Some(n) => Some(n),
                None => Some(default_workers()),
            }
        } else {
            if let Some(n) = max_workers {
                tracing::debug!(workers = n, %strategy, "max_workers ignored for this strategy");
            }
            None
        };
        Ok(Self {
            batch_size,
            strategy,
            max_workers,
            worker_command: None,
        })
    }

    pub fn with_worker_command(mut self, command: WorkerCommand) -> Self {
        self.worker_command = Some(command);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Pool size; `Some` exactly for the thread and process strategies.
    pub fn max_workers(&self) -> Option<usize> {
        self.max_workers
    }

    pub fn worker_command(&self) -> Option<&WorkerCommand> {
        self.worker_command.as_ref()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            strategy: Strategy::Sequential,
            max_workers: None,
            worker_command: None,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// `[pipeline]` section of config.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub batch_size: usize,
    pub strategy: Strategy,
    #[serde(default)]
    pub max_workers: Option<usize>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            strategy: Strategy::Sequential,
            max_workers: None,
        }
    }
}

impl TryFrom<PipelineSettings> for PipelineConfig {
    type Error = ConfigError;

    fn try_from(s: PipelineSettings) -> Result<Self, Self::Error> {
        PipelineConfig::new(s.batch_size, s.strategy, s.max_workers)
    }
}

/// `[validation]` section of config.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Deepest nesting of mappings checked before a record is rejected.
    pub max_depth: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Global configuration loaded from `~/.config/hario/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarioConfig {
    /// Key that receives the generated record id.
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub validation: ValidationSettings,
}

fn default_id_field() -> String {
    "id".to_string()
}

impl Default for HarioConfig {
    fn default() -> Self {
        Self {
            id_field: default_id_field(),
            pipeline: PipelineSettings::default(),
            validation: ValidationSettings::default(),
        }
    }
}

impl HarioConfig {
    pub fn pipeline_config(&self) -> Result<PipelineConfig, ConfigError> {
        PipelineConfig::try_from(self.pipeline.clone())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hario")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HarioConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HarioConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<HarioConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: HarioConfig = toml::from_str(&data)?;
    cfg.pipeline_config()?;
    Ok(cfg)
}
