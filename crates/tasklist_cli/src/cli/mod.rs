use clap::{Parser, Subcommand};
use tasklist_core::config::{ConfigOverrides, canonicalize_name};
use tasklist_core::error::AppError;
use tasklist_core::view::{SortOrder, SortType};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tasklist add "Write report" --priority high --deadline 2025-01-01T10:00
    Add {
        title: Option<String>,
        /// low, medium or high (default: low)
        #[arg(short, long)]
        priority: Option<String>,
        /// When the task is due, e.g. "2025-01-01T10:00" or "2025-01-01 10:00"
        #[arg(short, long)]
        deadline: Option<String>,
    },
    /// Mark a task as completed
    ///
    /// Example: tasklist done 1735725600000
    Done { id: String },
    /// Delete a task
    ///
    /// Example: tasklist delete 1735725600000
    Delete { id: String },
    /// List active and completed tasks
    ///
    /// Example: tasklist list
    /// Example: tasklist list --sort priority --order desc
    List {
        /// date or priority
        #[arg(long)]
        sort: Option<String>,
        /// asc or desc
        #[arg(long)]
        order: Option<String>,
    },
    /// Sort by a field; choosing the current field again reverses the order
    ///
    /// Example: tasklist sort priority
    Sort { by: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Sort,
    Order,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    if key_raw.contains('.') {
        return Err(format!("override key '{}' cannot have subfields", key_raw.trim()));
    }

    let target = match canonicalize_name(key_raw).as_str() {
        "" => return Err("override key cannot be empty".to_string()),
        "theme" => ConfigOverrideTarget::Theme,
        "sort" | "sort_type" => ConfigOverrideTarget::Sort,
        "order" | "sort_order" => ConfigOverrideTarget::Order,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` value into one set of overrides.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::validation)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Sort => overrides.sort = Some(parsed.value.parse::<SortType>()?),
            ConfigOverrideTarget::Order => overrides.order = Some(parsed.value.parse::<SortOrder>()?),
        }
    }
    Ok(overrides)
}
