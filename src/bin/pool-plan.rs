//! Print the connection plan a router configuration resolves to.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use replica_router::config::{load_config, resolve_pool, ResolvedPool};
use replica_router::observability::logging::init_logging;
use replica_router::{ConnectionSpec, RouterConfig};

const REDACTED: &str = "[REDACTED]";
const SECRET_KEYS: [&str; 2] = ["password", "passwd"];

#[derive(Parser)]
#[command(name = "pool-plan")]
#[command(about = "Resolve a replica pool configuration and print the connection plan", long_about = None)]
struct Cli {
    /// Router configuration file (TOML)
    config: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print only the primary's standalone connection settings
    #[arg(long)]
    primary_only: bool,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct Plan<'a> {
    primary: ConnectionSpec,
    replicas: Vec<ConnectionSpec>,
    rotation_len: u64,
    cooldown_secs: f64,
    retry_delay_secs: f64,
    default_policy: String,
    balancer: &'a replica_router::load_balancer::BalancerKind,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    init_logging(&config.observability);

    let resolved = resolve_pool(&config.pool)?;
    tracing::debug!(replicas = resolved.replicas.len(), "Resolved pool");

    print!("{}", render(&config, &resolved, cli.format, cli.primary_only)?);
    Ok(())
}

/// The full output for one invocation, secrets already redacted.
fn render(
    config: &RouterConfig,
    resolved: &ResolvedPool,
    format: Format,
    primary_only: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    if primary_only {
        let mut primary = resolved.primary_config();
        redact(&mut primary);
        return Ok(match format {
            Format::Json => format!("{}\n", serde_json::to_string_pretty(&primary)?),
            Format::Text => toml::to_string(&primary)?,
        });
    }

    let plan = build_plan(config, resolved);
    Ok(match format {
        Format::Json => format!("{}\n", serde_json::to_string_pretty(&plan)?),
        Format::Text => render_text(&plan),
    })
}

fn build_plan<'a>(config: &'a RouterConfig, resolved: &ResolvedPool) -> Plan<'a> {
    let redacted = |spec: &ConnectionSpec| {
        let mut spec = spec.clone();
        redact(&mut spec.settings);
        spec
    };
    Plan {
        primary: redacted(&resolved.primary),
        replicas: resolved.replicas.iter().map(redacted).collect(),
        rotation_len: resolved.rotation_len(),
        cooldown_secs: config.suppression.cooldown().as_secs_f64(),
        retry_delay_secs: config.suppression.retry_delay().as_secs_f64(),
        default_policy: config.routing.default_policy.to_string(),
        balancer: &config.routing.balancer,
    }
}

fn redact(settings: &mut toml::Table) {
    for key in SECRET_KEYS {
        if let Some(value) = settings.get_mut(key) {
            *value = toml::Value::String(REDACTED.to_string());
        }
    }
}

fn render_text(plan: &Plan<'_>) -> String {
    let mut out = format!("{:<12} {:<12} {:>6}  settings\n", "role", "adapter", "weight");
    for spec in std::iter::once(&plan.primary).chain(plan.replicas.iter()) {
        let settings = spec
            .settings
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!(
            "{:<12} {:<12} {:>6}  {}\n",
            spec.role, spec.adapter, spec.weight, settings
        ));
    }
    out.push('\n');
    out.push_str(&format!("read rotation:  {} entries\n", plan.rotation_len));
    out.push_str(&format!(
        "cool-down:      {}s (retry every {}s)\n",
        plan.cooldown_secs, plan.retry_delay_secs
    ));
    out.push_str(&format!("default policy: {}\n", plan.default_policy));
    out.push_str(&format!("balancer:       {:?}\n", plan.balancer));
    out
}
