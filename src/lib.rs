pub mod assistant;
pub mod capabilities;
pub mod completion;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod model_gateway;
pub mod providers;
pub mod repl;

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use tracing::{info, warn};

use assistant::Assistant;
use capabilities::CapabilityRegistry;
use config::{Config, ConfigError};
use model_gateway::HostModelGateway;
use repl::{LineAction, classify_line, run_repl, write_outcome};

pub async fn run() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(err @ ConfigError::Missing { .. }) => {
            warn!(error = %err, "runtime configuration incomplete");
            println!("检查环境变量设置: {err}");
            return Ok(ExitCode::SUCCESS);
        }
    };
    info!(
        model = %cfg.model,
        api_base = %cfg.api_base,
        timeout_secs = cfg.model_timeout_secs,
        "loaded runtime configuration"
    );

    let client = providers::openai::http_client(&cfg)?;
    let assistant = Assistant::new(
        HostModelGateway::new(&client, &cfg),
        CapabilityRegistry::builtin(),
        &cfg,
    );

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        run_repl(&assistant).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let joined = args.join(" ");
    let prompt = match classify_line(&joined) {
        LineAction::Query(prompt) => prompt,
        LineAction::Quit | LineAction::Skip => {
            info!("nothing to ask");
            return Ok(ExitCode::SUCCESS);
        }
    };
    let outcome = assistant.process_query(prompt).await;
    write_outcome(&mut std::io::stdout(), &outcome).context("Failed to write to stdout")?;
    Ok(if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
