//! Subcommand implementations.

use anyhow::{bail, Context, Result};
use anygraph_common::ColumnInfo;
use anygraph_core::{Analyst, AppConfig};
use anygraph_llm::GeminiClient;
use anygraph_sandbox::{ExecutionGateway, ExecutionRequest};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

fn gateway_from_config(config: &AppConfig, interpreter: Option<&str>) -> ExecutionGateway {
    let mut sandbox = config.sandbox.clone();
    if let Some(interpreter) = interpreter {
        sandbox.interpreter = interpreter.to_string();
    }
    ExecutionGateway::new(sandbox.runner())
}

/// Run one snippet through the sandbox and print the normalized result.
pub async fn exec(file: &str, timeout: u64, interpreter: Option<&str>) -> Result<()> {
    let source_code = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading snippet from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading snippet from {file}"))?
    };

    let config = AppConfig::load()?;
    let gateway = gateway_from_config(&config, interpreter);

    let result = gateway
        .execute(ExecutionRequest::new(source_code).with_timeout(Duration::from_secs(timeout)))
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

/// Probe the execution backend.
pub async fn health(interpreter: Option<&str>) -> Result<()> {
    let config = AppConfig::load()?;
    let gateway = gateway_from_config(&config, interpreter);

    if gateway.health_probe().await {
        println!("ok: {} backend operational", gateway.runner_name());
        Ok(())
    } else {
        println!("unavailable: {} backend failed the probe", gateway.runner_name());
        std::process::exit(1);
    }
}

/// Full pipeline: decide, generate, execute, print the reply.
pub async fn ask(query: &str, dataset_url: &str, schema_path: &str, timeout: u64) -> Result<()> {
    let config = AppConfig::load()?;
    let api_key = config.api_key()?;

    let schema_json = std::fs::read_to_string(schema_path)
        .with_context(|| format!("reading schema from {schema_path}"))?;
    let columns: Vec<ColumnInfo> =
        serde_json::from_str(&schema_json).context("parsing schema JSON")?;
    if columns.is_empty() {
        bail!("schema file lists no columns");
    }

    let mut client = GeminiClient::new(api_key).with_model(config.llm.model.as_str());
    if let Some(endpoint) = &config.llm.endpoint {
        client = client.with_base_url(endpoint.as_str());
    }

    let analyst = Analyst::new(Arc::new(client), gateway_from_config(&config, None))
        .with_code_timeout(Duration::from_secs(timeout));

    let reply = analyst.answer(query, dataset_url, &columns, &[]).await?;

    println!("{}", reply.response_text);

    for (index, image) in reply.images.iter().enumerate() {
        let path = format!("chart_{index}.png");
        let bytes = image.decode().context("decoding chart image")?;
        std::fs::write(&path, bytes).with_context(|| format!("writing {path}"))?;
        info!(path = %path, "Wrote extracted chart");
    }

    if let Some(execution) = &reply.execution {
        if !execution.success {
            std::process::exit(1);
        }
    }
    Ok(())
}
