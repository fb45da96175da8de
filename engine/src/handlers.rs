//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - serve: Run the web form until Ctrl-C
//! - ask: Answer one question
//! - context: Show retrieved context without calling the model
//! - doctor: Validate configuration, corpus, and credential
//! - setup: Store the API key in the OS keychain

use anyhow::{Context as _, Result};
use sdk::errors::{AdvisorError, AdvisorErrorExt};
use sdk::types::AdvisoryRequest;
use serde_json::json;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

use crate::advisor::Advisor;
use crate::config::{Config, RetrievalSource};
use crate::llm::{self, CompletionSettings};
use crate::prompt::QueryFields;
use crate::retriever::{Context, DirectoryRetriever, Retriever};
use crate::secrets::{SecretManager, SecretString, API_KEY_SECRET};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Attach the user hint to an advisor error for terminal output
fn with_hint(err: AdvisorError) -> anyhow::Error {
    let hint = err.user_hint().to_string();
    anyhow::Error::new(err).context(hint)
}

fn resolve_api_key(config: &Config) -> Result<SecretString> {
    SecretManager::default()
        .resolve_api_key(&config.llm.api_key_env)
        .map_err(with_hint)
}

fn build_advisor(config: &Config) -> Result<Advisor> {
    let api_key = resolve_api_key(config)?;
    Advisor::from_config(config, api_key).map_err(with_hint)
}

/// Bind address from config, with command-line overrides
pub fn bind_addr(config: &Config, host: Option<&str>, port: Option<u16>) -> Result<SocketAddr> {
    let host = host.unwrap_or(&config.server.host);
    let port = port.unwrap_or(config.server.port);
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("Invalid bind address {}:{}", host, port))?
        .next()
        .with_context(|| format!("No address found for {}", host))
}

/// Serve the web form until Ctrl-C
pub async fn handle_serve(
    config: &Config,
    host: Option<String>,
    port: Option<u16>,
    format: OutputFormat,
) -> Result<()> {
    let addr = bind_addr(config, host.as_deref(), port)?;
    let advisor = build_advisor(config)?;

    let server = web_form::WebFormServer::start(addr, advisor.into_handle())
        .await
        .map_err(with_hint)
        .with_context(|| format!("Failed to start web form on {}", addr))?;
    let bound = server.local_addr();

    match format {
        OutputFormat::Text => {
            println!("Crop advisor listening on http://{}", bound);
            println!("Press Ctrl-C to stop.");
        }
        OutputFormat::Json => {
            let output = json!({
                "status": "listening",
                "address": bound.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Shutdown signal received");

    server.shutdown().await;
    Ok(())
}

/// Answer one question
pub async fn handle_ask(
    request: AdvisoryRequest,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    request.validate().map_err(with_hint)?;
    let advisor = build_advisor(config)?;

    let advice = advisor.answer(&request).await.map_err(with_hint)?;

    match format {
        OutputFormat::Text => {
            println!("{}", advice.answer);
        }
        OutputFormat::Json => {
            let output = json!({
                "answer": advice.answer,
                "context_documents": advice.documents,
                "model": advisor.options().model,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Retrieval input for `context`: the raw text with `--raw`, the labeled block otherwise
pub fn context_source(raw: bool) -> RetrievalSource {
    if raw {
        RetrievalSource::Question
    } else {
        RetrievalSource::Combined
    }
}

/// Context the advisor would inject for a question `text` with blank fields
pub async fn context_for_text(
    config: &Config,
    text: &str,
    source: RetrievalSource,
) -> std::result::Result<Context, AdvisorError> {
    let retriever = DirectoryRetriever::open(&config.corpus.dir)?;
    let query = QueryFields::new(text, "", "", "").retrieval_text(source);

    tokio::task::spawn_blocking(move || retriever.select(&query))
        .await
        .map_err(|e| AdvisorError::CorpusRead(format!("retrieval task failed: {}", e)))?
}

/// Print the context that would be sent for `text`
pub async fn handle_context(
    text: String,
    raw: bool,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let context = context_for_text(config, &text, context_source(raw))
        .await
        .map_err(with_hint)?;

    match format {
        OutputFormat::Text => {
            if context.is_empty() {
                println!("No matching documents.");
            } else {
                for document in context.documents() {
                    println!("--- {} ---", document.key);
                    println!("{}", document.text);
                }
            }
        }
        OutputFormat::Json => {
            let source = if raw { "raw" } else { "combined" };
            let output = json!({
                "query": source,
                "documents": context.documents().iter().map(|d| json!({
                    "key": d.key,
                    "text": d.text,
                })).collect::<Vec<_>>(),
                "context": context.joined(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Where the API key would come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Environment,
    Keychain,
    Missing,
}

impl CredentialStatus {
    /// Probe the environment first, then the keychain
    pub fn probe(config: &Config) -> Self {
        let from_env = std::env::var(&config.llm.api_key_env)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);

        if from_env {
            Self::Environment
        } else if SecretManager::default().has_secret(API_KEY_SECRET) {
            Self::Keychain
        } else {
            Self::Missing
        }
    }
}

/// Outcome of the completion endpoint health check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointStatus {
    Reachable,
    Unreachable,
    /// Not checked because no API key is available
    Skipped,
}

/// Ask the completion endpoint whether it accepts `api_key`
pub async fn probe_endpoint(config: &Config, api_key: SecretString) -> EndpointStatus {
    let settings = CompletionSettings::from_config(&config.llm, api_key);
    let provider = match llm::build_provider(&settings) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::warn!("Could not build completion client: {}", e);
            return EndpointStatus::Unreachable;
        }
    };

    if provider.check_health().await {
        EndpointStatus::Reachable
    } else {
        EndpointStatus::Unreachable
    }
}

/// Result of `doctor`: named checks plus the problems found
#[derive(Debug, Default)]
pub struct DoctorReport {
    pub checks: Vec<(String, String)>,
    pub issues: Vec<String>,
}

impl DoctorReport {
    pub fn healthy(&self) -> bool {
        self.issues.is_empty()
    }

    fn check(&mut self, name: &str, status: impl Into<String>) {
        self.checks.push((name.to_string(), status.into()));
    }
}

/// Diagnose the configuration, corpus, and credential
pub fn diagnose(
    config: &Config,
    config_path: Option<&Path>,
    credential: CredentialStatus,
    endpoint: EndpointStatus,
) -> DoctorReport {
    let mut report = DoctorReport::default();

    // Config is already validated when loaded
    match config_path {
        Some(path) => report.check("Configuration", format!("Valid ({})", path.display())),
        None => report.check("Configuration", "Valid"),
    }

    match DirectoryRetriever::open(&config.corpus.dir) {
        Ok(retriever) => {
            report.check("Corpus directory", format!("{}", config.corpus.dir.display()));
            match retriever.document_keys() {
                Ok(keys) if keys.is_empty() => {
                    report.check("Corpus documents", "0");
                    report.issues.push(format!(
                        "Corpus directory is empty; answers will have no context: {}",
                        config.corpus.dir.display()
                    ));
                }
                Ok(keys) => report.check("Corpus documents", keys.len().to_string()),
                Err(e) => {
                    report.check("Corpus documents", "Unreadable");
                    report.issues.push(e.to_string());
                }
            }
        }
        Err(_) => {
            report.check("Corpus directory", "Missing");
            report.issues.push(format!(
                "Corpus directory does not exist: {}",
                config.corpus.dir.display()
            ));
        }
    }

    report.check("Completion endpoint", config.llm.base_url.clone());
    report.check("Model", config.llm.model.clone());

    match credential {
        CredentialStatus::Environment => {
            report.check("API key", format!("Set (${})", config.llm.api_key_env))
        }
        CredentialStatus::Keychain => report.check("API key", "Set (keychain)"),
        CredentialStatus::Missing => {
            report.check("API key", "Missing");
            report.issues.push(format!(
                "No API key: set ${} or run 'crop-advisor setup'",
                config.llm.api_key_env
            ));
        }
    }

    match endpoint {
        EndpointStatus::Reachable => report.check("Endpoint health", "Reachable"),
        EndpointStatus::Unreachable => {
            report.check("Endpoint health", "Unreachable");
            report.issues.push(format!(
                "Completion endpoint {} is unreachable or rejected the API key",
                config.llm.base_url
            ));
        }
        EndpointStatus::Skipped => report.check("Endpoint health", "Skipped (no API key)"),
    }

    report
}

/// Validate configuration, corpus, credential, and endpoint
pub async fn handle_doctor(
    config: &Config,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let credential = CredentialStatus::probe(config);
    let endpoint = match credential {
        CredentialStatus::Missing => EndpointStatus::Skipped,
        _ => match SecretManager::default().resolve_api_key(&config.llm.api_key_env) {
            Ok(api_key) => probe_endpoint(config, api_key).await,
            Err(_) => EndpointStatus::Skipped,
        },
    };
    let report = diagnose(config, config_path, credential, endpoint);

    match format {
        OutputFormat::Text => {
            println!("Crop Advisor Diagnostics");
            println!("========================");
            println!();

            println!("System Checks:");
            for (check, status) in &report.checks {
                println!("  {:<25} {}", format!("{}:", check), status);
            }

            println!();

            if report.healthy() {
                println!("✓ All checks passed!");
            } else {
                println!("⚠ Issues found:");
                println!();
                for (i, issue) in report.issues.iter().enumerate() {
                    println!("  {}. {}", i + 1, issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": report.checks.iter().map(|(name, status)| {
                    json!({
                        "name": name,
                        "status": status
                    })
                }).collect::<Vec<_>>(),
                "issues": report.issues,
                "healthy": report.healthy()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Prompt for the API key and store it in the OS keychain
pub async fn handle_setup(config: &Config) -> Result<()> {
    let secret_manager = SecretManager::default();

    println!("=== Crop Advisor Setup ===");
    println!();
    println!(
        "The API key is read from ${} first; the keychain is used when it is unset.",
        config.llm.api_key_env
    );

    if secret_manager.has_secret(API_KEY_SECRET) {
        println!("A key is already stored in the keychain; entering a new one replaces it.");
    }

    let key = secret_manager
        .prompt_for_secret(API_KEY_SECRET)
        .map_err(with_hint)?;
    secret_manager
        .set_secret(API_KEY_SECRET, &key)
        .map_err(with_hint)?;

    println!("Stored in keychain.");
    println!();
    println!("Corpus directory: {}", config.corpus.dir.display());
    println!("Run 'crop-advisor doctor' to verify the installation.");
    Ok(())
}
