//! CLI runner - executes commands

use crate::auth::AuthConfig;
use crate::cli::commands::{AuthMode, Cli, Commands, OutputFormat};
use crate::config::{SchemaConfigs, RESERVED_QUERY_KEYS};
use crate::engine::{CheckReport, ExportOptions, Exporter, PullReport};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::session::{ArchiveObserver, HttpQueryExecutor, Session};
use crate::types::OptionStringExt;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check { path } => self.check(path).await,
            Commands::Pull {
                path,
                require_empty,
            } => self.pull(path, *require_empty).await,
            Commands::Schemas => self.schemas(),
        }
    }

    /// Load the export configuration
    fn load_configs(&self) -> Result<SchemaConfigs> {
        SchemaConfigs::from_file(&self.cli.config)
    }

    /// Parse the server URL
    fn server_url(&self) -> Result<Url> {
        let server = self
            .cli
            .server
            .as_deref()
            .ok_or_else(|| Error::missing_field("server (use --server or CAMPAIGN_SERVER)"))?;
        Ok(Url::parse(server)?)
    }

    /// Build the auth configuration from the credential flags
    fn auth_config(&self, server: &Url) -> Result<AuthConfig> {
        if let Some(token) = self.cli.token.clone().none_if_empty() {
            return Ok(AuthConfig::Bearer { token });
        }

        let user = self.cli.user.clone().none_if_empty();
        match (&user, &self.cli.password) {
            (None, None) => Ok(AuthConfig::None),
            (Some(user), Some(password)) => match self.cli.auth {
                AuthMode::Basic => Ok(AuthConfig::Basic {
                    username: user.clone(),
                    password: password.clone(),
                }),
                AuthMode::Session => {
                    let login_url = server.join(&self.cli.login_path)?;
                    Ok(AuthConfig::session(login_url.as_str(), user, password))
                }
            },
            (Some(_), None) => Err(Error::missing_field("password")),
            (None, Some(_)) => Err(Error::missing_field("user")),
        }
    }

    /// Log in and build the session used for every query
    async fn build_session(&self) -> Result<Session> {
        let server = self.server_url()?;
        let auth = self.auth_config(&server)?;
        debug!("Connecting to {} ({} auth)", server, auth.kind());

        let http_config = HttpClientConfig::builder()
            .base_url(server.as_str())
            .timeout(Duration::from_secs(self.cli.timeout))
            .build();
        let client = HttpClient::with_auth(http_config, auth)?;

        if let Some(authenticator) = client.authenticator() {
            authenticator.login().await?;
        }

        let executor = HttpQueryExecutor::new(client).with_query_path(&self.cli.query_path);
        let mut session = Session::new(executor);

        if let Some(dir) = &self.cli.archive {
            info!("Archiving calls under {}", dir.display());
            session = session.with_observer(ArchiveObserver::new(dir));
        }

        Ok(session)
    }

    /// Export options from the flags
    fn export_options(&self, require_empty: bool) -> ExportOptions {
        ExportOptions::new()
            .with_page_size(self.cli.page_size)
            .with_require_empty(require_empty)
            .with_schemas(self.cli.schemas.clone())
    }

    /// Build the exporter for check and pull
    async fn exporter(&self, require_empty: bool) -> Result<Exporter> {
        let configs = self.load_configs()?;
        let session = self.build_session().await?;
        Ok(Exporter::new(session, configs).with_options(self.export_options(require_empty)))
    }

    /// Count records per schema, then validate the destination
    async fn check(&self, path: &Path) -> Result<()> {
        let exporter = self.exporter(false).await?;
        let report = exporter.check(path).await?;
        self.output_check(&report);
        Ok(())
    }

    /// Export every schema
    async fn pull(&self, path: &Path, require_empty: bool) -> Result<()> {
        let exporter = self.exporter(require_empty).await?;
        let report = exporter.pull(path).await?;
        self.output_pull(&report);
        Ok(())
    }

    /// List configured schemas
    fn schemas(&self) -> Result<()> {
        let configs = self.load_configs()?;
        let default = configs.default_config();

        match self.cli.format {
            OutputFormat::Json => {
                let schemas: Vec<Value> = configs
                    .schema_ids()
                    .map(|id| {
                        let config = configs.lookup(id);
                        json!({
                            "schema": id,
                            "filename": config.filename.as_str(),
                            "queryDef": config.query_override,
                        })
                    })
                    .collect();
                self.output_message(&json!({
                    "type": "SCHEMAS",
                    "default": {
                        "filename": default.filename.as_str(),
                        "queryDef": default.query_override,
                    },
                    "schemas": schemas,
                    "reservedQueryKeys": RESERVED_QUERY_KEYS
                }));
            }
            OutputFormat::Text => {
                println!("default\t{}", default.filename);
                for id in configs.schema_ids() {
                    println!("{id}\t{}", configs.filename_template(id));
                }
                println!(
                    "(queryDef may not override: {})",
                    RESERVED_QUERY_KEYS.join(", ")
                );
            }
        }

        Ok(())
    }

    fn output_check(&self, report: &CheckReport) {
        match self.cli.format {
            OutputFormat::Json => {
                for entry in &report.counts {
                    self.output_message(&json!({ "type": "COUNT", "count": entry }));
                }
                self.output_message(&json!({
                    "type": "SUMMARY",
                    "destination": report.destination,
                    "total": report.total(),
                    "warnings": report.warnings()
                }));
            }
            OutputFormat::Text => {
                for entry in &report.counts {
                    match (entry.count, &entry.warning) {
                        (Some(count), _) => println!("{}: {count} records", entry.schema_id),
                        (None, Some(warning)) => {
                            println!("{}: WARNING {warning}", entry.schema_id);
                        }
                        (None, None) => {}
                    }
                }
                println!(
                    "{} records to export to {}",
                    report.total(),
                    report.destination.display()
                );
            }
        }
    }

    fn output_pull(&self, report: &PullReport) {
        match self.cli.format {
            OutputFormat::Json => {
                for schema in &report.schemas {
                    self.output_message(&json!({ "type": "SCHEMA", "schema": schema }));
                }
                self.output_message(&json!({
                    "type": "SUMMARY",
                    "destination": report.destination,
                    "total": report.total_records(),
                    "failed": report.failed().count(),
                    "durationMs": report.duration_ms
                }));
            }
            OutputFormat::Text => {
                for schema in &report.schemas {
                    match &schema.error {
                        None => println!(
                            "{}: {} records",
                            schema.schema_id, schema.records_written
                        ),
                        Some(error) => println!(
                            "{}: {} records (stopped: {error})",
                            schema.schema_id, schema.records_written
                        ),
                    }
                }
                println!(
                    "Exported {} records to {} in {}ms",
                    report.total_records(),
                    report.destination.display(),
                    report.duration_ms
                );
            }
        }
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        println!("{}", serde_json::to_string(msg).unwrap_or_default());
    }
}
