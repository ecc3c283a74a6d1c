// crates/paygate-cli/src/main.rs
// ============================================================================
// Module: Paygate CLI Entry Point
// Description: Command dispatcher for gateway configuration checks.
// Purpose: Let operators validate secrets, preview fees, and verify webhooks.
// Dependencies: clap, paygate-config, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `paygate` binary initializes a [`GatewayPolicy`] exactly the way a
//! service would at startup and reports the result. Configuration failures
//! exit non-zero with the offending field on stderr, next to the generic
//! message end users would see. Security posture: secret values are never
//! printed; inputs are untrusted and size-limited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use paygate_cli::report::CheckReport;
use paygate_cli::report::FeeReport;
use paygate_cli::report::build_source;
use paygate_cli::t;
use paygate_config::ConfigError;
use paygate_config::FilePolicyAuditSink;
use paygate_config::GatewayPolicy;
use paygate_config::PolicyAuditSink;
use paygate_config::StderrPolicyAuditSink;
use paygate_config::webhook::DEFAULT_SIGNATURE_TOLERANCE_SECS;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a stored webhook payload.
const MAX_WEBHOOK_PAYLOAD_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "paygate", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Append audit records to this file instead of stderr.
    #[arg(long, value_name = "PATH", global = true)]
    audit_log: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize the gateway policy and print its settings.
    Check(CheckCommand),
    /// Preview the platform fee split for a donation amount.
    Fee(FeeCommand),
    /// Verify a stored webhook payload against its signature header.
    VerifyWebhook(VerifyWebhookCommand),
}

/// Options selecting where secrets are read from.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Optional TOML secrets file layered beneath environment variables.
    #[arg(long, value_name = "PATH")]
    secrets_file: Option<PathBuf>,
    /// Prefix prepended to every environment variable name.
    #[arg(long, value_name = "PREFIX")]
    env_prefix: Option<String>,
}

/// Configuration for the `check` command.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Secrets source options.
    #[command(flatten)]
    source: SourceArgs,
    /// Also resolve the publishable key and webhook secret.
    #[arg(long, action = ArgAction::SetTrue)]
    require_all: bool,
}

/// Configuration for the `fee` command.
#[derive(Args, Debug)]
struct FeeCommand {
    /// Secrets source options.
    #[command(flatten)]
    source: SourceArgs,
    /// Donation amount in minor currency units.
    #[arg(long, value_name = "MINOR_UNITS")]
    amount: u64,
}

/// Configuration for the `verify-webhook` command.
#[derive(Args, Debug)]
struct VerifyWebhookCommand {
    /// Secrets source options.
    #[command(flatten)]
    source: SourceArgs,
    /// Path to the raw webhook body.
    #[arg(long, value_name = "PATH")]
    payload: PathBuf,
    /// Signature header value (`t=...,v1=...`).
    #[arg(long, value_name = "HEADER")]
    signature: String,
    /// Accepted clock skew in seconds.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_SIGNATURE_TOLERANCE_SECS)]
    tolerance_secs: u64,
    /// Verification time in unix seconds (defaults to now).
    #[arg(long, value_name = "SECS")]
    now: Option<u64>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let audit = build_audit_sink(cli.audit_log.as_deref())?;
    match command {
        Commands::Check(command) => command_check(&command, audit),
        Commands::Fee(command) => command_fee(&command, audit),
        Commands::VerifyWebhook(command) => command_verify_webhook(&command, audit),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `check` command.
fn command_check(command: &CheckCommand, audit: Arc<dyn PolicyAuditSink>) -> CliResult<ExitCode> {
    let policy = initialize_policy(&command.source, audit)?;
    let mut report = CheckReport::from_policy(&policy);
    if command.require_all {
        report = report.require_secondary(&policy).map_err(|err| config_error(&err))?;
    }
    write_json("check", &report)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `fee` command.
fn command_fee(command: &FeeCommand, audit: Arc<dyn PolicyAuditSink>) -> CliResult<ExitCode> {
    let policy = initialize_policy(&command.source, audit)?;
    let report = FeeReport::new(policy.application_fee_percentage(), command.amount);
    write_json("fee", &report)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `verify-webhook` command.
fn command_verify_webhook(
    command: &VerifyWebhookCommand,
    audit: Arc<dyn PolicyAuditSink>,
) -> CliResult<ExitCode> {
    let policy = initialize_policy(&command.source, audit)?;
    let secret = policy.webhook_secret().map_err(|err| config_error(&err))?;
    let payload = read_payload(&command.payload)?;
    let now = match command.now {
        Some(now) => now,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| CliError::new(t!("clock.unavailable")))?
            .as_secs(),
    };
    secret
        .verify_with_tolerance(&payload, &command.signature, now, command.tolerance_secs)
        .map_err(|err| CliError::new(t!("webhook.rejected", error = err)))?;
    write_stdout_line(&t!("webhook.verified"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Policy Helpers
// ============================================================================

/// Builds the audit sink selected by `--audit-log`.
fn build_audit_sink(path: Option<&Path>) -> CliResult<Arc<dyn PolicyAuditSink>> {
    let Some(path) = path else {
        return Ok(Arc::new(StderrPolicyAuditSink));
    };
    let sink = FilePolicyAuditSink::new(path).map_err(|err| {
        CliError::new(t!("audit.open_failed", path = path.display(), error = err))
    })?;
    Ok(Arc::new(sink))
}

/// Loads secrets and initializes the gateway policy.
fn initialize_policy(
    source: &SourceArgs,
    audit: Arc<dyn PolicyAuditSink>,
) -> CliResult<GatewayPolicy> {
    let secrets = build_source(source.secrets_file.as_deref(), source.env_prefix.as_deref())
        .map_err(|err| {
            let path = source.secrets_file.as_deref().unwrap_or_else(|| Path::new("-"));
            CliError::new(t!("source.load_failed", path = path.display(), error = err))
        })?;
    GatewayPolicy::initialize(secrets, audit).map_err(|err| config_error(&err))
}

/// Renders a configuration error for operators.
fn config_error(err: &ConfigError) -> CliError {
    let public = err.public_message();
    match err.field() {
        Some(field) => CliError::new(t!(
            "policy.invalid_field",
            field = field,
            error = err,
            public = public
        )),
        None => CliError::new(t!("policy.source_failed", error = err, public = public)),
    }
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    // The file may grow between the metadata check and the read.
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads a stored webhook body.
fn read_payload(path: &Path) -> CliResult<Vec<u8>> {
    read_bytes_with_limit(path, MAX_WEBHOOK_PAYLOAD_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => CliError::new(t!(
            "input.read_failed",
            kind = "webhook payload",
            path = path.display(),
            error = err
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = "webhook payload",
            path = path.display(),
            size = size,
            limit = limit
        )),
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a report as pretty JSON to stdout.
fn write_json<T: Serialize>(kind: &str, value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("output.render_failed", kind = kind, error = err)))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
