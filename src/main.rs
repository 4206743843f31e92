use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use chrono::NaiveDate;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use clinicq::adapters::xh::XhTransport;
use clinicq::api::ApiClient;
use clinicq::cmd::{api, prepare, scrub, time};
use clinicq::config::{ClientConfig, ConfigError};
use clinicq::domain::error::{
    ApiError, PrepareCommandError, ScrubError, TimestampError, TransportError,
};
use clinicq::domain::resource::{ListQuery, Resource};
use clinicq::io::{self as clinicq_io, Format, IoError};
use clinicq::util::time::{ExplicitOffset, NormalizeOptions, Zone, today_in};
use serde::Serialize;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "clinicq",
    version,
    about = "Normalize, scrub and submit clinic backend payloads"
)]
struct Cli {
    /// TOML settings file (defaults to $CLINICQ_CONFIG).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log requests and decisions to stderr.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Normalize one local date/time to a canonical UTC timestamp.
    Time(TimeArgs),
    /// Print the canonical bounds of one local calendar day.
    Today(TodayArgs),
    /// Drop empty fields from payload documents.
    Scrub(ScrubArgs),
    /// Normalize a resource's date fields, then scrub.
    Prepare(PrepareArgs),
    /// Call the clinic backend.
    Api(ApiArgs),
}

#[derive(Debug, clap::Args)]
struct ZoneArgs {
    /// UTC offset of the wall clock (`+02:00`, `UTC`, `local`).
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<Zone>,

    /// How to read strings carrying a numeric offset.
    #[arg(long, value_enum)]
    explicit_offset: Option<CliExplicitOffset>,
}

#[derive(Debug, clap::Args)]
struct TimeArgs {
    value: String,

    #[command(flatten)]
    zone: ZoneArgs,
}

#[derive(Debug, clap::Args)]
struct TodayArgs {
    /// Day to bound instead of today.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long, allow_hyphen_values = true)]
    offset: Option<Zone>,
}

#[derive(Debug, clap::Args)]
struct ScrubArgs {
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long, value_enum)]
    from: Option<CliFormat>,

    #[arg(long, value_enum)]
    to: Option<CliFormat>,
}

#[derive(Debug, clap::Args)]
struct PrepareArgs {
    #[arg(long)]
    resource: Resource,

    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long, value_enum)]
    from: Option<CliFormat>,

    #[arg(long, value_enum)]
    to: Option<CliFormat>,

    #[command(flatten)]
    zone: ZoneArgs,
}

#[derive(Debug, clap::Args)]
struct ApiArgs {
    /// Backend origin, e.g. `http://localhost:5000`.
    #[arg(long)]
    base_url: Option<String>,

    #[command(flatten)]
    zone: ZoneArgs,

    #[command(subcommand)]
    action: ApiCommand,
}

#[derive(Debug, Subcommand)]
enum ApiCommand {
    /// GET a collection, optionally filtered.
    List {
        #[arg(long)]
        resource: Resource,
        /// `key=value`, repeatable.
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// List appointments of one local day (today by default).
    Today {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// GET one document.
    Get {
        #[arg(long)]
        resource: Resource,
        #[arg(long)]
        id: String,
    },
    /// POST a prepared body.
    Create {
        #[arg(long)]
        resource: Resource,
        #[command(flatten)]
        body: BodyArgs,
        /// Fetch the created document back.
        #[arg(long, default_value_t = false)]
        fetch: bool,
    },
    /// PATCH a prepared partial body.
    Update {
        #[arg(long)]
        resource: Resource,
        #[arg(long)]
        id: String,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// DELETE one document.
    Delete {
        #[arg(long)]
        resource: Resource,
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, clap::Args)]
struct BodyArgs {
    /// Body document; stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long, value_enum)]
    from: Option<CliFormat>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Json,
    Jsonl,
    Yaml,
}

impl From<CliFormat> for Format {
    fn from(value: CliFormat) -> Self {
        match value {
            CliFormat::Json => Self::Json,
            CliFormat::Jsonl => Self::Jsonl,
            CliFormat::Yaml => Self::Yaml,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliExplicitOffset {
    Honor,
    WallClock,
}

impl From<CliExplicitOffset> for ExplicitOffset {
    fn from(value: CliExplicitOffset) -> Self {
        match value {
            CliExplicitOffset::Honor => Self::Honor,
            CliExplicitOffset::WallClock => Self::WallClock,
        }
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("filter `{raw}` must be key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("filter `{raw}` has an empty key"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[derive(Serialize)]
struct CliError<'a> {
    error: &'a str,
    message: String,
    code: i32,
    details: Value,
}

/// Failure of one command, already mapped to its exit code.
struct Failure {
    kind: &'static str,
    message: String,
    code: i32,
    details: Value,
}

impl Failure {
    fn usage(message: impl Into<String>, details: Value) -> Self {
        Self {
            kind: "input_usage_error",
            message: message.into(),
            code: 3,
            details,
        }
    }

    fn internal(message: impl Into<String>, details: Value) -> Self {
        Self {
            kind: "internal_error",
            message: message.into(),
            code: 1,
            details,
        }
    }
}

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return handle_parse_error(error),
    };
    init_tracing(cli.verbose);

    let config = match ClientConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            return report(Failure::usage(
                error.to_string(),
                config_details(&error, cli.config.as_deref()),
            ));
        }
    };

    let outcome = match cli.command {
        Commands::Time(args) => run_time(args, &config),
        Commands::Today(args) => run_today(args, &config),
        Commands::Scrub(args) => run_scrub(args),
        Commands::Prepare(args) => run_prepare(args, &config),
        Commands::Api(args) => run_api(args, &config),
    };
    match outcome {
        Ok(()) => 0,
        Err(failure) => report(failure),
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "clinicq=debug" } else { "clinicq=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn handle_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{error}");
            0
        }
        _ => report(Failure::usage(
            error.to_string(),
            json!({"kind": "cli_parse_error"}),
        )),
    }
}

fn normalize_options(args: &ZoneArgs, config: &ClientConfig) -> NormalizeOptions {
    let mut options = config.normalize_options();
    if let Some(zone) = args.offset {
        options.zone = zone;
    }
    if let Some(policy) = args.explicit_offset {
        options.explicit_offset = policy.into();
    }
    options
}

fn run_time(args: TimeArgs, config: &ClientConfig) -> Result<(), Failure> {
    let options = normalize_options(&args.zone, config);
    let normalized = time::normalize(&args.value, options)
        .map_err(|error| timestamp_failure(&error, "time"))?;
    emit_json_stdout(&normalized, "time")
}

fn run_today(args: TodayArgs, config: &ClientConfig) -> Result<(), Failure> {
    let zone = args.offset.unwrap_or(config.zone);
    let date = args.date.unwrap_or_else(|| today_in(zone));
    let window =
        time::day_window(date, zone).map_err(|error| timestamp_failure(&error, "today"))?;
    emit_json_stdout(&window, "today")
}

fn run_scrub(args: ScrubArgs) -> Result<(), Failure> {
    let input_format = resolve_input(args.from, args.input.as_deref(), "scrub")?;
    let output_format = args.to.map(Into::into).unwrap_or(Format::Json);
    let input = open_input(args.input.as_deref(), "scrub")?;
    let stdout = io::stdout();
    scrub::run(input, stdout.lock(), input_format, output_format).map_err(|error| {
        let details = json!({"command": "scrub"});
        match &error {
            ScrubError::WriteOutput {
                source: IoError::Io(_),
                ..
            } => Failure::internal(error.to_string(), details),
            _ => Failure::usage(error.to_string(), details),
        }
    })
}

fn run_prepare(args: PrepareArgs, config: &ClientConfig) -> Result<(), Failure> {
    let input_format = resolve_input(args.from, args.input.as_deref(), "prepare")?;
    let output_format = args.to.map(Into::into).unwrap_or(Format::Json);
    let options = prepare::PrepareCommandOptions {
        resource: args.resource,
        normalize: normalize_options(&args.zone, config),
    };
    let input = open_input(args.input.as_deref(), "prepare")?;
    let stdout = io::stdout();
    prepare::run(input, stdout.lock(), input_format, output_format, options).map_err(|error| {
        let details = match &error {
            PrepareCommandError::Prepare { index, .. } => {
                json!({"command": "prepare", "resource": args.resource.as_str(), "index": index})
            }
            _ => json!({"command": "prepare", "resource": args.resource.as_str()}),
        };
        match &error {
            PrepareCommandError::WriteOutput {
                source: IoError::Io(_),
                ..
            } => Failure::internal(error.to_string(), details),
            _ => Failure::usage(error.to_string(), details),
        }
    })
}

fn run_api(args: ApiArgs, config: &ClientConfig) -> Result<(), Failure> {
    let options = normalize_options(&args.zone, config);
    let base_url = args.base_url.unwrap_or_else(|| config.base_url.clone());
    let client = ApiClient::new(XhTransport::new(config.xh_bin.clone()), base_url, options);

    let (resource, action) = match args.action {
        ApiCommand::List { resource, filters } => {
            let mut query = ListQuery::new();
            for (key, value) in filters {
                query.push(key, value);
            }
            (resource, api::ApiAction::List { query })
        }
        ApiCommand::Today { date } => (
            Resource::Appointments,
            api::ApiAction::AppointmentsOn {
                date: date.unwrap_or_else(|| today_in(options.zone)),
            },
        ),
        ApiCommand::Get { resource, id } => (resource, api::ApiAction::Get { id }),
        ApiCommand::Create {
            resource,
            body,
            fetch,
        } => (
            resource,
            api::ApiAction::Create {
                body: read_body(&body)?,
                fetch,
            },
        ),
        ApiCommand::Update { resource, id, body } => (
            resource,
            api::ApiAction::Update {
                id,
                body: read_body(&body)?,
            },
        ),
        ApiCommand::Delete { resource, id } => (resource, api::ApiAction::Delete { id }),
    };

    let action_name = action.name();
    let value = api::run(&client, resource, action)
        .map_err(|error| api_failure(error, resource, action_name))?;
    emit_json_stdout(&value, "api")
}

fn read_body(args: &BodyArgs) -> Result<Value, Failure> {
    let format = resolve_input(args.from, args.input.as_deref(), "api")?;
    let input = open_input(args.input.as_deref(), "api")?;
    let mut documents = clinicq_io::read_documents(input, format).map_err(|error| {
        Failure::usage(
            format!("failed to read {format} body: {error}"),
            json!({"command": "api"}),
        )
    })?;
    if documents.len() != 1 {
        return Err(Failure::usage(
            format!("body must contain exactly one document, got {}", documents.len()),
            json!({"command": "api"}),
        ));
    }
    Ok(documents.remove(0))
}

fn resolve_input(
    explicit: Option<CliFormat>,
    path: Option<&Path>,
    command: &str,
) -> Result<Format, Failure> {
    clinicq_io::resolve_format(explicit.map(Into::into), path, Format::Json).map_err(|error| {
        Failure::usage(error.to_string(), json!({"command": command, "input": path}))
    })
}

fn open_input(path: Option<&Path>, command: &str) -> Result<Box<dyn Read>, Failure> {
    match path {
        Some(path) => File::open(path)
            .map(|file| Box::new(file) as Box<dyn Read>)
            .map_err(|err| {
                Failure::usage(
                    format!("failed to open input file `{}`: {err}", path.display()),
                    json!({"command": command, "input": path}),
                )
            }),
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn timestamp_failure(error: &TimestampError, command: &str) -> Failure {
    Failure::usage(error.to_string(), json!({"command": command}))
}

fn api_failure(error: ApiError, resource: Resource, action: &str) -> Failure {
    let details = json!({"command": "api", "resource": resource.as_str(), "action": action});
    match error {
        ApiError::Transport(TransportError::Status {
            status,
            status_text,
            body,
        }) => {
            let message = format!("HTTP {status} {status_text} - {body}");
            Failure {
                kind: "http_status_error",
                message,
                code: 2,
                details: json!({
                    "command": "api",
                    "resource": resource.as_str(),
                    "action": action,
                    "status": status,
                    "status_text": status_text,
                    "body": body,
                }),
            }
        }
        ApiError::Transport(TransportError::Unavailable) => {
            Failure::usage("api requires `xh` in PATH", details)
        }
        ApiError::Transport(other) => Failure::internal(other.to_string(), details),
        ApiError::Json(error) => Failure::internal(error.to_string(), details),
        empty @ ApiError::EmptyResponse { .. } => Failure::internal(empty.to_string(), details),
        other => Failure::usage(other.to_string(), details),
    }
}

fn config_details(error: &ConfigError, path: Option<&Path>) -> Value {
    match error {
        ConfigError::InvalidOffset { value, .. } => json!({"kind": "config", "utc_offset": value}),
        _ => json!({"kind": "config", "path": path}),
    }
}

fn emit_json_stdout<T: Serialize>(value: &T, command: &str) -> Result<(), Failure> {
    let serialized = serde_json::to_string(value).map_err(|error| {
        Failure::internal(
            format!("failed to serialize {command} output: {error}"),
            json!({"command": command}),
        )
    })?;
    println!("{serialized}");
    Ok(())
}

fn report(failure: Failure) -> i32 {
    let payload = CliError {
        error: failure.kind,
        message: failure.message,
        code: failure.code,
        details: failure.details,
    };
    match serde_json::to_string(&payload) {
        Ok(serialized) => eprintln!("{serialized}"),
        Err(_) => eprintln!(
            "{{\"error\":\"internal_error\",\"message\":\"failed to serialize error\",\"code\":1}}"
        ),
    }
    failure.code
}
