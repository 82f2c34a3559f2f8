//! # Lumino CLI Application
//!
//! Command-line interface to the Lumino fine-tuning API, built on the
//! `lumino` client library.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands mirroring the client's services:
//!   - `user`: show, rename or delete the account and manage its settings
//!   - `api-keys`: manage API keys
//!   - `datasets`: upload, inspect, download and delete datasets
//!   - `jobs`: create, monitor, cancel and delete fine-tuning jobs
//!   - `models`: browse, compare and manage base and fine-tuned models
//!   - `usage`: costs and usage records
//!   - `credits`: credit history
//!
//! Results are printed to stdout as pretty JSON. Logs go to stderr and are
//! controlled by `RUST_LOG` or `--verbose`.

mod telemetry;

use anyhow::anyhow;
use chrono::{NaiveDate, Utc};
use clap::{Args, CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use lumino::types::{
    ApiKeyCreate, ApiKeyUpdate, ComputeProvider, DatasetCreate, DatasetUpdate, FineTuningJob,
    FineTuningJobCreate, FineTuningJobParameters, FineTuningJobStatus, FineTuningJobType,
    JsonObject, ListOptions, ServiceName, UserUpdate,
};
use lumino::{Client, ClientConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;
use tracing::instrument;

#[derive(Parser)]
#[command(author, version, about = "Command-line client for the Lumino fine-tuning API", long_about = None)]
struct Cli {
    /// API key used to authenticate
    #[arg(long, env = "LUMINO_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Base URL of the Lumino API
    #[arg(long, env = "LUMINO_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show or update the authenticated user
    #[command(subcommand)]
    User(UserCommand),

    /// Manage API keys
    #[command(subcommand)]
    ApiKeys(ApiKeysCommand),

    /// Manage datasets
    #[command(subcommand)]
    Datasets(DatasetsCommand),

    /// Manage fine-tuning jobs
    #[command(subcommand)]
    Jobs(JobsCommand),

    /// Browse, compare and manage models
    #[command(subcommand)]
    Models(ModelsCommand),

    /// Report usage and costs
    #[command(subcommand)]
    Usage(UsageCommand),

    /// Show credit history
    Credits(CreditsArgs),
}

#[derive(Args, Debug, Clone, Copy)]
struct PageArgs {
    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    page: u32,

    /// Number of items per page
    #[arg(long, default_value = "20")]
    items_per_page: u32,
}

impl PageArgs {
    fn options(self) -> ListOptions {
        ListOptions::page(self.page).with_items_per_page(self.items_per_page)
    }
}

#[derive(Args, Debug, Clone, Copy)]
struct DateRangeArgs {
    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    start_date: NaiveDate,

    /// Last day of the range (YYYY-MM-DD)
    #[arg(long)]
    end_date: NaiveDate,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Show the authenticated user
    Get,

    /// Rename the authenticated user
    Update {
        #[arg(long)]
        name: String,
    },

    /// Show account settings
    Settings,

    /// Update account settings from a JSON object
    UpdateSettings {
        /// Settings to change, e.g. '{"theme": "dark"}'
        #[arg(value_parser = parse_json_object)]
        settings: JsonObject,
    },

    /// Permanently delete the account
    DeleteAccount {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ApiKeysCommand {
    /// List API keys
    List(PageArgs),

    /// Create an API key and print its secret
    Create {
        #[arg(long)]
        name: String,

        /// Days until the key expires
        #[arg(long, default_value = "30")]
        expires_in_days: i64,
    },

    /// Show an API key
    Get { name: String },

    /// Rename an API key or change its expiration
    Update {
        name: String,

        #[arg(long)]
        new_name: Option<String>,

        /// Days from now until the key expires
        #[arg(long)]
        expires_in_days: Option<i64>,
    },

    /// Revoke an API key
    Revoke { name: String },
}

#[derive(Subcommand, Debug)]
enum DatasetsCommand {
    /// List datasets
    List(PageArgs),

    /// Upload a dataset file
    Upload {
        /// Local file to upload
        file: PathBuf,

        /// Dataset name
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Show a dataset
    Get { name: String },

    /// Rename a dataset or change its description
    Update {
        name: String,

        #[arg(long)]
        new_name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a dataset
    Delete { name: String },

    /// Download a dataset's file
    Download {
        name: String,

        /// Where to write the file
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum JobsCommand {
    /// List fine-tuning jobs
    List {
        #[command(flatten)]
        page: PageArgs,

        /// Only list jobs with this status
        #[arg(long, value_parser = parse_wire::<FineTuningJobStatus>)]
        status: Option<FineTuningJobStatus>,
    },

    /// Create a fine-tuning job
    Create(CreateJobArgs),

    /// Show a job with its parameters and metrics
    Get { name: String },

    /// Poll a job until it stops changing state
    Watch {
        name: String,

        /// Seconds between polls
        #[arg(long, default_value = "10")]
        interval: u64,
    },

    /// Cancel a job
    Cancel { name: String },

    /// Delete a job
    Delete { name: String },
}

#[derive(Args, Debug)]
struct CreateJobArgs {
    /// Job name
    #[arg(long)]
    name: String,

    /// Base model to fine-tune
    #[arg(long)]
    base_model: String,

    /// Dataset to train on
    #[arg(long)]
    dataset: String,

    /// Fine-tuning type (full, lora, qlora)
    #[arg(long = "type", value_parser = parse_wire::<FineTuningJobType>)]
    job_type: Option<FineTuningJobType>,

    /// Compute provider (gcp, lum)
    #[arg(long, default_value = "gcp", value_parser = parse_wire::<ComputeProvider>)]
    provider: ComputeProvider,

    #[arg(long, default_value = "2")]
    batch_size: u32,

    #[arg(long, default_value = "1")]
    num_epochs: u32,

    /// Learning rate
    #[arg(long, default_value = "0.0003")]
    lr: f64,

    #[arg(long)]
    seed: Option<u64>,

    /// Keep the dataset order
    #[arg(long)]
    no_shuffle: bool,

    #[arg(long)]
    use_lora: bool,

    #[arg(long)]
    use_qlora: bool,
}

impl CreateJobArgs {
    fn into_request(self) -> FineTuningJobCreate {
        let parameters = FineTuningJobParameters {
            batch_size: self.batch_size,
            shuffle: !self.no_shuffle,
            num_epochs: self.num_epochs,
            use_lora: self.use_lora,
            use_qlora: self.use_qlora,
            lr: self.lr,
            seed: self.seed,
        };

        let mut request = FineTuningJobCreate::new(self.base_model, self.dataset, self.name)
            .with_provider(self.provider)
            .with_parameters(parameters);
        if let Some(job_type) = self.job_type {
            request = request.with_type(job_type);
        }
        request
    }
}

#[derive(Subcommand, Debug)]
enum ModelsCommand {
    /// List base models
    ListBase(PageArgs),

    /// Show a base model
    GetBase { name: String },

    /// List fine-tuned models
    ListFineTuned(PageArgs),

    /// Show a fine-tuned model
    GetFineTuned { name: String },

    /// Delete a fine-tuned model
    DeleteFineTuned { name: String },

    /// Show performance metrics of a model
    Performance { name: String },

    /// Compare performance metrics of several models
    Compare {
        #[arg(required = true, num_args = 2..)]
        names: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum UsageCommand {
    /// Total cost over a date range
    TotalCost(DateRangeArgs),

    /// Usage records over a date range
    Records {
        #[command(flatten)]
        range: DateRangeArgs,

        #[command(flatten)]
        page: PageArgs,

        /// Only list records for this service
        #[arg(long, value_parser = parse_wire::<ServiceName>)]
        service_name: Option<ServiceName>,
    },
}

#[derive(Args, Debug)]
struct CreditsArgs {
    #[command(flatten)]
    range: DateRangeArgs,

    #[command(flatten)]
    page: PageArgs,
}

fn parse_json_object(value: &str) -> Result<JsonObject, String> {
    serde_json::from_str(value).map_err(|e| format!("expected a JSON object: {e}"))
}

/// Parse a command-line value into an API enum, accepting any case and
/// dashes for underscores
fn parse_wire<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    let wire = value.to_uppercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(wire))
        .map_err(|_| format!("unrecognized value '{value}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let directive = if cli.verbose { "lumino=debug" } else { "warn" };
    let _otel = telemetry::init_tracing_subscriber(directive)?;

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let api_key = cli
        .api_key
        .ok_or_else(|| anyhow!("No API key given; pass --api-key or set LUMINO_API_KEY"))?;
    let mut builder = ClientConfig::builder().api_key(api_key);
    if let Some(base_url) = cli.base_url {
        builder = builder.base_url(base_url);
    }
    if let Some(timeout) = cli.timeout {
        builder = builder.timeout(Duration::from_secs(timeout));
    }
    let client = Client::with_config(builder.build()?)?;

    // The session closes when the guard drops, including on error
    let session = client.session()?;

    match command {
        Commands::User(cmd) => user_command(&session, cmd).await,
        Commands::ApiKeys(cmd) => api_keys_command(&session, cmd).await,
        Commands::Datasets(cmd) => datasets_command(&session, cmd).await,
        Commands::Jobs(cmd) => jobs_command(&session, cmd).await,
        Commands::Models(cmd) => models_command(&session, cmd).await,
        Commands::Usage(cmd) => usage_command(&session, cmd).await,
        Commands::Credits(args) => credits_command(&session, args).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn spinner(message: impl Into<String>) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn days_from_now(days: i64) -> chrono::DateTime<Utc> {
    Utc::now() + chrono::Duration::days(days)
}

#[instrument(skip(client))]
async fn user_command(client: &Client, cmd: UserCommand) -> anyhow::Result<()> {
    let user = client.user();
    match cmd {
        UserCommand::Get => print_json(&user.get_current_user().await?),
        UserCommand::Update { name } => {
            let update = UserUpdate { name: Some(name) };
            print_json(&user.update_current_user(&update).await?)
        }
        UserCommand::Settings => print_json(&user.get_account_settings().await?),
        UserCommand::UpdateSettings { settings } => {
            print_json(&user.update_account_settings(&settings).await?)
        }
        UserCommand::DeleteAccount { yes } => {
            if !yes {
                return Err(anyhow!("Refusing to delete the account without --yes"));
            }
            print_json(&user.delete_account().await?)
        }
    }
}

#[instrument(skip(client))]
async fn api_keys_command(client: &Client, cmd: ApiKeysCommand) -> anyhow::Result<()> {
    let api_keys = client.api_keys();
    match cmd {
        ApiKeysCommand::List(page) => print_json(&api_keys.list(page.options()).await?),
        ApiKeysCommand::Create {
            name,
            expires_in_days,
        } => {
            let request = ApiKeyCreate::new(name, days_from_now(expires_in_days));
            let created = api_keys.create(&request).await?;
            eprintln!("Store the secret now; it will not be shown again.");
            print_json(&created)
        }
        ApiKeysCommand::Get { name } => print_json(&api_keys.get(&name).await?),
        ApiKeysCommand::Update {
            name,
            new_name,
            expires_in_days,
        } => {
            let update = ApiKeyUpdate {
                name: new_name,
                expires_at: expires_in_days.map(days_from_now),
            };
            print_json(&api_keys.update(&name, &update).await?)
        }
        ApiKeysCommand::Revoke { name } => print_json(&api_keys.revoke(&name).await?),
    }
}

#[instrument(skip(client))]
async fn datasets_command(client: &Client, cmd: DatasetsCommand) -> anyhow::Result<()> {
    let datasets = client.datasets();
    match cmd {
        DatasetsCommand::List(page) => print_json(&datasets.list(page.options()).await?),
        DatasetsCommand::Upload {
            file,
            name,
            description,
        } => {
            let mut request = DatasetCreate::new(name);
            if let Some(description) = description {
                request = request.with_description(description);
            }

            let progress = spinner(format!("Uploading {}...", file.display()))?;
            let result = datasets.upload(&file, &request).await;
            progress.finish_and_clear();
            print_json(&result?)
        }
        DatasetsCommand::Get { name } => print_json(&datasets.get(&name).await?),
        DatasetsCommand::Update {
            name,
            new_name,
            description,
        } => {
            let update = DatasetUpdate {
                name: new_name,
                description,
            };
            print_json(&datasets.update(&name, &update).await?)
        }
        DatasetsCommand::Delete { name } => {
            datasets.delete(&name).await?;
            println!("Deleted dataset {}", name);
            Ok(())
        }
        DatasetsCommand::Download { name, output } => {
            let progress = spinner(format!("Downloading {}...", name))?;
            let result = datasets.download(&name, &output).await;
            progress.finish_and_clear();
            println!("Wrote {} bytes to {}", result?, output.display());
            Ok(())
        }
    }
}

fn job_progress(job: &FineTuningJob) -> String {
    let mut message = format!("{}: {}", job.name, job.status);
    if let (Some(epoch), Some(total)) = (job.current_epoch, job.total_epochs) {
        message.push_str(&format!(" epoch {}/{}", epoch, total));
    }
    if let (Some(step), Some(total)) = (job.current_step, job.total_steps) {
        message.push_str(&format!(" step {}/{}", step, total));
    }
    message
}

#[instrument(skip(client))]
async fn jobs_command(client: &Client, cmd: JobsCommand) -> anyhow::Result<()> {
    let jobs = client.fine_tuning();
    match cmd {
        JobsCommand::List { page, status } => print_json(&jobs.list(page.options(), status).await?),
        JobsCommand::Create(args) => print_json(&jobs.create(&args.into_request()).await?),
        JobsCommand::Get { name } => print_json(&jobs.get(&name).await?),
        JobsCommand::Watch { name, interval } => {
            let progress = spinner(format!("Waiting for {}...", name))?;
            let detail = loop {
                let detail = match jobs.get(&name).await {
                    Ok(detail) => detail,
                    Err(e) => {
                        progress.abandon();
                        return Err(e.into());
                    }
                };
                progress.set_message(job_progress(&detail.job));
                if detail.job.status.is_terminal() {
                    break detail;
                }
                tokio::time::sleep(Duration::from_secs(interval)).await;
            };
            progress.finish_with_message(job_progress(&detail.job));
            print_json(&detail)
        }
        JobsCommand::Cancel { name } => print_json(&jobs.cancel(&name).await?),
        JobsCommand::Delete { name } => {
            jobs.delete(&name).await?;
            println!("Deleted fine-tuning job {}", name);
            Ok(())
        }
    }
}

#[instrument(skip(client))]
async fn models_command(client: &Client, cmd: ModelsCommand) -> anyhow::Result<()> {
    let models = client.models();
    match cmd {
        ModelsCommand::ListBase(page) => print_json(&models.list_base_models(page.options()).await?),
        ModelsCommand::GetBase { name } => print_json(&models.get_base_model(&name).await?),
        ModelsCommand::ListFineTuned(page) => {
            print_json(&models.list_fine_tuned_models(page.options()).await?)
        }
        ModelsCommand::GetFineTuned { name } => {
            print_json(&models.get_fine_tuned_model(&name).await?)
        }
        ModelsCommand::DeleteFineTuned { name } => {
            models.delete_fine_tuned_model(&name).await?;
            println!("Deleted fine-tuned model {}", name);
            Ok(())
        }
        ModelsCommand::Performance { name } => {
            print_json(&models.get_model_performance(&name).await?)
        }
        ModelsCommand::Compare { names } => {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            print_json(&models.compare_models(&names).await?)
        }
    }
}

#[instrument(skip(client))]
async fn usage_command(client: &Client, cmd: UsageCommand) -> anyhow::Result<()> {
    let usage = client.usage();
    match cmd {
        UsageCommand::TotalCost(range) => {
            print_json(&usage.get_total_cost(range.start_date, range.end_date).await?)
        }
        UsageCommand::Records {
            range,
            page,
            service_name,
        } => {
            let records = usage
                .list_usage_records(range.start_date, range.end_date, page.options(), service_name)
                .await?;
            print_json(&records)
        }
    }
}

#[instrument(skip(client))]
async fn credits_command(client: &Client, args: CreditsArgs) -> anyhow::Result<()> {
    let history = client
        .billing()
        .get_credit_history(args.range.start_date, args.range.end_date, args.page.options())
        .await?;
    print_json(&history)
}
