use anyhow::Result;
use clap::Parser;
use lfapi::commands::{self, FetchJobOptions, Query, config::Config, parse_key_value};
use lfapi::models::LabelMode;
use std::path::PathBuf;

/// lfapi - ListenFirst analytics API client
///
/// Credentials come from a JSON profile: --profile, LF_PROFILE, the
/// LF_API_KEY/LF_CLIENT_ID/LF_CLIENT_SECRET variables, or
/// <config dir>/lfapi/profile.json, in that order.
///
/// Examples:
///   lfapi fetch query.json --per-page 1000    # Page through a query
///   lfapi fetch-job query.json --wait -o out  # Run a fetch job and save its pages
///   lfapi job show 42                         # Show a fetch job
#[derive(Parser, Debug)]
#[command(author, version = env!("LFAPI_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Profile file with API key and client credentials
    #[arg(long, value_name = "PATH", global = true)]
    pub profile: Option<PathBuf>,

    /// API host (defaults to https://listenfirst.io; also via LF_API_HOST)
    #[arg(long = "api-host", env = "LF_API_HOST", value_name = "URL", global = true)]
    pub api_host: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run a synchronous query, printing one JSON row per line
    Fetch(FetchArgs),

    /// Submit a query as an asynchronous fetch job
    #[command(name = "fetch-job")]
    FetchJob(FetchJobArgs),

    /// Inspect fetch jobs
    #[command(subcommand)]
    Job(JobCommands),

    /// Manage schedule configs
    #[command(subcommand)]
    Schedule(ScheduleCommands),

    /// Browse brand views
    #[command(subcommand)]
    Brand(BrandCommands),

    /// Browse brand view sets
    #[command(name = "brand-set", subcommand)]
    BrandSet(BrandSetCommands),

    /// Browse the data dictionary
    #[command(subcommand)]
    Dataset(DatasetCommands),

    /// List the possible values of a field
    #[command(name = "field-values")]
    FieldValues(FieldValuesArgs),
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// JSON file with the query parameters
    #[arg(value_name = "PARAMS")]
    pub params: PathBuf,

    /// Rows per page
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Stop after this many pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Key rows by column "id" or "name"
    #[arg(long, default_value = "id")]
    pub labels: LabelMode,
}

#[derive(clap::Args, Debug)]
pub struct FetchJobArgs {
    /// JSON file with the query parameters
    #[arg(value_name = "PARAMS")]
    pub params: PathBuf,

    /// Free-form label stored with the job
    #[arg(long)]
    pub client_context: Option<String>,

    /// Limit the number of rows produced
    #[arg(long)]
    pub max_rows: Option<u64>,

    /// Notify this address when the job finishes (repeatable)
    #[arg(long = "email", value_name = "ADDRESS")]
    pub emails: Vec<String>,

    /// Wait for the job and download its pages
    #[arg(long)]
    pub wait: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Save pages as page-NNNN.json files in this directory instead of printing rows
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Pages downloaded at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Key printed rows by column "id" or "name"
    #[arg(long, default_value = "id")]
    pub labels: LabelMode,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub per_page: Option<u32>,

    /// Extra query parameter (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

impl ListArgs {
    fn query(self) -> Query {
        Query::new(self.page, self.per_page, self.params)
    }
}

#[derive(clap::Subcommand, Debug)]
enum JobCommands {
    /// Show a fetch job
    Show { id: u64 },
    /// Show the most recent fetch job
    Latest(ListArgs),
    /// List fetch jobs
    List(ListArgs),
    /// Wait until a fetch job completes or fails
    Poll { id: u64 },
    /// Download the pages of a completed fetch job
    Pages {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ScheduleCommands {
    /// Show a schedule config
    Show { id: u64 },
    /// List schedule configs
    List(ListArgs),
    /// Create a schedule config
    Create {
        /// JSON file with the query parameters
        #[arg(value_name = "PARAMS")]
        params: PathBuf,
        /// Cron expression, e.g. "0 6 * * *"
        #[arg(long)]
        cron: String,
        #[arg(long)]
        client_context: Option<String>,
        /// Stop after this many runs
        #[arg(long)]
        num_times: Option<u32>,
        /// Notify this address after each run (repeatable)
        #[arg(long = "email", value_name = "ADDRESS")]
        emails: Vec<String>,
    },
}

#[derive(clap::Subcommand, Debug)]
enum BrandCommands {
    /// Show a brand view
    Show {
        id: u64,
        #[command(flatten)]
        list: ListArgs,
    },
    /// List brand views
    List(ListArgs),
}

#[derive(clap::Subcommand, Debug)]
enum BrandSetCommands {
    /// Show a brand view set
    Show { id: u64 },
    /// List brand view sets
    List(ListArgs),
}

#[derive(clap::Subcommand, Debug)]
enum DatasetCommands {
    /// Show a dataset and its fields
    Show { id: String },
    /// List datasets
    List,
}

#[derive(clap::Args, Debug)]
pub struct FieldValuesArgs {
    /// Field id, e.g. lfm.brand.name
    pub field: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = lfapi::runtime::RealRuntime;
    let config = Config::new(runtime, cli.profile, cli.api_host)?;

    match cli.command {
        Commands::Fetch(args) => {
            commands::fetch(&config, &args.params, args.per_page, args.max_pages, args.labels)
                .await?
        }
        Commands::FetchJob(args) => {
            let options = FetchJobOptions {
                client_context: args.client_context,
                max_rows: args.max_rows,
                emails: args.emails,
                wait: args.wait,
                output: args.output.output,
                concurrency: args.output.concurrency,
                labels: args.output.labels,
            };
            commands::fetch_job(&config, &args.params, options).await?
        }
        Commands::Job(command) => match command {
            JobCommands::Show { id } => commands::job_show(&config, id).await?,
            JobCommands::Latest(args) => commands::job_latest(&config, &args.query()).await?,
            JobCommands::List(args) => commands::job_list(&config, &args.query()).await?,
            JobCommands::Poll { id } => commands::job_poll(&config, id).await?,
            JobCommands::Pages { id, output } => {
                commands::job_pages(
                    &config,
                    id,
                    output.output.as_deref(),
                    output.concurrency,
                    output.labels,
                )
                .await?
            }
        },
        Commands::Schedule(command) => match command {
            ScheduleCommands::Show { id } => commands::schedule_show(&config, id).await?,
            ScheduleCommands::List(args) => commands::schedule_list(&config, &args.query()).await?,
            ScheduleCommands::Create {
                params,
                cron,
                client_context,
                num_times,
                emails,
            } => {
                commands::schedule_create(&config, &params, &cron, client_context, num_times, emails)
                    .await?
            }
        },
        Commands::Brand(command) => match command {
            BrandCommands::Show { id, list } => {
                commands::brand_show(&config, id, &list.query()).await?
            }
            BrandCommands::List(args) => commands::brand_list(&config, &args.query()).await?,
        },
        Commands::BrandSet(command) => match command {
            BrandSetCommands::Show { id } => commands::brand_set_show(&config, id).await?,
            BrandSetCommands::List(args) => commands::brand_set_list(&config, &args.query()).await?,
        },
        Commands::Dataset(command) => match command {
            DatasetCommands::Show { id } => commands::dataset_show(&config, &id).await?,
            DatasetCommands::List => commands::dataset_list(&config).await?,
        },
        Commands::FieldValues(args) => commands::field_values(&config, &args.field).await?,
    }
    Ok(())
}
