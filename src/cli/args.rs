use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use opwait::ResultMode;
use opwait::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug)]
pub struct GlobalArgs {
    /// OAuth2 access token sent as a bearer token
    #[arg(long, global = true, env = "OPWAIT_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Versioned service root, e.g. https://workstations.googleapis.com/v1
    #[arg(long, global = true, env = "OPWAIT_API_ENDPOINT")]
    pub api_endpoint: Option<String>,

    #[arg(long, global = true, env = "OPWAIT_PROJECT")]
    pub project: Option<String>,

    #[arg(long, global = true, env = "OPWAIT_LOCATION")]
    pub location: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "OPWAIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Suppress status messages on stderr
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a mutating request and wait for the operation it starts
    Call(CallArgs),
    /// Inspect and manage long-running operations
    Operations {
        #[command(subcommand)]
        command: OperationsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum OperationsCommand {
    Describe(OperationArgs),
    List(ListArgs),
    Wait(WaitArgs),
    Cancel(OperationArgs),
    Delete(OperationArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "UPPER")]
pub enum HttpMethod {
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct CallArgs {
    #[arg(value_enum, ignore_case = true)]
    pub method: HttpMethod,

    /// Request path relative to the API endpoint, query string included
    pub path: String,

    /// JSON request body, or @FILE to read it from a file
    #[arg(long)]
    pub data: Option<String>,

    /// Return the operation handle immediately instead of waiting
    #[arg(long = "async")]
    pub async_: bool,

    #[arg(long, value_enum)]
    pub result: Option<ResultMode>,

    /// Maximum seconds to wait for the operation
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Status message shown while waiting
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct OperationArgs {
    /// Operation name, URL, or bare id resolved against --project/--location
    pub operation: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Resource owning the operations collection, e.g. projects/p/locations/l
    #[arg(long)]
    pub parent: Option<String>,

    #[arg(long)]
    pub filter: Option<String>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Stop after this many operations
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct WaitArgs {
    pub operation: String,

    #[arg(long, value_enum, default_value = "response")]
    pub result: ResultMode,

    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    #[arg(long)]
    pub message: Option<String>,
}
