mod cli;

use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use cli::{CallArgs, Cli, Command, GlobalArgs, ListArgs, OperationsCommand, WaitArgs};
use opwait::commands::{self, CallRequest, CommandOutput, ListRequest, Session, WaitRequest};
use opwait::config::Config;
use opwait::output::{self, OutputFormat};
use opwait::{OperationsClient, OpwaitError, ParentDefaults, ProgressTracker};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let session = build_session(&cli.global)?;
    let mut progress = if cli.global.quiet {
        ProgressTracker::quiet()
    } else {
        ProgressTracker::stderr()
    };

    let (result, default_format) = match cli.command {
        Command::Call(args) => {
            let request = call_request(args)?;
            (
                commands::call(&session, request, &mut progress).await?,
                OutputFormat::Json,
            )
        }
        Command::Operations { command } => match command {
            OperationsCommand::Describe(args) => (
                commands::describe(&session, &args.operation).await?,
                OutputFormat::Json,
            ),
            OperationsCommand::List(args) => (
                commands::list(&session, list_request(args)).await?,
                OutputFormat::Table,
            ),
            OperationsCommand::Wait(args) => (
                commands::wait(&session, wait_request(args), &mut progress).await?,
                OutputFormat::Json,
            ),
            OperationsCommand::Cancel(args) => (
                commands::cancel(&session, &args.operation, &mut progress).await?,
                OutputFormat::Json,
            ),
            OperationsCommand::Delete(args) => (
                commands::delete(&session, &args.operation, &mut progress).await?,
                OutputFormat::Json,
            ),
        },
    };

    print_output(&result, cli.global.format.unwrap_or(default_format))?;

    Ok(())
}

fn build_session(global: &GlobalArgs) -> Result<Session, OpwaitError> {
    let config = Config::load_or_default(global.config.as_deref())?;

    let token = global
        .access_token
        .clone()
        .or_else(|| config.access_token.clone())
        .ok_or_else(|| {
            OpwaitError::Auth(
                "No access token provided. Set OPWAIT_ACCESS_TOKEN or use --access-token"
                    .to_string(),
            )
        })?;

    let endpoint = global
        .api_endpoint
        .clone()
        .or_else(|| config.api_endpoint.clone())
        .ok_or_else(|| {
            OpwaitError::Config(
                "No API endpoint configured. Set OPWAIT_API_ENDPOINT or use --api-endpoint"
                    .to_string(),
            )
        })?;

    let defaults = ParentDefaults {
        project: global.project.clone().or_else(|| config.project.clone()),
        location: global.location.clone().or_else(|| config.location.clone()),
    };

    let client = OperationsClient::new(token, endpoint)?;
    tracing::debug!(endpoint = %client.api_base(), "session ready");

    Ok(Session::new(client, config, defaults))
}

fn call_request(args: CallArgs) -> Result<CallRequest, OpwaitError> {
    let body = args.data.as_deref().map(commands::parse_data).transpose()?;

    Ok(CallRequest {
        method: args.method.into(),
        path: args.path,
        body,
        run_async: args.async_,
        result_mode: args.result,
        timeout: args.timeout.map(Duration::from_secs),
        message: args.message,
    })
}

fn list_request(args: ListArgs) -> ListRequest {
    ListRequest {
        parent: args.parent,
        filter: args.filter,
        page_size: args.page_size,
        limit: args.limit,
    }
}

fn wait_request(args: WaitArgs) -> WaitRequest {
    WaitRequest {
        operation: args.operation,
        result_mode: args.result,
        timeout: args.timeout.map(Duration::from_secs),
        message: args.message,
    }
}

fn print_output(result: &CommandOutput, format: OutputFormat) -> Result<(), OpwaitError> {
    match result {
        CommandOutput::Operation(op) => println!("{}", output::render_operation(op, format)?),
        CommandOutput::Operations(ops) if ops.is_empty() => eprintln!("Listed 0 items."),
        CommandOutput::Operations(ops) => println!("{}", output::render_operations(ops, format)?),
        CommandOutput::Value(serde_json::Value::Null) | CommandOutput::None => {}
        CommandOutput::Value(value) => println!("{}", output::render_value(value, format)?),
    }
    Ok(())
}
