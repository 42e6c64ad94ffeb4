mod args;

pub use args::{CallArgs, Cli, Command, GlobalArgs, ListArgs, OperationsCommand, WaitArgs};
