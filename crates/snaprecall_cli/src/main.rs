#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "snaprecall", about = "Rebuild captured heap objects as test code")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print statements rebuilding one heap object.
	Setup(cmd::setup::Args),
	/// Print a matcher accepting one heap object.
	Matcher(cmd::matcher::Args),
	/// Print test classes for every recorded invocation.
	Test(cmd::test::Args),
}

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> snaprecall::recall::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Setup(args) => cmd::setup::run(args),
		Commands::Matcher(args) => cmd::matcher::run(args),
		Commands::Test(args) => cmd::test::run(args),
	}
}
