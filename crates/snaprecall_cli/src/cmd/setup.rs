use snaprecall::recall::{Result, SetupGenerator, setup_adaptors};

use crate::cmd::util::{RootArgs, capture_root, emit_generated};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub root: RootArgs,
}

/// Capture one heap object and print the statements rebuilding it.
pub fn run(args: Args) -> Result<()> {
	let Args { root } = args;

	let captured = capture_root(&root)?;
	let adaptors = setup_adaptors()?;
	let mut generator = SetupGenerator::new(&captured.graph, &captured.universe, &adaptors, captured.context());
	let computation = generator.generate(captured.root)?;

	emit_generated(&root, captured.package.clone(), computation, generator.into_context())
}
