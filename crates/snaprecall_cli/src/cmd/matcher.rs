use snaprecall::recall::{MatcherGenerator, Result, matcher_adaptors};

use crate::cmd::util::{RootArgs, capture_root, emit_generated};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub root: RootArgs,
}

/// Capture one heap object and print a matcher accepting equal values.
pub fn run(args: Args) -> Result<()> {
	let Args { root } = args;

	let captured = capture_root(&root)?;
	let adaptors = matcher_adaptors()?;
	let mut generator = MatcherGenerator::new(&captured.graph, &captured.universe, &adaptors, captured.context());
	let computation = generator.generate(captured.root)?;

	emit_generated(&root, captured.package.clone(), computation, generator.into_context())
}
