use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use snaprecall::recall::{ContextSnapshot, GenerationFailure, RenderedTest, Result, TestGenerator};

use crate::cmd::util::{emit_json, load_inputs};

#[derive(clap::Args)]
pub struct Args {
	pub dump: PathBuf,
	#[arg(long)]
	pub package: Option<String>,
	#[arg(long)]
	pub config: Option<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// Turn every recorded invocation of a dump into test methods and print the test classes.
pub fn run(args: Args) -> Result<()> {
	let Args { dump: path, package, config, json } = args;

	let (dump, mut options) = load_inputs(&path, config.as_deref())?;
	if package.is_some() {
		options.generator.package = package;
	}
	let universe = Arc::new(dump.universe());
	let generator = TestGenerator::new(Arc::clone(&universe), options.generator.clone())?;

	let mut failures = Vec::new();
	for invocation in &dump.invocations {
		let snapshot = match ContextSnapshot::capture(invocation, &dump.heap, &universe, &options.capture) {
			Ok(snapshot) => snapshot,
			Err(err) => {
				tracing::warn!(class = %invocation.target, method = %invocation.method, error = %err, "capture failed");
				failures.push(GenerationFailure {
					target: invocation.target.to_string(),
					method: invocation.method.clone(),
					error: err.to_string(),
				});
				continue;
			}
		};
		if let Ok(name) = generator.accept(&snapshot) {
			tracing::info!(class = %invocation.target, test = %name, "test generated");
		}
	}
	failures.extend(generator.failures());

	let classes: Vec<TestClassJson> = generator
		.targets()
		.into_iter()
		.map(|target| {
			let imports = generator.imports_for(&target);
			TestClassJson {
				tests: generator.tests_for(&target),
				imports: imports.imports,
				static_imports: imports.static_imports,
				source: generator.render_class(&target).unwrap_or_default(),
				target,
			}
		})
		.collect();

	if json {
		return emit_json(&TestJson {
			dump: path.display().to_string(),
			invocations: dump.invocations.len(),
			classes,
			failures,
			resources: generator.resources(),
		});
	}

	for class in &classes {
		println!("// {}", class.target);
		println!("{}", class.source);
	}
	for (name, content) in generator.resources() {
		println!("// resource {name}: {content}");
	}
	for failure in &failures {
		eprintln!("failed {}.{}: {}", failure.target, failure.method, failure.error);
	}
	Ok(())
}

#[derive(Serialize)]
struct TestJson {
	dump: String,
	invocations: usize,
	classes: Vec<TestClassJson>,
	failures: Vec<GenerationFailure>,
	resources: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct TestClassJson {
	target: String,
	tests: Vec<RenderedTest>,
	imports: Vec<String>,
	static_imports: Vec<String>,
	source: String,
}
