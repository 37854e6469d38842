use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use snaprecall::recall::{
	CaptureSession, Capturer, Computation, DeserializerContext, HeapDump, LiveValue, ObjectId, Options, Result, Type, TypeManager, TypeUniverse,
	ValueGraph, ValueId,
};

/// Object selection shared by the single-value commands.
#[derive(clap::Args)]
pub struct RootArgs {
	pub dump: PathBuf,
	#[arg(long)]
	pub root: u64,
	/// Declared type of the root; its runtime class when absent.
	#[arg(long = "type")]
	pub ty: Option<String>,
	#[arg(long)]
	pub package: Option<String>,
	#[arg(long)]
	pub config: Option<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// Root object captured into a fresh graph.
pub(crate) struct Captured {
	pub universe: Arc<TypeUniverse>,
	pub options: Options,
	pub graph: ValueGraph,
	pub root: ValueId,
	pub package: String,
}

impl Captured {
	/// Empty generation state for the captured package.
	pub fn context(&self) -> DeserializerContext {
		DeserializerContext::new(TypeManager::new(&self.package, Arc::clone(&self.universe)), &self.options.generator.resource_dir)
	}
}

pub(crate) fn load_inputs(dump: &Path, config: Option<&Path>) -> Result<(HeapDump, Options)> {
	let (compression, dump) = HeapDump::open(dump)?;
	tracing::debug!(compression = compression.as_str(), objects = dump.heap.len(), "dump loaded");
	let options = match config {
		Some(path) => Options::load(path)?,
		None => Options::default(),
	};
	Ok((dump, options))
}

pub(crate) fn capture_root(args: &RootArgs) -> Result<Captured> {
	let (dump, options) = load_inputs(&args.dump, args.config.as_deref())?;
	let universe = Arc::new(dump.universe());
	let object = ObjectId(args.root);
	let declared = match &args.ty {
		Some(signature) => Type::parse(signature)?,
		None => dump.heap.get(object)?.class.clone(),
	};
	let package = args
		.package
		.clone()
		.or_else(|| options.generator.package.clone())
		.unwrap_or_else(|| package_of(&declared));

	let capturer = Capturer::new(&dump.heap, &universe, &options.capture).with_package(&package);
	let mut session = CaptureSession::new();
	let root = capturer.serialize(&declared, &LiveValue::Ref(object), &mut session)?;
	let graph = session.finish();

	Ok(Captured {
		universe,
		options,
		graph,
		root,
		package,
	})
}

fn package_of(ty: &Type) -> String {
	ty.base_name()
		.and_then(|name| name.rsplit_once('.'))
		.map(|(package, _)| package.to_owned())
		.unwrap_or_default()
}

/// Generated code for one root value.
#[derive(Serialize)]
pub(crate) struct GeneratedJson {
	pub dump: String,
	pub root: u64,
	pub package: String,
	pub value: String,
	pub statements: Vec<String>,
	pub imports: Vec<String>,
	pub static_imports: Vec<String>,
	pub resources: BTreeMap<String, String>,
}

pub(crate) fn emit_generated(args: &RootArgs, package: String, computation: Computation, mut context: DeserializerContext) -> Result<()> {
	let payload = GeneratedJson {
		dump: args.dump.display().to_string(),
		root: args.root,
		package,
		value: computation.value,
		statements: computation.statements,
		imports: context.types().imports().to_vec(),
		static_imports: context.types().static_imports().to_vec(),
		resources: context.take_resources(),
	};

	if args.json {
		return emit_json(&payload);
	}

	for import in &payload.imports {
		println!("import {import};");
	}
	for import in &payload.static_imports {
		println!("import static {import};");
	}
	if !payload.imports.is_empty() || !payload.static_imports.is_empty() {
		println!();
	}
	for statement in &payload.statements {
		println!("{statement}");
	}
	println!("// value: {}", payload.value);
	for (name, content) in &payload.resources {
		println!("// resource {name}: {content}");
	}
	Ok(())
}

pub(crate) fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
	let text = serde_json::to_string_pretty(payload)?;
	println!("{text}");
	Ok(())
}
