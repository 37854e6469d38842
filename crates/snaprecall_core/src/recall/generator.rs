//! Accumulates generated test methods per target class.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::recall::classes::{package_of, simple_name_of};
use crate::recall::templates::{self, ASSERT_THAT, CATCH_EXCEPTION, GENERIC_OBJECT, TEST_ANNOTATION};
use crate::recall::{
	Adaptors, ContextSnapshot, DeserializerContext, GeneratorOptions, Generator, GlobalValue, Matcher, MatcherGenerator, RecallError, Result, Setup,
	SetupGenerator, Type, TypeManager, TypeUniverse, ValueId, ValueKind, Visibility, matcher_adaptors, setup_adaptors,
};

/// One generated test method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTest {
	/// Method name: `test<Method><n>`.
	pub name: String,
	/// Method under test.
	pub method: String,
	/// Statements building receiver, arguments and statics.
	pub arrange: Vec<String>,
	/// The call.
	pub act: Vec<String>,
	/// Assertions on the observed outcome.
	pub assert: Vec<String>,
}

impl RenderedTest {
	/// Source of the annotated test method.
	pub fn render(&self) -> String {
		let mut out = format!("@Test\npublic void {}() throws Exception {{\n", self.name);
		for (label, block) in [("Arrange", &self.arrange), ("Act", &self.act), ("Assert", &self.assert)] {
			out.push_str(&format!("\t// {label}\n"));
			for statement in block {
				out.push_str(&templates::indent(statement));
				out.push('\n');
			}
		}
		out.push('}');
		out
	}
}

/// Snapshot no test could be generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationFailure {
	/// Class declaring the method.
	pub target: String,
	/// Method name.
	pub method: String,
	/// Rendered error.
	pub error: String,
}

/// Imports needed by the tests of one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestImports {
	/// Type imports.
	pub imports: Vec<String>,
	/// Static member imports.
	pub static_imports: Vec<String>,
}

#[derive(Debug)]
struct TargetTests {
	types: TypeManager,
	tests: Vec<RenderedTest>,
}

struct TestBody {
	arrange: Vec<String>,
	act: Vec<String>,
	assert: Vec<String>,
}

/// Turns snapshots into test methods, grouped by target class.
///
/// Safe to share between threads. Tests of one target are generated one at a time because
/// they share an import table; different targets do not block each other.
#[derive(Debug)]
pub struct TestGenerator {
	universe: Arc<TypeUniverse>,
	options: GeneratorOptions,
	setup: Adaptors<Setup>,
	matcher: Adaptors<Matcher>,
	targets: Mutex<BTreeMap<String, Arc<Mutex<TargetTests>>>>,
	failures: Mutex<Vec<GenerationFailure>>,
	resources: Mutex<BTreeMap<String, String>>,
}

impl TestGenerator {
	/// Generator with the built-in adaptor registries.
	pub fn new(universe: Arc<TypeUniverse>, options: GeneratorOptions) -> Result<Self> {
		Ok(Self {
			universe,
			options,
			setup: setup_adaptors()?,
			matcher: matcher_adaptors()?,
			targets: Mutex::new(BTreeMap::new()),
			failures: Mutex::new(Vec::new()),
			resources: Mutex::new(BTreeMap::new()),
		})
	}

	/// Generate a test for `snapshot` and return its name.
	///
	/// A failure is recorded and returned; tests accepted earlier are unaffected.
	pub fn accept(&self, snapshot: &ContextSnapshot) -> Result<String> {
		let target = snapshot.target.erasure().to_string();
		let entry = self.target_entry(&target);
		let mut tests = entry.lock();

		let mut types = tests.types.clone();
		types.raw_name(TEST_ANNOTATION);
		let (body, types, resources) = match self.render(snapshot, types) {
			Ok(rendered) => rendered,
			Err(err) => {
				tracing::warn!(class = %target, method = %snapshot.method, error = %err, "test generation failed");
				self.failures.lock().push(GenerationFailure {
					target,
					method: snapshot.method.clone(),
					error: err.to_string(),
				});
				return Err(err);
			}
		};

		let index = tests.tests.iter().filter(|test| test.method == snapshot.method).count();
		let name = format!("test{}{index}", capitalize(&snapshot.method));
		tracing::debug!(class = %target, test = %name, statements = body.arrange.len() + body.act.len() + body.assert.len(), "test generated");
		tests.types = types;
		tests.tests.push(RenderedTest {
			name: name.clone(),
			method: snapshot.method.clone(),
			arrange: body.arrange,
			act: body.act,
			assert: body.assert,
		});
		self.resources.lock().extend(resources);
		Ok(name)
	}

	/// Copy of the tests generated for `target` so far.
	pub fn tests_for(&self, target: &str) -> Vec<RenderedTest> {
		match self.existing_entry(target) {
			Some(entry) => entry.lock().tests.clone(),
			None => Vec::new(),
		}
	}

	/// Targets with at least one generated test.
	pub fn targets(&self) -> Vec<String> {
		self.targets
			.lock()
			.iter()
			.filter(|(_, entry)| !entry.lock().tests.is_empty())
			.map(|(target, _)| target.clone())
			.collect()
	}

	/// Snapshots that could not be turned into tests.
	pub fn failures(&self) -> Vec<GenerationFailure> {
		self.failures.lock().clone()
	}

	/// Imports the tests of `target` need.
	pub fn imports_for(&self, target: &str) -> TestImports {
		match self.existing_entry(target) {
			Some(entry) => {
				let tests = entry.lock();
				TestImports {
					imports: tests.types.imports().to_vec(),
					static_imports: tests.types.static_imports().to_vec(),
				}
			}
			None => TestImports::default(),
		}
	}

	/// Resource files referenced by generated tests, by name.
	pub fn resources(&self) -> BTreeMap<String, String> {
		self.resources.lock().clone()
	}

	/// Drop every accumulated test, failure and resource.
	pub fn clear(&self) {
		self.targets.lock().clear();
		self.failures.lock().clear();
		self.resources.lock().clear();
	}

	/// Source of a test class holding every test of `target`.
	pub fn render_class(&self, target: &str) -> Option<String> {
		let entry = self.existing_entry(target)?;
		let tests = entry.lock();
		if tests.tests.is_empty() {
			return None;
		}
		let mut out = String::new();
		let package = tests.types.package();
		if !package.is_empty() {
			out.push_str(&format!("package {package};\n\n"));
		}
		for import in tests.types.imports() {
			out.push_str(&format!("import {import};\n"));
		}
		for import in tests.types.static_imports() {
			out.push_str(&format!("import static {import};\n"));
		}
		out.push_str(&format!("\npublic class {}RecalledTest {{\n", simple_name_of(target)));
		let methods: Vec<String> = tests.tests.iter().map(|test| templates::indent(&test.render())).collect();
		out.push_str(&methods.join("\n\n"));
		out.push_str("\n}\n");
		Some(out)
	}

	fn package_for(&self, target: &str) -> String {
		self.options.package.clone().unwrap_or_else(|| package_of(target).to_owned())
	}

	fn target_entry(&self, target: &str) -> Arc<Mutex<TargetTests>> {
		let mut targets = self.targets.lock();
		let entry = targets.entry(target.to_owned()).or_insert_with(|| {
			Arc::new(Mutex::new(TargetTests {
				types: TypeManager::new(&self.package_for(target), Arc::clone(&self.universe)),
				tests: Vec::new(),
			}))
		});
		Arc::clone(entry)
	}

	fn existing_entry(&self, target: &str) -> Option<Arc<Mutex<TargetTests>>> {
		self.targets.lock().get(target).map(Arc::clone)
	}

	fn render(&self, snapshot: &ContextSnapshot, types: TypeManager) -> Result<(TestBody, TypeManager, BTreeMap<String, String>)> {
		let universe = self.universe.as_ref();
		let context = DeserializerContext::new(types, &self.options.resource_dir);

		let mut setup = SetupGenerator::new(&snapshot.graph, universe, &self.setup, context);
		let mut arrange = Vec::new();
		let receiver = match snapshot.setup_this {
			Some(id) => Some(bind(&mut setup, id, &mut arrange)?),
			None => None,
		};
		let mut args = Vec::with_capacity(snapshot.setup_args.len());
		for id in &snapshot.setup_args {
			let kind = snapshot.graph.get(*id)?.kind();
			if matches!(kind, ValueKind::Literal | ValueKind::Null) {
				let mut computation = setup.generate(*id)?;
				arrange.extend(computation.take_statements());
				args.push(computation.value);
			} else {
				args.push(bind(&mut setup, *id, &mut arrange)?);
			}
		}
		for global in &snapshot.setup_globals {
			let mut computation = setup.generate(global.value)?;
			arrange.extend(computation.take_statements());
			let assignment = set_global(setup.context_mut().types_mut(), universe, global, &computation.value);
			arrange.push(assignment);
		}
		let mut context = setup.into_context();
		let resources = context.take_resources();

		let (act, actual) = act(snapshot, &mut context, receiver.as_deref(), &args)?;

		context.clear_locals();
		let mut matcher = MatcherGenerator::new(&snapshot.graph, universe, &self.matcher, context);
		let mut assert = Vec::new();
		if let (Some(actual), Some(id)) = (&actual, snapshot.expect_exception.or(snapshot.expect_result)) {
			assert_matches(&mut matcher, actual, id, &mut assert)?;
		}
		if let (Some(receiver), Some(before), Some(after)) = (&receiver, snapshot.setup_this, snapshot.expect_this) {
			if changed(snapshot, before, after) {
				assert_matches(&mut matcher, receiver, after, &mut assert)?;
			}
		}
		for (idx, (before, after)) in snapshot.setup_args.iter().zip(&snapshot.expect_args).enumerate() {
			if snapshot.graph.get(*before)?.kind().is_reference() && changed(snapshot, *before, *after) {
				assert_matches(&mut matcher, &args[idx], *after, &mut assert)?;
			}
		}
		for (before, after) in snapshot.setup_globals.iter().zip(&snapshot.expect_globals) {
			if changed(snapshot, before.value, after.value) {
				let access = get_global(matcher.context_mut().types_mut(), universe, after);
				assert_matches(&mut matcher, &access, after.value, &mut assert)?;
			}
		}

		let types = matcher.into_context().types().clone();
		Ok((TestBody { arrange, act, assert }, types, resources))
	}
}

/// Local holding the setup value `id`, declared if the generated code did not bind one.
fn bind(generator: &mut SetupGenerator<'_>, id: ValueId, arrange: &mut Vec<String>) -> Result<String> {
	let mut computation = generator.generate(id)?;
	arrange.extend(computation.take_statements());
	if computation.stored {
		return Ok(computation.value);
	}
	let ty = generator.display_type(id)?;
	let context = generator.context_mut();
	let name = context.new_name(&ty);
	let ty_name = context.types_mut().variable_type_name(&ty)?;
	arrange.push(templates::assign_local(&ty_name, &name, &computation.value));
	Ok(name)
}

/// The call statement and the local holding its outcome.
fn act(snapshot: &ContextSnapshot, context: &mut DeserializerContext, receiver: Option<&str>, args: &[String]) -> Result<(Vec<String>, Option<String>)> {
	let call = if snapshot.is_static() {
		let owner = context.types_mut().raw_type_name(&snapshot.target.erasure());
		templates::call(&owner, &snapshot.method, args)
	} else {
		let receiver = receiver.ok_or_else(|| RecallError::failed(format!("{} was called without a receiver local", snapshot.method)))?;
		templates::call(receiver, &snapshot.method, args)
	};

	if let Some(id) = snapshot.expect_exception {
		let universe = context.types().universe();
		let thrown = universe.visible_supertype(&snapshot.graph.get(id)?.ty.erasure(), context.types().package());
		let name = context.new_name(&thrown);
		let types = context.types_mut();
		let ty_name = types.raw_type_name(&thrown);
		let class = types.raw_class(&thrown);
		let catch = types.static_member(CATCH_EXCEPTION);
		let captured = templates::call_function(&catch, &[format!("() -> {call}"), class]);
		return Ok((vec![templates::assign_local(&ty_name, &name, &captured)], Some(name)));
	}

	match &snapshot.result_type {
		Some(result_type) => {
			let name = context.new_name(result_type);
			let ty_name = context.types_mut().variable_type_name(result_type)?;
			Ok((vec![templates::assign_local(&ty_name, &name, &call)], Some(name)))
		}
		None => Ok((vec![templates::statement(&call)], None)),
	}
}

fn assert_matches(generator: &mut MatcherGenerator<'_>, actual: &str, id: ValueId, assert: &mut Vec<String>) -> Result<()> {
	let mut matcher = generator.generate(id)?;
	assert.extend(matcher.take_statements());
	let assert_that = generator.context_mut().types_mut().static_member(ASSERT_THAT);
	assert.push(templates::statement(&templates::call_function(&assert_that, &[actual.to_owned(), matcher.value])));
	Ok(())
}

fn changed(snapshot: &ContextSnapshot, before: ValueId, after: ValueId) -> bool {
	!snapshot.graph.structurally_equal(before, &snapshot.graph, after)
}

/// Whether a static field can be accessed by name from the generated package.
fn is_accessible(types: &TypeManager, universe: &TypeUniverse, global: &GlobalValue, write: bool) -> bool {
	universe.field(&global.class, &global.field).is_ok_and(|(info, field)| {
		field.visibility == Visibility::Public && !(write && field.is_final) && !types.is_hidden(&info.raw_type())
	})
}

fn set_global(types: &mut TypeManager, universe: &TypeUniverse, global: &GlobalValue, value: &str) -> String {
	let class = Type::class(&global.class);
	if is_accessible(types, universe, global, true) {
		return templates::assign_field(&types.raw_type_name(&class), &global.field, value);
	}
	let generic_object = types.raw_name(GENERIC_OBJECT);
	let args = [types.raw_class(&class), templates::string_literal(&global.field), value.to_owned()];
	templates::statement(&templates::call(&generic_object, "setField", &args))
}

fn get_global(types: &mut TypeManager, universe: &TypeUniverse, global: &GlobalValue) -> String {
	let class = Type::class(&global.class);
	if is_accessible(types, universe, global, false) {
		return format!("{}.{}", types.raw_type_name(&class), global.field);
	}
	let generic_object = types.raw_name(GENERIC_OBJECT);
	let args = [types.raw_class(&class), templates::string_literal(&global.field)];
	templates::call(&generic_object, "getField", &args)
}

fn capitalize(name: &str) -> String {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
