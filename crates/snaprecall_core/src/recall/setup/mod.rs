//! Constructive code: statements rebuilding a captured value.

use std::sync::Arc;

use crate::recall::templates::{self, GENERIC_OBJECT};
use crate::recall::{
	Adaptor, Adaptors, Computation, DeserializerContext, GenerationMode, Generator, RecallError, Result, SerializedValue, Type, TypeUniverse,
	ValueGraph, ValueId, VariableState, Visibility,
};

mod adaptors;
mod construction;

use adaptors::{
	ArraysListAdaptor, BeanObjectAdaptor, BigIntegerAdaptor, ClassLiteralAdaptor, CollectionsAdaptor, ConstructorObjectAdaptor, DefaultArrayAdaptor, DefaultEnumAdaptor,
	DefaultImmutableAdaptor, DefaultListAdaptor, DefaultLiteralAdaptor, DefaultMapAdaptor, DefaultNullAdaptor, DefaultObjectAdaptor,
	DefaultSetAdaptor, LambdaObjectAdaptor, LargePrimitiveArrayAdaptor,
};

/// Setup code generation mode.
#[derive(Debug)]
pub struct Setup;

impl GenerationMode for Setup {
	const NAME: &'static str = "setup";
	type Generator<'g> = SetupGenerator<'g>;
}

/// Registry of every built-in setup adaptor.
pub fn setup_adaptors() -> Result<Adaptors<Setup>> {
	let adaptors: Vec<Arc<dyn Adaptor<Setup>>> = vec![
		Arc::new(DefaultNullAdaptor),
		Arc::new(DefaultLiteralAdaptor),
		Arc::new(DefaultImmutableAdaptor),
		Arc::new(BigIntegerAdaptor),
		Arc::new(ClassLiteralAdaptor),
		Arc::new(DefaultEnumAdaptor),
		Arc::new(DefaultObjectAdaptor),
		Arc::new(ConstructorObjectAdaptor),
		Arc::new(BeanObjectAdaptor),
		Arc::new(LambdaObjectAdaptor),
		Arc::new(DefaultListAdaptor),
		Arc::new(ArraysListAdaptor),
		Arc::new(CollectionsAdaptor::list()),
		Arc::new(DefaultSetAdaptor),
		Arc::new(CollectionsAdaptor::set()),
		Arc::new(DefaultMapAdaptor),
		Arc::new(CollectionsAdaptor::map()),
		Arc::new(DefaultArrayAdaptor),
		Arc::new(LargePrimitiveArrayAdaptor),
	];
	Adaptors::new(adaptors)
}

/// Walks a snapshot and emits statements rebuilding it.
///
/// Reference values are bound to locals. A value reached again while its own code is still
/// being generated gets a placeholder declaration first; the adaptor generating it then fills
/// that placeholder instead of allocating.
#[derive(Debug)]
pub struct SetupGenerator<'g> {
	graph: &'g ValueGraph,
	universe: &'g TypeUniverse,
	adaptors: &'g Adaptors<Setup>,
	context: DeserializerContext,
}

impl<'g> SetupGenerator<'g> {
	/// Generator over `graph` continuing from `context`.
	pub fn new(graph: &'g ValueGraph, universe: &'g TypeUniverse, adaptors: &'g Adaptors<Setup>, context: DeserializerContext) -> Self {
		Self {
			graph,
			universe,
			adaptors,
			context,
		}
	}

	/// Snapshot being generated from.
	pub fn graph(&self) -> &'g ValueGraph {
		self.graph
	}

	/// Class table of the snapshot.
	pub fn universe(&self) -> &'g TypeUniverse {
		self.universe
	}

	/// Generate the code for a root value.
	pub fn generate(&mut self, id: ValueId) -> Result<Computation> {
		let computation = self.visit(id)?;
		if let Some(local) = self.context.unresolved() {
			return Err(RecallError::UnresolvedForward { name: local.name.clone() });
		}
		Ok(computation)
	}

	/// Hand back the generation state.
	pub fn into_context(self) -> DeserializerContext {
		self.context
	}

	/// Local reserved for a reference value.
	pub fn local_name(&self, id: ValueId) -> Result<String> {
		self.context
			.local(id)
			.map(|local| local.name.clone())
			.ok_or_else(|| RecallError::failed(format!("{} has no local variable", self.graph.describe(id))))
	}

	/// Whether a placeholder for `id` was already declared.
	pub fn is_forwarded(&self, id: ValueId) -> bool {
		self.context.is_forwarded(id)
	}

	/// Declared type for locals holding the value.
	pub fn display_type(&self, id: ValueId) -> Result<Type> {
		self.graph.display_type(id, self.universe, self.context.types().package())
	}

	fn forward(&mut self, id: ValueId) -> Result<Computation> {
		let name = self.local_name(id)?;
		let (declaration, expression) = self.allocation(id, &name)?;
		tracing::trace!(value = %id, local = %name, "forward declaration");
		self.context.forward(id, expression.clone())?;
		Ok(Computation::stored(expression, Some(self.graph.get(id)?.ty.clone())).with_statements(vec![declaration]))
	}

	/// Declaration of an empty, mutable instance for a reference value, and the expression
	/// referring to it afterwards.
	pub fn allocation(&mut self, id: ValueId, name: &str) -> Result<(String, String)> {
		let node = self.graph.get(id)?;
		let runtime = &node.ty;
		match &node.value {
			SerializedValue::Object { lambda: Some(_), .. } => Err(RecallError::failed(format!(
				"function value {} cannot be declared before it is complete",
				self.graph.describe(id)
			))),
			SerializedValue::Object { .. } => {
				let types = self.context.types_mut();
				let generic_object = types.raw_name(GENERIC_OBJECT);
				if types.is_hidden(runtime) {
					let wrapped = types.wrap_hidden(runtime)?;
					let class = types.raw_class(runtime);
					let init = format!("{generic_object}.forward({class})");
					Ok((templates::assign_local(&wrapped, name, &init), format!("{name}.value()")))
				} else {
					let ty = types.raw_type_name(runtime);
					let init = format!("{generic_object}.forward({ty}.class)");
					Ok((templates::assign_local(&ty, name, &init), name.to_owned()))
				}
			}
			SerializedValue::List { component, .. } => {
				let (ty, ctor) = self.collection_types(runtime, "java.util.List", "java.util.ArrayList", std::slice::from_ref(component))?;
				Ok((templates::assign_local(&ty, name, &templates::new_object(&ctor, &[])), name.to_owned()))
			}
			SerializedValue::Set { component, .. } => {
				let (ty, ctor) = self.collection_types(runtime, "java.util.Set", "java.util.LinkedHashSet", std::slice::from_ref(component))?;
				Ok((templates::assign_local(&ty, name, &templates::new_object(&ctor, &[])), name.to_owned()))
			}
			SerializedValue::Map { key, value, .. } => {
				let args = [key.clone(), value.clone()];
				let (ty, ctor) = self.collection_types(runtime, "java.util.Map", "java.util.LinkedHashMap", &args)?;
				Ok((templates::assign_local(&ty, name, &templates::new_object(&ctor, &[])), name.to_owned()))
			}
			SerializedValue::Array { elements, .. } => {
				let visible = self.universe.visible_supertype(runtime, self.context.types().package());
				let types = self.context.types_mut();
				let ty = types.variable_type_name(&visible)?;
				let base = types.raw_type_name(visible.array_base());
				let init = format!("new {base}[{}]{}", elements.len(), "[]".repeat(visible.dimensions().saturating_sub(1)));
				Ok((templates::assign_local(&ty, name, &init), name.to_owned()))
			}
			other => Err(RecallError::failed(format!("{} values are not bound to locals", other.kind().as_str()))),
		}
	}

	/// Declared and constructed type names for a mutable collection local.
	///
	/// The runtime class is used when it is nameable and constructible, `fallback` otherwise.
	pub fn collection_types(&mut self, runtime: &Type, interface: &str, fallback: &str, args: &[Type]) -> Result<(String, String)> {
		let constructible = self.universe.class_of(runtime).is_some_and(|info| {
			info.is_instantiable() && info.constructors.iter().any(|ctor| ctor.params.is_empty() && ctor.visibility == Visibility::Public)
		});
		let types = self.context.types_mut();
		if constructible && !types.is_hidden(runtime) {
			let ty = types.variable_type_name(runtime)?;
			let ctor = types.constructor_type_name(runtime)?;
			return Ok((ty, ctor));
		}
		let ty = types.variable_type_name(&Type::parameterized(interface, args.to_vec()))?;
		let ctor = types.constructor_type_name(&Type::parameterized(fallback, args.to_vec()))?;
		Ok((ty, ctor))
	}
}

impl Generator for SetupGenerator<'_> {
	fn graph(&self) -> &ValueGraph {
		self.graph
	}

	fn universe(&self) -> &TypeUniverse {
		self.universe
	}

	fn context(&self) -> &DeserializerContext {
		&self.context
	}

	fn context_mut(&mut self) -> &mut DeserializerContext {
		&mut self.context
	}

	fn visit(&mut self, id: ValueId) -> Result<Computation> {
		let node = self.graph.get(id)?;
		let adaptors = self.adaptors;
		if !node.kind().is_reference() {
			return adaptors.dispatch(id, self);
		}

		match self.context.local(id).map(|local| (local.state, local.expression.clone())) {
			Some((VariableState::Defined | VariableState::Forwarded, expression)) => Ok(Computation::stored(expression, Some(node.ty.clone()))),
			Some((VariableState::Reserved, _)) => self.forward(id),
			None => {
				let name = self.context.new_name(&node.ty);
				self.context.reserve(id, name);
				let computation = adaptors.dispatch(id, self)?;
				self.context.define(id, computation.value.clone())?;
				Ok(computation)
			}
		}
	}
}
