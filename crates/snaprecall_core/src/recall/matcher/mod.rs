//! Assertion code: matcher expressions checking structural equivalence with a captured value.

use std::sync::Arc;

use crate::recall::templates::{self, MATCHER, RECURSIVE_MATCHER};
use crate::recall::{
	Adaptor, Adaptors, Computation, DeserializerContext, GenerationMode, Generator, RecallError, Result, Type, TypeUniverse, ValueGraph, ValueId,
	VariableState,
};

mod adaptors;

use adaptors::{
	ClassLiteralAdaptor, DefaultArrayAdaptor, DefaultEnumAdaptor, DefaultImmutableAdaptor, DefaultListAdaptor, DefaultLiteralAdaptor, DefaultMapAdaptor,
	DefaultNullAdaptor, DefaultObjectAdaptor, DefaultSetAdaptor, LambdaObjectAdaptor,
};

/// Matcher code generation mode.
#[derive(Debug)]
pub struct Matcher;

impl GenerationMode for Matcher {
	const NAME: &'static str = "matcher";
	type Generator<'g> = MatcherGenerator<'g>;
}

/// Registry of every built-in matcher adaptor.
pub fn matcher_adaptors() -> Result<Adaptors<Matcher>> {
	let adaptors: Vec<Arc<dyn Adaptor<Matcher>>> = vec![
		Arc::new(DefaultNullAdaptor),
		Arc::new(DefaultLiteralAdaptor),
		Arc::new(DefaultImmutableAdaptor),
		Arc::new(ClassLiteralAdaptor),
		Arc::new(DefaultEnumAdaptor),
		Arc::new(DefaultObjectAdaptor),
		Arc::new(LambdaObjectAdaptor),
		Arc::new(DefaultListAdaptor),
		Arc::new(DefaultSetAdaptor),
		Arc::new(DefaultMapAdaptor),
		Arc::new(DefaultArrayAdaptor),
	];
	Adaptors::new(adaptors)
}

/// Walks a snapshot and emits a matcher accepting structurally equal values.
///
/// Matchers are expressions. A value reached again while its own matcher is being built is
/// replaced by a `RecursiveMatcher` local that is defined once the outer matcher is complete.
/// Shared values reached again later reuse their finished expression.
#[derive(Debug)]
pub struct MatcherGenerator<'g> {
	graph: &'g ValueGraph,
	universe: &'g TypeUniverse,
	adaptors: &'g Adaptors<Matcher>,
	context: DeserializerContext,
}

impl<'g> MatcherGenerator<'g> {
	/// Generator over `graph` continuing from `context`.
	pub fn new(graph: &'g ValueGraph, universe: &'g TypeUniverse, adaptors: &'g Adaptors<Matcher>, context: DeserializerContext) -> Self {
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

	/// Generate the matcher for a root value.
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

	/// Declared type for the value at its use sites.
	pub fn display_type(&self, id: ValueId) -> Result<Type> {
		self.graph.display_type(id, self.universe, self.context.types().package())
	}

	fn matcher_type(ty: &Type) -> Type {
		Type::parameterized(MATCHER, vec![ty.clone()])
	}
}

impl Generator for MatcherGenerator<'_> {
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

		let matcher_type = Self::matcher_type(&node.ty);
		match self.context.local(id).map(|local| (local.state, local.name.clone(), local.expression.clone())) {
			Some((VariableState::Defined, _, expression)) => Ok(Computation::expression(expression, Some(matcher_type))),
			Some((VariableState::Forwarded, name, _)) => Ok(Computation::stored(name, Some(matcher_type))),
			Some((VariableState::Reserved, name, _)) => {
				let types = self.context.types_mut();
				let recursive = types.raw_name(RECURSIVE_MATCHER);
				let declaration = templates::assign_local(&recursive, &name, &templates::new_object(&recursive, &[]));
				tracing::trace!(value = %id, local = %name, "recursive matcher");
				self.context.forward(id, name.clone())?;
				Ok(Computation::stored(name, Some(matcher_type)).with_statements(vec![declaration]))
			}
			None => {
				let name = self.context.new_matcher_name(&node.ty);
				self.context.reserve(id, name.clone());
				let mut computation = adaptors.dispatch(id, self)?;
				if self.context.is_forwarded(id) {
					let statements = computation.take_statements();
					let definition = templates::statement(&templates::call(&name, "define", &[computation.value]));
					self.context.define(id, name.clone())?;
					return Ok(Computation::stored(name, Some(matcher_type))
						.with_statements(statements)
						.with_statements(vec![definition]));
				}
				self.context.define(id, computation.value.clone())?;
				Ok(computation)
			}
		}
	}
}

#[cfg(test)]
mod tests;
