use std::collections::{BTreeMap, HashMap};

use crate::recall::{Annotation, RecallError, Result, Type, TypeManager, ValueId};

/// Progress of the local variable standing for one reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableState {
	/// Name chosen, generation of the value in progress.
	Reserved,
	/// Referenced again before it was finished; a placeholder was declared.
	Forwarded,
	/// Fully generated.
	Defined,
}

/// Local variable bound to a reference value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
	/// Declared local name.
	pub name: String,
	/// Expression other code uses to refer to the value.
	pub expression: String,
	/// Generation progress.
	pub state: VariableState,
}

/// Mutable state threaded through one code generation run.
///
/// Cheap enough to clone: adaptors that may fail work on a checkpoint and the dispatcher
/// restores it when they do.
#[derive(Debug, Clone)]
pub struct DeserializerContext {
	types: TypeManager,
	counters: HashMap<String, usize>,
	locals: HashMap<ValueId, LocalVariable>,
	hints: HashMap<ValueId, Vec<Annotation>>,
	resources: BTreeMap<String, String>,
	resource_dir: String,
}

impl DeserializerContext {
	/// Empty context rendering names through `types`.
	pub fn new(types: TypeManager, resource_dir: &str) -> Self {
		Self {
			types,
			counters: HashMap::new(),
			locals: HashMap::new(),
			hints: HashMap::new(),
			resources: BTreeMap::new(),
			resource_dir: resource_dir.to_owned(),
		}
	}

	/// Name and import tracking.
	pub fn types(&self) -> &TypeManager {
		&self.types
	}

	/// Name and import tracking.
	pub fn types_mut(&mut self) -> &mut TypeManager {
		&mut self.types
	}

	/// Directory file-backed values are loaded from at test runtime.
	pub fn resource_dir(&self) -> &str {
		&self.resource_dir
	}

	/// Fresh local name derived from `ty`: `list1`, `order2`, `intArray1`.
	pub fn new_name(&mut self, ty: &Type) -> String {
		let base = self.base_name(ty);
		self.fresh(&base)
	}

	/// Fresh name for a matcher local: `orderMatcher1`.
	pub fn new_matcher_name(&mut self, ty: &Type) -> String {
		let base = format!("{}Matcher", self.base_name(ty));
		self.fresh(&base)
	}

	fn base_name(&self, ty: &Type) -> String {
		let mut base = lower_camel(&self.types.simple_name(ty));
		if ty.is_array() {
			base.push_str("Array");
		}
		base
	}

	/// Fresh local name with an explicit base.
	pub fn fresh(&mut self, base: &str) -> String {
		let base = if base.is_empty() || base.starts_with(|ch: char| ch.is_ascii_digit()) {
			"value"
		} else {
			base
		};
		let counter = self.counters.entry(base.to_owned()).or_insert(0);
		*counter += 1;
		format!("{base}{counter}")
	}

	/// Local bound to `id`, if generation of it started.
	pub fn local(&self, id: ValueId) -> Option<&LocalVariable> {
		self.locals.get(&id)
	}

	/// State of the local bound to `id`.
	pub fn state(&self, id: ValueId) -> Option<VariableState> {
		self.locals.get(&id).map(|local| local.state)
	}

	/// Whether a placeholder for `id` was declared before its generation finished.
	pub fn is_forwarded(&self, id: ValueId) -> bool {
		self.state(id) == Some(VariableState::Forwarded)
	}

	/// Start generating `id` under local `name`.
	pub fn reserve(&mut self, id: ValueId, name: String) {
		self.locals.insert(
			id,
			LocalVariable {
				expression: name.clone(),
				name,
				state: VariableState::Reserved,
			},
		);
	}

	/// Record the placeholder declared for a reserved value.
	pub fn forward(&mut self, id: ValueId, expression: String) -> Result<()> {
		let local = self.locals.get_mut(&id).ok_or(RecallError::UnknownValue { id: id.0 })?;
		local.expression = expression;
		local.state = VariableState::Forwarded;
		Ok(())
	}

	/// Finish `id`; later references use `expression`.
	pub fn define(&mut self, id: ValueId, expression: String) -> Result<()> {
		let local = self.locals.get_mut(&id).ok_or(RecallError::UnknownValue { id: id.0 })?;
		local.expression = expression;
		local.state = VariableState::Defined;
		Ok(())
	}

	/// Forget which values are bound to locals. Names already handed out stay taken.
	pub fn clear_locals(&mut self) {
		self.locals.clear();
	}

	/// First local still reserved, if any.
	pub fn unresolved(&self) -> Option<&LocalVariable> {
		let mut pending: Vec<&LocalVariable> = self.locals.values().filter(|local| local.state == VariableState::Reserved).collect();
		pending.sort_by(|left, right| left.name.cmp(&right.name));
		pending.into_iter().next()
	}

	/// Hints attached to `id` by the field holding it.
	pub fn hints(&self, id: ValueId) -> &[Annotation] {
		self.hints.get(&id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Attach field hints to the value stored in that field.
	pub fn add_hints(&mut self, id: ValueId, hints: &[Annotation]) {
		if hints.is_empty() {
			return;
		}
		let entry = self.hints.entry(id).or_default();
		for hint in hints {
			if !entry.contains(hint) {
				entry.push(hint.clone());
			}
		}
	}

	/// Register a generated resource file.
	pub fn add_resource(&mut self, name: String, content: String) {
		self.resources.insert(name, content);
	}

	/// Generated resource files by name.
	pub fn resources(&self) -> &BTreeMap<String, String> {
		&self.resources
	}

	/// Take the generated resources out of the context.
	pub fn take_resources(&mut self) -> BTreeMap<String, String> {
		std::mem::take(&mut self.resources)
	}
}

fn lower_camel(name: &str) -> String {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) => first.to_lowercase().chain(chars).filter(|ch| ch.is_alphanumeric() || *ch == '_').collect(),
		None => String::new(),
	}
}
