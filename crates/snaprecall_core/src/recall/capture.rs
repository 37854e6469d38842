use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::recall::{
	Annotation, CaptureOptions, ClassCategory, Heap, LambdaOrigin, Literal, LiveObject, LiveValue, ObjectBody, ObjectId, Primitive,
	RecallError, Result, SerializedField, SerializedValue, Type, TypeUniverse, ValueGraph, ValueId, ValueNode,
};

/// Identity cache and graph under construction for one capture.
///
/// Sessions are never shared; every snapshot gets its own.
#[derive(Debug, Default)]
pub struct CaptureSession {
	graph: ValueGraph,
	cache: HashMap<ObjectId, ValueId>,
	sets: Vec<ValueId>,
}

impl CaptureSession {
	/// Fresh session with an empty identity cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Values captured so far.
	pub fn graph(&self) -> &ValueGraph {
		&self.graph
	}

	/// Value already captured for a live object.
	pub fn cached(&self, id: ObjectId) -> Option<ValueId> {
		self.cache.get(&id).copied()
	}

	/// Freeze the captured values.
	///
	/// Set elements are deduplicated here, once every object they reach is populated.
	/// Sets complete inner-first, so nested sets are already collapsed when an outer one is compared.
	pub fn finish(mut self) -> ValueGraph {
		for id in std::mem::take(&mut self.sets) {
			let Ok(SerializedValue::Set { elements, .. }) = self.graph.get(id).map(|node| &node.value) else {
				continue;
			};
			let kept = dedup_structural(&self.graph, elements.clone());
			if let Ok(ValueNode {
				value: SerializedValue::Set { elements, .. },
				..
			}) = self.graph.get_mut(id)
			{
				if kept.len() != elements.len() {
					tracing::trace!(value = %id, before = elements.len(), after = kept.len(), "set elements collapsed");
				}
				*elements = kept;
			}
		}
		tracing::debug!(values = self.graph.len(), objects = self.cache.len(), "capture session finished");
		self.graph
	}
}

/// Turns live heap values into [`ValueGraph`] nodes.
#[derive(Debug, Clone)]
pub struct Capturer<'a> {
	heap: &'a Heap,
	universe: &'a TypeUniverse,
	options: &'a CaptureOptions,
	package: String,
}

impl<'a> Capturer<'a> {
	/// Capturer reading `heap` with class metadata from `universe`.
	pub fn new(heap: &'a Heap, universe: &'a TypeUniverse, options: &'a CaptureOptions) -> Self {
		Self {
			heap,
			universe,
			options,
			package: String::new(),
		}
	}

	/// Package generated code will live in; inferred container types must be nameable there.
	pub fn with_package(mut self, package: &str) -> Self {
		self.package = package.to_owned();
		self
	}

	/// Class table in use.
	pub fn universe(&self) -> &'a TypeUniverse {
		self.universe
	}

	/// Capture `live`, stored under `declared`, into `session`.
	pub fn serialize(&self, declared: &Type, live: &LiveValue, session: &mut CaptureSession) -> Result<ValueId> {
		let usage = usage_type(declared);
		match live {
			LiveValue::Null => Ok(push_null(session, declared, usage)),
			LiveValue::Ref(id) => self.serialize_object(declared, usage, *id, session),
			scalar => {
				let Some(literal) = Literal::from_live(scalar) else {
					return Ok(push_null(session, declared, usage));
				};
				let ty = literal_type(declared, scalar);
				Ok(session.graph.push(ValueNode {
					ty,
					used_types: vec![usage],
					value: SerializedValue::Literal { value: literal },
				}))
			}
		}
	}

	/// Capture the current value of a static field.
	pub fn serialize_global(&self, class: &str, field: &str, session: &mut CaptureSession) -> Result<ValueId> {
		let value = self.heap.static_value(class, field);
		self.serialize_global_value(class, field, &value, session)
	}

	/// Capture an observed value of a static field.
	pub fn serialize_global_value(&self, class: &str, field: &str, value: &LiveValue, session: &mut CaptureSession) -> Result<ValueId> {
		let (_, info) = self.universe.field(class, field)?;
		let declared = info.ty.clone();
		self.serialize(&declared, value, session)
	}

	fn serialize_object(&self, declared: &Type, usage: Type, id: ObjectId, session: &mut CaptureSession) -> Result<ValueId> {
		if let Some(value) = session.cached(id) {
			tracing::trace!(object = %id, value = %value, "identity cache hit");
			session.graph.use_as(value, &usage)?;
			return Ok(value);
		}

		let object = self.heap.get(id)?;
		if self.is_excluded(&object.class) {
			tracing::debug!(object = %id, class = %object.class, "class excluded from capture");
			return Ok(push_null(session, declared, usage));
		}

		match &object.body {
			ObjectBody::Immutable { repr } => {
				return Ok(session.graph.push(ValueNode {
					ty: object.class.clone(),
					used_types: vec![usage],
					value: SerializedValue::Immutable { repr: repr.clone() },
				}));
			}
			ObjectBody::Constant { name } => {
				return Ok(session.graph.push(ValueNode {
					ty: object.class.clone(),
					used_types: vec![usage],
					value: SerializedValue::Enum { name: name.clone() },
				}));
			}
			_ => {}
		}

		let placeholder = session.graph.push(ValueNode {
			ty: object.class.clone(),
			used_types: vec![usage],
			value: SerializedValue::Object {
				fields: Vec::new(),
				lambda: None,
			},
		});
		session.cache.insert(id, placeholder);

		let (ty, value) = self.populate(declared, object, session)?;
		if matches!(value, SerializedValue::Set { .. }) {
			session.sets.push(placeholder);
		}
		let node = session.graph.get_mut(placeholder)?;
		node.ty = ty;
		node.value = value;
		Ok(placeholder)
	}

	fn populate(&self, declared: &Type, object: &LiveObject, session: &mut CaptureSession) -> Result<(Type, SerializedValue)> {
		let class = &object.class;
		let kind = self.universe.collection_kind(class);
		match (&object.body, class, kind) {
			(ObjectBody::Elements { elements }, Type::Array(component), _) => {
				let elements = self.serialize_all(component, elements, session)?;
				Ok((
					class.clone(),
					SerializedValue::Array {
						component: (**component).clone(),
						elements,
					},
				))
			}
			(ObjectBody::Elements { elements }, _, Some(ClassCategory::List | ClassCategory::Set)) => {
				let observed: Vec<&LiveValue> = elements.iter().collect();
				let component = self.infer_argument(declared, "java.util.Collection", 0, &observed)?;
				let ids = self.serialize_all(&component, elements, session)?;
				let ty = self.parameterize(class, std::slice::from_ref(&component));
				if kind == Some(ClassCategory::Set) {
					Ok((ty, SerializedValue::Set { component, elements: ids }))
				} else {
					Ok((ty, SerializedValue::List { component, elements: ids }))
				}
			}
			(ObjectBody::Entries { entries }, _, Some(ClassCategory::Map)) => {
				let keys: Vec<&LiveValue> = entries.iter().map(|(key, _)| key).collect();
				let values: Vec<&LiveValue> = entries.iter().map(|(_, value)| value).collect();
				let key = self.infer_argument(declared, "java.util.Map", 0, &keys)?;
				let value = self.infer_argument(declared, "java.util.Map", 1, &values)?;
				let mut captured = Vec::with_capacity(entries.len());
				for (live_key, live_value) in entries {
					let key_id = self.serialize(&key, live_key, session)?;
					let value_id = self.serialize(&value, live_value, session)?;
					captured.push((key_id, value_id));
				}
				let ty = self.parameterize(class, &[key.clone(), value.clone()]);
				Ok((ty, SerializedValue::Map { key, value, entries: captured }))
			}
			(ObjectBody::Fields { fields }, Type::Class(_) | Type::Parameterized { .. }, _) => {
				let captured = self.serialize_fields(class, fields, session)?;
				Ok((
					class.clone(),
					SerializedValue::Object {
						fields: captured,
						lambda: None,
					},
				))
			}
			(
				ObjectBody::Lambda {
					interface,
					impl_class,
					impl_method,
					captured,
				},
				_,
				_,
			) => {
				let mut fields = Vec::with_capacity(captured.len());
				for (idx, item) in captured.iter().enumerate() {
					let declared = Type::object();
					let value = self.serialize(&declared, item, session)?;
					fields.push(SerializedField {
						declaring: class.clone(),
						name: Arc::from(format!("arg${}", idx + 1)),
						ty: declared,
						value,
						hints: Vec::new(),
					});
				}
				let lambda = LambdaOrigin {
					interface: interface.clone(),
					impl_class: impl_class.clone(),
					impl_method: impl_method.clone(),
				};
				Ok((
					class.clone(),
					SerializedValue::Object {
						fields,
						lambda: Some(lambda),
					},
				))
			}
			(body, _, _) => Err(RecallError::BodyMismatch {
				id: object.id.0,
				class: class.to_string(),
				expected: expected_body(class, kind),
				got: body.kind(),
			}),
		}
	}

	fn serialize_fields(&self, class: &Type, fields: &BTreeMap<String, LiveValue>, session: &mut CaptureSession) -> Result<Vec<SerializedField>> {
		let Some(name) = class.base_name() else {
			return Ok(Vec::new());
		};
		let mut out = Vec::new();
		for (declaring, field) in self.universe.instance_fields(name) {
			if field.is_excluded() || self.options.excludes_field(&declaring.name, &field.name) {
				tracing::trace!(class = %declaring.name, field = %field.name, "field excluded from capture");
				continue;
			}
			let live = fields.get(field.name.as_ref()).cloned().unwrap_or_else(|| default_value(&field.ty));
			if self.is_excluded(&field.ty) || self.holds_excluded(&live)? {
				tracing::trace!(class = %declaring.name, field = %field.name, "field of excluded class dropped from capture");
				continue;
			}
			let value = self.serialize(&field.ty, &live, session)?;
			let mut hints: Vec<Annotation> = field
				.annotations
				.iter()
				.filter(|item| **item != Annotation::Excluded)
				.cloned()
				.collect();
			hints.extend(self.options.hints_for(&declaring.name, &field.name));
			out.push(SerializedField {
				declaring: declaring.raw_type(),
				name: field.name.clone(),
				ty: field.ty.clone(),
				value,
				hints,
			});
		}
		Ok(out)
	}

	fn serialize_all(&self, declared: &Type, elements: &[LiveValue], session: &mut CaptureSession) -> Result<Vec<ValueId>> {
		elements.iter().map(|item| self.serialize(declared, item, session)).collect()
	}

	/// Element, key or value type for a container stored under `declared`.
	///
	/// A concrete type argument of the declaration wins; otherwise the narrowest common
	/// supertype of the observed values, kept within a wildcard's upper bound.
	fn infer_argument(&self, declared: &Type, raw: &str, index: usize, observed: &[&LiveValue]) -> Result<Type> {
		let declared_arg = self.universe.type_argument(declared, raw, index);
		let bound = match &declared_arg {
			Some(Type::Wildcard { upper, .. }) => upper.first().cloned(),
			Some(Type::Variable(_)) | None => None,
			Some(fixed) => return Ok(fixed.clone()),
		};

		let mut runtime = Vec::new();
		for item in observed {
			if let Some(ty) = self.runtime_type(item)? {
				runtime.push(ty);
			}
		}
		let common = if runtime.is_empty() {
			bound.clone().unwrap_or_else(Type::object)
		} else {
			self.universe.common_supertype(&runtime)
		};
		let common = match bound {
			Some(bound) if !self.universe.is_assignable(&common, &bound) => bound,
			_ => common,
		};
		Ok(self.universe.visible_supertype(&common, &self.package))
	}

	fn runtime_type(&self, value: &LiveValue) -> Result<Option<Type>> {
		match value {
			LiveValue::Null => Ok(None),
			LiveValue::Ref(id) => Ok(Some(self.heap.get(*id)?.class.erasure())),
			other => Ok(other.inline_type()),
		}
	}

	/// Apply inferred arguments to a generic runtime class of matching arity.
	fn parameterize(&self, class: &Type, args: &[Type]) -> Type {
		let Type::Class(name) = class else {
			return class.clone();
		};
		match self.universe.class(name) {
			Some(info) if info.type_params.len() == args.len() => Type::Parameterized {
				raw: name.clone(),
				args: args.to_vec(),
			},
			_ => class.clone(),
		}
	}

	fn holds_excluded(&self, live: &LiveValue) -> Result<bool> {
		match live {
			LiveValue::Ref(id) => Ok(self.is_excluded(&self.heap.get(*id)?.class)),
			_ => Ok(false),
		}
	}

	fn is_excluded(&self, class: &Type) -> bool {
		let Some(name) = class.array_base().base_name() else {
			return false;
		};
		self.options.excludes_class(name) || self.universe.class(name).is_some_and(|info| info.excluded)
	}
}

fn push_null(session: &mut CaptureSession, declared: &Type, usage: Type) -> ValueId {
	session.graph.push(ValueNode {
		ty: declared.clone(),
		used_types: vec![usage],
		value: SerializedValue::Null,
	})
}

/// Type recorded as a use: open variables and wildcards erase to their bound.
fn usage_type(declared: &Type) -> Type {
	match declared {
		Type::Variable(_) | Type::Wildcard { .. } => declared.erasure(),
		other => other.clone(),
	}
}

fn literal_type(declared: &Type, value: &LiveValue) -> Type {
	match (declared, value.primitive()) {
		(Type::Primitive(expected), Some(actual)) if *expected == actual => declared.clone(),
		_ => value.inline_type().unwrap_or_else(Type::object),
	}
}

fn default_value(ty: &Type) -> LiveValue {
	match ty {
		Type::Primitive(Primitive::Boolean) => LiveValue::Bool(false),
		Type::Primitive(Primitive::Byte) => LiveValue::Byte(0),
		Type::Primitive(Primitive::Short) => LiveValue::Short(0),
		Type::Primitive(Primitive::Char) => LiveValue::Char('\0'),
		Type::Primitive(Primitive::Int) => LiveValue::Int(0),
		Type::Primitive(Primitive::Long) => LiveValue::Long(0),
		Type::Primitive(Primitive::Float) => LiveValue::Float(0.0),
		Type::Primitive(Primitive::Double) => LiveValue::Double(0.0),
		_ => LiveValue::Null,
	}
}

fn expected_body(class: &Type, kind: Option<ClassCategory>) -> &'static str {
	match (class, kind) {
		(Type::Array(_), _) | (_, Some(ClassCategory::List | ClassCategory::Set)) => "elements",
		(_, Some(ClassCategory::Map)) => "entries",
		_ => "fields",
	}
}

fn dedup_structural(graph: &ValueGraph, ids: Vec<ValueId>) -> Vec<ValueId> {
	let mut kept: Vec<ValueId> = Vec::with_capacity(ids.len());
	for id in ids {
		if !kept.iter().any(|existing| graph.structurally_equal(*existing, graph, id)) {
			kept.push(id);
		}
	}
	kept
}
