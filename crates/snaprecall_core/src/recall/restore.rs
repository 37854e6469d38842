use std::collections::{BTreeMap, HashMap};

use crate::recall::{Heap, LiveValue, ObjectBody, ObjectId, RecallError, Result, SerializedValue, Type, TypeUniverse, ValueGraph, ValueId};

/// Rebuilds live objects from a captured graph.
///
/// Identity is preserved across calls: restoring two values that share a child yields one
/// live object for that child.
#[derive(Debug)]
pub struct Restorer<'a> {
	graph: &'a ValueGraph,
	universe: &'a TypeUniverse,
	heap: Heap,
	objects: HashMap<ValueId, ObjectId>,
	constants: HashMap<(Type, String), ObjectId>,
}

impl<'a> Restorer<'a> {
	/// Restorer writing into a fresh heap.
	pub fn new(graph: &'a ValueGraph, universe: &'a TypeUniverse) -> Self {
		Self {
			graph,
			universe,
			heap: Heap::new(),
			objects: HashMap::new(),
			constants: HashMap::new(),
		}
	}

	/// Live value equivalent to `id`.
	pub fn restore(&mut self, id: ValueId) -> Result<LiveValue> {
		let graph = self.graph;
		let node = graph.get(id)?;
		match &node.value {
			SerializedValue::Null => Ok(LiveValue::Null),
			SerializedValue::Literal { value } => Ok(value.to_live()),
			SerializedValue::Immutable { repr } => {
				let object = self.heap.alloc(node.ty.erasure(), ObjectBody::Immutable { repr: repr.clone() });
				Ok(LiveValue::Ref(object))
			}
			SerializedValue::Enum { name } => {
				let key = (node.ty.erasure(), name.clone());
				if let Some(existing) = self.constants.get(&key) {
					return Ok(LiveValue::Ref(*existing));
				}
				let object = self.heap.alloc(key.0.clone(), ObjectBody::Constant { name: name.clone() });
				self.constants.insert(key, object);
				Ok(LiveValue::Ref(object))
			}
			_ => self.restore_reference(id),
		}
	}

	fn restore_reference(&mut self, id: ValueId) -> Result<LiveValue> {
		if let Some(existing) = self.objects.get(&id) {
			return Ok(LiveValue::Ref(*existing));
		}
		let graph = self.graph;
		let node = graph.get(id)?;
		let class = node.ty.erasure();
		let lambda = matches!(&node.value, SerializedValue::Object { lambda: Some(_), .. });
		if let (Some(name), false) = (class.array_base().base_name(), lambda) {
			self.universe.require(name)?;
		}

		let object = self.heap.alloc(class, ObjectBody::fields());
		self.objects.insert(id, object);

		let body = match &node.value {
			SerializedValue::Object { fields, lambda: None } => {
				let mut restored = BTreeMap::new();
				for field in fields {
					restored.insert(field.name.to_string(), self.restore(field.value)?);
				}
				ObjectBody::Fields { fields: restored }
			}
			SerializedValue::Object {
				fields,
				lambda: Some(origin),
			} => ObjectBody::Lambda {
				interface: origin.interface.clone(),
				impl_class: origin.impl_class.clone(),
				impl_method: origin.impl_method.clone(),
				captured: fields.iter().map(|field| self.restore(field.value)).collect::<Result<_>>()?,
			},
			SerializedValue::List { elements, .. } | SerializedValue::Set { elements, .. } | SerializedValue::Array { elements, .. } => {
				ObjectBody::Elements {
					elements: elements.iter().map(|item| self.restore(*item)).collect::<Result<_>>()?,
				}
			}
			SerializedValue::Map { entries, .. } => {
				let mut restored = Vec::with_capacity(entries.len());
				for (key, value) in entries {
					restored.push((self.restore(*key)?, self.restore(*value)?));
				}
				ObjectBody::Entries { entries: restored }
			}
			other => {
				return Err(RecallError::BodyMismatch {
					id: object.0,
					class: node.ty.to_string(),
					expected: "reference",
					got: other.kind().as_str(),
				});
			}
		};
		self.heap.get_mut(object)?.body = body;
		Ok(LiveValue::Ref(object))
	}

	/// Heap holding every restored object.
	pub fn finish(self) -> Heap {
		self.heap
	}
}

/// Rebuild the live state of `root`.
pub fn restore(graph: &ValueGraph, root: ValueId, universe: &TypeUniverse) -> Result<(Heap, LiveValue)> {
	let mut restorer = Restorer::new(graph, universe);
	let value = restorer.restore(root)?;
	Ok((restorer.finish(), value))
}
