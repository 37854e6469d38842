use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::recall::{Annotation, LiveValue, Primitive, RecallError, Result, Type, TypeUniverse};

/// Identity of a captured value inside one [`ValueGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "value#{}", self.0)
	}
}

/// Scalar captured by value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
	/// `boolean`
	Bool(bool),
	/// `byte`
	Byte(i8),
	/// `short`
	Short(i16),
	/// `int`
	Int(i32),
	/// `long`
	Long(i64),
	/// `float`
	Float(f32),
	/// `double`
	Double(f64),
	/// `char`
	Char(char),
	/// String.
	Str(String),
}

impl Literal {
	/// Literal for an inline live value.
	pub fn from_live(value: &LiveValue) -> Option<Self> {
		Some(match value {
			LiveValue::Bool(item) => Self::Bool(*item),
			LiveValue::Byte(item) => Self::Byte(*item),
			LiveValue::Short(item) => Self::Short(*item),
			LiveValue::Int(item) => Self::Int(*item),
			LiveValue::Long(item) => Self::Long(*item),
			LiveValue::Float(item) => Self::Float(*item),
			LiveValue::Double(item) => Self::Double(*item),
			LiveValue::Char(item) => Self::Char(*item),
			LiveValue::Str(item) => Self::Str(item.clone()),
			LiveValue::Null | LiveValue::Ref(_) => return None,
		})
	}

	/// Live value holding this literal.
	pub fn to_live(&self) -> LiveValue {
		match self {
			Self::Bool(item) => LiveValue::Bool(*item),
			Self::Byte(item) => LiveValue::Byte(*item),
			Self::Short(item) => LiveValue::Short(*item),
			Self::Int(item) => LiveValue::Int(*item),
			Self::Long(item) => LiveValue::Long(*item),
			Self::Float(item) => LiveValue::Float(*item),
			Self::Double(item) => LiveValue::Double(*item),
			Self::Char(item) => LiveValue::Char(*item),
			Self::Str(item) => LiveValue::Str(item.clone()),
		}
	}

	/// Primitive kind, `None` for strings.
	pub fn primitive(&self) -> Option<Primitive> {
		self.to_live().primitive()
	}

	/// Bitwise equality; `NaN` equals itself.
	pub fn same(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Float(left), Self::Float(right)) => left.to_bits() == right.to_bits(),
			(Self::Double(left), Self::Double(right)) => left.to_bits() == right.to_bits(),
			_ => self == other,
		}
	}
}

/// One captured object field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerializedField {
	/// Class declaring the field.
	pub declaring: Type,
	/// Field name.
	pub name: Arc<str>,
	/// Declared field type.
	#[serde(rename = "type")]
	pub ty: Type,
	/// Captured value.
	pub value: ValueId,
	/// Reconstruction hints.
	pub hints: Vec<Annotation>,
}

/// Source of a captured function value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LambdaOrigin {
	/// Implemented functional interface.
	pub interface: Type,
	/// Class holding the implementation method.
	pub impl_class: String,
	/// Implementation method.
	pub impl_method: String,
}

/// Coarse kind a value is dispatched by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
	/// Null reference.
	Null,
	/// Scalar by value.
	Literal,
	/// Value object by textual form.
	Immutable,
	/// Enum constant.
	Enum,
	/// Field-by-field object.
	Object,
	/// Ordered collection.
	List,
	/// Distinct element collection.
	Set,
	/// Key to value association.
	Map,
	/// Fixed-length array.
	Array,
}

impl ValueKind {
	/// All kinds in dispatch-table order.
	pub const ALL: [ValueKind; 9] = [
		ValueKind::Null,
		ValueKind::Literal,
		ValueKind::Immutable,
		ValueKind::Enum,
		ValueKind::Object,
		ValueKind::List,
		ValueKind::Set,
		ValueKind::Map,
		ValueKind::Array,
	];

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Literal => "literal",
			Self::Immutable => "immutable",
			Self::Enum => "enum",
			Self::Object => "object",
			Self::List => "list",
			Self::Set => "set",
			Self::Map => "map",
			Self::Array => "array",
		}
	}

	/// Whether values of this kind carry identity.
	pub fn is_reference(self) -> bool {
		matches!(self, Self::Object | Self::List | Self::Set | Self::Map | Self::Array)
	}
}

/// Captured state of one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SerializedValue {
	/// Null reference.
	Null,
	/// Scalar captured by value.
	Literal {
		/// Captured scalar.
		value: Literal,
	},
	/// Value object captured through its textual form.
	Immutable {
		/// Textual form.
		repr: String,
	},
	/// Enum constant.
	Enum {
		/// Constant name.
		name: String,
	},
	/// Object captured field by field.
	Object {
		/// Captured fields in declaration order.
		fields: Vec<SerializedField>,
		/// Set for function values.
		lambda: Option<LambdaOrigin>,
	},
	/// Ordered collection.
	List {
		/// Inferred element type.
		component: Type,
		/// Elements in order.
		elements: Vec<ValueId>,
	},
	/// Collection of structurally distinct elements.
	Set {
		/// Inferred element type.
		component: Type,
		/// Elements in capture order.
		elements: Vec<ValueId>,
	},
	/// Key to value association.
	Map {
		/// Inferred key type.
		key: Type,
		/// Inferred value type.
		value: Type,
		/// Entries in capture order.
		entries: Vec<(ValueId, ValueId)>,
	},
	/// Fixed-length array.
	Array {
		/// Array component type.
		component: Type,
		/// Elements in index order.
		elements: Vec<ValueId>,
	},
}

impl SerializedValue {
	/// Dispatch kind.
	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Null => ValueKind::Null,
			Self::Literal { .. } => ValueKind::Literal,
			Self::Immutable { .. } => ValueKind::Immutable,
			Self::Enum { .. } => ValueKind::Enum,
			Self::Object { .. } => ValueKind::Object,
			Self::List { .. } => ValueKind::List,
			Self::Set { .. } => ValueKind::Set,
			Self::Map { .. } => ValueKind::Map,
			Self::Array { .. } => ValueKind::Array,
		}
	}

	/// Directly referenced child values.
	pub fn referenced_values(&self) -> Vec<ValueId> {
		match self {
			Self::Object { fields, .. } => fields.iter().map(|field| field.value).collect(),
			Self::List { elements, .. } | Self::Set { elements, .. } | Self::Array { elements, .. } => elements.clone(),
			Self::Map { entries, .. } => entries.iter().flat_map(|(key, value)| [*key, *value]).collect(),
			_ => Vec::new(),
		}
	}
}

/// One node of a captured graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueNode {
	/// Best known type: runtime class for references, static type for null.
	#[serde(rename = "type")]
	pub ty: Type,
	/// Static types this value was stored under, in first-use order.
	pub used_types: Vec<Type>,
	/// Captured state.
	pub value: SerializedValue,
}

impl ValueNode {
	/// Dispatch kind.
	pub fn kind(&self) -> ValueKind {
		self.value.kind()
	}
}

/// Frozen arena of captured values; identity is [`ValueId`] equality.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValueGraph {
	nodes: Vec<ValueNode>,
}

impl ValueGraph {
	/// Empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of values.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the graph holds no value.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Look up a value.
	pub fn get(&self, id: ValueId) -> Result<&ValueNode> {
		self.nodes.get(id.0 as usize).ok_or(RecallError::UnknownValue { id: id.0 })
	}

	/// All values with their ids.
	pub fn iter(&self) -> impl Iterator<Item = (ValueId, &ValueNode)> {
		self.nodes.iter().enumerate().map(|(idx, node)| (ValueId(idx as u32), node))
	}

	pub(crate) fn push(&mut self, node: ValueNode) -> ValueId {
		let id = ValueId(self.nodes.len() as u32);
		self.nodes.push(node);
		id
	}

	pub(crate) fn get_mut(&mut self, id: ValueId) -> Result<&mut ValueNode> {
		self.nodes.get_mut(id.0 as usize).ok_or(RecallError::UnknownValue { id: id.0 })
	}

	/// Record that a value was stored under `ty`.
	pub(crate) fn use_as(&mut self, id: ValueId, ty: &Type) -> Result<()> {
		let node = self.get_mut(id)?;
		if !node.used_types.contains(ty) {
			node.used_types.push(ty.clone());
		}
		Ok(())
	}

	/// Directly referenced child values.
	pub fn referenced_values(&self, id: ValueId) -> Result<Vec<ValueId>> {
		Ok(self.get(id)?.value.referenced_values())
	}

	/// Every value reachable from `root`, `root` first, each once.
	pub fn reachable(&self, root: ValueId) -> Result<Vec<ValueId>> {
		let mut out = Vec::new();
		let mut seen = HashSet::new();
		let mut stack = vec![root];
		while let Some(id) = stack.pop() {
			if !seen.insert(id) {
				continue;
			}
			let children = self.referenced_values(id)?;
			stack.extend(children.into_iter().rev());
			out.push(id);
		}
		Ok(out)
	}

	/// Type generated code should declare the value as.
	///
	/// The first used type that every other use accepts wins. Failing that, the first erased
	/// use that still accepts all uses; failing that, the nearest supertype of the runtime type
	/// that `package` can name.
	pub fn display_type(&self, id: ValueId, universe: &TypeUniverse, package: &str) -> Result<Type> {
		let node = self.get(id)?;
		if !node.kind().is_reference() {
			return Ok(node.ty.clone());
		}

		let visible = |ty: &Type| universe.is_type_visible(ty, package) && universe.is_assignable(&node.ty, ty);
		let accepts_all = |ty: &Type| node.used_types.iter().all(|used| universe.is_assignable(ty, used));

		if let Some(found) = node.used_types.iter().find(|ty| visible(ty) && accepts_all(ty)) {
			return Ok(found.clone());
		}
		if let Some(found) = node.used_types.iter().map(Type::erasure).find(|ty| visible(ty) && accepts_all(ty)) {
			return Ok(found);
		}
		Ok(universe.visible_supertype(&node.ty, package))
	}

	/// Short human-readable description used in diagnostics.
	pub fn describe(&self, id: ValueId) -> String {
		let Ok(node) = self.get(id) else {
			return format!("<missing {id}>");
		};
		match &node.value {
			SerializedValue::Null => format!("null of {}", node.ty),
			SerializedValue::Literal { value } => format!("{value:?}"),
			SerializedValue::Immutable { repr } => format!("{}({repr:?})", node.ty),
			SerializedValue::Enum { name } => format!("{}.{name}", node.ty),
			other => format!("{} {} ({id})", other.kind().as_str(), node.ty),
		}
	}

	/// Whether `left` in this graph and `right` in `other` describe the same state.
	///
	/// Pairs already under comparison count as equal, so cyclic graphs terminate.
	pub fn structurally_equal(&self, left: ValueId, other: &ValueGraph, right: ValueId) -> bool {
		let mut assumed = HashSet::new();
		self.equal_inner(left, other, right, &mut assumed)
	}

	fn equal_inner(&self, left: ValueId, other: &ValueGraph, right: ValueId, assumed: &mut HashSet<(ValueId, ValueId)>) -> bool {
		if !assumed.insert((left, right)) {
			return true;
		}
		let (Ok(a), Ok(b)) = (self.get(left), other.get(right)) else {
			return false;
		};
		if a.kind() != b.kind() {
			return false;
		}
		if a.kind().is_reference() && a.ty.erasure() != b.ty.erasure() {
			return false;
		}

		let equal = match (&a.value, &b.value) {
			(SerializedValue::Null, SerializedValue::Null) => true,
			(SerializedValue::Literal { value: x }, SerializedValue::Literal { value: y }) => x.same(y),
			(SerializedValue::Immutable { repr: x }, SerializedValue::Immutable { repr: y }) => x == y && a.ty == b.ty,
			(SerializedValue::Enum { name: x }, SerializedValue::Enum { name: y }) => x == y && a.ty == b.ty,
			(SerializedValue::Object { fields: x, .. }, SerializedValue::Object { fields: y, .. }) => {
				x.len() == y.len()
					&& x.iter().zip(y).all(|(fx, fy)| {
						fx.name == fy.name && fx.declaring == fy.declaring && self.equal_inner(fx.value, other, fy.value, assumed)
					})
			}
			(SerializedValue::List { elements: x, .. }, SerializedValue::List { elements: y, .. })
			| (SerializedValue::Array { elements: x, .. }, SerializedValue::Array { elements: y, .. }) => {
				x.len() == y.len() && x.iter().zip(y).all(|(ex, ey)| self.equal_inner(*ex, other, *ey, assumed))
			}
			(SerializedValue::Set { elements: x, .. }, SerializedValue::Set { elements: y, .. }) => {
				x.len() == y.len() && x.iter().all(|ex| y.iter().any(|ey| self.tentative_equal(*ex, other, *ey, assumed)))
			}
			(SerializedValue::Map { entries: x, .. }, SerializedValue::Map { entries: y, .. }) => {
				x.len() == y.len()
					&& x.iter().all(|(kx, vx)| {
						y.iter()
							.any(|(ky, vy)| self.tentative_equal(*kx, other, *ky, assumed) && self.tentative_equal(*vx, other, *vy, assumed))
					})
			}
			_ => false,
		};
		if !equal {
			assumed.remove(&(left, right));
		}
		equal
	}

	/// Tentative comparison that leaves no assumptions behind on failure.
	fn tentative_equal(&self, left: ValueId, other: &ValueGraph, right: ValueId, assumed: &mut HashSet<(ValueId, ValueId)>) -> bool {
		let mut trial = assumed.clone();
		if self.equal_inner(left, other, right, &mut trial) {
			*assumed = trial;
			true
		} else {
			false
		}
	}
}

#[cfg(test)]
mod tests;
