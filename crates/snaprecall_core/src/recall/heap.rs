use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::recall::{Primitive, RecallError, Result, Type};

/// Identity of one live object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Value stored in a field, element slot or static.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveValue {
	/// Null reference.
	Null,
	/// `boolean` or `Boolean`.
	Bool(bool),
	/// `byte` or `Byte`.
	Byte(i8),
	/// `short` or `Short`.
	Short(i16),
	/// `int` or `Integer`.
	Int(i32),
	/// `long` or `Long`.
	Long(i64),
	/// `float` or `Float`.
	Float(f32),
	/// `double` or `Double`.
	Double(f64),
	/// `char` or `Character`.
	Char(char),
	/// String instance.
	Str(String),
	/// Reference to a heap object.
	Ref(ObjectId),
}

impl LiveValue {
	/// Referenced object, if any.
	pub fn object(&self) -> Option<ObjectId> {
		match self {
			Self::Ref(id) => Some(*id),
			_ => None,
		}
	}

	/// Whether this is the null reference.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Primitive kind of an inline scalar.
	pub fn primitive(&self) -> Option<Primitive> {
		Some(match self {
			Self::Bool(_) => Primitive::Boolean,
			Self::Byte(_) => Primitive::Byte,
			Self::Short(_) => Primitive::Short,
			Self::Int(_) => Primitive::Int,
			Self::Long(_) => Primitive::Long,
			Self::Float(_) => Primitive::Float,
			Self::Double(_) => Primitive::Double,
			Self::Char(_) => Primitive::Char,
			_ => return None,
		})
	}

	/// Runtime class of an inline value; boxed for scalars.
	pub fn inline_type(&self) -> Option<Type> {
		match self {
			Self::Str(_) => Some(Type::string()),
			other => other.primitive().map(|primitive| Type::class(primitive.boxed())),
		}
	}
}

/// Shape-specific state of a live object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "body", rename_all = "snake_case")]
pub enum ObjectBody {
	/// Plain object fields by name.
	Fields {
		/// Field values, static fields excluded.
		#[serde(default)]
		fields: BTreeMap<String, LiveValue>,
	},
	/// List, set or array content in iteration order.
	Elements {
		/// Element values.
		#[serde(default)]
		elements: Vec<LiveValue>,
	},
	/// Map content in iteration order.
	Entries {
		/// Key and value pairs.
		#[serde(default)]
		entries: Vec<(LiveValue, LiveValue)>,
	},
	/// Enum constant.
	Constant {
		/// Constant name.
		name: String,
	},
	/// Value object known through its textual form.
	Immutable {
		/// Textual representation accepted by the class' string constructor.
		repr: String,
	},
	/// Function value created from a lambda or method reference.
	Lambda {
		/// Functional interface the value implements.
		interface: Type,
		/// Class holding the implementation method.
		impl_class: String,
		/// Implementation method name.
		impl_method: String,
		/// Captured arguments in order.
		#[serde(default)]
		captured: Vec<LiveValue>,
	},
}

impl ObjectBody {
	/// Empty field body.
	pub fn fields() -> Self {
		Self::Fields { fields: BTreeMap::new() }
	}

	/// Stable label of the body shape.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Fields { .. } => "fields",
			Self::Elements { .. } => "elements",
			Self::Entries { .. } => "entries",
			Self::Constant { .. } => "constant",
			Self::Immutable { .. } => "immutable",
			Self::Lambda { .. } => "lambda",
		}
	}
}

/// One object of the observed heap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveObject {
	/// Object identity.
	pub id: ObjectId,
	/// Runtime class.
	pub class: Type,
	/// Object state.
	#[serde(flatten)]
	pub body: ObjectBody,
}

/// Value of one static field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticField {
	/// Declaring class.
	pub class: String,
	/// Field name.
	pub field: String,
	/// Current value.
	pub value: LiveValue,
}

/// Object store standing in for the memory of the observed program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HeapRepr", into = "HeapRepr")]
pub struct Heap {
	objects: BTreeMap<ObjectId, LiveObject>,
	statics: BTreeMap<(String, String), LiveValue>,
	next: u64,
}

#[derive(Serialize, Deserialize)]
struct HeapRepr {
	#[serde(default)]
	objects: Vec<LiveObject>,
	#[serde(default)]
	statics: Vec<StaticField>,
}

impl From<HeapRepr> for Heap {
	fn from(value: HeapRepr) -> Self {
		let mut heap = Heap::new();
		for object in value.objects {
			heap.insert_object(object);
		}
		for item in value.statics {
			heap.set_static(&item.class, &item.field, item.value);
		}
		heap
	}
}

impl From<Heap> for HeapRepr {
	fn from(value: Heap) -> Self {
		Self {
			objects: value.objects.into_values().collect(),
			statics: value
				.statics
				.into_iter()
				.map(|((class, field), value)| StaticField { class, field, value })
				.collect(),
		}
	}
}

impl Heap {
	/// Empty heap.
	pub fn new() -> Self {
		Self::default()
	}

	/// Allocate a new object and return its id.
	pub fn alloc(&mut self, class: Type, body: ObjectBody) -> ObjectId {
		let id = ObjectId(self.next + 1);
		self.insert_object(LiveObject { id, class, body });
		id
	}

	/// Insert an object under its own id, replacing any previous object.
	pub fn insert_object(&mut self, object: LiveObject) {
		self.next = self.next.max(object.id.0);
		self.objects.insert(object.id, object);
	}

	/// Look up an object.
	pub fn get(&self, id: ObjectId) -> Result<&LiveObject> {
		self.objects.get(&id).ok_or(RecallError::DanglingReference { id: id.0 })
	}

	/// Look up an object mutably.
	pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut LiveObject> {
		self.objects.get_mut(&id).ok_or(RecallError::DanglingReference { id: id.0 })
	}

	/// Number of objects.
	pub fn len(&self) -> usize {
		self.objects.len()
	}

	/// Whether the heap holds no object.
	pub fn is_empty(&self) -> bool {
		self.objects.is_empty()
	}

	/// Objects in id order.
	pub fn objects(&self) -> impl Iterator<Item = &LiveObject> {
		self.objects.values()
	}

	/// Set one field of a plain object.
	pub fn set_field(&mut self, id: ObjectId, field: &str, value: LiveValue) -> Result<()> {
		let object = self.get_mut(id)?;
		match &mut object.body {
			ObjectBody::Fields { fields } => {
				fields.insert(field.to_owned(), value);
				Ok(())
			}
			other => Err(RecallError::BodyMismatch {
				id: id.0,
				class: object.class.to_string(),
				expected: "fields",
				got: other.kind(),
			}),
		}
	}

	/// Value of a static field, `Null` when never set.
	pub fn static_value(&self, class: &str, field: &str) -> LiveValue {
		self.statics
			.get(&(class.to_owned(), field.to_owned()))
			.cloned()
			.unwrap_or(LiveValue::Null)
	}

	/// Set a static field.
	pub fn set_static(&mut self, class: &str, field: &str, value: LiveValue) {
		self.statics.insert((class.to_owned(), field.to_owned()), value);
	}
}
