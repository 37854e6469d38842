use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::recall::Type;

/// Access level of a class, field or constructor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
	/// Accessible everywhere.
	#[default]
	Public,
	/// Accessible from subclasses and the same package.
	Protected,
	/// Accessible from the same package only.
	Package,
	/// Accessible from the declaring class only.
	Private,
}

/// Structural kind of a class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
	/// Instantiable class.
	#[default]
	Class,
	/// Abstract class.
	Abstract,
	/// Interface.
	Interface,
	/// Enum type.
	Enum,
}

/// How instances of a class are captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassCategory {
	/// Field-by-field object.
	#[default]
	Plain,
	/// Boxed primitive or string, captured by value.
	Literal,
	/// Opaque value object, captured through its textual form.
	Immutable,
	/// Ordered sequence.
	List,
	/// Unordered distinct elements.
	Set,
	/// Key to value association.
	Map,
}

/// Reconstruction hint or capture marker attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
	/// Field is never captured.
	Excluded,
	/// Large literal arrays are loaded from a generated resource file.
	LoadFromFile {
		/// Directory the generated test reads the resource from.
		read_from: String,
	},
}

/// One declared field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldInfo {
	/// Field name.
	pub name: Arc<str>,
	/// Declared generic type.
	#[serde(rename = "type")]
	pub ty: Type,
	/// Static (class-level) field.
	#[serde(default, rename = "static")]
	pub is_static: bool,
	/// Final field.
	#[serde(default, rename = "final")]
	pub is_final: bool,
	/// Field access level.
	#[serde(default = "private_visibility")]
	pub visibility: Visibility,
	/// Attached annotations.
	#[serde(default)]
	pub annotations: Vec<Annotation>,
}

impl FieldInfo {
	/// Private mutable instance field.
	pub fn new(name: &str, ty: Type) -> Self {
		Self {
			name: Arc::from(name),
			ty,
			is_static: false,
			is_final: false,
			visibility: Visibility::Private,
			annotations: Vec::new(),
		}
	}

	/// Mark the field static.
	pub fn statik(mut self) -> Self {
		self.is_static = true;
		self
	}

	/// Mark the field final.
	pub fn fin(mut self) -> Self {
		self.is_final = true;
		self
	}

	/// Override field access level.
	pub fn visibility(mut self, visibility: Visibility) -> Self {
		self.visibility = visibility;
		self
	}

	/// Attach an annotation.
	pub fn annotated(mut self, annotation: Annotation) -> Self {
		self.annotations.push(annotation);
		self
	}

	/// Whether the field carries the exclusion marker.
	pub fn is_excluded(&self) -> bool {
		self.annotations.contains(&Annotation::Excluded)
	}
}

fn private_visibility() -> Visibility {
	Visibility::Private
}

/// One constructor parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamInfo {
	/// Declared parameter type.
	#[serde(rename = "type")]
	pub ty: Type,
	/// Field this parameter initializes, when known.
	#[serde(default)]
	pub field: Option<Arc<str>>,
	/// Constructor rejects `null` for this parameter.
	#[serde(default)]
	pub non_null: bool,
}

impl ParamInfo {
	/// Parameter with no known field link.
	pub fn new(ty: Type) -> Self {
		Self {
			ty,
			field: None,
			non_null: false,
		}
	}

	/// Parameter initializing `field`.
	pub fn for_field(ty: Type, field: &str) -> Self {
		Self {
			ty,
			field: Some(Arc::from(field)),
			non_null: false,
		}
	}

	/// Mark the parameter as rejecting `null`.
	pub fn non_null(mut self) -> Self {
		self.non_null = true;
		self
	}
}

/// One declared constructor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstructorInfo {
	/// Constructor access level.
	#[serde(default)]
	pub visibility: Visibility,
	/// Parameters in order.
	#[serde(default)]
	pub params: Vec<ParamInfo>,
}

impl ConstructorInfo {
	/// Public constructor with `params`.
	pub fn new(params: Vec<ParamInfo>) -> Self {
		Self {
			visibility: Visibility::Public,
			params,
		}
	}
}

/// One declared single-argument setter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetterInfo {
	/// Method name.
	pub name: Arc<str>,
	/// Field the setter writes.
	pub field: Arc<str>,
	/// Declared parameter type.
	#[serde(rename = "type")]
	pub ty: Type,
	/// Method access level.
	#[serde(default)]
	pub visibility: Visibility,
}

impl SetterInfo {
	/// Public `setField(ty)` writing `field`.
	pub fn new(field: &str, ty: Type) -> Self {
		let mut chars = field.chars();
		let capitalized: String = chars.next().map(|first| first.to_uppercase().chain(chars).collect()).unwrap_or_default();
		Self {
			name: Arc::from(format!("set{capitalized}")),
			field: Arc::from(field),
			ty,
			visibility: Visibility::Public,
		}
	}

	/// Set access level.
	pub fn visibility(mut self, visibility: Visibility) -> Self {
		self.visibility = visibility;
		self
	}
}

/// Runtime class description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassInfo {
	/// Binary class name.
	pub name: Arc<str>,
	/// Structural kind.
	#[serde(default)]
	pub kind: ClassKind,
	/// Access level.
	#[serde(default)]
	pub visibility: Visibility,
	/// Anonymous or local class.
	#[serde(default)]
	pub anonymous: bool,
	/// Compiler-generated class.
	#[serde(default)]
	pub synthetic: bool,
	/// Single-method interface usable as lambda target.
	#[serde(default)]
	pub functional: bool,
	/// Never captured.
	#[serde(default)]
	pub excluded: bool,
	/// Capture behavior of instances.
	#[serde(default)]
	pub category: ClassCategory,
	/// Direct superclass with type arguments.
	#[serde(default)]
	pub superclass: Option<Type>,
	/// Directly implemented interfaces with type arguments.
	#[serde(default)]
	pub interfaces: Vec<Type>,
	/// Declared type parameter names.
	#[serde(default)]
	pub type_params: Vec<Arc<str>>,
	/// Declared fields in declaration order.
	#[serde(default)]
	pub fields: Vec<FieldInfo>,
	/// Declared constructors.
	#[serde(default)]
	pub constructors: Vec<ConstructorInfo>,
	/// Enum constant names in ordinal order.
	#[serde(default)]
	pub enum_constants: Vec<Arc<str>>,
	/// Declared setters.
	#[serde(default)]
	pub setters: Vec<SetterInfo>,
}

impl ClassInfo {
	/// Public concrete class extending `Object`.
	pub fn new(name: &str) -> Self {
		Self {
			name: Arc::from(name),
			kind: ClassKind::Class,
			visibility: Visibility::Public,
			anonymous: false,
			synthetic: false,
			functional: false,
			excluded: false,
			category: ClassCategory::Plain,
			superclass: None,
			interfaces: Vec::new(),
			type_params: Vec::new(),
			fields: Vec::new(),
			constructors: Vec::new(),
			enum_constants: Vec::new(),
			setters: Vec::new(),
		}
	}

	/// Public interface.
	pub fn interface(name: &str) -> Self {
		Self::new(name).kind(ClassKind::Interface)
	}

	/// Set structural kind.
	pub fn kind(mut self, kind: ClassKind) -> Self {
		self.kind = kind;
		self
	}

	/// Set access level.
	pub fn visibility(mut self, visibility: Visibility) -> Self {
		self.visibility = visibility;
		self
	}

	/// Set capture category.
	pub fn category(mut self, category: ClassCategory) -> Self {
		self.category = category;
		self
	}

	/// Set superclass.
	pub fn extends(mut self, superclass: Type) -> Self {
		self.superclass = Some(superclass);
		self
	}

	/// Add an implemented interface.
	pub fn implements(mut self, interface: Type) -> Self {
		self.interfaces.push(interface);
		self
	}

	/// Set type parameter names.
	pub fn type_params(mut self, names: &[&str]) -> Self {
		self.type_params = names.iter().map(|item| Arc::from(*item)).collect();
		self
	}

	/// Add a field.
	pub fn field(mut self, field: FieldInfo) -> Self {
		self.fields.push(field);
		self
	}

	/// Add a constructor.
	pub fn constructor(mut self, constructor: ConstructorInfo) -> Self {
		self.constructors.push(constructor);
		self
	}

	/// Add a setter.
	pub fn setter(mut self, setter: SetterInfo) -> Self {
		self.setters.push(setter);
		self
	}

	/// Add a public no-argument constructor.
	pub fn default_constructor(self) -> Self {
		self.constructor(ConstructorInfo::new(Vec::new()))
	}

	/// Mark as enum with `constants`.
	pub fn enum_constants(mut self, constants: &[&str]) -> Self {
		self.kind = ClassKind::Enum;
		self.enum_constants = constants.iter().map(|item| Arc::from(*item)).collect();
		self
	}

	/// Mark as anonymous.
	pub fn anonymous(mut self) -> Self {
		self.anonymous = true;
		self
	}

	/// Mark as functional interface.
	pub fn functional(mut self) -> Self {
		self.functional = true;
		self
	}

	/// Whether instances may exist without a concrete subclass.
	pub fn is_instantiable(&self) -> bool {
		matches!(self.kind, ClassKind::Class)
	}

	/// Whether this is an interface.
	pub fn is_interface(&self) -> bool {
		matches!(self.kind, ClassKind::Interface)
	}

	/// Raw type of this class.
	pub fn raw_type(&self) -> Type {
		Type::Class(self.name.clone())
	}

	/// Package part of the binary name.
	pub fn package(&self) -> &str {
		package_of(&self.name)
	}

	/// Look up a declared field by name.
	pub fn declared_field(&self, name: &str) -> Option<&FieldInfo> {
		self.fields.iter().find(|item| item.name.as_ref() == name)
	}
}

/// Package part of a binary class name.
pub fn package_of(name: &str) -> &str {
	name.rfind('.').map(|idx| &name[..idx]).unwrap_or("")
}

/// Simple name of a binary class name (`a.B$C` -> `C`).
pub fn simple_name_of(name: &str) -> &str {
	let start = name.rfind(['.', '$']).map(|idx| idx + 1).unwrap_or(0);
	&name[start..]
}

/// Enclosing class of a nested binary name.
pub fn enclosing_of(name: &str) -> Option<&str> {
	let dollar = name.rfind('$')?;
	if dollar <= package_of(name).len() {
		return None;
	}
	Some(&name[..dollar])
}
