use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::recall::{RecallError, Result};

/// Binary name of the root class.
pub const OBJECT: &str = "java.lang.Object";
/// Binary name of the string class.
pub const STRING: &str = "java.lang.String";

/// Primitive value kinds of the observed runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
	/// `boolean`
	Boolean,
	/// `byte`
	Byte,
	/// `short`
	Short,
	/// `char`
	Char,
	/// `int`
	Int,
	/// `long`
	Long,
	/// `float`
	Float,
	/// `double`
	Double,
	/// `void`, only valid as a method result type.
	Void,
}

impl Primitive {
	pub(crate) const ALL: [Primitive; 9] = [
		Primitive::Boolean,
		Primitive::Byte,
		Primitive::Short,
		Primitive::Char,
		Primitive::Int,
		Primitive::Long,
		Primitive::Float,
		Primitive::Double,
		Primitive::Void,
	];

	/// Source keyword of this primitive.
	pub fn name(self) -> &'static str {
		match self {
			Self::Boolean => "boolean",
			Self::Byte => "byte",
			Self::Short => "short",
			Self::Char => "char",
			Self::Int => "int",
			Self::Long => "long",
			Self::Float => "float",
			Self::Double => "double",
			Self::Void => "void",
		}
	}

	/// Parse a primitive keyword.
	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|item| item.name() == name)
	}

	/// Binary name of the boxed counterpart.
	pub fn boxed(self) -> &'static str {
		match self {
			Self::Boolean => "java.lang.Boolean",
			Self::Byte => "java.lang.Byte",
			Self::Short => "java.lang.Short",
			Self::Char => "java.lang.Character",
			Self::Int => "java.lang.Integer",
			Self::Long => "java.lang.Long",
			Self::Float => "java.lang.Float",
			Self::Double => "java.lang.Double",
			Self::Void => "java.lang.Void",
		}
	}

	/// Primitive for a boxed binary name.
	pub fn unboxed(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|item| *item != Self::Void && item.boxed() == name)
	}
}

/// Static or runtime type of a value, in the observed program's type system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Type {
	/// Primitive type.
	Primitive(Primitive),
	/// Raw class or interface by binary name (`a.b.Outer$Inner`).
	Class(Arc<str>),
	/// Class applied to type arguments.
	Parameterized {
		/// Binary name of the generic class.
		raw: Arc<str>,
		/// Type arguments in declaration order.
		args: Vec<Type>,
	},
	/// Array of a component type.
	Array(Box<Type>),
	/// Wildcard type argument.
	Wildcard {
		/// Upper bounds (`? extends`).
		upper: Vec<Type>,
		/// Lower bounds (`? super`).
		lower: Vec<Type>,
	},
	/// Unresolved type variable.
	Variable(Arc<str>),
}

impl Type {
	/// Raw class type.
	pub fn class(name: &str) -> Self {
		Self::Class(Arc::from(name))
	}

	/// Root object type.
	pub fn object() -> Self {
		Self::class(OBJECT)
	}

	/// String type.
	pub fn string() -> Self {
		Self::class(STRING)
	}

	/// Parameterized class type.
	pub fn parameterized(raw: &str, args: Vec<Type>) -> Self {
		Self::Parameterized { raw: Arc::from(raw), args }
	}

	/// Array type of `component`.
	pub fn array(component: Type) -> Self {
		Self::Array(Box::new(component))
	}

	/// Unbounded wildcard `?`.
	pub fn wildcard() -> Self {
		Self::Wildcard {
			upper: Vec::new(),
			lower: Vec::new(),
		}
	}

	/// Upper bounded wildcard `? extends bound`.
	pub fn extends(bound: Type) -> Self {
		Self::Wildcard {
			upper: vec![bound],
			lower: Vec::new(),
		}
	}

	/// Lower bounded wildcard `? super bound`.
	pub fn super_of(bound: Type) -> Self {
		Self::Wildcard {
			upper: Vec::new(),
			lower: vec![bound],
		}
	}

	/// Type variable.
	pub fn variable(name: &str) -> Self {
		Self::Variable(Arc::from(name))
	}

	/// Parse a source-style type signature.
	///
	/// Accepts binary class names (`java.util.Map$Entry`), primitives, `[]` suffixes,
	/// type arguments and wildcards. A bare identifier without a package is a type variable.
	pub fn parse(input: &str) -> Result<Self> {
		let mut parser = SignatureParser { input, at: 0 };
		parser.skip_ws();
		let ty = parser.parse_type()?;
		parser.skip_ws();
		if parser.at != input.len() {
			return Err(parser.error());
		}
		Ok(ty)
	}

	/// Binary name of the class this type is based on, if any.
	pub fn base_name(&self) -> Option<&str> {
		match self {
			Self::Class(name) => Some(name.as_ref()),
			Self::Parameterized { raw, .. } => Some(raw.as_ref()),
			_ => None,
		}
	}

	/// Type arguments, empty for non-parameterized types.
	pub fn args(&self) -> &[Type] {
		match self {
			Self::Parameterized { args, .. } => args,
			_ => &[],
		}
	}

	/// Component type of an array.
	pub fn component(&self) -> Option<&Type> {
		match self {
			Self::Array(component) => Some(component),
			_ => None,
		}
	}

	/// Innermost component of a possibly nested array type.
	pub fn array_base(&self) -> &Type {
		let mut current = self;
		while let Self::Array(component) = current {
			current = component;
		}
		current
	}

	/// Number of array dimensions.
	pub fn dimensions(&self) -> usize {
		let mut count = 0;
		let mut current = self;
		while let Self::Array(component) = current {
			count += 1;
			current = component;
		}
		count
	}

	/// Whether this is a primitive type.
	pub fn is_primitive(&self) -> bool {
		matches!(self, Self::Primitive(_))
	}

	/// Whether this is the root object type.
	pub fn is_object(&self) -> bool {
		matches!(self, Self::Class(name) if name.as_ref() == OBJECT)
	}

	/// Whether this is an array type.
	pub fn is_array(&self) -> bool {
		matches!(self, Self::Array(_))
	}

	/// Whether this type still mentions a wildcard or type variable.
	pub fn is_open(&self) -> bool {
		match self {
			Self::Wildcard { .. } | Self::Variable(_) => true,
			Self::Parameterized { args, .. } => args.iter().any(Type::is_open),
			Self::Array(component) => component.is_open(),
			_ => false,
		}
	}

	/// Erase type arguments, wildcards and variables.
	pub fn erasure(&self) -> Type {
		match self {
			Self::Parameterized { raw, .. } => Self::Class(raw.clone()),
			Self::Array(component) => Self::array(component.erasure()),
			Self::Wildcard { upper, .. } => upper.first().map(Type::erasure).unwrap_or_else(Type::object),
			Self::Variable(_) => Self::object(),
			other => other.clone(),
		}
	}

	/// Boxed class for primitives, the type itself otherwise.
	pub fn boxed(&self) -> Type {
		match self {
			Self::Primitive(primitive) => Self::class(primitive.boxed()),
			other => other.clone(),
		}
	}
}

impl fmt::Display for Type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Primitive(primitive) => f.write_str(primitive.name()),
			Self::Class(name) => f.write_str(name),
			Self::Parameterized { raw, args } => {
				f.write_str(raw)?;
				f.write_str("<")?;
				for (idx, arg) in args.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{arg}")?;
				}
				f.write_str(">")
			}
			Self::Array(component) => write!(f, "{component}[]"),
			Self::Wildcard { upper, lower } => {
				f.write_str("?")?;
				if let Some(bound) = upper.first() {
					write!(f, " extends {bound}")?;
				} else if let Some(bound) = lower.first() {
					write!(f, " super {bound}")?;
				}
				Ok(())
			}
			Self::Variable(name) => f.write_str(name),
		}
	}
}

impl From<Type> for String {
	fn from(value: Type) -> Self {
		value.to_string()
	}
}

impl TryFrom<String> for Type {
	type Error = RecallError;

	fn try_from(value: String) -> Result<Self> {
		Type::parse(&value)
	}
}

struct SignatureParser<'a> {
	input: &'a str,
	at: usize,
}

impl<'a> SignatureParser<'a> {
	fn parse_type(&mut self) -> Result<Type> {
		let mut ty = self.parse_primary()?;
		loop {
			self.skip_ws();
			if self.input[self.at..].starts_with("[]") {
				self.at += 2;
				ty = Type::array(ty);
			} else {
				return Ok(ty);
			}
		}
	}

	fn parse_primary(&mut self) -> Result<Type> {
		self.skip_ws();
		if self.eat(b'?') {
			self.skip_ws();
			if self.eat_keyword("extends") {
				let bound = self.parse_type()?;
				return Ok(Type::extends(bound));
			}
			if self.eat_keyword("super") {
				let bound = self.parse_type()?;
				return Ok(Type::super_of(bound));
			}
			return Ok(Type::wildcard());
		}

		let name = self.parse_name()?;
		if let Some(primitive) = Primitive::from_name(name) {
			return Ok(Type::Primitive(primitive));
		}

		self.skip_ws();
		if self.eat(b'<') {
			let mut args = Vec::new();
			loop {
				args.push(self.parse_type()?);
				self.skip_ws();
				if self.eat(b',') {
					continue;
				}
				if self.eat(b'>') {
					break;
				}
				return Err(self.error());
			}
			return Ok(Type::parameterized(name, args));
		}

		if name.contains('.') {
			Ok(Type::class(name))
		} else {
			Ok(Type::variable(name))
		}
	}

	fn parse_name(&mut self) -> Result<&'a str> {
		let input: &'a str = self.input;
		let bytes = input.as_bytes();
		let start = self.at;
		let mut expect_ident = true;
		while self.at < bytes.len() {
			let byte = bytes[self.at];
			if byte.is_ascii_alphanumeric() || byte == b'_' {
				expect_ident = false;
				self.at += 1;
			} else if (byte == b'.' || byte == b'$') && !expect_ident {
				expect_ident = true;
				self.at += 1;
			} else {
				break;
			}
		}
		if self.at == start || expect_ident {
			return Err(self.error());
		}
		Ok(&input[start..self.at])
	}

	fn eat(&mut self, byte: u8) -> bool {
		if self.input.as_bytes().get(self.at) == Some(&byte) {
			self.at += 1;
			true
		} else {
			false
		}
	}

	fn eat_keyword(&mut self, keyword: &str) -> bool {
		let rest = &self.input[self.at..];
		let boundary = rest.as_bytes().get(keyword.len()).is_some_and(|byte| byte.is_ascii_whitespace());
		if rest.starts_with(keyword) && boundary {
			self.at += keyword.len();
			true
		} else {
			false
		}
	}

	fn skip_ws(&mut self) {
		let bytes = self.input.as_bytes();
		while self.at < bytes.len() && bytes[self.at].is_ascii_whitespace() {
			self.at += 1;
		}
	}

	fn error(&self) -> RecallError {
		RecallError::InvalidTypeSignature {
			input: self.input.to_owned(),
			at: self.at,
		}
	}
}

#[cfg(test)]
mod tests;
