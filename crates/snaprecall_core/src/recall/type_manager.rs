use std::collections::HashMap;
use std::sync::Arc;

use crate::recall::classes::{package_of, simple_name_of};
use crate::recall::templates::{CLASS, CLAZZ, WRAPPED};
use crate::recall::{RecallError, Result, Type, TypeUniverse};

/// Tracks names and imports of one generated compilation unit.
///
/// Every rendering call registers what it mentions, so [`TypeManager::imports`] always
/// covers the produced text. Simple names are claimed first come first served; later
/// classes with a clashing simple name render fully qualified.
#[derive(Debug, Clone)]
pub struct TypeManager {
	package: String,
	universe: Arc<TypeUniverse>,
	imports: Vec<String>,
	static_imports: Vec<String>,
	claimed: HashMap<String, String>,
}

impl TypeManager {
	/// Manager for code living in `package`.
	pub fn new(package: &str, universe: Arc<TypeUniverse>) -> Self {
		Self {
			package: package.to_owned(),
			universe,
			imports: Vec::new(),
			static_imports: Vec::new(),
			claimed: HashMap::new(),
		}
	}

	/// Package of the generated code.
	pub fn package(&self) -> &str {
		&self.package
	}

	/// Class table in use.
	pub fn universe(&self) -> &TypeUniverse {
		&self.universe
	}

	/// Register every class `ty` mentions.
	pub fn register_type(&mut self, ty: &Type) {
		match ty {
			Type::Class(name) => {
				self.register_import(name);
			}
			Type::Parameterized { raw, args } => {
				self.register_import(raw);
				self.register_types(args);
			}
			Type::Array(component) => self.register_type(component),
			Type::Wildcard { upper, lower } => {
				self.register_types(upper);
				self.register_types(lower);
			}
			Type::Primitive(_) | Type::Variable(_) => {}
		}
	}

	/// Register every class the given types mention.
	pub fn register_types<'t>(&mut self, types: impl IntoIterator<Item = &'t Type>) {
		for ty in types {
			self.register_type(ty);
		}
	}

	/// Claim the simple name of a class, importing it when needed.
	///
	/// Returns whether the class may be referenced by its (nested) simple name.
	pub fn register_import(&mut self, binary: &str) -> bool {
		let top = top_level(binary);
		let simple = simple_name_of(top);
		match self.claimed.get(simple) {
			Some(owner) => owner == top,
			None => {
				self.claimed.insert(simple.to_owned(), top.to_owned());
				let package = package_of(top);
				if !package.is_empty() && package != "java.lang" && package != self.package {
					self.imports.push(top.to_owned());
				}
				true
			}
		}
	}

	/// Add a static import of `member` (`pkg.Class.member`).
	pub fn static_import(&mut self, member: &str) {
		if !self.static_imports.iter().any(|item| item == member) {
			self.static_imports.push(member.to_owned());
		}
	}

	/// Static-import `member` and return its bare name.
	pub fn static_member(&mut self, member: &str) -> String {
		self.static_import(member);
		member.rsplit('.').next().unwrap_or(member).to_owned()
	}

	/// Type imports in registration order.
	pub fn imports(&self) -> &[String] {
		&self.imports
	}

	/// Static imports in registration order.
	pub fn static_imports(&self) -> &[String] {
		&self.static_imports
	}

	/// Whether generated code cannot spell `ty`.
	pub fn is_hidden(&self, ty: &Type) -> bool {
		!self.universe.is_type_visible(ty, &self.package)
	}

	/// Unqualified simple name of the class behind `ty`, without registering it.
	pub fn simple_name(&self, ty: &Type) -> String {
		match ty.array_base() {
			Type::Primitive(primitive) => primitive.name().to_owned(),
			base => base.base_name().map(simple_name_of).unwrap_or("Object").to_owned(),
		}
	}

	/// Source name of a class by binary name: nested simple name when claimable,
	/// fully qualified otherwise.
	pub fn raw_name(&mut self, binary: &str) -> String {
		if self.register_import(binary) {
			let top = top_level(binary);
			let package = package_of(top);
			let start = if package.is_empty() { 0 } else { package.len() + 1 };
			binary[start..].replace('$', ".")
		} else {
			binary.replace('$', ".")
		}
	}

	/// Erased source name, arrays included.
	pub fn raw_type_name(&mut self, ty: &Type) -> String {
		match ty.erasure() {
			Type::Primitive(primitive) => primitive.name().to_owned(),
			Type::Array(component) => format!("{}[]", self.raw_type_name(&component)),
			Type::Class(name) => self.raw_name(&name),
			_ => self.raw_name(crate::recall::ty::OBJECT),
		}
	}

	/// Declaration-site rendering; raw generic classes get `?` arguments.
	pub fn variable_type_name(&mut self, ty: &Type) -> Result<String> {
		if self.is_hidden(ty) {
			let visible = self.universe.visible_supertype(ty, &self.package);
			if visible == *ty || self.is_hidden(&visible) {
				return Ok(self.raw_name(crate::recall::ty::OBJECT));
			}
			return self.variable_type_name(&visible);
		}
		match ty {
			Type::Primitive(primitive) => Ok(primitive.name().to_owned()),
			Type::Class(name) => {
				let arity = self.universe.class(name).map(|info| info.type_params.len()).unwrap_or(0);
				let raw = self.raw_name(name);
				if arity == 0 {
					Ok(raw)
				} else {
					Ok(format!("{raw}<{}>", vec!["?"; arity].join(", ")))
				}
			}
			Type::Parameterized { raw, args } => {
				let raw = self.raw_name(raw);
				let mut rendered = Vec::with_capacity(args.len());
				for arg in args {
					rendered.push(self.argument_name(arg)?);
				}
				Ok(format!("{raw}<{}>", rendered.join(", ")))
			}
			Type::Array(component) => Ok(format!("{}[]", self.variable_type_name(component)?)),
			Type::Wildcard { .. } | Type::Variable(_) => Err(RecallError::UnsupportedType { ty: ty.to_string() }),
		}
	}

	fn argument_name(&mut self, arg: &Type) -> Result<String> {
		match arg {
			Type::Variable(_) => Ok("?".to_owned()),
			Type::Wildcard { upper, lower } => {
				if let Some(bound) = upper.first().filter(|bound| !bound.is_object()) {
					Ok(format!("? extends {}", self.variable_type_name(bound)?))
				} else if let Some(bound) = lower.first() {
					Ok(format!("? super {}", self.variable_type_name(bound)?))
				} else {
					Ok("?".to_owned())
				}
			}
			other => self.variable_type_name(other),
		}
	}

	/// Construction-site rendering; generic classes get the diamond.
	pub fn constructor_type_name(&mut self, ty: &Type) -> Result<String> {
		if self.is_hidden(&ty.erasure()) {
			return Err(RecallError::UnsupportedType { ty: ty.to_string() });
		}
		match ty {
			Type::Class(name) | Type::Parameterized { raw: name, .. } => {
				let generic = self.universe.class(name).is_some_and(|info| !info.type_params.is_empty());
				let raw = self.raw_name(name);
				if generic || !ty.args().is_empty() { Ok(format!("{raw}<>")) } else { Ok(raw) }
			}
			_ => Err(RecallError::UnsupportedType { ty: ty.to_string() }),
		}
	}

	/// Class literal expression: `X.class`, a cast for closed generic types, or a
	/// by-name lookup for hidden classes.
	pub fn raw_class(&mut self, ty: &Type) -> String {
		let erased = ty.erasure();
		if self.is_hidden(&erased) {
			let clazz = self.static_member(CLAZZ);
			return format!("{clazz}(\"{}\")", erased);
		}
		let literal = format!("{}.class", self.raw_type_name(&erased));
		match ty {
			Type::Parameterized { .. } if !ty.is_open() => match self.variable_type_name(ty) {
				Ok(name) => {
					let class = self.raw_name(CLASS);
					format!("({class}<{name}>) ({class}) {literal}")
				}
				Err(_) => literal,
			},
			_ => literal,
		}
	}

	/// `Wrapped` for hidden types, the declaration-site name otherwise.
	pub fn wrap_hidden(&mut self, ty: &Type) -> Result<String> {
		if self.is_hidden(ty) {
			Ok(self.raw_name(WRAPPED))
		} else {
			self.variable_type_name(ty)
		}
	}

	/// The one type of `types` assignable to all others.
	pub fn most_special_of(&self, types: &[Type]) -> Option<Type> {
		types
			.iter()
			.find(|candidate| types.iter().all(|other| self.universe.is_assignable(candidate, other)))
			.cloned()
	}

	/// `preferred` when it can be spelled as is, else `bound`, else the nearest visible
	/// supertype of `bound`.
	pub fn best_type(&self, preferred: &Type, bound: &Type) -> Type {
		let spellable = |ty: &Type| !matches!(ty, Type::Wildcard { .. } | Type::Variable(_)) && !self.is_hidden(ty);
		if spellable(preferred) {
			preferred.clone()
		} else if spellable(bound) {
			bound.clone()
		} else {
			self.universe.visible_supertype(&bound.erasure(), &self.package)
		}
	}
}

/// Binary name of the top-level class enclosing `binary`.
fn top_level(binary: &str) -> &str {
	let package = package_of(binary);
	let start = if package.is_empty() { 0 } else { package.len() + 1 };
	match binary[start..].find('$') {
		Some(idx) => &binary[..start + idx],
		None => binary,
	}
}
