use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::recall::builtins::builtin_classes;
use crate::recall::classes::{enclosing_of, package_of};
use crate::recall::ty::OBJECT;
use crate::recall::{ClassCategory, ClassInfo, FieldInfo, RecallError, Result, SetterInfo, Type, Visibility};

/// Binary name of the clone marker interface.
pub const CLONEABLE: &str = "java.lang.Cloneable";
/// Binary name of the serialization marker interface.
pub const SERIALIZABLE: &str = "java.io.Serializable";

/// Capability interfaces that never make a useful common supertype.
const MARKER_INTERFACES: [&str; 4] = [CLONEABLE, SERIALIZABLE, "java.util.RandomAccess", "java.lang.Comparable"];

/// Table of runtime classes a heap refers to.
#[derive(Debug, Clone)]
pub struct TypeUniverse {
	classes: HashMap<Arc<str>, ClassInfo>,
}

impl Default for TypeUniverse {
	fn default() -> Self {
		Self::builtin()
	}
}

impl TypeUniverse {
	/// Universe without any class.
	pub fn empty() -> Self {
		Self { classes: HashMap::new() }
	}

	/// Universe preloaded with the standard library classes generated code relies on.
	pub fn builtin() -> Self {
		let mut out = Self::empty();
		out.extend(builtin_classes());
		out
	}

	/// Add or replace one class.
	pub fn insert(&mut self, info: ClassInfo) {
		self.classes.insert(info.name.clone(), info);
	}

	/// Add or replace many classes.
	pub fn extend(&mut self, infos: impl IntoIterator<Item = ClassInfo>) {
		for info in infos {
			self.insert(info);
		}
	}

	/// Number of known classes.
	pub fn len(&self) -> usize {
		self.classes.len()
	}

	/// Whether the universe knows no class.
	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}

	/// Look up a class by binary name.
	pub fn class(&self, name: &str) -> Option<&ClassInfo> {
		self.classes.get(name)
	}

	/// Look up a class by binary name, failing for unknown names.
	pub fn require(&self, name: &str) -> Result<&ClassInfo> {
		self.class(name).ok_or_else(|| RecallError::UnknownClass { name: name.to_owned() })
	}

	/// Class a type is based on.
	pub fn class_of(&self, ty: &Type) -> Option<&ClassInfo> {
		ty.base_name().and_then(|name| self.class(name))
	}

	/// Direct supertypes with type arguments substituted.
	///
	/// Raw uses of generic classes yield erased supertypes.
	pub fn supertypes(&self, ty: &Type) -> Vec<Type> {
		match ty {
			Type::Class(name) | Type::Parameterized { raw: name, .. } => {
				if name.as_ref() == OBJECT {
					return Vec::new();
				}
				let Some(info) = self.class(name) else {
					return vec![Type::object()];
				};
				let args = ty.args();
				let erase = !info.type_params.is_empty() && args.len() != info.type_params.len();
				let resolve = |sup: &Type| {
					if erase {
						sup.erasure()
					} else {
						substitute(sup, &info.type_params, args)
					}
				};

				let mut out = Vec::new();
				match &info.superclass {
					Some(sup) => out.push(resolve(sup)),
					None if !info.is_interface() => out.push(Type::object()),
					None => {}
				}
				out.extend(info.interfaces.iter().map(resolve));
				if out.is_empty() {
					out.push(Type::object());
				}
				out
			}
			Type::Array(_) => vec![Type::object(), Type::class(CLONEABLE), Type::class(SERIALIZABLE)],
			Type::Wildcard { .. } | Type::Variable(_) => vec![ty.erasure()],
			Type::Primitive(_) => Vec::new(),
		}
	}

	/// `ty` followed by all its transitive supertypes, breadth first, each class once.
	pub fn ancestry(&self, ty: &Type) -> Vec<Type> {
		let mut out = Vec::new();
		let mut seen = HashSet::new();
		let mut queue = VecDeque::from([ty.clone()]);
		while let Some(current) = queue.pop_front() {
			if !seen.insert(current.erasure()) {
				continue;
			}
			queue.extend(self.supertypes(&current));
			out.push(current);
		}
		out
	}

	/// View `ty` as a parameterization of the supertype `raw`.
	pub fn as_super(&self, ty: &Type, raw: &str) -> Option<Type> {
		if ty.is_array() || ty.is_primitive() {
			return None;
		}
		self.ancestry(ty).into_iter().find(|item| item.base_name() == Some(raw))
	}

	/// Type argument `index` of `ty` viewed as `raw`.
	pub fn type_argument(&self, ty: &Type, raw: &str, index: usize) -> Option<Type> {
		self.as_super(ty, raw).and_then(|view| view.args().get(index).cloned())
	}

	/// Whether class `sub` is `sup` or one of its subclasses.
	pub fn is_subclass(&self, sub: &str, sup: &str) -> bool {
		if sub == sup || sup == OBJECT {
			return true;
		}
		self.ancestry(&Type::class(sub)).iter().any(|item| item.base_name() == Some(sup))
	}

	/// Whether a value of type `from` can be stored in a location of type `to`.
	///
	/// Type arguments are invariant unless the target argument is a wildcard or variable.
	pub fn is_assignable(&self, from: &Type, to: &Type) -> bool {
		match (from, to) {
			(Type::Primitive(left), Type::Primitive(right)) => left == right,
			(Type::Primitive(primitive), _) => self.is_assignable(&Type::class(primitive.boxed()), to),
			(_, Type::Primitive(primitive)) => from.base_name() == Some(primitive.boxed()),
			(_, Type::Wildcard { .. } | Type::Variable(_)) => self.is_assignable(from, &to.erasure()),
			(_, target) if target.is_object() => true,
			(Type::Wildcard { .. } | Type::Variable(_), _) => self.is_assignable(&from.erasure(), to),
			(Type::Array(left), Type::Array(right)) => {
				if left.is_primitive() || right.is_primitive() {
					left == right
				} else {
					self.is_assignable(left, right)
				}
			}
			(Type::Array(_), Type::Class(name)) => name.as_ref() == CLONEABLE || name.as_ref() == SERIALIZABLE,
			(Type::Array(_), _) | (_, Type::Array(_)) => false,
			(_, Type::Class(raw)) => from.base_name().is_some_and(|name| self.is_subclass(name, raw)),
			(_, Type::Parameterized { raw, args }) => {
				let Some(view) = self.as_super(from, raw) else {
					return false;
				};
				let actual = view.args();
				if actual.is_empty() {
					return true;
				}
				actual.len() == args.len() && args.iter().zip(actual).all(|(target, arg)| self.contains(target, arg))
			}
		}
	}

	fn contains(&self, target: &Type, actual: &Type) -> bool {
		match target {
			Type::Wildcard { upper, lower } => {
				upper.iter().all(|bound| self.is_assignable(actual, bound)) && lower.iter().all(|bound| self.is_assignable(bound, actual))
			}
			Type::Variable(_) => true,
			_ => matches!(actual, Type::Variable(_)) || target == actual,
		}
	}

	/// Narrowest erased type every one of `types` is assignable to.
	///
	/// Classes win over interfaces; an interface is only chosen when it is the single
	/// candidate left. Falls back to `Object`.
	pub fn common_supertype(&self, types: &[Type]) -> Type {
		let types: Vec<Type> = types.iter().map(|item| item.boxed().erasure()).collect();
		let Some((first, rest)) = types.split_first() else {
			return Type::object();
		};
		if rest.iter().all(|item| item == first) {
			return first.clone();
		}

		if types.iter().all(Type::is_array) {
			let components: Vec<Type> = types.iter().filter_map(|item| item.component().cloned()).collect();
			if components.iter().any(Type::is_primitive) {
				return Type::object();
			}
			return Type::array(self.common_supertype(&components));
		}
		if types.iter().any(|item| item.base_name().is_none()) {
			return Type::object();
		}

		let candidates: Vec<Type> = self
			.ancestry(first)
			.into_iter()
			.map(|item| item.erasure())
			.filter(|item| !item.is_object())
			.filter(|item| item.base_name().is_some_and(|name| !MARKER_INTERFACES.contains(&name)))
			.filter(|item| self.all_subclasses(&types, item))
			.collect();
		let minimal: Vec<&Type> = candidates
			.iter()
			.filter(|item| {
				!candidates
					.iter()
					.any(|other| other != *item && self.all_subclasses(std::slice::from_ref(other), item))
			})
			.collect();

		if let Some(class) = minimal.iter().find(|item| self.class_of(item).is_none_or(|info| !info.is_interface())) {
			return (*class).clone();
		}
		match minimal.as_slice() {
			[single] => (*single).clone(),
			_ => Type::object(),
		}
	}

	fn all_subclasses(&self, types: &[Type], sup: &Type) -> bool {
		let Some(sup) = sup.base_name() else {
			return false;
		};
		types.iter().all(|item| item.base_name().is_some_and(|name| self.is_subclass(name, sup)))
	}

	/// Whether code in `package` can name the class.
	///
	/// Private, anonymous, synthetic and foreign package-private classes are not nameable,
	/// nor is anything nested in such a class. Unknown classes are nameable unless their
	/// binary name marks them as generated.
	pub fn is_class_visible(&self, name: &str, package: &str) -> bool {
		let Some(info) = self.class(name) else {
			return !looks_generated(name);
		};
		if info.anonymous || info.synthetic {
			return false;
		}
		let accessible = match info.visibility {
			Visibility::Public => true,
			Visibility::Protected | Visibility::Package => info.package() == package,
			Visibility::Private => false,
		};
		accessible && enclosing_of(name).is_none_or(|outer| self.is_class_visible(outer, package))
	}

	/// Whether code in `package` can spell `ty`.
	pub fn is_type_visible(&self, ty: &Type, package: &str) -> bool {
		match ty {
			Type::Primitive(_) | Type::Variable(_) => true,
			Type::Class(name) => self.is_class_visible(name, package),
			Type::Parameterized { raw, args } => self.is_class_visible(raw, package) && args.iter().all(|item| self.is_type_visible(item, package)),
			Type::Array(component) => self.is_type_visible(component, package),
			Type::Wildcard { upper, lower } => upper.iter().chain(lower).all(|item| self.is_type_visible(item, package)),
		}
	}

	/// Nearest supertype of `ty` that code in `package` can spell.
	pub fn visible_supertype(&self, ty: &Type, package: &str) -> Type {
		match ty {
			Type::Array(component) => Type::array(self.visible_supertype(component, package)),
			Type::Primitive(_) => ty.clone(),
			_ if self.is_type_visible(ty, package) => ty.clone(),
			_ => self
				.ancestry(ty)
				.into_iter()
				.find(|item| !item.is_object() && self.is_type_visible(item, package))
				.unwrap_or_else(Type::object),
		}
	}

	/// Primitive, boxed primitive or string.
	pub fn is_literal_type(&self, ty: &Type) -> bool {
		ty.is_primitive() || self.class_of(ty).is_some_and(|info| info.category == ClassCategory::Literal)
	}

	/// Opaque value class captured through its textual form.
	pub fn is_immutable_type(&self, ty: &Type) -> bool {
		self.class_of(ty).is_some_and(|info| info.category == ClassCategory::Immutable)
	}

	/// Collection category (`List`, `Set`, `Map`) of a type or one of its supertypes.
	pub fn collection_kind(&self, ty: &Type) -> Option<ClassCategory> {
		if ty.is_array() || ty.is_primitive() {
			return None;
		}
		self.ancestry(ty).iter().find_map(|item| {
			self.class_of(item)
				.map(|info| info.category)
				.filter(|category| matches!(category, ClassCategory::List | ClassCategory::Set | ClassCategory::Map))
		})
	}

	/// Instance fields of a class and its superclasses, root class first, each with its declaring class.
	pub fn instance_fields(&self, name: &str) -> Vec<(&ClassInfo, &FieldInfo)> {
		let mut chain = Vec::new();
		let mut current = self.class(name);
		while let Some(info) = current {
			chain.push(info);
			current = info.superclass.as_ref().and_then(|sup| self.class_of(sup));
		}
		chain
			.into_iter()
			.rev()
			.flat_map(|info| info.fields.iter().filter(|field| !field.is_static).map(move |field| (info, field)))
			.collect()
	}

	/// Setters of a class and its superclasses, nearest declaration first.
	pub fn setters(&self, name: &str) -> Vec<(&ClassInfo, &SetterInfo)> {
		let mut out = Vec::new();
		let mut current = self.class(name);
		while let Some(info) = current {
			out.extend(info.setters.iter().map(|setter| (info, setter)));
			current = info.superclass.as_ref().and_then(|sup| self.class_of(sup));
		}
		out
	}

	/// Resolve a field declared on `class` or one of its superclasses.
	pub fn field(&self, class: &str, field: &str) -> Result<(&ClassInfo, &FieldInfo)> {
		let mut current = Some(self.require(class)?);
		while let Some(info) = current {
			if let Some(found) = info.declared_field(field) {
				return Ok((info, found));
			}
			current = info.superclass.as_ref().and_then(|sup| self.class_of(sup));
		}
		Err(RecallError::UnknownField {
			class: class.to_owned(),
			field: field.to_owned(),
		})
	}
}

/// Replace type variables named in `params` by the matching `args`.
pub fn substitute(ty: &Type, params: &[Arc<str>], args: &[Type]) -> Type {
	match ty {
		Type::Variable(name) => params
			.iter()
			.position(|param| param == name)
			.and_then(|idx| args.get(idx))
			.cloned()
			.unwrap_or_else(|| ty.clone()),
		Type::Parameterized { raw, args: inner } => Type::Parameterized {
			raw: raw.clone(),
			args: inner.iter().map(|item| substitute(item, params, args)).collect(),
		},
		Type::Array(component) => Type::array(substitute(component, params, args)),
		Type::Wildcard { upper, lower } => Type::Wildcard {
			upper: upper.iter().map(|item| substitute(item, params, args)).collect(),
			lower: lower.iter().map(|item| substitute(item, params, args)).collect(),
		},
		other => other.clone(),
	}
}

/// Anonymous (`Outer$1`) and generated (`Foo$$Lambda`) binary names.
fn looks_generated(name: &str) -> bool {
	let simple = &name[package_of(name).len()..];
	simple.contains("$$")
		|| simple
			.split('$')
			.skip(1)
			.any(|part| part.as_bytes().first().is_some_and(u8::is_ascii_digit))
}

#[cfg(test)]
mod tests;
