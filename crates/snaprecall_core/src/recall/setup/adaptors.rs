use sha2::{Digest, Sha256};

use super::{Setup, SetupGenerator, construction};
use crate::recall::templates::{self, ARRAYS, CLASS, COLLECTIONS, FILE_SERIALIZER, GENERIC_OBJECT};
use crate::recall::{
	Adaptor, Annotation, Computation, Generator, Literal, RecallError, Result, SerializedField, SerializedValue, Type, TypeUniverse, ValueId,
	ValueKind, Visibility,
};

fn unexpected(generator: &SetupGenerator<'_>, id: ValueId, expected: ValueKind) -> RecallError {
	RecallError::failed(format!("{} is not a {} value", generator.graph().describe(id), expected.as_str()))
}

/// Visit the value of `field`, handing the field's hints to it first.
pub(super) fn visit_field(generator: &mut SetupGenerator<'_>, field: &SerializedField) -> Result<Computation> {
	generator.context_mut().add_hints(field.value, &field.hints);
	generator.visit(field.value)
}

/// Visit `ids` in order; their statements go to `statements`, their expressions are returned.
fn visit_all(generator: &mut SetupGenerator<'_>, ids: &[ValueId], statements: &mut Vec<String>) -> Result<Vec<String>> {
	let mut values = Vec::with_capacity(ids.len());
	for id in ids {
		let mut child = generator.visit(*id)?;
		statements.extend(child.take_statements());
		values.push(child.value);
	}
	Ok(values)
}

/// Statement storing `value` into `field` of the object bound to `target`.
pub(super) fn assign_field(generator: &mut SetupGenerator<'_>, target: &str, hidden: bool, field: &SerializedField, value: &str) -> String {
	let name = templates::string_literal(&field.name);
	if hidden {
		return templates::statement(&templates::call(target, "setField", &[name, value.to_owned()]));
	}
	let universe = generator.universe();
	let types = generator.context_mut().types_mut();
	let direct = field
		.declaring
		.base_name()
		.and_then(|declaring| universe.field(declaring, &field.name).ok())
		.is_some_and(|(info, declared)| declared.visibility == Visibility::Public && !declared.is_final && !types.is_hidden(&info.raw_type()));
	if direct {
		return templates::assign_field(target, &field.name, value);
	}
	let generic_object = types.raw_name(GENERIC_OBJECT);
	templates::statement(&templates::call(&generic_object, "setField", &[target.to_owned(), name, value.to_owned()]))
}

/// Declare the local for `id` unless a placeholder already exists, then append `population`.
fn finish_local(generator: &mut SetupGenerator<'_>, id: ValueId, mut statements: Vec<String>, population: Vec<String>) -> Result<Computation> {
	let name = generator.local_name(id)?;
	let mut expression = name.clone();
	if !generator.is_forwarded(id) {
		let (declaration, allocated) = generator.allocation(id, &name)?;
		statements.push(declaration);
		expression = allocated;
	} else if let Some(local) = generator.context().local(id) {
		expression = local.expression.clone();
	}
	statements.extend(population);
	let ty = generator.graph().get(id)?.ty.clone();
	Ok(Computation::stored(expression, Some(ty)).with_statements(statements))
}

fn ensure_not_forwarded(generator: &SetupGenerator<'_>, id: ValueId) -> Result<()> {
	if generator.is_forwarded(id) {
		return Err(RecallError::failed(format!(
			"{} is referenced by its own parts and cannot be built in one expression",
			generator.graph().describe(id)
		)));
	}
	Ok(())
}

/// `null`.
#[derive(Debug)]
pub(super) struct DefaultNullAdaptor;

impl Adaptor<Setup> for DefaultNullAdaptor {
	fn name(&self) -> &'static str {
		"null"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Null
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		Ok(Computation::expression("null", Some(node.ty.clone())))
	}
}

/// Inline source literal.
#[derive(Debug)]
pub(super) struct DefaultLiteralAdaptor;

impl Adaptor<Setup> for DefaultLiteralAdaptor {
	fn name(&self) -> &'static str {
		"literal"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Literal
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Literal { value: literal } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Literal));
		};
		Ok(Computation::expression(templates::literal(literal), Some(node.ty.clone())))
	}
}

/// `new T("repr")`.
#[derive(Debug)]
pub(super) struct DefaultImmutableAdaptor;

impl Adaptor<Setup> for DefaultImmutableAdaptor {
	fn name(&self) -> &'static str {
		"immutable"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Immutable
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Immutable { repr } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Immutable));
		};
		let types = generator.context_mut().types_mut();
		if types.is_hidden(&node.ty) {
			return Err(RecallError::UnsupportedType { ty: node.ty.to_string() });
		}
		let ty = types.raw_type_name(&node.ty);
		Ok(Computation::expression(
			templates::new_object(&ty, &[templates::string_literal(repr)]),
			Some(node.ty.clone()),
		))
	}
}

/// `BigInteger.valueOf(nL)` for values fitting a long.
#[derive(Debug)]
pub(super) struct BigIntegerAdaptor;

impl Adaptor<Setup> for BigIntegerAdaptor {
	fn name(&self) -> &'static str {
		"big_integer"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Immutable
	}

	fn parent(&self) -> Option<&'static str> {
		Some("immutable")
	}

	fn matches(&self, ty: &Type, _universe: &TypeUniverse) -> bool {
		ty.base_name() == Some("java.math.BigInteger")
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Immutable { repr } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Immutable));
		};
		let small: i64 = repr.parse().map_err(|_| RecallError::failed(format!("{repr} does not fit a long")))?;
		let ty = generator.context_mut().types_mut().raw_type_name(&node.ty);
		Ok(Computation::expression(
			templates::call(&ty, "valueOf", &[templates::literal(&Literal::Long(small))]),
			Some(node.ty.clone()),
		))
	}
}

/// Class objects as class literals: `Foo.class`.
#[derive(Debug)]
pub(super) struct ClassLiteralAdaptor;

impl Adaptor<Setup> for ClassLiteralAdaptor {
	fn name(&self) -> &'static str {
		"class_literal"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Immutable
	}

	fn parent(&self) -> Option<&'static str> {
		Some("immutable")
	}

	fn matches(&self, ty: &Type, _universe: &TypeUniverse) -> bool {
		ty.base_name() == Some(CLASS)
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Immutable { repr } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Immutable));
		};
		let named = Type::parse(repr)?;
		let literal = generator.context_mut().types_mut().raw_class(&named.erasure());
		Ok(Computation::expression(literal, Some(node.ty.clone())))
	}
}

/// `E.CONSTANT`, or a by-name lookup for hidden enums.
#[derive(Debug)]
pub(super) struct DefaultEnumAdaptor;

impl Adaptor<Setup> for DefaultEnumAdaptor {
	fn name(&self) -> &'static str {
		"enum"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Enum
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Enum { name } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Enum));
		};
		let types = generator.context_mut().types_mut();
		if types.is_hidden(&node.ty) {
			let wrapped = types.wrap_hidden(&node.ty)?;
			let class = types.raw_class(&node.ty);
			let lookup = format!("{wrapped}.enumType({class}, {})", templates::string_literal(name));
			return Ok(Computation::expression(format!("{lookup}.value()"), Some(node.ty.clone())));
		}
		let ty = types.raw_type_name(&node.ty);
		Ok(Computation::expression(format!("{ty}.{name}"), Some(node.ty.clone())))
	}
}

/// Reflective instantiation followed by one assignment per field.
#[derive(Debug)]
pub(super) struct DefaultObjectAdaptor;

impl Adaptor<Setup> for DefaultObjectAdaptor {
	fn name(&self) -> &'static str {
		"object"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Object
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Object { fields, lambda } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Object));
		};
		if lambda.is_some() {
			return Err(RecallError::failed("function values cannot be instantiated reflectively"));
		}
		if generator.universe().class_of(&node.ty).is_some_and(|info| !info.is_instantiable()) {
			return Err(RecallError::failed(format!("{} is abstract and cannot be instantiated", node.ty)));
		}

		let name = generator.local_name(value)?;
		let hidden = generator.context().types().is_hidden(&node.ty);
		let mut statements = Vec::new();
		let mut assignments = Vec::with_capacity(fields.len());
		for field in fields {
			let mut child = visit_field(generator, field)?;
			statements.extend(child.take_statements());
			assignments.push(assign_field(generator, &name, hidden, field, &child.value));
		}

		if generator.is_forwarded(value) || hidden {
			return finish_local(generator, value, statements, assignments);
		}
		let types = generator.context_mut().types_mut();
		let generic_object = types.raw_name(GENERIC_OBJECT);
		let ty = types.raw_type_name(&node.ty);
		statements.push(templates::assign_local(&ty, &name, &format!("{generic_object}.newInstance({ty}.class)")));
		statements.extend(assignments);
		Ok(Computation::stored(name, Some(node.ty.clone())).with_statements(statements))
	}
}

/// Construction through a declared constructor.
#[derive(Debug)]
pub(super) struct ConstructorObjectAdaptor;

impl Adaptor<Setup> for ConstructorObjectAdaptor {
	fn name(&self) -> &'static str {
		"constructor"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Object
	}

	fn parent(&self) -> Option<&'static str> {
		Some("object")
	}

	fn matches(&self, ty: &Type, universe: &TypeUniverse) -> bool {
		universe.class_of(ty).is_some_and(|info| !info.constructors.is_empty())
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		construction::construct(generator, value)
	}
}

/// `new T()` followed by one setter call per field with a matching setter.
///
/// Hidden classes are instantiated reflectively and held in a local of the most special
/// visible type they were used as; only setters reachable through that type are called.
#[derive(Debug)]
pub(super) struct BeanObjectAdaptor;

impl Adaptor<Setup> for BeanObjectAdaptor {
	fn name(&self) -> &'static str {
		"bean"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Object
	}

	fn parent(&self) -> Option<&'static str> {
		Some("constructor")
	}

	fn matches(&self, ty: &Type, universe: &TypeUniverse) -> bool {
		ty.base_name().is_some_and(|name| !universe.setters(name).is_empty())
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let graph = generator.graph();
		let universe = generator.universe();
		let node = graph.get(value)?;
		let SerializedValue::Object { fields, lambda: None } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Object));
		};
		let class = node
			.ty
			.base_name()
			.ok_or_else(|| RecallError::UnsupportedType { ty: node.ty.to_string() })?;
		let info = universe.require(class)?;
		if !info.is_instantiable() {
			return Err(RecallError::failed(format!("{class} is abstract and cannot be instantiated")));
		}

		let types = generator.context().types();
		let package = types.package().to_owned();
		let hidden = types.is_hidden(&node.ty);
		let declared = if hidden {
			let visible: Vec<Type> = node.used_types.iter().map(Type::erasure).filter(|ty| !types.is_hidden(ty)).collect();
			types
				.most_special_of(&visible)
				.filter(|ty| *ty != Type::object())
				.ok_or_else(|| RecallError::failed(format!("{class} was never used as a visible type declaring setters")))?
		} else {
			let default_ctor = info
				.constructors
				.iter()
				.any(|ctor| ctor.params.is_empty() && construction::is_visible(ctor, info, &package));
			if !default_ctor {
				return Err(RecallError::failed(format!("{class} declares no visible no-argument constructor")));
			}
			node.ty.clone()
		};
		let setters: Vec<_> = declared
			.base_name()
			.map(|name| universe.setters(name))
			.unwrap_or_default()
			.into_iter()
			.filter(|(owner, setter)| construction::is_accessible(setter.visibility, owner, &package))
			.map(|(_, setter)| setter)
			.collect();

		let name = generator.local_name(value)?;
		let mut statements = Vec::new();
		let mut population = Vec::with_capacity(fields.len());
		let mut called = 0_usize;
		for field in fields {
			let mut child = visit_field(generator, field)?;
			statements.extend(child.take_statements());
			let child_node = graph.get(field.value)?;
			let setter = setters.iter().find(|setter| {
				setter.field == field.name
					&& match child_node.kind() {
						ValueKind::Null => !setter.ty.is_primitive(),
						_ => universe.is_assignable(&child_node.ty, &setter.ty) || universe.is_assignable(&field.ty, &setter.ty),
					}
			});
			match setter {
				Some(setter) => {
					called += 1;
					population.push(templates::statement(&templates::call(&name, &setter.name, &[child.value])));
				}
				None => population.push(assign_field(generator, &name, false, field, &child.value)),
			}
		}
		if called == 0 {
			return Err(RecallError::failed(format!("no captured field of {class} has a usable setter")));
		}

		if generator.is_forwarded(value) {
			if hidden {
				return Err(RecallError::failed(format!("{} is referenced before its setters can be called", graph.describe(value))));
			}
			statements.extend(population);
			return Ok(Computation::stored(name, Some(node.ty.clone())).with_statements(statements));
		}

		let types = generator.context_mut().types_mut();
		let declaration = if hidden {
			let ty = types.variable_type_name(&declared)?;
			let generic_object = types.raw_name(GENERIC_OBJECT);
			let init = templates::cast(&ty, &format!("{generic_object}.newInstance({})", types.raw_class(&node.ty)));
			templates::assign_local(&ty, &name, &init)
		} else {
			let ty = types.raw_type_name(&node.ty);
			let constructed = types.constructor_type_name(&node.ty)?;
			templates::assign_local(&ty, &name, &templates::new_object(&constructed, &[]))
		};
		tracing::trace!(class, setters = called, "bean built through setters");
		statements.push(declaration);
		statements.extend(population);
		Ok(Computation::stored(name, Some(node.ty.clone())).with_statements(statements))
	}
}

/// Function values rebuilt from their implementation method.
#[derive(Debug)]
pub(super) struct LambdaObjectAdaptor;

impl Adaptor<Setup> for LambdaObjectAdaptor {
	fn name(&self) -> &'static str {
		"lambda"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Object
	}

	fn parent(&self) -> Option<&'static str> {
		Some("object")
	}

	fn matches(&self, ty: &Type, _universe: &TypeUniverse) -> bool {
		ty.base_name().is_some_and(|name| name.contains("$$Lambda"))
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Object {
			fields,
			lambda: Some(origin),
		} = &node.value
		else {
			return Err(RecallError::failed(format!("{} carries no function origin", generator.graph().describe(value))));
		};

		let name = generator.local_name(value)?;
		let mut statements = Vec::new();
		let captured: Vec<ValueId> = fields.iter().map(|field| field.value).collect();
		let values = visit_all(generator, &captured, &mut statements)?;
		ensure_not_forwarded(generator, value)?;

		let types = generator.context_mut().types_mut();
		if types.is_hidden(&origin.interface) {
			return Err(RecallError::UnsupportedType {
				ty: origin.interface.to_string(),
			});
		}
		let generic_object = types.raw_name(GENERIC_OBJECT);
		let declared = types.variable_type_name(&origin.interface)?;
		let mut args = vec![
			types.raw_class(&origin.interface.erasure()),
			templates::string_literal(&format!("{}::{}", origin.impl_class, origin.impl_method)),
		];
		args.extend(values);
		statements.push(templates::assign_local(&declared, &name, &templates::call(&generic_object, "lambda", &args)));
		Ok(Computation::stored(name, Some(origin.interface.clone())).with_statements(statements))
	}
}

/// Mutable list filled with `add` calls.
#[derive(Debug)]
pub(super) struct DefaultListAdaptor;

impl Adaptor<Setup> for DefaultListAdaptor {
	fn name(&self) -> &'static str {
		"list"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::List
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::List { elements, .. } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::List));
		};
		add_all(generator, value, elements)
	}
}

/// Mutable set filled with `add` calls in capture order.
#[derive(Debug)]
pub(super) struct DefaultSetAdaptor;

impl Adaptor<Setup> for DefaultSetAdaptor {
	fn name(&self) -> &'static str {
		"set"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Set
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Set { elements, .. } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Set));
		};
		add_all(generator, value, elements)
	}
}

fn add_all(generator: &mut SetupGenerator<'_>, id: ValueId, elements: &[ValueId]) -> Result<Computation> {
	let name = generator.local_name(id)?;
	let mut statements = Vec::new();
	let values = visit_all(generator, elements, &mut statements)?;
	let population = values.into_iter().map(|item| templates::statement(&templates::call(&name, "add", &[item]))).collect();
	finish_local(generator, id, statements, population)
}

/// Mutable map filled with `put` calls.
#[derive(Debug)]
pub(super) struct DefaultMapAdaptor;

impl Adaptor<Setup> for DefaultMapAdaptor {
	fn name(&self) -> &'static str {
		"map"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Map
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Map { entries, .. } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Map));
		};
		let name = generator.local_name(value)?;
		let mut statements = Vec::new();
		let mut population = Vec::with_capacity(entries.len());
		for (key, item) in entries {
			let values = visit_all(generator, &[*key, *item], &mut statements)?;
			population.push(templates::statement(&templates::call(&name, "put", &values)));
		}
		finish_local(generator, value, statements, population)
	}
}

/// `Arrays.asList(...)`.
#[derive(Debug)]
pub(super) struct ArraysListAdaptor;

impl Adaptor<Setup> for ArraysListAdaptor {
	fn name(&self) -> &'static str {
		"arrays_list"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::List
	}

	fn parent(&self) -> Option<&'static str> {
		Some("list")
	}

	fn matches(&self, ty: &Type, _universe: &TypeUniverse) -> bool {
		ty.base_name() == Some("java.util.Arrays$ArrayList")
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::List { component, elements } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::List));
		};
		let name = generator.local_name(value)?;
		let mut statements = Vec::new();
		let values = visit_all(generator, elements, &mut statements)?;
		ensure_not_forwarded(generator, value)?;
		let types = generator.context_mut().types_mut();
		let declared = types.variable_type_name(&Type::parameterized("java.util.List", vec![component.clone()]))?;
		let arrays = types.raw_name(ARRAYS);
		statements.push(templates::assign_local(&declared, &name, &templates::call(&arrays, "asList", &values)));
		Ok(Computation::stored(name, Some(node.ty.clone())).with_statements(statements))
	}
}

/// How a `java.util.Collections` nested class was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoration {
	Unmodifiable,
	Synchronized,
	Checked,
	Empty,
	Singleton,
}

impl Decoration {
	fn parse(binary: &str, kind: ValueKind) -> Option<Self> {
		let simple = binary.strip_prefix("java.util.Collections$")?;
		let (decoration, rest) = [
			("Unmodifiable", Self::Unmodifiable),
			("Synchronized", Self::Synchronized),
			("Checked", Self::Checked),
			("Empty", Self::Empty),
			("Singleton", Self::Singleton),
		]
		.into_iter()
		.find_map(|(prefix, decoration)| simple.strip_prefix(prefix).map(|rest| (decoration, rest)))?;
		let shape = match rest {
			"List" | "RandomAccessList" => ValueKind::List,
			"Set" => ValueKind::Set,
			"Map" => ValueKind::Map,
			_ => return None,
		};
		(shape == kind).then_some(decoration)
	}

	fn factory(self, kind: ValueKind) -> String {
		let shape = match kind {
			ValueKind::Set => "Set",
			ValueKind::Map => "Map",
			_ => "List",
		};
		match (self, kind) {
			(Self::Singleton, ValueKind::Set) => "singleton".to_owned(),
			(Self::Unmodifiable, _) => format!("unmodifiable{shape}"),
			(Self::Synchronized, _) => format!("synchronized{shape}"),
			(Self::Checked, _) => format!("checked{shape}"),
			(Self::Empty, _) => format!("empty{shape}"),
			(Self::Singleton, _) => format!("singleton{shape}"),
		}
	}
}

/// Decorated, empty and singleton collections of `java.util.Collections`.
#[derive(Debug)]
pub(super) struct CollectionsAdaptor {
	kind: ValueKind,
}

impl CollectionsAdaptor {
	pub(super) fn list() -> Self {
		Self { kind: ValueKind::List }
	}

	pub(super) fn set() -> Self {
		Self { kind: ValueKind::Set }
	}

	pub(super) fn map() -> Self {
		Self { kind: ValueKind::Map }
	}
}

impl Adaptor<Setup> for CollectionsAdaptor {
	fn name(&self) -> &'static str {
		match self.kind {
			ValueKind::Set => "collections_set",
			ValueKind::Map => "collections_map",
			_ => "collections_list",
		}
	}

	fn kind(&self) -> ValueKind {
		self.kind
	}

	fn parent(&self) -> Option<&'static str> {
		Some(self.kind.as_str())
	}

	fn matches(&self, ty: &Type, _universe: &TypeUniverse) -> bool {
		ty.base_name().and_then(|name| Decoration::parse(name, self.kind)).is_some()
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let decoration = node
			.ty
			.base_name()
			.and_then(|name| Decoration::parse(name, self.kind))
			.ok_or_else(|| RecallError::failed(format!("{} is not a collections decorator", node.ty)))?;
		let (interface, fallback, args, children, pairs) = match &node.value {
			SerializedValue::List { component, elements } => ("java.util.List", "java.util.ArrayList", vec![component.clone()], elements.clone(), false),
			SerializedValue::Set { component, elements } => ("java.util.Set", "java.util.LinkedHashSet", vec![component.clone()], elements.clone(), false),
			SerializedValue::Map { key, value, entries } => (
				"java.util.Map",
				"java.util.LinkedHashMap",
				vec![key.clone(), value.clone()],
				entries.iter().flat_map(|(key, item)| [*key, *item]).collect(),
				true,
			),
			_ => return Err(unexpected(generator, value, self.kind)),
		};

		let name = generator.local_name(value)?;
		let mut statements = Vec::new();
		let values = visit_all(generator, &children, &mut statements)?;
		ensure_not_forwarded(generator, value)?;

		let interface_ty = Type::parameterized(interface, args.clone());
		let arity = if pairs { 2 } else { 1 };
		let factory = decoration.factory(self.kind);
		let init_args = match decoration {
			Decoration::Empty if values.is_empty() => Vec::new(),
			Decoration::Empty => return Err(RecallError::failed(format!("empty collection {name} holds {} values", values.len()))),
			Decoration::Singleton if values.len() == arity => values,
			Decoration::Singleton => return Err(RecallError::failed(format!("singleton collection {name} holds {} values", values.len()))),
			Decoration::Unmodifiable | Decoration::Synchronized | Decoration::Checked => {
				let inner = generator.context_mut().new_name(&Type::class(fallback));
				let types = generator.context_mut().types_mut();
				let declared = types.variable_type_name(&interface_ty)?;
				let ctor = types.constructor_type_name(&Type::parameterized(fallback, args.clone()))?;
				statements.push(templates::assign_local(&declared, &inner, &templates::new_object(&ctor, &[])));
				if pairs {
					for pair in values.chunks(2) {
						statements.push(templates::statement(&templates::call(&inner, "put", pair)));
					}
				} else {
					for item in values {
						statements.push(templates::statement(&templates::call(&inner, "add", &[item])));
					}
				}
				let mut init_args = vec![inner];
				if decoration == Decoration::Checked {
					init_args.extend(args.iter().map(|arg| types.raw_class(arg)));
				}
				init_args
			}
		};

		let types = generator.context_mut().types_mut();
		let declared = types.variable_type_name(&interface_ty)?;
		let collections = types.raw_name(COLLECTIONS);
		statements.push(templates::assign_local(&declared, &name, &templates::call(&collections, &factory, &init_args)));
		Ok(Computation::stored(name, Some(node.ty.clone())).with_statements(statements))
	}
}

/// Array allocation followed by indexed assignments.
#[derive(Debug)]
pub(super) struct DefaultArrayAdaptor;

impl Adaptor<Setup> for DefaultArrayAdaptor {
	fn name(&self) -> &'static str {
		"array"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Array
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Array { elements, .. } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Array));
		};
		let name = generator.local_name(value)?;
		let mut statements = Vec::new();
		let values = visit_all(generator, elements, &mut statements)?;
		let population = values
			.iter()
			.enumerate()
			.map(|(idx, item)| templates::assign_element(&name, idx, item))
			.collect();
		finish_local(generator, value, statements, population)
	}
}

/// Primitive arrays marked with a file hint, stored as a JSON resource.
#[derive(Debug)]
pub(super) struct LargePrimitiveArrayAdaptor;

impl Adaptor<Setup> for LargePrimitiveArrayAdaptor {
	fn name(&self) -> &'static str {
		"file_array"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Array
	}

	fn parent(&self) -> Option<&'static str> {
		Some("array")
	}

	fn matches(&self, ty: &Type, _universe: &TypeUniverse) -> bool {
		ty.component().is_some_and(Type::is_primitive)
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut SetupGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Array { component, elements } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Array));
		};
		let read_from = generator
			.context()
			.hints(value)
			.iter()
			.find_map(|hint| match hint {
				Annotation::LoadFromFile { read_from } => Some(read_from.clone()),
				Annotation::Excluded => None,
			})
			.ok_or_else(|| RecallError::failed("array carries no file hint"))?;
		let read_from = if read_from.is_empty() {
			generator.context().resource_dir().to_owned()
		} else {
			read_from
		};

		let mut items = Vec::with_capacity(elements.len());
		for element in elements {
			let SerializedValue::Literal { value: literal } = &generator.graph().get(*element)?.value else {
				return Err(RecallError::failed(format!("{} is not a primitive element", generator.graph().describe(*element))));
			};
			items.push(json_literal(literal)?);
		}
		let content = serde_json::to_string(&items)?;
		let file = resource_name(&generator.context().types().simple_name(component), &content);

		let name = generator.local_name(value)?;
		let types = generator.context_mut().types_mut();
		let declared = types.variable_type_name(&node.ty)?;
		let serializer = types.raw_name(FILE_SERIALIZER);
		let loader = templates::new_object(&serializer, &[templates::string_literal(&read_from)]);
		let init = templates::call(&loader, "load", &[templates::string_literal(&file), format!("{declared}.class")]);
		tracing::debug!(value = %value, file = %file, elements = elements.len(), "array stored as resource");
		generator.context_mut().add_resource(file, content);
		Ok(Computation::stored(name.clone(), Some(node.ty.clone())).with_statements(vec![templates::assign_local(&declared, &name, &init)]))
	}
}

/// `<component>-<first 8 bytes of the content's SHA-256>.json`.
fn resource_name(component: &str, content: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(content.as_bytes());
	let digest = hasher.finalize();
	let hex: String = digest.iter().take(8).map(|byte| format!("{byte:02x}")).collect();
	format!("{component}-{hex}.json")
}

fn json_literal(literal: &Literal) -> Result<serde_json::Value> {
	let value = match literal {
		Literal::Bool(item) => serde_json::Value::from(*item),
		Literal::Byte(item) => serde_json::Value::from(*item),
		Literal::Short(item) => serde_json::Value::from(*item),
		Literal::Int(item) => serde_json::Value::from(*item),
		Literal::Long(item) => serde_json::Value::from(*item),
		Literal::Float(item) => serde_json::Number::from_f64(f64::from(*item))
			.map(serde_json::Value::Number)
			.ok_or_else(|| RecallError::failed(format!("{item} has no JSON form")))?,
		Literal::Double(item) => serde_json::Number::from_f64(*item)
			.map(serde_json::Value::Number)
			.ok_or_else(|| RecallError::failed(format!("{item} has no JSON form")))?,
		Literal::Char(item) => serde_json::Value::from(item.to_string()),
		Literal::Str(item) => serde_json::Value::from(item.as_str()),
	};
	Ok(value)
}
