use super::{Matcher, MatcherGenerator};
use crate::recall::templates::{self, CLASS, GENERIC_MATCHER, MATCHER};
use crate::recall::{Adaptor, Computation, Generator, RecallError, Result, SerializedValue, Type, TypeUniverse, ValueId, ValueKind};

fn unexpected(generator: &MatcherGenerator<'_>, id: ValueId, expected: ValueKind) -> RecallError {
	RecallError::failed(format!("{} is not a {} value", generator.graph().describe(id), expected.as_str()))
}

fn hamcrest(generator: &mut MatcherGenerator<'_>, name: &str) -> String {
	generator.context_mut().types_mut().static_member(&templates::hamcrest(name))
}

fn runtime(generator: &mut MatcherGenerator<'_>, name: &str) -> String {
	generator.context_mut().types_mut().static_member(&templates::runtime_matcher(name))
}

fn matcher_of(ty: &Type) -> Option<Type> {
	Some(Type::parameterized(MATCHER, vec![ty.clone()]))
}

/// Class literal naming elements of type `ty`; hidden types fall back to `Object.class`.
fn component_class(generator: &mut MatcherGenerator<'_>, ty: &Type) -> String {
	let types = generator.context_mut().types_mut();
	let ty = types.best_type(ty, &Type::object());
	if types.is_hidden(&ty.erasure()) {
		return types.raw_class(&Type::object());
	}
	types.raw_class(&ty)
}

/// Element argument of a collection matcher: literals inline, nulls as `nullValue()`,
/// everything else as a nested matcher.
fn element(generator: &mut MatcherGenerator<'_>, id: ValueId, statements: &mut Vec<String>) -> Result<String> {
	let node = generator.graph().get(id)?;
	match &node.value {
		SerializedValue::Literal { value } => Ok(templates::literal(value)),
		SerializedValue::Null => Ok(format!("{}()", hamcrest(generator, "nullValue"))),
		_ => {
			let mut child = generator.visit(id)?;
			statements.extend(child.take_statements());
			Ok(child.value)
		}
	}
}

fn elements(generator: &mut MatcherGenerator<'_>, ids: &[ValueId], statements: &mut Vec<String>) -> Result<Vec<String>> {
	let mut out = Vec::with_capacity(ids.len());
	for id in ids {
		out.push(element(generator, *id, statements)?);
	}
	Ok(out)
}

/// `nullValue(T.class)`.
#[derive(Debug)]
pub(super) struct DefaultNullAdaptor;

impl Adaptor<Matcher> for DefaultNullAdaptor {
	fn name(&self) -> &'static str {
		"null"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Null
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut MatcherGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let factory = hamcrest(generator, "nullValue");
		let types = generator.context_mut().types_mut();
		let erased = node.ty.erasure();
		let expression = if types.is_hidden(&erased) {
			format!("{factory}()")
		} else {
			format!("{factory}({})", types.raw_class(&erased))
		};
		Ok(Computation::expression(expression, matcher_of(&node.ty)))
	}
}

/// `equalTo(literal)`.
#[derive(Debug)]
pub(super) struct DefaultLiteralAdaptor;

impl Adaptor<Matcher> for DefaultLiteralAdaptor {
	fn name(&self) -> &'static str {
		"literal"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Literal
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut MatcherGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Literal { value: literal } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Literal));
		};
		let factory = hamcrest(generator, "equalTo");
		Ok(Computation::expression(
			templates::call_function(&factory, &[templates::literal(literal)]),
			matcher_of(&node.ty),
		))
	}
}

/// `equalTo(new T("repr"))`.
#[derive(Debug)]
pub(super) struct DefaultImmutableAdaptor;

impl Adaptor<Matcher> for DefaultImmutableAdaptor {
	fn name(&self) -> &'static str {
		"immutable"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Immutable
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut MatcherGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Immutable { repr } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Immutable));
		};
		if generator.context().types().is_hidden(&node.ty) {
			return Err(RecallError::UnsupportedType { ty: node.ty.to_string() });
		}
		let factory = hamcrest(generator, "equalTo");
		let ty = generator.context_mut().types_mut().raw_type_name(&node.ty);
		let expected = templates::new_object(&ty, &[templates::string_literal(repr)]);
		Ok(Computation::expression(templates::call_function(&factory, &[expected]), matcher_of(&node.ty)))
	}
}

/// `equalTo(Foo.class)`.
#[derive(Debug)]
pub(super) struct ClassLiteralAdaptor;

impl Adaptor<Matcher> for ClassLiteralAdaptor {
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

	fn try_deserialize(&self, value: ValueId, generator: &mut MatcherGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Immutable { repr } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Immutable));
		};
		let named = Type::parse(repr)?;
		let factory = hamcrest(generator, "equalTo");
		let literal = generator.context_mut().types_mut().raw_class(&named.erasure());
		Ok(Computation::expression(templates::call_function(&factory, &[literal]), matcher_of(&node.ty)))
	}
}

/// `sameInstance(E.C)`, or a by-name match for hidden enums.
#[derive(Debug)]
pub(super) struct DefaultEnumAdaptor;

impl Adaptor<Matcher> for DefaultEnumAdaptor {
	fn name(&self) -> &'static str {
		"enum"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Enum
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut MatcherGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Enum { name } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Enum));
		};
		if generator.context().types().is_hidden(&node.ty) {
			let factory = runtime(generator, "matchingEnum");
			return Ok(Computation::expression(
				templates::call_function(&factory, &[templates::string_literal(name)]),
				matcher_of(&node.ty),
			));
		}
		let factory = hamcrest(generator, "sameInstance");
		let ty = generator.context_mut().types_mut().raw_type_name(&node.ty);
		Ok(Computation::expression(
			templates::call_function(&factory, &[format!("{ty}.{name}")]),
			matcher_of(&node.ty),
		))
	}
}

/// Anonymous `GenericMatcher` declaring one expectation per field.
#[derive(Debug)]
pub(super) struct DefaultObjectAdaptor;

impl Adaptor<Matcher> for DefaultObjectAdaptor {
	fn name(&self) -> &'static str {
		"object"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Object
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut MatcherGenerator<'_>) -> Result<Computation> {
		let graph = generator.graph();
		let node = graph.get(value)?;
		let SerializedValue::Object { fields, lambda } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Object));
		};
		if lambda.is_some() {
			return Err(RecallError::failed("function values have no fields to match"));
		}

		let mut sorted: Vec<_> = fields.iter().collect();
		sorted.sort_by(|left, right| left.name.cmp(&right.name));

		let mut statements = Vec::new();
		let mut members = Vec::with_capacity(sorted.len());
		for field in sorted {
			let child = graph.get(field.value)?;
			let member = match &child.value {
				SerializedValue::Literal { value: literal } => {
					let types = generator.context_mut().types_mut();
					let ty = types.best_type(&field.ty, &child.ty);
					let ty = types.variable_type_name(&ty)?;
					templates::assign_local(&ty, &field.name, &templates::literal(literal))
				}
				SerializedValue::Null => {
					let types = generator.context_mut().types_mut();
					let ty = types.best_type(&field.ty, &Type::object());
					let ty = types.variable_type_name(&ty)?;
					templates::assign_local(&ty, &field.name, "null")
				}
				_ => {
					let mut matcher = generator.visit(field.value)?;
					statements.extend(matcher.take_statements());
					let ty = format!("{}<?>", generator.context_mut().types_mut().raw_name(MATCHER));
					templates::assign_local(&ty, &field.name, &matcher.value)
				}
			};
			members.push(member);
		}

		let display = generator.display_type(value)?.erasure();
		let runtime_ty = node.ty.erasure();
		let types = generator.context_mut().types_mut();
		let base = types.raw_name(GENERIC_MATCHER);
		let mut targets = vec![types.raw_class(&runtime_ty)];
		if display != runtime_ty {
			targets.push(types.raw_class(&display));
		}
		let tail = format!(".{}", templates::call_function("matching", &targets));
		Ok(Computation::expression(templates::anonymous_class(&base, &members, &tail), matcher_of(&node.ty)).with_statements(statements))
	}
}

/// Function values only match by the interface they implement.
#[derive(Debug)]
pub(super) struct LambdaObjectAdaptor;

impl Adaptor<Matcher> for LambdaObjectAdaptor {
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

	fn try_deserialize(&self, value: ValueId, generator: &mut MatcherGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Object {
			lambda: Some(origin), ..
		} = &node.value
		else {
			return Err(RecallError::failed(format!("{} carries no function origin", generator.graph().describe(value))));
		};
		let factory = hamcrest(generator, "instanceOf");
		let class = generator.context_mut().types_mut().raw_class(&origin.interface.erasure());
		Ok(Computation::expression(templates::call_function(&factory, &[class]), matcher_of(&origin.interface)))
	}
}

/// `containsInOrder(T.class, ...)`, `empty(T.class)` for empty lists.
#[derive(Debug)]
pub(super) struct DefaultListAdaptor;

impl Adaptor<Matcher> for DefaultListAdaptor {
	fn name(&self) -> &'static str {
		"list"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::List
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut MatcherGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::List { component, elements: ids } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::List));
		};
		let class = component_class(generator, component);
		let mut statements = Vec::new();
		let expression = if ids.is_empty() {
			templates::call_function(&runtime(generator, "empty"), &[class])
		} else {
			let mut args = vec![class];
			args.extend(elements(generator, ids, &mut statements)?);
			templates::call_function(&runtime(generator, "containsInOrder"), &args)
		};
		Ok(Computation::expression(expression, matcher_of(&node.ty)).with_statements(statements))
	}
}

/// Order-insensitive set matchers.
#[derive(Debug)]
pub(super) struct DefaultSetAdaptor;

impl Adaptor<Matcher> for DefaultSetAdaptor {
	fn name(&self) -> &'static str {
		"set"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Set
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut MatcherGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Set { component, elements: ids } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Set));
		};
		let class = component_class(generator, component);
		let factory = match ids.len() {
			0 => "empty",
			1 => "contains",
			_ => "containsInAnyOrder",
		};
		let mut statements = Vec::new();
		let mut args = vec![class];
		args.extend(elements(generator, ids, &mut statements)?);
		let expression = templates::call_function(&runtime(generator, factory), &args);
		Ok(Computation::expression(expression, matcher_of(&node.ty)).with_statements(statements))
	}
}

/// `containsEntries(K.class, V.class).entry(k, v)...`, `noEntries(K.class, V.class)` when empty.
#[derive(Debug)]
pub(super) struct DefaultMapAdaptor;

impl Adaptor<Matcher> for DefaultMapAdaptor {
	fn name(&self) -> &'static str {
		"map"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Map
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut MatcherGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Map { key, value: item, entries } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Map));
		};
		let classes = vec![component_class(generator, key), component_class(generator, item)];
		if entries.is_empty() {
			let expression = templates::call_function(&runtime(generator, "noEntries"), &classes);
			return Ok(Computation::expression(expression, matcher_of(&node.ty)));
		}

		let mut statements = Vec::new();
		let mut expression = templates::call_function(&runtime(generator, "containsEntries"), &classes);
		for (entry_key, entry_value) in entries {
			let pair = vec![element(generator, *entry_key, &mut statements)?, element(generator, *entry_value, &mut statements)?];
			expression.push('.');
			expression.push_str(&templates::call_function("entry", &pair));
		}
		Ok(Computation::expression(expression, matcher_of(&node.ty)).with_statements(statements))
	}
}

/// `arrayContaining(T.class, ...)`, `<primitive>ArrayContaining(...)` for primitive components.
#[derive(Debug)]
pub(super) struct DefaultArrayAdaptor;

impl Adaptor<Matcher> for DefaultArrayAdaptor {
	fn name(&self) -> &'static str {
		"array"
	}

	fn kind(&self) -> ValueKind {
		ValueKind::Array
	}

	fn try_deserialize(&self, value: ValueId, generator: &mut MatcherGenerator<'_>) -> Result<Computation> {
		let node = generator.graph().get(value)?;
		let SerializedValue::Array { component, elements: ids } = &node.value else {
			return Err(unexpected(generator, value, ValueKind::Array));
		};
		let mut statements = Vec::new();
		let expression = match component {
			Type::Primitive(primitive) => {
				let factory = runtime(generator, &format!("{}ArrayContaining", primitive.name()));
				templates::call_function(&factory, &elements(generator, ids, &mut statements)?)
			}
			_ if ids.is_empty() => format!("{}()", hamcrest(generator, "emptyArray")),
			_ => {
				let mut args = vec![component_class(generator, component)];
				args.extend(elements(generator, ids, &mut statements)?);
				templates::call_function(&runtime(generator, "arrayContaining"), &args)
			}
		};
		Ok(Computation::expression(expression, matcher_of(&node.ty)).with_statements(statements))
	}
}
