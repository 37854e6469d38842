//! Search for a declared constructor able to rebuild a captured object.

use std::cmp::Reverse;

use super::SetupGenerator;
use super::adaptors::{assign_field, visit_field};
use crate::recall::classes::simple_name_of;
use crate::recall::templates;
use crate::recall::ty::STRING;
use crate::recall::{
	ClassCategory, ClassInfo, Computation, ConstructorInfo, Generator, Literal, ParamInfo, Primitive, RecallError, Result, SerializedField, SerializedValue,
	Type, ValueId, ValueKind, Visibility,
};

/// How parameters without a linked field are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamStrategy {
	/// Zero, `false` or `null`.
	Default,
	/// Zero for primitives, an empty instance for references.
	NonNull,
	/// Values distinct from the defaults.
	NonDefault,
}

impl ParamStrategy {
	const ALL: [ParamStrategy; 3] = [ParamStrategy::Default, ParamStrategy::NonNull, ParamStrategy::NonDefault];

	fn label(self) -> &'static str {
		match self {
			Self::Default => "default",
			Self::NonNull => "non-null",
			Self::NonDefault => "non-default",
		}
	}
}

/// Rebuild the object `id` through the best matching visible constructor.
///
/// Constructors linking more parameters to captured fields are tried first. Fields a
/// constructor does not cover are assigned afterwards; uncovered final fields disqualify it.
pub(super) fn construct(generator: &mut SetupGenerator<'_>, id: ValueId) -> Result<Computation> {
	let graph = generator.graph();
	let node = graph.get(id)?;
	let SerializedValue::Object { fields, lambda: None } = &node.value else {
		return Err(RecallError::failed(format!("{} is not a plain object", graph.describe(id))));
	};
	let class = node
		.ty
		.base_name()
		.ok_or_else(|| RecallError::UnsupportedType { ty: node.ty.to_string() })?;
	let info = generator.universe().require(class)?;
	if !info.is_instantiable() {
		return Err(RecallError::failed(format!("{class} is abstract and cannot be constructed")));
	}
	if generator.context().types().is_hidden(&node.ty) {
		return Err(RecallError::failed(format!("{class} cannot be named in generated code")));
	}

	let package = generator.context().types().package().to_owned();
	let mut constructors: Vec<&ConstructorInfo> = info.constructors.iter().filter(|ctor| is_visible(ctor, info, &package)).collect();
	if constructors.is_empty() {
		return Err(RecallError::failed(format!("{class} declares no visible constructor")));
	}
	constructors.sort_by_key(|ctor| Reverse(ctor.params.iter().filter(|param| linked_field(param, fields).is_some()).count()));

	let name = generator.local_name(id)?;
	let mut statements = Vec::new();
	let mut values = Vec::with_capacity(fields.len());
	for field in fields {
		let mut child = visit_field(generator, field)?;
		statements.extend(child.take_statements());
		values.push(child.value);
	}
	if generator.is_forwarded(id) {
		return Err(RecallError::failed(format!("{} is referenced by its own constructor arguments", graph.describe(id))));
	}

	let mut attempts = Vec::new();
	for ctor in constructors {
		let strategies: &[ParamStrategy] = if ctor.params.iter().all(|param| linked_field(param, fields).is_some()) {
			&[ParamStrategy::Default]
		} else {
			&ParamStrategy::ALL
		};
		for strategy in strategies {
			let checkpoint = generator.context().clone();
			match try_constructor(generator, fields, &values, ctor, *strategy) {
				Ok((args, covered)) => {
					tracing::trace!(class, params = ctor.params.len(), strategy = strategy.label(), "constructor selected");
					let types = generator.context_mut().types_mut();
					let declared = types.raw_type_name(&node.ty);
					let constructed = types.constructor_type_name(&node.ty)?;
					statements.push(templates::assign_local(&declared, &name, &templates::new_object(&constructed, &args)));
					for (idx, field) in fields.iter().enumerate() {
						if !covered.contains(&idx) {
							let assignment = assign_field(generator, &name, false, field, &values[idx]);
							statements.push(assignment);
						}
					}
					return Ok(Computation::stored(name, Some(node.ty.clone())).with_statements(statements));
				}
				Err(err) => {
					*generator.context_mut() = checkpoint;
					attempts.push(err.as_attempt(&format!("{}({}) with {} values", simple_name_of(class), signature(ctor), strategy.label())));
				}
			}
		}
	}

	Err(RecallError::DeserializationFailed {
		value: graph.describe(id),
		attempts,
	})
}

fn try_constructor(
	generator: &mut SetupGenerator<'_>,
	fields: &[SerializedField],
	values: &[String],
	ctor: &ConstructorInfo,
	strategy: ParamStrategy,
) -> Result<(Vec<String>, Vec<usize>)> {
	let graph = generator.graph();
	let universe = generator.universe();
	let mut args = Vec::with_capacity(ctor.params.len());
	let mut covered = Vec::new();
	for param in &ctor.params {
		let Some(idx) = linked_field(param, fields) else {
			args.push(fill(generator, param, strategy)?);
			continue;
		};
		let field = &fields[idx];
		let value = graph.get(field.value)?;
		if value.kind() == ValueKind::Null {
			if param.non_null || param.ty.is_primitive() {
				return Err(RecallError::failed(format!("field {} is null but the parameter requires a value", field.name)));
			}
		} else if !universe.is_assignable(&value.ty, &param.ty) && !universe.is_assignable(&field.ty, &param.ty) {
			return Err(RecallError::failed(format!(
				"field {} of type {} does not fit parameter type {}",
				field.name, value.ty, param.ty
			)));
		}
		args.push(values[idx].clone());
		covered.push(idx);
	}

	for (idx, field) in fields.iter().enumerate() {
		if covered.contains(&idx) {
			continue;
		}
		let is_final = field
			.declaring
			.base_name()
			.and_then(|declaring| universe.field(declaring, &field.name).ok())
			.is_some_and(|(_, info)| info.is_final);
		if is_final {
			return Err(RecallError::failed(format!("final field {} is not set by the constructor", field.name)));
		}
	}
	Ok((args, covered))
}

fn fill(generator: &mut SetupGenerator<'_>, param: &ParamInfo, strategy: ParamStrategy) -> Result<String> {
	match (&param.ty, strategy) {
		(Type::Primitive(primitive), ParamStrategy::NonDefault) => Ok(templates::literal(&sample(*primitive, true))),
		(Type::Primitive(primitive), _) => Ok(templates::literal(&sample(*primitive, false))),
		(_, ParamStrategy::Default) if !param.non_null => Ok("null".to_owned()),
		(ty, ParamStrategy::Default) => Err(RecallError::failed(format!("parameter of type {ty} must not be null"))),
		(ty, strategy) => instance(generator, ty, strategy == ParamStrategy::NonDefault),
	}
}

/// Non-null value of `ty` usable as a throwaway argument.
fn instance(generator: &mut SetupGenerator<'_>, ty: &Type, distinct: bool) -> Result<String> {
	let universe = generator.universe();
	let unsupported = || RecallError::failed(format!("no argument value of type {ty}"));
	if let Some(primitive) = ty.base_name().and_then(Primitive::unboxed) {
		return Ok(templates::literal(&sample(primitive, distinct)));
	}
	if ty.base_name() == Some(STRING) {
		return Ok(templates::string_literal(if distinct { "a" } else { "" }));
	}
	let types = generator.context_mut().types_mut();
	if let Type::Array(_) = ty {
		let visible = universe.visible_supertype(ty, types.package());
		let base = types.raw_type_name(visible.array_base());
		return Ok(format!("new {base}[0]{}", "[]".repeat(visible.dimensions().saturating_sub(1))));
	}
	let fallback = match universe.collection_kind(ty) {
		Some(ClassCategory::List) => Some("java.util.ArrayList"),
		Some(ClassCategory::Set) => Some("java.util.LinkedHashSet"),
		Some(ClassCategory::Map) => Some("java.util.LinkedHashMap"),
		_ => None,
	};
	if let Some(fallback) = fallback.filter(|fallback| universe.is_assignable(&Type::class(fallback), &ty.erasure())) {
		let ctor = types.constructor_type_name(&Type::class(fallback))?;
		return Ok(templates::new_object(&ctor, &[]));
	}
	let Some(info) = universe.class_of(ty) else {
		return Err(unsupported());
	};
	if types.is_hidden(&info.raw_type()) {
		return Err(unsupported());
	}
	if let Some(constant) = info.enum_constants.first() {
		return Ok(format!("{}.{constant}", types.raw_type_name(ty)));
	}
	let public_default = info
		.constructors
		.iter()
		.any(|ctor| ctor.params.is_empty() && is_visible(ctor, info, types.package()));
	if info.is_instantiable() && public_default {
		let ctor = types.constructor_type_name(&ty.erasure())?;
		return Ok(templates::new_object(&ctor, &[]));
	}
	Err(unsupported())
}

fn sample(primitive: Primitive, distinct: bool) -> Literal {
	match (primitive, distinct) {
		(Primitive::Boolean, distinct) => Literal::Bool(distinct),
		(Primitive::Byte, distinct) => Literal::Byte(i8::from(distinct)),
		(Primitive::Short, distinct) => Literal::Short(i16::from(distinct)),
		(Primitive::Char, true) => Literal::Char('a'),
		(Primitive::Char, false) => Literal::Char('\0'),
		(Primitive::Long, distinct) => Literal::Long(i64::from(distinct)),
		(Primitive::Float, distinct) => Literal::Float(if distinct { 1.0 } else { 0.0 }),
		(Primitive::Double, distinct) => Literal::Double(if distinct { 1.0 } else { 0.0 }),
		(Primitive::Int | Primitive::Void, distinct) => Literal::Int(i32::from(distinct)),
	}
}

fn linked_field(param: &ParamInfo, fields: &[SerializedField]) -> Option<usize> {
	let name = param.field.as_ref()?;
	fields.iter().position(|field| field.name == *name)
}

pub(super) fn is_visible(ctor: &ConstructorInfo, info: &ClassInfo, package: &str) -> bool {
	is_accessible(ctor.visibility, info, package)
}

/// Whether a member of `owner` with `visibility` can be called from `package`.
pub(super) fn is_accessible(visibility: Visibility, owner: &ClassInfo, package: &str) -> bool {
	match visibility {
		Visibility::Public => true,
		Visibility::Protected | Visibility::Package => owner.package() == package,
		Visibility::Private => false,
	}
}

fn signature(ctor: &ConstructorInfo) -> String {
	ctor.params.iter().map(|param| param.ty.to_string()).collect::<Vec<_>>().join(", ")
}
