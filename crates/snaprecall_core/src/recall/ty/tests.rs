use crate::recall::{Primitive, RecallError, Type};

#[test]
fn parse_nested_generic_signature() {
	let ty = Type::parse("java.util.Map<java.lang.String, java.util.List<? extends java.lang.Number>>").expect("signature parses");

	assert_eq!(
		ty,
		Type::parameterized(
			"java.util.Map",
			vec![Type::string(), Type::parameterized("java.util.List", vec![Type::extends(Type::class("java.lang.Number"))])]
		)
	);
	assert_eq!(ty.to_string(), "java.util.Map<java.lang.String, java.util.List<? extends java.lang.Number>>");
}

#[test]
fn parse_arrays_primitives_and_variables() {
	assert_eq!(Type::parse("int[][]").expect("parses"), Type::array(Type::array(Type::Primitive(Primitive::Int))));
	assert_eq!(Type::parse("T").expect("parses"), Type::variable("T"));
	assert_eq!(Type::parse("? super T").expect("parses"), Type::super_of(Type::variable("T")));
	assert_eq!(Type::parse("a.b.Outer$Inner").expect("parses"), Type::class("a.b.Outer$Inner"));
}

#[test]
fn parse_rejects_malformed_signatures() {
	for input in ["", "java.util.List<", "java..Lang", "java.util.List<java.lang.String>>", "a.b."] {
		let err = Type::parse(input).expect_err("signature should be rejected");
		assert!(matches!(err, RecallError::InvalidTypeSignature { .. }), "unexpected error for {input:?}: {err}");
	}
}

#[test]
fn erasure_drops_arguments_and_variables() {
	let ty = Type::array(Type::parameterized("java.util.List", vec![Type::variable("T")]));
	assert_eq!(ty.erasure(), Type::array(Type::class("java.util.List")));
	assert_eq!(Type::extends(Type::class("java.lang.Number")).erasure(), Type::class("java.lang.Number"));
	assert_eq!(Type::variable("E").erasure(), Type::object());
	assert!(ty.is_open());
	assert_eq!(ty.dimensions(), 1);
}

#[test]
fn serde_uses_signature_strings() {
	let ty: Type = serde_json::from_str("\"java.util.Set<java.lang.Integer>\"").expect("type deserializes");
	assert_eq!(ty, Type::parameterized("java.util.Set", vec![Type::class("java.lang.Integer")]));
	assert_eq!(serde_json::to_string(&ty).expect("type serializes"), "\"java.util.Set<java.lang.Integer>\"");
}
