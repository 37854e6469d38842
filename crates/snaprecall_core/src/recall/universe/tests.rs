use crate::recall::{ClassCategory, ClassInfo, FieldInfo, Primitive, RecallError, Type, TypeUniverse, Visibility};

fn ty(signature: &str) -> Type {
	Type::parse(signature).expect("signature parses")
}

#[test]
fn generic_assignability_is_invariant_unless_wildcarded() {
	let universe = TypeUniverse::builtin();
	let strings = ty("java.util.ArrayList<java.lang.String>");

	assert!(universe.is_assignable(&strings, &ty("java.util.List<java.lang.String>")));
	assert!(universe.is_assignable(&strings, &ty("java.util.Collection<java.lang.String>")));
	assert!(universe.is_assignable(&strings, &ty("java.util.List<? extends java.lang.CharSequence>")));
	assert!(!universe.is_assignable(&strings, &ty("java.util.List<java.lang.Object>")));
	assert!(universe.is_assignable(&ty("java.util.ArrayList"), &ty("java.util.List<java.lang.String>")));
	assert!(!universe.is_assignable(&strings, &ty("java.util.Set<java.lang.String>")));
}

#[test]
fn primitive_and_array_assignability() {
	let universe = TypeUniverse::builtin();

	assert!(universe.is_assignable(&Type::Primitive(Primitive::Int), &ty("java.lang.Integer")));
	assert!(universe.is_assignable(&Type::Primitive(Primitive::Int), &Type::object()));
	assert!(universe.is_assignable(&ty("java.lang.Long"), &Type::Primitive(Primitive::Long)));
	assert!(universe.is_assignable(&ty("int[]"), &Type::object()));
	assert!(!universe.is_assignable(&ty("int[]"), &ty("long[]")));
	assert!(universe.is_assignable(&ty("java.lang.String[]"), &ty("java.lang.Object[]")));
	assert!(!universe.is_assignable(&ty("java.lang.Object[]"), &ty("java.lang.String[]")));
}

#[test]
fn common_supertype_prefers_classes_then_single_interface() {
	let universe = TypeUniverse::builtin();

	assert_eq!(universe.common_supertype(&[ty("java.lang.Integer"), ty("java.lang.Long")]), ty("java.lang.Number"));
	assert_eq!(universe.common_supertype(&[ty("java.util.ArrayList"), ty("java.util.LinkedList")]), ty("java.util.List"));
	assert_eq!(universe.common_supertype(&[ty("java.util.HashSet"), ty("java.util.TreeSet")]), ty("java.util.Set"));
	assert_eq!(universe.common_supertype(&[ty("java.lang.String"), ty("java.lang.Integer")]), Type::object());
	assert_eq!(universe.common_supertype(&[ty("java.lang.String"), ty("java.lang.String")]), Type::string());
	assert_eq!(universe.common_supertype(&[]), Type::object());
}

#[test]
fn hidden_decorators_resolve_to_visible_interface() {
	let universe = TypeUniverse::builtin();
	let decorated = ty("java.util.Collections$UnmodifiableList<java.lang.String>");

	assert!(!universe.is_type_visible(&decorated, "com.example"));
	assert_eq!(universe.visible_supertype(&decorated, "com.example"), ty("java.util.List<java.lang.String>"));
	assert_eq!(universe.visible_supertype(&ty("com.example.Foo$1"), "com.example"), Type::object());
	assert_eq!(
		universe.visible_supertype(&ty("java.util.Collections$UnmodifiableMap[]"), "com.example"),
		ty("java.util.Map[]")
	);
}

#[test]
fn package_private_classes_are_visible_inside_their_package() {
	let mut universe = TypeUniverse::builtin();
	universe.insert(ClassInfo::new("com.example.Internal").visibility(Visibility::Package));
	universe.insert(ClassInfo::new("com.example.Outer$Nested"));
	universe.insert(ClassInfo::new("com.example.Outer").visibility(Visibility::Private));

	assert!(universe.is_class_visible("com.example.Internal", "com.example"));
	assert!(!universe.is_class_visible("com.example.Internal", "com.other"));
	assert!(!universe.is_class_visible("com.example.Outer$Nested", "com.example"));
	assert!(universe.is_class_visible("com.example.Unknown", "com.other"));
}

#[test]
fn collection_kind_follows_supertypes() {
	let universe = TypeUniverse::builtin();

	assert_eq!(universe.collection_kind(&ty("java.util.ArrayList")), Some(ClassCategory::List));
	assert_eq!(universe.collection_kind(&ty("java.util.LinkedHashSet")), Some(ClassCategory::Set));
	assert_eq!(universe.collection_kind(&ty("java.util.Collections$UnmodifiableMap")), Some(ClassCategory::Map));
	assert_eq!(universe.collection_kind(&Type::string()), None);
	assert!(universe.is_literal_type(&ty("java.lang.Character")));
	assert!(universe.is_immutable_type(&ty("java.math.BigDecimal")));
}

#[test]
fn type_argument_views_through_supertypes() {
	let universe = TypeUniverse::builtin();
	let map = ty("java.util.LinkedHashMap<java.lang.String, java.lang.Integer>");

	assert_eq!(universe.type_argument(&map, "java.util.Map", 0), Some(Type::string()));
	assert_eq!(universe.type_argument(&map, "java.util.Map", 1), Some(ty("java.lang.Integer")));
	assert_eq!(universe.type_argument(&ty("java.util.HashMap"), "java.util.Map", 0), None);
}

#[test]
fn instance_fields_walk_superclass_chain() {
	let mut universe = TypeUniverse::builtin();
	universe.insert(ClassInfo::new("com.example.Base").field(FieldInfo::new("id", Type::Primitive(Primitive::Long))));
	universe.insert(
		ClassInfo::new("com.example.Child")
			.extends(ty("com.example.Base"))
			.field(FieldInfo::new("COUNT", Type::Primitive(Primitive::Int)).statik())
			.field(FieldInfo::new("name", Type::string())),
	);

	let fields: Vec<(&str, &str)> = universe
		.instance_fields("com.example.Child")
		.into_iter()
		.map(|(class, field)| (class.name.as_ref(), field.name.as_ref()))
		.collect();
	assert_eq!(fields, vec![("com.example.Base", "id"), ("com.example.Child", "name")]);

	let (declaring, _) = universe.field("com.example.Child", "id").expect("inherited field resolves");
	assert_eq!(declaring.name.as_ref(), "com.example.Base");
	let err = universe.field("com.example.Child", "missing").expect_err("unknown field");
	assert!(matches!(err, RecallError::UnknownField { .. }));
}
