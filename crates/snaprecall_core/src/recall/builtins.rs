use crate::recall::universe::{CLONEABLE, SERIALIZABLE};
use crate::recall::{ClassCategory, ClassInfo, ClassKind, ConstructorInfo, ParamInfo, Primitive, Type, Visibility};

fn generic(raw: &str, vars: &[&str]) -> Type {
	Type::parameterized(raw, vars.iter().map(|item| Type::variable(item)).collect())
}

fn comparable(name: &str) -> Type {
	Type::parameterized("java.lang.Comparable", vec![Type::class(name)])
}

fn boxed(primitive: Primitive) -> ClassInfo {
	let name = primitive.boxed();
	let base = ClassInfo::new(name).category(ClassCategory::Literal).implements(comparable(name)).implements(Type::class(SERIALIZABLE));
	match primitive {
		Primitive::Boolean | Primitive::Char => base,
		_ => base.extends(Type::class("java.lang.Number")),
	}
}

fn value_class(name: &str) -> ClassInfo {
	ClassInfo::new(name)
		.category(ClassCategory::Immutable)
		.extends(Type::class("java.lang.Number"))
		.implements(comparable(name))
		.constructor(ConstructorInfo::new(vec![ParamInfo::new(Type::string())]))
}

fn collection(name: &str, category: ClassCategory, supers: &[Type]) -> ClassInfo {
	let vars: &[&str] = if category == ClassCategory::Map { &["K", "V"] } else { &["E"] };
	let mut info = ClassInfo::interface(name).category(category).type_params(vars);
	for sup in supers {
		info = info.implements(sup.clone());
	}
	info
}

fn concrete(name: &str, vars: &[&str], supers: &[Type]) -> ClassInfo {
	let mut info = ClassInfo::new(name).type_params(vars).default_constructor();
	for sup in supers {
		info = info.implements(sup.clone());
	}
	info.implements(Type::class(CLONEABLE)).implements(Type::class(SERIALIZABLE))
}

/// Decorator classes nested in `java.util.Collections` and friends; none of them is nameable.
fn decorator(name: &str, vars: &[&str], visibility: Visibility, superclass: Option<Type>, supers: &[Type]) -> ClassInfo {
	let mut info = ClassInfo::new(name).type_params(vars).visibility(visibility);
	if let Some(superclass) = superclass {
		info = info.extends(superclass);
	}
	for sup in supers {
		info = info.implements(sup.clone());
	}
	info
}

fn functional(name: &str, vars: &[&str]) -> ClassInfo {
	ClassInfo::interface(name).type_params(vars).functional()
}

/// Classes of the standard runtime that generated code depends on.
pub(crate) fn builtin_classes() -> Vec<ClassInfo> {
	let list = generic("java.util.List", &["E"]);
	let set = generic("java.util.Set", &["E"]);
	let map = generic("java.util.Map", &["K", "V"]);
	let collection_e = generic("java.util.Collection", &["E"]);

	let mut out = vec![
		ClassInfo::new("java.lang.Object").default_constructor(),
		ClassInfo::interface(SERIALIZABLE),
		ClassInfo::interface(CLONEABLE),
		ClassInfo::interface("java.util.RandomAccess"),
		ClassInfo::interface("java.lang.CharSequence"),
		ClassInfo::interface("java.lang.Comparable").type_params(&["T"]),
		ClassInfo::interface("java.lang.Iterable").type_params(&["T"]),
		ClassInfo::new("java.lang.String")
			.category(ClassCategory::Literal)
			.implements(Type::class("java.lang.CharSequence"))
			.implements(comparable("java.lang.String"))
			.implements(Type::class(SERIALIZABLE)),
		ClassInfo::new("java.lang.Number").kind(ClassKind::Abstract).implements(Type::class(SERIALIZABLE)),
		ClassInfo::new("java.lang.Enum")
			.kind(ClassKind::Abstract)
			.type_params(&["E"])
			.implements(generic("java.lang.Comparable", &["E"]))
			.implements(Type::class(SERIALIZABLE)),
		ClassInfo::new("java.lang.Class")
			.type_params(&["T"])
			.category(ClassCategory::Immutable)
			.implements(Type::class(SERIALIZABLE)),
		value_class("java.math.BigInteger"),
		value_class("java.math.BigDecimal"),
		collection("java.util.Collection", ClassCategory::Plain, &[generic("java.lang.Iterable", &["E"])]),
		collection("java.util.List", ClassCategory::List, &[collection_e.clone()]),
		collection("java.util.Set", ClassCategory::Set, &[collection_e.clone()]),
		collection("java.util.SortedSet", ClassCategory::Set, &[set.clone()]),
		collection("java.util.NavigableSet", ClassCategory::Set, &[generic("java.util.SortedSet", &["E"])]),
		collection("java.util.Queue", ClassCategory::Plain, &[collection_e.clone()]),
		collection("java.util.Deque", ClassCategory::Plain, &[generic("java.util.Queue", &["E"])]),
		collection("java.util.Map", ClassCategory::Map, &[]),
		collection("java.util.SortedMap", ClassCategory::Map, &[map.clone()]),
		collection("java.util.NavigableMap", ClassCategory::Map, &[generic("java.util.SortedMap", &["K", "V"])]),
		concrete("java.util.ArrayList", &["E"], &[list.clone(), Type::class("java.util.RandomAccess")]),
		concrete("java.util.LinkedList", &["E"], &[list.clone(), generic("java.util.Deque", &["E"])]),
		concrete("java.util.HashSet", &["E"], &[set.clone()]),
		concrete("java.util.TreeSet", &["E"], &[generic("java.util.NavigableSet", &["E"])]),
		concrete("java.util.HashMap", &["K", "V"], &[map.clone()]),
		concrete("java.util.TreeMap", &["K", "V"], &[generic("java.util.NavigableMap", &["K", "V"])]),
		ClassInfo::new("java.util.LinkedHashSet")
			.type_params(&["E"])
			.default_constructor()
			.extends(generic("java.util.HashSet", &["E"]))
			.implements(set.clone()),
		ClassInfo::new("java.util.LinkedHashMap")
			.type_params(&["K", "V"])
			.default_constructor()
			.extends(generic("java.util.HashMap", &["K", "V"]))
			.implements(map.clone()),
		decorator("java.util.Arrays$ArrayList", &["E"], Visibility::Private, None, &[list.clone(), Type::class("java.util.RandomAccess")]),
		functional("java.lang.Runnable", &[]),
		functional("java.util.concurrent.Callable", &["V"]),
		functional("java.util.function.Function", &["T", "R"]),
		functional("java.util.function.BiFunction", &["T", "U", "R"]),
		functional("java.util.function.Supplier", &["T"]),
		functional("java.util.function.Consumer", &["T"]),
		functional("java.util.function.Predicate", &["T"]),
		functional("java.util.Comparator", &["T"]),
	];
	out.extend(Primitive::ALL.into_iter().filter(|item| *item != Primitive::Void).map(boxed));
	out.push(ClassInfo::new("java.util.Collections").default_constructor());
	out.extend(decorators(&list, &set, &map, &collection_e));
	out
}

fn decorators(list: &Type, set: &Type, map: &Type, collection: &Type) -> Vec<ClassInfo> {
	let mut out = Vec::new();
	for family in ["Unmodifiable", "Synchronized", "Checked"] {
		let base = format!("java.util.Collections${family}Collection");
		let base_ty = generic(&base, &["E"]);
		out.push(decorator(&base, &["E"], Visibility::Package, None, &[collection.clone(), Type::class(SERIALIZABLE)]));
		let list_name = format!("java.util.Collections${family}List");
		out.push(decorator(&list_name, &["E"], Visibility::Package, Some(base_ty.clone()), &[list.clone()]));
		out.push(decorator(
			&format!("java.util.Collections${family}RandomAccessList"),
			&["E"],
			Visibility::Package,
			Some(generic(&list_name, &["E"])),
			&[Type::class("java.util.RandomAccess")],
		));
		out.push(decorator(
			&format!("java.util.Collections${family}Set"),
			&["E"],
			Visibility::Package,
			Some(base_ty),
			&[set.clone()],
		));
		out.push(decorator(
			&format!("java.util.Collections${family}Map"),
			&["K", "V"],
			Visibility::Package,
			None,
			&[map.clone(), Type::class(SERIALIZABLE)],
		));
	}
	for (name, vars, sup) in [
		("java.util.Collections$EmptyList", &["E"][..], list),
		("java.util.Collections$EmptySet", &["E"][..], set),
		("java.util.Collections$EmptyMap", &["K", "V"][..], map),
		("java.util.Collections$SingletonList", &["E"][..], list),
		("java.util.Collections$SingletonSet", &["E"][..], set),
		("java.util.Collections$SingletonMap", &["K", "V"][..], map),
	] {
		out.push(decorator(name, vars, Visibility::Private, None, &[sup.clone(), Type::class(SERIALIZABLE)]));
	}
	out
}
