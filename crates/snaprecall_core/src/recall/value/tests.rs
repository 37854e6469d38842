use std::sync::Arc;

use crate::recall::{Literal, SerializedField, SerializedValue, Type, TypeUniverse, ValueGraph, ValueId, ValueNode};

fn ty(signature: &str) -> Type {
	Type::parse(signature).expect("signature parses")
}

fn node(ty: Type, value: SerializedValue) -> ValueNode {
	ValueNode {
		ty,
		used_types: Vec::new(),
		value,
	}
}

fn string(graph: &mut ValueGraph, text: &str) -> ValueId {
	graph.push(node(
		Type::string(),
		SerializedValue::Literal {
			value: Literal::Str(text.to_owned()),
		},
	))
}

fn empty_object(graph: &mut ValueGraph, class: &str) -> ValueId {
	graph.push(node(
		ty(class),
		SerializedValue::Object {
			fields: Vec::new(),
			lambda: None,
		},
	))
}

fn link(graph: &mut ValueGraph, from: ValueId, field: &str, to: ValueId) {
	let class = graph.get(from).expect("node exists").ty.clone();
	let SerializedValue::Object { fields, .. } = &mut graph.get_mut(from).expect("node exists").value else {
		panic!("expected object");
	};
	fields.push(SerializedField {
		declaring: class.clone(),
		name: Arc::from(field),
		ty: class,
		value: to,
		hints: Vec::new(),
	});
}

fn collection(graph: &mut ValueGraph, set: bool, elements: Vec<ValueId>) -> ValueId {
	let value = if set {
		SerializedValue::Set {
			component: Type::string(),
			elements,
		}
	} else {
		SerializedValue::List {
			component: Type::string(),
			elements,
		}
	};
	let runtime = if set { "java.util.HashSet" } else { "java.util.ArrayList" };
	graph.push(node(ty(runtime), value))
}

#[test]
fn cyclic_graphs_compare_by_bisimulation() {
	let mut left = ValueGraph::new();
	let a = empty_object(&mut left, "com.example.Node");
	link(&mut left, a, "next", a);

	let mut right = ValueGraph::new();
	let b = empty_object(&mut right, "com.example.Node");
	let c = empty_object(&mut right, "com.example.Node");
	link(&mut right, b, "next", c);
	link(&mut right, c, "next", b);

	assert!(left.structurally_equal(a, &right, b));
	assert_eq!(left.reachable(a).expect("reachable"), vec![a]);
	assert_eq!(right.reachable(b).expect("reachable"), vec![b, c]);
}

#[test]
fn sets_ignore_order_lists_do_not() {
	let mut graph = ValueGraph::new();
	let x = string(&mut graph, "x");
	let y = string(&mut graph, "y");
	let set_xy = collection(&mut graph, true, vec![x, y]);
	let set_yx = collection(&mut graph, true, vec![y, x]);
	let list_xy = collection(&mut graph, false, vec![x, y]);
	let list_yx = collection(&mut graph, false, vec![y, x]);

	assert!(graph.structurally_equal(set_xy, &graph, set_yx));
	assert!(!graph.structurally_equal(list_xy, &graph, list_yx));
	assert!(!graph.structurally_equal(set_xy, &graph, list_xy));
}

#[test]
fn display_type_picks_use_accepted_everywhere() {
	let universe = TypeUniverse::builtin();
	let mut graph = ValueGraph::new();
	let list = graph.push(node(
		ty("java.util.ArrayList<java.lang.String>"),
		SerializedValue::List {
			component: Type::string(),
			elements: Vec::new(),
		},
	));
	graph.use_as(list, &ty("java.util.Collection<java.lang.String>")).expect("use recorded");
	graph.use_as(list, &ty("java.util.List<java.lang.String>")).expect("use recorded");
	graph.use_as(list, &ty("java.util.List<java.lang.String>")).expect("use recorded");

	assert_eq!(graph.get(list).expect("node").used_types.len(), 2);
	assert_eq!(graph.display_type(list, &universe, "com.example").expect("display"), ty("java.util.List<java.lang.String>"));
}

#[test]
fn display_type_falls_back_to_visible_runtime_supertype() {
	let universe = TypeUniverse::builtin();
	let mut graph = ValueGraph::new();
	let hidden = graph.push(node(
		ty("java.util.Collections$UnmodifiableSet<java.lang.String>"),
		SerializedValue::Set {
			component: Type::string(),
			elements: Vec::new(),
		},
	));

	assert_eq!(graph.display_type(hidden, &universe, "com.example").expect("display"), ty("java.util.Set<java.lang.String>"));
}

#[test]
fn describe_names_value_shape() {
	let mut graph = ValueGraph::new();
	let text = string(&mut graph, "hi");
	let object = empty_object(&mut graph, "com.example.Node");

	assert_eq!(graph.describe(text), "Str(\"hi\")");
	assert_eq!(graph.describe(object), "object com.example.Node (value#1)");
	assert_eq!(graph.describe(ValueId(9)), "<missing value#9>");
}
