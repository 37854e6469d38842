//! Executes generated setup statements against a fresh heap.
//!
//! Covers the statement shapes the setup generator emits: local declarations,
//! field and element stores, collection population, setters and the runtime
//! helpers of `snaprecall.runtime`. Decorator factories produce the same runtime
//! classes the JDK returns.

use std::collections::HashMap;

use snaprecall::recall::{ClassCategory, ClassKind, Heap, LiveValue, ObjectBody, ObjectId, Primitive, Type, TypeUniverse};

#[derive(Debug, Clone)]
enum Value {
	Live(LiveValue),
	Class(String),
}

/// Interpreter state: the heap being built and the locals declared so far.
pub struct Replay<'u> {
	universe: &'u TypeUniverse,
	package: String,
	imports: HashMap<String, String>,
	heap: Heap,
	locals: HashMap<String, Value>,
	constants: HashMap<(String, String), ObjectId>,
}

impl<'u> Replay<'u> {
	pub fn new(universe: &'u TypeUniverse, package: &str, imports: &[String]) -> Self {
		let imports = imports
			.iter()
			.map(|qualified| (qualified.rsplit('.').next().unwrap_or(qualified).to_owned(), qualified.clone()))
			.collect();
		Self {
			universe,
			package: package.to_owned(),
			imports,
			heap: Heap::new(),
			locals: HashMap::new(),
			constants: HashMap::new(),
		}
	}

	/// Execute `statements` in order.
	pub fn run(&mut self, statements: &[String]) -> Result<(), String> {
		for statement in statements {
			self.statement(statement).map_err(|err| format!("`{statement}`: {err}"))?;
		}
		Ok(())
	}

	/// Evaluate the expression a computation hands out.
	pub fn value(&mut self, expression: &str) -> Result<LiveValue, String> {
		let value = self.eval(expression).map_err(|err| format!("`{expression}`: {err}"))?;
		self.live(value)
	}

	pub fn heap(&self) -> &Heap {
		&self.heap
	}

	fn statement(&mut self, text: &str) -> Result<(), String> {
		let text = text.trim().strip_suffix(';').ok_or("statement does not end with `;`")?;
		match split_assignment(text) {
			Some((target, expression)) => {
				let value = self.eval(expression)?;
				self.assign(target.trim(), value)
			}
			None => self.eval(text).map(drop),
		}
	}

	fn assign(&mut self, target: &str, value: Value) -> Result<(), String> {
		if let Some((_, name)) = target.rsplit_once(' ') {
			self.locals.insert(name.to_owned(), value);
			return Ok(());
		}
		if let Some(indexed) = target.strip_suffix(']') {
			let (array, index) = indexed.split_once('[').ok_or("malformed element store")?;
			let index: usize = index.parse().map_err(|_| format!("bad index {index}"))?;
			let id = self.local_object(array)?;
			let value = self.live(value)?;
			return match self.object_body(id)? {
				ObjectBody::Elements { elements } if index < elements.len() => {
					elements[index] = value;
					Ok(())
				}
				_ => Err(format!("{array}[{index}] is out of bounds")),
			};
		}
		let (owner, field) = target.rsplit_once('.').ok_or_else(|| format!("cannot assign to {target}"))?;
		let value = self.live(value)?;
		if self.locals.contains_key(owner) {
			let id = self.local_object(owner)?;
			return self.heap.set_field(id, field, value).map_err(|err| err.to_string());
		}
		let segments: Vec<&str> = owner.split('.').collect();
		let class = self.resolve(&segments).ok_or_else(|| format!("unknown class {owner}"))?;
		self.heap.set_static(&class, field, value);
		Ok(())
	}

	fn eval(&mut self, text: &str) -> Result<Value, String> {
		let mut cursor = Cursor::new(text);
		let value = self.expression(&mut cursor)?;
		cursor.skip_ws();
		if !cursor.at_end() {
			return Err(format!("trailing input at {}", cursor.rest()));
		}
		Ok(value)
	}

	fn expression(&mut self, cursor: &mut Cursor) -> Result<Value, String> {
		let mut value = self.primary(cursor)?;
		loop {
			cursor.skip_ws();
			if !cursor.eat(".") {
				return Ok(value);
			}
			let method = cursor.ident().ok_or("expected a method name")?;
			cursor.skip_ws();
			if cursor.peek() != Some('(') {
				return Err(format!("field read .{method} is not supported"));
			}
			let args = self.arguments(cursor)?;
			value = self.invoke(value, &method, args)?;
		}
	}

	fn primary(&mut self, cursor: &mut Cursor) -> Result<Value, String> {
		cursor.skip_ws();
		match cursor.peek() {
			Some('"') => cursor.string().map(|text| Value::Live(LiveValue::Str(text))),
			Some('\'') => cursor.character().map(|ch| Value::Live(LiveValue::Char(ch))),
			Some(ch) if ch.is_ascii_digit() || ch == '-' => cursor.number().map(Value::Live),
			Some('(') => {
				let target = cursor.parenthesized()?;
				let value = self.expression(cursor)?;
				Ok(cast(target.trim(), value))
			}
			Some(_) => {
				let first = cursor.ident().ok_or_else(|| format!("unexpected input at {}", cursor.rest()))?;
				match first.as_str() {
					"new" => self.creation(cursor),
					"null" => Ok(Value::Live(LiveValue::Null)),
					"true" => Ok(Value::Live(LiveValue::Bool(true))),
					"false" => Ok(Value::Live(LiveValue::Bool(false))),
					_ => self.path(first, cursor),
				}
			}
			None => Err("missing expression".to_owned()),
		}
	}

	fn path(&mut self, first: String, cursor: &mut Cursor) -> Result<Value, String> {
		let mut segments = vec![first];
		while cursor.peek() == Some('.') && cursor.peek_at(1).is_some_and(is_ident_char) {
			cursor.bump();
			segments.push(cursor.ident().ok_or("expected an identifier")?);
		}
		cursor.skip_ws();
		let call = cursor.peek() == Some('(');
		let method = if call { segments.pop() } else { None };

		if segments.is_empty() {
			let method = method.ok_or("empty path")?;
			let args = self.arguments(cursor)?;
			return self.function(&method, args);
		}
		if let Some(local) = self.locals.get(&segments[0]).cloned() {
			if segments.len() > 1 {
				return Err(format!("field read {} is not supported", segments.join(".")));
			}
			return match method {
				Some(method) => {
					let args = self.arguments(cursor)?;
					self.invoke(local, &method, args)
				}
				None => Ok(local),
			};
		}

		let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
		let (class, rest) = (1..=refs.len())
			.rev()
			.find_map(|split| self.resolve(&refs[..split]).map(|class| (class, &refs[split..])))
			.ok_or_else(|| format!("unknown name {}", segments.join(".")))?;
		match (method, rest) {
			(Some(method), []) => {
				let args = self.arguments(cursor)?;
				self.static_call(&class, &method, args)
			}
			(None, ["class"]) => Ok(Value::Class(class)),
			(None, [constant]) => self.constant(&class, constant),
			_ => Err(format!("unsupported path {}", segments.join("."))),
		}
	}

	fn creation(&mut self, cursor: &mut Cursor) -> Result<Value, String> {
		cursor.skip_ws();
		let spelled = cursor.type_name();
		let raw = spelled.split('<').next().unwrap_or(&spelled).trim().to_owned();
		cursor.skip_ws();
		if cursor.eat("[") {
			let length: usize = cursor.take_while(|ch| ch.is_ascii_digit()).parse().map_err(|_| "bad array length")?;
			if !cursor.eat("]") {
				return Err("unterminated array length".to_owned());
			}
			let mut dimensions = 1;
			while cursor.eat("[]") {
				dimensions += 1;
			}
			let base = match Primitive::from_name(&raw) {
				Some(_) => raw,
				None => {
					let segments: Vec<&str> = raw.split('.').collect();
					self.resolve(&segments).ok_or_else(|| format!("unknown class {raw}"))?
				}
			};
			let ty = Type::parse(&format!("{base}{}", "[]".repeat(dimensions))).map_err(|err| err.to_string())?;
			let component = ty.component().cloned().ok_or("array without component")?;
			let elements = vec![default_value(&component); length];
			let id = self.heap.alloc(ty, ObjectBody::Elements { elements });
			return Ok(Value::Live(LiveValue::Ref(id)));
		}
		let args = self.arguments(cursor)?;
		let segments: Vec<&str> = raw.split('.').collect();
		let class = self.resolve(&segments).ok_or_else(|| format!("unknown class {raw}"))?;
		self.construct(&class, args)
	}

	fn construct(&mut self, class: &str, args: Vec<Value>) -> Result<Value, String> {
		let universe = self.universe;
		let info = universe.class(class).ok_or_else(|| format!("{class} is not known"))?;
		let ty = Type::class(class);
		let body = match universe.collection_kind(&ty) {
			Some(ClassCategory::List | ClassCategory::Set) if args.is_empty() => ObjectBody::Elements { elements: Vec::new() },
			Some(ClassCategory::Map) if args.is_empty() => ObjectBody::Entries { entries: Vec::new() },
			_ if info.category == ClassCategory::Immutable => match args.as_slice() {
				[Value::Live(LiveValue::Str(repr))] => ObjectBody::Immutable { repr: repr.clone() },
				_ => return Err(format!("{class} is built from its textual form")),
			},
			_ => {
				let ctor = info
					.constructors
					.iter()
					.find(|ctor| ctor.params.len() == args.len())
					.ok_or_else(|| format!("{class} has no constructor taking {} arguments", args.len()))?;
				let links: Vec<_> = ctor.params.iter().map(|param| param.field.clone()).collect();
				let mut fields = std::collections::BTreeMap::new();
				for (link, arg) in links.into_iter().zip(args) {
					let value = self.live(arg)?;
					if let Some(field) = link {
						fields.insert(field.to_string(), value);
					}
				}
				ObjectBody::Fields { fields }
			}
		};
		Ok(Value::Live(LiveValue::Ref(self.heap.alloc(ty, body))))
	}

	fn invoke(&mut self, receiver: Value, method: &str, args: Vec<Value>) -> Result<Value, String> {
		if method == "value" && args.is_empty() {
			return Ok(receiver);
		}
		let Value::Live(LiveValue::Ref(id)) = receiver else {
			return Err(format!("{method} called on a non-object"));
		};
		let mut args = args.into_iter().map(|arg| self.live(arg)).collect::<Result<Vec<_>, _>>()?;
		match (method, args.len()) {
			("add", 1) => match self.object_body(id)? {
				ObjectBody::Elements { elements } => {
					elements.extend(args);
					Ok(Value::Live(LiveValue::Bool(true)))
				}
				other => Err(format!("add on a {} body", other.kind())),
			},
			("put", 2) => {
				let value = args.pop().unwrap_or(LiveValue::Null);
				let key = args.pop().unwrap_or(LiveValue::Null);
				match self.object_body(id)? {
					ObjectBody::Entries { entries } => {
						entries.push((key, value));
						Ok(Value::Live(LiveValue::Null))
					}
					other => Err(format!("put on a {} body", other.kind())),
				}
			}
			("setField", 2) => {
				let value = args.pop().unwrap_or(LiveValue::Null);
				let LiveValue::Str(field) = &args[0] else {
					return Err("setField expects a field name".to_owned());
				};
				self.heap.set_field(id, field, value).map_err(|err| err.to_string())?;
				Ok(Value::Live(LiveValue::Null))
			}
			(setter, 1) => {
				let class = self.heap.get(id).map_err(|err| err.to_string())?.class.erasure();
				let name = class.base_name().ok_or("receiver without class")?.to_owned();
				let field = self
					.universe
					.setters(&name)
					.into_iter()
					.find(|(_, info)| &*info.name == setter)
					.map(|(_, info)| info.field.to_string())
					.ok_or_else(|| format!("{name} has no method {setter}"))?;
				let value = args.pop().unwrap_or(LiveValue::Null);
				self.heap.set_field(id, &field, value).map_err(|err| err.to_string())?;
				Ok(Value::Live(LiveValue::Null))
			}
			_ => Err(format!("unsupported call {method}")),
		}
	}

	fn function(&mut self, name: &str, args: Vec<Value>) -> Result<Value, String> {
		match (name, args.as_slice()) {
			("clazz", [Value::Live(LiveValue::Str(binary))]) => Ok(Value::Class(binary.clone())),
			_ => Err(format!("unsupported function {name}")),
		}
	}

	fn static_call(&mut self, class: &str, method: &str, args: Vec<Value>) -> Result<Value, String> {
		let simple = class.rsplit('.').next().unwrap_or(class);
		match (simple, method) {
			("GenericObject", "newInstance" | "forward") => match args.as_slice() {
				[Value::Class(target)] => Ok(Value::Live(LiveValue::Ref(self.heap.alloc(Type::class(target), ObjectBody::fields())))),
				_ => Err(format!("{method} expects a class")),
			},
			("GenericObject", "setField") => {
				let mut args = args.into_iter();
				let (Some(target), Some(Value::Live(LiveValue::Str(field))), Some(value)) = (args.next(), args.next(), args.next()) else {
					return Err("setField expects a target, a field name and a value".to_owned());
				};
				let value = self.live(value)?;
				match target {
					Value::Class(owner) => {
						self.heap.set_static(&owner, &field, value);
						Ok(Value::Live(LiveValue::Null))
					}
					Value::Live(LiveValue::Ref(id)) => {
						self.heap.set_field(id, &field, value).map_err(|err| err.to_string())?;
						Ok(Value::Live(LiveValue::Null))
					}
					Value::Live(_) => Err("setField on a non-object".to_owned()),
				}
			}
			("Wrapped", "enumType") => match args.as_slice() {
				[Value::Class(owner), Value::Live(LiveValue::Str(name))] => {
					let owner = owner.clone();
					let name = name.clone();
					self.constant(&owner, &name)
				}
				_ => Err("enumType expects a class and a constant name".to_owned()),
			},
			("Collections", factory) => self.decorate(factory, args),
			("Arrays", "asList") => {
				let elements = args.into_iter().map(|arg| self.live(arg)).collect::<Result<Vec<_>, _>>()?;
				let id = self.heap.alloc(Type::class("java.util.Arrays$ArrayList"), ObjectBody::Elements { elements });
				Ok(Value::Live(LiveValue::Ref(id)))
			}
			(_, "valueOf") => match args.as_slice() {
				[Value::Live(literal)] => {
					let repr = match literal {
						LiveValue::Long(n) => n.to_string(),
						LiveValue::Int(n) => n.to_string(),
						LiveValue::Double(n) => n.to_string(),
						LiveValue::Str(text) => text.clone(),
						other => return Err(format!("valueOf({other:?}) is not supported")),
					};
					Ok(Value::Live(LiveValue::Ref(self.heap.alloc(Type::class(class), ObjectBody::Immutable { repr }))))
				}
				_ => Err("valueOf expects one literal".to_owned()),
			},
			_ => Err(format!("unsupported static call {class}.{method}")),
		}
	}

	fn decorate(&mut self, factory: &str, args: Vec<Value>) -> Result<Value, String> {
		let mut args = args.into_iter().map(|arg| self.live(arg)).collect::<Result<Vec<_>, _>>()?;
		let (class, body) = match factory {
			"emptyList" | "emptySet" => (format!("java.util.Collections$Empty{}", &factory[5..]), ObjectBody::Elements { elements: Vec::new() }),
			"emptyMap" => ("java.util.Collections$EmptyMap".to_owned(), ObjectBody::Entries { entries: Vec::new() }),
			"singletonList" => ("java.util.Collections$SingletonList".to_owned(), ObjectBody::Elements { elements: args }),
			"singleton" => ("java.util.Collections$SingletonSet".to_owned(), ObjectBody::Elements { elements: args }),
			"singletonMap" => {
				let value = args.pop().unwrap_or(LiveValue::Null);
				let key = args.pop().unwrap_or(LiveValue::Null);
				("java.util.Collections$SingletonMap".to_owned(), ObjectBody::Entries { entries: vec![(key, value)] })
			}
			_ => {
				let (family, shape) = ["unmodifiable", "synchronized", "checked"]
					.into_iter()
					.find_map(|family| factory.strip_prefix(family).map(|shape| (family, shape)))
					.ok_or_else(|| format!("unsupported factory Collections.{factory}"))?;
				let inner = args.first().and_then(LiveValue::object).ok_or("decorator without a backing collection")?;
				let inner = self.heap.get(inner).map_err(|err| err.to_string())?;
				let random_access = shape == "List" && self.universe.is_assignable(&inner.class, &Type::class("java.util.RandomAccess"));
				let mut family = family.to_owned();
				family[..1].make_ascii_uppercase();
				let prefix = if random_access { "RandomAccess" } else { "" };
				(format!("java.util.Collections${family}{prefix}{shape}"), inner.body.clone())
			}
		};
		Ok(Value::Live(LiveValue::Ref(self.heap.alloc(Type::class(&class), body))))
	}

	fn constant(&mut self, class: &str, name: &str) -> Result<Value, String> {
		match (class, name) {
			("java.lang.Float", "NaN") => return Ok(Value::Live(LiveValue::Float(f32::NAN))),
			("java.lang.Float", "POSITIVE_INFINITY") => return Ok(Value::Live(LiveValue::Float(f32::INFINITY))),
			("java.lang.Float", "NEGATIVE_INFINITY") => return Ok(Value::Live(LiveValue::Float(f32::NEG_INFINITY))),
			("java.lang.Double", "NaN") => return Ok(Value::Live(LiveValue::Double(f64::NAN))),
			("java.lang.Double", "POSITIVE_INFINITY") => return Ok(Value::Live(LiveValue::Double(f64::INFINITY))),
			("java.lang.Double", "NEGATIVE_INFINITY") => return Ok(Value::Live(LiveValue::Double(f64::NEG_INFINITY))),
			_ => {}
		}
		let info = self.universe.class(class).ok_or_else(|| format!("{class} is not known"))?;
		if info.kind != ClassKind::Enum || !info.enum_constants.iter().any(|constant| &**constant == name) {
			return Err(format!("{class}.{name} is not an enum constant"));
		}
		let key = (class.to_owned(), name.to_owned());
		let id = match self.constants.get(&key) {
			Some(id) => *id,
			None => {
				let id = self.heap.alloc(Type::class(class), ObjectBody::Constant { name: name.to_owned() });
				self.constants.insert(key, id);
				id
			}
		};
		Ok(Value::Live(LiveValue::Ref(id)))
	}

	fn arguments(&mut self, cursor: &mut Cursor) -> Result<Vec<Value>, String> {
		if !cursor.eat("(") {
			return Err("expected `(`".to_owned());
		}
		let mut args = Vec::new();
		cursor.skip_ws();
		if cursor.eat(")") {
			return Ok(args);
		}
		loop {
			args.push(self.expression(cursor)?);
			cursor.skip_ws();
			if cursor.eat(")") {
				return Ok(args);
			}
			if !cursor.eat(",") {
				return Err(format!("expected `,` at {}", cursor.rest()));
			}
		}
	}

	/// Binary name for a spelled class name, checked against the universe and the imports.
	fn resolve(&self, segments: &[&str]) -> Option<String> {
		let (head, nested) = segments.split_first()?;
		let known = |name: &String| self.universe.class(name).is_some() || self.imports.values().any(|import| import == name);
		let outer = self
			.imports
			.get(*head)
			.cloned()
			.into_iter()
			.chain([format!("{}.{head}", self.package), format!("java.lang.{head}")])
			.find(|name| known(name));
		let simple = outer.map(|outer| nested.iter().fold(outer, |name, inner| format!("{name}${inner}")));
		if let Some(name) = simple.filter(|name| known(name)) {
			return Some(name);
		}
		let qualified = segments.join(".");
		Some(qualified).filter(|name| self.universe.class(name).is_some())
	}

	fn local_object(&self, name: &str) -> Result<ObjectId, String> {
		match self.locals.get(name) {
			Some(Value::Live(LiveValue::Ref(id))) => Ok(*id),
			Some(_) => Err(format!("{name} does not hold an object")),
			None => Err(format!("{name} is not declared")),
		}
	}

	fn object_body(&mut self, id: ObjectId) -> Result<&mut ObjectBody, String> {
		Ok(&mut self.heap.get_mut(id).map_err(|err| err.to_string())?.body)
	}

	fn live(&mut self, value: Value) -> Result<LiveValue, String> {
		match value {
			Value::Live(live) => Ok(live),
			Value::Class(name) => {
				let id = self.heap.alloc(Type::class("java.lang.Class"), ObjectBody::Immutable { repr: name });
				Ok(LiveValue::Ref(id))
			}
		}
	}
}

fn cast(target: &str, value: Value) -> Value {
	match (target, value) {
		("byte", Value::Live(LiveValue::Int(n))) => Value::Live(LiveValue::Byte(n as i8)),
		("short", Value::Live(LiveValue::Int(n))) => Value::Live(LiveValue::Short(n as i16)),
		(_, value) => value,
	}
}

fn default_value(ty: &Type) -> LiveValue {
	match ty {
		Type::Primitive(Primitive::Boolean) => LiveValue::Bool(false),
		Type::Primitive(Primitive::Byte) => LiveValue::Byte(0),
		Type::Primitive(Primitive::Short) => LiveValue::Short(0),
		Type::Primitive(Primitive::Int) => LiveValue::Int(0),
		Type::Primitive(Primitive::Long) => LiveValue::Long(0),
		Type::Primitive(Primitive::Float) => LiveValue::Float(0.0),
		Type::Primitive(Primitive::Double) => LiveValue::Double(0.0),
		Type::Primitive(Primitive::Char) => LiveValue::Char('\0'),
		_ => LiveValue::Null,
	}
}

/// Splits `target = value` at the first top-level `=`.
fn split_assignment(text: &str) -> Option<(&str, &str)> {
	let mut depth = 0usize;
	let mut quote = None;
	let mut escaped = false;
	for (idx, ch) in text.char_indices() {
		if let Some(open) = quote {
			if escaped {
				escaped = false;
			} else if ch == '\\' {
				escaped = true;
			} else if ch == open {
				quote = None;
			}
			continue;
		}
		match ch {
			'"' | '\'' => quote = Some(ch),
			'(' => depth += 1,
			')' => depth = depth.saturating_sub(1),
			'=' if depth == 0 && text[idx + 1..].starts_with(' ') => return Some((&text[..idx], &text[idx + 1..])),
			_ => {}
		}
	}
	None
}

fn is_ident_char(ch: char) -> bool {
	ch.is_alphanumeric() || ch == '_' || ch == '$'
}

struct Cursor {
	chars: Vec<char>,
	pos: usize,
}

impl Cursor {
	fn new(text: &str) -> Self {
		Self {
			chars: text.chars().collect(),
			pos: 0,
		}
	}

	fn peek(&self) -> Option<char> {
		self.chars.get(self.pos).copied()
	}

	fn peek_at(&self, offset: usize) -> Option<char> {
		self.chars.get(self.pos + offset).copied()
	}

	fn bump(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.pos += 1;
		Some(ch)
	}

	fn at_end(&self) -> bool {
		self.pos >= self.chars.len()
	}

	fn rest(&self) -> String {
		self.chars[self.pos.min(self.chars.len())..].iter().collect()
	}

	fn skip_ws(&mut self) {
		while self.peek().is_some_and(char::is_whitespace) {
			self.pos += 1;
		}
	}

	fn eat(&mut self, token: &str) -> bool {
		let len = token.chars().count();
		if self.pos + len <= self.chars.len() && self.chars[self.pos..self.pos + len].iter().copied().eq(token.chars()) {
			self.pos += len;
			true
		} else {
			false
		}
	}

	fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
		let start = self.pos;
		while self.peek().is_some_and(&keep) {
			self.pos += 1;
		}
		self.chars[start..self.pos].iter().collect()
	}

	fn ident(&mut self) -> Option<String> {
		Some(self.take_while(is_ident_char)).filter(|ident| !ident.is_empty())
	}

	/// Type spelling up to the `(` or `[` that follows it, generic arguments included.
	fn type_name(&mut self) -> String {
		let mut depth = 0usize;
		let start = self.pos;
		while let Some(ch) = self.peek() {
			match ch {
				'<' => depth += 1,
				'>' => depth = depth.saturating_sub(1),
				'(' | '[' if depth == 0 => break,
				_ => {}
			}
			self.pos += 1;
		}
		self.chars[start..self.pos].iter().collect()
	}

	/// Content of a balanced parenthesized group.
	fn parenthesized(&mut self) -> Result<String, String> {
		self.bump();
		let start = self.pos;
		let mut depth = 1usize;
		while let Some(ch) = self.bump() {
			match ch {
				'(' => depth += 1,
				')' => {
					depth -= 1;
					if depth == 0 {
						return Ok(self.chars[start..self.pos - 1].iter().collect());
					}
				}
				_ => {}
			}
		}
		Err("unbalanced parentheses".to_owned())
	}

	fn escape(&mut self) -> Result<u16, String> {
		match self.bump() {
			Some('n') => Ok(u16::from(b'\n')),
			Some('r') => Ok(u16::from(b'\r')),
			Some('t') => Ok(u16::from(b'\t')),
			Some('u') => {
				let hex: String = (0..4).filter_map(|_| self.bump()).collect();
				u16::from_str_radix(&hex, 16).map_err(|_| format!("bad unicode escape {hex}"))
			}
			Some(ch @ ('\\' | '\'' | '"')) => Ok(ch as u16),
			other => Err(format!("unknown escape {other:?}")),
		}
	}

	fn units(&mut self, close: char) -> Result<Vec<u16>, String> {
		self.bump();
		let mut units = Vec::new();
		loop {
			match self.bump() {
				Some(ch) if ch == close => return Ok(units),
				Some('\\') => units.push(self.escape()?),
				Some(ch) => {
					let mut buf = [0u16; 2];
					units.extend_from_slice(ch.encode_utf16(&mut buf));
				}
				None => return Err("unterminated literal".to_owned()),
			}
		}
	}

	fn string(&mut self) -> Result<String, String> {
		let units = self.units('"')?;
		String::from_utf16(&units).map_err(|err| err.to_string())
	}

	fn character(&mut self) -> Result<char, String> {
		let units = self.units('\'')?;
		char::decode_utf16(units)
			.next()
			.and_then(|unit| unit.ok())
			.ok_or_else(|| "bad char literal".to_owned())
	}

	fn number(&mut self) -> Result<LiveValue, String> {
		let mut text = String::new();
		if self.eat("-") {
			text.push('-');
		}
		text.push_str(&self.take_while(|ch| ch.is_ascii_digit() || ch == '.'));
		if matches!(self.peek(), Some('e' | 'E')) {
			text.push('e');
			self.bump();
			if let Some(sign @ ('+' | '-')) = self.peek() {
				text.push(sign);
				self.bump();
			}
			text.push_str(&self.take_while(|ch| ch.is_ascii_digit()));
		}
		let bad = |_| format!("bad number {text}");
		match self.peek() {
			Some('L' | 'l') => {
				self.bump();
				text.parse().map(LiveValue::Long).map_err(bad)
			}
			Some('f' | 'F') => {
				self.bump();
				text.parse().map(LiveValue::Float).map_err(|_| format!("bad float {text}"))
			}
			Some('d' | 'D') => {
				self.bump();
				text.parse().map(LiveValue::Double).map_err(|_| format!("bad double {text}"))
			}
			_ if text.contains(['.', 'e']) => text.parse().map(LiveValue::Double).map_err(|_| format!("bad double {text}")),
			_ => text.parse().map(LiveValue::Int).map_err(bad),
		}
	}
}
