//! Source snippets of the generated code.

use crate::recall::Literal;

/// Reflective construction and field access helper.
pub const GENERIC_OBJECT: &str = "snaprecall.runtime.GenericObject";
/// Handle for instances of types generated code cannot name.
pub const WRAPPED: &str = "snaprecall.runtime.Wrapped";
/// Field-by-field matcher base class.
pub const GENERIC_MATCHER: &str = "snaprecall.runtime.GenericMatcher";
/// Late-bound matcher closing reference cycles.
pub const RECURSIVE_MATCHER: &str = "snaprecall.runtime.RecursiveMatcher";
/// Loader for values stored in generated resource files.
pub const FILE_SERIALIZER: &str = "snaprecall.runtime.FileSerializer";
/// Hamcrest matcher interface.
pub const MATCHER: &str = "org.hamcrest.Matcher";
/// Collection decorator factories.
pub const COLLECTIONS: &str = "java.util.Collections";
/// Array utilities.
pub const ARRAYS: &str = "java.util.Arrays";
/// Runtime class objects.
pub const CLASS: &str = "java.lang.Class";

/// Test method annotation.
pub const TEST_ANNOTATION: &str = "org.junit.Test";

/// Static helper resolving a class by binary name.
pub const CLAZZ: &str = "snaprecall.runtime.Types.clazz";
/// Static helper catching the exception thrown by a call.
pub const CATCH_EXCEPTION: &str = "snaprecall.runtime.Throwables.catchException";
/// Static assertion entry point.
pub const ASSERT_THAT: &str = "org.hamcrest.MatcherAssert.assertThat";

/// Static matcher factory `name` of the hamcrest core.
pub fn hamcrest(name: &str) -> String {
	format!("org.hamcrest.Matchers.{name}")
}

/// Static matcher factory `name` of the generated-code runtime.
pub fn runtime_matcher(name: &str) -> String {
	format!("snaprecall.runtime.Matchers.{name}")
}

/// Source literal for a captured scalar.
pub fn literal(value: &Literal) -> String {
	match value {
		Literal::Bool(item) => item.to_string(),
		Literal::Byte(item) => format!("(byte) {item}"),
		Literal::Short(item) => format!("(short) {item}"),
		Literal::Int(item) => item.to_string(),
		Literal::Long(item) => format!("{item}L"),
		Literal::Float(item) => special_float(f64::from(*item), "Float").unwrap_or_else(|| format!("{item:?}f")),
		Literal::Double(item) => special_float(*item, "Double").unwrap_or_else(|| format!("{item:?}")),
		Literal::Char(item) => char_literal(*item),
		Literal::Str(item) => string_literal(item),
	}
}

fn special_float(value: f64, class: &str) -> Option<String> {
	if value.is_nan() {
		return Some(format!("{class}.NaN"));
	}
	if value.is_infinite() {
		let sign = if value > 0.0 { "POSITIVE" } else { "NEGATIVE" };
		return Some(format!("{class}.{sign}_INFINITY"));
	}
	None
}

/// Quoted and escaped string literal.
pub fn string_literal(text: &str) -> String {
	let mut out = String::with_capacity(text.len() + 2);
	out.push('"');
	for ch in text.chars() {
		escape_into(&mut out, ch, '"');
	}
	out.push('"');
	out
}

/// Quoted and escaped char literal.
pub fn char_literal(ch: char) -> String {
	let mut out = String::from("'");
	escape_into(&mut out, ch, '\'');
	out.push('\'');
	out
}

fn escape_into(out: &mut String, ch: char, quote: char) {
	match ch {
		'\\' => out.push_str("\\\\"),
		'\n' => out.push_str("\\n"),
		'\r' => out.push_str("\\r"),
		'\t' => out.push_str("\\t"),
		c if c == quote => {
			out.push('\\');
			out.push(c);
		}
		c if (c as u32) < 0x20 || c as u32 == 0x7f => out.push_str(&format!("\\u{:04x}", c as u32)),
		c if (c as u32) > 0xffff => {
			let mut units = [0_u16; 2];
			for unit in c.encode_utf16(&mut units) {
				out.push_str(&format!("\\u{unit:04x}"));
			}
		}
		c => out.push(c),
	}
}

/// `type name = value;`
pub fn assign_local(ty: &str, name: &str, value: &str) -> String {
	format!("{ty} {name} = {value};")
}

/// `target.field = value;`
pub fn assign_field(target: &str, field: &str, value: &str) -> String {
	format!("{target}.{field} = {value};")
}

/// `target[index] = value;`
pub fn assign_element(target: &str, index: usize, value: &str) -> String {
	format!("{target}[{index}] = {value};")
}

/// `target.method(args)`
pub fn call(target: &str, method: &str, args: &[String]) -> String {
	format!("{target}.{method}({})", args.join(", "))
}

/// `function(args)`
pub fn call_function(function: &str, args: &[String]) -> String {
	format!("{function}({})", args.join(", "))
}

/// `new type(args)`
pub fn new_object(ty: &str, args: &[String]) -> String {
	format!("new {ty}({})", args.join(", "))
}

/// `expression;`
pub fn statement(expression: &str) -> String {
	format!("{expression};")
}

/// `(type) expression`
pub fn cast(ty: &str, expression: &str) -> String {
	format!("({ty}) {expression}")
}

/// Anonymous class body followed by a call on it.
pub fn anonymous_class(ty: &str, members: &[String], tail: &str) -> String {
	if members.is_empty() {
		return format!("new {ty}() {{\n}}{tail}");
	}
	let body: Vec<String> = members.iter().map(|member| indent(member)).collect();
	format!("new {ty}() {{\n{}\n}}{tail}", body.join("\n"))
}

/// Indent every line of `text` by one tab.
pub fn indent(text: &str) -> String {
	text.lines().map(|line| format!("\t{line}")).collect::<Vec<_>>().join("\n")
}
