use serde::Serialize;

use crate::recall::Type;
use crate::recall::templates;

/// Generated expression with the statements that must run before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Computation {
	/// Expression text.
	pub value: String,
	/// Static type of the expression, when known.
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub ty: Option<Type>,
	/// Whether `value` already names a local variable.
	pub stored: bool,
	/// Statements preceding the expression, in execution order.
	pub statements: Vec<String>,
}

impl Computation {
	/// Inline expression without preceding statements.
	pub fn expression(value: impl Into<String>, ty: Option<Type>) -> Self {
		Self {
			value: value.into(),
			ty,
			stored: false,
			statements: Vec::new(),
		}
	}

	/// Reference to an existing local.
	pub fn stored(name: impl Into<String>, ty: Option<Type>) -> Self {
		Self {
			value: name.into(),
			ty,
			stored: true,
			statements: Vec::new(),
		}
	}

	/// Append statements after the ones already carried.
	pub fn with_statements(mut self, statements: Vec<String>) -> Self {
		self.statements.extend(statements);
		self
	}

	/// Put `statements` in front of the carried ones.
	pub fn prepend(&mut self, statements: Vec<String>) {
		if statements.is_empty() {
			return;
		}
		let carried = std::mem::replace(&mut self.statements, statements);
		self.statements.extend(carried);
	}

	/// Move the carried statements out, leaving the bare expression.
	pub fn take_statements(&mut self) -> Vec<String> {
		std::mem::take(&mut self.statements)
	}

	/// Bind the expression to local `name` of source type `ty_name` unless it already is a local.
	pub fn bind(mut self, ty_name: &str, name: &str) -> Self {
		if self.stored {
			return self;
		}
		self.statements.push(templates::assign_local(ty_name, name, &self.value));
		self.value = name.to_owned();
		self.stored = true;
		self
	}
}
