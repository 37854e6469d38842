//! Captured state around one recorded invocation.

use serde::Serialize;

use crate::recall::classes::package_of;
use crate::recall::{CaptureOptions, CaptureSession, Capturer, GlobalRef, Heap, Invocation, InvocationState, LiveValue, Result, Type, TypeUniverse, ValueGraph, ValueId};

/// Captured value of a static field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalValue {
	/// Declaring class.
	pub class: String,
	/// Field name.
	pub field: String,
	/// Captured value.
	pub value: ValueId,
}

/// Setup and expect states of one invocation, captured into a single graph.
///
/// Objects left untouched by the call keep one value on both sides.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSnapshot {
	/// Class declaring the method.
	pub target: Type,
	/// Method name.
	pub method: String,
	/// Declared result type, absent for `void`.
	pub result_type: Option<Type>,
	/// Declared parameter types.
	pub arg_types: Vec<Type>,
	/// Every captured value.
	pub graph: ValueGraph,
	/// Receiver before the call.
	pub setup_this: Option<ValueId>,
	/// Arguments before the call.
	pub setup_args: Vec<ValueId>,
	/// Observed statics before the call.
	pub setup_globals: Vec<GlobalValue>,
	/// Receiver after the call.
	pub expect_this: Option<ValueId>,
	/// Arguments after the call.
	pub expect_args: Vec<ValueId>,
	/// Returned value.
	pub expect_result: Option<ValueId>,
	/// Thrown exception.
	pub expect_exception: Option<ValueId>,
	/// Observed statics after the call.
	pub expect_globals: Vec<GlobalValue>,
}

struct CapturedSide {
	this: Option<ValueId>,
	args: Vec<ValueId>,
	result: Option<ValueId>,
	exception: Option<ValueId>,
	globals: Vec<GlobalValue>,
}

impl ContextSnapshot {
	/// Capture both sides of `invocation` from `heap`.
	pub fn capture(invocation: &Invocation, heap: &Heap, universe: &TypeUniverse, options: &CaptureOptions) -> Result<Self> {
		let package = invocation.target.base_name().map(package_of).unwrap_or("");
		let capturer = Capturer::new(heap, universe, options).with_package(package);
		let mut session = CaptureSession::new();

		let setup = capture_side(&capturer, heap, invocation, &invocation.before, &mut session)?;
		let expect = capture_side(&capturer, heap, invocation, &invocation.after, &mut session)?;
		let graph = session.finish();
		tracing::debug!(class = %invocation.target, method = %invocation.method, values = graph.len(), "snapshot captured");

		Ok(Self {
			target: invocation.target.clone(),
			method: invocation.method.clone(),
			result_type: invocation.result_type.clone(),
			arg_types: invocation.arg_types.clone(),
			graph,
			setup_this: setup.this,
			setup_args: setup.args,
			setup_globals: setup.globals,
			expect_this: expect.this,
			expect_args: expect.args,
			expect_result: expect.result,
			expect_exception: expect.exception,
			expect_globals: expect.globals,
		})
	}

	/// Whether the method is called without a receiver.
	pub fn is_static(&self) -> bool {
		self.setup_this.is_none()
	}
}

fn capture_side(capturer: &Capturer<'_>, heap: &Heap, invocation: &Invocation, state: &InvocationState, session: &mut CaptureSession) -> Result<CapturedSide> {
	let this = match &state.this {
		Some(value) => Some(capturer.serialize(&invocation.target, value, session)?),
		None => None,
	};

	let mut args = Vec::with_capacity(state.args.len());
	for (idx, value) in state.args.iter().enumerate() {
		let declared = invocation.arg_types.get(idx).cloned().unwrap_or_else(Type::object);
		args.push(capturer.serialize(&declared, value, session)?);
	}

	let result = match (&state.result, &invocation.result_type) {
		(Some(value), Some(declared)) => Some(capturer.serialize(declared, value, session)?),
		(Some(value), None) => Some(capturer.serialize(&Type::object(), value, session)?),
		(None, _) => None,
	};

	let exception = match &state.exception {
		Some(value) => {
			let declared = match value {
				LiveValue::Ref(id) => heap.get(*id)?.class.erasure(),
				_ => Type::object(),
			};
			Some(capturer.serialize(&declared, value, session)?)
		}
		None => None,
	};

	let mut globals = Vec::with_capacity(invocation.globals.len());
	for GlobalRef { class, field } in &invocation.globals {
		let value = match state.globals.iter().find(|item| item.class == *class && item.field == *field) {
			Some(observed) => capturer.serialize_global_value(class, field, &observed.value, session)?,
			None => capturer.serialize_global(class, field, session)?,
		};
		globals.push(GlobalValue {
			class: class.clone(),
			field: field.clone(),
			value,
		});
	}

	Ok(CapturedSide {
		this,
		args,
		result,
		exception,
		globals,
	})
}
