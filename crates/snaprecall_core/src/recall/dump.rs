use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::recall::compression::decode_bytes;
use crate::recall::{ClassInfo, Compression, Heap, LiveValue, Result, StaticField, Type, TypeUniverse};

/// Static field observed by an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRef {
	/// Declaring class.
	pub class: String,
	/// Field name.
	pub field: String,
}

/// Program state at one side of a recorded invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationState {
	/// Receiver, absent for static methods.
	#[serde(default)]
	pub this: Option<LiveValue>,
	/// Arguments in declaration order.
	#[serde(default)]
	pub args: Vec<LiveValue>,
	/// Returned value, only on the after side.
	#[serde(default)]
	pub result: Option<LiveValue>,
	/// Thrown exception, only on the after side.
	#[serde(default)]
	pub exception: Option<LiveValue>,
	/// Values of the observed globals.
	#[serde(default)]
	pub globals: Vec<StaticField>,
}

/// One recorded method execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
	/// Class declaring the method.
	pub target: Type,
	/// Method name.
	pub method: String,
	/// Declared result type, absent for `void`.
	#[serde(default)]
	pub result_type: Option<Type>,
	/// Declared parameter types.
	#[serde(default)]
	pub arg_types: Vec<Type>,
	/// Static fields read or written by the method.
	#[serde(default)]
	pub globals: Vec<GlobalRef>,
	/// State before the call.
	pub before: InvocationState,
	/// State after the call.
	pub after: InvocationState,
}

/// Serialized heap of an observed program with the class table it refers to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeapDump {
	/// Application classes; the standard classes are implied.
	#[serde(default)]
	pub classes: Vec<ClassInfo>,
	/// Live objects and statics.
	#[serde(default)]
	pub heap: Heap,
	/// Recorded method executions.
	#[serde(default)]
	pub invocations: Vec<Invocation>,
}

impl HeapDump {
	/// Read a dump from a plain or zstd-compressed JSON file.
	pub fn open(path: impl AsRef<Path>) -> Result<(Compression, Self)> {
		let raw = fs::read(path)?;
		Self::from_bytes(raw)
	}

	/// Decode a dump from plain or zstd-compressed JSON bytes.
	pub fn from_bytes(raw: Vec<u8>) -> Result<(Compression, Self)> {
		let (compression, bytes) = decode_bytes(raw)?;
		let dump = serde_json::from_slice(&bytes)?;
		Ok((compression, dump))
	}

	/// Builtin classes extended by the dump's own classes.
	pub fn universe(&self) -> TypeUniverse {
		let mut universe = TypeUniverse::builtin();
		universe.extend(self.classes.iter().cloned());
		universe
	}
}
