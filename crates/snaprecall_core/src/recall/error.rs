use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, RecallError>;

/// Errors produced while capturing live object graphs and generating code from them.
#[derive(Debug, Error)]
pub enum RecallError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// JSON payload could not be parsed.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Unknown leading dump magic.
	#[error("unsupported compression or not a heap dump (magic={magic:?})")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Type signature text could not be parsed.
	#[error("invalid type signature at {at}: {input}")]
	InvalidTypeSignature {
		/// Original signature text.
		input: String,
		/// Byte offset where parsing failed.
		at: usize,
	},
	/// Live value referenced an object id missing from the heap.
	#[error("dangling reference to object #{id}")]
	DanglingReference {
		/// Missing object id.
		id: u64,
	},
	/// Class name is not part of the type universe.
	#[error("unknown class: {name}")]
	UnknownClass {
		/// Requested class name.
		name: String,
	},
	/// Field name is not declared by the class or its superclasses.
	#[error("unknown field {field} on {class}")]
	UnknownField {
		/// Owning class name.
		class: String,
		/// Requested field name.
		field: String,
	},
	/// Live object body does not fit the runtime class shape.
	#[error("object #{id} of {class} has a {got} body, expected {expected}")]
	BodyMismatch {
		/// Offending object id.
		id: u64,
		/// Runtime class of the object.
		class: String,
		/// Expected body shape.
		expected: &'static str,
		/// Actual body shape.
		got: &'static str,
	},
	/// Adaptor registry is malformed.
	#[error("invalid adaptor registration: {reason}")]
	InvalidRegistration {
		/// Human-readable cause.
		reason: String,
	},
	/// No adaptor is registered for a value kind.
	#[error("no adaptor registered for {kind} values: {value}")]
	NoAdaptor {
		/// Value kind label.
		kind: &'static str,
		/// Description of the offending value.
		value: String,
	},
	/// Code generation for a value failed after every candidate strategy.
	#[error("failed deserializing {value}{}", render_attempts(.attempts))]
	DeserializationFailed {
		/// Description of the offending value.
		value: String,
		/// Attempts made before giving up.
		attempts: Vec<String>,
	},
	/// Type shape cannot be rendered at the requested position.
	#[error("unsupported type shape: {ty}")]
	UnsupportedType {
		/// Rendered type signature.
		ty: String,
	},
	/// Value was still only reserved after its generation finished.
	#[error("forward declaration of {name} was never resolved")]
	UnresolvedForward {
		/// Reserved local variable name.
		name: String,
	},
	/// Value id is not part of the graph.
	#[error("value #{id} is not part of the snapshot")]
	UnknownValue {
		/// Missing value id.
		id: u32,
	},
}

impl RecallError {
	/// Build a deserialization failure without recorded attempts.
	pub fn failed(value: impl Into<String>) -> Self {
		Self::DeserializationFailed {
			value: value.into(),
			attempts: Vec::new(),
		}
	}

	/// Render this error as one attempt line for an enclosing failure.
	pub fn as_attempt(&self, strategy: &str) -> String {
		format!("{strategy}: {self}")
	}
}

fn render_attempts(attempts: &[String]) -> String {
	if attempts.is_empty() {
		return String::new();
	}
	format!(" (tried: {})", attempts.join("; "))
}
