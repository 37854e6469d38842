mod adaptor;
mod builtins;
mod capture;
mod classes;
mod compression;
mod computation;
mod config;
mod context;
mod dump;
mod error;
mod generator;
mod heap;
mod matcher;
mod restore;
mod setup;
mod snapshot;
mod templates;
mod ty;
mod type_manager;
mod universe;
mod value;

/// Adaptor traits and the per-mode dispatch registry.
pub use adaptor::{Adaptor, Adaptors, GenerationMode, Generator};
/// Capture of live heap values into value graphs.
pub use capture::{CaptureSession, Capturer};
/// Class metadata records.
pub use classes::{Annotation, ClassCategory, ClassInfo, ClassKind, ConstructorInfo, FieldInfo, ParamInfo, SetterInfo, Visibility};
/// Dump compression detection.
pub use compression::Compression;
/// Generated code fragments.
pub use computation::Computation;
/// Capture and generation options.
pub use config::{CaptureOptions, ClassFilter, FieldFilter, FieldHint, GeneratorOptions, Options};
/// Per-run generation state.
pub use context::{DeserializerContext, LocalVariable, VariableState};
/// Heap dump files and recorded invocations.
pub use dump::{GlobalRef, HeapDump, Invocation, InvocationState};
/// Error and result types.
pub use error::{RecallError, Result};
/// Test method accumulation.
pub use generator::{GenerationFailure, RenderedTest, TestGenerator, TestImports};
/// Live object model of the observed program.
pub use heap::{Heap, LiveObject, LiveValue, ObjectBody, ObjectId, StaticField};
/// Matcher (assertion) code generation.
pub use matcher::{Matcher, MatcherGenerator, matcher_adaptors};
/// Rebuilding live objects from value graphs.
pub use restore::{Restorer, restore};
/// Setup (constructive) code generation.
pub use setup::{Setup, SetupGenerator, setup_adaptors};
/// Invocation snapshots.
pub use snapshot::{ContextSnapshot, GlobalValue};
/// Type signatures.
pub use ty::{Primitive, Type};
/// Name and import tracking for generated code.
pub use type_manager::TypeManager;
/// Class table.
pub use universe::TypeUniverse;
/// Captured value graph model.
pub use value::{LambdaOrigin, Literal, SerializedField, SerializedValue, ValueGraph, ValueId, ValueKind, ValueNode};
