use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::recall::{Computation, DeserializerContext, RecallError, Result, Type, TypeUniverse, ValueGraph, ValueId, ValueKind};

/// What adaptors see of the generator driving them.
pub trait Generator {
	/// Snapshot being generated from.
	fn graph(&self) -> &ValueGraph;
	/// Class table of the snapshot.
	fn universe(&self) -> &TypeUniverse;
	/// Generation state.
	fn context(&self) -> &DeserializerContext;
	/// Generation state.
	fn context_mut(&mut self) -> &mut DeserializerContext;
	/// Generate code for a child value.
	fn visit(&mut self, id: ValueId) -> Result<Computation>;
}

/// Marker for one kind of generated code, tying adaptors to their generator.
pub trait GenerationMode: Sized + 'static {
	/// Label used in diagnostics.
	const NAME: &'static str;
	/// Generator adaptors of this mode are driven by.
	type Generator<'g>: Generator;
}

/// Strategy turning one kind of captured value into code.
pub trait Adaptor<M: GenerationMode>: Send + Sync {
	/// Unique name within a registry.
	fn name(&self) -> &'static str;

	/// Value kind handled.
	fn kind(&self) -> ValueKind;

	/// Adaptor this one refines; tried after it.
	fn parent(&self) -> Option<&'static str> {
		None
	}

	/// Whether the adaptor applies to values of runtime type `ty`.
	fn matches(&self, _ty: &Type, _universe: &TypeUniverse) -> bool {
		true
	}

	/// Generate code for `value`. Failing leaves the next candidate to try.
	fn try_deserialize(&self, value: ValueId, generator: &mut M::Generator<'_>) -> Result<Computation>;
}

/// Dispatch table of one mode: per value kind, adaptors from most specific to most general.
pub struct Adaptors<M: GenerationMode> {
	chains: BTreeMap<ValueKind, Vec<Arc<dyn Adaptor<M>>>>,
}

impl<M: GenerationMode> Adaptors<M> {
	/// Validate `adaptors` and order them for dispatch.
	///
	/// Names must be unique, parents must exist and handle the same kind, and parent links
	/// must end in a parent-less default. Adaptors deeper in a parent chain come first;
	/// equal depths keep registration order.
	pub fn new(adaptors: Vec<Arc<dyn Adaptor<M>>>) -> Result<Self> {
		let mut by_name: HashMap<&'static str, &Arc<dyn Adaptor<M>>> = HashMap::new();
		for adaptor in &adaptors {
			if by_name.insert(adaptor.name(), adaptor).is_some() {
				return Err(invalid(format!("{} adaptor {} registered twice", M::NAME, adaptor.name())));
			}
		}

		let mut depths = HashMap::new();
		for adaptor in &adaptors {
			let mut depth = 0_usize;
			let mut seen = HashSet::from([adaptor.name()]);
			let mut current = adaptor;
			while let Some(parent) = current.parent() {
				let Some(next) = by_name.get(parent) else {
					return Err(invalid(format!("{} adaptor {} refines unknown adaptor {parent}", M::NAME, current.name())));
				};
				if next.kind() != current.kind() {
					return Err(invalid(format!(
						"{} adaptor {} handles {} values but its parent {parent} handles {}",
						M::NAME,
						current.name(),
						current.kind().as_str(),
						next.kind().as_str()
					)));
				}
				if !seen.insert(parent) {
					return Err(invalid(format!("{} adaptor {} is part of a parent cycle", M::NAME, adaptor.name())));
				}
				depth += 1;
				current = next;
			}
			depths.insert(adaptor.name(), depth);
		}

		let mut chains: BTreeMap<ValueKind, Vec<Arc<dyn Adaptor<M>>>> = BTreeMap::new();
		for adaptor in adaptors {
			chains.entry(adaptor.kind()).or_default().push(adaptor);
		}
		for chain in chains.values_mut() {
			chain.sort_by_key(|adaptor| std::cmp::Reverse(depths.get(adaptor.name()).copied().unwrap_or(0)));
		}
		Ok(Self { chains })
	}

	/// Candidates for `kind` in dispatch order.
	pub fn chain(&self, kind: ValueKind) -> &[Arc<dyn Adaptor<M>>] {
		self.chains.get(&kind).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Candidate names for `kind` in dispatch order.
	pub fn names(&self, kind: ValueKind) -> Vec<&'static str> {
		self.chain(kind).iter().map(|adaptor| adaptor.name()).collect()
	}

	/// Run the candidates for `id` until one succeeds.
	///
	/// Every attempt starts from the same context; a failed attempt's changes are discarded.
	pub fn dispatch(&self, id: ValueId, generator: &mut M::Generator<'_>) -> Result<Computation> {
		let node = generator.graph().get(id)?;
		let kind = node.kind();
		let ty = node.ty.clone();
		let chain = self.chain(kind);
		if chain.is_empty() {
			return Err(RecallError::NoAdaptor {
				kind: kind.as_str(),
				value: generator.graph().describe(id),
			});
		}

		let mut attempts = Vec::new();
		for adaptor in chain {
			if !adaptor.matches(&ty, generator.universe()) {
				continue;
			}
			let checkpoint = generator.context().clone();
			match adaptor.try_deserialize(id, generator) {
				Ok(computation) => {
					tracing::trace!(mode = M::NAME, adaptor = adaptor.name(), value = %id, "adaptor succeeded");
					return Ok(computation);
				}
				Err(err) => {
					tracing::debug!(mode = M::NAME, adaptor = adaptor.name(), value = %id, error = %err, "adaptor failed");
					*generator.context_mut() = checkpoint;
					attempts.push(err.as_attempt(adaptor.name()));
				}
			}
		}

		Err(RecallError::DeserializationFailed {
			value: generator.graph().describe(id),
			attempts,
		})
	}
}

impl<M: GenerationMode> fmt::Debug for Adaptors<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut map = f.debug_map();
		for (kind, chain) in &self.chains {
			map.entry(&kind.as_str(), &chain.iter().map(|adaptor| adaptor.name()).collect::<Vec<_>>());
		}
		map.finish()
	}
}

fn invalid(reason: String) -> RecallError {
	RecallError::InvalidRegistration { reason }
}
