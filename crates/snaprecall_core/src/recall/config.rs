use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::recall::{Annotation, Result};

/// Class exclusion predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum ClassFilter {
	/// Exact binary class name.
	ByName {
		/// Excluded class.
		name: String,
	},
	/// Every class in a package or its subpackages.
	ByPackage {
		/// Excluded package.
		package: String,
	},
}

impl ClassFilter {
	/// Whether the filter excludes `class`.
	pub fn matches(&self, class: &str) -> bool {
		match self {
			Self::ByName { name } => name == class,
			Self::ByPackage { package } => class.strip_prefix(package.as_str()).is_some_and(|rest| rest.starts_with('.')),
		}
	}
}

/// Field exclusion predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
	/// Declaring class.
	pub class: String,
	/// Field name.
	pub field: String,
}

/// Reconstruction hint configured for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldHint {
	/// Declaring class.
	pub class: String,
	/// Field name.
	pub field: String,
	/// Attached hint.
	pub hint: Annotation,
}

/// Capture behavior knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
	/// Classes never captured; their instances become null.
	pub class_exclusions: Vec<ClassFilter>,
	/// Fields omitted from captured objects.
	pub field_exclusions: Vec<FieldFilter>,
	/// Extra hints per field.
	pub hints: Vec<FieldHint>,
}

impl CaptureOptions {
	/// Whether instances of `class` are excluded.
	pub fn excludes_class(&self, class: &str) -> bool {
		self.class_exclusions.iter().any(|filter| filter.matches(class))
	}

	/// Whether `class.field` is excluded.
	pub fn excludes_field(&self, class: &str, field: &str) -> bool {
		self.field_exclusions.iter().any(|filter| filter.class == class && filter.field == field)
	}

	/// Hints configured for `class.field`.
	pub fn hints_for(&self, class: &str, field: &str) -> Vec<Annotation> {
		self.hints
			.iter()
			.filter(|item| item.class == class && item.field == field)
			.map(|item| item.hint.clone())
			.collect()
	}
}

/// Code generation knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
	/// Package of the generated code; the target class' package when absent.
	pub package: Option<String>,
	/// Directory generated resources are written to and read from.
	pub resource_dir: String,
}

impl Default for GeneratorOptions {
	fn default() -> Self {
		Self {
			package: None,
			resource_dir: "src/test/resources".to_owned(),
		}
	}
}

/// Options file combining capture and generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
	/// Capture settings.
	pub capture: CaptureOptions,
	/// Generation settings.
	pub generator: GeneratorOptions,
}

impl Options {
	/// Read options from a JSON file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let raw = fs::read(path)?;
		Ok(serde_json::from_slice(&raw)?)
	}
}
