//! Load failures and the errors reported by loader collaborators.

use crate::descriptor::Descriptor;
use std::fmt;
use thiserror::Error;

/// Header of every rendered [`LoadFailure`].
pub const LOAD_FAILURE_HEADER: &str = "Error while loading the plug-in";

/// The pipeline stage at which a load failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStage {
	/// The descriptor names no implementation.
	NoImplementationBound,
	/// No type matches the implementation identifier.
	ResolutionFailed,
	/// The type was found but constructing it failed.
	InstantiationFailed,
	/// The constructed object does not satisfy the requested contract.
	ContractMismatch,
}

impl fmt::Display for LoadStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let stage = match self {
			Self::NoImplementationBound => "no implementation bound",
			Self::ResolutionFailed => "resolution failed",
			Self::InstantiationFailed => "instantiation failed",
			Self::ContractMismatch => "contract mismatch",
		};
		f.write_str(stage)
	}
}

/// The single error observed by callers of the loader.
///
/// Renders as a fixed header naming the plug-in, followed by the detail lines:
///
/// ```text
/// Error while loading the plug-in "Succession":
/// Data type: Foo.Bar.Impl
/// Error: No data type with that name is installed.
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} \"{plugin}\":{}", LOAD_FAILURE_HEADER, render_details(.details))]
pub struct LoadFailure {
	/// Name of the plug-in that failed to load.
	pub plugin: String,
	/// Qualified name of the contract the plug-in had to satisfy.
	pub contract: String,
	/// The implementation identifier the plug-in was declared with.
	pub implementation: String,
	pub stage: LoadStage,
	/// Human readable diagnostics, in order.
	pub details: Vec<String>,
}

impl LoadFailure {
	pub fn new<D: Descriptor + ?Sized>(descriptor: &D, stage: LoadStage, details: Vec<String>) -> Self {
		Self {
			plugin: descriptor.name().to_owned(),
			contract: descriptor.contract().to_owned(),
			implementation: descriptor.implementation().to_owned(),
			stage,
			details,
		}
	}
}

fn render_details(details: &[String]) -> String {
	details.iter().map(|line| format!("\n{line}")).collect()
}

/// A failed pipeline stage before it is attributed to a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rejection {
	pub stage: LoadStage,
	pub details: Vec<String>,
}

impl Rejection {
	pub fn new(stage: LoadStage, details: Vec<String>) -> Self {
		Self { stage, details }
	}

	pub fn into_failure<D: Descriptor + ?Sized>(self, descriptor: &D) -> LoadFailure {
		LoadFailure::new(descriptor, self.stage, self.details)
	}
}

/// Errors raised by a [`TypeSystem`](crate::TypeSystem) during direct resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
	#[error("Malformed type reference {identifier:?}")]
	Malformed { identifier: String },

	#[error(transparent)]
	Backend {
		source: Box<dyn std::error::Error + Send + Sync>,
	},
}

/// Errors raised by a type's default constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructError {
	/// The constructed object is not of the kind the type promised.
	#[error("The constructed object has an incompatible type")]
	IncompatibleType,

	#[error("{message}")]
	Failed { message: String },
}

impl ConstructError {
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed {
			message: message.into(),
		}
	}
}

/// Errors raised while loading a type from a component library asset.
#[derive(Debug, Error)]
pub enum AssetError {
	#[error("Asset {path} is not available: {message}")]
	Unavailable { path: String, message: String },

	#[error("Asset {path} is already provided by component library {library}")]
	Duplicate { path: String, library: String },

	#[cfg(feature = "native")]
	#[error("Failed to load component library at {path}: {source}")]
	Library {
		path: String,
		source: abi_stable::library::LibraryError,
	},
}
