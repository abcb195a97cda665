//! The plug-in loading pipeline: resolve, instantiate, report.
//!
//! Every failure of a load call is reported as exactly one [`LoadFailure`]
//! carrying the descriptor, the failed stage and human readable details.

mod instantiate;
mod resolver;

use crate::descriptor::{Descriptor, PluginInfo};
use crate::error::LoadFailure;
use crate::library::{LibraryMatch, LibraryRegistry};
use crate::registry::TypeSystem;
use crate::types::{Contract, ResolvedType};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::info;

pub use instantiate::NO_INSTANCE;
pub use resolver::{NOT_INSTALLED, NO_IMPLEMENTATION};

/// Tunables of the resolution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LoaderOptions {
	/// Scan the component libraries when direct resolution finds nothing.
	#[serde(default = "default_fallback")]
	pub fallback: bool,
	/// How the library hint of an identifier selects a component library.
	#[serde(default)]
	pub library_match: LibraryMatch,
}

const fn default_fallback() -> bool {
	true
}

impl Default for LoaderOptions {
	fn default() -> Self {
		Self {
			fallback: default_fallback(),
			library_match: LibraryMatch::default(),
		}
	}
}

/// Loads plug-ins through an injected type system and library registry.
///
/// Loads are independent of each other; the loader can be shared across threads.
#[derive(Clone)]
pub struct PluginLoader {
	types: Arc<dyn TypeSystem>,
	libraries: Arc<dyn LibraryRegistry>,
	options: LoaderOptions,
}

impl PluginLoader {
	pub fn new(types: Arc<dyn TypeSystem>, libraries: Arc<dyn LibraryRegistry>) -> Self {
		Self {
			types,
			libraries,
			options: LoaderOptions::default(),
		}
	}

	#[must_use]
	pub fn with_options(mut self, options: LoaderOptions) -> Self {
		self.options = options;
		self
	}

	pub const fn options(&self) -> &LoaderOptions {
		&self.options
	}

	/// Resolve the descriptor's implementation and instantiate it as contract `C`.
	///
	/// # Errors
	/// Returns a [`LoadFailure`] describing the first failed stage.
	pub fn load<C, D>(&self, descriptor: &D) -> Result<Box<C>, LoadFailure>
	where
		C: Contract + ?Sized,
		D: Descriptor + ?Sized,
	{
		let resolved = self.resolve(descriptor).map_err(attribute::<C>)?;
		Self::instantiate::<C, D>(descriptor, &resolved)
	}

	/// Instantiate a type already known to the caller as contract `C`.
	///
	/// `name` is only used to attribute failures.
	///
	/// # Errors
	/// Returns a [`LoadFailure`] if construction fails or the object does not
	/// satisfy `C`.
	pub fn load_type<C: Contract + ?Sized>(
		&self,
		name: &str,
		resolved: &ResolvedType,
	) -> Result<Box<C>, LoadFailure> {
		let descriptor = PluginInfo::for_contract::<C>(name, resolved.name());
		Self::instantiate::<C, _>(&descriptor, resolved)
	}

	/// Resolve the descriptor's implementation without instantiating it.
	///
	/// # Errors
	/// Returns a [`LoadFailure`] if no implementation is bound or none is found.
	pub fn resolve<D: Descriptor + ?Sized>(&self, descriptor: &D) -> Result<ResolvedType, LoadFailure> {
		resolver::resolve(
			self.types.as_ref(),
			self.libraries.as_ref(),
			&self.options,
			descriptor.implementation(),
		)
		.map_err(|rejection| rejection.into_failure(descriptor))
	}

	fn instantiate<C, D>(descriptor: &D, resolved: &ResolvedType) -> Result<Box<C>, LoadFailure>
	where
		C: Contract + ?Sized,
		D: Descriptor + ?Sized,
	{
		let instance = instantiate::instantiate::<C>(resolved)
			.map_err(|rejection| attribute::<C>(rejection.into_failure(descriptor)))?;
		info!(
			plugin = %descriptor.name(),
			implementation = %resolved.name(),
			library = resolved.library().unwrap_or_default(),
			contract = C::qualified_name(),
			"Loaded plug-in"
		);
		Ok(instance)
	}
}

/// Names the requested contract on failures of descriptors that declare none.
fn attribute<C: Contract + ?Sized>(mut failure: LoadFailure) -> LoadFailure {
	if failure.contract.is_empty() {
		C::qualified_name().clone_into(&mut failure.contract);
	}
	failure
}

impl fmt::Debug for PluginLoader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginLoader")
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}
