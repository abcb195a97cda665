//! Explicit type registration, replacing name based runtime type lookup.

use crate::error::ResolveError;
use crate::types::{ResolvedType, TypeReference};
use std::collections::HashMap;
use tracing::debug;

/// Direct resolution of implementation identifiers to types.
pub trait TypeSystem: Send + Sync {
	/// Resolve an implementation identifier.
	///
	/// Returns `Ok(None)` if no such type is known; errors are reserved for
	/// identifiers that cannot be looked up at all.
	///
	/// # Errors
	/// Returns an error if the lookup itself fails.
	fn resolve_type(&self, identifier: &str) -> Result<Option<ResolvedType>, ResolveError>;
}

/// Types registered under their implementation identifiers, typically at startup.
///
/// Identifiers may be library qualified (`"Foo.Bar.Impl, FooLib"`). A qualified
/// identifier only resolves a type registered without a library or within the named one.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
	types: HashMap<String, ResolvedType>,
}

impl TypeRegistry {
	/// Create a new empty type registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a type under its name, replacing any previous registration.
	pub fn register(&mut self, ty: ResolvedType) -> Option<ResolvedType> {
		debug!(implementation = %ty.name(), library = ?ty.library(), "Registered plug-in type");
		self.types.insert(ty.name().to_owned(), ty)
	}

	/// Builder style [`Self::register`].
	#[must_use]
	pub fn with(mut self, ty: ResolvedType) -> Self {
		self.register(ty);
		self
	}

	/// Look up a type by its bare type name.
	pub fn get(&self, type_name: &str) -> Option<&ResolvedType> {
		self.types.get(type_name)
	}

	pub fn type_names(&self) -> impl Iterator<Item = &str> {
		self.types.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}

impl TypeSystem for TypeRegistry {
	fn resolve_type(&self, identifier: &str) -> Result<Option<ResolvedType>, ResolveError> {
		let reference = TypeReference::parse(identifier);
		if reference.type_name.is_empty() {
			return Err(ResolveError::Malformed {
				identifier: identifier.to_owned(),
			});
		}

		let Some(ty) = self.types.get(reference.type_name) else {
			return Ok(None);
		};

		let other_library = ty
			.library()
			.is_some_and(|library| !reference.library_hint.is_empty() && library != reference.library_hint);
		if other_library {
			return Ok(None);
		}

		Ok(Some(ty.clone()))
	}
}
