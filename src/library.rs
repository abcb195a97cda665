//! Component libraries consulted by the fallback resolution phase.

use crate::error::AssetError;
use crate::registry::TypeRegistry;
use crate::types::ResolvedType;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A named component library and the assets it can load types from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentLibrary {
	pub name: String,
	/// Loadable assets, in the order they are scanned.
	pub assets: Vec<PathBuf>,
}

impl ComponentLibrary {
	pub fn new(name: impl Into<String>, assets: impl IntoIterator<Item = PathBuf>) -> Self {
		Self {
			name: name.into(),
			assets: assets.into_iter().collect(),
		}
	}
}

/// How a library hint selects a component library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryMatch {
	/// The library name contains the hint. An empty hint matches every library.
	#[default]
	Substring,
	/// The library name equals the hint.
	Exact,
}

impl LibraryMatch {
	pub fn matches(self, library: &str, hint: &str) -> bool {
		match self {
			Self::Substring => library.contains(hint),
			Self::Exact => library == hint,
		}
	}
}

/// The set of known component libraries.
pub trait LibraryRegistry: Send + Sync {
	/// All libraries, in enumeration order.
	fn libraries(&self) -> Vec<ComponentLibrary>;

	/// Load an asset and look up a type by its bare name.
	///
	/// # Errors
	/// Returns an error if the asset cannot be loaded.
	fn load_type(&self, asset: &Path, type_name: &str) -> Result<Option<ResolvedType>, AssetError>;
}

/// Component libraries whose assets are [`TypeRegistry`]s held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLibraries {
	libraries: Vec<ComponentLibrary>,
	assets: HashMap<PathBuf, TypeRegistry>,
}

impl InMemoryLibraries {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a library. Types in its assets are recorded as hosted by it.
	///
	/// # Errors
	/// Returns [`AssetError::Duplicate`] if an asset path is already provided by a
	/// library, including this one.
	pub fn with_library<P: Into<PathBuf>>(
		mut self,
		name: impl Into<String>,
		assets: impl IntoIterator<Item = (P, TypeRegistry)>,
	) -> Result<Self, AssetError> {
		let name = name.into();
		let mut paths = Vec::new();
		for (path, types) in assets {
			let path = path.into();
			let owner = self
				.owner(&path)
				.or_else(|| paths.contains(&path).then_some(name.as_str()));
			if let Some(owner) = owner {
				return Err(AssetError::Duplicate {
					path: path.display().to_string(),
					library: owner.to_owned(),
				});
			}
			let types = types
				.type_names()
				.filter_map(|type_name| types.get(type_name))
				.fold(TypeRegistry::new(), |hosted, ty| {
					hosted.with(ty.clone().in_library(name.clone()))
				});
			self.assets.insert(path.clone(), types);
			paths.push(path);
		}
		self.libraries.push(ComponentLibrary::new(name, paths));
		Ok(self)
	}

	fn owner(&self, asset: &Path) -> Option<&str> {
		self.libraries
			.iter()
			.find(|library| library.assets.iter().any(|path| path == asset))
			.map(|library| library.name.as_str())
	}
}

impl LibraryRegistry for InMemoryLibraries {
	fn libraries(&self) -> Vec<ComponentLibrary> {
		self.libraries.clone()
	}

	fn load_type(&self, asset: &Path, type_name: &str) -> Result<Option<ResolvedType>, AssetError> {
		let types = self.assets.get(asset).ok_or_else(|| AssetError::Unavailable {
			path: asset.display().to_string(),
			message: String::from("no such asset"),
		})?;
		Ok(types.get(type_name).cloned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Default)]
	struct Plain;

	#[test]
	fn library_matching() {
		assert!(LibraryMatch::Substring.matches("Acme.Plugins", "Plugins"));
		assert!(LibraryMatch::Substring.matches("Acme.Plugins", ""));
		assert!(!LibraryMatch::Substring.matches("Acme.Plugins", "Other"));
		assert!(LibraryMatch::Exact.matches("Acme.Plugins", "Acme.Plugins"));
		assert!(!LibraryMatch::Exact.matches("Acme.Plugins", "Plugins"));
	}

	#[test]
	fn in_memory_assets() {
		let libraries = InMemoryLibraries::new()
			.with_library(
				"Acme.Plugins",
				[(
					"acme/plugins.bin",
					TypeRegistry::new().with(ResolvedType::new::<Plain>("Acme.Plain")),
				)],
			)
			.unwrap();

		let listed = libraries.libraries();
		assert_eq!(listed.len(), 1);
		assert_eq!(listed[0].name, "Acme.Plugins");
		assert_eq!(listed[0].assets, vec![PathBuf::from("acme/plugins.bin")]);

		let ty = libraries
			.load_type(Path::new("acme/plugins.bin"), "Acme.Plain")
			.unwrap()
			.unwrap();
		assert_eq!(ty.library(), Some("Acme.Plugins"));
		assert!(libraries
			.load_type(Path::new("acme/plugins.bin"), "Acme.Fancy")
			.unwrap()
			.is_none());
	}

	#[test]
	fn unknown_asset_is_an_error() {
		let libraries = InMemoryLibraries::new();
		assert!(matches!(
			libraries.load_type(Path::new("missing.bin"), "Acme.Plain"),
			Err(AssetError::Unavailable { .. })
		));
	}

	#[test]
	fn shared_asset_path_is_rejected() {
		let libraries = InMemoryLibraries::new()
			.with_library("Acme.Plugins", [("shared.bin", TypeRegistry::new())])
			.unwrap();
		let error = libraries
			.clone()
			.with_library("Acme.Extras", [("shared.bin", TypeRegistry::new())])
			.unwrap_err();
		assert_eq!(
			error.to_string(),
			"Asset shared.bin is already provided by component library Acme.Plugins"
		);

		// The earlier library keeps its asset
		assert_eq!(libraries.libraries().len(), 1);
		assert!(libraries.load_type(Path::new("shared.bin"), "Acme.Plain").is_ok());

		let error = InMemoryLibraries::new()
			.with_library(
				"Acme.Twice",
				[("twice.bin", TypeRegistry::new()), ("twice.bin", TypeRegistry::new())],
			)
			.unwrap_err();
		assert!(matches!(error, AssetError::Duplicate { library, .. } if library == "Acme.Twice"));
	}
}
