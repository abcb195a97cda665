//! Component libraries backed by native dynamic libraries.

use super::ContractAdapters;
use crate::config::LibraryConfig;
use crate::error::{AssetError, ConstructError};
use crate::library::{ComponentLibrary, LibraryRegistry};
use crate::types::{Instance, ResolvedType};
use abi_stable::library::lib_header_from_path;
use abi_stable::std_types::{ROption, RResult, RStr};
use plugin_loader_api::{ComponentLibraryRef, FfiErrorCode};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info};

/// Component libraries whose assets are dynamic libraries exporting a
/// [`ComponentLibraryRef`] root module.
///
/// Assets are opened lazily and stay loaded for the lifetime of the process.
pub struct NativeLibraries {
	libraries: Vec<ComponentLibrary>,
	adapters: ContractAdapters,
	opened: RwLock<HashMap<PathBuf, ComponentLibraryRef>>,
}

impl NativeLibraries {
	pub fn new(libraries: Vec<ComponentLibrary>, adapters: ContractAdapters) -> Self {
		Self {
			libraries,
			adapters,
			opened: RwLock::new(HashMap::new()),
		}
	}

	/// Collect the assets of the configured libraries.
	///
	/// Dynamic libraries found in a library's directory come first, sorted by
	/// file name, followed by its explicit assets.
	///
	/// # Errors
	/// Returns an error if a directory cannot be read or a library has no assets.
	pub fn from_config(
		configs: &[LibraryConfig],
		adapters: ContractAdapters,
	) -> Result<Self, LibraryScanError> {
		let libraries = configs
			.iter()
			.map(scan_library)
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self::new(libraries, adapters))
	}

	fn open(&self, asset: &Path) -> Result<ComponentLibraryRef, AssetError> {
		if let Some(module) = self
			.opened
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.get(asset)
		{
			return Ok(*module);
		}

		let module = lib_header_from_path(asset)
			.and_then(|header| header.init_root_module::<ComponentLibraryRef>())
			.map_err(|source| AssetError::Library {
				path: asset.display().to_string(),
				source,
			})?;

		info!(
			library.name = %(module.library_name())(),
			library.version = %(module.library_version())(),
			asset = %asset.display(),
			"Opened component library"
		);

		self.opened
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(asset.to_path_buf(), module);
		Ok(module)
	}
}

impl LibraryRegistry for NativeLibraries {
	fn libraries(&self) -> Vec<ComponentLibrary> {
		self.libraries.clone()
	}

	fn load_type(&self, asset: &Path, type_name: &str) -> Result<Option<ResolvedType>, AssetError> {
		let module = self.open(asset)?;
		let exported = (module.type_names())()
			.iter()
			.any(|exported| exported.as_str() == type_name);
		if !exported {
			debug!(asset = %asset.display(), type_name, "Type is not exported");
			return Ok(None);
		}

		let library = self
			.libraries
			.iter()
			.find(|library| library.assets.iter().any(|path| path == asset))
			.map_or_else(|| (module.library_name())().into_string(), |library| library.name.clone());

		let name = type_name.to_owned();
		let ty = ResolvedType::with_constructor(type_name, move || {
			construct(module, &name)
		})
		.in_library(library);
		Ok(Some(self.adapters.apply(ty)))
	}
}

fn construct(module: ComponentLibraryRef, type_name: &str) -> Result<Option<Instance>, ConstructError> {
	match (module.create_instance())(RStr::from(type_name)) {
		RResult::ROk(ROption::RSome(object)) => Ok(Some(Box::new(object) as Instance)),
		RResult::ROk(ROption::RNone) => Ok(None),
		RResult::RErr(error) if error.code == FfiErrorCode::IncompatibleType => {
			Err(ConstructError::IncompatibleType)
		}
		RResult::RErr(error) => Err(ConstructError::failed(error.message.into_string())),
	}
}

fn scan_library(config: &LibraryConfig) -> Result<ComponentLibrary, LibraryScanError> {
	let mut assets = match &config.directory {
		Some(directory) => scan_directory(directory)?,
		None => Vec::new(),
	};
	assets.extend(config.assets.iter().cloned());

	if assets.is_empty() {
		return Err(LibraryScanError::NoAssets {
			name: config.name.clone(),
		});
	}

	debug!(library = %config.name, assets = assets.len(), "Registered component library");
	Ok(ComponentLibrary::new(config.name.clone(), assets))
}

fn scan_directory(directory: &Path) -> Result<Vec<PathBuf>, LibraryScanError> {
	let entries = std::fs::read_dir(directory).map_err(|source| LibraryScanError::Directory {
		path: directory.to_path_buf(),
		source,
	})?;

	let mut assets = Vec::new();
	for entry in entries {
		let path = entry
			.map_err(|source| LibraryScanError::Directory {
				path: directory.to_path_buf(),
				source,
			})?
			.path();
		let is_library = path
			.extension()
			.is_some_and(|extension| extension == std::env::consts::DLL_EXTENSION);
		if path.is_file() && is_library {
			assets.push(path);
		}
	}
	assets.sort();
	Ok(assets)
}

impl std::fmt::Debug for NativeLibraries {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NativeLibraries")
			.field("libraries", &self.libraries)
			.field("adapters", &self.adapters)
			.finish_non_exhaustive()
	}
}

/// Errors that can occur when collecting component library assets.
#[derive(Debug, Error)]
pub enum LibraryScanError {
	#[error("Failed to read component library directory {}: {source}", .path.display())]
	Directory {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("Component library {name} has no assets")]
	NoAssets { name: String },
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::LoadStage;
	use crate::registry::TypeRegistry;
	use crate::{PluginInfo, PluginLoader, NO_INSTANCE};
	use abi_stable::prefix_type::PrefixTypeTrait;
	use abi_stable::std_types::{RString, RVec};
	use plugin_loader_api::{FfiError, FfiResult, PluginObject, PluginObjectBox, PluginObject_TO};
	use std::sync::Arc;
	use tempfile::TempDir;

	const HELLO: &str = "Greetings.Hello";
	const ABSENT: &str = "Greetings.Absent";
	const ODD: &str = "Greetings.Odd";
	const BROKEN: &str = "Greetings.Broken";
	const ASSET: &str = "greetings.bin";

	struct Hello;

	impl PluginObject for Hello {
		fn type_name(&self) -> RString {
			RString::from(HELLO)
		}

		fn contracts(&self) -> RVec<RString> {
			RVec::from(vec![RString::from("greetings.Greeter")])
		}

		fn invoke(&self, operation: RStr<'_>, _payload: RStr<'_>) -> FfiResult<RString> {
			RResult::RErr(FfiError::unsupported(operation.as_str()))
		}
	}

	extern "C" fn library_name() -> RString {
		RString::from("greetings")
	}

	extern "C" fn library_version() -> RString {
		RString::from("1.0.0")
	}

	extern "C" fn type_names() -> RVec<RString> {
		[HELLO, ABSENT, ODD, BROKEN]
			.into_iter()
			.map(RString::from)
			.collect()
	}

	extern "C" fn create_instance(type_name: RStr<'_>) -> FfiResult<ROption<PluginObjectBox>> {
		match type_name.as_str() {
			HELLO => RResult::ROk(ROption::RSome(PluginObject_TO::from_value(
				Hello,
				abi_stable::sabi_trait::TD_Opaque,
			))),
			ABSENT => RResult::ROk(ROption::RNone),
			ODD => RResult::RErr(FfiError::new(
				FfiErrorCode::IncompatibleType,
				"not a greeter",
			)),
			BROKEN => RResult::RErr(FfiError::construction("greeting table is empty")),
			other => RResult::RErr(FfiError::unknown_type(other)),
		}
	}

	/// Native libraries with the greetings module already opened at [`ASSET`].
	fn greetings() -> NativeLibraries {
		let module = plugin_loader_api::ComponentLibrary {
			library_name,
			library_version,
			type_names,
			create_instance,
		}
		.leak_into_prefix();

		let libraries = NativeLibraries::new(
			vec![ComponentLibrary::new("greetings", [PathBuf::from(ASSET)])],
			ContractAdapters::new(),
		);
		libraries
			.opened
			.write()
			.unwrap()
			.insert(PathBuf::from(ASSET), module);
		libraries
	}

	fn load(type_name: &str) -> Result<Box<PluginObjectBox>, crate::LoadFailure> {
		let loader = PluginLoader::new(Arc::new(TypeRegistry::new()), Arc::new(greetings()));
		loader.load::<PluginObjectBox, _>(&PluginInfo::new(
			"greeter",
			"",
			format!("{type_name}, greetings"),
		))
	}

	fn library_file(name: &str) -> String {
		format!("{name}.{}", std::env::consts::DLL_EXTENSION)
	}

	#[test]
	fn load_exported_type() {
		let object = load(HELLO).unwrap();
		assert_eq!(object.type_name().as_str(), HELLO);

		let ty = greetings()
			.load_type(Path::new(ASSET), HELLO)
			.unwrap()
			.unwrap();
		assert_eq!(ty.library(), Some("greetings"));
		assert!(ty.implements::<PluginObjectBox>());
	}

	#[test]
	fn type_not_exported() {
		assert!(greetings()
			.load_type(Path::new(ASSET), "Greetings.Klingon")
			.unwrap()
			.is_none());

		let failure = load("Greetings.Klingon").err().unwrap();
		assert_eq!(failure.stage, LoadStage::ResolutionFailed);
	}

	#[test]
	fn absent_instance() {
		let failure = load(ABSENT).err().unwrap();
		assert_eq!(failure.stage, LoadStage::InstantiationFailed);
		assert_eq!(failure.details[1], NO_INSTANCE);
	}

	#[test]
	fn incompatible_instance() {
		let failure = load(ODD).err().unwrap();
		assert_eq!(failure.stage, LoadStage::ContractMismatch);
		assert_eq!(failure.contract, "plugin_loader_api::PluginObject");
	}

	#[test]
	fn failed_construction_carries_message() {
		let failure = load(BROKEN).err().unwrap();
		assert_eq!(failure.stage, LoadStage::InstantiationFailed);
		assert_eq!(failure.details[1], "Error: greeting table is empty");
	}

	#[test]
	fn scan_directory_for_libraries() {
		let directory = TempDir::new().unwrap();
		for file in [library_file("zeta"), library_file("alpha"), String::from("notes.txt")] {
			std::fs::write(directory.path().join(file), b"").unwrap();
		}

		let libraries = NativeLibraries::from_config(
			&[LibraryConfig {
				name: String::from("greetings"),
				directory: Some(directory.path().to_path_buf()),
				assets: vec![PathBuf::from("extra.bin")],
			}],
			ContractAdapters::new(),
		)
		.unwrap();

		assert_eq!(
			libraries.libraries(),
			vec![ComponentLibrary::new(
				"greetings",
				[
					directory.path().join(library_file("alpha")),
					directory.path().join(library_file("zeta")),
					PathBuf::from("extra.bin"),
				]
			)]
		);
	}

	#[test]
	fn missing_directory() {
		let directory = TempDir::new().unwrap();
		let error = NativeLibraries::from_config(
			&[LibraryConfig {
				name: String::from("greetings"),
				directory: Some(directory.path().join("missing")),
				assets: Vec::new(),
			}],
			ContractAdapters::new(),
		)
		.unwrap_err();
		assert!(matches!(error, LibraryScanError::Directory { .. }));
	}

	#[test]
	fn library_without_assets() {
		let error = NativeLibraries::from_config(
			&[LibraryConfig {
				name: String::from("empty"),
				directory: None,
				assets: Vec::new(),
			}],
			ContractAdapters::new(),
		)
		.unwrap_err();
		assert_eq!(error.to_string(), "Component library empty has no assets");
	}

	#[test]
	fn invalid_asset_is_a_library_error() {
		let directory = TempDir::new().unwrap();
		let asset = directory.path().join(library_file("bogus"));
		std::fs::write(&asset, b"not a dynamic library").unwrap();

		let libraries = NativeLibraries::new(
			vec![ComponentLibrary::new("bogus", [asset.clone()])],
			ContractAdapters::new(),
		);
		let error = libraries.load_type(&asset, "Bogus.Type").unwrap_err();
		assert!(matches!(error, AssetError::Library { .. }));
	}

	#[test]
	fn fallback_skips_invalid_assets() {
		let directory = TempDir::new().unwrap();
		let asset = directory.path().join(library_file("bogus"));
		std::fs::write(&asset, b"not a dynamic library").unwrap();

		let libraries = NativeLibraries::new(
			vec![ComponentLibrary::new("bogus", [asset])],
			ContractAdapters::new(),
		);
		let loader = PluginLoader::new(Arc::new(TypeRegistry::new()), Arc::new(libraries));
		let failure = loader
			.load::<PluginObjectBox, _>(&PluginInfo::new("bogus", "", "Bogus.Type, bogus"))
			.err()
			.unwrap();
		assert_eq!(failure.stage, LoadStage::ResolutionFailed);
	}
}
