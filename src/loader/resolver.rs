use crate::error::{LoadStage, Rejection};
use crate::library::{LibraryMatch, LibraryRegistry};
use crate::loader::LoaderOptions;
use crate::registry::TypeSystem;
use crate::types::{ResolvedType, TypeReference};
use tracing::{debug, warn};

pub const NO_IMPLEMENTATION: &str = "Error: No data type is configured for the plug-in.";
pub const NOT_INSTALLED: &str = "Error: No data type with that name is installed.";

/// Resolves an implementation identifier, first directly through the type system,
/// then by scanning the component libraries.
pub fn resolve(
	types: &dyn TypeSystem,
	libraries: &dyn LibraryRegistry,
	options: &LoaderOptions,
	identifier: &str,
) -> Result<ResolvedType, Rejection> {
	let identifier = identifier.trim();
	if identifier.is_empty() {
		debug!("No implementation bound");
		return Err(Rejection::new(
			LoadStage::NoImplementationBound,
			vec![NO_IMPLEMENTATION.to_owned()],
		));
	}

	debug!(implementation = %identifier, "Resolving plug-in type");
	match types.resolve_type(identifier) {
		Ok(Some(ty)) => {
			debug!(implementation = %identifier, "Resolved plug-in type directly");
			return Ok(ty);
		}
		Ok(None) => {}
		Err(error) => {
			debug!(implementation = %identifier, %error, "Direct resolution failed");
			return Err(Rejection::new(
				LoadStage::ResolutionFailed,
				vec![format!("Data type: {identifier}"), format!("Error: {error}")],
			));
		}
	}

	if options.fallback {
		if let Some(ty) = scan_libraries(libraries, options.library_match, identifier) {
			return Ok(ty);
		}
	}

	Err(Rejection::new(
		LoadStage::ResolutionFailed,
		vec![format!("Data type: {identifier}"), NOT_INSTALLED.to_owned()],
	))
}

/// Best-effort scan of the first library matching the identifier's library hint.
/// Assets that fail to load are skipped.
fn scan_libraries(
	libraries: &dyn LibraryRegistry,
	matching: LibraryMatch,
	identifier: &str,
) -> Option<ResolvedType> {
	let reference = TypeReference::parse(identifier);
	let Some(library) = libraries
		.libraries()
		.into_iter()
		.find(|library| matching.matches(&library.name, reference.library_hint))
	else {
		debug!(hint = %reference.library_hint, "No component library matches");
		return None;
	};

	debug!(
		library = %library.name,
		assets = library.assets.len(),
		type_name = %reference.type_name,
		"Scanning component library"
	);

	library
		.assets
		.iter()
		.find_map(|asset| match libraries.load_type(asset, reference.type_name) {
			Ok(Some(ty)) => {
				debug!(library = %library.name, asset = %asset.display(), "Found plug-in type");
				Some(ty)
			}
			Ok(None) => None,
			Err(error) => {
				warn!(
					library = %library.name,
					asset = %asset.display(),
					%error,
					"Skipping component library asset"
				);
				None
			}
		})
}
