//! plugin-loader component library API
//!
//! This crate defines the FFI-safe interface that native component libraries
//! export so that `plugin-loader` can resolve plug-in types from them.
//! Library authors should depend on this crate, implement [`PluginObject`] for
//! each exported type, and declare the library root module.
//!
//! # Example
//!
//! ```ignore
//! use plugin_loader_api::prelude::*;
//!
//! struct English;
//!
//! impl PluginObject for English {
//!     fn type_name(&self) -> RString {
//!         "Greetings.English".into()
//!     }
//!
//!     fn contracts(&self) -> RVec<RString> {
//!         RVec::from(vec![RString::from("greetings.Greeter")])
//!     }
//!
//!     fn invoke(&self, operation: RStr<'_>, payload: RStr<'_>) -> FfiResult<RString> {
//!         // Implementation here
//!     }
//! }
//!
//! fn create(type_name: &str) -> FfiResult<ROption<PluginObjectBox>> {
//!     match type_name {
//!         "Greetings.English" => RResult::ROk(ROption::RSome(PluginObject_TO::from_value(
//!             English,
//!             abi_stable::sabi_trait::TD_Opaque,
//!         ))),
//!         other => RResult::RErr(FfiError::unknown_type(other)),
//!     }
//! }
//!
//! declare_component_library! {
//!     library_name: "greetings",
//!     version: env!("CARGO_PKG_VERSION"),
//!     type_names: ["Greetings.English"],
//!     create_instance: create,
//! }
//! ```

#![allow(clippy::module_name_repetitions)]

use abi_stable::{
	library::RootModule,
	package_version_strings,
	sabi_types::VersionStrings,
	std_types::{ROption, RStr, RString, RVec},
	StableAbi,
};

pub mod object;
pub mod types;

pub use object::{PluginObject, PluginObjectBox, PluginObject_TO};
pub use types::*;

/// Prelude module for convenient imports.
pub mod prelude {
	pub use crate::object::{PluginObject, PluginObjectBox, PluginObject_TO};
	pub use crate::types::*;
	pub use crate::{declare_component_library, ComponentLibrary, ComponentLibraryRef};

	pub use abi_stable::std_types::{RBox, ROption, RResult, RStr, RString, RVec};
}

/// Root module that component libraries must export.
///
/// This struct defines the entry points the host uses to enumerate and
/// construct the plug-in types a library provides.
#[repr(C)]
#[derive(StableAbi)]
#[sabi(kind(Prefix(prefix_ref = ComponentLibraryRef)))]
#[sabi(missing_field(panic))]
pub struct ComponentLibrary {
	/// Returns the library name.
	pub library_name: extern "C" fn() -> RString,

	/// Returns the library version.
	pub library_version: extern "C" fn() -> RString,

	/// Returns the implementation identifiers of all exported types.
	pub type_names: extern "C" fn() -> RVec<RString>,

	/// Create a default instance of an exported type.
	///
	/// Returns `RNone` if the type exists but produced no instance.
	#[sabi(last_prefix_field)]
	pub create_instance: extern "C" fn(type_name: RStr<'_>) -> FfiResult<ROption<PluginObjectBox>>,
}

impl RootModule for ComponentLibraryRef {
	abi_stable::declare_root_module_statics! {ComponentLibraryRef}

	const BASE_NAME: &'static str = "plugin_component";
	const NAME: &'static str = "plugin_component";
	const VERSION_STRINGS: VersionStrings = package_version_strings!();
}

/// Helper macro for declaring a component library.
///
/// This macro generates the required `get_root_module` function that
/// the host uses to load the library.
///
/// # Example
///
/// ```ignore
/// declare_component_library! {
///     library_name: "greetings",
///     version: "0.1.0",
///     type_names: ["Greetings.English", "Greetings.German"],
///     create_instance: |type_name| {
///         // Construct the requested type
///         RResult::ROk(ROption::RNone)
///     },
/// }
/// ```
#[macro_export]
macro_rules! declare_component_library {
	(
        library_name: $name:expr,
        version: $version:expr,
        type_names: [$($type_name:expr),* $(,)?],
        create_instance: $create:expr $(,)?
    ) => {
		/// Component library entry point.
		///
		/// This function is called by the host to get the library root module.
		#[::abi_stable::export_root_module]
		pub fn get_root_module() -> $crate::ComponentLibraryRef {
			use ::abi_stable::prefix_type::PrefixTypeTrait;

			extern "C" fn library_name() -> ::abi_stable::std_types::RString {
				::abi_stable::std_types::RString::from($name)
			}

			extern "C" fn library_version() -> ::abi_stable::std_types::RString {
				::abi_stable::std_types::RString::from($version)
			}

			extern "C" fn type_names(
			) -> ::abi_stable::std_types::RVec<::abi_stable::std_types::RString> {
				let names: &[&str] = &[$($type_name),*];
				names
					.iter()
					.map(|name| ::abi_stable::std_types::RString::from(*name))
					.collect()
			}

			extern "C" fn create_instance(
				type_name: ::abi_stable::std_types::RStr<'_>,
			) -> $crate::FfiResult<::abi_stable::std_types::ROption<$crate::PluginObjectBox>> {
				let create_fn: fn(
					&str,
				) -> $crate::FfiResult<
					::abi_stable::std_types::ROption<$crate::PluginObjectBox>,
				> = $create;
				create_fn(type_name.as_str())
			}

			$crate::ComponentLibrary {
				library_name,
				library_version,
				type_names,
				create_instance,
			}
			.leak_into_prefix()
		}
	};
}
