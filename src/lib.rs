//! Resolves named plug-ins to implementations of a capability contract.
//!
//! A host describes a plug-in with a [`Descriptor`]: a display name, the
//! contract it must satisfy, and an implementation identifier of the form
//! `"<type name>[, <library>]"`. The [`PluginLoader`] resolves the identifier
//! through an injected [`TypeSystem`], falls back to scanning the component
//! libraries of an injected [`LibraryRegistry`], constructs a default instance
//! and checks it against the contract. Every failure is reported as a single
//! [`LoadFailure`].
//!
//! ```
//! use plugin_loader::{Contract, InMemoryLibraries, PluginInfo, PluginLoader, ResolvedType, TypeRegistry};
//! use std::sync::Arc;
//!
//! trait Succession {
//!     fn next(&self, value: u64) -> u64;
//! }
//! impl Contract for dyn Succession {}
//!
//! #[derive(Default)]
//! struct Increment;
//! impl Succession for Increment {
//!     fn next(&self, value: u64) -> u64 {
//!         value + 1
//!     }
//! }
//!
//! let types = TypeRegistry::new().with(
//!     ResolvedType::new::<Increment>("Sequences.Increment")
//!         .conforms_to(|increment: Increment| -> Box<dyn Succession> { Box::new(increment) }),
//! );
//! let loader = PluginLoader::new(Arc::new(types), Arc::new(InMemoryLibraries::new()));
//!
//! let succession = loader
//!     .load::<dyn Succession, _>(&PluginInfo::new("succession", "", "Sequences.Increment"))
//!     .unwrap();
//! assert_eq!(succession.next(41), 42);
//! ```

pub mod config;
mod descriptor;
mod error;
mod library;
mod loader;
mod registry;
mod types;

#[cfg(feature = "native")]
pub mod native;

pub use crate::config::{AppConfig, LibraryConfig, LoggingConfig};
pub use descriptor::{Descriptor, PluginInfo};
pub use error::{AssetError, ConstructError, LoadFailure, LoadStage, ResolveError, LOAD_FAILURE_HEADER};
pub use library::{ComponentLibrary, InMemoryLibraries, LibraryMatch, LibraryRegistry};
pub use loader::{LoaderOptions, PluginLoader, NOT_INSTALLED, NO_IMPLEMENTATION, NO_INSTANCE};
pub use registry::{TypeRegistry, TypeSystem};
pub use types::{Contract, Instance, ResolvedType, TypeReference};
