//! Native component libraries.
//!
//! This module loads dynamic libraries built against `plugin-loader-api` and
//! exposes their exported types to the fallback resolution phase. Constructed
//! objects are available as raw [`PluginObjectBox`]es and, through
//! [`ContractAdapters`], as host contracts.

mod adapters;
mod registry;

use crate::types::Contract;
use plugin_loader_api::PluginObjectBox;

pub use adapters::ContractAdapters;
pub use registry::{LibraryScanError, NativeLibraries};

impl Contract for PluginObjectBox {
	fn qualified_name() -> &'static str {
		"plugin_loader_api::PluginObject"
	}
}
