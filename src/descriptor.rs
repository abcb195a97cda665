use crate::types::Contract;
use serde::{Deserialize, Serialize};

/// Metadata identifying a plug-in to load.
pub trait Descriptor {
	/// The plug-in name, used to attribute failures.
	fn name(&self) -> &str;

	/// Qualified name of the capability contract the plug-in must satisfy.
	fn contract(&self) -> &str;

	/// The implementation identifier: empty, or `"<type name>[, <library>]"`.
	fn implementation(&self) -> &str;
}

/// A plain [`Descriptor`], e.g. declared in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
	pub name: String,
	#[serde(default)]
	pub contract: String,
	#[serde(default)]
	pub implementation: String,
}

impl PluginInfo {
	pub fn new(
		name: impl Into<String>,
		contract: impl Into<String>,
		implementation: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			contract: contract.into(),
			implementation: implementation.into(),
		}
	}

	/// A descriptor for a plug-in that must satisfy the contract `C`.
	pub fn for_contract<C: Contract + ?Sized>(
		name: impl Into<String>,
		implementation: impl Into<String>,
	) -> Self {
		Self::new(name, C::qualified_name(), implementation)
	}
}

impl Descriptor for PluginInfo {
	fn name(&self) -> &str {
		&self.name
	}

	fn contract(&self) -> &str {
		&self.contract
	}

	fn implementation(&self) -> &str {
		&self.implementation
	}
}
