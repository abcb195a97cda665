//! Plug-in object trait definition.
//!
//! Every instance created by a component library crosses the FFI boundary as a
//! [`PluginObjectBox`]. Hosts wrap it in adapters that implement their own
//! capability contracts.

use abi_stable::{
	sabi_trait,
	std_types::{RBox, RStr, RString, RVec},
};

use crate::types::FfiResult;

/// FFI-safe plug-in object.
#[sabi_trait]
pub trait PluginObject: Send + Sync {
	/// The implementation identifier this object was created for.
	fn type_name(&self) -> RString;

	/// Qualified names of the capability contracts this object satisfies.
	fn contracts(&self) -> RVec<RString>;

	/// Invoke an operation of the object.
	///
	/// # Arguments
	/// * `operation` - Operation name, scoped by the contract that defines it
	/// * `payload` - Operation arguments, encoded as JSON
	///
	/// # Returns
	/// The JSON encoded operation result, or an error.
	#[sabi(last_prefix_field)]
	fn invoke(&self, operation: RStr<'_>, payload: RStr<'_>) -> FfiResult<RString>;
}

/// Boxed plug-in object as returned by `create_instance`.
pub type PluginObjectBox = PluginObject_TO<'static, RBox<()>>;
