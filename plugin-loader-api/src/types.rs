//! FFI-safe type definitions shared by the host and component libraries.
//!
//! All types crossing the FFI boundary must be `#[repr(C)]` and derive `StableAbi`.

use abi_stable::{
	std_types::{RResult, RString},
	StableAbi,
};

/// FFI-safe error type for component library operations.
#[repr(C)]
#[derive(StableAbi, Clone, Debug)]
pub struct FfiError {
	pub code: FfiErrorCode,
	pub message: RString,
}

impl FfiError {
	pub fn new(code: FfiErrorCode, message: impl Into<String>) -> Self {
		Self {
			code,
			message: RString::from(message.into()),
		}
	}

	pub fn unknown_type(type_name: &str) -> Self {
		Self::new(
			FfiErrorCode::UnknownType,
			format!("{type_name} is not exported by this library"),
		)
	}

	pub fn construction(message: impl Into<String>) -> Self {
		Self::new(FfiErrorCode::ConstructionFailed, message)
	}

	pub fn invalid_request(message: impl Into<String>) -> Self {
		Self::new(FfiErrorCode::InvalidRequest, message)
	}

	pub fn unsupported(operation: &str) -> Self {
		Self::new(
			FfiErrorCode::UnsupportedOperation,
			format!("operation {operation} is not supported"),
		)
	}
}

impl std::fmt::Display for FfiError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}: {}", self.code, self.message)
	}
}

impl std::error::Error for FfiError {}

/// Error codes reported by component libraries.
#[repr(C)]
#[derive(StableAbi, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
	/// The requested type is not exported by the library
	UnknownType,
	/// The type's default constructor failed
	ConstructionFailed,
	/// The constructed object is not of the expected kind
	IncompatibleType,
	/// Invalid operation payload
	InvalidRequest,
	/// The object does not implement the requested operation
	UnsupportedOperation,
	/// Internal library error
	Internal,
}

/// FFI-safe result type.
pub type FfiResult<T> = RResult<T, FfiError>;
