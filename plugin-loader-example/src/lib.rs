//! Example component library demonstrating how to export plug-in types.
//!
//! The library is named `greetings` and exports greeter plug-ins satisfying the
//! `greetings.Greeter` contract, plus two types whose construction fails so
//! hosts can exercise their error reporting.

use abi_stable::std_types::{ROption, RResult, RStr, RString, RVec};
use plugin_loader_api::{
	declare_component_library, FfiError, FfiResult, PluginObject, PluginObjectBox,
	PluginObject_TO,
};
use serde::{Deserialize, Serialize};

/// Qualified name of the contract all greeters satisfy.
pub const GREETER_CONTRACT: &str = "greetings.Greeter";

pub const ENGLISH: &str = "Greetings.English";
pub const GERMAN: &str = "Greetings.German";
/// Construction of this type always fails.
pub const BROKEN: &str = "Greetings.Broken";
/// Construction of this type yields no object.
pub const ABSENT: &str = "Greetings.Absent";

/// Payload of the `greet` operation.
#[derive(Debug, Deserialize)]
struct GreetRequest {
	name: String,
}

/// Result of the `greet` operation.
#[derive(Debug, Serialize)]
struct GreetResponse {
	message: String,
}

struct Greeter {
	type_name: &'static str,
	salutation: &'static str,
}

impl Greeter {
	fn greet(&self, payload: &str) -> FfiResult<RString> {
		let request: GreetRequest = match serde_json::from_str(payload) {
			Ok(request) => request,
			Err(e) => {
				return RResult::RErr(FfiError::invalid_request(format!(
					"Failed to parse greet payload: {e}"
				)))
			}
		};

		let response = GreetResponse {
			message: format!("{}, {}!", self.salutation, request.name),
		};
		match serde_json::to_string(&response) {
			Ok(json) => RResult::ROk(RString::from(json)),
			Err(e) => RResult::RErr(FfiError::invalid_request(e.to_string())),
		}
	}
}

impl PluginObject for Greeter {
	fn type_name(&self) -> RString {
		RString::from(self.type_name)
	}

	fn contracts(&self) -> RVec<RString> {
		RVec::from(vec![RString::from(GREETER_CONTRACT)])
	}

	fn invoke(&self, operation: RStr<'_>, payload: RStr<'_>) -> FfiResult<RString> {
		match operation.as_str() {
			"greet" => self.greet(payload.as_str()),
			other => RResult::RErr(FfiError::unsupported(other)),
		}
	}
}

fn boxed(greeter: Greeter) -> FfiResult<ROption<PluginObjectBox>> {
	let object: PluginObjectBox =
		PluginObject_TO::from_value(greeter, abi_stable::sabi_trait::TD_Opaque);
	RResult::ROk(ROption::RSome(object))
}

fn construct_greeter(type_name: &str) -> FfiResult<ROption<PluginObjectBox>> {
	match type_name {
		ENGLISH => boxed(Greeter {
			type_name: ENGLISH,
			salutation: "Hello",
		}),
		GERMAN => boxed(Greeter {
			type_name: GERMAN,
			salutation: "Hallo",
		}),
		BROKEN => RResult::RErr(FfiError::construction(
			"the broken greeter refuses to be constructed",
		)),
		ABSENT => RResult::ROk(ROption::RNone),
		other => RResult::RErr(FfiError::unknown_type(other)),
	}
}

declare_component_library! {
	library_name: "greetings",
	version: env!("CARGO_PKG_VERSION"),
	type_names: [ENGLISH, GERMAN, BROKEN, ABSENT],
	create_instance: construct_greeter,
}
