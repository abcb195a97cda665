//! Adapters that turn native plug-in objects into host contracts.

use crate::types::{Conformance, Contract, Instance, ResolvedType};
use plugin_loader_api::PluginObjectBox;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

type Adapter = Arc<dyn Fn(PluginObjectBox) -> Instance + Send + Sync>;

#[derive(Clone)]
struct Registration {
	contract: &'static str,
	adapt: Adapter,
}

/// Host-registered adapters, one per contract.
///
/// A native object is adapted to a contract only if it lists the contract's
/// qualified name among its [`contracts`](plugin_loader_api::PluginObject::contracts).
#[derive(Clone, Default)]
pub struct ContractAdapters {
	adapters: HashMap<TypeId, Registration>,
}

impl ContractAdapters {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register the adapter for contract `C`, replacing any previous one.
	pub fn register<C, F>(&mut self, adapter: F) -> &mut Self
	where
		C: Contract + ?Sized,
		F: Fn(PluginObjectBox) -> Box<C> + Send + Sync + 'static,
	{
		let adapt: Adapter = Arc::new(move |object| Box::new(adapter(object)) as Instance);
		self.adapters.insert(
			TypeId::of::<C>(),
			Registration {
				contract: C::qualified_name(),
				adapt,
			},
		);
		self
	}

	/// Builder style [`Self::register`].
	#[must_use]
	pub fn with<C, F>(mut self, adapter: F) -> Self
	where
		C: Contract + ?Sized,
		F: Fn(PluginObjectBox) -> Box<C> + Send + Sync + 'static,
	{
		self.register::<C, F>(adapter);
		self
	}

	/// Qualified names of all adaptable contracts.
	pub fn contracts(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.adapters.values().map(|registration| registration.contract)
	}

	/// Declares the conformances of a native type: the raw object, plus every
	/// registered contract.
	pub(crate) fn apply(&self, ty: ResolvedType) -> ResolvedType {
		let ty = ty.with_cast::<PluginObjectBox, _>(|object| object.downcast::<PluginObjectBox>());
		self.adapters
			.iter()
			.fold(ty, |ty, (contract, registration)| {
				ty.with_conformance(*contract, conformance(registration.clone()))
			})
	}
}

fn conformance(registration: Registration) -> Conformance {
	Arc::new(move |object: Instance| {
		let raw = object.downcast::<PluginObjectBox>()?;
		let advertised = raw
			.contracts()
			.iter()
			.any(|contract| contract.as_str() == registration.contract);
		if advertised {
			Ok((registration.adapt)(*raw))
		} else {
			Err(raw as Instance)
		}
	})
}

impl std::fmt::Debug for ContractAdapters {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ContractAdapters")
			.field("contracts", &self.contracts().collect::<Vec<_>>())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::LoadStage;
	use crate::library::InMemoryLibraries;
	use crate::registry::TypeRegistry;
	use crate::PluginLoader;
	use abi_stable::std_types::{RResult, RStr, RString, RVec};
	use plugin_loader_api::{FfiError, FfiResult, PluginObject, PluginObject_TO};

	trait Greeter {
		fn greet(&self, name: &str) -> String;
	}

	impl Contract for dyn Greeter {
		fn qualified_name() -> &'static str {
			"greetings.Greeter"
		}
	}

	trait Farewell {}

	impl Contract for dyn Farewell {
		fn qualified_name() -> &'static str {
			"greetings.Farewell"
		}
	}

	/// Wraps a native object to implement [`Greeter`].
	struct NativeGreeter(PluginObjectBox);

	impl Greeter for NativeGreeter {
		fn greet(&self, name: &str) -> String {
			match self.0.invoke(RStr::from("greet"), RStr::from(name)) {
				RResult::ROk(greeting) => greeting.into_string(),
				RResult::RErr(error) => error.to_string(),
			}
		}
	}

	struct Farewells;

	impl Farewell for Farewells {}

	struct Hello;

	impl PluginObject for Hello {
		fn type_name(&self) -> RString {
			RString::from("Greetings.Hello")
		}

		fn contracts(&self) -> RVec<RString> {
			RVec::from(vec![RString::from("greetings.Greeter")])
		}

		fn invoke(&self, operation: RStr<'_>, payload: RStr<'_>) -> FfiResult<RString> {
			match operation.as_str() {
				"greet" => RResult::ROk(RString::from(format!("Hello, {payload}!"))),
				other => RResult::RErr(FfiError::unsupported(other)),
			}
		}
	}

	fn hello() -> ResolvedType {
		ResolvedType::with_constructor("Greetings.Hello", || {
			let object: PluginObjectBox =
				PluginObject_TO::from_value(Hello, abi_stable::sabi_trait::TD_Opaque);
			Ok(Some(Box::new(object) as Instance))
		})
	}

	fn adapters() -> ContractAdapters {
		ContractAdapters::new()
			.with(|object| -> Box<dyn Greeter> { Box::new(NativeGreeter(object)) })
			.with(|_object| -> Box<dyn Farewell> { Box::new(Farewells) })
	}

	fn loader() -> PluginLoader {
		PluginLoader::new(Arc::new(TypeRegistry::new()), Arc::new(InMemoryLibraries::new()))
	}

	#[test]
	fn adapt_advertised_contract() {
		let ty = adapters().apply(hello());
		assert!(ty.implements::<dyn Greeter>());

		let greeter = loader().load_type::<dyn Greeter>("hello", &ty).unwrap();
		assert_eq!(greeter.greet("World"), "Hello, World!");
	}

	#[test]
	fn raw_object_is_always_available() {
		let ty = adapters().apply(hello());
		let object = loader().load_type::<PluginObjectBox>("hello", &ty).unwrap();
		assert_eq!(object.type_name().as_str(), "Greetings.Hello");
	}

	#[test]
	fn unadvertised_contract_is_a_mismatch() {
		let ty = adapters().apply(hello());
		assert!(ty.implements::<dyn Farewell>());

		let failure = loader()
			.load_type::<dyn Farewell>("hello", &ty)
			.err()
			.unwrap();
		assert_eq!(failure.stage, LoadStage::ContractMismatch);
		assert_eq!(failure.contract, "greetings.Farewell");
	}

	#[test]
	fn list_contracts() {
		let mut contracts: Vec<_> = adapters().contracts().collect();
		contracts.sort_unstable();
		assert_eq!(contracts, vec!["greetings.Farewell", "greetings.Greeter"]);
	}
}
