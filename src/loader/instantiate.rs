use crate::error::{ConstructError, LoadStage, Rejection};
use crate::types::{Contract, ResolvedType};
use tracing::debug;

pub const NO_INSTANCE: &str = "Error: Could not create an instance of the plug-in.";

/// Constructs a default instance of `resolved` and casts it to the contract `C`.
pub fn instantiate<C: Contract + ?Sized>(resolved: &ResolvedType) -> Result<Box<C>, Rejection> {
	debug!(
		implementation = %resolved.name(),
		contract = C::qualified_name(),
		"Instantiating plug-in type"
	);

	let data_type = format!("Data type: {}", resolved.name());
	let object = match resolved.construct() {
		Ok(Some(object)) => object,
		Ok(None) => {
			return Err(Rejection::new(
				LoadStage::InstantiationFailed,
				vec![data_type, NO_INSTANCE.to_owned()],
			))
		}
		Err(ConstructError::IncompatibleType) => return Err(mismatch::<C>(data_type)),
		Err(error) => {
			return Err(Rejection::new(
				LoadStage::InstantiationFailed,
				vec![data_type, format!("Error: {error}")],
			))
		}
	};

	resolved
		.cast::<C>(object)
		.ok_or_else(|| mismatch::<C>(data_type))
}

fn mismatch<C: Contract + ?Sized>(data_type: String) -> Rejection {
	Rejection::new(
		LoadStage::ContractMismatch,
		vec![
			data_type,
			format!(
				"Error: The plug-in does not implement the {} interface.",
				C::qualified_name()
			),
		],
	)
}
