use crate::error::ConstructError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased plug-in object as produced by a type's default constructor.
pub type Instance = Box<dyn Any>;

type Constructor = Arc<dyn Fn() -> Result<Option<Instance>, ConstructError> + Send + Sync>;

/// Turns a constructed [`Instance`] into a boxed contract object, stored again as an
/// [`Instance`]. Returns the untouched object if it does not satisfy the contract.
pub(crate) type Conformance = Arc<dyn Fn(Instance) -> Result<Instance, Instance> + Send + Sync>;

/// A capability contract that loaded plug-ins must satisfy.
///
/// Usually implemented for a trait object type:
///
/// ```
/// use plugin_loader::Contract;
///
/// pub trait Succession {
///     fn next(&self, value: u64) -> u64;
/// }
///
/// impl Contract for dyn Succession {}
/// ```
pub trait Contract: 'static {
	/// Fully qualified name of the contract, used in diagnostics and to match the
	/// contracts advertised by native plug-in objects.
	///
	/// Defaults to the type's path, without the `dyn` of trait objects.
	fn qualified_name() -> &'static str {
		let name = std::any::type_name::<Self>();
		name.strip_prefix("dyn ").unwrap_or(name)
	}
}

/// An implementation identifier split into its type name and library hint.
///
/// Identifiers have the form `"<type name>[, <library>[, ...]]"`; only the first two
/// segments are significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeReference<'a> {
	pub type_name: &'a str,
	/// Empty if the identifier names no library.
	pub library_hint: &'a str,
}

impl<'a> TypeReference<'a> {
	pub fn parse(identifier: &'a str) -> Self {
		let mut segments = identifier.split(',').map(str::trim);
		let type_name = segments.next().unwrap_or_default();
		let library_hint = segments.next().unwrap_or_default();
		Self {
			type_name,
			library_hint,
		}
	}
}

/// A loadable plug-in type: its default constructor and the contracts it conforms to.
///
/// Cloning is cheap and yields a handle to the same type.
#[derive(Clone)]
pub struct ResolvedType {
	name: String,
	library: Option<String>,
	constructor: Constructor,
	conformances: HashMap<TypeId, Conformance>,
}

impl ResolvedType {
	/// A type constructed through its [`Default`] implementation.
	///
	/// ```
	/// use plugin_loader::{Contract, ResolvedType};
	///
	/// trait Greeter {
	///     fn greet(&self) -> String;
	/// }
	/// impl Contract for dyn Greeter {}
	///
	/// #[derive(Default)]
	/// struct English;
	/// impl Greeter for English {
	///     fn greet(&self) -> String {
	///         "Hello".into()
	///     }
	/// }
	///
	/// let ty = ResolvedType::new::<English>("Greetings.English")
	///     .conforms_to(|greeter: English| -> Box<dyn Greeter> { Box::new(greeter) });
	/// assert!(ty.implements::<dyn Greeter>());
	/// ```
	pub fn new<T: Default + 'static>(name: impl Into<String>) -> Self {
		Self::with_constructor(name, || Ok(Some(Box::new(T::default()) as Instance)))
	}

	/// A type with a custom default constructor.
	pub fn with_constructor<F>(name: impl Into<String>, constructor: F) -> Self
	where
		F: Fn() -> Result<Option<Instance>, ConstructError> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			library: None,
			constructor: Arc::new(constructor),
			conformances: HashMap::new(),
		}
	}

	/// Records the component library hosting this type.
	pub fn in_library(mut self, library: impl Into<String>) -> Self {
		self.library = Some(library.into());
		self
	}

	/// Declares that instances of `T` satisfy the contract `C`.
	pub fn conforms_to<T, C, F>(self, upcast: F) -> Self
	where
		T: 'static,
		C: Contract + ?Sized,
		F: Fn(T) -> Box<C> + Send + Sync + 'static,
	{
		self.with_cast::<C, _>(move |object| {
			object.downcast::<T>().map(|concrete| upcast(*concrete))
		})
	}

	/// Declares a cast from constructed objects to the contract `C`. The cast may
	/// reject an object by handing it back.
	pub fn with_cast<C, F>(self, cast: F) -> Self
	where
		C: Contract + ?Sized,
		F: Fn(Instance) -> Result<Box<C>, Instance> + Send + Sync + 'static,
	{
		self.with_conformance(
			TypeId::of::<C>(),
			Arc::new(move |object| cast(object).map(|contract| Box::new(contract) as Instance)),
		)
	}

	pub(crate) fn with_conformance(mut self, contract: TypeId, conformance: Conformance) -> Self {
		self.conformances.insert(contract, conformance);
		self
	}

	/// The implementation identifier this type was registered under.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn library(&self) -> Option<&str> {
		self.library.as_deref()
	}

	/// Whether a conformance to the contract `C` is declared.
	///
	/// A declared conformance may still reject individual objects, see [`Self::with_cast`].
	pub fn implements<C: Contract + ?Sized>(&self) -> bool {
		self.conformances.contains_key(&TypeId::of::<C>())
	}

	/// Whether both handles refer to the same type.
	pub fn same_type(&self, other: &Self) -> bool {
		self.name == other.name && Arc::ptr_eq(&self.constructor, &other.constructor)
	}

	/// Runs the default constructor.
	///
	/// # Errors
	/// Returns the constructor's error.
	pub fn construct(&self) -> Result<Option<Instance>, ConstructError> {
		(self.constructor)()
	}

	/// Casts a constructed object to the contract `C`.
	///
	/// Returns `None` if no conformance to `C` is declared or the object was rejected.
	pub fn cast<C: Contract + ?Sized>(&self, object: Instance) -> Option<Box<C>> {
		let conformance = self.conformances.get(&TypeId::of::<C>())?;
		let contract = conformance(object).ok()?;
		contract.downcast::<Box<C>>().ok().map(|contract| *contract)
	}
}

impl fmt::Debug for ResolvedType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResolvedType")
			.field("name", &self.name)
			.field("library", &self.library)
			.field("conformances", &self.conformances.len())
			.finish_non_exhaustive()
	}
}
