mod model;
mod route;

use proc_macro::TokenStream;

/// Creates a documentation function for an aide route, named after the
/// handler with the suffix `_docs`. The first doc-comment line becomes the
/// operation summary, the rest its description.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates two input structs for the annotated entity: `Create{Name}Input`
/// with the writable fields verbatim, and `Update{Name}Input` with every
/// writable field wrapped in `Option`. Fields marked
/// `#[serde(skip_deserializing)]` or `#[serde(skip)]` are server-assigned
/// and excluded from both.
#[proc_macro_attribute]
pub fn model(_args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(input)
}
