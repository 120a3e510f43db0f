//! Implementation of `#[derive(Record)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
	Data, DeriveInput, Error, Fields, GenericArgument, Ident, LitStr, PathArguments, Result, Type,
};

/// How a relation field wraps its related type.
enum Wrap {
	/// `R`: direct value.
	Plain,
	/// `Option<R>`: assigned as `Some`.
	Option,
	/// `Vec<R>`: appended to.
	Vec,
}

struct FieldInfo {
	ident: Ident,
	name: String,
	ty: Type,
	column: Option<String>,
	relation: bool,
	skip: bool,
}

pub(crate) fn derive_record_impl(input: DeriveInput) -> Result<TokenStream> {
	let ident = &input.ident;

	let mut table: Option<String> = None;
	for attr in &input.attrs {
		if attr.path().is_ident("record") {
			attr.parse_nested_meta(|meta| {
				if meta.path.is_ident("table") {
					let value: LitStr = meta.value()?.parse()?;
					table = Some(value.value());
					Ok(())
				} else {
					Err(meta.error("unsupported record attribute; expected `table`"))
				}
			})?;
		}
	}

	let fields = match &input.data {
		Data::Struct(data) => match &data.fields {
			Fields::Named(named) => &named.named,
			_ => {
				return Err(Error::new_spanned(
					ident,
					"Record requires a struct with named fields",
				));
			}
		},
		_ => {
			return Err(Error::new_spanned(
				ident,
				"Record can only be derived for structs",
			));
		}
	};

	let mut infos = Vec::new();
	for field in fields {
		let Some(field_ident) = field.ident.clone() else {
			continue;
		};
		let mut column: Option<String> = None;
		let mut relation = false;
		let mut skip = false;
		for attr in &field.attrs {
			if attr.path().is_ident("record") {
				attr.parse_nested_meta(|meta| {
					if meta.path.is_ident("column") {
						let value: LitStr = meta.value()?.parse()?;
						column = Some(value.value());
						Ok(())
					} else if meta.path.is_ident("relation") {
						relation = true;
						Ok(())
					} else if meta.path.is_ident("skip") {
						skip = true;
						Ok(())
					} else {
						Err(meta.error(
							"unsupported record attribute; expected `column`, `relation`, or `skip`",
						))
					}
				})?;
			}
		}
		infos.push(FieldInfo {
			name: field_ident.to_string(),
			ident: field_ident,
			ty: field.ty.clone(),
			column,
			relation,
			skip,
		});
	}

	let table_impl = table.map(|table| {
		quote! {
			fn table() -> ::core::option::Option<&'static str> {
				::core::option::Option::Some(#table)
			}
		}
	});

	let column_entries = infos
		.iter()
		.filter(|info| !info.skip)
		.filter_map(|info| {
			info.column.as_ref().map(|column| {
				let name = &info.name;
				quote! { (#name, #column), }
			})
		})
		.collect::<Vec<_>>();

	let field_arms = infos
		.iter()
		.filter(|info| !info.skip && !info.relation)
		.map(|info| {
			let name = &info.name;
			let ident = &info.ident;
			quote! {
				#name => ::core::result::Result::Ok(::seedling::Value::from(self.#ident.clone())),
			}
		})
		.collect::<Vec<_>>();

	let set_field_arms = infos
		.iter()
		.filter(|info| !info.skip)
		.map(|info| {
			let name = &info.name;
			let ident = &info.ident;
			if info.relation {
				quote! {
					#name => ::core::result::Result::Err(
						::seedling::FactoryError::unsettable(#name, "relation field"),
					),
				}
			} else {
				quote! {
					#name => {
						self.#ident = ::seedling::FromValue::from_value(value)
							.map_err(|err| err.for_field(#name))?;
						::core::result::Result::Ok(())
					}
				}
			}
		})
		.collect::<Vec<_>>();

	let mut set_related_arms = Vec::new();
	let mut push_related_arms = Vec::new();
	for info in infos.iter().filter(|info| info.relation && !info.skip) {
		let name = &info.name;
		let ident = &info.ident;
		let (wrap, inner) = classify(&info.ty);
		let downcast = quote! {
			let related = related
				.downcast::<#inner>()
				.map_err(|_| ::seedling::FactoryError::related_mismatch::<#inner>(#name))?;
		};
		match wrap {
			Wrap::Plain => {
				set_related_arms.push(quote! {
					#name => {
						#downcast
						self.#ident = *related;
						::core::result::Result::Ok(())
					}
				});
				push_related_arms.push(scalar_push_arm(name));
			}
			Wrap::Option => {
				set_related_arms.push(quote! {
					#name => {
						#downcast
						self.#ident = ::core::option::Option::Some(*related);
						::core::result::Result::Ok(())
					}
				});
				push_related_arms.push(scalar_push_arm(name));
			}
			Wrap::Vec => {
				// Scalar assignment to a collection relation appends.
				let push = quote! {
					#name => {
						#downcast
						self.#ident.push(*related);
						::core::result::Result::Ok(())
					}
				};
				set_related_arms.push(push.clone());
				push_related_arms.push(push);
			}
		}
	}

	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	Ok(quote! {
		#[automatically_derived]
		impl #impl_generics ::seedling::Record for #ident #ty_generics #where_clause {
			#table_impl

			fn columns() -> &'static [(&'static str, &'static str)] {
				&[#(#column_entries)*]
			}

			fn field(
				&self,
				name: &str,
			) -> ::core::result::Result<::seedling::Value, ::seedling::FactoryError> {
				match name {
					#(#field_arms)*
					_ => ::core::result::Result::Err(
						::seedling::FactoryError::field_not_found::<Self>(name),
					),
				}
			}

			fn set_field(
				&mut self,
				name: &str,
				value: ::seedling::Value,
			) -> ::core::result::Result<(), ::seedling::FactoryError> {
				let _ = &value;
				match name {
					#(#set_field_arms)*
					_ => ::core::result::Result::Err(
						::seedling::FactoryError::field_not_found::<Self>(name),
					),
				}
			}

			fn set_related(
				&mut self,
				name: &str,
				related: ::std::boxed::Box<dyn ::std::any::Any>,
			) -> ::core::result::Result<(), ::seedling::FactoryError> {
				let _ = &related;
				match name {
					#(#set_related_arms)*
					_ => ::core::result::Result::Err(
						::seedling::FactoryError::field_not_found::<Self>(name),
					),
				}
			}

			fn push_related(
				&mut self,
				name: &str,
				related: ::std::boxed::Box<dyn ::std::any::Any>,
			) -> ::core::result::Result<(), ::seedling::FactoryError> {
				let _ = &related;
				match name {
					#(#push_related_arms)*
					_ => ::core::result::Result::Err(
						::seedling::FactoryError::field_not_found::<Self>(name),
					),
				}
			}
		}
	})
}

fn scalar_push_arm(name: &str) -> TokenStream {
	quote! {
		#name => ::core::result::Result::Err(
			::seedling::FactoryError::unsettable(#name, "scalar relation field"),
		),
	}
}

/// Splits `Option<R>` / `Vec<R>` relation field types from plain `R`.
fn classify(ty: &Type) -> (Wrap, &Type) {
	if let Type::Path(type_path) = ty {
		if type_path.qself.is_none() {
			if let Some(segment) = type_path.path.segments.last() {
				let wrap = match segment.ident.to_string().as_str() {
					"Option" => Some(Wrap::Option),
					"Vec" => Some(Wrap::Vec),
					_ => None,
				};
				if let Some(wrap) = wrap {
					if let PathArguments::AngleBracketed(args) = &segment.arguments {
						if let Some(GenericArgument::Type(inner)) = args.args.first() {
							return (wrap, inner);
						}
					}
				}
			}
		}
	}
	(Wrap::Plain, ty)
}
