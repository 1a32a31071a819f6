//! Procedural macros for X1 consensus encoding and decoding.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Index, parse_macro_input, spanned::Spanned};

/// Derives `Encodable` and `Decodable` for a struct by encoding every field in
/// declaration order.
///
/// The generated code refers to `crate::consensus` and `crate::io`, so the
/// macro is meant to be used inside `x1-consensus` itself.
///
/// # Example
///
/// ```ignore
/// use x1_consensus::consensus::ConsensusCodec;
///
/// #[derive(ConsensusCodec)]
/// struct Header {
///     version: i32,
///     prev_blockhash: BlockHash,
///     merkle_root: TxMerkleNode,
///     time: u32,
///     bits: CompactTarget,
///     nonce: u32,
/// }
/// ```
#[proc_macro_derive(ConsensusCodec)]
pub fn derive_consensus_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(_) => {
            return Err(syn::Error::new(
                input.span(),
                "ConsensusCodec cannot be derived for enums",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new(
                input.span(),
                "ConsensusCodec cannot be derived for unions",
            ));
        }
    };

    let accessors = field_accessors(fields, input)?;
    let constructor = constructor(fields);

    Ok(quote! {
        impl #impl_generics crate::consensus::Encodable for #name #ty_generics #where_clause {
            #[inline]
            fn consensus_encode<W: crate::io::Write + ?Sized>(
                &self,
                writer: &mut W,
            ) -> core::result::Result<usize, crate::io::Error> {
                let mut len: usize = 0;
                #(
                    len = len.saturating_add(
                        crate::consensus::Encodable::consensus_encode(&#accessors, writer)?,
                    );
                )*
                Ok(len)
            }
        }

        impl #impl_generics crate::consensus::Decodable for #name #ty_generics #where_clause {
            #[inline]
            fn consensus_decode_from_finite_reader<R: crate::io::Read + ?Sized>(
                reader: &mut R,
            ) -> core::result::Result<Self, crate::consensus::EncodeDecodeError> {
                Ok(#constructor)
            }
        }
    })
}

fn field_accessors(fields: &Fields, input: &DeriveInput) -> syn::Result<Vec<TokenStream2>> {
    match fields {
        Fields::Named(named) => Ok(named
            .named
            .iter()
            .filter_map(|field| field.ident.as_ref())
            .map(|ident| quote! { self.#ident })
            .collect()),
        Fields::Unnamed(unnamed) => Ok((0..unnamed.unnamed.len())
            .map(|i| {
                let index = Index::from(i);
                quote! { self.#index }
            })
            .collect()),
        Fields::Unit => Err(syn::Error::new(
            input.span(),
            "ConsensusCodec cannot be derived for unit structs",
        )),
    }
}

fn constructor(fields: &Fields) -> TokenStream2 {
    let decode = quote! {
        crate::consensus::Decodable::consensus_decode_from_finite_reader(reader)?
    };
    match fields {
        Fields::Named(named) => {
            let assignments = named
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref())
                .map(|ident| quote! { #ident: #decode });
            quote! { Self { #(#assignments),* } }
        }
        Fields::Unnamed(unnamed) => {
            let values = unnamed.unnamed.iter().map(|_| decode.clone());
            quote! { Self(#(#values),*) }
        }
        Fields::Unit => quote! { Self },
    }
}
