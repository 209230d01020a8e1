use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, Type, parse_macro_input};

/// #[event_enum] 宏实现
/// - 仅支持单字段元组变体：`Variant(EventType)`
/// - 为每个变体生成 `From<EventType>`
/// - 生成 `event_name()` / `event_id()` 以及 `::event_core::eventing::Dispatchable` 实现，
///   按变体转发到对应静态类型的 `dispatch_with_cancel`
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = proc_macro2::TokenStream::from(attr);
        return syn::Error::new(attr.span(), "#[event_enum] takes no arguments")
            .to_compile_error()
            .into();
    }

    let input = parse_macro_input!(item as Item);
    let enum_item = match input {
        Item::Enum(e) => e,
        other => {
            return syn::Error::new(other.span(), "#[event_enum] can only be used on enum types")
                .to_compile_error()
                .into();
        }
    };

    if enum_item.variants.is_empty() {
        return syn::Error::new(
            enum_item.span(),
            "#[event_enum] requires at least one variant",
        )
        .to_compile_error()
        .into();
    }

    if !enum_item.generics.params.is_empty() {
        return syn::Error::new(
            enum_item.generics.span(),
            "#[event_enum] does not support generic enums",
        )
        .to_compile_error()
        .into();
    }

    let mut variants: Vec<(&syn::Ident, &Type)> = Vec::new();
    for v in &enum_item.variants {
        match &v.fields {
            syn::Fields::Unnamed(f) if f.unnamed.len() == 1 => {
                if let Some(field) = f.unnamed.first() {
                    variants.push((&v.ident, &field.ty));
                }
            }
            _ => {
                return syn::Error::new(
                    v.span(),
                    "#[event_enum] supports only single-field tuple variants, e.g., Variant(EventType)",
                )
                .to_compile_error()
                .into();
            }
        }
    }

    let ident = &enum_item.ident;

    let from_impls = variants.iter().map(|(v, ty)| {
        quote! {
            impl ::core::convert::From<#ty> for #ident {
                fn from(event: #ty) -> Self {
                    Self::#v(event)
                }
            }
        }
    });

    let name_arms = variants.iter().map(|(v, _)| {
        quote! { Self::#v(event) => ::event_core::event::Event::event_name(event) }
    });

    let id_arms = variants.iter().map(|(v, _)| {
        quote! { Self::#v(event) => ::event_core::event::Event::event_id(event) }
    });

    let dispatch_arms = variants.iter().map(|(v, _)| {
        quote! { Self::#v(event) => ::std::boxed::Box::pin(dispatcher.dispatch_with_cancel(event, cancel)) }
    });

    let out = quote! {
        #enum_item

        #(#from_impls)*

        impl #ident {
            pub fn event_name(&self) -> &str {
                match self { #( #name_arms, )* }
            }

            pub fn event_id(&self) -> ::event_core::event::EventId {
                match self { #( #id_arms, )* }
            }
        }

        impl ::event_core::eventing::Dispatchable for #ident {
            fn dispatch_on<'a>(
                self,
                dispatcher: &'a ::event_core::eventing::EventDispatcher,
                cancel: &'a ::event_core::eventing::CancellationToken,
            ) -> ::std::pin::Pin<
                ::std::boxed::Box<
                    dyn ::std::future::Future<
                            Output = ::event_core::error::EventResult<
                                ::event_core::eventing::DispatchReport,
                            >,
                        > + ::std::marker::Send
                        + 'a,
                >,
            > {
                match self { #( #dispatch_arms, )* }
            }
        }
    };

    TokenStream::from(out)
}
