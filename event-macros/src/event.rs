use crate::utils::{apply_derives, ensure_leading_fields};
use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Ident, Item, LitStr, Result, Token, Type, parse::Parse, parse::ParseStream, parse_macro_input};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventKind {
    Plain,
    Domain,
}

impl EventKind {
    fn macro_name(self) -> &'static str {
        match self {
            Self::Plain => "#[event]",
            Self::Domain => "#[domain_event]",
        }
    }
}

/// #[event] / #[domain_event] 宏实现
/// - 仅支持具名字段结构体
/// - 确保结构体具备字段：`metadata: EventMetadata`（领域事件另加 `aggregate: AggregateInfo`）
/// - 生成 `::event_core::event::Event`（及 `DomainEvent`）实现与 `new(..)` 构造函数
/// - 支持：`version = "..."`、`source = "..."`，领域事件另支持 `aggregate_type = "..."`
pub(crate) fn expand(attr: TokenStream, item: TokenStream, kind: EventKind) -> TokenStream {
    let cfg = parse_macro_input!(attr as EventAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    if kind == EventKind::Plain {
        if let Some(lit) = &cfg.aggregate_type {
            return syn::Error::new(
                lit.span(),
                "'aggregate_type' is only supported by #[domain_event]",
            )
            .to_compile_error()
            .into();
        }
    }

    let st = match &mut input {
        Item::Struct(s) => s,
        other => {
            let msg = format!("{} can only be used on struct types", kind.macro_name());
            return syn::Error::new(other.span(), msg).to_compile_error().into();
        }
    };

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        other => {
            let msg = format!(
                "{} supports only named-field structs, e.g., struct X {{ a: T }}",
                kind.macro_name()
            );
            return syn::Error::new(other.span(), msg).to_compile_error().into();
        }
    };

    // 构造函数参数：用户声明的字段（跳过由宏管理的字段）
    let managed = ["metadata", "aggregate"];
    let user_fields: Vec<(Ident, Type)> = fields_named
        .named
        .iter()
        .filter_map(|f| f.ident.clone().map(|i| (i, f.ty.clone())))
        .filter(|(i, _)| !managed.iter().any(|m| i == m))
        .collect();

    let metadata_ty: Type = syn::parse_quote! { ::event_core::event::EventMetadata };
    let aggregate_ty: Type = syn::parse_quote! { ::event_core::event::AggregateInfo };
    match kind {
        EventKind::Plain => ensure_leading_fields(fields_named, &[("metadata", &metadata_ty)]),
        EventKind::Domain => ensure_leading_fields(
            fields_named,
            &[("metadata", &metadata_ty), ("aggregate", &aggregate_ty)],
        ),
    }

    apply_derives(
        &mut st.attrs,
        vec![syn::parse_quote!(Debug), syn::parse_quote!(Clone)],
    );

    let ident = &st.ident;
    let vis = &st.vis;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let version_item = cfg.version.as_ref().map(|v| {
        quote! { const SCHEMA_VERSION: &'static str = #v; }
    });
    let source_item = cfg.source.as_ref().map(|s| {
        quote! {
            const SOURCE: ::core::option::Option<&'static str> = ::core::option::Option::Some(#s);
        }
    });

    let args = user_fields.iter().map(|(i, t)| quote! { #i: #t });
    let inits = user_fields.iter().map(|(i, _)| quote! { #i });

    let aggregate_init = match kind {
        EventKind::Plain => quote! {},
        EventKind::Domain => {
            let lit = cfg
                .aggregate_type
                .clone()
                .unwrap_or_else(|| LitStr::new("", ident.span()));
            quote! { aggregate: ::event_core::event::AggregateInfo::new(#lit), }
        }
    };

    let domain_impl = match kind {
        EventKind::Plain => quote! {},
        EventKind::Domain => quote! {
            impl #impl_generics ::event_core::event::DomainEvent for #ident #ty_generics #where_clause {
                fn aggregate(&self) -> &::event_core::event::AggregateInfo {
                    &self.aggregate
                }

                fn aggregate_mut(&mut self) -> &mut ::event_core::event::AggregateInfo {
                    &mut self.aggregate
                }
            }
        },
    };

    let st_tokens = st.to_token_stream();
    let out = quote! {
        #st_tokens

        impl #impl_generics ::event_core::event::Event for #ident #ty_generics #where_clause {
            #version_item
            #source_item

            fn metadata(&self) -> &::event_core::event::EventMetadata {
                &self.metadata
            }
        }

        impl #impl_generics #ident #ty_generics #where_clause {
            /// 以新生成的事件元数据构造事件
            #[allow(clippy::too_many_arguments)]
            #vis fn new(#(#args),*) -> Self {
                Self {
                    metadata: ::event_core::event::EventMetadata::of::<Self>(),
                    #aggregate_init
                    #(#inits),*
                }
            }
        }

        #domain_impl
    };

    TokenStream::from(out)
}

// 解析 event 宏键值参数：version = "..."、source = "..."、aggregate_type = "..."
struct EventAttrConfig {
    version: Option<LitStr>,
    source: Option<LitStr>,
    aggregate_type: Option<LitStr>,
}

impl Parse for EventAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = Self {
            version: None,
            source: None,
            aggregate_type: None,
        };

        if input.is_empty() {
            return Ok(cfg);
        }

        let pairs: Punctuated<KvLit, Token![,]> =
            Punctuated::<KvLit, Token![,]>::parse_terminated(input)?;

        for kv in pairs {
            let slot = match kv.key.to_string().as_str() {
                "version" => &mut cfg.version,
                "source" => &mut cfg.source,
                "aggregate_type" => &mut cfg.aggregate_type,
                _ => {
                    return Err(syn::Error::new(
                        kv.key.span(),
                        "unknown key; expected 'version' | 'source' | 'aggregate_type'",
                    ));
                }
            };
            if slot.is_some() {
                return Err(syn::Error::new(
                    kv.key.span(),
                    format!("duplicate key '{}' in attribute", kv.key),
                ));
            }
            *slot = Some(kv.value);
        }

        Ok(cfg)
    }
}

struct KvLit {
    key: Ident,
    value: LitStr,
}

impl Parse for KvLit {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        let value: LitStr = input.parse()?;
        Ok(Self { key, value })
    }
}
