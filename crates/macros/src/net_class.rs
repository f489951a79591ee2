//! NetClass derive macro implementation

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, GenericArgument, Ident, PathArguments, Type};

use crate::parse::{parse_net_class, NetClassArgs, NetPropArgs};

/// Extract the inner type from `PhantomData<T>` if present, otherwise return the type as-is
fn extract_inner_type(ty: &Type) -> &Type {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "PhantomData" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return inner;
                    }
                }
            }
        }
    }
    ty
}

/// Check if a type is PhantomData
fn is_phantom_data(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "PhantomData";
        }
    }
    false
}

/// Generate the NetClass implementation
pub fn derive_net_class(input: DeriveInput) -> TokenStream {
    match parse_net_class(&input) {
        Ok(args) => generate_impl(args),
        Err(e) => e.write_errors(),
    }
}

/// Accessor base name: field ident without a leading underscore
fn clean_name(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix('_').unwrap_or(&name).to_string()
}

fn offset_static_name(struct_name: &Ident, field: &Ident) -> Ident {
    format_ident!(
        "__{}__{}_OFFSET",
        struct_name.to_string().to_uppercase(),
        clean_name(field).to_uppercase()
    )
}

fn generate_impl(args: NetClassArgs) -> TokenStream {
    let struct_name = &args.ident;
    let vis = &args.vis;
    let table_name = &args.table;

    let fields = match args.data {
        darling::ast::Data::Struct(fields) => fields.fields,
        _ => {
            return syn::Error::new_spanned(&args.ident, "NetClass can only be derived for structs")
                .to_compile_error()
        }
    };

    if !fields.iter().any(|f| f.is_ptr_field()) {
        return syn::Error::new_spanned(
            struct_name,
            "NetClass requires a `ptr: *mut c_void` field",
        )
        .to_compile_error();
    }

    let props: Vec<&NetPropArgs> = fields.iter().filter(|f| f.is_prop()).collect();

    let offset_statics = props.iter().map(|f| {
        let static_name = offset_static_name(struct_name, f.ident.as_ref().expect("named field"));
        quote! {
            static #static_name: ::std::sync::OnceLock<i32> = ::std::sync::OnceLock::new();
        }
    });

    let constants = props.iter().map(|f| generate_constants(f, table_name));
    let accessors = props.iter().map(|f| generate_accessors(struct_name, f));
    let net_class_impl = generate_net_class_impl(struct_name, &fields);

    quote! {
        #(#offset_statics)*

        impl #struct_name {
            /// Default RecvTable of this wrapper
            #vis const TABLE_NAME: &'static str = #table_name;

            #(#constants)*

            /// Get the raw pointer
            #vis fn as_ptr(&self) -> *mut ::std::ffi::c_void {
                self.ptr
            }
        }

        #(#accessors)*

        #net_class_impl
    }
}

fn generate_constants(field: &NetPropArgs, default_table: &str) -> TokenStream {
    let Some(ident) = field.ident.as_ref() else {
        return quote! {};
    };
    let prop = field.prop.as_deref().unwrap_or_default();
    let table = field.table.as_deref().unwrap_or(default_table);

    let upper = clean_name(ident).to_uppercase();
    let prop_const = format_ident!("{}_PROP", upper);
    let table_const = format_ident!("{}_TABLE", upper);

    let prop_doc = format!("Networked prop name for `{}`", clean_name(ident));
    let table_doc = format!("RecvTable holding `{}`", prop);

    quote! {
        #[doc = #prop_doc]
        pub const #prop_const: &'static str = #prop;

        #[doc = #table_doc]
        pub const #table_const: &'static str = #table;
    }
}

fn generate_accessors(struct_name: &Ident, field: &NetPropArgs) -> TokenStream {
    let Some(ident) = field.ident.as_ref() else {
        return quote! {};
    };
    let prop = field.prop.as_deref().unwrap_or_default();
    let field_ty = extract_inner_type(&field.ty);
    let static_name = offset_static_name(struct_name, ident);

    let name = clean_name(ident);
    let upper = name.to_uppercase();
    let prop_const = format_ident!("{}_PROP", upper);
    let table_const = format_ident!("{}_TABLE", upper);

    let getter_name = format_ident!("{}", name);
    let try_getter_name = format_ident!("try_{}", name);
    let setter_name = format_ident!("set_{}", name);
    let offset_name = format_ident!("{}_offset", name);

    let getter_doc = format!(
        "Get `{}`\n\n# Panics\nPanics if the prop offset cannot be resolved.",
        prop
    );
    let try_getter_doc = format!("Get `{}`, or None if unresolved or null", prop);
    let setter_doc = format!("Set `{}`", prop);
    let offset_doc = format!("Resolved byte offset of `{}`", prop);

    let setter = if field.readonly {
        quote! {}
    } else {
        quote! {
            #[doc = #setter_doc]
            #[inline]
            pub fn #setter_name(&mut self, value: #field_ty) {
                if self.ptr.is_null() {
                    return;
                }
                if let Ok(offset) = Self::#offset_name() {
                    unsafe {
                        let ptr = self.ptr.byte_add(offset as usize) as *mut #field_ty;
                        ptr.write_unaligned(value);
                    }
                }
            }
        }
    };

    quote! {
        impl #struct_name {
            #[doc = #offset_doc]
            pub fn #offset_name() -> ::std::result::Result<i32, ::tf2rust_core::recvprop::RecvPropError> {
                ::tf2rust_core::recvprop::field::resolve_slot(
                    &#static_name,
                    Self::#table_const,
                    Self::#prop_const,
                )
            }

            #[doc = #getter_doc]
            #[inline]
            pub fn #getter_name(&self) -> #field_ty {
                let offset = match Self::#offset_name() {
                    Ok(offset) => offset,
                    Err(e) => panic!("{}: {}", stringify!(#ident), e),
                };
                unsafe {
                    let ptr = self.ptr.byte_add(offset as usize) as *const #field_ty;
                    ptr.read_unaligned()
                }
            }

            #[doc = #try_getter_doc]
            #[inline]
            pub fn #try_getter_name(&self) -> Option<#field_ty> {
                if self.ptr.is_null() {
                    return None;
                }
                let offset = Self::#offset_name().ok()?;
                unsafe {
                    let ptr = self.ptr.byte_add(offset as usize) as *const #field_ty;
                    Some(ptr.read_unaligned())
                }
            }

            #setter
        }
    }
}

fn generate_net_class_impl(struct_name: &Ident, fields: &[NetPropArgs]) -> TokenStream {
    let field_inits: Vec<_> = fields
        .iter()
        .filter(|f| !f.is_ptr_field())
        .filter_map(|f| {
            let ident = f.ident.as_ref()?;
            if is_phantom_data(&f.ty) {
                Some(quote! { #ident: ::std::marker::PhantomData })
            } else {
                Some(quote! { #ident: ::std::default::Default::default() })
            }
        })
        .collect();

    quote! {
        impl ::tf2rust_core::recvprop::NetClass for #struct_name {
            fn ptr(&self) -> *mut ::std::ffi::c_void {
                self.ptr
            }

            fn table_name(&self) -> &'static str {
                Self::TABLE_NAME
            }

            fn is_valid(&self) -> bool {
                !self.ptr.is_null()
            }

            unsafe fn from_ptr(ptr: *mut ::std::ffi::c_void) -> Option<Self> {
                if ptr.is_null() {
                    None
                } else {
                    Some(Self {
                        ptr,
                        #(#field_inits),*
                    })
                }
            }
        }
    }
}
