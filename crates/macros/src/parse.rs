//! Attribute parsing for the NetClass derive macro

use darling::{FromDeriveInput, FromField};
use syn::{DeriveInput, Ident, Type, Visibility};

/// Parsed #[netclass(...)] attributes on the struct
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(netclass), supports(struct_named))]
pub struct NetClassArgs {
    /// Struct identifier
    pub ident: Ident,

    /// Struct visibility
    pub vis: Visibility,

    /// Struct fields
    pub data: darling::ast::Data<(), NetPropArgs>,

    /// Default RecvTable for the struct's props (e.g., "DT_TFPlayer")
    pub table: String,
}

/// Parsed #[netprop(...)] attributes on a field
#[derive(Debug, FromField)]
#[darling(attributes(netprop))]
pub struct NetPropArgs {
    /// Field identifier
    pub ident: Option<Ident>,

    /// Field type
    pub ty: Type,

    /// Networked prop name (e.g., "m_iHealth")
    /// Fields without it (such as `ptr`) are not props
    pub prop: Option<String>,

    /// RecvTable override; defaults to the struct's table
    pub table: Option<String>,

    /// No setter generated
    #[darling(default)]
    pub readonly: bool,
}

impl NetPropArgs {
    /// Check if this is a networked prop (has a prop attribute)
    pub fn is_prop(&self) -> bool {
        self.prop.is_some()
    }

    /// Check if this is the base pointer field
    pub fn is_ptr_field(&self) -> bool {
        self.ident.as_ref().map(|i| i == "ptr").unwrap_or(false)
    }
}

/// Parse a DeriveInput into NetClassArgs
pub fn parse_net_class(input: &DeriveInput) -> darling::Result<NetClassArgs> {
    NetClassArgs::from_derive_input(input)
}
