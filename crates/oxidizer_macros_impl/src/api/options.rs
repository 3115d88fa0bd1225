// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use proc_macro2::{Span, TokenStream};
use syn::parse::Parser;
use syn::{Attribute, Ident};

#[derive(Debug, Eq, PartialEq)]
pub enum StructCategory {
    BehavioralType,
    ValueObject,
    DataTransferObject,
}

#[derive(Debug)]
pub struct StructOptions {
    pub category: StructCategory,
    pub config: bool,
    pub no_validation: bool,
}

impl StructOptions {
    pub fn parse(attr: TokenStream) -> super::Result<Self> {
        let mut no_validation = false;
        let mut config = false;
        let mut category: Option<StructCategory> = None;

        syn::meta::parser(|meta| {
            fn verify_category_not_already_set(
                category: Option<&StructCategory>,
            ) -> Result<(), syn::Error> {
                match category {
                    Some(_) => Err(syn::Error::new(
                        Span::call_site(),
                        "type category specified multiple times",
                    )),
                    None => Ok(()),
                }
            }

            let Some(arg) = meta.path.get_ident().map(Ident::to_string) else {
                return Err(meta.error("unsupported argument"));
            };

            match arg.as_str() {
                "no_validation" => no_validation = true,
                "config" => config = true,
                "behavioral" => {
                    verify_category_not_already_set(category.as_ref())?;
                    category = Some(StructCategory::BehavioralType);
                }
                "dto" => {
                    verify_category_not_already_set(category.as_ref())?;
                    category = Some(StructCategory::DataTransferObject);
                }
                "value" => {
                    verify_category_not_already_set(category.as_ref())?;
                    category = Some(StructCategory::ValueObject);
                }
                _ => return Err(meta.error("unsupported argument")),
            }

            Ok(())
        })
        .parse2(attr)?;

        let category = category.ok_or_else(|| {
            syn::Error::new(
                Span::call_site(),
                "'oxidizer_api_lifecycle::api' on structs must specify a type category (behavioral, dto, or value)",
            )
        })?;

        let instance = Self {
            category,
            config,
            no_validation,
        };

        instance.validate()
    }

    fn validate(self) -> super::Result<Self> {
        match self.category {
            StructCategory::BehavioralType => {
                if self.config {
                    return Err(syn::Error::new(
                        Span::call_site(),
                        "Behavioral types cannot have the 'config' flag in the oxidizer_api_lifecycle::api attribute.",
                    ));
                }

                if self.no_validation {
                    return Err(syn::Error::new(
                        Span::call_site(),
                        "Behavioral types cannot have the 'no_validation' flag in the oxidizer_api_lifecycle::api attribute.",
                    ));
                }
            }
            StructCategory::ValueObject => {
                if self.config {
                    return Err(syn::Error::new(
                        Span::call_site(),
                        "Value object types cannot have the 'config' flag in the oxidizer_api_lifecycle::api attribute.",
                    ));
                }

                if self.no_validation {
                    return Err(syn::Error::new(
                        Span::call_site(),
                        "Value object types cannot have the 'no_validation' flag in the oxidizer_api_lifecycle::api attribute.",
                    ));
                }
            }
            StructCategory::DataTransferObject => {}
        }

        Ok(self)
    }
}

#[derive(Debug)]
pub struct FieldOptions {
    pub optional: bool,
    pub copy: bool,
}

impl FieldOptions {
    pub fn parse(attr: &Attribute) -> super::Result<Self> {
        let mut optional = false;
        let mut copy = false;

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("optional") {
                optional = true;
                Ok(())
            } else if meta.path.is_ident("copy") {
                copy = true;
                Ok(())
            } else {
                Err(meta.error("unsupported property"))
            }
        })?;

        Ok(Self { optional, copy })
    }
}

#[expect(
    clippy::derivable_impls,
    reason = "Deliberate to be explicit and avoid accidental defaults"
)]
impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            optional: false,
            copy: false,
        }
    }
}
