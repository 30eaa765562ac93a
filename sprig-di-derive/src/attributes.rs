use syn::meta::ParseNestedMeta;
use syn::{Attribute, Error, Expr, ExprArray, ExprLit, ExprPath, Lit, LitStr, Meta, Path, Result};

fn parse_string_array(meta: &ParseNestedMeta) -> Result<Vec<LitStr>> {
    let array: ExprArray = meta.value()?.parse()?;
    array
        .elems
        .into_iter()
        .map(|elem| match elem {
            Expr::Lit(ExprLit {
                lit: Lit::Str(string),
                ..
            }) => Ok(string),
            other => Err(Error::new_spanned(other, "Expected a string literal!")),
        })
        .collect()
}

fn unknown_attribute(meta: &ParseNestedMeta) -> Error {
    meta.error("Unsupported attribute!")
}

#[derive(Default)]
pub struct ComponentAttributes {
    pub alias: Option<LitStr>,
    pub stereotype: Option<LitStr>,
    pub interfaces: Vec<Path>,
    pub constructor: Option<ExprPath>,
}

impl TryFrom<&Attribute> for ComponentAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self> {
        let mut result = Self::default();
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("alias") {
                result.alias = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("stereotype") {
                result.stereotype = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("interfaces") {
                result.interfaces = parse_string_array(&meta)?
                    .iter()
                    .map(|name| name.parse::<Path>())
                    .collect::<Result<_>>()?;
            } else if meta.path.is_ident("constructor") {
                let path: LitStr = meta.value()?.parse()?;
                result.constructor = Some(path.parse()?);
            } else {
                return Err(unknown_attribute(&meta));
            }

            Ok(())
        })?;

        Ok(result)
    }
}

/// `#[autowired]` or `#[autowired(type_name = "...")]`
pub struct AutowiredAttributes {
    pub type_name: Option<LitStr>,
}

impl TryFrom<&Attribute> for AutowiredAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self> {
        let mut type_name = None;
        if let Meta::List(_) = &value.meta {
            value.parse_nested_meta(|meta| {
                if meta.path.is_ident("type_name") {
                    type_name = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(unknown_attribute(&meta))
                }
            })?;
        }

        Ok(Self { type_name })
    }
}

/// `#[value("key")]`
pub struct ValueAttributes {
    pub key: LitStr,
}

impl TryFrom<&Attribute> for ValueAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self> {
        Ok(Self {
            key: value.parse_args()?,
        })
    }
}

/// Arguments of `#[injectable]` and `#[mapper]`.
#[derive(Default)]
pub struct InterfaceAttributes {
    pub alias: Option<LitStr>,
}

impl InterfaceAttributes {
    pub fn parse(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("alias") {
            self.alias = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(unknown_attribute(&meta))
        }
    }
}

pub struct BindAttributes {
    pub class: LitStr,
    pub method: Option<LitStr>,
    pub param_types: Vec<LitStr>,
    pub param_values: Vec<LitStr>,
    pub description: Option<LitStr>,
}

impl TryFrom<&Attribute> for BindAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self> {
        let mut class = None;
        let mut method = None;
        let mut param_types = vec![];
        let mut param_values = vec![];
        let mut description = None;

        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("class") {
                class = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("method") {
                method = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("param_types") {
                param_types = parse_string_array(&meta)?;
            } else if meta.path.is_ident("param_values") {
                param_values = parse_string_array(&meta)?;
            } else if meta.path.is_ident("description") {
                description = Some(meta.value()?.parse()?);
            } else {
                return Err(unknown_attribute(&meta));
            }

            Ok(())
        })?;

        Ok(Self {
            class: class.ok_or_else(|| Error::new_spanned(value, "Missing bound class!"))?,
            method,
            param_types,
            param_values,
            description,
        })
    }
}

#[derive(Default)]
pub struct ApplicationAttributes {
    pub package: Option<LitStr>,
    pub include: Vec<LitStr>,
    pub exclude: Vec<LitStr>,
    pub resources: Option<LitStr>,
}

impl TryFrom<&Attribute> for ApplicationAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self> {
        let mut result = Self::default();
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("package") {
                result.package = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("include") {
                result.include = parse_string_array(&meta)?;
            } else if meta.path.is_ident("exclude") {
                result.exclude = parse_string_array(&meta)?;
            } else if meta.path.is_ident("resources") {
                result.resources = Some(meta.value()?.parse()?);
            } else {
                return Err(unknown_attribute(&meta));
            }

            Ok(())
        })?;

        Ok(result)
    }
}
