use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::{
    Data, DataStruct, DeriveInput, Expr, ExprLit, Fields, Ident, Lit, LitBool, LitChar, LitInt,
    LitStr, Meta, Result, Token, Type, ext::IdentExt, parse_macro_input, spanned::Spanned,
};

/// Derive `argbind::Options` for a struct with named fields.
///
/// Every field becomes one argument. Without attributes a field is a named
/// argument whose long name is the field name; `bool` fields are flags,
/// every other type takes a value.
///
/// ```ignore
/// #[derive(Default, argbind::Options)]
/// struct Copy {
///     /// File to read
///     #[arg(position = 0, required)]
///     input: String,
///     #[arg(position = 1)]
///     output: String,
///     #[arg(short = 'v', help = "Print every file")]
///     verbose: bool,
///     #[arg(long = "mode", default = "fast")]
///     copy_mode: String,
///     #[arg(skip)]
///     cache: Vec<u8>,
/// }
/// ```
///
/// Keys inside `#[arg(...)]`:
/// - `position = N`: positional argument at index `N` (exclusive with
///   `long`, `short` and `default`)
/// - `long = "name"`, `short = 'c'`, `default = "value"`
/// - `required` (or `required = true`)
/// - `help = "text"`: defaults to the field's doc comment
/// - `skip`: the field is not bound and takes `Default::default()`
#[proc_macro_derive(Options, attributes(arg))]
pub fn derive_options(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_options(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct FieldSpec {
    ident: Ident,
    ty: Type,
    long: Option<LitStr>,
    short: Option<LitChar>,
    default_value: Option<LitStr>,
    required: bool,
    position: Option<LitInt>,
    help: Option<String>,
    docs: Vec<String>,
    skip: bool,
}

impl FieldSpec {
    fn long_name(&self) -> String {
        match &self.long {
            Some(lit) => lit.value(),
            None => self.ident.unraw().to_string(),
        }
    }

    fn help_text(&self) -> String {
        match &self.help {
            Some(help) => help.clone(),
            None => self.docs.join(" "),
        }
    }
}

fn expand_options(input: DeriveInput) -> Result<proc_macro2::TokenStream> {
    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Options can only be derived for structs with named fields",
            ));
        }
    };

    let mut specs = Vec::with_capacity(fields.len());
    for field in fields {
        specs.push(field_spec(field)?);
    }
    check_unique(&specs)?;

    let bindings: Vec<proc_macro2::TokenStream> = specs
        .iter()
        .filter(|s| !s.skip)
        .map(binding_expr)
        .collect::<Result<_>>()?;

    let mut index = 0usize;
    let inits: Vec<proc_macro2::TokenStream> = specs
        .iter()
        .map(|s| {
            let ident = &s.ident;
            if s.skip {
                return quote! { #ident: ::core::default::Default::default() };
            }
            let ty = &s.ty;
            let i = index;
            index += 1;
            quote! { #ident: filler.field::<#ty>(#i) }
        })
        .collect();

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::argbind::Options for #name #ty_generics #where_clause {
            fn bindings() -> ::std::vec::Vec<::argbind::FieldBinding> {
                ::std::vec![ #(#bindings),* ]
            }

            fn fill(filler: &mut ::argbind::Filler<'_>) -> Self {
                Self {
                    #(#inits),*
                }
            }
        }
    })
}

fn field_spec(field: &syn::Field) -> Result<FieldSpec> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new(field.span(), "expected a named field"));
    };

    let mut spec = FieldSpec {
        ident,
        ty: field.ty.clone(),
        long: None,
        short: None,
        default_value: None,
        required: false,
        position: None,
        help: None,
        docs: Vec::new(),
        skip: false,
    };

    for attr in &field.attrs {
        if attr.path().is_ident("doc") {
            if let Meta::NameValue(nv) = &attr.meta {
                if let Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) = &nv.value
                {
                    let line = s.value().trim().to_string();
                    if !line.is_empty() {
                        spec.docs.push(line);
                    }
                }
            }
            continue;
        }
        if !attr.path().is_ident("arg") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let key = meta
                .path
                .get_ident()
                .map(|i| i.unraw().to_string())
                .unwrap_or_default();
            match key.as_str() {
                "long" => spec.long = Some(meta.value()?.parse()?),
                "short" => spec.short = Some(meta.value()?.parse()?),
                "default" => spec.default_value = Some(meta.value()?.parse()?),
                "position" => spec.position = Some(meta.value()?.parse()?),
                "help" => spec.help = Some(meta.value()?.parse::<LitStr>()?.value()),
                "required" => {
                    spec.required = if meta.input.peek(Token![=]) {
                        meta.value()?.parse::<LitBool>()?.value()
                    } else {
                        true
                    };
                }
                "skip" => spec.skip = true,
                other => return Err(meta.error(format!("unknown arg field: {other}"))),
            }
            Ok(())
        })?;
    }

    validate_spec(&spec)?;
    Ok(spec)
}

fn validate_spec(spec: &FieldSpec) -> Result<()> {
    let span = spec.ident.span();
    if spec.skip {
        let bound = spec.long.is_some()
            || spec.short.is_some()
            || spec.default_value.is_some()
            || spec.position.is_some()
            || spec.required;
        if bound {
            return Err(syn::Error::new(
                span,
                "`skip` cannot be combined with other arg fields",
            ));
        }
    }
    if let Some(position) = &spec.position {
        position.base10_parse::<usize>()?;
        if spec.long.is_some() || spec.short.is_some() || spec.default_value.is_some() {
            return Err(syn::Error::new(
                position.span(),
                "`position` cannot be combined with `long`, `short` or `default`",
            ));
        }
    }
    if let Some(long) = &spec.long {
        let value = long.value();
        if value.is_empty() || value.starts_with('-') {
            return Err(syn::Error::new(
                long.span(),
                "long name must be non-empty and written without leading dashes",
            ));
        }
    }
    if let Some(short) = &spec.short {
        if short.value() == '-' {
            return Err(syn::Error::new(short.span(), "`-` is not a valid short name"));
        }
    }
    Ok(())
}

/// Reject definitions the registry would refuse at runtime.
fn check_unique(specs: &[FieldSpec]) -> Result<()> {
    let mut longs: HashMap<String, &Ident> = HashMap::new();
    let mut shorts: HashMap<char, &Ident> = HashMap::new();
    let mut positions: HashMap<usize, &Ident> = HashMap::new();

    for spec in specs.iter().filter(|s| !s.skip) {
        if let Some(position) = &spec.position {
            let index = position.base10_parse::<usize>()?;
            if let Some(prev) = positions.insert(index, &spec.ident) {
                return Err(syn::Error::new(
                    position.span(),
                    format!("position {index} is already used by `{prev}`"),
                ));
            }
            continue;
        }

        let long = spec.long_name().to_lowercase();
        if let Some(prev) = longs.insert(long.clone(), &spec.ident) {
            return Err(syn::Error::new(
                spec.ident.span(),
                format!("long name `{long}` is already used by `{prev}`"),
            ));
        }
        if let Some(short) = &spec.short {
            if let Some(prev) = shorts.insert(short.value(), &spec.ident) {
                return Err(syn::Error::new(
                    short.span(),
                    format!("short name `{}` is already used by `{prev}`", short.value()),
                ));
            }
        }
    }
    Ok(())
}

fn binding_expr(spec: &FieldSpec) -> Result<proc_macro2::TokenStream> {
    let ty = &spec.ty;
    let name = LitStr::new(&spec.long_name(), spec.ident.span());

    let mut def = match &spec.position {
        Some(position) => {
            let index = position.base10_parse::<usize>()?;
            quote! { ::argbind::ArgumentDefinition::positional(#name, #index) }
        }
        None => quote! { ::argbind::ArgumentDefinition::named(#name) },
    };

    if let Some(short) = &spec.short {
        def = quote! { #def.short(#short) };
    }
    if let Some(default_value) = &spec.default_value {
        def = quote! { #def.default_value(#default_value) };
    }
    if spec.required {
        def = quote! { #def.required(true) };
    }
    let help = spec.help_text();
    if !help.is_empty() {
        let help = LitStr::new(&help, proc_macro2::Span::call_site());
        def = quote! { #def.help(#help) };
    }

    Ok(quote! { ::argbind::FieldBinding::new::<#ty>(#def) })
}
