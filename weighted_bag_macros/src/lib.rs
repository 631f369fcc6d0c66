use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DataEnum, DeriveInput, Expr, Fields, Lit, LitFloat, parse_macro_input,
    spanned::Spanned,
};

/// Variant attribute: #[weight(<expr>)]
#[proc_macro_derive(WeightedEnum, attributes(weight))]
pub fn derive_weighted_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let enum_ident = &input.ident;

    let data_enum = match unit_enum(&input, "WeightedEnum") {
        Ok(data) => data,
        Err(err) => return err.to_compile_error().into(),
    };

    // Collect (variant_ident, weight_expr)
    let mut entries = Vec::new();

    for variant in &data_enum.variants {
        let expr = match weight_attr(&variant.attrs) {
            Ok(Some(expr)) => expr,
            Ok(None) => {
                return syn::Error::new(variant.span(), "missing #[weight(...)] on variant")
                    .to_compile_error()
                    .into();
            }
            Err(err) => return err.to_compile_error().into(),
        };

        let ident = &variant.ident;
        // Upgrade integer literals to floats so 1/100 => 1.0/100.0
        let expr_f64 = to_f64_expr(expr);

        entries.push(quote! { (Self::#ident, (#expr_f64)) });
    }

    let expanded = quote! {
        impl weighted_bag::WeightedEnum for #enum_ident {
            const ENTRIES: &'static [(Self, f64)] = &[
                #(#entries),*
            ];
        }
    };

    expanded.into()
}

/// Every variant, equal odds, as a `weighted_bag::Group`.
#[proc_macro_derive(UniformEnum)]
pub fn derive_uniform_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let enum_ident = &input.ident;

    let data_enum = match unit_enum(&input, "UniformEnum") {
        Ok(data) => data,
        Err(err) => return err.to_compile_error().into(),
    };

    let variants = data_enum.variants.iter().map(|v| {
        let ident = &v.ident;
        quote! { Self::#ident }
    });

    let expanded = quote! {
        impl weighted_bag::UniformEnum for #enum_ident {
            const VARIANTS: &'static [Self] = &[
                #(#variants),*
            ];
        }
    };

    expanded.into()
}

/// Only fieldless enums are supported (weighted choices are usually C-like).
fn unit_enum<'a>(input: &'a DeriveInput, derive: &str) -> syn::Result<&'a DataEnum> {
    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            format!("{derive} can only be derived for enums"),
        ));
    };
    for variant in &data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                format!("{derive} only supports fieldless variants"),
            ));
        }
    }
    Ok(data_enum)
}

/// Find #[weight(...)] and parse its contents as an expression
/// (e.g. `1.0/100.0` or `1/100`).
fn weight_attr(attrs: &[Attribute]) -> syn::Result<Option<Expr>> {
    let mut weight = None;
    for Attribute { meta, .. } in attrs {
        if !meta.path().is_ident("weight") {
            continue;
        }
        let syn::Meta::List(list) = meta else {
            return Err(syn::Error::new(meta.span(), "use #[weight(<expr>)]"));
        };
        let expr = syn::parse2::<Expr>(list.tokens.clone())
            .map_err(|e| syn::Error::new(list.span(), format!("invalid weight expr: {e}")))?;
        weight = Some(expr);
    }
    Ok(weight)
}

/// Recursively rewrite integer literals to floating-point (e.g., 1 -> 1.0),
/// so that expressions like `1/100` use FP division.
fn to_f64_expr(mut e: Expr) -> Expr {
    match e {
        Expr::Lit(ref mut el) => {
            if let Lit::Int(int) = &el.lit {
                // 1 -> 1.0 (preserve span)
                let s = format!("{}{}", int.base10_digits(), ".0");
                el.lit = Lit::Float(LitFloat::new(&s, int.span()));
            }
            e
        }
        Expr::Binary(mut b) => {
            b.left = Box::new(to_f64_expr(*b.left));
            b.right = Box::new(to_f64_expr(*b.right));
            Expr::Binary(b)
        }
        Expr::Paren(mut p) => {
            p.expr = Box::new(to_f64_expr(*p.expr));
            Expr::Paren(p)
        }
        Expr::Unary(mut u) => {
            u.expr = Box::new(to_f64_expr(*u.expr));
            Expr::Unary(u)
        }
        Expr::Group(mut g) => {
            g.expr = Box::new(to_f64_expr(*g.expr));
            Expr::Group(g)
        }
        _ => e,
    }
}
