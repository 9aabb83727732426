//! # Territory Subcommands
//!
//! One handler per resolution operation. Codes are printed one per line so
//! the output pipes into other tools; best-effort lookups with no answer
//! exit with status 1 and print nothing.
//!
//! ```bash
//! postal normalize cn-71            # TW
//! postal normalize CN-71 --keep-aliases
//! postal normalize MQ --foreign     # FR
//! postal children ES-CN --include-self
//! postal parents FR-75 --json
//! ```

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use postal_territory::{NormalizeOptions, TerritoryResolver};

/// Arguments for `postal normalize`.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Territory code (country or subdivision, any case).
    pub code: String,

    /// Keep subdivision aliases and overlaps instead of resolving them.
    #[arg(long)]
    pub keep_aliases: bool,

    /// Resolve dependent territories to the country they are attached to.
    #[arg(long)]
    pub foreign: bool,
}

impl NormalizeArgs {
    fn options(&self) -> NormalizeOptions {
        NormalizeOptions {
            resolve_aliases: !self.keep_aliases,
            resolve_foreign_territory: self.foreign,
        }
    }
}

/// A single territory code argument.
#[derive(Args, Debug)]
pub struct CodeArgs {
    /// Territory code.
    pub code: String,
}

/// Arguments for `postal children`.
#[derive(Args, Debug)]
pub struct ChildrenArgs {
    /// Country or subdivision code.
    pub code: String,

    /// Include the normalized input in the output.
    #[arg(long)]
    pub include_self: bool,
}

/// Arguments for `postal parents`.
#[derive(Args, Debug)]
pub struct ParentsArgs {
    /// Country or subdivision code.
    pub code: String,

    /// Stop at the top-level subdivision.
    #[arg(long)]
    pub no_country: bool,

    /// Print the territories as JSON instead of codes.
    #[arg(long)]
    pub json: bool,
}

/// Execute `postal normalize`.
pub fn run_normalize(
    args: &NormalizeArgs,
    resolver: &TerritoryResolver,
    out: &mut dyn Write,
) -> Result<u8> {
    let code = resolver
        .normalize_territory_code(&args.code, args.options())
        .with_context(|| format!("cannot normalize {:?}", args.code))?;
    writeln!(out, "{code}")?;
    Ok(0)
}

/// Execute `postal attachment`.
pub fn run_attachment(
    args: &CodeArgs,
    resolver: &TerritoryResolver,
    out: &mut dyn Write,
) -> Result<u8> {
    let code = args.code.trim().to_uppercase();
    writeln!(out, "{}", resolver.territory_attachment(&code))?;
    Ok(0)
}

/// Execute `postal country`.
pub fn run_country(
    args: &CodeArgs,
    resolver: &TerritoryResolver,
    out: &mut dyn Write,
) -> Result<u8> {
    let code = args.code.trim().to_uppercase();
    print_guess(out, &code, resolver.country_from_subdivision(&code), "country")
}

/// Execute `postal default-subdivision`.
pub fn run_default_subdivision(
    args: &CodeArgs,
    resolver: &TerritoryResolver,
    out: &mut dyn Write,
) -> Result<u8> {
    let code = args.code.trim().to_uppercase();
    print_guess(out, &code, resolver.default_subdivision_code(&code), "default subdivision")
}

fn print_guess(out: &mut dyn Write, code: &str, guess: Option<String>, what: &str) -> Result<u8> {
    match guess {
        Some(answer) => {
            writeln!(out, "{answer}")?;
            Ok(0)
        }
        None => {
            tracing::warn!(code = %code, "no {what} found");
            Ok(1)
        }
    }
}

/// Execute `postal children`.
pub fn run_children(
    args: &ChildrenArgs,
    resolver: &TerritoryResolver,
    out: &mut dyn Write,
) -> Result<u8> {
    let codes = resolver
        .territory_children_codes(&args.code, args.include_self)
        .with_context(|| format!("cannot list children of {:?}", args.code))?;
    for code in codes {
        writeln!(out, "{code}")?;
    }
    Ok(0)
}

/// Execute `postal parents`.
pub fn run_parents(
    args: &ParentsArgs,
    resolver: &TerritoryResolver,
    out: &mut dyn Write,
) -> Result<u8> {
    let chain = resolver
        .territory_parents(&args.code, !args.no_country)
        .with_context(|| format!("cannot walk parents of {:?}", args.code))?;
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &chain)?;
        writeln!(out)?;
    } else {
        for territory in &chain {
            writeln!(out, "{}\t{}", territory.code(), territory.name())?;
        }
    }
    Ok(0)
}

/// Execute `postal aliases`.
pub fn run_aliases(
    args: &CodeArgs,
    resolver: &TerritoryResolver,
    out: &mut dyn Write,
) -> Result<u8> {
    let code = args.code.trim().to_uppercase();
    let aliases = resolver
        .country_aliases(&code)
        .with_context(|| format!("cannot compute aliases of {code:?}"))?;
    for alias in aliases {
        writeln!(out, "{alias}")?;
    }
    Ok(0)
}
