//! # Address Subcommand
//!
//! Normalizes, validates, and renders one address. Components come from
//! flags, from a JSON or YAML file given with `--input`, or both; flags
//! override the file.
//!
//! Exit status: 0 for a valid address, 2 when the address normalizes but
//! fails validation. Normalization errors are reported as failures.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use postal_address::{Address, AddressFields};
use postal_territory::TerritoryResolver;

/// Exit status for an address that fails validation.
pub const INVALID_ADDRESS: u8 = 2;

/// Arguments for `postal address`.
#[derive(Args, Debug, Default)]
pub struct AddressArgs {
    #[arg(long)]
    pub line1: Option<String>,

    #[arg(long)]
    pub line2: Option<String>,

    #[arg(long)]
    pub postal_code: Option<String>,

    #[arg(long)]
    pub city_name: Option<String>,

    /// ISO 3166-1 alpha-2 code.
    #[arg(long)]
    pub country_code: Option<String>,

    /// ISO 3166-2 code.
    #[arg(long)]
    pub subdivision_code: Option<String>,

    /// JSON or YAML file holding the address components.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Print the normalized component map as JSON instead of the address block.
    #[arg(long)]
    pub json: bool,

    /// Line separator for the rendered address block.
    #[arg(long, default_value = "\n")]
    pub separator: String,
}

impl AddressArgs {
    fn fields(&self) -> Result<AddressFields> {
        let mut fields = match &self.input {
            Some(path) => read_fields(path)?,
            None => AddressFields::default(),
        };
        let overrides = [
            (&mut fields.line1, &self.line1),
            (&mut fields.line2, &self.line2),
            (&mut fields.postal_code, &self.postal_code),
            (&mut fields.city_name, &self.city_name),
            (&mut fields.country_code, &self.country_code),
            (&mut fields.subdivision_code, &self.subdivision_code),
        ];
        for (field, flag) in overrides {
            if let Some(value) = flag {
                *field = Some(value.clone());
            }
        }
        Ok(fields)
    }
}

fn read_fields(path: &Path) -> Result<AddressFields> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read address file: {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("invalid address JSON: {}", path.display())),
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid address YAML: {}", path.display())),
        _ => bail!(
            "unsupported address file format (expected .json, .yaml or .yml): {}",
            path.display()
        ),
    }
}

/// Execute `postal address`.
pub fn run_address(
    args: &AddressArgs,
    resolver: &TerritoryResolver,
    out: &mut dyn Write,
) -> Result<u8> {
    let address = Address::from_fields(resolver, args.fields()?)
        .context("address normalization failed")?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &address)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", address.render(&args.separator))?;
    }

    match address.validate() {
        Ok(()) => Ok(0),
        Err(e) => {
            tracing::warn!(error = %e, "address is not valid");
            Ok(INVALID_ADDRESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &AddressArgs) -> Result<(u8, String)> {
        let resolver = TerritoryResolver::bundled()?;
        let mut out = Vec::new();
        let status = run_address(args, &resolver, &mut out)?;
        Ok((status, String::from_utf8(out)?))
    }

    #[test]
    fn renders_valid_address() {
        let args = AddressArgs {
            line1: Some("1 Infinite Loop".into()),
            postal_code: Some("95014".into()),
            city_name: Some("Cupertino".into()),
            subdivision_code: Some("us-ca".into()),
            separator: "\n".into(),
            ..AddressArgs::default()
        };
        let (status, output) = run(&args).unwrap();
        assert_eq!(status, 0);
        assert_eq!(output, "1 Infinite Loop\n95014 - Cupertino, California\nUnited States\n");
    }

    #[test]
    fn invalid_address_still_renders() {
        let args = AddressArgs {
            line1: Some("1 Infinite Loop".into()),
            country_code: Some("US".into()),
            separator: ", ".into(),
            ..AddressArgs::default()
        };
        let (status, output) = run(&args).unwrap();
        assert_eq!(status, INVALID_ADDRESS);
        assert_eq!(output, "1 Infinite Loop, United States\n");
    }

    #[test]
    fn json_output() {
        let args = AddressArgs {
            subdivision_code: Some("GB-KEC".into()),
            json: true,
            ..AddressArgs::default()
        };
        let (_, output) = run(&args).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["country_code"], "GB");
        assert_eq!(json["london_borough_name"], "Kensington and Chelsea");
    }

    #[test]
    fn conflict_is_an_error() {
        let args = AddressArgs {
            country_code: Some("FR".into()),
            subdivision_code: Some("US-CA".into()),
            ..AddressArgs::default()
        };
        let err = run(&args).unwrap_err();
        assert!(format!("{err:#}").contains("country_code"));
    }

    #[test]
    fn unsupported_input_extension() {
        let args = AddressArgs {
            input: Some(PathBuf::from("address.toml")),
            ..AddressArgs::default()
        };
        assert!(args.fields().is_err());
    }
}
