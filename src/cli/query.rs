//! Lookup commands against the compiled output tree.

use clap::Args;
use serde::Serialize;

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::Config;
use crate::resolver::{Listing, LookupError, Resolver};

fn resolver_for(config: &Config) -> Resolver {
    Resolver::new(config.paths.global_dir())
}

/// List brands with compiled artifacts
#[derive(Debug, Clone, Args)]
pub struct BrandsArgs {
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// List token types available for a brand and format
#[derive(Debug, Clone, Args)]
pub struct TypesArgs {
    /// Brand identifier
    pub brand: String,

    /// Format (css, js, json, scss, md)
    pub format: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Resolve a compiled artifact path
#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    /// Brand identifier
    pub brand: String,

    /// Format (css, js, json, scss, md)
    pub format: String,

    /// Token type; the best available artifact is chosen when omitted
    #[arg(short = 't', long = "type", value_name = "TOKEN_TYPE")]
    pub token_type: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Show every brand, format and artifact in the build tree
#[derive(Debug, Clone, Args)]
pub struct InventoryArgs {
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct BrandsResponse {
    brands: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TypesResponse {
    brand: String,
    format: String,
    token_types: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveResponse {
    path: String,
    token_type: String,
    content_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_token_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_path: Option<String>,
}

impl BrandsArgs {
    /// Execute the brands command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let resolver = resolver_for(config);
        let mut brands = match resolver.list_brands() {
            Listing::Absent => {
                return Err(CliError::validation(format!(
                    "Global directory not found: {}",
                    resolver.global_dir().display()
                )))
            }
            listing => listing.into_vec(),
        };
        brands.sort();

        if self.json {
            return print_json(&BrandsResponse { brands });
        }
        for brand in brands {
            println!("{brand}");
        }
        Ok(())
    }
}

impl TypesArgs {
    /// Execute the types command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let mut token_types = resolver_for(config)
            .list_token_types(&self.brand, &self.format)
            .map_err(|e| CliError::validation(e.to_string()))?
            .into_vec();
        token_types.sort();

        if self.json {
            return print_json(&TypesResponse {
                brand: self.brand.clone(),
                format: self.format.clone(),
                token_types,
            });
        }
        if token_types.is_empty() {
            println!("No token types found.");
        }
        for token_type in token_types {
            println!("{token_type}");
        }
        Ok(())
    }
}

impl ResolveArgs {
    /// Execute the resolve command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let result =
            resolver_for(config).resolve(&self.brand, self.token_type.as_deref(), &self.format);

        match result {
            Ok(artifact) => {
                if self.json {
                    print_json(&ResolveResponse {
                        path: artifact.path.display().to_string(),
                        token_type: artifact.token_type.clone(),
                        content_type: artifact.content_type(),
                    })?;
                } else {
                    println!("{}", artifact.path.display());
                }
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                if self.json {
                    let (available_token_types, expected_path) = match err {
                        LookupError::NotFound {
                            available_token_types,
                            expected_path,
                            ..
                        } => (Some(available_token_types), Some(expected_path)),
                        _ => (None, None),
                    };
                    print_json(&LookupErrorResponse {
                        error: message.clone(),
                        available_token_types,
                        expected_path,
                    })?;
                } else if let LookupError::NotFound {
                    available_token_types,
                    ..
                } = &err
                {
                    if !available_token_types.is_empty() {
                        eprintln!("Available token types: {}", available_token_types.join(", "));
                    }
                }
                Err(CliError::validation(message))
            }
        }
    }
}

impl InventoryArgs {
    /// Execute the inventory command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let inventory = resolver_for(config).inventory();

        if self.json {
            return print_json(&inventory);
        }
        if inventory.is_empty() {
            println!("No brands found.");
        }
        for brand in inventory {
            println!("- {}", brand.brand);
            for (format, files) in brand.formats {
                println!("    {}: {}", format, files.join(", "));
            }
        }
        Ok(())
    }
}
