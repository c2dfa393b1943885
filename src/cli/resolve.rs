//! Resolve command handler.
//!
//! Implements the `resolve` subcommand: find one product in a table of
//! contents and report which of its generations is in force at an instant.

use super::output::{render, write_output, OutputTarget};
use crate::config::AppConfig;
use crate::toc::{format_instant, GenerationTocEntry, ProductTocEntry, TableOfContents};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// How the product to resolve is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductSelector {
    /// Kind id and version id
    KindVersion { kind_id: String, version_id: String },
    /// Entry id
    Id(String),
    /// Qualified name
    QualifiedName(String),
}

impl ProductSelector {
    /// Build a selector from the command-line options. Exactly one way of
    /// addressing the product must be given.
    pub fn from_options(
        kind_id: Option<String>,
        version_id: Option<String>,
        id: Option<String>,
        qualified_name: Option<String>,
    ) -> Result<Self> {
        match (kind_id, version_id, id, qualified_name) {
            (Some(kind_id), Some(version_id), None, None) => Ok(Self::KindVersion { kind_id, version_id }),
            (Some(kind_id), None, None, None) => {
                bail!("--kind {kind_id} needs --version; a product kind has one entry per version")
            }
            (None, Some(_), None, None) => bail!("--version needs --kind"),
            (None, None, Some(id), None) => Ok(Self::Id(id)),
            (None, None, None, Some(name)) => Ok(Self::QualifiedName(name)),
            (None, None, None, None) => bail!("name the product with --kind/--version, --id or --name"),
            _ => bail!("--kind/--version, --id and --name are mutually exclusive"),
        }
    }

    fn find(&self, toc: &TableOfContents) -> Result<Option<std::sync::Arc<ProductTocEntry>>> {
        Ok(match self {
            Self::KindVersion { kind_id, version_id } => {
                toc.entry(Some(kind_id.as_str()), Some(version_id.as_str()))?
            }
            Self::Id(id) => toc.entry_by_id(id),
            Self::QualifiedName(name) => toc.entry_by_qualified_name(name),
        })
    }
}

impl fmt::Display for ProductSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KindVersion { kind_id, version_id } => write!(f, "kind '{kind_id}' version '{version_id}'"),
            Self::Id(id) => write!(f, "id '{id}'"),
            Self::QualifiedName(name) => write!(f, "qualified name '{name}'"),
        }
    }
}

/// A generation together with the implementation type it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGeneration {
    pub valid_from: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_type: Option<String>,
}

impl ResolvedGeneration {
    fn new(product: &ProductTocEntry, generation: &GenerationTocEntry) -> Self {
        Self {
            valid_from: generation.valid_from,
            implementation_type: product
                .generation_implementation_type(generation)
                .map(str::to_string),
        }
    }
}

impl fmt::Display for ResolvedGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_instant(self.valid_from))?;
        if let Some(implementation_type) = &self.implementation_type {
            write!(f, " ({implementation_type})")?;
        }
        Ok(())
    }
}

/// Generations of one product around an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub id: String,
    pub qualified_name: String,
    pub kind_id: String,
    pub version_id: String,
    pub at: DateTime<Utc>,
    pub product_valid: bool,
    pub as_of: Option<ResolvedGeneration>,
    pub next: Option<ResolvedGeneration>,
    pub previous: Option<ResolvedGeneration>,
    pub latest: Option<ResolvedGeneration>,
}

impl Resolution {
    /// Resolve the generations of `product` around `at`.
    #[must_use]
    pub fn new(product: &ProductTocEntry, at: DateTime<Utc>) -> Self {
        let resolve = |generation: Option<&GenerationTocEntry>| {
            generation.map(|generation| ResolvedGeneration::new(product, generation))
        };
        Self {
            id: product.id().to_string(),
            qualified_name: product.qualified_name().to_string(),
            kind_id: product.kind_id.clone(),
            version_id: product.version_id.clone(),
            at,
            product_valid: product.is_valid_at(at),
            as_of: resolve(product.generation_as_of(at)),
            next: resolve(product.next_generation_after(at)),
            previous: resolve(product.previous_generation_before(at)),
            latest: resolve(product.latest_generation()),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn line(f: &mut fmt::Formatter<'_>, label: &str, generation: Option<&ResolvedGeneration>) -> fmt::Result {
            match generation {
                Some(generation) => writeln!(f, "  {label:<9} {generation}"),
                None => writeln!(f, "  {label:<9} -"),
            }
        }

        writeln!(f, "{} ({})", self.qualified_name, self.id)?;
        writeln!(f, "Kind: {}  Version: {}", self.kind_id, self.version_id)?;
        write!(f, "At: {}", format_instant(self.at))?;
        if self.product_valid {
            writeln!(f)?;
        } else {
            writeln!(f, " (product no longer valid)")?;
        }
        line(f, "as of", self.as_of.as_ref())?;
        line(f, "next", self.next.as_ref())?;
        line(f, "previous", self.previous.as_ref())?;
        line(f, "latest", self.latest.as_ref())
    }
}

/// Run the resolve command.
pub fn run_resolve(
    path: &Path,
    selector: &ProductSelector,
    at: Option<DateTime<Utc>>,
    config: &AppConfig,
) -> Result<()> {
    let toc = config
        .toc_loader()
        .load_path(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let Some(product) = selector.find(&toc)? else {
        bail!("no product with {selector} in {}", path.display());
    };

    let resolution = Resolution::new(&product, at.unwrap_or_else(Utc::now));
    let content = render(config.output.format, &resolution, &resolution)?;
    let target = OutputTarget::from_option(config.output.file.clone());
    write_output(&content, &target, config.behavior.quiet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::{parse_instant, TocEntry, TocEntryBase};

    fn at(text: &str) -> DateTime<Utc> {
        parse_instant(text).unwrap()
    }

    fn product() -> ProductTocEntry {
        ProductTocEntry::new(
            TocEntryBase::new("motor.2024", "motor.Motor 2024", "motor/2024.xml", "Product"),
            "motor",
            "2024",
        )
        .with_generation_implementation_type("ProductGen")
        .with_generation(GenerationTocEntry::new(at("2024-01-01")))
        .with_generation(GenerationTocEntry::new(at("2024-07-01")).with_implementation_type("SummerGen"))
        .with_generation(GenerationTocEntry::new(at("2025-01-01")))
    }

    #[test]
    fn test_selector_from_options() {
        let kv = ProductSelector::from_options(Some("motor".into()), Some("2024".into()), None, None).unwrap();
        assert_eq!(
            kv,
            ProductSelector::KindVersion {
                kind_id: "motor".into(),
                version_id: "2024".into()
            }
        );
        assert!(ProductSelector::from_options(Some("motor".into()), None, None, None).is_err());
        assert!(ProductSelector::from_options(None, None, None, None).is_err());
        assert!(ProductSelector::from_options(None, None, Some("a".into()), Some("b".into())).is_err());
        assert_eq!(
            ProductSelector::from_options(None, None, Some("motor.2024".into()), None).unwrap(),
            ProductSelector::Id("motor.2024".into())
        );
    }

    #[test]
    fn test_resolution_around_instant() {
        let resolution = Resolution::new(&product(), at("2024-08-15"));
        let as_of = resolution.as_of.unwrap();
        assert_eq!(as_of.valid_from, at("2024-07-01"));
        assert_eq!(as_of.implementation_type.as_deref(), Some("SummerGen"));

        let next = resolution.next.unwrap();
        assert_eq!(next.valid_from, at("2025-01-01"));
        assert_eq!(next.implementation_type.as_deref(), Some("ProductGen"));

        assert_eq!(resolution.previous.unwrap().valid_from, at("2024-01-01"));
        assert_eq!(resolution.latest.unwrap().valid_from, at("2025-01-01"));
        assert!(resolution.product_valid);
    }

    #[test]
    fn test_resolution_before_first_generation() {
        let resolution = Resolution::new(&product(), at("2023-06-01"));
        assert!(resolution.as_of.is_none());
        assert!(resolution.previous.is_none());
        assert_eq!(resolution.next.unwrap().valid_from, at("2024-01-01"));
    }

    #[test]
    fn test_selector_finds_product() {
        let toc = TableOfContents::readonly("1.0.0");
        toc.add_entry(TocEntry::product(product()));

        let by_name = ProductSelector::QualifiedName("motor.Motor 2024".into());
        assert!(by_name.find(&toc).unwrap().is_some());

        let missing = ProductSelector::KindVersion {
            kind_id: "motor".into(),
            version_id: "2030".into(),
        };
        assert!(missing.find(&toc).unwrap().is_none());
    }

    #[test]
    fn test_resolution_text() {
        let text = Resolution::new(&product(), at("2024-08-15")).to_string();
        assert!(text.contains("as of     2024-07-01T00:00:00Z (SummerGen)"));
        assert!(text.starts_with("motor.Motor 2024 (motor.2024)"));
    }
}
