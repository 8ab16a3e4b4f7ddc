//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{
    Config, EntityPrefix, Project, Role, ShortIdIndex, Store, Workshop, WorkshopError,
};

/// Everything a command needs about the project it runs in
pub struct Session {
    pub project: Project,
    pub config: Config,
    pub short_ids: ShortIdIndex,
    pub role: Role,
    pub quiet: bool,
    format: OutputFormat,
}

impl Session {
    /// Discover the project and merge configuration with the global flags
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = Project::open(global.project.as_deref()).map_err(WorkshopError::from)?;
        let config = Config::load(Some(&project));
        let short_ids = ShortIdIndex::load(&project);
        let role = global.role.unwrap_or_else(|| config.role());

        let format = match global.format {
            OutputFormat::Auto => config
                .default_format
                .as_deref()
                .and_then(|f| f.parse().ok())
                .unwrap_or(OutputFormat::Auto),
            f => f,
        };

        tracing::debug!(root = %project.root().display(), %role, "opened session");
        Ok(Self {
            project,
            config,
            short_ids,
            role,
            quiet: global.quiet,
            format,
        })
    }

    /// Requested output format, `fallback` when left on auto
    pub fn format(&self, fallback: OutputFormat) -> OutputFormat {
        self.format.or(fallback)
    }

    pub fn workshop(&self) -> Workshop {
        Workshop::load(&self.project)
    }

    pub fn store(&self) -> Store {
        Store::new(self.project.clone())
    }

    /// Resolve a short ID (`PART@2`), full ID or unique fragment
    pub fn resolve(
        &self,
        workshop: &Workshop,
        prefix: EntityPrefix,
        reference: &str,
    ) -> Result<String, WorkshopError> {
        let expanded = self
            .short_ids
            .resolve(reference)
            .ok_or_else(|| WorkshopError::not_found(prefix.entity_name(), reference))?;
        workshop.resolve(prefix, &expanded)
    }

    /// Short ID if the last list assigned one, else the ID
    pub fn display_id(&self, id: &str) -> String {
        self.short_ids.display(id)
    }

    /// Renumber short IDs for one type in list order and persist them
    pub fn remember(&mut self, prefix: EntityPrefix, ids: impl IntoIterator<Item = String>) {
        self.short_ids.rebuild(prefix, ids);
        if let Err(e) = self.short_ids.save(&self.project) {
            tracing::warn!(error = %e, "could not save short id index");
        }
    }

    /// A price, or `None` when this role may not see it
    pub fn price(&self, amount: f64) -> Option<f64> {
        self.role.can_view_prices().then_some(amount)
    }

    /// Print a confirmation line unless `--quiet`
    pub fn done(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }
}

/// Keys that carry money and are dropped for roles that may not see prices
const PRICE_KEYS: &[&str] = &[
    "unit_price",
    "prototype_cost",
    "subtotal",
    "cost",
    "total",
    "resolved_price",
];

/// Remove price fields at any depth
fn redact_prices(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.retain(|k, _| !PRICE_KEYS.contains(&k.as_str()));
            map.values_mut().for_each(redact_prices);
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact_prices),
        _ => {}
    }
}

impl Session {
    /// Print a value as JSON or YAML, without prices if the role may not see them
    pub fn print_structured<T: Serialize>(&self, value: &T, format: OutputFormat) -> Result<()> {
        let mut value = serde_json::to_value(value).into_diagnostic()?;
        if !self.role.can_view_prices() {
            redact_prices(&mut value);
        }

        match format {
            OutputFormat::Yaml => {
                print!("{}", serde_yml::to_string(&value).into_diagnostic()?);
            }
            _ => {
                println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
            }
        }
        Ok(())
    }

    /// Delete an entity after the store confirms nothing references it
    pub fn delete(&self, prefix: EntityPrefix, reference: &str) -> Result<()> {
        let workshop = self.workshop();
        let id = self.resolve(&workshop, prefix, reference)?;

        match self.store().delete(&id) {
            Ok(path) => {
                self.done(format!(
                    "Deleted {} {}",
                    prefix.entity_name(),
                    style(self.display_id(&id)).cyan()
                ));
                if !self.quiet {
                    println!("   {}", style(path.display()).dim());
                }
                Ok(())
            }
            Err(WorkshopError::ReferentialIntegrity(e)) => {
                eprintln!("{} {} is still used by:", style("✗").red(), style(&e.id).cyan());
                for dep in &e.dependents {
                    eprintln!(
                        "   {:<10} {:<16} {} ({})",
                        dep.kind.to_string(),
                        self.display_id(&dep.id),
                        dep.title,
                        dep.relationship
                    );
                }
                Err(WorkshopError::ReferentialIntegrity(e).into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Format money with two decimals, or a dash when hidden
pub fn money(amount: Option<f64>) -> String {
    match amount {
        Some(a) => format!("{:.2}", crate::engine::pricing::round_cents(a)),
        None => "-".to_string(),
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Format an optional dimension in cm
pub fn dimension(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{} cm", v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("tabla añeja de pino", 8), "tabla...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_money() {
        assert_eq!(money(Some(5760.0)), "5760.00");
        assert_eq!(money(Some(0.1 + 0.2)), "0.30");
        assert_eq!(money(None), "-");
    }

    #[test]
    fn test_redact_prices_nested() {
        let mut value = serde_json::json!({
            "id": "ORD-1",
            "total": 5760.0,
            "lines": [{"prototype": "PROT-1", "quantity": 120, "prototype_cost": 48.0, "subtotal": 5760.0}],
        });
        redact_prices(&mut value);

        assert!(value.get("total").is_none());
        assert_eq!(value["lines"][0]["quantity"], 120);
        assert!(value["lines"][0].get("subtotal").is_none());
    }

    #[test]
    fn test_dimension() {
        assert_eq!(dimension(Some(240.0)), "240 cm");
        assert_eq!(dimension(None), "-");
    }
}
