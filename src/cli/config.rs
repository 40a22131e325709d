//! TOML configuration for the `convert` and `stats` commands.
//!
//! ```toml
//! # panel.toml
//! [read]
//! threads = 4
//! compensate = true
//!
//! [[gate]]
//! name = "Lymphocytes"
//! domain = "FSC-A"
//! range = "SSC-A"
//! rectangle = [20000.0, 0.0, 120000.0, 60000.0]
//!
//! [[gate]]
//! name = "T cells"
//! parent = "Lymphocytes"
//! domain = "CD3"
//! range = "SSC-A"
//! polygon = [[1000.0, 0.0], [90000.0, 0.0], [90000.0, 50000.0]]
//!
//! [[stat]]
//! kind = "median"
//! dimension = "CD3"
//! subset = "T cells"
//!
//! [[stat]]
//! kind = "frequency"
//! child = "T cells"
//! parent = "Lymphocytes"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use fcsframe::gating::{Geometry, Subset};
use fcsframe::ident::Id;
use fcsframe::stats::{StatSpec, Statistic};

/// Root configuration structure
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Reading settings
    #[serde(default)]
    pub read: ReadConfig,

    /// Gates, parents before children
    #[serde(default)]
    pub gate: Vec<GateConfig>,

    /// Statistics to compute
    #[serde(default)]
    pub stat: Vec<StatConfig>,
}

/// Settings for reading input files
#[derive(Debug, Default, Deserialize)]
pub struct ReadConfig {
    /// Worker threads for batch parsing
    pub threads: Option<usize>,

    /// Compensate with each file's spillover matrix
    pub compensate: Option<bool>,
}

/// One gate definition
#[derive(Debug, Deserialize)]
pub struct GateConfig {
    /// Unique gate name, also used as the subset label
    pub name: String,
    /// Horizontal dimension
    pub domain: String,
    /// Vertical dimension
    pub range: String,
    /// Name of an earlier gate
    pub parent: Option<String>,
    /// Corners `[x0, y0, x1, y1]`
    pub rectangle: Option<[f64; 4]>,
    /// Vertices `[[x, y], ...]`
    pub polygon: Option<Vec<[f64; 2]>>,
}

/// Statistic kinds accepted in `[[stat]]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    /// Arithmetic mean
    Mean,
    /// Median
    Median,
    /// Sample standard deviation
    Stdev,
    /// Coefficient of variation
    Cv,
    /// Percentile, needs `percentile`
    Percentile,
    /// Event count
    Count,
    /// Frequency of parent, needs `child` and `parent`
    Frequency,
}

/// One statistic definition
#[derive(Debug, Deserialize)]
pub struct StatConfig {
    /// Statistic kind
    pub kind: StatKind,
    /// Dimension the statistic reads
    pub dimension: Option<String>,
    /// Gate restricting the events
    pub subset: Option<String>,
    /// Percentile in `[0, 100]`
    pub percentile: Option<f64>,
    /// Child gate for `frequency`
    pub child: Option<String>,
    /// Parent gate for `frequency`
    pub parent: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Build subsets in declaration order, with parent names resolved to ids
    pub fn subsets(&self) -> Result<Vec<Subset>> {
        let mut ids: HashMap<&str, Id> = HashMap::new();
        let mut subsets = Vec::with_capacity(self.gate.len());
        for gate in &self.gate {
            let geometry = match (&gate.rectangle, &gate.polygon) {
                (Some([x0, y0, x1, y1]), None) => Geometry::rectangle(*x0, *y0, *x1, *y1),
                (None, Some(vertices)) => {
                    Geometry::polygon(vertices.iter().map(|[x, y]| (*x, *y)).collect())
                }
                _ => anyhow::bail!(
                    "Gate {:?} needs exactly one of rectangle or polygon",
                    gate.name
                ),
            }
            .with_context(|| format!("Invalid geometry for gate {:?}", gate.name))?;

            let parent = match &gate.parent {
                Some(name) => Some(*ids.get(name.as_str()).with_context(|| {
                    format!("Gate {:?} names unknown parent {:?}", gate.name, name)
                })?),
                None => None,
            };
            let subset = Subset::new(&gate.name, &gate.domain, &gate.range, geometry)
                .with_parent(parent);
            if ids.insert(gate.name.as_str(), subset.id()).is_some() {
                anyhow::bail!("Gate {:?} is defined twice", gate.name);
            }
            subsets.push(subset);
        }
        Ok(subsets)
    }

    /// Build statistic specs against subsets produced by [`Config::subsets`]
    pub fn specs(&self, subsets: &[Subset]) -> Result<Vec<StatSpec>> {
        let lookup = |name: &str| {
            subsets
                .iter()
                .find(|s| s.label() == name)
                .map(Subset::id)
                .with_context(|| format!("Statistic names unknown gate {name:?}"))
        };

        self.stat
            .iter()
            .map(|stat| -> Result<StatSpec> {
                let statistic = match stat.kind {
                    StatKind::Mean => Statistic::Mean,
                    StatKind::Median => Statistic::Median,
                    StatKind::Stdev => Statistic::Stdev,
                    StatKind::Cv => Statistic::Cv,
                    StatKind::Count => Statistic::Count,
                    StatKind::Percentile => Statistic::Percentile(
                        stat.percentile.context("percentile statistic needs `percentile`")?,
                    ),
                    StatKind::Frequency => {
                        let child = stat.child.as_deref().context("frequency needs `child`")?;
                        let parent = stat.parent.as_deref().context("frequency needs `parent`")?;
                        Statistic::Frequency {
                            child: lookup(child)?,
                            parent: lookup(parent)?,
                        }
                    }
                };
                let mut spec = StatSpec::new(statistic);
                if let Some(dimension) = &stat.dimension {
                    spec = spec.dimension(dimension.as_str());
                }
                if let Some(subset) = &stat.subset {
                    spec = spec.subset(lookup(subset.as_str())?);
                }
                Ok(spec)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANEL: &str = r#"
        [read]
        threads = 4
        compensate = true

        [[gate]]
        name = "Cells"
        domain = "FSC-A"
        range = "SSC-A"
        rectangle = [10.0, 0.0, 100.0, 50.0]

        [[gate]]
        name = "Bright"
        parent = "Cells"
        domain = "FL1-A"
        range = "SSC-A"
        polygon = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]

        [[stat]]
        kind = "percentile"
        percentile = 99.0
        dimension = "FL1-A"
        subset = "Bright"

        [[stat]]
        kind = "frequency"
        child = "Bright"
        parent = "Cells"
    "#;

    #[test]
    fn test_parse_config() {
        let config = Config::from_str(PANEL).unwrap();
        assert_eq!(config.read.threads, Some(4));
        assert_eq!(config.read.compensate, Some(true));
        assert_eq!(config.gate.len(), 2);
        assert_eq!(config.stat[0].kind, StatKind::Percentile);
    }

    #[test]
    fn test_subsets_resolve_parents() {
        let config = Config::from_str(PANEL).unwrap();
        let subsets = config.subsets().unwrap();
        assert_eq!(subsets[0].parent(), None);
        assert_eq!(subsets[1].parent(), Some(subsets[0].id()));
        assert_eq!(subsets[1].label(), "Bright");
    }

    #[test]
    fn test_specs_reference_subsets() {
        let config = Config::from_str(PANEL).unwrap();
        let subsets = config.subsets().unwrap();
        let specs = config.specs(&subsets).unwrap();
        assert_eq!(specs[0].statistic(), Statistic::Percentile(99.0));
        assert_eq!(specs[0].subset_id(), Some(subsets[1].id()));
        assert_eq!(
            specs[1].statistic(),
            Statistic::Frequency {
                child: subsets[1].id(),
                parent: subsets[0].id(),
            }
        );
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let toml = r#"
            [[gate]]
            name = "Orphan"
            parent = "Missing"
            domain = "A"
            range = "B"
            rectangle = [0.0, 0.0, 1.0, 1.0]
        "#;
        let config = Config::from_str(toml).unwrap();
        assert!(config.subsets().is_err());
    }

    #[test]
    fn test_gate_needs_one_geometry() {
        let toml = r#"
            [[gate]]
            name = "Both"
            domain = "A"
            range = "B"
            rectangle = [0.0, 0.0, 1.0, 1.0]
            polygon = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]
        "#;
        assert!(Config::from_str(toml).unwrap().subsets().is_err());
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.read.threads, None);
        assert!(config.gate.is_empty());
        assert!(config.stat.is_empty());
    }
}
