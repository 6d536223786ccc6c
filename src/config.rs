use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::normalize::MAX_UPSTREAM_LENGTH;

/// Windows and thresholds used while classifying variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotationConfig {
    /// Bases of the canonical donor/acceptor site at each intron end.
    pub splice_site_length: i32,
    /// Intronic extent of the splice region, counted from the exon boundary.
    pub splice_region_intron_length: i32,
    /// Exonic extent of the splice region.
    pub splice_region_exon_length: i32,
    /// Introns spanning at most this many bases (end - start) are alignment artefacts.
    pub max_frameshift_intron_length: i32,
    pub flanking_length: i32,
    pub normalize_window: usize,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            splice_site_length: 2,
            splice_region_intron_length: 8,
            splice_region_exon_length: 3,
            max_frameshift_intron_length: 12,
            flanking_length: 5000,
            normalize_window: MAX_UPSTREAM_LENGTH,
        }
    }
}

impl AnnotationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.splice_site_length < 1 {
            bail!("spliceSiteLength must be at least 1, got {}", self.splice_site_length);
        }
        if self.splice_region_intron_length < self.splice_site_length {
            bail!(
                "spliceRegionIntronLength ({}) is shorter than spliceSiteLength ({})",
                self.splice_region_intron_length,
                self.splice_site_length
            );
        }
        if self.splice_region_exon_length < 0 {
            bail!("spliceRegionExonLength must not be negative, got {}", self.splice_region_exon_length);
        }
        if self.max_frameshift_intron_length < 0 {
            bail!(
                "maxFrameshiftIntronLength must not be negative, got {}",
                self.max_frameshift_intron_length
            );
        }
        if self.flanking_length < 0 {
            bail!("flankingLength must not be negative, got {}", self.flanking_length);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();
        f
    }

    #[test]
    fn all_fields() {
        let json = r#"{
            "spliceSiteLength": 2,
            "spliceRegionIntronLength": 10,
            "spliceRegionExonLength": 4,
            "maxFrameshiftIntronLength": 9,
            "flankingLength": 2000,
            "normalizeWindow": 100
        }"#;
        let f = write_config(json);
        let config = AnnotationConfig::from_file(f.path()).unwrap();
        assert_eq!(config.splice_region_intron_length, 10);
        assert_eq!(config.splice_region_exon_length, 4);
        assert_eq!(config.max_frameshift_intron_length, 9);
        assert_eq!(config.flanking_length, 2000);
        assert_eq!(config.normalize_window, 100);
    }

    #[test]
    fn omitted_fields_use_defaults() {
        let f = write_config(r#"{ "flankingLength": 1000 }"#);
        let config = AnnotationConfig::from_file(f.path()).unwrap();
        assert_eq!(config.flanking_length, 1000);
        assert_eq!(config.splice_site_length, 2);
        assert_eq!(config.splice_region_intron_length, 8);
        assert_eq!(config.normalize_window, 500);
    }

    #[test]
    fn splice_region_shorter_than_site() {
        let f = write_config(r#"{ "spliceSiteLength": 4, "spliceRegionIntronLength": 3 }"#);
        let err = AnnotationConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("shorter than spliceSiteLength"));
    }

    #[test]
    fn negative_flanking() {
        let f = write_config(r#"{ "flankingLength": -1 }"#);
        let err = AnnotationConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("flankingLength"));
    }

    #[test]
    fn malformed_json() {
        let f = write_config("{ not json");
        let err = AnnotationConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }
}
