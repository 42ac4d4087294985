use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::model::{Catalog, PortRecord};

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        return Err(anyhow!("Port catalog not found: {}", path.display()));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read port catalog: {}", path.display()))?;
    let catalog = parse_catalog(&content)
        .with_context(|| format!("Failed to parse port catalog: {}", path.display()))?;
    info!(
        "loaded {} ports ({} positioned) from {}",
        catalog.len(),
        catalog.positioned().count(),
        path.display()
    );
    Ok(catalog)
}

pub fn parse_catalog(content: &str) -> Result<Catalog> {
    let records: Vec<PortRecord> = serde_json::from_str(content)?;
    let unnamed = records
        .iter()
        .filter(|r| r.name_text().trim().is_empty() || r.country_text().trim().is_empty())
        .count();
    if unnamed > 0 {
        debug!("{unnamed} catalog records lack a name or country");
    }
    Ok(Catalog::new(records))
}
