use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::design::DesignMatrices;
use crate::event::Strength;

pub const ARTIFACT_VERSION: u32 = 1;

/// On-disk hand-off of one design to the downstream estimator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignArtifact {
    pub version: u32,
    pub generated_at: String,
    pub strength: String,
    #[serde(default)]
    pub source: Option<String>,
    pub design: DesignMatrices,
}

impl DesignArtifact {
    pub fn new(strength: Strength, source: Option<String>, design: DesignMatrices) -> Self {
        Self {
            version: ARTIFACT_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            strength: strength.to_string(),
            source,
            design,
        }
    }
}

/// Writes via a sibling `.tmp` file and a rename so readers never see a partial artifact.
pub fn write_artifact(path: &Path, artifact: &DesignArtifact) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(artifact).context("serialize design artifact")?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

pub fn read_artifact(path: &Path) -> Result<DesignArtifact> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let artifact = serde_json::from_str::<DesignArtifact>(&raw)
        .with_context(|| format!("parse design artifact {}", path.display()))?;
    if artifact.version != ARTIFACT_VERSION {
        return Err(anyhow!(
            "unsupported design artifact version {} in {}",
            artifact.version,
            path.display()
        ));
    }
    Ok(artifact)
}
