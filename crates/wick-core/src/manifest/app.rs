//! App manifest: the launcher response listing installable elements.

use serde::Deserialize;

use crate::error::{Result, WickError};

/// Top-level launcher response.
#[derive(Debug, Clone, Deserialize)]
pub struct AppManifest {
    pub elements: Vec<AppElement>,
}

/// One installable element (an app build on a given label).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppElement {
    pub app_name: String,
    pub label_name: String,
    pub build_version: String,
    #[serde(default)]
    pub manifests: Vec<ManifestLocation>,
}

/// Where the element's chunk manifest can be fetched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestLocation {
    pub uri: String,
    #[serde(default)]
    pub query_params: Vec<QueryParam>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

impl AppManifest {
    pub fn parse(json: &str) -> Result<Self> {
        let manifest: AppManifest = serde_json::from_str(json)?;
        if manifest.elements.is_empty() {
            return Err(WickError::InvalidManifest {
                message: "app manifest has no elements".to_string(),
            });
        }
        Ok(manifest)
    }

    /// Select the element for a label such as `Live-Windows`.
    ///
    /// Falls back to the only element when the manifest contains exactly
    /// one, so single-element responses work regardless of label spelling.
    pub fn select_element(&self, label: &str) -> Result<&AppElement> {
        if let Some(element) = self.elements.iter().find(|e| e.label_name == label) {
            return Ok(element);
        }
        if self.elements.len() == 1 {
            return Ok(&self.elements[0]);
        }
        Err(WickError::InvalidManifest {
            message: format!("no element with label '{}'", label),
        })
    }
}

impl AppElement {
    /// Full URL of the element's chunk manifest, query parameters included.
    pub fn manifest_url(&self) -> Result<String> {
        let location = self.manifests.first().ok_or_else(|| WickError::InvalidManifest {
            message: format!("element '{}' has no manifest locations", self.app_name),
        })?;

        if location.query_params.is_empty() {
            return Ok(location.uri.clone());
        }

        let query: Vec<String> = location
            .query_params
            .iter()
            .map(|p| format!("{}={}", p.name, p.value))
            .collect();
        Ok(format!("{}?{}", location.uri, query.join("&")))
    }

    /// Directory portion of the manifest URI; chunks live beneath it.
    pub fn cloud_dir(&self) -> Result<String> {
        let location = self.manifests.first().ok_or_else(|| WickError::InvalidManifest {
            message: format!("element '{}' has no manifest locations", self.app_name),
        })?;
        match location.uri.rsplit_once('/') {
            Some((dir, _file)) if !dir.is_empty() => Ok(dir.to_string()),
            _ => Err(WickError::InvalidManifest {
                message: format!("manifest uri '{}' has no directory", location.uri),
            }),
        }
    }
}
