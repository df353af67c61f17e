use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The source project's `package.json`. Fields the synthesizer rewrites are
/// modeled explicitly; everything else rides along in `rest` and is written
/// back verbatim (and wins over synthesized keys on conflict, matching the
/// spread order of a manifest merge).
#[derive(Debug, Clone, Deserialize)]
pub struct PackageJson {
  pub name: Option<String>,
  pub version: Option<String>,
  pub description: Option<String>,
  pub main: Option<String>,
  pub dependencies: Option<Map<String, Value>>,
  #[serde(rename = "devDependencies")]
  pub dev_dependencies: Option<Map<String, Value>>,
  #[serde(flatten)]
  pub rest: Map<String, Value>,
}

/// The synthesized distributable manifest. Field order is the written key
/// order.
#[derive(Debug, Serialize)]
pub struct OutputManifest {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  pub r#type: String,
  pub types: String,
  pub main: String,
  pub module: String,
  pub exports: ExportMap,
  pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportMap {
  pub require: String,
  pub import: String,
}
