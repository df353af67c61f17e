use serde::Deserialize;

/// `.swcrc`-shaped compile configuration. Only the fields the compile
/// pipeline consumes are modeled; unknown fields in the file are ignored.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
  pub module: Option<ModuleConfig>,
  pub jsc: Option<JscConfig>,
}

impl TransformConfig {
  /// The built-in fallback used when no config file exists.
  pub fn default_swcrc() -> Self {
    Self {
      module: Some(ModuleConfig { r#type: Some(ModuleFormat::Es6), strict: None }),
      jsc: Some(JscConfig {
        target: Some(EsTarget::Es2022),
        parser: Some(ParserConfig { syntax: Some(Syntax::Typescript) }),
      }),
    }
  }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
  pub r#type: Option<ModuleFormat>,
  pub strict: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct JscConfig {
  pub target: Option<EsTarget>,
  pub parser: Option<ParserConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
  pub syntax: Option<Syntax>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ModuleFormat {
  #[serde(rename = "es6")]
  Es6,
  #[serde(rename = "commonjs")]
  CommonJs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
  Typescript,
  Ecmascript,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EsTarget {
  Es5,
  Es2015,
  Es2016,
  Es2017,
  Es2018,
  Es2019,
  Es2020,
  Es2021,
  Es2022,
  Es2023,
  Es2024,
  #[default]
  EsNext,
}
