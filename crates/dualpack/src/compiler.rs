use std::path::{Path, PathBuf};

use anyhow::Context;

use dualpack_common::{CompilerOptions, NormalizedCompilerOptions, TargetFormat, TransformConfig};
use dualpack_error::BuildResult;
use dualpack_utils::{indexmap::FxIndexSet, path_ext::PathExt};

use crate::{
  manifest_stage,
  transform_stage::{destination_name, emit_config_for, transform_file},
  utils::{
    discover_source_files::discover_source_files, file_readable,
    normalize_options::normalize_options,
  },
};

/// One written artifact, named relative to the build directory.
#[derive(Debug)]
pub struct EmittedAsset {
  pub filename: String,
  pub size: usize,
}

pub struct BuildSummary {
  pub assets: Vec<EmittedAsset>,
  /// Per-file compile failures. They never abort the batch; partial output
  /// beats none for a large tree.
  pub warnings: Vec<anyhow::Error>,
  /// Package names observed by the ESM pass across all files.
  pub external_modules: FxIndexSet<String>,
  pub manifest_path: Option<PathBuf>,
}

pub struct Compiler {
  options: NormalizedCompilerOptions,
  config: TransformConfig,
}

impl Compiler {
  pub fn new(raw_options: CompilerOptions) -> BuildResult<Self> {
    let options = normalize_options(raw_options);
    let config = load_transform_config(&options.swcrc)?;
    Ok(Self { options, config })
  }

  pub async fn build(&mut self) -> BuildResult<BuildSummary> {
    let source_files = discover_source_files(
      &self.options.source,
      &self.options.match_pattern,
      &self.options.ignore,
    )?;

    let mut esm_modules = FxIndexSet::default();
    let mut commonjs_modules = FxIndexSet::default();
    let mut assets = Vec::new();
    let mut warnings = Vec::new();

    for filename in &source_files {
      let source_file = self.options.source.join(filename);

      for format in [TargetFormat::Esm, TargetFormat::CommonJs] {
        if !self.options.is_format_enabled(format) {
          continue;
        }

        let extension = self.options.extension_for(format);
        let destination_file = self.options.build.join(destination_name(filename, extension));
        let emit_config = emit_config_for(format, &self.config);
        let external_modules = match format {
          TargetFormat::Esm => &mut esm_modules,
          TargetFormat::CommonJs => &mut commonjs_modules,
        };

        let result =
          transform_file(&source_file, &destination_file, &emit_config, extension, external_modules)
            .await;
        match result {
          Ok(written) => {
            assets.extend(written.into_iter().map(|(path, size)| EmittedAsset {
              filename: path.relative_slash(&self.options.build),
              size,
            }));
          }
          Err(error) => warnings
            .push(error.into_inner().context(format!("Error compiling {filename} to {format}"))),
        }
      }
    }

    let manifest_path = if self.options.package {
      Some(manifest_stage::write_manifest(&self.options, &source_files, &esm_modules).await?)
    } else {
      None
    };

    Ok(BuildSummary { assets, warnings, external_modules: esm_modules, manifest_path })
  }
}

fn load_transform_config(swcrc: &Path) -> BuildResult<TransformConfig> {
  if !file_readable(swcrc) {
    return Ok(TransformConfig::default_swcrc());
  }
  let text = std::fs::read_to_string(swcrc)?;
  let config = serde_json::from_str(&text)
    .with_context(|| format!("Failed to parse {}", swcrc.display()))?;
  Ok(config)
}

#[cfg(test)]
mod tests {
  use dualpack_common::CompilerOptions;

  use super::Compiler;

  fn fixture_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(
      dir.path().join("src/index.ts"),
      "import pad from 'left-pad';\nimport { helper } from './helper.ts';\nexport const banner = pad(helper(), 4);\n",
    )
    .unwrap();
    std::fs::write(
      dir.path().join("src/helper.ts"),
      "export const helper = (): string => 'x';\n",
    )
    .unwrap();
    dir
  }

  #[tokio::test]
  async fn compiles_a_tree_into_both_formats() {
    let dir = fixture_project();
    let cwd = dir.path().to_path_buf();

    let mut compiler = Compiler::new(CompilerOptions {
      source: cwd.join("src"),
      build: cwd.join("build"),
      cwd: Some(cwd.clone()),
      esm_ext: Some(".mjs".to_string()),
      ..CompilerOptions::default()
    })
    .unwrap();

    let summary = compiler.build().await.unwrap();
    assert!(summary.warnings.is_empty(), "{:?}", summary.warnings);
    assert_eq!(summary.assets.len(), 8); // 2 files x 2 formats x (code + map)

    for artifact in [
      "index.cjs",
      "index.cjs.map",
      "index.mjs",
      "index.mjs.map",
      "helper.cjs",
      "helper.cjs.map",
      "helper.mjs",
      "helper.mjs.map",
    ] {
      assert!(cwd.join("build").join(artifact).is_file(), "missing {artifact}");
    }

    let cjs = std::fs::read_to_string(cwd.join("build/index.cjs")).unwrap();
    assert!(cjs.contains("./helper.cjs"));
    assert!(cjs.contains("require("));
    assert!(cjs.contains("//# sourceMappingURL=index.cjs.map"));

    let esm = std::fs::read_to_string(cwd.join("build/index.mjs")).unwrap();
    assert!(esm.contains("./helper.mjs"));
    assert!(esm.contains("import"));
    assert!(esm.contains("//# sourceMappingURL=index.mjs.map"));

    let map: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(cwd.join("build/index.mjs.map")).unwrap())
        .unwrap();
    assert_eq!(map["sources"][0], "../src/index.ts");

    let observed: Vec<_> = summary.external_modules.iter().cloned().collect();
    assert_eq!(observed, ["left-pad"]);
  }

  #[tokio::test]
  async fn per_file_failures_do_not_abort_the_batch() {
    let dir = fixture_project();
    let cwd = dir.path().to_path_buf();
    std::fs::write(dir.path().join("src/broken.ts"), "const = ;\n").unwrap();

    let mut compiler = Compiler::new(CompilerOptions {
      source: cwd.join("src"),
      build: cwd.join("build"),
      cwd: Some(cwd.clone()),
      ..CompilerOptions::default()
    })
    .unwrap();

    let summary = compiler.build().await.unwrap();
    // One failure per enabled format.
    assert_eq!(summary.warnings.len(), 2);
    assert!(cwd.join("build/index.cjs").is_file());
    assert!(cwd.join("build/index.js").is_file());
    assert!(!cwd.join("build/broken.cjs").exists());
  }

  #[tokio::test]
  async fn skip_flags_disable_one_format() {
    let dir = fixture_project();
    let cwd = dir.path().to_path_buf();

    let mut compiler = Compiler::new(CompilerOptions {
      source: cwd.join("src"),
      build: cwd.join("build"),
      cwd: Some(cwd.clone()),
      skip_commonjs: true,
      ..CompilerOptions::default()
    })
    .unwrap();

    let summary = compiler.build().await.unwrap();
    assert!(summary.warnings.is_empty(), "{:?}", summary.warnings);
    assert!(cwd.join("build/index.js").is_file());
    assert!(!cwd.join("build/index.cjs").exists());
    assert_eq!(summary.assets.len(), 4);
  }

  #[tokio::test]
  async fn synthesizes_a_manifest_when_asked() {
    let dir = fixture_project();
    let cwd = dir.path().to_path_buf();
    std::fs::write(
      cwd.join("package.json"),
      r#"{
        "name": "fixture",
        "version": "0.1.0",
        "description": "fixture package",
        "main": "build/index.js",
        "dependencies": { "left-pad": "^1.3.0", "unused": "^1.0.0" }
      }"#,
    )
    .unwrap();

    let mut compiler = Compiler::new(CompilerOptions {
      source: cwd.join("src"),
      build: cwd.join("build"),
      cwd: Some(cwd.clone()),
      package: true,
      copy: true,
      ..CompilerOptions::default()
    })
    .unwrap();

    // The manifest's `main` must exist before the precondition probe runs,
    // which the build itself guarantees by compiling first.
    let summary = compiler.build().await.unwrap();
    let manifest_path = summary.manifest_path.expect("manifest should be written");
    assert_eq!(manifest_path, cwd.join("build/package.json"));

    let value: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(manifest_path).unwrap()).unwrap();
    assert_eq!(value["main"], "build/index.cjs");
    assert_eq!(value["module"], "build/index.js");
    assert_eq!(value["types"], "build/index.d.ts");
    assert_eq!(value["exports"]["require"], "./build/index.cjs");
    assert_eq!(value["exports"]["import"], "./build/index.js");
    let dependencies = value["dependencies"].as_object().unwrap();
    assert_eq!(dependencies.len(), 1);
    assert!(dependencies.contains_key("left-pad"));
  }
}
