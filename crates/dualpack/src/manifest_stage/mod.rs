use std::path::{Path, PathBuf};

use anyhow::Context;

use dualpack_common::{ExportMap, NormalizedCompilerOptions, OutputManifest, PackageJson};
use dualpack_error::BuildResult;
use dualpack_utils::{concat_string, path_ext::PathExt};

use crate::utils::file_readable;

/// Synthesize the distributable manifest and write it, in place or into the
/// build directory. A missing manifest or a missing `main` entry file aborts
/// the whole run; unlike a single bad source file, it means the invocation
/// itself is broken.
pub async fn write_manifest(
  options: &NormalizedCompilerOptions,
  source_files: &[String],
  external_modules: &dualpack_utils::indexmap::FxIndexSet<String>,
) -> BuildResult<PathBuf> {
  let manifest_path = options.cwd.join("package.json");
  if !file_readable(&manifest_path) {
    Err(anyhow::anyhow!("File package.json not found at {}", manifest_path.display()))?;
  }

  let text = tokio::fs::read_to_string(&manifest_path).await?;
  let manifest: PackageJson = serde_json::from_str(&text)
    .with_context(|| format!("Failed to parse {}", manifest_path.display()))?;

  let Some(main) = manifest.main.clone() else {
    return Err(anyhow::anyhow!("No \"main\" section in {}", manifest_path.display()).into());
  };
  if !file_readable(&options.cwd.join(&main)) {
    Err(anyhow::anyhow!("File {main} of \"main\" section in package.json not found"))?;
  }

  let output = synthesize_manifest(&manifest, &main, options, source_files);
  let mut output = match serde_json::to_value(&output)? {
    serde_json::Value::Object(map) => map,
    _ => unreachable!("a manifest serializes to an object"),
  };

  if options.copy {
    // Only packages the ESM pass actually observed, with their declared
    // versions; runtime dependencies win over development ones.
    let mut declared = manifest.dev_dependencies.clone().unwrap_or_default();
    declared.extend(manifest.dependencies.clone().unwrap_or_default());

    let mut pruned = serde_json::Map::new();
    for module in external_modules {
      if let Some(version) = declared.get(module) {
        pruned.insert(module.clone(), version.clone());
      }
    }
    output.insert("dependencies".to_string(), serde_json::Value::Object(pruned));
  } else {
    if let Some(dependencies) = &manifest.dependencies {
      output.insert("dependencies".to_string(), serde_json::Value::Object(dependencies.clone()));
    }
    if let Some(dev_dependencies) = &manifest.dev_dependencies {
      output
        .insert("devDependencies".to_string(), serde_json::Value::Object(dev_dependencies.clone()));
    }
  }

  // Fields the synthesizer does not know about ride along and win on
  // conflicts.
  for (key, value) in &manifest.rest {
    output.insert(key.clone(), value.clone());
  }

  let target_path =
    if options.copy { options.build.join("package.json") } else { manifest_path };
  write_json(&target_path, &serde_json::Value::Object(output)).await?;

  Ok(target_path)
}

/// Derive the output entries from the declared `main`: type declarations,
/// the two per-format entries, the conditional export map, and the shipped
/// file list.
pub fn synthesize_manifest(
  manifest: &PackageJson,
  main: &str,
  options: &NormalizedCompilerOptions,
  source_files: &[String],
) -> OutputManifest {
  let main_path = Path::new(main);
  let commonjs_entry =
    main_path.with_extension(options.commonjs_ext.trim_start_matches('.')).expect_to_slash();
  let esm_entry =
    main_path.with_extension(options.esm_ext.trim_start_matches('.')).expect_to_slash();

  let mut files = vec![options.build.relative_slash(&options.cwd)];
  files.extend(
    source_files.iter().map(|file| options.source.join(file).relative_slash(&options.cwd)),
  );

  OutputManifest {
    name: manifest.name.clone(),
    description: manifest.description.clone(),
    version: manifest.version.clone(),
    r#type: "module".to_string(),
    types: main_path.with_extension("d.ts").expect_to_slash(),
    main: commonjs_entry.clone(),
    module: esm_entry.clone(),
    exports: ExportMap {
      require: concat_string!("./", commonjs_entry),
      import: concat_string!("./", esm_entry),
    },
    files,
  }
}

async fn write_json(path: &Path, value: &serde_json::Value) -> BuildResult<()> {
  let mut text = serde_json::to_string_pretty(value)?;
  text.push('\n');
  tokio::fs::write(path, text)
    .await
    .with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use dualpack_common::{NormalizedCompilerOptions, PackageJson};
  use dualpack_utils::indexmap::FxIndexSet;

  use super::{synthesize_manifest, write_manifest};

  fn options_at(cwd: PathBuf) -> NormalizedCompilerOptions {
    NormalizedCompilerOptions {
      source: cwd.join("src"),
      build: cwd.join("build"),
      cwd,
      match_pattern: "**/*.ts".to_string(),
      ignore: Vec::new(),
      swcrc: PathBuf::from(".swcrc"),
      commonjs_ext: ".cjs".to_string(),
      esm_ext: ".mjs".to_string(),
      skip_commonjs: false,
      skip_esm: false,
      package: true,
      copy: true,
    }
  }

  fn manifest_from(json: &str) -> PackageJson {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn derives_entries_from_main() {
    let manifest = manifest_from(
      r#"{"name":"pkg","version":"1.0.0","description":"d","main":"build/index.js"}"#,
    );
    let options = options_at(PathBuf::from("/proj"));
    let output =
      synthesize_manifest(&manifest, "build/index.js", &options, &["index.ts".to_string()]);

    assert_eq!(output.main, "build/index.cjs");
    assert_eq!(output.module, "build/index.mjs");
    assert_eq!(output.types, "build/index.d.ts");
    assert_eq!(output.exports.require, "./build/index.cjs");
    assert_eq!(output.exports.import, "./build/index.mjs");
    assert_eq!(output.r#type, "module");
    assert_eq!(output.files, ["build", "src/index.ts"]);
  }

  #[tokio::test]
  async fn copy_mode_prunes_dependencies_to_observed_modules() {
    let dir = tempfile::tempdir().unwrap();
    let cwd = dir.path().to_path_buf();
    std::fs::create_dir_all(cwd.join("build")).unwrap();
    std::fs::write(cwd.join("main.js"), "").unwrap();
    std::fs::write(
      cwd.join("package.json"),
      r#"{
        "name": "pkg",
        "version": "1.0.0",
        "description": "d",
        "main": "main.js",
        "license": "MIT",
        "dependencies": { "left-pad": "^1.3.0", "unused": "^2.0.0" },
        "devDependencies": { "left-pad": "^0.0.1", "typescript": "^5.0.0" }
      }"#,
    )
    .unwrap();

    let options = options_at(cwd.clone());
    let mut observed = FxIndexSet::default();
    observed.insert("left-pad".to_string());
    observed.insert("never-declared".to_string());

    let written = write_manifest(&options, &["index.ts".to_string()], &observed).await.unwrap();
    assert_eq!(written, cwd.join("build/package.json"));

    let value: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();
    let dependencies = value["dependencies"].as_object().unwrap();
    assert_eq!(dependencies.len(), 1);
    // The runtime version wins over the development one.
    assert_eq!(dependencies["left-pad"], "^1.3.0");
    // Passthrough fields survive.
    assert_eq!(value["license"], "MIT");
    assert_eq!(value["type"], "module");
  }

  #[tokio::test]
  async fn missing_manifest_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_at(dir.path().to_path_buf());
    let result = write_manifest(&options, &[], &FxIndexSet::default()).await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn missing_main_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cwd = dir.path().to_path_buf();
    std::fs::write(
      cwd.join("package.json"),
      r#"{"name":"pkg","version":"1.0.0","main":"missing.js"}"#,
    )
    .unwrap();

    let options = options_at(cwd);
    let result = write_manifest(&options, &[], &FxIndexSet::default()).await;
    assert!(result.is_err());
  }
}
