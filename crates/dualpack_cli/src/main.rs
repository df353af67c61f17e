mod args;

use std::{process::ExitCode, time::Instant};

use ansi_term::Colour;
use args::{InputArgs, ManifestArgs, OutputArgs};
use clap::Parser;

use dualpack::{Compiler, CompilerOptions, EmittedAsset};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Commands {
  #[clap(flatten)]
  input: InputArgs,

  #[clap(flatten)]
  output: OutputArgs,

  #[clap(flatten)]
  manifest: ManifestArgs,
}

fn print_emitted_assets(assets: Vec<EmittedAsset>) {
  let mut left = 0;
  let mut right = 0;

  let mut rows = Vec::with_capacity(assets.len());

  for asset in assets {
    let size = format!("{:.2}", asset.size as f64 / 1024.0);

    if size.len() > right {
      right = size.len();
    }

    if asset.filename.len() > left {
      left = asset.filename.len();
    }

    let is_map = asset.filename.ends_with(".map");
    rows.push((asset.filename, size, is_map));
  }

  let dim = Colour::White.dimmed();
  let color = Colour::Cyan;

  for (filename, size, is_map) in rows {
    let asset_type = if is_map { "map" } else { "module" };
    let filename_len = filename.len();

    println!(
      "{}{}{:left$} {}{}{:right$}{} kB",
      dim.paint("<BUILD>/"),
      color.paint(filename),
      "",
      dim.paint(asset_type),
      dim.paint(" │ size: "),
      "",
      size,
      left = left - filename_len,
      right = right - size.len()
    )
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  let args = Commands::parse();

  let options = CompilerOptions {
    source: args.input.source,
    build: args.input.build,
    cwd: None,
    match_pattern: Some(args.input.match_pattern),
    swcrc: Some(args.input.swcrc),
    ignore: args.input.ignore,
    commonjs_ext: Some(args.output.commonjs_ext),
    esm_ext: Some(args.output.esm_ext),
    skip_commonjs: args.output.skip_commonjs,
    skip_esm: args.output.skip_esm,
    package: args.manifest.package,
    copy: args.manifest.copy,
  };

  let mut compiler = match Compiler::new(options) {
    Ok(compiler) => compiler,
    Err(error) => {
      eprintln!("{} {:#}", Colour::Red.paint("Error:"), &*error);
      return ExitCode::FAILURE;
    }
  };

  let start = Instant::now();
  match compiler.build().await {
    Ok(summary) => {
      // Per-file compile failures are warnings; they do not fail the run.
      for warning in &summary.warnings {
        eprintln!("{} {warning:#}", Colour::Yellow.paint("Warning:"));
      }

      if !summary.assets.is_empty() {
        print_emitted_assets(summary.assets);
      }

      if let Some(manifest_path) = &summary.manifest_path {
        println!("{} {}", Colour::White.dimmed().paint("manifest:"), manifest_path.display());
      }

      let elapsed = format!("{:.2} ms", start.elapsed().as_secs_f64() * 1000.0);
      println!("\n{} Finished in {}", Colour::Green.paint("✔"), Colour::White.bold().paint(elapsed));
      ExitCode::SUCCESS
    }
    Err(error) => {
      eprintln!("{} {:#}", Colour::Red.paint("Error:"), &*error);
      ExitCode::FAILURE
    }
  }
}
