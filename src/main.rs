use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use tracing::warn;

use plotsketch::{init_logging, CadExporter, CadImporter, SketchDocument, VERSION};

const USAGE: &str = "\
plotsketch - sketch tool for a pen drawing robot

Usage:
  plotsketch export <sketch.json> <out.dxf>   Convert a sketch to DXF
  plotsketch import <in.dxf> <out.json>       Convert a DXF to a sketch
  plotsketch --version                        Print the version
";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("--version" | "-V") => {
            println!("plotsketch {}", VERSION);
            Ok(())
        }
        Some("export") => {
            let (input, output) = two_paths(&args)?;
            let doc = SketchDocument::load_json(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            CadExporter::export_file(&doc, &output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Exported {} strokes and {} shapes to {}",
                doc.strokes.len(),
                doc.shapes.len(),
                output.display()
            );
            Ok(())
        }
        Some("import") => {
            let (input, output) = two_paths(&args)?;
            let importer = CadImporter::new();
            let (doc, stats) = importer
                .import_file(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            if stats.recovered {
                warn!(
                    residual_errors = stats.residual_errors,
                    "input file was damaged, imported what could be recovered"
                );
            }
            doc.save_json(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("{}", stats.summary());
            Ok(())
        }
        Some(other) => bail!("unknown command {:?}\n\n{}", other, USAGE),
        None => bail!("missing command\n\n{}", USAGE),
    }
}

fn two_paths(args: &[String]) -> anyhow::Result<(PathBuf, PathBuf)> {
    match args {
        [_, input, output] => Ok((PathBuf::from(input), PathBuf::from(output))),
        _ => bail!("expected an input and an output path\n\n{}", USAGE),
    }
}
