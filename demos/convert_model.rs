//! Convert a serialized network configuration into IR JSON.
//!
//! ```text
//! cargo run --example convert_model -- <model.pb> [params.tar.gz|params_dir] [options.json] [out.json]
//! ```

use std::path::{Path, PathBuf};

use log::{info, LevelFilter};

use paddle_parser::{logger::init_log, PaddleParser, ParserOptions};

fn main() -> anyhow::Result<()> {
    init_log(LevelFilter::Info)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(config_path) = args.first().map(PathBuf::from) else {
        anyhow::bail!("usage: convert_model <model.pb> [weights] [options.json] [out.json]");
    };
    let weights_path = args.get(1).map(PathBuf::from);
    let options = match args.get(2) {
        Some(path) => ParserOptions::from_json_file(Path::new(path))?,
        None => ParserOptions::default(),
    };
    let output_path = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| config_path.with_extension("ir.json"));

    let parser = PaddleParser::load(&config_path, weights_path.as_deref())?.with_options(options);
    let model = parser.gen_ir()?;

    for node in model.graph.nodes() {
        println!("{:<32} {:<16} <- {}", node.name, node.op, node.input.join(", "));
    }
    println!(
        "{} IR nodes, {} weight tensors (weights loaded: {})",
        model.graph.len(),
        model.weights.len(),
        model.weights_loaded
    );

    model.save_graph(&output_path)?;
    info!("IR graph written to {}", output_path.display());
    Ok(())
}
