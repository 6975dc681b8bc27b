//! Dev runner: build a sample completion document and print its wire form.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use uidl::emit::{self, EmitOptions, Escaping, FloatFormat};
use uidl::{CompletionFlags, Document, KeywordPair, Node};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// emit a sample completion grammar as IDL JSON
#[derive(Parser, Debug)]
struct CommandLineInterface {
    /// JSON file with emit options (`{"escaping": "json", "floats": "shortest"}`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// escape strings (overrides config)
    #[arg(long, default_value_t = false)]
    escape: bool,

    /// shortest round-trip floats instead of fixed six digits (overrides config)
    #[arg(long, default_value_t = false)]
    shortest_floats: bool,

    /// print the serde_json view, pretty-printed, instead of wire bytes
    #[arg(long, default_value_t = false)]
    view: bool,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    fn options(&self) -> Result<EmitOptions> {
        let mut options = match self.config.as_ref() {
            None => EmitOptions::default(),
            Some(path) => {
                let source = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&source)
                    .with_context(|| format!("invalid emit options in {}", path.display()))?
            }
        };
        if self.escape {
            options.escaping = Escaping::Json;
        }
        if self.shortest_floats {
            options.floats = FloatFormat::Shortest;
        }
        Ok(options)
    }

    fn run(&self) -> Result<()> {
        let options = self.options()?;
        info!(?options, "building sample document");
        let doc = sample_document()?;

        let text = if self.view {
            serde_json::to_string_pretty(&doc.to_value())?
        } else {
            let text = emit::document_to_string(&doc, options)?;
            // sample strings are plain, so verbatim output must still parse
            serde_json::from_str::<serde_json::Value>(&text)
                .context("emitted document is not valid JSON")?;
            text
        };

        match self.out.as_ref() {
            Some(out) => {
                if let Some(parent) = out.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(out, &text)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                info!(path = %out.display(), bytes = text.len(), "wrote document");
            }
            None => println!("{text}"),
        }
        Ok(())
    }
}

/// A `git`-shaped grammar touching every node kind.
fn sample_document() -> Result<Document> {
    let mut doc = Document::new();
    doc.set_completion_metadata(
        CompletionFlags::AD_HOC_CHANNELS,
        Some("out"),
        Some("err"),
    );

    doc.set_definition(
        "remote",
        Node::string(["origin", "upstream"]).with_id("remote"),
    );
    doc.set_definition("path", Node::string(Vec::<String>::new()));
    doc.set_definition("paths", Node::repeat(Node::reference("path"), ["--"]));

    let mut commands = Node::keyword([
        KeywordPair::new("add", Node::reference("paths")),
        KeywordPair::new(
            "push",
            Node::sequence([
                Node::reference("remote"),
                Node::string(["--force", "--tags"]),
            ]),
        ),
    ]);
    let log = Node::keyword([
        KeywordPair::new("-n", Node::integer(Some(1), None).with_id("depth")),
        KeywordPair::new("--since-days", Node::float(Some(0.0), Some(365.25))),
    ]);
    commands.set_keyword("log", Node::repeat(log, [";", "&&"]))?;
    doc.set_completion(commands.with_id("git"));
    Ok(doc)
}

fn main() -> Result<()> {
    let cli = CommandLineInterface::parse();
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
    cli.run()
}
