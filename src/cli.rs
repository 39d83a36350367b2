//! Command-line argument parsing
//!
//! Every file command operates on a design file exported as JSON. The file is
//! rewritten in place whenever link state changes.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::host::{DesignDocument, FontName, FontRegistry, SceneNode};

/// Keep design-file texts in sync with a phrase workspace
#[derive(Parser, Debug)]
#[command(name = "phrase-sync", version, about = "Sync design file texts with phrases")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every text of a page with its link state
    Scan(Target),
    /// Show the file binding, credential resolution and sync stamps
    Status(Target),
    /// Bind the file to the workspace of the active credential
    Configure {
        #[command(flatten)]
        target: Target,
        /// Remote file id
        #[arg(long = "file-id")]
        file_id: String,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        revision: Option<String>,
    },
    /// Pull every remote text of the page into the file
    Pull(Target),
    /// Push locally edited linked texts
    Push(Target),
    /// Create remote phrases for unlinked texts
    Create {
        #[command(flatten)]
        target: Target,
        /// Phrase key, only used when a single text is created
        #[arg(long)]
        key: Option<String>,
    },
    /// Remove the binding and every text link from the file
    Unlink(Target),
    /// Manage stored credentials
    Credentials {
        #[command(subcommand)]
        action: CredentialsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum CredentialsCommand {
    /// Validate and store an API key
    Add {
        api_key: String,
        /// Self-hosted origin, e.g. https://phrases.example.com
        #[arg(long)]
        origin: Option<String>,
    },
    /// List stored credentials
    List,
    /// Remove the credential at INDEX (as shown by `list`)
    Remove { index: usize },
}

/// Design file, page and selection a file command works on
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Design file (JSON)
    #[arg(value_name = "DESIGN")]
    pub design: PathBuf,

    /// Page node id; defaults to the first page
    #[arg(long)]
    pub page: Option<String>,

    /// Selected node ids; defaults to the whole page
    #[arg(long = "node", value_name = "ID")]
    pub nodes: Vec<String>,

    /// Use the stored credential at this index instead of resolving one
    #[arg(long)]
    pub credential: Option<usize>,

    /// Fonts the host can load, as Family:Style; defaults to every font used
    /// in the file
    #[arg(long = "font", value_name = "FAMILY:STYLE")]
    pub fonts: Vec<String>,
}

impl Target {
    /// Font registry for this run
    pub fn font_registry(&self, document: &DesignDocument) -> Result<FontRegistry, String> {
        if self.fonts.is_empty() {
            return Ok(document_fonts(document));
        }
        self.fonts
            .iter()
            .map(|raw| parse_font(raw))
            .collect::<Result<Vec<_>, _>>()
            .map(FontRegistry::new)
    }
}

fn parse_font(raw: &str) -> Result<FontName, String> {
    match raw.split_once(':') {
        Some((family, style)) if !family.is_empty() && !style.is_empty() => {
            Ok(FontName::new(family, style))
        }
        _ => Err(format!("Invalid font '{}', expected Family:Style", raw)),
    }
}

/// Every font referenced by a text node of the document
pub fn document_fonts(document: &DesignDocument) -> FontRegistry {
    fn collect(node: &SceneNode, registry: &mut FontRegistry) {
        if let Some(text) = node.as_text() {
            for font in &text.fonts {
                registry.add(font.clone());
            }
        }
        for child in node.children() {
            collect(child, registry);
        }
    }

    let mut registry = FontRegistry::default();
    for node in document.pages.iter().flat_map(|page| &page.children) {
        collect(node, &mut registry);
    }
    registry
}
