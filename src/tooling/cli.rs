//! CLI Tooling
//!
//! Command-line interface for building, merging, and inspecting node tree files.

use crate::archive::{Archive, DirectoryArchive, ExtensionClassifier, ListArchive};
use crate::concurrency::{consume_packages, consume_packages_sequential, NamedArchive};
use crate::config::{ConfigLoader, NodeTreeConfig};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::{
    MultiPackageNodeTreeBuilder, Node, NodeTreeBuilder, OptimizedNodeTree, TreeBuilder,
};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde_json::json;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Build and inspect node tree files
#[derive(Parser, Debug)]
#[command(name = "nodetree")]
#[command(about = "Build, merge, and inspect offset-addressed node tree files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply the logging flags on top of a configured logging section
    pub fn logging_overrides(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a tree from a directory or a path listing
    Build {
        /// Output tree file
        #[arg(long, short)]
        output: PathBuf,
        /// Directory whose files become the tree
        #[arg(long, conflicts_with = "list", required_unless_present = "list")]
        dir: Option<PathBuf>,
        /// Listing file with one path per line
        #[arg(long)]
        list: Option<PathBuf>,
    },
    /// Merge several archives into one tree with virtual nodes
    Merge {
        /// Output tree file
        #[arg(long, short)]
        output: PathBuf,
        /// Archive as NAME=SOURCE, where SOURCE is a directory or a listing file
        #[arg(long = "package", value_name = "NAME=SOURCE", required = true)]
        packages: Vec<String>,
        /// Consume archives one at a time regardless of configuration
        #[arg(long)]
        sequential: bool,
    },
    /// List every node of a tree
    Ls {
        tree: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show header and node statistics of a tree
    Stat {
        tree: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one node by path
    Show {
        tree: PathBuf,
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Build { .. } => "build",
        Commands::Merge { .. } => "merge",
        Commands::Ls { .. } => "ls",
        Commands::Stat { .. } => "stat",
        Commands::Show { .. } => "show",
    }
}

/// CLI context holding the resolved configuration
pub struct CliContext {
    config: NodeTreeConfig,
}

type FileTree = OptimizedNodeTree<BufReader<File>>;

impl CliContext {
    /// Create a new CLI context
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::resolve(config_path.as_deref())?;
        Ok(Self { config })
    }

    pub fn with_config(config: NodeTreeConfig) -> Result<Self, ApiError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NodeTreeConfig {
        &self.config
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Build { output, dir, list } => {
                let paths = match (dir, list) {
                    (Some(dir), _) => DirectoryArchive::open(dir)?.file_list()?,
                    (None, Some(list)) => ListArchive::from_file(list)?.file_list()?,
                    (None, None) => {
                        return Err(ApiError::ConfigError(
                            "build needs --dir or --list".to_string(),
                        ))
                    }
                };
                let mut builder = NodeTreeBuilder::with_classifier(self.classifier());
                builder.add_paths(&paths)?;
                let len = write_tree(&builder, output)?;
                Ok(format!(
                    "Wrote {} ({} paths, {} nodes, {} bytes)",
                    output.display(),
                    paths.len(),
                    builder.node_count(),
                    len
                ))
            }
            Commands::Merge {
                output,
                packages,
                sequential,
            } => {
                let archives = packages
                    .iter()
                    .map(|arg| open_package(arg))
                    .collect::<Result<Vec<NamedArchive>, ApiError>>()?;
                let builder = MultiPackageNodeTreeBuilder::with_config(
                    &self.config.build,
                    self.classifier(),
                )?;
                if self.config.build.parallel && !sequential {
                    consume_packages(&builder, &archives)?;
                } else {
                    consume_packages_sequential(&builder, &archives)?;
                }
                let len = write_tree(&builder, output)?;
                Ok(format!(
                    "Wrote {} ({} packages, {} nodes, {} bytes)",
                    output.display(),
                    builder.package_count(),
                    builder.node_count(),
                    len
                ))
            }
            Commands::Ls { tree, format } => {
                let tree = open_tree(tree)?;
                format_entries(&tree, format)
            }
            Commands::Stat { tree, format } => {
                let len = std::fs::metadata(tree)?.len();
                let tree = open_tree(tree)?;
                format_stats(&tree, len, format)
            }
            Commands::Show { tree, path, format } => {
                let tree = open_tree(tree)?;
                let node = tree
                    .find(path)?
                    .ok_or_else(|| ApiError::PathNotInTree(path.clone()))?;
                format_node(&tree, &node, format)
            }
        }
    }

    fn classifier(&self) -> Arc<ExtensionClassifier> {
        Arc::new(ExtensionClassifier::default().with_overrides(&self.config.classifier.extensions))
    }
}

/// Parse `NAME=SOURCE` and open the archive behind SOURCE
fn open_package(arg: &str) -> Result<NamedArchive, ApiError> {
    let (name, source) = arg.split_once('=').ok_or_else(|| {
        ApiError::ConfigError(format!("Invalid package {:?} (expected NAME=SOURCE)", arg))
    })?;
    let source = Path::new(source);
    let archive: Arc<dyn Archive> = if source.is_dir() {
        Arc::new(DirectoryArchive::open(source)?)
    } else {
        Arc::new(ListArchive::from_file(source)?)
    };
    Ok((name.to_string(), archive))
}

fn write_tree(builder: &dyn TreeBuilder, output: &Path) -> Result<u64, ApiError> {
    let built = builder.build()?;
    let mut writer = BufWriter::new(File::create(output)?);
    built.write_to(&mut writer)?;
    writer.flush()?;
    Ok(built.len())
}

fn open_tree(path: &Path) -> Result<FileTree, ApiError> {
    Ok(OptimizedNodeTree::open(path)?)
}

fn validate_format(format: &str) -> Result<(), ApiError> {
    match format {
        "text" | "json" => Ok(()),
        _ => Err(ApiError::ConfigError(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            format
        ))),
    }
}

fn to_json(value: &serde_json::Value) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to encode JSON: {}", e)))
}

fn format_entries(tree: &FileTree, format: &str) -> Result<String, ApiError> {
    validate_format(format)?;
    let entries = tree.entries()?;
    if format == "json" {
        let mut rows = Vec::with_capacity(entries.len());
        for (path, node) in &entries {
            rows.push(json!({
                "path": path,
                "offset": tree.get_node_offset(node),
                "type": node.node_type.bits(),
                "type_names": node.node_type.describe(),
                "kind": node.content_kind.bits(),
                "hard_nodes": node.hard_node_refs.len(),
            }));
        }
        return to_json(&serde_json::Value::Array(rows));
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Path", "Type", "Kind", "Hard Nodes"]);
    for (path, node) in &entries {
        table.add_row(vec![
            path.clone(),
            node.node_type.describe(),
            node.content_kind.to_string(),
            node.hard_node_refs.len().to_string(),
        ]);
    }
    Ok(table.to_string())
}

fn format_stats(tree: &FileTree, len: u64, format: &str) -> Result<String, ApiError> {
    validate_format(format)?;
    let header = *tree.header();
    let entries = tree.entries()?;
    let files = entries.iter().filter(|(_, n)| n.node_type.is_file()).count();
    let virtuals = entries
        .iter()
        .filter(|(_, n)| n.node_type.is_virtual())
        .count();
    let root_kind = tree.root()?.content_kind;

    if format == "json" {
        return to_json(&json!({
            "format_version": header.format_version,
            "node_block_offset": header.node_block_offset,
            "name_block_offset": header.name_block_offset,
            "sorting_block_offset": header.sorting_block_offset,
            "bytes": len,
            "nodes": entries.len() + 1,
            "files": files,
            "virtual_nodes": virtuals,
            "root_kind": root_kind.bits(),
        }));
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);
    let rows = [
        ("Format version", header.format_version.to_string()),
        ("Node block", header.node_block_offset.to_string()),
        ("Name block", header.name_block_offset.to_string()),
        ("Sorting block", header.sorting_block_offset.to_string()),
        ("Bytes", len.to_string()),
        ("Nodes", (entries.len() + 1).to_string()),
        ("Files", files.to_string()),
        ("Virtual nodes", virtuals.to_string()),
        ("Root kind", root_kind.to_string()),
    ];
    for (field, value) in rows {
        table.add_row(vec![field.to_string(), value]);
    }
    Ok(table.to_string())
}

fn format_node(tree: &FileTree, node: &Node, format: &str) -> Result<String, ApiError> {
    validate_format(format)?;
    let path = tree.node_path(node)?;
    let mut children = Vec::new();
    for child in tree.children(node)? {
        children.push(tree.get_node_name(&child)?);
    }
    let mut hard_nodes = Vec::new();
    for hard in tree.hard_nodes(node)? {
        hard_nodes.push(tree.node_path(&hard)?);
    }

    if format == "json" {
        return to_json(&json!({
            "path": path,
            "offset": tree.get_node_offset(node),
            "type": node.node_type.bits(),
            "type_names": node.node_type.describe(),
            "kind": node.content_kind.bits(),
            "parent": node.parent_ref,
            "children": children,
            "hard_nodes": hard_nodes,
        }));
    }

    let mut lines = vec![
        format!("Path: {}", if path.is_empty() { "<root>" } else { path.as_str() }),
        format!(
            "Offset: {}",
            tree.get_node_offset(node)
                .map(|o| o.to_string())
                .unwrap_or_else(|| "-".to_string())
        ),
        format!("Type: {}", node.node_type.describe()),
        format!("Kind: {}", node.content_kind),
    ];
    if !children.is_empty() {
        lines.push(format!("Children ({}):", children.len()));
        lines.extend(children.iter().map(|c| format!("  {}", c)));
    }
    if !hard_nodes.is_empty() {
        lines.push(format!("Hard nodes ({}):", hard_nodes.len()));
        lines.extend(hard_nodes.iter().map(|h| format!("  {}", h)));
    }
    Ok(lines.join("\n"))
}
