//! Lazy reader over a serialized node tree
//!
//! Nodes are decoded on first access and cached for the lifetime of the reader. The
//! caches only grow, so a node handed out once stays valid. Seeking and reading the
//! underlying source happen together under one mutex; cache population happens while that
//! mutex is held, so a node is decoded at most once.

use crate::error::TreeError;
use crate::tree::format::TreeHeader;
use crate::tree::node::{Node, NODE_FIXED_LEN};
use crate::types::{split_path, PATH_SEPARATOR};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::trace;

const NAME_CHUNK: usize = 64;

/// Read-only view of a node tree, safe to share between threads
pub struct OptimizedNodeTree<R = Cursor<Vec<u8>>> {
    header: TreeHeader,
    source: Mutex<R>,
    nodes: RwLock<HashMap<u64, Arc<Node>>>,
    offsets: RwLock<HashMap<Arc<Node>, u64>>,
    names: RwLock<HashMap<u64, Arc<str>>>,
    root: OnceLock<Arc<Node>>,
}

impl OptimizedNodeTree<Cursor<Vec<u8>>> {
    /// Open a tree held in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TreeError> {
        Self::new(Cursor::new(bytes))
    }
}

impl OptimizedNodeTree<BufReader<File>> {
    /// Open a tree stored in a file
    pub fn open(path: &Path) -> Result<Self, TreeError> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> OptimizedNodeTree<R> {
    /// Read and validate the header of `source`
    pub fn new(mut source: R) -> Result<Self, TreeError> {
        let len = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;
        let header = TreeHeader::read_from(&mut source)?;
        header.validate(len)?;
        trace!(?header, len, "Opened node tree");

        Ok(Self {
            header,
            source: Mutex::new(source),
            nodes: RwLock::new(HashMap::new()),
            offsets: RwLock::new(HashMap::new()),
            names: RwLock::new(HashMap::new()),
            root: OnceLock::new(),
        })
    }

    pub fn header(&self) -> &TreeHeader {
        &self.header
    }

    /// Node stored at `offset`.
    ///
    /// Offsets below the node block (such as the -1 "no parent" sentinel) yield `Ok(None)`;
    /// offsets at or past the name block are an error. Only offsets taken from the header or
    /// from another node's references address a node: any other offset inside the node
    /// block is decoded as-is and may yield a meaningless record.
    pub fn get_node(&self, offset: u64) -> Result<Option<Arc<Node>>, TreeError> {
        if offset < self.header.node_block_offset {
            return Ok(None);
        }
        if offset >= self.header.name_block_offset {
            return Err(TreeError::InvalidOffset(offset));
        }
        if let Some(node) = self.nodes.read().get(&offset) {
            return Ok(Some(node.clone()));
        }

        let mut source = self.source.lock();
        // Another reader may have decoded it while we waited for the source
        if let Some(node) = self.nodes.read().get(&offset) {
            return Ok(Some(node.clone()));
        }
        source.seek(SeekFrom::Start(offset))?;
        let node = Arc::new(Node::read_from(&mut *source, offset)?);
        trace!(offset, "Decoded node");

        self.nodes.write().insert(offset, node.clone());
        self.offsets.write().entry(node.clone()).or_insert(offset);
        Ok(Some(node))
    }

    /// Offset a node was decoded from; `None` for nodes not obtained from this reader
    pub fn get_node_offset(&self, node: &Node) -> Option<u64> {
        self.offsets.read().get(node).copied()
    }

    /// Name of `node`, empty for the root
    pub fn get_node_name(&self, node: &Node) -> Result<String, TreeError> {
        let Some(offset) = node.name_ref else {
            return Ok(String::new());
        };
        if offset < self.header.name_block_offset || offset >= self.header.sorting_block_offset {
            return Err(TreeError::InvalidOffset(offset));
        }
        if let Some(name) = self.names.read().get(&offset) {
            return Ok(name.to_string());
        }

        let mut source = self.source.lock();
        source.seek(SeekFrom::Start(offset))?;
        let mut bytes = Vec::new();
        let mut chunk = [0u8; NAME_CHUNK];
        loop {
            let read = source.read(&mut chunk)?;
            if read == 0 {
                return Err(TreeError::Truncated(offset + bytes.len() as u64));
            }
            if let Some(end) = chunk[..read].iter().position(|b| *b == 0) {
                bytes.extend_from_slice(&chunk[..end]);
                break;
            }
            bytes.extend_from_slice(&chunk[..read]);
        }
        let name: Arc<str> = String::from_utf8(bytes)
            .map_err(|_| TreeError::InvalidName(offset))?
            .into();
        self.names.write().insert(offset, name.clone());
        Ok(name.to_string())
    }

    /// The root node, resolved on first use
    pub fn root(&self) -> Result<Arc<Node>, TreeError> {
        if let Some(root) = self.root.get() {
            return Ok(root.clone());
        }
        let root = self
            .get_node(self.header.node_block_offset)?
            .ok_or_else(|| TreeError::CorruptHeader("node block is empty".to_string()))?;
        Ok(self.root.get_or_init(|| root).clone())
    }

    pub fn parent(&self, node: &Node) -> Result<Option<Arc<Node>>, TreeError> {
        match node.parent_ref {
            Some(offset) => self.get_node(offset),
            None => Ok(None),
        }
    }

    pub fn children(&self, node: &Node) -> Result<Vec<Arc<Node>>, TreeError> {
        self.resolve_all(&node.children)
    }

    /// Hard nodes aggregated by a virtual node
    pub fn hard_nodes(&self, node: &Node) -> Result<Vec<Arc<Node>>, TreeError> {
        self.resolve_all(&node.hard_node_refs)
    }

    fn resolve_all(&self, offsets: &[u64]) -> Result<Vec<Arc<Node>>, TreeError> {
        let mut nodes = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let node = self
                .get_node(*offset)?
                .ok_or(TreeError::InvalidOffset(*offset))?;
            nodes.push(node);
        }
        Ok(nodes)
    }

    /// Upper bound on the number of nodes the node block can hold
    fn max_nodes(&self) -> u64 {
        (self.header.name_block_offset - self.header.node_block_offset) / NODE_FIXED_LEN
    }

    /// Full path of `node`, rebuilt by walking parent references up to the root
    pub fn node_path(&self, node: &Node) -> Result<String, TreeError> {
        let max_depth = self.max_nodes();
        let mut components = Vec::new();
        let mut current = Some(Arc::new(node.clone()));
        while let Some(node) = current {
            if node.name_ref.is_none() {
                break;
            }
            if components.len() as u64 >= max_depth {
                let offset = node.parent_ref.unwrap_or(self.header.node_block_offset);
                return Err(TreeError::ReferenceCycle(offset));
            }
            components.push(self.get_node_name(&node)?);
            current = self.parent(&node)?;
        }
        components.reverse();
        let separator = PATH_SEPARATOR.to_string();
        Ok(components.join(separator.as_str()))
    }

    /// Resolve a path from the root by child names. The empty path is the root.
    pub fn find(&self, path: &str) -> Result<Option<Arc<Node>>, TreeError> {
        let mut current = self.root()?;
        for component in split_path(path) {
            let mut next = None;
            for child in self.children(&current)? {
                if self.get_node_name(&child)? == component {
                    next = Some(child);
                    break;
                }
            }
            match next {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Every node below the root with its full path, depth first
    pub fn entries(&self) -> Result<Vec<(String, Arc<Node>)>, TreeError> {
        let separator = PATH_SEPARATOR.to_string();
        let mut entries = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(self.header.node_block_offset);
        let mut stack: Vec<(String, Arc<Node>)> = vec![(String::new(), self.root()?)];
        while let Some((path, node)) = stack.pop() {
            for offset in &node.children {
                if !visited.insert(*offset) {
                    return Err(TreeError::ReferenceCycle(*offset));
                }
            }
            for child in self.children(&node)?.into_iter().rev() {
                let name = self.get_node_name(&child)?;
                let child_path = if path.is_empty() {
                    name
                } else {
                    [path.as_str(), name.as_str()].join(separator.as_str())
                };
                stack.push((child_path, child));
            }
            if node.name_ref.is_some() {
                entries.push((path, node));
            }
        }
        Ok(entries)
    }

    /// Paths of every File node reachable from the root
    pub fn file_paths(&self) -> Result<Vec<String>, TreeError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|(_, node)| node.node_type.is_file())
            .map(|(path, _)| path)
            .collect())
    }

    /// Number of nodes decoded so far
    pub fn cached_nodes(&self) -> usize {
        self.nodes.read().len()
    }

    /// Close the tree and hand back the underlying source
    pub fn close(self) -> R {
        self.source.into_inner()
    }
}
