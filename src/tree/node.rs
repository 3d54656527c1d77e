//! Serialized node records

use crate::error::TreeError;
use crate::tree::format::{
    decode_ref, encode_ref, read_i64, read_u32, read_u64, write_i64, write_u32, write_u64,
};
use crate::types::{ContentKind, NodeType};
use std::io::{Read, Write};

/// Bytes taken by the fixed fields: type, content kind, name ref, parent ref, child count
pub const NODE_FIXED_LEN: u64 = 4 + 8 + 8 + 8 + 8;

/// Upper bound for pre-allocating reference lists from untrusted counts
const MAX_PREALLOCATED_REFS: u64 = 4096;

/// One tree entry as it is laid out in the node block.
///
/// All references are absolute byte offsets into the serialized tree. Nodes are immutable
/// once decoded, and structural equality identifies them: no two nodes of a tree share
/// type, name and parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub node_type: NodeType,
    pub content_kind: ContentKind,
    /// Offset of the null-terminated name, `None` for the root
    pub name_ref: Option<u64>,
    /// Offset of the parent node, `None` for the root
    pub parent_ref: Option<u64>,
    pub children: Vec<u64>,
    /// Hard nodes aggregated by a virtual node; always empty unless `node_type` is virtual
    pub hard_node_refs: Vec<u64>,
}

impl Node {
    /// Serialized size of a node with the given shape
    pub fn encoded_len_for(node_type: NodeType, children: usize, hard_nodes: usize) -> u64 {
        let mut len = NODE_FIXED_LEN + 8 * children as u64;
        if node_type.is_virtual() {
            len += 8 + 8 * hard_nodes as u64;
        }
        len
    }

    pub fn encoded_len(&self) -> u64 {
        Self::encoded_len_for(self.node_type, self.children.len(), self.hard_node_refs.len())
    }

    pub fn is_root(&self) -> bool {
        self.parent_ref.is_none()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write_u32(writer, self.node_type.bits())?;
        write_u64(writer, self.content_kind.bits())?;
        write_i64(writer, encode_ref(self.name_ref))?;
        write_i64(writer, encode_ref(self.parent_ref))?;
        write_u64(writer, self.children.len() as u64)?;
        for child in &self.children {
            write_u64(writer, *child)?;
        }
        if self.node_type.is_virtual() {
            write_u64(writer, self.hard_node_refs.len() as u64)?;
            for hard in &self.hard_node_refs {
                write_u64(writer, *hard)?;
            }
        }
        Ok(())
    }

    /// Decode the node stored at `offset`; `reader` must already be positioned there
    pub fn read_from<R: Read>(reader: &mut R, offset: u64) -> Result<Self, TreeError> {
        let node_type = NodeType::from_bits_retain(read_u32(reader, offset)?);
        let content_kind = ContentKind(read_u64(reader, offset + 4)?);
        let name_ref = decode_ref(read_i64(reader, offset + 12)?);
        let parent_ref = decode_ref(read_i64(reader, offset + 20)?);
        let child_count = read_u64(reader, offset + 28)?;
        let children = read_refs(reader, offset + NODE_FIXED_LEN, child_count)?;

        let hard_node_refs = if node_type.is_virtual() {
            let at = offset + NODE_FIXED_LEN + 8 * child_count;
            let count = read_u64(reader, at)?;
            read_refs(reader, at + 8, count)?
        } else {
            Vec::new()
        };

        Ok(Self {
            node_type,
            content_kind,
            name_ref,
            parent_ref,
            children,
            hard_node_refs,
        })
    }
}

fn read_refs<R: Read>(reader: &mut R, at: u64, count: u64) -> Result<Vec<u64>, TreeError> {
    let mut refs = Vec::with_capacity(count.min(MAX_PREALLOCATED_REFS) as usize);
    for i in 0..count {
        refs.push(read_u64(reader, at + 8 * i)?);
    }
    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample(node_type: NodeType) -> Node {
        Node {
            node_type,
            content_kind: ContentKind(0x5),
            name_ref: Some(400),
            parent_ref: Some(28),
            children: vec![100, 200],
            hard_node_refs: if node_type.is_virtual() {
                vec![300]
            } else {
                Vec::new()
            },
        }
    }

    #[test]
    fn test_plain_node_size_and_layout() {
        let node = sample(NodeType::DIRECTORY);
        let mut buf = Vec::new();
        node.write_to(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, node.encoded_len());
        assert_eq!(node.encoded_len(), NODE_FIXED_LEN + 16);
        assert_eq!(&buf[28..36], &2u64.to_le_bytes());

        let decoded = Node::read_from(&mut Cursor::new(buf), 0).unwrap();
        assert_eq!(decoded, node);
    }

    #[test]
    fn test_virtual_node_carries_hard_refs() {
        let node = sample(NodeType::FILE | NodeType::VIRTUAL);
        let mut buf = Vec::new();
        node.write_to(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, NODE_FIXED_LEN + 16 + 8 + 8);

        let decoded = Node::read_from(&mut Cursor::new(buf), 0).unwrap();
        assert_eq!(decoded.hard_node_refs, vec![300]);
    }

    #[test]
    fn test_root_refs_use_sentinel() {
        let root = Node {
            node_type: NodeType::DIRECTORY,
            content_kind: ContentKind::UNKNOWN,
            name_ref: None,
            parent_ref: None,
            children: Vec::new(),
            hard_node_refs: Vec::new(),
        };
        let mut buf = Vec::new();
        root.write_to(&mut buf).unwrap();
        assert_eq!(&buf[12..20], &(-1i64).to_le_bytes());
        assert_eq!(&buf[20..28], &(-1i64).to_le_bytes());
        let decoded = Node::read_from(&mut Cursor::new(buf), 0).unwrap();
        assert!(decoded.is_root());
        assert_eq!(decoded.name_ref, None);
    }

    #[test]
    fn test_truncated_child_list() {
        let node = sample(NodeType::DIRECTORY);
        let mut buf = Vec::new();
        node.write_to(&mut buf).unwrap();
        buf.truncate(buf.len() - 4);
        assert!(matches!(
            Node::read_from(&mut Cursor::new(buf), 0),
            Err(TreeError::Truncated(_))
        ));
    }
}
