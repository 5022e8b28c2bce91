use crate::error::{FormatError, Result};
use crate::walk::ChunkTreeIterator;

/// Size of the tag + length frame that precedes every chunk payload.
pub const FRAME_SIZE: u64 = 8;

/// A 4-byte chunk tag. Always exactly 4 bytes: shorter tags are padded with spaces, longer ones are cut.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    pub const fn new(tag: &[u8]) -> ChunkId {
        let mut out = [b' '; 4];
        let mut i = 0;
        while i < 4 && i < tag.len() {
            out[i] = tag[i];
            i += 1;
        }

        ChunkId(out)
    }

    pub const fn from_str(s: &str) -> ChunkId { Self::new(s.as_bytes()) }

    /// Like [`ChunkId::new`] but refuses anything that is not already 4 bytes long.
    pub fn exact(tag: &[u8]) -> Result<ChunkId> {
        match tag {
            [a, b, c, d] => Ok(ChunkId([*a, *b, *c, *d])),
            _ => Err(FormatError::ChunkIdLength { len: tag.len() }.into()),
        }
    }

    pub const fn as_bytes(&self) -> &[u8; 4] { &self.0 }

    pub fn as_str(&self) -> Option<&str> { std::str::from_utf8(&self.0).ok() }

    pub fn is_printable(&self) -> bool { self.0.iter().all(|b| matches!(b, 0x20..=0x7E)) }
}

impl std::fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_fmt(format_args!("\"{}\"", self)) }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in self.0 {
            for c in std::ascii::escape_default(b) {
                f.write_fmt(format_args!("{}", c as char))?;
            }
        }

        Ok(())
    }
}

impl From<&str> for ChunkId {
    fn from(value: &str) -> Self { ChunkId::from_str(value) }
}

impl From<&[u8]> for ChunkId {
    fn from(value: &[u8]) -> Self { ChunkId::new(value) }
}

impl From<[u8; 4]> for ChunkId {
    fn from(value: [u8; 4]) -> Self { ChunkId(value) }
}

impl From<&[u8; 4]> for ChunkId {
    fn from(value: &[u8; 4]) -> Self { ChunkId(*value) }
}

#[allow(dead_code)]
pub mod chunk_ids {
    use super::ChunkId;

    pub const FORM: ChunkId = ChunkId::from_str("FORM");
    pub const LIST: ChunkId = ChunkId::from_str("LIST");
    pub const CAT: ChunkId = ChunkId::from_str("CAT ");
    pub const PROP: ChunkId = ChunkId::from_str("PROP");
    pub const FAR: ChunkId = ChunkId::from_str("FAR ");
}

/// Encodes text the way a plain ASCII encoder would: anything outside of 7 bits becomes `?`.
pub fn ascii_bytes(text: &str) -> Vec<u8> { text.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }).collect() }

/// A tagged payload with an ordered list of owned children.
///
/// Sizes are never stored; [`Chunk::encoded_size`] is recomputed from the tree every time.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Chunk {
    id: ChunkId,
    data: Vec<u8>,
    children: Vec<Chunk>,
}

impl Chunk {
    pub fn new(id: impl Into<ChunkId>, data: impl Into<Vec<u8>>) -> Chunk {
        Self {
            id: id.into(),
            data: data.into(),
            children: Vec::new(),
        }
    }

    pub fn empty(id: impl Into<ChunkId>) -> Chunk { Self::new(id, Vec::new()) }

    /// The payload is `text` encoded as ASCII.
    pub fn from_text(id: impl Into<ChunkId>, text: &str) -> Chunk { Self::new(id, ascii_bytes(text)) }

    pub fn with_children(id: impl Into<ChunkId>, data: impl Into<Vec<u8>>, children: Vec<Chunk>) -> Chunk {
        Self {
            id: id.into(),
            data: data.into(),
            children,
        }
    }

    /// A `FORM`/`LIST`/`CAT `/`PROP` style group: the payload is the 4-byte group type, the members are children.
    pub fn group(tag: impl Into<ChunkId>, group_type: impl Into<ChunkId>, children: Vec<Chunk>) -> Chunk {
        Self::with_children(tag, group_type.into().0.to_vec(), children)
    }

    pub fn id(&self) -> ChunkId { self.id }

    pub fn data(&self) -> &[u8] { &self.data }

    pub fn children(&self) -> &[Chunk] { &self.children }

    pub fn is_leaf(&self) -> bool { self.children.is_empty() }

    pub fn payload_len(&self) -> u64 { self.data.len() as u64 }

    /// 1 if the payload is followed by a pad byte on the wire, 0 otherwise.
    pub fn padding(&self) -> u64 { self.payload_len() & 1 }

    /// Bytes taken by this chunk alone: frame, payload and pad byte.
    pub fn record_size(&self) -> u64 { FRAME_SIZE + self.payload_len() + self.padding() }

    /// Bytes taken by this chunk and all of its descendants.
    pub fn encoded_size(&self) -> u64 {
        // iterative so that deep trees do not blow the stack
        let mut total = 0;
        let mut pending = vec![self];
        while let Some(chunk) = pending.pop() {
            total += chunk.record_size();
            pending.extend(chunk.children.iter());
        }

        total
    }

    /// Depth first, parents before children, siblings in order.
    pub fn walk(&self) -> ChunkTreeIterator<'_> { ChunkTreeIterator::new(std::slice::from_ref(self)) }

    /// The first direct child with the given tag.
    pub fn child(&self, id: impl Into<ChunkId>) -> Option<&Chunk> {
        let id = id.into();
        self.children.iter().find(|c| c.id == id)
    }

    pub fn text(&self) -> String { String::from_utf8_lossy(&self.data).into_owned() }

    pub fn into_data(self) -> Vec<u8> { self.data }

    pub(crate) fn push_child(&mut self, child: Chunk) { self.children.push(child) }
}
