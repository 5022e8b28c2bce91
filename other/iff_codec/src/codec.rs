use std::io::Write;

use contracts::debug_ensures;

use crate::chunk::{Chunk, ChunkId, FRAME_SIZE};
use crate::cursor::{ChunkWriter, Cursor};
use crate::error::{FormatError, Result};
use crate::forms;

/// How chunk records are laid out inside a container body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Layout {
    /// Every record stands alone; the length field is the payload length and chunks have no children.
    #[default]
    Flat,
    /// Records whose tag is a known form tag are groups: a 4-byte group type followed by member
    /// records, with the length field covering the group type and every member.
    Recursive,
}

impl Layout {
    pub fn is_group(self, id: ChunkId) -> bool { self == Layout::Recursive && forms::is_known(id) }
}

/// One record as it sits on the wire, before it is attached to a tree.
#[derive(Copy, Clone, Debug)]
pub struct RawRecord<'a> {
    pub offset: usize,
    pub id: ChunkId,
    pub declared: u32,
    pub data: &'a [u8],
    /// Bytes of member records that follow (groups only).
    pub span: u64,
}

impl<'a> RawRecord<'a> {
    /// Frame, payload and pad byte. Members are not included.
    pub fn size(&self) -> u64 { FRAME_SIZE + self.data.len() as u64 + (self.data.len() as u64 & 1) }
}

pub fn read_record<'a>(cursor: &mut Cursor<'a>, layout: Layout) -> Result<RawRecord<'a>> {
    let offset = cursor.position();
    let id = cursor.read_id()?;
    let declared = cursor.read_u32()?;

    let (data, span) = if layout.is_group(id) {
        if declared < 4 {
            return Err(FormatError::MalformedGroup { id, len: declared as u64 }.into());
        }

        (cursor.read_bytes(4)?, declared as u64 - 4)
    } else {
        let data = cursor.read_bytes(declared as u64)?;
        cursor.skip(declared as u64 & 1)?;
        (data, 0)
    };

    log::trace!("record {id:?} at {offset:#x}: {} payload bytes, {span} member bytes", data.len());

    Ok(RawRecord { offset, id, declared, data, span })
}

/// Reads one chunk and, in the recursive layout, all of its members.
///
/// Members are collected with an explicit stack of open groups rather than by recursion. Every record
/// read is charged against each open group; a group closes when its remaining span hits exactly zero.
pub fn read_chunk(cursor: &mut Cursor<'_>, layout: Layout) -> Result<Chunk> {
    // (group, member bytes still expected)
    let mut open: Vec<(Chunk, u64)> = Vec::new();

    loop {
        let record = read_record(cursor, layout)?;
        let size = record.size();

        for (_, left) in &mut open {
            if *left < size {
                return Err(FormatError::SpanOverrun {
                    id: record.id,
                    offset: record.offset,
                    need: size,
                    left: *left,
                }
                .into());
            }

            *left -= size;
        }

        let chunk = Chunk::new(record.id, record.data.to_vec());
        let mut finished = if record.span > 0 {
            open.push((chunk, record.span));
            None
        } else {
            Some(chunk)
        };

        loop {
            if let Some(done) = finished.take() {
                match open.last_mut() {
                    Some((parent, _)) => parent.push_child(done),
                    None => return Ok(done),
                }
            }

            if !matches!(open.last(), Some((_, 0))) {
                break;
            }

            finished = open.pop().map(|(chunk, _)| chunk);
        }
    }
}

/// The value of the length field for `chunk` alone.
pub fn declared_len(chunk: &Chunk, layout: Layout) -> Result<u32> {
    let id = chunk.id();

    let value = if layout.is_group(id) {
        if chunk.payload_len() != 4 {
            return Err(FormatError::MalformedGroup { id, len: chunk.payload_len() }.into());
        }

        chunk.encoded_size() - FRAME_SIZE
    } else {
        if !chunk.is_leaf() {
            let reason = match layout {
                Layout::Flat => "the flat layout cannot carry them",
                Layout::Recursive => "only group chunks may have members",
            };
            return Err(FormatError::UnexpectedChildren { id, reason }.into());
        }

        chunk.payload_len()
    };

    u32::try_from(value).map_err(|_| FormatError::SizeOverflow { what: "chunk length", value, width: 32 }.into())
}

/// Checks that the whole tree under `chunk` can be written with `layout`.
pub fn check_chunk(chunk: &Chunk, layout: Layout) -> Result<()> {
    for item in chunk.walk() {
        declared_len(item.chunk, layout)?;
    }

    Ok(())
}

/// Writes `chunk` followed by its members in depth-first order.
#[debug_ensures(ret.is_err() || w.position() == old(w.position()) + chunk.encoded_size())]
pub fn write_chunk<W: Write>(w: &mut ChunkWriter<W>, chunk: &Chunk, layout: Layout) -> Result<()> {
    let mut pending = vec![chunk];
    while let Some(node) = pending.pop() {
        let declared = declared_len(node, layout)?;

        w.write_id(node.id())?;
        w.write_u32(declared)?;
        w.write_bytes(node.data())?;
        w.pad(node.payload_len())?;

        pending.extend(node.children().iter().rev());
    }

    Ok(())
}
