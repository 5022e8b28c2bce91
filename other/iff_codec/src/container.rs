use std::io::{Read, Write};
use std::path::Path;

use crate::chunk::{chunk_ids, Chunk, ChunkId};
use crate::codec::{self, Layout};
use crate::config;
use crate::cursor::{ChunkWriter, Cursor};
use crate::error::{Error, FormatError, Result};
use crate::forms;
use crate::header::{Body, HeaderKind};
use crate::walk::ChunkTreeIterator;

bitflags::bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    /// Switches for reading containers.
    ///
    /// - RECURSIVE -> group chunks (`FORM`, `LIST`, ...) are parsed into member trees
    /// - EXTENSIBLE_FORMS -> unknown form tags are accepted and registered instead of refused
    pub struct ReadOptions: u8 {
        const RECURSIVE        = 1 << 0;
        const EXTENSIBLE_FORMS = 1 << 1;
    }
}

impl ReadOptions {
    pub fn layout(self) -> Layout {
        if self.contains(ReadOptions::RECURSIVE) {
            Layout::Recursive
        } else {
            Layout::Flat
        }
    }
}

/// An ordered list of top-level chunks behind one of the [`HeaderKind`] preambles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    kind: HeaderKind,
    layout: Layout,
    form_tag: ChunkId,
    program_name: Option<String>,
    chunks: Vec<Chunk>,
}

impl Container {
    pub fn new(kind: HeaderKind) -> Container {
        Self {
            kind,
            layout: Layout::Flat,
            form_tag: if kind == HeaderKind::Archive { chunk_ids::FAR } else { chunk_ids::FORM },
            program_name: None,
            chunks: Vec::new(),
        }
    }

    pub fn classic(form_tag: impl Into<ChunkId>) -> Container { Self::new(HeaderKind::Classic).with_form_tag(form_tag) }

    pub fn named(program_name: impl Into<String>) -> Container { Self::new(HeaderKind::NamedProgram).with_program_name(program_name) }

    pub fn archive() -> Container { Self::new(HeaderKind::Archive) }

    /// Tags outside of the built-in set are registered so that the container can be read back.
    pub fn with_form_tag(mut self, form_tag: impl Into<ChunkId>) -> Self {
        let form_tag = form_tag.into();
        if self.kind != HeaderKind::Archive {
            forms::register(form_tag);
            self.form_tag = form_tag;
        }

        self
    }

    pub fn with_program_name(mut self, program_name: impl Into<String>) -> Self {
        self.set_program_name(program_name);
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn kind(&self) -> HeaderKind { self.kind }

    /// Archives are always flat.
    pub fn layout(&self) -> Layout {
        match self.kind {
            HeaderKind::Archive => Layout::Flat,
            _ => self.layout,
        }
    }

    pub fn form_tag(&self) -> ChunkId { self.form_tag }

    pub fn program_name(&self) -> Option<&str> { self.program_name.as_deref() }

    pub fn set_program_name(&mut self, program_name: impl Into<String>) {
        let program_name = program_name.into();
        self.program_name = if program_name.is_empty() { None } else { Some(program_name) };
    }

    /// The name that goes on the wire: this container's own, or the process-wide default.
    pub fn effective_program_name(&self) -> String { self.program_name.clone().unwrap_or_else(config::default_program_name) }

    pub fn chunks(&self) -> &[Chunk] { &self.chunks }

    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> { self.chunks.iter() }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn into_chunks(self) -> Vec<Chunk> { self.chunks }

    /// Adds `chunk` at the end. Rejects chunks this container's layout cannot write.
    pub fn append(&mut self, chunk: Chunk) -> Result<()> {
        codec::check_chunk(&chunk, self.layout())?;
        self.chunks.push(chunk);
        Ok(())
    }

    /// Adds a chunk built from a raw tag and an explicitly declared size, both of which must be exact.
    pub fn append_declared(&mut self, id: &[u8], declared_size: u64, data: Vec<u8>) -> Result<()> {
        let id = ChunkId::exact(id)?;
        if declared_size != data.len() as u64 {
            return Err(FormatError::SizeMismatch {
                id,
                declared: declared_size,
                actual: data.len() as u64,
            }
            .into());
        }

        self.append(Chunk::new(id, data))
    }

    /// The first top-level chunk with the given tag. Members of groups are not searched.
    pub fn chunk(&self, id: impl Into<ChunkId>) -> Option<&Chunk> {
        let id = id.into();
        self.chunks.iter().find(|c| c.id() == id)
    }

    pub fn chunk_at(&self, index: usize) -> Result<&Chunk> { self.chunks.get(index).ok_or(Error::OutOfRange { index, len: self.chunks.len() }) }

    /// Every chunk in the container, depth first.
    pub fn walk(&self) -> ChunkTreeIterator<'_> { ChunkTreeIterator::new(&self.chunks) }

    /// The value of the header's size field: the encoded size of every top-level chunk.
    pub fn body_size(&self) -> u64 { self.chunks.iter().map(Chunk::encoded_size).sum() }

    /// Total number of bytes [`Container::write_to`] produces.
    pub fn encoded_size(&self) -> u64 { self.kind.encoded_len() as u64 + self.body_size() }

    pub fn write_to<W: Write>(&self, sink: W) -> Result<()> {
        let layout = self.layout();
        for chunk in &self.chunks {
            codec::check_chunk(chunk, layout)?;
        }

        let body = match self.kind {
            HeaderKind::Archive => Body::Entries(u32::try_from(self.chunks.len()).map_err(|_| FormatError::SizeOverflow {
                what: "entry count",
                value: self.chunks.len() as u64,
                width: 32,
            })?),
            _ => Body::Bytes(self.body_size()),
        };

        let mut w = ChunkWriter::new(sink);
        self.kind.write(&mut w, self.form_tag, &self.effective_program_name(), body)?;
        for chunk in &self.chunks {
            codec::write_chunk(&mut w, chunk, layout)?;
        }
        w.flush()?;

        log::debug!("wrote {:?} container {:?} with {} chunks ({} bytes)", self.kind, self.form_tag, self.chunks.len(), w.position());
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut ret = Vec::with_capacity(self.encoded_size() as usize);
        self.write_to(&mut ret)?;
        Ok(ret)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::Argument("file path cannot be empty"));
        }

        let file = std::fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(file))
    }

    /// [`Container::write_to_file`] that only reports whether it worked. The cause is logged.
    pub fn try_write_to_file(&self, path: impl AsRef<Path>) -> bool {
        match self.write_to_file(path.as_ref()) {
            Ok(()) => true,
            Err(e) => {
                log::error!("could not write {}: {e}", path.as_ref().display());
                false
            }
        }
    }

    /// Reads the whole source and parses it, identifying the header kind from its leading bytes.
    pub fn read_from<R: Read>(mut source: R, options: ReadOptions) -> Result<Container> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes, options)
    }

    pub fn from_bytes(bytes: &[u8], options: ReadOptions) -> Result<Container> {
        if bytes.is_empty() {
            return Err(Error::Argument("data cannot be empty"));
        }

        let kind = HeaderKind::identify(bytes, options.contains(ReadOptions::EXTENSIBLE_FORMS)).ok_or_else(|| HeaderKind::unidentified(bytes))?;

        Self::read_as(kind, bytes, options)
    }

    pub fn read_from_file(path: impl AsRef<Path>, options: ReadOptions) -> Result<Container> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::Argument("file path cannot be empty"));
        }

        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, options)
    }

    /// Parses `bytes` as a container of the given kind, without sniffing.
    ///
    /// The body must end exactly where the header says it does. Bytes after that are ignored.
    pub fn read_as(kind: HeaderKind, bytes: &[u8], options: ReadOptions) -> Result<Container> {
        if bytes.is_empty() {
            return Err(Error::Argument("data cannot be empty"));
        }

        let mut cursor = Cursor::new(bytes);
        let preamble = kind.read(&mut cursor, options.contains(ReadOptions::EXTENSIBLE_FORMS))?;
        let layout = if kind == HeaderKind::Archive { Layout::Flat } else { options.layout() };

        let mut chunks = Vec::new();
        match preamble.body {
            Body::Bytes(size) => {
                cursor.ensure(size)?;
                let end = cursor.position() + size as usize;

                while cursor.position() < end {
                    chunks.push(codec::read_chunk(&mut cursor, layout)?);
                }

                if cursor.position() != end {
                    return Err(FormatError::EndMismatch {
                        expected: end,
                        actual: cursor.position(),
                    }
                    .into());
                }
            }

            Body::Entries(count) => {
                for _ in 0..count {
                    chunks.push(codec::read_chunk(&mut cursor, Layout::Flat)?);
                }
            }
        }

        if !cursor.is_exhausted() {
            log::debug!("ignoring {} bytes after the end of the container body", cursor.remaining());
        }

        log::debug!("read {:?} container {:?} with {} chunks", kind, preamble.form_tag, chunks.len());

        Ok(Self {
            kind,
            layout,
            form_tag: preamble.form_tag,
            program_name: preamble.program_name,
            chunks,
        })
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter { self.chunks.iter() }
}

const PREVIEW_LEN: usize = 32;

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            HeaderKind::Archive => writeln!(f, "archive")?,
            HeaderKind::Classic => writeln!(f, "{} container", self.form_tag)?,
            HeaderKind::NamedProgram => writeln!(f, "{} container by {:?}", self.form_tag, self.program_name().unwrap_or(""))?,
        }

        writeln!(f, "total size: {} bytes", self.body_size())?;
        write!(f, "chunks: {}", self.chunks.len())?;

        for chunk in &self.chunks {
            let preview = &chunk.data()[..chunk.data().len().min(PREVIEW_LEN)];
            write!(f, "\n{} ({} bytes): {}", chunk.id(), chunk.payload_len(), preview.escape_ascii())?;
            if preview.len() < chunk.data().len() {
                write!(f, "...")?;
            }
        }

        Ok(())
    }
}
