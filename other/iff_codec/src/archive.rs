//! Flat "FAR " archives: a count followed by named blobs.
//!
//! Entries are stored as ordinary top-level chunks of a [`HeaderKind::Archive`] container; this module
//! only puts names on things.

use crate::chunk::{Chunk, ChunkId};
use crate::container::Container;
use crate::detect::try_as_container;
use crate::error::Result;
use crate::header::HeaderKind;

/// One named blob in an archive.
#[derive(Copy, Clone, Debug)]
pub struct Entry<'a> {
    chunk: &'a Chunk,
}

impl<'a> Entry<'a> {
    pub fn name(&self) -> ChunkId { self.chunk.id() }

    pub fn content(&self) -> &'a [u8] { self.chunk.data() }

    /// The entry's content, if it happens to be a named-program container.
    pub fn as_container(&self) -> Option<Container> { try_as_container(self.chunk.data()) }
}

impl Container {
    pub fn is_archive(&self) -> bool { self.kind() == HeaderKind::Archive }

    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> { self.iter().map(|chunk| Entry { chunk }) }

    pub fn add_entry(&mut self, name: impl Into<ChunkId>, content: impl Into<Vec<u8>>) -> Result<()> { self.append(Chunk::new(name, content)) }

    /// Serialises `container` and stores the bytes under `name`.
    pub fn add_container_entry(&mut self, name: impl Into<ChunkId>, container: &Container) -> Result<()> { self.add_entry(name, container.to_bytes()?) }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::container::ReadOptions;

    #[test]
    fn test_archive_layout() {
        let mut archive = Container::archive();
        archive.add_entry("ODD", vec![1u8, 2, 3]).unwrap();
        archive.add_entry("EVEN", vec![1u8, 2]).unwrap();

        let bytes = archive.to_bytes().unwrap();

        #[rustfmt::skip]
        let expected = [
            b'F', b'A', b'R', b' ', 2, 0, 0, 0,
            b'O', b'D', b'D', b' ', 3, 0, 0, 0, 1, 2, 3, 0,
            b'E', b'V', b'E', b'N', 2, 0, 0, 0, 1, 2,
        ];
        assert_eq!(bytes, expected);

        let parsed = Container::from_bytes(&bytes, ReadOptions::empty()).unwrap();
        assert!(parsed.is_archive());
        assert_eq!(parsed, archive);
    }

    #[test]
    fn test_nested_entries() {
        let mut save = Container::named("sim game");
        save.append(Chunk::from_text("NAME", "Bob")).unwrap();

        let mut archive = Container::archive();
        archive.add_container_entry("SAV1", &save).unwrap();
        archive.add_entry("TXT", b"just text".to_vec()).unwrap();

        let parsed = Container::from_bytes(&archive.to_bytes().unwrap(), ReadOptions::RECURSIVE).unwrap();
        let entries: Vec<_> = parsed.entries().collect();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name(), ChunkId::from("SAV1"));
        assert_eq!(entries[0].as_container(), Some(save));
        assert_eq!(entries[1].content(), b"just text");
        assert!(entries[1].as_container().is_none());
    }

    #[test]
    fn test_truncated_archive() {
        let mut archive = Container::archive();
        archive.add_entry("DATA", vec![0u8; 10]).unwrap();

        let mut bytes = archive.to_bytes().unwrap();
        // claim a second entry that is not there
        bytes[4] = 2;

        let err = Container::from_bytes(&bytes, ReadOptions::empty()).unwrap_err();
        assert!(err.is_truncation(), "{err:?}");
    }

    #[test]
    fn test_archive_rejects_children() {
        let mut archive = Container::archive();
        assert!(archive.append(Chunk::group("FORM", "NEST", vec![Chunk::empty("KID ")])).is_err());
        assert!(archive.is_empty());
    }
}
