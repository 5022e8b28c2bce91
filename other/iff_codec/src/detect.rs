use crate::chunk::Chunk;
use crate::container::{Container, ReadOptions};
use crate::header::HeaderKind;

/// Probes `payload` for an embedded named-program container.
///
/// Most payloads are not containers, so failing is the normal outcome: any parse error is swallowed and
/// reported as `None`. A successful parse still only counts if it names a program and holds at least one
/// chunk.
pub fn try_as_container(payload: &[u8]) -> Option<Container> {
    match Container::read_as(HeaderKind::NamedProgram, payload, ReadOptions::empty()) {
        Ok(container) if container.program_name().is_some_and(|name| !name.trim().is_empty()) && !container.is_empty() => Some(container),
        Ok(_) => {
            log::trace!("payload parsed as a container but has no program name or no chunks");
            None
        }
        Err(e) => {
            log::trace!("payload is not a container: {e}");
            None
        }
    }
}

impl Chunk {
    /// [`try_as_container`] over this chunk's payload.
    pub fn as_container(&self) -> Option<Container> { try_as_container(self.data()) }
}

#[cfg(test)]
mod test {
    use super::*;

    fn embedded() -> Vec<u8> {
        let mut inner = Container::named("inner tool").with_form_tag("LIST");
        inner.append(Chunk::from_text("NAME", "nested")).unwrap();
        inner.to_bytes().unwrap()
    }

    #[test]
    fn test_detects_container() {
        let bytes = embedded();
        let found = try_as_container(&bytes).expect("should be detected");

        assert_eq!(found.program_name(), Some("inner tool"));
        assert_eq!(found.chunk("NAME").map(Chunk::text), Some("nested".to_owned()));

        let outer = Chunk::new("FILE", bytes);
        assert_eq!(outer.as_container(), Some(found));
    }

    #[test]
    fn test_random_bytes() {
        // xorshift noise
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        let noise: Vec<u8> = (0..embedded().len())
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state as u8
            })
            .collect();

        assert!(try_as_container(&noise).is_none());
        assert!(try_as_container(&[]).is_none());
        assert!(try_as_container(b"FORM").is_none());
    }

    #[test]
    fn test_needs_chunks() {
        let empty = Container::named("nobody home").to_bytes().unwrap();
        assert!(try_as_container(&empty).is_none());
    }

    #[test]
    fn test_truncated_container() {
        let bytes = embedded();
        assert!(try_as_container(&bytes[..bytes.len() - 1]).is_none());
    }
}
