use std::io::Write;

use crate::chunk::{ascii_bytes, chunk_ids, ChunkId};
use crate::config::PROGRAM_NAME_LEN;
use crate::cursor::{ChunkWriter, Cursor};
use crate::error::{Error, FormatError, Result};
use crate::forms;

/// The preamble shapes a container can start with.
///
/// ```text
/// Classic        [4 form tag][u32 body size]
/// NamedProgram   [24 program name][4 form tag][u64 body size]
/// Archive        [4 "FAR "][u32 entry count]
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    Classic,
    NamedProgram,
    Archive,
}

/// How the body following a header is delimited.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Body {
    /// Total encoded size of the top-level chunks.
    Bytes(u64),
    /// Number of self-delimiting entries.
    Entries(u32),
}

/// Everything a header says about its container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preamble {
    pub kind: HeaderKind,
    pub form_tag: ChunkId,
    pub program_name: Option<String>,
    pub body: Body,
}

fn is_printable(b: &u8) -> bool { matches!(b, 0x20..=0x7E) }

/// The fixed-width, space padded wire form of a program name. Anything unprintable becomes `?`.
pub fn encode_program_name(name: &str) -> [u8; PROGRAM_NAME_LEN] {
    let mut ret = [b' '; PROGRAM_NAME_LEN];
    for (dst, src) in ret.iter_mut().zip(ascii_bytes(name)) {
        *dst = if is_printable(&src) { src } else { b'?' };
    }

    ret
}

/// Trailing spaces (and NULs, which some writers pad with) are not part of the name.
pub fn decode_program_name(raw: &[u8]) -> Option<String> {
    let end = raw.iter().rposition(|b| *b != b' ' && *b != 0).map_or(0, |p| p + 1);
    if end == 0 {
        return None;
    }

    Some(String::from_utf8_lossy(&raw[..end]).into_owned())
}

/// The form tag of a buffer that looks like a named-program header: 24 printable bytes and a printable tag.
fn named_shape(bytes: &[u8]) -> Option<ChunkId> {
    if bytes.len() < PROGRAM_NAME_LEN + 4 || !bytes[..PROGRAM_NAME_LEN].iter().all(is_printable) {
        return None;
    }

    Some(ChunkId::new(&bytes[PROGRAM_NAME_LEN..PROGRAM_NAME_LEN + 4])).filter(ChunkId::is_printable)
}

fn check_form_tag(tag: ChunkId, extensible: bool) -> Result<()> {
    if forms::is_known(tag) {
        return Ok(());
    }

    if extensible {
        forms::register(tag);
        return Ok(());
    }

    Err(FormatError::UnknownFormTag { found: tag }.into())
}

impl HeaderKind {
    /// Size of the preamble in bytes.
    pub const fn encoded_len(self) -> usize {
        match self {
            HeaderKind::Classic => 8,
            HeaderKind::NamedProgram => PROGRAM_NAME_LEN + 12,
            HeaderKind::Archive => 8,
        }
    }

    /// Guesses the header kind from the leading bytes of a buffer.
    ///
    /// A named-program header wins when its name field is printable and a known form tag follows it;
    /// otherwise the first four bytes decide. With `extensible` set, unknown but printable tags are
    /// accepted by shape: a printable name followed by a printable tag is a named-program header, any other
    /// printable tag is a classic one.
    pub fn identify(bytes: &[u8], extensible: bool) -> Option<HeaderKind> {
        if named_shape(bytes).is_some_and(|tag| forms::is_known(tag)) {
            return Some(HeaderKind::NamedProgram);
        }

        if bytes.len() < 4 {
            return None;
        }

        match ChunkId::new(&bytes[..4]) {
            chunk_ids::FAR => Some(HeaderKind::Archive),
            tag if forms::is_known(tag) => Some(HeaderKind::Classic),
            _ if !extensible => None,
            _ if named_shape(bytes).is_some() => Some(HeaderKind::NamedProgram),
            tag if tag.is_printable() => Some(HeaderKind::Classic),
            _ => None,
        }
    }

    /// The error for a buffer that [`HeaderKind::identify`] could not place.
    pub fn unidentified(bytes: &[u8]) -> FormatError {
        match named_shape(bytes) {
            Some(found) => FormatError::UnknownFormTag { found },
            None => FormatError::UnknownSignature {
                found: ChunkId::new(&bytes[..bytes.len().min(4)]),
            },
        }
    }

    /// Consumes the preamble. Unknown form tags are refused unless `extensible` is set, in which case
    /// they are registered.
    pub fn read(self, cursor: &mut Cursor<'_>, extensible: bool) -> Result<Preamble> {
        let ret = match self {
            HeaderKind::Classic => {
                let form_tag = cursor.read_id()?;
                if !forms::is_known(form_tag) {
                    if !extensible {
                        return Err(FormatError::UnknownSignature { found: form_tag }.into());
                    }
                    forms::register(form_tag);
                }

                let size = cursor.read_u32()?;
                Preamble {
                    kind: self,
                    form_tag,
                    program_name: None,
                    body: Body::Bytes(size as u64),
                }
            }

            HeaderKind::NamedProgram => {
                let program_name = decode_program_name(cursor.read_bytes(PROGRAM_NAME_LEN as u64)?);
                let form_tag = cursor.read_id()?;
                check_form_tag(form_tag, extensible)?;

                let size = cursor.read_u64()?;
                Preamble {
                    kind: self,
                    form_tag,
                    program_name,
                    body: Body::Bytes(size),
                }
            }

            HeaderKind::Archive => {
                let signature = cursor.read_id()?;
                if signature != chunk_ids::FAR {
                    return Err(FormatError::UnknownSignature { found: signature }.into());
                }

                let count = cursor.read_u32()?;
                Preamble {
                    kind: self,
                    form_tag: signature,
                    program_name: None,
                    body: Body::Entries(count),
                }
            }
        };

        log::trace!("read {:?} header: {:?}", self, ret);
        Ok(ret)
    }

    /// Emits the preamble. `program_name` is only used by named-program headers.
    pub fn write<W: Write>(self, w: &mut ChunkWriter<W>, form_tag: ChunkId, program_name: &str, body: Body) -> Result<()> {
        match (self, body) {
            (HeaderKind::Classic, Body::Bytes(size)) => {
                let size = u32::try_from(size).map_err(|_| FormatError::SizeOverflow {
                    what: "container body",
                    value: size,
                    width: 32,
                })?;

                w.write_id(form_tag)?;
                w.write_u32(size)
            }

            (HeaderKind::NamedProgram, Body::Bytes(size)) => {
                w.write_bytes(&encode_program_name(program_name))?;
                w.write_id(form_tag)?;
                w.write_u64(size)
            }

            (HeaderKind::Archive, Body::Entries(count)) => {
                w.write_id(chunk_ids::FAR)?;
                w.write_u32(count)
            }

            _ => Err(Error::Argument("header kind does not match the body description")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn written(kind: HeaderKind, form_tag: ChunkId, program_name: &str, body: Body) -> Vec<u8> {
        let mut w = ChunkWriter::new(Vec::new());
        kind.write(&mut w, form_tag, program_name, body).unwrap();
        assert_eq!(w.position() as usize, kind.encoded_len());
        w.into_inner()
    }

    #[test]
    fn test_program_name_field() {
        assert_eq!(&encode_program_name("abc"), b"abc                     ");
        assert_eq!(&encode_program_name("a program name that is far too long"), b"a program name that is f");
        assert_eq!(&encode_program_name("my\ttool\n"), b"my?tool?                ");

        assert_eq!(decode_program_name(b"abc                     "), Some("abc".to_owned()));
        assert_eq!(decode_program_name(b"  indented  \0\0"), Some("  indented".to_owned()));
        assert_eq!(decode_program_name(&[b' '; 24]), None);
    }

    #[test]
    fn test_identify() {
        let classic = written(HeaderKind::Classic, chunk_ids::LIST, "", Body::Bytes(0));
        let named = written(HeaderKind::NamedProgram, chunk_ids::FORM, "some tool", Body::Bytes(0));
        let archive = written(HeaderKind::Archive, chunk_ids::FAR, "", Body::Entries(0));

        for extensible in [false, true] {
            assert_eq!(HeaderKind::identify(&classic, extensible), Some(HeaderKind::Classic));
            assert_eq!(HeaderKind::identify(&named, extensible), Some(HeaderKind::NamedProgram));
            assert_eq!(HeaderKind::identify(&archive, extensible), Some(HeaderKind::Archive));
            assert_eq!(HeaderKind::identify(b"FO", extensible), None);
        }

        assert_eq!(HeaderKind::identify(b"RIFF\x04\0\0\0WAVE", false), None);
        assert_eq!(HeaderKind::identify(b"\x7fELF\x02\x01\x01\0", true), None);
    }

    #[test]
    fn test_identify_unknown_tags() {
        let classic = written(HeaderKind::Classic, ChunkId::from("QXQX"), "", Body::Bytes(0));
        let named = written(HeaderKind::NamedProgram, ChunkId::from("QWQW"), "tool", Body::Bytes(0));

        assert_eq!(HeaderKind::identify(&classic, false), None);
        assert_eq!(HeaderKind::identify(&classic, true), Some(HeaderKind::Classic));
        assert_eq!(HeaderKind::identify(&named, false), None);
        assert_eq!(HeaderKind::identify(&named, true), Some(HeaderKind::NamedProgram));

        assert_eq!(HeaderKind::unidentified(&classic), FormatError::UnknownSignature { found: ChunkId::from("QXQX") });
        assert_eq!(HeaderKind::unidentified(&named), FormatError::UnknownFormTag { found: ChunkId::from("QWQW") });
    }

    #[test]
    fn test_read_back() {
        let named = written(HeaderKind::NamedProgram, chunk_ids::CAT, "some tool", Body::Bytes(1234));
        let preamble = HeaderKind::NamedProgram.read(&mut Cursor::new(&named), false).unwrap();

        assert_eq!(
            preamble,
            Preamble {
                kind: HeaderKind::NamedProgram,
                form_tag: chunk_ids::CAT,
                program_name: Some("some tool".to_owned()),
                body: Body::Bytes(1234),
            }
        );

        let archive = written(HeaderKind::Archive, chunk_ids::FAR, "", Body::Entries(3));
        let preamble = HeaderKind::Archive.read(&mut Cursor::new(&archive), false).unwrap();
        assert_eq!(preamble.body, Body::Entries(3));
    }

    #[test]
    fn test_unknown_classic_signature() {
        let data = b"JUNK\0\0\0\0";
        let err = HeaderKind::Classic.read(&mut Cursor::new(data), false).unwrap_err();

        assert!(matches!(err, Error::Format(FormatError::UnknownSignature { .. })), "{err:?}");
    }

    #[test]
    fn test_unknown_form_tag() {
        let named = written(HeaderKind::NamedProgram, ChunkId::from("HDRX"), "tool", Body::Bytes(0));

        let err = HeaderKind::NamedProgram.read(&mut Cursor::new(&named), false).unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::UnknownFormTag { .. })), "{err:?}");

        let preamble = HeaderKind::NamedProgram.read(&mut Cursor::new(&named), true).unwrap();
        assert_eq!(preamble.form_tag, ChunkId::from("HDRX"));
        assert!(forms::is_known(ChunkId::from("HDRX")));
    }

    #[test]
    fn test_wrong_archive_signature() {
        let err = HeaderKind::Archive.read(&mut Cursor::new(b"FORM\0\0\0\0"), false).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_classic_size_overflow() {
        let mut w = ChunkWriter::new(Vec::new());
        let err = HeaderKind::Classic.write(&mut w, chunk_ids::FORM, "", Body::Bytes(u32::MAX as u64 + 1)).unwrap_err();

        assert!(matches!(err, Error::Format(FormatError::SizeOverflow { width: 32, .. })));
        assert_eq!(w.position(), 0);
    }
}
