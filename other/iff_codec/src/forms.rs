//! The set of form tags a container may carry.
//!
//! `FORM`, `LIST`, `CAT ` and `PROP` are always known. Further tags can be registered for the rest of
//! the process, either explicitly or by reading a container with [`ReadOptions::EXTENSIBLE_FORMS`].
//!
//! [`ReadOptions::EXTENSIBLE_FORMS`]: crate::ReadOptions::EXTENSIBLE_FORMS

use std::sync::RwLock;

use crate::chunk::{chunk_ids, ChunkId};

pub const BUILTIN: [ChunkId; 4] = [chunk_ids::FORM, chunk_ids::LIST, chunk_ids::CAT, chunk_ids::PROP];

static EXTENSIONS: RwLock<Vec<ChunkId>> = RwLock::new(Vec::new());

pub fn is_builtin(tag: ChunkId) -> bool { BUILTIN.contains(&tag) }

pub fn is_known(tag: ChunkId) -> bool {
    if is_builtin(tag) {
        return true;
    }

    match EXTENSIONS.read() {
        Ok(guard) => guard.contains(&tag),
        Err(poisoned) => poisoned.into_inner().contains(&tag),
    }
}

/// Adds `tag` to the known set. Returns false if it was already known.
pub fn register(tag: impl Into<ChunkId>) -> bool {
    let tag = tag.into();
    if is_builtin(tag) {
        return false;
    }

    let mut guard = match EXTENSIONS.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if guard.contains(&tag) {
        return false;
    }

    log::debug!("registering form tag {tag:?}");
    guard.push(tag);
    true
}

/// Every known tag, built-ins first.
pub fn known() -> Vec<ChunkId> {
    let mut ret = BUILTIN.to_vec();
    match EXTENSIONS.read() {
        Ok(guard) => ret.extend(guard.iter().copied()),
        Err(poisoned) => ret.extend(poisoned.into_inner().iter().copied()),
    }

    ret
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builtins() {
        for tag in ["FORM", "LIST", "CAT", "PROP"] {
            assert!(is_known(tag.into()), "{tag} should be known");
        }

        assert!(!is_known("CAT!".into()));
        assert!(!register("FORM"));
    }

    #[test]
    fn test_register() {
        let tag = ChunkId::from("XFRM");

        assert!(!is_known(tag));
        assert!(register(tag));
        assert!(!register(tag));
        assert!(is_known(tag));
        assert!(known().contains(&tag));
    }
}
