use std::path::{Path, PathBuf};

use eyre::{ensure, eyre, WrapErr};
use iff_codec::{Chunk, ChunkId, Container, HeaderKind, ReadOptions};

async fn load(path: &Path, options: ReadOptions) -> eyre::Result<Container> {
    let bytes = tokio::fs::read(path).await.wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let container = Container::from_bytes(&bytes, options).wrap_err_with(|| format!("failed to parse {}", path.display()))?;

    log::debug!("loaded {} ({} bytes)", path.display(), bytes.len());
    Ok(container)
}

pub async fn info(path: &Path, recursive: bool, extensible: bool) -> color_eyre::Result<()> {
    let mut options = ReadOptions::empty();
    options.set(ReadOptions::RECURSIVE, recursive);
    options.set(ReadOptions::EXTENSIBLE_FORMS, extensible);

    let container = load(path, options).await?;
    println!("{container}");
    println!();

    for item in container.walk() {
        let chunk = item.chunk;
        let mut line = format!("{:indent$}#{} {} ({} bytes)", "", item.index, chunk.id(), chunk.payload_len(), indent = item.depth * 2);

        if !chunk.is_leaf() {
            line += &format!(", {} members", chunk.children().len());
        }

        if let Some(inner) = chunk.as_container() {
            line += &format!(", embedded {} container by {:?}", inner.form_tag(), inner.program_name().unwrap_or_default());
        }

        println!("{line}");
    }

    Ok(())
}

pub async fn pack(out: &Path, files: &[PathBuf], kind: HeaderKind, form: &str, program_name: Option<String>) -> color_eyre::Result<()> {
    ensure!(!files.is_empty(), "nothing to pack");
    ensure!(!form.is_empty() && form.len() <= 4, "form tag {form:?} must be 1 to 4 characters");

    let mut container = Container::new(kind).with_form_tag(form);
    if let Some(name) = program_name {
        container.set_program_name(name);
    }

    for file in files {
        let stem = file.file_stem().ok_or_else(|| eyre!("{} has no file name", file.display()))?;
        let data = tokio::fs::read(file).await.wrap_err_with(|| format!("failed to read {}", file.display()))?;

        let chunk = Chunk::new(&*stem.to_string_lossy(), data);
        log::debug!("packing {} as {:?}", file.display(), chunk.id());
        container.append(chunk)?;
    }

    let bytes = container.to_bytes()?;
    tokio::fs::write(out, &bytes).await.wrap_err_with(|| format!("failed to write {}", out.display()))?;

    log::info!("wrote {} chunks to {} ({} bytes)", container.len(), out.display(), bytes.len());
    Ok(())
}

/// A file name for the `index`th chunk that is safe on any file system.
fn entry_file_name(index: usize, id: ChunkId) -> String {
    let name: String = id.as_bytes().iter().map(|&b| if b.is_ascii_alphanumeric() { b as char } else { '_' }).collect();
    format!("{index:03}_{}.bin", name.trim_end_matches('_'))
}

pub async fn unpack(path: &Path, out_dir: &Path) -> color_eyre::Result<()> {
    let container = load(path, ReadOptions::empty()).await?;
    tokio::fs::create_dir_all(out_dir).await.wrap_err_with(|| format!("failed to create {}", out_dir.display()))?;

    for (index, chunk) in container.iter().enumerate() {
        let target = out_dir.join(entry_file_name(index, chunk.id()));
        tokio::fs::write(&target, chunk.data()).await.wrap_err_with(|| format!("failed to write {}", target.display()))?;

        match chunk.as_container() {
            Some(inner) => log::info!("{} -> {} (embedded container, {} chunks)", chunk.id(), target.display(), inner.len()),
            None => log::info!("{} -> {}", chunk.id(), target.display()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_entry_file_name() {
        assert_eq!(entry_file_name(0, ChunkId::from("NAME")), "000_NAME.bin");
        assert_eq!(entry_file_name(7, ChunkId::from("AGE")), "007_AGE.bin");
        assert_eq!(entry_file_name(12, ChunkId::from("a/b")), "012_a_b.bin");
    }

    #[tokio::test]
    async fn test_pack_then_unpack() {
        let dir = std::env::temp_dir().join(format!("iffkit_test_{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let input = dir.join("note.txt");
        tokio::fs::write(&input, b"hello").await.unwrap();

        let packed = dir.join("packed.iff");
        pack(&packed, &[input], HeaderKind::NamedProgram, "FORM", Some("iffkit test".to_owned())).await.unwrap();

        let container = load(&packed, ReadOptions::empty()).await.unwrap();
        assert_eq!(container.program_name(), Some("iffkit test"));
        assert_eq!(container.chunk("NOTE").map(Chunk::data), None);
        assert_eq!(container.chunk("note").map(Chunk::data), Some(&b"hello"[..]));

        let out = dir.join("out");
        unpack(&packed, &out).await.unwrap();
        assert_eq!(tokio::fs::read(out.join("000_note.bin")).await.unwrap(), b"hello");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
