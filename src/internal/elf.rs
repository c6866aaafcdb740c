use crate::Error;
use camino::{Utf8Path, Utf8PathBuf};
use goblin::elf::program_header::PT_INTERP;
use goblin::elf::Elf;
use memmap2::Mmap;
use std::fs::File;
use tracing::debug;

/// Read the dynamic loader requested by the binary at `path`.
///
/// Returns `Ok(None)` for static binaries and for files that do not parse
/// as ELF at all (scripts, data files); those are handed to the fallback
/// dependency lister instead.
pub(crate) fn read_interpreter(path: &Utf8Path) -> Result<Option<Utf8PathBuf>, Error> {
    let open_failed = |source: std::io::Error| Error::OpenBinary {
        path: path.to_owned(),
        source,
    };
    let file = File::open(path).map_err(open_failed)?;

    // Nothing to map
    if file.metadata().map_err(open_failed)?.len() == 0 {
        debug!("{} is empty", path);
        return Ok(None);
    }

    let mmap = unsafe { Mmap::map(&file).map_err(open_failed)? };
    interpreter_from_bytes(path, &mmap)
}

pub(crate) fn interpreter_from_bytes(
    path: &Utf8Path,
    data: &[u8],
) -> Result<Option<Utf8PathBuf>, Error> {
    let elf = match Elf::parse(data) {
        Ok(elf) => elf,
        Err(e) => {
            debug!("{} is not an ELF file: {}", path, e);
            return Ok(None);
        }
    };

    let Some(interp) = elf.program_headers.iter().find(|ph| ph.p_type == PT_INTERP) else {
        return Ok(None);
    };

    let len = data.len() as u64;
    let start = interp.p_offset;
    let declared = interp.p_filesz;

    // The whole declared segment must be present, a short read is fatal
    let end = match start.checked_add(declared) {
        Some(end) if end <= len => end,
        _ => {
            return Err(Error::TruncatedInterpreter {
                path: path.to_owned(),
                declared,
                available: len.saturating_sub(start),
            })
        }
    };

    let segment = &data[start as usize..end as usize];
    let nul = segment.iter().position(|&b| b == 0).unwrap_or(segment.len());
    let interp =
        String::from_utf8(segment[..nul].to_vec()).map_err(|source| Error::InvalidInterpreter {
            path: path.to_owned(),
            source,
        })?;

    if interp.is_empty() {
        return Ok(None);
    }

    Ok(Some(Utf8PathBuf::from(interp)))
}
