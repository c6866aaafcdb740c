use crate::Error;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use tar::{Builder, Header};
use tracing::debug;

/// Name of the archive entry for `path`.
///
/// Without a prefix the source path is kept as is; with one, the file is
/// flattened to its base name under `prefix`. Entry names are relative to
/// the archive root, so leading slashes are dropped.
pub(crate) fn entry_name(path: &Utf8Path, prefix: Option<&Utf8Path>) -> Utf8PathBuf {
    let name = match (prefix, path.file_name()) {
        (Some(dir), Some(base)) => dir.join(base),
        _ => path.to_owned(),
    };

    Utf8PathBuf::from(name.as_str().trim_start_matches('/'))
}

/// Append every file of `files` to `builder`, in sorted order.
///
/// Two sources flattening to the same name are both written; whichever
/// comes later wins on extraction.
pub(crate) fn append_files<W: Write>(
    builder: &mut Builder<W>,
    files: &BTreeSet<Utf8PathBuf>,
    prefix: Option<&Utf8Path>,
) -> Result<(), Error> {
    for path in files {
        let name = entry_name(path, prefix);
        append_file(builder, path, &name).map_err(|source| Error::Archive {
            path: path.clone(),
            source,
        })?;
    }

    Ok(())
}

fn append_file<W: Write>(
    builder: &mut Builder<W>,
    path: &Utf8Path,
    name: &Utf8Path,
) -> std::io::Result<()> {
    // Follows symlinks: a library link is archived with its target's content
    let metadata = fs::metadata(path)?;

    let mut header = Header::new_gnu();
    header.set_metadata(&metadata);

    let mut file = File::open(path)?;
    debug!("Adding {} as {} ({} bytes)", path, name, metadata.len());
    builder.append_data(&mut header, name, &mut file)
}
