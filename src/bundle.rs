//! Bundle assembly API.
//!
//! Analyses binaries one at a time, merges the results into a [`Manifest`]
//! and writes the manifest out as a tar stream.

use crate::internal::archive::{append_files, entry_name};
use crate::internal::deps::{list_with_lister, list_with_loader};
use crate::internal::elf::read_interpreter;
use crate::Error;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

/// Archive directory binaries are placed in.
const BINARY_DIR: &str = "/";

/// Dependencies of a single binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub binary: Utf8PathBuf,
    /// Requested dynamic loader, `None` for static binaries and non-ELF files
    pub interpreter: Option<Utf8PathBuf>,
    pub libraries: Vec<Utf8PathBuf>,
}

/// Everything that goes into the archive, deduplicated by source path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub binaries: BTreeSet<Utf8PathBuf>,
    pub interpreters: BTreeSet<Utf8PathBuf>,
    pub libraries: BTreeSet<Utf8PathBuf>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one binary's analysis into the manifest
    pub fn merge(&mut self, analysis: Analysis) {
        self.binaries.insert(analysis.binary);
        self.interpreters.extend(analysis.interpreter);
        self.libraries.extend(analysis.libraries);
    }

    pub fn is_empty(&self) -> bool {
        self.binaries.is_empty()
    }

    /// Number of archive entries the manifest produces
    pub fn len(&self) -> usize {
        self.binaries.len() + self.interpreters.len() + self.libraries.len()
    }
}

impl FromIterator<Analysis> for Manifest {
    fn from_iter<I: IntoIterator<Item = Analysis>>(iter: I) -> Self {
        let mut manifest = Manifest::new();
        for analysis in iter {
            manifest.merge(analysis);
        }
        manifest
    }
}

/// One file as it will appear in the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    pub source: Utf8PathBuf,
    pub name: Utf8PathBuf,
}

impl fmt::Display for PlannedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.name, self.source)
    }
}

/// Collects binaries and their runtime dependencies into a tar archive.
///
/// ```no_run
/// use dockerize::Bundler;
///
/// let bundler = Bundler::builder().build();
/// let manifest = bundler.collect(["/usr/bin/env"])?;
/// bundler.write_to_file(&manifest, "rootfs.tar")?;
/// # Ok::<(), dockerize::Error>(())
/// ```
#[derive(Debug, Clone, bon::Builder)]
pub struct Bundler {
    /// Directory libraries are flattened into
    #[builder(into, default = Utf8PathBuf::from("/usr/lib"))]
    library_dir: Utf8PathBuf,

    /// Dependency lister used for binaries without an interpreter
    #[builder(into, default = String::from("ldd"))]
    lister: String,
}

impl Default for Bundler {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Bundler {
    pub fn library_dir(&self) -> &Utf8Path {
        &self.library_dir
    }

    pub fn lister(&self) -> &str {
        &self.lister
    }

    /// Find the interpreter and shared libraries of one binary.
    pub fn analyze(&self, binary: impl AsRef<Utf8Path>) -> Result<Analysis, Error> {
        let binary = binary.as_ref();
        info!("Analyzing {}", binary);

        let interpreter = read_interpreter(binary)?;
        let libraries = match &interpreter {
            Some(interp) => {
                info!("\tFound interpreter: {}", interp);
                list_with_loader(interp, binary)?
            }
            None => list_with_lister(&self.lister, binary)?,
        };

        Ok(Analysis {
            binary: binary.to_owned(),
            interpreter,
            libraries,
        })
    }

    /// Analyse every binary in order, stopping at the first failure.
    pub fn collect<I, P>(&self, binaries: I) -> Result<Manifest, Error>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Utf8Path>,
    {
        binaries
            .into_iter()
            .map(|binary| self.analyze(binary))
            .collect()
    }

    /// Archive entries in write order: binaries, interpreters, libraries.
    pub fn plan(&self, manifest: &Manifest) -> Vec<PlannedEntry> {
        let binary_dir = Utf8Path::new(BINARY_DIR);
        let planned = |files: &BTreeSet<Utf8PathBuf>, prefix: Option<&Utf8Path>| {
            files
                .iter()
                .map(|source| PlannedEntry {
                    source: source.clone(),
                    name: entry_name(source, prefix),
                })
                .collect::<Vec<_>>()
        };

        let mut entries = planned(&manifest.binaries, Some(binary_dir));
        entries.extend(planned(&manifest.interpreters, None));
        entries.extend(planned(&manifest.libraries, Some(self.library_dir.as_path())));
        entries
    }

    /// Write the manifest as an uncompressed tar stream.
    pub fn write_archive<W: Write>(&self, manifest: &Manifest, writer: W) -> Result<W, Error> {
        if manifest.is_empty() {
            return Err(Error::NoBinaries);
        }

        let mut builder = tar::Builder::new(writer);
        append_files(&mut builder, &manifest.binaries, Some(Utf8Path::new(BINARY_DIR)))?;
        append_files(&mut builder, &manifest.interpreters, None)?;
        append_files(&mut builder, &manifest.libraries, Some(self.library_dir.as_path()))?;

        Ok(builder.into_inner()?)
    }

    /// Write the archive to `path`, creating or truncating it.
    ///
    /// An empty manifest is rejected before the file is touched.
    pub fn write_to_file<P: AsRef<Utf8Path>>(&self, manifest: &Manifest, path: P) -> Result<(), Error> {
        let path = path.as_ref();

        if manifest.is_empty() {
            return Err(Error::NoBinaries);
        }

        let file = File::create(path).map_err(|source| Error::CreateOutput {
            path: path.to_owned(),
            source,
        })?;
        let mut writer = self.write_archive(manifest, BufWriter::new(file))?;
        writer.flush().map_err(|source| Error::WriteOutput {
            path: path.to_owned(),
            source,
        })?;

        info!("Wrote {} entries to {}", manifest.len(), path);

        Ok(())
    }
}
