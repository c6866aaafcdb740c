// dockerize - Bundle ELF binaries for minimal container images
// MIT OR Apache-2.0, 2025

//! Collect executables together with the dynamic loader and shared libraries
//! they need at runtime, and write everything into a single tar archive.
//!
//! Dependencies are discovered the way the system would resolve them:
//! - the PT_INTERP segment names the loader of a dynamic executable
//! - the loader itself (`<loader> --list <binary>`) reports the libraries
//! - binaries without an interpreter fall back to `ldd`
//!
//! # Example: Bundle two binaries
//!
//! ```no_run
//! use dockerize::Bundler;
//!
//! let bundler = Bundler::builder().library_dir("/usr/lib").build();
//! let manifest = bundler.collect(["/usr/bin/curl", "/usr/bin/jq"])?;
//! bundler.write_to_file(&manifest, "rootfs.tar")?;
//! # Ok::<(), dockerize::Error>(())
//! ```

mod internal;

pub mod bundle;
pub mod error;

pub use bundle::{Analysis, Bundler, Manifest, PlannedEntry};
pub use error::Error;
