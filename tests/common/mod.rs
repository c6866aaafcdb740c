//! Shared fixtures: hand-built ELF images and shell stand-ins for ld.so/ldd.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

pub struct Sandbox {
    _dir: TempDir,
    pub root: Utf8PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().canonicalize().unwrap()).unwrap();
        Self { _dir: dir, root }
    }

    pub fn file(&self, rel: &str, content: &[u8]) -> Utf8PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn script(&self, rel: &str, body: &str) -> Utf8PathBuf {
        let path = self.file(rel, format!("#!/bin/sh\n{body}\n").as_bytes());
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// A dynamic "executable" whose PT_INTERP points at `loader`
    pub fn dynamic_binary(&self, rel: &str, loader: &Utf8Path) -> Utf8PathBuf {
        let mut interp = loader.as_str().as_bytes().to_vec();
        interp.push(0);
        self.file(rel, &elf_image(Some(&interp)))
    }
}

/// Minimal little-endian ELF64 executable, optionally with a PT_INTERP segment
pub fn elf_image(interp: Option<&[u8]>) -> Vec<u8> {
    let phnum: u16 = if interp.is_some() { 1 } else { 0 };
    let mut image = Vec::new();

    image.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0]);
    image.extend_from_slice(&[0u8; 8]);
    image.extend_from_slice(&2u16.to_le_bytes());
    image.extend_from_slice(&62u16.to_le_bytes());
    image.extend_from_slice(&1u32.to_le_bytes());
    image.extend_from_slice(&0u64.to_le_bytes());
    image.extend_from_slice(&64u64.to_le_bytes());
    image.extend_from_slice(&0u64.to_le_bytes());
    image.extend_from_slice(&0u32.to_le_bytes());
    image.extend_from_slice(&64u16.to_le_bytes());
    image.extend_from_slice(&56u16.to_le_bytes());
    image.extend_from_slice(&phnum.to_le_bytes());
    image.extend_from_slice(&64u16.to_le_bytes());
    image.extend_from_slice(&0u16.to_le_bytes());
    image.extend_from_slice(&0u16.to_le_bytes());

    if let Some(payload) = interp {
        let size = payload.len() as u64;
        image.extend_from_slice(&3u32.to_le_bytes()); // PT_INTERP
        image.extend_from_slice(&4u32.to_le_bytes());
        image.extend_from_slice(&120u64.to_le_bytes());
        image.extend_from_slice(&0u64.to_le_bytes());
        image.extend_from_slice(&0u64.to_le_bytes());
        image.extend_from_slice(&size.to_le_bytes());
        image.extend_from_slice(&size.to_le_bytes());
        image.extend_from_slice(&1u64.to_le_bytes());
        image.extend_from_slice(payload);
    }

    image
}

/// Entry names of a tar stream, in order
pub fn entry_names(data: &[u8]) -> Vec<String> {
    let mut archive = tar::Archive::new(data);
    archive
        .entries()
        .unwrap()
        .map(|entry| entry.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect()
}

/// Strip the leading slash the way archive entry names do
pub fn rel(path: &Utf8Path) -> String {
    path.as_str().trim_start_matches('/').to_string()
}
