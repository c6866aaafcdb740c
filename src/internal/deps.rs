use crate::Error;
use camino::{Utf8Path, Utf8PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info};

/// Resolver output marks a missing library this way.
const NOT_FOUND: &str = "not found";

/// Ask the binary's own loader which libraries it would map.
///
/// Runs `<loader> --list <binary>`; the binary itself is not executed.
pub(crate) fn list_with_loader(
    loader: &Utf8Path,
    binary: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>, Error> {
    let output = run(loader.as_str(), ["--list", binary.as_str()])?;

    if !output.status.success() {
        return Err(tool_failed(loader.as_str(), binary, &output));
    }

    parse_resolved_libraries(binary, &String::from_utf8_lossy(&output.stdout))
}

/// Fallback for binaries without a PT_INTERP segment.
///
/// Runs `<lister> <binary>`. Exit status 1 means the target is not
/// dynamically linked, which yields no libraries rather than an error.
pub(crate) fn list_with_lister(lister: &str, binary: &Utf8Path) -> Result<Vec<Utf8PathBuf>, Error> {
    let output = run(lister, [binary.as_str()])?;

    if output.status.code() == Some(1) {
        info!("\tNot a dynamic lib/executable");
        return Ok(Vec::new());
    }

    if !output.status.success() {
        return Err(tool_failed(lister, binary, &output));
    }

    parse_resolved_libraries(binary, &String::from_utf8_lossy(&output.stdout))
}

fn run<'a>(tool: &str, args: impl IntoIterator<Item = &'a str>) -> Result<Output, Error> {
    let mut command = Command::new(tool);
    command.args(args);
    debug!("Running {:?}", command);

    command.output().map_err(|source| Error::Spawn {
        tool: tool.to_string(),
        source,
    })
}

fn tool_failed(tool: &str, binary: &Utf8Path, output: &Output) -> Error {
    Error::ToolFailed {
        tool: tool.to_string(),
        binary: binary.to_owned(),
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Extract resolved library paths from loader or `ldd` output.
///
/// Example output:
/// ```text
///     linux-vdso.so.1 (0x00007ffd5a1f2000)
///     libc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x00007f3c1a000000)
///     /lib64/ld-linux-x86-64.so.2 (0x00007f3c1a400000)
/// ```
///
/// Only lines carrying `=>` contribute; the path is the first word after it.
/// Duplicates are kept, they collapse when the manifest is assembled.
pub(crate) fn parse_resolved_libraries(
    binary: &Utf8Path,
    output: &str,
) -> Result<Vec<Utf8PathBuf>, Error> {
    let mut libs = Vec::new();

    for line in output.lines() {
        let Some((name, resolved)) = line.split_once("=>") else {
            continue;
        };

        let resolved = resolved.trim();
        if resolved.starts_with(NOT_FOUND) {
            return Err(Error::UnresolvedLibrary {
                binary: binary.to_owned(),
                library: name.trim().to_string(),
            });
        }

        let lib = resolved.split(' ').next().unwrap_or_default();
        if lib.is_empty() {
            continue;
        }

        info!("\tFound lib: {}", lib);
        libs.push(Utf8PathBuf::from(lib));
    }

    Ok(libs)
}
