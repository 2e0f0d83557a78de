//! File names derived from an output prefix.

use std::path::Path;

use crate::settings::Settings;

/// `<prefix><aux>.<suffix>`, optionally dropping the directory part of `prefix`.
pub fn build_name(prefix: &str, suffix: &str, aux: &str, strip_dir: bool) -> String {
    let base = if strip_dir {
        Path::new(prefix)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| prefix.to_string())
    } else {
        prefix.to_string()
    };
    let mut name = base;
    name.push_str(aux);
    if !suffix.is_empty() {
        name.push('.');
        name.push_str(suffix);
    }
    name
}

/// Name of an intermediate file (`<prefix>_.<suffix>`).
pub fn aux_name(prefix: &str, suffix: &str, strip_dir: bool) -> String {
    build_name(prefix, suffix, "_", strip_dir)
}

/// Whether names built from `prefix` lose their directory.
pub fn strips_dir(prefix: &str, settings: &Settings) -> bool {
    prefix != settings.outname && !settings.global_write
}

/// Final output name; `-` when writing to standard output.
pub fn out_name(prefix: &str, format: &str, standard_out: bool, settings: &Settings) -> String {
    if standard_out {
        "-".to_string()
    } else {
        build_name(prefix, format, "", strips_dir(prefix, settings))
    }
}

/// Typesetting engines choke on spaces in file names.
pub fn space_to_underscore(prefix: &str) -> String {
    prefix.replace(' ', "_")
}

#[cfg(test)]
#[path = "../../tests/unit/output/naming.rs"]
mod tests;
