//! `sproxy emit`: write class files

use super::decls;
use super::files::class_path;
use anyhow::Context;
use sproxy_classfile::digest;
use sproxy_codegen::{EmitOptions, Emitter};
use std::path::{Path, PathBuf};

/// Whether `path` already holds exactly `bytes`
fn unchanged(path: &Path, bytes: &[u8]) -> bool {
    match std::fs::read(path) {
        Ok(existing) => digest(&existing) == digest(bytes),
        Err(_) => false,
    }
}

fn write_class(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

pub fn execute(files: &[PathBuf], out_dir: &Path, force: bool) -> anyhow::Result<()> {
    let mut batch = decls::load(files)?;
    let mut written = 0;
    let mut skipped = 0;

    for loaded in &batch.loaded {
        let emitter = Emitter::new(EmitOptions::from(&loaded.overrides));
        for spec in &loaded.specs {
            let bytes = match emitter.emit_bytes(spec) {
                Ok(bytes) => bytes,
                Err(err) => {
                    eprintln!("error: {}: {}", loaded.path.display(), err);
                    batch.failures += 1;
                    continue;
                }
            };

            let path = class_path(out_dir, spec.package(), spec.name(), "class");
            if !force && unchanged(&path, &bytes) {
                log::debug!("{} is up to date", path.display());
                skipped += 1;
                continue;
            }
            match write_class(&path, &bytes) {
                Ok(()) => {
                    log::info!("wrote {}", path.display());
                    written += 1;
                }
                Err(err) => {
                    eprintln!("error: {:#}", err);
                    batch.failures += 1;
                }
            }
        }
    }

    println!("Emitted {} class(es), {} unchanged", written, skipped);
    batch.finish()
}
