//! `sproxy java`: write Java source stubs

use super::decls;
use super::files::class_path;
use anyhow::Context;
use sproxy_codegen::java_source;
use std::path::{Path, PathBuf};

pub fn execute(files: &[PathBuf], out_dir: Option<&Path>) -> anyhow::Result<()> {
    let batch = decls::load(files)?;

    for spec in batch.specs() {
        let source = java_source(spec);
        match out_dir {
            Some(root) => {
                let path = class_path(root, spec.package(), spec.name(), "java");
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                std::fs::write(&path, source)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                log::info!("wrote {}", path.display());
            }
            None => print!("{}", source),
        }
    }

    batch.finish()
}
