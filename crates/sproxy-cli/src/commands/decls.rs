//! Loading and building declaration files

use anyhow::Context;
use sproxy_model::{ClassSpec, EmitOverrides, ModuleDecl};
use std::path::{Path, PathBuf};

/// Classes built from one declaration file
pub struct Loaded {
    /// Source file
    pub path: PathBuf,
    /// `[emit]` table
    pub overrides: EmitOverrides,
    /// Successfully built classes in file order
    pub specs: Vec<ClassSpec>,
}

/// Outcome of loading a set of declaration files
#[derive(Default)]
pub struct Batch {
    /// One entry per readable file
    pub loaded: Vec<Loaded>,
    /// Number of files or classes that failed
    pub failures: usize,
}

impl Batch {
    /// All built classes across files
    pub fn specs(&self) -> impl Iterator<Item = &ClassSpec> {
        self.loaded.iter().flat_map(|l| l.specs.iter())
    }

    /// Error out if anything failed, after the caller has used what did build
    pub fn finish(&self) -> anyhow::Result<()> {
        if self.failures > 0 {
            anyhow::bail!("{} declaration(s) failed", self.failures);
        }
        Ok(())
    }
}

fn load_one(path: &Path) -> anyhow::Result<ModuleDecl> {
    ModuleDecl::from_file(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Load and build every class in `paths`. Each failure is reported on stderr
/// and counted; the rest of the batch still builds.
pub fn load(paths: &[PathBuf]) -> anyhow::Result<Batch> {
    let mut batch = Batch::default();

    for path in super::files::collect_decl_files(paths)? {
        let decl = match load_one(&path) {
            Ok(decl) => decl,
            Err(err) => {
                eprintln!("error: {:#}", err);
                batch.failures += 1;
                continue;
            }
        };

        let catalogue = decl.catalogue();
        let mut specs = Vec::new();
        for (name, result) in decl.build(&catalogue) {
            match result {
                Ok(spec) => specs.push(spec),
                Err(err) => {
                    eprintln!("error: {}: {}: {}", path.display(), name, err);
                    batch.failures += 1;
                }
            }
        }
        log::info!("{}: {} class(es)", path.display(), specs.len());

        batch.loaded.push(Loaded {
            path,
            overrides: decl.emit,
            specs,
        });
    }

    Ok(batch)
}
