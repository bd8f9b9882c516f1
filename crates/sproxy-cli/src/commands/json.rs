//! `sproxy json`: print class summaries

use super::decls;
use sproxy_model::summary::to_json;
use std::path::PathBuf;

pub fn execute(files: &[PathBuf]) -> anyhow::Result<()> {
    let batch = decls::load(files)?;
    let specs: Vec<_> = batch.specs().cloned().collect();
    println!("{}", to_json(&specs)?);
    batch.finish()
}
