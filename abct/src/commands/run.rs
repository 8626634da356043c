//! `abct run` — load (with cache unless disabled) and evaluate to completion.

use std::path::{Path, PathBuf};

use abc_cache::Cache;

use crate::error::{AbctError, Result};

#[derive(Debug, Clone)]
pub struct RunArgs {
    pub path: PathBuf,
    pub no_cache: bool,
}

fn read_and_parse(path: &Path) -> Result<abc_ast::Program> {
    let source = std::fs::read_to_string(path)?;
    Ok(abc_par::parse_source(&source)?)
}

pub fn run_run(args: RunArgs) -> Result<()> {
    let base_dir = args.path.parent().unwrap_or_else(|| Path::new("."));
    let (program, from_cache) = if args.no_cache {
        (read_and_parse(&args.path)?, false)
    } else {
        let cache = Cache::new(base_dir);
        cache.load_or_parse(&args.path, read_and_parse)?
    };

    tracing::debug!(path = %args.path.display(), from_cache, "program loaded");

    let mut evaluator = abc_eval::Evaluator::new();
    evaluator.run(&program).map_err(AbctError::from)
}
