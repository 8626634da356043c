//! `abct cache clear` — remove the `__engcache__` directory.
//!
//! Not part of the distilled core (the cache section only specifies the
//! load/validate/write protocol), but a natural lifecycle operation to
//! expose alongside `run` once a cache directory exists to manage.

use std::path::PathBuf;

use abc_cache::Cache;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct CacheClearArgs {
    pub dir: PathBuf,
}

pub fn run_cache_clear(args: CacheClearArgs) -> Result<()> {
    let cache = Cache::new(args.dir);
    cache.clear()?;
    tracing::info!(dir = %cache.cache_dir().display(), "cache cleared");
    Ok(())
}
