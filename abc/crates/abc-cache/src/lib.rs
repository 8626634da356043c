//! Content-addressed parse cache: skips re-lexing and re-parsing a source
//! file whose on-disk bytecode is still fresh.
//!
//! Layout: a directory `__engcache__` next to wherever [`Cache::new`] is
//! rooted. Cache files are named `<hash>_<basename>.101`, `<hash>` being
//! the first 8 bytes of the SHA-256 of the source's absolute path,
//! lowercase hex. A cache file is valid exactly when it exists and its
//! mtime is at or after the source's — any `stat` failure counts as
//! invalid, never as an error, since the cache is a pure optimization and
//! every failure mode here has a safe fallback: re-parse.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use abc_ast::Program;
use sha2::{Digest, Sha256};

pub const CACHE_DIR_NAME: &str = "__engcache__";
pub const BYTECODE_EXTENSION: &str = "101";

/// Rooted at a working directory; every cache file it reads or writes
/// lives under `<base_dir>/__engcache__`.
pub struct Cache {
    base_dir: PathBuf,
}

impl Cache {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.base_dir.join(CACHE_DIR_NAME)
    }

    /// `<hash>_<basename>.101` for the given source path.
    pub fn cache_path(&self, source_path: &Path) -> PathBuf {
        let absolute = fs::canonicalize(source_path).unwrap_or_else(|_| source_path.to_path_buf());
        let digest = Sha256::digest(absolute.to_string_lossy().as_bytes());
        let hash: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();
        let basename = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source".to_string());
        self.cache_dir().join(format!("{hash}_{basename}.{BYTECODE_EXTENSION}"))
    }

    fn mtime(path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    /// A stat failure on either side (source missing, cache missing, mtime
    /// unsupported) counts as invalid, not an error.
    fn is_valid(&self, source_path: &Path, cache_path: &Path) -> bool {
        match (Self::mtime(source_path), Self::mtime(cache_path)) {
            (Some(source_mtime), Some(cache_mtime)) => cache_mtime >= source_mtime,
            _ => false,
        }
    }

    /// Loads `source_path` from cache if valid; otherwise calls `parse_fn`
    /// and writes the result back to cache (best-effort — a write failure
    /// here is swallowed, never propagated). Returns whether the cache was
    /// used.
    pub fn load_or_parse<F, E>(&self, source_path: &Path, parse_fn: F) -> Result<(Program, bool), E>
    where
        F: FnOnce(&Path) -> Result<Program, E>,
    {
        let cache_path = self.cache_path(source_path);
        if self.is_valid(source_path, &cache_path) {
            if let Some(program) = self.try_read_cache(&cache_path) {
                tracing::debug!(path = %source_path.display(), "loaded from cache");
                return Ok((program, true));
            }
        }

        let program = parse_fn(source_path)?;
        self.write_cache(&cache_path, &program);
        Ok((program, false))
    }

    fn try_read_cache(&self, cache_path: &Path) -> Option<Program> {
        let bytes = fs::read(cache_path).ok()?;
        match abc_bc::decode_program(&bytes) {
            Ok(program) => Some(program),
            Err(err) => {
                tracing::warn!(?err, path = %cache_path.display(), "cache file failed to decode, re-parsing");
                None
            }
        }
    }

    /// Writes through a temp-file-then-rename so a concurrent reader never
    /// observes a half-written cache file.
    fn write_cache(&self, cache_path: &Path, program: &Program) {
        let dir = self.cache_dir();
        if let Err(err) = fs::create_dir_all(&dir) {
            tracing::warn!(?err, dir = %dir.display(), "failed to create cache directory");
            return;
        }

        let bytes = abc_bc::encode_program(program);
        let temp_path = dir.join(format!(".tmp-{}-{}", std::process::id(), Self::temp_suffix()));
        if let Err(err) = fs::write(&temp_path, &bytes) {
            tracing::warn!(?err, path = %temp_path.display(), "failed to write cache temp file");
            return;
        }
        if let Err(err) = fs::rename(&temp_path, cache_path) {
            tracing::warn!(?err, path = %cache_path.display(), "failed to install cache file");
            let _ = fs::remove_file(&temp_path);
        }
    }

    fn temp_suffix() -> u64 {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }

    /// Removes the whole cache directory. Used by `abct cache clear`.
    pub fn clear(&self) -> io::Result<()> {
        let dir = self.cache_dir();
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abc_ast::{Expr, ExprKind, Stmt, StmtKind};
    use abc_util::Span;
    use std::thread::sleep;
    use std::time::Duration;

    fn sample_program() -> Program {
        Program {
            statements: vec![Stmt::new(
                StmtKind::OutputStatement {
                    values: vec![Expr::new(ExprKind::NumberLit(42.0), Span::DUMMY)],
                    trailing_newline: true,
                },
                Span::DUMMY,
            )],
        }
    }

    #[test]
    fn cache_path_is_stable_for_same_source() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let source = dir.path().join("prog.abc");
        fs::write(&source, "Print 1.").unwrap();
        assert_eq!(cache.cache_path(&source), cache.cache_path(&source));
    }

    #[test]
    fn cache_path_ends_with_basename_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let source = dir.path().join("prog.abc");
        fs::write(&source, "Print 1.").unwrap();
        let path = cache.cache_path(&source);
        assert_eq!(path.extension().unwrap(), "101");
        assert!(path.file_name().unwrap().to_string_lossy().ends_with("_prog.abc.101"));
    }

    #[test]
    fn fresh_source_with_no_cache_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let source = dir.path().join("prog.abc");
        fs::write(&source, "Print 1.").unwrap();
        assert!(!cache.is_valid(&source, &cache.cache_path(&source)));
    }

    #[test]
    fn load_or_parse_falls_back_to_parse_fn_on_first_call() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let source = dir.path().join("prog.abc");
        fs::write(&source, "Print 1.").unwrap();

        let (_, from_cache) = cache
            .load_or_parse::<_, ()>(&source, |_| Ok(sample_program()))
            .unwrap();
        assert!(!from_cache);
        assert!(cache.cache_path(&source).exists());
    }

    #[test]
    fn load_or_parse_uses_cache_on_second_call() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let source = dir.path().join("prog.abc");
        fs::write(&source, "Print 1.").unwrap();

        cache.load_or_parse::<_, ()>(&source, |_| Ok(sample_program())).unwrap();
        let (_, from_cache) = cache
            .load_or_parse::<_, ()>(&source, |_| panic!("should not re-parse"))
            .unwrap();
        assert!(from_cache);
    }

    #[test]
    fn touching_source_after_cache_invalidates_it() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let source = dir.path().join("prog.abc");
        fs::write(&source, "Print 1.").unwrap();

        cache.load_or_parse::<_, ()>(&source, |_| Ok(sample_program())).unwrap();
        sleep(Duration::from_millis(20));
        fs::write(&source, "Print 2.").unwrap();

        let mut reparsed = false;
        cache
            .load_or_parse::<_, ()>(&source, |_| {
                reparsed = true;
                Ok(sample_program())
            })
            .unwrap();
        assert!(reparsed);
    }

    #[test]
    fn clear_removes_cache_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let source = dir.path().join("prog.abc");
        fs::write(&source, "Print 1.").unwrap();
        cache.load_or_parse::<_, ()>(&source, |_| Ok(sample_program())).unwrap();

        assert!(cache.cache_dir().exists());
        cache.clear().unwrap();
        assert!(!cache.cache_dir().exists());
    }

    #[test]
    fn clear_on_missing_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        assert!(cache.clear().is_ok());
    }

    #[test]
    fn corrupt_cache_file_falls_back_to_reparse() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let source = dir.path().join("prog.abc");
        fs::write(&source, "Print 1.").unwrap();

        let cache_path = cache.cache_path(&source);
        fs::create_dir_all(cache.cache_dir()).unwrap();
        fs::write(&cache_path, b"not bytecode").unwrap();

        let mut reparsed = false;
        cache
            .load_or_parse::<_, ()>(&source, |_| {
                reparsed = true;
                Ok(sample_program())
            })
            .unwrap();
        assert!(reparsed);
    }
}
