// batch.rs - load and rebuild every walkmesh under a directory in parallel

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{error, info, warn};
use walkmesh::{BwmBinaryWriter, WalkmeshCache, WalkmeshKind};

/// Outcome of one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub failed: Vec<(PathBuf, String)>,
}

/// Every walkmesh file below `dir`, sorted so runs are reproducible
pub fn collect_walkmeshes(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if WalkmeshKind::from_path(&path).is_some() {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

fn process_file(cache: &WalkmeshCache, path: &Path) -> anyhow::Result<usize> {
    let wok = cache.get_or_load(path, 0, 0)?;
    if let Some(kind) = WalkmeshKind::from_path(path) {
        if kind.walkmesh_type() != wok.walkmesh_type {
            warn!(
                "{}: header type {:?} does not match extension ({:?})",
                path.display(),
                wok.walkmesh_type,
                kind
            );
        }
    }
    let bytes = BwmBinaryWriter::new(&wok).to_bytes()?;
    Ok(bytes.len())
}

/// Process `files` on `threads` workers. Failures are collected, not fatal.
pub fn process_files(files: &[PathBuf], threads: usize, cache: &WalkmeshCache) -> BatchReport {
    let work = || {
        files
            .par_iter()
            .map(|path| (path, process_file(cache, path)))
            .collect::<Vec<_>>()
    };

    let results = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(work),
        Err(e) => {
            warn!("Failed to create thread pool: {}, using single-threaded", e);
            files
                .iter()
                .map(|path| (path, process_file(cache, path)))
                .collect()
        }
    };

    let mut report = BatchReport::default();
    for (path, result) in results {
        match result {
            Ok(size) => {
                report.processed += 1;
                tracing::debug!("{}: rebuilt {} bytes", path.display(), size);
            }
            Err(err) => {
                error!("{}: {:#}", path.display(), err);
                report.failed.push((path.clone(), format!("{:#}", err)));
            }
        }
    }
    report
}

pub fn run_batch(dir: &Path, threads: usize) -> anyhow::Result<()> {
    let files = collect_walkmeshes(dir)?;
    info!("Found {} walkmeshes in {}", files.len(), dir.display());

    let cache = WalkmeshCache::new();
    let report = process_files(&files, threads, &cache);
    info!(
        "Batch done: {} rebuilt, {} failed",
        report.processed,
        report.failed.len()
    );

    if !report.failed.is_empty() {
        anyhow::bail!("{} of {} walkmeshes failed", report.failed.len(), files.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkmesh::{BwmFace, SurfaceMaterial, Vector3, Walkmesh, write_bwm};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bwmtool_batch_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("nested")).unwrap();
        dir
    }

    fn triangle() -> Walkmesh {
        let mut wok = Walkmesh::new();
        wok.faces.push(BwmFace::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            SurfaceMaterial::Stone,
        ));
        wok
    }

    #[test]
    fn test_collect_filters_by_extension() {
        let dir = temp_dir("collect");
        write_bwm(&triangle(), &dir.join("a.wok")).unwrap();
        write_bwm(&triangle(), &dir.join("nested").join("b.PWK")).unwrap();
        fs::write(dir.join("notes.txt"), "x").unwrap();

        let files = collect_walkmeshes(&dir).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| WalkmeshKind::from_path(p).is_some()));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failures_do_not_abort() {
        let dir = temp_dir("failures");
        write_bwm(&triangle(), &dir.join("good.wok")).unwrap();
        fs::write(dir.join("bad.dwk"), b"NOPEV1.0").unwrap();

        let files = collect_walkmeshes(&dir).unwrap();
        let cache = WalkmeshCache::new();
        let report = process_files(&files, 2, &cache);
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].0.ends_with("bad.dwk"));
        assert_eq!(cache.len(), 1);

        assert!(run_batch(&dir, 1).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
