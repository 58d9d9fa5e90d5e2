use std::path::Path;

use serde::Serialize;

use crate::error::AppError;
use crate::services::tag_service::TagStore;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReconcileReport {
    pub repaired: usize,
    pub total: usize,
}

/// Repairs tag records after files moved into `hint`, the last directory
/// the user browsed. Paths are the only join key between files and tags,
/// so a move breaks the mapping unless re-keyed here.
///
/// Best-effort basename matching only: a record whose basename exists
/// under `hint` at a different path is moved there. Files moved anywhere
/// else, or renamed, are never recovered and their tags stay orphaned.
/// Probe failures count as "no match" and never abort the pass. Callers
/// must not run two reconciliations concurrently.
pub async fn reconcile_all(
    store: &TagStore,
    hint: Option<&Path>,
) -> Result<ReconcileReport, AppError> {
    let recorded = store.recorded_paths().await;
    let total = recorded.len();

    let Some(hint) = hint else {
        return Ok(ReconcileReport { repaired: 0, total });
    };

    let mut moves = Vec::new();
    for old in recorded {
        let Some(name) = Path::new(&old).file_name() else {
            continue;
        };
        let candidate = hint.join(name);
        let candidate = candidate.to_string_lossy().to_string();
        if candidate == old {
            continue;
        }
        if tokio::fs::try_exists(Path::new(&candidate)).await.unwrap_or(false) {
            moves.push((old, candidate));
        }
    }

    // One pass, one flush; apply_rekeys skips the write when nothing moved.
    let repaired = store.apply_rekeys(&moves).await?;
    Ok(ReconcileReport { repaired, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;
    use std::fs;

    fn tag_set(tags: &[&str]) -> IndexSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    async fn store_in(dir: &Path) -> TagStore {
        TagStore::load(dir.join("fileTags.json")).await
    }

    #[tokio::test]
    async fn moves_record_to_matching_file_in_hint_directory() {
        let dir = tempfile::tempdir().unwrap();
        let new_dir = dir.path().join("new");
        fs::create_dir_all(&new_dir).unwrap();
        fs::write(new_dir.join("a.txt"), "moved here").unwrap();

        let store = store_in(dir.path()).await;
        store.set_tags("/old/a.txt", tag_set(&["x"])).await.unwrap();

        let report = reconcile_all(&store, Some(&new_dir)).await.unwrap();
        assert_eq!(report.repaired, 1);
        assert_eq!(report.total, 1);

        let new_path = new_dir.join("a.txt").to_string_lossy().to_string();
        assert_eq!(store.get_tags(&new_path).await, tag_set(&["x"]));
        assert!(store.get_tags("/old/a.txt").await.is_empty());
    }

    #[tokio::test]
    async fn leaves_record_untouched_without_a_match() {
        let dir = tempfile::tempdir().unwrap();
        let new_dir = dir.path().join("new");
        fs::create_dir_all(&new_dir).unwrap();

        let store = store_in(dir.path()).await;
        store.set_tags("/old/a.txt", tag_set(&["x"])).await.unwrap();

        let report = reconcile_all(&store, Some(&new_dir)).await.unwrap();
        assert_eq!(report.repaired, 0);
        assert_eq!(store.get_tags("/old/a.txt").await, tag_set(&["x"]));
    }

    #[tokio::test]
    async fn no_hint_repairs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        store.set_tags("/old/a.txt", tag_set(&["x"])).await.unwrap();

        let report = reconcile_all(&store, None).await.unwrap();
        assert_eq!(report.repaired, 0);
        assert_eq!(report.total, 1);
    }

    #[tokio::test]
    async fn probe_failure_counts_as_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        store.set_tags("/old/a.txt", tag_set(&["x"])).await.unwrap();

        let missing_hint = dir.path().join("never-created");
        let report = reconcile_all(&store, Some(&missing_hint)).await.unwrap();

        assert_eq!(report.repaired, 0);
        assert_eq!(store.get_tags("/old/a.txt").await, tag_set(&["x"]));
    }

    #[tokio::test]
    async fn record_already_in_hint_directory_is_not_counted() {
        let dir = tempfile::tempdir().unwrap();
        let hint = dir.path().join("current");
        fs::create_dir_all(&hint).unwrap();
        fs::write(hint.join("a.txt"), "here").unwrap();

        let here = hint.join("a.txt").to_string_lossy().to_string();
        let store = store_in(dir.path()).await;
        store.set_tags(&here, tag_set(&["x"])).await.unwrap();

        let report = reconcile_all(&store, Some(&hint)).await.unwrap();
        assert_eq!(report.repaired, 0);
        assert_eq!(store.get_tags(&here).await, tag_set(&["x"]));
    }

    #[tokio::test]
    async fn repairs_several_records_with_one_report() {
        let dir = tempfile::tempdir().unwrap();
        let hint = dir.path().join("new");
        fs::create_dir_all(&hint).unwrap();
        fs::write(hint.join("a.txt"), "").unwrap();
        fs::write(hint.join("b.txt"), "").unwrap();

        let store = store_in(dir.path()).await;
        store.set_tags("/old/a.txt", tag_set(&["x"])).await.unwrap();
        store.set_tags("/old/b.txt", tag_set(&["y"])).await.unwrap();
        store.set_tags("/old/c.txt", tag_set(&["z"])).await.unwrap();

        let report = reconcile_all(&store, Some(&hint)).await.unwrap();
        assert_eq!(report.repaired, 2);
        assert_eq!(report.total, 3);
        assert_eq!(store.get_tags("/old/c.txt").await, tag_set(&["z"]));
    }
}
