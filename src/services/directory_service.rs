use std::path::Path;

/// Lists files under `path` for display. Flat listings return file names;
/// recursive listings (the "show subdirectories" setting) return paths
/// relative to `path`. Hidden entries are skipped. Any failure yields an
/// empty list, the browser just shows nothing.
pub async fn list_directory(path: &Path, include_subdirectories: bool) -> Vec<String> {
    let mut names = if include_subdirectories {
        list_recursive(path)
    } else {
        list_flat(path).await
    };
    names.sort();
    names
}

async fn list_flat(path: &Path) -> Vec<String> {
    let mut entries = match tokio::fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut names = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        if !entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    names
}

fn list_recursive(path: &Path) -> Vec<String> {
    walkdir::WalkDir::new(path)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(path)
                .ok()
                .map(|p| p.to_string_lossy().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn lists_files_not_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::write(dir.path().join("b.png"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let names = list_directory(dir.path(), false).await;
        assert_eq!(names, vec!["a.txt".to_string(), "b.png".to_string()]);
    }

    #[tokio::test]
    async fn skips_hidden_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".DS_Store"), "").unwrap();
        fs::write(dir.path().join("visible.txt"), "").unwrap();

        let names = list_directory(dir.path(), false).await;
        assert_eq!(names, vec!["visible.txt".to_string()]);
    }

    #[tokio::test]
    async fn recursive_listing_returns_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("top.txt"), "").unwrap();
        fs::write(dir.path().join("sub").join("deep.txt"), "").unwrap();

        let names = list_directory(dir.path(), true).await;
        assert_eq!(
            names,
            vec!["sub/deep.txt".to_string(), "top.txt".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_directory_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never");

        assert!(list_directory(&missing, false).await.is_empty());
        assert!(list_directory(&missing, true).await.is_empty());
    }
}
