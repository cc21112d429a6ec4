use std::path::{Component, Path, PathBuf};

/// Absolute, normalised form of `path` for messages. Falls back to lexical
/// normalisation when the path cannot be canonicalised (it may not exist).
pub fn best_effort_path_display(path: &Path) -> String {
    if let Ok(canonical) = path.canonicalize() {
        return canonical.display().to_string();
    }

    let absolute = match std::env::current_dir() {
        Ok(current_dir) if path.is_relative() => current_dir.join(path),
        _ => path.to_path_buf(),
    };
    normalize_path(&absolute).display().to_string()
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            other => components.push(other),
        }
    }

    components.iter().collect()
}

pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;
}

impl<P: AsRef<Path> + ?Sized> BestEffortPathExt for P {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_dot_segments() {
        let normalized = normalize_path(Path::new("/srv/hub/./uploads/../notes.txt"));
        assert_eq!(normalized, PathBuf::from("/srv/hub/notes.txt"));
    }

    #[test]
    fn test_normalize_stops_at_root() {
        let normalized = normalize_path(Path::new("/../../etc"));
        assert_eq!(normalized, PathBuf::from("/etc"));
    }

    #[test]
    fn test_missing_relative_path_becomes_absolute() {
        let shown = "missing/upload.bin".best_effort_path_display();
        assert!(Path::new(&shown).is_absolute());
        assert!(shown.ends_with("upload.bin"));
    }
}
