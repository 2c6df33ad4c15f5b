//! Scoping a report to the files touched by a change set.

use std::collections::HashSet;

use crate::model::FileCoverage;

/// Keep only files whose `filename` is in `allowed`, preserving order.
/// `None` means no filtering.
#[must_use]
pub fn filter_files<'a>(
    files: &'a [FileCoverage],
    allowed: Option<&HashSet<String>>,
) -> Vec<&'a FileCoverage> {
    match allowed {
        None => files.iter().collect(),
        Some(set) => files.iter().filter(|f| set.contains(&f.filename)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files() -> Vec<FileCoverage> {
        ["src/a.py", "src/b.py", "src/c.py"]
            .into_iter()
            .map(FileCoverage::new)
            .collect()
    }

    fn names(files: &[&FileCoverage]) -> Vec<String> {
        files.iter().map(|f| f.filename.clone()).collect()
    }

    #[test]
    fn test_no_filter_is_identity() {
        let files = files();
        assert_eq!(
            names(&filter_files(&files, None)),
            vec!["src/a.py", "src/b.py", "src/c.py"]
        );
    }

    #[test]
    fn test_filter_preserves_order() {
        let files = files();
        let allowed: HashSet<String> = ["src/c.py", "src/a.py", "README.md"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            names(&filter_files(&files, Some(&allowed))),
            vec!["src/a.py", "src/c.py"]
        );
    }

    #[test]
    fn test_empty_set_removes_everything() {
        let files = files();
        assert!(filter_files(&files, Some(&HashSet::new())).is_empty());
    }
}
