//! Paths the updater never overwrites.
//!
//! The host's own files (entry point, package manifests, the updater itself,
//! the version record) and repository metadata are skipped. Matching is a
//! case-sensitive substring test on the repository path, so `.git` also
//! excludes `.github/` and `.gitignore`, and `LICENSE` excludes `LICENSE.txt`.

use super::remote::{EntryKind, RemoteFileEntry};

/// Path fragments excluded from every update.
pub const EXCLUDED_FRAGMENTS: &[&str] = &[
    "main.js",
    "package.json",
    "package-lock.json",
    "updater.js",
    "version.json",
    "node_modules",
    ".git",
    "README.md",
    "LICENSE",
];

/// A fixed set of excluded path fragments.
#[derive(Debug, Clone, Copy)]
pub struct ExclusionSet {
    fragments: &'static [&'static str],
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::from_static(EXCLUDED_FRAGMENTS)
    }
}

impl ExclusionSet {
    pub const fn from_static(fragments: &'static [&'static str]) -> Self {
        Self { fragments }
    }

    /// Whether `path` contains any excluded fragment.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.fragments.iter().any(|fragment| path.contains(fragment))
    }

    /// Keep the blobs that are not excluded, preserving listing order.
    ///
    /// Returns the kept entries and the number of blobs that were excluded.
    pub fn select(&self, listing: Vec<RemoteFileEntry>) -> (Vec<RemoteFileEntry>, usize) {
        let mut excluded = 0;
        let kept = listing
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::Blob)
            .filter(|entry| {
                let skip = self.is_excluded(&entry.path);
                if skip {
                    excluded += 1;
                }
                !skip
            })
            .collect();
        (kept, excluded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_files_are_excluded() {
        let set = ExclusionSet::default();
        for path in [
            "main.js",
            "package.json",
            "package-lock.json",
            "updater.js",
            "version.json",
            "node_modules/lodash/index.js",
            ".git/HEAD",
            "README.md",
            "LICENSE",
        ] {
            assert!(set.is_excluded(path), "{path} should be excluded");
        }
    }

    #[test]
    fn test_substring_semantics() {
        let set = ExclusionSet::default();
        assert!(set.is_excluded("docs/README.md"));
        assert!(set.is_excluded(".github/workflows/ci.yml"));
        assert!(set.is_excluded("LICENSE.txt"));
        assert!(set.is_excluded("src/domain.js"));
        assert!(!set.is_excluded("readme.md"));
        assert!(!set.is_excluded("index.html"));
        assert!(!set.is_excluded("assets/sprites/hero.png"));
    }

    #[test]
    fn test_select_keeps_blobs_in_order() {
        let listing = vec![
            RemoteFileEntry::blob("index.html"),
            RemoteFileEntry::tree("assets"),
            RemoteFileEntry::blob("main.js"),
            RemoteFileEntry::blob("assets/hero.png"),
            RemoteFileEntry::blob("game.js"),
        ];
        let (kept, excluded) = ExclusionSet::default().select(listing);
        let paths: Vec<&str> = kept.iter().map(|entry| entry.path.as_str()).collect();
        assert_eq!(paths, vec!["index.html", "assets/hero.png", "game.js"]);
        assert_eq!(excluded, 1);
    }

    #[test]
    fn test_custom_set() {
        static ONLY_SAVES: &[&str] = &["saves/"];
        let set = ExclusionSet::from_static(ONLY_SAVES);
        assert!(set.is_excluded("saves/slot1.json"));
        assert!(!set.is_excluded("main.js"));
    }
}
