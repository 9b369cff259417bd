//! Markdown rendering and file output for a [`SummarySet`].
//!
//! The document is one `# Summary of <title>` heading followed by a
//! `## <n> word summary` section per stored summary, shortest first. Entries
//! above the cutoff (the source text, early rounds) are left out.

use crate::error::SummaryError;
use crate::summary_set::SummarySet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default cutoff: summaries longer than this are not written.
pub const DEFAULT_MAX_SUMMARY_WORDS: usize = 1000;

/// Render `set` as Markdown, keeping entries with at most `cutoff` words.
pub fn render_markdown(set: &SummarySet, title: &str, cutoff: usize) -> String {
    let mut out = format!("# Summary of {}\n", title);
    for entry in set.iter().take_while(|e| e.word_count <= cutoff) {
        out.push_str(&format!(
            "\n## {} word summary\n\n{}\n",
            entry.word_count,
            entry.text.trim()
        ));
    }
    out
}

/// Render and write to `path`, replacing any existing file.
///
/// Parent directories are created. The content goes to `<path>.md.tmp` first
/// and is renamed into place, so a failed write never leaves a truncated file.
/// The temporary file is removed again if the rename fails.
pub async fn write_markdown(
    set: &SummarySet,
    title: &str,
    path: impl AsRef<Path>,
    cutoff: usize,
) -> Result<(), SummaryError> {
    let path = path.as_ref();
    let markdown = render_markdown(set, title, cutoff);
    let write_err = |e| SummaryError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("md.tmp");
    debug!("Writing {} bytes to {}", markdown.len(), tmp_path.display());
    tokio::fs::write(&tmp_path, &markdown)
        .await
        .map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
            warn!("Could not remove {}: {}", tmp_path.display(), cleanup);
        }
        return Err(write_err(e));
    }

    info!("Saved summaries to {}", path.display());
    Ok(())
}

/// `summaries/<title>_Summary_<YYYYmmdd_HHMMSS>.md`, local time.
pub fn default_output_path(title: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from("summaries").join(format!("{}_Summary_{}.md", file_safe(title), stamp))
}

/// Path separators in a title would turn the file name into a directory.
fn file_safe(title: &str) -> String {
    title
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["w"; n].join(" ")
    }

    #[test]
    fn cutoff_drops_long_entries() {
        let mut set = SummarySet::new();
        set.insert(words(1200), 0);
        set.insert(format!("  {}\n", words(50)), 1);

        let md = render_markdown(&set, "Dune", 1000);
        assert!(md.starts_with("# Summary of Dune\n"));
        assert!(md.contains(&format!("## 50 word summary\n\n{}\n", words(50))));
        assert!(!md.contains("1200 word summary"));
    }

    #[test]
    fn sections_ascend() {
        let mut set = SummarySet::new();
        set.insert(words(300), 1);
        set.insert(words(80), 2);
        set.insert_label("Spice");

        let md = render_markdown(&set, "T", DEFAULT_MAX_SUMMARY_WORDS);
        let one = md.find("## 1 word summary").unwrap();
        let eighty = md.find("## 80 word summary").unwrap();
        let three_hundred = md.find("## 300 word summary").unwrap();
        assert!(one < eighty && eighty < three_hundred);
        assert!(md.contains("## 1 word summary\n\nSpice\n"));
    }

    #[test]
    fn cutoff_is_inclusive() {
        let mut set = SummarySet::new();
        set.insert(words(1000), 0);
        assert!(render_markdown(&set, "T", 1000).contains("## 1000 word summary"));
    }

    #[tokio::test]
    async fn write_creates_parent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.md");
        let mut set = SummarySet::new();
        set.insert(words(10), 0);

        write_markdown(&set, "First", &path, 1000).await.unwrap();
        write_markdown(&set, "Second", &path, 1000).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Summary of Second"));
        assert!(!path.with_extension("md.tmp").exists());
    }

    #[tokio::test]
    async fn unwritable_target_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where a parent directory is expected.
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let err = write_markdown(&SummarySet::new(), "T", blocker.join("out.md"), 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::OutputWriteFailed { .. }));
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target path: the temp write succeeds,
        // the rename onto it does not.
        let path = dir.path().join("out.md");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let mut set = SummarySet::new();
        set.insert(words(10), 0);
        let err = write_markdown(&set, "T", &path, 1000).await.unwrap_err();

        assert!(matches!(err, SummaryError::OutputWriteFailed { .. }));
        assert!(!path.with_extension("md.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn default_path_shape() {
        let path = default_output_path("a/b");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(path.starts_with("summaries"));
        assert!(name.starts_with("a_b_Summary_"));
        assert!(name.ends_with(".md"));
        // a_b_Summary_ + YYYYmmdd_HHMMSS + .md
        assert_eq!(name.len(), "a_b_Summary_".len() + 15 + 3);
    }
}
