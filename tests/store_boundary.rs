use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        if let Ok(read_dir) = fs::read_dir(&dir) {
            for entry in read_dir.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
                    files.push(path);
                }
            }
        }
    }
    files
}

fn file_contains(path: &Path, needle: &str) -> bool {
    fs::read_to_string(path)
        .map(|c| c.contains(needle))
        .unwrap_or(false)
}

/// Each store exclusively owns writes to its tables; cross-entity deletions
/// are allowed only inside the owning repository's cascade method. Everything
/// else must go through the stores.
#[test]
fn table_writes_stay_inside_their_owning_repository() {
    let src_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src");

    // needle -> files allowed to issue it
    let rules: &[(&str, &[&str])] = &[
        ("DELETE FROM posts", &["src/repository/posts.rs"]),
        (
            "DELETE FROM comments",
            &["src/repository/comments.rs", "src/repository/posts.rs"],
        ),
        (
            "DELETE FROM post_likes",
            &["src/repository/post_likes.rs", "src/repository/posts.rs"],
        ),
        (
            "DELETE FROM comment_likes",
            &[
                "src/repository/comment_likes.rs",
                "src/repository/comments.rs",
                "src/repository/posts.rs",
            ],
        ),
        ("INSERT INTO posts", &["src/repository/posts.rs"]),
        ("INSERT INTO comments", &["src/repository/comments.rs"]),
        ("INSERT INTO post_likes", &["src/repository/post_likes.rs"]),
        (
            "INSERT INTO comment_likes",
            &["src/repository/comment_likes.rs"],
        ),
        ("UPDATE posts", &["src/repository/posts.rs"]),
        ("UPDATE comments", &["src/repository/comments.rs"]),
    ];

    let mut offenders = Vec::new();
    for file in collect_rs_files(&src_root) {
        let path_str = file.to_string_lossy().replace('\\', "/");
        for (needle, allowed) in rules {
            if allowed.iter().any(|a| path_str.ends_with(a)) {
                continue;
            }
            if file_contains(&file, needle) {
                offenders.push(format!("{} issues `{}`", path_str, needle));
            }
        }
    }

    if !offenders.is_empty() {
        panic!(
            "Table writes must go through the owning repository only. Offenders: {:?}",
            offenders
        );
    }
}
