//! Integration tests for the Git interface.
//!
//! These tests use real git repositories created via tempfile to verify
//! that the Git interface works correctly with actual git operations.

mod common;

use common::TestRepo;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use commitweave::git::{Git, GitError};

fn paths(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

mod discovery {
    use super::*;

    #[test]
    fn open_outside_repo_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Git::open(dir.path()),
            Err(GitError::NotARepo { .. })
        ));
    }

    #[test]
    fn open_from_subdirectory_finds_root() {
        let repo = TestRepo::new();
        repo.write("nested/deep/file.txt", "x");
        let git = Git::open(&repo.path().join("nested/deep")).unwrap();
        assert_eq!(
            git.work_dir().canonicalize().unwrap(),
            repo.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn current_branch_and_head() {
        let repo = TestRepo::new();
        let git = repo.git();
        assert_eq!(git.current_branch().unwrap(), "main");
        assert_eq!(git.head_id().unwrap(), repo.head());
        assert!(git.is_initial_commit());
    }

    #[test]
    fn cancelled_token_stops_git() {
        let repo = TestRepo::new();
        repo.write("a.txt", "a\n");
        let cancel = CancellationToken::new();
        assert!(repo.git().with_cancel(cancel.clone()).status().is_ok());

        cancel.cancel();
        let git = repo.git().with_cancel(cancel.clone());
        assert!(matches!(git.status(), Err(GitError::Cancelled)));
        assert!(matches!(
            git.stage(&paths(&["a.txt"])),
            Err(GitError::Cancelled)
        ));
        assert_eq!(GitError::Cancelled.to_string(), "operation cancelled");
        assert!(repo.staged().is_empty());
    }

    #[test]
    fn unborn_branch_has_no_head() {
        let repo = TestRepo::empty();
        let git = repo.git();
        assert!(!git.has_head());
        assert_eq!(git.commit_count().unwrap(), 0);
        assert!(matches!(git.head_id(), Err(GitError::NoCommits)));
    }
}

mod status {
    use super::*;

    #[test]
    fn categorizes_and_filters_ignored() {
        let repo = TestRepo::new();
        repo.commit_file(".gitignore", "*.log\n", "chore: ignore logs");
        repo.write("README.md", "# Changed\n");
        repo.write("new.txt", "new\n");
        repo.write("debug.log", "noise\n");

        let status = repo.git().status().unwrap();
        assert_eq!(status.modified, paths(&["README.md"]));
        assert_eq!(status.untracked, paths(&["new.txt"]));
        assert!(!status.all_files().contains(&"debug.log".to_string()));
        assert!(status.has_changes());
    }

    #[test]
    fn clean_tree_has_no_changes() {
        let repo = TestRepo::new();
        assert!(!repo.git().status().unwrap().has_changes());
    }

    #[test]
    fn numstat_summaries() {
        let repo = TestRepo::new();
        repo.write("README.md", "# Test Repo\nmore\nlines\n");
        let stats = repo.git().diff_numstat(false).unwrap();
        assert_eq!(stats["README.md"].summary, "+2 -0");
    }

    #[test]
    fn diff_without_head_includes_staged_and_unstaged() {
        let repo = TestRepo::empty();
        repo.write("a.txt", "staged\n");
        repo.git_ok(&["add", "a.txt"]);
        repo.write("a.txt", "staged\nthen edited\n");

        let diff = repo.git().diff(false, &[]).unwrap();
        assert!(diff.contains("+staged"));
        assert!(diff.contains("+then edited"));
    }
}

mod staging {
    use super::*;

    #[test]
    fn directory_expands_and_ignored_file_is_rejected() {
        let repo = TestRepo::new();
        repo.commit_file(".gitignore", "*.log\n", "chore: ignore logs");
        repo.write("subdir/a.txt", "a\n");
        repo.write("subdir/b.txt", "b\n");
        repo.write("debug.log", "noise\n");
        let git = repo.git();

        git.stage(&paths(&["subdir"])).unwrap();
        assert_eq!(repo.staged(), paths(&["subdir/a.txt", "subdir/b.txt"]));

        match git.stage(&paths(&["debug.log"])) {
            Err(GitError::Ignored { path }) => assert_eq!(path, "debug.log"),
            other => panic!("expected ignored-file error, got {:?}", other),
        }
    }

    #[test]
    fn staged_rename_source_is_carried_by_rename() {
        let repo = TestRepo::new();
        repo.commit_file("old.txt", "content that stays the same\n", "feat: add old");
        repo.commit_file("other.txt", "v1\n", "feat: add other");
        repo.git_ok(&["mv", "old.txt", "new.txt"]);
        repo.write("other.txt", "v2\n");
        let git = repo.git();

        git.stage(&paths(&["old.txt"])).unwrap();
        assert_eq!(repo.staged(), paths(&["new.txt"]));

        git.stage(&paths(&["old.txt", "other.txt"])).unwrap();
        assert_eq!(repo.staged(), paths(&["new.txt", "other.txt"]));
    }

    #[test]
    fn deleted_tracked_file_stages_deletion() {
        let repo = TestRepo::new();
        repo.commit_file("gone.txt", "bye\n", "feat: add gone");
        std::fs::remove_file(repo.path().join("gone.txt")).unwrap();

        repo.git().stage(&paths(&["gone.txt"])).unwrap();
        assert_eq!(repo.porcelain(), "D  gone.txt");
    }

    #[test]
    fn missing_untracked_path_is_an_error() {
        let repo = TestRepo::new();
        assert!(matches!(
            repo.git().stage(&paths(&["nope.txt"])),
            Err(GitError::MissingFile { .. })
        ));
    }

    #[test]
    fn clean_directory_has_nothing_to_stage() {
        let repo = TestRepo::new();
        repo.commit_file("lib/a.txt", "a\n", "feat: add lib");
        assert!(matches!(
            repo.git().stage(&paths(&["lib"])),
            Err(GitError::NoStageablePaths)
        ));
    }

    #[test]
    fn empty_input_is_a_precondition_error() {
        let repo = TestRepo::new();
        assert!(matches!(
            repo.git().stage(&[]),
            Err(GitError::Precondition(_))
        ));
    }

    #[test]
    fn unstage_all_clears_index() {
        let repo = TestRepo::new();
        repo.write("a.txt", "a\n");
        let git = repo.git();
        git.stage_all().unwrap();
        assert!(git.has_staged_changes().unwrap());
        git.unstage_all().unwrap();
        assert!(!git.has_staged_changes().unwrap());
    }

    #[test]
    fn unstage_all_on_unborn_branch() {
        let repo = TestRepo::empty();
        repo.write("a.txt", "a\n");
        let git = repo.git();
        git.stage(&paths(&["a.txt"])).unwrap();
        git.unstage_all().unwrap();
        assert_eq!(repo.porcelain(), "?? a.txt");
    }
}

mod committing {
    use super::*;

    #[test]
    fn commit_returns_short_id() {
        let repo = TestRepo::new();
        repo.write("a.txt", "a\n");
        let git = repo.git();
        git.stage(&paths(&["a.txt"])).unwrap();

        let id = git.commit("feat: add a").unwrap();
        assert!(repo.head().starts_with(&id));
        assert_eq!(repo.subjects()[0], "feat: add a");
    }

    #[test]
    fn nothing_staged_is_refused() {
        let repo = TestRepo::new();
        assert!(matches!(
            repo.git().commit("feat: nothing"),
            Err(GitError::NothingStaged)
        ));
    }

    #[test]
    fn overlong_message_is_refused() {
        let repo = TestRepo::new();
        repo.write("a.txt", "a\n");
        let git = repo.git();
        git.stage(&paths(&["a.txt"])).unwrap();
        let long = "x".repeat(201);
        assert!(matches!(git.commit(&long), Err(GitError::Precondition(_))));
    }

    #[test]
    fn first_commit_on_unborn_branch() {
        let repo = TestRepo::empty();
        repo.write("a.txt", "a\n");
        let git = repo.git();
        git.stage(&paths(&["a.txt"])).unwrap();
        git.commit("feat: first").unwrap();
        assert_eq!(repo.subjects(), vec!["feat: first".to_string()]);
    }
}

mod history {
    use super::*;

    #[test]
    fn commit_log_marks_pushed_commits() {
        let repo = TestRepo::new();
        repo.commit_file("a.txt", "a\n", "feat: a");
        let _remote = repo.with_pushed_remote();
        repo.commit_file("b.txt", "b\n", "feat: b");

        let log = repo.git().get_commit_log(10).unwrap();
        let flags: Vec<(&str, bool)> = log.iter().map(|c| (c.message.as_str(), c.pushed)).collect();
        assert_eq!(
            flags,
            vec![("feat: b", false), ("feat: a", true), ("Initial commit", true)]
        );
    }

    #[test]
    fn recent_subjects_newest_first() {
        let repo = TestRepo::new();
        repo.commit_file("a.txt", "a\n", "feat: a");
        repo.commit_file("b.txt", "b\n", "fix: b");
        assert_eq!(
            repo.git().recent_commit_subjects(2).unwrap(),
            vec!["fix: b".to_string(), "feat: a".to_string()]
        );
    }

    #[test]
    fn commit_files_lists_touched_paths() {
        let repo = TestRepo::new();
        repo.write("x/one.txt", "1");
        repo.write("two.txt", "2");
        repo.git_ok(&["add", "-A"]);
        repo.git_ok(&["commit", "-q", "-m", "feat: two files"]);
        let mut files = repo.git().commit_files("HEAD").unwrap();
        files.sort();
        assert_eq!(files, paths(&["two.txt", "x/one.txt"]));
    }

    #[test]
    fn depth_requires_parent() {
        let repo = TestRepo::new();
        let git = repo.git();
        assert!(matches!(
            git.has_commit_depth(1),
            Err(GitError::InsufficientDepth { requested: 1, available: 1 })
        ));
        repo.commit_file("a.txt", "a\n", "feat: a");
        assert!(git.has_commit_depth(1).is_ok());
    }
}

mod reverse {
    use super::*;

    #[test]
    fn pushed_commit_needs_force() {
        let repo = TestRepo::new();
        repo.commit_file("a.txt", "a\n", "feat: a");
        let _remote = repo.with_pushed_remote();
        let before = repo.head();
        let parent = repo.git_ok(&["rev-parse", "HEAD~1"]);
        let git = repo.git();

        assert!(matches!(
            git.reverse(1, false),
            Err(GitError::Pushed { count: 1 })
        ));
        assert_eq!(repo.head(), before);

        git.reverse(1, true).unwrap();
        assert_eq!(repo.head(), parent);
        assert_eq!(repo.read("a.txt"), "a\n");
        assert_eq!(repo.porcelain(), "?? a.txt");
    }

    #[test]
    fn reverse_keeps_combined_changes_unstaged() {
        let repo = TestRepo::new();
        let base = repo.head();
        repo.commit_file("a.txt", "a\n", "feat: a");
        repo.commit_file("README.md", "# Edited\n", "docs: edit readme");

        repo.git().reverse(2, false).unwrap();
        assert_eq!(repo.head(), base);
        assert!(repo.staged().is_empty());
        let porcelain = repo.porcelain();
        assert!(porcelain.contains("M README.md"));
        assert!(porcelain.contains("?? a.txt"));
    }

    #[test]
    fn too_deep_is_refused() {
        let repo = TestRepo::new();
        assert!(matches!(
            repo.git().reverse(1, true),
            Err(GitError::InsufficientDepth { .. })
        ));
    }

    #[test]
    fn zero_is_a_precondition_error() {
        let repo = TestRepo::new();
        assert!(matches!(
            repo.git().reverse(0, false),
            Err(GitError::Precondition(_))
        ));
    }
}
