use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Switches the process cwd for the guard's lifetime.
pub(crate) struct DirGuard {
    restore_to: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(dir: &Path) -> Self {
        // cwd is process-global; lock even when a test forgets #[serial].
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let restore_to = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        Self {
            restore_to,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.restore_to);
    }
}

/// Throwaway git repository on `main`, seeded with `README.md`.
///
/// Patches written through [`TestRepo::write_patch`] live in a second temp
/// dir so they never show up as untracked files in the tree.
pub(crate) struct TestRepo {
    tree: TempDir,
    patches: TempDir,
}

impl TestRepo {
    pub(crate) fn new() -> Self {
        let repo = Self {
            tree: TempDir::new().unwrap(),
            patches: TempDir::new().unwrap(),
        };

        repo.git(&["init", "--quiet"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        for (key, value) in [
            ("user.email", "dev@varidelta.test"),
            ("user.name", "Varidelta Tests"),
            ("core.autocrlf", "false"),
        ] {
            repo.git(&["config", key, value]);
        }

        repo.commit("README.md", "# Test\n");
        repo
    }

    pub(crate) fn path(&self) -> &Path {
        self.tree.path()
    }

    /// Write `content` to `rel_path` and commit it.
    pub(crate) fn commit(&self, rel_path: &str, content: &str) {
        let file = self.path().join(rel_path);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&file, content).unwrap();
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "-m", &format!("edit {}", rel_path)]);
    }

    /// Delete `rel_path` and commit the removal.
    pub(crate) fn commit_removal(&self, rel_path: &str) {
        self.git(&["rm", "--quiet", rel_path]);
        self.git(&["commit", "--quiet", "-m", &format!("remove {}", rel_path)]);
    }

    /// Store `diff` as a patch file outside the tree.
    pub(crate) fn write_patch(&self, name: &str, diff: &str) -> PathBuf {
        let path = self.patches.path().join(name);
        std::fs::write(&path, diff).unwrap();
        path
    }

    fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .current_dir(self.path())
            .args(args)
            .output()
            .unwrap_or_else(|e| panic!("could not spawn git {}: {}", args.join(" "), e));

        assert!(
            output.status.success(),
            "git {} exited with {:?}\n{}",
            args.join(" "),
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}
