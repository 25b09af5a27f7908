//! A scriptable stand-in for the monk CLI.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// Shell script installed as an executable in its own temp directory.
pub struct FakeMonk {
    _dir: TempDir,
    pub path: PathBuf,
}

impl FakeMonk {
    /// `body` is the shell text run with the monk arguments in `$@`.
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("monk");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write fake monk");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake monk");
        Self { _dir: dir, path }
    }

    /// A monk that knows a handful of read-only commands.
    pub fn vault() -> Self {
        Self::new(
            r#"case "$1 $2" in
  "server list")
    echo '{"servers":[{"name":"local","endpoint":"http://localhost:9001","status":"up","auth_sessions":1,"is_current":true},{"name":"prod","endpoint":"https://vault.example","status":"down"}]}'
    ;;
  "server current")
    echo 'local'
    ;;
  "auth expired")
    exit 1
    ;;
  "auth info")
    printf 'tenant: vault-101\nname: overseer\n'
    ;;
  *)
    echo "unsupported: $*" >&2
    exit 2
    ;;
esac"#,
        )
    }

    pub fn path_str(&self) -> &str {
        self.path.to_str().expect("utf-8 temp path")
    }
}
