//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A project repository with a pin file and a scripted pinning tool
pub struct TestProject {
  _root: TempDir,
  pub path: PathBuf,
  bin_dir: PathBuf,
  pin_file: &'static str,
}

impl TestProject {
  /// Create a project whose `pin_file` holds `sources`, committed on main
  pub fn new(pin_file: &'static str, sources: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("project");
    let bin_dir = root.path().join("bin");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(bin_dir.join("updates"))?;

    init_repo(&path)?;

    let file = path.join(pin_file);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&file, sources)?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-q", "-m", "Initial sources"])?;

    Ok(Self {
      _root: root,
      path,
      bin_dir,
      pin_file,
    })
  }

  /// Install a fake `tool` executable
  ///
  /// `tool update <name>` appends its arguments (and `NIV_GITHUB_TOKEN`) to
  /// `calls.log`, exits 1 for names registered via [`TestProject::fail_update`],
  /// and otherwise replaces the pin file with the content registered for
  /// `<name>` via [`TestProject::on_update`], if any.
  #[cfg(unix)]
  pub fn install_tool(&self, tool: &str) -> Result<()> {
    let script = format!(
      r#"#!/bin/sh
echo "$* token=${{NIV_GITHUB_TOKEN:-}}" >> "{calls}"
if [ -f "{updates}/$2.fail" ]; then
  echo "cannot update $2" >&2
  exit 1
fi
if [ -f "{updates}/$2.json" ]; then
  cp "{updates}/$2.json" "{pin_file}"
fi
"#,
      calls = self.bin_dir.join("calls.log").display(),
      updates = self.bin_dir.join("updates").display(),
      pin_file = self.pin_file,
    );

    write_executable(&self.bin_dir.join(tool), &script)
  }

  /// Make the fake tool fail for `name`
  pub fn fail_update(&self, name: &str) -> Result<()> {
    std::fs::write(self.bin_dir.join("updates").join(format!("{}.fail", name)), "")?;
    Ok(())
  }

  /// `commit-msg` hook that rejects messages containing `needle`
  #[cfg(unix)]
  pub fn reject_commits_containing(&self, needle: &str) -> Result<()> {
    let script = format!(
      "#!/bin/sh\nif grep -q '{}' \"$1\"; then\n  echo 'rejected by hook' >&2\n  exit 1\nfi\n",
      needle
    );
    let hooks = self.path.join(".git/hooks");
    std::fs::create_dir_all(&hooks)?;
    write_executable(&hooks.join("commit-msg"), &script)
  }

  /// Point `gpg.program` at a stub that signs anything
  ///
  /// Each invocation is appended to `gpg.log`.
  #[cfg(unix)]
  pub fn install_fake_gpg(&self) -> Result<()> {
    let script = format!(
      r#"#!/bin/sh
echo "$*" >> "{log}"
cat > /dev/null
printf '\n[GNUPG:] SIG_CREATED D 1 8 00 0 0\n' >&2
printf '%s\n' '-----BEGIN PGP SIGNATURE-----' '' 'c3R1Yg==' '-----END PGP SIGNATURE-----'
"#,
      log = self.bin_dir.join("gpg.log").display(),
    );
    let gpg = self.bin_dir.join("fake-gpg");
    write_executable(&gpg, &script)?;
    git(&self.path, &["config", "gpg.program", &gpg.display().to_string()])?;
    Ok(())
  }

  /// Number of times the fake gpg was asked to sign
  pub fn gpg_calls(&self) -> usize {
    std::fs::read_to_string(self.bin_dir.join("gpg.log"))
      .map(|s| s.lines().count())
      .unwrap_or_default()
  }

  /// Pin file content the fake tool writes when asked to update `name`
  pub fn on_update(&self, name: &str, sources: &str) -> Result<()> {
    std::fs::write(self.bin_dir.join("updates").join(format!("{}.json", name)), sources)?;
    Ok(())
  }

  /// Lines recorded by the fake tool, empty if it never ran
  pub fn tool_calls(&self) -> Vec<String> {
    std::fs::read_to_string(self.bin_dir.join("calls.log"))
      .map(|s| s.lines().map(String::from).collect())
      .unwrap_or_default()
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(path), content)?;
    Ok(())
  }

  /// Full message of HEAD
  pub fn head_message(&self) -> Result<String> {
    let output = git(&self.path, &["log", "-1", "--format=%B"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
  }

  /// Files touched by HEAD
  pub fn head_files(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["show", "--name-only", "--format=", "HEAD"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect(),
    )
  }

  pub fn commit_count(&self) -> Result<usize> {
    let output = git(&self.path, &["rev-list", "--count", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().parse()?)
  }

  /// Run pin-updater in the project with the fake tools first on PATH
  pub fn run(&self, args: &[&str]) -> Result<Output> {
    let path_env = match std::env::var_os("PATH") {
      Some(path) => {
        let mut dirs = vec![self.bin_dir.clone()];
        dirs.extend(std::env::split_paths(&path));
        std::env::join_paths(dirs)?
      }
      None => self.bin_dir.clone().into_os_string(),
    };

    run_pin_updater(&self.path, args, &path_env)
  }
}

/// An upstream repository with a linear history
pub struct Upstream {
  _root: TempDir,
  pub path: PathBuf,
}

impl Upstream {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    init_repo(&path)?;
    Ok(Self { _root: root, path })
  }

  /// Commit a file change with `subject`, returning the new HEAD
  pub fn commit(&self, subject: &str) -> Result<String> {
    std::fs::write(self.path.join("CHANGES"), subject)?;
    git(&self.path, &["add", "CHANGES"])?;
    git(&self.path, &["commit", "-q", "-m", subject])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }
}

#[cfg(unix)]
fn write_executable(path: &Path, script: &str) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;

  std::fs::write(path, script)?;
  let mut perms = std::fs::metadata(path)?.permissions();
  perms.set_mode(0o755);
  std::fs::set_permissions(path, perms)?;
  Ok(())
}

fn init_repo(path: &Path) -> Result<()> {
  git(path, &["init", "-q", "--initial-branch=main"])?;
  git(path, &["config", "user.name", "Test User"])?;
  git(path, &["config", "user.email", "test@example.com"])?;
  git(path, &["config", "commit.gpgsign", "false"])?;
  Ok(())
}

/// niv `sources.json` with a single GitHub source
pub fn niv_sources(name: &str, owner: &str, repo: &str, rev: &str) -> String {
  format!(
    r#"{{
    "{name}": {{
        "branch": "main",
        "owner": "{owner}",
        "repo": "{repo}",
        "rev": "{rev}",
        "sha256": "0000000000000000000000000000000000000000000000000000",
        "type": "tarball",
        "url": "https://github.com/{owner}/{repo}/archive/{rev}.tar.gz",
        "url_template": "https://github.com/<owner>/<repo>/archive/<rev>.tar.gz"
    }}
}}
"#
  )
}

/// npins `sources.json` with a single GitHub-backed git pin
pub fn npins_sources(version: u64, name: &str, owner: &str, repo: &str, rev: &str) -> String {
  format!(
    r#"{{
  "pins": {{
    "{name}": {{
      "type": "Git",
      "repository": {{
        "type": "GitHub",
        "owner": "{owner}",
        "repo": "{repo}"
      }},
      "branch": "main",
      "revision": "{rev}",
      "url": "https://github.com/{owner}/{repo}/archive/{rev}.tar.gz",
      "hash": "sha256-AAAA"
    }}
  }},
  "version": {version}
}}
"#
  )
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the pin-updater binary; the caller checks the exit status
pub fn run_pin_updater(cwd: &Path, args: &[&str], path_env: &std::ffi::OsStr) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_pin-updater");

  Command::new(bin)
    .current_dir(cwd)
    .env("PATH", path_env)
    .env_remove("NIV_GITHUB_TOKEN")
    .args(args)
    .output()
    .context("Failed to run pin-updater")
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
