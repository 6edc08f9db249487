use anyhow::Result;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn stringle(args: &[&str], dir: &Path) -> Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_stringle"))
        .arg(dir)
        .args(args)
        .arg("--no-config")
        .env_remove("RUST_LOG")
        .output()?)
}

fn setup() -> Result<TempDir> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("a.txt"), "old value: old")?;
    fs::create_dir_all(dir.path().join("build"))?;
    fs::write(dir.path().join("build/out.txt"), "old")?;
    Ok(dir)
}

#[test]
fn test_basic_run() -> Result<()> {
    let dir = setup()?;
    let output = stringle(&["old:new", "-v"], dir.path())?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Processed 1 files"));
    assert!(stdout.contains("Made 2 replacements"));
    assert!(stdout.contains("Modified files:"));
    assert_eq!(fs::read_to_string(dir.path().join("a.txt"))?, "new value: new");
    assert_eq!(fs::read_to_string(dir.path().join("build/out.txt"))?, "old");
    Ok(())
}

#[test]
fn test_escaped_colon_in_pattern() -> Result<()> {
    let dir = setup()?;
    let output = stringle(&[r"value\: old:value= fresh"], dir.path())?;

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("a.txt"))?, "old value= fresh");
    Ok(())
}

#[test]
fn test_dry_run_json() -> Result<()> {
    let dir = setup()?;
    let output = stringle(&["old:new", "--dry-run", "--format", "json"], dir.path())?;

    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(stats["files_modified"], 1);
    assert_eq!(stats["total_replacements"], 2);
    assert_eq!(fs::read_to_string(dir.path().join("a.txt"))?, "old value: old");
    Ok(())
}

#[test]
fn test_bad_regex_exits_with_error() -> Result<()> {
    let dir = setup()?;
    let output = stringle(&["(broken:x", "--regex"], dir.path())?;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr)?.contains("Invalid regex pattern"));
    assert_eq!(fs::read_to_string(dir.path().join("a.txt"))?, "old value: old");
    Ok(())
}

#[test]
fn test_missing_directory_exits_with_error() -> Result<()> {
    let dir = TempDir::new()?;
    let output = stringle(&["a:b"], &dir.path().join("missing"))?;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr)?.contains("Directory not found"));
    Ok(())
}

#[test]
fn test_replacement_without_separator() -> Result<()> {
    let dir = setup()?;
    let output = stringle(&["nocolon"], dir.path())?;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr)?.contains("Expected 'search:replace'"));
    Ok(())
}

#[test]
fn test_fail_on_error() -> Result<()> {
    let dir = setup()?;
    fs::write(dir.path().join("blob.bin"), [0xffu8, 0x00, 0xfe])?;

    let lenient = stringle(&["old:new", "--dry-run"], dir.path())?;
    assert!(lenient.status.success());
    assert!(String::from_utf8(lenient.stdout)?.contains("Errors:"));

    let strict = stringle(&["old:new", "--dry-run", "--fail-on-error"], dir.path())?;
    assert_eq!(strict.status.code(), Some(2));
    Ok(())
}

#[test]
fn test_diff_preview() -> Result<()> {
    let dir = setup()?;
    let output = stringle(&["old:new", "--diff"], dir.path())?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("-old value: old"));
    assert!(stdout.contains("+new value: new"));
    assert!(stdout.contains("Would modify 1 files"));
    assert_eq!(fs::read_to_string(dir.path().join("a.txt"))?, "old value: old");
    Ok(())
}

#[test]
fn test_list_excluded() -> Result<()> {
    let dir = setup()?;
    let output = stringle(&["old:new", "--list-excluded"], dir.path())?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("out.txt"));
    assert!(!stdout.contains("a.txt"));
    assert_eq!(fs::read_to_string(dir.path().join("a.txt"))?, "old value: old");
    Ok(())
}

#[test]
fn test_project_config_file() -> Result<()> {
    let dir = setup()?;
    fs::write(
        dir.path().join(".stringle.toml"),
        "[filters]\nignore_extensions = [\".txt\"]\n# old\n",
    )?;
    fs::write(dir.path().join("keep.md"), "old")?;

    let output = Command::new(env!("CARGO_BIN_EXE_stringle"))
        .arg(dir.path())
        .arg("old:new")
        .output()?;

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("a.txt"))?, "old value: old");
    assert_eq!(fs::read_to_string(dir.path().join("keep.md"))?, "new");
    assert!(fs::read_to_string(dir.path().join(".stringle.toml"))?.contains("# old"));
    Ok(())
}

#[test]
fn test_project_config_ignore_files_from_other_cwd() -> Result<()> {
    let dir = setup()?;
    let elsewhere = TempDir::new()?;
    fs::write(
        dir.path().join(".stringle.toml"),
        "[filters]\nignore_files = [\"secret.txt\"]\n",
    )?;
    fs::write(dir.path().join("secret.txt"), "old")?;
    fs::write(elsewhere.path().join("secret.txt"), "old")?;

    let output = Command::new(env!("CARGO_BIN_EXE_stringle"))
        .current_dir(elsewhere.path())
        .arg(dir.path())
        .arg("old:new")
        .output()?;

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("secret.txt"))?, "old");
    assert_eq!(fs::read_to_string(dir.path().join("a.txt"))?, "new value: new");
    assert_eq!(fs::read_to_string(elsewhere.path().join("secret.txt"))?, "old");
    Ok(())
}

#[test]
fn test_diff_json_is_one_document() -> Result<()> {
    let dir = setup()?;
    let output = stringle(&["old:new", "--diff", "--format", "json"], dir.path())?;

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["previews"][0]["replacements"], 2);
    assert_eq!(report["statistics"]["files_modified"], 1);
    assert_eq!(fs::read_to_string(dir.path().join("a.txt"))?, "old value: old");
    Ok(())
}
