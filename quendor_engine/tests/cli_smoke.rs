mod common;

use std::process::Command;

use anyhow::{Context, Result};
use tempfile::tempdir;

use common::{wrapped, write, zork1};

fn quendor(cwd: &std::path::Path, home: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_quendor"));
    command
        .current_dir(cwd)
        .env("HOME", home)
        .env_remove("ZCODE_PATH")
        .env_remove("QUENDOR_PATH")
        .env_remove("RUST_LOG");
    command
}

#[test]
fn prints_resolved_title() -> Result<()> {
    let work = tempdir().context("creating working directory")?;
    let home = tempdir().context("creating home directory")?;
    std::fs::create_dir(home.path().join("zcode"))?;
    write(&home.path().join("zcode"), "zork1.zblorb", &wrapped(&zork1()));
    write(
        home.path(),
        ".quendor",
        b"width: 1024\n%%\nid: 88.840726\ntitle: Zork I\n",
    );

    let output = quendor(work.path(), home.path())
        .arg("zork1.zblorb")
        .output()
        .context("executing quendor")?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "quendor exited with {:?}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Zork I"), "title missing: {stdout}");
    assert!(stdout.contains("88.840726"), "identity missing: {stdout}");
    assert!(stdout.contains("1024"), "width missing: {stdout}");
    Ok(())
}

#[test]
fn json_report_lists_blorbs() -> Result<()> {
    let work = tempdir()?;
    let home = tempdir()?;
    write(work.path(), "zork1.zblorb", &wrapped(&zork1()));

    let output = quendor(work.path(), home.path())
        .args(["--json", "zork1.zblorb"])
        .output()
        .context("executing quendor --json")?;
    assert!(output.status.success(), "quendor exited with {:?}", output.status);

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("parsing JSON report")?;
    assert_eq!(report["program"]["format"], "blorb");
    assert_eq!(report["program"]["identity"], "88.840726");
    assert_eq!(report["blorbs"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["config"]["title"], "");
    Ok(())
}

#[test]
fn missing_program_fails_with_search_report() -> Result<()> {
    let work = tempdir()?;
    let home = tempdir()?;

    let output = quendor(work.path(), home.path())
        .arg("nowhere.z5")
        .output()
        .context("executing quendor")?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unable to locate the program: nowhere.z5"), "{stderr}");
    assert!(stderr.contains("zcode"), "{stderr}");
    Ok(())
}
