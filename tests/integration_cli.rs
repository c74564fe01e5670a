use assert_cmd::Command;
use tempfile::tempdir;

fn cipher_lab(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("cipher-lab").unwrap();
    cmd.env("HOME", home);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn decrypt_with_shift() {
    let home = tempdir().unwrap();
    let out = stdout_of(cipher_lab(home.path()).args(["--decrypt", "KHOOR ZRUOG", "--shift", "3"]));
    assert_eq!(out.trim_end(), "HELLO WORLD");
}

#[test]
fn decrypt_with_negative_shift() {
    let home = tempdir().unwrap();
    let out = stdout_of(cipher_lab(home.path()).args(["--decrypt", "HELLO", "--shift", "-3"]));
    assert_eq!(out.trim_end(), "KHOOR");
}

#[test]
fn decrypt_lists_every_shift() {
    let home = tempdir().unwrap();
    let out = stdout_of(cipher_lab(home.path()).args(["--decrypt", "KHOOR"]));
    assert_eq!(out.lines().count(), 26);
    assert!(out.lines().any(|l| l.trim() == "3  HELLO"));
}

#[test]
fn list_builtin_levels() {
    let home = tempdir().unwrap();
    let out = stdout_of(cipher_lab(home.path()).arg("--list-levels"));
    assert_eq!(out.lines().filter(|l| l.contains("pts")).count(), 10);
    assert!(out.contains("KHOOR ZRUOG"));
    assert!(out.contains("shift  3"));
    assert!(out.contains("shift  ?"));
    assert!(out.contains("max score 258"));
}

#[test]
fn encrypt_with_shift() {
    let home = tempdir().unwrap();
    let out = stdout_of(cipher_lab(home.path()).args(["--encrypt", "hello world", "--shift", "3"]));
    assert_eq!(out.trim_end(), "khoor zruog");
}

#[test]
fn encrypt_needs_a_shift() {
    let home = tempdir().unwrap();
    cipher_lab(home.path())
        .args(["--encrypt", "HELLO"])
        .assert()
        .failure();
}

#[test]
fn shift_alone_is_rejected() {
    let home = tempdir().unwrap();
    cipher_lab(home.path())
        .args(["--shift", "3", "--list-levels"])
        .assert()
        .failure();
}

#[test]
fn history_without_sessions() {
    let home = tempdir().unwrap();
    let out = stdout_of(cipher_lab(home.path()).arg("--history"));
    assert_eq!(out.trim_end(), "No sessions recorded");
}

#[test]
fn history_lists_recorded_sessions() {
    let home = tempdir().unwrap();
    let path = home
        .path()
        .join(".local")
        .join("state")
        .join("cipher-lab")
        .join("history.csv");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        "date,catalog,levels,decrypted,score,total_secs,hints\nMon Jan  5 10:00:00 2026,forensics,10,7,141,845,3\n",
    )
    .unwrap();

    let out = stdout_of(cipher_lab(home.path()).arg("--history"));
    assert!(out.contains("forensics"));
    assert!(out.contains(" 7/10"));
    assert!(out.contains("141pts"));
    assert!(out.contains("14:05"));
}

// config dir follows XDG only on linux
#[cfg(target_os = "linux")]
#[test]
fn write_config_applies_overrides() {
    let home = tempdir().unwrap();
    let config_home = home.path().join("config");
    let out = stdout_of(
        cipher_lab(home.path())
            .env("XDG_CONFIG_HOME", &config_home)
            .args(["--write-config", "--auto-advance", "0", "--allow-negative-score"]),
    );
    assert!(out.starts_with("Settings written to"));

    let path = config_home.join("cipher-lab").join("config.json");
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(saved["auto_advance_secs"], 0);
    assert_eq!(saved["score_policy"], "allow_negative");
}

#[test]
fn report_without_results() {
    let home = tempdir().unwrap();
    let out = stdout_of(cipher_lab(home.path()).args(["--report", "--ephemeral"]));
    assert_eq!(out.trim_end(), "No results found");
}

#[test]
fn bad_catalog_fails() {
    let home = tempdir().unwrap();
    let path = home.path().join("levels.json");
    std::fs::write(&path, r#"{"name": "x", "levels": []}"#).unwrap();
    cipher_lab(home.path())
        .arg("--list-levels")
        .arg("--levels")
        .arg(&path)
        .assert()
        .failure();
}
