use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SCHEMA: &str = r##"{
  "types": [
    { "name": "user", "description": "a registered user", "properties": [
      { "name": "id", "type": "int", "required": true },
      { "name": "tags", "type": "array", "items": { "type": "string" } }
    ] }
  ],
  "methods": [
    { "name": "get_user",
      "inputs": [ { "name": "id", "type": "int", "required": true } ],
      "outputs": [ { "name": "user", "$ref": "#/types/user" } ] }
  ]
}"##;

/// Helper to get the rpcgen binary, run inside `dir`.
fn rpcgen(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rpcgen").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
    dir
}

#[test]
fn lists_backends() {
    let dir = workspace();
    rpcgen(&dir)
        .arg("backends")
        .assert()
        .success()
        .stdout(predicate::str::contains("rust-types"))
        .stdout(predicate::str::contains("ruby-client"));
}

#[test]
fn generates_to_stdout_with_default_schema_path() {
    let dir = workspace();
    rpcgen(&dir)
        .args(["generate", "go-types"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "// Do not edit, this file was generated by rpcgen.\n\npackage api\n",
        ))
        .stdout(predicate::str::contains("type GetUserInput struct {"));
}

#[test]
fn writes_output_file() {
    let dir = workspace();
    rpcgen(&dir)
        .args(["generate", "rust-client", "-o", "client.rs"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let out = fs::read_to_string(dir.path().join("client.rs")).unwrap();
    assert!(out.contains("pub async fn get_user(&self, input: &GetUserInput)"));
}

#[test]
fn reads_schema_from_stdin() {
    let dir = TempDir::new().unwrap();
    rpcgen(&dir)
        .args(["generate", "typescript-types", "--schema", "-"])
        .write_stdin(SCHEMA)
        .assert()
        .success()
        .stdout(predicate::str::contains("export interface User {"));
}

#[test]
fn flags_override_config_file() {
    let dir = workspace();
    fs::write(
        dir.path().join("rpcgen.toml"),
        "[generate]\npackage = \"users\"\ntags = [\"json\", \"yaml\"]\n",
    )
    .unwrap();

    rpcgen(&dir)
        .args(["generate", "go-types"])
        .assert()
        .success()
        .stdout(predicate::str::contains("package users\n"))
        .stdout(predicate::str::contains(r#"`json:"id" yaml:"id"`"#));

    rpcgen(&dir)
        .args(["generate", "go-types", "--package", "other", "--no-validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("package other\n"))
        .stdout(predicate::str::contains("Validate()").not());
}

#[test]
fn unknown_backend_fails() {
    let dir = workspace();
    rpcgen(&dir)
        .args(["generate", "cobol-types"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown backend `cobol-types`"));
}

#[test]
fn unresolved_reference_writes_nothing() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("schema.json"),
        r##"{ "methods": [ { "name": "get_team", "outputs": [ { "name": "team", "$ref": "#/types/team" } ] } ] }"##,
    )
    .unwrap();

    rpcgen(&dir)
        .args(["generate", "rust-types", "-o", "types.rs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "field `get_team.team` references unknown type `team`",
        ));
    assert!(!dir.path().join("types.rs").exists());
}

#[test]
fn missing_schema_fails_with_path() {
    let dir = TempDir::new().unwrap();
    rpcgen(&dir)
        .args(["generate", "go-types", "--schema", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open schema nope.json"));
}
