// ABOUTME: Tests for the capability file sandbox and the file built-ins

use brew_lang::builtins::{default_globals, set_sandbox_storage};
use brew_lang::config::FsConfig;
use brew_lang::sandbox::{Sandbox, SandboxError};

fn sandbox_in(dir: &std::path::Path, max_file_size: usize) -> Sandbox {
    let config = FsConfig {
        allowed_paths: vec![dir.to_path_buf()],
        max_file_size,
    };
    Sandbox::new(&config).expect("sandbox setup failed")
}

#[test]
fn test_write_then_read_round_trip() {
    let root = tempfile::tempdir().expect("tempdir failed");
    let sandbox = sandbox_in(root.path(), 1024);

    sandbox.write("note.txt", "hello").expect("write failed");
    assert_eq!(sandbox.read("note.txt").expect("read failed"), "hello");
}

#[test]
fn test_append_creates_and_extends() {
    let root = tempfile::tempdir().expect("tempdir failed");
    let sandbox = sandbox_in(root.path(), 1024);

    sandbox.append("log.txt", "one\n").expect("append failed");
    sandbox.append("log.txt", "two\n").expect("append failed");
    assert_eq!(sandbox.read("log.txt").expect("read failed"), "one\ntwo\n");
}

#[test]
fn test_absolute_and_traversal_paths_are_refused() {
    let root = tempfile::tempdir().expect("tempdir failed");
    let sandbox = sandbox_in(root.path(), 1024);

    assert!(matches!(
        sandbox.read("/etc/passwd"),
        Err(SandboxError::PathNotAllowed(_))
    ));
    assert!(matches!(
        sandbox.write("../escape.txt", "x"),
        Err(SandboxError::PathNotAllowed(_))
    ));
}

#[test]
fn test_missing_file_is_not_found() {
    let root = tempfile::tempdir().expect("tempdir failed");
    let sandbox = sandbox_in(root.path(), 1024);

    assert!(matches!(
        sandbox.read("nothing.txt"),
        Err(SandboxError::FileNotFound(_))
    ));
}

#[test]
fn test_size_cap_applies_to_writes_and_appends() {
    let root = tempfile::tempdir().expect("tempdir failed");
    let sandbox = sandbox_in(root.path(), 8);

    assert!(matches!(
        sandbox.write("big.txt", "123456789"),
        Err(SandboxError::FileTooLarge(_))
    ));
    sandbox.append("grow.txt", "12345").expect("append failed");
    assert!(matches!(
        sandbox.append("grow.txt", "6789"),
        Err(SandboxError::FileTooLarge(_))
    ));
}

#[test]
fn test_reads_fall_through_multiple_roots() {
    let first = tempfile::tempdir().expect("tempdir failed");
    let second = tempfile::tempdir().expect("tempdir failed");
    std::fs::write(second.path().join("shared.txt"), "from second").expect("seed failed");

    let config = FsConfig {
        allowed_paths: vec![first.path().to_path_buf(), second.path().to_path_buf()],
        max_file_size: 1024,
    };
    let sandbox = Sandbox::new(&config).expect("sandbox setup failed");

    assert_eq!(
        sandbox.read("shared.txt").expect("read failed"),
        "from second"
    );
    // Writes land in the first root only.
    sandbox.write("fresh.txt", "new").expect("write failed");
    assert!(first.path().join("fresh.txt").exists());
    assert!(!second.path().join("fresh.txt").exists());
}

#[test]
fn test_file_builtins_drive_the_sandbox() {
    let root = tempfile::tempdir().expect("tempdir failed");
    set_sandbox_storage(sandbox_in(root.path(), 1024));

    let globals = default_globals();
    brew_lang::run(
        concat!(
            "file.write(\"out.txt\", \"line1\\n\");\n",
            "file.append(\"out.txt\", \"line2\\n\");\n",
            "obj contents = file.read(\"out.txt\");\n",
        ),
        &globals,
    )
    .expect("program failed");

    assert_eq!(
        globals.get("contents").map(|v| v.to_string()),
        Some("line1\nline2\n".to_string())
    );
}

#[test]
fn test_file_builtins_report_sandbox_errors_as_runtime_errors() {
    let root = tempfile::tempdir().expect("tempdir failed");
    set_sandbox_storage(sandbox_in(root.path(), 1024));

    let globals = default_globals();
    let err = brew_lang::run("file.read(\"/etc/passwd\");", &globals)
        .expect_err("read should have failed");
    assert!(err.to_string().contains("Access denied"));
}
