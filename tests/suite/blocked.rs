//! Permission blocks must leave every file exactly as it was.
#![cfg(unix)]

use std::fs;

use notifications_types::Status;

use crate::common::{Sandbox, make_read_only, restore_writable};

#[test]
fn read_only_directory_blocks_on_without_writes() {
    let sandbox = Sandbox::new();
    let home = sandbox.root().join("locked");
    fs::create_dir(&home).expect("mkdir");
    let config = home.join("config.toml");
    fs::write(&config, "model = \"gpt-5\"\n").expect("write config");
    let before = fs::metadata(&config).expect("metadata").modified().expect("mtime");

    if !make_read_only(&home) {
        return;
    }
    let outcome = sandbox.engine_for(&config).apply_on();
    let listing: Vec<_> = fs::read_dir(&home)
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    restore_writable(&home);

    assert_eq!(outcome.status(), Status::Blocked);
    assert!(outcome.rationale().starts_with("Global config access blocked"));
    let next = outcome.next_action().expect("next action");
    assert!(next.contains("sandbox_workspace_write.writable_roots"));
    assert_eq!(fs::read_to_string(&config).expect("read"), "model = \"gpt-5\"\n");
    assert_eq!(
        fs::metadata(&config).expect("metadata").modified().expect("mtime"),
        before
    );
    assert_eq!(listing, vec![std::ffi::OsString::from("config.toml")]);
}

#[test]
fn read_only_parent_blocks_directory_creation() {
    let sandbox = Sandbox::new();
    let parent = sandbox.root().join("locked");
    fs::create_dir(&parent).expect("mkdir");
    let config = parent.join("codex").join("config.toml");

    if !make_read_only(&parent) {
        return;
    }
    let outcome = sandbox.engine_for(&config).apply_off();
    let created = config.parent().expect("parent").exists();
    restore_writable(&parent);

    assert_eq!(outcome.status(), Status::Blocked);
    assert!(!created);
}

#[test]
fn unreadable_config_blocks() {
    use std::os::unix::fs::PermissionsExt;

    let sandbox = Sandbox::new();
    sandbox.write_config("model = \"gpt-5\"\n");
    fs::set_permissions(&sandbox.config, fs::Permissions::from_mode(0o000)).expect("chmod");
    if fs::read(&sandbox.config).is_ok() {
        return;
    }

    let outcome = sandbox.engine().apply_on();
    fs::set_permissions(&sandbox.config, fs::Permissions::from_mode(0o600)).expect("chmod");

    assert_eq!(outcome.status(), Status::Blocked);
    assert!(!sandbox.snapshot.exists());
    assert_eq!(sandbox.read_config(), "model = \"gpt-5\"\n");
}
