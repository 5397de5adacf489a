//! "off" without a usable snapshot.

use std::fs;

use notifications_types::Status;

use crate::common::Sandbox;

fn managed_config(sandbox: &Sandbox) -> String {
    format!(
        "model = \"gpt-5\" # keep\nnotify = [\"python3\", \"{}\"]\n\n[profiles.dev]\nmodel = \"o3\"\n\n[tui]\nanimations = true\nnotifications = [\"approval-requested\"]\nnotification_method = \"bel\"\n",
        sandbox.hook.display()
    )
}

#[test]
fn disables_only_managed_keys() {
    let sandbox = Sandbox::new();
    sandbox.write_config(&managed_config(&sandbox));

    let outcome = sandbox.engine().apply_off();

    assert_eq!(outcome.status(), Status::Applied);
    assert!(outcome.rationale().contains("without snapshot restore"));
    assert_eq!(
        sandbox.read_config(),
        "model = \"gpt-5\" # keep\n\n[profiles.dev]\nmodel = \"o3\"\n\n[tui]\nanimations = true\nnotifications = false\nnotification_method = \"bel\"\n"
    );
    assert!(!sandbox.snapshot.exists());
}

#[test]
fn foreign_notify_command_is_left_alone() {
    let sandbox = Sandbox::new();
    let original = "notify = [\"notify-send\", \"Codex\"]\n\n[tui]\nnotifications = true\n";
    sandbox.write_config(original);

    let outcome = sandbox.engine().apply_off();

    assert_eq!(outcome.status(), Status::AlreadyApplied);
    assert_eq!(sandbox.read_config(), original);
}

#[test]
fn fallback_is_idempotent() {
    let sandbox = Sandbox::new();
    sandbox.write_config(&managed_config(&sandbox));

    assert_eq!(sandbox.engine().apply_off().status(), Status::Applied);
    let after_first = sandbox.read_config();

    assert_eq!(
        sandbox.engine().apply_off().status(),
        Status::AlreadyApplied
    );
    assert_eq!(sandbox.read_config(), after_first);
}

#[test]
fn malformed_snapshot_is_reported_and_kept() {
    let sandbox = Sandbox::new();
    sandbox.write_config(&managed_config(&sandbox));
    fs::write(&sandbox.snapshot, "{not json").expect("write snapshot");

    let outcome = sandbox.engine().apply_off();

    assert_eq!(outcome.status(), Status::Applied);
    assert!(
        outcome.rationale().contains("(Snapshot format invalid:"),
        "{}",
        outcome.rationale()
    );
    assert!(!sandbox.read_config().contains("notify ="));
    assert_eq!(
        fs::read_to_string(&sandbox.snapshot).expect("snapshot"),
        "{not json"
    );
}

#[test]
fn snapshot_for_another_config_is_not_restored() {
    let sandbox = Sandbox::new();
    let other = sandbox.root().join("other").join("config.toml");
    fs::create_dir_all(other.parent().expect("parent")).expect("mkdir");
    fs::write(&other, "[tui]\nnotification_method = \"osc9\"\n").expect("write");

    let other_engine = sandbox.engine_for(&other);
    assert_eq!(other_engine.apply_on().status(), Status::Applied);
    fs::copy(other.with_file_name("snapshot.json"), &sandbox.snapshot).expect("copy");

    sandbox.write_config(&managed_config(&sandbox));
    let outcome = sandbox.engine().apply_off();

    assert_eq!(outcome.status(), Status::Applied);
    assert!(outcome.rationale().contains("different config"));
    assert!(!sandbox.read_config().contains("osc9"));
}

#[test]
fn unsupported_snapshot_version_falls_back() {
    let sandbox = Sandbox::new();
    sandbox.write_config(&managed_config(&sandbox));
    fs::write(
        &sandbox.snapshot,
        format!(
            "{{\"version\": 7, \"created_at\": \"2024-01-01T00:00:00Z\", \"config_path\": {:?}, \"prior\": {{}}}}",
            sandbox.config.to_string_lossy()
        ),
    )
    .expect("write snapshot");

    let outcome = sandbox.engine().apply_off();

    assert_eq!(outcome.status(), Status::Applied);
    assert!(outcome.rationale().contains("Snapshot version 7 is not supported"));
}
