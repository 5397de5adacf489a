use std::fs;

use notifications_types::Status;

use crate::common::Sandbox;

#[test]
fn second_on_is_a_no_op() {
    let sandbox = Sandbox::new();
    sandbox.write_config("model = \"gpt-5\"\n");

    assert_eq!(sandbox.engine().apply_on().status(), Status::Applied);
    let config_after_first = sandbox.read_config();
    let snapshot_after_first = fs::read(&sandbox.snapshot).expect("snapshot");

    let second = sandbox.engine().apply_on();

    assert_eq!(second.status(), Status::AlreadyApplied);
    assert_eq!(sandbox.read_config(), config_after_first);
    assert_eq!(
        fs::read(&sandbox.snapshot).expect("snapshot"),
        snapshot_after_first
    );
}

#[test]
fn second_off_is_a_no_op() {
    let sandbox = Sandbox::new();
    sandbox.write_config("model = \"gpt-5\"\n\n[tui]\nnotification_method = \"osc9\"\n");

    assert_eq!(sandbox.engine().apply_on().status(), Status::Applied);
    assert_eq!(sandbox.engine().apply_off().status(), Status::Applied);
    let after_first = sandbox.read_config();

    let second = sandbox.engine().apply_off();

    assert_eq!(second.status(), Status::AlreadyApplied);
    assert_eq!(sandbox.read_config(), after_first);
    assert!(!sandbox.snapshot.exists());
}

#[test]
fn equivalent_formatting_counts_as_already_on() {
    let sandbox = Sandbox::new();
    let hook = sandbox.hook.display();
    let original = format!(
        "notify = [ 'python3',\n  \"{hook}\" ]\n\n[tui]\nnotifications = [ \"approval-requested\" ]\nnotification_method = 'bel'\n"
    );
    sandbox.write_config(&original);

    let outcome = sandbox.engine().apply_on();

    assert_eq!(outcome.status(), Status::AlreadyApplied);
    assert_eq!(sandbox.read_config(), original);
    assert!(!sandbox.snapshot.exists());
}

#[test]
fn near_miss_values_are_not_treated_as_on() {
    let sandbox = Sandbox::new();
    let hook = sandbox.hook.display();
    sandbox.write_config(&format!(
        "notify = [\"python3\", \"{hook}\"]\n\n[tui]\nnotifications = [\"approval-requested\", \"agent-turn-complete\"]\nnotification_method = \"bel\"\n"
    ));

    let outcome = sandbox.engine().apply_on();

    assert_eq!(outcome.status(), Status::Applied);
    let snapshot = sandbox.snapshot_json();
    assert_eq!(
        snapshot["prior"]["tui.notifications"]["value"],
        serde_json::json!(["approval-requested", "agent-turn-complete"])
    );
}

#[test]
fn orphaned_snapshot_after_interrupted_on_is_harmless() {
    let sandbox = Sandbox::new();
    sandbox.write_config("model = \"gpt-5\"\n");

    // Simulate a crash between the snapshot write and the config write.
    assert_eq!(sandbox.engine().apply_on().status(), Status::Applied);
    let snapshot = fs::read(&sandbox.snapshot).expect("snapshot");
    sandbox.write_config("model = \"gpt-5\"\n");

    let off = sandbox.engine().apply_off();
    assert_eq!(off.status(), Status::AlreadyApplied);
    assert_eq!(sandbox.read_config(), "model = \"gpt-5\"\n");
    assert!(!sandbox.snapshot.exists());

    fs::write(&sandbox.snapshot, snapshot).expect("rewrite snapshot");
    assert_eq!(sandbox.engine().apply_off().status(), Status::AlreadyApplied);
}

#[test]
fn second_off_keeps_restored_approval_settings() {
    let sandbox = Sandbox::new();
    let original =
        "[tui]\nnotifications = [\"approval-requested\"]\nnotification_method = \"bel\"\n";
    sandbox.write_config(original);

    assert_eq!(sandbox.engine().apply_on().status(), Status::Applied);
    assert_eq!(sandbox.engine().apply_off().status(), Status::Applied);
    assert_eq!(sandbox.read_config(), original);

    let second = sandbox.engine().apply_off();

    assert_eq!(second.status(), Status::AlreadyApplied);
    assert_eq!(sandbox.read_config(), original);
}
