//! End-to-end on/off transitions against a real config file.

use notifications_types::Status;
use serde_json::json;

use crate::common::Sandbox;

#[test]
fn on_from_empty_sets_canonical_values_and_records_absence() {
    let sandbox = Sandbox::new();

    let outcome = sandbox.engine().apply_on();

    assert_eq!(outcome.status(), Status::Applied);
    assert_eq!(outcome.action(), "$notifications on");
    assert!(outcome.next_action().is_none());

    let config = sandbox.parsed_config();
    assert_eq!(config["notify"], sandbox.hook_value());
    let tui = config["tui"].as_table().expect("tui table");
    assert_eq!(
        tui["notifications"],
        toml::Value::Array(vec![toml::Value::String("approval-requested".into())])
    );
    assert_eq!(tui["notification_method"].as_str(), Some("bel"));

    let snapshot = sandbox.snapshot_json();
    assert_eq!(snapshot["version"], json!(1));
    assert_eq!(
        snapshot["config_path"],
        json!(sandbox.config.to_string_lossy())
    );
    assert!(snapshot["created_at"].is_string());
    for key in ["notify", "tui.notifications", "tui.notification_method"] {
        assert_eq!(snapshot["prior"][key], json!({ "present": false }), "{key}");
    }
}

#[test]
fn custom_values_survive_an_on_off_cycle() {
    let sandbox = Sandbox::new();
    let original = "\
model = \"gpt-5\"
notify = [\"notify-send\", \"Codex\"]

[tui]
notifications = [\"agent-turn-complete\"]
notification_method = \"osc9\"
";
    sandbox.write_config(original);

    let on = sandbox.engine().apply_on();
    assert_eq!(on.status(), Status::Applied);

    let snapshot = sandbox.snapshot_json();
    assert_eq!(
        snapshot["prior"]["notify"],
        json!({ "present": true, "value": ["notify-send", "Codex"] })
    );
    assert_eq!(
        snapshot["prior"]["tui.notifications"],
        json!({ "present": true, "value": ["agent-turn-complete"] })
    );
    assert_eq!(
        snapshot["prior"]["tui.notification_method"],
        json!({ "present": true, "value": "osc9" })
    );
    assert_eq!(sandbox.parsed_config()["model"].as_str(), Some("gpt-5"));

    let off = sandbox.engine().apply_off();
    assert_eq!(off.status(), Status::Applied);
    assert_eq!(sandbox.read_config(), original);
    assert!(!sandbox.snapshot.exists());
}

#[test]
fn off_removes_keys_that_were_absent_before_on() {
    let sandbox = Sandbox::new();
    sandbox.write_config("model = \"gpt-5\"\n\n[tui]\nanimations = false\n");

    assert_eq!(sandbox.engine().apply_on().status(), Status::Applied);
    assert_eq!(sandbox.engine().apply_off().status(), Status::Applied);

    let config = sandbox.parsed_config();
    assert!(config.get("notify").is_none());
    let tui = config["tui"].as_table().expect("tui table");
    assert!(tui.get("notifications").is_none());
    assert!(tui.get("notification_method").is_none());
    assert_eq!(tui["animations"].as_bool(), Some(false));
}

#[test]
fn comments_and_unrelated_sections_are_preserved() {
    let sandbox = Sandbox::new();
    let original = "\
# global settings
model = \"gpt-5\" # pinned

[profiles.dev]
model = \"o3\"   # keep spacing
approval_policy = \"never\"

[tui]
# how alerts are delivered
notification_method = \"auto\"
";
    sandbox.write_config(original);

    assert_eq!(sandbox.engine().apply_on().status(), Status::Applied);
    let during = sandbox.read_config();
    assert!(during.contains("# global settings\nmodel = \"gpt-5\" # pinned\n"));
    assert!(during.contains("[profiles.dev]\nmodel = \"o3\"   # keep spacing\n"));
    assert!(during.contains("# how alerts are delivered\n"));

    assert_eq!(sandbox.engine().apply_off().status(), Status::Applied);
    assert_eq!(sandbox.read_config(), original);
}

#[test]
fn missing_config_directory_is_created() {
    let sandbox = Sandbox::new();
    let nested = sandbox.root().join("fresh").join("home").join("config.toml");

    let outcome = sandbox.engine_for(&nested).apply_on();

    assert_eq!(outcome.status(), Status::Applied);
    assert!(nested.exists());
    assert!(nested.with_file_name("snapshot.json").exists());
}

#[test]
fn malformed_config_fails_without_touching_anything() {
    let sandbox = Sandbox::new();
    sandbox.write_config("model = \n");

    let outcome = sandbox.engine().apply_on();

    assert_eq!(outcome.status(), Status::Failed);
    assert!(outcome.rationale().contains("Failed to parse config TOML"));
    assert!(outcome.next_action().is_some());
    assert_eq!(sandbox.read_config(), "model = \n");
    assert!(!sandbox.snapshot.exists());
}

#[test]
fn empty_tui_header_survives_a_cycle() {
    let sandbox = Sandbox::new();
    let original = "model = \"gpt-5\"\n\n[tui]\n";
    sandbox.write_config(original);

    assert_eq!(sandbox.engine().apply_on().status(), Status::Applied);
    assert_eq!(sandbox.engine().apply_off().status(), Status::Applied);

    assert_eq!(sandbox.read_config(), original);
    assert!(sandbox.parsed_config()["tui"].as_table().is_some());
}

#[test]
fn implied_tui_table_gets_no_lasting_header() {
    let sandbox = Sandbox::new();
    let original = "model = \"gpt-5\"\n\n[tui.theme]\nname = \"x\"\n";
    sandbox.write_config(original);

    assert_eq!(sandbox.engine().apply_on().status(), Status::Applied);
    assert!(sandbox.read_config().contains("\n[tui]\n"));
    assert_eq!(sandbox.engine().apply_off().status(), Status::Applied);

    assert_eq!(sandbox.read_config(), original);
}

#[test]
fn missing_final_newline_is_preserved() {
    let sandbox = Sandbox::new();
    let original = "model = \"gpt-5\"";
    sandbox.write_config(original);

    assert_eq!(sandbox.engine().apply_on().status(), Status::Applied);
    assert!(!sandbox.read_config().ends_with('\n'));
    assert_eq!(sandbox.engine().apply_off().status(), Status::Applied);

    assert_eq!(sandbox.read_config(), original);
}
