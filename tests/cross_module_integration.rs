mod helpers;

use helpers::{credentials, StubTransport};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use vibe::config::Config;
use vibe::context::{self, Selection};
use vibe::generate::{self, GenOptions, MergeOutcome};
use vibe::render::Output;

const CONFIG: &str = r#"
[http]
timeout_seconds = 5

[[providers]]
kind = "chat-completions"
name = "Local A"
model = "a"
api_key_env = "A_KEY"
endpoint = "stub://a"

[[providers]]
kind = "anthropic-messages"
name = "Local B"
model = "b"
api_key_env = "B_KEY"
endpoint = "stub://b"

[merge]
kind = "openai-responses"
name = "Merger"
model = "m"
api_key_env = "A_KEY"
endpoint = "stub://merge"
"#;

/// Config file -> providers -> fan-out -> merge, all through the public API
#[tokio::test]
async fn test_configured_providers_drive_gen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, CONFIG).unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.timeout().as_secs(), 5);

    let options = GenOptions {
        providers: config.build_providers(),
        merge: config.merge.build(),
        output: Output::raw(),
    };

    let transport = Arc::new(
        StubTransport::new()
            .reply("stub://a", 200, r#"{"choices":[{"message":{"content":"from a"}}]}"#)
            .reply("stub://b", 200, r#"{"content":[{"text":"from b"}]}"#)
            .reply(
                "stub://merge",
                200,
                r#"{"output":[{"content":[{"text":"a and b"}]}]}"#,
            ),
    );

    let mut out = Vec::new();
    let mut err = Vec::new();
    let report = generate::run(
        &options,
        Arc::from("prompt"),
        Arc::clone(&transport) as Arc<dyn vibe::Transport>,
        credentials(&["A_KEY", "B_KEY"]),
        &mut out,
        &mut err,
    )
    .await
    .unwrap();

    assert_eq!(report.successes.len(), 2);
    assert!(matches!(report.merge, MergeOutcome::Merged(ref text) if text == "a and b"));

    let merge_call = transport
        .calls()
        .into_iter()
        .find(|call| call.endpoint == "stub://merge")
        .unwrap();
    assert_eq!(merge_call.payload["model"], "m");
    let input = merge_call.payload["input"].as_str().unwrap();
    assert!(input.contains("=== Local A Response ===\nfrom a"));
    assert!(input.contains("=== Local B Response ===\nfrom b"));

    let auth = transport
        .calls()
        .into_iter()
        .find(|call| call.endpoint == "stub://b")
        .unwrap()
        .headers;
    assert!(auth.contains(&("x-api-key".to_string(), "key-for-B_KEY".to_string())));
}

/// Directory walk feeds the show listing
#[test]
fn test_collected_files_render_in_order() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("pkg")).unwrap();
    fs::write(dir.path().join("main.go"), "package main").unwrap();
    fs::write(dir.path().join("pkg/util.go"), "package pkg").unwrap();
    fs::write(dir.path().join("main_test.go"), "package main").unwrap();

    let root = context::resolve_dir(dir.path()).unwrap();
    let collected = context::collect(&root, Selection::Show { unfiltered: false });

    let mut out = Vec::new();
    vibe::cli::write_listing(&collected.files, &Output::raw(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let main = text.find("main.go\n\npackage main").unwrap();
    let util = text.find("util.go\n\npackage pkg").unwrap();
    assert!(main < util);
    assert!(!text.contains("main_test.go"));
    assert_eq!(text.matches("---\n").count(), 2);
}
