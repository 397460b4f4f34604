use flowsmith::commands::{cli_help_lines, parse_cli_verb, run_cli, CliVerb};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Mutex;
use std::thread;
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn args(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| word.to_string()).collect()
}

/// Serves `expected_requests` connections with one fixed JSON body.
fn respond_with(expected_requests: usize, body: &str) -> (String, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let addr = listener.local_addr().expect("local addr");
    let body = body.to_string();
    let handle = thread::spawn(move || {
        for _ in 0..expected_requests {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read header");
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream
                .write_all(response.as_bytes())
                .expect("write response");
        }
    });
    (format!("http://{}", addr), handle)
}

#[test]
fn help_lists_every_verb() {
    let help = run_cli(Vec::new()).expect("help");
    for verb in ["flows", "show", "delete", "share", "clone", "open", "quota"] {
        assert!(help.contains(verb), "help should mention `{verb}`");
    }
}

#[test]
fn verbs_parse_into_typed_commands() {
    assert_eq!(parse_cli_verb(&args(&["flows"])).expect("flows"), CliVerb::Flows);
    assert_eq!(
        parse_cli_verb(&args(&["clone", "morning-energy"])).expect("clone"),
        CliVerb::Clone {
            slug: "morning-energy".to_string()
        }
    );
    assert_eq!(
        parse_cli_verb(&args(&["open", "?tab=saved&load=flow-1"])).expect("open"),
        CliVerb::Open {
            query: "?tab=saved&load=flow-1".to_string()
        }
    );
    assert_eq!(parse_cli_verb(&args(&["--help"])).expect("help"), CliVerb::Help);
}

#[test]
fn unknown_verbs_fail_before_any_settings_load() {
    let err = run_cli(args(&["explode"])).expect_err("unknown verb");
    assert!(err.contains("unknown command `explode`"));
}

#[test]
fn missing_values_are_reported_with_guidance() {
    let err = run_cli(args(&["clone"])).expect_err("missing slug");
    assert!(err.contains("requires a value"));
    assert!(err.contains("flowsmith help"));
}

#[test]
fn help_lines_match_run_cli_output() {
    assert_eq!(run_cli(args(&["help"])).expect("help"), cli_help_lines().join("\n"));
}

#[test]
fn missing_config_file_surfaces_a_read_error() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    let home = tempdir().expect("tempdir");
    let previous_home = std::env::var_os("HOME");
    std::env::set_var("HOME", home.path());

    let err = run_cli(args(&["flows"])).expect_err("no config");
    assert!(err.contains("failed to read file"));
    assert!(err.contains(".flowsmith/config.yaml"));

    match previous_home {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }
}

#[test]
fn flows_command_prints_key_value_lines() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    let home = tempdir().expect("tempdir");
    let list_body = serde_json::json!([
        {"id": "flow-1", "title": "Morning Energy", "items": []}
    ])
    .to_string();
    let (base_url, handle) = respond_with(1, &list_body);

    let config_dir = home.path().join(".flowsmith");
    std::fs::create_dir_all(&config_dir).expect("config dir");
    std::fs::write(
        config_dir.join("config.yaml"),
        format!("api_base_url: {base_url}\nauth_token: token-1\n"),
    )
    .expect("write config");

    let previous_home = std::env::var_os("HOME");
    std::env::set_var("HOME", home.path());

    let output = run_cli(args(&["flows"])).expect("flows");
    assert!(output.contains("flows=1"));
    assert!(output.contains("saved_quota=1/3"));
    assert!(output.contains("flow=flow-1 title=Morning Energy items=0"));

    match previous_home {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }
    handle.join().expect("join mock server");
}

#[test]
fn quota_command_reports_tier_and_caps() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    let home = tempdir().expect("tempdir");
    let config_dir = home.path().join(".flowsmith");
    std::fs::create_dir_all(&config_dir).expect("config dir");
    std::fs::write(
        config_dir.join("config.yaml"),
        "api_base_url: http://127.0.0.1:9\n",
    )
    .expect("write config");

    let previous_home = std::env::var_os("HOME");
    std::env::set_var("HOME", home.path());

    let output = run_cli(args(&["quota"])).expect("quota");
    assert!(output.contains("tier=guest"));
    assert!(output.contains("can_save=false"));
    assert!(output.contains("max_items_per_flow=6"));
    assert!(output.contains("max_saved_flows=0"));

    match previous_home {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }
}
