use std::net::TcpListener;
use std::process::{Command, Output};

const CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/config.toml");

fn run_cli(api_url: &str, args: &[&str]) -> std::io::Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_parking-finder"))
        .env("PARKING_API_URL", api_url)
        .arg("--config")
        .arg(CONFIG)
        .args(args)
        .output()
}

fn closed_port_url() -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

#[test]
fn blank_search_exits_with_failure() -> std::io::Result<()> {
    let output = run_cli(&closed_port_url()?, &["search", "   "])?;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).is_empty());
    Ok(())
}

#[test]
fn unreachable_backend_fails_prediction() -> std::io::Result<()> {
    let output = run_cli(
        &closed_port_url()?,
        &[
            "predict",
            "Stadio San Siro, Milano",
            "--at",
            "2026-10-18T20:30:00+02:00",
            "--duration",
            "120",
        ],
    )?;

    assert!(!output.status.success());
    Ok(())
}

#[test]
fn missing_config_file_fails_before_any_request() -> std::io::Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_parking-finder"))
        .arg("--config")
        .arg("config/does-not-exist.toml")
        .args(["search", "Piazza Duomo"])
        .output()?;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Config"));
    Ok(())
}
