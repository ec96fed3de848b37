use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("portico")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_help_shows_subcommands() {
    cargo_bin_cmd!("portico")
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("portico")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3"));
}

#[test]
fn test_config_check_fails_without_environment() {
    cargo_bin_cmd!("portico")
        .env_clear()
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PORTICO_AUTH_URL"));
}

#[test]
fn test_config_check_prints_endpoints() {
    cargo_bin_cmd!("portico")
        .env("PORTICO_AUTH_URL", "https://auth.example.com")
        .env("PORTICO_CLIENT_ID", "test-client-id")
        .env("PORTICO_REDIRECT_URI", "http://localhost:3000/auth/callback")
        .env("PORTICO_SCOPES", "openid,email,profile")
        .env("PORTICO_API_URI", "https://api.example.com")
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"))
        .stdout(predicate::str::contains("https://auth.example.com/oauth2/token"))
        .stdout(predicate::str::contains("openid email profile"));
}
