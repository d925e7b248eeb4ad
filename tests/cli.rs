//! Binary-level tests against the bundled `content_types/` declarations

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn samples() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("content_types")
}

fn brawo() -> Command {
    let mut cmd = Command::cargo_bin("brawo").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("BRAWO_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--dir")
        .arg(samples());
    cmd
}

#[test]
fn check_accepts_bundled_samples() {
    brawo()
        .args(["check", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ blog_posts"))
        .stdout(predicate::str::contains("5 content type(s) servable"));
}

#[test]
fn check_fails_on_route_collision() {
    let dir = TempDir::new().unwrap();
    for slug in ["news", "posts"] {
        std::fs::write(
            dir.path().join(format!("{slug}_type.toml")),
            format!(
                "slug = \"{slug}\"\n[routes]\narchive = \"/blog\"\n[[fields]]\nname = \"title\"\ntype = \"string\"\n"
            ),
        )
        .unwrap();
    }

    Command::cargo_bin("brawo")
        .unwrap()
        .env("NO_COLOR", "1")
        .arg("--dir")
        .arg(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Route path '/blog' is already used by 'news'"));
}

#[test]
fn check_fails_when_slugs_share_a_table() {
    let dir = TempDir::new().unwrap();
    for (file, slug) in [("team_dash", "team-members"), ("team_snake", "team_members")] {
        std::fs::write(
            dir.path().join(format!("{file}_type.toml")),
            format!("slug = \"{slug}\"\n[[fields]]\nname = \"name\"\ntype = \"string\"\n"),
        )
        .unwrap();
    }

    Command::cargo_bin("brawo")
        .unwrap()
        .env("NO_COLOR", "1")
        .arg("--dir")
        .arg(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Table 'team_members' is already derived from 'team-members'",
        ));
}

#[test]
fn ddl_uses_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("brawo.toml");
    std::fs::write(&config, "database = \"sqlite\"\ntable_prefix = \"cms_\"\n").unwrap();

    brawo()
        .arg("--config")
        .arg(&config)
        .args(["ddl", "--type", "faqs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-- SQLite / Dedicated table"))
        .stdout(predicate::str::contains("CREATE TABLE IF NOT EXISTS cms_faqs"));
}

#[test]
fn ddl_json_layout_prints_shared_table() {
    brawo()
        .args(["ddl", "--layout", "json_column"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE IF NOT EXISTS brawo_cms_contents"))
        .stdout(predicate::str::contains("blog_posts").count(1));
}

#[test]
fn routes_lists_archive_and_single_pages() {
    brawo()
        .arg("routes")
        .assert()
        .success()
        .stdout(predicate::str::contains("/blog/:slug"))
        .stdout(predicate::str::contains("team_members_archive"));
}

#[test]
fn fields_describes_a_content_type() {
    brawo()
        .args(["fields", "products"])
        .assert()
        .success()
        .stdout(predicate::str::contains("features"))
        .stdout(predicate::str::contains("repeater"));

    brawo()
        .args(["fields", "blog_posts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unregistered, handled as string"));
}

#[test]
fn unknown_content_type_fails() {
    brawo()
        .args(["fields", "widgets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("widgets"));
}
