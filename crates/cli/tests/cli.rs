use std::{
    fs::{create_dir_all, read_to_string, write},
    path::Path,
};

use iconsmith_cli::{
    Project,
    cli::ProjectArgs,
    commands::{build, clean},
};
use tempfile::TempDir;

const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16"><path d="M2 2H14V14H2Z"/></svg>"#;

const PROJECT: &str = r#"
[defaults]
dest = "out"
types = ["woff", "ttf"]
autohint = false

[targets.icons]
src = "icons/*.svg"

[targets.admin]
font = "admin"
src = "admin/**/*.svg"
rename = "path"
html_demo = false
"#;

fn project_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in ["icons/home.svg", "icons/search.svg", "admin/arrows/left.svg", "admin/gear.svg"] {
        let path = dir.path().join(name);
        create_dir_all(path.parent().unwrap()).unwrap();
        write(path, SQUARE).unwrap();
    }
    write(dir.path().join("iconsmith.toml"), PROJECT).unwrap();
    dir
}

fn args(dir: &Path, targets: &[&str]) -> ProjectArgs {
    ProjectArgs {
        config: dir.join("iconsmith.toml"),
        cache_dir: None,
        targets: targets.iter().map(|t| t.to_string()).collect(),
    }
}

#[test]
fn test_build_and_clean_all_targets() {
    let dir = project_dir();
    let out = dir.path().join("out");

    build(&args(dir.path(), &[]), false, Some(2)).unwrap();

    let icons = read_to_string(out.join("icons.css")).unwrap();
    assert!(icons.contains(".icon_home:before"));
    assert!(icons.contains(".icon_search:before"));
    assert!(out.join("icons.html").exists());

    let admin = read_to_string(out.join("admin.css")).unwrap();
    assert!(admin.contains(".icon_arrows-left:before"));
    assert!(admin.contains(".icon_gear:before"));
    assert!(!out.join("admin.html").exists());

    let cache = dir.path().join(".iconsmith-cache/iconsmith");
    assert!(cache.join("icons/hash").is_file());
    assert!(cache.join("admin/hash").is_file());

    // Second run skips both targets and leaves outputs in place.
    build(&args(dir.path(), &[]), false, None).unwrap();
    assert_eq!(read_to_string(out.join("icons.css")).unwrap(), icons);

    clean(&args(dir.path(), &["icons"])).unwrap();
    assert!(!out.join("icons.css").exists());
    assert!(!cache.join("icons/hash").exists());
    assert!(out.join("admin.css").exists());
    assert!(cache.join("admin/hash").is_file());
}

#[test]
fn test_no_cache_writes_no_fingerprints() {
    let dir = project_dir();
    build(&args(dir.path(), &["icons"]), true, None).unwrap();
    assert!(dir.path().join("out/icons.css").exists());
    assert!(!dir.path().join(".iconsmith-cache").exists());
}

#[test]
fn test_unknown_target_fails() {
    let dir = project_dir();
    assert!(build(&args(dir.path(), &["missing"]), false, None).is_err());
}

#[test]
fn test_target_without_sources_fails() {
    let dir = project_dir();
    write(
        dir.path().join("iconsmith.toml"),
        "[targets.empty]\ndest = \"out\"\nsrc = \"nothing/*.svg\"\n",
    )
    .unwrap();
    assert!(build(&args(dir.path(), &[]), false, None).is_err());
}

#[test]
fn test_project_loads_sources_in_order() {
    let dir = project_dir();
    let project = Project::load(&dir.path().join("iconsmith.toml")).unwrap();
    let target = project.target("admin").unwrap();
    let names: Vec<_> = target.sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["arrows-left", "gear"]);
}
