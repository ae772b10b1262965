use super::*;

#[test]
fn missing_file_yields_defaults() -> Result<()> {
    let tmp = tempfile::tempdir().context("create tempdir")?;
    let cfg = ViewerConfig::load(&tmp.path().join("nope.json"))?;
    assert_eq!(cfg, ViewerConfig::default());
    assert_eq!(cfg.revset, DEFAULT_REVSET);
    Ok(())
}

#[test]
fn partial_file_fills_in_defaults() -> Result<()> {
    let tmp = tempfile::tempdir().context("create tempdir")?;
    let path = tmp.path().join(CONFIG_FILE_NAME);
    fs::write(&path, br#"{"revset": "::@", "ignore_immutable": true}"#)?;

    let cfg = ViewerConfig::load(&path)?;
    assert_eq!(cfg.revset, "::@");
    assert!(cfg.ignore_immutable);
    assert_eq!(cfg.refresh_interval_ms, 3000);
    assert_eq!(cfg.jj_binary, "jj");
    Ok(())
}

#[test]
fn saved_values_load_back() -> Result<()> {
    let tmp = tempfile::tempdir().context("create tempdir")?;
    let path = ViewerConfig::default_path(tmp.path());

    let cfg = ViewerConfig {
        refresh_interval_ms: 0,
        log_file: Some(PathBuf::from("/tmp/jjdag.log")),
        ..ViewerConfig::default()
    };
    fs::create_dir_all(tmp.path().join(".jj"))?;
    fs::write(&path, serde_json::to_vec_pretty(&cfg)?)?;

    assert_eq!(ViewerConfig::load(&path)?, cfg);
    Ok(())
}

#[test]
fn malformed_file_is_an_error() -> Result<()> {
    let tmp = tempfile::tempdir().context("create tempdir")?;
    let path = tmp.path().join(CONFIG_FILE_NAME);
    fs::write(&path, b"{ not json")?;

    let err = ViewerConfig::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("parse"));
    Ok(())
}

#[test]
fn unknown_version_is_rejected() -> Result<()> {
    let tmp = tempfile::tempdir().context("create tempdir")?;
    let path = tmp.path().join(CONFIG_FILE_NAME);
    fs::write(&path, br#"{"version": 7}"#)?;

    assert!(ViewerConfig::load(&path).is_err());
    Ok(())
}

#[test]
fn discovery_walks_up_to_the_workspace_root() -> Result<()> {
    let tmp = tempfile::tempdir().context("create tempdir")?;
    let root = tmp.path().join("repo");
    let nested = root.join("src").join("deep");
    fs::create_dir_all(root.join(".jj"))?;
    fs::create_dir_all(&nested)?;

    assert_eq!(ViewerConfig::discover(&nested), ViewerConfig::default_path(&root));
    assert_eq!(ViewerConfig::discover(&root), ViewerConfig::default_path(&root));
    Ok(())
}

#[test]
fn discovery_outside_a_workspace_uses_the_start_dir() -> Result<()> {
    let tmp = tempfile::tempdir().context("create tempdir")?;
    let lonely = tmp.path().join("lonely");
    fs::create_dir_all(&lonely)?;
    // Only meaningful when no ancestor of the temp dir is a jj workspace.
    if !tmp.path().ancestors().any(|d| d.join(".jj").is_dir()) {
        assert_eq!(ViewerConfig::discover(&lonely), ViewerConfig::default_path(&lonely));
    }
    Ok(())
}
