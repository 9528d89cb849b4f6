use ewaste_config::{MergePolicy, load_file, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

#[test]
fn empty_document_yields_defaults() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults should pass");
    assert_eq!(cfg.training.n_estimators, 200);
    assert_eq!(cfg.generator.samples, 1000);
    assert_eq!(cfg.generator.seed, 42);
    assert_eq!(cfg.server.port, 8000);
    assert_eq!(cfg.service.merge_policy, MergePolicy::Explicit);
}

#[test]
fn accepts_full_config() {
    let toml = r#"
[paths]
data = "/tmp/data.csv"
model = "/tmp/model.json"
static_dir = "web"

[generator]
samples = 250
seed = 7
reference_year = 2025

[training]
seed = 7
test_fraction = 0.25
n_estimators = 20
max_depth = 12
min_samples_split = 4
min_samples_leaf = 2
max_features = 0.5

[server]
bind = "127.0.0.1"
port = 9000

[service]
merge_policy = "legacy_sentinel"

[logging]
file = "logs/ewaste.log"
level = "debug"
rotation = "daily"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.service.merge_policy, MergePolicy::LegacySentinel);
    assert_eq!(cfg.training.max_depth, 12);
    assert_eq!(cfg.paths.static_dir.to_str(), Some("web"));
}

#[rstest]
#[case("[generator]\nsamples = 0", "generator.samples must be >= 1")]
#[case("[generator]\nreference_year = 1999", "reference_year must be > 2010")]
#[case("[training]\ntest_fraction = 0.0", "test_fraction must be in (0.0, 1.0)")]
#[case("[training]\ntest_fraction = 1.0", "test_fraction must be in (0.0, 1.0)")]
#[case("[training]\nn_estimators = 0", "n_estimators must be >= 1")]
#[case("[training]\nmin_samples_split = 1", "min_samples_split must be >= 2")]
#[case("[training]\nmin_samples_leaf = 0", "min_samples_leaf must be >= 1")]
#[case("[training]\nmax_features = 1.5", "max_features must be in (0.0, 1.0]")]
#[case("[server]\nbind = \"  \"", "server.bind must not be empty")]
#[case("[logging]\nrotation = \"weekly\"", "rotation must be one of")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "error '{err}' does not mention '{needle}'"
    );
}

#[test]
fn unknown_merge_policy_is_a_parse_error() {
    let err = load_toml("[service]\nmerge_policy = \"guess\"").expect_err("unknown variant");
    assert!(err.to_string().contains("unknown variant"));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let cfg = load_file(&dir.path().join("absent.toml")).expect("defaults");
    assert_eq!(cfg.training.test_fraction, 0.2);
}

#[test]
fn load_file_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    fs::write(&path, "[training]\nn_estimators = 0\n").unwrap();
    let err = load_file(&path).expect_err("validation should run");
    assert!(err.to_string().contains("n_estimators"));
}
