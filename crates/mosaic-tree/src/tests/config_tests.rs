use crate::config::TreeConfig;

#[test]
fn layout_config_follows_tree_switches() {
    let config = TreeConfig::default().with_cached_measurements(false);
    assert!(config.layout_config().generate_diff_tree);
    assert!(!config.layout_config().use_cached_measurements);

    let without_diff = TreeConfig::default().with_diff_tree(false);
    assert!(!without_diff.layout_config().use_cached_measurements);
    assert!(without_diff.incremental_mount);
}
