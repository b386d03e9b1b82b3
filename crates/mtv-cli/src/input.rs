//! Resource file loading.
//!
//! Input files are YAML or JSON (JSON parses as YAML). A file holds a
//! single object, a bare list, or a `{items: [...]}` list as returned by
//! `kubectl get -o yaml`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use mtv_inventory::{flatten_inventory, InventoryProvider};
use serde::de::DeserializeOwned;
use serde_yaml::Value;

fn read_value(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn split_items(value: Value) -> Vec<Value> {
    match value {
        Value::Sequence(items) => items,
        Value::Mapping(mut map) => match map.remove("items") {
            Some(Value::Sequence(items)) => items,
            Some(Value::Null) => Vec::new(),
            Some(other) => {
                map.insert(Value::from("items"), other);
                vec![Value::Mapping(map)]
            }
            None => vec![Value::Mapping(map)],
        },
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Load every object in `path`.
pub fn load_objects<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    split_items(read_value(path)?)
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_yaml::from_value(item)
                .with_context(|| format!("{}: item {i} has an unexpected shape", path.display()))
        })
        .collect()
}

/// Load the single object in `path`.
pub fn load_one<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut objects = load_objects::<T>(path)?;
    match objects.len() {
        1 => Ok(objects.remove(0)),
        n => bail!("{} holds {n} objects, expected exactly one", path.display()),
    }
}

/// Load a provider inventory, either flat or grouped by provider type
/// (`{vsphere: [...], openshift: [...]}`).
pub fn load_inventory(path: &Path) -> Result<Vec<InventoryProvider>> {
    let value = read_value(path)?;
    let grouped = matches!(&value, Value::Mapping(map)
        if !map.is_empty()
            && !map.contains_key("items")
            && map.values().all(|v| matches!(v, Value::Sequence(_))));
    if grouped {
        let groups: BTreeMap<String, Vec<InventoryProvider>> = serde_yaml::from_value(value)
            .with_context(|| format!("{}: unexpected inventory shape", path.display()))?;
        return Ok(flatten_inventory(groups));
    }
    split_items(value)
        .into_iter()
        .map(|item| {
            serde_yaml::from_value(item)
                .with_context(|| format!("{}: unexpected provider shape", path.display()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtv_core::Plan;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_single_list_and_items() {
        let dir = tempfile::tempdir().unwrap();
        let single = write(&dir, "one.yaml", "metadata:\n  name: a\n");
        let list = write(&dir, "list.yaml", "- metadata: {name: a}\n- metadata: {name: b}\n");
        let items = write(
            &dir,
            "items.json",
            r#"{"kind": "PlanList", "items": [{"metadata": {"name": "a"}}]}"#,
        );
        assert_eq!(load_objects::<Plan>(&single).unwrap().len(), 1);
        assert_eq!(load_objects::<Plan>(&list).unwrap().len(), 2);
        let plans = load_objects::<Plan>(&items).unwrap();
        assert_eq!(plans[0].metadata.name.as_deref(), Some("a"));
    }

    #[test]
    fn load_one_rejects_lists() {
        let dir = tempfile::tempdir().unwrap();
        let list = write(&dir, "list.yaml", "- metadata: {name: a}\n- metadata: {name: b}\n");
        let err = load_one::<Plan>(&list).unwrap_err();
        assert!(err.to_string().contains("expected exactly one"));
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_objects::<Plan>(Path::new("/nonexistent/plans.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/plans.yaml"));
    }

    #[test]
    fn inventory_grouped_or_flat() {
        let dir = tempfile::tempdir().unwrap();
        let grouped = write(
            &dir,
            "grouped.json",
            r#"{"vsphere": [{"name": "vc", "namespace": "mtv", "type": "vsphere"}],
                "openshift": [{"name": "host", "namespace": "mtv", "type": "openshift"}]}"#,
        );
        let flat = write(&dir, "flat.yaml", "- {name: vc, namespace: mtv, type: vsphere}\n");
        assert_eq!(load_inventory(&grouped).unwrap().len(), 2);
        assert_eq!(load_inventory(&flat).unwrap()[0].name, "vc");
    }
}
