//! Status derivation end to end: plan, migration and inventory files in,
//! classified rows out.

use std::path::PathBuf;

use mtv_cli::input::{load_inventory, load_objects};
use mtv_cli::status::{build_rows, render_table};
use mtv_core::{Migration, Plan, Timestamp};
use mtv_state::{PlanState, PrimaryAction};

const PLANS: &str = r#"
apiVersion: v1
kind: List
items:
  - metadata: {name: warm-db, namespace: mtv, uid: u-warm}
    spec:
      warm: true
      provider:
        source: {name: vcenter, namespace: mtv}
        destination: {name: host, namespace: mtv}
      vms: [{id: vm-1}]
    status:
      conditions:
        - {type: Ready, status: "True", category: Required}
  - metadata: {name: cold-web, namespace: mtv, uid: u-cold}
    spec:
      provider:
        source: {name: vcenter, namespace: mtv}
        destination: {name: host, namespace: mtv}
      vms: [{id: vm-2}, {id: vm-3}]
    status:
      conditions:
        - {type: Ready, status: "True", category: Required}
  - metadata: {name: retired, namespace: mtv}
    spec: {archived: true}
"#;

const MIGRATIONS: &str = r#"
- metadata: {name: warm-db-abc, namespace: mtv, creationTimestamp: "2024-05-01T09:00:00Z"}
  spec:
    plan: {name: warm-db, namespace: mtv, uid: u-warm}
    cutover: "2024-05-01T12:00:00Z"
  status:
    started: "2024-05-01T09:00:00Z"
    vms:
      - id: vm-1
        started: "2024-05-01T09:00:00Z"
        pipeline:
          - {name: Initialize, started: "2024-05-01T09:00:00Z", completed: "2024-05-01T09:01:00Z"}
          - {name: DiskTransfer, started: "2024-05-01T09:01:00Z"}
          - {name: Cutover}
"#;

const INVENTORY: &str = r#"{
  "vsphere": [{"name": "vcenter", "namespace": "mtv", "uid": "p1"}],
  "openshift": [{"name": "host", "namespace": "mtv", "uid": "p2"}]
}"#;

fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn classifies_plans_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let plans: Vec<Plan> = load_objects(&write(&dir, "plans.yaml", PLANS)).unwrap();
    let migrations: Vec<Migration> =
        load_objects(&write(&dir, "migrations.yaml", MIGRATIONS)).unwrap();
    let inventory = load_inventory(&write(&dir, "inventory.json", INVENTORY)).unwrap();
    assert_eq!(plans.len(), 3);
    assert_eq!(inventory.len(), 2);

    let now = Timestamp::parse("2024-05-01T10:00:00Z").unwrap();
    let rows = build_rows(&plans, &migrations, Some(&inventory), now);

    let cold = &rows[1];
    assert_eq!(cold.state, PlanState::NotStartedReady);
    assert_eq!(cold.actions.primary, Some(PrimaryAction::Start));
    assert_eq!(cold.attempts, 0);
    assert_eq!(cold.source, "vcenter (vsphere)");
    assert_eq!(cold.target, "host (openshift)");

    let warm = &rows[0];
    assert_eq!(warm.attempts, 1);
    assert!(!warm.state.is_not_started());
    assert!(warm.cutover.is_some());

    assert_eq!(rows[2].state, PlanState::Archiving);

    let table = render_table(&rows);
    assert!(table.lines().next().unwrap().starts_with("NAME"));
    assert!(table.contains("cold-web"));
}
