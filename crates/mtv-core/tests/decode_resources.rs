//! Decoding of realistic controller-written resources.

use mtv_core::{most_severe_category, Migration, Plan, StatusCategory};

const PLAN_YAML: &str = r#"
apiVersion: forklift.konveyor.io/v1beta1
kind: Plan
metadata:
  name: plan-warm
  namespace: openshift-mtv
  uid: 7f1c
  creationTimestamp: "2026-01-15T09:00:00Z"
spec:
  warm: true
  targetNamespace: demo
  provider:
    source: { name: vcenter, namespace: openshift-mtv }
    destination: { name: host, namespace: openshift-mtv }
  map:
    network: { name: plan-warm-network, namespace: openshift-mtv }
    storage: { name: plan-warm-storage, namespace: openshift-mtv }
  vms:
    - id: vm-1
      hooks:
        - hook: { name: pre, namespace: openshift-mtv }
          step: PreHook
    - name: db
status:
  conditions:
    - type: Ready
      category: Required
      status: "True"
      message: The migration plan is ready.
    - type: Executing
      category: Advisory
      status: "True"
      reason: Started
  migration:
    started: "2026-01-15T10:00:00Z"
    vms:
      - id: vm-1
        started: "2026-01-15T10:00:05Z"
        pipeline:
          - name: Initialize
            started: "2026-01-15T10:00:05Z"
            completed: "2026-01-15T10:00:09Z"
          - name: DiskTransfer
            started: "2026-01-15T10:00:09Z"
            progress: { completed: 512, total: 2048 }
          - name: Cutover
          - name: ImageConversion
"#;

#[test]
fn decodes_a_running_warm_plan() {
    let plan: Plan = serde_yaml::from_str(PLAN_YAML).unwrap();
    assert!(plan.spec.warm);
    assert_eq!(plan.spec.vms.len(), 2);
    assert_eq!(plan.spec.vms[0].hooks[0].step, "PreHook");
    assert_eq!(
        plan.spec.map.network.as_ref().map(|r| r.name.as_str()),
        Some("plan-warm-network")
    );
    let vms = plan.summary_vms().unwrap();
    assert_eq!(vms[0].pipeline.len(), 4);
    assert!(vms[0].pipeline[1].is_started());
    assert!(!vms[0].pipeline[1].is_completed());
    assert_eq!(
        most_severe_category(plan.conditions()),
        StatusCategory::Pending
    );
}

#[test]
fn decodes_migration_with_unknown_fields() {
    let migration: Migration = serde_json::from_value(serde_json::json!({
        "metadata": { "name": "m-1", "namespace": "openshift-mtv",
                      "creationTimestamp": "2026-01-15T09:59:00Z",
                      "resourceVersion": "42" },
        "spec": { "plan": { "name": "plan-warm", "namespace": "openshift-mtv" },
                  "cutover": "2026-01-15T12:00:00Z" },
        "status": { "started": "2026-01-15T10:00:00Z",
                    "observedGeneration": 3,
                    "vms": [{ "id": "vm-1", "warm": { "precopies": [] } }] }
    }))
    .unwrap();
    assert!(migration.started_at().is_some());
    assert!(migration.cutover_at().is_some());
    assert_eq!(migration.vms().len(), 1);
}
