//! Editing, archiving and deleting existing plans.

use mtv_client::{InMemoryStore, ResourceKind, StoreOp};
use mtv_core::{Mapping, MappingPair, ObjectRef, Plan, VmRef};
use mtv_orchestrator::{
    HookInstance, HookStep, OrchestratorConfig, OrchestratorError, PlanForm, PlanOrchestrator,
    SagaStep,
};
use serde_json::json;

const NS: &str = "openshift-mtv";

fn hook_ref(name: &str, step: &str) -> serde_json::Value {
    json!({ "hook": { "name": name, "namespace": NS }, "step": step })
}

/// A store holding plan1, its two mappings, and hooks `keep` and `drop`.
fn seeded() -> (PlanOrchestrator<InMemoryStore>, Plan) {
    let store = InMemoryStore::new();
    let plan = json!({
        "apiVersion": "forklift.konveyor.io/v1beta1",
        "kind": "Plan",
        "metadata": { "name": "plan1", "namespace": NS, "uid": "plan-uid" },
        "spec": {
            "provider": {
                "source": { "name": "vcenter", "namespace": NS },
                "destination": { "name": "host", "namespace": NS }
            },
            "map": {
                "network": { "name": "plan1-net", "namespace": NS },
                "storage": { "name": "plan1-sto", "namespace": NS }
            },
            "vms": [
                {
                    "id": "vm-1",
                    "hooks": [hook_ref("keep", "PreHook"), hook_ref("drop", "PostHook")]
                }
            ]
        }
    });
    store.seed(ResourceKind::Plan, NS, plan.clone());
    store.seed(
        ResourceKind::NetworkMap,
        NS,
        json!({
            "kind": "NetworkMap",
            "metadata": { "name": "plan1-net", "namespace": NS },
            "spec": { "map": [] }
        }),
    );
    store.seed(
        ResourceKind::StorageMap,
        NS,
        json!({
            "kind": "StorageMap",
            "metadata": { "name": "plan1-sto", "namespace": NS },
            "spec": { "map": [] }
        }),
    );
    for name in ["keep", "drop"] {
        store.seed(
            ResourceKind::Hook,
            NS,
            json!({ "metadata": { "name": name, "namespace": NS }, "spec": { "image": "old" } }),
        );
    }
    let orch = PlanOrchestrator::new(store, OrchestratorConfig::new(NS));
    (orch, serde_json::from_value(plan).unwrap())
}

fn edit_form() -> PlanForm {
    PlanForm {
        name: "plan1".into(),
        source_provider: ObjectRef::new("vcenter", NS),
        target_provider: ObjectRef::new("host", NS),
        vms: vec![VmRef { id: Some("vm-1".into()), name: None }],
        network_pairs: vec![MappingPair {
            source: json!({ "id": "net-9" }),
            destination: json!({ "type": "pod" }),
        }],
        hooks: vec![
            HookInstance {
                step: HookStep::PreHook,
                image: "new".into(),
                playbook: None,
                service_account: None,
                prefilled_from: Some(ObjectRef::new("keep", NS)),
            },
            HookInstance {
                step: HookStep::PostHook,
                image: "fresh".into(),
                playbook: None,
                service_account: Some("migrator".into()),
                prefilled_from: None,
            },
        ],
        ..PlanForm::default()
    }
}

#[tokio::test]
async fn edit_upserts_hooks_patches_and_deletes_last() {
    let (orch, plan) = seeded();
    let updated = orch.edit_plan(&plan, &edit_form()).await.unwrap();

    let store = orch.store();
    // keep was patched, a new hook created, drop deleted.
    let keep = store.snapshot(ResourceKind::Hook, NS, "keep").unwrap();
    assert_eq!(keep["spec"]["image"], "new");
    assert!(store.snapshot(ResourceKind::Hook, NS, "drop").is_none());
    assert_eq!(store.count(ResourceKind::Hook, NS), 2);

    // The new hook is owned by the plan; the prefilled one is not re-owned.
    let new_name = updated.spec.vms[0].hooks[1].hook.name.clone();
    assert!(new_name.starts_with("plan1-hook-"));
    let new_hook = store.snapshot(ResourceKind::Hook, NS, &new_name).unwrap();
    assert_eq!(new_hook["metadata"]["ownerReferences"][0]["uid"], "plan-uid");
    assert!(keep["metadata"].get("ownerReferences").is_none());

    // Mapping pairs replaced.
    let net = store.snapshot(ResourceKind::NetworkMap, NS, "plan1-net").unwrap();
    assert_eq!(net["spec"]["map"][0]["source"]["id"], "net-9");

    // The delete comes after every create and patch.
    let calls = store.calls();
    let delete_at = calls.iter().position(|c| c.op == StoreOp::Delete).unwrap();
    assert!(calls[..delete_at]
        .iter()
        .all(|c| c.op == StoreOp::Create || c.op == StoreOp::Patch));
    assert_eq!(calls.len(), delete_at + 1);
}

#[tokio::test]
async fn failed_patch_never_deletes() {
    let (orch, plan) = seeded();
    orch.store().fail(StoreOp::Patch, ResourceKind::Plan, 409);

    let err = orch.edit_plan(&plan, &edit_form()).await.unwrap_err();
    assert_eq!(err.step(), Some(SagaStep::PatchPlan));
    assert!(orch.store().calls().iter().all(|c| c.op != StoreOp::Delete));
    assert!(orch.store().snapshot(ResourceKind::Hook, NS, "drop").is_some());
}

#[tokio::test]
async fn edit_cannot_rename() {
    let (orch, plan) = seeded();
    let mut form = edit_form();
    form.name = "plan2".into();
    let err = orch.edit_plan(&plan, &form).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Validation(_)));
    assert!(orch.store().calls().is_empty());
}

#[tokio::test]
async fn archive_sets_flag() {
    let (orch, plan) = seeded();
    let archived = orch.archive_plan(&plan).await.unwrap();
    assert!(archived.spec.archived);
    let stored = orch.store().snapshot(ResourceKind::Plan, NS, "plan1").unwrap();
    assert_eq!(stored["spec"]["archived"], true);
    // Other spec fields survive the merge patch.
    assert_eq!(stored["spec"]["map"]["network"]["name"], "plan1-net");
}

#[tokio::test]
async fn delete_removes_plan_and_reports_missing() {
    let (orch, plan) = seeded();
    orch.delete_plan(&plan).await.unwrap();
    assert_eq!(orch.store().count(ResourceKind::Plan, NS), 0);

    let err = orch.delete_plan(&plan).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Store { action: "delete", .. }));
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn replace_pairs_is_sequential_network_first() {
    let (orch, _) = seeded();
    let network: Mapping = serde_json::from_value(
        orch.store().snapshot(ResourceKind::NetworkMap, NS, "plan1-net").unwrap(),
    )
    .unwrap();
    let storage: Mapping = serde_json::from_value(
        orch.store().snapshot(ResourceKind::StorageMap, NS, "plan1-sto").unwrap(),
    )
    .unwrap();
    let pair = MappingPair {
        source: json!({ "id": "x" }),
        destination: json!({ "name": "y" }),
    };

    orch.store().fail(StoreOp::Patch, ResourceKind::NetworkMap, 500);
    let err = orch
        .replace_mapping_pairs(&network, &storage, &[pair.clone()], &[pair.clone()])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(orch
        .store()
        .calls()
        .iter()
        .all(|c| c.kind != ResourceKind::StorageMap));

    orch.store().clear_failures();
    let (net, sto) = orch
        .replace_mapping_pairs(&network, &storage, &[pair.clone()], &[pair])
        .await
        .unwrap();
    assert_eq!(net.spec.map.len(), 1);
    assert_eq!(sto.spec.map[0].destination["name"], "y");
}
