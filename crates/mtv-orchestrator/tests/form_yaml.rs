//! Plan forms as written by hand in YAML.

use mtv_core::MappingKind;
use mtv_orchestrator::{HookStep, PlanForm};

const FORM: &str = r#"
name: nightly-db
description: database tier
sourceProvider: {name: vcenter, namespace: openshift-mtv}
targetProvider: {name: host, namespace: openshift-mtv}
targetNamespace: vms
warm: true
vms:
  - {id: vm-1431, name: db-01}
  - {name: db-02}
networkPairs:
  - source: {id: network-7}
    destination: {type: pod}
storagePairs:
  - source: {id: datastore-12}
    destination: {storageClass: ocs-storagecluster-ceph-rbd}
hooks:
  - step: PreHook
    image: quay.io/konveyor/hook-runner
    serviceAccount: migrator
"#;

#[test]
fn yaml_form_decodes_and_validates() {
    let form: PlanForm = serde_yaml::from_str(FORM).unwrap();
    form.validate().unwrap();

    assert!(form.warm);
    assert_eq!(form.vms.len(), 2);
    assert_eq!(form.vms[1].id, None);
    assert_eq!(form.hooks[0].step, HookStep::PreHook);
    assert_eq!(form.hooks[0].service_account.as_deref(), Some("migrator"));
    assert!(form.hooks[0].prefilled_from.is_none());

    let storage = form.pairs(MappingKind::Storage);
    assert_eq!(storage[0].destination["storageClass"], "ocs-storagecluster-ceph-rbd");
    assert_eq!(form.pairs(MappingKind::Network)[0].source["id"], "network-7");
}

#[test]
fn yaml_form_with_unknown_hook_step_is_rejected() {
    let bad = FORM.replace("step: PreHook", "step: MidHook");
    assert!(serde_yaml::from_str::<PlanForm>(&bad).is_err());
}
