//! End-to-end classification scenarios over realistic plan and migration
//! data.

use mtv_core::{
    Category, Condition, Migration, MigrationStatus, ObjectMeta, ObjectRef, Plan,
    PlanMigrationSummary, PlanSpec, PlanStatus, PlanVm, Task, TaskError, Timestamp, VmStatus,
};
use mtv_state::{
    can_restart, classify, primary_action, status_title, PlanState, PrimaryAction, RunOutcome,
    CUTOVER_TASK,
};

const NS: &str = "openshift-mtv";
const T0: &str = "2026-01-15T10:00:00Z";

fn now() -> Timestamp {
    Timestamp::parse("2026-01-15T12:00:00Z").unwrap()
}

fn plan(vms: usize, warm: bool) -> Plan {
    Plan {
        metadata: ObjectMeta::named("plan-a", NS),
        spec: PlanSpec {
            warm,
            vms: (0..vms)
                .map(|i| PlanVm {
                    id: Some(format!("vm-{i}")),
                    ..PlanVm::default()
                })
                .collect(),
            ..PlanSpec::default()
        },
        status: Some(PlanStatus {
            conditions: vec![Condition::new("Ready", Category::Required)],
            migration: None,
        }),
        ..Plan::default()
    }
}

fn with_summary(mut plan: Plan, vms: Vec<VmStatus>) -> Plan {
    if let Some(status) = plan.status.as_mut() {
        status.migration = Some(PlanMigrationSummary {
            started: Some(T0.into()),
            completed: None,
            vms,
        });
    }
    plan
}

fn migration(vms: Vec<VmStatus>) -> Migration {
    let mut m = Migration {
        metadata: ObjectMeta::named("plan-a-xyz", NS),
        ..Migration::default()
    };
    m.metadata.creation_timestamp = Some(T0.into());
    m.spec.plan = ObjectRef::new("plan-a", NS);
    m.status = Some(MigrationStatus {
        started: Some(T0.into()),
        vms,
        ..MigrationStatus::default()
    });
    m
}

fn task(name: &str, started: bool, completed: bool) -> Task {
    Task {
        started: started.then(|| T0.to_string()),
        completed: completed.then(|| T0.to_string()),
        ..Task::named(name)
    }
}

fn cold_vm(id: &str, done: bool) -> VmStatus {
    VmStatus {
        id: Some(id.into()),
        started: Some(T0.into()),
        completed: done.then(|| T0.to_string()),
        pipeline: vec![
            task("Initialize", true, true),
            task("DiskTransfer", true, done),
            task("ImageConversion", done, done),
        ],
        ..VmStatus::default()
    }
}

fn warm_vm(id: &str, at_cutover: bool) -> VmStatus {
    VmStatus {
        id: Some(id.into()),
        started: Some(T0.into()),
        pipeline: vec![
            task("Initialize", true, true),
            task("Precopy", true, at_cutover),
            task(CUTOVER_TASK, at_cutover, false),
            task("ImageConversion", false, false),
        ],
        ..VmStatus::default()
    }
}

#[test]
fn archived_condition_wins_over_any_migration_data() {
    let mut p = with_summary(plan(2, true), vec![warm_vm("vm-0", true)]);
    if let Some(s) = p.status.as_mut() {
        s.conditions.push(Condition::new("Archived", Category::Advisory));
    }
    p.spec.archived = true;
    let m = migration(vec![warm_vm("vm-0", true)]);
    let o = classify(&p, Some(&m), std::slice::from_ref(&m), now());
    assert_eq!(o.state, PlanState::Archived);
    assert_eq!(primary_action(&o), None);
}

#[test]
fn archive_flag_without_condition_is_archiving() {
    let mut p = plan(1, false);
    p.spec.archived = true;
    assert_eq!(classify(&p, None, &[], now()).state, PlanState::Archiving);
}

#[test]
fn not_started_readiness() {
    let p = plan(1, false);
    let o = classify(&p, None, &[], now());
    assert_eq!(o.state, PlanState::NotStartedReady);
    assert_eq!(primary_action(&o), Some(PrimaryAction::Start));

    let mut unready = plan(1, false);
    unready.status = None;
    assert_eq!(classify(&unready, None, &[], now()).state, PlanState::NotStartedNotReady);
}

#[test]
fn unstarted_latest_migration_is_not_started() {
    let p = plan(1, false);
    let mut m = migration(vec![]);
    m.status = None;
    let o = classify(&p, None, std::slice::from_ref(&m), now());
    assert_eq!(o.state, PlanState::NotStartedReady);
    assert_eq!(o.attempts, 1);
}

#[test]
fn contradictory_data_is_unknown() {
    let p = plan(1, false);
    let mut foreign = migration(vec![cold_vm("vm-0", false)]);
    foreign.spec.plan = ObjectRef::new("plan-b", NS);
    assert_eq!(classify(&p, Some(&foreign), &[], now()).state, PlanState::Unknown);

    let empty = plan(0, false);
    let m = migration(vec![]);
    assert_eq!(classify(&empty, Some(&m), &[], now()).state, PlanState::Unknown);
}

#[test]
fn no_vm_begun_is_starting() {
    let p = plan(2, false);
    let mut vm = cold_vm("vm-0", false);
    vm.pipeline = vec![task("Initialize", false, false)];
    let m = migration(vec![vm]);
    let o = classify(&p, None, std::slice::from_ref(&m), now());
    assert_eq!(o.state, PlanState::Starting);
    assert!(!can_restart(&o));
    assert_eq!(status_title(&o).title, "Running - preparing for migration");
}

#[test]
fn cold_plan_running_two_of_three() {
    let vms = vec![
        cold_vm("vm-0", true),
        cold_vm("vm-1", true),
        cold_vm("vm-2", false),
    ];
    let p = with_summary(plan(3, false), vms.clone());
    let m = migration(vms);
    let o = classify(&p, Some(&m), std::slice::from_ref(&m), now());
    assert_eq!(o.state, PlanState::Running);
    assert_eq!(o.progress.value, 66.67);
    assert_eq!(o.progress.message, "2 of 3 VMs migrated");
    assert_eq!(o.outcome, Some(RunOutcome::InProgress));
    assert!(!can_restart(&o));
}

#[test]
fn progress_falls_back_to_migration_vms() {
    let p = plan(2, false);
    let m = migration(vec![cold_vm("vm-0", true), cold_vm("vm-1", false)]);
    let o = classify(&p, None, std::slice::from_ref(&m), now());
    assert_eq!(o.progress.value, 50.0);
    assert_eq!(o.progress.message, "1 of 2 VMs migrated");
}

#[test]
fn warm_plan_with_future_cutover_is_scheduled() {
    let p = plan(2, true);
    let mut m = migration(vec![warm_vm("vm-0", false), warm_vm("vm-1", false)]);
    m.spec.cutover = Some("2026-01-15T13:00:00Z".into());
    let o = classify(&p, None, std::slice::from_ref(&m), now());
    assert_eq!(o.state, PlanState::CopyingCutoverScheduled);
    assert_eq!(primary_action(&o), Some(PrimaryAction::ScheduledCutover));
    assert!(!can_restart(&o));
}

#[test]
fn warm_plan_without_cutover_is_copying() {
    let p = plan(1, true);
    let m = migration(vec![warm_vm("vm-0", false)]);
    let o = classify(&p, None, std::slice::from_ref(&m), now());
    assert_eq!(o.state, PlanState::Copying);
    assert_eq!(primary_action(&o), Some(PrimaryAction::Cutover));
    assert_eq!(status_title(&o).title, "Running - performing incremental data copies");
}

#[test]
fn malformed_cutover_reads_as_absent() {
    let p = plan(1, true);
    let mut m = migration(vec![warm_vm("vm-0", false)]);
    m.spec.cutover = Some("soon".into());
    assert_eq!(classify(&p, None, std::slice::from_ref(&m), now()).state, PlanState::Copying);
}

#[test]
fn warm_vm_in_cutover_task_is_starting_cutover() {
    let p = plan(2, true);
    let mut m = migration(vec![warm_vm("vm-0", false), warm_vm("vm-1", true)]);
    m.spec.cutover = Some("2026-01-15T11:00:00Z".into());
    let o = classify(&p, None, std::slice::from_ref(&m), now());
    assert_eq!(o.state, PlanState::StartingCutover);
    assert_eq!(primary_action(&o), None);
}

#[test]
fn failed_vm_offers_must_gather_and_restart_once_resolved() {
    let mut failed = cold_vm("vm-1", true);
    failed.error = Some(TaskError {
        phase: Some("ImageConversion".into()),
        reasons: vec!["virt-v2v failed".into()],
    });
    let mut canceled = cold_vm("vm-2", false);
    canceled.conditions.push(Condition::new("Canceled", Category::Advisory));
    let vms = vec![cold_vm("vm-0", true), failed, canceled];
    let p = with_summary(plan(3, false), vms.clone());
    let m = migration(vms);
    let o = classify(&p, None, std::slice::from_ref(&m), now());
    assert_eq!(o.state, PlanState::Running);
    assert_eq!(o.progress.message, "1 of 3 VMs migrated");
    assert_eq!(o.outcome, Some(RunOutcome::Failed));
    assert_eq!(primary_action(&o), Some(PrimaryAction::MustGather));
    assert!(can_restart(&o));
}

#[test]
fn task_error_on_completed_vm_offers_must_gather() {
    let mut vm = cold_vm("vm-0", true);
    vm.pipeline[2].error = Some(TaskError {
        phase: Some("Failed".into()),
        reasons: vec!["disk conversion failed".into()],
    });
    assert!(vm.error.is_none());
    let m = migration(vec![vm]);
    let o = classify(&plan(1, false), None, std::slice::from_ref(&m), now());
    assert_eq!(o.state, PlanState::Running);
    assert_eq!(o.tally.failed, 1);
    assert_eq!(o.tally.succeeded, 0);
    assert_eq!(o.progress.message, "0 of 1 VMs migrated");
    assert_eq!(o.outcome, Some(RunOutcome::Failed));
    assert_eq!(primary_action(&o), Some(PrimaryAction::MustGather));
}

#[test]
fn vm_error_before_completion_does_not_offer_must_gather() {
    let mut vm = cold_vm("vm-0", false);
    vm.error = Some(TaskError {
        phase: Some("DiskTransfer".into()),
        reasons: vec!["source unreachable".into()],
    });
    let m = migration(vec![vm]);
    let o = classify(&plan(1, false), None, std::slice::from_ref(&m), now());
    assert_eq!(o.tally.failed, 1);
    assert_eq!(o.tally.gatherable, 0);
    assert_eq!(primary_action(&o), None);
}

#[test]
fn latest_migration_is_derived_from_history() {
    let p = plan(1, false);
    let mut old = migration(vec![cold_vm("vm-0", true)]);
    old.metadata.name = Some("old".into());
    if let Some(s) = old.status.as_mut() {
        s.started = Some("2026-01-14T10:00:00Z".into());
    }
    let mut fresh = migration(vec![]);
    fresh.metadata.name = Some("fresh".into());
    if let Some(s) = fresh.status.as_mut() {
        s.started = Some("2026-01-15T11:00:00Z".into());
    }
    let o = classify(&p, None, &[old, fresh], now());
    assert_eq!(o.state, PlanState::Starting);
    assert_eq!(o.attempts, 2);
}
