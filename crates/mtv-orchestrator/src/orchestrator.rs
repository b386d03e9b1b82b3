//! # Plan Orchestrator
//!
//! Sequences the writes behind creating or editing a plan. Sibling writes
//! within a step run concurrently and are joined before the next step
//! starts. A failed step stops the sequence and returns the saga so far.
//!
//! ## Create
//!
//! 1. Reject a name that is invalid or already taken.
//! 2. Create the network and storage mappings.
//! 3. Create the hooks.
//! 4. Create the plan, referencing the objects from 2 and 3.
//! 5. Patch an owner reference to the plan onto every object from 2 and 3.
//!
//! Create steps let every sibling settle and record each success before
//! reporting the first failure, so [`PlanOrchestrator::resume_create`]
//! only redoes what is missing.

use futures::future::{join_all, try_join_all};
use mtv_client::{ResourceKind, ResourceStore, StoreError, StoreExt};
use mtv_core::{
    Hook, Mapping, MappingKind, MappingPair, ObjectMeta, ObjectRef, OwnerReference, Plan, Resource,
    ValidationError,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::OrchestratorError;
use crate::form::{HookStep, PlanForm};
use crate::naming::NamingPolicy;
use crate::saga::{MutationSaga, SagaKind, SagaStep};

/// Orchestrator settings, passed in at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Namespace plans, mappings and hooks are written to.
    pub namespace: String,
    pub naming: NamingPolicy,
}

impl OrchestratorConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            naming: NamingPolicy::default(),
        }
    }

    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }
}

/// Runs plan mutations against a [`ResourceStore`].
pub struct PlanOrchestrator<S> {
    store: S,
    config: OrchestratorConfig,
}

impl<S: ResourceStore> PlanOrchestrator<S> {
    pub fn new(store: S, config: OrchestratorConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Namespace of a reference, defaulting to the configured one.
    fn ns_of<'a>(&'a self, r: &'a ObjectRef) -> &'a str {
        r.namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(&self.config.namespace)
    }

    // ── Create ───────────────────────────────────────────────────────

    /// Create a plan with its mappings and hooks.
    pub async fn create_plan(&self, form: &PlanForm) -> Result<Plan, OrchestratorError> {
        form.validate()?;
        info!(plan = %form.name, namespace = %self.namespace(), "creating plan");
        self.run_create(form, MutationSaga::new(&form.name, SagaKind::Create))
            .await
    }

    /// Continue a create that failed, skipping every recorded step.
    pub async fn resume_create(
        &self,
        form: &PlanForm,
        saga: MutationSaga,
    ) -> Result<Plan, OrchestratorError> {
        if saga.kind != SagaKind::Create || saga.plan != form.name {
            return Err(OrchestratorError::ResumeMismatch {
                saga_plan: saga.plan,
                form_plan: form.name.clone(),
            });
        }
        form.validate()?;
        info!(plan = %form.name, failed_step = ?saga.failed_step(), "resuming plan create");
        self.run_create(form, saga).await
    }

    async fn run_create(
        &self,
        form: &PlanForm,
        mut saga: MutationSaga,
    ) -> Result<Plan, OrchestratorError> {
        let ns = self.namespace();
        saga.reserve_hooks(form.hooks.len());

        if !saga.is_done(SagaStep::CheckName) {
            saga.begin(SagaStep::CheckName);
            match self.store.get(ResourceKind::Plan, ns, &form.name).await {
                Ok(Some(_)) => return Err(OrchestratorError::NameInUse(form.name.clone())),
                Ok(None) => self.step_done(&mut saga, SagaStep::CheckName, Vec::new()),
                Err(e) => return Err(self.step_failed(saga, SagaStep::CheckName, e)),
            }
        }

        if !saga.is_done(SagaStep::CreateMappings) {
            saga.begin(SagaStep::CreateMappings);
            let (network, storage) = futures::join!(
                self.ensure_mapping(form, MappingKind::Network, saga.network_ref.clone()),
                self.ensure_mapping(form, MappingKind::Storage, saga.storage_ref.clone()),
            );
            let mut first_err = None;
            match network {
                Ok(r) => saga.network_ref = Some(r),
                Err(e) => first_err = Some(e),
            }
            match storage {
                Ok(r) => saga.storage_ref = Some(r),
                Err(e) => first_err = first_err.or(Some(e)),
            }
            if let Some(e) = first_err {
                return Err(self.step_failed(saga, SagaStep::CreateMappings, e));
            }
            let touched = saga
                .network_ref
                .iter()
                .chain(saga.storage_ref.iter())
                .cloned()
                .collect();
            self.step_done(&mut saga, SagaStep::CreateMappings, touched);
        }

        if !saga.is_done(SagaStep::CreateHooks) {
            saga.begin(SagaStep::CreateHooks);
            let pending: Vec<usize> = (0..form.hooks.len())
                .filter(|&i| saga.hook_refs[i].is_none())
                .collect();
            let results = join_all(pending.iter().map(|&i| self.create_hook(form, i))).await;
            let mut first_err = None;
            for (i, result) in pending.into_iter().zip(results) {
                match result {
                    Ok(r) => saga.hook_refs[i] = Some(r),
                    Err(e) => first_err = first_err.or(Some(e)),
                }
            }
            if let Some(e) = first_err {
                return Err(self.step_failed(saga, SagaStep::CreateHooks, e));
            }
            let touched = saga.hook_refs.iter().flatten().cloned().collect();
            self.step_done(&mut saga, SagaStep::CreateHooks, touched);
        }

        let mut created = None;
        if !saga.is_done(SagaStep::CreatePlan) {
            saga.begin(SagaStep::CreatePlan);
            let network = saga
                .network_ref
                .clone()
                .ok_or(ValidationError::MissingField("saga.networkRef"))?;
            let storage = saga
                .storage_ref
                .clone()
                .ok_or(ValidationError::MissingField("saga.storageRef"))?;
            let hooks = saga
                .hook_pairs(&hook_steps(form))
                .ok_or(ValidationError::MissingField("saga.hookRefs"))?;
            let plan = Plan::new(
                ObjectMeta::named(&form.name, ns),
                form.plan_spec(network, storage, &hooks),
            );
            match self.create_or_reuse(ResourceKind::Plan, &plan).await {
                Ok(plan) => {
                    saga.plan_ref = Some(plan.object_ref());
                    self.step_done(&mut saga, SagaStep::CreatePlan, vec![plan.object_ref()]);
                    created = Some(plan);
                }
                Err(e) => return Err(self.step_failed(saga, SagaStep::CreatePlan, e)),
            }
        }

        let plan = match created {
            Some(plan) => plan,
            None => match self.load_plan(&form.name).await {
                Ok(plan) => plan,
                Err(e) => return Err(self.step_failed(saga, SagaStep::CreatePlan, e)),
            },
        };

        if !saga.is_done(SagaStep::PatchOwners) {
            saga.begin(SagaStep::PatchOwners);
            let owner = plan
                .owner_reference()
                .ok_or(ValidationError::MissingField("metadata.uid"))?;
            let mut targets: Vec<(ResourceKind, ObjectRef)> = Vec::new();
            if let Some(r) = &saga.network_ref {
                targets.push((ResourceKind::NetworkMap, r.clone()));
            }
            if let Some(r) = &saga.storage_ref {
                targets.push((ResourceKind::StorageMap, r.clone()));
            }
            targets.extend(
                saga.hook_refs
                    .iter()
                    .flatten()
                    .map(|r| (ResourceKind::Hook, r.clone())),
            );
            if let Err(e) = self.patch_owners(&targets, &owner).await {
                return Err(self.step_failed(saga, SagaStep::PatchOwners, e));
            }
            let touched = targets.into_iter().map(|(_, r)| r).collect();
            self.step_done(&mut saga, SagaStep::PatchOwners, touched);
        }

        saga.finish();
        info!(plan = %form.name, objects = saga.created().len(), "plan created");
        Ok(plan)
    }

    async fn ensure_mapping(
        &self,
        form: &PlanForm,
        kind: MappingKind,
        existing: Option<ObjectRef>,
    ) -> Result<ObjectRef, StoreError> {
        if let Some(existing) = existing {
            return Ok(existing);
        }
        let mapping = Mapping::new(
            kind,
            self.config
                .naming
                .mapping_meta(&form.name, kind, self.namespace()),
            form.mapping_spec(kind),
        );
        let created = self
            .create_or_reuse(ResourceKind::for_mapping(kind), &mapping)
            .await?;
        Ok(created.object_ref())
    }

    async fn create_hook(&self, form: &PlanForm, index: usize) -> Result<ObjectRef, StoreError> {
        let instance = &form.hooks[index];
        let hook = Hook::new(
            self.config
                .naming
                .hook_meta(&form.name, index, instance.step, self.namespace()),
            instance.hook_spec(),
        );
        let created = self.create_or_reuse(ResourceKind::Hook, &hook).await?;
        Ok(created.object_ref())
    }

    /// Create `object`; under deterministic naming a conflict returns the
    /// object already stored under that name.
    async fn create_or_reuse<T>(&self, kind: ResourceKind, object: &T) -> Result<T, StoreError>
    where
        T: Resource + Send + Sync + 'static,
    {
        let ns = self.namespace();
        match self.store.create_as(kind, ns, object).await {
            Err(e) if e.is_conflict() && self.config.naming.reuses_existing() => {
                let name = object.metadata().name_or_empty();
                debug!(%kind, %name, "object exists, reusing");
                match self.store.get_as::<T>(kind, ns, name).await? {
                    Some(existing) => Ok(existing),
                    None => Err(e),
                }
            }
            other => other,
        }
    }

    async fn load_plan(&self, name: &str) -> Result<Plan, StoreError> {
        let ns = self.namespace();
        self.store
            .get_as::<Plan>(ResourceKind::Plan, ns, name)
            .await?
            .ok_or_else(|| StoreError::Api {
                endpoint: format!("GET {}", ResourceKind::Plan.path(ns, Some(name))),
                status: 404,
                body: "NotFound".to_string(),
            })
    }

    async fn patch_owners(
        &self,
        targets: &[(ResourceKind, ObjectRef)],
        owner: &OwnerReference,
    ) -> Result<(), StoreError> {
        let patch = json!({ "metadata": { "ownerReferences": [owner] } });
        try_join_all(
            targets
                .iter()
                .map(|(kind, r)| self.store.patch(*kind, self.ns_of(r), &r.name, &patch)),
        )
        .await?;
        Ok(())
    }

    fn step_done(&self, saga: &mut MutationSaga, step: SagaStep, touched: Vec<ObjectRef>) {
        info!(plan = %saga.plan, %step, objects = touched.len(), "saga step completed");
        saga.complete(step, touched);
    }

    fn step_failed(
        &self,
        mut saga: MutationSaga,
        step: SagaStep,
        source: StoreError,
    ) -> OrchestratorError {
        warn!(
            plan = %saga.plan,
            %step,
            status = ?source.status(),
            error = %source,
            "saga step failed"
        );
        saga.fail(step);
        OrchestratorError::Step {
            step,
            source,
            saga: Box::new(saga),
        }
    }

    // ── Edit ─────────────────────────────────────────────────────────

    /// Apply an edited form to an existing plan.
    ///
    /// Hooks are upserted first: prefilled ones are patched, new ones
    /// created. The mappings and the plan are then patched together, new
    /// hooks get their owner reference, and hooks the plan referenced but
    /// the form dropped are deleted last.
    pub async fn edit_plan(&self, plan: &Plan, form: &PlanForm) -> Result<Plan, OrchestratorError> {
        form.validate()?;
        let name = plan.metadata.name_or_empty();
        if form.name != name {
            return Err(ValidationError::InvalidName {
                name: form.name.clone(),
                reason: format!("plan {name:?} cannot be renamed"),
            }
            .into());
        }
        let network = plan
            .spec
            .map
            .network
            .clone()
            .ok_or(ValidationError::MissingField("spec.map.network"))?;
        let storage = plan
            .spec
            .map
            .storage
            .clone()
            .ok_or(ValidationError::MissingField("spec.map.storage"))?;
        let owner = plan
            .owner_reference()
            .ok_or(ValidationError::MissingField("metadata.uid"))?;
        let plan_ns = plan
            .metadata
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(self.namespace());

        info!(plan = %name, hooks = form.hooks.len(), "editing plan");
        let mut saga = MutationSaga::new(name, SagaKind::Edit);
        saga.network_ref = Some(network.clone());
        saga.storage_ref = Some(storage.clone());
        saga.plan_ref = Some(plan.object_ref());
        saga.reserve_hooks(form.hooks.len());

        saga.begin(SagaStep::CreateHooks);
        let results = join_all((0..form.hooks.len()).map(|i| self.upsert_hook(form, i))).await;
        let mut first_err = None;
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(r) => saga.hook_refs[i] = Some(r),
                Err(e) => first_err = first_err.or(Some(e)),
            }
        }
        if let Some(e) = first_err {
            return Err(self.step_failed(saga, SagaStep::CreateHooks, e));
        }
        let touched = saga.hook_refs.iter().flatten().cloned().collect();
        self.step_done(&mut saga, SagaStep::CreateHooks, touched);

        saga.begin(SagaStep::PatchPlan);
        let hooks = saga
            .hook_pairs(&hook_steps(form))
            .ok_or(ValidationError::MissingField("saga.hookRefs"))?;
        let spec = form.plan_spec(network.clone(), storage.clone(), &hooks);
        let mapping_patch = |kind: MappingKind| {
            json!({ "spec": { "provider": form.provider_refs(), "map": form.pairs(kind) } })
        };
        let network_patch = mapping_patch(MappingKind::Network);
        let storage_patch = mapping_patch(MappingKind::Storage);
        let plan_patch = json!({ "spec": spec });
        let patched = futures::try_join!(
            self.store.patch(
                ResourceKind::NetworkMap,
                self.ns_of(&network),
                &network.name,
                &network_patch
            ),
            self.store.patch(
                ResourceKind::StorageMap,
                self.ns_of(&storage),
                &storage.name,
                &storage_patch
            ),
            self.store
                .patch_as::<Plan>(ResourceKind::Plan, plan_ns, name, &plan_patch),
        );
        let updated = match patched {
            Ok((_, _, updated)) => updated,
            Err(e) => return Err(self.step_failed(saga, SagaStep::PatchPlan, e)),
        };
        self.step_done(
            &mut saga,
            SagaStep::PatchPlan,
            vec![network, storage, plan.object_ref()],
        );

        saga.begin(SagaStep::PatchOwners);
        let new_hooks: Vec<(ResourceKind, ObjectRef)> = form
            .hooks
            .iter()
            .zip(&saga.hook_refs)
            .filter(|(instance, _)| instance.prefilled_from.is_none())
            .filter_map(|(_, r)| r.clone().map(|r| (ResourceKind::Hook, r)))
            .collect();
        if let Err(e) = self.patch_owners(&new_hooks, &owner).await {
            return Err(self.step_failed(saga, SagaStep::PatchOwners, e));
        }
        let touched = new_hooks.into_iter().map(|(_, r)| r).collect();
        self.step_done(&mut saga, SagaStep::PatchOwners, touched);

        saga.begin(SagaStep::DeleteHooks);
        let removed = removed_hooks(plan, form, self.namespace());
        let deleted = try_join_all(
            removed
                .iter()
                .map(|r| self.store.delete(ResourceKind::Hook, self.ns_of(r), &r.name)),
        )
        .await;
        if let Err(e) = deleted {
            return Err(self.step_failed(saga, SagaStep::DeleteHooks, e));
        }
        self.step_done(&mut saga, SagaStep::DeleteHooks, removed);

        saga.finish();
        info!(plan = %name, "plan edited");
        Ok(updated)
    }

    async fn upsert_hook(&self, form: &PlanForm, index: usize) -> Result<ObjectRef, StoreError> {
        let instance = &form.hooks[index];
        match &instance.prefilled_from {
            Some(existing) => {
                let patch = json!({ "spec": instance.hook_spec() });
                let hook: Hook = self
                    .store
                    .patch_as(ResourceKind::Hook, self.ns_of(existing), &existing.name, &patch)
                    .await?;
                Ok(hook.object_ref())
            }
            None => self.create_hook(form, index).await,
        }
    }

    // ── Single-call mutations ────────────────────────────────────────

    /// Set `spec.archived` on a plan.
    pub async fn archive_plan(&self, plan: &Plan) -> Result<Plan, OrchestratorError> {
        let target = plan.object_ref();
        info!(plan = %target, "archiving plan");
        self.store
            .patch_as::<Plan>(
                ResourceKind::Plan,
                self.ns_of(&target),
                &target.name,
                &json!({ "spec": { "archived": true } }),
            )
            .await
            .map_err(|source| OrchestratorError::Store {
                action: "archive",
                target: target.to_string(),
                source,
            })
    }

    pub async fn delete_plan(&self, plan: &Plan) -> Result<(), OrchestratorError> {
        let target = plan.object_ref();
        info!(plan = %target, "deleting plan");
        self.store
            .delete(ResourceKind::Plan, self.ns_of(&target), &target.name)
            .await
            .map_err(|source| OrchestratorError::Store {
                action: "delete",
                target: target.to_string(),
                source,
            })
    }

    /// Replace the pair lists of a plan's mappings, network first, then
    /// storage. A failed network patch leaves storage untouched.
    pub async fn replace_mapping_pairs(
        &self,
        network: &Mapping,
        storage: &Mapping,
        network_pairs: &[MappingPair],
        storage_pairs: &[MappingPair],
    ) -> Result<(Mapping, Mapping), OrchestratorError> {
        let network = self
            .replace_pairs(MappingKind::Network, network, network_pairs)
            .await?;
        let storage = self
            .replace_pairs(MappingKind::Storage, storage, storage_pairs)
            .await?;
        Ok((network, storage))
    }

    async fn replace_pairs(
        &self,
        kind: MappingKind,
        mapping: &Mapping,
        pairs: &[MappingPair],
    ) -> Result<Mapping, OrchestratorError> {
        let target = mapping.object_ref();
        debug!(mapping = %target, %kind, pairs = pairs.len(), "replacing mapping pairs");
        self.store
            .patch_as::<Mapping>(
                ResourceKind::for_mapping(kind),
                self.ns_of(&target),
                &target.name,
                &json!({ "spec": { "map": pairs } }),
            )
            .await
            .map_err(|source| OrchestratorError::Store {
                action: "patch",
                target: target.to_string(),
                source,
            })
    }
}

fn hook_steps(form: &PlanForm) -> Vec<HookStep> {
    form.hooks.iter().map(|h| h.step).collect()
}

/// Hooks referenced by any VM of `plan` that no form hook was prefilled
/// from, deduplicated by name and namespace.
pub fn removed_hooks(plan: &Plan, form: &PlanForm, default_namespace: &str) -> Vec<ObjectRef> {
    let ns = |r: &ObjectRef| -> String {
        r.namespace
            .clone()
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| default_namespace.to_string())
    };
    let kept: Vec<(String, String)> = form
        .hooks
        .iter()
        .filter_map(|h| h.prefilled_from.as_ref())
        .map(|r| (r.name.clone(), ns(r)))
        .collect();
    let mut removed: Vec<ObjectRef> = Vec::new();
    for hook_ref in plan.spec.vms.iter().flat_map(|vm| &vm.hooks) {
        let key = (hook_ref.hook.name.clone(), ns(&hook_ref.hook));
        if kept.contains(&key) {
            continue;
        }
        if removed.iter().any(|r| (r.name.clone(), ns(r)) == key) {
            continue;
        }
        removed.push(hook_ref.hook.clone());
    }
    removed
}
