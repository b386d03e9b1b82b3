//! # mtv-cli: Command-Line Front End
//!
//! Provides the `mtv` command. Read-only subcommands work offline over
//! resource files; mutating subcommands talk to a cluster API.
//!
//! ## Subcommands
//!
//! - `mtv status`: Classify plans and show their status, progress and
//!   primary action.
//! - `mtv pipeline`: Per-task view of one VM's migration pipeline.
//! - `mtv create`: Create a plan with its mappings and hooks, resumable
//!   through a saga file.
//! - `mtv archive` / `mtv delete`: Archive or delete a plan by name.
//!
//! ```bash
//! mtv status --plans plans.yaml --migrations migrations.yaml
//! mtv pipeline --migration migration.yaml --vm vm-1431
//! mtv create --form plan.yaml --saga plan1.saga.json
//! ```

pub mod input;
pub mod mutate;
pub mod pipeline;
pub mod status;
