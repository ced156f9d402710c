//! Replication: snapshot wire types and the reconciliation pass that
//! applies them.

pub mod reconcile;
pub mod state;

pub use reconcile::ReconcileReport;
pub use state::{ComponentState, PhysicsComponentState};
