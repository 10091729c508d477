pub mod copies;
pub mod creators;
pub mod dashboard;
pub mod form_state;
pub mod guard;
pub mod lookup;
pub mod tags;
pub mod validate;
pub mod works;

// Workflow modules share operation names (list, create, ...) and are used by path.
pub use dashboard::{collect, DashboardSummary};
pub use form_state::*;
pub use guard::{can_delete, Blocker, DeleteCheck, DeleteOutcome};
pub use lookup::*;
pub use validate::*;
