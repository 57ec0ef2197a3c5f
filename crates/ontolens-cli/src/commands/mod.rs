//! Command implementations.

pub mod actions;
pub mod graph;
pub mod maintenance;
pub mod profile;
pub mod relation;
pub mod stats;
pub mod status;

pub use self::actions::{
    execute_accept, execute_evaluate, execute_reject, execute_sync, execute_undo,
};
pub use self::graph::execute_graph;
pub use self::maintenance::{execute_clear, execute_regenerate};
pub use self::profile::execute_profile;
pub use self::relation::execute_relation;
pub use self::stats::execute_stats;
pub use self::status::execute_status;
