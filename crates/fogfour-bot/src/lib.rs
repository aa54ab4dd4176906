pub mod agent;
pub mod eval;
pub mod search;

pub use agent::{Agent, AgentError};
pub use eval::HeuristicParams;
pub use search::{SearchConfig, SearchEngine, SearchError, SearchStats};
