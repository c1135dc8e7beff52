//! Personas and the agent that runs them.

mod agent;
mod persona;

pub use agent::Agent;
pub use persona::AgentRole;
