mod resolver;

pub use resolver::{AccessDecision, AccessResolver, AccessSource};
