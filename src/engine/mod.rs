pub mod dispatch;
pub mod feasibility;
pub mod queue;
pub mod validator;
