mod invocation_handler;

pub use invocation_handler::{InvocationHandler, SkillInvocation, SkillReply};
