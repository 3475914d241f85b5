use storyforge_core::StoryResult;

use crate::context::ScriptContext;

/// A unit of storyboard work.
///
/// `execute` populates groups on the context as a side effect and must have
/// finished every mutation by the time it returns. Instances may be run
/// concurrently with other scripts, each against its own context.
pub trait Script: Send + Sync {
    /// Stable identity used as the merge and audit key.
    fn name(&self) -> &str;

    fn execute(&self, ctx: &mut ScriptContext) -> StoryResult<()>;
}

/// A script backed by a native Rust closure.
pub struct FnScript<F> {
    name: String,
    body: F,
}

impl<F> FnScript<F>
where
    F: Fn(&mut ScriptContext) -> StoryResult<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> Script for FnScript<F>
where
    F: Fn(&mut ScriptContext) -> StoryResult<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &mut ScriptContext) -> StoryResult<()> {
        (self.body)(ctx)
    }
}

impl<F> std::fmt::Debug for FnScript<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnScript").field("name", &self.name).finish()
    }
}
