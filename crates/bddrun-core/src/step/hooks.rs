//! Pre- and post-run extension points.
//!
//! A hook is an async function value. The pre hook sees the configuration
//! before the test directory is checked; the post hook receives the captured
//! output of a successful run by value. Both default to doing nothing.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use super::types::RunConfiguration;
use crate::error::StepError;

pub type PreHook =
    Arc<dyn Fn(&RunConfiguration) -> BoxFuture<'static, Result<(), StepError>> + Send + Sync>;

pub type PostHook = Arc<
    dyn Fn(&RunConfiguration, String) -> BoxFuture<'static, Result<(), StepError>> + Send + Sync,
>;

/// The pair of optional hooks attached to a [`super::TestRunStep`].
#[derive(Clone, Default)]
pub struct Hooks {
    pre: Option<PreHook>,
    post: Option<PostHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hook run before anything else in a run.
    ///
    /// The closure gets the configuration by reference and must return an
    /// owned future, so clone whatever it needs out of the configuration.
    pub fn with_pre<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(&RunConfiguration) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), StepError>> + Send + 'static,
    {
        let hook: PreHook = Arc::new(
            move |cfg: &RunConfiguration| -> BoxFuture<'static, Result<(), StepError>> {
                Box::pin(f(cfg))
            },
        );
        self.pre = Some(hook);
        self
    }

    /// Set the hook run after a successful run, with the captured output.
    pub fn with_post<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(&RunConfiguration, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), StepError>> + Send + 'static,
    {
        let hook: PostHook = Arc::new(
            move |cfg: &RunConfiguration,
                  output: String|
                  -> BoxFuture<'static, Result<(), StepError>> {
                Box::pin(f(cfg, output))
            },
        );
        self.post = Some(hook);
        self
    }

    pub fn has_pre(&self) -> bool {
        self.pre.is_some()
    }

    pub fn has_post(&self) -> bool {
        self.post.is_some()
    }

    pub(crate) async fn pre_execute(&self, cfg: &RunConfiguration) -> Result<(), StepError> {
        match &self.pre {
            Some(hook) => hook(cfg).await,
            None => Ok(()),
        }
    }

    pub(crate) async fn post_execute(
        &self,
        cfg: &RunConfiguration,
        output: String,
    ) -> Result<(), StepError> {
        match &self.post {
            Some(hook) => hook(cfg, output).await,
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("pre", &self.has_pre())
            .field("post", &self.has_post())
            .finish()
    }
}
