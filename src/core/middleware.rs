//! Middleware pipeline
//!
//! Middleware wrap the dispatch tail in an onion: each runs its pre-work,
//! calls `next.run(ctx)` to advance, then runs its post-work as the chain
//! unwinds. [`Next`] is consumed by `run`, so a middleware can advance the
//! chain at most once; skipping `next` leaves the context without a
//! response and the dispatcher reports that for requests.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::context::RequestContext;
use crate::core::error::McpResult;

/// A single middleware in the dispatch pipeline.
///
/// Execution order follows registration order on the way in and reverses
/// on the way out.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> McpResult<()>;
}

/// The dispatch tail: resolves and runs the method handler.
#[async_trait]
pub(crate) trait Endpoint: Send + Sync {
    async fn call(&self, ctx: &mut RequestContext) -> McpResult<()>;
}

/// Handle to the remainder of the middleware chain.
pub struct Next<'a> {
    pub(crate) chain: &'a [Arc<dyn Middleware>],
    pub(crate) endpoint: &'a dyn Endpoint,
}

impl Next<'_> {
    /// Run the rest of the chain, ending at the dispatch tail.
    ///
    /// Consumes `self`: advancing the chain twice from the same middleware
    /// is unrepresentable.
    pub async fn run(mut self, ctx: &mut RequestContext) -> McpResult<()> {
        if let Some((current, rest)) = self.chain.split_first() {
            self.chain = rest;
            current.handle(ctx, self).await
        } else {
            self.endpoint.call(ctx).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::DispatchOptions;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    struct Recorder {
        label: &'static str,
        trace: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Middleware for Recorder {
        async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> McpResult<()> {
            self.trace.lock().unwrap().push(format!("{}-pre", self.label));
            next.run(ctx).await?;
            self.trace.lock().unwrap().push(format!("{}-post", self.label));
            Ok(())
        }
    }

    struct ShortCircuit;

    #[async_trait]
    impl Middleware for ShortCircuit {
        async fn handle(&self, _ctx: &mut RequestContext, _next: Next<'_>) -> McpResult<()> {
            Ok(())
        }
    }

    struct TraceTail {
        trace: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Endpoint for TraceTail {
        async fn call(&self, ctx: &mut RequestContext) -> McpResult<()> {
            self.trace.lock().unwrap().push("tail".to_string());
            ctx.state.insert("tail_ran".to_string(), Value::Bool(true));
            Ok(())
        }
    }

    fn context() -> RequestContext {
        RequestContext::new(json!({"method": "ping"}), None, DispatchOptions::default())
    }

    #[tokio::test]
    async fn test_onion_ordering() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let chain: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Recorder {
                label: "A",
                trace: Arc::clone(&trace),
            }),
            Arc::new(Recorder {
                label: "B",
                trace: Arc::clone(&trace),
            }),
        ];
        let tail = TraceTail {
            trace: Arc::clone(&trace),
        };

        let mut ctx = context();
        let next = Next {
            chain: &chain,
            endpoint: &tail,
        };
        next.run(&mut ctx).await.unwrap();

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["A-pre", "B-pre", "tail", "B-post", "A-post"]
        );
    }

    #[tokio::test]
    async fn test_skipping_next_skips_tail() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(ShortCircuit)];
        let tail = TraceTail {
            trace: Arc::clone(&trace),
        };

        let mut ctx = context();
        let next = Next {
            chain: &chain,
            endpoint: &tail,
        };
        next.run(&mut ctx).await.unwrap();

        assert!(trace.lock().unwrap().is_empty());
        assert!(!ctx.state.contains_key("tail_ran"));
    }

    #[tokio::test]
    async fn test_empty_chain_runs_tail_directly() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let tail = TraceTail {
            trace: Arc::clone(&trace),
        };

        let mut ctx = context();
        let next = Next {
            chain: &[],
            endpoint: &tail,
        };
        next.run(&mut ctx).await.unwrap();

        assert_eq!(*trace.lock().unwrap(), vec!["tail"]);
    }
}
