//! Middleware composition.
//!
//! A chain is an ordered list of layers ending in a tail handler. Each layer receives the context
//! and a [`Next`] handle for the rest of the chain. A layer may change the context, short-circuit,
//! or post-process the response. Layers run in registration order; past the last layer the tail
//! answers. [`Chain::new`] uses `R::default()` as the tail, [`Chain::with_tail`] takes any handler.
mod r#async;
pub use r#async::{AsyncChain, AsyncMiddleware, AsyncNext};

mod pipeline;
pub use pipeline::Pipeline;

use std::sync::Arc;

use tracing::trace;

/// One synchronous layer of a [`Chain`].
pub trait Middleware<C, R>: Send + Sync {
    fn handle(&self, ctx: C, next: Next<'_, C, R>) -> R;
}

impl<C, R, F> Middleware<C, R> for F
where
    F: for<'a> Fn(C, Next<'a, C, R>) -> R + Send + Sync,
{
    fn handle(&self, ctx: C, next: Next<'_, C, R>) -> R {
        self(ctx, next)
    }
}

type Tail<C, R> = dyn Fn(C) -> R + Send + Sync;

/// Handle to the remainder of a [`Chain`].
pub struct Next<'a, C, R> {
    rest: &'a [Arc<dyn Middleware<C, R>>],
    tail: &'a Tail<C, R>,
}

impl<C, R> Next<'_, C, R> {
    /// Pass `ctx` to the next layer, or to the tail after the last one.
    pub fn run(self, ctx: C) -> R {
        match self.rest.split_first() {
            Some((layer, rest)) => layer.handle(
                ctx,
                Next {
                    rest,
                    tail: self.tail,
                },
            ),
            None => (self.tail)(ctx),
        }
    }
}

/// Ordered synchronous middleware chain.
pub struct Chain<C, R> {
    layers: Vec<Arc<dyn Middleware<C, R>>>,
    tail: Arc<Tail<C, R>>,
}

impl<C: 'static, R: Default + 'static> Chain<C, R> {
    /// Chain whose tail answers `R::default()`.
    #[inline]
    pub fn new() -> Self {
        Self::with_tail(|_| R::default())
    }
}

impl<C, R> Chain<C, R> {
    /// Chain whose tail is `tail`.
    pub fn with_tail<T>(tail: T) -> Self
    where
        T: Fn(C) -> R + Send + Sync + 'static,
    {
        Self {
            layers: Vec::new(),
            tail: Arc::new(tail),
        }
    }

    /// Append a closure layer.
    pub fn layer<F>(mut self, layer: F) -> Self
    where
        F: for<'a> Fn(C, Next<'a, C, R>) -> R + Send + Sync + 'static,
        C: 'static,
        R: 'static,
    {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Append a shared layer.
    #[inline]
    pub fn register(&mut self, layer: Arc<dyn Middleware<C, R>>) {
        self.layers.push(layer);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn run(&self, ctx: C) -> R {
        trace!(target: "taskkit_core::chain", layers = self.layers.len(), "running chain");
        Next {
            rest: &self.layers,
            tail: &*self.tail,
        }
        .run(ctx)
    }
}

impl<C: 'static, R: Default + 'static> Default for Chain<C, R> {
    fn default() -> Self {
        Self::new()
    }
}
