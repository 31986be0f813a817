use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::trace;

/// One asynchronous layer of an [`AsyncChain`].
#[async_trait]
pub trait AsyncMiddleware<C, R>: Send + Sync {
    async fn handle(&self, ctx: C, next: AsyncNext<'_, C, R>) -> R;
}

type AsyncTail<C, R> = dyn Fn(C) -> BoxFuture<'static, R> + Send + Sync;

/// Handle to the remainder of an [`AsyncChain`].
pub struct AsyncNext<'a, C, R> {
    rest: &'a [Arc<dyn AsyncMiddleware<C, R>>],
    tail: &'a AsyncTail<C, R>,
}

impl<C, R> AsyncNext<'_, C, R>
where
    C: Send + 'static,
    R: Send + 'static,
{
    /// Pass `ctx` to the next layer, or to the tail after the last one.
    pub async fn run(self, ctx: C) -> R {
        match self.rest.split_first() {
            Some((layer, rest)) => {
                let next = AsyncNext {
                    rest,
                    tail: self.tail,
                };
                layer.handle(ctx, next).await
            }
            None => (self.tail)(ctx).await,
        }
    }
}

struct FnLayer<F>(F);

#[async_trait]
impl<C, R, F> AsyncMiddleware<C, R> for FnLayer<F>
where
    C: Send + 'static,
    R: Send + 'static,
    F: for<'a> Fn(C, AsyncNext<'a, C, R>) -> BoxFuture<'a, R> + Send + Sync,
{
    async fn handle(&self, ctx: C, next: AsyncNext<'_, C, R>) -> R {
        (self.0)(ctx, next).await
    }
}

/// Ordered asynchronous middleware chain.
///
/// Same contract as [`Chain`](super::Chain): layers run in registration order and may await the
/// rest of the chain. The tail is an async handler; [`AsyncChain::new`] answers `R::default()`.
pub struct AsyncChain<C, R> {
    layers: Vec<Arc<dyn AsyncMiddleware<C, R>>>,
    tail: Arc<AsyncTail<C, R>>,
}

impl<C, R> AsyncChain<C, R>
where
    C: Send + 'static,
    R: Default + Send + 'static,
{
    #[inline]
    pub fn new() -> Self {
        Self::with_tail(|_| async { R::default() })
    }
}

impl<C, R> AsyncChain<C, R>
where
    C: Send + 'static,
    R: Send + 'static,
{
    /// Chain whose tail awaits `tail(ctx)`.
    pub fn with_tail<T, Fut>(tail: T) -> Self
    where
        T: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self {
            layers: Vec::new(),
            tail: Arc::new(move |ctx: C| -> BoxFuture<'static, R> { tail(ctx).boxed() }),
        }
    }

    /// Append a closure layer returning a boxed future.
    pub fn layer<F>(mut self, layer: F) -> Self
    where
        F: for<'a> Fn(C, AsyncNext<'a, C, R>) -> BoxFuture<'a, R> + Send + Sync + 'static,
    {
        self.layers.push(Arc::new(FnLayer(layer)));
        self
    }

    /// Append a shared layer.
    #[inline]
    pub fn register(&mut self, layer: Arc<dyn AsyncMiddleware<C, R>>) {
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

    pub async fn run(&self, ctx: C) -> R {
        trace!(target: "taskkit_core::chain", layers = self.layers.len(), "running async chain");
        let next = AsyncNext {
            rest: &self.layers,
            tail: &*self.tail,
        };
        next.run(ctx).await
    }
}

impl<C, R> Default for AsyncChain<C, R>
where
    C: Send + 'static,
    R: Default + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
