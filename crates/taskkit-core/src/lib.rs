mod error;
pub use error::CoreError;

mod cache;
pub use cache::{CacheKey, CachedAsync, CachedFn, cache_key, cached, cached_async};

pub mod chain;
pub use chain::{AsyncChain, AsyncMiddleware, AsyncNext, Chain, Middleware, Next, Pipeline};

mod memo;
pub use memo::{Memo, memoize};

mod runner;
pub use runner::Runner;
