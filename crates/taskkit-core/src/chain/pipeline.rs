/// Ordered list of context transforms.
///
/// Each stage receives the output of the previous one; an empty pipeline returns its input.
pub struct Pipeline<C> {
    stages: Vec<Box<dyn Fn(C) -> C + Send + Sync>>,
}

impl<C> Pipeline<C> {
    #[inline]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn stage<F>(mut self, stage: F) -> Self
    where
        F: Fn(C) -> C + Send + Sync + 'static,
    {
        self.stages.push(Box::new(stage));
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn run(&self, ctx: C) -> C {
        self.stages.iter().fold(ctx, |ctx, stage| stage(ctx))
    }
}

impl<C> Default for Pipeline<C> {
    fn default() -> Self {
        Self::new()
    }
}
