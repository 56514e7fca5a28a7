//! Request-scoped actor context.
//!
//! Every mutating operation receives a `RequestContext` carrying the
//! authenticated actor for audit columns. The context is built per request
//! and passed explicitly - it is never stored in shared mutable state.

/// The authenticated actor performing an operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Actor identifier written to `created_by`/`updated_by` audit columns.
    pub actor: String,
}

impl RequestContext {
    /// Creates a context for the given actor.
    #[must_use]
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_carries_actor() {
        let ctx = RequestContext::new("clerk@probill.dev");
        assert_eq!(ctx.actor, "clerk@probill.dev");
    }
}
