//! Recursion guard.
//!
//! Counts nested fragment expansions for one top-level invocation. Entry is
//! refused once the depth has reached the limit, so a refused entry leaves
//! the depth untouched and the caller has nothing to undo.

use thiserror::Error;

/// Default ceiling on nested expansions.
pub const DEFAULT_MAX_DEPTH: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("more than {limit} nested expansions")]
pub struct DepthExceeded {
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursionGuard {
    depth: usize,
    limit: usize,
}

impl RecursionGuard {
    pub fn new(limit: usize) -> Self {
        Self { depth: 0, limit }
    }

    pub fn enter(&mut self) -> Result<(), DepthExceeded> {
        if self.depth >= self.limit {
            return Err(DepthExceeded { limit: self.limit });
        }
        self.depth += 1;
        log::trace!("expansion depth {} of {}", self.depth, self.limit);
        Ok(())
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for RecursionGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_entry_at_limit_without_changing_depth() {
        let mut guard = RecursionGuard::new(2);
        assert!(guard.enter().is_ok());
        assert!(guard.enter().is_ok());
        assert_eq!(guard.enter(), Err(DepthExceeded { limit: 2 }));
        assert_eq!(guard.depth(), 2);
        guard.exit();
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn exit_never_underflows() {
        let mut guard = RecursionGuard::default();
        guard.exit();
        assert_eq!(guard.depth(), 0);
        assert_eq!(guard.limit(), DEFAULT_MAX_DEPTH);
    }
}
