//! Per-request deadlines
//!
//! A [`Deadline`] carrying the store budget is stamped on every request as it
//! enters the router and handed to the handler. Its clock starts when the
//! store call starts, so time spent receiving the request body is bounded by
//! the server's read handling and never eats into the store budget. Each
//! handler makes a single store call, which the budget covers entirely.
//! Expiry drops the store future, which abandons the in-flight operation.

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    budget: Duration,
}

impl Deadline {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// Run a store operation, failing with `DeadlineExceeded` if it does not
    /// finish within the budget.
    pub async fn run<T, F>(self, operation: F) -> tasks_core::Result<T>
    where
        F: Future<Output = tasks_core::Result<T>>,
    {
        tokio::time::timeout(self.budget, operation)
            .await
            .unwrap_or_else(|_| {
                tracing::warn!(budget = ?self.budget, "Store operation timed out");
                Err(tasks_core::Error::DeadlineExceeded(self.budget))
            })
    }
}

/// Middleware that attaches the request deadline
pub async fn stamp_deadline(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    request
        .extensions_mut()
        .insert(Deadline::new(state.config().request_timeout));
    next.run(request).await
}

impl<S> FromRequestParts<S> for Deadline
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Deadline>()
            .copied()
            .unwrap_or_else(|| Deadline::new(DEFAULT_REQUEST_TIMEOUT)))
    }
}
