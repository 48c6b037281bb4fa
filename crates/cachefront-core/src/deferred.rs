//! Deferred values: results of asynchronous provisioning steps.
//!
//! A [`Deferred<T>`] represents a value that is not known until a remote
//! operation completes (e.g., a platform-assigned resource identifier).
//! It is built on `futures_util::future::Shared`, so resolution is atomic
//! from every consumer's perspective: a consumer either sees nothing yet or
//! the final value, never a partial state. [`Deferred::peek`] exposes the
//! unresolved/resolved distinction without blocking, which is what lets the
//! topology builder branch on resolved content race-free.
//!
//! Combinators mirror the usual functional-reactive surface: `map`,
//! `try_map`, `zip`, and `all` (N values into one).

use cachefront_types::error::GraphError;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, try_join_all};
use tokio::sync::oneshot;

type SharedResult<T> = Shared<BoxFuture<'static, Result<T, GraphError>>>;

/// A value produced by an asynchronous provisioning operation.
///
/// Cheap to clone; every clone observes the same single resolution.
pub struct Deferred<T: Clone> {
    fut: SharedResult<T>,
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            fut: self.fut.clone(),
        }
    }
}

/// Shows only the resolution state, never the value: deferred values can
/// carry credential material.
impl<T: Clone> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.fut.peek() {
            Some(Ok(_)) => f.write_str("Deferred(resolved)"),
            Some(Err(_)) => f.write_str("Deferred(failed)"),
            None => f.write_str("Deferred(pending)"),
        }
    }
}

/// Write-once handle paired with a pending [`Deferred`].
///
/// Dropping the resolver without resolving surfaces as
/// [`GraphError::Unresolved`] naming the value, so a missing dependency is
/// always attributable.
pub struct Resolver<T> {
    tx: oneshot::Sender<T>,
}

impl<T> Resolver<T> {
    /// Resolve the paired deferred value. Consumes the resolver: a deferred
    /// value is read-once-resolved.
    pub fn resolve(self, value: T) {
        // Nobody waiting is fine -- the value may simply be unused.
        let _ = self.tx.send(value);
    }
}

impl<T> std::fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Resolver")
    }
}

impl<T> Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// A deferred value that is already resolved.
    pub fn ready(value: T) -> Self {
        Self {
            fut: async move { Ok(value) }.boxed().shared(),
        }
    }

    /// An unresolved deferred value plus the resolver that completes it.
    ///
    /// `label` names the value in the error reported if the resolver is
    /// dropped unresolved.
    pub fn pending(label: impl Into<String>) -> (Self, Resolver<T>) {
        let label = label.into();
        let (tx, rx) = oneshot::channel();
        let fut = async move { rx.await.map_err(|_| GraphError::Unresolved(label)) }
            .boxed()
            .shared();
        (Self { fut }, Resolver { tx })
    }

    /// Suspend until the value resolves.
    pub async fn wait(&self) -> Result<T, GraphError> {
        self.fut.clone().await
    }

    /// Observe the current resolution state without blocking.
    pub fn peek(&self) -> Option<Result<T, GraphError>> {
        self.fut.peek().cloned()
    }

    /// Defer applying a pure function to the resolved value.
    pub fn map<U, F>(&self, f: F) -> Deferred<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let fut = self.fut.clone();
        Deferred {
            fut: async move { fut.await.map(f) }.boxed().shared(),
        }
    }

    /// Like [`Deferred::map`], for functions that can fail.
    pub fn try_map<U, F>(&self, f: F) -> Deferred<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Result<U, GraphError> + Send + 'static,
    {
        let fut = self.fut.clone();
        Deferred {
            fut: async move { f(fut.await?) }.boxed().shared(),
        }
    }

    /// Combine two deferred values into one that resolves when both have.
    pub fn zip<U>(&self, other: &Deferred<U>) -> Deferred<(T, U)>
    where
        U: Clone + Send + Sync + 'static,
    {
        let a = self.fut.clone();
        let b = other.fut.clone();
        Deferred {
            fut: async move { Ok((a.await?, b.await?)) }.boxed().shared(),
        }
    }

    /// Combine N deferred values into one that resolves when all have.
    pub fn all(values: Vec<Deferred<T>>) -> Deferred<Vec<T>> {
        let futs: Vec<_> = values.into_iter().map(|d| d.fut).collect();
        Deferred {
            fut: async move { try_join_all(futs).await }.boxed().shared(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_resolves_immediately() {
        let d = Deferred::ready(7);
        assert_eq!(d.wait().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_pending_then_resolve() {
        let (d, resolver) = Deferred::pending("bucket-arn");
        assert!(d.peek().is_none(), "unresolved value must not be observable");

        resolver.resolve("arn:aws:s3:::cache".to_string());
        assert_eq!(d.wait().await.unwrap(), "arn:aws:s3:::cache");
        assert!(matches!(d.peek(), Some(Ok(_))));
    }

    #[tokio::test]
    async fn test_dropped_resolver_names_the_value() {
        let (d, resolver) = Deferred::<String>::pending("oai-arn");
        drop(resolver);
        let err = d.wait().await.unwrap_err();
        assert!(err.to_string().contains("oai-arn"), "got: {err}");
    }

    #[tokio::test]
    async fn test_map_applies_after_resolution() {
        let (d, resolver) = Deferred::pending("domain");
        let mapped = d.map(|domain: String| format!("https://{domain}"));
        resolver.resolve("cdn.example.net".to_string());
        assert_eq!(mapped.wait().await.unwrap(), "https://cdn.example.net");
    }

    #[tokio::test]
    async fn test_map_propagates_unresolved_error() {
        let (d, resolver) = Deferred::<i32>::pending("missing");
        let mapped = d.map(|n| n * 2);
        drop(resolver);
        assert!(mapped.wait().await.is_err());
    }

    #[tokio::test]
    async fn test_zip_waits_for_both() {
        let (a, ra) = Deferred::pending("a");
        let (b, rb) = Deferred::pending("b");
        let both = a.zip(&b);
        rb.resolve(2);
        ra.resolve(1);
        assert_eq!(both.wait().await.unwrap(), (1, 2));
    }

    #[tokio::test]
    async fn test_all_combines_n_values() {
        let values: Vec<Deferred<i32>> = (0..5).map(Deferred::ready).collect();
        let combined = Deferred::all(values);
        assert_eq!(combined.wait().await.unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_every_clone_sees_the_same_resolution() {
        let (d, resolver) = Deferred::pending("shared");
        let d2 = d.clone();
        resolver.resolve(42);
        assert_eq!(d.wait().await.unwrap(), 42);
        assert_eq!(d2.wait().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_debug_shows_state_not_value() {
        let (d, resolver) = Deferred::pending("secret-value");
        assert_eq!(format!("{d:?}"), "Deferred(pending)");

        resolver.resolve("s3cret".to_string());
        d.wait().await.unwrap();
        let rendered = format!("{d:?}");
        assert_eq!(rendered, "Deferred(resolved)");
        assert!(!rendered.contains("s3cret"));
    }

    #[tokio::test]
    async fn test_try_map_failure_surfaces() {
        let d = Deferred::ready(1);
        let failed = d.try_map(|_| {
            Err::<i32, _>(GraphError::MissingOutput {
                resource: "cdn".to_string(),
                output: "domainName".to_string(),
            })
        });
        let err = failed.wait().await.unwrap_err();
        assert!(err.to_string().contains("domainName"));
    }
}
