//! Typed outcome of an orchestrated call: one optional critical fault plus the
//! ordered non-critical faults detected along the way.

use std::fmt;

use thiserror::Error;

use crate::application::cache::CacheError;
use crate::application::repos::RepoError;

/// Backend that produced a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Store,
    Cache,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("product not found: {message}")]
    NotFound { backend: Backend, message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("internal database error: {message}")]
    Store { message: String },
    #[error("internal cache error: {message}")]
    Cache { message: String },
    #[error("service layer error: {message}")]
    Encoding { message: String },
}

impl Fault {
    /// Request input rejected before any backend was called.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn encoding(err: impl fmt::Display) -> Self {
        Self::Encoding {
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Fault::NotFound { .. })
    }
}

impl From<RepoError> for Fault {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { .. } => Fault::NotFound {
                backend: Backend::Store,
                message: err.to_string(),
            },
            RepoError::Persistence(_) | RepoError::Timeout => Fault::Store {
                message: err.to_string(),
            },
        }
    }
}

impl From<CacheError> for Fault {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NotFound { .. } => Fault::NotFound {
                backend: Backend::Cache,
                message: err.to_string(),
            },
            CacheError::Internal(_) => Fault::Cache {
                message: err.to_string(),
            },
        }
    }
}

/// Aggregated faults of one call.
///
/// Returned as the `Err` side of a service call it always carries a critical
/// fault. [`Served::report`] produces the same shape with no critical fault so
/// degraded-but-successful calls can be logged uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    critical: Option<Fault>,
    non_critical: Vec<Fault>,
}

impl ServiceError {
    pub fn critical(fault: impl Into<Fault>, non_critical: Vec<Fault>) -> Self {
        Self {
            critical: Some(fault.into()),
            non_critical,
        }
    }

    pub fn degraded(non_critical: Vec<Fault>) -> Self {
        Self {
            critical: None,
            non_critical,
        }
    }

    pub fn critical_fault(&self) -> Option<&Fault> {
        self.critical.as_ref()
    }

    pub fn non_critical(&self) -> &[Fault] {
        &self.non_critical
    }

    pub fn is_not_found(&self) -> bool {
        self.critical.as_ref().is_some_and(Fault::is_not_found)
    }

    /// Messages in render order: non-critical first, critical last.
    pub fn messages(&self) -> Vec<String> {
        self.non_critical
            .iter()
            .chain(self.critical.iter())
            .map(ToString::to_string)
            .collect()
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fault in &self.non_critical {
            writeln!(f, "{fault}")?;
        }
        if let Some(critical) = &self.critical {
            writeln!(f, "{critical}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

/// A usable value, possibly produced while one backend was degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served<T> {
    value: T,
    warnings: Vec<Fault>,
}

impl<T> Served<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<Fault>) -> Self {
        Self { value, warnings }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn warnings(&self) -> &[Fault] {
        &self.warnings
    }

    /// Aggregated non-critical faults, or `None` on unqualified success.
    pub fn report(&self) -> Option<ServiceError> {
        (!self.warnings.is_empty()).then(|| ServiceError::degraded(self.warnings.clone()))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Served<U> {
        Served {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn into_parts(self) -> (T, Vec<Fault>) {
        (self.value, self.warnings)
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Result of every product service operation.
pub type ServiceResult<T> = Result<Served<T>, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_non_critical_before_critical_one_per_line() {
        let error = ServiceError::critical(
            RepoError::Persistence("connection refused".to_string()),
            vec![Fault::from(CacheError::internal("pool exhausted"))],
        );

        assert_eq!(
            error.to_string(),
            "internal cache error: pool exhausted\ninternal database error: connection refused\n"
        );
    }

    #[test]
    fn renders_degraded_report_without_critical_line() {
        let error = ServiceError::degraded(vec![
            Fault::from(CacheError::NotFound { id: 3 }),
            Fault::from(CacheError::internal("write refused")),
        ]);

        assert_eq!(
            error.to_string(),
            "product not found: product 3 not found in cache\ninternal cache error: write refused\n"
        );
        assert!(error.critical_fault().is_none());
    }

    #[test]
    fn repo_not_found_maps_to_store_not_found() {
        let fault = Fault::from(RepoError::NotFound { id: 9 });
        assert!(matches!(
            fault,
            Fault::NotFound {
                backend: Backend::Store,
                ..
            }
        ));
        assert!(fault.is_not_found());
        assert_eq!(
            fault.to_string(),
            "product not found: failed to find product 9 in DB"
        );
    }

    #[test]
    fn timeout_is_an_internal_store_fault() {
        let fault = Fault::from(RepoError::Timeout);
        assert!(matches!(fault, Fault::Store { .. }));
    }

    #[test]
    fn clean_value_has_no_report() {
        let served = Served::clean(5_u64);
        assert!(served.report().is_none());
        assert_eq!(served.into_value(), 5);
    }

    #[test]
    fn messages_follow_render_order() {
        let error = ServiceError::critical(
            RepoError::NotFound { id: 1 },
            vec![Fault::from(CacheError::NotFound { id: 1 })],
        );
        assert_eq!(
            error.messages(),
            vec![
                "product not found: product 1 not found in cache".to_string(),
                "product not found: failed to find product 1 in DB".to_string(),
            ]
        );
        assert!(error.is_not_found());
    }
}
