//! Testing utilities for the fsd provider.
//!
//! [`ProviderTester`] drives a [`ProviderService`] directly, with no plugin
//! host in between. [`LogCapture`] records formatted log output so tests can
//! check what was logged and that secrets were not.
//!
//! # Example
//!
//! ```ignore
//! use fsd_provider::testing::ProviderTester;
//! use fsd_provider::FsdProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_configure() {
//!     let tester = ProviderTester::new(FsdProvider::new());
//!     tester
//!         .configure(json!({
//!             "host": "http://localhost:19090",
//!             "username": "education",
//!             "password": "test123"
//!         }))
//!         .await
//!         .unwrap();
//! }
//! ```

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::ProviderError;
use crate::schema::{has_errors, Diagnostic};
use crate::service::ProviderService;
use crate::types::PlanResult;

/// A test harness around a provider.
///
/// Validation and configure results are folded into [`TestError`] so a
/// passing call is simply `Ok(())`. Single operations go straight through
/// [`ProviderTester::provider`].
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate provider configuration.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, proposed_state.clone(), proposed_state)
            .await
    }

    /// Plan a resource update.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(
                resource_type,
                Some(prior_state),
                proposed_state.clone(),
                proposed_state,
            )
            .await
    }

    /// Plan a resource deletion.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source configuration.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Plan, create, then read. Returns the state after read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan_result = self.plan_create(resource_type, config).await?;
        let created_state = self
            .provider
            .create(resource_type, plan_result.planned_state)
            .await?;
        self.provider.read(resource_type, created_state).await
    }

    /// Plan, update, then read. Returns the state after read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan_result = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;
        let updated_state = self
            .provider
            .update(resource_type, prior_state, plan_result.planned_state)
            .await?;
        self.provider.read(resource_type, updated_state).await
    }

    /// Plan a deletion, then delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.plan_delete(resource_type, current_state.clone())
            .await?;
        self.provider.delete(resource_type, current_state).await
    }

    /// Create, update, then delete.
    ///
    /// Returns the state after the update.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created_state = self.lifecycle_create(resource_type, initial_config).await?;
        let updated_state = self
            .lifecycle_update(resource_type, created_state, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated_state.clone())
            .await?;
        Ok(updated_state)
    }
}

/// Failure of a [`ProviderTester`] call.
#[derive(Debug, Error)]
pub enum TestError {
    /// Error diagnostics came back; warnings are dropped.
    #[error("{} error diagnostic(s): {}", .0.len(), describe(.0))]
    Diagnostics(Vec<Diagnostic>),
    #[allow(missing_docs)]
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

fn describe(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| match &d.attribute {
            Some(attribute) => format!("{} (at {})", d.summary, attribute),
            None => d.summary.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Keep only the error diagnostics; any left over fail the operation.
fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    if !has_errors(&diagnostics) {
        return Ok(());
    }
    let errors = diagnostics.into_iter().filter(Diagnostic::is_error).collect();
    Err(TestError::Diagnostics(errors))
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan has a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan does not have a change for the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        has_change,
        "Expected plan to change attribute '{}'. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan result indicates no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that an error diagnostic sits on `attribute` and its summary
/// contains `summary`.
///
/// # Panics
///
/// Panics if no such diagnostic exists.
pub fn assert_error_at(diagnostics: &[Diagnostic], attribute: &str, summary: &str) {
    let found = diagnostics.iter().any(|d| {
        d.is_error() && d.attribute.as_deref() == Some(attribute) && d.summary.contains(summary)
    });
    assert!(
        found,
        "Expected an error at '{}' containing '{}', got: {:?}",
        attribute,
        summary,
        diagnostics
            .iter()
            .map(|d| (d.attribute.as_deref(), d.summary.as_str()))
            .collect::<Vec<_>>()
    );
}

// =========================================================================
// Log Capture
// =========================================================================

/// In-memory sink for formatted log output.
///
/// ```
/// use fsd_provider::testing::LogCapture;
///
/// let capture = LogCapture::new();
/// capture.run(|| tracing::info!(user = "alice", "hello"));
/// assert!(capture.contents().contains("user=\"alice\""));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Create an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with every event at any level recorded into this capture.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    /// Everything captured so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeChange;
    use serde_json::json;

    #[test]
    fn test_check_diagnostics_ignores_warnings() {
        let result = check_diagnostics(vec![Diagnostic::warning("heads up")]);
        assert!(result.is_ok());

        let result = check_diagnostics(vec![
            Diagnostic::warning("heads up"),
            Diagnostic::error("broken").with_attribute("host"),
        ]);
        match result {
            Err(TestError::Diagnostics(diags)) => {
                assert_eq!(diags.len(), 1);
                assert_error_at(&diags, "host", "broken");
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_error_display() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("Missing fsd API Host").with_attribute("host"),
            Diagnostic::error("Unable to Create fsd API Client"),
        ]);
        assert_eq!(
            err.to_string(),
            "2 error diagnostic(s): Missing fsd API Host (at host); Unable to Create fsd API Client"
        );
    }

    #[test]
    #[should_panic(expected = "Expected an error at 'username'")]
    fn test_assert_error_at_wrong_attribute() {
        let diags = [Diagnostic::error("Missing").with_attribute("host")];
        assert_error_at(&diags, "username", "Missing");
    }

    #[test]
    fn test_plan_assertions() {
        let plan = PlanResult::with_changes(
            json!({"id": "1"}),
            vec![AttributeChange::added("id", json!("1"))],
            false,
        );
        assert_plan_changes_attribute(&plan, "id");
        assert_plan_no_changes(&PlanResult::no_change(json!({})));
    }

    #[test]
    fn test_log_capture_records_events() {
        let capture = LogCapture::new();
        let value = capture.run(|| {
            tracing::debug!(fsd_host = "http://localhost:19090", "Creating fsd client");
            7
        });

        assert_eq!(value, 7);
        let output = capture.contents();
        assert!(output.contains("DEBUG"));
        assert!(output.contains("Creating fsd client"));
        assert!(output.contains("fsd_host=\"http://localhost:19090\""));
    }

    #[test]
    fn test_log_capture_is_scoped() {
        let capture = LogCapture::new();
        capture.run(|| tracing::info!("inside"));
        tracing::info!("outside");

        let output = capture.contents();
        assert!(output.contains("inside"));
        assert!(!output.contains("outside"));
    }
}
