//! The fsd provider.
//!
//! [`FsdProvider`] owns the configure pass: it validates the provider
//! configuration, resolves it into a [`Client`], and hands that client to a
//! fresh set of resource and data source handlers through [`ProviderData`].
//! Until a configure pass succeeds the handlers run without a client.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::client::Client;
use crate::config::{configure_client, EnvSource, ProcessEnv, ProviderConfig};
use crate::data_sources::{CoffeesDataSource, DataSource, DataSourceFactory};
use crate::error::ProviderError;
use crate::resources::{OrderResource, Resource, ResourceFactory};
use crate::schema::{Diagnostic, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult, ProviderMetadata};
use crate::validation::{validate, validate_result};

/// Provider type name; prefix of every resource and data source type.
pub const TYPE_NAME: &str = "fsd";

const RESOURCES: [ResourceFactory; 2] = [OrderResource::order, OrderResource::try_order];

const DATA_SOURCES: [DataSourceFactory; 2] =
    [CoffeesDataSource::coffees, CoffeesDataSource::try_list];

/// Data handed to every resource and data source after configuration.
#[derive(Debug, Clone)]
pub struct ProviderData {
    /// The shared API client.
    pub client: Arc<Client>,
}

impl ProviderData {
    /// Wrap a freshly built client.
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

fn qualified_name(suffix: &str) -> String {
    format!("{}_{}", TYPE_NAME, suffix)
}

/// Handlers built for one configure pass.
struct Registry {
    data: Option<ProviderData>,
    resources: BTreeMap<String, Box<dyn Resource>>,
    data_sources: BTreeMap<String, Box<dyn DataSource>>,
}

impl Registry {
    fn build(data: Option<ProviderData>) -> Self {
        let resources = RESOURCES
            .iter()
            .map(|factory| {
                let mut resource = factory();
                if let Some(data) = &data {
                    resource.configure(data);
                }
                (qualified_name(resource.type_suffix()), resource)
            })
            .collect();

        let data_sources = DATA_SOURCES
            .iter()
            .map(|factory| {
                let mut data_source = factory();
                if let Some(data) = &data {
                    data_source.configure(data);
                }
                (qualified_name(data_source.type_suffix()), data_source)
            })
            .collect();

        Self {
            data,
            resources,
            data_sources,
        }
    }

    fn resource(&self, resource_type: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources
            .get(resource_type)
            .map(Box::as_ref)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn data_source(&self, data_source_type: &str) -> Result<&dyn DataSource, ProviderError> {
        self.data_sources
            .get(data_source_type)
            .map(Box::as_ref)
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

/// The fsd provider.
pub struct FsdProvider {
    env: Arc<dyn EnvSource>,
    registry: RwLock<Arc<Registry>>,
}

impl FsdProvider {
    /// Create a provider that falls back to the process environment.
    pub fn new() -> Self {
        Self::with_env(ProcessEnv)
    }

    /// Create a provider with a custom environment source.
    pub fn with_env(env: impl EnvSource + 'static) -> Self {
        Self {
            env: Arc::new(env),
            registry: RwLock::new(Arc::new(Registry::build(None))),
        }
    }

    /// The client from the last successful configure pass.
    pub async fn client(&self) -> Option<Arc<Client>> {
        let registry = self.registry().await;
        registry.data.as_ref().map(|data| Arc::clone(&data.client))
    }

    async fn registry(&self) -> Arc<Registry> {
        Arc::clone(&*self.registry.read().await)
    }
}

impl Default for FsdProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FsdProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsdProvider").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ProviderService for FsdProvider {
    fn schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::default().with_provider_config(ProviderConfig::schema());
        for factory in RESOURCES {
            let resource = factory();
            schema =
                schema.with_resource(qualified_name(resource.type_suffix()), resource.schema());
        }
        for factory in DATA_SOURCES {
            let data_source = factory();
            schema = schema.with_data_source(
                qualified_name(data_source.type_suffix()),
                data_source.schema(),
            );
        }
        schema
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: TYPE_NAME.to_string(),
            resources: RESOURCES
                .iter()
                .map(|factory| qualified_name(factory().type_suffix()))
                .collect(),
            data_sources: DATA_SOURCES
                .iter()
                .map(|factory| qualified_name(factory().type_suffix()))
                .collect(),
        }
    }

    #[instrument(skip_all, name = "provider.validate_provider_config")]
    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&ProviderConfig::schema(), &config))
    }

    #[instrument(skip_all, name = "provider.configure")]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        if let Err(diagnostics) = validate_result(&ProviderConfig::schema(), &config) {
            warn!(
                diagnostics = diagnostics.len(),
                "Provider configuration failed validation"
            );
            return Ok(diagnostics);
        }

        let config = ProviderConfig::from_json(&config)?;
        match configure_client(&config, self.env.as_ref()) {
            Ok(client) => {
                let registry = Registry::build(Some(ProviderData::new(client)));
                *self.registry.write().await = Arc::new(registry);
                debug!("Resources and data sources configured");
                Ok(vec![])
            },
            Err(diagnostics) => {
                warn!(
                    diagnostics = diagnostics.len(),
                    "Configure completed with errors"
                );
                Ok(diagnostics)
            },
        }
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        info!("Stopping fsd provider");
        Ok(())
    }

    #[instrument(skip(self, config), name = "provider.validate_resource_config")]
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let registry = self.registry().await;
        let resource = registry.resource(resource_type)?;
        Ok(validate(&resource.schema(), &config))
    }

    #[instrument(skip(self, prior_state, proposed_state, _config), name = "provider.plan")]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let registry = self.registry().await;
        let result = registry
            .resource(resource_type)?
            .plan(prior_state, proposed_state)
            .await?;
        debug!(
            changes = result.changes.len(),
            requires_replace = result.requires_replace,
            "Plan completed"
        );
        Ok(result)
    }

    #[instrument(skip(self, planned_state), name = "provider.create")]
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let registry = self.registry().await;
        registry.resource(resource_type)?.create(planned_state).await
    }

    #[instrument(skip(self, current_state), name = "provider.read")]
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        let registry = self.registry().await;
        registry.resource(resource_type)?.read(current_state).await
    }

    #[instrument(skip(self, prior_state, planned_state), name = "provider.update")]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let registry = self.registry().await;
        registry
            .resource(resource_type)?
            .update(prior_state, planned_state)
            .await
    }

    #[instrument(skip(self, current_state), name = "provider.delete")]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let registry = self.registry().await;
        registry.resource(resource_type)?.delete(current_state).await
    }

    #[instrument(skip(self), name = "provider.import_resource")]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let registry = self.registry().await;
        let state = registry.resource(resource_type)?.import_state(id).await?;
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    #[instrument(skip(self, config), name = "provider.validate_data_source_config")]
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let registry = self.registry().await;
        let data_source = registry.data_source(data_source_type)?;
        Ok(validate(&data_source.schema(), &config))
    }

    #[instrument(skip(self, config), name = "provider.read_data_source")]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let registry = self.registry().await;
        registry.data_source(data_source_type)?.read(config).await
    }
}
