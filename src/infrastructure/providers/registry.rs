//! # Provider Registry
//!
//! Builds the three bundled providers from settings.
//!
//! Every provider gets an upstream simulator, exposed natively by the REST
//! layer. An adapter talks to its own simulator in process unless an
//! `endpoint` is configured, in which case it posts over HTTP.

use crate::config::{ProviderSettings, ProvidersSettings};
use crate::domain::value_objects::ProviderId;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::flat_json::{FlatJsonProvider, FlatJsonUpstream};
use crate::infrastructure::providers::http_client::{HttpClient, HttpTransport};
use crate::infrastructure::providers::nested_json::{NestedJsonProvider, NestedJsonUpstream};
use crate::infrastructure::providers::rate_table::RateTable;
use crate::infrastructure::providers::simulation::{MarketSimulation, SimulatedDesk};
use crate::infrastructure::providers::traits::RateProvider;
use crate::infrastructure::providers::transport::{
    InProcessTransport, UpstreamService, UpstreamTransport,
};
use crate::infrastructure::providers::xml::{XmlProvider, XmlUpstream};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Wire format family of a bundled provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// `{"from","to","value"}` → `{"rate"}`.
    FlatJson,
    /// `<XML><From/><To/><Amount/></XML>` → `<XML><Result/></XML>`.
    Xml,
    /// Status-enveloped nested JSON.
    NestedJson,
}

impl ProviderKind {
    /// Maps a bundled provider name onto its format.
    #[must_use]
    pub fn for_name(name: &str) -> Option<Self> {
        match name {
            "API1" => Some(Self::FlatJson),
            "API2" => Some(Self::Xml),
            "API3" => Some(Self::NestedJson),
            _ => None,
        }
    }

    fn rate_table(self) -> ProviderResult<RateTable> {
        let table = match self {
            Self::FlatJson => RateTable::flat_json_defaults(),
            Self::Xml => RateTable::xml_defaults(),
            Self::NestedJson => RateTable::nested_json_defaults(),
        };
        let table = table.map_err(|e| ProviderError::internal(format!("invalid rate table: {e}")))?;
        if table.is_empty() {
            return Err(ProviderError::internal(format!("{self} rate table is empty")));
        }
        Ok(table)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlatJson => write!(f, "flat-json"),
            Self::Xml => write!(f, "xml"),
            Self::NestedJson => write!(f, "nested-json"),
        }
    }
}

/// The configured adapters and every upstream simulator.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn RateProvider>>,
    upstreams: Vec<Arc<dyn UpstreamService>>,
}

impl ProviderRegistry {
    /// Builds adapters for enabled providers and simulators for all of them.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if an HTTP client cannot be created.
    pub fn from_settings(
        settings: &ProvidersSettings,
        simulation: Arc<dyn MarketSimulation>,
    ) -> ProviderResult<Self> {
        let mut providers = Vec::new();
        let mut upstreams = Vec::new();

        for (name, provider_settings) in settings.entries() {
            let Some(kind) = ProviderKind::for_name(name) else {
                continue;
            };
            let provider_id = ProviderId::new(name);
            let table = kind.rate_table()?;
            let rates = table.len();
            let desk = SimulatedDesk::new(
                provider_id.clone(),
                table,
                provider_settings.profile(),
                Arc::clone(&simulation),
            );
            let upstream: Arc<dyn UpstreamService> = match kind {
                ProviderKind::FlatJson => Arc::new(FlatJsonUpstream::new(desk)),
                ProviderKind::Xml => Arc::new(XmlUpstream::new(desk)),
                ProviderKind::NestedJson => Arc::new(NestedJsonUpstream::new(desk)),
            };
            upstreams.push(Arc::clone(&upstream));

            if !provider_settings.enabled {
                info!(provider = %provider_id, "provider disabled");
                continue;
            }

            let transport = Self::transport(provider_settings, upstream)?;
            let timeout_ms = provider_settings.timeout_ms;
            let provider: Arc<dyn RateProvider> = match kind {
                ProviderKind::FlatJson => {
                    Arc::new(FlatJsonProvider::new(provider_id.clone(), timeout_ms, transport))
                }
                ProviderKind::Xml => {
                    Arc::new(XmlProvider::new(provider_id.clone(), timeout_ms, transport))
                }
                ProviderKind::NestedJson => Arc::new(NestedJsonProvider::new(
                    provider_id.clone(),
                    timeout_ms,
                    transport,
                )),
            };
            info!(
                provider = %provider_id,
                format = %kind,
                timeout_ms,
                rates,
                remote = provider_settings.endpoint.is_some(),
                "provider registered"
            );
            providers.push(provider);
        }

        Ok(Self {
            providers,
            upstreams,
        })
    }

    fn transport(
        settings: &ProviderSettings,
        upstream: Arc<dyn UpstreamService>,
    ) -> ProviderResult<Arc<dyn UpstreamTransport>> {
        match &settings.endpoint {
            Some(endpoint) => {
                let client = HttpClient::new(settings.timeout_ms)?;
                let transport = HttpTransport::new(client, endpoint.clone());
                debug!(endpoint = transport.endpoint(), "remote transport configured");
                Ok(Arc::new(transport))
            }
            None => Ok(Arc::new(InProcessTransport::new(upstream))),
        }
    }

    /// Returns the enabled adapters in query order.
    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn RateProvider>] {
        &self.providers
    }

    /// Returns every upstream simulator.
    #[must_use]
    pub fn upstreams(&self) -> &[Arc<dyn UpstreamService>] {
        &self.upstreams
    }

    /// Splits the registry into adapters and upstreams.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Arc<dyn RateProvider>>, Vec<Arc<dyn UpstreamService>>) {
        (self.providers, self.upstreams)
    }
}
