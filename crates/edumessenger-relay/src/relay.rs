// Copyright 2024-Present eduMessenger. https://edumessenger.org/
// SPDX-License-Identifier: Apache-2.0

//! The relay facade: wires configuration, enrichment, the buffer and the
//! flusher together and owns the one-time site registration.

use std::sync::{Arc, OnceLock};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::aggregator::ActionAggregator;
use crate::config::{RelayConfig, STORE_NAME};
use crate::enrichment::Enricher;
use crate::error::RelayError;
use crate::event::{ActivityEvent, ManageRegistration, OutboundAction, RelayPayload};
use crate::flusher::{ActionFlusher, HttpActionFlusher};
use crate::platform::{LogoStore, PlatformDirectory, PlatformSettings};

/// Bumped whenever the registration payload shape changes, so every site
/// re-registers on upgrade.
const REGISTRATION_VERSION: &str = "v0000004";

/// Placeholder until the service supports a site-provided description.
const DESCRIPTION_PLACEHOLDER: &str = "[Beschreibung]";

static GLOBAL: OnceLock<Arc<Relay>> = OnceLock::new();

/// Forwards platform activity events to eduMessenger.
///
/// The host builds one relay at startup, hands it every activity event via
/// [`Relay::record`], and calls [`Relay::dispose`] at shutdown. Buffered
/// actions are posted upstream once the buffer exceeds its threshold.
pub struct Relay {
    enricher: Enricher,
    flusher: Arc<dyn ActionFlusher>,
    aggregator: Mutex<ActionAggregator>,
    ready: bool,
}

impl Relay {
    /// Builds the relay and performs the one-time site registration.
    ///
    /// Never fails: a relay whose setup failed is returned not ready, and a
    /// relay that is not ready buffers events without ever transmitting.
    pub async fn connect(
        config: RelayConfig,
        directory: Arc<dyn PlatformDirectory>,
        settings: Arc<dyn PlatformSettings>,
        logo: Arc<dyn LogoStore>,
    ) -> Relay {
        let flusher = Arc::new(HttpActionFlusher::new(&config));
        Self::with_flusher(config, directory, settings, logo, flusher).await
    }

    /// Relay backed by a caller-supplied flusher. Useful for tests.
    pub async fn with_flusher(
        config: RelayConfig,
        directory: Arc<dyn PlatformDirectory>,
        settings: Arc<dyn PlatformSettings>,
        logo: Arc<dyn LogoStore>,
        flusher: Arc<dyn ActionFlusher>,
    ) -> Relay {
        let mut aggregator = ActionAggregator::default();
        let ready = match register_site(
            &config,
            directory.as_ref(),
            settings.as_ref(),
            logo.as_ref(),
            &mut aggregator,
        )
        .await
        {
            Ok(()) => true,
            Err(err) => {
                error!("eduMessenger setup failed: {err}");
                false
            }
        };

        Relay {
            enricher: Enricher::new(directory),
            flusher,
            aggregator: Mutex::new(aggregator),
            ready,
        }
    }

    /// Whether setup succeeded and flushes will reach the service.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether the relay's store is switched on in the platform's log store
    /// list.
    pub async fn is_enabled(settings: &dyn PlatformSettings) -> bool {
        match settings.enabled_log_stores().await {
            Ok(stores) => stores.split(',').any(|name| name == STORE_NAME),
            Err(err) => {
                debug!("Cannot read enabled log stores: {err}");
                false
            }
        }
    }

    /// Buffers a platform activity event for relay.
    ///
    /// Unsupported event kinds are dropped. Transmission problems never
    /// reach the caller; flush outcomes are logged.
    pub async fn record(&self, event: ActivityEvent) {
        let Some(event) = self.enricher.enrich(event).await else {
            return;
        };
        self.enqueue(OutboundAction::Event { event }).await;
    }

    /// Appends an action; flushes once the buffer exceeds its threshold.
    pub async fn enqueue(&self, action: OutboundAction) {
        let over = {
            let mut aggregator = self.aggregator.lock().await;
            aggregator.add(action);
            aggregator.over_threshold()
        };
        if over {
            self.flush().await;
        }
    }

    /// Serializes the buffer and posts it once.
    ///
    /// Best-effort: the buffer is cleared whether or not the POST succeeded.
    /// Does nothing unless the relay is ready and the buffer is non-empty.
    pub async fn flush(&self) {
        if !self.ready {
            return;
        }
        let actions = {
            let mut aggregator = self.aggregator.lock().await;
            if aggregator.is_empty() {
                return;
            }
            aggregator.take_batch()
        };

        let payload = RelayPayload { actions };
        debug!("Flushing {} actions", payload.actions.len());
        if let Err(err) = self.flusher.send(&payload).await {
            error!("Cannot write to eduMessenger: {err}");
        }
    }

    /// Flushes any buffered actions. Hosts call this at shutdown.
    pub async fn dispose(&self) {
        if !self.aggregator.lock().await.is_empty() {
            self.flush().await;
        }
    }

    /// Installs the process-wide relay instance for hosts that want
    /// singleton access. Fails if one is already installed.
    pub fn set_global(relay: Arc<Relay>) -> Result<(), Arc<Relay>> {
        GLOBAL.set(relay)
    }

    /// The process-wide relay instance, if one was installed.
    pub fn global() -> Option<Arc<Relay>> {
        GLOBAL.get().map(Arc::clone)
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        let pending = self.aggregator.get_mut().len();
        if pending > 0 {
            warn!("Relay dropped with {pending} unflushed actions; call dispose() at shutdown");
        }
    }
}

/// Registers the site with the service, once per effective configuration.
///
/// The registration is fingerprinted (with the cheap logo content hash in
/// place of the logo); when the fingerprint matches the stored one there is
/// nothing to send. Otherwise the registration is enqueued with the base64
/// logo content and the new fingerprint persisted.
async fn register_site(
    config: &RelayConfig,
    directory: &dyn PlatformDirectory,
    settings: &dyn PlatformSettings,
    logo: &dyn LogoStore,
    aggregator: &mut ActionAggregator,
) -> Result<(), RelayError> {
    let site = directory.site_info().await?;

    let mut registration = ManageRegistration {
        host: site.root_url,
        ctoken: config.admin_token.clone(),
        active: "1".to_string(),
        title: site.site_name,
        contact: site.support_email,
        etherpadurl: config.etherpad_url.clone(),
        logo: logo.content_hash().await?,
        description: DESCRIPTION_PLACEHOLDER.to_string(),
        allow_registration: config.allow_registration,
        allow_course_creation: config.allow_course_creation,
        base_category: config.base_category,
        base_course: config.base_course,
    };

    let fingerprint = registration_fingerprint(&config.server_url, &registration)?;
    let last = settings.last_registration_fingerprint().await?;
    if last.as_deref() == Some(fingerprint.as_str()) {
        debug!("Site registration unchanged, nothing to send");
        return Ok(());
    }

    registration.logo = logo
        .content()
        .await?
        .map(|content| BASE64.encode(&content));

    aggregator.add(OutboundAction::Manage(registration));
    settings.store_registration_fingerprint(&fingerprint).await?;
    Ok(())
}

fn registration_fingerprint(
    server_url: &str,
    registration: &ManageRegistration,
) -> Result<String, RelayError> {
    let preimage = serde_json::to_vec(&(REGISTRATION_VERSION, server_url, registration))?;
    Ok(hex::encode(Sha256::digest(&preimage)))
}
