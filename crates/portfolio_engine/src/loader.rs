use std::sync::Arc;

use page_logging::{page_debug, page_info, page_warn};
use portfolio_core::FragmentName;
use sha2::{Digest, Sha256};

use crate::decode::decode_fragment;
use crate::dom::{Dom, ElementId};
use crate::fetch::{Fetcher, FragmentSource};
use crate::{FailureKind, FetchError, LoadError};

/// Fetched and decoded fragment markup, ready for injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFragment {
    pub markup: String,
    pub url: String,
    pub fingerprint: String,
}

/// Fetches fragments from a [`FragmentSource`] and injects them into their placeholders.
#[derive(Clone)]
pub struct FragmentLoader {
    fetcher: Arc<dyn Fetcher>,
    source: FragmentSource,
}

impl FragmentLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>, source: FragmentSource) -> Self {
        Self { fetcher, source }
    }

    pub fn source(&self) -> &FragmentSource {
        &self.source
    }

    pub fn locate(&self, dom: &Dom, name: &FragmentName) -> Result<ElementId, LoadError> {
        let placeholder = name.placeholder_id();
        dom.by_id(&placeholder)
            .ok_or(LoadError::PlaceholderMissing { placeholder })
    }

    /// GETs the fragment body. Only a non-blank body counts as success.
    pub async fn fetch(&self, name: &FragmentName) -> Result<FetchedFragment, LoadError> {
        let url = self.source.url_for(name).map_err(LoadError::FetchFailed)?;
        page_debug!("Fetching fragment {} from {}", name, url);
        let output = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(LoadError::FetchFailed)?;

        let decoded = decode_fragment(&output.bytes, output.metadata.content_type.as_deref())
            .map_err(|err| {
                LoadError::FetchFailed(FetchError::new(FailureKind::Undecodable, err.to_string()))
            })?;
        if decoded.markup.trim().is_empty() {
            return Err(LoadError::EmptyFragment);
        }

        Ok(FetchedFragment {
            fingerprint: fingerprint(decoded.markup.as_bytes()),
            markup: decoded.markup,
            url: output.metadata.final_url,
        })
    }

    /// Checks whether the fragment directory answers for `name`. Informational
    /// only: the outcome is logged and never stops a load.
    pub async fn check_source(&self, name: &FragmentName) -> bool {
        let url = match self.source.url_for(name) {
            Ok(url) => url,
            Err(err) => {
                page_warn!("Cannot check fragment source: {}", err);
                return false;
            }
        };
        match self.fetcher.fetch(&url).await {
            Ok(output) => {
                page_info!(
                    "Fragment source reachable: {} ({} bytes)",
                    url,
                    output.metadata.byte_len
                );
                true
            }
            Err(err) => {
                page_warn!("Fragment source not reachable at {}: {}", url, err);
                false
            }
        }
    }

    /// Replaces the placeholder's children and flags the marker element, if any.
    pub fn inject(
        &self,
        dom: &mut Dom,
        name: &FragmentName,
        placeholder: ElementId,
        fragment: &FetchedFragment,
    ) {
        dom.set_inner_html(placeholder, fragment.markup.clone());
        mark(dom, name, "loaded");
        page_info!(
            "Fragment {} injected ({} chars, sha256 {})",
            name,
            fragment.markup.len(),
            fragment.fingerprint
        );
    }

    /// Leaves the placeholder untouched and flags the marker element, if any.
    pub fn mark_failed(&self, dom: &mut Dom, name: &FragmentName, err: &LoadError) {
        mark(dom, name, "error");
        page_warn!("Failed to load fragment {}: {}", name, err);
    }
}

fn mark(dom: &mut Dom, name: &FragmentName, class: &str) {
    if let Ok(Some(marker)) = dom.query_first(&name.marker_selector()) {
        dom.add_class(marker, class);
    }
}

fn fingerprint(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .take(6)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
