use std::sync::mpsc;
use std::time::Instant;

use futures_util::stream::{FuturesUnordered, StreamExt};
use page_logging::page_info;
use portfolio_core::{FragmentName, LoadSummary};

use crate::dom::Dom;
use crate::loader::FragmentLoader;
use crate::{FragmentInfo, LoadEvent};

pub trait LoadObserver: Send + Sync {
    fn emit(&self, event: LoadEvent);
}

/// Forwards load events to a channel; a dropped receiver is ignored.
pub struct ChannelLoadObserver {
    tx: mpsc::Sender<LoadEvent>,
}

impl ChannelLoadObserver {
    pub fn new(tx: mpsc::Sender<LoadEvent>) -> Self {
        Self { tx }
    }
}

impl LoadObserver for ChannelLoadObserver {
    fn emit(&self, event: LoadEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullLoadObserver;

impl LoadObserver for NullLoadObserver {
    fn emit(&self, _event: LoadEvent) {}
}

/// Runs one batch of fragment loads to completion.
///
/// Every fetch is issued before any is awaited. Completions are injected as
/// they arrive, on the caller's task, so the DOM only ever has one writer.
/// A failed fragment never cancels or delays the others.
pub struct LoadBarrier<'a> {
    loader: &'a FragmentLoader,
}

impl<'a> LoadBarrier<'a> {
    pub fn new(loader: &'a FragmentLoader) -> Self {
        Self { loader }
    }

    pub async fn settle(
        &self,
        dom: &mut Dom,
        names: &[FragmentName],
        mut on_event: impl FnMut(LoadEvent),
    ) -> LoadSummary {
        let mut summary = LoadSummary {
            total: names.len(),
            ..LoadSummary::default()
        };
        let mut in_flight = FuturesUnordered::new();

        for name in names {
            let placeholder = match self.loader.locate(dom, name) {
                Ok(placeholder) => placeholder,
                Err(err) => {
                    self.loader.mark_failed(dom, name, &err);
                    summary.failed += 1;
                    on_event(LoadEvent::Finished {
                        name: name.clone(),
                        result: Err(err),
                    });
                    continue;
                }
            };
            on_event(LoadEvent::Started { name: name.clone() });

            let loader = self.loader;
            let name = name.clone();
            let started = Instant::now();
            in_flight.push(async move {
                let result = loader.fetch(&name).await;
                (name, placeholder, started.elapsed(), result)
            });
        }

        while let Some((name, placeholder, elapsed, result)) = in_flight.next().await {
            let load_time_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            let result = match result {
                Ok(fragment) => {
                    self.loader.inject(dom, &name, placeholder, &fragment);
                    summary.loaded += 1;
                    Ok(FragmentInfo {
                        url: fragment.url,
                        size: fragment.markup.len(),
                        load_time_ms,
                        fingerprint: fragment.fingerprint,
                    })
                }
                Err(err) => {
                    self.loader.mark_failed(dom, &name, &err);
                    summary.failed += 1;
                    Err(err)
                }
            };
            on_event(LoadEvent::Finished { name, result });
        }

        page_info!(
            "Loading summary: {} loaded, {} errors",
            summary.loaded,
            summary.failed
        );
        summary
    }
}
