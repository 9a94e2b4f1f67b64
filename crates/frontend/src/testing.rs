// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{collections::HashMap, future::Future, sync::Mutex, time::Duration};

use classdesk_core::{ResourceKind, ResourceReference};
use classdesk_core_api::{Page, PageRequest};
use classdesk_usecases::{
    Error, Result,
    memory::Catalog,
    resource::{GetById, LoadPage},
};

/// An in-memory backend with artificial latency that records
/// all requests.
#[derive(Debug, Default)]
pub(crate) struct TestBackend {
    pub(crate) catalog: Catalog,
    pub(crate) load_delay: Duration,
    pub(crate) lookup_delays: HashMap<String, Duration>,
    pub(crate) offline: bool,
    pub(crate) page_requests: Mutex<Vec<PageRequest>>,
    pub(crate) lookups: Mutex<Vec<String>>,
}

impl TestBackend {
    pub(crate) fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Default::default()
        }
    }

    pub(crate) fn page_requests(&self) -> Vec<PageRequest> {
        self.page_requests.lock().unwrap().clone()
    }

    pub(crate) fn search_texts(&self) -> Vec<String> {
        self.page_requests()
            .into_iter()
            .map(|request| request.params.search_text)
            .collect()
    }

    pub(crate) fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl LoadPage for TestBackend {
    fn load_page(
        &self,
        kind: ResourceKind,
        request: &PageRequest,
    ) -> impl Future<Output = Result<Page<ResourceReference>>> + Send {
        self.page_requests.lock().unwrap().push(request.clone());
        let delay = self.load_delay;
        let offline = self.offline;
        let loaded = self.catalog.load_page(kind, request);
        async move {
            tokio::time::sleep(delay).await;
            if offline {
                return Err(Error::Other(anyhow::anyhow!("offline")));
            }
            loaded.await
        }
    }
}

impl GetById for TestBackend {
    fn get_by_id(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> impl Future<Output = Result<ResourceReference>> + Send {
        self.lookups.lock().unwrap().push(id.to_owned());
        let delay = self.lookup_delays.get(id).copied().unwrap_or_default();
        let found = self.catalog.get_by_id(kind, id);
        async move {
            tokio::time::sleep(delay).await;
            found.await
        }
    }
}

/// Quizzes `q1`, `q2`, ... named `Quiz 1`, `Quiz 2`, ...
pub(crate) fn quiz_catalog(count: usize) -> Catalog {
    let mut catalog = Catalog::default();
    for index in 1..=count {
        catalog.insert(
            ResourceKind::Quiz,
            ResourceReference::new(format!("q{index}"), format!("Quiz {index}")),
        );
    }
    catalog
}

pub(crate) fn file(id: &str, display_name: &str, media_type: &str) -> ResourceReference {
    ResourceReference {
        media_type: Some(media_type.to_owned()),
        ..ResourceReference::new(id, display_name)
    }
}

/// Let all spawned tasks without delays run to completion.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
