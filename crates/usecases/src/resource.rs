// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::future::Future;

use classdesk_core::{ResourceKind, ResourceReference};
use classdesk_core_api::{Page, PageRequest};

use super::*;

/// Remote list-loader for browsing candidates.
///
/// Implementations must be idempotent and safe to be invoked repeatedly,
/// e.g. whenever the search text or the filters change.
pub trait LoadPage {
    fn load_page(
        &self,
        kind: ResourceKind,
        request: &PageRequest,
    ) -> impl Future<Output = Result<Page<ResourceReference>>> + Send;
}

/// Fetch a single entity by its identifier.
pub trait GetById {
    fn get_by_id(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> impl Future<Output = Result<ResourceReference>> + Send;
}

#[derive(Debug)]
pub struct ValidatedRequest(PageRequest);

pub fn validate_request(mut request: PageRequest) -> InputResult<ValidatedRequest> {
    if request.params.normalize() {
        log::debug!(
            "Trimmed search text: \"{search_text}\"",
            search_text = request.params.search_text
        );
    }
    if let Some((key, _)) = request
        .params
        .filters
        .iter()
        .find(|(key, value)| key.trim().is_empty() || value.trim().is_empty())
    {
        return Err(anyhow::anyhow!("Invalid filter: \"{key}\"").into());
    }
    Ok(ValidatedRequest(request))
}

pub async fn load_page<B>(
    backend: &B,
    kind: ResourceKind,
    request: PageRequest,
) -> Result<Page<ResourceReference>>
where
    B: LoadPage + ?Sized,
{
    let ValidatedRequest(request) = validate_request(request)?;
    log::debug!(
        "Loading page {page} of {kind} resources: {params:?}",
        page = request.page,
        params = request.params,
    );
    backend.load_page(kind, &request).await
}

pub async fn resolve<B>(backend: &B, kind: ResourceKind, id: &str) -> Result<ResourceReference>
where
    B: GetById + ?Sized,
{
    let id = id.trim();
    if id.is_empty() {
        return Err(InputError(anyhow::anyhow!("Empty {kind} identifier")).into());
    }
    let resource = backend.get_by_id(kind, id).await?;
    if resource.id != id {
        return Err(anyhow::anyhow!(
            "Mismatching {kind} identifier: expected = {id}, actual = {actual}",
            actual = resource.id
        )
        .into());
    }
    Ok(resource)
}
