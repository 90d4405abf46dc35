//! Typed clients for the three backend roles.
//!
//! An [`ApiClient`] is constructed explicitly and handed to whoever needs it,
//! so clients for different backends or deployments can live side by side.

mod bank;
mod registrar;
mod trading;

use std::marker::PhantomData;

pub use bank::BankApi;
pub use registrar::{
    CertificateFile, RegistrarApi, CERTIFICATE_FILE_FIELD, CERT_TYPE_FIELD, VERIFICATION_FILE_FIELD,
};
pub use trading::TradingApi;

use crate::error::ApiError;
use crate::transport::{ClientConfig, Transport};
use crate::types::{Asset, PageQuery, PageResult};
use crate::validate::Validate;

#[derive(Debug)]
pub struct ApiClient<A> {
    transport: Transport,
    _asset: PhantomData<fn() -> A>,
}

impl<A> Clone for ApiClient<A> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            _asset: PhantomData,
        }
    }
}

impl<A: Asset> ApiClient<A> {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            transport: Transport::new(config)?,
            _asset: PhantomData,
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn registrar(&self) -> RegistrarApi<A> {
        RegistrarApi::new(self.transport.clone())
    }

    pub fn trading(&self) -> TradingApi<A> {
        TradingApi::new(self.transport.clone())
    }

    pub fn bank(&self) -> BankApi<A> {
        BankApi::new(self.transport.clone())
    }
}

/// Follows bookmarks from `query` until the backend hands back an empty page,
/// an empty bookmark or the bookmark it was given, and returns every record.
pub async fn list_all<T, F>(query: PageQuery, mut fetch: F) -> Result<Vec<T>, ApiError>
where
    T: Validate,
    F: FnMut(PageQuery) -> crate::transport::ApiRequest<PageResult<T>>,
{
    let mut records = Vec::new();
    let mut query = query;
    loop {
        let sent = query.bookmark.clone();
        let page = fetch(query.clone()).await?;
        let done = page.records.is_empty() || page.bookmark.is_empty() || page.bookmark == sent;
        tracing::debug!(
            target: "api",
            fetched = page.records.len(),
            total = page.records_count,
            "fetched page"
        );
        records.extend(page.records);
        if done {
            return Ok(records);
        }
        query = query.with_bookmark(page.bookmark);
    }
}
