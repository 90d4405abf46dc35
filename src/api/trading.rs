use std::marker::PhantomData;

use crate::error::ApiError;
use crate::naming::TRADING_PLATFORM;
use crate::transport::{ApiRequest, Transport};
use crate::types::{
    Asset, BlockQuery, BlockQueryResult, CreateTransaction, PageQuery, PageResult, Transaction,
};

/// Client of the trading platform, which opens transactions between owners.
#[derive(Clone, Debug)]
pub struct TradingApi<A> {
    transport: Transport,
    _asset: PhantomData<fn() -> A>,
}

impl<A: Asset> TradingApi<A> {
    pub(super) fn new(transport: Transport) -> Self {
        Self {
            transport,
            _asset: PhantomData,
        }
    }

    pub fn create_transaction(&self, payload: &CreateTransaction<A::Ref>) -> ApiRequest<()> {
        self.transport
            .post_json(&[TRADING_PLATFORM, "transaction", "create"], payload)
    }

    pub fn get_asset(&self, id: &str) -> ApiRequest<A> {
        self.transport
            .get(&[TRADING_PLATFORM, A::NAMING.entity, id])
    }

    pub fn get_transaction(&self, tx_id: &str) -> ApiRequest<Transaction<A::Ref>> {
        self.transport
            .get(&[TRADING_PLATFORM, "transaction", tx_id])
    }

    pub fn list_transactions(
        &self,
        query: &PageQuery,
    ) -> ApiRequest<PageResult<Transaction<A::Ref>>> {
        self.transport
            .get_with_query(&[TRADING_PLATFORM, "transaction", "list"], query)
    }

    pub async fn list_all_transactions(
        &self,
        query: PageQuery,
    ) -> Result<Vec<Transaction<A::Ref>>, ApiError> {
        super::list_all(query, |page| self.list_transactions(&page)).await
    }

    pub fn block_list(&self, query: &BlockQuery) -> ApiRequest<BlockQueryResult> {
        self.transport
            .get_with_query(&[TRADING_PLATFORM, "block", "list"], query)
    }
}
