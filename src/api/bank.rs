use std::marker::PhantomData;

use crate::error::ApiError;
use crate::naming::BANK;
use crate::transport::{ApiRequest, Transport};
use crate::types::{Asset, BlockQuery, BlockQueryResult, PageQuery, PageResult, Transaction};

/// Client of the bank, which settles pending transactions.
#[derive(Clone, Debug)]
pub struct BankApi<A> {
    transport: Transport,
    _asset: PhantomData<fn() -> A>,
}

impl<A: Asset> BankApi<A> {
    pub(super) fn new(transport: Transport) -> Self {
        Self {
            transport,
            _asset: PhantomData,
        }
    }

    /// Marks the transaction completed. The transition is one-way and is
    /// enforced by the ledger.
    pub fn complete_transaction(&self, tx_id: &str) -> ApiRequest<()> {
        self.transport
            .post_empty(&[BANK, "transaction", "complete", tx_id])
    }

    pub fn get_transaction(&self, tx_id: &str) -> ApiRequest<Transaction<A::Ref>> {
        self.transport.get(&[BANK, "transaction", tx_id])
    }

    pub fn list_transactions(
        &self,
        query: &PageQuery,
    ) -> ApiRequest<PageResult<Transaction<A::Ref>>> {
        self.transport
            .get_with_query(&[BANK, "transaction", "list"], query)
    }

    pub async fn list_all_transactions(
        &self,
        query: PageQuery,
    ) -> Result<Vec<Transaction<A::Ref>>, ApiError> {
        super::list_all(query, |page| self.list_transactions(&page)).await
    }

    pub fn block_list(&self, query: &BlockQuery) -> ApiRequest<BlockQueryResult> {
        self.transport
            .get_with_query(&[BANK, "block", "list"], query)
    }
}
