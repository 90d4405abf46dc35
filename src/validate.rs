//! Structural checks applied to every decoded backend response, so that a
//! malformed reply fails at the transport instead of reaching a page.

use crate::error::ApiError;
use crate::types::{
    AssetRef, Block, BlockQueryResult, Car, Certificate, PageResult, Transaction, Vehicle,
    VerifyResult,
};

pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

fn ensure(condition: bool, rule: impl FnOnce() -> String) -> Result<(), ApiError> {
    if condition {
        Ok(())
    } else {
        Err(ApiError::InvalidResponse(rule()))
    }
}

fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

impl Validate for () {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ApiError> {
        self.iter().try_for_each(Validate::validate)
    }
}

impl Validate for Car {
    fn validate(&self) -> Result<(), ApiError> {
        ensure(!self.id.is_empty(), || "car without id".to_string())
    }
}

impl Validate for Vehicle {
    fn validate(&self) -> Result<(), ApiError> {
        ensure(!self.id.is_empty(), || "vehicle without id".to_string())?;
        ensure(self.mileage.is_finite() && self.mileage >= 0.0, || {
            format!("vehicle {} has mileage {}", self.id, self.mileage)
        })
    }
}

impl<R: AssetRef> Validate for Transaction<R> {
    fn validate(&self) -> Result<(), ApiError> {
        ensure(!self.id.is_empty(), || "transaction without id".to_string())?;
        ensure(!self.asset.id().is_empty(), || {
            format!("transaction {} references no asset", self.id)
        })?;
        ensure(self.price.is_finite() && self.price >= 0.0, || {
            format!("transaction {} has price {}", self.id, self.price)
        })
    }
}

impl Validate for Certificate {
    fn validate(&self) -> Result<(), ApiError> {
        ensure(!self.cert_id.is_empty(), || "certificate without id".to_string())?;
        ensure(!self.car_id.is_empty(), || {
            format!("certificate {} references no car", self.cert_id)
        })?;
        ensure(is_sha256_hex(&self.file_hash), || {
            format!("certificate {} has file hash {:?}", self.cert_id, self.file_hash)
        })
    }
}

impl Validate for VerifyResult {
    fn validate(&self) -> Result<(), ApiError> {
        ensure(self.matches == (self.stored_hash == self.current_hash), || {
            format!(
                "match={} disagrees with stored {} / current {}",
                self.matches, self.stored_hash, self.current_hash
            )
        })
    }
}

impl Validate for Block {
    fn validate(&self) -> Result<(), ApiError> {
        ensure(!self.block_hash.is_empty(), || {
            format!("block {} without hash", self.block_num)
        })
    }
}

impl Validate for BlockQueryResult {
    fn validate(&self) -> Result<(), ApiError> {
        ensure(self.blocks.len() as u64 <= self.page_size, || {
            format!(
                "{} blocks on a page of size {}",
                self.blocks.len(),
                self.page_size
            )
        })?;
        ensure(self.has_more == self.expects_more(), || {
            format!(
                "has_more={} on page {} of size {} with {} blocks in total",
                self.has_more, self.page_num, self.page_size, self.total
            )
        })?;
        self.blocks.validate()
    }
}

impl<T: Validate> Validate for PageResult<T> {
    fn validate(&self) -> Result<(), ApiError> {
        ensure(self.fetched_records_count <= self.records_count, || {
            format!(
                "fetched {} of {} records",
                self.fetched_records_count, self.records_count
            )
        })?;
        self.records.validate()
    }
}
