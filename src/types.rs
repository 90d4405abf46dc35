//! Shapes of every value that crosses the backend boundary.
//!
//! Field names follow the backend's JSON byte-for-byte, so there is no
//! mapping layer between the wire and these structs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::naming::{Naming, CAR_DEALER, VEHICLE_AGENCY};
use crate::random;
use crate::validate::Validate;

/// Envelope wrapped around every backend reply.
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

pub const SUCCESS_CODE: i64 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    Available,
    InTransaction,
    Sold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Normal,
    InTransaction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
}

impl CarStatus {
    pub const ALL: [CarStatus; 3] = [Self::Available, Self::InTransaction, Self::Sold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::InTransaction => "IN_TRANSACTION",
            Self::Sold => "SOLD",
        }
    }
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 2] = [Self::Normal, Self::InTransaction];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::InTransaction => "IN_TRANSACTION",
        }
    }
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 3] = [Self::Pending, Self::Completed, Self::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single editable field of a creation form.
#[derive(Clone, Debug, PartialEq)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
}

impl FormField {
    fn new(name: &'static str, label: &'static str, value: impl ToString) -> Self {
        Self {
            name,
            label,
            value: value.to_string(),
        }
    }
}

/// Reference from a transaction to the asset it trades.
///
/// Implementors serialize to exactly one field (`carId` or `vehicleId`) and
/// are flattened into the transaction object.
pub trait AssetRef:
    Serialize + DeserializeOwned + Clone + fmt::Debug + PartialEq + Send + Sync + 'static
{
    fn new(id: impl Into<String>) -> Self;
    fn id(&self) -> &str;
}

/// An asset registered on the ledger by the registrar role.
pub trait Asset:
    Serialize + DeserializeOwned + Validate + Clone + fmt::Debug + Send + Sync + 'static
{
    type Create: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static;
    type Ref: AssetRef;

    const NAMING: Naming;

    fn id(&self) -> &str;
    fn model(&self) -> &str;
    fn current_owner(&self) -> &str;
    fn status_label(&self) -> &'static str;
    /// Variant-specific attributes, for display.
    fn summary(&self) -> String;
    /// Status values accepted by the list filter.
    fn status_filters() -> &'static [&'static str];
    /// Creation form pre-filled with demo values.
    fn demo_form() -> Vec<FormField>;
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: String,
    pub model: String,
    pub vin: String,
    pub current_owner: String,
    pub status: CarStatus,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CreateCar {
    pub id: String,
    pub model: String,
    pub vin: String,
    pub owner: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CarRef {
    #[serde(rename = "carId")]
    pub car_id: String,
}

impl AssetRef for CarRef {
    fn new(id: impl Into<String>) -> Self {
        Self { car_id: id.into() }
    }

    fn id(&self) -> &str {
        &self.car_id
    }
}

impl Asset for Car {
    type Create = CreateCar;
    type Ref = CarRef;

    const NAMING: Naming = CAR_DEALER;

    fn id(&self) -> &str {
        &self.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn current_owner(&self) -> &str {
        &self.current_owner
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn summary(&self) -> String {
        format!("VIN {}", self.vin)
    }

    fn status_filters() -> &'static [&'static str] {
        &["AVAILABLE", "IN_TRANSACTION", "SOLD"]
    }

    fn demo_form() -> Vec<FormField> {
        vec![
            FormField::new("id", "Car ID", random::random_id("CAR")),
            FormField::new("model", "Model", random::random_car_model()),
            FormField::new("vin", "VIN", random::random_vin()),
            FormField::new("owner", "Owner", random::random_name()),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub model: String,
    pub brand: String,
    pub year: i32,
    pub mileage: f64,
    pub condition: String,
    pub current_owner: String,
    pub status: VehicleStatus,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CreateVehicle {
    pub id: String,
    pub model: String,
    pub year: i32,
    pub brand: String,
    pub mileage: f64,
    pub condition: String,
    pub owner: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct VehicleRef {
    #[serde(rename = "vehicleId")]
    pub vehicle_id: String,
}

impl AssetRef for VehicleRef {
    fn new(id: impl Into<String>) -> Self {
        Self {
            vehicle_id: id.into(),
        }
    }

    fn id(&self) -> &str {
        &self.vehicle_id
    }
}

impl Asset for Vehicle {
    type Create = CreateVehicle;
    type Ref = VehicleRef;

    const NAMING: Naming = VEHICLE_AGENCY;

    fn id(&self) -> &str {
        &self.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn current_owner(&self) -> &str {
        &self.current_owner
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn summary(&self) -> String {
        format!(
            "{} {}, {:.1} km, {}",
            self.brand, self.year, self.mileage, self.condition
        )
    }

    fn status_filters() -> &'static [&'static str] {
        &["NORMAL", "IN_TRANSACTION"]
    }

    fn demo_form() -> Vec<FormField> {
        vec![
            FormField::new("id", "Vehicle ID", random::random_id("VEH")),
            FormField::new("brand", "Brand", random::random_brand()),
            FormField::new("model", "Model", random::random_car_model()),
            FormField::new("year", "Year", random::random_year()),
            FormField::new("mileage", "Mileage (km)", random::random_mileage()),
            FormField::new("condition", "Condition", random::random_condition()),
            FormField::new("owner", "Owner", random::random_name()),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction<R> {
    pub id: String,
    #[serde(flatten)]
    pub asset: R,
    pub seller: String,
    pub buyer: String,
    pub price: f64,
    pub status: TransactionStatus,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction<R> {
    pub tx_id: String,
    #[serde(flatten)]
    pub asset: R,
    pub seller: String,
    pub buyer: String,
    pub price: f64,
}

/// Certificate document attached to a car. Only the car-dealer deployment
/// stores certificates.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub cert_id: String,
    pub car_id: String,
    pub cert_type: String,
    pub file_hash: String,
    /// Relative to the backend's data directory.
    pub file_location: String,
    pub upload_time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResult {
    #[serde(rename = "match")]
    pub matches: bool,
    pub stored_hash: String,
    pub current_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Block {
    pub block_num: u64,
    pub block_hash: String,
    pub data_hash: String,
    pub prev_hash: String,
    pub tx_count: u64,
    pub save_time: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlockQueryResult {
    pub blocks: Vec<Block>,
    pub total: u64,
    pub page_size: u64,
    pub page_num: u64,
    pub has_more: bool,
}

impl BlockQueryResult {
    /// Whether another page follows this one, derived from the paging counters.
    pub fn expects_more(&self) -> bool {
        self.page_num.saturating_mul(self.page_size) < self.total
    }

    /// Block numbers within this page whose `prev_hash` does not point at the
    /// adjacent predecessor. Works for either ordering of the page.
    pub fn broken_links(&self) -> Vec<u64> {
        let mut broken = Vec::new();
        for pair in self.blocks.windows(2) {
            let (older, newer) = if pair[0].block_num < pair[1].block_num {
                (&pair[0], &pair[1])
            } else {
                (&pair[1], &pair[0])
            };
            if older.block_num.checked_add(1) != Some(newer.block_num) {
                continue;
            }
            if newer.prev_hash != older.block_hash {
                broken.push(newer.block_num);
            }
        }
        broken
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub bookmark: String,
    pub records: Vec<T>,
    pub records_count: u64,
    pub fetched_records_count: u64,
}

/// Query parameters for bookmark-paged record listings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_size: u32,
    pub bookmark: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl PageQuery {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    pub fn first(page_size: u32) -> Self {
        Self {
            page_size,
            bookmark: String::new(),
            status: None,
        }
    }

    pub fn with_bookmark(mut self, bookmark: impl Into<String>) -> Self {
        self.bookmark = bookmark.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::first(Self::DEFAULT_PAGE_SIZE)
    }
}

/// Query parameters for numbered block pages. Unset fields fall back to the
/// backend defaults (10 per page, page 1).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_num: Option<u32>,
}

impl BlockQuery {
    pub fn page(page_size: u32, page_num: u32) -> Self {
        Self {
            page_size: Some(page_size),
            page_num: Some(page_num),
        }
    }
}
