//! In-process stand-in for the ledger REST API. Registrar routes of both
//! deployments are always served; the trading platform and bank deal in one
//! asset kind, chosen with [`MockBackend::start_for`].

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use cartrade::fingerprint::file_hash;
use cartrade::types::{
    Asset, AssetRef, Block, Car, CarRef, CarStatus, Certificate, CreateCar, CreateTransaction,
    CreateVehicle, Transaction, TransactionStatus, Vehicle, VehicleRef, VehicleStatus,
};
use cartrade::{ApiClient, ClientConfig};

type Reply = (StatusCode, Json<Value>);

fn ok(data: impl serde::Serialize) -> Reply {
    (
        StatusCode::OK,
        Json(json!({"code": 200, "message": "success", "data": data})),
    )
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (
        status,
        Json(json!({"code": status.as_u16(), "message": message, "data": null})),
    )
}

#[derive(Default)]
pub struct Faults {
    /// Answer asset reads with HTTP 200 but a failing envelope code.
    pub envelope_error: bool,
    /// Report `has_more` opposite to the page counters.
    pub lie_about_has_more: bool,
}

#[derive(Default)]
pub struct Ledger {
    pub cars: BTreeMap<String, Car>,
    pub vehicles: BTreeMap<String, Vehicle>,
    pub transactions: BTreeMap<String, Transaction<CarRef>>,
    pub vehicle_transactions: BTreeMap<String, Transaction<VehicleRef>>,
    pub certificates: Vec<Certificate>,
    pub files: BTreeMap<String, Vec<u8>>,
    pub blocks: Vec<Block>,
    pub faults: Faults,
}

impl Ledger {
    fn append_block(&mut self, data: &str) {
        let block_num = self.blocks.len() as u64;
        let prev_hash = self
            .blocks
            .last()
            .map(|b| b.block_hash.clone())
            .unwrap_or_default();
        let data_hash = file_hash(data.as_bytes());
        let block_hash = file_hash(format!("{block_num}{prev_hash}{data_hash}").as_bytes());
        self.blocks.push(Block {
            block_num,
            block_hash,
            data_hash,
            prev_hash,
            tx_count: 1,
            save_time: Utc::now().to_rfc3339(),
        });
    }
}

pub type SharedLedger = Arc<Mutex<Ledger>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    #[serde(default = "default_page_size")]
    page_size: usize,
    #[serde(default)]
    bookmark: String,
    #[serde(default)]
    status: String,
}

fn default_page_size() -> usize {
    10
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockParams {
    #[serde(default = "default_page_size")]
    page_size: usize,
    #[serde(default = "default_page_num")]
    page_num: usize,
}

fn default_page_num() -> usize {
    1
}

/// Bookmark is the id of the last record handed out.
fn paginate<T: Clone + serde::Serialize>(
    records: &BTreeMap<String, T>,
    params: &ListParams,
    status_of: impl Fn(&T) -> String,
) -> Value {
    let matching: Vec<(&String, &T)> = records
        .iter()
        .filter(|(_, r)| params.status.is_empty() || status_of(r) == params.status)
        .collect();
    let page: Vec<(&String, &T)> = matching
        .iter()
        .filter(|(id, _)| params.bookmark.is_empty() || id.as_str() > params.bookmark.as_str())
        .take(params.page_size)
        .cloned()
        .collect();
    let bookmark = page
        .last()
        .map(|(id, _)| id.to_string())
        .unwrap_or_else(|| params.bookmark.clone());
    json!({
        "bookmark": bookmark,
        "records": page.iter().map(|(_, r)| (*r).clone()).collect::<Vec<T>>(),
        "recordsCount": matching.len(),
        "fetchedRecordsCount": page.len(),
    })
}

async fn block_list(
    State(ledger): State<SharedLedger>,
    Query(params): Query<BlockParams>,
) -> Reply {
    let ledger = ledger.lock().unwrap();
    let total = ledger.blocks.len();
    let skip = (params.page_num.max(1) - 1) * params.page_size;
    let blocks: Vec<Block> = ledger
        .blocks
        .iter()
        .rev()
        .skip(skip)
        .take(params.page_size)
        .cloned()
        .collect();
    let mut has_more = params.page_num * params.page_size < total;
    if ledger.faults.lie_about_has_more {
        has_more = !has_more;
    }
    ok(json!({
        "blocks": blocks,
        "total": total,
        "page_size": params.page_size,
        "page_num": params.page_num,
        "has_more": has_more,
    }))
}

async fn create_car(State(ledger): State<SharedLedger>, Json(req): Json<CreateCar>) -> Reply {
    let mut ledger = ledger.lock().unwrap();
    if ledger.cars.contains_key(&req.id) {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "car already exists");
    }
    let now = Utc::now();
    let car = Car {
        id: req.id.clone(),
        model: req.model,
        vin: req.vin,
        current_owner: req.owner,
        status: CarStatus::Available,
        create_time: now,
        update_time: now,
    };
    ledger.cars.insert(req.id.clone(), car);
    ledger.append_block(&format!("create car {}", req.id));
    ok(Value::Null)
}

async fn get_car(State(ledger): State<SharedLedger>, Path(id): Path<String>) -> Reply {
    let ledger = ledger.lock().unwrap();
    if ledger.faults.envelope_error {
        return (
            StatusCode::OK,
            Json(json!({"code": 500, "message": "ledger unavailable", "data": null})),
        );
    }
    match ledger.cars.get(&id) {
        Some(car) => ok(car),
        None => fail(StatusCode::INTERNAL_SERVER_ERROR, "car not found"),
    }
}

async fn list_cars(State(ledger): State<SharedLedger>, Query(params): Query<ListParams>) -> Reply {
    let ledger = ledger.lock().unwrap();
    ok(paginate(&ledger.cars, &params, |c| c.status.to_string()))
}

async fn create_vehicle(
    State(ledger): State<SharedLedger>,
    Json(req): Json<CreateVehicle>,
) -> Reply {
    let mut ledger = ledger.lock().unwrap();
    let now = Utc::now();
    let vehicle = Vehicle {
        id: req.id.clone(),
        model: req.model,
        brand: req.brand,
        year: req.year,
        mileage: req.mileage,
        condition: req.condition,
        current_owner: req.owner,
        status: VehicleStatus::Normal,
        create_time: now,
        update_time: now,
    };
    ledger.vehicles.insert(req.id.clone(), vehicle);
    ledger.append_block(&format!("create vehicle {}", req.id));
    ok(Value::Null)
}

async fn get_vehicle(State(ledger): State<SharedLedger>, Path(id): Path<String>) -> Reply {
    let ledger = ledger.lock().unwrap();
    match ledger.vehicles.get(&id) {
        Some(vehicle) => ok(vehicle),
        None => fail(StatusCode::INTERNAL_SERVER_ERROR, "vehicle not found"),
    }
}

async fn list_vehicles(
    State(ledger): State<SharedLedger>,
    Query(params): Query<ListParams>,
) -> Reply {
    let ledger = ledger.lock().unwrap();
    ok(paginate(&ledger.vehicles, &params, |v| v.status.to_string()))
}

async fn read_file_field(
    mut form: Multipart,
    file_field: &str,
) -> Result<(BTreeMap<String, String>, Vec<u8>), Reply> {
    let mut texts = BTreeMap::new();
    let mut file = None;
    let bad_body = |err: axum::extract::multipart::MultipartError| {
        fail(StatusCode::BAD_REQUEST, &err.body_text())
    };
    while let Some(field) = form.next_field().await.map_err(bad_body)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field {
            file = Some(field.bytes().await.map_err(bad_body)?.to_vec());
        } else {
            texts.insert(name, field.text().await.map_err(bad_body)?);
        }
    }
    match file {
        Some(bytes) => Ok((texts, bytes)),
        None => Err(fail(StatusCode::BAD_REQUEST, "missing file")),
    }
}

async fn upload_certificate(
    State(ledger): State<SharedLedger>,
    Path(car_id): Path<String>,
    form: Multipart,
) -> Reply {
    let (texts, bytes) = match read_file_field(form, "certificateFile").await {
        Ok(parts) => parts,
        Err(reply) => return reply,
    };
    let cert_type = match texts.get("certType") {
        Some(t) if !t.is_empty() => t.clone(),
        _ => return fail(StatusCode::BAD_REQUEST, "missing certType"),
    };
    let mut ledger = ledger.lock().unwrap();
    if !ledger.cars.contains_key(&car_id) {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "car not found");
    }
    let cert_id = format!("CERT{:04}", ledger.certificates.len() + 1);
    let certificate = Certificate {
        cert_id: cert_id.clone(),
        car_id: car_id.clone(),
        cert_type,
        file_hash: file_hash(&bytes),
        file_location: format!("certificates/{car_id}/{cert_id}"),
        upload_time: Utc::now(),
    };
    ledger.files.insert(cert_id.clone(), bytes);
    ledger.certificates.push(certificate.clone());
    ledger.append_block(&format!("add certificate {cert_id}"));
    ok(certificate)
}

async fn list_certificates(
    State(ledger): State<SharedLedger>,
    Path(car_id): Path<String>,
) -> Reply {
    let ledger = ledger.lock().unwrap();
    let certs: Vec<&Certificate> = ledger
        .certificates
        .iter()
        .filter(|c| c.car_id == car_id)
        .collect();
    ok(certs)
}

async fn verify_certificate(
    State(ledger): State<SharedLedger>,
    Path(cert_id): Path<String>,
) -> Reply {
    let ledger = ledger.lock().unwrap();
    let Some(cert) = ledger.certificates.iter().find(|c| c.cert_id == cert_id) else {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "certificate not found");
    };
    let current = file_hash(ledger.files.get(&cert_id).map(Vec::as_slice).unwrap_or_default());
    ok(json!({
        "match": cert.file_hash == current,
        "storedHash": cert.file_hash,
        "currentHash": current,
    }))
}

async fn verify_upload(
    State(ledger): State<SharedLedger>,
    Path(car_id): Path<String>,
    form: Multipart,
) -> Reply {
    let (_, bytes) = match read_file_field(form, "verificationFile").await {
        Ok(parts) => parts,
        Err(reply) => return reply,
    };
    let ledger = ledger.lock().unwrap();
    let Some(cert) = ledger.certificates.iter().find(|c| c.car_id == car_id) else {
        return fail(StatusCode::NOT_FOUND, "no original certificate for this car");
    };
    let current = file_hash(&bytes);
    ok(json!({
        "match": cert.file_hash == current,
        "storedHash": cert.file_hash,
        "currentHash": current,
    }))
}

/// Asset side of a trade in one deployment.
pub trait Traded: Asset {
    fn trades(ledger: &mut Ledger) -> &mut BTreeMap<String, Transaction<Self::Ref>>;
    fn lookup(ledger: &Ledger, id: &str) -> Option<Value>;
    /// Marks the asset as being traded.
    fn reserve(ledger: &mut Ledger, id: &str) -> Result<(), &'static str>;
    /// Moves the asset to `buyer` once the bank settles.
    fn hand_over(ledger: &mut Ledger, id: &str, buyer: String);
}

impl Traded for Car {
    fn trades(ledger: &mut Ledger) -> &mut BTreeMap<String, Transaction<CarRef>> {
        &mut ledger.transactions
    }

    fn lookup(ledger: &Ledger, id: &str) -> Option<Value> {
        ledger.cars.get(id).map(|car| json!(car))
    }

    fn reserve(ledger: &mut Ledger, id: &str) -> Result<(), &'static str> {
        match ledger.cars.get_mut(id) {
            Some(car) if car.status == CarStatus::Available => {
                car.status = CarStatus::InTransaction;
                car.update_time = Utc::now();
                Ok(())
            }
            Some(_) => Err("car is not available"),
            None => Err("car not found"),
        }
    }

    fn hand_over(ledger: &mut Ledger, id: &str, buyer: String) {
        if let Some(car) = ledger.cars.get_mut(id) {
            car.status = CarStatus::Sold;
            car.current_owner = buyer;
            car.update_time = Utc::now();
        }
    }
}

impl Traded for Vehicle {
    fn trades(ledger: &mut Ledger) -> &mut BTreeMap<String, Transaction<VehicleRef>> {
        &mut ledger.vehicle_transactions
    }

    fn lookup(ledger: &Ledger, id: &str) -> Option<Value> {
        ledger.vehicles.get(id).map(|vehicle| json!(vehicle))
    }

    fn reserve(ledger: &mut Ledger, id: &str) -> Result<(), &'static str> {
        match ledger.vehicles.get_mut(id) {
            Some(vehicle) if vehicle.status == VehicleStatus::Normal => {
                vehicle.status = VehicleStatus::InTransaction;
                vehicle.update_time = Utc::now();
                Ok(())
            }
            Some(_) => Err("vehicle is already in a transaction"),
            None => Err("vehicle not found"),
        }
    }

    fn hand_over(ledger: &mut Ledger, id: &str, buyer: String) {
        if let Some(vehicle) = ledger.vehicles.get_mut(id) {
            vehicle.status = VehicleStatus::Normal;
            vehicle.current_owner = buyer;
            vehicle.update_time = Utc::now();
        }
    }
}

async fn get_traded<A: Traded>(
    State(ledger): State<SharedLedger>,
    Path(id): Path<String>,
) -> Reply {
    let ledger = ledger.lock().unwrap();
    match A::lookup(&ledger, &id) {
        Some(asset) => ok(asset),
        None => fail(StatusCode::INTERNAL_SERVER_ERROR, "asset not found"),
    }
}

async fn create_transaction<A: Traded>(
    State(ledger): State<SharedLedger>,
    Json(req): Json<CreateTransaction<A::Ref>>,
) -> Reply {
    let mut ledger = ledger.lock().unwrap();
    if let Err(message) = A::reserve(&mut ledger, req.asset.id()) {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, message);
    }
    let now = Utc::now();
    let tx = Transaction {
        id: req.tx_id.clone(),
        asset: req.asset,
        seller: req.seller,
        buyer: req.buyer,
        price: req.price,
        status: TransactionStatus::Pending,
        create_time: now,
        update_time: now,
    };
    A::trades(&mut ledger).insert(req.tx_id.clone(), tx);
    ledger.append_block(&format!("create transaction {}", req.tx_id));
    ok(Value::Null)
}

async fn get_transaction<A: Traded>(
    State(ledger): State<SharedLedger>,
    Path(tx_id): Path<String>,
) -> Reply {
    let mut ledger = ledger.lock().unwrap();
    match A::trades(&mut ledger).get(&tx_id) {
        Some(tx) => ok(tx),
        None => fail(StatusCode::INTERNAL_SERVER_ERROR, "transaction not found"),
    }
}

async fn list_transactions<A: Traded>(
    State(ledger): State<SharedLedger>,
    Query(params): Query<ListParams>,
) -> Reply {
    let mut ledger = ledger.lock().unwrap();
    ok(paginate(A::trades(&mut ledger), &params, |t| t.status.to_string()))
}

async fn complete_transaction<A: Traded>(
    State(ledger): State<SharedLedger>,
    Path(tx_id): Path<String>,
) -> Reply {
    let mut ledger = ledger.lock().unwrap();
    let (asset_id, buyer) = match A::trades(&mut ledger).get_mut(&tx_id) {
        Some(tx) if tx.status == TransactionStatus::Pending => {
            tx.status = TransactionStatus::Completed;
            tx.update_time = Utc::now();
            (tx.asset.id().to_string(), tx.buyer.clone())
        }
        Some(_) => return fail(StatusCode::INTERNAL_SERVER_ERROR, "transaction is not pending"),
        None => return fail(StatusCode::INTERNAL_SERVER_ERROR, "transaction not found"),
    };
    A::hand_over(&mut ledger, &asset_id, buyer);
    ledger.append_block(&format!("complete transaction {tx_id}"));
    ok(Value::Null)
}

/// Registrar routes of both deployments, trading and bank routes of `A`'s.
fn routes<A: Traded>(ledger: SharedLedger) -> Router {
    let entity = A::NAMING.entity;
    let api = Router::new()
        .route("/car-dealer/car/create", post(create_car))
        .route("/car-dealer/car/list", get(list_cars))
        .route("/car-dealer/car/:id", get(get_car))
        .route("/car-dealer/block/list", get(block_list))
        .route(
            "/car-dealer/certificates/:car_id",
            post(upload_certificate).get(list_certificates),
        )
        .route("/car-dealer/certificates/verify/:cert_id", get(verify_certificate))
        .route("/car-dealer/certificates/verify-upload/:car_id", post(verify_upload))
        .route("/vehicle-agency/vehicle/create", post(create_vehicle))
        .route("/vehicle-agency/vehicle/list", get(list_vehicles))
        .route("/vehicle-agency/vehicle/:id", get(get_vehicle))
        .route("/vehicle-agency/block/list", get(block_list))
        .route("/trading-platform/transaction/create", post(create_transaction::<A>))
        .route(&format!("/trading-platform/{entity}/:id"), get(get_traded::<A>))
        .route("/trading-platform/transaction/list", get(list_transactions::<A>))
        .route("/trading-platform/transaction/:tx_id", get(get_transaction::<A>))
        .route("/trading-platform/block/list", get(block_list))
        .route("/bank/transaction/complete/:tx_id", post(complete_transaction::<A>))
        .route("/bank/transaction/list", get(list_transactions::<A>))
        .route("/bank/transaction/:tx_id", get(get_transaction::<A>))
        .route("/bank/block/list", get(block_list))
        .layer(DefaultBodyLimit::disable())
        .with_state(ledger);
    Router::new().nest("/api", api)
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub ledger: SharedLedger,
}

impl MockBackend {
    /// Ledger whose trading platform and bank deal in cars.
    pub async fn start() -> Self {
        Self::start_for::<Car>().await
    }

    pub async fn start_for<A: Traded>() -> Self {
        let ledger = SharedLedger::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = routes::<A>(ledger.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, ledger }
    }

    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr)).unwrap()
    }

    pub fn client<A: Asset>(&self) -> ApiClient<A> {
        ApiClient::new(&ClientConfig::new(self.base_url())).unwrap()
    }
}
