//! Server-rendered pages of the demo front end and the form actions behind
//! them. Every page talks to the ledger only through [`ApiClient`].

use askama::Template;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::FormRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;

use crate::api::{ApiClient, CertificateFile};
use crate::error::ViewError;
use crate::fingerprint;
use crate::naming::{Naming, BANK, TRADING_PLATFORM};
use crate::random;
use crate::types::{
    Asset, AssetRef, BlockQuery, BlockQueryResult, Car, Certificate, CreateTransaction, FormField,
    PageQuery, Transaction, TransactionStatus, VerifyResult,
};

#[derive(Clone)]
pub struct AppState<A> {
    pub client: ApiClient<A>,
    pub page_size: u32,
}

impl<A: Asset> AppState<A> {
    pub fn new(client: ApiClient<A>, page_size: u32) -> Self {
        Self { client, page_size }
    }
}

fn render(page: impl Template) -> Result<Html<String>, ViewError> {
    Ok(Html(page.render()?))
}

fn redirect(path: &str, params: &[(&str, &str)]) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    if query.is_empty() {
        Redirect::to(path)
    } else {
        Redirect::to(&format!("{path}?{query}"))
    }
}

fn short_hash(hash: &str) -> String {
    hash.chars().take(12).collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub bookmark: Option<String>,
    pub status: Option<String>,
    pub page_num: Option<u32>,
    pub flash: Option<String>,
}

impl PageParams {
    fn page_query(&self, page_size: u32) -> PageQuery {
        let bookmark = self.bookmark.clone().unwrap_or_default();
        let query = PageQuery::first(page_size).with_bookmark(bookmark);
        match self.status.as_deref().filter(|s| !s.is_empty()) {
            Some(status) => query.with_status(status),
            None => query,
        }
    }

    fn block_query(&self, page_size: u32) -> BlockQuery {
        BlockQuery::page(page_size, self.page_num.unwrap_or(1).max(1))
    }

    fn status_options(&self, values: &[&'static str]) -> Vec<FilterOption> {
        let selected = self.status.as_deref().unwrap_or_default();
        values
            .iter()
            .map(|&value| FilterOption {
                value,
                selected: value == selected,
            })
            .collect()
    }

    fn status(&self) -> String {
        self.status.clone().unwrap_or_default()
    }

    /// Query suffix that keeps the record list where it is while the block
    /// list pages.
    fn list_state(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in [("status", &self.status), ("bookmark", &self.bookmark)] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.append_pair(name, value);
            }
        }
        let query = query.finish();
        if query.is_empty() {
            query
        } else {
            format!("&{query}")
        }
    }

    fn blocks(&self, result: BlockQueryResult) -> BlockSection {
        BlockSection {
            list_state: self.list_state(),
            ..BlockSection::from(result)
        }
    }
}

pub struct FilterOption {
    pub value: &'static str,
    pub selected: bool,
}

pub struct AssetRow {
    pub id: String,
    pub model: String,
    pub owner: String,
    pub status: &'static str,
    pub summary: String,
}

impl AssetRow {
    fn from_asset<A: Asset>(asset: &A) -> Self {
        Self {
            id: asset.id().to_string(),
            model: asset.model().to_string(),
            owner: asset.current_owner().to_string(),
            status: asset.status_label(),
            summary: asset.summary(),
        }
    }
}

pub struct TransactionRow {
    pub id: String,
    pub asset_id: String,
    pub seller: String,
    pub buyer: String,
    pub price: String,
    pub status: &'static str,
    pub pending: bool,
    pub updated: String,
}

impl TransactionRow {
    fn from_transaction<R: AssetRef>(tx: &Transaction<R>) -> Self {
        Self {
            id: tx.id.clone(),
            asset_id: tx.asset.id().to_string(),
            seller: tx.seller.clone(),
            buyer: tx.buyer.clone(),
            price: format!("{:.2}", tx.price),
            status: tx.status.as_str(),
            pending: tx.status == TransactionStatus::Pending,
            updated: tx.update_time.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

pub struct BlockRow {
    pub num: u64,
    pub hash: String,
    pub prev_hash: String,
    pub tx_count: u64,
    pub save_time: String,
    pub broken: bool,
}

pub struct BlockSection {
    pub rows: Vec<BlockRow>,
    pub total: u64,
    pub page_num: u64,
    pub has_more: bool,
    pub intact: bool,
    /// Appended to the block pager links.
    pub list_state: String,
}

impl From<BlockQueryResult> for BlockSection {
    fn from(result: BlockQueryResult) -> Self {
        let broken = result.broken_links();
        let rows = result
            .blocks
            .iter()
            .map(|block| BlockRow {
                num: block.block_num,
                hash: short_hash(&block.block_hash),
                prev_hash: short_hash(&block.prev_hash),
                tx_count: block.tx_count,
                save_time: block.save_time.clone(),
                broken: broken.contains(&block.block_num),
            })
            .collect();
        Self {
            rows,
            total: result.total,
            page_num: result.page_num,
            has_more: result.has_more,
            intact: broken.is_empty(),
            list_state: String::new(),
        }
    }
}

pub struct CertificateRow {
    pub cert_id: String,
    pub cert_type: String,
    pub file_hash: String,
    pub uploaded: String,
}

impl From<&Certificate> for CertificateRow {
    fn from(cert: &Certificate) -> Self {
        Self {
            cert_id: cert.cert_id.clone(),
            cert_type: cert.cert_type.clone(),
            file_hash: cert.file_hash.clone(),
            uploaded: cert.upload_time.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub naming: Naming,
    pub backend: String,
}

#[derive(Template)]
#[template(path = "registrar.html")]
pub struct RegistrarTemplate {
    pub naming: Naming,
    pub flash: Option<String>,
    pub fields: Vec<FormField>,
    pub assets: Vec<AssetRow>,
    pub records_count: u64,
    pub next_bookmark: Option<String>,
    pub status: String,
    pub filters: Vec<FilterOption>,
    pub blocks: BlockSection,
}

#[derive(Template)]
#[template(path = "trading.html")]
pub struct TradingTemplate {
    pub naming: Naming,
    pub flash: Option<String>,
    pub tx_id: String,
    pub seller: String,
    pub buyer: String,
    pub price: String,
    pub transactions: Vec<TransactionRow>,
    pub next_bookmark: Option<String>,
    pub status: String,
    pub filters: Vec<FilterOption>,
    pub blocks: BlockSection,
}

#[derive(Template)]
#[template(path = "bank.html")]
pub struct BankTemplate {
    pub naming: Naming,
    pub flash: Option<String>,
    pub transactions: Vec<TransactionRow>,
    pub next_bookmark: Option<String>,
    pub status: String,
    pub filters: Vec<FilterOption>,
    pub blocks: BlockSection,
}

#[derive(Template)]
#[template(path = "certificates.html")]
pub struct CertificatesTemplate {
    pub naming: Naming,
    pub flash: Option<String>,
    pub car_id: String,
    pub certificates: Vec<CertificateRow>,
}

#[derive(Template)]
#[template(path = "verify.html")]
pub struct VerifyTemplate {
    pub naming: Naming,
    pub subject: String,
    pub car_id: Option<String>,
    pub matches: bool,
    pub stored_hash: String,
    pub current_hash: String,
    pub local_hash: Option<String>,
}

impl VerifyTemplate {
    fn new(subject: String, car_id: Option<String>, result: VerifyResult) -> Self {
        Self {
            naming: Car::NAMING,
            subject,
            car_id,
            matches: result.matches,
            stored_hash: result.stored_hash,
            current_hash: result.current_hash,
            local_hash: None,
        }
    }
}

fn next_bookmark(bookmark: String, fetched: usize, sent: Option<&str>) -> Option<String> {
    if bookmark.is_empty() || fetched == 0 || Some(bookmark.as_str()) == sent {
        None
    } else {
        Some(bookmark)
    }
}

pub async fn home<A: Asset>(State(state): State<AppState<A>>) -> Result<Html<String>, ViewError> {
    render(HomeTemplate {
        naming: A::NAMING,
        backend: state.client.transport().base_url().to_string(),
    })
}

pub async fn registrar<A: Asset>(
    State(state): State<AppState<A>>,
    Query(params): Query<PageParams>,
) -> Result<Html<String>, ViewError> {
    let api = state.client.registrar();
    let (page, blocks) = futures::try_join!(
        api.list(&params.page_query(state.page_size)),
        api.block_list(&params.block_query(state.page_size)),
    )?;
    tracing::debug!(
        target: "web",
        role = A::NAMING.role,
        records = page.records.len(),
        "registrar page"
    );

    let assets = page.records.iter().map(AssetRow::from_asset).collect();
    render(RegistrarTemplate {
        naming: A::NAMING,
        flash: params.flash.clone(),
        fields: A::demo_form(),
        assets,
        records_count: page.records_count,
        next_bookmark: next_bookmark(page.bookmark, page.records.len(), params.bookmark.as_deref()),
        status: params.status(),
        filters: params.status_options(A::status_filters()),
        blocks: params.blocks(blocks),
    })
}

pub async fn create_asset<A: Asset>(
    State(state): State<AppState<A>>,
    form: Result<Form<A::Create>, FormRejection>,
) -> Result<Redirect, ViewError> {
    let Form(payload) = form.map_err(|err| ViewError::BadInput(err.body_text()))?;
    state.client.registrar().create(&payload).await?;
    tracing::info!(target: "web", role = A::NAMING.role, "asset created");
    let message = format!("{} created", A::NAMING.entity_title);
    Ok(redirect(&format!("/{}", A::NAMING.role), &[("flash", &message)]))
}

fn transaction_filters(params: &PageParams) -> Vec<FilterOption> {
    let values: Vec<&'static str> = TransactionStatus::ALL.iter().map(|s| s.as_str()).collect();
    params.status_options(&values)
}

pub async fn trading<A: Asset>(
    State(state): State<AppState<A>>,
    Query(params): Query<PageParams>,
) -> Result<Html<String>, ViewError> {
    let api = state.client.trading();
    let (page, blocks) = futures::try_join!(
        api.list_transactions(&params.page_query(state.page_size)),
        api.block_list(&params.block_query(state.page_size)),
    )?;

    let transactions = page.records.iter().map(TransactionRow::from_transaction).collect();
    render(TradingTemplate {
        naming: A::NAMING,
        flash: params.flash.clone(),
        tx_id: random::random_id("TX"),
        seller: random::random_name(),
        buyer: random::random_name(),
        price: format!("{:.2}", random::random_price()),
        transactions,
        next_bookmark: next_bookmark(page.bookmark, page.records.len(), params.bookmark.as_deref()),
        status: params.status(),
        filters: transaction_filters(&params),
        blocks: params.blocks(blocks),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    pub tx_id: String,
    pub asset_id: String,
    pub seller: String,
    pub buyer: String,
    pub price: f64,
}

impl TransactionForm {
    fn into_payload<R: AssetRef>(self) -> CreateTransaction<R> {
        CreateTransaction {
            tx_id: self.tx_id,
            asset: R::new(self.asset_id),
            seller: self.seller,
            buyer: self.buyer,
            price: self.price,
        }
    }
}

pub async fn create_transaction<A: Asset>(
    State(state): State<AppState<A>>,
    form: Result<Form<TransactionForm>, FormRejection>,
) -> Result<Redirect, ViewError> {
    let Form(form) = form.map_err(|err| ViewError::BadInput(err.body_text()))?;
    let payload = form.into_payload::<A::Ref>();
    state.client.trading().create_transaction(&payload).await?;
    tracing::info!(target: "web", tx_id = %payload.tx_id, "transaction created");
    let message = format!("Transaction {} created", payload.tx_id);
    Ok(redirect(&format!("/{}", TRADING_PLATFORM), &[("flash", &message)]))
}

pub async fn bank<A: Asset>(
    State(state): State<AppState<A>>,
    Query(params): Query<PageParams>,
) -> Result<Html<String>, ViewError> {
    let api = state.client.bank();
    let (page, blocks) = futures::try_join!(
        api.list_transactions(&params.page_query(state.page_size)),
        api.block_list(&params.block_query(state.page_size)),
    )?;
    let blocks = params.blocks(blocks);
    if !blocks.intact {
        tracing::warn!(target: "web", page = blocks.page_num, "block page has broken hash links");
    }

    let transactions = page.records.iter().map(TransactionRow::from_transaction).collect();
    render(BankTemplate {
        naming: A::NAMING,
        flash: params.flash.clone(),
        transactions,
        next_bookmark: next_bookmark(page.bookmark, page.records.len(), params.bookmark.as_deref()),
        status: params.status(),
        filters: transaction_filters(&params),
        blocks,
    })
}

pub async fn complete_transaction<A: Asset>(
    State(state): State<AppState<A>>,
    Path(tx_id): Path<String>,
) -> Result<Redirect, ViewError> {
    state.client.bank().complete_transaction(&tx_id).await?;
    tracing::info!(target: "web", %tx_id, "transaction completed");
    let message = format!("Transaction {tx_id} completed");
    Ok(redirect(&format!("/{}", BANK), &[("flash", &message)]))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateParams {
    pub car_id: Option<String>,
    pub flash: Option<String>,
}

pub async fn certificates(
    State(state): State<AppState<Car>>,
    Query(params): Query<CertificateParams>,
) -> Result<Html<String>, ViewError> {
    let car_id = params.car_id.unwrap_or_default();
    let certificates = if car_id.is_empty() {
        Vec::new()
    } else {
        state.client.registrar().list_certificates(&car_id).await?
    };
    render(CertificatesTemplate {
        naming: Car::NAMING,
        flash: params.flash,
        car_id,
        certificates: certificates.iter().map(CertificateRow::from).collect(),
    })
}

fn multipart_error(err: MultipartError) -> ViewError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ViewError::TooLarge
    } else {
        ViewError::BadInput(err.body_text())
    }
}

/// Splits a multipart body into its text fields and the file stored under
/// `file_field`.
async fn parse_multipart(
    mut form: Multipart,
    file_field: &str,
) -> Result<(Vec<(String, String)>, CertificateFile), ViewError> {
    let mut texts = Vec::new();
    let mut file = None;
    while let Some(field) = form.next_field().await.map_err(multipart_error)? {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => return Err(ViewError::BadInput("unnamed form field".to_string())),
        };
        if name == file_field {
            let file_name = field.file_name().unwrap_or("certificate").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            let mut upload = CertificateFile::new(file_name, bytes.to_vec());
            upload.content_type = content_type;
            file = Some(upload);
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            texts.push((name, value));
        }
    }
    match file {
        Some(file) => Ok((texts, file)),
        None => Err(ViewError::BadInput(format!("missing {file_field}"))),
    }
}

pub async fn upload_certificate(
    State(state): State<AppState<Car>>,
    Path(car_id): Path<String>,
    form: Multipart,
) -> Result<Redirect, ViewError> {
    let (texts, file) = parse_multipart(form, crate::api::CERTIFICATE_FILE_FIELD).await?;
    let cert_type = texts
        .into_iter()
        .find(|(name, _)| name == crate::api::CERT_TYPE_FIELD)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ViewError::BadInput("missing certType".to_string()))?;

    let local_hash = file.fingerprint();
    let certificate = state
        .client
        .registrar()
        .upload_certificate(&car_id, &cert_type, file)
        .await?;
    if certificate.file_hash != local_hash {
        tracing::warn!(
            target: "web",
            cert_id = %certificate.cert_id,
            stored = %certificate.file_hash,
            local = %local_hash,
            "ledger recorded a different hash than the uploaded file"
        );
    }
    let message = format!("Certificate {} uploaded", certificate.cert_id);
    Ok(redirect(
        &format!("/{}/certificates", Car::NAMING.role),
        &[("carId", &car_id), ("flash", &message)],
    ))
}

pub async fn verify_certificate(
    State(state): State<AppState<Car>>,
    Path(cert_id): Path<String>,
) -> Result<Html<String>, ViewError> {
    let result = state.client.registrar().verify_certificate(&cert_id).await?;
    render(VerifyTemplate::new(
        format!("Stored file of certificate {cert_id}"),
        None,
        result,
    ))
}

pub async fn verify_uploaded_certificate(
    State(state): State<AppState<Car>>,
    Path(car_id): Path<String>,
    form: Multipart,
) -> Result<Html<String>, ViewError> {
    let (_, file) = parse_multipart(form, crate::api::VERIFICATION_FILE_FIELD).await?;
    let local_hash = fingerprint::file_hash(&file.bytes);
    let subject = format!("Uploaded file {} against car {car_id}", file.file_name);
    let result = state
        .client
        .registrar()
        .verify_uploaded_certificate(&car_id, file)
        .await?;
    let mut page = VerifyTemplate::new(subject, Some(car_id), result);
    page.local_hash = Some(local_hash);
    render(page)
}
