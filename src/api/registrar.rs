use std::marker::PhantomData;
use std::path::Path;

use futures::future;
use futures::FutureExt;
use reqwest::multipart::{Form, Part};

use crate::error::ApiError;
use crate::fingerprint;
use crate::transport::{ApiRequest, Transport};
use crate::types::{
    Asset, BlockQuery, BlockQueryResult, Car, Certificate, PageQuery, PageResult, VerifyResult,
};

/// Multipart field carrying the certificate type.
pub const CERT_TYPE_FIELD: &str = "certType";
/// Multipart field carrying an uploaded certificate.
pub const CERTIFICATE_FILE_FIELD: &str = "certificateFile";
/// Multipart field carrying a file to compare against the stored certificate.
pub const VERIFICATION_FILE_FIELD: &str = "verificationFile";

/// A file about to be sent as a multipart part.
#[derive(Clone, Debug, PartialEq)]
pub struct CertificateFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl CertificateFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "certificate".to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// Hash the backend will record for this file.
    pub fn fingerprint(&self) -> String {
        fingerprint::file_hash(&self.bytes)
    }

    fn into_part(self) -> Result<Part, ApiError> {
        let part = Part::bytes(self.bytes).file_name(self.file_name);
        match self.content_type {
            Some(content_type) => Ok(part.mime_str(&content_type)?),
            None => Ok(part),
        }
    }
}

/// Client of the registrar role (`car-dealer` or `vehicle-agency`).
#[derive(Clone, Debug)]
pub struct RegistrarApi<A> {
    transport: Transport,
    _asset: PhantomData<fn() -> A>,
}

impl<A: Asset> RegistrarApi<A> {
    pub(super) fn new(transport: Transport) -> Self {
        Self {
            transport,
            _asset: PhantomData,
        }
    }

    pub fn create(&self, payload: &A::Create) -> ApiRequest<()> {
        let naming = A::NAMING;
        self.transport
            .post_json(&[naming.role, naming.entity, "create"], payload)
    }

    pub fn get(&self, id: &str) -> ApiRequest<A> {
        let naming = A::NAMING;
        self.transport.get(&[naming.role, naming.entity, id])
    }

    pub fn list(&self, query: &PageQuery) -> ApiRequest<PageResult<A>> {
        let naming = A::NAMING;
        self.transport
            .get_with_query(&[naming.role, naming.entity, "list"], query)
    }

    /// Every asset matching `query`, across all pages.
    pub async fn list_all(&self, query: PageQuery) -> Result<Vec<A>, ApiError> {
        super::list_all(query, |page| self.list(&page)).await
    }

    pub fn block_list(&self, query: &BlockQuery) -> ApiRequest<BlockQueryResult> {
        self.transport
            .get_with_query(&[A::NAMING.role, "block", "list"], query)
    }
}

impl RegistrarApi<Car> {
    pub fn upload_certificate(
        &self,
        car_id: &str,
        cert_type: &str,
        file: CertificateFile,
    ) -> ApiRequest<Certificate> {
        let form = match file.into_part() {
            Ok(part) => Form::new()
                .text(CERT_TYPE_FIELD, cert_type.to_string())
                .part(CERTIFICATE_FILE_FIELD, part),
            Err(err) => return future::ready(Err(err)).boxed(),
        };
        self.transport
            .post_multipart(&[Car::NAMING.role, "certificates", car_id], form)
    }

    pub fn list_certificates(&self, car_id: &str) -> ApiRequest<Vec<Certificate>> {
        self.transport
            .get(&[Car::NAMING.role, "certificates", car_id])
    }

    /// Re-hashes the stored file on the backend and compares it with the
    /// hash recorded on the ledger.
    pub fn verify_certificate(&self, cert_id: &str) -> ApiRequest<VerifyResult> {
        self.transport
            .get(&[Car::NAMING.role, "certificates", "verify", cert_id])
    }

    /// Compares `file` with the certificate recorded for `car_id`.
    pub fn verify_uploaded_certificate(
        &self,
        car_id: &str,
        file: CertificateFile,
    ) -> ApiRequest<VerifyResult> {
        let form = match file.into_part() {
            Ok(part) => Form::new().part(VERIFICATION_FILE_FIELD, part),
            Err(err) => return future::ready(Err(err)).boxed(),
        };
        self.transport.post_multipart(
            &[Car::NAMING.role, "certificates", "verify-upload", car_id],
            form,
        )
    }
}
