use chrono::{DateTime, Duration, SubsecRound, Utc};
use rand::RngCore;
use rcgen::{
    CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair,
    KeyUsagePurpose, SerialNumber, PKCS_ED25519, PKCS_RSA_SHA256,
};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use validator::Validate;

use crate::errors::{ProvisionError, Result};
use crate::secrets::SecretString;

const RSA_KEY_BITS: usize = 4096;
const SERIAL_LEN: usize = 16;

/// Key algorithm for the data-plane certificate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAlgorithm {
    /// RSA 4096, private key in a PKCS#1 `RSA PRIVATE KEY` block
    #[default]
    Rsa4096,
    /// Ed25519, private key in a PKCS#8 `PRIVATE KEY` block
    Ed25519,
}

impl KeyAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsa4096 => "rsa4096",
            Self::Ed25519 => "ed25519",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rsa" | "rsa4096" => Ok(Self::Rsa4096),
            "ed25519" => Ok(Self::Ed25519),
            other => Err(ProvisionError::config(format!(
                "Unknown key algorithm '{}'. Use 'rsa4096' or 'ed25519'.",
                other
            ))),
        }
    }
}

/// Subject and lifetime of the certificate to issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CertificateRequest {
    #[validate(length(min = 1, max = 64, message = "Common name must be 1-64 characters"))]
    pub common_name: String,

    #[validate(length(min = 1, max = 64, message = "Organization must be 1-64 characters"))]
    pub organization: String,

    #[validate(length(equal = 2, message = "Country must be a two-letter code"))]
    pub country: String,

    #[validate(range(min = 1, max = 3650, message = "Validity must be 1-3650 days"))]
    pub validity_days: u32,

    pub algorithm: KeyAlgorithm,
}

impl Default for CertificateRequest {
    fn default() -> Self {
        Self {
            common_name: "Kong".to_string(),
            organization: "Kong".to_string(),
            country: "US".to_string(),
            validity_days: 365,
            algorithm: KeyAlgorithm::default(),
        }
    }
}

/// Certificate and private key produced by one issuance
#[derive(Debug, Clone)]
pub struct CredentialBundle {
    pub certificate_pem: String,
    pub private_key_pem: SecretString,
    /// Hex-encoded serial number
    pub serial_number: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub algorithm: KeyAlgorithm,
}

/// Issues self-signed server certificates
#[derive(Debug, Clone, Copy, Default)]
pub struct CertificateIssuer;

impl CertificateIssuer {
    pub fn new() -> Self {
        Self
    }

    /// Generate a key pair and a self-signed certificate for it.
    ///
    /// The validity window starts at the current second and lasts exactly
    /// `validity_days` days. CPU-bound for RSA; call it off the async runtime.
    pub fn issue(&self, request: &CertificateRequest) -> Result<CredentialBundle> {
        request.validate()?;
        let (key_pair, private_key_pem) = generate_key_pair(request.algorithm)?;
        self.self_sign(request, &key_pair, private_key_pem)
    }

    fn self_sign(
        &self,
        request: &CertificateRequest,
        key_pair: &KeyPair,
        private_key_pem: SecretString,
    ) -> Result<CredentialBundle> {
        let valid_from = Utc::now().trunc_subsecs(0);
        let valid_until = valid_from + Duration::days(i64::from(request.validity_days));

        let mut serial = [0u8; SERIAL_LEN];
        rand::rngs::OsRng.fill_bytes(&mut serial);
        // Positive and without a leading zero byte
        serial[0] = (serial[0] & 0x7f) | 0x01;
        let serial_number = serial.iter().map(|b| format!("{:02x}", b)).collect::<String>();

        let mut params = CertificateParams::default();
        let mut distinguished_name = DistinguishedName::new();
        distinguished_name.push(DnType::CommonName, request.common_name.as_str());
        distinguished_name.push(DnType::OrganizationName, request.organization.as_str());
        distinguished_name.push(DnType::CountryName, request.country.as_str());
        params.distinguished_name = distinguished_name;
        params.serial_number = Some(SerialNumber::from_slice(&serial));
        params.not_before = to_offset(valid_from)?;
        params.not_after = to_offset(valid_until)?;
        params.key_usages =
            vec![KeyUsagePurpose::DigitalSignature, KeyUsagePurpose::KeyEncipherment];
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
        params.is_ca = IsCa::ExplicitNoCa;

        let certificate = params.self_signed(key_pair).map_err(|e| {
            ProvisionError::certificate(format!("Failed to self-sign certificate: {}", e))
        })?;

        debug!(
            serial = %serial_number,
            algorithm = %request.algorithm,
            valid_until = %valid_until,
            "Issued self-signed certificate"
        );

        Ok(CredentialBundle {
            certificate_pem: certificate.pem(),
            private_key_pem,
            serial_number,
            valid_from,
            valid_until,
            algorithm: request.algorithm,
        })
    }
}

fn generate_key_pair(algorithm: KeyAlgorithm) -> Result<(KeyPair, SecretString)> {
    match algorithm {
        KeyAlgorithm::Rsa4096 => rsa_key_pair(RSA_KEY_BITS),
        KeyAlgorithm::Ed25519 => {
            let key_pair = KeyPair::generate_for(&PKCS_ED25519).map_err(|e| {
                ProvisionError::certificate(format!("Ed25519 key generation failed: {}", e))
            })?;
            let pem = SecretString::new(key_pair.serialize_pem());
            Ok((key_pair, pem))
        }
    }
}

/// rcgen cannot generate RSA keys, so the key is generated here and handed
/// over as PKCS#8. The stored copy is PKCS#1.
fn rsa_key_pair(bits: usize) -> Result<(KeyPair, SecretString)> {
    let private_key = RsaPrivateKey::new(&mut rand::rngs::OsRng, bits)
        .map_err(|e| ProvisionError::certificate(format!("RSA key generation failed: {}", e)))?;

    let pkcs8 = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| ProvisionError::certificate(format!("PKCS#8 encoding failed: {}", e)))?;
    let key_pair = KeyPair::from_pkcs8_pem_and_sign_algo(&pkcs8, &PKCS_RSA_SHA256)
        .map_err(|e| ProvisionError::certificate(format!("Failed to load RSA key: {}", e)))?;

    let pkcs1 = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| ProvisionError::certificate(format!("PKCS#1 encoding failed: {}", e)))?;

    Ok((key_pair, SecretString::new(pkcs1.as_str())))
}

fn to_offset(timestamp: DateTime<Utc>) -> Result<time::OffsetDateTime> {
    time::OffsetDateTime::from_unix_timestamp(timestamp.timestamp())
        .map_err(|e| ProvisionError::certificate(format!("Invalid validity timestamp: {}", e)))
}
