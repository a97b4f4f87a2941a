//! Self-signed data-plane certificates.
//!
//! [`CertificateIssuer`] turns a [`CertificateRequest`] into a
//! [`CredentialBundle`]: a fresh key pair and a self-signed server
//! certificate, both PEM encoded. Nothing is written to disk.

pub mod issuer;

pub use issuer::{CertificateIssuer, CertificateRequest, CredentialBundle, KeyAlgorithm};
