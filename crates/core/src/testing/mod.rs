//! Testing utilities and mock implementations.
//!
//! These let the dispatcher, pipeline and batch driver be exercised without a
//! running ArchivesSpace backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use aspace_ingest_core::testing::{MockAuthenticator, MockEndpoint, MockTransport};
//!
//! let transport = Arc::new(MockTransport::new());
//! let authenticator = Arc::new(MockAuthenticator::new());
//!
//! transport.set_response(MockEndpoint::Upload, RawResponse::new(500, "down"));
//! ```

mod mock_authenticator;
mod mock_transport;

pub use mock_authenticator::MockAuthenticator;
pub use mock_transport::{MockEndpoint, MockTransport};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// A minimal EAD document whose text contains `marker`.
    pub fn ead_document(marker: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ead xmlns="urn:isbn:1-931666-22-9"><eadheader><eadid>{marker}</eadid></eadheader><archdesc level="collection"><did><unittitle>{marker}</unittitle></did></archdesc></ead>
"#
        )
    }

    /// Write `<name>.xml` with an EAD body marked by `name` into `dir`.
    pub fn write_ead(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(format!("{}.xml", name));
        std::fs::write(&path, ead_document(name)).expect("Failed to write EAD fixture");
        path
    }
}
