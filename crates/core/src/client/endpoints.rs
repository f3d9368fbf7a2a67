//! Request builders for the ArchivesSpace endpoints used by the ingest.

use crate::auth::SessionToken;
use crate::config::BackendConfig;

use super::{RequestBody, RequestDescriptor};

/// Header carrying the session token on authenticated calls.
pub const SESSION_HEADER: &str = "X-ArchivesSpace-Session";

const XML_CONTENT_TYPE: &str = "text/xml; charset=UTF-8";
const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Builds login, convert and upload requests for one backend.
#[derive(Debug, Clone)]
pub struct BackendEndpoints {
    base_uri: String,
    repository_id: u32,
    converter_method: String,
}

impl BackendEndpoints {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            base_uri: config.uri.trim_end_matches('/').to_string(),
            repository_id: config.repository_id,
            converter_method: config.converter_method.clone(),
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn login_url(&self, username: &str) -> String {
        format!(
            "{}/users/{}/login",
            self.base_uri,
            urlencoding::encode(username)
        )
    }

    pub fn convert_url(&self) -> String {
        format!(
            "{}/repositories/{}/jsonmodel_from_format/resource/{}",
            self.base_uri,
            self.repository_id,
            urlencoding::encode(&self.converter_method)
        )
    }

    pub fn upload_url(&self) -> String {
        format!(
            "{}/repositories/{}/batch_imports",
            self.base_uri, self.repository_id
        )
    }

    /// `POST /users/{username}/login` with the password as a form parameter.
    pub fn login_request(&self, username: &str, password: &str) -> RequestDescriptor {
        RequestDescriptor::post(self.login_url(username)).body(RequestBody::Form(vec![(
            "password".to_string(),
            password.to_string(),
        )]))
    }

    /// Raw EAD bytes posted to the conversion endpoint.
    pub fn convert_request(&self, session: &SessionToken, xml: Vec<u8>) -> RequestDescriptor {
        RequestDescriptor::post(self.convert_url())
            .header(SESSION_HEADER, session.as_str())
            .header("Content-Type", XML_CONTENT_TYPE)
            .body(RequestBody::Bytes(xml))
    }

    /// Converted jsonmodel payload posted to the batch import endpoint.
    pub fn upload_request(
        &self,
        session: &SessionToken,
        payload: serde_json::Value,
    ) -> RequestDescriptor {
        RequestDescriptor::post(self.upload_url())
            .header(SESSION_HEADER, session.as_str())
            .header("Content-Type", JSON_CONTENT_TYPE)
            .body(RequestBody::Json(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn endpoints(uri: &str) -> BackendEndpoints {
        BackendEndpoints::new(&BackendConfig {
            uri: uri.to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            repository_id: 2,
            converter_method: "ead".to_string(),
        })
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let endpoints = endpoints("http://localhost:8089/");
        assert_eq!(
            endpoints.convert_url(),
            "http://localhost:8089/repositories/2/jsonmodel_from_format/resource/ead"
        );
        assert_eq!(
            endpoints.upload_url(),
            "http://localhost:8089/repositories/2/batch_imports"
        );
    }

    #[test]
    fn test_login_request_encodes_username() {
        let request = endpoints("http://localhost:8089").login_request("jane doe", "pw");
        assert_eq!(request.url, "http://localhost:8089/users/jane%20doe/login");
        assert_eq!(
            request.body,
            RequestBody::Form(vec![("password".to_string(), "pw".to_string())])
        );
        assert!(request.header_value(SESSION_HEADER).is_none());
    }

    #[test]
    fn test_convert_request_carries_session_and_xml_type() {
        let session = SessionToken::new("tok-1");
        let request = endpoints("http://localhost:8089").convert_request(&session, b"<ead/>".to_vec());
        assert_eq!(request.header_value(SESSION_HEADER), Some("tok-1"));
        assert_eq!(
            request.header_value("content-type"),
            Some("text/xml; charset=UTF-8")
        );
        assert_eq!(request.body, RequestBody::Bytes(b"<ead/>".to_vec()));
    }

    #[test]
    fn test_upload_request_carries_payload() {
        let session = SessionToken::new("tok-2");
        let payload = json!([{"jsonmodel_type": "resource"}]);
        let request = endpoints("http://localhost:8089").upload_request(&session, payload.clone());
        assert_eq!(request.header_value(SESSION_HEADER), Some("tok-2"));
        assert_eq!(request.body, RequestBody::Json(payload));
    }
}
