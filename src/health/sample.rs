//! Request outcome samples.

use thiserror::Error;
use url::Url;

/// Why a sample could not be attributed to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("endpoint URL '{0}' has no host")]
    MissingHost(String),
}

/// A single proxied request outcome, as produced by the proxy.
#[derive(Debug, Clone)]
pub struct EndpointSample {
    pub namespace: String,
    pub service: String,
    /// Endpoint the request was sent to.
    pub url: Url,
    /// `None` on success, the failure description otherwise.
    pub error: Option<String>,
}

impl EndpointSample {
    pub fn success(namespace: impl Into<String>, service: impl Into<String>, url: Url) -> Self {
        Self {
            namespace: namespace.into(),
            service: service.into(),
            url,
            error: None,
        }
    }

    pub fn failure(
        namespace: impl Into<String>,
        service: impl Into<String>,
        url: Url,
        error: impl std::fmt::Display,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            service: service.into(),
            url,
            error: Some(error.to_string()),
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// `namespace/service`.
    pub fn service_key(&self) -> String {
        service_key(&self.namespace, &self.service)
    }

    pub fn endpoint_key(&self) -> Result<String, SampleError> {
        endpoint_key(&self.url)
    }

    /// The reduced form kept in an endpoint's window.
    pub fn to_sample(&self) -> Sample {
        if self.is_err() {
            Sample::Failure
        } else {
            Sample::Success
        }
    }
}

/// Outcome kept in the rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    Success,
    Failure,
}

impl Sample {
    pub fn is_err(self) -> bool {
        self == Sample::Failure
    }
}

pub fn service_key(namespace: &str, service: &str) -> String {
    format!("{}/{}", namespace, service)
}

/// Endpoint identity: `host:port`, using the scheme's default port when the
/// URL omits it. Schemes without a known default yield the bare host.
pub fn endpoint_key(url: &Url) -> Result<String, SampleError> {
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| SampleError::MissingHost(url.to_string()))?;

    Ok(match url.port_or_known_default() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let url = Url::parse("http://10.0.0.1:80/path").unwrap();
        let sample = EndpointSample::success("ns", "svc", url);
        assert_eq!(sample.service_key(), "ns/svc");
        assert_eq!(sample.endpoint_key().unwrap(), "10.0.0.1:80");

        // Default and explicit default ports name the same endpoint.
        let url = Url::parse("http://10.0.0.1/").unwrap();
        assert_eq!(endpoint_key(&url).unwrap(), "10.0.0.1:80");

        let url = Url::parse("http://10.0.0.1:8080").unwrap();
        assert_eq!(endpoint_key(&url).unwrap(), "10.0.0.1:8080");

        let url = Url::parse("tcp://[::1]:5432").unwrap();
        assert_eq!(endpoint_key(&url).unwrap(), "[::1]:5432");

        // The url crate drops an explicit default port; the key keeps it.
        let url = Url::parse("http://10.0.0.1:80").unwrap();
        assert_eq!(url.port(), None);
        assert_eq!(endpoint_key(&url).unwrap(), "10.0.0.1:80");

        let url = Url::parse("tcp://db.internal").unwrap();
        assert_eq!(endpoint_key(&url).unwrap(), "db.internal");
    }

    #[test]
    fn test_missing_host() {
        let url = Url::parse("unix:/var/run/app.sock").unwrap();
        assert_eq!(
            endpoint_key(&url),
            Err(SampleError::MissingHost("unix:/var/run/app.sock".into()))
        );
    }

    #[test]
    fn test_outcome_reduction() {
        let url = Url::parse("http://a:1").unwrap();
        let ok = EndpointSample::success("ns", "svc", url.clone());
        let bad = EndpointSample::failure("ns", "svc", url, "connection refused");

        assert_eq!(ok.to_sample(), Sample::Success);
        assert_eq!(bad.to_sample(), Sample::Failure);
        assert_eq!(bad.error.as_deref(), Some("connection refused"));
        assert!(Sample::Failure.is_err());
        assert!(!Sample::Success.is_err());
    }
}
