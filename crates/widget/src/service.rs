use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use tracing::trace;
use url::Url;

use crate::config::{ServiceTransport, WidgetConfig};
use crate::error::ServiceError;
use crate::response::ServiceResponse;

/// Name of the query parameter carrying the markup for [`ServiceTransport::Get`].
pub const QUERY_PARAMETER: &str = "asciiMathML";

/// A backend that checks serialized markup and answers with its canonical form.
pub trait ValidationService {
    /// Sends `markup` for validation.
    ///
    /// The returned future is never cancelled by the widget; if its result is no longer
    /// wanted it is simply ignored.
    fn validate(&self, markup: String) -> LocalBoxFuture<'static, Result<ServiceResponse, ServiceError>>;
}

/// Talks to the up-conversion service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpValidationService {
    client: Client,
    url: Url,
    transport: ServiceTransport,
}

impl HttpValidationService {
    pub fn new(url: Url, transport: ServiceTransport) -> Self {
        HttpValidationService {
            client: Client::new(),
            url,
            transport,
        }
    }

    /// Builds a client for `config.service_url`, resolved against `base` when the configured
    /// URL is relative.
    pub fn from_config(config: &WidgetConfig, base: Option<&Url>) -> Result<Self, url::ParseError> {
        let url = match base {
            Some(base) => base.join(&config.service_url)?,
            None => Url::parse(&config.service_url)?,
        };
        Ok(Self::new(url, config.transport))
    }

    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn request(&self, markup: String) -> RequestBuilder {
        match self.transport {
            ServiceTransport::Post => self
                .client
                .post(self.url.clone())
                .header(CONTENT_TYPE, "text/plain; charset=UTF-8")
                .body(markup),
            ServiceTransport::Get => self
                .client
                .get(self.url.clone())
                .query(&[(QUERY_PARAMETER, strip_line_breaks(&markup))]),
        }
    }
}

impl ValidationService for HttpValidationService {
    fn validate(&self, markup: String) -> LocalBoxFuture<'static, Result<ServiceResponse, ServiceError>> {
        let method: &'static str = self.transport.into();
        trace!(url = %self.url, method, "sending markup for validation");
        let request = self.request(markup);
        async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ServiceError::Status(status.as_u16()));
            }
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        }
        .boxed_local()
    }
}

/// The query-string form of the request cannot carry line breaks.
fn strip_line_breaks(markup: &str) -> String {
    markup.replace(['\r', '\n'], "")
}
