use std::time::Duration;

use crate::api::{Method, RequestOptions};
use crate::commands::AppContext;
use crate::config::Config;
use crate::error::{PantryError, Result};
use serde_json::Value;

/// Arguments of the `request` command
#[derive(Debug, Clone, Default)]
pub struct RequestArgs {
    /// HTTP method name, any case
    pub method: String,
    /// Path relative to the API base URL
    pub path: String,
    /// JSON body
    pub body: Option<String>,
    /// `NAME:VALUE` header specs
    pub headers: Vec<String>,
    /// `KEY=VALUE` query specs
    pub query: Vec<String>,
    /// Per-request timeout in seconds
    pub timeout: Option<u64>,
}

/// Sends an authenticated request and prints the response body.
///
/// A JSON response is pretty-printed; anything else is printed as received.
/// An empty body prints only the status code.
pub async fn run_request(config: &Config, args: RequestArgs) -> Result<()> {
    let method = parse_method(&args.method)?;
    let body = args.body.as_deref().map(parse_body).transpose()?;
    let options = build_options(&args)?;

    let ctx = AppContext::open(config)?;
    tracing::debug!(%method, path = %args.path, "Sending raw request");
    let response = ctx
        .client
        .request_with(method, &args.path, body.as_ref(), &options)
        .await?;

    if response.is_empty() {
        println!("{}", response.status);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(value) => println!(
            "{}",
            serde_json::to_string_pretty(&value).map_err(PantryError::from)?
        ),
        Err(_) => println!("{}", response.body),
    }
    Ok(())
}

fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.trim().to_uppercase().as_bytes())
        .map_err(|_| PantryError::InvalidInput(format!("Invalid HTTP method: {}", method)).into())
}

fn parse_body(body: &str) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|e| PantryError::InvalidInput(format!("Request body is not JSON: {}", e)).into())
}

fn build_options(args: &RequestArgs) -> Result<RequestOptions> {
    let mut options = RequestOptions::new();

    for spec in &args.headers {
        let (name, value) = split_pair(spec, ':')?;
        options = options.header(name, value);
    }
    for spec in &args.query {
        let (key, value) = split_pair(spec, '=')?;
        options = options.query(key, value);
    }
    if let Some(secs) = args.timeout {
        options = options.timeout(Duration::from_secs(secs));
    }

    options.validate()?;
    Ok(options)
}

fn split_pair(spec: &str, separator: char) -> Result<(&str, &str)> {
    spec.split_once(separator)
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| {
            PantryError::InvalidInput(format!(
                "Expected NAME{}VALUE, got: {}",
                separator, spec
            ))
            .into()
        })
}
