//! Binding identifier resolution.

use crate::descriptor::error::DescriptorError;

pub const SOAP11_HTTP: &str = "http://schemas.xmlsoap.org/wsdl/soap/http";
pub const SOAP11_HTTP_MTOM: &str = "http://schemas.xmlsoap.org/wsdl/soap/http?mtom=true";
pub const SOAP12_HTTP: &str = "http://www.w3.org/2003/05/soap/bindings/HTTP/";
pub const SOAP12_HTTP_MTOM: &str = "http://www.w3.org/2003/05/soap/bindings/HTTP/?mtom=true";
pub const XML_HTTP: &str = "http://www.w3.org/2004/08/wsdl/http";

/// Resolve a deployment binding id to a binding URI.
///
/// `None` or an empty id yields `Ok(None)`: the engine infers a default.
/// Well-known short ids map to their URIs; absolute URIs pass through.
pub fn binding_uri(binding_id: Option<&str>) -> Result<Option<String>, DescriptorError> {
    let id = match binding_id.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(id) => id,
    };

    let uri = match id {
        "SOAP11_HTTP" => SOAP11_HTTP,
        "SOAP11_HTTP_MTOM" => SOAP11_HTTP_MTOM,
        "SOAP12_HTTP" => SOAP12_HTTP,
        "SOAP12_HTTP_MTOM" => SOAP12_HTTP_MTOM,
        "XML_HTTP" => XML_HTTP,
        other if is_absolute_uri(other) => other,
        other => {
            return Err(DescriptorError::MalformedBinding {
                binding_id: other.to_string(),
            })
        }
    };
    Ok(Some(uri.to_string()))
}

fn is_absolute_uri(s: &str) -> bool {
    match s.split_once(':') {
        Some((scheme, rest)) => {
            !rest.is_empty()
                && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
