use quick_xml::escape::escape;

use super::client::SoapEndpoint;
use crate::poller::RequestParameters;

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Build the request envelope. Parameters are sent as typed strings in the order
/// `id`, `ip`, `seconds`, `license`.
pub fn build_request(endpoint: &SoapEndpoint, params: &RequestParameters) -> String {
    let window = params.window_seconds.to_string();
    let fields = [
        ("id", params.platform_id.as_str()),
        ("ip", params.caller_ip.as_str()),
        ("seconds", window.as_str()),
        ("license", params.license_key.as_str()),
    ];

    let mut xml = String::with_capacity(512);
    xml.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push_str(&format!(
        r#"<soap:Envelope xmlns:soap="{SOAP_ENV_NS}" xmlns:xsi="{XSI_NS}" xmlns:xsd="{XSD_NS}">"#
    ));
    xml.push_str("<soap:Body>");
    xml.push_str(&format!(
        r#"<{method} xmlns="{namespace}">"#,
        method = endpoint.method,
        namespace = escape(endpoint.namespace.as_str())
    ));
    for (name, value) in fields {
        xml.push_str(&format!(
            r#"<{name} xsi:type="xsd:string">{}</{name}>"#,
            escape(value)
        ));
    }
    xml.push_str(&format!("</{}>", endpoint.method));
    xml.push_str("</soap:Body></soap:Envelope>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(key: &str) -> RequestParameters {
        RequestParameters::new("27424", "10.0.0.5", 1, key)
    }

    #[test]
    fn test_request_carries_all_parameters() {
        let xml = build_request(&SoapEndpoint::default(), &params("ABC"));

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"<GetPositionsByIp xmlns="urn:satwsdl">"#));
        assert!(xml.contains(r#"<id xsi:type="xsd:string">27424</id>"#));
        assert!(xml.contains(r#"<ip xsi:type="xsd:string">10.0.0.5</ip>"#));
        assert!(xml.contains(r#"<seconds xsi:type="xsd:string">1</seconds>"#));
        assert!(xml.contains(r#"<license xsi:type="xsd:string">ABC</license>"#));
        assert!(xml.ends_with("</GetPositionsByIp></soap:Body></soap:Envelope>"));
    }

    #[test]
    fn test_parameter_order() {
        let xml = build_request(&SoapEndpoint::default(), &params("ABC"));
        let id = xml.find("<id ").unwrap();
        let ip = xml.find("<ip ").unwrap();
        let seconds = xml.find("<seconds ").unwrap();
        let license = xml.find("<license ").unwrap();
        assert!(id < ip && ip < seconds && seconds < license);
    }

    #[test]
    fn test_values_are_escaped() {
        let xml = build_request(&SoapEndpoint::default(), &params("A<B&C"));
        assert!(xml.contains(">A&lt;B&amp;C</license>"));
    }

    #[test]
    fn test_request_is_well_formed() {
        let xml = build_request(&SoapEndpoint::default(), &params("ABC"));
        let mut reader = quick_xml::Reader::from_str(&xml);
        loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("request is not well formed: {e}"),
            }
        }
    }
}
