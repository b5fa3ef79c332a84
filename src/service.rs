//! Glue between the wire and the registry: decode, dispatch, encode.

use tracing::{debug, error};

use crate::envelope::{self, Reply, Request, UNKNOWN_OPERATION_MESSAGE};
use crate::registry::Registry;

/// Pre-rendered fault for the one failure nothing else can absorb: the reply
/// encoder itself erroring. A literal, so returning it cannot fail too.
const FALLBACK_FAULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:mhs="http://mahasiswa.service/">
  <soap:Body>
    <mhs:serviceFault>
      <message>Terjadi kesalahan internal</message>
    </mhs:serviceFault>
  </soap:Body>
</soap:Envelope>"#;

/// Applies a decoded request to the registry.
pub fn dispatch(registry: &Registry, request: Request) -> Reply {
    match request {
        Request::Fetch { nim } => Reply::Fetched(registry.fetch(&nim)),
        Request::Add { student } => {
            registry.upsert(student.clone());
            Reply::Added(student)
        }
        Request::Unknown => Reply::Error(UNKNOWN_OPERATION_MESSAGE.to_string()),
    }
}

/// Turns raw request bytes into response bytes.
///
/// Total: malformed input becomes an error envelope, and an encoder failure
/// falls back to a canned fault, so the HTTP layer always has well-formed XML
/// to send back.
pub fn handle_request(registry: &Registry, body: &[u8]) -> String {
    let reply = match envelope::decode_request(body) {
        Ok(request) => dispatch(registry, request),
        Err(err) => {
            debug!(%err, "rejecting malformed request");
            Reply::Error(UNKNOWN_OPERATION_MESSAGE.to_string())
        }
    };

    match envelope::encode_reply(&reply) {
        Ok(xml) => xml,
        Err(err) => {
            error!(%err, "failed to encode reply");
            FALLBACK_FAULT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{
        decode_reply, encode_add_request, encode_fetch_request, ClientReply, NOT_FOUND_MESSAGE,
    };
    use crate::record::Student;

    #[test]
    fn fetch_of_seeded_record_returns_it() {
        let registry = Registry::with_seed();
        let response = handle_request(&registry, encode_fetch_request("12345").as_bytes());
        match decode_reply(&response) {
            Some(ClientReply::Student(student)) => assert_eq!(student.gpa, "3.75"),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn fetch_of_absent_record_reports_not_found() {
        let registry = Registry::with_seed();
        let response = handle_request(&registry, encode_fetch_request("00000").as_bytes());
        assert_eq!(
            decode_reply(&response),
            Some(ClientReply::Message(NOT_FOUND_MESSAGE.into()))
        );
    }

    #[test]
    fn add_mutates_the_registry() {
        let registry = Registry::with_seed();
        let student = Student::new("99999", "Andi Wijaya", "Teknik Elektro", "3.90");
        let response = handle_request(&registry, encode_add_request(&student).as_bytes());
        assert!(response.contains("berhasil ditambahkan"));
        assert_eq!(registry.fetch("99999"), Some(student));
    }

    #[test]
    fn malformed_bytes_yield_an_error_envelope() {
        let registry = Registry::with_seed();
        let response = handle_request(&registry, b"definitely not xml <");
        assert!(response.contains(UNKNOWN_OPERATION_MESSAGE));
        assert!(response.starts_with("<?xml"));
    }

    #[test]
    fn fallback_fault_is_well_formed() {
        // The canned payload must itself survive a client-side decode.
        match decode_reply(FALLBACK_FAULT) {
            Some(ClientReply::Message(message)) => {
                assert_eq!(message, "Terjadi kesalahan internal");
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }
}
