//! The SOAP-style envelope codec.
//!
//! The protocol is two operations over a fixed envelope shape, so this is a
//! pair of hand-rolled encode/decode functions per operation rather than a
//! schema-driven serializer. Decoding matches elements by local name and
//! ignores prefixes: clients disagree on prefixes in practice and the service
//! has always accepted them all.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::record::Student;

pub const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SERVICE_NS: &str = "http://mahasiswa.service/";

/// Status line returned when a fetch finds nothing.
pub const NOT_FOUND_MESSAGE: &str = "Data tidak ditemukan";
/// Status line returned for a request naming no known operation.
pub const UNKNOWN_OPERATION_MESSAGE: &str = "Operasi tidak dikenal";

/// A decoded inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Fetch { nim: String },
    Add { student: Student },
    Unknown,
}

/// What the dispatcher produced, ready to be encoded into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Fetched(Option<Student>),
    Added(Student),
    Error(String),
}

/// What a client gets back out of a response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientReply {
    Student(Student),
    Message(String),
}

/// Request bytes that could not be understood: not UTF-8, not well-formed
/// XML, or an add request missing a required record field.
#[derive(Debug)]
pub struct MalformedEnvelope(String);

impl fmt::Display for MalformedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed envelope: {}", self.0)
    }
}

impl std::error::Error for MalformedEnvelope {}

/// A reply that could not be rendered. Callers fall back to a canned fault;
/// this never crosses the service boundary as a panic.
#[derive(Debug)]
pub struct EncodeError(String);

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to encode envelope: {}", self.0)
    }
}

impl std::error::Error for EncodeError {}

impl From<io::Error> for EncodeError {
    fn from(err: io::Error) -> Self {
        Self(err.to_string())
    }
}

impl From<quick_xml::Error> for EncodeError {
    fn from(err: quick_xml::Error) -> Self {
        Self(err.to_string())
    }
}

/// Decodes request bytes into an operation.
///
/// Structural deviations inside well-formed XML come back as
/// [`Request::Unknown`] so the caller can answer with an error envelope
/// instead of dropping the connection.
pub fn decode_request(body: &[u8]) -> Result<Request, MalformedEnvelope> {
    let xml =
        std::str::from_utf8(body).map_err(|err| MalformedEnvelope(err.to_string()))?;
    let scan = scan_elements(xml)?;

    if scan.has("getMahasiswa") {
        // A fetch without a <nim> element looks up the empty string.
        let nim = scan.text("nim").unwrap_or_default();
        return Ok(Request::Fetch { nim });
    }

    if scan.has("tambahMahasiswa") {
        if !scan.has("mahasiswa") {
            return Err(MalformedEnvelope(
                "tambahMahasiswa without a mahasiswa element".into(),
            ));
        }
        let student = Student {
            nim: scan.require("nim")?,
            name: scan.require("nama")?,
            program: scan.require("jurusan")?,
            gpa: scan.require("ipk")?,
        };
        return Ok(Request::Add { student });
    }

    Ok(Request::Unknown)
}

/// Encodes a reply into a pretty-printed response envelope.
pub fn encode_reply(reply: &Reply) -> Result<String, EncodeError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut envelope = BytesStart::new("soap:Envelope");
    envelope.push_attribute(("xmlns:soap", SOAP_NS));
    envelope.push_attribute(("xmlns:mhs", SERVICE_NS));
    writer.write_event(Event::Start(envelope))?;
    writer.write_event(Event::Start(BytesStart::new("soap:Body")))?;

    match reply {
        Reply::Fetched(Some(student)) => {
            writer.write_event(Event::Start(BytesStart::new("mhs:getMahasiswaResponse")))?;
            write_student(&mut writer, student)?;
            writer.write_event(Event::End(BytesEnd::new("mhs:getMahasiswaResponse")))?;
        }
        Reply::Fetched(None) => {
            writer.write_event(Event::Start(BytesStart::new("mhs:getMahasiswaResponse")))?;
            write_text_element(&mut writer, "message", NOT_FOUND_MESSAGE)?;
            writer.write_event(Event::End(BytesEnd::new("mhs:getMahasiswaResponse")))?;
        }
        Reply::Added(student) => {
            let confirmation = format!(
                "Mahasiswa {} dengan NIM {} berhasil ditambahkan",
                student.name, student.nim
            );
            writer.write_event(Event::Start(BytesStart::new("mhs:tambahMahasiswaResponse")))?;
            write_text_element(&mut writer, "message", &confirmation)?;
            writer.write_event(Event::End(BytesEnd::new("mhs:tambahMahasiswaResponse")))?;
        }
        Reply::Error(message) => {
            writer.write_event(Event::Start(BytesStart::new("mhs:serviceFault")))?;
            write_text_element(&mut writer, "message", message)?;
            writer.write_event(Event::End(BytesEnd::new("mhs:serviceFault")))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("soap:Body")))?;
    writer.write_event(Event::End(BytesEnd::new("soap:Envelope")))?;

    String::from_utf8(writer.into_inner()).map_err(|err| EncodeError(err.to_string()))
}

/// Builds a fetch request envelope for the client side.
pub fn encode_fetch_request(nim: &str) -> String {
    let nim = escape(nim);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="{SOAP_NS}" xmlns:mhs="{SERVICE_NS}">
  <soap:Body>
    <mhs:getMahasiswa>
      <nim>{nim}</nim>
    </mhs:getMahasiswa>
  </soap:Body>
</soap:Envelope>"#
    )
}

/// Builds an add request envelope for the client side.
pub fn encode_add_request(student: &Student) -> String {
    let nim = escape(student.nim.as_str());
    let name = escape(student.name.as_str());
    let program = escape(student.program.as_str());
    let gpa = escape(student.gpa.as_str());
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="{SOAP_NS}" xmlns:mhs="{SERVICE_NS}">
  <soap:Body>
    <mhs:tambahMahasiswa>
      <mahasiswa>
        <nim>{nim}</nim>
        <nama>{name}</nama>
        <jurusan>{program}</jurusan>
        <ipk>{gpa}</ipk>
      </mahasiswa>
    </mhs:tambahMahasiswa>
  </soap:Body>
</soap:Envelope>"#
    )
}

/// Decodes a response envelope on the client side.
///
/// A record element wins over a status message; anything unreadable is
/// `None` rather than an error, matching the client contract of absorbing
/// failures at the boundary.
pub fn decode_reply(xml: &str) -> Option<ClientReply> {
    let scan = scan_elements(xml).ok()?;

    if scan.has("mahasiswa") {
        return Some(ClientReply::Student(Student {
            nim: scan.text("nim").unwrap_or_default(),
            name: scan.text("nama").unwrap_or_default(),
            program: scan.text("jurusan").unwrap_or_default(),
            gpa: scan.text("ipk").unwrap_or_default(),
        }));
    }

    scan.text("message").map(ClientReply::Message)
}

/// Flat view of a parsed document: which local names appeared, and the first
/// text content directly inside each. Enough structure for a two-operation
/// protocol; anything fancier would be validating a schema we do not have.
struct ElementScan {
    seen: HashSet<String>,
    text: HashMap<String, String>,
}

impl ElementScan {
    fn has(&self, element: &str) -> bool {
        self.seen.contains(element)
    }

    fn text(&self, element: &str) -> Option<String> {
        self.text.get(element).cloned()
    }

    fn require(&self, element: &str) -> Result<String, MalformedEnvelope> {
        self.text(element)
            .ok_or_else(|| MalformedEnvelope(format!("missing <{element}> text")))
    }
}

fn scan_elements(xml: &str) -> Result<ElementScan, MalformedEnvelope> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut seen = HashSet::new();
    let mut text: HashMap<String, String> = HashMap::new();
    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = local_name(start.local_name().as_ref());
                seen.insert(name.clone());
                open.push(name);
            }
            Ok(Event::Empty(start)) => {
                seen.insert(local_name(start.local_name().as_ref()));
            }
            Ok(Event::End(_)) => {
                open.pop();
            }
            Ok(Event::Text(content)) => {
                let value = content
                    .unescape()
                    .map_err(|err| MalformedEnvelope(err.to_string()))?;
                if let Some(element) = open.last() {
                    text.entry(element.clone())
                        .or_insert_with(|| value.into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(MalformedEnvelope(err.to_string())),
        }
    }

    Ok(ElementScan { seen, text })
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn write_student(writer: &mut Writer<Vec<u8>>, student: &Student) -> Result<(), EncodeError> {
    writer.write_event(Event::Start(BytesStart::new("mahasiswa")))?;
    write_text_element(writer, "nim", &student.nim)?;
    write_text_element(writer, "nama", &student.name)?;
    write_text_element(writer, "jurusan", &student.program)?;
    write_text_element(writer, "ipk", &student.gpa)?;
    writer.write_event(Event::End(BytesEnd::new("mahasiswa")))?;
    Ok(())
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    text: &str,
) -> Result<(), EncodeError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_fetch_request() {
        let body = encode_fetch_request("12345");
        let request = decode_request(body.as_bytes()).expect("decode fetch");
        assert_eq!(
            request,
            Request::Fetch {
                nim: "12345".into()
            }
        );
    }

    #[test]
    fn fetch_without_nim_decodes_to_empty_key() {
        let body = format!(
            r#"<soap:Envelope xmlns:soap="{SOAP_NS}" xmlns:mhs="{SERVICE_NS}">
  <soap:Body>
    <mhs:getMahasiswa/>
  </soap:Body>
</soap:Envelope>"#
        );
        let request = decode_request(body.as_bytes()).expect("decode fetch");
        assert_eq!(request, Request::Fetch { nim: String::new() });
    }

    #[test]
    fn add_request_round_trips() {
        let student = Student::new("99999", "Andi Wijaya", "Teknik Elektro", "3.90");
        let body = encode_add_request(&student);
        let request = decode_request(body.as_bytes()).expect("decode add");
        assert_eq!(request, Request::Add { student });
    }

    #[test]
    fn add_request_escapes_markup_in_fields() {
        let student = Student::new("13579", "Dewi <& Putri>", "Teknik Mesin", "3.20");
        let body = encode_add_request(&student);
        let request = decode_request(body.as_bytes()).expect("decode add");
        assert_eq!(request, Request::Add { student });
    }

    #[test]
    fn add_request_missing_field_is_malformed() {
        let body = format!(
            r#"<soap:Envelope xmlns:soap="{SOAP_NS}" xmlns:mhs="{SERVICE_NS}">
  <soap:Body>
    <mhs:tambahMahasiswa>
      <mahasiswa>
        <nim>99999</nim>
        <nama>Andi Wijaya</nama>
        <jurusan>Teknik Elektro</jurusan>
      </mahasiswa>
    </mhs:tambahMahasiswa>
  </soap:Body>
</soap:Envelope>"#
        );
        let error = decode_request(body.as_bytes()).expect_err("ipk is missing");
        assert!(error.to_string().contains("ipk"));
    }

    #[test]
    fn unrecognized_operation_decodes_to_unknown() {
        let body = format!(
            r#"<soap:Envelope xmlns:soap="{SOAP_NS}" xmlns:mhs="{SERVICE_NS}">
  <soap:Body>
    <mhs:hapusMahasiswa>
      <nim>12345</nim>
    </mhs:hapusMahasiswa>
  </soap:Body>
</soap:Envelope>"#
        );
        let request = decode_request(body.as_bytes()).expect("well-formed request");
        assert_eq!(request, Request::Unknown);
    }

    #[test]
    fn malformed_xml_is_rejected() {
        assert!(decode_request(b"this is not xml <oops").is_err());
        assert!(decode_request(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn record_reply_round_trips_through_client_decode() {
        let student = Student::new("12345", "Ahmad Rizki", "Teknik Informatika", "3.75");
        let xml = encode_reply(&Reply::Fetched(Some(student.clone()))).expect("encode");
        let reply = decode_reply(&xml).expect("decode");
        assert_eq!(reply, ClientReply::Student(student));
    }

    #[test]
    fn not_found_reply_carries_fixed_message() {
        let xml = encode_reply(&Reply::Fetched(None)).expect("encode");
        let reply = decode_reply(&xml).expect("decode");
        assert_eq!(reply, ClientReply::Message(NOT_FOUND_MESSAGE.into()));
    }

    #[test]
    fn added_reply_names_the_student() {
        let student = Student::new("99999", "Andi Wijaya", "Teknik Elektro", "3.90");
        let xml = encode_reply(&Reply::Added(student)).expect("encode");
        match decode_reply(&xml) {
            Some(ClientReply::Message(message)) => {
                assert!(message.contains("Andi Wijaya"));
                assert!(message.contains("99999"));
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn replies_are_pretty_printed_with_declaration() {
        let xml = encode_reply(&Reply::Error(UNKNOWN_OPERATION_MESSAGE.into())).expect("encode");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("\n  <soap:Body>"));
        assert!(xml.contains("\n    <mhs:serviceFault>"));
    }
}
