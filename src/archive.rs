//! File-backed student archive.
//!
//! An ordered list of records persisted as one pretty-printed XML document.
//! Every mutation is a whole-document cycle: load, change the in-memory list,
//! rewrite the file. There is no index and no uniqueness rule; lookups scan in
//! document order and the first match wins.
//!
//! Missing-file handling is deliberately asymmetric: read operations report
//! [`ArchiveError::Missing`], while appends start from an empty archive. The
//! two entry points are kept separate so neither caller group changes
//! behavior for the other.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::record::{seed, Student};

const ROOT_ELEMENT: &str = "mahasiswa_list";
const RECORD_ELEMENT: &str = "mahasiswa";

#[derive(Debug)]
pub enum ArchiveError {
    /// The backing document does not exist.
    Missing(PathBuf),
    /// The backing document exists but is not a readable archive.
    Malformed(String),
    Io(io::Error),
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "archive {} tidak ditemukan", path.display()),
            Self::Malformed(reason) => write!(f, "archive is not valid XML: {reason}"),
            Self::Io(err) => write!(f, "archive io error: {err}"),
        }
    }
}

impl std::error::Error for ArchiveError {}

impl From<io::Error> for ArchiveError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<quick_xml::Error> for ArchiveError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

pub struct Archive {
    path: PathBuf,
}

impl Archive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the seed records, replacing whatever was there before.
    pub fn init(&self) -> Result<(), ArchiveError> {
        self.save(&seed())
    }

    /// Reads the full archive in document order.
    ///
    /// A missing file is an error here; only the write paths treat absence as
    /// an empty archive.
    pub fn load(&self) -> Result<Vec<Student>, ArchiveError> {
        let xml = match fs::read_to_string(&self.path) {
            Ok(xml) => xml,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ArchiveError::Missing(self.path.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        parse_document(&xml)
    }

    fn load_or_empty(&self) -> Result<Vec<Student>, ArchiveError> {
        match self.load() {
            Ok(students) => Ok(students),
            Err(ArchiveError::Missing(_)) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Serializes `students` in order, overwriting the previous document.
    pub fn save(&self, students: &[Student]) -> Result<(), ArchiveError> {
        let xml = render_document(students)?;
        fs::write(&self.path, xml)?;
        Ok(())
    }

    /// First record with the given nim, scanning in document order.
    pub fn find(&self, nim: &str) -> Result<Option<Student>, ArchiveError> {
        Ok(self
            .load()?
            .into_iter()
            .find(|student| student.nim == nim))
    }

    /// Appends a record at the end, creating the file when absent.
    /// Duplicate nims are allowed; lookups keep returning the first one.
    pub fn append(&self, student: Student) -> Result<(), ArchiveError> {
        let mut students = self.load_or_empty()?;
        students.push(student);
        self.save(&students)
    }

    /// Replaces the gpa of the first record matching `nim` and rewrites the
    /// document. When no record matches, the file is left untouched and
    /// `Ok(false)` is returned.
    pub fn update_gpa(&self, nim: &str, new_gpa: &str) -> Result<bool, ArchiveError> {
        let mut students = self.load()?;
        let Some(student) = students.iter_mut().find(|student| student.nim == nim) else {
            return Ok(false);
        };
        student.gpa = new_gpa.to_string();
        self.save(&students)?;
        Ok(true)
    }
}

fn parse_document(xml: &str) -> Result<Vec<Student>, ArchiveError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut students = Vec::new();
    let mut current: Option<Student> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                if name == RECORD_ELEMENT {
                    // A record element missing a child keeps that field empty;
                    // shape-matching only, no schema validation.
                    current = Some(Student::default());
                } else if current.is_some() {
                    field = Some(name);
                }
            }
            Ok(Event::Text(content)) => {
                let value = content
                    .unescape()
                    .map_err(|err| ArchiveError::Malformed(err.to_string()))?;
                if let (Some(student), Some(field)) = (current.as_mut(), field.as_deref()) {
                    match field {
                        "nim" => student.nim = value.into_owned(),
                        "nama" => student.name = value.into_owned(),
                        "jurusan" => student.program = value.into_owned(),
                        "ipk" => student.gpa = value.into_owned(),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(end)) => {
                let name = String::from_utf8_lossy(end.local_name().as_ref()).into_owned();
                if name == RECORD_ELEMENT {
                    if let Some(student) = current.take() {
                        students.push(student);
                    }
                } else {
                    field = None;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(ArchiveError::Malformed(err.to_string())),
        }
    }

    Ok(students)
}

fn render_document(students: &[Student]) -> Result<String, ArchiveError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;

    for student in students {
        writer.write_event(Event::Start(BytesStart::new(RECORD_ELEMENT)))?;
        write_text_element(&mut writer, "nim", &student.nim)?;
        write_text_element(&mut writer, "nama", &student.name)?;
        write_text_element(&mut writer, "jurusan", &student.program)?;
        write_text_element(&mut writer, "ipk", &student.gpa)?;
        writer.write_event(Event::End(BytesEnd::new(RECORD_ELEMENT)))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

    String::from_utf8(writer.into_inner())
        .map_err(|err| ArchiveError::Malformed(err.to_string()))
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    text: &str,
) -> Result<(), ArchiveError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_parses_to_no_records() {
        let students = parse_document("<mahasiswa_list></mahasiswa_list>").expect("parse");
        assert!(students.is_empty());
    }

    #[test]
    fn records_keep_document_order() {
        let xml = render_document(&seed()).expect("render");
        let students = parse_document(&xml).expect("parse");
        assert_eq!(students, seed());
    }

    #[test]
    fn record_missing_a_child_parses_with_empty_field() {
        let xml = r#"<mahasiswa_list>
  <mahasiswa>
    <nim>22222</nim>
    <nama>Rina Kartika</nama>
    <jurusan>Teknik Sipil</jurusan>
  </mahasiswa>
</mahasiswa_list>"#;
        let students = parse_document(xml).expect("parse");
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].nim, "22222");
        assert_eq!(students[0].gpa, "");
    }

    #[test]
    fn garbage_document_is_malformed() {
        let error = parse_document("<mahasiswa_list><mah").expect_err("truncated");
        assert!(matches!(error, ArchiveError::Malformed(_)));
    }
}
