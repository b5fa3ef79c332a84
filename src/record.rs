use std::fmt;

/// A single student record.
///
/// Every field, including the grade-point average, is text. The wire format
/// and the archive document only ever carry strings, and reformatting "3.60"
/// into "3.6" on the way through would break round-trips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Student {
    /// Student number; the lookup key everywhere.
    pub nim: String,
    pub name: String,
    pub program: String,
    pub gpa: String,
}

impl Student {
    pub fn new(
        nim: impl Into<String>,
        name: impl Into<String>,
        program: impl Into<String>,
        gpa: impl Into<String>,
    ) -> Self {
        Self {
            nim: nim.into(),
            name: name.into(),
            program: program.into(),
            gpa: gpa.into(),
        }
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NIM: {}", self.nim)?;
        writeln!(f, "Nama: {}", self.name)?;
        writeln!(f, "Jurusan: {}", self.program)?;
        write!(f, "IPK: {}", self.gpa)
    }
}

/// Demo records every fresh store starts from: the in-memory registry is
/// seeded with these at startup and `archive init` writes them to disk.
pub fn seed() -> Vec<Student> {
    vec![
        Student::new("12345", "Ahmad Rizki", "Teknik Informatika", "3.75"),
        Student::new("67890", "Siti Nurhaliza", "Sistem Informasi", "3.85"),
        Student::new("11111", "Budi Santoso", "Teknik Komputer", "3.60"),
    ]
}
