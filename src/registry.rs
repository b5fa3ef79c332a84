use std::collections::HashMap;
use std::sync::Mutex;

use crate::record::{seed, Student};

/// In-memory student table backing the SOAP service.
///
/// Constructed once at startup and shared behind an `Arc` by every request
/// handler. The mutex is the whole concurrency story: handlers may overlap
/// once HTTP is in front of this, and each operation is a single lock hold.
#[derive(Default)]
pub struct Registry {
    students: Mutex<HashMap<String, Student>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the demo records the service ships with.
    pub fn with_seed() -> Self {
        let registry = Self::new();
        for student in seed() {
            registry.upsert(student);
        }
        registry
    }

    pub fn fetch(&self, nim: &str) -> Option<Student> {
        self.students.lock().unwrap().get(nim).cloned()
    }

    /// Inserts or replaces the record stored under its nim. Re-adding an
    /// existing nim overwrites silently; the service never rejects duplicates.
    pub fn upsert(&self, student: Student) {
        self.students
            .lock()
            .unwrap()
            .insert(student.nim.clone(), student);
    }
}
