use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the SOAP service with the seeded in-memory registry.
    Serve(ServeArgs),
    /// Fetch one student record from a running service.
    Fetch(FetchArgs),
    /// Add a student record through a running service.
    Add(AddArgs),
    /// Operate on the file-backed student archive.
    #[command(subcommand)]
    Archive(ArchiveCommand),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Socket address the service should bind to. Use port 0 for an ephemeral port.
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub listen: SocketAddr,
}

#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
    /// URL of the service's SOAP endpoint.
    #[arg(long, default_value = "http://127.0.0.1:8000/mahasiswa")]
    pub endpoint: String,
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Student number to look up.
    #[arg(long)]
    pub nim: String,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Student number of the new record.
    #[arg(long)]
    pub nim: String,

    /// Full name of the student.
    #[arg(long)]
    pub name: String,

    /// Study program the student is enrolled in.
    #[arg(long)]
    pub program: String,

    /// Grade-point average, passed through as text.
    #[arg(long)]
    pub gpa: String,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}

#[derive(Subcommand, Debug)]
pub enum ArchiveCommand {
    /// Create the archive file populated with the seed records.
    Init(ArchiveArgs),
    /// Print every record in the archive.
    List(ArchiveArgs),
    /// Look up the first record with the given student number.
    Find {
        #[arg(long)]
        nim: String,

        #[command(flatten)]
        archive: ArchiveArgs,
    },
    /// Append a record to the end of the archive.
    Add {
        #[arg(long)]
        nim: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        program: String,

        #[arg(long)]
        gpa: String,

        #[command(flatten)]
        archive: ArchiveArgs,
    },
    /// Update the gpa of the first record with the given student number.
    SetGpa {
        #[arg(long)]
        nim: String,

        #[arg(long)]
        gpa: String,

        #[command(flatten)]
        archive: ArchiveArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ArchiveArgs {
    /// Path of the XML archive document.
    #[arg(long, default_value = "mahasiswa.xml")]
    pub file: PathBuf,
}
