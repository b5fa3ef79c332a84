use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use student_registry::{
    archive::Archive,
    cli::{AddArgs, ArchiveCommand, Cli, Command, FetchArgs},
    client::SoapClient,
    envelope::{ClientReply, NOT_FOUND_MESSAGE},
    record::Student,
    registry::Registry,
    server,
};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            let listener = TcpListener::bind(args.listen).await?;
            info!("listening on {}", listener.local_addr()?);
            server::run_until_ctrl_c(listener, Arc::new(Registry::with_seed())).await?;
        }
        Command::Fetch(args) => run_fetch(args).await?,
        Command::Add(args) => run_add(args).await?,
        Command::Archive(command) => run_archive(command)?,
    }

    Ok(())
}

async fn run_fetch(args: FetchArgs) -> Result<()> {
    let client = SoapClient::new(args.endpoint.endpoint.clone());
    match client.fetch(&args.nim).await {
        Some(reply) => print_reply(reply),
        None => bail!("no usable response from {}", args.endpoint.endpoint),
    }
    Ok(())
}

async fn run_add(args: AddArgs) -> Result<()> {
    let client = SoapClient::new(args.endpoint.endpoint.clone());
    let student = Student::new(args.nim, args.name, args.program, args.gpa);
    match client.add(&student).await {
        Some(reply) => print_reply(reply),
        None => bail!("no usable response from {}", args.endpoint.endpoint),
    }
    Ok(())
}

fn print_reply(reply: ClientReply) {
    match reply {
        ClientReply::Student(student) => println!("{student}"),
        ClientReply::Message(message) => println!("{message}"),
    }
}

fn run_archive(command: ArchiveCommand) -> Result<()> {
    match command {
        ArchiveCommand::Init(args) => {
            let archive = Archive::new(args.file);
            archive.init()?;
            println!("archive created: {}", archive.path().display());
        }
        ArchiveCommand::List(args) => {
            for student in Archive::new(args.file).load()? {
                println!("{student}");
                println!("------------------------------");
            }
        }
        ArchiveCommand::Find { nim, archive } => match Archive::new(archive.file).find(&nim)? {
            Some(student) => println!("{student}"),
            None => println!("{NOT_FOUND_MESSAGE}"),
        },
        ArchiveCommand::Add {
            nim,
            name,
            program,
            gpa,
            archive,
        } => {
            let student = Student::new(nim, name, program, gpa);
            Archive::new(archive.file).append(student.clone())?;
            println!("Mahasiswa {} berhasil ditambahkan", student.name);
        }
        ArchiveCommand::SetGpa { nim, gpa, archive } => {
            if Archive::new(archive.file).update_gpa(&nim, &gpa)? {
                println!("IPK mahasiswa NIM {nim} berhasil diupdate menjadi {gpa}");
            } else {
                println!("Mahasiswa dengan NIM {nim} tidak ditemukan");
            }
        }
    }
    Ok(())
}
