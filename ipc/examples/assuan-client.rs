//! Connects to and sends commands to a server speaking the line
//! protocol, e.g. a directory service listening on a Unix socket.

use std::io::BufReader;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use clap::Parser;

use madrona_ipc::Result;
use madrona_ipc::assuan::{Client, Response};

/// Defines the CLI.
#[derive(Parser, Debug)]
#[clap(
    name = "assuan-client",
    about = "Connects to and sends commands to assuan servers.",
)]
pub struct Cli {
    #[clap(
        long,
        value_name = "PATH",
        help = "Server socket to connect to",
    )]
    server: PathBuf,

    #[clap(
        long,
        value_name = "COMMAND",
        help = "Commands to send to the server",
        required = true,
    )]
    commands: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let socket = UnixStream::connect(&cli.server)?;
    let reader = BufReader::new(socket.try_clone()?);
    let (mut client, greeting) = Client::connect(reader, socket)?;
    eprintln!("< {:?}", greeting);

    for command in cli.commands {
        eprintln!("> {}", command);
        client.send(&command)?;
        loop {
            let (data, statuses, end) = client.complete()?;
            if !data.is_empty() {
                eprintln!("< {} bytes of data", data.len());
            }
            for (keyword, message) in statuses {
                eprintln!("< S {} {}", keyword, message);
            }
            match end {
                Response::Inquire { keyword, .. } => {
                    eprintln!("< INQUIRE {}; sending empty reply", keyword);
                    client.data_reply(b"")?;
                },
                end => {
                    eprintln!("< {:?}", end);
                    break;
                },
            }
        }
    }

    Ok(())
}
