use std::net::SocketAddr;

use clap::Parser;
use tokio::net::UdpSocket;

#[derive(Parser)]
#[command(name = "udp-viewer")]
#[command(about = "Prints log lines received by a UDP network target", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:7071")]
    bind: SocketAddr,

    /// Prefix each line with the sender's address
    #[arg(long)]
    show_sender: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let socket = UdpSocket::bind(cli.bind).await?;
    eprintln!("Listening on udp://{}", socket.local_addr()?);

    let mut buf = vec![0u8; 65_536];
    loop {
        tokio::select! {
            received = socket.recv_from(&mut buf) => {
                let (len, sender) = received?;
                let text = String::from_utf8_lossy(&buf[..len]);
                let text = text.trim_end_matches(['\r', '\n']);
                if cli.show_sender {
                    println!("{} {}", sender, text);
                } else {
                    println!("{}", text);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                eprintln!("Shutting down");
                return Ok(());
            }
        }
    }
}
