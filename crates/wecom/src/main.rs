use std::path::PathBuf;

use clap::{Parser, Subcommand};
use futures::StreamExt;
use miette::IntoDiagnostic;
use smol_str::SmolStr;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;
use wecom::api::message::TextMessage;
use wecom::common::transport::DEFAULT_BASE_URL;
use wecom::{ApiResponse, BasicClient, MediaKind, PayloadSource, TransportConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "wecom - enterprise WeChat API client demo")]
struct Args {
    /// API root
    #[arg(long, env = "WECOM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: SmolStr,

    /// Access token, obtained from `gettoken`
    #[arg(long, env = "WECOM_ACCESS_TOKEN")]
    access_token: SmolStr,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload temporary media
    UploadMedia {
        /// image, voice, video or thumb
        kind: MediaKind,
        /// File to upload
        path: PathBuf,
    },
    /// Upload an image for use inside messages
    UploadImage {
        /// File to upload
        path: PathBuf,
    },
    /// Count permanent materials
    MaterialCount,
    /// Send a text message
    SendText {
        /// Sending application
        #[arg(long)]
        agent_id: i64,
        /// Recipient member ids, `|`-separated
        #[arg(long)]
        to_user: SmolStr,
        /// Message text
        content: String,
    },
    /// Download temporary media to a file
    GetMedia {
        /// Media id
        media_id: String,
        /// Output file
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = BasicClient::from_config(
        TransportConfig::new()
            .base_url(args.base_url)
            .access_token(args.access_token)
            .build(),
    )?;

    match args.command {
        Command::UploadMedia { kind, path } => {
            print_json(client.upload_media(PayloadSource::path(path), kind).await?).await?
        }
        Command::UploadImage { path } => {
            print_json(client.upload_image(PayloadSource::path(path)).await?).await?
        }
        Command::MaterialCount => print_json(client.get_material_count().await?).await?,
        Command::SendText {
            agent_id,
            to_user,
            content,
        } => {
            let message = TextMessage::new()
                .touser(to_user)
                .agentid(agent_id)
                .content(content)
                .build();
            print_json(client.send_text(&message).await?).await?
        }
        Command::GetMedia { media_id, out } => {
            let mut body = client.get_media(&media_id).await?.into_stream();
            let mut file = tokio::fs::File::create(&out).await.into_diagnostic()?;
            let mut written = 0u64;
            while let Some(chunk) = body.next().await {
                let chunk = chunk.into_diagnostic()?;
                written += chunk.len() as u64;
                file.write_all(&chunk).await.into_diagnostic()?;
            }
            file.flush().await.into_diagnostic()?;
            println!("wrote {written} bytes to {}", out.display());
        }
    }

    Ok(())
}

async fn print_json(resp: ApiResponse) -> miette::Result<()> {
    let value: serde_json::Value = resp.json().await?;
    println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
    Ok(())
}
