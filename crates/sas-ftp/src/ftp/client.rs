//! FTP client: owns one control connection and issues commands.
//!
//! Lifecycle: `connect()` → `login()` (USER/PASS, `TYPE I`) → one of
//! `list()` / `store()` / `retrieve()` → `quit()`.
//!
//! Transfer commands open the data channel first, then send the command,
//! move the bytes, and wait for the completion reply.

use crate::ftp::connection;
use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::protocol::FtpCodec;
use crate::ftp::transfer;
use crate::ftp::types::*;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// A connected FTP control channel.
pub struct FtpClient {
    codec: FtpCodec,
    host: String,
    options: TransferOptions,
    banner: FtpResponse,
}

impl FtpClient {
    /// Open the control connection and read the greeting.
    pub async fn connect(endpoint: &FtpEndpoint, options: &TransferOptions) -> FtpResult<Self> {
        if endpoint.host.is_empty() {
            return Err(FtpError::invalid_input("Host must not be empty"));
        }
        let (codec, banner) =
            connection::connect(endpoint, Duration::from_secs(options.connect_timeout_sec)).await?;
        log::debug!("FTP {} greeted: {}", endpoint.address(), banner.status_description());
        Ok(Self {
            codec,
            host: endpoint.host.clone(),
            options: options.clone(),
            banner,
        })
    }

    pub fn banner(&self) -> &FtpResponse {
        &self.banner
    }

    // ─── Authentication ──────────────────────────────────────────

    /// USER/PASS then `TYPE I`. Returns the server's login reply.
    pub async fn login(&mut self, credentials: &FtpCredentials) -> FtpResult<FtpResponse> {
        let user = self
            .codec
            .execute(&format!("USER {}", credentials.username))
            .await?;
        let welcome = match user.code {
            // Server wants a password
            331 | 332 => {
                let pass = self
                    .codec
                    .execute(&format!("PASS {}", credentials.password))
                    .await?;
                if !pass.is_completion() {
                    return Err(FtpError::from_reply(pass.code, &pass.text()));
                }
                pass
            }
            _ if user.is_completion() => user,
            _ => return Err(FtpError::from_reply(user.code, &user.text())),
        };

        self.codec.expect_ok("TYPE I").await?;
        Ok(welcome)
    }

    // ─── Transfers ───────────────────────────────────────────────

    /// `LIST <path>`; returns the listing text and the completion reply.
    pub async fn list(&mut self, path: &str) -> FtpResult<(String, FtpResponse)> {
        let mut ds = self.open_data_channel().await?;
        let started = self.begin(&format!("LIST {}", path)).await?;

        let mut buf = Vec::new();
        self.with_data_timeout(ds.read_to_end(&mut buf)).await?;
        drop(ds);

        let done = self.finish(started).await?;
        Ok((String::from_utf8_lossy(&buf).into_owned(), done))
    }

    /// `ALLO <len>` then `STOR <path>` with `content` on the data channel.
    pub async fn store(&mut self, path: &str, content: &[u8]) -> FtpResult<FtpResponse> {
        // Best effort: servers that do not need space reservation reply 202.
        match self.codec.execute(&format!("ALLO {}", content.len())).await {
            Ok(r) => log::trace!("ALLO {} -> {}", content.len(), r.code),
            Err(e) => log::debug!("ALLO ignored: {}", e),
        }

        let mut ds = self.open_data_channel().await?;
        let started = self.begin(&format!("STOR {}", path)).await?;

        self.with_data_timeout(ds.write_all(content)).await?;
        self.with_data_timeout(ds.shutdown()).await?;
        drop(ds);

        self.finish(started).await
    }

    /// `RETR <path>`, draining and discarding the body. Returns the byte
    /// count and the completion reply.
    pub async fn retrieve(&mut self, path: &str) -> FtpResult<(u64, FtpResponse)> {
        let mut ds = self.open_data_channel().await?;
        let started = self.begin(&format!("RETR {}", path)).await?;

        let bytes = self
            .with_data_timeout(tokio::io::copy(&mut ds, &mut tokio::io::sink()))
            .await?;
        drop(ds);

        let done = self.finish(started).await?;
        Ok((bytes, done))
    }

    // ─── QUIT ────────────────────────────────────────────────────

    /// Gracefully close the session.
    pub async fn quit(mut self) {
        let _ = self.codec.execute("QUIT").await;
    }

    // ─── Helpers ─────────────────────────────────────────────────

    async fn open_data_channel(&mut self) -> FtpResult<TcpStream> {
        transfer::open_data_channel(
            &mut self.codec,
            self.options.data_channel_mode,
            &self.host,
            Duration::from_secs(self.options.data_timeout_sec),
        )
        .await
    }

    /// Send a transfer command; accept 1xx (transfer starting) or a 2xx
    /// from servers that complete immediately.
    async fn begin(&mut self, cmd: &str) -> FtpResult<FtpResponse> {
        let resp = self.codec.execute(cmd).await?;
        if !resp.is_preliminary() && !resp.is_completion() {
            return Err(FtpError::from_reply(resp.code, &resp.text()));
        }
        Ok(resp)
    }

    /// Read the completion reply that follows a 1xx.
    async fn finish(&mut self, started: FtpResponse) -> FtpResult<FtpResponse> {
        if started.is_completion() {
            return Ok(started);
        }
        let done = self.codec.read_response().await?;
        if !done.is_completion() {
            return Err(FtpError::from_reply(done.code, &done.text()));
        }
        Ok(done)
    }

    async fn with_data_timeout<F, T>(&self, fut: F) -> FtpResult<T>
    where
        F: std::future::Future<Output = std::io::Result<T>>,
    {
        timeout(Duration::from_secs(self.options.data_timeout_sec), fut)
            .await
            .map_err(|_| FtpError::timeout("Data transfer timed out"))?
            .map_err(FtpError::from)
    }
}
