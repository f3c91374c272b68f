//! Transfer session exposed by the facade.
//!
//! There is no persistent channel: `connect` verifies the credentials with a
//! directory listing of the remote base path, and every later `upload` or
//! `download` logs in again on a fresh control connection and quits when
//! done. `connected` never goes back to `false`.

use crate::ftp::client::FtpClient;
use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::types::*;
use log::{info, warn};
use sas_core::Outcome;
use std::path::Path;

pub const DEFAULT_FTP_PORT: u16 = 21;

pub const NOT_CONNECTED_MESSAGE: &str =
    "FTP is not connected. Please call connect_transfer(username, password, port = 21) first!";

const UTF8_BOM: char = '\u{feff}';

pub struct TransferSession {
    endpoint: FtpEndpoint,
    remote_path: String,
    options: TransferOptions,
    credentials: Option<FtpCredentials>,
    connected: bool,
}

impl TransferSession {
    pub fn new(host: impl Into<String>, remote_path: impl Into<String>, options: TransferOptions) -> Self {
        Self {
            endpoint: FtpEndpoint::new(host, DEFAULT_FTP_PORT),
            remote_path: remote_path.into(),
            options,
            credentials: None,
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    pub fn set_remote_path(&mut self, path: impl Into<String>) {
        self.remote_path = path.into();
    }

    pub fn endpoint(&self) -> &FtpEndpoint {
        &self.endpoint
    }

    /// Store the credentials and port, then check them with `LIST`.
    ///
    /// The status is the server's login reply.
    pub async fn connect(&mut self, username: &str, password: &str, port: u16) -> Outcome<()> {
        self.endpoint.port = port;
        self.credentials = Some(FtpCredentials::new(username, password));

        let base = self.remote_path.clone();
        let result = self
            .run(|client| {
                Box::pin(async move {
                    let (listing, _) = client.list(&base).await?;
                    log::debug!("FTP listing of {}: {} bytes", base, listing.len());
                    Ok::<_, FtpError>(())
                })
            })
            .await;

        match result {
            Ok((welcome, ())) => {
                self.connected = true;
                info!("FTP session verified at {}", self.endpoint.uri(&self.remote_path));
                Outcome::success((), welcome.text())
            }
            Err(e) => {
                warn!("FTP connect to {} failed: {}", self.endpoint.address(), e);
                Outcome::failed(e.into())
            }
        }
    }

    /// Upload `local_file` as text to
    /// `<remote_path>[<subpath> if it starts with '/']/<file name>`.
    pub async fn upload(&self, local_file: &Path, subpath: Option<&str>) -> Outcome<()> {
        if !self.connected {
            return guard();
        }

        let result = async {
            let target = upload_target(&self.remote_path, subpath, local_file)?;
            let content = read_text(local_file).await?;
            let uri = self.endpoint.uri(&target);
            let (_, reply) = self
                .run(|client| Box::pin(async move { client.store(&target, &content).await }))
                .await?;
            info!("FTP upload to {} done", uri);
            Ok::<_, FtpError>(reply)
        }
        .await;

        finish("upload", result)
    }

    /// Download `<remote_path>/<relative>` and discard the body.
    pub async fn download(&self, relative: &str) -> Outcome<()> {
        if !self.connected {
            return guard();
        }

        let target = download_target(&self.remote_path, relative);
        let uri = self.endpoint.uri(&target);
        let result = self
            .run(|client| Box::pin(async move { client.retrieve(&target).await }))
            .await
            .map(|(_, (bytes, reply))| {
                info!("FTP download of {} drained {} bytes", uri, bytes);
                reply
            });

        finish("download", result)
    }

    // ─── Helpers ─────────────────────────────────────────────────

    /// One control connection: greet, log in, run `op`, quit.
    async fn run<T, F>(&self, op: F) -> FtpResult<(FtpResponse, T)>
    where
        F: for<'c> FnOnce(
            &'c mut FtpClient,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = FtpResult<T>> + 'c>>,
    {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| FtpError::invalid_input("No FTP credentials stored"))?;

        let mut client = FtpClient::connect(&self.endpoint, &self.options).await?;
        let welcome = client.login(credentials).await?;
        let outcome = op(&mut client).await;
        client.quit().await;
        Ok((welcome, outcome?))
    }
}

fn guard() -> Outcome<()> {
    Outcome::guarded(NOT_CONNECTED_MESSAGE, Some(false))
}

fn finish(action: &str, result: FtpResult<FtpResponse>) -> Outcome<()> {
    match result {
        Ok(reply) => Outcome::success((), reply.status_description()),
        Err(e) => {
            warn!("FTP {} failed: {}", action, e);
            Outcome::failed(e.into())
        }
    }
}

/// Remote target of an upload.
pub fn upload_target(remote_path: &str, subpath: Option<&str>, local_file: &Path) -> FtpResult<String> {
    let name = local_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            FtpError::invalid_input(format!("{} has no file name", local_file.display()))
        })?;

    let mut target = remote_path.to_string();
    if let Some(sub) = subpath.filter(|s| s.starts_with('/')) {
        target.push_str(sub);
    }
    target.push('/');
    target.push_str(&name);
    Ok(target)
}

/// Remote target of a download.
pub fn download_target(remote_path: &str, relative: &str) -> String {
    format!("{}/{}", remote_path, relative)
}

/// Read a local file as UTF-8 text and re-encode it.
async fn read_text(path: &Path) -> FtpResult<Vec<u8>> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| FtpError::io_error(format!("{}: {}", path.display(), e)))?;
    let text = String::from_utf8_lossy(&raw);
    Ok(text.strip_prefix(UTF8_BOM).unwrap_or(&*text).as_bytes().to_vec())
}
