//! TCP transport: establishes the FTP control connection.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::protocol::FtpCodec;
use crate::ftp::types::{FtpEndpoint, FtpResponse};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Establish the control connection and return a ready-to-use codec
/// **plus** the server welcome banner.
pub async fn connect(endpoint: &FtpEndpoint, connect_timeout: Duration) -> FtpResult<(FtpCodec, FtpResponse)> {
    let addr = endpoint.address();

    let tcp = timeout(connect_timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| FtpError::timeout(format!("TCP connect to {} timed out", addr)))?
        .map_err(|e| FtpError::connection_failed(format!("TCP connect to {}: {}", addr, e)))?;

    tcp.set_nodelay(true).ok();

    let mut codec = FtpCodec::from_tcp(tcp);
    let banner = timeout(connect_timeout, codec.read_response())
        .await
        .map_err(|_| FtpError::timeout(format!("No greeting from {}", addr)))??;

    // 120 "service ready in nnn minutes" and 421 both mean "not now".
    if !banner.is_completion() {
        return Err(FtpError::from_reply(banner.code, &banner.text()));
    }
    Ok((codec, banner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ftp::error::FtpErrorKind;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reads_greeting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut s, _) = listener.accept().await.unwrap();
            s.write_all(b"220 ready\r\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
        });
        let (_, banner) = connect(&FtpEndpoint::new("127.0.0.1", port), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(banner.code, 220);
    }

    #[tokio::test]
    async fn busy_greeting_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut s, _) = listener.accept().await.unwrap();
            s.write_all(b"421 Too many users\r\n").await.unwrap();
        });
        let err = connect(&FtpEndpoint::new("127.0.0.1", port), Duration::from_secs(5))
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind, FtpErrorKind::Disconnected);
        assert_eq!(err.code, Some(421));
    }

    #[tokio::test]
    async fn refused_port_is_connection_failure() {
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let err = connect(&FtpEndpoint::new("127.0.0.1", port), Duration::from_secs(5))
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind, FtpErrorKind::ConnectionFailed);
        assert!(err.code.is_none());
    }
}
